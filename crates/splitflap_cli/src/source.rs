//! Time sources standing in for the dashboard host
//!
//! Both sources write into the [`StateTable`] the way a host updates its
//! entity states; the clock picks the values up through its subscription.

use anyhow::{Context, Result};
use serde_json::Value;
use splitflap_runtime::StateTable;
use std::io::BufRead;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Format a wall-clock time as `HH:MM:SS`
///
/// `offset_minutes` shifts UTC to the wanted zone.
pub fn format_time_of_day(unix_seconds: i64, offset_minutes: i32) -> String {
    let seconds = (unix_seconds + i64::from(offset_minutes) * 60).rem_euclid(SECONDS_PER_DAY);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60
    )
}

/// Write the system time into `entity` once per second, forever
pub fn run_system_clock(states: &StateTable, entity: &str, offset_minutes: i32) -> Result<()> {
    loop {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("System clock is before the Unix epoch")?;
        let unix_seconds = i64::try_from(now.as_secs()).context("System clock out of range")?;

        states.set(entity, format_time_of_day(unix_seconds, offset_minutes));

        // Wake just after the next second boundary
        let until_next = Duration::from_secs(1) - Duration::from_nanos(u64::from(now.subsec_nanos()));
        thread::sleep(until_next + Duration::from_millis(5));
    }
}

/// Apply one line of host input
///
/// A JSON object sets every key it contains; anything else is taken as the
/// raw state of `entity`. Returns how many states were set.
pub fn apply_line(states: &StateTable, entity: &str, line: &str) -> usize {
    let line = line.trim();
    if line.is_empty() {
        return 0;
    }

    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => {
            let mut applied = 0;
            for (key, value) in map {
                match value {
                    Value::String(state) => states.set(&key, state),
                    Value::Null => {
                        states.remove(&key);
                    }
                    other => states.set(&key, other.to_string()),
                }
                applied += 1;
            }
            applied
        }
        _ => {
            states.set(entity, line);
            1
        }
    }
}

/// Feed stdin lines into the state table until EOF
pub fn run_stdin(states: &StateTable, entity: &str) -> Result<()> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let applied = apply_line(states, entity, &line);
        tracing::debug!("applied {} state(s) from {:?}", applied, line);
    }
    Ok(())
}
