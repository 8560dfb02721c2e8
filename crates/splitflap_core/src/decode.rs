//! Time decoding
//!
//! Turns a raw `HH:MM` / `HH:MM:SS` string into the flat digit sequence a
//! [`DisplayFormat`] shows, converting to 12-hour time when asked.
//!
//! Only the shape of the value is checked. Field ranges are not: `"25:61"`
//! decodes to the digits `2 5 6 1`.
//!
//! ```rust
//! use splitflap_core::{decode, DisplayFormat, Meridiem};
//!
//! let decoded = decode("13:05", &DisplayFormat::hh_mm(), true).unwrap();
//! assert_eq!(decoded.digits.as_slice(), &['0', '1', '0', '5']);
//! assert_eq!(decoded.meridiem, Some(Meridiem::Pm));
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use smallvec::SmallVec;

use crate::error::DecodeError;
use crate::format::DisplayFormat;

/// Digits in display order, hours first
pub type DigitSequence = SmallVec<[char; 6]>;

/// AM/PM indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Meridiem of a 24-hour clock hour
    pub fn of_hour(hour: u8) -> Self {
        if hour < 12 {
            Meridiem::Am
        } else {
            Meridiem::Pm
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of one decoded time value, as written in the source (24-hour)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSample {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: Option<u8>,
}

/// Result of a successful decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTime {
    pub sample: TimeSample,
    pub digits: DigitSequence,
    /// Present only for 12-hour decoding
    pub meridiem: Option<Meridiem>,
}

fn time_shape() -> &'static Regex {
    static TIME_SHAPE: OnceLock<Regex> = OnceLock::new();
    TIME_SHAPE.get_or_init(|| {
        Regex::new(r"^([0-9]{2}):([0-9]{2})(?::([0-9]{2}))?$").expect("time shape pattern is valid")
    })
}

/// Whether `raw` has the shape of a time-source value
pub fn is_time_shaped(raw: &str) -> bool {
    time_shape().is_match(raw)
}

/// Two ASCII digits, already checked by the shape pattern
fn two_digits(field: &str) -> u8 {
    field
        .bytes()
        .fold(0u8, |acc, b| acc * 10 + (b - b'0'))
}

fn push_padded(digits: &mut DigitSequence, value: u8) {
    digits.push(char::from(b'0' + value / 10 % 10));
    digits.push(char::from(b'0' + value % 10));
}

/// Decode a raw time string into the digits shown by `format`
///
/// With `twelve_hour`, hour 0 shows as 12, hours past 12 wrap around and
/// the meridiem comes from the 24-hour value.
pub fn decode(
    raw: &str,
    format: &DisplayFormat,
    twelve_hour: bool,
) -> Result<DecodedTime, DecodeError> {
    let caps = time_shape()
        .captures(raw)
        .ok_or_else(|| DecodeError::Malformed(raw.to_string()))?;

    let sample = TimeSample {
        hours: two_digits(&caps[1]),
        minutes: two_digits(&caps[2]),
        seconds: caps.get(3).map(|m| two_digits(m.as_str())),
    };

    let (hours, meridiem) = if twelve_hour {
        let hours = match sample.hours % 12 {
            0 => 12,
            h => h,
        };
        (hours, Some(Meridiem::of_hour(sample.hours)))
    } else {
        (sample.hours, None)
    };

    let mut digits = DigitSequence::new();
    push_padded(&mut digits, hours);
    push_padded(&mut digits, sample.minutes);
    if format.shows_seconds() {
        let seconds = sample.seconds.ok_or(DecodeError::MissingSeconds)?;
        push_padded(&mut digits, seconds);
    }

    debug_assert_eq!(digits.len(), format.digit_count());

    Ok(DecodedTime {
        sample,
        digits,
        meridiem,
    })
}
