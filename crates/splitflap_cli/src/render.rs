//! Terminal renderer
//!
//! Draws each snapshot on a single terminal line, redrawn in place. Digits
//! that are mid-flip are dimmed.

use splitflap_core::{parse_hex_color, ClockSnapshot, Colors, FlipPhase};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Mutex;

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

/// ANSI escape sequences for the card colors
struct Palette {
    digit: String,
    flap: String,
    dot: String,
    meridiem: String,
}

fn foreground(value: &str, fallback: &str) -> String {
    let (r, g, b) = parse_hex_color(value).unwrap_or_else(|err| {
        tracing::warn!("{}, using {}", err, fallback);
        parse_hex_color(fallback).unwrap_or((255, 255, 255))
    });
    format!("\x1b[38;2;{r};{g};{b}m")
}

fn background(value: &str, fallback: &str) -> String {
    let (r, g, b) = parse_hex_color(value).unwrap_or_else(|err| {
        tracing::warn!("{}, using {}", err, fallback);
        parse_hex_color(fallback).unwrap_or((0, 0, 0))
    });
    format!("\x1b[48;2;{r};{g};{b}m")
}

impl Palette {
    fn new(colors: &Colors) -> Self {
        let defaults = Colors::default();
        Self {
            digit: foreground(&colors.digit, &defaults.digit),
            flap: background(&colors.flap, &defaults.flap),
            dot: foreground(&colors.dot, &defaults.dot),
            meridiem: foreground(&colors.meridiem, &defaults.meridiem),
        }
    }
}

/// Renders snapshots to stdout
pub struct TerminalRenderer {
    palette: Option<Palette>,
    last_line: Mutex<String>,
}

impl TerminalRenderer {
    /// Renderer using the card colors, or plain text when `plain` is set
    pub fn new(colors: &Colors, plain: bool) -> Self {
        Self {
            palette: (!plain).then(|| Palette::new(colors)),
            last_line: Mutex::new(String::new()),
        }
    }

    /// Format a snapshot as one line
    pub fn line(&self, snapshot: &ClockSnapshot) -> String {
        let mut line = String::new();
        let mut slots = snapshot.slots.iter();

        for (field_index, &width) in snapshot.format.fields().iter().enumerate() {
            if field_index > 0 {
                match &self.palette {
                    Some(p) => {
                        let _ = write!(line, "{}:{}", p.dot, RESET);
                    }
                    None => line.push(':'),
                }
            }
            for slot in slots.by_ref().take(width) {
                let flipping = slot.phase == FlipPhase::Flipping;
                match &self.palette {
                    Some(p) => {
                        let _ = write!(
                            line,
                            "{}{}{} {} {}",
                            p.flap,
                            p.digit,
                            if flipping { DIM } else { "" },
                            slot.top,
                            RESET
                        );
                    }
                    None if flipping => {
                        let _ = write!(line, "[{}>{}]", slot.top, slot.incoming);
                    }
                    None => {
                        let _ = write!(line, "[{}]", slot.top);
                    }
                }
            }
        }

        if let Some(meridiem) = snapshot.meridiem.as_deref() {
            match &self.palette {
                Some(p) => {
                    let _ = write!(line, " {}{:2}{}", p.meridiem, meridiem, RESET);
                }
                None => {
                    let _ = write!(line, " {meridiem:2}");
                }
            }
        }

        line
    }

    /// Draw a snapshot if it differs from the last one drawn
    pub fn render(&self, snapshot: &ClockSnapshot) {
        let line = self.line(snapshot);
        let mut last = self.last_line.lock().unwrap();
        if *last == line {
            return;
        }

        let mut stdout = io::stdout().lock();
        if write!(stdout, "\r{line}").and_then(|_| stdout.flush()).is_err() {
            tracing::debug!("stdout closed, frame dropped");
        }
        *last = line;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitflap_core::{ClockController, DisplayFormat};
    use std::time::{Duration, Instant};

    #[test]
    fn test_plain_line() {
        let mut clock = ClockController::build(DisplayFormat::hh_mm(), true).unwrap();
        let renderer = TerminalRenderer::new(&Colors::default(), true);
        let t0 = Instant::now();

        assert_eq!(renderer.line(&clock.snapshot()), "[0][0]:[0][0]   ");

        clock.tick("21:07", t0).unwrap();
        assert_eq!(renderer.line(&clock.snapshot()), "[0][0>9]:[0][0>7] PM");

        clock.advance(t0 + Duration::from_millis(250));
        assert_eq!(renderer.line(&clock.snapshot()), "[0][9]:[0][7] PM");
    }

    #[test]
    fn test_colored_line_uses_palette() {
        let clock = ClockController::build(DisplayFormat::hh_mm_ss(), false).unwrap();
        let colors = Colors {
            digit: "#010203".to_string(),
            ..Colors::default()
        };
        let line = TerminalRenderer::new(&colors, false).line(&clock.snapshot());

        assert!(line.contains("\x1b[38;2;1;2;3m"));
        assert!(line.contains("\x1b[48;2;0;0;0m"));
        assert_eq!(line.matches(':').count(), 2);
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let colors = Colors {
            dot: "red".to_string(),
            ..Colors::default()
        };
        let clock = ClockController::build(DisplayFormat::hh_mm(), false).unwrap();
        let line = TerminalRenderer::new(&colors, false).line(&clock.snapshot());
        assert!(line.contains("\x1b[38;2;255;0;0m:"));
    }
}
