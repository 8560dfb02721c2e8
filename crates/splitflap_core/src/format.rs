//! Display format: the widths of the clock's digit fields

use smallvec::SmallVec;

use crate::error::{ClockError, Result};

/// Width of every field the decoder can render
pub const FIELD_WIDTH: usize = 2;

/// Ordered field widths, `[2, 2]` for HH:MM or `[2, 2, 2]` for HH:MM:SS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    fields: SmallVec<[usize; 3]>,
}

impl DisplayFormat {
    /// HH:MM
    pub fn hh_mm() -> Self {
        Self {
            fields: SmallVec::from_slice(&[FIELD_WIDTH, FIELD_WIDTH]),
        }
    }

    /// HH:MM:SS
    pub fn hh_mm_ss() -> Self {
        Self {
            fields: SmallVec::from_slice(&[FIELD_WIDTH, FIELD_WIDTH, FIELD_WIDTH]),
        }
    }

    /// Build a format from explicit field widths
    ///
    /// Only layouts the decoder can fill are accepted: two or three fields,
    /// each [`FIELD_WIDTH`] digits wide.
    pub fn from_fields(fields: &[usize]) -> Result<Self> {
        if !(2..=3).contains(&fields.len()) {
            return Err(ClockError::UnsupportedFormat(format!(
                "expected 2 or 3 fields, got {}",
                fields.len()
            )));
        }
        if let Some(width) = fields.iter().find(|&&w| w != FIELD_WIDTH) {
            return Err(ClockError::UnsupportedFormat(format!(
                "field width {width} (only {FIELD_WIDTH}-digit fields are supported)"
            )));
        }
        Ok(Self {
            fields: SmallVec::from_slice(fields),
        })
    }

    pub fn fields(&self) -> &[usize] {
        &self.fields
    }

    /// Total number of digit slots
    pub fn digit_count(&self) -> usize {
        self.fields.iter().sum()
    }

    pub fn shows_seconds(&self) -> bool {
        self.fields.len() == 3
    }

    /// Index of the field a slot belongs to
    pub fn field_of(&self, slot: usize) -> Option<usize> {
        let mut end = 0;
        for (field, width) in self.fields.iter().enumerate() {
            end += width;
            if slot < end {
                return Some(field);
            }
        }
        None
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::hh_mm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_counts() {
        assert_eq!(DisplayFormat::hh_mm().digit_count(), 4);
        assert_eq!(DisplayFormat::hh_mm_ss().digit_count(), 6);
        assert!(DisplayFormat::hh_mm_ss().shows_seconds());
        assert!(!DisplayFormat::hh_mm().shows_seconds());
    }

    #[test]
    fn test_from_fields_validation() {
        assert_eq!(
            DisplayFormat::from_fields(&[2, 2]).unwrap(),
            DisplayFormat::hh_mm()
        );
        assert!(matches!(
            DisplayFormat::from_fields(&[2]),
            Err(ClockError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DisplayFormat::from_fields(&[2, 3]),
            Err(ClockError::UnsupportedFormat(_))
        ));
        assert!(DisplayFormat::from_fields(&[2, 2, 2, 2]).is_err());
    }

    #[test]
    fn test_field_of() {
        let format = DisplayFormat::hh_mm_ss();
        assert_eq!(format.field_of(0), Some(0));
        assert_eq!(format.field_of(1), Some(0));
        assert_eq!(format.field_of(2), Some(1));
        assert_eq!(format.field_of(5), Some(2));
        assert_eq!(format.field_of(6), None);
    }
}
