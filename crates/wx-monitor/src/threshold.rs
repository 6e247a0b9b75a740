//! Descriptive threshold tables
//!
//! A table maps ascending numeric breakpoints to labels. A value is described
//! by the first breakpoint that lies strictly above it.

use thiserror::Error;

/// Threshold table errors
#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    #[error("breakpoints must be strictly ascending: {previous} is followed by {next}")]
    NotAscending { previous: f64, next: f64 },

    #[error("breakpoint must be a finite number, got {0}")]
    NotFinite(f64),
}

/// A single (breakpoint, label) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdEntry {
    pub breakpoint: f64,
    pub label: &'static str,
}

impl ThresholdEntry {
    pub const fn new(breakpoint: f64, label: &'static str) -> Self {
        Self { breakpoint, label }
    }
}

/// An ascending table of breakpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    entries: &'static [ThresholdEntry],
}

impl ThresholdTable {
    /// Build a table, checking the breakpoints ascend
    pub fn new(entries: &'static [ThresholdEntry]) -> Result<Self, ThresholdError> {
        for entry in entries {
            if !entry.breakpoint.is_finite() {
                return Err(ThresholdError::NotFinite(entry.breakpoint));
            }
        }
        for pair in entries.windows(2) {
            if pair[0].breakpoint >= pair[1].breakpoint {
                return Err(ThresholdError::NotAscending {
                    previous: pair[0].breakpoint,
                    next: pair[1].breakpoint,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Label of the first breakpoint strictly greater than `value`
    ///
    /// Returns the empty string when `value` is at or above every breakpoint.
    /// NaN compares false against everything and so also yields "".
    pub fn classify(&self, value: f64) -> &'static str {
        self.entries
            .iter()
            .find(|entry| value < entry.breakpoint)
            .map(|entry| entry.label)
            .unwrap_or("")
    }

    pub fn entries(&self) -> &'static [ThresholdEntry] {
        self.entries
    }
}

/// Describes a daily minimum temperature (°C)
pub const LOW_TEMPERATURES: ThresholdTable = ThresholdTable {
    entries: &[
        ThresholdEntry::new(-5.0, "a very cold"),
        ThresholdEntry::new(-2.0, "a rather cold"),
        ThresholdEntry::new(0.0, "a freezing"),
        ThresholdEntry::new(2.0, "a frosty"),
        ThresholdEntry::new(5.0, "a cold"),
        ThresholdEntry::new(7.0, "a moderate"),
        ThresholdEntry::new(10.0, "a pleasant"),
        ThresholdEntry::new(15.0, "a hot"),
        ThresholdEntry::new(25.0, "a scorching"),
    ],
};

/// Describes a daily maximum temperature (°C)
pub const HIGH_TEMPERATURES: ThresholdTable = ThresholdTable {
    entries: &[
        ThresholdEntry::new(1.0, "a very cold"),
        ThresholdEntry::new(4.0, "a rather cold"),
        ThresholdEntry::new(6.0, "a piercing"),
        ThresholdEntry::new(8.0, "a chilly"),
        ThresholdEntry::new(11.0, "a cool"),
        ThresholdEntry::new(15.0, "a moderate"),
        ThresholdEntry::new(18.0, "a reasonably warm"),
        ThresholdEntry::new(21.0, "a hot"),
        ThresholdEntry::new(31.0, "a scorching"),
        ThresholdEntry::new(36.0, "a sweltering"),
    ],
};
