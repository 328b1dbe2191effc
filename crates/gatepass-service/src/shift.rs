//! Shift window classification.
//!
//! Shifts are fixed daily local-time windows, half-open at the end:
//!
//! | shift     | labels                         | window         |
//! |-----------|--------------------------------|----------------|
//! | morning   | `morning`, `mañana`, `manana`  | [06:00, 12:00) |
//! | afternoon | `afternoon`, `tarde`           | [13:00, 18:00) |
//! | evening   | `evening`, `noche`             | [18:00, 22:00) |
//!
//! Any other label, or no label at all, is outside every shift.

use chrono::{DateTime, FixedOffset, Local, NaiveTime, Utc};

use gatepass_core::config::ShiftConfig;
use gatepass_core::error::AppError;

/// A recognized shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// [06:00, 12:00)
    Morning,
    /// [13:00, 18:00)
    Afternoon,
    /// [18:00, 22:00)
    Evening,
}

impl Shift {
    /// Parse a shift label, ignoring case and surrounding whitespace.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "morning" | "mañana" | "manana" => Some(Self::Morning),
            "afternoon" | "tarde" => Some(Self::Afternoon),
            "evening" | "noche" => Some(Self::Evening),
            _ => None,
        }
    }

    /// Start (inclusive) and end (exclusive) hours of the window.
    pub fn hours(&self) -> (u32, u32) {
        match self {
            Self::Morning => (6, 12),
            Self::Afternoon => (13, 18),
            Self::Evening => (18, 22),
        }
    }

    /// Whether `time` falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let (start, end) = self.hours();
        let start = NaiveTime::from_hms_opt(start, 0, 0).unwrap_or(NaiveTime::MIN);
        let end = NaiveTime::from_hms_opt(end, 0, 0).unwrap_or(NaiveTime::MIN);
        start <= time && time < end
    }
}

/// Whether a local wall-clock `time` is inside the shift named by `label`.
pub fn within_shift(time: NaiveTime, label: Option<&str>) -> bool {
    label
        .and_then(Shift::parse)
        .is_some_and(|shift| shift.contains(time))
}

/// Converts instants to local wall-clock time and classifies them.
#[derive(Debug, Clone, Copy)]
pub struct ShiftClassifier {
    offset: Option<FixedOffset>,
}

impl ShiftClassifier {
    /// Build from configuration. Without an offset the server's local
    /// timezone is used.
    pub fn new(config: &ShiftConfig) -> Result<Self, AppError> {
        let offset = match config.utc_offset_minutes {
            Some(minutes) => Some(FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
                AppError::configuration(format!("Invalid shift UTC offset: {minutes} minutes"))
            })?),
            None => None,
        };
        Ok(Self { offset })
    }

    /// A classifier pinned to a fixed offset.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    /// Wall-clock time of `instant` in the configured timezone.
    pub fn local_time(&self, instant: DateTime<Utc>) -> NaiveTime {
        match self.offset {
            Some(offset) => instant.with_timezone(&offset).time(),
            None => instant.with_timezone(&Local).time(),
        }
    }

    /// Whether `instant` is inside the shift named by `label`.
    pub fn classify(&self, instant: DateTime<Utc>, label: Option<&str>) -> bool {
        within_shift(self.local_time(instant), label)
    }
}
