use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// Milliseconds since the Unix epoch (UTC). May be negative.
pub type TimeMillis = i64;

/// Horizontal or vertical position in drawing coordinates.
pub type Pixel = i32;

/// Closed date range `[start, end]` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    start: TimeMillis,
    end: TimeMillis,
}

impl TimeSpan {
    pub fn new(start: TimeMillis, end: TimeMillis) -> LayoutResult<Self> {
        if start > end {
            return Err(LayoutError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Zero-length span located at `time`.
    #[must_use]
    pub const fn instant(time: TimeMillis) -> Self {
        Self {
            start: time,
            end: time,
        }
    }

    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> LayoutResult<Self> {
        Self::new(start.timestamp_millis(), end.timestamp_millis())
    }

    #[must_use]
    pub const fn start(self) -> TimeMillis {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> TimeMillis {
        self.end
    }

    #[must_use]
    pub const fn duration(self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn contains(self, time: TimeMillis) -> bool {
        self.start <= time && time <= self.end
    }

    /// Two spans overlap when they share more than a single instant.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Smallest span containing both `self` and `other`.
    #[must_use]
    pub fn cover(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: Pixel,
    pub y: Pixel,
}

impl Point {
    #[must_use]
    pub const fn new(x: Pixel, y: Pixel) -> Self {
        Self { x, y }
    }
}
