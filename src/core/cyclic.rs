//! Year-folding for the cyclic view.
//!
//! Every year is laid onto a single leap-year-length template. Times in a
//! common year that fall on or after March 1st are shifted forward by one day
//! so a given month/day lands on the same template slot whatever its year.

use serde::{Deserialize, Serialize};

use crate::core::calendar::{is_leap_year, year_of, year_start_millis};
use crate::core::scale_unit::MILLIS_PER_DAY;
use crate::core::types::{TimeMillis, TimeSpan};
use crate::error::{LayoutError, LayoutResult};

/// Offset from January 1st to March 1st in a common year.
pub const MILLIS_THROUGH_FEBRUARY_28: i64 = 59 * MILLIS_PER_DAY;

/// Year-start boundaries enclosing a mapped window.
///
/// The first boundary is the start of the nearest leap year at or before the
/// window start; the last is the start of the year after the window end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CyclicTable")]
pub struct CyclicCalendar {
    boundaries: Vec<TimeMillis>,
    leap_years: Vec<bool>,
    first_year: i32,
}

impl CyclicCalendar {
    pub fn build(window: TimeSpan) -> LayoutResult<Self> {
        let mut first_year = year_of(window.start())?;
        while !is_leap_year(first_year) {
            first_year -= 1;
        }
        let last_year = year_of(window.end())? + 1;

        let capacity = usize::try_from(last_year - first_year + 1).unwrap_or_default();
        let mut boundaries = Vec::with_capacity(capacity);
        let mut leap_years = Vec::with_capacity(capacity);
        for year in first_year..=last_year {
            boundaries.push(year_start_millis(year)?);
            leap_years.push(is_leap_year(year));
        }

        Ok(Self {
            boundaries,
            leap_years,
            first_year,
        })
    }

    #[must_use]
    pub fn boundaries(&self) -> &[TimeMillis] {
        &self.boundaries
    }

    #[must_use]
    pub fn leap_years(&self) -> &[bool] {
        &self.leap_years
    }

    #[must_use]
    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    /// Start of the first (leap) year in the table.
    #[must_use]
    pub fn origin(&self) -> TimeMillis {
        self.boundaries[0]
    }

    /// Index `i` such that `boundaries[i] <= time < boundaries[i + 1]`.
    ///
    /// The last boundary opens a final bracket that runs one calendar year.
    #[must_use]
    pub fn bracket(&self, time: TimeMillis) -> Option<usize> {
        let first = *self.boundaries.first()?;
        let last = *self.boundaries.last()?;
        let last_year_days = match self.leap_years.last() {
            Some(true) => 366,
            _ => 365,
        };
        let end = last.saturating_add(last_year_days * MILLIS_PER_DAY);
        if time < first || time >= end {
            return None;
        }
        Some(self.boundaries.partition_point(|boundary| *boundary <= time) - 1)
    }

    /// Milliseconds from the start of the template year to `time`.
    ///
    /// Times outside the table resolve their year from the calendar directly.
    pub fn template_offset(&self, time: TimeMillis) -> LayoutResult<i64> {
        let (year_start, leap) = match self.bracket(time) {
            Some(index) => (self.boundaries[index], self.leap_years[index]),
            None => {
                let year = year_of(time)?;
                (year_start_millis(year)?, is_leap_year(year))
            }
        };
        Ok(fold_leap_day(time - year_start, leap))
    }
}

/// Serialized form of [`CyclicCalendar`], checked before use.
#[derive(Deserialize)]
struct CyclicTable {
    boundaries: Vec<TimeMillis>,
    leap_years: Vec<bool>,
    first_year: i32,
}

impl TryFrom<CyclicTable> for CyclicCalendar {
    type Error = LayoutError;

    fn try_from(table: CyclicTable) -> LayoutResult<Self> {
        if table.boundaries.is_empty() {
            return Err(LayoutError::InvalidData(
                "cyclic calendar needs at least one year boundary".to_owned(),
            ));
        }
        if table.boundaries.len() != table.leap_years.len() {
            return Err(LayoutError::InvalidData(format!(
                "cyclic calendar has {} boundaries but {} leap flags",
                table.boundaries.len(),
                table.leap_years.len()
            )));
        }
        if table.boundaries.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(LayoutError::InvalidData(
                "cyclic calendar boundaries must be strictly increasing".to_owned(),
            ));
        }
        Ok(Self {
            boundaries: table.boundaries,
            leap_years: table.leap_years,
            first_year: table.first_year,
        })
    }
}

/// Shifts a common-year offset past February 28th forward by one day.
#[must_use]
pub const fn fold_leap_day(offset_in_year: i64, leap_year: bool) -> i64 {
    if !leap_year && offset_in_year >= MILLIS_THROUGH_FEBRUARY_28 {
        offset_in_year + MILLIS_PER_DAY
    } else {
        offset_in_year
    }
}
