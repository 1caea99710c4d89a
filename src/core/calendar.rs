//! Calendar-correct arithmetic on millisecond time values.
//!
//! All computations use UTC and the proleptic Gregorian calendar. Weeks start
//! on Sunday. Fixed-length units (second through day) are handled with plain
//! integer arithmetic; weeks, months and years go through `chrono`.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};

use crate::core::scale_unit::ScaleUnit;
use crate::core::types::TimeMillis;
use crate::error::{LayoutError, LayoutResult};

fn to_datetime(time: TimeMillis) -> LayoutResult<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp_millis(time)
        .map(|value| value.naive_utc())
        .ok_or(LayoutError::TimeOutOfRange { time })
}

fn date_to_millis(date: NaiveDate) -> Option<TimeMillis> {
    date.and_hms_opt(0, 0, 0)
        .map(|value| value.and_utc().timestamp_millis())
}

#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn year_of(time: TimeMillis) -> LayoutResult<i32> {
    Ok(to_datetime(time)?.year())
}

/// Millisecond value of January 1st, 00:00 UTC, of `year`.
pub fn year_start_millis(year: i32) -> LayoutResult<TimeMillis> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(date_to_millis)
        .ok_or_else(|| LayoutError::InvalidData(format!("year {year} is not representable")))
}

/// Rounds `time` down to the start of the enclosing `unit`.
pub fn truncate_to_unit(time: TimeMillis, unit: ScaleUnit) -> LayoutResult<TimeMillis> {
    let moment = to_datetime(time)?;
    match unit {
        ScaleUnit::Second | ScaleUnit::Minute | ScaleUnit::Hour | ScaleUnit::Day => {
            Ok(time - time.rem_euclid(unit.nominal_millis()))
        }
        ScaleUnit::Week => {
            let date = moment.date();
            let back = i64::from(date.weekday().num_days_from_sunday());
            let day_start = date_to_millis(date).ok_or(LayoutError::TimeOutOfRange { time })?;
            day_start
                .checked_sub(back * ScaleUnit::Day.nominal_millis())
                .ok_or(LayoutError::TimeOutOfRange { time })
        }
        ScaleUnit::Month => NaiveDate::from_ymd_opt(moment.year(), moment.month(), 1)
            .and_then(date_to_millis)
            .ok_or(LayoutError::TimeOutOfRange { time }),
        ScaleUnit::Year => year_start_millis(moment.year()),
    }
}

/// Moves `time` by `count` whole units. Month and year steps keep the
/// day-of-month when it exists, clamping to the last day otherwise.
pub fn advance_by_units(time: TimeMillis, unit: ScaleUnit, count: i64) -> LayoutResult<TimeMillis> {
    let out_of_range = LayoutError::TimeOutOfRange { time };
    let months = match unit {
        ScaleUnit::Second
        | ScaleUnit::Minute
        | ScaleUnit::Hour
        | ScaleUnit::Day
        | ScaleUnit::Week => {
            let shifted = count
                .checked_mul(unit.nominal_millis())
                .and_then(|delta| time.checked_add(delta))
                .ok_or(out_of_range)?;
            to_datetime(shifted)?;
            return Ok(shifted);
        }
        ScaleUnit::Month => count,
        ScaleUnit::Year => count.checked_mul(12).ok_or(out_of_range.clone())?,
    };

    let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| out_of_range.clone())?;
    let moment = to_datetime(time)?;
    let shifted = if months >= 0 {
        moment.checked_add_months(Months::new(magnitude))
    } else {
        moment.checked_sub_months(Months::new(magnitude))
    };
    shifted
        .map(|value| value.and_utc().timestamp_millis())
        .ok_or(out_of_range)
}

/// Rounds `time` to the nearest `unit` boundary; exact halves round up.
pub fn snap_to_unit(time: TimeMillis, unit: ScaleUnit) -> LayoutResult<TimeMillis> {
    let lower = truncate_to_unit(time, unit)?;
    if lower == time {
        return Ok(time);
    }
    let upper = advance_by_units(lower, unit, 1)?;
    if time - lower < upper - time {
        Ok(lower)
    } else {
        Ok(upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scale_unit::MILLIS_PER_DAY;

    #[test]
    fn leap_year_rules() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert!(is_leap_year(-4));
    }

    #[test]
    fn week_truncates_to_sunday() {
        // 1970-01-01 was a Thursday; the enclosing week starts 1969-12-28.
        let start = truncate_to_unit(12 * 3_600_000, ScaleUnit::Week).expect("truncate");
        assert_eq!(start, -4 * MILLIS_PER_DAY);
    }

    #[test]
    fn unrepresentable_times_fail_every_unit() {
        for unit in ScaleUnit::ALL {
            assert_eq!(
                truncate_to_unit(i64::MIN, unit),
                Err(LayoutError::TimeOutOfRange { time: i64::MIN })
            );
        }
        assert!(year_start_millis(i32::MAX).is_err());
    }

    #[test]
    fn negative_times_truncate_downward() {
        let start = truncate_to_unit(-1, ScaleUnit::Day).expect("truncate");
        assert_eq!(start, -MILLIS_PER_DAY);
    }
}
