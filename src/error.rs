use thiserror::Error;

use crate::core::IntervalId;

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error(
        "pixel coordinate overflow: time={time} origin={origin} millis_per_pixel={millis_per_pixel}"
    )]
    CoordinateOverflow {
        time: i64,
        origin: i64,
        millis_per_pixel: i64,
    },

    #[error("interval {id} is not placed in any level")]
    NotFound { id: IntervalId },

    #[error("invalid time span: start={start} is after end={end}")]
    InvalidSpan { start: i64, end: i64 },

    #[error("time value {time} is outside the supported calendar range")]
    TimeOutOfRange { time: i64 },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
