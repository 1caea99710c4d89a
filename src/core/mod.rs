pub mod calendar;
pub mod cyclic;
pub mod interval;
pub mod mapping_events;
pub mod placement;
pub mod scale_unit;
pub mod time_axis;
pub mod types;

pub use calendar::{
    advance_by_units, is_leap_year, snap_to_unit, truncate_to_unit, year_of, year_start_millis,
};
pub use cyclic::{CyclicCalendar, MILLIS_THROUGH_FEBRUARY_28, fold_leap_day};
pub use interval::{IntervalId, IntervalSet, MIN_BODY_WIDTH, PlacedInterval};
pub use mapping_events::{MappingChange, MappingListener};
pub use placement::{
    BODY_HEIGHT, LEVEL_SPACING, Level, LevelEntry, PlacementConfig, PlacementTable, TOP_MARGIN,
};
pub use scale_unit::{
    MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_SECOND, ScaleUnit,
};
pub use time_axis::{
    END_MARGIN_UNITS, GridLine, GridLineKind, MAX_GRID_LINES, MappingState, TimeAxisMapper,
    UNIT_PIXEL_WIDTH, millis_per_pixel_for,
};
pub use types::{Point, Pixel, TimeMillis, TimeSpan};
