use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::calendar::{advance_by_units, snap_to_unit, truncate_to_unit};
use crate::core::cyclic::CyclicCalendar;
use crate::core::mapping_events::{MappingChange, MappingListener};
use crate::core::scale_unit::ScaleUnit;
use crate::core::types::{Pixel, TimeMillis, TimeSpan};
use crate::error::{LayoutError, LayoutResult};

/// Minimum on-screen width of one scale unit.
pub const UNIT_PIXEL_WIDTH: i64 = 20;

/// Scale units of slack added before the mapped window start and after its end.
pub const END_MARGIN_UNITS: i64 = 3;

/// Upper bound on the boundaries one `grid_lines` call may produce per unit.
pub const MAX_GRID_LINES: usize = 100_000;

/// Milliseconds represented by one pixel at `scale`. Always `>= 1`.
#[must_use]
pub const fn millis_per_pixel_for(scale: ScaleUnit) -> i64 {
    scale.nominal_millis() / UNIT_PIXEL_WIDTH + 1
}

/// Derived mapping parameters, recomputed whenever scale, cyclic mode or the
/// mapped window change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingState {
    pub origin_millis: TimeMillis,
    pub millis_per_pixel: i64,
    pub cyclic: Option<CyclicCalendar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridLineKind {
    Minor,
    Major,
}

/// Calendar-aligned unit boundary positioned on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLine {
    pub x: Pixel,
    pub time: TimeMillis,
    pub kind: GridLineKind,
}

/// Converts between time values and horizontal pixel positions.
///
/// The mapper starts unmapped. Once a window is mapped, every change of
/// scale, cyclic mode or window triggers a full recomputation followed by a
/// single notification to registered listeners.
///
/// The mapper mutates in place and holds non-`Send` listeners; it is meant to
/// live on the single thread that owns rendering.
pub struct TimeAxisMapper {
    scale: ScaleUnit,
    cyclic: bool,
    mapped_window: Option<TimeSpan>,
    state: Option<MappingState>,
    generation: u64,
    listeners: Vec<Box<dyn MappingListener>>,
}

impl fmt::Debug for TimeAxisMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeAxisMapper")
            .field("scale", &self.scale)
            .field("cyclic", &self.cyclic)
            .field("mapped_window", &self.mapped_window)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TimeAxisMapper {
    #[must_use]
    pub fn new(scale: ScaleUnit, cyclic: bool) -> Self {
        Self {
            scale,
            cyclic,
            mapped_window: None,
            state: None,
            generation: 0,
            listeners: Vec::new(),
        }
    }

    pub fn with_window(scale: ScaleUnit, cyclic: bool, window: TimeSpan) -> LayoutResult<Self> {
        let mut mapper = Self::new(scale, cyclic);
        mapper.set_mapped_window(Some(window))?;
        Ok(mapper)
    }

    #[must_use]
    pub fn scale(&self) -> ScaleUnit {
        self.scale
    }

    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    #[must_use]
    pub fn mapped_window(&self) -> Option<TimeSpan> {
        self.mapped_window
    }

    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub fn state(&self) -> Option<&MappingState> {
        self.state.as_ref()
    }

    /// Number of recomputations performed so far. Hosts that poll rather
    /// than subscribe compare this against the last value they saw.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn millis_per_pixel(&self) -> i64 {
        millis_per_pixel_for(self.scale)
    }

    pub fn set_scale(&mut self, scale: ScaleUnit) -> LayoutResult<()> {
        self.apply(scale, self.cyclic, self.mapped_window)
    }

    pub fn set_cyclic(&mut self, cyclic: bool) -> LayoutResult<()> {
        self.apply(self.scale, cyclic, self.mapped_window)
    }

    /// Binds a new window to the pixel space. `None` returns the mapper to
    /// the unmapped state without notifying listeners.
    pub fn set_mapped_window(&mut self, window: Option<TimeSpan>) -> LayoutResult<()> {
        self.apply(self.scale, self.cyclic, window)
    }

    /// Sets the mapped window to the cover of `document` and `extra`. The
    /// result may be narrower than the current window.
    ///
    /// Returns `true` when the window changed and the mapping was recomputed.
    pub fn ensure_included(
        &mut self,
        document: Option<TimeSpan>,
        extra: TimeSpan,
    ) -> LayoutResult<bool> {
        let wanted = document.map_or(extra, |span| span.cover(extra));
        if self.mapped_window == Some(wanted) {
            return Ok(false);
        }
        self.set_mapped_window(Some(wanted))?;
        Ok(true)
    }

    fn apply(
        &mut self,
        scale: ScaleUnit,
        cyclic: bool,
        window: Option<TimeSpan>,
    ) -> LayoutResult<()> {
        let (state, total_width) = match window {
            Some(window) => {
                let state = compute_state(scale, cyclic, window)?;
                let total_width = width_for(scale, window, &state)?;
                (Some(state), total_width)
            }
            None => (None, 0),
        };

        self.scale = scale;
        self.cyclic = cyclic;
        self.mapped_window = window;
        self.state = state;

        let Some(state) = self.state.as_ref() else {
            debug!(scale = %scale, cyclic, "time axis unmapped");
            return Ok(());
        };
        let origin_millis = state.origin_millis;
        let millis_per_pixel = state.millis_per_pixel;
        let boundaries = state.cyclic.as_ref().map_or(0, |c| c.boundaries().len());

        self.generation += 1;
        debug!(
            scale = %scale,
            cyclic,
            origin = origin_millis,
            millis_per_pixel,
            boundaries,
            generation = self.generation,
            "recomputed time axis mapping"
        );

        let change = MappingChange {
            generation: self.generation,
            scale,
            cyclic,
            origin_millis,
            millis_per_pixel,
            total_width,
        };
        for listener in &mut self.listeners {
            trace!(listener = listener.id(), "notify mapping listener");
            listener.on_mapping_changed(&change);
        }
        Ok(())
    }

    /// Current mapping state.
    ///
    /// # Panics
    ///
    /// Panics when no window has been mapped yet.
    #[must_use]
    pub fn mapped_state(&self) -> &MappingState {
        match self.state.as_ref() {
            Some(state) => state,
            None => panic!("time axis has no mapped window; coordinate queries are not allowed"),
        }
    }

    /// Horizontal position of `time`.
    ///
    /// # Panics
    ///
    /// Panics when no window has been mapped yet.
    pub fn time_to_x(&self, time: TimeMillis) -> LayoutResult<Pixel> {
        map_time(self.mapped_state(), time)
    }

    /// Time at the left edge of pixel `x`; the inverse of the linear transform.
    ///
    /// In cyclic mode this resolves to a time inside the first template year.
    ///
    /// # Panics
    ///
    /// Panics when no window has been mapped yet.
    #[must_use]
    pub fn x_to_time(&self, x: Pixel) -> TimeMillis {
        let state = self.mapped_state();
        i64::from(x)
            .saturating_mul(state.millis_per_pixel)
            .saturating_add(state.origin_millis)
    }

    pub fn time_delta_to_x_delta(&self, delta: i64) -> LayoutResult<Pixel> {
        let millis_per_pixel = self.millis_per_pixel();
        Pixel::try_from(delta / millis_per_pixel).map_err(|_| LayoutError::CoordinateOverflow {
            time: delta,
            origin: 0,
            millis_per_pixel,
        })
    }

    #[must_use]
    pub fn x_delta_to_time_delta(&self, delta: Pixel) -> i64 {
        i64::from(delta).saturating_mul(self.millis_per_pixel())
    }

    /// Rounds `time` to the nearest boundary of the current scale unit.
    pub fn snap(&self, time: TimeMillis) -> LayoutResult<TimeMillis> {
        snap_to_unit(time, self.scale)
    }

    /// Full drawable width in pixels; `0` while unmapped.
    pub fn total_width(&self) -> LayoutResult<Pixel> {
        match (self.mapped_window, self.state.as_ref()) {
            (Some(window), Some(state)) => width_for(self.scale, window, state),
            _ => Ok(0),
        }
    }

    /// Unit boundaries covering the pixel range `[x_from, x_to)`.
    ///
    /// Minor lines fall on every boundary of the current scale, major lines on
    /// every boundary of the next larger unit. A boundary shared by both is
    /// reported once, as major. Ranges holding more than [`MAX_GRID_LINES`]
    /// boundaries are rejected with `InvalidData`.
    ///
    /// # Panics
    ///
    /// Panics when no window has been mapped yet.
    pub fn grid_lines(&self, x_from: Pixel, x_to: Pixel) -> LayoutResult<Vec<GridLine>> {
        if x_from > x_to {
            return Err(LayoutError::InvalidData(format!(
                "grid range start {x_from} is after end {x_to}"
            )));
        }

        let start = self.x_to_time(x_from);
        let end = self.x_to_time(x_to);

        let major_times = match self.scale.next_larger() {
            Some(unit) => unit_boundaries(start, end, unit)?,
            None => Vec::new(),
        };
        let minor_times = unit_boundaries(start, end, self.scale)?;

        let mut lines = Vec::with_capacity(minor_times.len() + major_times.len());
        for time in &major_times {
            lines.push(GridLine {
                x: self.time_to_x(*time)?,
                time: *time,
                kind: GridLineKind::Major,
            });
        }
        for time in minor_times {
            if major_times.binary_search(&time).is_ok() {
                continue;
            }
            lines.push(GridLine {
                x: self.time_to_x(time)?,
                time,
                kind: GridLineKind::Minor,
            });
        }
        lines.sort_by_key(|line| (line.time, line.x));
        Ok(lines)
    }
}

fn compute_state(
    scale: ScaleUnit,
    cyclic: bool,
    window: TimeSpan,
) -> LayoutResult<MappingState> {
    let millis_per_pixel = millis_per_pixel_for(scale);

    if cyclic {
        let calendar = CyclicCalendar::build(window)?;
        return Ok(MappingState {
            origin_millis: calendar.origin(),
            millis_per_pixel,
            cyclic: Some(calendar),
        });
    }

    let start_with_margin = window
        .start()
        .checked_sub(END_MARGIN_UNITS * scale.nominal_millis())
        .ok_or(LayoutError::TimeOutOfRange {
            time: window.start(),
        })?;
    Ok(MappingState {
        origin_millis: truncate_to_unit(start_with_margin, scale)?,
        millis_per_pixel,
        cyclic: None,
    })
}

fn map_time(state: &MappingState, time: TimeMillis) -> LayoutResult<Pixel> {
    let overflow = || LayoutError::CoordinateOverflow {
        time,
        origin: state.origin_millis,
        millis_per_pixel: state.millis_per_pixel,
    };

    let offset = match state.cyclic.as_ref() {
        Some(calendar) => calendar.template_offset(time)?,
        None => time.checked_sub(state.origin_millis).ok_or_else(overflow)?,
    };
    Pixel::try_from(offset / state.millis_per_pixel).map_err(|_| overflow())
}

fn width_for(scale: ScaleUnit, window: TimeSpan, state: &MappingState) -> LayoutResult<Pixel> {
    if state.cyclic.is_some() {
        let template = ScaleUnit::Year.nominal_millis() + ScaleUnit::Day.nominal_millis();
        return Pixel::try_from(template / state.millis_per_pixel).map_err(|_| {
            LayoutError::CoordinateOverflow {
                time: template,
                origin: 0,
                millis_per_pixel: state.millis_per_pixel,
            }
        });
    }

    let end_with_margin = window
        .end()
        .checked_add(END_MARGIN_UNITS * scale.nominal_millis())
        .ok_or(LayoutError::TimeOutOfRange { time: window.end() })?;
    map_time(state, end_with_margin)
}

/// Boundaries of `unit` in `[start, end)`.
fn unit_boundaries(
    start: TimeMillis,
    end: TimeMillis,
    unit: ScaleUnit,
) -> LayoutResult<Vec<TimeMillis>> {
    let first = truncate_to_unit(start, unit)?;
    let mut boundaries = Vec::new();
    let mut step = 0;
    loop {
        let boundary = advance_by_units(first, unit, step)?;
        if boundary >= end {
            break;
        }
        if boundary >= start {
            if boundaries.len() == MAX_GRID_LINES {
                return Err(LayoutError::InvalidData(format!(
                    "grid range holds more than {MAX_GRID_LINES} {unit} boundaries"
                )));
            }
            boundaries.push(boundary);
        }
        step += 1;
    }
    Ok(boundaries)
}

/// Registry of mapping listeners.
impl TimeAxisMapper {
    /// Registers a listener with a unique, non-empty id.
    pub fn register_listener(&mut self, listener: Box<dyn MappingListener>) -> LayoutResult<()> {
        let listener_id = listener.id().to_owned();
        if listener_id.is_empty() {
            return Err(LayoutError::InvalidData(
                "listener id must not be empty".to_owned(),
            ));
        }
        if self.has_listener(&listener_id) {
            warn!(listener = %listener_id, "duplicate mapping listener rejected");
            return Err(LayoutError::InvalidData(format!(
                "listener with id `{listener_id}` is already registered"
            )));
        }
        self.listeners.push(listener);
        Ok(())
    }

    /// Unregisters a listener by id. Returns `true` when removed.
    pub fn unregister_listener(&mut self, listener_id: &str) -> bool {
        if let Some(position) = self
            .listeners
            .iter()
            .position(|entry| entry.id() == listener_id)
        {
            self.listeners.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn has_listener(&self, listener_id: &str) -> bool {
        self.listeners
            .iter()
            .any(|listener| listener.id() == listener_id)
    }
}
