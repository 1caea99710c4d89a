use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::time_axis::TimeAxisMapper;
use crate::core::types::{Pixel, TimeSpan};
use crate::error::LayoutResult;

/// Narrowest body the mapper hands out, so instants stay clickable.
pub const MIN_BODY_WIDTH: Pixel = 4;

/// Host-chosen identifier of an interval object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntervalId(pub u64);

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A displayed time range together with the geometry the engine computed
/// for it.
///
/// `x_start`/`width` come from the time axis mapping; `level`/`y` are written
/// by the placement table and stay `None` until the interval is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedInterval {
    pub id: IntervalId,
    pub span: TimeSpan,
    pub x_start: Pixel,
    pub width: Pixel,
    pub level: Option<usize>,
    pub y: Option<Pixel>,
}

impl PlacedInterval {
    #[must_use]
    pub fn new(id: IntervalId, span: TimeSpan) -> Self {
        Self::with_geometry(id, span, 0, 0)
    }

    #[must_use]
    pub fn with_geometry(id: IntervalId, span: TimeSpan, x_start: Pixel, width: Pixel) -> Self {
        Self {
            id,
            span,
            x_start,
            width,
            level: None,
            y: None,
        }
    }

    #[must_use]
    pub fn x_end(&self) -> Pixel {
        self.x_start.saturating_add(self.width)
    }

    /// Recomputes `x_start` and `width` from the current mapping.
    ///
    /// In cyclic mode an interval that wraps past the end of the template
    /// year runs to the right edge of the axis. Bodies are never narrower
    /// than [`MIN_BODY_WIDTH`].
    pub fn update_geometry(&mut self, mapper: &TimeAxisMapper) -> LayoutResult<()> {
        (self.x_start, self.width) = self.geometry(mapper)?;
        Ok(())
    }

    fn geometry(&self, mapper: &TimeAxisMapper) -> LayoutResult<(Pixel, Pixel)> {
        let x_start = mapper.time_to_x(self.span.start())?;
        let x_end = mapper.time_to_x(self.span.end())?;
        let x_end = if x_end < x_start && mapper.is_cyclic() {
            mapper.total_width()?.max(x_start)
        } else {
            x_end.max(x_start)
        };
        Ok((x_start, (x_end - x_start).max(MIN_BODY_WIDTH)))
    }
}

/// Host-owned arena of interval objects in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalSet {
    items: IndexMap<IntervalId, PlacedInterval>,
}

impl IntervalSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an interval. A replaced interval loses its placement.
    pub fn insert(&mut self, id: IntervalId, span: TimeSpan) -> Option<PlacedInterval> {
        self.items.insert(id, PlacedInterval::new(id, span))
    }

    pub fn insert_placed(&mut self, interval: PlacedInterval) -> Option<PlacedInterval> {
        self.items.insert(interval.id, interval)
    }

    pub fn remove(&mut self, id: IntervalId) -> Option<PlacedInterval> {
        self.items.shift_remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: IntervalId) -> Option<&PlacedInterval> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: IntervalId) -> Option<&mut PlacedInterval> {
        self.items.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: IntervalId) -> bool {
        self.items.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedInterval> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlacedInterval> {
        self.items.values_mut()
    }

    /// Recomputes every interval's geometry. On error nothing is changed.
    pub fn recompute_geometry(&mut self, mapper: &TimeAxisMapper) -> LayoutResult<()> {
        let geometry = self
            .items
            .values()
            .map(|interval| interval.geometry(mapper))
            .collect::<LayoutResult<Vec<_>>>()?;
        for (interval, (x_start, width)) in self.items.values_mut().zip(geometry) {
            interval.x_start = x_start;
            interval.width = width;
        }
        Ok(())
    }

    /// Smallest span covering every interval, or `None` when empty.
    #[must_use]
    pub fn document_span(&self) -> Option<TimeSpan> {
        self.items
            .values()
            .map(|interval| interval.span)
            .reduce(TimeSpan::cover)
    }
}
