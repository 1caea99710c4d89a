use tracing::{debug, warn};

use crate::core::{
    GridLine, IntervalId, IntervalSet, MappingListener, Pixel, PlacedInterval, PlacementTable,
    Point, ScaleUnit, TimeAxisMapper, TimeSpan,
};
use crate::error::{LayoutError, LayoutResult};

use super::{LayoutSnapshot, TimelineLayoutConfig};

/// Main orchestration facade consumed by host applications.
///
/// `TimelineLayout` owns the time axis mapping, the interval arena and the
/// placement table, and runs the relayout flow whenever the mapping changes:
/// recompute every interval's x geometry, forget the old rows, reassign.
///
/// All state is mutated in place; keep the layout on the rendering thread.
#[derive(Debug)]
pub struct TimelineLayout {
    mapper: TimeAxisMapper,
    intervals: IntervalSet,
    placement: PlacementTable,
}

impl TimelineLayout {
    pub fn new(config: TimelineLayoutConfig) -> LayoutResult<Self> {
        let config = config.validate()?;
        let mut layout = Self {
            mapper: TimeAxisMapper::new(config.scale, config.cyclic),
            intervals: IntervalSet::new(),
            placement: PlacementTable::with_config(config.placement)?,
        };
        layout.set_mapped_window(config.mapped_window)?;
        Ok(layout)
    }

    #[must_use]
    pub fn mapper(&self) -> &TimeAxisMapper {
        &self.mapper
    }

    #[must_use]
    pub fn intervals(&self) -> &IntervalSet {
        &self.intervals
    }

    #[must_use]
    pub fn placement(&self) -> &PlacementTable {
        &self.placement
    }

    #[must_use]
    pub fn scale(&self) -> ScaleUnit {
        self.mapper.scale()
    }

    pub fn set_scale(&mut self, scale: ScaleUnit) -> LayoutResult<()> {
        self.mapper.set_scale(scale)?;
        self.relayout()
    }

    pub fn set_cyclic(&mut self, cyclic: bool) -> LayoutResult<()> {
        self.mapper.set_cyclic(cyclic)?;
        self.relayout()
    }

    pub fn set_mapped_window(&mut self, window: Option<TimeSpan>) -> LayoutResult<()> {
        self.mapper.set_mapped_window(window)?;
        self.relayout()
    }

    /// Sets the mapped window to the cover of every interval plus `extra`
    /// (typically the visible viewport). Returns `true` when it changed.
    pub fn ensure_included(&mut self, extra: TimeSpan) -> LayoutResult<bool> {
        let changed = self
            .mapper
            .ensure_included(self.intervals.document_span(), extra)?;
        if changed {
            self.relayout()?;
        }
        Ok(changed)
    }

    /// Adds or replaces an interval and places it.
    ///
    /// New intervals are placed incrementally; a replacement, or an interval
    /// that grows the mapped window, triggers a full relayout. When the span
    /// cannot be mapped the arena is restored and the layout is unchanged.
    pub fn insert_interval(&mut self, id: IntervalId, span: TimeSpan) -> LayoutResult<()> {
        let previous = self.intervals.insert(id, span);
        let extra = self.mapper.mapped_window().unwrap_or(span);
        let grown = match self
            .mapper
            .ensure_included(self.intervals.document_span(), extra)
        {
            Ok(grown) => grown,
            Err(err) => {
                warn!(id = %id, error = %err, "interval rejected: span cannot be mapped");
                self.restore_interval(id, previous);
                return Err(err);
            }
        };

        if previous.is_some() || grown {
            self.relayout()
        } else {
            self.place_pending().map(|_| ())
        }
    }

    fn restore_interval(&mut self, id: IntervalId, previous: Option<PlacedInterval>) {
        match previous {
            Some(interval) => {
                self.intervals.insert_placed(interval);
            }
            None => {
                self.intervals.remove(id);
            }
        }
    }

    /// Removes an interval and relayouts the remainder.
    pub fn remove_interval(&mut self, id: IntervalId) -> LayoutResult<Option<PlacedInterval>> {
        let removed = self.intervals.remove(id);
        if removed.is_some() {
            self.relayout()?;
        }
        Ok(removed)
    }

    /// Recomputes all geometry and reassigns every interval from scratch.
    ///
    /// If any geometry cannot be computed the existing levels are kept.
    pub fn relayout(&mut self) -> LayoutResult<()> {
        if !self.mapper.is_mapped() {
            self.placement.forget_placements();
            for interval in self.intervals.iter_mut() {
                interval.level = None;
                interval.y = None;
            }
            debug!(intervals = self.intervals.len(), "relayout skipped: axis unmapped");
            return Ok(());
        }

        self.intervals.recompute_geometry(&self.mapper)?;
        self.placement.forget_placements();
        self.placement.assign(self.intervals.iter_mut());
        Ok(())
    }

    /// Places intervals not yet in the table without disturbing the rest.
    /// Returns the number of newly placed intervals.
    pub fn place_pending(&mut self) -> LayoutResult<usize> {
        if !self.mapper.is_mapped() {
            warn!("place_pending ignored: axis unmapped");
            return Ok(0);
        }

        for interval in self.intervals.iter_mut() {
            if !self.placement.is_placed(interval) {
                interval.update_geometry(&self.mapper)?;
            }
        }
        Ok(self.placement.assign(self.intervals.iter_mut()))
    }

    /// The interval under `point`, if any. Always `None` while unmapped.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<&PlacedInterval> {
        if !self.mapper.is_mapped() {
            return None;
        }
        self.placement
            .hit_test(point)
            .and_then(|id| self.intervals.get(id))
    }

    pub fn level_of(&self, id: IntervalId) -> LayoutResult<usize> {
        let interval = self.intervals.get(id).ok_or(LayoutError::NotFound { id })?;
        if !self.mapper.is_mapped() {
            return Err(LayoutError::NotFound { id });
        }
        self.placement.level_of(interval)
    }

    pub fn total_width(&self) -> LayoutResult<Pixel> {
        self.mapper.total_width()
    }

    #[must_use]
    pub fn total_height(&self) -> Pixel {
        self.placement.max_y_used()
    }

    pub fn grid_lines(&self, x_from: Pixel, x_to: Pixel) -> LayoutResult<Vec<GridLine>> {
        if !self.mapper.is_mapped() {
            return Ok(Vec::new());
        }
        self.mapper.grid_lines(x_from, x_to)
    }

    pub fn register_listener(&mut self, listener: Box<dyn MappingListener>) -> LayoutResult<()> {
        self.mapper.register_listener(listener)
    }

    pub fn unregister_listener(&mut self, listener_id: &str) -> bool {
        self.mapper.unregister_listener(listener_id)
    }

    pub fn snapshot(&self) -> LayoutResult<LayoutSnapshot> {
        Ok(LayoutSnapshot {
            scale: self.mapper.scale(),
            cyclic: self.mapper.is_cyclic(),
            mapped_window: self.mapper.mapped_window(),
            origin_millis: self.mapper.state().map(|state| state.origin_millis),
            millis_per_pixel: self.mapper.millis_per_pixel(),
            generation: self.mapper.generation(),
            total_width: self.total_width()?,
            total_height: self.total_height(),
            levels: self
                .placement
                .levels()
                .iter()
                .map(|level| level.entries().iter().map(|entry| entry.id).collect())
                .collect(),
            intervals: self.intervals.iter().copied().collect(),
        })
    }

    pub fn snapshot_json_pretty(&self) -> LayoutResult<String> {
        self.snapshot()?.to_json_pretty()
    }
}
