//! Packing of intervals into non-overlapping horizontal levels.
//!
//! Intervals are tried longest-first and dropped into the first level, top
//! to bottom, where they do not collide with a neighbour. Each level keeps its
//! entries sorted by `x_start`, so both the collision check and hit testing
//! are a binary search plus a look at the adjacent entries.
//!
//! Touching counts as colliding: an entry ending at `x` blocks another
//! starting at `x`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::interval::{IntervalId, PlacedInterval};
use crate::core::types::{Pixel, Point};
use crate::error::{LayoutError, LayoutResult};

pub const LEVEL_SPACING: Pixel = 25;
pub const TOP_MARGIN: Pixel = 10;
pub const BODY_HEIGHT: Pixel = 15;

/// Vertical layout parameters for the level rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub level_spacing: Pixel,
    pub top_margin: Pixel,
    pub body_height: Pixel,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            level_spacing: LEVEL_SPACING,
            top_margin: TOP_MARGIN,
            body_height: BODY_HEIGHT,
        }
    }
}

impl PlacementConfig {
    pub fn validate(self) -> LayoutResult<Self> {
        if self.level_spacing <= 0 {
            return Err(LayoutError::InvalidData(
                "placement level_spacing must be > 0".to_owned(),
            ));
        }
        if self.top_margin < 0 {
            return Err(LayoutError::InvalidData(
                "placement top_margin must be >= 0".to_owned(),
            ));
        }
        if self.body_height <= 0 || self.body_height > self.level_spacing {
            return Err(LayoutError::InvalidData(
                "placement body_height must be > 0 and <= level_spacing".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Horizontal extent of a placed interval as recorded in its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub id: IntervalId,
    pub x_start: Pixel,
    pub width: Pixel,
}

impl LevelEntry {
    #[must_use]
    pub fn x_end(&self) -> Pixel {
        self.x_start.saturating_add(self.width)
    }

    #[must_use]
    pub fn contains_x(&self, x: Pixel) -> bool {
        self.x_start <= x && x <= self.x_end()
    }
}

impl From<&PlacedInterval> for LevelEntry {
    fn from(interval: &PlacedInterval) -> Self {
        Self {
            id: interval.id,
            x_start: interval.x_start,
            width: interval.width,
        }
    }
}

/// One row of the display. Entries are sorted by `x_start` and no two
/// consecutive entries collide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    entries: SmallVec<[LevelEntry; 8]>,
}

impl Level {
    #[must_use]
    pub fn entries(&self) -> &[LevelEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insertion index for `candidate`, or `None` when it collides with an
    /// existing entry.
    #[must_use]
    pub fn free_slot(&self, candidate: &LevelEntry) -> Option<usize> {
        let insertion_point = match self
            .entries
            .binary_search_by_key(&candidate.x_start, |entry| entry.x_start)
        {
            Ok(_) => return None,
            Err(point) => point,
        };

        if insertion_point > 0 && self.entries[insertion_point - 1].x_end() >= candidate.x_start {
            return None;
        }
        if let Some(after) = self.entries.get(insertion_point) {
            if after.x_start <= candidate.x_end() {
                return None;
            }
        }
        Some(insertion_point)
    }

    /// Entry whose closed x-range contains `x`.
    #[must_use]
    pub fn entry_at_x(&self, x: Pixel) -> Option<&LevelEntry> {
        match self.entries.binary_search_by_key(&x, |entry| entry.x_start) {
            Ok(index) => self.entries.get(index),
            Err(0) => None,
            Err(insertion_point) => {
                let before = &self.entries[insertion_point - 1];
                before.contains_x(x).then_some(before)
            }
        }
    }

    fn contains_id(&self, id: IntervalId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    fn holds(&self, id: IntervalId, x_start: Pixel) -> bool {
        self.entries
            .binary_search_by_key(&x_start, |entry| entry.x_start)
            .is_ok_and(|index| self.entries[index].id == id)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Greedy interval placer: the ordered stack of levels, top to bottom.
///
/// Mutated in place by the host on the rendering thread; it carries no
/// synchronization of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementTable {
    config: PlacementConfig,
    levels: Vec<Level>,
    assigned: bool,
}

impl Default for PlacementTable {
    fn default() -> Self {
        Self {
            config: PlacementConfig::default(),
            levels: Vec::new(),
            assigned: false,
        }
    }
}

impl PlacementTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PlacementConfig) -> LayoutResult<Self> {
        Ok(Self {
            config: config.validate()?,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn config(&self) -> PlacementConfig {
        self.config
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Places every interval and writes its level and y-position back.
    ///
    /// Intervals are processed by descending duration so long-running
    /// intervals settle in the upper levels. Intervals already present in
    /// the table are left where they are. Returns the number placed.
    pub fn assign<'a, I>(&mut self, intervals: I) -> usize
    where
        I: IntoIterator<Item = &'a mut PlacedInterval>,
    {
        let mut pending: Vec<&'a mut PlacedInterval> = intervals.into_iter().collect();
        pending.sort_by(|a, b| b.span.duration().cmp(&a.span.duration()));

        let mut placed = 0;
        for interval in pending {
            if self.is_placed(interval) {
                trace!(id = %interval.id, "interval already placed; skipping");
                continue;
            }
            let level = self.place(LevelEntry::from(&*interval));
            interval.level = Some(level);
            interval.y = Some(self.level_to_y(level));
            placed += 1;
        }

        self.assigned = true;
        debug!(placed, levels = self.levels.len(), "assigned intervals to levels");
        placed
    }

    fn place(&mut self, entry: LevelEntry) -> usize {
        for (index, level) in self.levels.iter_mut().enumerate() {
            if let Some(slot) = level.free_slot(&entry) {
                level.entries.insert(slot, entry);
                return index;
            }
        }

        let mut level = Level::default();
        level.entries.push(entry);
        self.levels.push(level);
        self.levels.len() - 1
    }

    /// Empties every level but keeps the level slots, so an immediate
    /// re-assignment does not make the drawing surface shrink and regrow.
    pub fn forget_placements(&mut self) {
        for level in &mut self.levels {
            level.clear();
        }
        debug!(levels = self.levels.len(), "forgot level assignments");
    }

    /// Whether `interval` currently sits in the level it records.
    #[must_use]
    pub fn is_placed(&self, interval: &PlacedInterval) -> bool {
        interval
            .level
            .and_then(|index| self.levels.get(index))
            .is_some_and(|level| level.contains_id(interval.id))
    }

    #[must_use]
    pub fn level_to_y(&self, level: usize) -> Pixel {
        let level = Pixel::try_from(level).unwrap_or(Pixel::MAX);
        self.config
            .top_margin
            .saturating_add(level.saturating_mul(self.config.level_spacing))
    }

    /// Level whose body covers `y`; `None` in the top margin, in the gap
    /// between bodies, or below the last level.
    #[must_use]
    pub fn y_to_level(&self, y: Pixel) -> Option<usize> {
        let normalized = y.checked_sub(self.config.top_margin)?;
        if normalized < 0 {
            return None;
        }
        let level = normalized / self.config.level_spacing;
        if normalized - level * self.config.level_spacing > self.config.body_height {
            return None;
        }
        let level = usize::try_from(level).ok()?;
        (level < self.levels.len()).then_some(level)
    }

    /// Height of the drawing surface used by the current levels.
    #[must_use]
    pub fn max_y_used(&self) -> Pixel {
        self.level_to_y(self.levels.len())
    }

    /// Index of the level holding `interval`, located by its `x_start`.
    ///
    /// # Panics
    ///
    /// Panics when called before any `assign`.
    pub fn level_of(&self, interval: &PlacedInterval) -> LayoutResult<usize> {
        assert!(
            self.assigned,
            "level_of called before any intervals were assigned"
        );
        self.levels
            .iter()
            .position(|level| level.holds(interval.id, interval.x_start))
            .ok_or(LayoutError::NotFound { id: interval.id })
    }

    /// The interval whose body contains `point`, if any.
    ///
    /// # Panics
    ///
    /// Panics when called before any `assign`.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<IntervalId> {
        assert!(
            self.assigned,
            "hit_test called before any intervals were assigned"
        );
        let level = self.y_to_level(point.y)?;
        self.levels[level].entry_at_x(point.x).map(|entry| entry.id)
    }
}
