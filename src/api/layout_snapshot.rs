use serde::{Deserialize, Serialize};

use crate::core::{IntervalId, PlacedInterval, Pixel, ScaleUnit, TimeMillis, TimeSpan};
use crate::error::{LayoutError, LayoutResult};

/// Serializable deterministic layout state used by regression tests and
/// debugging tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub scale: ScaleUnit,
    pub cyclic: bool,
    pub mapped_window: Option<TimeSpan>,
    pub origin_millis: Option<TimeMillis>,
    pub millis_per_pixel: i64,
    pub generation: u64,
    pub total_width: Pixel,
    pub total_height: Pixel,
    /// Interval ids per level, top to bottom, each sorted by x.
    pub levels: Vec<Vec<IntervalId>>,
    pub intervals: Vec<PlacedInterval>,
}

impl LayoutSnapshot {
    pub fn to_json_pretty(&self) -> LayoutResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LayoutError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }

    pub fn from_json_str(input: &str) -> LayoutResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| LayoutError::InvalidData(format!("failed to parse snapshot: {e}")))
    }
}
