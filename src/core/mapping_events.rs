use serde::{Deserialize, Serialize};

use crate::core::scale_unit::ScaleUnit;
use crate::core::types::{Pixel, TimeMillis};

/// Snapshot of a freshly recomputed time/pixel mapping, delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingChange {
    pub generation: u64,
    pub scale: ScaleUnit,
    pub cyclic: bool,
    pub origin_millis: TimeMillis,
    pub millis_per_pixel: i64,
    pub total_width: Pixel,
}

/// Observer notified once per mapping recomputation.
///
/// Geometry caches that depend on the mapping (interval x-positions, grid
/// layers) register one of these and refresh from the delivered change.
pub trait MappingListener {
    fn id(&self) -> &str;
    fn on_mapping_changed(&mut self, change: &MappingChange);
}
