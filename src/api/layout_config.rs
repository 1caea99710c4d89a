use serde::{Deserialize, Serialize};

use crate::core::{PlacementConfig, ScaleUnit, TimeSpan};
use crate::error::{LayoutError, LayoutResult};

/// Public layout bootstrap configuration.
///
/// Serializable so hosts can persist the view setup (scale, cyclic mode,
/// row geometry) next to their documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimelineLayoutConfig {
    #[serde(default)]
    pub scale: ScaleUnit,
    #[serde(default)]
    pub cyclic: bool,
    #[serde(default)]
    pub mapped_window: Option<TimeSpan>,
    #[serde(default)]
    pub placement: PlacementConfig,
}

impl TimelineLayoutConfig {
    #[must_use]
    pub fn new(scale: ScaleUnit) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cyclic(mut self, cyclic: bool) -> Self {
        self.cyclic = cyclic;
        self
    }

    #[must_use]
    pub fn with_mapped_window(mut self, window: TimeSpan) -> Self {
        self.mapped_window = Some(window);
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    pub fn validate(self) -> LayoutResult<Self> {
        self.placement.validate()?;
        // Deserialized spans bypass `TimeSpan::new`.
        if let Some(window) = self.mapped_window {
            TimeSpan::new(window.start(), window.end())?;
        }
        Ok(self)
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(self) -> LayoutResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| LayoutError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes and validates config from JSON.
    pub fn from_json_str(input: &str) -> LayoutResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| LayoutError::InvalidData(format!("failed to parse config: {e}")))?;
        config.validate()
    }
}
