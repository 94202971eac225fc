//! Editor-wide layout settings.

use crate::layout::Surface;
use serde::{Deserialize, Serialize};

/// Configuration shared by the hierarchy, the compositor and the
/// manipulation controller.
///
/// Every field has a default, so a partial JSON document such as
/// `{"surface": {"width": 1280, "height": 720}}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Design surface that top-level widgets are laid out against. Default: **800×600**.
    pub surface: Surface,

    /// Smallest width/height a resize gesture may produce. Default: **20**.
    pub min_widget_size: f32,

    /// Distance from an edge or corner within which a pointer grabs a
    /// resize handle. Default: **8**.
    pub handle_size: f32,

    /// Extra opacity multiplier for hidden widgets in the editor preview.
    /// Never written back to the model. Default: **0.3**.
    pub hidden_opacity_factor: f32,

    /// Keep dragged widgets fully inside the design surface. Default: **true**.
    pub clamp_drag_to_surface: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            surface: Surface::default(),
            min_widget_size: 20.0,
            handle_size: 8.0,
            hidden_opacity_factor: 0.3,
            clamp_drag_to_surface: true,
        }
    }
}

impl LayoutConfig {
    /// Parse a config from JSON, falling back to defaults for missing keys.
    ///
    /// # Errors
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
