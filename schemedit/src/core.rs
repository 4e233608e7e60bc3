//! Errors and configuration shared by every editing operation.
//! No rendering or UI state dependencies.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::edit::pads::PadSlots;
use crate::geometry::Position;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),
    #[error("Unknown module {module} on layer {layer}")]
    UnknownModule { layer: String, module: String },
    #[error("Unknown component {component} in module {module}")]
    UnknownComponent { module: String, component: String },
    #[error("Unknown trace: {0}")]
    UnknownTrace(String),
    #[error("Pin {pin} out of range for component {component} ({count} pins)")]
    PinOutOfRange {
        component: String,
        pin: u32,
        count: usize,
    },
    #[error("Trying to merge 0 modules")]
    EmptyMerge,
    #[error("Merged module ref {0} collides with an existing module")]
    RefCollision(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Numeric constants of the editor's coordinate frames.
///
/// Defaults reproduce the 500x500 canvas the editor was designed against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas point a focused (zoomed) module is centred on.
    pub canvas_center: Position,
    /// Zoom scale is `zoom_span / (radius + zoom_padding)`.
    pub zoom_span: f64,
    pub zoom_padding: f64,
    /// Side of the square hit box around each pin.
    pub pin_hit_size: f64,
    /// Merged components are laid out on a ring of `ratio * radius`.
    pub merge_ring_ratio: f64,
    pub pad_slots: PadSlots,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_center: Position::new(250.0, 250.0),
            zoom_span: 200.0,
            zoom_padding: 10.0,
            pin_hit_size: 8.0,
            merge_ring_ratio: 0.5,
            pad_slots: PadSlots::default(),
        }
    }
}

impl EditorConfig {
    /// Load a JSON config file. Fields not present keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self, EditorError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
