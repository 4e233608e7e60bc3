//! Wire messages exchanged with the external layout service.
//!
//! Every frame is a JSON object whose `label` field names the variant.

use serde::{Deserialize, Serialize};

use super::LayoutError;
use crate::model::Circuit;

/// Client to service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum LayoutRequest {
    /// The netlist to lay out, passed through untouched.
    Netlist { data: serde_json::Value },
    WithStretchification { stretchification: f64, depth: f64 },
}

impl LayoutRequest {
    pub fn encode(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(frame: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(frame)?)
    }
}

/// Force-directed placement knobs as the user enters them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    pub stretchification: f64,
    /// User-facing depth; the service expects a tenth of it.
    pub depth: f64,
}

impl LayoutSettings {
    pub fn request(&self) -> LayoutRequest {
        LayoutRequest::WithStretchification {
            stretchification: self.stretchification,
            depth: self.depth / 10.0,
        }
    }
}

/// Service to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum LayoutMessage {
    /// Rendered SVG document.
    Svg { file: String },
    /// Plain-text processing log.
    Processing { file: String },
    Message { message: String },
    Paths {
        nodes: Vec<serde_json::Value>,
        points: Vec<PhysicalNode>,
    },
    /// A freshly laid-out circuit replacing the current one.
    Graph { circuit: Circuit },
}

impl LayoutMessage {
    pub fn encode(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Unknown labels are errors.
    pub fn decode(frame: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(frame)?)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LayoutMessage::Svg { .. } => "svg",
            LayoutMessage::Processing { .. } => "processing",
            LayoutMessage::Message { .. } => "message",
            LayoutMessage::Paths { .. } => "paths",
            LayoutMessage::Graph { .. } => "graph",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub mag: f64,
}

/// A body of the force-directed simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalNode {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub acc: Motion,
    #[serde(default)]
    pub vel: Motion,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub footprint: String,
}
