//! Circuit data types
//!
//! A [`Circuit`] owns its [`Layer`]s, a layer owns its [`Module`]s and the
//! traces running between modules, and a module owns its [`Component`]s and
//! the traces between them. Cross references ([`ConnectionNode::reference`])
//! are lookups by key, never shared ownership.
//!
//! Every map is an [`IndexMap`] so iteration follows insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::traces::Traces;
use crate::core::{EditorConfig, EditorError};
use crate::geometry::{is_sideways, Position};

/// Component refs starting with this prefix are module-boundary pads.
pub const PAD_PREFIX: &str = "PAD";

/// Which pin of the referenced entity a trace end is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pin {
    /// 1-based pin index on a component.
    Index(u32),
    /// Ref of a pad component, used when the node references a module.
    Pad(String),
}

impl Pin {
    pub fn as_index(&self) -> Option<u32> {
        match self {
            Pin::Index(i) => Some(*i),
            Pin::Pad(_) => None,
        }
    }

    pub fn as_pad(&self) -> Option<&str> {
        match self {
            Pin::Pad(p) => Some(p),
            Pin::Index(_) => None,
        }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pin::Index(i) => write!(f, "{}", i),
            Pin::Pad(p) => write!(f, "{}", p),
        }
    }
}

impl From<u32> for Pin {
    fn from(i: u32) -> Self {
        Pin::Index(i)
    }
}

impl From<&str> for Pin {
    fn from(p: &str) -> Self {
        Pin::Pad(p.to_string())
    }
}

/// One end of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionNode {
    #[serde(rename = "ref")]
    pub reference: String,
    pub pin: Pin,
    /// Cached position in the frame of the trace's container.
    pub pos: Position,
}

impl ConnectionNode {
    pub fn new(reference: impl Into<String>, pin: impl Into<Pin>, pos: Position) -> Self {
        Self {
            reference: reference.into(),
            pin: pin.into(),
            pos,
        }
    }

    /// True when this node is `reference` at `pin`.
    pub fn is(&self, reference: &str, pin: &Pin) -> bool {
        self.reference == reference && &self.pin == pin
    }
}

/// Which end of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    A,
    B,
}

/// An electrical connection between two pins.
///
/// `points` is the optional bend path. When non-empty it starts or ends
/// exactly at one endpoint's position; the renderer draws the remaining
/// straight stub to the other endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "ref")]
    pub reference: String,
    pub a: ConnectionNode,
    pub b: ConnectionNode,
    #[serde(default)]
    pub points: Vec<Position>,
}

impl Trace {
    /// Straight trace keyed by [`trace_ref`].
    pub fn new(a: ConnectionNode, b: ConnectionNode) -> Self {
        Self {
            reference: trace_ref(&a, &b),
            a,
            b,
            points: Vec::new(),
        }
    }

    pub fn touches(&self, reference: &str) -> bool {
        self.a.reference == reference || self.b.reference == reference
    }

    pub fn end(&self, end: End) -> &ConnectionNode {
        match end {
            End::A => &self.a,
            End::B => &self.b,
        }
    }

    pub fn end_mut(&mut self, end: End) -> &mut ConnectionNode {
        match end {
            End::A => &mut self.a,
            End::B => &mut self.b,
        }
    }

    /// Ends attached to `reference`.
    pub fn ends_of(&self, reference: &str) -> Vec<End> {
        [End::A, End::B]
            .into_iter()
            .filter(|&e| self.end(e).reference == reference)
            .collect()
    }

    /// Move one endpoint, dragging the bend point that coincides with it.
    pub fn relocate(&mut self, end: End, pos: Position) {
        let old = self.end(end).pos;
        self.end_mut(end).pos = pos;
        if self.points.first() == Some(&old) {
            self.points[0] = pos;
        } else if self.points.last() == Some(&old) {
            let last = self.points.len() - 1;
            self.points[last] = pos;
        }
    }
}

/// Key of a trace: `"{a.ref}-{a.pin}-{b.ref}-{b.pin}"`.
pub fn trace_ref(a: &ConnectionNode, b: &ConnectionNode) -> String {
    format!("{}-{}-{}-{}", a.reference, a.pin, b.reference, b.pin)
}

/// A part footprint or pad inside a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "ref")]
    pub reference: String,
    /// Module-local position.
    pub pos: Position,
    /// Size at angle 0.
    pub width: f64,
    pub height: f64,
    /// Free-running multiple of 90; reduce before comparing.
    #[serde(default)]
    pub angle: i32,
    /// Offsets of each pin from `pos`, rotated together with `angle`.
    #[serde(default)]
    pub pin_coords: Vec<Position>,
    #[serde(default)]
    pub is_pad: bool,
}

impl Component {
    pub fn new(reference: impl Into<String>, width: f64, height: f64) -> Self {
        let reference = reference.into();
        let is_pad = reference.starts_with(PAD_PREFIX);
        Self {
            reference,
            pos: Position::ORIGIN,
            width,
            height,
            angle: 0,
            pin_coords: Vec::new(),
            is_pad,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.pos = Position::new(x, y);
        self
    }

    pub fn with_pin(mut self, x: f64, y: f64) -> Self {
        self.pin_coords.push(Position::new(x, y));
        self
    }

    pub fn is_pad(&self) -> bool {
        self.is_pad || self.reference.starts_with(PAD_PREFIX)
    }

    /// Width and height as currently drawn, swapped when sideways.
    pub fn footprint_size(&self) -> (f64, f64) {
        if is_sideways(self.angle) {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Offset of a 1-based pin from the component position.
    pub fn pin_offset(&self, pin: u32) -> Result<Position, EditorError> {
        pin.checked_sub(1)
            .and_then(|i| self.pin_coords.get(i as usize))
            .copied()
            .ok_or_else(|| EditorError::PinOutOfRange {
                component: self.reference.clone(),
                pin,
                count: self.pin_coords.len(),
            })
    }

    /// Module-local position of a 1-based pin.
    pub fn pin_position(&self, pin: u32) -> Result<Position, EditorError> {
        Ok(self.pos + self.pin_offset(pin)?)
    }
}

/// A cluster of components with its own placement circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(rename = "ref")]
    pub reference: String,
    /// Layer-local position of the centre.
    pub pos: Position,
    #[serde(default)]
    pub angle: i32,
    /// Pad placement circle and hit-test radius.
    pub radius: f64,
    #[serde(default)]
    pub components: IndexMap<String, Component>,
    /// Traces with both ends inside this module.
    #[serde(default)]
    pub connections: Traces,
}

impl Module {
    pub fn new(reference: impl Into<String>, radius: f64) -> Self {
        Self {
            reference: reference.into(),
            pos: Position::ORIGIN,
            angle: 0,
            radius,
            components: IndexMap::new(),
            connections: Traces::default(),
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.pos = Position::new(x, y);
        self
    }

    pub fn add_component(&mut self, component: Component) {
        self.components
            .insert(component.reference.clone(), component);
    }

    pub fn component(&self, reference: &str) -> Result<&Component, EditorError> {
        self.components
            .get(reference)
            .ok_or_else(|| self.unknown_component(reference))
    }

    pub fn component_mut(&mut self, reference: &str) -> Result<&mut Component, EditorError> {
        if !self.components.contains_key(reference) {
            return Err(self.unknown_component(reference));
        }
        Ok(&mut self.components[reference])
    }

    fn unknown_component(&self, reference: &str) -> EditorError {
        EditorError::UnknownComponent {
            module: self.reference.clone(),
            component: reference.to_string(),
        }
    }

    /// Scale applied when the module is drawn focused on the canvas.
    pub fn zoom_scale(&self, config: &EditorConfig) -> f64 {
        config.zoom_span / (self.radius + config.zoom_padding)
    }

    pub fn pads(&self) -> impl Iterator<Item = &Component> {
        self.components.values().filter(|c| c.is_pad())
    }

    pub fn parts(&self) -> impl Iterator<Item = &Component> {
        self.components.values().filter(|c| !c.is_pad())
    }
}

/// Modules plus the traces routed between them through pads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub modules: IndexMap<String, Module>,
    /// Traces whose ends are module refs with pad pins.
    #[serde(default)]
    pub connections: Traces,
}

impl Layer {
    pub fn add_module(&mut self, module: Module) {
        self.modules.insert(module.reference.clone(), module);
    }

    pub fn module(&self, layer: &str, reference: &str) -> Result<&Module, EditorError> {
        self.modules
            .get(reference)
            .ok_or_else(|| unknown_module(layer, reference))
    }

    pub fn module_mut(&mut self, layer: &str, reference: &str) -> Result<&mut Module, EditorError> {
        self.modules
            .get_mut(reference)
            .ok_or_else(|| unknown_module(layer, reference))
    }
}

fn unknown_module(layer: &str, module: &str) -> EditorError {
    EditorError::UnknownModule {
        layer: layer.to_string(),
        module: module.to_string(),
    }
}

/// The whole editable design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    #[serde(default)]
    pub layers: IndexMap<String, Layer>,
    /// Rendering data keyed by component ref, opaque to the editor.
    #[serde(default)]
    pub footprints: IndexMap<String, serde_json::Value>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, reference: impl Into<String>, layer: Layer) {
        self.layers.insert(reference.into(), layer);
    }

    pub fn layer(&self, reference: &str) -> Result<&Layer, EditorError> {
        self.layers
            .get(reference)
            .ok_or_else(|| EditorError::UnknownLayer(reference.to_string()))
    }

    pub fn layer_mut(&mut self, reference: &str) -> Result<&mut Layer, EditorError> {
        self.layers
            .get_mut(reference)
            .ok_or_else(|| EditorError::UnknownLayer(reference.to_string()))
    }

    pub fn module(&self, layer: &str, module: &str) -> Result<&Module, EditorError> {
        self.layer(layer)?.module(layer, module)
    }

    pub fn module_mut(&mut self, layer: &str, module: &str) -> Result<&mut Module, EditorError> {
        self.layer_mut(layer)?.module_mut(layer, module)
    }

    pub fn from_json(raw: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, EditorError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), EditorError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
