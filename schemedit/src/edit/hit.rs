//! Hit-testing: which module, component or pin is under the pointer.
//!
//! Pointers arrive in canvas coordinates. Unfocused, a module is drawn at its
//! layer position at scale 1; focused (zoomed in) it is centred on the canvas
//! and scaled by [`Module::zoom_scale`]. Every lookup reports a miss as `None`.

use crate::core::EditorConfig;
use crate::geometry::Position;
use crate::model::{Layer, Module};

/// Canvas transform of a module's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub scale: f64,
    pub origin: Position,
}

impl Frame {
    pub fn of(module: &Module, zoomed: bool, config: &EditorConfig) -> Self {
        if zoomed {
            Self {
                scale: module.zoom_scale(config),
                origin: config.canvas_center,
            }
        } else {
            Self {
                scale: 1.0,
                origin: module.pos,
            }
        }
    }

    pub fn to_canvas(&self, local: Position) -> Position {
        local * self.scale + self.origin
    }

    pub fn to_local(&self, canvas: Position) -> Position {
        (canvas - self.origin) / self.scale
    }
}

/// Pointer in the focused module's local frame; unchanged with no module.
pub fn canvas_to_module(pointer: Position, module: Option<&Module>, config: &EditorConfig) -> Position {
    match module {
        Some(m) => Frame::of(m, true, config).to_local(pointer),
        None => pointer,
    }
}

/// First module, in insertion order, whose centre is strictly closer than
/// its radius.
pub fn locate_module(pointer: Position, layer: Option<&Layer>) -> Option<&str> {
    layer?
        .modules
        .values()
        .find(|m| pointer.distance_to(&m.pos) < m.radius)
        .map(|m| m.reference.as_str())
}

/// First component whose drawn box contains the pointer.
pub fn locate_component<'a>(
    pointer: Position,
    module: Option<&'a Module>,
    zoomed: bool,
    config: &EditorConfig,
) -> Option<&'a str> {
    let module = module?;
    let frame = Frame::of(module, zoomed, config);
    module
        .components
        .values()
        .find(|c| {
            let (width, height) = c.footprint_size();
            contains(frame, c.pos, width, height, pointer)
        })
        .map(|c| c.reference.as_str())
}

/// 1-based index of the first pin of `component` under the pointer.
pub fn locate_pin(
    pointer: Position,
    component: Option<&str>,
    module: Option<&Module>,
    zoomed: bool,
    config: &EditorConfig,
) -> Option<u32> {
    let module = module?;
    let component = module.components.get(component?)?;
    let frame = Frame::of(module, zoomed, config);
    let size = config.pin_hit_size;
    component
        .pin_coords
        .iter()
        .position(|&coord| contains(frame, component.pos + coord, size, size, pointer))
        .map(|i| i as u32 + 1)
}

fn contains(frame: Frame, center: Position, width: f64, height: f64, pointer: Position) -> bool {
    let delta = pointer - frame.to_canvas(center);
    delta.x.abs() < width * frame.scale / 2.0 && delta.y.abs() < height * frame.scale / 2.0
}
