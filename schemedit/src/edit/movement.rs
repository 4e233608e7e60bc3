//! Dragging modules and components.
//!
//! Both operations mutate the circuit in place and re-derive the cached
//! endpoint positions of every trace attached to what moved.

use crate::core::{EditorConfig, EditorError};
use crate::edit::hit::Frame;
use crate::edit::pads::snap_pad_offset;
use crate::geometry::Position;
use crate::model::{Circuit, Layer, Module, Pin};

/// Move a module to `to` (layer frame).
///
/// Inter-module trace ends on this module keep their offset from the module
/// centre. Traces inside the module are module-local and do not change.
pub fn move_module(
    circuit: &mut Circuit,
    layer_ref: &str,
    module_ref: &str,
    to: Position,
) -> Result<(), EditorError> {
    let layer = circuit.layer_mut(layer_ref)?;
    let from = layer.module(layer_ref, module_ref)?.pos;

    for trace in layer.connections.touching_mut(module_ref) {
        for end in trace.ends_of(module_ref) {
            let pos = to + (trace.end(end).pos - from);
            trace.relocate(end, pos);
        }
    }

    layer.module_mut(layer_ref, module_ref)?.pos = to;
    Ok(())
}

/// Drag a component of a focused module to the canvas `pointer`.
///
/// Pads snap to a rim slot instead of following the pointer, and also carry
/// the inter-module traces that leave the module through them.
pub fn move_component(
    circuit: &mut Circuit,
    layer_ref: &str,
    module_ref: &str,
    component_ref: &str,
    pointer: Position,
    config: &EditorConfig,
) -> Result<Position, EditorError> {
    let Layer {
        modules,
        connections: layer_traces,
    } = circuit.layer_mut(layer_ref)?;
    let module = modules
        .get_mut(module_ref)
        .ok_or_else(|| EditorError::UnknownModule {
            layer: layer_ref.to_string(),
            module: module_ref.to_string(),
        })?;

    let offset = Frame::of(module, true, config).to_local(pointer);
    let component = module.component(component_ref)?;
    let is_pad = component.is_pad();
    let pos = if is_pad {
        snap_pad_offset(offset, module.radius, module.angle, &config.pad_slots)
    } else {
        offset
    };

    place_component(module, component_ref, pos)?;

    if is_pad {
        let module_pos = module.pos;
        let pad = Pin::Pad(component_ref.to_string());
        for trace in layer_traces.touching_mut(module_ref) {
            for end in trace.ends_of(module_ref) {
                if trace.end(end).pin == pad {
                    trace.relocate(end, pos + module_pos);
                }
            }
        }
    }

    tracing::debug!("Moved {} in {} to ({}, {})", component_ref, module_ref, pos.x, pos.y);
    Ok(pos)
}

/// Write a component position and re-derive its trace ends.
///
/// Every touched pin is resolved before anything is written, so an error
/// leaves the module as it was.
pub(crate) fn place_component(
    module: &mut Module,
    component_ref: &str,
    pos: Position,
) -> Result<(), EditorError> {
    let mut moved = module.component(component_ref)?.clone();
    moved.pos = pos;

    let mut updates = Vec::new();
    for trace in module.connections.touching(component_ref) {
        for end in trace.ends_of(component_ref) {
            if let Pin::Index(pin) = trace.end(end).pin {
                updates.push((trace.reference.clone(), end, moved.pin_position(pin)?));
            }
        }
    }

    module.components.insert(component_ref.to_string(), moved);
    for (key, end, pin_pos) in updates {
        if let Some(trace) = module.connections.get_mut(&key) {
            trace.relocate(end, pin_pos);
        }
    }
    Ok(())
}
