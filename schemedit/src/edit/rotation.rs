//! Quarter-turn rotation of components and modules.
//!
//! Angles are free-running multiples of 90 and are never normalised on
//! write. All rotations use the exact closed form, so four turns restore
//! every position bit for bit.

use crate::core::EditorError;
use crate::model::{Circuit, Layer, Module, Pin};

/// Turn a component a quarter turn about its own position.
pub fn rotate90_component(
    circuit: &mut Circuit,
    layer_ref: &str,
    module_ref: &str,
    component_ref: &str,
) -> Result<(), EditorError> {
    let module = circuit.module_mut(layer_ref, module_ref)?;
    turn_component(module, component_ref)
}

/// Turn a module a quarter turn about its centre, carrying every component,
/// every internal bend path and the inter-module traces leaving through its
/// pads.
pub fn rotate90_module(
    circuit: &mut Circuit,
    layer_ref: &str,
    module_ref: &str,
) -> Result<(), EditorError> {
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

    module.angle += 90;

    // The whole module turns rigidly, bend paths included.
    for trace in module.connections.iter_mut() {
        trace.a.pos = trace.a.pos.rotated_90();
        trace.b.pos = trace.b.pos.rotated_90();
        for point in trace.points.iter_mut() {
            *point = point.rotated_90();
        }
    }

    let refs: Vec<String> = module.components.keys().cloned().collect();
    for component_ref in &refs {
        let component = &mut module.components[component_ref.as_str()];
        component.pos = component.pos.rotated_90();
        turn_component(module, component_ref)?;
    }

    let module_pos = module.pos;
    for trace in layer_traces.touching_mut(module_ref) {
        for end in trace.ends_of(module_ref) {
            if let Pin::Pad(pad) = &trace.end(end).pin {
                let pos = module_pos + module.component(pad)?.pos;
                trace.relocate(end, pos);
            }
        }
    }

    tracing::debug!("Rotated module {} to {} degrees", module_ref, module.angle);
    Ok(())
}

fn turn_component(module: &mut Module, component_ref: &str) -> Result<(), EditorError> {
    let Module {
        reference,
        components,
        connections,
        ..
    } = module;
    let component = components
        .get_mut(component_ref)
        .ok_or_else(|| EditorError::UnknownComponent {
            module: reference.clone(),
            component: component_ref.to_string(),
        })?;

    component.angle += 90;
    for coord in component.pin_coords.iter_mut() {
        *coord = coord.rotated_90();
    }

    for trace in connections.touching_mut(component_ref) {
        for end in trace.ends_of(component_ref) {
            if let Pin::Index(pin) = trace.end(end).pin {
                let pos = component.pin_position(pin)?;
                trace.relocate(end, pos);
            }
        }
    }
    Ok(())
}
