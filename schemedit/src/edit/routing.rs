//! Creating, removing and bending traces inside a module.

use crate::core::EditorError;
use crate::geometry::Position;
use crate::model::{Circuit, ConnectionNode, Pin, Trace};

/// Points extending an in-progress bend path from its last point to `pos`
/// with 45-degree routing: a straight leg then a diagonal, or a single point
/// when the move is already diagonal.
pub fn bend_points(pos: Position, drawn: &[Position]) -> Vec<Position> {
    let Some(last) = drawn.last() else {
        return Vec::new();
    };
    let diff = pos - *last;
    let (abs_x, abs_y) = (diff.x.abs(), diff.y.abs());

    if abs_x > abs_y {
        let x = if diff.x < 0.0 { pos.x + abs_y } else { pos.x - abs_y };
        vec![Position::new(x, pos.y - diff.y), pos]
    } else if abs_x < abs_y {
        let y = if diff.y < 0.0 { pos.y + abs_x } else { pos.y - abs_x };
        vec![Position::new(pos.x - diff.x, y), pos]
    } else {
        vec![pos]
    }
}

/// Replace the bend points of a module trace.
pub fn update_trace_points(
    circuit: &mut Circuit,
    layer_ref: &str,
    module_ref: &str,
    trace_ref: &str,
    points: Vec<Position>,
) -> Result<(), EditorError> {
    let module = circuit.module_mut(layer_ref, module_ref)?;
    let trace = module
        .connections
        .get_mut(trace_ref)
        .ok_or_else(|| EditorError::UnknownTrace(trace_ref.to_string()))?;
    trace.points = points;
    Ok(())
}

/// Join two component pins of a module and return the trace key.
///
/// Pins that are already joined keep their existing trace.
pub fn connect_pins(
    circuit: &mut Circuit,
    layer_ref: &str,
    module_ref: &str,
    a: (&str, u32),
    b: (&str, u32),
) -> Result<String, EditorError> {
    let module = circuit.module_mut(layer_ref, module_ref)?;
    let (a_pin, b_pin) = (Pin::Index(a.1), Pin::Index(b.1));

    if let Some(existing) = module.connections.find_link(a.0, &a_pin, b.0, &b_pin) {
        return Ok(existing.reference.clone());
    }

    let a_pos = module.component(a.0)?.pin_position(a.1)?;
    let b_pos = module.component(b.0)?.pin_position(b.1)?;
    let trace = Trace::new(
        ConnectionNode::new(a.0, a_pin, a_pos),
        ConnectionNode::new(b.0, b_pin, b_pos),
    );
    Ok(module.connections.insert(trace))
}

/// Remove a module trace.
pub fn disconnect(
    circuit: &mut Circuit,
    layer_ref: &str,
    module_ref: &str,
    trace_ref: &str,
) -> Result<Trace, EditorError> {
    circuit
        .module_mut(layer_ref, module_ref)?
        .connections
        .remove(trace_ref)
        .ok_or_else(|| EditorError::UnknownTrace(trace_ref.to_string()))
}
