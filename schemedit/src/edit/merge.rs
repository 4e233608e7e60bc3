//! Module merge
//!
//! Combines several modules of one layer into a single module:
//!
//! 1. Non-pad components of every source are copied into the new module.
//! 2. The new radius is the decaying sum `sum(radius_i / (i + 1))`.
//! 3. The new ref is `MODULE-` followed by the component refs joined by `-`.
//! 4. Components are laid out evenly on a ring inside the new rim.
//! 5. Component-to-component traces of each source are carried over.
//! 6. Pad-to-pad traces between two merged modules become direct
//!    component-to-component traces.
//! 7. Pads leading outside the merged set are re-placed on the new rim,
//!    wired to their component, and the outside trace is re-pointed at the
//!    new module.
//! 8. Sources and consumed traces are deleted, the new module inserted.
//!
//! A pad only resolves to a component when it has exactly one trace in its
//! module. Traces through pads that do not resolve are skipped and left as
//! they are.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::f64::consts::PI;

use crate::core::{EditorConfig, EditorError};
use crate::geometry::Position;
use crate::model::{
    non_pad_traces, pad_to_component, Circuit, Component, ConnectionNode, End, Layer, Module, Pin,
    Trace, Traces,
};

/// Prefix of every merged module ref.
pub const MERGED_PREFIX: &str = "MODULE-";

/// Pad pin used on the pad side of synthesized pad traces.
const PAD_PIN: u32 = 1;

/// Merge `modules` of `layer_ref` into one module and return its ref.
///
/// Merging a single module is a no-op returning its ref.
pub fn merge_modules(
    circuit: &mut Circuit,
    layer_ref: &str,
    modules: &[&str],
    config: &EditorConfig,
) -> Result<String, EditorError> {
    match modules {
        [] => {
            tracing::warn!("Trying to merge 0 modules");
            return Err(EditorError::EmptyMerge);
        }
        [single] => {
            circuit.module(layer_ref, single)?;
            return Ok(single.to_string());
        }
        _ => {}
    }

    let plan = plan_merge(circuit.layer(layer_ref)?, layer_ref, modules, config)?;
    let new_ref = plan.module.reference.clone();

    let layer = circuit.layer_mut(layer_ref)?;
    for (key, end, pos) in plan.rewires {
        if let Some(trace) = layer.connections.get_mut(&key) {
            trace.end_mut(end).reference = new_ref.clone();
            trace.relocate(end, pos);
        }
    }
    for key in &plan.consumed {
        layer.connections.remove(key);
    }
    for module in modules {
        layer.modules.shift_remove(*module);
    }
    layer.add_module(plan.module);

    tracing::debug!(
        "Merged {} modules into {} ({} bridge traces consumed)",
        modules.len(),
        new_ref,
        plan.consumed.len()
    );
    Ok(new_ref)
}

/// Everything a merge changes, computed before touching the layer.
struct MergePlan {
    module: Module,
    /// Inter-module traces replaced by direct traces.
    consumed: HashSet<String>,
    /// Outside traces whose local end moves onto the new module.
    rewires: Vec<(String, End, Position)>,
}

fn plan_merge(
    layer: &Layer,
    layer_ref: &str,
    modules: &[&str],
    config: &EditorConfig,
) -> Result<MergePlan, EditorError> {
    let sources = modules
        .iter()
        .map(|m| layer.module(layer_ref, m))
        .collect::<Result<Vec<_>, _>>()?;

    let mut parts: IndexMap<String, Component> = IndexMap::new();
    let mut pads: IndexMap<String, Component> = IndexMap::new();
    let mut radius = 0.0;
    for (i, source) in sources.iter().enumerate() {
        for component in source.components.values() {
            let bucket = if component.is_pad() { &mut pads } else { &mut parts };
            bucket.insert(component.reference.clone(), component.clone());
        }
        radius += source.radius / (i as f64 + 1.0);
    }

    let new_ref = format!(
        "{}{}",
        MERGED_PREFIX,
        parts.keys().map(String::as_str).collect::<Vec<_>>().join("-")
    );
    if layer.modules.contains_key(&new_ref) && !modules.contains(&new_ref.as_str()) {
        return Err(EditorError::RefCollision(new_ref));
    }

    lay_out_ring(&mut parts, config.merge_ring_ratio * radius);

    let mut merged = Module {
        reference: new_ref.clone(),
        pos: sources[0].pos,
        angle: 0,
        radius,
        components: parts,
        connections: Traces::new(),
    };

    for source in &sources {
        for trace in non_pad_traces(source) {
            if let (Pin::Index(_), Pin::Index(_)) = (&trace.a.pin, &trace.b.pin) {
                let a = place(&trace.a, &merged)?;
                let b = place(&trace.b, &merged)?;
                merged.connections.insert(Trace::new(a, b));
            }
        }
    }

    let merge_set: HashSet<&str> = modules.iter().copied().collect();
    let mut consumed = HashSet::new();
    let mut rewires = Vec::new();

    for source in &sources {
        for trace in layer.connections.touching(&source.reference) {
            if consumed.contains(&trace.reference) {
                continue;
            }
            let inside = |node: &ConnectionNode| merge_set.contains(node.reference.as_str());
            if inside(&trace.a) && inside(&trace.b) {
                if let Some(direct) = bridge(trace, layer, layer_ref, &merged)? {
                    merged.connections.insert(direct);
                    consumed.insert(trace.reference.clone());
                }
                continue;
            }

            for end in trace.ends_of(&source.reference) {
                let Pin::Pad(pad_ref) = &trace.end(end).pin else {
                    continue;
                };
                let Some(pad_pos) = carry_pad(pad_ref, source, &pads, &mut merged, config)? else {
                    continue;
                };
                rewires.push((trace.reference.clone(), end, pad_pos + merged.pos));
            }
        }
    }

    Ok(MergePlan {
        module: merged,
        consumed,
        rewires,
    })
}

fn lay_out_ring(parts: &mut IndexMap<String, Component>, ring: f64) {
    let count = parts.len() as f64;
    for (i, component) in parts.values_mut().enumerate() {
        let angle = 2.0 * PI * i as f64 / count;
        component.pos = Position::new(ring * angle.cos(), ring * angle.sin());
    }
}

/// Copy of `node` with its position re-derived inside `module`.
fn place(node: &ConnectionNode, module: &Module) -> Result<ConnectionNode, EditorError> {
    let mut placed = node.clone();
    if let Pin::Index(pin) = node.pin {
        placed.pos = module.component(&node.reference)?.pin_position(pin)?;
    }
    Ok(placed)
}

/// Direct trace replacing a pad-to-pad trace between two merged modules.
fn bridge(
    trace: &Trace,
    layer: &Layer,
    layer_ref: &str,
    merged: &Module,
) -> Result<Option<Trace>, EditorError> {
    let (Pin::Pad(a_pad), Pin::Pad(b_pad)) = (&trace.a.pin, &trace.b.pin) else {
        return Ok(None);
    };
    let a_module = layer.module(layer_ref, &trace.a.reference)?;
    let b_module = layer.module(layer_ref, &trace.b.reference)?;

    let (Some(a), Some(b)) = (
        resolve_pad(a_pad, a_module, merged),
        resolve_pad(b_pad, b_module, merged),
    ) else {
        tracing::warn!(
            "Trace {} joins pads that do not lead to exactly one component; left unmerged",
            trace.reference
        );
        return Ok(None);
    };

    Ok(Some(Trace::new(place(&a, merged)?, place(&b, merged)?)))
}

/// Component pin a pad leads to, if it is one of the merged components.
fn resolve_pad(pad: &str, source: &Module, merged: &Module) -> Option<ConnectionNode> {
    pad_to_component(pad, source)
        .filter(|node| node.pin.as_index().is_some())
        .filter(|node| merged.components.contains_key(&node.reference))
}

/// Put a pad on the merged rim and wire it to its component.
///
/// Returns the pad's module-local position, or `None` when the pad is
/// unknown.
fn carry_pad(
    pad_ref: &str,
    source: &Module,
    pads: &IndexMap<String, Component>,
    merged: &mut Module,
    config: &EditorConfig,
) -> Result<Option<Position>, EditorError> {
    let Some((slot, _, pad)) = pads.get_full(pad_ref) else {
        tracing::warn!("Pad {} is not a component of {}", pad_ref, source.reference);
        return Ok(None);
    };
    let pad_pos = config
        .pad_slots
        .position(slot, merged.radius, pad.angle as f64);

    let mut placed = pad.clone();
    placed.pos = pad_pos;
    merged.add_component(placed);

    match resolve_pad(pad_ref, source, merged) {
        Some(inner) => {
            let pad_pin = Pin::Index(PAD_PIN);
            if !merged
                .connections
                .links(pad_ref, &pad_pin, &inner.reference, &inner.pin)
            {
                let a = ConnectionNode::new(pad_ref, pad_pin, pad_pos);
                let b = place(&inner, merged)?;
                merged.connections.insert(Trace::new(a, b));
            }
        }
        None => tracing::warn!(
            "Pad {} of {} does not lead to exactly one component; left unconnected",
            pad_ref,
            source.reference
        ),
    }
    Ok(Some(pad_pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(r: &str, pin: u32) -> ConnectionNode {
        ConnectionNode::new(r, pin, Position::ORIGIN)
    }

    fn part(r: &str) -> Component {
        Component::new(r, 4.0, 2.0).with_pin(-1.0, 0.0).with_pin(1.0, 0.0)
    }

    fn pad(r: &str) -> Component {
        Component::new(r, 2.0, 2.0).with_pin(0.0, 0.0)
    }

    /// A: U1 U2 U3, trace U1.2-U2.1, pad PAD-U3-1 on U3.1
    /// B: R1 R2, pad PAD-R1-1 on R1.1
    /// layer: A/PAD-U3-1 <-> B/PAD-R1-1
    fn two_modules() -> Circuit {
        let mut a = Module::new("A", 30.0).with_position(100.0, 100.0);
        for r in ["U1", "U2", "U3"] {
            a.add_component(part(r));
        }
        a.add_component(pad("PAD-U3-1"));
        a.connections.insert(Trace::new(node("U1", 2), node("U2", 1)));
        a.connections.insert(Trace::new(node("PAD-U3-1", 1), node("U3", 1)));

        let mut b = Module::new("B", 20.0).with_position(200.0, 100.0);
        for r in ["R1", "R2"] {
            b.add_component(part(r));
        }
        b.add_component(pad("PAD-R1-1"));
        b.connections.insert(Trace::new(node("R1", 1), node("PAD-R1-1", 1)));

        let mut layer = Layer::default();
        layer.add_module(a);
        layer.add_module(b);
        layer.connections.insert(Trace::new(
            ConnectionNode::new("A", "PAD-U3-1", Position::new(120.0, 100.0)),
            ConnectionNode::new("B", "PAD-R1-1", Position::new(185.0, 100.0)),
        ));

        let mut circuit = Circuit::new();
        circuit.add_layer("top", layer);
        circuit
    }

    #[test]
    fn test_merge_zero_modules_is_error() {
        let mut circuit = two_modules();
        let before = circuit.clone();
        let result = merge_modules(&mut circuit, "top", &[], &EditorConfig::default());
        assert!(matches!(result, Err(EditorError::EmptyMerge)));
        assert_eq!(circuit, before);
    }

    #[test]
    fn test_merge_single_module_is_noop() {
        let mut circuit = two_modules();
        let before = circuit.clone();
        let merged = merge_modules(&mut circuit, "top", &["A"], &EditorConfig::default()).unwrap();
        assert_eq!(merged, "A");
        assert_eq!(circuit, before);
    }

    #[test]
    fn test_merge_bridges_pad_trace() {
        let mut circuit = two_modules();
        let merged = merge_modules(&mut circuit, "top", &["A", "B"], &EditorConfig::default()).unwrap();
        assert_eq!(merged, "MODULE-U1-U2-U3-R1-R2");

        let layer = &circuit.layers["top"];
        assert_eq!(layer.modules.len(), 1);
        assert!(!layer.modules.contains_key("A"));
        assert!(!layer.modules.contains_key("B"));
        assert!(layer.connections.is_empty());

        let module = &layer.modules[merged.as_str()];
        assert_eq!(module.parts().count(), 5);
        assert_eq!(module.pads().count(), 0);
        assert_eq!(module.connections.len(), 2);
        assert!(module.connections.contains("U1-2-U2-1"));
        assert!(module.connections.contains("U3-1-R1-1"));
        assert_eq!(module.pos, Position::new(100.0, 100.0));
        assert_eq!(module.angle, 0);
    }

    #[test]
    fn test_merge_radius_is_decaying_sum() {
        let mut circuit = two_modules();
        let merged = merge_modules(&mut circuit, "top", &["A", "B"], &EditorConfig::default()).unwrap();
        let module = &circuit.layers["top"].modules[merged.as_str()];
        assert_eq!(module.radius, 30.0 + 20.0 / 2.0);
    }

    #[test]
    fn test_merge_ring_layout_and_trace_positions() {
        let mut circuit = two_modules();
        let merged = merge_modules(&mut circuit, "top", &["A", "B"], &EditorConfig::default()).unwrap();
        let module = &circuit.layers["top"].modules[merged.as_str()];

        let ring = 0.5 * 40.0;
        let u1 = &module.components["U1"];
        assert_eq!(u1.pos, Position::new(ring, 0.0));
        for c in module.parts() {
            assert!((c.pos.magnitude() - ring).abs() < 1e-9);
        }

        for trace in module.connections.iter() {
            for end in [&trace.a, &trace.b] {
                let pin = end.pin.as_index().unwrap();
                assert_eq!(end.pos, module.components[&end.reference].pin_position(pin).unwrap());
            }
        }
    }

    #[test]
    fn test_merge_leaves_sources_untouched_on_error() {
        let mut circuit = two_modules();
        let before = circuit.clone();
        let result = merge_modules(&mut circuit, "top", &["A", "Z"], &EditorConfig::default());
        assert!(matches!(result, Err(EditorError::UnknownModule { .. })));
        assert_eq!(circuit, before);
    }

    #[test]
    fn test_merge_rewires_outside_trace() {
        let mut circuit = two_modules();
        {
            let layer = circuit.layers.get_mut("top").unwrap();
            let mut c = Module::new("C", 10.0).with_position(300.0, 300.0);
            c.add_component(pad("PAD-Q1-1"));
            layer.add_module(c);

            let a = &mut layer.modules["A"];
            a.add_component(pad("PAD-U1-1"));
            a.connections.insert(Trace::new(node("PAD-U1-1", 1), node("U1", 1)));
            layer.connections.insert(Trace::new(
                ConnectionNode::new("C", "PAD-Q1-1", Position::new(295.0, 300.0)),
                ConnectionNode::new("A", "PAD-U1-1", Position::new(80.0, 100.0)),
            ));
        }

        let config = EditorConfig::default();
        let merged = merge_modules(&mut circuit, "top", &["A", "B"], &config).unwrap();
        let layer = &circuit.layers["top"];
        let module = &layer.modules[merged.as_str()];

        // PAD-U1-1 is the second pad collected (after PAD-U3-1)
        let expected = config.pad_slots.position(1, module.radius, 0.0);
        assert_eq!(module.components["PAD-U1-1"].pos, expected);
        assert!(module.connections.links("PAD-U1-1", &Pin::Index(1), "U1", &Pin::Index(1)));

        let outside = layer.connections.get("C-PAD-Q1-1-A-PAD-U1-1").unwrap();
        assert_eq!(outside.b.reference, merged);
        assert_eq!(outside.b.pos, expected + module.pos);
        assert_eq!(outside.a.reference, "C");
        assert!(layer.modules.contains_key("C"));
    }

    #[test]
    fn test_merge_skips_pad_with_two_connections() {
        let mut circuit = two_modules();
        circuit.layers["top"].modules["A"]
            .connections
            .insert(Trace::new(node("PAD-U3-1", 1), node("U2", 2)));

        let merged = merge_modules(&mut circuit, "top", &["A", "B"], &EditorConfig::default()).unwrap();
        let layer = &circuit.layers["top"];
        let module = &layer.modules[merged.as_str()];

        // Only the carried U1-U2 trace; the bridge did not resolve
        assert_eq!(module.connections.len(), 1);
        assert!(module.connections.contains("U1-2-U2-1"));
        assert_eq!(layer.connections.len(), 1);
    }

    /// Adds outside module C with one pad per outside trace, each wired to
    /// A's PAD-U1-1.
    fn with_outside_traces(circuit: &mut Circuit, outside_pads: &[&str]) {
        let layer = circuit.layers.get_mut("top").unwrap();
        let mut c = Module::new("C", 10.0).with_position(300.0, 300.0);
        for p in outside_pads {
            c.add_component(pad(p));
        }
        layer.add_module(c);
        layer.modules["A"].add_component(pad("PAD-U1-1"));
        for p in outside_pads {
            layer.connections.insert(Trace::new(
                ConnectionNode::new("C", *p, Position::new(295.0, 300.0)),
                ConnectionNode::new("A", "PAD-U1-1", Position::new(80.0, 100.0)),
            ));
        }
    }

    #[test]
    fn test_merge_keeps_unresolved_outside_pad_unwired() {
        let mut circuit = two_modules();
        with_outside_traces(&mut circuit, &["PAD-Q1-1"]);
        {
            let a = &mut circuit.layers["top"].modules["A"];
            a.connections.insert(Trace::new(node("PAD-U1-1", 1), node("U1", 1)));
            a.connections.insert(Trace::new(node("PAD-U1-1", 1), node("U2", 2)));
        }

        let config = EditorConfig::default();
        let merged = merge_modules(&mut circuit, "top", &["A", "B"], &config).unwrap();
        let layer = &circuit.layers["top"];
        let module = &layer.modules[merged.as_str()];

        let expected = config.pad_slots.position(1, module.radius, 0.0);
        assert_eq!(module.components["PAD-U1-1"].pos, expected);
        assert_eq!(module.connections.touching("PAD-U1-1").count(), 0);
        assert_eq!(module.connections.len(), 2);

        let outside = layer.connections.get("C-PAD-Q1-1-A-PAD-U1-1").unwrap();
        assert_eq!(outside.b.reference, merged);
        assert_eq!(outside.b.pos, expected + module.pos);
    }

    #[test]
    fn test_merge_wires_shared_outside_pad_once() {
        let mut circuit = two_modules();
        with_outside_traces(&mut circuit, &["PAD-Q1-1", "PAD-Q1-2"]);
        circuit.layers["top"].modules["A"]
            .connections
            .insert(Trace::new(node("PAD-U1-1", 1), node("U1", 1)));

        let merged = merge_modules(&mut circuit, "top", &["A", "B"], &EditorConfig::default()).unwrap();
        let layer = &circuit.layers["top"];
        let module = &layer.modules[merged.as_str()];

        let pad_traces: Vec<&str> = module
            .connections
            .touching("PAD-U1-1")
            .map(|t| t.reference.as_str())
            .collect();
        assert_eq!(pad_traces, vec!["PAD-U1-1-1-U1-1"]);

        for key in ["C-PAD-Q1-1-A-PAD-U1-1", "C-PAD-Q1-2-A-PAD-U1-1"] {
            let outside = layer.connections.get(key).unwrap();
            assert_eq!(outside.a.reference, "C");
            assert_eq!(outside.b.reference, merged);
        }
    }

    #[test]
    fn test_merge_ref_collision() {
        let mut circuit = two_modules();
        circuit.layers["top"].add_module(Module::new("MODULE-U1-U2-U3-R1-R2", 5.0));
        let result = merge_modules(&mut circuit, "top", &["A", "B"], &EditorConfig::default());
        assert!(matches!(result, Err(EditorError::RefCollision(_))));
    }
}
