//! Trace collection and connection queries.
//!
//! Traces are kept in insertion order keyed by their ref. Lookups by the
//! entity a trace touches are linear scans; module trace counts are small.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::{ConnectionNode, Module, Pin, Trace};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Traces(IndexMap<String, Trace>);

impl Traces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the trace's own ref, replacing any trace with that ref.
    pub fn insert(&mut self, trace: Trace) -> String {
        let key = trace.reference.clone();
        self.0.insert(key.clone(), trace);
        key
    }

    /// Remove keeping the order of the remaining traces.
    pub fn remove(&mut self, reference: &str) -> Option<Trace> {
        self.0.shift_remove(reference)
    }

    pub fn get(&self, reference: &str) -> Option<&Trace> {
        self.0.get(reference)
    }

    pub fn get_mut(&mut self, reference: &str) -> Option<&mut Trace> {
        self.0.get_mut(reference)
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.0.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trace> {
        self.0.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Trace> {
        self.0.values_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Every trace with an end on `reference`.
    pub fn touching<'a>(&'a self, reference: &'a str) -> impl Iterator<Item = &'a Trace> + 'a {
        self.0.values().filter(move |t| t.touches(reference))
    }

    pub fn touching_mut<'a>(
        &'a mut self,
        reference: &'a str,
    ) -> impl Iterator<Item = &'a mut Trace> + 'a {
        self.0.values_mut().filter(move |t| t.touches(reference))
    }

    /// Keys of the traces touching `reference`, for callers that mutate the
    /// collection while walking it.
    pub fn keys_touching(&self, reference: &str) -> Vec<String> {
        self.touching(reference).map(|t| t.reference.clone()).collect()
    }

    /// Whether `a_ref:a_pin` and `b_ref:b_pin` are already joined, in either
    /// orientation.
    pub fn links(&self, a_ref: &str, a_pin: &Pin, b_ref: &str, b_pin: &Pin) -> bool {
        self.find_link(a_ref, a_pin, b_ref, b_pin).is_some()
    }

    pub fn find_link(&self, a_ref: &str, a_pin: &Pin, b_ref: &str, b_pin: &Pin) -> Option<&Trace> {
        self.0.values().find(|t| {
            (t.a.is(a_ref, a_pin) && t.b.is(b_ref, b_pin))
                || (t.b.is(a_ref, a_pin) && t.a.is(b_ref, b_pin))
        })
    }
}

impl FromIterator<Trace> for Traces {
    fn from_iter<I: IntoIterator<Item = Trace>>(iter: I) -> Self {
        let mut traces = Traces::new();
        for trace in iter {
            traces.insert(trace);
        }
        traces
    }
}

/// The node a pad is wired to inside its module.
///
/// Only resolvable when the pad has exactly one trace; any other degree
/// returns `None`.
pub fn pad_to_component(pad: &str, module: &Module) -> Option<ConnectionNode> {
    let mut touching = module.connections.touching(pad);
    let trace = touching.next()?;
    if touching.next().is_some() {
        return None;
    }
    if trace.a.reference == pad {
        Some(trace.b.clone())
    } else {
        Some(trace.a.clone())
    }
}

/// Traces of a module whose ends are both non-pad components.
pub fn non_pad_traces(module: &Module) -> impl Iterator<Item = &Trace> {
    module.connections.iter().filter(move |t| {
        let is_part = |node: &ConnectionNode| {
            module
                .components
                .get(&node.reference)
                .map(|c| !c.is_pad())
                .unwrap_or(false)
        };
        is_part(&t.a) && is_part(&t.b)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use crate::model::schema::Component;

    fn node(r: &str, pin: u32) -> ConnectionNode {
        ConnectionNode::new(r, pin, Position::ORIGIN)
    }

    fn module_with_pad() -> Module {
        let mut m = Module::new("M1", 20.0);
        m.add_component(Component::new("U1", 6.0, 6.0).with_pin(0.0, 0.0).with_pin(1.0, 0.0));
        m.add_component(Component::new("R1", 4.0, 2.0).with_pin(0.0, 0.0));
        m.add_component(Component::new("PAD-U1-2", 2.0, 2.0).with_pin(0.0, 0.0));
        m.connections.insert(Trace::new(node("U1", 1), node("R1", 1)));
        m.connections.insert(Trace::new(node("PAD-U1-2", 1), node("U1", 2)));
        m
    }

    #[test]
    fn test_touching() {
        let m = module_with_pad();
        assert_eq!(m.connections.touching("U1").count(), 2);
        assert_eq!(m.connections.touching("R1").count(), 1);
        assert_eq!(m.connections.touching("C9").count(), 0);
    }

    #[test]
    fn test_links_both_orientations() {
        let m = module_with_pad();
        let t = &m.connections;
        assert!(t.links("U1", &Pin::Index(1), "R1", &Pin::Index(1)));
        assert!(t.links("R1", &Pin::Index(1), "U1", &Pin::Index(1)));
        assert!(!t.links("U1", &Pin::Index(2), "R1", &Pin::Index(1)));
    }

    #[test]
    fn test_pad_to_component_degree() {
        let mut m = module_with_pad();
        let resolved = pad_to_component("PAD-U1-2", &m).unwrap();
        assert_eq!(resolved.reference, "U1");
        assert_eq!(resolved.pin, Pin::Index(2));

        m.connections.insert(Trace::new(node("PAD-U1-2", 1), node("R1", 1)));
        assert!(pad_to_component("PAD-U1-2", &m).is_none());
        assert!(pad_to_component("PAD-X", &m).is_none());
    }

    #[test]
    fn test_non_pad_traces() {
        let m = module_with_pad();
        let refs: Vec<_> = non_pad_traces(&m).map(|t| t.reference.as_str()).collect();
        assert_eq!(refs, vec!["U1-1-R1-1"]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut traces: Traces = vec![
            Trace::new(node("A", 1), node("B", 1)),
            Trace::new(node("B", 1), node("C", 1)),
            Trace::new(node("C", 1), node("D", 1)),
        ]
        .into_iter()
        .collect();
        traces.remove("B-1-C-1");
        let keys: Vec<_> = traces.keys().cloned().collect();
        assert_eq!(keys, vec!["A-1-B-1", "C-1-D-1"]);
    }
}
