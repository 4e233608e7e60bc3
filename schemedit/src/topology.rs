//! Connectivity Graph
//!
//! Electrical connectivity of a module or a whole layer as an undirected
//! petgraph graph: one node per component (pads included), one edge per
//! trace. Used to check that edits such as merges never break a connection,
//! and to report circuit statistics.

use petgraph::algo::{astar, has_path_connecting};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::{Circuit, ConnectionNode, Layer, Module, Pin};

/// A component in the connectivity graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Component ref, or `"{module}/{component}"` in a layer graph.
    pub label: String,
    pub is_pad: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectivityGraph {
    graph: UnGraph<GraphNode, String>,
    indices: HashMap<String, NodeIndex>,
}

impl ConnectivityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph of one module: its components and the traces between them.
    pub fn of_module(module: &Module) -> Self {
        let mut graph = Self::new();
        for component in module.components.values() {
            graph.add_node(&component.reference, component.is_pad());
        }
        for trace in module.connections.iter() {
            let a = graph.add_node(&trace.a.reference, false);
            let b = graph.add_node(&trace.b.reference, false);
            graph.graph.add_edge(a, b, trace.reference.clone());
        }
        graph
    }

    /// Graph of a whole layer. Nodes are labelled `"{module}/{component}"`;
    /// inter-module traces join the pads they leave through.
    pub fn of_layer(layer: &Layer) -> Self {
        let mut graph = Self::new();
        for module in layer.modules.values() {
            for component in module.components.values() {
                graph.add_node(&layer_label(&module.reference, &component.reference), component.is_pad());
            }
            for trace in module.connections.iter() {
                let a = graph.add_node(&layer_label(&module.reference, &trace.a.reference), false);
                let b = graph.add_node(&layer_label(&module.reference, &trace.b.reference), false);
                graph.graph.add_edge(a, b, trace.reference.clone());
            }
        }
        for trace in layer.connections.iter() {
            let a = graph.add_node(&pad_label(&trace.a), true);
            let b = graph.add_node(&pad_label(&trace.b), true);
            graph.graph.add_edge(a, b, trace.reference.clone());
        }
        graph
    }

    /// Get or insert a node. A node first seen through a trace end is kept
    /// even when no component of that ref exists.
    fn add_node(&mut self, label: &str, is_pad: bool) -> NodeIndex {
        if let Some(&idx) = self.indices.get(label) {
            if is_pad {
                self.graph[idx].is_pad = true;
            }
            return idx;
        }
        let idx = self.graph.add_node(GraphNode {
            label: label.to_string(),
            is_pad,
        });
        self.indices.insert(label.to_string(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of traces ending on `label`.
    pub fn degree(&self, label: &str) -> usize {
        self.indices
            .get(label)
            .map(|&idx| self.graph.neighbors(idx).count())
            .unwrap_or(0)
    }

    pub fn are_connected(&self, a: &str, b: &str) -> bool {
        match (self.indices.get(a), self.indices.get(b)) {
            (Some(&a), Some(&b)) => has_path_connecting(&self.graph, a, b, None),
            _ => false,
        }
    }

    /// Shortest chain of labels from `from` to `to`.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let from_idx = *self.indices.get(from)?;
        let to_idx = *self.indices.get(to)?;

        let (_, path) = astar(&self.graph, from_idx, |n| n == to_idx, |_| 1, |_| 0)?;
        Some(
            path.into_iter()
                .map(|idx| self.graph[idx].label.clone())
                .collect(),
        )
    }

    /// Connected groups of every node, each sorted, ordered by first label.
    pub fn groups(&self) -> Vec<Vec<String>> {
        self.collect_groups(|_| true)
    }

    /// Connected groups with pads left out. Groups made only of pads are
    /// dropped.
    pub fn part_groups(&self) -> Vec<Vec<String>> {
        self.collect_groups(|node| !node.is_pad)
    }

    fn collect_groups(&self, keep: impl Fn(&GraphNode) -> bool) -> Vec<Vec<String>> {
        let mut sets = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.edge_indices() {
            if let Some((a, b)) = self.graph.edge_endpoints(edge) {
                sets.union(a.index(), b.index());
            }
        }

        let mut by_root: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            if keep(node) {
                by_root
                    .entry(sets.find(idx.index()))
                    .or_default()
                    .push(node.label.clone());
            }
        }

        let mut groups: Vec<Vec<String>> = by_root
            .into_values()
            .map(|mut group| {
                group.sort();
                group
            })
            .collect();
        groups.sort();
        groups
    }
}

fn layer_label(module: &str, component: &str) -> String {
    format!("{}/{}", module, component)
}

fn pad_label(node: &ConnectionNode) -> String {
    match &node.pin {
        Pin::Pad(pad) => layer_label(&node.reference, pad),
        Pin::Index(i) => layer_label(&node.reference, &i.to_string()),
    }
}

/// Counts for one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleStats {
    pub reference: String,
    pub part_count: usize,
    pub pad_count: usize,
    pub trace_count: usize,
    /// Connected groups of parts.
    pub group_count: usize,
}

impl ModuleStats {
    pub fn of(module: &Module) -> Self {
        Self {
            reference: module.reference.clone(),
            part_count: module.parts().count(),
            pad_count: module.pads().count(),
            trace_count: module.connections.len(),
            group_count: ConnectivityGraph::of_module(module).part_groups().len(),
        }
    }
}

/// Statistics about a circuit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitStats {
    pub layer_count: usize,
    pub module_count: usize,
    pub part_count: usize,
    pub pad_count: usize,
    pub internal_trace_count: usize,
    pub inter_module_trace_count: usize,
    pub modules: Vec<ModuleStats>,
}

impl CircuitStats {
    pub fn of(circuit: &Circuit) -> Self {
        let modules: Vec<ModuleStats> = circuit
            .layers
            .values()
            .flat_map(|layer| layer.modules.values())
            .map(ModuleStats::of)
            .collect();

        Self {
            layer_count: circuit.layers.len(),
            module_count: modules.len(),
            part_count: modules.iter().map(|m| m.part_count).sum(),
            pad_count: modules.iter().map(|m| m.pad_count).sum(),
            internal_trace_count: modules.iter().map(|m| m.trace_count).sum(),
            inter_module_trace_count: circuit.layers.values().map(|l| l.connections.len()).sum(),
            modules,
        }
    }
}
