//! Interactive editing session
//!
//! [`EditorSession`] is the single dispatch point for pointer input. It owns
//! the circuit, resolves each pointer-down to a target through the hit-tests,
//! and routes drags to the matching move operation. All edits are
//! synchronous and run to completion inside one call.

use indexmap::IndexSet;
use std::collections::HashSet;

use crate::core::{EditorConfig, EditorError};
use crate::edit::{
    locate_component, locate_module, merge_modules, move_component, move_module,
    rotate90_component, rotate90_module,
};
use crate::geometry::Position;
use crate::model::{Circuit, Layer, Module};

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragTarget {
    Module(String),
    Component { module: String, component: String },
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    circuit: Circuit,
    config: EditorConfig,
    layer: String,
    /// Module currently zoomed into, if any.
    focus: Option<String>,
    selection: IndexSet<String>,
    /// Last target hit by a pointer-down; kept after release for rotation.
    target: Option<DragTarget>,
    dragging: bool,
}

impl EditorSession {
    pub fn new(circuit: Circuit, layer: impl Into<String>) -> Self {
        Self::with_config(circuit, layer, EditorConfig::default())
    }

    pub fn with_config(circuit: Circuit, layer: impl Into<String>, config: EditorConfig) -> Self {
        Self {
            circuit,
            config,
            layer: layer.into(),
            focus: None,
            selection: IndexSet::new(),
            target: None,
            dragging: false,
        }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn layer_ref(&self) -> &str {
        &self.layer
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn selection(&self) -> impl Iterator<Item = &str> {
        self.selection.iter().map(String::as_str)
    }

    pub fn target(&self) -> Option<&DragTarget> {
        self.target.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn active_layer(&self) -> Option<&Layer> {
        self.circuit.layers.get(&self.layer)
    }

    fn focused_module(&self) -> Option<&Module> {
        let focus = self.focus.as_deref()?;
        self.active_layer()?.modules.get(focus)
    }

    /// Hit-test the pointer and start dragging what it landed on.
    ///
    /// Zoomed into a module only its components are candidates; otherwise
    /// only modules are.
    pub fn pointer_down(&mut self, pointer: Position) -> Option<DragTarget> {
        let hit = match self.focus.as_deref() {
            Some(module) => locate_component(pointer, self.focused_module(), true, &self.config)
                .map(|component| DragTarget::Component {
                    module: module.to_string(),
                    component: component.to_string(),
                }),
            None => locate_module(pointer, self.active_layer())
                .map(|module| DragTarget::Module(module.to_string())),
        };

        self.dragging = hit.is_some();
        if hit.is_some() {
            self.target = hit.clone();
        }
        tracing::debug!("Pointer down at ({}, {}): {:?}", pointer.x, pointer.y, hit);
        hit
    }

    /// Move the dragged target to the pointer. A no-op while not dragging.
    pub fn pointer_move(&mut self, pointer: Position) -> Result<(), EditorError> {
        if !self.dragging {
            return Ok(());
        }
        match &self.target {
            Some(DragTarget::Module(module)) => {
                move_module(&mut self.circuit, &self.layer, module, pointer)
            }
            Some(DragTarget::Component { module, component }) => {
                move_component(&mut self.circuit, &self.layer, module, component, pointer, &self.config)
                    .map(|_| ())
            }
            None => Ok(()),
        }
    }

    /// End the drag, returning what was being dragged.
    pub fn pointer_up(&mut self) -> Option<DragTarget> {
        let was_dragging = std::mem::replace(&mut self.dragging, false);
        if was_dragging {
            self.target.clone()
        } else {
            None
        }
    }

    /// Zoom into a module of the active layer.
    pub fn focus(&mut self, module: &str) -> Result<(), EditorError> {
        self.circuit.module(&self.layer, module)?;
        self.focus = Some(module.to_string());
        self.target = None;
        self.dragging = false;
        Ok(())
    }

    pub fn unfocus(&mut self) {
        self.focus = None;
        self.target = None;
        self.dragging = false;
    }

    /// Add a module to the selection, or remove it if already there. Returns
    /// whether it is selected afterwards.
    pub fn toggle_selected(&mut self, module: &str) -> Result<bool, EditorError> {
        self.circuit.module(&self.layer, module)?;
        if self.selection.shift_remove(module) {
            Ok(false)
        } else {
            self.selection.insert(module.to_string());
            Ok(true)
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Quarter-turn the last target. Returns false when there is none.
    pub fn rotate_target(&mut self) -> Result<bool, EditorError> {
        match &self.target {
            Some(DragTarget::Module(module)) => {
                rotate90_module(&mut self.circuit, &self.layer, module)?;
            }
            Some(DragTarget::Component { module, component }) => {
                rotate90_component(&mut self.circuit, &self.layer, module, component)?;
            }
            None => return Ok(false),
        }
        Ok(true)
    }

    /// Merge the selected modules. The merged module becomes the only
    /// selected one.
    pub fn merge_selection(&mut self) -> Result<String, EditorError> {
        let refs: Vec<&str> = self.selection.iter().map(String::as_str).collect();
        let merged = merge_modules(&mut self.circuit, &self.layer, &refs, &self.config)?;

        if self
            .focus
            .as_ref()
            .is_some_and(|f| self.selection.contains(f) && *f != merged)
        {
            self.focus = None;
        }
        self.selection.clear();
        self.selection.insert(merged.clone());
        self.target = None;
        self.dragging = false;
        Ok(merged)
    }

    /// Swap in a whole new circuit. Focus and selection survive only where
    /// the refs still exist on the active layer.
    pub fn replace_circuit(&mut self, circuit: Circuit) -> Circuit {
        let previous = std::mem::replace(&mut self.circuit, circuit);
        let modules: HashSet<String> = self
            .active_layer()
            .map(|l| l.modules.keys().cloned().collect())
            .unwrap_or_default();

        if self.focus.as_ref().is_some_and(|f| !modules.contains(f)) {
            self.focus = None;
        }
        self.selection.retain(|m| modules.contains(m));
        self.target = None;
        self.dragging = false;
        tracing::info!("Circuit replaced ({} layers)", self.circuit.layers.len());
        previous
    }

    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }
}
