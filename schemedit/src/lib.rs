//! Schemedit - spatial editing and module-merge engine for circuit-board schematics
//!
//! A [`Circuit`] is a tree of layers, modules and components joined by
//! traces. This library implements the editing operations driven by pointer
//! input (hit-testing, dragging, pad snapping, rotation) and the module merge
//! that collapses several modules into one without breaking a connection.
//!
//! # Quick Start
//!
//! ```no_run
//! use schemedit::{merge_modules, Circuit, EditorConfig};
//! use std::path::Path;
//!
//! let mut circuit = Circuit::load(Path::new("board.json")).unwrap();
//! let config = EditorConfig::default();
//!
//! let merged = merge_modules(&mut circuit, "top", &["M1", "M2"], &config).unwrap();
//! println!("merged into {}", merged);
//! circuit.save(Path::new("board.json")).unwrap();
//! ```
//!
//! # Features
//!
//! - **Hit-testing**: module, component and pin under a pointer, zoomed or not
//! - **Editing**: module and component drags, pad rim snapping, quarter turns
//! - **Merging**: connectivity-preserving module merge
//! - **Sessions**: pointer-event dispatch and an async layout service channel

pub mod core;
pub mod edit;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod session;
pub mod topology;

// Re-export main types
pub use core::{EditorConfig, EditorError};
pub use edit::{
    bend_points, canvas_to_module, connect_pins, disconnect, locate_component, locate_module,
    locate_pin, merge_modules, move_component, move_module, rotate90_component, rotate90_module,
    snap_pad_offset, update_trace_points, PadSlots,
};
pub use geometry::Position;
pub use model::{Circuit, Component, ConnectionNode, Layer, Module, Pin, Trace, Traces};
pub use session::{DragTarget, EditorSession};
pub use topology::{CircuitStats, ConnectivityGraph, ModuleStats};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Circuit, Component, ConnectionNode, DragTarget, EditorConfig, EditorError, EditorSession,
        Layer, Module, Pin, Position, Trace,
    };
}
