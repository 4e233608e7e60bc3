//! Editing Operations Module
//!
//! Pointer-driven edits on a [`Circuit`](crate::model::Circuit):
//! hit-testing, dragging, pad snapping, rotation, routing and merging.
//! Every mutating operation works in place on `&mut Circuit`.

pub mod hit;
pub mod merge;
pub mod movement;
pub mod pads;
pub mod rotation;
pub mod routing;

pub use hit::{canvas_to_module, locate_component, locate_module, locate_pin, Frame};
pub use merge::{merge_modules, MERGED_PREFIX};
pub use movement::{move_component, move_module};
pub use pads::{snap_pad_offset, PadSlots, SLOT_COUNT};
pub use rotation::{rotate90_component, rotate90_module};
pub use routing::{bend_points, connect_pins, disconnect, update_trace_points};
