//! Circuit Model Module
//!
//! The tree of spatial containers the editor works on:
//! circuit -> layers -> modules -> components, with traces at the layer and
//! module level.

pub mod schema;
pub mod traces;

pub use schema::*;
pub use traces::{non_pad_traces, pad_to_component, Traces};
