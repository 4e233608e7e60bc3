//! External layout service boundary
//!
//! Force-directed placement runs out of process. Requests go out through a
//! [`LayoutBackend`]; replies are received by a [`LayoutInbox`], which applies
//! them to an [`EditorSession`](crate::session::EditorSession). A `graph`
//! reply replaces the whole circuit in one step.

pub mod channel;
pub mod messages;

pub use channel::{loopback, ChannelBackend, LayoutBackend, LayoutEvent, LayoutInbox, LayoutPeer, LayoutPaths};
pub use messages::{LayoutMessage, LayoutRequest, LayoutSettings, Motion, PhysicalNode};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Malformed layout frame: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Layout channel closed")]
    Closed,
}
