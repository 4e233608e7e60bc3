//! Layout transport
//!
//! [`LayoutBackend`] is the sending half of a connection to the layout
//! service. [`ChannelBackend`] carries encoded frames over tokio channels,
//! with [`LayoutPeer`] standing in for the service; [`loopback`] wires the
//! three pieces together.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::messages::{LayoutMessage, LayoutRequest, LayoutSettings, PhysicalNode};
use super::LayoutError;
use crate::session::EditorSession;

/// Common trait for layout service connections
#[async_trait]
pub trait LayoutBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, request: LayoutRequest) -> Result<(), LayoutError>;

    /// Opening handshake: the netlist, then the initial settings.
    async fn open(
        &self,
        netlist: serde_json::Value,
        settings: LayoutSettings,
    ) -> Result<(), LayoutError> {
        self.send(LayoutRequest::Netlist { data: netlist }).await?;
        self.send(settings.request()).await
    }
}

/// In-process backend sending encoded frames over an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelBackend {
    frames: mpsc::Sender<String>,
}

impl ChannelBackend {
    pub fn new(frames: mpsc::Sender<String>) -> Self {
        Self { frames }
    }
}

#[async_trait]
impl LayoutBackend for ChannelBackend {
    fn name(&self) -> &str {
        "channel"
    }

    async fn send(&self, request: LayoutRequest) -> Result<(), LayoutError> {
        let frame = request.encode()?;
        self.frames.send(frame).await.map_err(|_| LayoutError::Closed)
    }
}

/// The service side of a [`loopback`] connection.
#[derive(Debug)]
pub struct LayoutPeer {
    requests: mpsc::Receiver<String>,
    replies: mpsc::Sender<String>,
}

impl LayoutPeer {
    /// Next request, or `None` once every backend is dropped.
    pub async fn next_request(&mut self) -> Option<Result<LayoutRequest, LayoutError>> {
        let frame = self.requests.recv().await?;
        Some(LayoutRequest::decode(&frame))
    }

    pub async fn reply(&self, message: &LayoutMessage) -> Result<(), LayoutError> {
        self.send_frame(message.encode()?).await
    }

    /// Send a raw frame, well-formed or not.
    pub async fn send_frame(&self, frame: String) -> Result<(), LayoutError> {
        self.replies.send(frame).await.map_err(|_| LayoutError::Closed)
    }
}

/// Latest force-directed paths, kept for the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPaths {
    pub nodes: Vec<serde_json::Value>,
    pub points: Vec<PhysicalNode>,
}

/// What applying a reply did, for the presentation layer to surface.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    Svg(String),
    Processing(String),
    Notice(String),
    PathsUpdated { points: usize },
    CircuitReplaced { modules: usize },
}

/// Receiving half: decodes replies and applies them to a session.
#[derive(Debug)]
pub struct LayoutInbox {
    frames: mpsc::Receiver<String>,
    paths: Option<LayoutPaths>,
}

impl LayoutInbox {
    pub fn new(frames: mpsc::Receiver<String>) -> Self {
        Self {
            frames,
            paths: None,
        }
    }

    pub fn paths(&self) -> Option<&LayoutPaths> {
        self.paths.as_ref()
    }

    /// Wait for the next reply. `None` once the service side is gone.
    pub async fn recv(&mut self) -> Option<Result<LayoutMessage, LayoutError>> {
        let frame = self.frames.recv().await?;
        Some(LayoutMessage::decode(&frame))
    }

    /// Wait for the next reply and apply it.
    pub async fn pump(
        &mut self,
        session: &mut EditorSession,
    ) -> Option<Result<LayoutEvent, LayoutError>> {
        let message = self.recv().await?;
        Some(message.map(|m| self.apply(m, session)))
    }

    /// Apply every reply already queued without waiting. Malformed frames
    /// are logged and skipped.
    pub fn drain(&mut self, session: &mut EditorSession) -> Vec<LayoutEvent> {
        let mut events = Vec::new();
        while let Ok(frame) = self.frames.try_recv() {
            match LayoutMessage::decode(&frame) {
                Ok(message) => events.push(self.apply(message, session)),
                Err(e) => tracing::warn!("Dropping layout frame: {}", e),
            }
        }
        events
    }

    pub fn apply(&mut self, message: LayoutMessage, session: &mut EditorSession) -> LayoutEvent {
        tracing::debug!("Layout message: {}", message.label());
        match message {
            LayoutMessage::Svg { file } => LayoutEvent::Svg(file),
            LayoutMessage::Processing { file } => LayoutEvent::Processing(file),
            LayoutMessage::Message { message } => LayoutEvent::Notice(message),
            LayoutMessage::Paths { nodes, points } => {
                let count = points.len();
                self.paths = Some(LayoutPaths { nodes, points });
                LayoutEvent::PathsUpdated { points: count }
            }
            LayoutMessage::Graph { circuit } => {
                session.replace_circuit(circuit);
                let modules = session
                    .circuit()
                    .layers
                    .values()
                    .map(|l| l.modules.len())
                    .sum();
                LayoutEvent::CircuitReplaced { modules }
            }
        }
    }
}

/// Backend, inbox and service stand-in joined by bounded channels.
///
/// A `capacity` of zero is raised to one.
pub fn loopback(capacity: usize) -> (ChannelBackend, LayoutInbox, LayoutPeer) {
    let capacity = capacity.max(1);
    let (request_tx, request_rx) = mpsc::channel(capacity);
    let (reply_tx, reply_rx) = mpsc::channel(capacity);
    (
        ChannelBackend::new(request_tx),
        LayoutInbox::new(reply_rx),
        LayoutPeer {
            requests: request_rx,
            replies: reply_tx,
        },
    )
}
