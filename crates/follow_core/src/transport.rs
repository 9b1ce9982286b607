//! Context enumeration and message delivery.
//!
//! [`ContextTree`] is one rendering context's view of the tree it lives
//! in: its own viewport, its direct children, and a way to push envelopes
//! at frames. [`FrameHub`] plus [`LocalContextTree`] provide an in-process
//! implementation over unbounded channels for tests and the simulator;
//! real embeddings supply their own.

use std::{collections::HashMap, sync::Arc};

use shared::{
    domain::{FrameId, FrameInfo, ViewSize},
    protocol::Envelope,
};
use tokio::sync::mpsc;
use tracing::debug;

/// One rendering context's view of the context tree.
///
/// `send_to` and `broadcast` are best-effort and non-blocking: no delivery
/// or ordering guarantee, no return value. Only direct children are
/// enumerable; deeper nesting is invisible to the owning context.
pub trait ContextTree {
    /// Viewport dimensions of the owning context.
    fn view_size(&self) -> ViewSize;

    /// The owning context's own frame id.
    fn self_frame(&self) -> FrameId;

    /// Directly embedded child frames with their bounding offsets.
    fn child_frames(&self) -> Vec<FrameInfo>;

    /// Deliver `envelope` to one frame, fire-and-forget.
    fn send_to(&self, target: FrameId, envelope: &Envelope);

    /// Deliver `envelope` to the owning context plus every direct child.
    fn broadcast(&self, envelope: &Envelope) {
        self.send_to(self.self_frame(), envelope);
        for child in self.child_frames() {
            self.send_to(child.frame, envelope);
        }
    }
}

/// Envelope text as delivered to a frame's mailbox, tagged with the frame
/// it came from so replies can be addressed.
#[derive(Debug, Clone)]
pub struct FrameMessage {
    pub sender: FrameId,
    pub text: String,
}

/// Registers frames and wires their mailboxes before the hub is shared.
#[derive(Debug, Default)]
pub struct FrameHubBuilder {
    senders: HashMap<FrameId, mpsc::UnboundedSender<FrameMessage>>,
    next_id: u64,
}

impl FrameHubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a frame id and its mailbox.
    pub fn register(&mut self) -> (FrameId, FrameMailbox) {
        let frame = FrameId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.insert(frame, tx);
        (frame, FrameMailbox { rx })
    }

    /// Freeze registration and produce the shareable hub.
    pub fn finish(self) -> FrameHub {
        FrameHub {
            senders: Arc::new(self.senders),
        }
    }
}

/// In-process frame registry backed by unbounded channels.
///
/// Sends never block and never report failure; posting to an unknown frame
/// or one whose mailbox was dropped discards the message, matching the
/// best-effort transport contract.
#[derive(Debug, Clone)]
pub struct FrameHub {
    senders: Arc<HashMap<FrameId, mpsc::UnboundedSender<FrameMessage>>>,
}

impl FrameHub {
    /// Serialize and deliver `envelope` from one frame to another.
    pub fn post(&self, from: FrameId, to: FrameId, envelope: &Envelope) {
        let text = match envelope.to_json() {
            Ok(text) => text,
            Err(err) => {
                debug!(from = from.0, to = to.0, %err, "transport: dropping unencodable envelope");
                return;
            }
        };
        match self.senders.get(&to) {
            Some(tx) => {
                // Receiver may be gone; fire-and-forget means we don't care.
                let _ = tx.send(FrameMessage { sender: from, text });
            }
            None => debug!(from = from.0, to = to.0, "transport: no such frame"),
        }
    }
}

/// Receiving half of one frame's channel.
#[derive(Debug)]
pub struct FrameMailbox {
    rx: mpsc::UnboundedReceiver<FrameMessage>,
}

impl FrameMailbox {
    /// Wait for the next message; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<FrameMessage> {
        self.rx.recv().await
    }

    /// Drain without waiting; `None` when the mailbox is currently empty.
    pub fn try_recv(&mut self) -> Option<FrameMessage> {
        self.rx.try_recv().ok()
    }
}

/// [`ContextTree`] for one frame of a [`FrameHub`].
///
/// The embedder supplies the geometry: its own viewport plus the bounding
/// offset of each direct child.
#[derive(Debug, Clone)]
pub struct LocalContextTree {
    hub: FrameHub,
    self_frame: FrameId,
    view_size: ViewSize,
    children: Vec<FrameInfo>,
}

impl LocalContextTree {
    pub fn new(
        hub: FrameHub,
        self_frame: FrameId,
        view_size: ViewSize,
        children: Vec<FrameInfo>,
    ) -> Self {
        Self {
            hub,
            self_frame,
            view_size,
            children,
        }
    }
}

impl ContextTree for LocalContextTree {
    fn view_size(&self) -> ViewSize {
        self.view_size
    }

    fn self_frame(&self) -> FrameId {
        self.self_frame
    }

    fn child_frames(&self) -> Vec<FrameInfo> {
        self.children.clone()
    }

    fn send_to(&self, target: FrameId, envelope: &Envelope) {
        self.hub.post(self.self_frame, target, envelope);
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
