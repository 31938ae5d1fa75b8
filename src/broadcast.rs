// Fan-out
//
// The dispatcher never touches sockets directly; it sends through the
// `Broadcaster` capability, which the server wires to a tokio broadcast
// channel and tests replace with a recording double.

use crate::protocol::ServerFrame;
use tokio::sync::broadcast;

/// Delivery target for an outbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Every connected client
    All,

    /// Exactly one connection, by socket id
    One(String),
}

/// An outbound frame paired with its target
#[derive(Debug, Clone)]
pub struct Delivery {
    pub target: Target,
    pub frame: ServerFrame,
}

impl Delivery {
    /// Whether the connection with this socket id should receive the frame
    pub fn is_for(&self, socket_id: &str) -> bool {
        match &self.target {
            Target::All => true,
            Target::One(id) => id == socket_id,
        }
    }
}

/// Outbound messaging capability of the dispatcher.
///
/// Fire-and-forget: neither method reports delivery failure, matching the
/// best-effort contract of the presence feature.
pub trait Broadcaster: Send + Sync {
    /// Send a frame to every connected client
    fn send_to_all(&self, frame: ServerFrame);

    /// Send a frame to exactly one connection
    fn send_to_one(&self, socket_id: &str, frame: ServerFrame);
}

/// Production broadcaster over a tokio broadcast channel. Every connection
/// task subscribes and filters deliveries by target; a lagging receiver skips
/// frames instead of blocking the sender.
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<Delivery>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.tx.subscribe()
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn send_to_all(&self, frame: ServerFrame) {
        // Err means no live receivers, which is fine for best-effort fan-out
        let _ = self.tx.send(Delivery {
            target: Target::All,
            frame,
        });
    }

    fn send_to_one(&self, socket_id: &str, frame: ServerFrame) {
        let _ = self.tx.send(Delivery {
            target: Target::One(socket_id.to_string()),
            frame,
        });
    }
}
