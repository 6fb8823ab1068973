//! Fire-and-forget outbound message channel.

use game_protocol::ClientMessage;
use tokio::sync::mpsc;

/// Sender half of the outbound queue. Sends are fire-and-forget: the
/// server answers with state pushes, never correlated responses, so a
/// send that fails because the transport is gone is logged and
/// dropped.
#[derive(Clone, Debug)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl Outbox {
    /// Creates the outbox and the receiver the transport drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, message: ClientMessage) {
        if self.tx.send(message).is_err() {
            tracing::warn!("transport closed, dropping outbound message");
        }
    }
}
