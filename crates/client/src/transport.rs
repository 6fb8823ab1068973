//! WebSocket transport.
//!
//! One connection per session; no automatic reconnection. The outbound
//! half runs as its own task draining the outbox, so senders never
//! block on the socket.

use anyhow::{Context, Result};
use async_tungstenite::WebSocketStream;
use async_tungstenite::tokio::{ConnectStream, connect_async};
use async_tungstenite::tungstenite::Message;
use futures_util::SinkExt;
use futures_util::stream::SplitSink;
use game_protocol::ClientMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type WsSink = SplitSink<WebSocketStream<ConnectStream>, Message>;

/// Opens the socket. The handshake failing is fatal; there is nothing
/// to play without a server.
pub async fn connect(url: &str) -> Result<WebSocketStream<ConnectStream>> {
    let (stream, response) = connect_async(url)
        .await
        .with_context(|| format!("connecting to {url}"))?;
    tracing::info!(url, status = %response.status(), "connected");
    Ok(stream)
}

/// Drains the outbox into the socket until either side closes.
pub fn spawn_outbound(
    mut sink: WsSink,
    mut outbox_rx: mpsc::UnboundedReceiver<ClientMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            let frame = match message.to_frame() {
                Ok(frame) => frame,
                Err(error) => {
                    tracing::error!(%error, "unserializable outbound message");
                    continue;
                }
            };
            tracing::debug!(frame, "sending");
            if let Err(error) = sink.send(Message::text(frame)).await {
                tracing::warn!(%error, "outbound send failed, stopping writer");
                break;
            }
        }
    })
}
