//! Terminal game client entry point.
//!
//! Composition root: loads configuration, opens the socket and runs a
//! single-owner event loop over inbound frames, combat refreshes and
//! stdin commands. All game state lives in [`SessionContext`] inside
//! this loop; tasks only ever talk to it through channels.

mod commands;
mod config;
mod frontend;
mod logging;
mod transport;

use std::sync::Arc;

use anyhow::Result;
use async_tungstenite::tungstenite::Message;
use client_core::{MessageRouter, Notice, NoticeSink, Outbox, SessionContext};
use commands::{CommandInterpreter, Flow};
use config::ClientConfig;
use frontend::LineFrontend;
use futures_util::StreamExt;
use game_protocol::{ClientMessage, ServerMessage};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    logging::setup_logging(&config)?;

    tracing::info!(server = %config.server_url, "starting client");

    let frontend = Arc::new(LineFrontend::new());
    let (mut ctx, mut refresh_rx) = SessionContext::with_combat_tick(
        frontend.clone(),
        frontend.clone(),
        config.combat_tick,
    );
    let mut router = MessageRouter::new(frontend.clone(), frontend.clone());
    let mut interpreter = CommandInterpreter::new(frontend.clone());
    let (outbox, outbox_rx) = Outbox::channel();

    let socket = transport::connect(&config.server_url).await?;
    let (ws_sink, mut ws_stream) = socket.split();
    let writer = transport::spawn_outbound(ws_sink, outbox_rx);

    let keepalive = {
        let outbox = outbox.clone();
        let period = config.ping_interval;
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.tick().await; // immediate first tick
            loop {
                ticks.tick().await;
                outbox.send(ClientMessage::Ping);
            }
        })
    };

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    frontend.notice(Notice::info("connected; type `help` for commands"));

    loop {
        tokio::select! {
            frame = ws_stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match ServerMessage::parse(&text) {
                    Ok(message) => router.dispatch(message, &mut ctx, &outbox),
                    Err(error) => tracing::warn!(%error, "dropping undecodable frame"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    frontend.notice(Notice::error("connection closed by server"));
                    break;
                }
                // WebSocket-level ping/pong is answered by the library.
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    tracing::error!(%error, "socket read failed");
                    frontend.notice(Notice::error(format!("connection lost: {error}")));
                    break;
                }
            },
            refreshed = refresh_rx.recv() => {
                if let Some(character) = refreshed {
                    frontend.notice(Notice::info(format!(
                        "{} lv{} | hp {}/{} | exp {} gold {}",
                        character.name,
                        character.level,
                        character.hp,
                        character.max_hp,
                        character.exp,
                        character.gold,
                    )));
                    ctx.apply_character(character);
                }
            },
            line = stdin.next_line() => match line? {
                Some(line) => {
                    if interpreter.handle_line(&line, &mut ctx, &outbox) == Flow::Quit {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    keepalive.abort();
    writer.abort();
    ctx.combat.cancel();
    tracing::info!("client shutdown complete");
    Ok(())
}
