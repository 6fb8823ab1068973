//! Inbound message demultiplexing.
//!
//! Every decoded [`ServerMessage`] passes through here exactly once,
//! in arrival order, and is routed to the component that owns the
//! state it describes. Server-reported failures become notices and
//! never touch local state; the client applies nothing speculatively.
//!
//! Dialogs that wait for a single reply (the rune-socket popup)
//! register a one-shot subscription instead of hooking their own
//! listener onto the stream; the first matching message resolves and
//! consumes it.

use std::collections::HashMap;
use std::sync::Arc;

use game_protocol::{OpResult, ServerMessage};
use tokio::sync::oneshot;

use crate::outbox::Outbox;
use crate::session::SessionContext;
use crate::sink::{InventoryRenderSink, Notice, NoticeSink};

pub struct MessageRouter {
    notices: Arc<dyn NoticeSink>,
    inventory: Arc<dyn InventoryRenderSink>,
    pending: HashMap<String, oneshot::Sender<ServerMessage>>,
}

impl MessageRouter {
    pub fn new(notices: Arc<dyn NoticeSink>, inventory: Arc<dyn InventoryRenderSink>) -> Self {
        Self {
            notices,
            inventory,
            pending: HashMap::new(),
        }
    }

    /// Subscribes to the next message of `kind`. The subscription is
    /// consumed by the first match; registering again for the same kind
    /// replaces the previous waiter (whose receiver then yields a
    /// closed-channel error).
    pub fn expect_once(&mut self, kind: &str) -> oneshot::Receiver<ServerMessage> {
        let (tx, rx) = oneshot::channel();
        if self.pending.insert(kind.to_owned(), tx).is_some() {
            tracing::debug!(kind, "replacing stale one-shot subscription");
        }
        rx
    }

    /// Routes one message. `outbox` is available for follow-up
    /// requests the routing itself requires (currently none; kept so
    /// handlers stay uniform).
    pub fn dispatch(&mut self, message: ServerMessage, ctx: &mut SessionContext, _outbox: &Outbox) {
        if let Some(waiter) = self.pending.remove(message.kind()) {
            // Dropped receivers are fine; routing continues regardless.
            let _ = waiter.send(message.clone());
        }

        match message {
            ServerMessage::EnterGame { character, map } => {
                ctx.apply_character(character);
                self.apply_snapshot(ctx, map);
            }
            ServerMessage::MapState(snapshot) => self.apply_snapshot(ctx, snapshot),
            ServerMessage::MapChange(change) => {
                if change.success == Some(false) || change.state.is_none() {
                    let reason = change.error.unwrap_or_else(|| "map change failed".to_owned());
                    self.notices.notice(Notice::warning(reason));
                    return;
                }
                if let Some(map_id) = &change.map_id {
                    self.notices.notice(Notice::info(format!("entered map {map_id}")));
                }
                if let Some(snapshot) = change.state {
                    self.apply_snapshot(ctx, snapshot);
                }
            }
            ServerMessage::MoveResult(result) => {
                if !result.success {
                    self.notify_failure("move", result);
                }
            }
            ServerMessage::CombatResult(payload) => {
                if let Err(error) = ctx.combat.start(payload) {
                    self.notices.notice(Notice::warning(error.to_string()));
                }
            }
            ServerMessage::Inventory(payload) => {
                ctx.inventory = payload.items.clone();
                self.inventory.inventory_updated(&payload);
            }
            ServerMessage::Equipment(payload) => self.inventory.equipment_updated(&payload),
            ServerMessage::Chat { name, message } => {
                self.notices.notice(Notice::info(format!("[{name}] {message}")));
            }
            ServerMessage::Ack { kind, result } => {
                if result.success {
                    let text = result
                        .message
                        .unwrap_or_else(|| format!("{} ok", kind.as_str()));
                    self.notices.notice(Notice::info(text));
                } else {
                    self.notify_failure(kind.as_str(), result);
                }
            }
            ServerMessage::DisabledSkills(skills) => {
                ctx.disabled_skills = skills.into_iter().collect();
            }
            ServerMessage::SkillToggled { skill_id, enabled } => {
                if enabled {
                    ctx.disabled_skills.remove(&skill_id);
                } else {
                    ctx.disabled_skills.insert(skill_id.clone());
                }
                let state = if enabled { "enabled" } else { "disabled" };
                self.notices.notice(Notice::info(format!("skill {skill_id} {state}")));
            }
            ServerMessage::Runewords(catalog) => {
                tracing::debug!(recipes = catalog.len(), "runeword catalog received");
                ctx.runeword_catalog = catalog;
            }
            ServerMessage::Runes(catalog) => {
                ctx.rune_catalog = catalog;
            }
            ServerMessage::SocketRuneResult(result) => {
                if result.success {
                    let text = result.message.unwrap_or_else(|| "rune socketed".to_owned());
                    self.notices.notice(Notice::info(text));
                } else {
                    let reason = result.error.unwrap_or_else(|| "socketing failed".to_owned());
                    self.notices.notice(Notice::warning(format!("socket_rune failed: {reason}")));
                }
            }
            ServerMessage::Pong => {}
            ServerMessage::Unknown { kind } => {
                tracing::debug!(kind, "dropping unknown message type");
            }
        }
    }

    fn apply_snapshot(&self, ctx: &mut SessionContext, snapshot: game_protocol::MapSnapshot) {
        let map_id = snapshot.map_id.clone();
        if let Err(error) = ctx.map.apply(snapshot) {
            tracing::warn!(%error, map_id, "rejecting malformed map snapshot");
            self.notices
                .notice(Notice::warning(format!("ignored bad map update: {error}")));
        }
    }

    fn notify_failure(&self, what: &str, result: OpResult) {
        let reason = result.error.unwrap_or_else(|| "unknown error".to_owned());
        self.notices.notice(Notice::warning(format!("{what} failed: {reason}")));
    }
}
