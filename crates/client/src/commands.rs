//! Stdin command interpreter.
//!
//! Translates typed commands into outbound messages or local queries.
//! Map clicks go through the intent resolver; everything else maps
//! almost one-to-one onto [`ClientMessage`] variants.

use std::sync::Arc;

use client_core::{
    Intent, Notice, NoticeSink, Outbox, RuneCounts, SessionContext, SocketedItem, match_runewords,
    resolve_click,
};
use game_protocol::{ClientMessage, Position, StorageKind};

/// Whether the event loop keeps running after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interprets one line of input at a time. Holds the message awaiting
/// a yes/no confirmation, if any.
pub struct CommandInterpreter {
    notices: Arc<dyn NoticeSink>,
    pending_confirm: Option<(String, ClientMessage)>,
}

impl CommandInterpreter {
    pub fn new(notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            notices,
            pending_confirm: None,
        }
    }

    pub fn handle_line(&mut self, line: &str, ctx: &mut SessionContext, outbox: &Outbox) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }

        if let Some((prompt, message)) = self.pending_confirm.take() {
            match line {
                "y" | "yes" => outbox.send(message),
                _ => self.info(format!("cancelled: {prompt}")),
            }
            return Flow::Continue;
        }

        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "help" => self.print_help(),
            "quit" | "exit" => return Flow::Quit,
            "click" => self.click(rest, ctx, outbox),
            "say" => {
                if rest.is_empty() {
                    self.warn("usage: say <message>");
                } else {
                    outbox.send(ClientMessage::Chat {
                        message: rest.to_owned(),
                    });
                }
            }
            "status" => self.status(ctx),
            "map" => outbox.send(ClientMessage::GetMapState),
            "bag" => outbox.send(ClientMessage::GetInventory {
                storage: StorageKind::Inventory,
            }),
            "depot" => outbox.send(ClientMessage::GetInventory {
                storage: StorageKind::Warehouse,
            }),
            "gear" => outbox.send(ClientMessage::GetEquipment),
            "equip" => self.slot_command(rest, "equip <slot>", |slot| ClientMessage::Equip {
                slot,
                target_slot: None,
            }, outbox),
            "recycle" => {
                self.slot_command(rest, "recycle <slot>", |slot| ClientMessage::Recycle { slot }, outbox)
            }
            "store" => self.slot_command(rest, "store <slot>", |slot| {
                ClientMessage::MoveToWarehouse { slot }
            }, outbox),
            "fetch" => self.slot_command(rest, "fetch <slot>", |slot| {
                ClientMessage::MoveToInventory { slot }
            }, outbox),
            "learn" => {
                if rest.is_empty() {
                    self.warn("usage: learn <skill_id>");
                } else {
                    outbox.send(ClientMessage::LearnSkill {
                        skill_id: rest.to_owned(),
                    });
                }
            }
            "toggle" => self.toggle(rest, ctx, outbox),
            "runes" => outbox.send(ClientMessage::GetRunes),
            "words" => self.runewords(rest, ctx, outbox),
            "socket" => self.socket(rest, outbox),
            "city" => outbox.send(ClientMessage::ReturnCity),
            "reset" => outbox.send(ClientMessage::ResetMap),
            _ => self.warn(format!("unknown command `{command}`; try `help`")),
        }
        Flow::Continue
    }

    fn click(&mut self, rest: &str, ctx: &SessionContext, outbox: &Outbox) {
        let Some(clicked) = parse_position(rest) else {
            self.warn("usage: click <x> <y>");
            return;
        };
        let Some(state) = ctx.map.state() else {
            self.warn("no map yet");
            return;
        };

        match resolve_click(state, clicked) {
            Intent::Reject(reason) => self.warn(format!("{clicked}: {reason}")),
            Intent::Talk(npc) => self.info(format!("{}: {}", npc.name, npc.npc_name)),
            Intent::UseEntrance { id, name } => {
                let prompt = format!("enter {name}");
                self.info(format!("{prompt}? (y/n)"));
                self.pending_confirm = Some((prompt, ClientMessage::UseEntrance { entrance_id: id }));
            }
            intent => {
                if let Some(message) = intent.to_message() {
                    outbox.send(message);
                }
            }
        }
    }

    fn toggle(&self, rest: &str, ctx: &SessionContext, outbox: &Outbox) {
        let Some(skill_id) = rest.split_whitespace().next() else {
            self.warn("usage: toggle <skill_id>");
            return;
        };
        // Flip relative to the locally tracked state; the server
        // confirms with `skill_toggled`.
        let enabled = ctx.disabled_skills.contains(skill_id);
        outbox.send(ClientMessage::ToggleSkill {
            skill_id: skill_id.to_owned(),
            enabled,
        });
    }

    /// Lists which recipes the item in an inventory slot can still
    /// become, using the cached catalogs.
    fn runewords(&self, rest: &str, ctx: &SessionContext, outbox: &Outbox) {
        if ctx.runeword_catalog.is_empty() {
            outbox.send(ClientMessage::GetRunewords);
            self.info("fetching runeword catalog, try again");
            return;
        }
        let Ok(slot) = rest.parse::<u32>() else {
            self.warn("usage: words <inventory_slot>");
            return;
        };
        let Some(item) = ctx.inventory.iter().find(|item| item.slot == slot) else {
            self.warn(format!("no item in slot {slot}"));
            return;
        };

        let equip_slot = item
            .info
            .get("slot")
            .and_then(|value| value.as_str())
            .unwrap_or("weapon");
        let target = SocketedItem {
            slot: equip_slot.to_owned(),
            total_sockets: item.sockets,
            socketed: item.socketed_runes.clone(),
            runeword_id: item.runeword_id.clone(),
        };
        let available = RuneCounts::from_inventory(&ctx.inventory, |id| ctx.is_rune(id));

        let candidates = match_runewords(&target, &available, &ctx.runeword_catalog);
        if candidates.is_empty() {
            self.info(format!("{}: no compatible runewords", item.item_id));
            return;
        }
        for candidate in candidates {
            let status = if candidate.can_complete {
                "ready".to_owned()
            } else {
                format!("missing {}", candidate.missing_runes.join(", "))
            };
            self.info(format!(
                "{} (lv{}): {} [{status}]",
                candidate.recipe.name,
                candidate.recipe.level_req,
                candidate.recipe.runes.join(" "),
            ));
        }
    }

    fn socket(&self, rest: &str, outbox: &Outbox) {
        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next().and_then(|s| s.parse().ok())) {
            (Some(equipment_slot), Some(rune_slot)) => outbox.send(ClientMessage::SocketRune {
                equipment_slot: equipment_slot.to_owned(),
                rune_slot,
            }),
            _ => self.warn("usage: socket <equipment_slot> <rune_inventory_slot>"),
        }
    }

    fn status(&self, ctx: &SessionContext) {
        match &ctx.character {
            Some(character) => self.info(format!(
                "{} lv{} {} | hp {}/{} mp {}/{} | exp {} gold {}",
                character.name,
                character.level,
                character.char_class,
                character.hp,
                character.max_hp,
                character.mp,
                character.max_mp,
                character.exp,
                character.gold,
            )),
            None => self.warn("not in game yet"),
        }
    }

    fn slot_command(
        &self,
        rest: &str,
        usage: &str,
        build: impl FnOnce(u32) -> ClientMessage,
        outbox: &Outbox,
    ) {
        match rest.parse::<u32>() {
            Ok(slot) => outbox.send(build(slot)),
            Err(_) => self.warn(format!("usage: {usage}")),
        }
    }

    fn print_help(&self) {
        self.info(
            "commands: click <x> <y>, say <msg>, status, map, bag, depot, gear, \
             equip/recycle/store/fetch <slot>, learn <skill>, toggle <skill>, \
             runes, words <slot>, socket <gear_slot> <rune_slot>, city, reset, quit",
        );
    }

    fn info(&self, text: impl Into<String>) {
        self.notices.notice(Notice::info(text));
    }

    fn warn(&self, text: impl Into<String>) {
        self.notices.notice(Notice::warning(text));
    }
}

fn parse_position(rest: &str) -> Option<Position> {
    let mut parts = rest.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    Some(Position::new(x, y))
}
