//! Line-oriented terminal frontend.
//!
//! Implements the core's render sinks over stdout. Every sink call
//! prints and returns; there is no retained screen state, so the
//! transcript reads top to bottom like the game log it is.

use client_core::{
    CombatRenderSink, CombatView, InventoryRenderSink, MapRenderSink, MapState, Notice,
    NoticeLevel, NoticeSink,
};
use game_protocol::{
    EquipmentPayload, InventoryPayload, MAP_HEIGHT, MAP_WIDTH, Position, TextLine,
};

pub struct LineFrontend;

impl LineFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl NoticeSink for LineFrontend {
    fn notice(&self, notice: Notice) {
        let prefix = match notice.level {
            NoticeLevel::Info => " ::",
            NoticeLevel::Warning => " !!",
            NoticeLevel::Error => "XX!",
        };
        println!("{prefix} {}", notice.text);
    }
}

impl MapRenderSink for LineFrontend {
    fn map_updated(&self, state: &MapState) {
        println!();
        println!("== {} ({}) @ {}", state.map_name, state.map_id, state.position);
        for y in 0..MAP_HEIGHT as i32 {
            let mut row = String::with_capacity(MAP_WIDTH * 2);
            for x in 0..MAP_WIDTH as i32 {
                row.push(glyph(state, Position::new(x, y)));
                row.push(' ');
            }
            println!("{row}");
        }
        if !state.monsters.is_empty() {
            let mut monsters: Vec<_> = state.monsters.iter().collect();
            monsters.sort_by_key(|(pos, _)| **pos);
            for (pos, monster) in monsters {
                let marker = if monster.is_boss { " [BOSS]" } else { "" };
                println!("   {} {}{marker}", pos, monster.name);
            }
        }
        for npc in &state.npcs {
            println!("   {} {} ({})", npc.position, npc.name, npc.npc_name);
        }
        for entrance in state.entrances.values() {
            println!("   {} -> {}", entrance.position, entrance.name);
        }
    }
}

fn glyph(state: &MapState, pos: Position) -> char {
    if pos == state.position {
        return '@';
    }
    if !state.is_revealed(pos) {
        return ' ';
    }
    if let Some(monster) = state.monsters.get(&pos) {
        return if monster.is_boss { 'B' } else { 'm' };
    }
    if state.npc_at(pos).is_some() {
        return 'N';
    }
    if state.entrance_at(pos).is_some() {
        return 'E';
    }
    match state.tile(pos) {
        Some(tile) if tile.is_wall() => '#',
        Some(_) => '.',
        None => ' ',
    }
}

impl InventoryRenderSink for LineFrontend {
    fn inventory_updated(&self, payload: &InventoryPayload) {
        println!("== {} ({} items)", payload.storage_type, payload.items.len());
        for item in &payload.items {
            let mut line = format!("  [{:>2}] {} x{}", item.slot, item.item_id, item.quantity);
            if item.sockets > 0 {
                line.push_str(&format!(
                    " ({}/{} sockets)",
                    item.socketed_runes.len(),
                    item.sockets
                ));
            }
            if let Some(runeword) = &item.runeword_id {
                line.push_str(&format!(" <{runeword}>"));
            }
            println!("{line} [{}]", item.quality);
        }
    }

    fn equipment_updated(&self, payload: &EquipmentPayload) {
        println!("== equipment");
        // Server-resolved display data; render verbatim.
        match serde_json::to_string_pretty(&payload.equipment) {
            Ok(text) => println!("{text}"),
            Err(error) => tracing::warn!(%error, "unprintable equipment payload"),
        }
    }
}

impl CombatRenderSink for LineFrontend {
    fn combat_started(&self, _view: &CombatView) {
        println!("-- combat --");
    }

    fn combat_updated(&self, view: &CombatView) {
        let mut line = format!("   hp {} mp {}", view.player_hp, view.player_mp);
        if let Some(summon) = &view.summon {
            line.push_str(&format!(" | {} {}", summon.name, summon.hp));
        }
        for monster in &view.monsters {
            line.push_str(&format!(" | #{} {} {}", monster.index, monster.name, monster.hp));
        }
        println!("{line}");
    }

    fn combat_line(&self, line: &TextLine) {
        println!("   {}", line.text);
    }

    fn combat_finished(&self, _view: &CombatView, victory: bool) {
        let outcome = if victory { "victory" } else { "defeat" };
        println!("-- combat over: {outcome} --");
    }
}
