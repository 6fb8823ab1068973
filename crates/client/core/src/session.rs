//! Explicit session context.
//!
//! The source of record for everything the client knows about the
//! logged-in character: the map store, the combat engine, skill
//! toggles and the server catalogs. Components receive it explicitly;
//! there is no ambient module state.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use game_protocol::{CharacterSnapshot, ItemSnapshot, RuneInfo, RunewordRecipe};
use tokio::sync::mpsc;

use crate::combat::CombatReplayEngine;
use crate::map::MapStateStore;
use crate::sink::{CombatRenderSink, MapRenderSink};

/// Per-connection client state. Owned by the dispatch loop; render
/// layers only ever see snapshots pushed through sinks.
pub struct SessionContext {
    pub character: Option<CharacterSnapshot>,
    pub map: MapStateStore,
    pub combat: CombatReplayEngine,
    pub disabled_skills: HashSet<String>,
    /// Server catalogs, immutable for the session once received.
    pub runeword_catalog: Vec<RunewordRecipe>,
    pub rune_catalog: Vec<RuneInfo>,
    /// Most recent inventory listing; consulted for rune counts when
    /// the socketing dialog opens.
    pub inventory: Vec<ItemSnapshot>,
}

impl SessionContext {
    /// Wires up a fresh session. The returned receiver yields character
    /// refreshes emitted by victorious combat replays; the owner of the
    /// event loop applies them via [`SessionContext::apply_character`].
    pub fn new(
        map_sink: Arc<dyn MapRenderSink>,
        combat_sink: Arc<dyn CombatRenderSink>,
    ) -> (Self, mpsc::UnboundedReceiver<CharacterSnapshot>) {
        Self::with_combat_tick(map_sink, combat_sink, crate::combat::DEFAULT_TICK)
    }

    /// Like [`SessionContext::new`] with an explicit replay cadence.
    pub fn with_combat_tick(
        map_sink: Arc<dyn MapRenderSink>,
        combat_sink: Arc<dyn CombatRenderSink>,
        tick: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<CharacterSnapshot>) {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let context = Self {
            character: None,
            map: MapStateStore::new(map_sink),
            combat: CombatReplayEngine::with_tick(combat_sink, refresh_tx, tick),
            disabled_skills: HashSet::new(),
            runeword_catalog: Vec::new(),
            rune_catalog: Vec::new(),
            inventory: Vec::new(),
        };
        (context, refresh_rx)
    }

    pub fn apply_character(&mut self, character: CharacterSnapshot) {
        tracing::debug!(level = character.level, hp = character.hp, "character refreshed");
        self.character = Some(character);
    }

    /// True if the item id is a rune per the server catalog.
    pub fn is_rune(&self, item_id: &str) -> bool {
        self.rune_catalog.iter().any(|rune| rune.id == item_id)
    }
}
