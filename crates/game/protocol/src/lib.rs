//! Wire protocol shared between the game server and the client.
//!
//! The server is authoritative for all game rules; this crate only
//! defines the shapes it sends and accepts:
//!
//! - [`types`]: value types shared across messages (positions, quality
//!   tiers, resource meters, map entities).
//! - [`messages`]: inbound server → client JSON envelopes.
//! - [`outbound`]: client → server intent messages.
//! - [`combat`]: the line-oriented combat transcript grammar and its
//!   free-text style classification.

pub mod combat;
pub mod messages;
pub mod outbound;
pub mod types;

pub use combat::{
    CombatLine, InitLine, MonsterEntry, MonsterStatus, StatusLine, SummonStatus, TextLine,
    TextStyle,
};
pub use messages::{
    AckKind, CharacterSnapshot, CombatResultPayload, EquipmentPayload, InventoryPayload,
    ItemSnapshot, MapChangePayload, MapSnapshot, OpResult, ProtocolError, RuneId, RuneInfo,
    RunewordRecipe, ServerMessage, SocketRuneResult,
};
pub use outbound::{ClientMessage, ExitKind, StorageKind};
pub use types::{
    Entrance, MonsterSummary, Npc, Position, Quality, ResourceMeter, HUB_MAP_ID, MAP_HEIGHT,
    MAP_WIDTH, PORTAL_ENTRANCE, PORTAL_EXIT,
};
