//! Client-side state synchronization for the tile RPG.
//!
//! The server is authoritative for every game rule; this crate turns
//! its message stream into locally consistent state and user clicks
//! into well-formed intents:
//!
//! - [`map`]: the map state store (fog-of-war, entities) and the click
//!   → intent resolver.
//! - [`combat`]: the combat replay session and its timer-driven engine.
//! - [`runeword`]: the recipe compatibility matcher.
//! - [`session`]: the explicit session context that replaces ambient
//!   globals.
//! - [`router`]: inbound message demultiplexing and one-shot
//!   subscriptions.
//! - [`sink`]: render-sink traits; the core never assumes a UI toolkit.
//!
//! All state objects are owned by exactly one component and exposed to
//! renderers as read snapshots only.

pub mod combat;
pub mod map;
pub mod outbox;
pub mod router;
pub mod runeword;
pub mod session;
pub mod sink;

pub use combat::{CombatReplayEngine, CombatSession, CombatStartError, CombatView, ReplayTicket};
pub use map::{Intent, MapApplyError, MapState, MapStateStore, RejectReason, Tile, resolve_click};
pub use outbox::Outbox;
pub use router::MessageRouter;
pub use runeword::{RuneCounts, RunewordCandidate, SocketedItem, match_runewords};
pub use session::SessionContext;
pub use sink::{
    CombatRenderSink, InventoryRenderSink, MapRenderSink, Notice, NoticeLevel, NoticeSink,
};
