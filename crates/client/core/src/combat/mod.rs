//! Combat replay: deterministic transcript playback over a cancelable
//! scheduler.

mod engine;
mod session;

pub use engine::{CombatReplayEngine, CombatStartError, DEFAULT_TICK, ReplayTicket};
pub use session::{CombatSession, CombatView, MonsterView, SummonView, TickOutcome};
