//! Map/exploration state: the fog-of-war store and the click resolver.

mod resolver;
pub(crate) mod state;

pub use resolver::{Intent, RejectReason, resolve_click};
pub use state::{MapApplyError, MapState, MapStateStore, Tile};
