//! Render-sink traits.
//!
//! The core pushes immutable snapshots through these seams and never
//! assumes what is on the other side (terminal, canvas, test
//! recorder). Sinks are called synchronously after each state change;
//! implementations should be cheap and must not call back into the
//! owning component.

use game_protocol::{EquipmentPayload, InventoryPayload, TextLine};

use crate::combat::CombatView;
use crate::map::MapState;

/// Severity of a user-facing notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A one-line user-facing notice: intent rejections, server-reported
/// failures, connectivity changes, chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Receives user-facing notices.
pub trait NoticeSink: Send + Sync {
    fn notice(&self, notice: Notice);
}

/// Receives map snapshots after every applied update.
pub trait MapRenderSink: Send + Sync {
    fn map_updated(&self, state: &MapState);
}

/// Receives inventory and equipment listings. Rendering them is pure
/// templating over server structures; the core just forwards.
pub trait InventoryRenderSink: Send + Sync {
    fn inventory_updated(&self, payload: &InventoryPayload);
    fn equipment_updated(&self, payload: &EquipmentPayload);
}

/// Receives combat replay output, one call per scheduler tick.
pub trait CombatRenderSink: Send + Sync {
    /// A new session was seeded from an init line (or playback began).
    fn combat_started(&self, view: &CombatView);

    /// Numeric state changed (status line applied).
    fn combat_updated(&self, view: &CombatView);

    /// A free-text line became visible.
    fn combat_line(&self, line: &TextLine);

    /// Playback reached the end of the transcript.
    fn combat_finished(&self, view: &CombatView, victory: bool);
}
