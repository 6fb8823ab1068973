//! Client → server intent messages.
//!
//! Serialized internally tagged so each message flattens to the exact
//! wire shape the server reads, e.g. `{"type": "move", "x": 3, "y": 4}`.
//! All sends are fire-and-forget: the server answers with state pushes,
//! not correlated responses.

use serde::Serialize;

use crate::types::Position;

/// Which stored container an inventory request targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Inventory,
    Warehouse,
}

/// Which fixed portal cell the player is using.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitKind {
    /// Top-left portal, back toward the previous map.
    Entrance,
    /// Bottom-right portal, deeper in.
    Exit,
}

/// An outbound message. Variant names serialize as the wire `type`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Move {
        x: i32,
        y: i32,
    },
    Attack {
        pos: Position,
    },
    UseEntrance {
        entrance_id: String,
    },
    UseExit {
        exit_type: ExitKind,
    },
    GetMapState,
    GetInventory {
        storage: StorageKind,
    },
    Equip {
        slot: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        target_slot: Option<String>,
    },
    Recycle {
        slot: u32,
    },
    RecycleAll {
        #[serde(skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
    },
    MoveToWarehouse {
        slot: u32,
    },
    MoveToInventory {
        slot: u32,
    },
    OrganizeInventory {
        storage: StorageKind,
    },
    GetEquipment,
    LearnSkill {
        skill_id: String,
    },
    ToggleSkill {
        skill_id: String,
        enabled: bool,
    },
    GetDisabledSkills,
    UseSkillbook {
        slot: u32,
    },
    UseBossItem {
        slot: u32,
    },
    SocketRune {
        equipment_slot: String,
        rune_slot: u32,
    },
    SocketRuneInventory {
        target_slot: u32,
        rune_slot: u32,
    },
    GetRunewords,
    GetRunes,
    Chat {
        message: String,
    },
    ReturnCity,
    ResetMap,
    Ping,
}

impl ClientMessage {
    pub fn move_to(position: Position) -> Self {
        Self::Move {
            x: position.x,
            y: position.y,
        }
    }

    /// Serializes to the wire frame. Infallible in practice; the
    /// `Result` only propagates serde's signature.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
