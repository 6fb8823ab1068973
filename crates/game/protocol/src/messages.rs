//! Inbound server → client messages.
//!
//! Every frame on the socket is a JSON envelope `{"type": ..., "data":
//! ...}`; the one historical quirk is `chat`, which carries its fields
//! beside `type` instead of under `data`. [`ServerMessage::parse`]
//! reads the envelope and decodes the payload for the declared type.
//! Unknown types are preserved as [`ServerMessage::Unknown`] so the
//! router can log and drop them without failing the stream.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Entrance, MonsterSummary, Npc, Position, Quality};

/// Rune identifiers are server-defined tokens; the client never
/// interprets them beyond equality.
pub type RuneId = String;

/// Errors raised while decoding an inbound frame.
///
/// These abort a single frame, never the session: the dispatch loop
/// logs them and keeps reading.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("frame has no `type` field")]
    MissingType,
    #[error("malformed `{kind}` payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Full map snapshot, the payload of `map_state`, `map_change` and the
/// `map` half of `enter_game`.
///
/// The server always sends authoritative full state: collections that
/// are absent deserialize as empty, never as "unchanged".
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MapSnapshot {
    #[serde(default)]
    pub map_id: String,
    #[serde(default)]
    pub name: String,
    /// Row-major 24x24 grid of 0 (floor) / 1 (wall).
    #[serde(default)]
    pub maze: Vec<Vec<u8>>,
    /// Cells the player has observed, as `[x, y]` pairs.
    #[serde(default)]
    pub revealed: Vec<Position>,
    pub position: Option<Position>,
    /// Monsters keyed by the server's `"x,y"` composite strings.
    #[serde(default)]
    pub monsters: HashMap<String, MonsterSummary>,
    #[serde(default)]
    pub npcs: Vec<Npc>,
    #[serde(default)]
    pub entrances: HashMap<String, Entrance>,
}

/// Character sheet as the server reports it. The core treats this as
/// an opaque snapshot: it is displayed and forwarded, never derived
/// from.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CharacterSnapshot {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub char_class: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub hp: i32,
    #[serde(default)]
    pub max_hp: i32,
    #[serde(default)]
    pub mp: i32,
    #[serde(default)]
    pub max_mp: i32,
    #[serde(default)]
    pub exp: i64,
    #[serde(default)]
    pub gold: i64,
}

/// Payload of `combat_result`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CombatResultPayload {
    /// Absent means success; the server only sets it on refusals
    /// (e.g. attacking an empty cell).
    pub success: Option<bool>,
    pub error: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub victory: bool,
    /// Refreshed character sheet, present on victory.
    pub character: Option<CharacterSnapshot>,
}

impl CombatResultPayload {
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }
}

/// Payload of `map_change`: either a fresh snapshot or a refusal.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MapChangePayload {
    pub success: Option<bool>,
    pub map_id: Option<String>,
    pub state: Option<MapSnapshot>,
    pub error: Option<String>,
}

/// Shared shape of the simple `*_result` acknowledgements.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OpResult {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Result of a rune-socketing request; `runeword_id` is set when the
/// socketed rune completed a recipe.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SocketRuneResult {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
    pub runeword_id: Option<String>,
}

/// One inventory or warehouse stack.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ItemSnapshot {
    #[serde(default)]
    pub slot: u32,
    #[serde(default)]
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub sockets: u32,
    #[serde(default)]
    pub socketed_runes: Vec<RuneId>,
    pub runeword_id: Option<String>,
    /// Static item definition as the server resolved it; pure display
    /// data for the client.
    #[serde(default)]
    pub info: Value,
}

fn default_quantity() -> u32 {
    1
}

/// Payload of `inventory`: either a bare item list or a list tagged
/// with the storage it came from.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum InventoryWire {
    Tagged {
        items: Vec<ItemSnapshot>,
        #[serde(default)]
        storage_type: String,
    },
    Bare(Vec<ItemSnapshot>),
}

#[derive(Clone, Debug, Default)]
pub struct InventoryPayload {
    pub items: Vec<ItemSnapshot>,
    /// `"inventory"` when the server sent the bare list form.
    pub storage_type: String,
}

impl From<InventoryWire> for InventoryPayload {
    fn from(wire: InventoryWire) -> Self {
        match wire {
            InventoryWire::Tagged {
                items,
                storage_type,
            } => Self {
                items,
                storage_type,
            },
            InventoryWire::Bare(items) => Self {
                items,
                storage_type: "inventory".to_owned(),
            },
        }
    }
}

/// Equipment sheet; rendered as-is, so the structure stays opaque.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EquipmentPayload {
    #[serde(default)]
    pub equipment: Value,
    #[serde(default)]
    pub total_stats: Value,
    pub total_effects: Option<Value>,
    pub set_bonuses: Option<Value>,
}

/// One runeword recipe from the server catalog.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RunewordRecipe {
    /// Filled from the catalog key when absent from the body.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub allowed_slots: Vec<String>,
    /// Required rune sequence; order is the recipe.
    #[serde(default)]
    pub runes: Vec<RuneId>,
    #[serde(default)]
    pub level_req: u32,
}

/// One rune definition from the server catalog.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RuneInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Which kind of acknowledgement a shared-shape result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AckKind {
    Equip,
    Recycle,
    Learn,
    Skillbook,
}

impl AckKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equip => "equip",
            Self::Recycle => "recycle",
            Self::Learn => "learn",
            Self::Skillbook => "skillbook",
        }
    }
}

/// A decoded inbound message.
#[derive(Clone, Debug)]
pub enum ServerMessage {
    EnterGame {
        character: CharacterSnapshot,
        map: MapSnapshot,
    },
    MapState(MapSnapshot),
    MapChange(MapChangePayload),
    MoveResult(OpResult),
    CombatResult(CombatResultPayload),
    Inventory(InventoryPayload),
    Equipment(EquipmentPayload),
    Chat {
        name: String,
        message: String,
    },
    Ack {
        kind: AckKind,
        result: OpResult,
    },
    DisabledSkills(Vec<String>),
    SkillToggled {
        skill_id: String,
        enabled: bool,
    },
    Runewords(Vec<RunewordRecipe>),
    Runes(Vec<RuneInfo>),
    SocketRuneResult(SocketRuneResult),
    Pong,
    /// A type the client does not understand; logged and dropped.
    Unknown {
        kind: String,
    },
}

#[derive(Clone, Debug, Deserialize)]
struct EnterGamePayload {
    #[serde(default)]
    character: CharacterSnapshot,
    #[serde(default)]
    map: MapSnapshot,
}

#[derive(Clone, Debug, Deserialize)]
struct SkillToggledPayload {
    #[serde(default)]
    skill_id: String,
    #[serde(default)]
    enabled: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct ChatPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: String,
}

impl ServerMessage {
    /// Decodes one text frame.
    pub fn parse(frame: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(frame)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?
            .to_owned();

        let data = value.get("data").cloned().unwrap_or(Value::Null);

        let message = match kind.as_str() {
            "enter_game" => {
                let payload: EnterGamePayload = decode(&kind, data)?;
                Self::EnterGame {
                    character: payload.character,
                    map: payload.map,
                }
            }
            "map_state" => Self::MapState(decode(&kind, data)?),
            "map_change" => Self::MapChange(decode(&kind, data)?),
            "move_result" => Self::MoveResult(decode(&kind, data)?),
            "combat_result" => Self::CombatResult(decode(&kind, data)?),
            "inventory" => {
                let wire: InventoryWire = decode(&kind, data)?;
                Self::Inventory(wire.into())
            }
            "equipment" => Self::Equipment(decode(&kind, data)?),
            // Chat rides beside `type`, not under `data`.
            "chat" => {
                let payload: ChatPayload = decode(&kind, value)?;
                Self::Chat {
                    name: payload.name,
                    message: payload.message,
                }
            }
            "equip_result" => Self::Ack {
                kind: AckKind::Equip,
                result: decode(&kind, data)?,
            },
            "recycle_result" => Self::Ack {
                kind: AckKind::Recycle,
                result: decode(&kind, data)?,
            },
            "learn_result" => Self::Ack {
                kind: AckKind::Learn,
                result: decode(&kind, data)?,
            },
            "skillbook_result" => Self::Ack {
                kind: AckKind::Skillbook,
                result: decode(&kind, data)?,
            },
            "disabled_skills" => Self::DisabledSkills(decode(&kind, data)?),
            "skill_toggled" => {
                let payload: SkillToggledPayload = decode(&kind, data)?;
                Self::SkillToggled {
                    skill_id: payload.skill_id,
                    enabled: payload.enabled,
                }
            }
            "runewords" => Self::Runewords(decode_catalog(&kind, data)?),
            "runes" => {
                let catalog: HashMap<String, RuneInfo> = decode(&kind, data)?;
                let mut runes: Vec<RuneInfo> = catalog
                    .into_iter()
                    .map(|(id, mut rune)| {
                        if rune.id.is_empty() {
                            rune.id = id;
                        }
                        rune
                    })
                    .collect();
                runes.sort_by(|a, b| a.id.cmp(&b.id));
                Self::Runes(runes)
            }
            "socket_rune_result" => Self::SocketRuneResult(decode(&kind, data)?),
            "pong" => Self::Pong,
            _ => Self::Unknown { kind },
        };
        Ok(message)
    }

    /// Stable name of the message kind, used for routing and one-shot
    /// subscriptions.
    pub fn kind(&self) -> &str {
        match self {
            Self::EnterGame { .. } => "enter_game",
            Self::MapState(_) => "map_state",
            Self::MapChange(_) => "map_change",
            Self::MoveResult(_) => "move_result",
            Self::CombatResult(_) => "combat_result",
            Self::Inventory(_) => "inventory",
            Self::Equipment(_) => "equipment",
            Self::Chat { .. } => "chat",
            Self::Ack { kind, .. } => match kind {
                AckKind::Equip => "equip_result",
                AckKind::Recycle => "recycle_result",
                AckKind::Learn => "learn_result",
                AckKind::Skillbook => "skillbook_result",
            },
            Self::DisabledSkills(_) => "disabled_skills",
            Self::SkillToggled { .. } => "skill_toggled",
            Self::Runewords(_) => "runewords",
            Self::Runes(_) => "runes",
            Self::SocketRuneResult(_) => "socket_rune_result",
            Self::Pong => "pong",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// Decodes the runeword catalog map, filling recipe ids from keys and
/// yielding a deterministic order.
fn decode_catalog(kind: &str, data: Value) -> Result<Vec<RunewordRecipe>, ProtocolError> {
    let catalog: HashMap<String, RunewordRecipe> = decode(kind, data)?;
    let mut recipes: Vec<RunewordRecipe> = catalog
        .into_iter()
        .map(|(id, mut recipe)| {
            if recipe.id.is_empty() {
                recipe.id = id;
            }
            recipe
        })
        .collect();
    recipes.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(recipes)
}

fn decode<T: serde::de::DeserializeOwned>(kind: &str, data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|source| ProtocolError::Payload {
        kind: kind.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_state_decodes_with_absent_collections() {
        let frame = r#"{
            "type": "map_state",
            "data": {
                "map_id": "woma_forest",
                "name": "沃玛森林",
                "maze": [[0, 1], [1, 0]],
                "revealed": [[2, 2], [2, 3]],
                "position": [2, 2]
            }
        }"#;
        let ServerMessage::MapState(snapshot) = ServerMessage::parse(frame).unwrap() else {
            panic!("expected map_state");
        };
        assert_eq!(snapshot.map_id, "woma_forest");
        assert_eq!(snapshot.revealed.len(), 2);
        assert_eq!(snapshot.position, Some(Position::new(2, 2)));
        assert!(snapshot.monsters.is_empty());
        assert!(snapshot.entrances.is_empty());
        assert!(snapshot.npcs.is_empty());
    }

    #[test]
    fn chat_fields_ride_beside_type() {
        let frame = r#"{"type": "chat", "char_id": 7, "name": "李逍遥", "message": "hi"}"#;
        let ServerMessage::Chat { name, message } = ServerMessage::parse(frame).unwrap() else {
            panic!("expected chat");
        };
        assert_eq!(name, "李逍遥");
        assert_eq!(message, "hi");
    }

    #[test]
    fn inventory_accepts_both_wire_forms() {
        let bare = r#"{"type": "inventory", "data": [{"slot": 0, "item_id": "sword"}]}"#;
        let ServerMessage::Inventory(payload) = ServerMessage::parse(bare).unwrap() else {
            panic!("expected inventory");
        };
        assert_eq!(payload.storage_type, "inventory");
        assert_eq!(payload.items.len(), 1);

        let tagged = r#"{
            "type": "inventory",
            "data": {"items": [], "storage_type": "warehouse"}
        }"#;
        let ServerMessage::Inventory(payload) = ServerMessage::parse(tagged).unwrap() else {
            panic!("expected inventory");
        };
        assert_eq!(payload.storage_type, "warehouse");
    }

    #[test]
    fn runeword_catalog_fills_ids_from_keys() {
        let frame = r#"{
            "type": "runewords",
            "data": {
                "steel": {"name": "钢铁", "allowed_slots": ["weapon"], "runes": ["tir", "el"], "level_req": 13},
                "ancient": {"name": "远古", "allowed_slots": ["armor"], "runes": ["ral"], "level_req": 21}
            }
        }"#;
        let ServerMessage::Runewords(recipes) = ServerMessage::parse(frame).unwrap() else {
            panic!("expected runewords");
        };
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].id, "ancient");
        assert_eq!(recipes[1].id, "steel");
        assert_eq!(recipes[1].runes, ["tir", "el"]);
    }

    #[test]
    fn unknown_kind_is_preserved_not_rejected() {
        let frame = r#"{"type": "guild_war", "data": {}}"#;
        let message = ServerMessage::parse(frame).unwrap();
        assert!(matches!(message, ServerMessage::Unknown { kind } if kind == "guild_war"));
    }

    #[test]
    fn missing_type_is_an_error() {
        assert!(matches!(
            ServerMessage::parse(r#"{"data": {}}"#),
            Err(ProtocolError::MissingType)
        ));
    }

    #[test]
    fn combat_result_failure_shape() {
        let frame = r#"{"type": "combat_result", "data": {"success": false, "error": "没有怪物", "logs": []}}"#;
        let ServerMessage::CombatResult(payload) = ServerMessage::parse(frame).unwrap() else {
            panic!("expected combat_result");
        };
        assert!(payload.is_failure());
        assert!(payload.logs.is_empty());
    }
}
