//! Value types shared across protocol messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Map grid dimensions. Every map the server sends is a fixed 24x24 grid.
pub const MAP_WIDTH: usize = 24;
pub const MAP_HEIGHT: usize = 24;

/// Map id of the hub (safe zone). The hub has no fog-of-war and no
/// fixed portal cells.
pub const HUB_MAP_ID: &str = "main_city";

/// Fixed portal cell on the entrance side of every non-hub map.
pub const PORTAL_ENTRANCE: Position = Position { x: 2, y: 2 };

/// Fixed portal cell on the exit side of every non-hub map.
pub const PORTAL_EXIT: Position = Position { x: 21, y: 21 };

/// Discrete grid position expressed in tile coordinates.
///
/// Serialized on the wire as a two-element `[x, y]` array, matching the
/// server's list representation. Value equality and `Hash` make this a
/// usable map key, replacing ad-hoc `"x,y"` composite strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for (i32, i32) {
    fn from(pos: Position) -> Self {
        (pos.x, pos.y)
    }
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: the number of king moves between two cells.
    pub fn chebyshev(self, other: Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        dx.max(dy)
    }

    /// 8-directional adjacency, including the cell itself.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.chebyshev(other) <= 1
    }

    /// Parses the server's `"x,y"` composite key form.
    pub fn from_key(key: &str) -> Option<Self> {
        let (x, y) = key.split_once(',')?;
        Some(Self {
            x: x.trim().parse().ok()?,
            y: y.trim().parse().ok()?,
        })
    }

    /// True if the position lies inside the fixed map grid.
    pub fn in_bounds(self) -> bool {
        (0..MAP_WIDTH as i32).contains(&self.x) && (0..MAP_HEIGHT as i32).contains(&self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Item quality tier. Ordering is semantic: `White < Green < Blue <
/// Purple < Orange`, and the derived `Ord` relies on variant order.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Quality {
    #[default]
    White,
    Green,
    Blue,
    Purple,
    Orange,
}

/// Integer resource meter (HP or MP) tracked per combatant.
///
/// Transcript lines may report a negative current value for a killing
/// blow; clamping for display is the render layer's concern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMeter {
    pub current: i32,
    pub maximum: i32,
}

impl ResourceMeter {
    pub const fn new(current: i32, maximum: i32) -> Self {
        Self { current, maximum }
    }

    /// Parses the `cur/max` text form used throughout the transcript.
    pub fn parse(text: &str) -> Option<Self> {
        let (current, maximum) = text.split_once('/')?;
        Some(Self {
            current: current.trim().parse().ok()?,
            maximum: maximum.trim().parse().ok()?,
        })
    }
}

impl fmt::Display for ResourceMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.maximum)
    }
}

/// Monster marker on the map. Combat stats stay server-side; the client
/// only needs enough to render and classify the cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterSummary {
    pub name: String,
    #[serde(default)]
    pub is_boss: bool,
}

/// NPC marker on the map (hub shops, warehouse keeper).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    /// Shop name ("weapon shop"), shown on the tile.
    pub name: String,
    /// The proprietor's display name.
    #[serde(default)]
    pub npc_name: String,
    pub position: Position,
}

/// Entrance to a linked map, registered at a fixed cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrance {
    pub id: String,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_counts_king_moves() {
        let origin = Position::new(5, 5);
        assert_eq!(origin.chebyshev(Position::new(5, 5)), 0);
        assert_eq!(origin.chebyshev(Position::new(6, 6)), 1);
        assert_eq!(origin.chebyshev(Position::new(5, 7)), 2);
        assert_eq!(origin.chebyshev(Position::new(2, 6)), 3);
    }

    #[test]
    fn adjacency_includes_origin_and_diagonals() {
        let origin = Position::new(3, 3);
        assert!(origin.is_adjacent(origin));
        assert!(origin.is_adjacent(Position::new(4, 2)));
        assert!(!origin.is_adjacent(Position::new(3, 5)));
    }

    #[test]
    fn position_round_trips_as_array() {
        let pos = Position::new(12, 7);
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(json, "[12,7]");
        assert_eq!(serde_json::from_str::<Position>(&json).unwrap(), pos);
    }

    #[test]
    fn composite_key_parses() {
        assert_eq!(Position::from_key("4,19"), Some(Position::new(4, 19)));
        assert_eq!(Position::from_key("4;19"), None);
        assert_eq!(Position::from_key("a,b"), None);
    }

    #[test]
    fn quality_orders_by_tier() {
        assert!(Quality::White < Quality::Green);
        assert!(Quality::Purple < Quality::Orange);
        assert_eq!("purple".parse::<Quality>().unwrap(), Quality::Purple);
        assert_eq!(Quality::Blue.to_string(), "blue");
    }

    #[test]
    fn meter_parses_and_rejects() {
        assert_eq!(
            ResourceMeter::parse("80/100"),
            Some(ResourceMeter::new(80, 100))
        );
        assert_eq!(
            ResourceMeter::parse("-5/40"),
            Some(ResourceMeter::new(-5, 40))
        );
        assert_eq!(ResourceMeter::parse("80"), None);
        assert_eq!(ResourceMeter::parse("x/y"), None);
    }
}
