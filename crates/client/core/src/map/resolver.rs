//! Click → intent resolution.
//!
//! Pure function over the current [`MapState`]; performs no network
//! I/O. The caller dispatches the resulting intent (after user
//! confirmation where required).

use std::fmt;

use game_protocol::{ClientMessage, ExitKind, Npc, PORTAL_ENTRANCE, PORTAL_EXIT, Position};

use crate::map::MapState;

/// Local-only rejection of a click; never reaches the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    Unexplored,
    Blocked,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unexplored => "unexplored",
            Self::Blocked => "blocked",
        })
    }
}

/// The player's classified intention for one click.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    Reject(RejectReason),
    Attack(Position),
    Move(Position),
    /// Open the NPC's dialog locally; no outbound message exists for
    /// talking.
    Talk(Npc),
    /// Requires user confirmation before dispatch.
    UseEntrance {
        id: String,
        name: String,
    },
    UseExit(ExitKind),
}

impl Intent {
    /// True if the frontend must confirm with the user before
    /// dispatching.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Self::UseEntrance { .. })
    }

    /// The outbound message this intent dispatches to, if any.
    /// Rejections and NPC talk are local-only.
    pub fn to_message(&self) -> Option<ClientMessage> {
        match self {
            Self::Reject(_) | Self::Talk(_) => None,
            Self::Attack(pos) => Some(ClientMessage::Attack { pos: *pos }),
            Self::Move(pos) => Some(ClientMessage::move_to(*pos)),
            Self::UseEntrance { id, .. } => Some(ClientMessage::UseEntrance {
                entrance_id: id.clone(),
            }),
            Self::UseExit(kind) => Some(ClientMessage::UseExit { exit_type: *kind }),
        }
    }
}

/// Resolves a clicked cell into exactly one intent.
///
/// The resolution order is a design decision, not incidental: fog
/// first, then terrain, then targets by adjacency, then portals, and
/// movement as the fallback. Adjacency is Chebyshev distance <= 1
/// (8-directional, including the cell itself). Whether a move is
/// actually reachable is the server's call; the client just moves
/// toward distant targets.
pub fn resolve_click(state: &MapState, clicked: Position) -> Intent {
    if !state.is_revealed(clicked) {
        return Intent::Reject(RejectReason::Unexplored);
    }

    match state.tile(clicked) {
        Some(tile) if tile.is_wall() => return Intent::Reject(RejectReason::Blocked),
        Some(_) => {}
        // Out of bounds is indistinguishable from fog to the player.
        None => return Intent::Reject(RejectReason::Unexplored),
    }

    if state.monsters.contains_key(&clicked) {
        return if state.position.is_adjacent(clicked) {
            Intent::Attack(clicked)
        } else {
            Intent::Move(clicked)
        };
    }

    if let Some(npc) = state.npc_at(clicked) {
        return if state.position.is_adjacent(clicked) {
            Intent::Talk(npc.clone())
        } else {
            Intent::Move(clicked)
        };
    }

    if state.position == clicked {
        if let Some(entrance) = state.entrance_at(clicked) {
            return Intent::UseEntrance {
                id: entrance.id.clone(),
                name: entrance.name.clone(),
            };
        }
    }

    if !state.is_hub() && state.position == clicked {
        if clicked == PORTAL_ENTRANCE {
            return Intent::UseExit(ExitKind::Entrance);
        }
        if clicked == PORTAL_EXIT {
            return Intent::UseExit(ExitKind::Exit);
        }
    }

    Intent::Move(clicked)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use game_protocol::{Entrance, MapSnapshot, MonsterSummary};

    use super::*;
    use crate::map::MapStateStore;
    use crate::map::state::tests::{NullMapSink, snapshot_at};

    fn state_from(snapshot: MapSnapshot) -> MapState {
        let mut store = MapStateStore::new(Arc::new(NullMapSink));
        store.apply(snapshot).unwrap();
        store.state().unwrap().clone()
    }

    fn reveal_all(snapshot: &mut MapSnapshot) {
        for y in 0..24 {
            for x in 0..24 {
                snapshot.revealed.push(Position::new(x, y));
            }
        }
    }

    #[test]
    fn unexplored_rejects_regardless_of_contents() {
        let mut snapshot = snapshot_at(Position::new(5, 5));
        snapshot.maze[9][9] = 1;
        snapshot
            .monsters
            .insert("8,8".to_owned(), MonsterSummary::default());
        let state = state_from(snapshot);

        assert_eq!(
            resolve_click(&state, Position::new(9, 9)),
            Intent::Reject(RejectReason::Unexplored)
        );
        assert_eq!(
            resolve_click(&state, Position::new(8, 8)),
            Intent::Reject(RejectReason::Unexplored)
        );
        // Out of bounds resolves as fog too.
        assert_eq!(
            resolve_click(&state, Position::new(-1, 3)),
            Intent::Reject(RejectReason::Unexplored)
        );
    }

    #[test]
    fn revealed_wall_rejects_blocked() {
        let mut snapshot = snapshot_at(Position::new(5, 5));
        snapshot.maze[7][6] = 1;
        snapshot.revealed.push(Position::new(6, 7));
        let state = state_from(snapshot);

        assert_eq!(
            resolve_click(&state, Position::new(6, 7)),
            Intent::Reject(RejectReason::Blocked)
        );
    }

    #[test]
    fn adjacent_monster_attacks_distant_monster_moves() {
        let mut snapshot = snapshot_at(Position::new(5, 5));
        reveal_all(&mut snapshot);
        snapshot
            .monsters
            .insert("5,6".to_owned(), MonsterSummary::default());
        snapshot
            .monsters
            .insert("5,7".to_owned(), MonsterSummary::default());
        let state = state_from(snapshot);

        assert_eq!(
            resolve_click(&state, Position::new(5, 6)),
            Intent::Attack(Position::new(5, 6))
        );
        assert_eq!(
            resolve_click(&state, Position::new(5, 7)),
            Intent::Move(Position::new(5, 7))
        );
    }

    #[test]
    fn adjacent_npc_talks_distant_npc_moves() {
        let mut snapshot = snapshot_at(Position::new(6, 8));
        snapshot.map_id = "main_city".to_owned();
        reveal_all(&mut snapshot);
        snapshot.npcs.push(Npc {
            id: "weapon_shop".to_owned(),
            name: "武器店".to_owned(),
            npc_name: "铁匠王大锤".to_owned(),
            position: Position::new(7, 8),
        });
        snapshot.npcs.push(Npc {
            id: "potion_shop".to_owned(),
            name: "药店".to_owned(),
            npc_name: "药师孙老头".to_owned(),
            position: Position::new(14, 8),
        });
        let state = state_from(snapshot);

        assert!(matches!(
            resolve_click(&state, Position::new(7, 8)),
            Intent::Talk(npc) if npc.id == "weapon_shop"
        ));
        assert_eq!(
            resolve_click(&state, Position::new(14, 8)),
            Intent::Move(Position::new(14, 8))
        );
    }

    #[test]
    fn entrance_under_feet_resolves_and_needs_confirmation() {
        let mut snapshot = snapshot_at(Position::new(10, 10));
        snapshot.entrances.insert(
            "woma_forest".to_owned(),
            Entrance {
                id: "woma_forest".to_owned(),
                name: "沃玛森林".to_owned(),
                position: Position::new(10, 10),
                description: String::new(),
            },
        );
        let state = state_from(snapshot);

        let intent = resolve_click(&state, Position::new(10, 10));
        assert!(intent.needs_confirmation());
        assert!(matches!(intent, Intent::UseEntrance { ref id, .. } if id == "woma_forest"));
    }

    #[test]
    fn portal_cells_require_standing_on_them_outside_hub() {
        // Standing on the entrance portal of a dungeon map.
        let state = state_from(snapshot_at(PORTAL_ENTRANCE));
        assert_eq!(
            resolve_click(&state, PORTAL_ENTRANCE),
            Intent::UseExit(ExitKind::Entrance)
        );

        // Clicking the exit portal from afar is just a move.
        let mut snapshot = snapshot_at(Position::new(5, 5));
        reveal_all(&mut snapshot);
        let state = state_from(snapshot);
        assert_eq!(
            resolve_click(&state, PORTAL_EXIT),
            Intent::Move(PORTAL_EXIT)
        );

        // The hub has no portals: standing on the cell is a no-op move.
        let mut hub = snapshot_at(PORTAL_EXIT);
        hub.map_id = "main_city".to_owned();
        let state = state_from(hub);
        assert_eq!(resolve_click(&state, PORTAL_EXIT), Intent::Move(PORTAL_EXIT));
    }

    #[test]
    fn plain_floor_moves() {
        let mut snapshot = snapshot_at(Position::new(2, 3));
        reveal_all(&mut snapshot);
        let state = state_from(snapshot);
        assert_eq!(
            resolve_click(&state, Position::new(12, 12)),
            Intent::Move(Position::new(12, 12))
        );
    }

    #[test]
    fn reject_and_talk_have_no_outbound_message() {
        assert_eq!(Intent::Reject(RejectReason::Blocked).to_message(), None);
        let npc = Npc {
            id: "armor_shop".to_owned(),
            name: "防具店".to_owned(),
            npc_name: String::new(),
            position: Position::new(1, 1),
        };
        assert_eq!(Intent::Talk(npc).to_message(), None);
        assert!(Intent::Attack(Position::new(2, 2)).to_message().is_some());
    }
}
