//! Authoritative local copy of the current map.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use game_protocol::{
    Entrance, HUB_MAP_ID, MAP_HEIGHT, MAP_WIDTH, MapSnapshot, MonsterSummary, Npc, Position,
};

use crate::sink::MapRenderSink;

/// One grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tile {
    #[default]
    Floor,
    Wall,
}

impl Tile {
    pub fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }
}

/// Local copy of the server's map state.
///
/// Replaced wholesale on every snapshot; the client never merges
/// partial updates. `revealed` grows monotonically within one map
/// instance because each snapshot's list is a superset of the last,
/// not because the client accumulates it.
#[derive(Clone, Debug)]
pub struct MapState {
    pub map_id: String,
    pub map_name: String,
    grid: [[Tile; MAP_WIDTH]; MAP_HEIGHT],
    revealed: HashSet<Position>,
    pub position: Position,
    pub monsters: HashMap<Position, MonsterSummary>,
    pub npcs: Vec<Npc>,
    pub entrances: HashMap<String, Entrance>,
}

impl MapState {
    /// Tile at `position`, or `None` outside the fixed grid.
    pub fn tile(&self, position: Position) -> Option<Tile> {
        if !position.in_bounds() {
            return None;
        }
        Some(self.grid[position.y as usize][position.x as usize])
    }

    /// True if the player has observed this cell. The player's own
    /// position is always visible.
    pub fn is_revealed(&self, position: Position) -> bool {
        position == self.position || self.revealed.contains(&position)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    /// The hub is the safe zone: fully revealed, no portal cells.
    pub fn is_hub(&self) -> bool {
        self.map_id == HUB_MAP_ID
    }

    pub fn npc_at(&self, position: Position) -> Option<&Npc> {
        self.npcs.iter().find(|npc| npc.position == position)
    }

    pub fn entrance_at(&self, position: Position) -> Option<&Entrance> {
        self.entrances
            .values()
            .find(|entrance| entrance.position == position)
    }
}

/// Reasons a snapshot cannot be applied. The previous state is always
/// retained on rejection.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapApplyError {
    #[error("snapshot grid is {rows}x{cols}, expected {MAP_HEIGHT}x{MAP_WIDTH}")]
    BadGrid { rows: usize, cols: usize },
    #[error("snapshot has no player position")]
    MissingPosition,
}

/// Exclusive owner of [`MapState`].
///
/// Applies inbound snapshots atomically and notifies the render sink
/// synchronously after each successful apply. Render layers only ever
/// see `&MapState`.
pub struct MapStateStore {
    state: Option<MapState>,
    sink: Arc<dyn MapRenderSink>,
}

impl MapStateStore {
    pub fn new(sink: Arc<dyn MapRenderSink>) -> Self {
        Self { state: None, sink }
    }

    pub fn state(&self) -> Option<&MapState> {
        self.state.as_ref()
    }

    /// Replaces the full state from a snapshot.
    ///
    /// A malformed snapshot (wrong grid shape, no position) is
    /// rejected and the previous state retained; the caller surfaces
    /// the failure as a notice, never as a fatal error.
    pub fn apply(&mut self, snapshot: MapSnapshot) -> Result<(), MapApplyError> {
        let grid = parse_grid(&snapshot.maze)?;
        let position = snapshot.position.ok_or(MapApplyError::MissingPosition)?;

        let mut revealed: HashSet<Position> = snapshot.revealed.iter().copied().collect();
        // The player can always see the cell under their feet.
        revealed.insert(position);

        let monsters = snapshot
            .monsters
            .iter()
            .filter_map(|(key, monster)| match Position::from_key(key) {
                Some(pos) => Some((pos, monster.clone())),
                None => {
                    tracing::debug!(key, "skipping monster with malformed position key");
                    None
                }
            })
            .collect();

        self.state = Some(MapState {
            map_id: snapshot.map_id,
            map_name: snapshot.name,
            grid,
            revealed,
            position,
            monsters,
            npcs: snapshot.npcs,
            entrances: snapshot.entrances,
        });

        let state = self.state.as_ref().expect("state just set");
        tracing::debug!(
            map_id = %state.map_id,
            revealed = state.revealed.len(),
            monsters = state.monsters.len(),
            "map state applied"
        );
        self.sink.map_updated(state);
        Ok(())
    }
}

fn parse_grid(maze: &[Vec<u8>]) -> Result<[[Tile; MAP_WIDTH]; MAP_HEIGHT], MapApplyError> {
    let bad = |_| MapApplyError::BadGrid {
        rows: maze.len(),
        cols: maze.first().map_or(0, Vec::len),
    };

    let mut grid = [[Tile::Floor; MAP_WIDTH]; MAP_HEIGHT];
    let rows: &[Vec<u8>; MAP_HEIGHT] = maze.try_into().map_err(bad)?;
    for (row, cells) in rows.iter().enumerate() {
        let cells: &[u8; MAP_WIDTH] = cells.as_slice().try_into().map_err(bad)?;
        for (col, &cell) in cells.iter().enumerate() {
            grid[row][col] = if cell == 0 { Tile::Floor } else { Tile::Wall };
        }
    }
    Ok(grid)
}
