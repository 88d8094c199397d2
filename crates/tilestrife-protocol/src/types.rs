//! Identity newtypes and the primitive grid vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over `u64` so a `PlayerId` can never be confused with a
/// [`RoomId`]. `#[serde(transparent)]` keeps the JSON representation a
/// plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a room (one running game).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A grid coordinate, 0-indexed. `x` is the column, `y` is the row;
/// the terrain and item matrices are indexed `[y][x]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

impl Position {
    /// Creates a position from column and row indices.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The in-bounds orthogonal neighbors of this position on a square
    /// grid of the given dimension, in up/down/left/right order.
    pub fn neighbors(self, size: usize) -> Vec<Position> {
        let mut out = Vec::with_capacity(4);
        if self.y > 0 {
            out.push(Position::new(self.x, self.y - 1));
        }
        if self.y + 1 < size {
            out.push(Position::new(self.x, self.y + 1));
        }
        if self.x > 0 {
            out.push(Position::new(self.x - 1, self.y));
        }
        if self.x + 1 < size {
            out.push(Position::new(self.x + 1, self.y));
        }
        out
    }

    /// Returns `true` if `other` is orthogonally adjacent (distance 1).
    pub fn is_adjacent_to(self, other: Position) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx + dy == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Tiles and items
// ---------------------------------------------------------------------------

/// Terrain type of a single grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    /// Plain walkable ground.
    Ground,
    /// Slow to cross.
    Water,
    /// Slippery but walkable.
    Ice,
    /// Impassable (unless the mover carries the Kunee).
    Wall,
    /// A door in its closed state. Not traversable; must be toggled.
    ClosedDoor,
    /// A door in its open state.
    OpenDoor,
}

impl Tile {
    /// Returns `true` for either door state.
    pub fn is_door(self) -> bool {
        matches!(self, Tile::ClosedDoor | Tile::OpenDoor)
    }

    /// Returns `true` if the tile is plain walkable terrain: neither a
    /// wall nor a door.
    pub fn is_walkable_terrain(self) -> bool {
        matches!(self, Tile::Ground | Tile::Water | Tile::Ice)
    }
}

/// An item placed on the grid or carried in a player's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    /// Conditional attack/defense modifier while the holder is below
    /// half health.
    Xiphos,
    /// Redirects failed-attack damage back onto the attacker.
    AchillesArmor,
    /// Grants wall traversal at ground cost.
    Kunee,
    /// Reserved marker for a spawn point; never picked up.
    Spawn,
    /// The capture-the-flag objective.
    Flag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_room_id_display() {
        assert_eq!(RoomId(3).to_string(), "R-3");
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_neighbors_clip_at_grid_edges() {
        let corner = Position::new(0, 0);
        assert_eq!(
            corner.neighbors(3),
            vec![Position::new(0, 1), Position::new(1, 0)]
        );

        let center = Position::new(1, 1);
        assert_eq!(center.neighbors(3).len(), 4);
    }

    #[test]
    fn test_adjacency_is_orthogonal_only() {
        let p = Position::new(1, 1);
        assert!(p.is_adjacent_to(Position::new(0, 1)));
        assert!(p.is_adjacent_to(Position::new(1, 2)));
        assert!(!p.is_adjacent_to(Position::new(0, 0))); // diagonal
        assert!(!p.is_adjacent_to(p));
    }

    #[test]
    fn test_tile_predicates() {
        assert!(Tile::ClosedDoor.is_door());
        assert!(Tile::OpenDoor.is_door());
        assert!(!Tile::Wall.is_door());
        assert!(Tile::Ice.is_walkable_terrain());
        assert!(!Tile::OpenDoor.is_walkable_terrain());
    }
}
