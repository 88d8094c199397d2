//! The game map: parallel terrain and item matrices over a square grid.

use serde::{Deserialize, Serialize};

use crate::{Item, Position, Tile};

/// Errors from constructing a [`GameMap`].
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The terrain matrix is not square.
    #[error("terrain matrix is not square: row {row} has {len} tiles, expected {expected}")]
    NotSquare {
        /// Offending row index.
        row: usize,
        /// Length of that row.
        len: usize,
        /// Expected dimension.
        expected: usize,
    },

    /// The item matrix does not match the terrain dimensions.
    #[error("item matrix dimensions do not match terrain ({expected}x{expected})")]
    ItemMatrixMismatch {
        /// Expected dimension.
        expected: usize,
    },
}

/// A square grid map: a terrain matrix and a parallel item matrix.
///
/// Both matrices are indexed `[y][x]`. The grid is always square; this
/// is enforced at construction and relied on everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMap {
    terrain: Vec<Vec<Tile>>,
    items: Vec<Vec<Option<Item>>>,
    size: usize,
}

impl GameMap {
    /// Builds a map from parallel terrain and item matrices.
    pub fn new(
        terrain: Vec<Vec<Tile>>,
        items: Vec<Vec<Option<Item>>>,
    ) -> Result<Self, MapError> {
        let size = terrain.len();
        for (row, tiles) in terrain.iter().enumerate() {
            if tiles.len() != size {
                return Err(MapError::NotSquare {
                    row,
                    len: tiles.len(),
                    expected: size,
                });
            }
        }
        if items.len() != size || items.iter().any(|r| r.len() != size) {
            return Err(MapError::ItemMatrixMismatch { expected: size });
        }
        Ok(Self {
            terrain,
            items,
            size,
        })
    }

    /// Builds a map from terrain alone, with no items placed.
    pub fn from_terrain(terrain: Vec<Vec<Tile>>) -> Result<Self, MapError> {
        let size = terrain.len();
        let items = vec![vec![None; size]; size];
        Self::new(terrain, items)
    }

    /// The grid dimension (the map is `size` × `size`).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the position lies on the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.size && pos.y < self.size
    }

    /// The terrain at a position, or `None` when out of bounds.
    pub fn tile(&self, pos: Position) -> Option<Tile> {
        self.terrain.get(pos.y).and_then(|row| row.get(pos.x)).copied()
    }

    /// Overwrites the terrain at an in-bounds position. Out-of-bounds
    /// writes are ignored.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) {
        if let Some(cell) = self
            .terrain
            .get_mut(pos.y)
            .and_then(|row| row.get_mut(pos.x))
        {
            *cell = tile;
        }
    }

    /// The item at a position, or `None` when absent or out of bounds.
    pub fn item(&self, pos: Position) -> Option<Item> {
        self.items
            .get(pos.y)
            .and_then(|row| row.get(pos.x))
            .copied()
            .flatten()
    }

    /// Places (or clears) an item at an in-bounds position.
    pub fn set_item(&mut self, pos: Position, item: Option<Item>) {
        if let Some(cell) =
            self.items.get_mut(pos.y).and_then(|row| row.get_mut(pos.x))
        {
            *cell = item;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_square_terrain() {
        let terrain = vec![
            vec![Tile::Ground, Tile::Ground],
            vec![Tile::Ground],
        ];
        assert!(matches!(
            GameMap::from_terrain(terrain),
            Err(MapError::NotSquare { row: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_mismatched_item_matrix() {
        let terrain = vec![vec![Tile::Ground; 2]; 2];
        let items = vec![vec![None; 3]; 3];
        assert!(matches!(
            GameMap::new(terrain, items),
            Err(MapError::ItemMatrixMismatch { expected: 2 })
        ));
    }

    #[test]
    fn test_out_of_bounds_reads_are_none() {
        let map = GameMap::from_terrain(vec![vec![Tile::Ground; 2]; 2]).unwrap();
        assert_eq!(map.tile(Position::new(2, 0)), None);
        assert_eq!(map.item(Position::new(0, 5)), None);
        assert!(!map.in_bounds(Position::new(2, 2)));
    }

    #[test]
    fn test_set_and_read_back() {
        let mut map = GameMap::from_terrain(vec![vec![Tile::Ground; 3]; 3]).unwrap();
        let pos = Position::new(1, 2);
        map.set_tile(pos, Tile::ClosedDoor);
        map.set_item(pos, Some(Item::Spawn));
        assert_eq!(map.tile(pos), Some(Tile::ClosedDoor));
        assert_eq!(map.item(pos), Some(Item::Spawn));
    }
}
