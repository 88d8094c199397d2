//! The terrain cost function.

use tilestrife_protocol::Tile;

/// Cost to step onto plain ground. The anchor for all other costs.
pub const GROUND_COST: f64 = 1.0;
/// Cost to step onto ice. Dearer than ground, cheaper than a door.
pub const ICE_COST: f64 = 1.25;
/// Cost to step through an open door.
pub const OPEN_DOOR_COST: f64 = 1.5;
/// Cost to wade through water.
pub const WATER_COST: f64 = 2.0;

/// Movement-point price to step onto a tile, or `None` when the tile
/// cannot be stepped onto at all.
///
/// A wall is traversable at ground cost when the mover carries the
/// Kunee. A closed door is never assigned a cost; doors are toggled,
/// not walked through.
pub fn tile_cost(tile: Tile, has_kunee: bool) -> Option<f64> {
    match tile {
        Tile::Ground => Some(GROUND_COST),
        Tile::Ice => Some(ICE_COST),
        Tile::OpenDoor => Some(OPEN_DOOR_COST),
        Tile::Water => Some(WATER_COST),
        Tile::Wall if has_kunee => Some(GROUND_COST),
        Tile::Wall | Tile::ClosedDoor => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_ordering_is_strict() {
        assert!(GROUND_COST < ICE_COST);
        assert!(ICE_COST < OPEN_DOOR_COST);
        assert!(OPEN_DOOR_COST < WATER_COST);
    }

    #[test]
    fn test_wall_needs_the_kunee() {
        assert_eq!(tile_cost(Tile::Wall, false), None);
        assert_eq!(tile_cost(Tile::Wall, true), Some(GROUND_COST));
    }

    #[test]
    fn test_closed_door_is_never_walkable() {
        assert_eq!(tile_cost(Tile::ClosedDoor, false), None);
        assert_eq!(tile_cost(Tile::ClosedDoor, true), None);
    }
}
