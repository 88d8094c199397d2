//! Grid navigation engine for Tilestrife.
//!
//! Computes shortest paths, reachable-tile sets, and nearest
//! valid/occupied tiles over a square grid with per-tile movement
//! cost, door state, and item occupancy. The engine holds no session
//! state: it is constructed per query from the map and the room's
//! player list, and only ever reads them; the single exception is
//! [`toggle_door`], which flips exactly the door cell it is asked to.
//!
//! # Key types
//!
//! - [`NavigationEngine`]: the per-query pathfinder
//! - [`toggle_door`]: adjacency-gated door toggling
//! - [`tile_cost`]: the game's terrain cost function

mod cost;
mod engine;

pub use cost::tile_cost;
pub use engine::{toggle_door, NavigationEngine};
