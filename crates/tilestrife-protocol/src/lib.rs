//! Shared data model and push-protocol events for Tilestrife.
//!
//! Everything the engines and the room runtime exchange with clients is
//! defined here: grid positions and tiles, the game map, players and
//! their attributes, and the [`GameEvent`]/[`ClientAction`] enums that
//! travel over the push channel.
//!
//! # Key types
//!
//! - [`PlayerId`] / [`RoomId`]: identity newtypes
//! - [`Position`], [`Tile`], [`Item`], [`GameMap`]: the grid
//! - [`Player`], [`Attributes`], [`MatchStats`]: per-player state
//! - [`GameEvent`], [`ClientAction`]: the wire-visible events

mod events;
mod map;
mod player;
mod types;

pub use events::{ActionData, ClientAction, CombatPlayers, GameEvent, RollResult};
pub use map::{GameMap, MapError};
pub use player::{Attributes, Behavior, MatchStats, Player, PlayerStatus};
pub use types::{Item, PlayerId, Position, RoomId, Tile};
