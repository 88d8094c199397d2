//! Room runtime for Tilestrife.
//!
//! Each room is an isolated Tokio task owning its game state, combat
//! engine, and countdown timers. The outside world talks to it through
//! a [`RoomHandle`]; the [`RoomDirector`] creates rooms, enforces the
//! one-room-per-player invariant, and routes actions.
//!
//! Movement turns rotate by descending player speed on a fixed
//! [`TURN_DURATION`] clock, pausing while a fight runs. Game events
//! reach clients over per-player unbounded channels; sends to a gone
//! receiver are silently dropped.

mod actor;
mod director;
mod error;
mod orchestrate;

pub use actor::{RoomHandle, RoomInfo, TURN_DURATION};
pub use director::RoomDirector;
pub use error::RoomError;
pub use orchestrate::PlayerSender;
