//! Per-room combat state machine for Tilestrife.
//!
//! One [`CombatEngine`] serves many rooms; each room has at most one
//! live [`CombatRecord`] in the engine's [`CombatStore`]. The engine
//! mutates only that record and the player fields combat touches;
//! adjacency and placement questions go to the navigation engine, and
//! timers, turn control, and broadcasting go through the injected
//! [`Orchestrator`].
//!
//! Invalid gameplay input (no adjacent opponent, unknown room, stale
//! timer callback) never errors: every entry point first re-validates
//! that the referenced combat record still exists and still names the
//! acting participant, and otherwise does nothing observable.
//!
//! # Key types
//!
//! - [`CombatEngine`]: the state machine
//! - [`CombatStore`] / [`CombatRecord`]: room-keyed fight state
//! - [`DiceStrategy`]: injected randomness ([`RandomDice`], [`DebugDice`])
//! - [`Orchestrator`] / [`CombatLog`]: external collaborators
//! - [`GameRoom`]: the per-room session state the engine operates on

mod dice;
mod engine;
mod orchestrator;
mod session;
mod store;

pub use dice::{DebugDice, DiceStrategy, RandomDice};
pub use engine::{
    CombatEngine, CLASSIC_WIN_THRESHOLD, COMBAT_DAMAGE, EVASION_ATTEMPTS,
    EVASION_THRESHOLD, FIGHT_TURN_BOTH_BOTS, FIGHT_TURN_DURATION,
    FIGHT_TURN_NO_EVASION, ICE_PENALTY, NEXT_COMBAT_TURN_DELAY,
    XIPHOS_ATTACK_BONUS, XIPHOS_DEFENSE_PENALTY,
};
pub use orchestrator::{CombatLog, Orchestrator, TracingCombatLog};
pub use session::{GameMode, GameRoom};
pub use store::{CombatRecord, CombatStore};
