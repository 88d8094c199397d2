//! Injected dice strategies.
//!
//! All combat randomness flows through [`DiceStrategy`], so tests (and
//! the server's debug mode) substitute a deterministic strategy instead
//! of monkey-patching a random source.

use rand::Rng;

/// A source for combat dice rolls and evasion draws.
///
/// The attack and defense rolls are separate methods so a deterministic
/// strategy can favor one side without out-of-band context.
pub trait DiceStrategy: Send {
    /// Attack die: a value in `1..=dice_max`.
    fn attack_roll(&mut self, dice_max: u32) -> u32;

    /// Defense die: a value in `1..=dice_max`.
    fn defense_roll(&mut self, dice_max: u32) -> u32;

    /// Evasion draw: a value in `[0, 1)`, compared against the fixed
    /// evasion-success threshold.
    fn evasion_draw(&mut self) -> f64;
}

/// Uniform random dice, the production strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDice;

impl DiceStrategy for RandomDice {
    fn attack_roll(&mut self, dice_max: u32) -> u32 {
        rand::rng().random_range(1..=dice_max.max(1))
    }

    fn defense_roll(&mut self, dice_max: u32) -> u32 {
        rand::rng().random_range(1..=dice_max.max(1))
    }

    fn evasion_draw(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Deterministic dice for debug mode and demonstrations: the attacker
/// always rolls its maximum, the defender always rolls 1 (the engine's
/// documented minimum), and evasion never succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugDice;

impl DiceStrategy for DebugDice {
    fn attack_roll(&mut self, dice_max: u32) -> u32 {
        dice_max.max(1)
    }

    fn defense_roll(&mut self, _dice_max: u32) -> u32 {
        1
    }

    fn evasion_draw(&mut self) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_dice_stay_in_range() {
        let mut dice = RandomDice;
        for _ in 0..100 {
            let roll = dice.attack_roll(6);
            assert!((1..=6).contains(&roll));
            let roll = dice.defense_roll(4);
            assert!((1..=4).contains(&roll));
            let draw = dice.evasion_draw();
            assert!((0.0..1.0).contains(&draw));
        }
    }

    #[test]
    fn test_random_dice_tolerate_zero_max() {
        let mut dice = RandomDice;
        assert_eq!(dice.attack_roll(0), 1);
    }

    #[test]
    fn test_debug_dice_are_deterministic() {
        let mut dice = DebugDice;
        assert_eq!(dice.attack_roll(4), 4);
        assert_eq!(dice.defense_roll(2), 1);
        assert_eq!(dice.evasion_draw(), 1.0);
    }
}
