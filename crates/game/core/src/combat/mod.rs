//! Combat math.
//!
//! Pure functions over plain numbers and a caller-supplied [`BattleRng`].
//! The battle resolver gathers the inputs from combatants and applies the
//! results.
//!
//! - `roll_hit`: luck-biased miss / hit / critical roll
//! - `physical_damage`: `attack × (attack / defense)` with variance
//! - `spell_damage`: `power × (intelligence / wisdom)` with variance
//!
//! [`BattleRng`]: crate::rng::BattleRng

pub mod damage;
pub mod hit;

pub use damage::{physical_damage, spell_damage};
pub use hit::{HitChances, HitOutcome, roll_hit};
