//! Level-driven stat generation.
//!
//! Formulas:
//! - stat = base × bias_multiplier × (level / 2), truncated
//! - xp_for_level = 100 × level^1.5, truncated
//!
//! Bases: max HP 100, max MP 50, every other stat 10. A bias index selects
//! one of the multipliers `[0.5, 0.75, 1.0, 1.25, 1.5]`.

use strum::IntoEnumIterator;

use super::block::{StatBlock, StatKind};
use crate::config::GameConfig;

const BIAS_MULTIPLIERS: [f64; 5] = [0.5, 0.75, 1.0, 1.25, 1.5];

fn base_value(kind: StatKind) -> f64 {
    match kind {
        StatKind::MaxHp => 100.0,
        StatKind::MaxMp => 50.0,
        _ => 10.0,
    }
}

/// Per-stat growth bias (0..=4). Job classes lean toward different stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBiases([u8; StatKind::COUNT]);

impl StatBiases {
    /// Every stat at the neutral 1.0 multiplier.
    pub const fn neutral() -> Self {
        Self([2; StatKind::COUNT])
    }

    /// Sets a bias, clamping to the valid index range.
    #[must_use]
    pub fn with(mut self, kind: StatKind, bias: u8) -> Self {
        self.0[kind as usize] = bias.min(GameConfig::MAX_STAT_BIAS);
        self
    }

    pub fn get(&self, kind: StatKind) -> u8 {
        self.0[kind as usize]
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (StatKind, u8)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::neutral(), |biases, (kind, bias)| biases.with(kind, bias))
    }
}

impl Default for StatBiases {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Value of a single stat at `level`.
pub fn stat_for_level(kind: StatKind, bias: u8, level: u32) -> i32 {
    let multiplier = BIAS_MULTIPLIERS[usize::from(bias.min(GameConfig::MAX_STAT_BIAS))];
    (base_value(kind) * multiplier * (level as f64 / 2.0)) as i32
}

/// Fresh stat block for `level` with full pools.
pub fn generate_stats(biases: &StatBiases, level: u32) -> StatBlock {
    StatKind::iter().fold(StatBlock::new(1, 0), |stats, kind| {
        stats.with(kind, stat_for_level(kind, biases.get(kind), level).max(1))
    })
}

/// Total experience required to reach `level`.
pub fn xp_for_level(level: u32) -> u64 {
    (100.0 * (level as f64).powf(1.5)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_level_two_matches_base() {
        let stats = generate_stats(&StatBiases::neutral(), 2);
        assert_eq!(stats.max_hp, 100);
        assert_eq!(stats.max_mp, 50);
        assert_eq!(stats.attack, 10);
        assert_eq!(stats.hp, stats.max_hp);
    }

    #[test]
    fn bias_scales_stats() {
        let biases = StatBiases::neutral()
            .with(StatKind::Attack, 4)
            .with(StatKind::Defense, 0);
        let stats = generate_stats(&biases, 10);
        assert_eq!(stats.attack, 75);
        assert_eq!(stats.defense, 25);
        assert_eq!(stats.speed, 50);
    }

    #[test]
    fn xp_curve() {
        assert_eq!(xp_for_level(1), 100);
        assert_eq!(xp_for_level(2), 282);
        assert_eq!(xp_for_level(4), 800);
    }

    #[test]
    fn bias_clamps_to_max_index() {
        let biases = StatBiases::neutral().with(StatKind::Luck, 9);
        assert_eq!(biases.get(StatKind::Luck), GameConfig::MAX_STAT_BIAS);
    }
}
