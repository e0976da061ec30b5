//! Hit, miss and critical rolls.

use crate::config::GameConfig;
use crate::rng::BattleRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Miss,
    Hit,
    Critical,
}

impl HitOutcome {
    pub const fn landed(self) -> bool {
        !matches!(self, HitOutcome::Miss)
    }
}

/// Miss and critical probabilities for one attacker/defender pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitChances {
    pub miss: f64,
    pub critical: f64,
}

impl HitChances {
    /// Shifts both chances by `luck_step` per point of luck difference,
    /// clamped to `[0, 1]`.
    ///
    /// # Formula
    ///
    /// ```text
    /// diff     = attacker_luck - defender_luck
    /// critical = clamp(base_crit + diff * step, 0, 1)
    /// miss     = clamp(base_miss - diff * step, 0, 1)
    /// ```
    pub fn new(attacker_luck: i32, defender_luck: i32, config: &GameConfig) -> Self {
        let diff = f64::from(attacker_luck - defender_luck);
        Self {
            critical: (config.base_crit_chance + diff * config.luck_step).clamp(0.0, 1.0),
            miss: (config.base_miss_chance - diff * config.luck_step).clamp(0.0, 1.0),
        }
    }

    /// Classifies a unit-interval roll. Miss is checked before critical, so
    /// a large miss chance can shadow the critical band entirely.
    pub fn classify(&self, roll: f64) -> HitOutcome {
        if roll < self.miss {
            HitOutcome::Miss
        } else if roll > 1.0 - self.critical {
            HitOutcome::Critical
        } else {
            HitOutcome::Hit
        }
    }

    /// Probability the classified outcome is a critical.
    pub fn effective_critical(&self) -> f64 {
        let band_start = (1.0 - self.critical).max(self.miss);
        (1.0 - band_start).max(0.0)
    }
}

/// Rolls a single uniform draw against the pair's chances.
pub fn roll_hit(
    attacker_luck: i32,
    defender_luck: i32,
    config: &GameConfig,
    rng: &mut (impl BattleRng + ?Sized),
) -> HitOutcome {
    HitChances::new(attacker_luck, defender_luck, config).classify(rng.next_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_luck_uses_base_chances() {
        let chances = HitChances::new(10, 10, &GameConfig::default());
        assert_eq!(chances.miss, 0.05);
        assert_eq!(chances.critical, 0.05);
        assert_eq!(chances.classify(0.01), HitOutcome::Miss);
        assert_eq!(chances.classify(0.5), HitOutcome::Hit);
        assert_eq!(chances.classify(0.99), HitOutcome::Critical);
    }

    #[test]
    fn more_luck_never_hurts() {
        let config = GameConfig::default();
        let mut previous = HitChances::new(0, 0, &config);
        for diff in -300..=300 {
            let chances = HitChances::new(diff, 0, &config);
            if diff > -300 {
                assert!(chances.critical >= previous.critical);
                assert!(chances.miss <= previous.miss);
                assert!(chances.effective_critical() >= previous.effective_critical());
            }
            assert!((0.0..=1.0).contains(&chances.miss));
            assert!((0.0..=1.0).contains(&chances.critical));
            previous = chances;
        }
    }

    #[test]
    fn miss_is_checked_before_critical() {
        // With overlapping bands the miss branch wins the shared rolls.
        let chances = HitChances {
            miss: 0.9,
            critical: 0.5,
        };
        assert_eq!(chances.classify(0.6), HitOutcome::Miss);
        assert_eq!(chances.classify(0.95), HitOutcome::Critical);
        assert!((chances.effective_critical() - 0.1).abs() < 1e-9);
    }
}
