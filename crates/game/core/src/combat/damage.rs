//! Damage formulas.

use crate::rng::BattleRng;

/// Physical damage before elements and criticals.
///
/// ```text
/// damage = int(uniform(variance) × attack × (attack / defense))
/// ```
///
/// Defense below 1 is treated as 1.
pub fn physical_damage(
    attack: i32,
    defense: i32,
    variance: (f64, f64),
    rng: &mut (impl BattleRng + ?Sized),
) -> i32 {
    let attack = f64::from(attack.max(0));
    let raw = attack * (attack / f64::from(defense.max(1)));
    (rng.uniform(variance.0, variance.1) * raw) as i32
}

/// Elemental spell damage before the elemental multiplier.
///
/// ```text
/// damage = int(uniform(variance) × power × (intelligence / wisdom))
/// ```
pub fn spell_damage(
    power: i32,
    intelligence: i32,
    wisdom: i32,
    variance: (f64, f64),
    rng: &mut (impl BattleRng + ?Sized),
) -> i32 {
    let raw = f64::from(power) * (f64::from(intelligence.max(0)) / f64::from(wisdom.max(1)));
    (rng.uniform(variance.0, variance.1) * raw) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRng;

    #[test]
    fn neutral_roll_gives_exact_formula() {
        // uniform(0.75, 1.25) at 0.5 is exactly 1.0
        let mut rng = SequenceRng::constant(0.5);
        assert_eq!(physical_damage(20, 10, (0.75, 1.25), &mut rng), 40);
        assert_eq!(spell_damage(50, 30, 15, (0.75, 1.25), &mut rng), 100);
    }

    #[test]
    fn zero_defense_does_not_divide_by_zero() {
        let mut rng = SequenceRng::constant(0.5);
        assert_eq!(physical_damage(5, 0, (0.75, 1.25), &mut rng), 25);
    }

    #[test]
    fn variance_bounds() {
        let mut low = SequenceRng::constant(0.0);
        assert_eq!(physical_damage(20, 10, (0.75, 1.25), &mut low), 30);
    }
}
