//! Time-unit turn scheduler.
//!
//! Every scheduling step adds `log2(speed + 1)` to each living combatant's
//! accumulator. The largest accumulator acts and resets to zero. Ties go to
//! the combatant first in roster order. Dead combatants neither accumulate
//! nor act.

/// Per-combatant input to a scheduling step, in roster order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contender {
    pub speed: i32,
    pub alive: bool,
}

impl Contender {
    fn gain(&self) -> f64 {
        f64::from(self.speed.max(0) + 1).log2()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnScheduler {
    time_units: Vec<f64>,
}

impl TurnScheduler {
    pub fn new(len: usize) -> Self {
        Self {
            time_units: vec![0.0; len],
        }
    }

    pub fn reset(&mut self) {
        self.time_units.iter_mut().for_each(|units| *units = 0.0);
    }

    pub fn time_units(&self) -> &[f64] {
        &self.time_units
    }

    /// Advances one step and returns the roster position of the next actor,
    /// or `None` if nobody is alive.
    pub fn next_actor(&mut self, contenders: &[Contender]) -> Option<usize> {
        Self::step(&mut self.time_units, contenders)
    }

    /// Forecasts the next `turns` actors without touching real state.
    pub fn predict(&self, contenders: &[Contender], turns: usize) -> Vec<usize> {
        let mut simulated = self.time_units.clone();
        let mut order = Vec::with_capacity(turns);
        for _ in 0..turns {
            match Self::step(&mut simulated, contenders) {
                Some(position) => order.push(position),
                None => break,
            }
        }
        order
    }

    fn step(units: &mut Vec<f64>, contenders: &[Contender]) -> Option<usize> {
        if units.len() < contenders.len() {
            units.resize(contenders.len(), 0.0);
        }

        let mut best: Option<usize> = None;
        for (position, contender) in contenders.iter().enumerate() {
            if !contender.alive {
                continue;
            }
            units[position] += contender.gain();
            // Strictly greater keeps the first-seen combatant on ties.
            if best.is_none_or(|current| units[position] > units[current]) {
                best = Some(position);
            }
        }

        if let Some(position) = best {
            units[position] = 0.0;
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contenders(speeds: &[i32]) -> Vec<Contender> {
        speeds
            .iter()
            .map(|&speed| Contender { speed, alive: true })
            .collect()
    }

    #[test]
    fn prediction_matches_real_steps() {
        let roster = contenders(&[7, 15, 3, 31]);
        let mut scheduler = TurnScheduler::new(roster.len());
        scheduler.next_actor(&roster);

        let predicted = scheduler.predict(&roster, 12);
        let actual: Vec<usize> = (0..12)
            .filter_map(|_| scheduler.next_actor(&roster))
            .collect();
        assert_eq!(predicted, actual);
    }

    #[test]
    fn predict_does_not_mutate() {
        let roster = contenders(&[10, 20]);
        let scheduler = TurnScheduler::new(2);
        let before = scheduler.clone();
        scheduler.predict(&roster, 5);
        assert_eq!(scheduler, before);
    }

    #[test]
    fn fastest_acts_first_and_resets() {
        let roster = contenders(&[3, 15]);
        let mut scheduler = TurnScheduler::new(2);
        assert_eq!(scheduler.next_actor(&roster), Some(1));
        assert_eq!(scheduler.time_units()[1], 0.0);
        assert_eq!(scheduler.time_units()[0], 2.0);
    }

    #[test]
    fn ties_go_to_first_in_roster() {
        let roster = contenders(&[7, 7, 7]);
        let mut scheduler = TurnScheduler::new(3);
        let order: Vec<usize> = (0..3).filter_map(|_| scheduler.next_actor(&roster)).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn dead_combatants_are_skipped() {
        let mut roster = contenders(&[100, 1]);
        roster[0].alive = false;
        let mut scheduler = TurnScheduler::new(2);
        assert_eq!(scheduler.next_actor(&roster), Some(1));
        assert_eq!(scheduler.time_units()[0], 0.0);

        roster[1].alive = false;
        assert_eq!(scheduler.next_actor(&roster), None);
    }
}
