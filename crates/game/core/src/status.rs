//! Status effects and their apply → update → remove lifecycle.
//!
//! Effects are unique by name on a combatant. Re-adding an effect that is
//! already present only refreshes its duration. Each effect records the
//! exact stat delta it applied, so removal restores the original values even
//! when the mutation was a truncating multiplication (Haste, Slow,
//! Intimidated). Removing an effect that is no longer applied is a no-op.

use crate::character::BattleFlags;
use crate::stats::{StatBlock, StatDelta, StatKind};

/// Behaviour of a status effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    /// Loses HP at the start of each of the owner's turns.
    Poison { damage_per_turn: i32 },
    /// Cannot cast spells.
    Silence,
    /// Flat defense bonus.
    Defend { bonus: i32 },
    /// Cannot act. Physical hits wake the target.
    Sleep,
    /// Recovers HP at the start of each of the owner's turns.
    Regen { heal_per_turn: i32 },
    /// Speed halved.
    Slow,
    /// Speed ×1.5.
    Haste,
    /// Attack, defense, intelligence, wisdom, speed and luck ×0.9.
    Intimidated,
    /// Arbitrary flat stat offsets.
    StatModifier { modifiers: StatDelta },
}

/// A named, timed effect attached to one combatant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub name: String,
    /// Remaining owner turns.
    pub duration: i32,
    pub detrimental: bool,
    pub kind: StatusKind,
    applied: Option<StatDelta>,
}

impl StatusEffect {
    pub fn new(name: impl Into<String>, duration: i32, detrimental: bool, kind: StatusKind) -> Self {
        Self {
            name: name.into(),
            duration,
            detrimental,
            kind,
            applied: None,
        }
    }

    pub fn poison(duration: i32, damage_per_turn: i32) -> Self {
        Self::new("Poison", duration, true, StatusKind::Poison { damage_per_turn })
    }

    pub fn silence(duration: i32) -> Self {
        Self::new("Silence", duration, true, StatusKind::Silence)
    }

    pub fn defend(duration: i32, bonus: i32) -> Self {
        Self::new("Defend", duration, false, StatusKind::Defend { bonus })
    }

    pub fn sleep(duration: i32) -> Self {
        Self::new("Sleep", duration, true, StatusKind::Sleep)
    }

    pub fn regen(duration: i32, heal_per_turn: i32) -> Self {
        Self::new("Regen", duration, false, StatusKind::Regen { heal_per_turn })
    }

    pub fn slow(duration: i32) -> Self {
        Self::new("Slow", duration, true, StatusKind::Slow)
    }

    pub fn haste(duration: i32) -> Self {
        Self::new("Haste", duration, false, StatusKind::Haste)
    }

    pub fn intimidated(duration: i32) -> Self {
        Self::new("Intimidated", duration, true, StatusKind::Intimidated)
    }

    pub fn stat_modifier(
        name: impl Into<String>,
        duration: i32,
        modifiers: StatDelta,
        detrimental: bool,
    ) -> Self {
        Self::new(name, duration, detrimental, StatusKind::StatModifier { modifiers })
    }

    pub fn is_applied(&self) -> bool {
        self.applied.is_some()
    }

    fn delta_for(&self, stats: &StatBlock) -> StatDelta {
        match &self.kind {
            StatusKind::Defend { bonus } => StatDelta::single(StatKind::Defense, *bonus),
            StatusKind::Slow => {
                StatDelta::single(StatKind::Speed, (stats.speed as f64 * 0.5) as i32 - stats.speed)
            }
            StatusKind::Haste => {
                StatDelta::single(StatKind::Speed, (stats.speed as f64 * 1.5) as i32 - stats.speed)
            }
            StatusKind::Intimidated => StatDelta::from_pairs(StatKind::COMBAT.map(|kind| {
                let value = stats.get(kind);
                (kind, (value as f64 * 0.9) as i32 - value)
            })),
            StatusKind::StatModifier { modifiers } => *modifiers,
            StatusKind::Poison { .. }
            | StatusKind::Silence
            | StatusKind::Sleep
            | StatusKind::Regen { .. } => StatDelta::zero(),
        }
    }

    /// Mutates the owner once. Applying twice has no further effect.
    pub fn apply(&mut self, stats: &mut StatBlock, flags: &mut BattleFlags) {
        if self.applied.is_some() {
            return;
        }
        let delta = self.delta_for(stats);
        stats.apply_delta(&delta);
        match self.kind {
            StatusKind::Silence => flags.can_cast_spells = false,
            StatusKind::Sleep => flags.can_act = false,
            _ => {}
        }
        self.applied = Some(delta);
    }

    /// Per-turn effect. Returns the HP actually changed.
    pub fn update(&mut self, stats: &mut StatBlock) -> i32 {
        match self.kind {
            StatusKind::Poison { damage_per_turn } => stats.hp_change(-damage_per_turn),
            StatusKind::Regen { heal_per_turn } => stats.hp_change(heal_per_turn),
            _ => 0,
        }
    }

    /// Reverses the recorded mutation. Returns false if nothing was applied.
    pub fn remove(&mut self, stats: &mut StatBlock, flags: &mut BattleFlags) -> bool {
        let Some(delta) = self.applied.take() else {
            return false;
        };
        stats.apply_delta(&delta.negated());
        match self.kind {
            StatusKind::Silence => flags.can_cast_spells = true,
            StatusKind::Sleep => flags.can_act = true,
            _ => {}
        }
        true
    }
}

/// Effect blueprint stored in catalogs and instantiated on cast.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectTemplate {
    Poison,
    Silence,
    Sleep,
    Slow,
    Haste,
    Regen,
    Defend,
    Intimidated,
    /// Percentage boost of one stat, measured on the target when applied.
    Boost { stat: StatKind, percent: i32 },
    /// Percentage reduction of one stat.
    Weaken { stat: StatKind, percent: i32 },
}

impl EffectTemplate {
    /// Builds a concrete effect. `potency` feeds per-turn amounts and flat bonuses.
    pub fn instantiate(&self, duration: i32, potency: i32, target: &StatBlock) -> StatusEffect {
        match self {
            EffectTemplate::Poison => StatusEffect::poison(duration, potency.max(1)),
            EffectTemplate::Silence => StatusEffect::silence(duration),
            EffectTemplate::Sleep => StatusEffect::sleep(duration),
            EffectTemplate::Slow => StatusEffect::slow(duration),
            EffectTemplate::Haste => StatusEffect::haste(duration),
            EffectTemplate::Regen => StatusEffect::regen(duration, potency.max(1)),
            EffectTemplate::Defend => StatusEffect::defend(duration, potency.max(1)),
            EffectTemplate::Intimidated => StatusEffect::intimidated(duration),
            EffectTemplate::Boost { stat, percent } => StatusEffect::stat_modifier(
                format!("{} Boost", stat.label()),
                duration,
                StatDelta::single(*stat, target.get(*stat) * percent / 100),
                false,
            ),
            EffectTemplate::Weaken { stat, percent } => StatusEffect::stat_modifier(
                format!("{} Down", stat.label()),
                duration,
                StatDelta::single(*stat, -(target.get(*stat) * percent / 100)),
                true,
            ),
        }
    }
}

/// Outcome of one effect's per-turn update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub name: String,
    pub hp_delta: i32,
    pub expired: bool,
}

/// Active effects on a combatant, unique by name, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.effects.iter().map(|e| e.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Adds and applies `effect`, or refreshes the duration of the existing
    /// effect with the same name. Returns true if the effect is new.
    pub fn add(&mut self, mut effect: StatusEffect, stats: &mut StatBlock, flags: &mut BattleFlags) -> bool {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.name == effect.name) {
            existing.duration = effect.duration;
            return false;
        }
        effect.apply(stats, flags);
        self.effects.push(effect);
        true
    }

    /// Removes the named effect, reversing its mutation.
    pub fn remove(&mut self, name: &str, stats: &mut StatBlock, flags: &mut BattleFlags) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.name == name)?;
        let mut effect = self.effects.remove(index);
        effect.remove(stats, flags);
        Some(effect)
    }

    /// Removes every effect matching `predicate`; returns their names.
    pub fn remove_where(
        &mut self,
        mut predicate: impl FnMut(&StatusEffect) -> bool,
        stats: &mut StatBlock,
        flags: &mut BattleFlags,
    ) -> Vec<String> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.effects.len());
        for mut effect in self.effects.drain(..) {
            if predicate(&effect) {
                effect.remove(stats, flags);
                removed.push(effect.name);
            } else {
                kept.push(effect);
            }
        }
        self.effects = kept;
        removed
    }

    /// Removes all effects, reversing each.
    pub fn clear(&mut self, stats: &mut StatBlock, flags: &mut BattleFlags) {
        for mut effect in self.effects.drain(..) {
            effect.remove(stats, flags);
        }
    }

    /// Runs one owner turn: update, decrement, expire. If an update kills the
    /// owner the remaining effects are cleared and the tick stops.
    pub fn tick(&mut self, stats: &mut StatBlock, flags: &mut BattleFlags) -> Vec<TickReport> {
        let mut reports = Vec::new();
        let mut index = 0;
        while index < self.effects.len() {
            let was_alive = stats.alive;
            let effect = &mut self.effects[index];
            let hp_delta = effect.update(stats);
            effect.duration -= 1;
            let expired = effect.duration <= 0;
            reports.push(TickReport {
                name: effect.name.clone(),
                hp_delta,
                expired,
            });

            if was_alive && !stats.alive {
                self.clear(stats, flags);
                break;
            }
            if expired {
                let mut effect = self.effects.remove(index);
                effect.remove(stats, flags);
            } else {
                index += 1;
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (StatusEffects, StatBlock, BattleFlags) {
        (StatusEffects::new(), StatBlock::new(100, 50), BattleFlags::default())
    }

    #[test]
    fn re_adding_refreshes_duration_without_duplicating() {
        let (mut effects, mut stats, mut flags) = setup();
        assert!(effects.add(StatusEffect::defend(1, 10), &mut stats, &mut flags));
        assert!(!effects.add(StatusEffect::defend(4, 10), &mut stats, &mut flags));

        assert_eq!(effects.len(), 1);
        assert_eq!(effects.get("Defend").map(|e| e.duration), Some(4));
        assert_eq!(stats.defense, 20, "bonus applied only once");
    }

    #[test]
    fn haste_and_slow_restore_exact_speed() {
        let (mut effects, mut stats, mut flags) = setup();
        stats.speed = 7;
        effects.add(StatusEffect::haste(3), &mut stats, &mut flags);
        assert_eq!(stats.speed, 10);
        effects.add(StatusEffect::slow(3), &mut stats, &mut flags);
        assert_eq!(stats.speed, 5);

        effects.remove("Haste", &mut stats, &mut flags);
        effects.remove("Slow", &mut stats, &mut flags);
        assert_eq!(stats.speed, 7);
    }

    #[test]
    fn intimidated_round_trips_all_combat_stats() {
        let (mut effects, mut stats, mut flags) = setup();
        stats.attack = 23;
        stats.luck = 9;
        let before = stats.clone();
        effects.add(StatusEffect::intimidated(1), &mut stats, &mut flags);
        assert_eq!(stats.attack, 20);
        assert_eq!(stats.luck, 8);
        effects.clear(&mut stats, &mut flags);
        assert_eq!(stats, before);
    }

    #[test]
    fn removing_twice_does_not_double_reverse() {
        let (_, mut stats, mut flags) = setup();
        let mut effect = StatusEffect::defend(2, 10);
        effect.apply(&mut stats, &mut flags);
        assert!(effect.remove(&mut stats, &mut flags));
        assert!(!effect.remove(&mut stats, &mut flags));
        assert_eq!(stats.defense, 10);
    }

    #[test]
    fn sleep_and_silence_toggle_flags() {
        let (mut effects, mut stats, mut flags) = setup();
        effects.add(StatusEffect::sleep(2), &mut stats, &mut flags);
        effects.add(StatusEffect::silence(2), &mut stats, &mut flags);
        assert!(!flags.can_act);
        assert!(!flags.can_cast_spells);

        effects.remove("Sleep", &mut stats, &mut flags);
        assert!(flags.can_act);
        assert!(!flags.can_cast_spells);
    }

    #[test]
    fn tick_updates_then_expires() {
        let (mut effects, mut stats, mut flags) = setup();
        effects.add(StatusEffect::poison(2, 5), &mut stats, &mut flags);
        effects.add(StatusEffect::defend(1, 10), &mut stats, &mut flags);

        let reports = effects.tick(&mut stats, &mut flags);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].hp_delta, -5);
        assert!(reports[1].expired);
        assert_eq!(stats.hp, 95);
        assert_eq!(stats.defense, 10);
        assert_eq!(effects.names(), vec!["Poison".to_string()]);

        effects.tick(&mut stats, &mut flags);
        assert!(effects.is_empty());
        assert_eq!(stats.hp, 90);
    }

    #[test]
    fn lethal_poison_clears_all_effects() {
        let (mut effects, mut stats, mut flags) = setup();
        stats.hp = 3;
        effects.add(StatusEffect::poison(3, 5), &mut stats, &mut flags);
        effects.add(StatusEffect::defend(3, 10), &mut stats, &mut flags);

        effects.tick(&mut stats, &mut flags);
        assert!(!stats.alive);
        assert!(effects.is_empty());
        assert_eq!(stats.defense, 10);
    }

    #[test]
    fn remove_where_targets_detrimental_effects() {
        let (mut effects, mut stats, mut flags) = setup();
        effects.add(StatusEffect::sleep(2), &mut stats, &mut flags);
        effects.add(StatusEffect::regen(2, 4), &mut stats, &mut flags);
        effects.add(StatusEffect::poison(2, 4), &mut stats, &mut flags);

        let removed = effects.remove_where(|e| e.detrimental, &mut stats, &mut flags);
        assert_eq!(removed, vec!["Sleep".to_string(), "Poison".to_string()]);
        assert_eq!(effects.names(), vec!["Regen".to_string()]);
        assert!(flags.can_act);
    }

    #[test]
    fn boost_template_scales_from_target() {
        let stats = StatBlock::new(10, 0).with(StatKind::Luck, 40);
        let effect = EffectTemplate::Boost {
            stat: StatKind::Luck,
            percent: 30,
        }
        .instantiate(3, 0, &stats);
        assert_eq!(effect.name, "Luck Boost");
        assert!(!effect.detrimental);
        assert_eq!(
            effect.kind,
            StatusKind::StatModifier {
                modifiers: StatDelta::single(StatKind::Luck, 12)
            }
        );
    }
}
