//! Skill effects for [`Battle`].
//!
//! SP has already been paid and targets expanded by the time a skill runs.
//! Single-target skills receive exactly one living target; group skills
//! receive every living member of the relevant side (possibly none).

use super::action::TargetSpec;
use super::machine::Battle;
use super::roster::CombatantId;
use crate::ability::{Skill, SkillKind};
use crate::stats::{StatDelta, StatKind};
use crate::status::StatusEffect;

/// Steal succeeds at least this often.
const STEAL_BASE_RATE: f64 = 0.33;
const STEAL_LUCK_RATE: f64 = 0.02;
const STEAL_MAX_RATE: f64 = 0.99;

const SPELL_ECHO_CHANCE: f64 = 0.3;
const LUCKY_STRIKE_AILMENT_CHANCE: f64 = 0.4;

/// Duration shared by skill-granted effects.
const SKILL_EFFECT_DURATION: i32 = 3;

impl Battle<'_> {
    pub(super) fn use_skill(
        &mut self,
        user: CombatantId,
        skill: &Skill,
        targets: Vec<CombatantId>,
        spec: &TargetSpec,
        spell_name: Option<&str>,
    ) {
        let u = self.name_of(user);
        let text = match skill.kind {
            SkillKind::Attack => match targets.first() {
                Some(&target) => self.perform_attack(user, target),
                None => return,
            },
            SkillKind::EnemySpecial => {
                let Some(&target) = targets.first() else { return };
                let t = self.name_of(target);
                let damage = self.base_physical(user, target);
                let (dealt, defeated) = self.deal_damage(target, damage);
                self.wake(target);
                let mut text = format!("{u} uses {} on {t} for {dealt} damage", skill.name);
                if defeated {
                    text.push_str(&format!("\n{t} has been defeated!"));
                }
                text
            }
            SkillKind::Inspect => {
                let Some(&target) = targets.first() else { return };
                let t = self.roster.get(target);
                format!(
                    "{u} inspects {}...\n\nLevel {} {}\n{}\nHP {}/{}  MP {}/{}\nStatus: {}",
                    t.name,
                    t.level,
                    t.job_class,
                    t.description,
                    t.stats.hp,
                    t.stats.max_hp,
                    t.stats.mp,
                    t.stats.max_mp,
                    if t.status.is_empty() { "none".to_string() } else { t.status.names().join(", ") },
                )
            }
            SkillKind::BigSwing => self.sweep(user, &targets, 3, format!("{u} uses Big Swing ({})!\n", skill.kind.description())),
            SkillKind::Requiem => self.sweep(user, &targets, 1000, format!("{u} uses Requiem ({})!\n", skill.kind.description())),
            SkillKind::Prayer => {
                let wisdom = self.roster.get(user).stats.wisdom;
                let healing = (f64::from(wisdom) * self.rng.uniform(1.0, 2.0)) as i32;
                let c = self.roster.get_mut(user);
                let hp = c.hp_change(healing);
                let mp = c.stats.mp_change(healing / 2);
                format!("{u} prays to the gods and recovers {hp} HP and {mp} MP")
            }
            SkillKind::Steal => {
                let Some(&target) = targets.first() else { return };
                self.steal(user, target)
            }
            SkillKind::DoubleCast => self.double_cast(user, spec, spell_name.unwrap_or_default()),
            SkillKind::SpellEcho => self.spell_echo(user, spec, spell_name.unwrap_or_default()),
            SkillKind::DefensiveShout => {
                let Some(&target) = targets.first() else { return };
                let t = self.name_of(target);
                self.roster
                    .get_mut(target)
                    .add_status_effect(StatusEffect::intimidated(SKILL_EFFECT_DURATION));
                self.roster
                    .get_mut(user)
                    .add_status_effect(StatusEffect::defend(SKILL_EFFECT_DURATION, 5));
                format!("{u} uses Defensive Shout on {t}, intimidating them while taking a defensive stance!")
            }
            SkillKind::Quickstep => {
                let mut text = format!("{u} performs an elegant dance!\n");
                for &ally in &targets {
                    let a = self.roster.get_mut(ally);
                    a.add_status_effect(StatusEffect::haste(SKILL_EFFECT_DURATION));
                    text.push_str(&format!("{} is energized by the dance!\n", a.name));
                }
                text
            }
            SkillKind::RallyingCry => {
                let Some(&target) = targets.first() else { return };
                let t = self.name_of(target);
                let damage = (f64::from(self.base_physical(user, target)) * 1.2) as i32;
                let (dealt, _) = self.deal_damage(target, damage);
                let mut text = format!("{u} lets out a rallying cry!\n{t} takes {dealt} damage!\n");
                text.push_str(&self.boost_side(user, StatKind::Attack, 0.2, "Attack Boost", "attack boosted"));
                text
            }
            SkillKind::LastStand => {
                let Some(&target) = targets.first() else { return };
                let t = self.name_of(target);
                let multiplier = 2.0 + (1.0 - self.roster.get(user).stats.hp_ratio()) * 3.0;
                let damage = (f64::from(self.base_physical(user, target)) * multiplier) as i32;
                let (dealt, _) = self.deal_damage(target, damage);
                format!("{u} makes a desperate last stand!\n{t} takes {dealt} damage!")
            }
            SkillKind::Stalwart => {
                let c = self.roster.get_mut(user);
                let wisdom = c.stats.wisdom;
                c.add_status_effect(StatusEffect::defend(SKILL_EFFECT_DURATION, 10));
                c.add_status_effect(StatusEffect::regen(SKILL_EFFECT_DURATION, wisdom));
                format!("{u} takes a stalwart stance, gaining defense and regeneration!")
            }
            SkillKind::UnityStand => {
                let mut text = format!("{u} rallies allies in a unified defense!\n");
                text.push_str(&self.boost(&targets, StatKind::Defense, 0.3, "Defense Boost", "defense boosted"));
                text
            }
            SkillKind::SpellMastery => {
                let c = self.roster.get_mut(user);
                c.add_status_effect(StatusEffect::stat_modifier("Spell Mastery", 1, StatDelta::zero(), false));
                c.flags.next_spell_free = true;
                format!("{u} focuses their magical energy for the next spell!")
            }
            SkillKind::GroupHeal => {
                let base = (f64::from(self.roster.get(user).stats.wisdom) * 0.8) as i32;
                let mut text = format!("{u} channels healing energy to the group!\n");
                for &ally in &targets {
                    let healing = (f64::from(base) * self.rng.uniform(0.9, 1.1)) as i32;
                    let a = self.roster.get_mut(ally);
                    let healed = a.hp_change(healing);
                    text.push_str(&format!("{} recovers {healed} HP!\n", a.name));
                }
                text
            }
            SkillKind::Purify => {
                let Some(&target) = targets.first() else { return };
                let t = self.roster.get_mut(target);
                let mut text = format!("{u} attempts to purify {}!\n", t.name);
                let removed = t.remove_detrimental_effects();
                if removed.is_empty() {
                    text.push_str("No negative status effects to remove!");
                } else {
                    text.push_str(&format!("Removed status effects: {}", removed.join(", ")));
                }
                text
            }
            SkillKind::BattleDance => {
                let Some(&target) = targets.first() else { return };
                let t = self.roster.get_mut(target);
                let boost = (f64::from(t.stats.attack) * 0.15) as i32;
                t.add_status_effect(StatusEffect::haste(SKILL_EFFECT_DURATION));
                t.add_status_effect(StatusEffect::stat_modifier(
                    "Dance Attack Boost",
                    SKILL_EFFECT_DURATION,
                    StatDelta::single(StatKind::Attack, boost),
                    false,
                ));
                let t = t.name.clone();
                format!("{u} performs an energizing dance for {t}!\n{t} has their speed and attack power increased!")
            }
            SkillKind::Whirlwind => self.whirlwind(user, &targets),
            SkillKind::LuckyStrike => {
                let Some(&target) = targets.first() else { return };
                self.lucky_strike(user, target)
            }
            SkillKind::FortunesFavor => {
                let mut text = format!("{u} calls upon Lady Luck!\n");
                text.push_str(&self.boost(&targets, StatKind::Luck, 0.3, "Luck Boost", "luck increased"));
                text
            }
        };
        let text = text.trim_end();
        if !text.is_empty() {
            self.narrate(format!("{} used!", skill.name), text);
        }
    }

    /// Hits every target for `multiplier ×` base physical damage.
    fn sweep(&mut self, user: CombatantId, targets: &[CombatantId], multiplier: i32, mut text: String) -> String {
        let u = self.name_of(user);
        for &target in targets {
            let t = self.name_of(target);
            let damage = self.base_physical(user, target).saturating_mul(multiplier);
            let (dealt, defeated) = self.deal_damage(target, damage);
            self.wake(target);
            text.push_str(&format!("{u} attacks {t} for {dealt} damage\n"));
            if defeated {
                text.push_str(&format!("{t} has been defeated!\n"));
            }
        }
        text
    }

    /// Adds a percentage stat boost to each target, measured on that target.
    fn boost(&mut self, targets: &[CombatantId], stat: StatKind, fraction: f64, name: &str, phrase: &str) -> String {
        let mut text = String::new();
        for &ally in targets {
            let a = self.roster.get_mut(ally);
            let amount = (f64::from(a.stats.get(stat)) * fraction) as i32;
            a.add_status_effect(StatusEffect::stat_modifier(
                name,
                SKILL_EFFECT_DURATION,
                StatDelta::single(stat, amount),
                false,
            ));
            text.push_str(&format!("{} has their {phrase}!\n", a.name));
        }
        text
    }

    fn boost_side(&mut self, user: CombatantId, stat: StatKind, fraction: f64, name: &str, phrase: &str) -> String {
        let allies = self.roster.living(user.side);
        self.boost(&allies, stat, fraction, name, phrase)
    }

    fn steal(&mut self, user: CombatantId, target: CombatantId) -> String {
        let u = self.name_of(user);
        let t = self.name_of(target);
        let luck_difference = self.roster.get(user).stats.luck - self.roster.get(target).stats.luck;
        let rate = (STEAL_BASE_RATE + f64::from(luck_difference.max(0)) * STEAL_LUCK_RATE)
            .clamp(STEAL_BASE_RATE, STEAL_MAX_RATE);

        if !self.rng.chance(rate) {
            return format!("{u} attempts to steal from {t}, but fails!");
        }
        let loot_len = self
            .roster
            .get(target)
            .enemy_data()
            .map_or(0, |data| data.loot.len());
        let Some(index) = self.rng.pick_index(loot_len) else {
            return format!("{u} attempts to steal from {t}, but they have nothing to steal!");
        };
        let Some(item) = self
            .roster
            .get_mut(target)
            .enemy_data_mut()
            .map(|data| data.loot.remove(index))
        else {
            return format!("{u} attempts to steal from {t}, but they have nothing to steal!");
        };

        let item_name = item.name.clone();
        if self.roster.get(user).is_player() {
            if let Some(data) = self.roster.get_mut(user).player_data_mut() {
                data.temp_inventory.push(item);
            }
        } else {
            // Enemies keep what they take in their own party inventory.
            self.roster.side_mut(user.side).add_item(item);
        }
        format!("{u} successfully steals {item_name} from {t}!")
    }

    fn double_cast(&mut self, user: CombatantId, spec: &TargetSpec, spell_name: &str) -> String {
        let u = self.name_of(user);
        let Some(spell) = self.roster.get(user).find_spell(spell_name).cloned() else {
            return format!("{u} tries to double cast but doesn't know the spell {spell_name}!");
        };
        if self.roster.get(user).stats.mp < spell.mp_cost() * 2 {
            return format!("{u} tries to double cast {} but doesn't have enough MP!", spell.name);
        }
        let Some(targets) = self.spell_targets(user, &spell, spec) else {
            return format!("{u} tries to double cast {} but has no valid target!", spell.name);
        };

        self.narrate("Double Cast used!", format!("{u} prepares to cast {} twice!", spell.name));
        for _ in 0..2 {
            self.cast_spell(user, &spell, &targets, false);
        }
        String::new()
    }

    fn spell_echo(&mut self, user: CombatantId, spec: &TargetSpec, spell_name: &str) -> String {
        let u = self.name_of(user);
        let caster = self.roster.get(user);
        let Some(spell) = caster.find_spell(spell_name).cloned() else {
            return format!("{u} tries to echo but doesn't know the spell {spell_name}!");
        };
        if !caster.flags.next_spell_free && caster.stats.mp < spell.mp_cost() {
            return format!("{u} tries to echo {} but doesn't have enough MP!", spell.name);
        }
        let Some(targets) = self.spell_targets(user, &spell, spec) else {
            return format!("{u} tries to echo {} but has no valid target!", spell.name);
        };

        self.cast_spell(user, &spell, &targets, false);
        if self.rng.chance(SPELL_ECHO_CHANCE) {
            self.narrate("Spell Echo used!", format!("{u} has their spell echo!"));
            self.cast_spell(user, &spell, &targets, true);
            String::new()
        } else {
            format!("{u} has their spell fail to echo.")
        }
    }

    fn whirlwind(&mut self, user: CombatantId, targets: &[CombatantId]) -> String {
        let u = self.name_of(user);
        let mut text = format!("{u} becomes a whirlwind of attacks!\n");
        let hits = self.rng.range_inclusive(3, 5);
        for _ in 0..hits {
            let living: Vec<CombatantId> = targets
                .iter()
                .copied()
                .filter(|id| self.roster.get(*id).is_alive())
                .collect();
            let Some(index) = self.rng.pick_index(living.len()) else { break };
            let target = living[index];
            let t = self.name_of(target);
            let damage = (f64::from(self.base_physical(user, target)) * 0.5) as i32;
            let (dealt, defeated) = self.deal_damage(target, damage);
            self.wake(target);
            text.push_str(&format!("{t} takes {dealt} damage!\n"));
            if defeated {
                text.push_str(&format!("{t} has been defeated!\n"));
            }
        }
        text
    }

    fn lucky_strike(&mut self, user: CombatantId, target: CombatantId) -> String {
        let u = self.name_of(user);
        let t = self.name_of(target);
        let damage = self.base_physical(user, target).saturating_mul(2);
        let (dealt, defeated) = self.deal_damage(target, damage);
        let mut text = format!("{u} lands a lucky strike on {t} for {dealt} damage!\n");

        if !defeated && self.rng.chance(LUCKY_STRIKE_AILMENT_CHANCE) {
            let poison = (f64::from(self.roster.get(user).stats.attack) * 0.2) as i32;
            let ailments = [
                StatusEffect::sleep(2),
                StatusEffect::slow(2),
                StatusEffect::poison(2, poison),
                StatusEffect::silence(2),
            ];
            if let Some(index) = self.rng.pick_index(ailments.len()) {
                let effect = ailments[index].clone();
                let name = effect.name.clone();
                self.roster.get_mut(target).add_status_effect(effect);
                text.push_str(&format!("Lucky! {t} is afflicted with {name}!"));
            }
        }
        text
    }
}
