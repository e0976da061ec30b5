//! Action resolution for [`Battle`].
//!
//! Every action kind has one handler. Handlers narrate instead of failing:
//! an unknown ability, a bad target or a missing resource produces a notice
//! and leaves the battle untouched apart from the consumed turn.

use tracing::{debug, warn};

use super::action::{BattleAction, TargetSpec};
use super::log::{EntryKind, LogEntry};
use super::machine::Battle;
use super::roster::CombatantId;
use crate::ability::{Spell, SpellEffect, Targeting};
use crate::combat::{HitOutcome, physical_damage, roll_hit, spell_damage};
use crate::element::calculate_elemental_damage;
use crate::item::{Item, ItemKind};
use crate::status::StatusEffect;

/// Divisor turning spell power into per-turn amounts and flat bonuses.
const SPELL_POTENCY_DIVISOR: i32 = 5;

impl Battle<'_> {
    pub(super) fn execute(&mut self, actor: CombatantId, action: BattleAction) {
        match action {
            BattleAction::Attack { target } => self.handle_attack(actor, &target),
            BattleAction::Skill {
                skill_name,
                target,
                spell_name,
            } => self.handle_skill(actor, &skill_name, &target, spell_name.as_deref()),
            BattleAction::Spell { spell_name, target } => self.handle_spell(actor, &spell_name, &target),
            BattleAction::Item { item_name, target } => self.handle_item(actor, &item_name, &target),
            BattleAction::Defend => self.handle_defend(actor),
            BattleAction::Run => self.handle_run(),
            BattleAction::Pass => self.handle_pass(actor),
            BattleAction::Unknown { action_type } => {
                let name = self.name_of(actor);
                warn!(target: "game_core::battle", actor = %name, action_type = %action_type, "unknown action type");
                self.log.push(LogEntry::new(
                    EntryKind::Notice,
                    format!("{name} hesitates"),
                    format!("{name} does not know how to '{action_type}'"),
                ));
            }
        }
    }

    // ========================================================================
    // Narration helpers
    // ========================================================================

    pub(super) fn name_of(&self, id: CombatantId) -> String {
        self.roster.get(id).name.clone()
    }

    pub(super) fn narrate(&mut self, title: impl Into<String>, text: impl Into<String>) {
        self.log.push(LogEntry::action(title, text));
    }

    pub(super) fn notice(&mut self, title: impl Into<String>, text: impl Into<String>) {
        self.log.push(LogEntry::new(EntryKind::Notice, title, text));
    }

    fn invalid_target(&mut self, actor: CombatantId, target: &TargetSpec) {
        let name = self.name_of(actor);
        debug!(target: "game_core::battle", actor = %name, target = %target.describe(), "invalid target");
        self.notice(
            "Invalid target",
            format!("{name} has no valid target: {}", target.describe()),
        );
    }

    // ========================================================================
    // Targeting
    // ========================================================================

    /// Resolves a target spec against the roster. `random_enemy` samples a
    /// living member of the actor's opposing side.
    pub(super) fn resolve_target(&mut self, actor: CombatantId, spec: &TargetSpec) -> Option<Vec<CombatantId>> {
        let ids = match spec {
            TargetSpec::Name(name) => vec![self.roster.find(name)?],
            TargetSpec::RandomEnemy => {
                let living = self.roster.living(actor.side.opposite());
                let index = self.rng.pick_index(living.len())?;
                vec![living[index]]
            }
            TargetSpec::Names(names) => self
                .roster
                .iter()
                .filter(|(_, c)| names.iter().any(|n| *n == c.name))
                .map(|(id, _)| id)
                .collect(),
            TargetSpec::Index(position) => vec![self.roster.id_at(*position)?],
        };
        (!ids.is_empty()).then_some(ids)
    }

    /// First living combatant the spec resolves to.
    pub(super) fn resolve_living(&mut self, actor: CombatantId, spec: &TargetSpec) -> Option<CombatantId> {
        self.resolve_target(actor, spec)?
            .into_iter()
            .find(|id| self.roster.get(*id).is_alive())
    }

    /// Expands a targeting kind into concrete ids. Self and group kinds
    /// ignore the spec; single kinds resolve it.
    pub(super) fn targets_for(
        &mut self,
        actor: CombatantId,
        targeting: Targeting,
        spec: &TargetSpec,
        require_living: bool,
    ) -> Option<Vec<CombatantId>> {
        match targeting {
            Targeting::SelfOnly => Some(vec![actor]),
            Targeting::Allies => Some(self.roster.living(actor.side)),
            Targeting::Enemies => Some(self.roster.living(actor.side.opposite())),
            Targeting::Ally | Targeting::Enemy if require_living => {
                self.resolve_living(actor, spec).map(|id| vec![id])
            }
            Targeting::Ally | Targeting::Enemy => {
                let ids = self.resolve_target(actor, spec)?;
                ids.into_iter().next().map(|id| vec![id])
            }
        }
    }

    // ========================================================================
    // Shared effects
    // ========================================================================

    /// Deals `amount` damage and returns `(dealt, defeated)`.
    pub(super) fn deal_damage(&mut self, target: CombatantId, amount: i32) -> (i32, bool) {
        let combatant = self.roster.get_mut(target);
        let was_alive = combatant.is_alive();
        let dealt = -combatant.hp_change(-amount.max(0));
        (dealt, was_alive && !combatant.is_alive())
    }

    /// Physical hits wake sleeping targets.
    pub(super) fn wake(&mut self, target: CombatantId) {
        self.roster.get_mut(target).remove_status_effect("Sleep");
    }

    /// Base physical damage of `attacker` against `target`.
    pub(super) fn base_physical(&mut self, attacker: CombatantId, target: CombatantId) -> i32 {
        let attack = self.roster.get(attacker).stats.attack;
        let defense = self.roster.get(target).stats.defense;
        physical_damage(attack, defense, self.config.damage_variance, &mut *self.rng)
    }

    /// Rolls and applies a basic attack, returning the narration.
    pub(super) fn perform_attack(&mut self, attacker: CombatantId, target: CombatantId) -> String {
        let (a_name, a_luck, a_element) = {
            let a = self.roster.get(attacker);
            (a.name.clone(), a.stats.luck, a.attack_element())
        };
        let (t_name, t_luck, t_element) = {
            let t = self.roster.get(target);
            (t.name.clone(), t.stats.luck, t.defense_element())
        };

        let outcome = roll_hit(a_luck, t_luck, &self.config, &mut *self.rng);
        if !outcome.landed() {
            return format!("{a_name} attacks {t_name} but misses!");
        }

        let base = self.base_physical(attacker, target);
        let elemental = calculate_elemental_damage(base, a_element, t_element);
        let critical = outcome == HitOutcome::Critical;
        let damage = if critical { elemental.damage.saturating_mul(2) } else { elemental.damage };

        let (dealt, defeated) = self.deal_damage(target, damage);
        self.wake(target);

        let mut text = format!("{a_name} attacks {t_name} for {dealt} damage\n{}", elemental.explanation);
        if critical {
            text.push_str("\nCritical hit!");
        }
        if defeated {
            text.push_str(&format!("\n{t_name} has been defeated!"));
        }
        text
    }

    fn gain_sp(&mut self, actor: CombatantId) {
        self.roster.get_mut(actor).stats.sp_change(1);
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    fn handle_attack(&mut self, actor: CombatantId, spec: &TargetSpec) {
        let Some(target) = self.resolve_living(actor, spec) else {
            self.invalid_target(actor, spec);
            return;
        };
        let text = self.perform_attack(actor, target);
        self.narrate("Attack used!", text);
        self.gain_sp(actor);
    }

    fn handle_skill(&mut self, actor: CombatantId, skill_name: &str, spec: &TargetSpec, spell_name: Option<&str>) {
        let user = self.roster.get(actor);
        let Some(skill) = user.find_skill(skill_name).cloned() else {
            let name = user.name.clone();
            self.notice(
                "No skills to use",
                format!("{name} does not know the skill {skill_name}"),
            );
            return;
        };
        if user.stats.sp < skill.sp_cost() {
            let name = user.name.clone();
            self.notice(
                format!("{name} does not have enough SP to use {}", skill.name),
                "",
            );
            return;
        }

        // Spell-wrapping skills take their targets from the spell.
        let targets = if skill.kind.requires_spell() {
            Vec::new()
        } else {
            match self.targets_for(actor, skill.targeting(), spec, true) {
                Some(targets) => targets,
                None => {
                    self.invalid_target(actor, spec);
                    return;
                }
            }
        };

        self.roster.get_mut(actor).stats.sp_change(-skill.sp_cost());
        self.use_skill(actor, &skill, targets, spec, spell_name);
    }

    fn handle_spell(&mut self, actor: CombatantId, spell_name: &str, spec: &TargetSpec) {
        let caster = self.roster.get(actor);
        let name = caster.name.clone();
        let Some(spell) = caster.find_spell(spell_name).cloned() else {
            self.notice(
                "No spells to use",
                format!("{name} does not know the spell {spell_name}"),
            );
            return;
        };
        if !caster.flags.can_cast_spells {
            self.notice(format!("{name} is silenced and cannot cast spells"), "");
            return;
        }
        if !caster.flags.next_spell_free && caster.stats.mp < spell.mp_cost() {
            self.notice(
                format!("{name} does not have enough MP to cast {}", spell.name),
                "",
            );
            return;
        }
        let Some(targets) = self.spell_targets(actor, &spell, spec) else {
            self.invalid_target(actor, spec);
            return;
        };

        self.cast_spell(actor, &spell, &targets, false);
        self.gain_sp(actor);
    }

    fn handle_item(&mut self, actor: CombatantId, item_name: &str, spec: &TargetSpec) {
        let name = self.name_of(actor);
        if !self.roster.side(actor.side).has_item(item_name) {
            self.notice("No items to use", format!("{name} could not find {item_name}"));
            return;
        }
        let Some(target) = self
            .resolve_target(actor, spec)
            .and_then(|ids| ids.into_iter().next())
        else {
            self.invalid_target(actor, spec);
            return;
        };
        let Some(item) = self.roster.side_mut(actor.side).take_item(item_name) else {
            return;
        };

        let text = self.apply_item(&item, target);
        self.narrate(format!("{} used!", item.name), text);
        self.gain_sp(actor);
    }

    fn handle_defend(&mut self, actor: CombatantId) {
        let effect = StatusEffect::defend(self.config.defend_duration, self.config.defend_bonus);
        let combatant = self.roster.get_mut(actor);
        combatant.add_status_effect(effect);
        combatant.stats.sp_change(1);
        let name = combatant.name.clone();
        self.notice(format!("{name} defends"), "");
    }

    /// Either side may run; any successful run ends the battle as fled.
    fn handle_run(&mut self) {
        self.fled = true;
        self.notice("You attempt to run away...", "");
    }

    fn handle_pass(&mut self, actor: CombatantId) {
        let name = self.name_of(actor);
        self.notice(format!("{name} passes"), "");
    }

    // ========================================================================
    // Spells
    // ========================================================================

    /// Healing spells may target the dead so reviving spells can land.
    pub(super) fn spell_targets(&mut self, actor: CombatantId, spell: &Spell, spec: &TargetSpec) -> Option<Vec<CombatantId>> {
        let require_living = !matches!(spell.effect, SpellEffect::Healing { .. });
        self.targets_for(actor, spell.targeting(), spec, require_living)
    }

    /// Pays for and applies one cast. `free` skips the MP cost without
    /// consuming a pending free spell.
    pub(super) fn cast_spell(&mut self, caster: CombatantId, spell: &Spell, targets: &[CombatantId], free: bool) {
        let c = self.roster.get_mut(caster);
        if c.flags.next_spell_free {
            c.flags.next_spell_free = false;
        } else if !free {
            c.stats.mp_change(-spell.mp_cost());
        }
        let caster_name = c.name.clone();

        let text = match &spell.effect {
            SpellEffect::Elemental { element } => {
                let mut text = format!("{caster_name} cast {} ({})!", spell.name, spell.description);
                for &target in targets {
                    if !self.roster.get(target).is_alive() {
                        continue;
                    }
                    let (intelligence, wisdom, defense_element, t_name) = {
                        let t = self.roster.get(target);
                        (
                            self.roster.get(caster).stats.intelligence,
                            t.stats.wisdom,
                            t.defense_element(),
                            t.name.clone(),
                        )
                    };
                    let base = spell_damage(spell.power(), intelligence, wisdom, self.config.damage_variance, &mut *self.rng);
                    let elemental = calculate_elemental_damage(base, *element, defense_element);
                    let (dealt, defeated) = self.deal_damage(target, elemental.damage);
                    self.wake(target);
                    text.push_str(&format!(
                        " {} {t_name} took {dealt} ({element}) damage from {}",
                        elemental.explanation, spell.name
                    ));
                    if defeated {
                        text.push_str(" and was defeated!");
                    }
                    text.push('\n');
                }
                text.trim_end().to_string()
            }
            SpellEffect::Healing { revives } => {
                let mut text = format!("{caster_name} cast {}!", spell.name);
                for &target in targets {
                    let t = self.roster.get_mut(target);
                    if !t.is_alive() {
                        if *revives {
                            t.revive(1);
                            text.push_str(&format!(" {} was revived with 1 HP.", t.name));
                        } else {
                            text.push_str(&format!(" {} is dead and cannot be healed.", t.name));
                        }
                    } else {
                        let healed = t.hp_change(spell.power());
                        text.push_str(&format!(" {} healed for {healed} HP.", t.name));
                    }
                }
                text
            }
            SpellEffect::Status { effect } | SpellEffect::Buff { effect } => {
                let mut text = format!("{caster_name} cast {}!", spell.name);
                let duration = self.config.status_spell_duration;
                let potency = spell.power() / SPELL_POTENCY_DIVISOR;
                for &target in targets {
                    let t = self.roster.get_mut(target);
                    if !t.is_alive() {
                        continue;
                    }
                    let status = effect.instantiate(duration, potency, &t.stats);
                    let effect_name = status.name.clone();
                    t.add_status_effect(status);
                    text.push_str(&format!(" {} is now affected by {effect_name}.", t.name));
                }
                text
            }
        };
        self.narrate(format!("{} cast!", spell.name), text);
    }

    // ========================================================================
    // Items
    // ========================================================================

    fn apply_item(&mut self, item: &Item, target: CombatantId) -> String {
        let t = self.roster.get_mut(target);
        let label = t.label();
        let prefix = format!("{} used! ", item.name);
        let body = match &item.kind {
            ItemKind::Healing => {
                let healed = t.hp_change(item.heal_amount());
                format!("{label} healed for {healed} HP")
            }
            ItemKind::MpRestore => {
                let restored = t.stats.mp_change(item.mp_restore_amount());
                format!("{label} restored {restored} MP")
            }
            ItemKind::StatusRecovery => {
                let cured = t.remove_effects_named(&Item::CURABLE_EFFECTS);
                if cured.is_empty() {
                    format!("{label} had no relevant status effects to remove")
                } else {
                    format!("Removed {} from {label}", cured.join(", "))
                }
            }
            ItemKind::Offensive => {
                let was_alive = t.is_alive();
                let dealt = -t.hp_change(-item.damage());
                let mut text = format!("{label} took {dealt} damage");
                if was_alive && !t.is_alive() {
                    text.push_str(" and was defeated!");
                }
                text
            }
            ItemKind::Revive => {
                if t.is_alive() {
                    format!("{label} is already alive")
                } else {
                    let hp = (f64::from(t.stats.max_hp) * item.revive_fraction()) as i32;
                    t.revive(hp);
                    format!("{label} revived with {} HP", t.stats.hp)
                }
            }
            ItemKind::SpellBook { spell } => {
                let text = format!("{label} learns the {} ({}) spell", spell.name, spell.description);
                if t.learn_spell(spell.clone()) {
                    return text;
                }
                format!("{label} already knows the {} spell", spell.name)
            }
        };
        format!("{prefix}{body}")
    }
}
