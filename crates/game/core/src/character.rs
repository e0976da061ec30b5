//! Combatants: player characters and enemies.
//!
//! A [`Combatant`] is owned by the party that contains it. Battles borrow
//! combatants mutably for their duration and hand them back on a terminal
//! outcome.

use strum::IntoEnumIterator;
use tracing::debug;

use crate::ability::{BaseClass, Skill, SkillKind, Spell};
use crate::config::GameConfig;
use crate::element::Element;
use crate::equipment::{Equipment, EquipmentSlot, Loadout};
use crate::item::Item;
use crate::stats::{StatBiases, StatBlock, StatKind, generate_stats, xp_for_level};
use crate::status::{StatusEffect, StatusEffects, TickReport};

/// Behaviour switches toggled by status effects and skills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleFlags {
    pub can_act: bool,
    pub can_cast_spells: bool,
    /// Set by Spell Mastery; the next cast costs no MP.
    pub next_spell_free: bool,
}

impl Default for BattleFlags {
    fn default() -> Self {
        Self {
            can_act: true,
            can_cast_spells: true,
            next_spell_free: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnemyKind {
    Regular,
    Boss,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerData {
    pub base_class: BaseClass,
    pub experience: u64,
    pub exp_goal: u64,
    /// Items stolen during the current battle; merged into the party
    /// inventory on victory.
    pub temp_inventory: Vec<Item>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyData {
    pub kind: EnemyKind,
    pub currency: u64,
    pub experience: u64,
    pub loot: Vec<Item>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Player(PlayerData),
    Enemy(EnemyData),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub name: String,
    pub description: String,
    pub job_class: String,
    pub level: u32,
    pub stats: StatBlock,
    pub status: StatusEffects,
    pub equipment: Loadout,
    pub element: Element,
    pub flags: BattleFlags,
    pub skills: Vec<Skill>,
    pub spells: Vec<Spell>,
    pub biases: StatBiases,
    pub role: Role,
}

impl Combatant {
    /// Creates a player character with base-class skills for `level`.
    ///
    /// Every player knows Inspect. Requiem is granted in cheat mode.
    pub fn player(
        name: impl Into<String>,
        job_class: impl Into<String>,
        base_class: BaseClass,
        level: u32,
        config: &GameConfig,
    ) -> Self {
        let level = level.max(1);
        let biases = base_class.default_biases();
        let mut skills = vec![Skill::new(SkillKind::Inspect)];
        if config.cheat_mode {
            skills.push(Skill::new(SkillKind::Requiem));
        }
        skills.extend(base_class.skills_for_level(level).into_iter().map(Skill::new));

        Self {
            name: name.into(),
            description: String::new(),
            job_class: job_class.into(),
            level,
            stats: generate_stats(&biases, level).with_max_sp(config.max_sp),
            status: StatusEffects::new(),
            equipment: Loadout::default(),
            element: Element::None,
            flags: BattleFlags::default(),
            skills,
            spells: Vec::new(),
            biases,
            role: Role::Player(PlayerData {
                base_class,
                experience: 0,
                exp_goal: xp_for_level(level + 1),
                temp_inventory: Vec::new(),
            }),
        }
    }

    /// Creates an enemy with explicit stats. Reward rolls happen in the
    /// runtime's enemy factory.
    pub fn enemy(
        name: impl Into<String>,
        job_class: impl Into<String>,
        level: u32,
        stats: StatBlock,
        kind: EnemyKind,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            job_class: job_class.into(),
            level: level.max(1),
            stats,
            status: StatusEffects::new(),
            equipment: Loadout::default(),
            element: Element::None,
            flags: BattleFlags::default(),
            skills: Vec::new(),
            spells: Vec::new(),
            biases: StatBiases::neutral(),
            role: Role::Enemy(EnemyData {
                kind,
                currency: 0,
                experience: 0,
                loot: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    #[must_use]
    pub fn with_spells(mut self, spells: Vec<Spell>) -> Self {
        self.spells = spells;
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    /// Replaces the growth biases and regenerates stats for the current level.
    #[must_use]
    pub fn with_biases(mut self, biases: StatBiases) -> Self {
        self.biases = biases;
        let max_sp = self.stats.max_sp;
        self.stats = generate_stats(&biases, self.level).with_max_sp(max_sp);
        self.stats.apply_delta(&self.equipment.total_modifiers());
        self
    }

    /// "Name (Job)" as used in narration.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.job_class)
    }

    pub fn is_alive(&self) -> bool {
        self.stats.alive
    }

    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player(_))
    }

    pub fn player_data(&self) -> Option<&PlayerData> {
        match &self.role {
            Role::Player(data) => Some(data),
            Role::Enemy(_) => None,
        }
    }

    pub fn player_data_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.role {
            Role::Player(data) => Some(data),
            Role::Enemy(_) => None,
        }
    }

    pub fn enemy_data(&self) -> Option<&EnemyData> {
        match &self.role {
            Role::Enemy(data) => Some(data),
            Role::Player(_) => None,
        }
    }

    pub fn enemy_data_mut(&mut self) -> Option<&mut EnemyData> {
        match &mut self.role {
            Role::Enemy(data) => Some(data),
            Role::Player(_) => None,
        }
    }

    // ========================================================================
    // Vital changes
    // ========================================================================

    /// Applies an HP change and returns the true delta. A lethal change
    /// clears every status effect.
    pub fn hp_change(&mut self, delta: i32) -> i32 {
        let was_alive = self.stats.alive;
        let applied = self.stats.hp_change(delta);
        if was_alive && !self.stats.alive {
            self.on_death();
        }
        applied
    }

    fn on_death(&mut self) {
        debug!(target: "game_core::character", name = %self.name, "combatant died");
        self.status.clear(&mut self.stats, &mut self.flags);
    }

    pub fn revive(&mut self, hp: i32) {
        self.stats.revive(hp);
    }

    /// Zeroes SP and drops a pending free spell. Runs at battle start and end.
    pub fn reset_sp(&mut self) {
        self.stats.reset_sp();
        self.flags.next_spell_free = false;
    }

    // ========================================================================
    // Status effects
    // ========================================================================

    /// Returns true if the effect is new, false if an existing one was refreshed.
    pub fn add_status_effect(&mut self, effect: StatusEffect) -> bool {
        self.status.add(effect, &mut self.stats, &mut self.flags)
    }

    pub fn remove_status_effect(&mut self, name: &str) -> bool {
        self.status
            .remove(name, &mut self.stats, &mut self.flags)
            .is_some()
    }

    pub fn remove_detrimental_effects(&mut self) -> Vec<String> {
        self.status
            .remove_where(|e| e.detrimental, &mut self.stats, &mut self.flags)
    }

    pub fn remove_effects_named(&mut self, names: &[&str]) -> Vec<String> {
        self.status.remove_where(
            |e| names.contains(&e.name.as_str()),
            &mut self.stats,
            &mut self.flags,
        )
    }

    /// Runs one owner turn of every effect.
    pub fn tick_status_effects(&mut self) -> Vec<TickReport> {
        self.status.tick(&mut self.stats, &mut self.flags)
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    pub fn find_skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.matches(name))
    }

    pub fn find_spell(&self, name: &str) -> Option<&Spell> {
        self.spells.iter().find(|s| s.matches(name))
    }

    /// Adds a spell unless one with the same name is known. Returns true if learned.
    pub fn learn_spell(&mut self, spell: Spell) -> bool {
        if self.find_spell(&spell.name).is_some() {
            return false;
        }
        self.spells.push(spell);
        true
    }

    /// Spells the combatant can currently pay for.
    pub fn affordable_spells(&self) -> impl Iterator<Item = &Spell> {
        let free = self.flags.next_spell_free;
        self.spells
            .iter()
            .filter(move |spell| free || self.stats.mp >= spell.mp_cost())
    }

    // ========================================================================
    // Equipment
    // ========================================================================

    /// Element used when attacking: the weapon's unless it has none.
    pub fn attack_element(&self) -> Element {
        match self.equipment.get(EquipmentSlot::Weapon) {
            Some(weapon) if !weapon.element.is_none() => weapon.element,
            _ => self.element,
        }
    }

    /// Element used when defending: the armor's unless it has none.
    pub fn defense_element(&self) -> Element {
        match self.equipment.get(EquipmentSlot::Armor) {
            Some(armor) if !armor.element.is_none() => armor.element,
            _ => self.element,
        }
    }

    /// Equips `piece`, returning the piece it replaced.
    pub fn equip(&mut self, piece: Equipment) -> Option<Equipment> {
        let previous = self.unequip(piece.slot);
        self.stats.apply_delta(&piece.modifiers);
        self.equipment.replace(piece);
        previous
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<Equipment> {
        let piece = self.equipment.take(slot)?;
        self.stats.apply_delta(&piece.modifiers.negated());
        Some(piece)
    }

    // ========================================================================
    // Experience
    // ========================================================================

    /// Adds experience, levelling up as many times as it covers. Returns
    /// one narration per level gained. Enemies ignore experience.
    pub fn gain_xp(&mut self, amount: u64) -> Vec<String> {
        let mut narrations = Vec::new();
        let Some(data) = self.player_data_mut() else {
            return narrations;
        };
        data.experience += amount;

        loop {
            let Some(data) = self.player_data() else { break };
            if data.experience < data.exp_goal {
                break;
            }
            let remainder = data.experience - data.exp_goal;
            narrations.push(self.level_up());
            if let Some(data) = self.player_data_mut() {
                data.experience = remainder;
            }
        }
        narrations
    }

    /// Raises the level by one, regenerates stats from the biases, refills
    /// HP and MP and unlocks class skills. Returns the narration.
    pub fn level_up(&mut self) -> String {
        self.level += 1;
        let old = self.stats.clone();

        let mut stats = generate_stats(&self.biases, self.level).with_max_sp(old.max_sp);
        stats.sp = old.sp;
        stats.apply_delta(&self.equipment.total_modifiers());
        stats.restore_full();
        self.stats = stats;

        let changes: Vec<String> = StatKind::iter()
            .filter_map(|kind| {
                let (before, after) = (old.get(kind), self.stats.get(kind));
                (after > before).then(|| {
                    format!("{}: {before} → {after} (+{})", kind.label(), after - before)
                })
            })
            .collect();

        let level = self.level;
        let mut unlocked = None;
        if let Some(data) = self.player_data_mut() {
            data.exp_goal = xp_for_level(level + 1);
            unlocked = data.base_class.skill_unlocked_at(level);
        }
        if let Some(kind) = unlocked {
            if !self.skills.iter().any(|s| s.kind == kind) {
                self.skills.push(Skill::new(kind));
            }
        }

        format!(
            "Level up! {} is now level {}!\n\nStat Changes:\n{}",
            self.label(),
            self.level,
            changes.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatDelta;

    fn hero() -> Combatant {
        Combatant::player("Aria", "Knight", BaseClass::Brave, 1, &GameConfig::default())
    }

    #[test]
    fn player_starts_with_class_skills() {
        let aria = hero();
        let names: Vec<&str> = aria.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Inspect", "Big Swing"]);
        assert_eq!(aria.player_data().map(|d| d.exp_goal), Some(282));

        let cheat = Combatant::player("Aria", "Knight", BaseClass::Brave, 1, &GameConfig::default().with_cheat_mode(true));
        assert!(cheat.find_skill("Requiem").is_some());
    }

    #[test]
    fn death_clears_status_effects() {
        let mut aria = hero();
        aria.add_status_effect(StatusEffect::defend(3, 10));
        let defense = aria.stats.defense;
        aria.hp_change(-10_000);
        assert!(!aria.is_alive());
        assert!(aria.status.is_empty());
        assert_eq!(aria.stats.defense, defense - 10);
    }

    #[test]
    fn weapon_element_overrides_innate() {
        let mut aria = hero().with_element(Element::Earth);
        assert_eq!(aria.attack_element(), Element::Earth);

        let blade = Equipment::new("Flame Blade", "", EquipmentSlot::Weapon, StatDelta::single(StatKind::Attack, 4), Element::Fire);
        let attack = aria.stats.attack;
        aria.equip(blade);
        assert_eq!(aria.attack_element(), Element::Fire);
        assert_eq!(aria.defense_element(), Element::Earth);
        assert_eq!(aria.stats.attack, attack + 4);

        aria.unequip(EquipmentSlot::Weapon);
        assert_eq!(aria.stats.attack, attack);
    }

    #[test]
    fn gain_xp_carries_remainder_across_levels() {
        let mut aria = hero();
        // 282 to reach level 2, then 519 more for level 3.
        let narrations = aria.gain_xp(282 + 519 + 10);
        assert_eq!(aria.level, 3);
        assert_eq!(narrations.len(), 2);
        let data = aria.player_data().unwrap();
        assert_eq!(data.experience, 10);
        assert_eq!(data.exp_goal, xp_for_level(4));
        assert!(narrations[0].starts_with("Level up! Aria (Knight) is now level 2!"));
        assert!(narrations[0].contains("Attack: "));
        assert_eq!(aria.stats.hp, aria.stats.max_hp);
    }

    #[test]
    fn level_twenty_unlocks_second_skill() {
        let mut aria = Combatant::player("Aria", "Knight", BaseClass::Brave, 19, &GameConfig::default());
        assert!(aria.find_skill("Rallying Cry").is_none());
        aria.level_up();
        assert!(aria.find_skill("Rallying Cry").is_some());
    }
}
