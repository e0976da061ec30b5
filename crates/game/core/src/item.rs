//! Consumable and key items.
//!
//! Consumables are owned by a party inventory and move by value: using one
//! removes it, stealing one moves it from enemy loot into the thief's
//! temporary inventory. The resolver decides what a used item does.

use crate::ability::{Spell, Targeting};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    /// Restores `50 × tier` HP.
    Healing,
    /// Restores `25 × tier` MP.
    MpRestore,
    /// Cures Poison, Sleep and Silence.
    StatusRecovery,
    /// Deals `50 × tier` damage.
    Offensive,
    /// Revives a fallen ally with 25/50/75/100% HP by tier.
    Revive,
    /// Teaches its spell.
    SpellBook { spell: Spell },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub name: String,
    pub description: String,
    pub tier: u32,
    pub kind: ItemKind,
}

impl Item {
    /// Effects cured by [`ItemKind::StatusRecovery`].
    pub const CURABLE_EFFECTS: [&'static str; 3] = ["Poison", "Sleep", "Silence"];

    pub fn new(name: impl Into<String>, description: impl Into<String>, tier: u32, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tier: tier.max(1),
            kind,
        }
    }

    /// Builds the spellbook that teaches `spell`.
    pub fn spellbook(spell: Spell) -> Self {
        let name = format!("Spellbook ({})", spell.name);
        let description = format!(
            "A spellbook containing instructions on how to cast the {} spell.",
            spell.name
        );
        let tier = spell.tier;
        Self::new(name, description, tier, ItemKind::SpellBook { spell })
    }

    pub fn targeting(&self) -> Targeting {
        match self.kind {
            ItemKind::Offensive => Targeting::Enemy,
            _ => Targeting::Ally,
        }
    }

    pub fn heal_amount(&self) -> i32 {
        50 * self.tier as i32
    }

    pub fn mp_restore_amount(&self) -> i32 {
        25 * self.tier as i32
    }

    pub fn damage(&self) -> i32 {
        50 * self.tier as i32
    }

    /// Fraction of max HP restored by a revive item.
    pub fn revive_fraction(&self) -> f64 {
        match self.tier {
            1 => 0.25,
            2 => 0.5,
            3 => 0.75,
            _ => 1.0,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// Story item with no battle use.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyItem {
    pub name: String,
    pub description: String,
}

impl KeyItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::SpellEffect;
    use crate::element::Element;

    #[test]
    fn tier_scales_amounts() {
        let potion = Item::new("Potion", "", 2, ItemKind::Healing);
        assert_eq!(potion.heal_amount(), 100);
        assert_eq!(potion.mp_restore_amount(), 50);
        assert_eq!(potion.targeting(), Targeting::Ally);

        let bomb = Item::new("Bomb", "", 3, ItemKind::Offensive);
        assert_eq!(bomb.damage(), 150);
        assert_eq!(bomb.targeting(), Targeting::Enemy);
    }

    #[test]
    fn revive_fraction_by_tier() {
        let fractions: Vec<f64> = (1..=5)
            .map(|tier| Item::new("Feather", "", tier, ItemKind::Revive).revive_fraction())
            .collect();
        assert_eq!(fractions, vec![0.25, 0.5, 0.75, 1.0, 1.0]);
    }

    #[test]
    fn spellbook_is_named_after_its_spell() {
        let spell = Spell::new("Ember", "A small flame.", 1, SpellEffect::Elemental { element: Element::Fire });
        let book = Item::spellbook(spell);
        assert_eq!(book.name, "Spellbook (Ember)");
        assert!(book.matches("spellbook (ember)"));
    }
}
