//! MP-costed spells.
//!
//! Cost and power derive from the tier: `cost = 30 × tier`, `power = 50 × tier`.
//! Tier 3 and above hit a whole side.

use strum::{Display, EnumIter, EnumString};

use super::targeting::Targeting;
use crate::element::Element;
use crate::status::EffectTemplate;

/// Spell families. Base classes draw their starter spells from these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SpellCategory {
    Elemental,
    Healing,
    Status,
    Buff,
}

impl SpellCategory {
    pub const fn is_offensive(self) -> bool {
        matches!(self, SpellCategory::Elemental | SpellCategory::Status)
    }
}

/// What a spell does when it lands.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellEffect {
    /// Damage scaled by caster intelligence over target wisdom.
    Elemental { element: Element },
    /// Flat healing. Reviving spells bring the dead back at 1 HP.
    Healing {
        #[cfg_attr(feature = "serde", serde(default))]
        revives: bool,
    },
    /// Detrimental effect on the target.
    Status { effect: EffectTemplate },
    /// Beneficial effect on the target.
    Buff { effect: EffectTemplate },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spell {
    pub name: String,
    pub description: String,
    pub tier: u32,
    pub effect: SpellEffect,
}

impl Spell {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        tier: u32,
        effect: SpellEffect,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tier: tier.max(1),
            effect,
        }
    }

    pub fn category(&self) -> SpellCategory {
        match self.effect {
            SpellEffect::Elemental { .. } => SpellCategory::Elemental,
            SpellEffect::Healing { .. } => SpellCategory::Healing,
            SpellEffect::Status { .. } => SpellCategory::Status,
            SpellEffect::Buff { .. } => SpellCategory::Buff,
        }
    }

    pub fn mp_cost(&self) -> i32 {
        30 * self.tier as i32
    }

    /// Base damage for elemental spells, heal amount for healing spells,
    /// potency for status and buff spells.
    pub fn power(&self) -> i32 {
        50 * self.tier as i32
    }

    pub fn targeting(&self) -> Targeting {
        let offensive = self.category().is_offensive();
        match (self.tier > 2, offensive) {
            (true, true) => Targeting::Enemies,
            (true, false) => Targeting::Allies,
            (false, true) => Targeting::Enemy,
            (false, false) => Targeting::Ally,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_power_and_targeting_follow_tier() {
        let bolt = Spell::new("Bolt", "", 1, SpellEffect::Elemental { element: Element::Thunder });
        assert_eq!(bolt.mp_cost(), 30);
        assert_eq!(bolt.power(), 50);
        assert_eq!(bolt.targeting(), Targeting::Enemy);

        let storm = Spell::new("Storm", "", 3, SpellEffect::Elemental { element: Element::Thunder });
        assert_eq!(storm.mp_cost(), 90);
        assert_eq!(storm.targeting(), Targeting::Enemies);

        let mend = Spell::new("Mend", "", 2, SpellEffect::Healing { revives: false });
        assert_eq!(mend.targeting(), Targeting::Ally);
        let chorus = Spell::new("Chorus", "", 4, SpellEffect::Healing { revives: true });
        assert_eq!(chorus.targeting(), Targeting::Allies);
    }

    #[test]
    fn category_names_parse() {
        assert_eq!("status".parse::<SpellCategory>().unwrap(), SpellCategory::Status);
        assert_eq!(SpellCategory::Buff.to_string(), "buff");
    }
}
