//! SP-costed battle skills and the base classes that unlock them.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::spell::SpellCategory;
use super::targeting::Targeting;
use crate::config::GameConfig;
use crate::error::CatalogError;
use crate::stats::{StatBiases, StatKind};

/// Every skill the resolver knows how to execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum SkillKind {
    Attack,
    /// Named signature attack of a generated enemy.
    #[strum(serialize = "Enemy Special")]
    EnemySpecial,
    Inspect,
    #[strum(serialize = "Big Swing")]
    BigSwing,
    Prayer,
    Steal,
    #[strum(serialize = "Double Cast")]
    DoubleCast,
    #[strum(serialize = "Defensive Shout")]
    DefensiveShout,
    Quickstep,
    #[strum(serialize = "Rallying Cry")]
    RallyingCry,
    #[strum(serialize = "Last Stand")]
    LastStand,
    Stalwart,
    #[strum(serialize = "Unity Stand")]
    UnityStand,
    #[strum(serialize = "Spell Echo")]
    SpellEcho,
    #[strum(serialize = "Spell Mastery")]
    SpellMastery,
    #[strum(serialize = "Group Heal")]
    GroupHeal,
    Purify,
    #[strum(serialize = "Battle Dance")]
    BattleDance,
    Whirlwind,
    #[strum(serialize = "Lucky Strike")]
    LuckyStrike,
    #[strum(serialize = "Fortune's Favor")]
    FortunesFavor,
    Requiem,
}

impl SkillKind {
    /// SP spent when the skill is used.
    pub const fn sp_cost(self) -> i32 {
        match self {
            SkillKind::Attack | SkillKind::EnemySpecial | SkillKind::Requiem => 0,
            SkillKind::Inspect
            | SkillKind::BigSwing
            | SkillKind::Prayer
            | SkillKind::Steal
            | SkillKind::DoubleCast
            | SkillKind::DefensiveShout
            | SkillKind::Quickstep
            | SkillKind::SpellMastery
            | SkillKind::Purify => 1,
            SkillKind::RallyingCry
            | SkillKind::LastStand
            | SkillKind::Stalwart
            | SkillKind::UnityStand
            | SkillKind::SpellEcho
            | SkillKind::GroupHeal
            | SkillKind::BattleDance
            | SkillKind::Whirlwind
            | SkillKind::LuckyStrike
            | SkillKind::FortunesFavor => 2,
        }
    }

    pub const fn targeting(self) -> Targeting {
        match self {
            SkillKind::Prayer | SkillKind::Stalwart | SkillKind::SpellMastery => {
                Targeting::SelfOnly
            }
            SkillKind::Purify | SkillKind::BattleDance => Targeting::Ally,
            SkillKind::Quickstep
            | SkillKind::UnityStand
            | SkillKind::GroupHeal
            | SkillKind::FortunesFavor => Targeting::Allies,
            SkillKind::BigSwing | SkillKind::Whirlwind | SkillKind::Requiem => Targeting::Enemies,
            SkillKind::Attack
            | SkillKind::EnemySpecial
            | SkillKind::Inspect
            | SkillKind::Steal
            | SkillKind::DoubleCast
            | SkillKind::DefensiveShout
            | SkillKind::RallyingCry
            | SkillKind::LastStand
            | SkillKind::SpellEcho
            | SkillKind::LuckyStrike => Targeting::Enemy,
        }
    }

    /// Skills that wrap a spell cast and need a `spell_name` alongside the target.
    pub const fn requires_spell(self) -> bool {
        matches!(self, SkillKind::DoubleCast | SkillKind::SpellEcho)
    }

    pub const fn description(self) -> &'static str {
        match self {
            SkillKind::Attack => "A basic attack dealing physical damage to a single enemy.",
            SkillKind::EnemySpecial => "A special enemy attack.",
            SkillKind::Inspect => "Inspect an enemy and view detailed information.",
            SkillKind::BigSwing => "A powerful attack that hits all enemies at once.",
            SkillKind::Prayer => "Restores HP and MP to the user based on their wisdom.",
            SkillKind::Steal => "Attempts to steal an item from the target. Success scales with luck.",
            SkillKind::DoubleCast => "Cast the same spell twice in succession, paying MP for each cast.",
            SkillKind::DefensiveShout => "Intimidates an enemy while steeling the user's resolve.",
            SkillKind::Quickstep => "A swift dance that hastes every ally.",
            SkillKind::RallyingCry => "Damages one enemy and boosts the party's attack.",
            SkillKind::LastStand => "A desperate attack that hits harder the lower the user's HP.",
            SkillKind::Stalwart => "Grants both a defensive stance and regeneration to self.",
            SkillKind::UnityStand => "Grants a defense bonus to all allies.",
            SkillKind::SpellEcho => "Casts a spell with a 30% chance to repeat it for free.",
            SkillKind::SpellMastery => "The next spell cast costs no MP.",
            SkillKind::GroupHeal => "Heals all allies based on wisdom.",
            SkillKind::Purify => "Removes negative status effects from an ally.",
            SkillKind::BattleDance => "Applies Haste and an attack boost to a single ally.",
            SkillKind::Whirlwind => "Hits random enemies three to five times.",
            SkillKind::LuckyStrike => "A guaranteed critical that might apply a random ailment.",
            SkillKind::FortunesFavor => "Temporarily increases the party's luck.",
            SkillKind::Requiem => "An ultimate attack on all enemies which none can survive.",
        }
    }
}

/// A skill as known by one combatant.
///
/// `name` is what controllers refer to. It equals the kind's display name
/// except for [`SkillKind::EnemySpecial`], which carries the generated
/// attack name.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skill {
    pub kind: SkillKind,
    pub name: String,
}

impl Skill {
    pub fn new(kind: SkillKind) -> Self {
        Self {
            kind,
            name: kind.to_string(),
        }
    }

    pub fn enemy_special(name: impl Into<String>) -> Self {
        Self {
            kind: SkillKind::EnemySpecial,
            name: name.into(),
        }
    }

    pub fn sp_cost(&self) -> i32 {
        self.kind.sp_cost()
    }

    pub fn targeting(&self) -> Targeting {
        self.kind.targeting()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

impl From<SkillKind> for Skill {
    fn from(kind: SkillKind) -> Self {
        Self::new(kind)
    }
}

/// Temperament a player character is built around. Decides skills, spell
/// categories and stat leanings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum BaseClass {
    #[strum(to_string = "Brave (Strength)", serialize = "Brave")]
    Brave,
    #[strum(to_string = "Loyal (Defense)", serialize = "Loyal")]
    Loyal,
    #[strum(to_string = "Clever (Intelligence)", serialize = "Clever")]
    Clever,
    #[strum(to_string = "Kind (Wisdom)", serialize = "Kind")]
    Kind,
    #[strum(to_string = "Energetic (Speed)", serialize = "Energetic")]
    Energetic,
    #[strum(to_string = "Carefree (Luck)", serialize = "Carefree")]
    Carefree,
}

impl BaseClass {
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        raw.trim()
            .parse()
            .map_err(|_| CatalogError::UnknownBaseClass(raw.to_string()))
    }

    pub fn all() -> impl Iterator<Item = BaseClass> {
        BaseClass::iter()
    }

    /// Skill tiers, unlocked at level 1 and the two unlock levels.
    pub const fn skill_tiers(self) -> [SkillKind; 3] {
        match self {
            BaseClass::Brave => [SkillKind::BigSwing, SkillKind::RallyingCry, SkillKind::LastStand],
            BaseClass::Loyal => [
                SkillKind::DefensiveShout,
                SkillKind::Stalwart,
                SkillKind::UnityStand,
            ],
            BaseClass::Clever => [
                SkillKind::DoubleCast,
                SkillKind::SpellEcho,
                SkillKind::SpellMastery,
            ],
            BaseClass::Kind => [SkillKind::Prayer, SkillKind::GroupHeal, SkillKind::Purify],
            BaseClass::Energetic => [
                SkillKind::Quickstep,
                SkillKind::BattleDance,
                SkillKind::Whirlwind,
            ],
            BaseClass::Carefree => [
                SkillKind::Steal,
                SkillKind::LuckyStrike,
                SkillKind::FortunesFavor,
            ],
        }
    }

    /// Class skills available to a character created at `level`.
    pub fn skills_for_level(self, level: u32) -> Vec<SkillKind> {
        let [first, second, third] = self.skill_tiers();
        let [mid, late] = GameConfig::SKILL_UNLOCK_LEVELS;
        let mut skills = vec![first];
        if level >= mid {
            skills.push(second);
        }
        if level >= late {
            skills.push(third);
        }
        skills
    }

    /// Skill gained by reaching exactly `level`, if any.
    pub fn skill_unlocked_at(self, level: u32) -> Option<SkillKind> {
        let [_, second, third] = self.skill_tiers();
        let [mid, late] = GameConfig::SKILL_UNLOCK_LEVELS;
        if level == mid {
            Some(second)
        } else if level == late {
            Some(third)
        } else {
            None
        }
    }

    pub const fn spell_categories(self) -> &'static [SpellCategory] {
        match self {
            BaseClass::Brave => &[SpellCategory::Elemental],
            BaseClass::Loyal => &[SpellCategory::Healing],
            BaseClass::Clever => &[SpellCategory::Elemental, SpellCategory::Status],
            BaseClass::Kind => &[SpellCategory::Healing, SpellCategory::Buff],
            BaseClass::Energetic => &[SpellCategory::Status],
            BaseClass::Carefree => &[SpellCategory::Buff],
        }
    }

    pub const fn primary_stat(self) -> StatKind {
        match self {
            BaseClass::Brave => StatKind::Attack,
            BaseClass::Loyal => StatKind::Defense,
            BaseClass::Clever => StatKind::Intelligence,
            BaseClass::Kind => StatKind::Wisdom,
            BaseClass::Energetic => StatKind::Speed,
            BaseClass::Carefree => StatKind::Luck,
        }
    }

    /// Growth biases when no job-specific biases were generated.
    pub fn default_biases(self) -> StatBiases {
        StatBiases::neutral().with(self.primary_stat(), GameConfig::MAX_STAT_BIAS)
    }
}
