//! Battle actions as closed variants.
//!
//! Controllers produce a [`BattleAction`]; the resolver consumes it. Raw
//! proposals from an oracle are validated into this shape at the runtime
//! boundary and never reach the resolver unchecked.

use strum::{Display, EnumIter, EnumString};

/// Who an action is aimed at, before resolution against the roster.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetSpec {
    /// A combatant by exact name.
    Name(String),
    /// A uniformly sampled living enemy of the actor.
    RandomEnemy,
    /// Several combatants by name.
    Names(Vec<String>),
    /// Position in the ally-then-enemy roster.
    Index(usize),
}

impl TargetSpec {
    pub const RANDOM_ENEMY: &'static str = "random_enemy";

    /// Parses the textual form used by controllers: `random_enemy` or a name.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(Self::RANDOM_ENEMY) {
            TargetSpec::RandomEnemy
        } else {
            TargetSpec::Name(trimmed.to_string())
        }
    }

    /// Text used in "invalid target" narration.
    pub fn describe(&self) -> String {
        match self {
            TargetSpec::Name(name) => name.clone(),
            TargetSpec::RandomEnemy => Self::RANDOM_ENEMY.to_string(),
            TargetSpec::Names(names) => names.join(", "),
            TargetSpec::Index(index) => format!("#{index}"),
        }
    }
}

/// Action type names accepted from controllers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionType {
    Attack,
    Skill,
    Spell,
    Item,
    Defend,
    Run,
    Pass,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleAction {
    Attack {
        target: TargetSpec,
    },
    Skill {
        skill_name: String,
        target: TargetSpec,
        /// Spell wrapped by Double Cast and Spell Echo.
        spell_name: Option<String>,
    },
    Spell {
        spell_name: String,
        target: TargetSpec,
    },
    Item {
        item_name: String,
        target: TargetSpec,
    },
    Defend,
    Run,
    Pass,
    /// Anything else a controller produced. Logged, no effect.
    Unknown {
        action_type: String,
    },
}

impl BattleAction {
    pub fn attack_random() -> Self {
        BattleAction::Attack {
            target: TargetSpec::RandomEnemy,
        }
    }

    pub fn action_type(&self) -> Option<ActionType> {
        match self {
            BattleAction::Attack { .. } => Some(ActionType::Attack),
            BattleAction::Skill { .. } => Some(ActionType::Skill),
            BattleAction::Spell { .. } => Some(ActionType::Spell),
            BattleAction::Item { .. } => Some(ActionType::Item),
            BattleAction::Defend => Some(ActionType::Defend),
            BattleAction::Run => Some(ActionType::Run),
            BattleAction::Pass => Some(ActionType::Pass),
            BattleAction::Unknown { .. } => None,
        }
    }

    /// Short human-readable summary, fed back to AI controllers as their
    /// previous action.
    pub fn summary(&self) -> String {
        match self {
            BattleAction::Attack { target } => format!("attack {}", target.describe()),
            BattleAction::Skill {
                skill_name,
                target,
                spell_name: Some(spell),
            } => format!("skill {skill_name} ({spell}) on {}", target.describe()),
            BattleAction::Skill {
                skill_name, target, ..
            } => format!("skill {skill_name} on {}", target.describe()),
            BattleAction::Spell { spell_name, target } => {
                format!("spell {spell_name} on {}", target.describe())
            }
            BattleAction::Item { item_name, target } => {
                format!("item {item_name} on {}", target.describe())
            }
            BattleAction::Defend => "defend".to_string(),
            BattleAction::Run => "run".to_string(),
            BattleAction::Pass => "pass".to_string(),
            BattleAction::Unknown { action_type } => format!("unknown ({action_type})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_parse_recognises_random_enemy() {
        assert_eq!(TargetSpec::parse(" Random_Enemy "), TargetSpec::RandomEnemy);
        assert_eq!(TargetSpec::parse("Goblin (A)"), TargetSpec::Name("Goblin (A)".into()));
    }

    #[test]
    fn action_type_names() {
        assert_eq!("SPELL".parse::<ActionType>().unwrap(), ActionType::Spell);
        assert!("dance".parse::<ActionType>().is_err());
        assert_eq!(BattleAction::Defend.action_type(), Some(ActionType::Defend));
    }
}
