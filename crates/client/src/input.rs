//! Turns typed commands into battle actions and dialogue picks.
use async_trait::async_trait;
use tracing::{debug, warn};

use game_core::ability::Targeting;
use game_core::battle::AbilityOption;
use game_core::{BattleAction, DecisionContext, TargetSpec};
use runtime::{ChoiceRequest, PlayerHandle, ResponseChooser, RuntimeError};

use crate::console::Console;
use crate::presentation;

pub const BATTLE_HELP: &str = "\
commands:
  attack [@ target]            a [@ target]
  spell <name> [@ target]      s <name> [@ target]
  skill <name> [+ spell] [@ target]
  item <name> [@ target]       i <name> [@ target]
  defend | run | pass          d | r | p
targets are combatant names; omit to let the ability pick";

/// Why a typed command was not understood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Help,
    MissingName(&'static str),
    Unknown(String),
}

/// Parses one command line against the actor's options.
///
/// Names are matched case-insensitively and rewritten to their exact
/// spelling. Anything the runtime would reject (unknown spell, empty item
/// slot) is passed through so the rejection comes back with a reason.
pub fn parse_command(line: &str, context: &DecisionContext) -> Result<BattleAction, ParseError> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let (body, target) = match rest.split_once('@') {
        Some((body, target)) => (body.trim(), Some(target.trim())),
        None => (rest.trim(), None),
    };

    let action = match head.to_lowercase().as_str() {
        "" => return Err(ParseError::Empty),
        "?" | "h" | "help" => return Err(ParseError::Help),
        "a" | "attack" => BattleAction::Attack {
            target: resolve_target(target.or(Some(body)), Targeting::Enemy, context),
        },
        "s" | "spell" => {
            let spell = require(body, "spell")?;
            let option = find_option(&context.available.spells, spell);
            BattleAction::Spell {
                spell_name: option.map_or_else(|| spell.to_string(), |o| o.name.clone()),
                target: resolve_target(target, option.map_or_else(Targeting::default, |o| o.targeting), context),
            }
        }
        "k" | "skill" => {
            let (skill, spell) = match body.split_once('+') {
                Some((skill, spell)) => (skill.trim(), Some(spell.trim())),
                None => (body, None),
            };
            let skill = require(skill, "skill")?;
            let option = find_option(&context.available.skills, skill);
            let spell_option = spell.and_then(|s| find_option(&context.available.spells, s));
            let targeting = spell_option
                .or(option)
                .map_or_else(Targeting::default, |o| o.targeting);
            BattleAction::Skill {
                skill_name: option.map_or_else(|| skill.to_string(), |o| o.name.clone()),
                target: resolve_target(target, targeting, context),
                spell_name: spell.map(|s| spell_option.map_or_else(|| s.to_string(), |o| o.name.clone())),
            }
        }
        "i" | "item" => {
            let item = require(body, "item")?;
            let option = context
                .available
                .items
                .iter()
                .find(|i| i.name.eq_ignore_ascii_case(item));
            BattleAction::Item {
                item_name: option.map_or_else(|| item.to_string(), |o| o.name.clone()),
                target: resolve_target(target, option.map_or(Targeting::Ally, |o| o.targeting), context),
            }
        }
        "d" | "defend" => BattleAction::Defend,
        "r" | "run" => BattleAction::Run,
        "p" | "pass" => BattleAction::Pass,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(action)
}

fn require<'a>(name: &'a str, what: &'static str) -> Result<&'a str, ParseError> {
    if name.is_empty() {
        Err(ParseError::MissingName(what))
    } else {
        Ok(name)
    }
}

fn find_option<'a>(options: &'a [AbilityOption], name: &str) -> Option<&'a AbilityOption> {
    options.iter().find(|o| o.name.eq_ignore_ascii_case(name))
}

/// An explicit name wins. Without one, enemy abilities pick a random enemy
/// and everything else lands on the actor.
fn resolve_target(explicit: Option<&str>, targeting: Targeting, context: &DecisionContext) -> TargetSpec {
    match explicit.filter(|name| !name.is_empty()) {
        Some(name) => {
            let canonical = context
                .allies
                .iter()
                .chain(context.enemies.iter())
                .find(|c| c.name.eq_ignore_ascii_case(name))
                .map_or_else(|| name.to_string(), |c| c.name.clone());
            TargetSpec::Name(canonical)
        }
        None => match targeting {
            Targeting::Enemy | Targeting::Enemies => TargetSpec::RandomEnemy,
            Targeting::SelfOnly | Targeting::Ally | Targeting::Allies => TargetSpec::Name(context.actor.name.clone()),
        },
    }
}

// ============================================================================
// Battle Menu
// ============================================================================

/// Answers [`ChoiceRequest`]s from the terminal until the runtime hangs up
/// or input ends.
pub async fn drive_player(mut handle: PlayerHandle, console: Console) -> anyhow::Result<()> {
    let mut pending: Option<DecisionContext> = None;
    while let Some(request) = handle.requests.recv().await {
        match request {
            ChoiceRequest::Decide(context) => {
                println!("{}", presentation::decision_menu(&context));
                pending = Some(*context);
            }
            ChoiceRequest::Rejected { actor, reason } => {
                println!("  {actor} can't do that: {reason}");
            }
        }

        let Some(context) = pending.as_ref() else {
            warn!("rejection without a pending decision");
            continue;
        };
        let Some(action) = read_action(&console, context).await? else {
            debug!("input closed, player controller stops");
            return Ok(());
        };
        if handle.selections.send(action).await.is_err() {
            return Ok(());
        }
    }
    Ok(())
}

async fn read_action(console: &Console, context: &DecisionContext) -> anyhow::Result<Option<BattleAction>> {
    loop {
        let Some(line) = console.ask(&format!("{}> ", context.actor.name)).await? else {
            return Ok(None);
        };
        match parse_command(&line, context) {
            Ok(action) => return Ok(Some(action)),
            Err(ParseError::Empty) => {}
            Err(ParseError::Help) => println!("{BATTLE_HELP}"),
            Err(ParseError::MissingName(what)) => println!("  which {what}?"),
            Err(ParseError::Unknown(word)) => println!("  unknown command '{word}', type ? for help"),
        }
    }
}

// ============================================================================
// Dialogue
// ============================================================================

/// Lets the player pick dialogue responses by number.
pub struct ConsoleChooser {
    console: Console,
}

impl ConsoleChooser {
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

#[async_trait]
impl ResponseChooser for ConsoleChooser {
    async fn choose(&mut self, prompt: &str, options: &[String]) -> runtime::Result<usize> {
        if options.is_empty() {
            return Ok(0);
        }
        println!("{prompt}");
        for (index, option) in options.iter().enumerate() {
            println!("  {}. {option}", index + 1);
        }
        loop {
            let line = self
                .console
                .ask("choose> ")
                .await
                .map_err(|_| RuntimeError::ChannelClosed("console"))?
                .ok_or(RuntimeError::ChannelClosed("console"))?;
            match line.parse::<usize>() {
                Ok(pick) if (1..=options.len()).contains(&pick) => return Ok(pick - 1),
                _ => println!("  enter a number from 1 to {}", options.len()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::Element;
    use game_core::battle::{AvailableActions, CombatantId, CombatantView, ItemOption};

    fn view(name: &str) -> CombatantView {
        CombatantView {
            name: name.to_string(),
            job_class: "Knight".to_string(),
            level: 1,
            hp: 10,
            max_hp: 10,
            mp: 10,
            max_mp: 10,
            sp: 3,
            max_sp: 3,
            alive: true,
            element: Element::None,
            status_effects: Vec::new(),
        }
    }

    fn ability(name: &str, targeting: Targeting, requires_spell: bool) -> AbilityOption {
        AbilityOption {
            name: name.to_string(),
            description: String::new(),
            cost: 1,
            targeting,
            requires_spell,
        }
    }

    fn context() -> DecisionContext {
        DecisionContext {
            actor_id: CombatantId::ally(0),
            actor: view("Aria"),
            is_player: true,
            allies: vec![view("Aria"), view("Corwin")],
            enemies: vec![view("Bog Slime")],
            available: AvailableActions {
                skills: vec![ability("Double Cast", Targeting::Enemy, true)],
                spells: vec![
                    ability("Fire", Targeting::Enemy, false),
                    ability("Cure", Targeting::Ally, false),
                ],
                items: vec![ItemOption {
                    name: "Potion".to_string(),
                    description: String::new(),
                    count: 2,
                    targeting: Targeting::Ally,
                }],
            },
            turn_order: Vec::new(),
        }
    }

    #[test]
    fn attack_resolves_target_spelling() {
        let ctx = context();
        assert_eq!(
            parse_command("a bog slime", &ctx),
            Ok(BattleAction::Attack {
                target: TargetSpec::Name("Bog Slime".to_string())
            })
        );
        assert_eq!(parse_command("attack", &ctx), Ok(BattleAction::attack_random()));
    }

    #[test]
    fn omitted_targets_follow_ability_targeting() {
        let ctx = context();
        assert_eq!(
            parse_command("spell fire", &ctx),
            Ok(BattleAction::Spell {
                spell_name: "Fire".to_string(),
                target: TargetSpec::RandomEnemy,
            })
        );
        assert_eq!(
            parse_command("s cure", &ctx),
            Ok(BattleAction::Spell {
                spell_name: "Cure".to_string(),
                target: TargetSpec::Name("Aria".to_string()),
            })
        );
        assert_eq!(
            parse_command("item potion @ corwin", &ctx),
            Ok(BattleAction::Item {
                item_name: "Potion".to_string(),
                target: TargetSpec::Name("Corwin".to_string()),
            })
        );
    }

    #[test]
    fn skill_carries_wrapped_spell() {
        assert_eq!(
            parse_command("skill double cast + fire @ Bog Slime", &context()),
            Ok(BattleAction::Skill {
                skill_name: "Double Cast".to_string(),
                target: TargetSpec::Name("Bog Slime".to_string()),
                spell_name: Some("Fire".to_string()),
            })
        );
    }

    #[test]
    fn unknown_names_pass_through_for_the_runtime_to_reject() {
        assert_eq!(
            parse_command("spell Inferno", &context()),
            Ok(BattleAction::Spell {
                spell_name: "Inferno".to_string(),
                target: TargetSpec::RandomEnemy,
            })
        );
    }

    #[test]
    fn malformed_lines() {
        let ctx = context();
        assert_eq!(parse_command("   ", &ctx), Err(ParseError::Empty));
        assert_eq!(parse_command("?", &ctx), Err(ParseError::Help));
        assert_eq!(parse_command("spell", &ctx), Err(ParseError::MissingName("spell")));
        assert_eq!(parse_command("dance", &ctx), Err(ParseError::Unknown("dance".to_string())));
        assert_eq!(parse_command("RUN", &ctx), Ok(BattleAction::Run));
    }
}
