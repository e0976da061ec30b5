//! Turns raw oracle payloads into core types.
//!
//! Each function here is total: bad input degrades to a documented default
//! and is logged at `warn`, never returned as an error.
use tracing::warn;

use game_core::battle::{ActionType, BattleAction, DecisionContext, TargetSpec};
use game_core::{DialogueOutcome, EventDraft, NpcKind, Trigger, TriggerType};

use super::payload::{RawBattleCommand, RawCutscene, RawDialogueTree, RawSubChapterEvents};

/// Events a sub-chapter request normally yields.
pub const EVENTS_PER_SUB_CHAPTER: usize = 2;

/// Action types an AI controller may choose.
const AI_ACTION_TYPES: [ActionType; 5] = [
    ActionType::Attack,
    ActionType::Skill,
    ActionType::Spell,
    ActionType::Item,
    ActionType::Defend,
];

// ============================================================================
// Battle Commands
// ============================================================================

/// Why a command was not used as proposed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandFallback {
    UnknownActionType(String),
    MissingField(&'static str),
    UnknownTarget(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedCommand {
    pub action: BattleAction,
    pub fallback: Option<CommandFallback>,
    pub explanation: Option<String>,
}

impl ValidatedCommand {
    fn fallback(reason: CommandFallback, explanation: Option<String>) -> Self {
        Self {
            action: BattleAction::attack_random(),
            fallback: Some(reason),
            explanation,
        }
    }
}

/// Validates an AI proposal against the decision context.
///
/// - unknown action type: attack a random enemy
/// - skill, spell or item without its name: attack a random enemy
/// - target not in the battle: a random living enemy
pub fn battle_command(raw: RawBattleCommand, context: &DecisionContext) -> ValidatedCommand {
    let RawBattleCommand {
        action_type,
        target,
        skill_name,
        spell_name,
        item_name,
        explanation,
    } = raw;

    let Some(kind) = action_type
        .trim()
        .parse::<ActionType>()
        .ok()
        .filter(|kind| AI_ACTION_TYPES.contains(kind))
    else {
        warn!(actor = %context.actor.name, action_type = %action_type, "invalid action type, attacking a random enemy");
        return ValidatedCommand::fallback(CommandFallback::UnknownActionType(action_type), explanation);
    };

    let required = match kind {
        ActionType::Skill => Some(("skill_name", non_empty(skill_name))),
        ActionType::Spell => Some(("spell_name", non_empty(spell_name.clone()))),
        ActionType::Item => Some(("item_name", non_empty(item_name))),
        _ => None,
    };
    let name = match required {
        Some((field, None)) => {
            warn!(actor = %context.actor.name, %kind, field, "command missing a required field");
            return ValidatedCommand::fallback(CommandFallback::MissingField(field), explanation);
        }
        Some((_, Some(name))) => name,
        None => String::new(),
    };

    let mut fallback = None;
    let target = match non_empty(target) {
        None => TargetSpec::RandomEnemy,
        Some(raw) if raw.eq_ignore_ascii_case(TargetSpec::RANDOM_ENEMY) => TargetSpec::RandomEnemy,
        Some(raw) if context.knows_combatant(&raw) => TargetSpec::Name(raw),
        Some(raw) => {
            warn!(actor = %context.actor.name, target = %raw, "invalid target, choosing a random enemy");
            fallback = Some(CommandFallback::UnknownTarget(raw));
            TargetSpec::RandomEnemy
        }
    };

    let action = match kind {
        ActionType::Defend => BattleAction::Defend,
        ActionType::Skill => BattleAction::Skill {
            skill_name: name,
            target,
            spell_name: non_empty(spell_name),
        },
        ActionType::Spell => BattleAction::Spell {
            spell_name: name,
            target,
        },
        ActionType::Item => BattleAction::Item {
            item_name: name,
            target,
        },
        _ => BattleAction::Attack { target },
    };

    ValidatedCommand {
        action,
        fallback,
        explanation,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Story Events
// ============================================================================

/// Converts generated events into drafts for the story queue.
///
/// Events without text or trigger value are dropped. Unknown trigger types,
/// and `boss_defeated` (which only past records carry), become
/// `location_entered`.
pub fn sub_chapter_events(raw: RawSubChapterEvents) -> Vec<EventDraft> {
    let total = raw.events.len();
    let drafts: Vec<EventDraft> = raw
        .events
        .into_iter()
        .filter_map(|event| {
            let value = event.trigger.value.trim().to_string();
            let text = event.event_text.trim().to_string();
            if value.is_empty() || text.is_empty() {
                warn!(trigger = %event.trigger.kind, "dropping generated event without text or trigger value");
                return None;
            }
            let kind = match TriggerType::parse_lenient(&event.trigger.kind) {
                TriggerType::BossDefeated => TriggerType::LocationEntered,
                kind => kind,
            };
            Some(EventDraft {
                event_text: text,
                trigger: Trigger::new(kind, value),
                trigger_hint: non_empty(event.trigger_hint),
            })
        })
        .collect();

    if total != EVENTS_PER_SUB_CHAPTER {
        warn!(total, kept = drafts.len(), "unexpected number of generated events");
    }
    drafts
}

// ============================================================================
// Cutscenes
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scene {
    Dialogue { speaker: String, text: String },
    Narration { text: String },
}

impl Scene {
    pub fn speaker(&self) -> Option<&str> {
        match self {
            Scene::Dialogue { speaker, .. } => Some(speaker),
            Scene::Narration { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Scene::Dialogue { text, .. } | Scene::Narration { text } => text,
        }
    }
}

/// Keeps dialogue and narration entries. Dialogue without a speaker is
/// shown as narration; other entry types are skipped.
pub fn cutscene(raw: RawCutscene) -> Vec<Scene> {
    raw.scene
        .into_iter()
        .filter_map(|scene| {
            let text = scene.text.trim().to_string();
            if text.is_empty() {
                return None;
            }
            match scene.kind.trim().to_ascii_lowercase().as_str() {
                "dialogue" => Some(match non_empty(scene.speaker) {
                    Some(speaker) => Scene::Dialogue { speaker, text },
                    None => Scene::Narration { text },
                }),
                "narration" => Some(Scene::Narration { text }),
                other => {
                    warn!(scene_type = other, "skipping unknown scene type");
                    None
                }
            }
        })
        .collect()
}

// ============================================================================
// NPC Dialogue
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalResponse {
    pub short_text: String,
    pub full_text: String,
    pub final_message: String,
    pub outcome: DialogueOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseOption {
    pub short_text: String,
    pub full_text: String,
    pub npc_reply: String,
    pub follow_ups: Vec<FinalResponse>,
}

/// A two-level conversation: the player answers twice, and the second
/// answer carries the outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueTree {
    pub initial_message: String,
    pub responses: Vec<ResponseOption>,
    /// Outcome used when the tree runs out of options.
    pub fallback: DialogueOutcome,
}

/// Validates every outcome against what `kind` allows. First-level options
/// without follow-ups are dropped.
pub fn dialogue_tree(raw: RawDialogueTree, kind: NpcKind) -> DialogueTree {
    let responses = raw
        .responses
        .into_iter()
        .filter_map(|response| {
            let follow_ups: Vec<FinalResponse> = response
                .follow_up_responses
                .into_iter()
                .map(|reply| FinalResponse {
                    outcome: DialogueOutcome::validate(&reply.outcome, kind),
                    short_text: label(reply.short_text, &reply.full_text),
                    full_text: reply.full_text,
                    final_message: reply.final_message,
                })
                .collect();
            if follow_ups.is_empty() {
                warn!(option = %response.short_text, "dropping dialogue option without follow-ups");
                return None;
            }
            Some(ResponseOption {
                short_text: label(response.short_text, &response.full_text),
                full_text: response.full_text,
                npc_reply: response.npc_reply,
                follow_ups,
            })
        })
        .collect();

    DialogueTree {
        initial_message: raw.initial_message,
        responses,
        fallback: DialogueOutcome::validate("", kind),
    }
}

fn label(short_text: String, full_text: &str) -> String {
    if short_text.trim().is_empty() {
        full_text.chars().take(24).collect()
    } else {
        short_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::payload::{RawEvent, RawFinalResponse, RawResponse, RawScene, RawTrigger};
    use game_core::battle::{AvailableActions, CombatantId, CombatantView, Side};
    use game_core::Element;

    fn view(name: &str, alive: bool) -> CombatantView {
        CombatantView {
            name: name.to_string(),
            job_class: "Knight".to_string(),
            level: 1,
            hp: if alive { 10 } else { 0 },
            max_hp: 10,
            mp: 0,
            max_mp: 0,
            sp: 0,
            max_sp: 3,
            alive,
            element: Element::None,
            status_effects: Vec::new(),
        }
    }

    fn context() -> DecisionContext {
        DecisionContext {
            actor_id: CombatantId {
                side: Side::Enemies,
                index: 0,
            },
            actor: view("Goblin", true),
            is_player: false,
            allies: vec![view("Goblin", true)],
            enemies: vec![view("Hero", true), view("Mira", true)],
            available: AvailableActions::default(),
            turn_order: Vec::new(),
        }
    }

    fn command(action_type: &str) -> RawBattleCommand {
        RawBattleCommand {
            action_type: action_type.to_string(),
            ..RawBattleCommand::default()
        }
    }

    #[test]
    fn unknown_action_type_attacks_random_enemy() {
        let validated = battle_command(command("dance"), &context());
        assert_eq!(validated.action, BattleAction::attack_random());
        assert_eq!(
            validated.fallback,
            Some(CommandFallback::UnknownActionType("dance".to_string()))
        );
    }

    #[test]
    fn run_is_not_an_ai_choice() {
        let validated = battle_command(command("run"), &context());
        assert_eq!(validated.action, BattleAction::attack_random());
    }

    #[test]
    fn spell_without_name_falls_back() {
        let mut raw = command("spell");
        raw.target = Some("Hero".to_string());
        let validated = battle_command(raw, &context());
        assert_eq!(validated.action, BattleAction::attack_random());
        assert_eq!(validated.fallback, Some(CommandFallback::MissingField("spell_name")));
    }

    #[test]
    fn unknown_target_becomes_random_enemy() {
        let mut raw = command("item");
        raw.item_name = Some("Potion".to_string());
        raw.target = Some("Nobody".to_string());
        let validated = battle_command(raw, &context());
        assert_eq!(
            validated.action,
            BattleAction::Item {
                item_name: "Potion".to_string(),
                target: TargetSpec::RandomEnemy,
            }
        );
        assert_eq!(validated.fallback, Some(CommandFallback::UnknownTarget("Nobody".to_string())));
    }

    #[test]
    fn target_names_ignore_case() {
        let mut raw = command("attack");
        raw.target = Some("mira".to_string());
        let validated = battle_command(raw, &context());
        assert_eq!(
            validated.action,
            BattleAction::Attack {
                target: TargetSpec::Name("mira".to_string()),
            }
        );
        assert_eq!(validated.fallback, None);
    }

    #[test]
    fn known_target_and_double_cast_spell_survive() {
        let mut raw = command("Skill");
        raw.skill_name = Some("Double Cast".to_string());
        raw.spell_name = Some("Ember".to_string());
        raw.target = Some("Mira".to_string());
        let validated = battle_command(raw, &context());
        assert_eq!(
            validated.action,
            BattleAction::Skill {
                skill_name: "Double Cast".to_string(),
                target: TargetSpec::Name("Mira".to_string()),
                spell_name: Some("Ember".to_string()),
            }
        );
        assert!(validated.fallback.is_none());
    }

    #[test]
    fn defend_needs_no_target() {
        let validated = battle_command(command("defend"), &context());
        assert_eq!(validated.action, BattleAction::Defend);
    }

    #[test]
    fn events_are_sanitized() {
        let raw = RawSubChapterEvents {
            events: vec![
                RawEvent {
                    trigger: RawTrigger {
                        kind: "ally_recruited".to_string(),
                        value: "Lyra".to_string(),
                    },
                    trigger_hint: Some("Find Lyra at the docks".to_string()),
                    event_text: "Lyra offers her blade.".to_string(),
                },
                RawEvent {
                    trigger: RawTrigger {
                        kind: "teleported".to_string(),
                        value: "Harbor".to_string(),
                    },
                    trigger_hint: Some("   ".to_string()),
                    event_text: "The harbor bells ring.".to_string(),
                },
                RawEvent {
                    trigger: RawTrigger {
                        kind: "boss_confronted".to_string(),
                        value: String::new(),
                    },
                    trigger_hint: None,
                    event_text: "Nothing here.".to_string(),
                },
            ],
        };
        let drafts = sub_chapter_events(raw);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].trigger, Trigger::new(TriggerType::AllyRecruited, "Lyra"));
        assert_eq!(drafts[1].trigger.kind, TriggerType::LocationEntered);
        assert_eq!(drafts[1].trigger_hint, None);
    }

    #[test]
    fn cutscene_keeps_known_scene_types() {
        let raw = RawCutscene {
            scene: vec![
                RawScene {
                    kind: "narration".to_string(),
                    speaker: None,
                    text: "Rain falls.".to_string(),
                },
                RawScene {
                    kind: "Dialogue".to_string(),
                    speaker: Some("Old Tam".to_string()),
                    text: "Evening.".to_string(),
                },
                RawScene {
                    kind: "image".to_string(),
                    speaker: None,
                    text: "a storm".to_string(),
                },
            ],
        };
        let scenes = cutscene(raw);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[1].speaker(), Some("Old Tam"));
    }

    #[test]
    fn ally_outcomes_outside_recruitment_fail() {
        let raw = RawDialogueTree {
            initial_message: "Hm?".to_string(),
            responses: vec![
                RawResponse {
                    short_text: "Shop".to_string(),
                    full_text: "Sell me something.".to_string(),
                    npc_reply: "I'm no merchant.".to_string(),
                    follow_up_responses: vec![RawFinalResponse {
                        short_text: "Sorry".to_string(),
                        full_text: "My mistake.".to_string(),
                        final_message: "Off with you.".to_string(),
                        outcome: "shop_discount".to_string(),
                    }],
                },
                RawResponse {
                    short_text: "Empty".to_string(),
                    ..RawResponse::default()
                },
            ],
        };
        let tree = dialogue_tree(raw, NpcKind::Ally);
        assert_eq!(tree.responses.len(), 1);
        assert_eq!(tree.responses[0].follow_ups[0].outcome, DialogueOutcome::RecruitFailure);
        assert_eq!(tree.fallback, DialogueOutcome::RecruitFailure);
    }
}
