//! Deterministic oracle that needs no model.
//!
//! Used by the client when no backend is configured and by tests that want
//! plausible content without scripting every response.
use std::sync::Mutex;

use async_trait::async_trait;

use game_core::ability::Targeting;
use game_core::{BattleRng, DialogueOutcome, EnemyKind, NpcKind, PcgRng};

use super::payload::{
    RawBattleCommand, RawCutscene, RawDialogueTree, RawEnemy, RawEvent, RawFinalResponse, RawResponse,
    RawScene, RawSubChapterEvents, RawSummary, RawTrigger,
};
use super::request::{
    BattleCommandRequest, CutsceneRequest, DialogueRequest, EnemyRequest, SubChapterRequest, SummaryRequest,
};
use super::{BattleCommandOracle, DialogueOracle, EnemyOracle, NarrationOracle, StoryOracle};
use crate::error::OracleResult;

const ENEMY_NAMES: [&str; 8] = [
    "Bog Wight",
    "Ash Hound",
    "Gloom Moth",
    "Rust Golem",
    "Thorn Sprite",
    "Cave Troll",
    "Salt Wraith",
    "Dune Scarab",
];

const ATTACK_NAMES: [&str; 6] = [
    "Rending Claw",
    "Crushing Blow",
    "Venom Fang",
    "Howling Strike",
    "Shadow Lash",
    "Stone Fist",
];

/// Below this HP ratio the offline AI reaches for a healing item.
const LOW_HP: f64 = 0.35;

#[derive(Debug)]
pub struct OfflineOracle {
    rng: Mutex<PcgRng>,
}

impl OfflineOracle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(PcgRng::new(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut PcgRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    fn pick<'a>(&self, options: &'a [&'a str]) -> &'a str {
        self.with_rng(|rng| rng.pick_index(options.len()))
            .and_then(|index| options.get(index).copied())
            .unwrap_or_default()
    }
}

impl Default for OfflineOracle {
    fn default() -> Self {
        Self::new(0)
    }
}

#[async_trait]
impl EnemyOracle for OfflineOracle {
    async fn generate_enemy(&self, request: &EnemyRequest) -> OracleResult<RawEnemy> {
        let name = if request.base_name.is_empty() {
            self.pick(&ENEMY_NAMES).to_string()
        } else {
            request.base_name.clone()
        };
        let description = if request.base_description.is_empty() {
            format!("A creature that haunts {}", request.location.name)
        } else {
            request.base_description.clone()
        };
        let spell_count = match request.kind {
            EnemyKind::Boss => 2,
            EnemyKind::Regular => usize::from(request.level >= 5),
        };
        let spells = self.with_rng(|rng| {
            let mut pool = request.spells.clone();
            let mut picked = Vec::new();
            while picked.len() < spell_count {
                let Some(index) = rng.pick_index(pool.len()) else {
                    break;
                };
                picked.push(pool.swap_remove(index));
            }
            picked
        });
        let element = self
            .with_rng(|rng| rng.pick_index(request.elements.len()))
            .and_then(|index| request.elements.get(index).cloned())
            .unwrap_or_default();

        Ok(RawEnemy {
            name,
            description,
            job_class: match request.kind {
                EnemyKind::Boss => "Warlord".to_string(),
                EnemyKind::Regular => "Beast".to_string(),
            },
            attack_name: self.pick(&ATTACK_NAMES).to_string(),
            spells,
            element,
        })
    }
}

#[async_trait]
impl BattleCommandOracle for OfflineOracle {
    async fn generate_battle_command(&self, request: &BattleCommandRequest) -> OracleResult<RawBattleCommand> {
        let context = &request.context;
        let actor = &context.actor;

        let hurt = actor.max_hp > 0 && f64::from(actor.hp) / f64::from(actor.max_hp) < LOW_HP;
        if hurt
            && let Some(item) = context
                .available
                .items
                .iter()
                .find(|item| matches!(item.targeting, Targeting::Ally | Targeting::SelfOnly))
        {
            return Ok(RawBattleCommand {
                action_type: "item".to_string(),
                target: Some(actor.name.clone()),
                item_name: Some(item.name.clone()),
                explanation: Some(format!("{} is badly hurt", actor.name)),
                ..RawBattleCommand::default()
            });
        }

        let weakest = context
            .living_enemies()
            .min_by_key(|enemy| enemy.hp)
            .map(|enemy| enemy.name.clone());

        let offensive_spell = context
            .available
            .spells
            .iter()
            .find(|spell| matches!(spell.targeting, Targeting::Enemy | Targeting::Enemies));
        if let Some(spell) = offensive_spell
            && self.with_rng(|rng| rng.chance(0.3))
        {
            return Ok(RawBattleCommand {
                action_type: "spell".to_string(),
                target: weakest,
                spell_name: Some(spell.name.clone()),
                explanation: Some(format!("{} is the weakest target", spell.name)),
                ..RawBattleCommand::default()
            });
        }

        Ok(RawBattleCommand {
            action_type: "attack".to_string(),
            target: weakest,
            explanation: Some("Press the attack".to_string()),
            ..RawBattleCommand::default()
        })
    }
}

#[async_trait]
impl NarrationOracle for OfflineOracle {
    async fn generate_action_text(&self, raw_text: &str) -> OracleResult<String> {
        Ok(raw_text.to_string())
    }
}

#[async_trait]
impl StoryOracle for OfflineOracle {
    async fn generate_sub_chapter_events(&self, request: &SubChapterRequest) -> OracleResult<RawSubChapterEvents> {
        let Some(outline) = &request.outline else {
            return Ok(RawSubChapterEvents::default());
        };
        let location = &outline.location.name;

        let arrival = RawEvent {
            trigger: RawTrigger {
                kind: "location_entered".to_string(),
                value: location.clone(),
            },
            trigger_hint: Some(format!("Travel to {location}")),
            event_text: format!("The party arrives at {location}. {}", outline.overview),
        };

        let follow_up = match (&outline.npc, &outline.landmark) {
            (Some(npc), _) => RawEvent {
                trigger: RawTrigger {
                    kind: "story_exposition".to_string(),
                    value: npc.name.clone(),
                },
                trigger_hint: Some(format!("Speak with {}", npc.name)),
                event_text: format!("{} shares what they know. {}", npc.name, npc.description),
            },
            (None, Some(landmark)) => RawEvent {
                trigger: RawTrigger {
                    kind: "landmark_inspected".to_string(),
                    value: landmark.name.clone(),
                },
                trigger_hint: Some(format!("Inspect {}", landmark.name)),
                event_text: format!("The party studies {}. {}", landmark.name, landmark.description),
            },
            (None, None) => RawEvent {
                trigger: RawTrigger {
                    kind: "location_entered".to_string(),
                    value: location.clone(),
                },
                trigger_hint: Some(format!("Return to {location}")),
                event_text: format!("Something has changed at {location}."),
            },
        };

        Ok(RawSubChapterEvents {
            events: vec![arrival, follow_up],
        })
    }

    async fn generate_story_so_far(&self, request: &SummaryRequest) -> OracleResult<RawSummary> {
        let recent: Vec<&str> = request
            .past_events
            .iter()
            .rev()
            .take(3)
            .rev()
            .map(|event| event.event_text.as_str())
            .collect();
        Ok(RawSummary {
            summary: recent.join(" "),
        })
    }
}

#[async_trait]
impl DialogueOracle for OfflineOracle {
    async fn generate_cutscene(&self, request: &CutsceneRequest) -> OracleResult<RawCutscene> {
        let mut scene = vec![RawScene {
            kind: "narration".to_string(),
            speaker: None,
            text: format!("{}: {}", request.location.name, request.event_text),
        }];
        if let Some(speaker) = request
            .characters
            .last()
            .and_then(|label| label.split(" (").next())
            .filter(|name| !name.is_empty())
        {
            scene.push(RawScene {
                kind: "dialogue".to_string(),
                speaker: Some(speaker.to_string()),
                text: format!("So it begins at {}.", request.location.name),
            });
        }
        Ok(RawCutscene { scene })
    }

    async fn generate_npc_dialogue(&self, request: &DialogueRequest) -> OracleResult<RawDialogueTree> {
        let hoped_for = match request.npc.kind {
            NpcKind::Ally => DialogueOutcome::RecruitSuccess,
            NpcKind::Boss | NpcKind::Enemy => DialogueOutcome::Battle,
            _ => request
                .valid_outcomes
                .last()
                .copied()
                .unwrap_or(DialogueOutcome::End),
        };
        let fallback = DialogueOutcome::validate("", request.npc.kind);
        let npc = &request.npc.name;
        let player = &request.player_name;

        let follow_ups = vec![
            RawFinalResponse {
                short_text: "Agree".to_string(),
                full_text: format!("{player} nods. \"Then we are agreed.\""),
                final_message: format!("{npc} smiles. \"So be it.\""),
                outcome: hoped_for.as_str().to_string(),
            },
            RawFinalResponse {
                short_text: "Decline".to_string(),
                full_text: format!("{player} shakes their head."),
                final_message: format!("{npc} turns away."),
                outcome: fallback.as_str().to_string(),
            },
        ];

        Ok(RawDialogueTree {
            initial_message: format!("Well met, {player}. I am {npc}."),
            responses: vec![
                RawResponse {
                    short_text: "Greet".to_string(),
                    full_text: format!("\"Well met, {npc}.\""),
                    npc_reply: request.event_context.clone(),
                    follow_up_responses: follow_ups.clone(),
                },
                RawResponse {
                    short_text: "Ask".to_string(),
                    full_text: "\"What brings you here?\"".to_string(),
                    npc_reply: format!("I have business in {}.", request.location.name),
                    follow_up_responses: follow_ups,
                },
            ],
        })
    }
}
