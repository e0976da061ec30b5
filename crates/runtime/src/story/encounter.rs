//! Boss confrontations and ally recruitment.
use tracing::info;

use game_core::{
    BaseClass, BattleOutcome, Combatant, DialogueOutcome, Npc, Party, StatusEffect, StoryEvent, Trigger,
    TriggerType,
};

use super::{Conversation, StorySession};
use crate::battle::BattleSetup;
use crate::enemy::EnemySpec;
use crate::error::{Result, RuntimeError};
use crate::events::DialogueEvent;
use crate::oracle::validate;
use crate::oracle::{DialogueRequest, NpcBrief};

const BOSS_BATTLE: &str = "boss_battle";
const BOSS_CONTEXT: &str = "boss_encounter";
const INTIMIDATED_TURNS: i32 = 1;
const RETREAT_TEXT: &str = "You decide to turn back and prepare more before facing the boss.";
const FALLBACK_JOB: &str = "Adventurer";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossResult {
    Defeated,
    PartyDefeated,
    Retreated,
}

impl From<BattleOutcome> for BossResult {
    fn from(outcome: BattleOutcome) -> Self {
        match outcome {
            BattleOutcome::PartyVictory => BossResult::Defeated,
            BattleOutcome::PartyDefeated => BossResult::PartyDefeated,
            BattleOutcome::PartyRan => BossResult::Retreated,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecruitResult {
    Joined,
    Declined,
}

impl StorySession {
    /// Fights a boss from the cast at its story level.
    ///
    /// Victory marks the boss defeated and records a `boss_defeated` past
    /// event. The head event is left alone either way.
    pub async fn confront_boss(&mut self, name: &str, intimidated: bool) -> Result<BossResult> {
        let npc = self.lookup_npc(name)?;
        let spec = EnemySpec::boss(&npc.name, &npc.description, npc.story_level, npc.location.clone());

        let mut rng = self.fork_rng();
        let mut boss = self.enemies.create(&spec, &mut rng).await?;
        if intimidated {
            boss.add_status_effect(StatusEffect::intimidated(INTIMIDATED_TURNS));
        }
        info!(boss = %boss.name, level = boss.level, intimidated, "boss confronted");

        let setup = BattleSetup::new(BOSS_BATTLE, BOSS_CONTEXT).with_currency_name(self.story.currency_name());
        let report = self
            .runner
            .fight(&mut self.party, Party::enemies(vec![boss]), &setup, rng)
            .await?;

        let result = BossResult::from(report.outcome);
        match result {
            BossResult::Defeated => {
                if let Some(entry) = self.cast.get_mut(&npc.name) {
                    entry.defeated = true;
                }
                self.story.record(
                    npc.location.clone(),
                    format!("{} has been defeated!", npc.name),
                    Trigger::new(TriggerType::BossDefeated, npc.name.clone()),
                );
            }
            BossResult::Retreated => {
                self.bus.publish(DialogueEvent::Line {
                    speaker: None,
                    text: RETREAT_TEXT.to_string(),
                });
            }
            BossResult::PartyDefeated => info!(boss = %npc.name, "party fell to the boss"),
        }
        Ok(result)
    }

    /// Tries to talk an ally into joining. Success adds a new party member at
    /// the ally's story level and records an `ally_recruited` past event.
    pub async fn recruit_ally(&mut self, name: &str, event: &StoryEvent) -> Result<RecruitResult> {
        let npc = self.lookup_npc(name)?;
        let (player_name, player_description) = self
            .party
            .leader()
            .map(|leader| (leader.name.clone(), leader.description.clone()))
            .unwrap_or_default();

        let request = DialogueRequest {
            npc: NpcBrief::from(&npc),
            event_context: event.event_text.clone(),
            valid_outcomes: npc.kind.valid_outcomes(),
            player_name: player_name.clone(),
            player_description,
            location: npc.location.clone(),
        };
        let oracle = self.oracles.dialogue();
        let request = &request;
        let raw = self
            .retry
            .run("generate_npc_dialogue", move || oracle.generate_npc_dialogue(request))
            .await?;
        let tree = validate::dialogue_tree(raw, npc.kind);

        let outcome = Conversation::new(&npc.name, &player_name, &self.bus)
            .run(&tree, self.chooser.as_mut())
            .await?;

        if outcome != DialogueOutcome::RecruitSuccess {
            info!(ally = %npc.name, %outcome, "recruitment failed");
            self.bus.publish(DialogueEvent::Line {
                speaker: None,
                text: format!("{} is not interested in joining your party.", npc.name),
            });
            return Ok(RecruitResult::Declined);
        }

        let recruit = self.recruit_from(&npc);
        let placement = self.party.add_character(recruit);
        if let Some(entry) = self.cast.get_mut(&npc.name) {
            entry.recruited = true;
        }
        info!(ally = %npc.name, ?placement, "ally joined");

        self.story.record(
            npc.location.clone(),
            format!("{} has joined your party!", npc.name),
            Trigger::new(TriggerType::AllyRecruited, npc.name.clone()),
        );
        self.bus.publish(DialogueEvent::Recruited { name: npc.name.clone() });
        Ok(RecruitResult::Joined)
    }

    fn recruit_from(&mut self, npc: &Npc) -> Combatant {
        let base_class = npc.base_class.unwrap_or(BaseClass::Brave);
        let job_class = if npc.job_class.trim().is_empty() {
            FALLBACK_JOB
        } else {
            npc.job_class.as_str()
        };
        let mut recruit = Combatant::player(&npc.name, job_class, base_class, npc.story_level, &self.content.config)
            .with_description(&npc.description);
        for spell in self.content.spells.starter_spells(base_class, &mut self.rng) {
            recruit.learn_spell(spell);
        }
        recruit
    }

    fn lookup_npc(&self, name: &str) -> Result<Npc> {
        self.cast
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownNpc(name.to_string()))
    }
}
