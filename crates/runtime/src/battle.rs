//! Async driver for [`game_core::Battle`].
//!
//! The core pauses at every decision point; the runner answers with the
//! controller for the acting side, embellishes action narration, and publishes
//! everything on the [`Topic::Battle`](crate::events::Topic::Battle) topic.
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use game_core::battle::{EntryKind, TurnStart};
use game_core::{Battle, BattleOutcome, BattleRewards, BattleRng, GameConfig, LogEntry, Party};

use crate::controller::Controller;
use crate::error::Result;
use crate::events::{BattleEvent, EventBus};
use crate::oracle::{NarrationOracle, PlainNarration};

/// How a battle is introduced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleSetup {
    pub battle_type: String,
    pub context: String,
    pub currency_name: String,
}

impl BattleSetup {
    pub fn new(battle_type: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            battle_type: battle_type.into(),
            context: context.into(),
            currency_name: game_core::story::DEFAULT_CURRENCY_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_currency_name(mut self, name: impl Into<String>) -> Self {
        self.currency_name = name.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub rewards: Option<BattleRewards>,
    /// Every entry as the core wrote it, before embellishment.
    pub log: Vec<LogEntry>,
    /// The enemy party after the fight.
    pub enemies: Party,
}

pub struct BattleRunner {
    players: Box<dyn Controller>,
    enemies: Box<dyn Controller>,
    overrides: HashMap<String, Box<dyn Controller>>,
    narration: Arc<dyn NarrationOracle>,
    bus: EventBus,
    config: GameConfig,
}

impl BattleRunner {
    pub fn new(
        players: impl Controller + 'static,
        enemies: impl Controller + 'static,
        config: GameConfig,
        bus: EventBus,
    ) -> Self {
        Self {
            players: Box::new(players),
            enemies: Box::new(enemies),
            overrides: HashMap::new(),
            narration: Arc::new(PlainNarration),
            bus,
            config,
        }
    }

    #[must_use]
    pub fn with_narration(mut self, narration: Arc<dyn NarrationOracle>) -> Self {
        self.narration = narration;
        self
    }

    /// Routes decisions for one combatant, by battle name, to `controller`.
    #[must_use]
    pub fn with_controller_for(mut self, name: impl Into<String>, controller: impl Controller + 'static) -> Self {
        self.overrides.insert(name.into(), Box::new(controller));
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Runs a full battle. The party is borrowed for the duration; the enemy
    /// party is handed back in the report.
    pub async fn fight<R>(&mut self, party: &mut Party, enemies: Party, setup: &BattleSetup, rng: R) -> Result<BattleReport>
    where
        R: BattleRng + Send + 'static,
    {
        let mut battle =
            Battle::new(party, enemies, self.config.clone(), rng).with_currency_name(setup.currency_name.clone());
        battle.start(&setup.battle_type, &setup.context)?;

        let enemy_names = battle
            .roster()
            .enemies()
            .members
            .iter()
            .map(|enemy| enemy.name.clone())
            .collect();
        self.bus.publish(BattleEvent::Started {
            battle_type: setup.battle_type.clone(),
            enemies: enemy_names,
        });

        let outcome = self.drive(&mut battle).await?;
        let rewards = battle.rewards();
        let log = battle.log().entries().to_vec();

        info!(battle_type = %setup.battle_type, %outcome, "battle over");
        self.bus.publish(BattleEvent::Ended { outcome, rewards });

        Ok(BattleReport {
            outcome,
            rewards,
            log,
            enemies: battle.into_enemies(),
        })
    }

    /// Steps an already started battle until it reaches an outcome.
    pub async fn drive(&mut self, battle: &mut Battle<'_>) -> Result<BattleOutcome> {
        loop {
            let step = battle.begin_turn()?;
            self.publish_log(battle).await;

            match step {
                TurnStart::AwaitingDecision(context) => {
                    let actor = context.actor.name.clone();
                    self.bus.publish(BattleEvent::TurnStarted {
                        actor: actor.clone(),
                        turn_order: context.turn_order.clone(),
                    });

                    let action = if let Some(controller) = self.overrides.get_mut(&actor) {
                        controller.decide_action(&context).await?
                    } else if context.is_player {
                        self.players.decide_action(&context).await?
                    } else {
                        self.enemies.decide_action(&context).await?
                    };

                    let outcome = battle.resolve_turn(action)?;
                    self.publish_log(battle).await;
                    if let Some(outcome) = outcome {
                        return Ok(outcome);
                    }
                }
                TurnStart::Skipped { .. } => {}
                TurnStart::Finished(outcome) => return Ok(outcome),
            }
        }
    }

    async fn publish_log(&self, battle: &mut Battle<'_>) {
        for mut entry in battle.drain_log() {
            if entry.kind == EntryKind::Action {
                match self.narration.generate_action_text(&entry.text).await {
                    Ok(text) if !text.trim().is_empty() => entry.text = text,
                    Ok(_) => {}
                    Err(error) => warn!(%error, "narration unavailable, using plain text"),
                }
            }
            self.bus.publish(BattleEvent::Narration(entry));
        }
    }
}
