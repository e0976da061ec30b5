//! Player choices arriving over a channel.
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use game_core::ability::SkillKind;
use game_core::battle::{BattleAction, DecisionContext, TargetSpec};

use super::Controller;
use crate::error::{Result, RuntimeError};

/// Sent from the controller to whoever answers for the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChoiceRequest {
    /// A player-controlled combatant needs an action.
    Decide(Box<DecisionContext>),
    /// The last selection was not accepted; the same actor chooses again.
    Rejected { actor: String, reason: SelectionError },
}

/// Why a player selection cannot be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("{0} is not a skill you can use right now")]
    SkillUnavailable(String),

    #[error("{skill} needs a spell to cast")]
    SpellRequired { skill: String },

    #[error("{0} is not a spell you can cast right now")]
    SpellUnavailable(String),

    #[error("Not enough MP to cast {0} twice")]
    NotEnoughMpForDoubleCast(String),

    #[error("Silenced combatants cannot cast spells")]
    Silenced,

    #[error("No {0} in the inventory")]
    NoItem(String),

    #[error("{0} is not in this battle")]
    UnknownTarget(String),

    #[error("{0} is not a battle action")]
    UnknownAction(String),
}

/// Checks a player selection against what the actor can actually do.
pub fn check_selection(action: &BattleAction, context: &DecisionContext) -> std::result::Result<(), SelectionError> {
    let available = &context.available;
    let target = match action {
        BattleAction::Attack { target } => target,
        BattleAction::Skill {
            skill_name,
            target,
            spell_name,
        } => {
            let skill = available
                .skills
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(skill_name.trim()))
                .ok_or_else(|| SelectionError::SkillUnavailable(skill_name.clone()))?;
            if skill.requires_spell {
                let spell_name = spell_name.as_deref().ok_or_else(|| SelectionError::SpellRequired {
                    skill: skill.name.clone(),
                })?;
                let spell = available
                    .spells
                    .iter()
                    .find(|s| s.name.eq_ignore_ascii_case(spell_name.trim()))
                    .ok_or_else(|| SelectionError::SpellUnavailable(spell_name.to_string()))?;
                if skill.name.parse::<SkillKind>() == Ok(SkillKind::DoubleCast) && context.actor.mp < spell.cost * 2 {
                    return Err(SelectionError::NotEnoughMpForDoubleCast(spell.name.clone()));
                }
            }
            target
        }
        BattleAction::Spell { spell_name, target } => {
            if context.actor.status_effects.iter().any(|e| e == "Silence") {
                return Err(SelectionError::Silenced);
            }
            if !available
                .spells
                .iter()
                .any(|s| s.name.eq_ignore_ascii_case(spell_name.trim()))
            {
                return Err(SelectionError::SpellUnavailable(spell_name.clone()));
            }
            target
        }
        BattleAction::Item { item_name, target } => {
            if !available
                .items
                .iter()
                .any(|i| i.count > 0 && i.name.eq_ignore_ascii_case(item_name.trim()))
            {
                return Err(SelectionError::NoItem(item_name.clone()));
            }
            target
        }
        BattleAction::Defend | BattleAction::Run | BattleAction::Pass => return Ok(()),
        BattleAction::Unknown { action_type } => {
            return Err(SelectionError::UnknownAction(action_type.clone()));
        }
    };

    match target {
        TargetSpec::Name(name) if !context.knows_combatant(name) => Err(SelectionError::UnknownTarget(name.clone())),
        TargetSpec::Names(names) => match names.iter().find(|n| !context.knows_combatant(n)) {
            Some(name) => Err(SelectionError::UnknownTarget(name.clone())),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

/// Forwards decision points to the UI layer and waits for a valid selection.
///
/// Invalid selections are reported back as [`ChoiceRequest::Rejected`] and do
/// not consume the turn.
pub struct ExternalController {
    requests: mpsc::Sender<ChoiceRequest>,
    selections: mpsc::Receiver<BattleAction>,
}

/// The UI side of an [`ExternalController`].
pub struct PlayerHandle {
    pub requests: mpsc::Receiver<ChoiceRequest>,
    pub selections: mpsc::Sender<BattleAction>,
}

impl ExternalController {
    pub fn channel(buffer: usize) -> (Self, PlayerHandle) {
        let (request_tx, request_rx) = mpsc::channel(buffer.max(1));
        let (selection_tx, selection_rx) = mpsc::channel(buffer.max(1));
        (
            Self {
                requests: request_tx,
                selections: selection_rx,
            },
            PlayerHandle {
                requests: request_rx,
                selections: selection_tx,
            },
        )
    }
}

#[async_trait]
impl Controller for ExternalController {
    async fn decide_action(&mut self, context: &DecisionContext) -> Result<BattleAction> {
        self.requests
            .send(ChoiceRequest::Decide(Box::new(context.clone())))
            .await
            .map_err(|_| RuntimeError::ChannelClosed("choice request"))?;

        loop {
            let selection = self
                .selections
                .recv()
                .await
                .ok_or(RuntimeError::ChannelClosed("player selection"))?;

            match check_selection(&selection, context) {
                Ok(()) => return Ok(selection),
                Err(reason) => {
                    info!(actor = %context.actor.name, %reason, "selection rejected");
                    self.requests
                        .send(ChoiceRequest::Rejected {
                            actor: context.actor.name.clone(),
                            reason,
                        })
                        .await
                        .map_err(|_| RuntimeError::ChannelClosed("choice request"))?;
                }
            }
        }
    }
}
