//! Oracle-backed AI controller.
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use game_core::battle::{BattleAction, DecisionContext};

use super::Controller;
use crate::error::Result;
use crate::oracle::validate::{self, ValidatedCommand};
use crate::oracle::{BattleCommandOracle, BattleCommandRequest, RetryPolicy};

/// Asks the battle command oracle what to do and validates the answer.
///
/// An oracle that stays down after retries costs the actor its plan, not the
/// battle: the controller attacks a random enemy instead.
pub struct OracleController {
    oracle: Arc<dyn BattleCommandOracle>,
    retry: RetryPolicy,
    previous_action: Option<String>,
}

impl OracleController {
    pub fn new(oracle: Arc<dyn BattleCommandOracle>, retry: RetryPolicy) -> Self {
        Self {
            oracle,
            retry,
            previous_action: None,
        }
    }

    pub fn previous_action(&self) -> Option<&str> {
        self.previous_action.as_deref()
    }
}

#[async_trait]
impl Controller for OracleController {
    async fn decide_action(&mut self, context: &DecisionContext) -> Result<BattleAction> {
        let request = BattleCommandRequest {
            context: context.clone(),
            previous_action: self.previous_action.clone(),
        };

        let oracle = &self.oracle;
        let request = &request;
        let proposal = self
            .retry
            .run("generate_battle_command", move || oracle.generate_battle_command(request))
            .await;

        let action = match proposal {
            Ok(raw) => {
                let ValidatedCommand {
                    action,
                    fallback,
                    explanation,
                } = validate::battle_command(raw, context);
                debug!(
                    actor = %context.actor.name,
                    action = %action.summary(),
                    ?fallback,
                    explanation = explanation.as_deref().unwrap_or(""),
                    "AI decision"
                );
                action
            }
            Err(error) => {
                warn!(actor = %context.actor.name, %error, "battle command unavailable, attacking a random enemy");
                BattleAction::attack_random()
            }
        };

        self.previous_action = Some(action.summary());
        Ok(action)
    }
}
