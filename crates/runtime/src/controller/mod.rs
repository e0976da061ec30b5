//! Sources of battle decisions.
//!
//! Runtime users plug in [`Controller`] implementations so a battle can run
//! with human input, oracle-backed AI, or scripted fixtures. The battle
//! runner asks the controller for the acting combatant's side.
mod ai;
mod external;

use std::collections::VecDeque;

use async_trait::async_trait;

use game_core::battle::{BattleAction, DecisionContext};

use crate::error::Result;

pub use ai::OracleController;
pub use external::{ChoiceRequest, ExternalController, PlayerHandle, SelectionError, check_selection};

/// Decides what the acting combatant does this turn.
#[async_trait]
pub trait Controller: Send + Sync {
    /// Returns the action for `context.actor`. The returned action must be
    /// final: the runner resolves it as-is.
    async fn decide_action(&mut self, context: &DecisionContext) -> Result<BattleAction>;
}

#[async_trait]
impl<C: Controller + ?Sized> Controller for Box<C> {
    async fn decide_action(&mut self, context: &DecisionContext) -> Result<BattleAction> {
        (**self).decide_action(context).await
    }
}

/// Replays a fixed list of actions, then attacks a random enemy.
#[derive(Clone, Debug, Default)]
pub struct ScriptedController {
    actions: VecDeque<BattleAction>,
}

impl ScriptedController {
    pub fn new(actions: impl IntoIterator<Item = BattleAction>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

#[async_trait]
impl Controller for ScriptedController {
    async fn decide_action(&mut self, _context: &DecisionContext) -> Result<BattleAction> {
        Ok(self.actions.pop_front().unwrap_or_else(BattleAction::attack_random))
    }
}
