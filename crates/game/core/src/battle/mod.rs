//! Turn-based battles.
//!
//! - [`roster`]: combatant addressing across the two sides
//! - [`scheduler`]: time-unit turn order and forecasts
//! - [`action`]: closed action variants produced by controllers
//! - [`context`]: owned decision snapshot handed to controllers
//! - [`log`]: narration entries
//! - [`machine`]: the [`Battle`] state machine
//!
//! Action resolution and skill effects extend [`Battle`] from private
//! submodules.

pub mod action;
pub mod context;
pub mod log;
pub mod machine;
mod resolver;
pub mod roster;
pub mod scheduler;
mod skills;

pub use action::{ActionType, BattleAction, TargetSpec};
pub use context::{AbilityOption, AvailableActions, CombatantView, DecisionContext, ItemOption};
pub use log::{BattleLog, EntryKind, LogEntry};
pub use machine::{
    Battle, BattleError, BattleOutcome, BattlePhase, BattleRewards, TurnStart, unique_enemy_names,
};
pub use roster::{CombatantId, Roster, Side};
pub use scheduler::{Contender, TurnScheduler};

#[cfg(test)]
mod tests;
