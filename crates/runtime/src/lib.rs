//! Async orchestration around the deterministic JRPG rules.
//!
//! `game-core` never awaits. This crate supplies everything that does:
//! generated content, player input and battle narration.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the composition root and its builder
//! - [`oracle`] defines the content-generation boundary and validates its output
//! - [`controller`] decides battle actions (oracle AI, external player, scripts)
//! - [`battle`] drives a [`game_core::Battle`] to its outcome
//! - [`enemy`] turns generated enemy descriptions into combatants
//! - [`story`] runs story events, encounters and chapter progression
//! - [`events`] provides the topic-based event bus
pub mod battle;
pub mod config;
pub mod controller;
pub mod enemy;
pub mod error;
pub mod events;
pub mod oracle;
pub mod runtime;
pub mod story;

pub use battle::{BattleReport, BattleRunner, BattleSetup};
pub use config::RuntimeConfig;
pub use controller::{
    ChoiceRequest, Controller, ExternalController, OracleController, PlayerHandle, ScriptedController,
    SelectionError,
};
pub use enemy::{EnemyFactory, EnemySpec};
pub use error::{OracleError, OracleResult, Result, RuntimeError};
pub use events::{BattleEvent, DialogueEvent, Event, EventBus, StoryUpdate, Topic};
pub use oracle::{OfflineOracle, Oracles, RetryPolicy};
pub use runtime::{Runtime, RuntimeBuilder};
pub use story::{
    BossResult, FirstOption, RecruitResult, ResponseChooser, ScriptedChooser, SessionParts, StorySession,
};
