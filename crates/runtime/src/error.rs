//! Errors surfaced by the runtime.
//!
//! Gameplay failures (a missed attack, an unaffordable spell) never show up
//! here; they are narrated by the battle log. These are failures of the
//! machinery around the rules: oracles that stop answering, closed channels,
//! and core errors bubbling out of party or battle bookkeeping.
use thiserror::Error;

use game_core::{BattleError, CatalogError, PartyError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{operation} oracle failed after {attempts} attempt(s)")]
    Oracle {
        operation: &'static str,
        attempts: u32,
        #[source]
        source: OracleError,
    },

    #[error("invalid {operation} payload: {reason}")]
    InvalidPayload {
        operation: &'static str,
        reason: String,
    },

    #[error("{0} channel closed")]
    ChannelClosed(&'static str),

    #[error("no {0} controller registered")]
    ControllerNotSet(&'static str),

    #[error("story has no event waiting to be triggered")]
    NoPendingEvent,

    #[error("no npc named {0} in the cast")]
    UnknownNpc(String),

    #[error("oracle bundle not provided")]
    MissingOracles,

    #[error("failed to load game content")]
    Content(#[source] anyhow::Error),

    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error(transparent)]
    Party(#[from] PartyError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Failure of a single oracle call.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle timed out")]
    Timeout,

    #[error("malformed oracle response")]
    Malformed(#[from] serde_json::Error),

    #[error("oracle refused the request: {0}")]
    Refused(String),
}

impl OracleError {
    /// Refusals are final; anything else may succeed on another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, OracleError::Refused(_))
    }
}

pub type OracleResult<T> = std::result::Result<T, OracleError>;
