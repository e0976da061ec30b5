//! Numeric character attributes.
//!
//! - [`block`]: the mutable [`StatBlock`] with clamped resource deltas
//! - [`progression`]: level-driven stat generation and experience curves

pub mod block;
pub mod progression;

pub use block::{StatBlock, StatDelta, StatKind};
pub use progression::{StatBiases, generate_stats, xp_for_level};
