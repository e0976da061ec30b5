//! Data-driven content definitions and loaders.
//!
//! This crate houses the static catalogs the rules are parameterised by:
//! - Spell catalog (RON)
//! - Item catalog (RON), with spell books resolved against the spell catalog
//! - Game rules configuration (TOML)
//!
//! The default data set is embedded at compile time; [`ContentFactory`] can
//! also read a data directory at runtime. Loaders return `game-core` types
//! directly, so nothing here appears in battle or story state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, GameContent, ItemLoader, SpellLoader};
