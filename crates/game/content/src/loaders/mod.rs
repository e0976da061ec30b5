//! Content loaders for reading game data from files.
//!
//! Each loader parses from a string (used for the embedded defaults and in
//! tests) or from a path on disk.

pub mod config;
pub mod factory;
pub mod items;
pub mod spells;

pub use config::ConfigLoader;
pub use factory::{ContentFactory, GameContent};
pub use items::ItemLoader;
pub use spells::SpellLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
