//! Spell catalog loader.

use std::path::Path;

use game_core::{Spell, SpellCatalog};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loaders::{LoadResult, read_file};

const EMBEDDED_SPELLS: &str = include_str!("../../data/spells.ron");

/// Spell catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCatalogFile {
    pub spells: Vec<Spell>,
}

/// Loader for the spell catalog from RON files.
pub struct SpellLoader;

impl SpellLoader {
    pub fn load(path: &Path) -> LoadResult<SpellCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses a catalog. Later duplicates of a name are dropped.
    pub fn parse(content: &str) -> LoadResult<SpellCatalog> {
        let file: SpellCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse spell catalog RON: {}", e))?;

        let mut spells: Vec<Spell> = Vec::with_capacity(file.spells.len());
        for spell in file.spells {
            if spells.iter().any(|known| known.matches(&spell.name)) {
                warn!(target: "game_content", spell = %spell.name, "duplicate spell skipped");
                continue;
            }
            spells.push(spell);
        }
        Ok(SpellCatalog::new(spells))
    }

    pub fn embedded() -> LoadResult<SpellCatalog> {
        Self::parse(EMBEDDED_SPELLS)
    }
}
