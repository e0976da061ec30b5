//! Content factory for building catalogs from data files.

use std::path::{Path, PathBuf};

use game_core::{GameConfig, ItemCatalog, SpellCatalog};

use crate::loaders::{ConfigLoader, ItemLoader, LoadResult, SpellLoader};

/// Everything the rules are parameterised by.
#[derive(Clone, Debug)]
pub struct GameContent {
    pub config: GameConfig,
    pub spells: SpellCatalog,
    pub items: ItemCatalog,
}

impl GameContent {
    /// The data set compiled into this crate.
    pub fn embedded() -> LoadResult<Self> {
        let spells = SpellLoader::embedded()?;
        let items = ItemLoader::embedded(&spells)?;
        Ok(Self {
            config: ConfigLoader::embedded()?,
            spells,
            items,
        })
    }
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── game.toml
/// ├── spells.ron
/// └── items.ron
/// ```
///
/// Missing files fall back to the embedded data.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load game configuration from `game.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("game.toml");
        if path.exists() {
            ConfigLoader::load(&path)
        } else {
            ConfigLoader::embedded()
        }
    }

    /// Load the spell catalog from `spells.ron`.
    pub fn load_spells(&self) -> LoadResult<SpellCatalog> {
        let path = self.data_dir.join("spells.ron");
        if path.exists() {
            SpellLoader::load(&path)
        } else {
            SpellLoader::embedded()
        }
    }

    /// Load the item catalog from `items.ron`.
    pub fn load_items(&self, spells: &SpellCatalog) -> LoadResult<ItemCatalog> {
        let path = self.data_dir.join("items.ron");
        if path.exists() {
            ItemLoader::load(&path, spells)
        } else {
            ItemLoader::embedded(spells)
        }
    }

    pub fn load_all(&self) -> LoadResult<GameContent> {
        let spells = self.load_spells()?;
        let items = self.load_items(&spells)?;
        Ok(GameContent {
            config: self.load_config()?,
            spells,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_uses_embedded_data() {
        let dir = std::env::temp_dir().join("game-content-missing-dir");
        let content = ContentFactory::new(dir).load_all().unwrap();
        let embedded = GameContent::embedded().unwrap();
        assert_eq!(content.spells, embedded.spells);
        assert_eq!(content.items, embedded.items);
        assert_eq!(content.config, GameConfig::default());
    }

    #[test]
    fn directory_files_override_embedded_data() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game.toml"), "cheat_mode = true\n").unwrap();
        std::fs::write(
            dir.path().join("items.ron"),
            "(items: [(name: \"Tonic\", tier: 3, kind: Healing)])",
        )
        .unwrap();

        let content = ContentFactory::new(dir.path()).load_all().unwrap();
        assert!(content.config.cheat_mode);
        assert_eq!(content.items.names(), vec!["Tonic".to_string()]);
        assert!(content.spells.get("Ember").is_some());
    }
}
