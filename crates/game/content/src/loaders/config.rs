//! Game configuration loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

const EMBEDDED_CONFIG: &str = include_str!("../../data/game.toml");

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Ok(config)
    }

    /// The configuration shipped with the crate.
    pub fn embedded() -> LoadResult<GameConfig> {
        Self::parse(EMBEDDED_CONFIG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_matches_defaults() {
        assert_eq!(ConfigLoader::embedded().unwrap(), GameConfig::default());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("cheat_mode = true\nmax_sp = 5\n").unwrap();
        assert!(config.cheat_mode);
        assert_eq!(config.max_sp, 5);
        assert_eq!(config.predicted_turns, GameConfig::DEFAULT_PREDICTED_TURNS);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let err = ConfigLoader::parse("max_sp = \"lots\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config TOML"));
    }
}
