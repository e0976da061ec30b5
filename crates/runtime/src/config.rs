//! Runtime configuration and environment loading.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use game_core::GameConfig;

use crate::oracle::RetryPolicy;

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub game: GameConfig,
    /// Capacity of each event bus topic.
    pub event_buffer_size: usize,
    pub retry: RetryPolicy,
    /// Fixed seed for battle and story rolls. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub session_id: Option<String>,
    /// Directory holding `game.toml`, `spells.ron` and `items.ron`.
    pub content_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            event_buffer_size: 100,
            retry: RetryPolicy::default(),
            seed: None,
            session_id: None,
            content_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `JRPG_EVENT_BUFFER`
    /// - `JRPG_ORACLE_MAX_ATTEMPTS` / `JRPG_ORACLE_BACKOFF_MS`
    /// - `JRPG_CHEAT_MODE`
    /// - `JRPG_SEED`
    /// - `JRPG_SESSION_ID`
    /// - `JRPG_CONFIG_PATH`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("JRPG_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        if let Some(attempts) = read_env::<u32>("JRPG_ORACLE_MAX_ATTEMPTS") {
            config.retry.max_attempts = attempts.max(1);
        }

        if let Some(millis) = read_env::<u64>("JRPG_ORACLE_BACKOFF_MS") {
            config.retry.backoff = Duration::from_millis(millis);
        }

        if let Some(cheat_mode) = read_env_bool("JRPG_CHEAT_MODE") {
            config.game.cheat_mode = cheat_mode;
        }

        config.seed = read_env::<u64>("JRPG_SEED");
        config.session_id = env::var("JRPG_SESSION_ID").ok().filter(|id| !id.is_empty());
        config.content_dir = env::var("JRPG_CONFIG_PATH").ok().map(PathBuf::from);

        config
    }

    #[must_use]
    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Seed for this session, drawn from entropy when none is configured.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_rules() {
        let config = RuntimeConfig::default();
        assert_eq!(config.event_buffer_size, 100);
        assert_eq!(config.game.main_party_limit, 3);
        assert!(config.retry.max_attempts >= 1);
        assert!(config.seed.is_none());
    }

    #[test]
    fn configured_seed_is_used() {
        let config = RuntimeConfig::default().with_seed(42);
        assert_eq!(config.resolve_seed(), 42);
    }
}
