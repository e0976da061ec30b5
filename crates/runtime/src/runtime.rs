//! Composition root for battles and story sessions.
//!
//! [`Runtime`] holds the shared pieces (configuration, content catalogs,
//! oracles and the event bus) and hands out wired-up battle runners and
//! story sessions.
use std::sync::Arc;

use tracing::info;

use game_content::{ContentFactory, GameContent};
use game_core::{BattleRng, Party, PcgRng, StoryManager};

use crate::battle::BattleRunner;
use crate::config::RuntimeConfig;
use crate::controller::{Controller, OracleController};
use crate::enemy::EnemyFactory;
use crate::error::{Result, RuntimeError};
use crate::events::EventBus;
use crate::oracle::Oracles;
use crate::story::{ResponseChooser, SessionParts, StorySession};

pub struct Runtime {
    config: RuntimeConfig,
    content: Arc<GameContent>,
    oracles: Oracles,
    bus: EventBus,
    rng: PcgRng,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn content(&self) -> &Arc<GameContent> {
        &self.content
    }

    pub fn oracles(&self) -> &Oracles {
        &self.oracles
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// A fresh rng derived from the session seed.
    pub fn fork_rng(&mut self) -> PcgRng {
        let high = u64::from(self.rng.next_u32());
        let low = u64::from(self.rng.next_u32());
        PcgRng::new((high << 32) | low)
    }

    pub fn enemy_factory(&self) -> EnemyFactory {
        EnemyFactory::new(
            Arc::clone(self.oracles.enemies()),
            Arc::clone(&self.content),
            self.config.retry,
        )
    }

    /// AI controller for the enemy side.
    pub fn enemy_controller(&self) -> OracleController {
        OracleController::new(Arc::clone(self.oracles.commands()), self.config.retry)
    }

    /// Runner with oracle-driven enemies and the narration oracle.
    pub fn battle_runner(&self, players: impl Controller + 'static) -> BattleRunner {
        BattleRunner::new(players, self.enemy_controller(), self.config.game.clone(), self.bus.clone())
            .with_narration(Arc::clone(self.oracles.narration()))
    }

    /// An empty story with the configured chapter count.
    pub fn new_story(&self, thematic_style: impl Into<String>, currency_name: impl Into<String>) -> StoryManager {
        StoryManager::new(thematic_style, currency_name).with_total_chapters(self.config.game.total_chapters as usize)
    }

    pub fn story_session(
        &mut self,
        story: StoryManager,
        party: Party,
        players: impl Controller + 'static,
        chooser: impl ResponseChooser + 'static,
    ) -> StorySession {
        let parts = SessionParts {
            oracles: self.oracles.clone(),
            enemies: self.enemy_factory(),
            runner: self.battle_runner(players),
            chooser: Box::new(chooser),
            content: Arc::clone(&self.content),
            bus: self.bus.clone(),
            retry: self.config.retry,
            rng: self.fork_rng(),
        };
        StorySession::new(story, party, parts)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("oracles", &self.oracles)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Runtime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    content: Option<GameContent>,
    oracles: Option<Oracles>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use already-loaded catalogs instead of reading `content_dir`.
    pub fn content(mut self, content: GameContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Set required oracle bundle
    pub fn oracles(mut self, oracles: Oracles) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Content comes from, in order: [`Self::content`], the configured
    /// content directory, the embedded catalogs. A `game.toml` read from the
    /// content directory replaces the configured rules (cheat mode stays on
    /// if either enables it); otherwise the configured rules win.
    pub fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;
        let mut config = self.config;

        let mut content = match (self.content, &config.content_dir) {
            (Some(content), _) => content,
            (None, Some(dir)) => {
                let content = ContentFactory::new(dir.clone())
                    .load_all()
                    .map_err(RuntimeError::Content)?;
                let cheat_mode = config.game.cheat_mode || content.config.cheat_mode;
                config.game = content.config.clone();
                config.game.cheat_mode = cheat_mode;
                content
            }
            (None, None) => GameContent::embedded().map_err(RuntimeError::Content)?,
        };
        content.config = config.game.clone();

        let seed = config.resolve_seed();
        info!(
            seed,
            spells = content.spells.len(),
            items = content.items.len(),
            session = config.session_id.as_deref().unwrap_or("-"),
            "runtime ready"
        );

        Ok(Runtime {
            bus: EventBus::with_capacity(config.event_buffer_size),
            rng: PcgRng::new(seed),
            content: Arc::new(content),
            oracles,
            config,
        })
    }
}
