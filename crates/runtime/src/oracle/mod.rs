//! The content-generation boundary.
//!
//! Every piece of generated content (enemies, AI battle commands, action
//! flavor text, story events, cutscenes, NPC conversations) comes from one of
//! the async traits below. Implementations return raw, untrusted payloads;
//! [`validate`] turns them into core types and applies the documented
//! fallbacks. [`Oracles`] bundles one implementation of each so the rest of
//! the runtime can be handed a single value.
mod offline;
mod payload;
mod request;
mod retry;
pub mod validate;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::OracleResult;

pub use offline::OfflineOracle;
pub use payload::{
    RawBattleCommand, RawCutscene, RawDialogueTree, RawEnemy, RawEvent, RawFinalResponse,
    RawResponse, RawScene, RawSubChapterEvents, RawSummary, RawTrigger, parse_payload,
};
pub use request::{
    BattleCommandRequest, CutsceneRequest, DialogueRequest, EnemyRequest, NpcBrief,
    SubChapterRequest, SummaryRequest,
};
pub use retry::RetryPolicy;

#[async_trait]
pub trait EnemyOracle: Send + Sync {
    async fn generate_enemy(&self, request: &EnemyRequest) -> OracleResult<RawEnemy>;
}

#[async_trait]
pub trait BattleCommandOracle: Send + Sync {
    async fn generate_battle_command(&self, request: &BattleCommandRequest) -> OracleResult<RawBattleCommand>;
}

/// Embellishes plain action narration.
#[async_trait]
pub trait NarrationOracle: Send + Sync {
    async fn generate_action_text(&self, raw_text: &str) -> OracleResult<String>;
}

#[async_trait]
pub trait StoryOracle: Send + Sync {
    async fn generate_sub_chapter_events(&self, request: &SubChapterRequest) -> OracleResult<RawSubChapterEvents>;

    async fn generate_story_so_far(&self, request: &SummaryRequest) -> OracleResult<RawSummary>;
}

#[async_trait]
pub trait DialogueOracle: Send + Sync {
    async fn generate_cutscene(&self, request: &CutsceneRequest) -> OracleResult<RawCutscene>;

    async fn generate_npc_dialogue(&self, request: &DialogueRequest) -> OracleResult<RawDialogueTree>;
}

/// Narration oracle that leaves text as written.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainNarration;

#[async_trait]
impl NarrationOracle for PlainNarration {
    async fn generate_action_text(&self, raw_text: &str) -> OracleResult<String> {
        Ok(raw_text.to_string())
    }
}

/// One implementation of every oracle capability.
#[derive(Clone)]
pub struct Oracles {
    pub(crate) enemies: Arc<dyn EnemyOracle>,
    pub(crate) commands: Arc<dyn BattleCommandOracle>,
    pub(crate) narration: Arc<dyn NarrationOracle>,
    pub(crate) story: Arc<dyn StoryOracle>,
    pub(crate) dialogue: Arc<dyn DialogueOracle>,
}

impl Oracles {
    pub fn new(
        enemies: Arc<dyn EnemyOracle>,
        commands: Arc<dyn BattleCommandOracle>,
        narration: Arc<dyn NarrationOracle>,
        story: Arc<dyn StoryOracle>,
        dialogue: Arc<dyn DialogueOracle>,
    ) -> Self {
        Self {
            enemies,
            commands,
            narration,
            story,
            dialogue,
        }
    }

    /// Uses a single implementation for every capability.
    pub fn uniform<O>(oracle: O) -> Self
    where
        O: EnemyOracle + BattleCommandOracle + NarrationOracle + StoryOracle + DialogueOracle + 'static,
    {
        let shared = Arc::new(oracle);
        Self {
            enemies: shared.clone(),
            commands: shared.clone(),
            narration: shared.clone(),
            story: shared.clone(),
            dialogue: shared,
        }
    }

    /// Deterministic offline content seeded with `seed`.
    pub fn offline(seed: u64) -> Self {
        Self::uniform(OfflineOracle::new(seed))
    }

    #[must_use]
    pub fn with_narration(mut self, narration: Arc<dyn NarrationOracle>) -> Self {
        self.narration = narration;
        self
    }

    #[must_use]
    pub fn with_commands(mut self, commands: Arc<dyn BattleCommandOracle>) -> Self {
        self.commands = commands;
        self
    }

    #[must_use]
    pub fn with_story(mut self, story: Arc<dyn StoryOracle>) -> Self {
        self.story = story;
        self
    }

    #[must_use]
    pub fn with_dialogue(mut self, dialogue: Arc<dyn DialogueOracle>) -> Self {
        self.dialogue = dialogue;
        self
    }

    #[must_use]
    pub fn with_enemies(mut self, enemies: Arc<dyn EnemyOracle>) -> Self {
        self.enemies = enemies;
        self
    }

    pub fn enemies(&self) -> &Arc<dyn EnemyOracle> {
        &self.enemies
    }

    pub fn commands(&self) -> &Arc<dyn BattleCommandOracle> {
        &self.commands
    }

    pub fn narration(&self) -> &Arc<dyn NarrationOracle> {
        &self.narration
    }

    pub fn story(&self) -> &Arc<dyn StoryOracle> {
        &self.story
    }

    pub fn dialogue(&self) -> &Arc<dyn DialogueOracle> {
        &self.dialogue
    }
}

impl std::fmt::Debug for Oracles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oracles").finish_non_exhaustive()
    }
}
