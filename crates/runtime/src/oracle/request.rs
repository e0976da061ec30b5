//! Structured requests handed to oracles.
//!
//! Adapters that talk to a language model render these into prompts; the
//! offline oracle reads them directly.
use serde::Serialize;

use game_core::battle::DecisionContext;
use game_core::story::{ChapterOverview, ConversationLength, EventTiming, SubChapter};
use game_core::{DialogueOutcome, EnemyKind, Npc, NpcKind, StoryEvent, StoryLocation};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnemyRequest {
    pub level: u32,
    pub kind: EnemyKind,
    pub location: StoryLocation,
    /// Spell names the enemy may pick from.
    pub spells: Vec<String>,
    pub elements: Vec<String>,
    /// Name and description to build on; empty for fresh enemies.
    pub base_name: String,
    pub base_description: String,
}

/// Battle context for an AI-controlled combatant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BattleCommandRequest {
    pub context: DecisionContext,
    pub previous_action: Option<String>,
}

impl BattleCommandRequest {
    /// The serialized context sent to a language model.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubChapterRequest {
    pub chapter: usize,
    pub sub_chapter: usize,
    pub thematic_style: String,
    pub chapter_overview: Option<ChapterOverview>,
    pub outline: Option<SubChapter>,
    pub past_events: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryRequest {
    pub past_events: Vec<StoryEvent>,
    pub thematic_style: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CutsceneRequest {
    pub event_text: String,
    /// "Name (kind - description)" for everyone in the scene.
    pub characters: Vec<String>,
    pub location: StoryLocation,
    pub past_events: Vec<String>,
    pub story_level: usize,
    pub thematic_style: String,
    pub length: ConversationLength,
    pub timing: EventTiming,
}

/// The parts of an NPC a conversation prompt needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NpcBrief {
    pub name: String,
    pub description: String,
    pub kind: NpcKind,
}

impl From<&Npc> for NpcBrief {
    fn from(npc: &Npc) -> Self {
        Self {
            name: npc.name.clone(),
            description: npc.description.clone(),
            kind: npc.kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DialogueRequest {
    pub npc: NpcBrief,
    /// Hint text of the event driving the conversation.
    pub event_context: String,
    pub valid_outcomes: Vec<DialogueOutcome>,
    pub player_name: String,
    pub player_description: String,
    pub location: StoryLocation,
}
