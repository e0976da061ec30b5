//! Typed payloads carried on each bus topic.
use serde::{Deserialize, Serialize};

use game_core::{BattleOutcome, BattleRewards, LogEntry, StorySignal, Trigger};

/// Battle lifecycle and narration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    Started {
        battle_type: String,
        enemies: Vec<String>,
    },
    TurnStarted {
        actor: String,
        turn_order: Vec<String>,
    },
    /// A log entry, after optional embellishment by the narration oracle.
    Narration(LogEntry),
    Ended {
        outcome: BattleOutcome,
        rewards: Option<BattleRewards>,
    },
}

/// Story queue movement and progression signals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryUpdate {
    EventTriggered {
        trigger: Trigger,
        text: String,
    },
    EventCompleted {
        trigger: Trigger,
    },
    /// Events for a new sub-chapter were queued.
    SubChapterStarted {
        chapter: usize,
        sub_chapter: usize,
        events: usize,
    },
    ChapterStarted {
        chapter: usize,
    },
    Signal(StorySignal),
}

/// Cutscene lines and cast changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueEvent {
    Line {
        /// `None` for narration.
        speaker: Option<String>,
        text: String,
    },
    NpcDiscovered {
        name: String,
    },
    Recruited {
        name: String,
    },
}
