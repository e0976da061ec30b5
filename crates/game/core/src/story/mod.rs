//! Story progression: the event queue, trigger matching and chapter flow.
//!
//! Executing an event (cutscenes, boss battles, recruitment dialogue) needs
//! oracles and lives in the runtime; this module only decides *whether* an
//! event fires and what comes next.

pub mod chapter;
pub mod event;
pub mod manager;

pub use chapter::{ChapterAdvance, ChapterOverview, Feature, Progression, StorySignal, SubChapter};
pub use event::{
    ConversationLength, EventTiming, LocationPart, StoryEvent, StoryLocation, Trigger, TriggerType,
};
pub use manager::{DEFAULT_CURRENCY_NAME, EventDraft, JOURNEY_BEGINS, StoryManager, StorySummary};
