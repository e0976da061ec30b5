//! The story event queue and trigger matcher.
//!
//! Only the head of `future_events` is ever eligible. Exploration code asks
//! whether an action satisfies it; the story session then stages the event
//! and calls [`StoryManager::complete_head`].

use tracing::{debug, warn};

use super::chapter::{ChapterAdvance, ChapterOverview, Progression, SubChapter};
use super::event::{LocationPart, StoryEvent, StoryLocation, Trigger, TriggerType};
use crate::config::GameConfig;
use crate::npc::NpcKind;

pub const DEFAULT_CURRENCY_NAME: &str = "Gold";

/// Summary shown before any event has been completed.
pub const JOURNEY_BEGINS: &str = "Your journey has just begun...";

/// A generated event before it is placed at a location.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventDraft {
    pub event_text: String,
    pub trigger: Trigger,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trigger_hint: Option<String>,
}

/// How to answer a "story so far" request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorySummary<'a> {
    /// Nothing has happened yet.
    JustBegun,
    /// The cached summary still covers every past event.
    Cached(&'a str),
    /// Past events changed since the last summary; generate a new one.
    Stale,
}

impl StorySummary<'_> {
    /// Text to show, when no generation is needed.
    pub fn text(&self) -> Option<&str> {
        match self {
            StorySummary::JustBegun => Some(JOURNEY_BEGINS),
            StorySummary::Cached(text) => Some(text),
            StorySummary::Stale => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct SummaryCache {
    event_count: usize,
    text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoryManager {
    past_events: Vec<StoryEvent>,
    future_events: Vec<StoryEvent>,
    chapter_overviews: Vec<ChapterOverview>,
    current_chapter: usize,
    current_sub_chapter: usize,
    total_chapters: usize,
    thematic_style: String,
    currency_name: String,
    summary: Option<SummaryCache>,
}

impl Default for StoryManager {
    fn default() -> Self {
        Self::new("", DEFAULT_CURRENCY_NAME)
    }
}

impl StoryManager {
    pub fn new(thematic_style: impl Into<String>, currency_name: impl Into<String>) -> Self {
        Self {
            past_events: Vec::new(),
            future_events: Vec::new(),
            chapter_overviews: Vec::new(),
            current_chapter: 0,
            current_sub_chapter: 0,
            total_chapters: GameConfig::DEFAULT_TOTAL_CHAPTERS as usize,
            thematic_style: thematic_style.into(),
            currency_name: currency_name.into(),
            summary: None,
        }
    }

    #[must_use]
    pub fn with_total_chapters(mut self, total: usize) -> Self {
        self.total_chapters = total.max(1);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn past_events(&self) -> &[StoryEvent] {
        &self.past_events
    }

    pub fn future_events(&self) -> &[StoryEvent] {
        &self.future_events
    }

    pub fn chapter_overviews(&self) -> &[ChapterOverview] {
        &self.chapter_overviews
    }

    pub fn current_chapter(&self) -> usize {
        self.current_chapter
    }

    pub fn current_sub_chapter(&self) -> usize {
        self.current_sub_chapter
    }

    pub fn total_chapters(&self) -> usize {
        self.total_chapters
    }

    pub fn thematic_style(&self) -> &str {
        &self.thematic_style
    }

    pub fn currency_name(&self) -> &str {
        &self.currency_name
    }

    /// Number of completed events; cutscenes use it as the story level.
    pub fn story_level(&self) -> usize {
        self.past_events.len()
    }

    /// The only event that can currently fire.
    pub fn next_event(&self) -> Option<&StoryEvent> {
        self.future_events.first()
    }

    pub fn current_chapter_outline(&self) -> Option<&ChapterOverview> {
        self.chapter_overviews.get(self.current_chapter)
    }

    pub fn current_sub_chapter_outline(&self) -> Option<&SubChapter> {
        self.current_chapter_outline()?
            .sub_chapters
            .get(self.current_sub_chapter)
    }

    // ========================================================================
    // Queue Management
    // ========================================================================

    pub fn add_future_event(&mut self, event: StoryEvent) {
        self.future_events.push(event);
    }

    /// Records something that already happened, such as a defeated boss.
    pub fn add_past_event(&mut self, event: StoryEvent) {
        self.past_events.push(event);
    }

    pub fn record(&mut self, location: StoryLocation, event_text: impl Into<String>, trigger: Trigger) {
        let mut event = StoryEvent::new(location, event_text, trigger);
        event.completed = true;
        self.add_past_event(event);
    }

    pub fn add_chapter_overview(&mut self, overview: ChapterOverview) {
        self.chapter_overviews.push(overview);
    }

    /// Queues generated events at the current sub-chapter's location.
    pub fn add_sub_chapter_events(&mut self, drafts: Vec<EventDraft>) {
        let location = match self.current_sub_chapter_outline() {
            Some(outline) => outline.location.clone(),
            None => {
                warn!(
                    target: "game_core::story",
                    chapter = self.current_chapter,
                    sub_chapter = self.current_sub_chapter,
                    "no outline for current sub-chapter"
                );
                StoryLocation::default()
            }
        };
        for draft in drafts {
            self.future_events.push(StoryEvent {
                location: location.clone(),
                event_text: draft.event_text,
                trigger: draft.trigger,
                completed: false,
                trigger_hint: draft.trigger_hint,
            });
        }
    }

    /// Marks the head complete and moves it to the past.
    pub fn complete_head(&mut self) -> Option<&StoryEvent> {
        if self.future_events.is_empty() {
            return None;
        }
        let mut event = self.future_events.remove(0);
        event.completed = true;
        debug!(target: "game_core::story", trigger = %event.trigger.kind, value = %event.trigger.value, "event completed");
        self.past_events.push(event);
        self.past_events.last()
    }

    // ========================================================================
    // Trigger Matching
    // ========================================================================

    pub fn check_trigger(&self, kind: TriggerType, value: &str) -> bool {
        self.next_event()
            .is_some_and(|event| event.trigger.matches(kind, value))
    }

    /// Location triggers fire on arrival only. A trailing " (…)" qualifier on
    /// the location name is ignored.
    pub fn check_location_trigger(&self, location: &str, part: LocationPart) -> bool {
        match part {
            LocationPart::A => {
                let name = location.split(" (").next().unwrap_or(location);
                self.check_trigger(TriggerType::LocationEntered, name)
            }
            LocationPart::B => false,
        }
    }

    /// Landmarks sit in part B with the NPCs.
    pub fn check_landmark_trigger(&self, landmark: &str, part: LocationPart) -> bool {
        part == LocationPart::B && self.check_trigger(TriggerType::LandmarkInspected, landmark)
    }

    /// NPC triggers fire in part B only. Bosses and allies may also carry
    /// plain exposition events.
    pub fn check_npc_trigger(&self, npc: &str, kind: NpcKind, part: LocationPart) -> bool {
        if part == LocationPart::A {
            return false;
        }
        let specific = match kind {
            NpcKind::Boss => self.check_boss_trigger(npc),
            NpcKind::Ally => self.check_ally_trigger(npc),
            _ => false,
        };
        specific || self.check_trigger(TriggerType::StoryExposition, npc)
    }

    pub fn check_boss_trigger(&self, boss: &str) -> bool {
        self.check_trigger(TriggerType::BossConfronted, boss)
    }

    pub fn check_ally_trigger(&self, ally: &str) -> bool {
        self.check_trigger(TriggerType::AllyRecruited, ally)
    }

    // ========================================================================
    // Progression
    // ========================================================================

    /// Moves to the next sub-chapter once the queue drains.
    pub fn progress(&mut self) -> Progression {
        if !self.future_events.is_empty() {
            return Progression::Pending;
        }
        let sub_chapters = self
            .current_chapter_outline()
            .map_or(0, |outline| outline.sub_chapters.len());
        if self.current_sub_chapter + 1 < sub_chapters {
            self.current_sub_chapter += 1;
            debug!(
                target: "game_core::story",
                chapter = self.current_chapter,
                sub_chapter = self.current_sub_chapter,
                "advanced sub-chapter"
            );
            Progression::NextSubChapter {
                chapter: self.current_chapter,
                sub_chapter: self.current_sub_chapter,
            }
        } else {
            Progression::ChapterComplete
        }
    }

    /// Closes the current chapter.
    pub fn advance_chapter(&mut self) -> ChapterAdvance {
        if self.current_chapter + 1 >= self.total_chapters {
            return ChapterAdvance::GameComplete;
        }
        self.current_chapter += 1;
        self.current_sub_chapter = 0;
        ChapterAdvance::Next(self.current_chapter)
    }

    // ========================================================================
    // Story So Far
    // ========================================================================

    pub fn story_so_far(&self) -> StorySummary<'_> {
        match &self.summary {
            Some(cache) if cache.event_count == self.past_events.len() => StorySummary::Cached(&cache.text),
            _ if self.past_events.is_empty() => StorySummary::JustBegun,
            _ => StorySummary::Stale,
        }
    }

    /// Stores a freshly generated summary for the current past events.
    pub fn cache_summary(&mut self, text: impl Into<String>) {
        self.summary = Some(SummaryCache {
            event_count: self.past_events.len(),
            text: text.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meadow() -> StoryLocation {
        StoryLocation::new("Willow Meadow", "Tall grass")
    }

    fn event(kind: TriggerType, value: &str) -> StoryEvent {
        StoryEvent::new(meadow(), format!("{kind} {value}"), Trigger::new(kind, value))
    }

    fn outline(sub_chapters: usize) -> ChapterOverview {
        ChapterOverview {
            title: "The Long Road".into(),
            overview: String::new(),
            sub_chapters: (0..sub_chapters)
                .map(|i| SubChapter {
                    overview: format!("part {i}"),
                    location: StoryLocation::new(format!("Stop {i}"), ""),
                    npc: None,
                    landmark: None,
                })
                .collect(),
        }
    }

    #[test]
    fn only_head_is_eligible() {
        let mut story = StoryManager::default();
        story.add_future_event(event(TriggerType::LandmarkInspected, "Old Well"));
        story.add_future_event(event(TriggerType::LocationEntered, "Ashford"));

        assert!(story.check_landmark_trigger("old well", LocationPart::B));
        assert!(!story.check_landmark_trigger("old well", LocationPart::A));
        assert!(!story.check_location_trigger("Ashford", LocationPart::A));

        story.complete_head();
        assert!(story.check_location_trigger("Ashford", LocationPart::A));
        assert!(story.past_events()[0].completed);
    }

    #[test]
    fn location_triggers_strip_qualifier_in_part_a() {
        let mut story = StoryManager::default();
        story.add_future_event(event(TriggerType::LocationEntered, "Ashford"));
        assert!(story.check_location_trigger("Ashford (Market District)", LocationPart::A));
        assert!(!story.check_location_trigger("Ashford", LocationPart::B));
    }

    #[test]
    fn npc_triggers_fall_back_to_exposition() {
        let mut story = StoryManager::default();
        story.add_future_event(event(TriggerType::StoryExposition, "Warden"));
        assert!(story.check_npc_trigger("Warden", NpcKind::Boss, LocationPart::B));
        assert!(!story.check_npc_trigger("Warden", NpcKind::Boss, LocationPart::A));
        assert!(!story.check_boss_trigger("Warden"));

        let mut story = StoryManager::default();
        story.add_future_event(event(TriggerType::AllyRecruited, "Pell"));
        assert!(story.check_npc_trigger("pell", NpcKind::Ally, LocationPart::B));
        assert!(!story.check_npc_trigger("Pell", NpcKind::Story, LocationPart::B));
    }

    #[test]
    fn empty_queue_matches_nothing() {
        let mut story = StoryManager::default();
        assert!(!story.check_trigger(TriggerType::LocationEntered, "anywhere"));
        assert!(story.complete_head().is_none());
    }

    #[test]
    fn drafts_take_sub_chapter_location() {
        let mut story = StoryManager::default();
        story.add_chapter_overview(outline(2));
        story.add_sub_chapter_events(vec![EventDraft {
            event_text: "A stranger waits".into(),
            trigger: Trigger::new(TriggerType::StoryExposition, "Stranger"),
            trigger_hint: Some("Talk to the stranger".into()),
        }]);
        let head = story.next_event().unwrap();
        assert_eq!(head.location.name, "Stop 0");
        assert_eq!(head.trigger_hint.as_deref(), Some("Talk to the stranger"));
    }

    #[test]
    fn progression_walks_sub_chapters_then_chapters() {
        let mut story = StoryManager::default().with_total_chapters(2);
        story.add_chapter_overview(outline(2));
        story.add_future_event(event(TriggerType::LocationEntered, "Stop 0"));

        assert_eq!(story.progress(), Progression::Pending);
        story.complete_head();
        assert_eq!(
            story.progress(),
            Progression::NextSubChapter {
                chapter: 0,
                sub_chapter: 1
            }
        );
        assert_eq!(story.progress(), Progression::ChapterComplete);
        assert_eq!(story.progress().signal().as_str(), "chapter_complete");

        assert_eq!(story.advance_chapter(), ChapterAdvance::Next(1));
        assert_eq!(story.current_sub_chapter(), 0);
        assert_eq!(story.advance_chapter(), ChapterAdvance::GameComplete);
        assert_eq!(story.current_chapter(), 1);
    }

    #[test]
    fn summary_cache_tracks_past_event_count() {
        let mut story = StoryManager::default();
        assert_eq!(story.story_so_far().text(), Some(JOURNEY_BEGINS));

        story.record(meadow(), "The Warden has been defeated!", Trigger::new(TriggerType::BossDefeated, "Warden"));
        assert_eq!(story.story_so_far(), StorySummary::Stale);

        story.cache_summary("You felled the Warden.");
        assert_eq!(story.story_so_far(), StorySummary::Cached("You felled the Warden."));

        story.record(meadow(), "Pell has joined your party!", Trigger::new(TriggerType::AllyRecruited, "Pell"));
        assert_eq!(story.story_so_far(), StorySummary::Stale);
    }
}
