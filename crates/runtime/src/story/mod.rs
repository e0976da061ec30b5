//! Story session: the async half of the story state machine.
//!
//! [`game_core::StoryManager`] owns the queue, trigger matching and the
//! chapter counters. [`StorySession`] wraps it with everything that needs an
//! oracle or a battle: generating sub-chapter events, playing cutscenes,
//! confronting bosses, recruiting allies and summarising the story so far.
//!
//! Encounters live in [`encounter`]; dialogue trees are walked by
//! [`conversation::Conversation`].
pub mod conversation;
mod encounter;

use std::sync::Arc;

use tracing::{debug, info, warn};

use game_content::GameContent;
use game_core::story::StorySummary;
use game_core::{
    BattleRng, CastRegistry, ChapterAdvance, ChapterOverview, EventTiming, LocationPart, NpcKind,
    Party, PcgRng, Progression, StoryEvent, StoryManager, StorySignal,
};

use crate::battle::BattleRunner;
use crate::enemy::EnemyFactory;
use crate::error::{Result, RuntimeError};
use crate::events::{DialogueEvent, EventBus, StoryUpdate};
use crate::oracle::validate::{self, Scene};
use crate::oracle::{CutsceneRequest, Oracles, RetryPolicy, SubChapterRequest, SummaryRequest};

pub use conversation::{Conversation, FirstOption, ResponseChooser, ScriptedChooser};
pub use encounter::{BossResult, RecruitResult};

/// Shown before anything has happened.
pub const JOURNEY_BEGUN: &str = "Your journey has just begun...";

pub struct StorySession {
    story: StoryManager,
    party: Party,
    cast: CastRegistry,
    oracles: Oracles,
    enemies: EnemyFactory,
    runner: BattleRunner,
    chooser: Box<dyn ResponseChooser>,
    content: Arc<GameContent>,
    bus: EventBus,
    retry: RetryPolicy,
    rng: PcgRng,
}

/// Everything a [`StorySession`] needs besides the story and the party.
pub struct SessionParts {
    pub oracles: Oracles,
    pub enemies: EnemyFactory,
    pub runner: BattleRunner,
    pub chooser: Box<dyn ResponseChooser>,
    pub content: Arc<GameContent>,
    pub bus: EventBus,
    pub retry: RetryPolicy,
    pub rng: PcgRng,
}

impl StorySession {
    pub fn new(story: StoryManager, party: Party, parts: SessionParts) -> Self {
        let SessionParts {
            oracles,
            enemies,
            runner,
            chooser,
            content,
            bus,
            retry,
            rng,
        } = parts;
        Self {
            story,
            party,
            cast: CastRegistry::new(),
            oracles,
            enemies,
            runner,
            chooser,
            content,
            bus,
            retry,
            rng,
        }
    }

    #[must_use]
    pub fn with_cast(mut self, cast: CastRegistry) -> Self {
        self.cast = cast;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn story(&self) -> &StoryManager {
        &self.story
    }

    pub fn story_mut(&mut self) -> &mut StoryManager {
        &mut self.story
    }

    pub fn party(&self) -> &Party {
        &self.party
    }

    pub fn party_mut(&mut self) -> &mut Party {
        &mut self.party
    }

    pub fn cast(&self) -> &CastRegistry {
        &self.cast
    }

    pub fn cast_mut(&mut self) -> &mut CastRegistry {
        &mut self.cast
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Hands back the story and party, e.g. for saving.
    pub fn into_parts(self) -> (StoryManager, Party, CastRegistry) {
        (self.story, self.party, self.cast)
    }

    // ========================================================================
    // Trigger Entry Points
    // ========================================================================

    /// Enters a location. Fires the head event if it waits for this arrival.
    pub async fn enter_location(&mut self, location: &str, part: LocationPart) -> Result<Option<StorySignal>> {
        if !self.story.check_location_trigger(location, part) {
            return Ok(None);
        }
        self.trigger_event().await.map(Some)
    }

    pub async fn inspect_landmark(&mut self, landmark: &str, part: LocationPart) -> Result<Option<StorySignal>> {
        if !self.story.check_landmark_trigger(landmark, part) {
            return Ok(None);
        }
        self.trigger_event().await.map(Some)
    }

    /// Talks to a known NPC. Unknown names never fire anything.
    pub async fn talk_to(&mut self, npc: &str, part: LocationPart) -> Result<Option<StorySignal>> {
        let Some(kind) = self.cast.get(npc).map(|npc| npc.kind) else {
            return Ok(None);
        };
        if !self.story.check_npc_trigger(npc, kind, part) {
            return Ok(None);
        }
        self.trigger_event().await.map(Some)
    }

    // ========================================================================
    // Event Execution
    // ========================================================================

    /// Runs the head event: opening cutscene, then for boss and ally events
    /// the encounter and a closing cutscene. The head moves to the past only
    /// once the event has played out; a fled boss fight or a failed
    /// recruitment leaves it queued.
    pub async fn trigger_event(&mut self) -> Result<StorySignal> {
        let event = self.story.next_event().cloned().ok_or(RuntimeError::NoPendingEvent)?;
        let kind = event.trigger.kind;
        info!(trigger = %kind, value = %event.trigger.value, "story event triggered");
        self.bus.publish(StoryUpdate::EventTriggered {
            trigger: event.trigger.clone(),
            text: event.event_text.clone(),
        });

        let characters = self.scene_cast(&event);
        self.play_cutscene(&event, &characters, event.opening_timing()).await?;

        if kind.is_encounter() {
            let npc = self.cast.get(&event.trigger.value).map(|npc| (npc.name.clone(), npc.kind));
            match npc {
                Some((name, NpcKind::Ally)) => {
                    if self.recruit_ally(&name, &event).await? == RecruitResult::Declined {
                        return Ok(StorySignal::None);
                    }
                }
                Some((name, NpcKind::Boss)) => match self.confront_boss(&name, false).await? {
                    BossResult::Defeated => {}
                    BossResult::PartyDefeated => {
                        self.bus.publish(StoryUpdate::Signal(StorySignal::GameOver));
                        return Ok(StorySignal::GameOver);
                    }
                    BossResult::Retreated => return Ok(StorySignal::None),
                },
                Some((name, other)) => {
                    warn!(npc = %name, kind = %other, trigger = %kind, "encounter npc has the wrong kind");
                }
                None => warn!(npc = %event.trigger.value, "encounter npc is not in the cast"),
            }
            self.play_cutscene(&event, &characters, EventTiming::AfterEvent).await?;
        }

        if let Some(done) = self.story.complete_head() {
            self.bus.publish(StoryUpdate::EventCompleted {
                trigger: done.trigger.clone(),
            });
        }
        Ok(StorySignal::None)
    }

    /// Party members first, then the NPC the event is about.
    fn scene_cast(&self, event: &StoryEvent) -> Vec<String> {
        let mut cast: Vec<String> = self
            .party
            .members
            .iter()
            .chain(&self.party.backup)
            .map(|member| format!("{} (ALLY - {})", member.name, member.description))
            .collect();
        if event.trigger.kind.involves_npc()
            && let Some(npc) = self.cast.get(&event.trigger.value)
        {
            cast.push(npc.scene_label());
        }
        cast
    }

    /// Generates and publishes a cutscene. Speakers nobody has met yet join
    /// the cast as story NPCs.
    pub async fn play_cutscene(&mut self, event: &StoryEvent, characters: &[String], timing: EventTiming) -> Result<()> {
        let request = CutsceneRequest {
            event_text: event.event_text.clone(),
            characters: characters.to_vec(),
            location: event.location.clone(),
            past_events: self.past_event_texts(),
            story_level: self.story.story_level(),
            thematic_style: self.story.thematic_style().to_string(),
            length: timing.conversation_length(),
            timing,
        };
        let oracle = self.oracles.dialogue();
        let request = &request;
        let raw = self
            .retry
            .run("generate_cutscene", move || oracle.generate_cutscene(request))
            .await?;

        for scene in validate::cutscene(raw) {
            if let Scene::Dialogue { speaker, text } = &scene {
                self.discover_npc(speaker, text, event);
            }
            self.bus.publish(DialogueEvent::Line {
                speaker: scene.speaker().map(str::to_string),
                text: scene.text().to_string(),
            });
        }
        Ok(())
    }

    fn discover_npc(&mut self, speaker: &str, line: &str, event: &StoryEvent) {
        if self.cast.contains(speaker) || self.party.get(speaker).is_some() {
            return;
        }
        debug!(npc = speaker, location = %event.location.name, "new npc from cutscene");
        self.cast.add(game_core::Npc::new(
            speaker,
            line,
            NpcKind::Story,
            event.location.clone(),
            1,
        ));
        self.bus.publish(DialogueEvent::NpcDiscovered {
            name: speaker.to_string(),
        });
    }

    // ========================================================================
    // Progression
    // ========================================================================

    /// Starts a chapter from its outline and queues the first sub-chapter.
    pub async fn begin_chapter(&mut self, overview: ChapterOverview) -> Result<usize> {
        let chapter = self.story.current_chapter();
        info!(chapter, title = %overview.title, "chapter started");
        self.story.add_chapter_overview(overview);
        self.bus.publish(StoryUpdate::ChapterStarted { chapter });
        self.generate_sub_chapter_events().await
    }

    /// Call once the head event has been consumed. Queues the next
    /// sub-chapter when the current one is exhausted.
    pub async fn progress(&mut self) -> Result<StorySignal> {
        match self.story.progress() {
            Progression::Pending => Ok(StorySignal::None),
            Progression::NextSubChapter { .. } => {
                self.generate_sub_chapter_events().await?;
                Ok(StorySignal::None)
            }
            Progression::ChapterComplete => {
                info!(chapter = self.story.current_chapter(), "chapter complete");
                self.bus.publish(StoryUpdate::Signal(StorySignal::ChapterComplete));
                Ok(StorySignal::ChapterComplete)
            }
        }
    }

    /// Closes the current chapter. The caller supplies the next outline via
    /// [`Self::begin_chapter`].
    pub fn complete_chapter(&mut self) -> ChapterAdvance {
        let advance = self.story.advance_chapter();
        if advance == ChapterAdvance::GameComplete {
            info!("story complete");
            self.bus.publish(StoryUpdate::Signal(StorySignal::GameComplete));
        }
        advance
    }

    /// Asks the story oracle for the current sub-chapter's events and queues
    /// them. Returns how many were queued.
    pub async fn generate_sub_chapter_events(&mut self) -> Result<usize> {
        let chapter = self.story.current_chapter();
        let sub_chapter = self.story.current_sub_chapter();
        let request = SubChapterRequest {
            chapter,
            sub_chapter,
            thematic_style: self.story.thematic_style().to_string(),
            chapter_overview: self.story.current_chapter_outline().cloned(),
            outline: self.story.current_sub_chapter_outline().cloned(),
            past_events: self.past_event_texts(),
        };
        let oracle = self.oracles.story();
        let request = &request;
        let raw = self
            .retry
            .run("generate_sub_chapter_events", move || oracle.generate_sub_chapter_events(request))
            .await?;

        let drafts = validate::sub_chapter_events(raw);
        let events = drafts.len();
        self.story.add_sub_chapter_events(drafts);
        debug!(chapter, sub_chapter, events, "sub-chapter events queued");
        self.bus.publish(StoryUpdate::SubChapterStarted {
            chapter,
            sub_chapter,
            events,
        });
        Ok(events)
    }

    // ========================================================================
    // Story So Far
    // ========================================================================

    /// Summary of the past events, regenerated only when new events have
    /// been recorded since the last call.
    pub async fn story_so_far(&mut self) -> Result<String> {
        match self.story.story_so_far() {
            StorySummary::JustBegun => return Ok(JOURNEY_BEGUN.to_string()),
            StorySummary::Cached(text) => return Ok(text.to_string()),
            StorySummary::Stale => {}
        }

        let request = SummaryRequest {
            past_events: self.story.past_events().to_vec(),
            thematic_style: self.story.thematic_style().to_string(),
        };
        let oracle = self.oracles.story();
        let request = &request;
        let raw = self
            .retry
            .run("generate_story_so_far", move || oracle.generate_story_so_far(request))
            .await?;

        let summary = raw.summary.trim();
        if summary.is_empty() {
            return Err(RuntimeError::InvalidPayload {
                operation: "generate_story_so_far",
                reason: "empty summary".to_string(),
            });
        }
        self.story.cache_summary(summary);
        Ok(summary.to_string())
    }

    fn past_event_texts(&self) -> Vec<String> {
        self.story
            .past_events()
            .iter()
            .map(|event| event.event_text.clone())
            .collect()
    }

    /// Derives an independent rng for one battle.
    fn fork_rng(&mut self) -> PcgRng {
        let high = u64::from(self.rng.next_u32());
        let low = u64::from(self.rng.next_u32());
        PcgRng::new((high << 32) | low)
    }
}

impl std::fmt::Debug for StorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorySession")
            .field("chapter", &self.story.current_chapter())
            .field("sub_chapter", &self.story.current_sub_chapter())
            .field("pending_events", &self.story.future_events().len())
            .field("party", &self.party.names())
            .finish_non_exhaustive()
    }
}

