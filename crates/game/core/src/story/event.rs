//! Story events and their triggers.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::warn;

/// What the player has to do to fire an event.
///
/// `BossDefeated` only appears on past-event records written after a boss
/// confrontation; generated events never carry it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TriggerType {
    LocationEntered,
    LandmarkInspected,
    StoryExposition,
    BossConfronted,
    AllyRecruited,
    BossDefeated,
}

impl TriggerType {
    /// Parses generated content. Unknown types fall back to `location_entered`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_else(|_| {
            warn!(target: "game_core::story", raw, "unknown trigger type, using location_entered");
            TriggerType::LocationEntered
        })
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Boss and ally events stage a confrontation between two cutscenes.
    pub const fn is_encounter(self) -> bool {
        matches!(self, TriggerType::BossConfronted | TriggerType::AllyRecruited)
    }

    /// Triggers fired by talking to an NPC.
    pub const fn involves_npc(self) -> bool {
        matches!(
            self,
            TriggerType::StoryExposition | TriggerType::BossConfronted | TriggerType::AllyRecruited
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trigger {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: TriggerType,
    pub value: String,
}

impl Trigger {
    pub fn new(kind: TriggerType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Type equality plus case-insensitive value equality.
    pub fn matches(&self, kind: TriggerType, value: &str) -> bool {
        self.kind == kind && self.value.to_lowercase() == value.to_lowercase()
    }
}

/// Where an event takes place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoryLocation {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
}

impl StoryLocation {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoryEvent {
    pub location: StoryLocation,
    pub event_text: String,
    pub trigger: Trigger,
    #[cfg_attr(feature = "serde", serde(default))]
    pub completed: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trigger_hint: Option<String>,
}

impl StoryEvent {
    pub fn new(location: StoryLocation, event_text: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            location,
            event_text: event_text.into(),
            trigger,
            completed: false,
            trigger_hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.trigger_hint = Some(hint.into());
        self
    }

    /// Cutscene timing for the opening scene of this event.
    pub fn opening_timing(&self) -> EventTiming {
        if self.trigger.kind.is_encounter() {
            EventTiming::BeforeEvent
        } else {
            EventTiming::DuringEvent
        }
    }
}

/// When a cutscene plays relative to its event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum EventTiming {
    BeforeEvent,
    DuringEvent,
    AfterEvent,
}

impl EventTiming {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Scenes that bracket an encounter stay short.
    pub const fn conversation_length(self) -> ConversationLength {
        match self {
            EventTiming::DuringEvent => ConversationLength::Long,
            EventTiming::BeforeEvent | EventTiming::AfterEvent => ConversationLength::Short,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ConversationLength {
    Short,
    Long,
}

/// Half of a location a player is exploring. Location triggers fire on
/// arrival (part A); NPC encounters happen deeper in (part B).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocationPart {
    A,
    B,
}
