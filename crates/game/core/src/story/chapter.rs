//! Chapter outlines and progression signals.

use strum::{Display, EnumString, IntoStaticStr};

use super::event::StoryLocation;

/// Named cast member or landmark a sub-chapter makes available.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feature {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
}

impl Feature {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubChapter {
    pub overview: String,
    pub location: StoryLocation,
    #[cfg_attr(feature = "serde", serde(default))]
    pub npc: Option<Feature>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub landmark: Option<Feature>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChapterOverview {
    pub title: String,
    pub overview: String,
    pub sub_chapters: Vec<SubChapter>,
}

/// Signals the story flow reports to its driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum StorySignal {
    #[default]
    None,
    ChapterComplete,
    GameOver,
    GameComplete,
}

impl StorySignal {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// What happens once the head of the queue has been consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Progression {
    /// Events remain in the queue.
    Pending,
    /// The next sub-chapter is now current; its events must be generated.
    NextSubChapter { chapter: usize, sub_chapter: usize },
    /// The last sub-chapter of the chapter is done.
    ChapterComplete,
}

impl Progression {
    pub fn signal(&self) -> StorySignal {
        match self {
            Progression::ChapterComplete => StorySignal::ChapterComplete,
            Progression::Pending | Progression::NextSubChapter { .. } => StorySignal::None,
        }
    }
}

/// Result of closing out a chapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChapterAdvance {
    /// Zero-based index of the chapter that just became current.
    Next(usize),
    GameComplete,
}
