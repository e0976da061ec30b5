//! Non-player characters and the cast registry.
//!
//! The registry is an owned value handed to whoever needs it; there is no
//! process-wide cast.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::ability::BaseClass;
use crate::story::StoryLocation;

/// Levels a boss sits above the story level it was introduced at.
pub const BOSS_LEVEL_BONUS: u32 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NpcKind {
    #[default]
    Story,
    Shop,
    Innkeeper,
    Enemy,
    Ally,
    Boss,
}

impl NpcKind {
    /// Unknown kinds become story NPCs.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Conversation outcomes a dialogue with this kind of NPC may end in.
    pub fn valid_outcomes(self) -> Vec<DialogueOutcome> {
        let mut outcomes = vec![DialogueOutcome::End];
        outcomes.extend_from_slice(match self {
            NpcKind::Story => &[DialogueOutcome::End, DialogueOutcome::InfoObtained],
            NpcKind::Shop => &[DialogueOutcome::End, DialogueOutcome::ShopDiscount],
            NpcKind::Innkeeper => &[DialogueOutcome::End, DialogueOutcome::RestDiscount],
            NpcKind::Enemy | NpcKind::Boss => &[DialogueOutcome::Battle, DialogueOutcome::BattleIntimidated],
            NpcKind::Ally => &[DialogueOutcome::RecruitFailure, DialogueOutcome::RecruitSuccess],
        });
        outcomes.dedup();
        outcomes
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DialogueOutcome {
    End,
    InfoObtained,
    ShopDiscount,
    RestDiscount,
    Battle,
    BattleIntimidated,
    RecruitFailure,
    RecruitSuccess,
}

impl DialogueOutcome {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Validates a generated outcome against what `kind` allows. Anything else
    /// collapses to the kind's most conservative ending.
    pub fn validate(raw: &str, kind: NpcKind) -> Self {
        let fallback = match kind {
            NpcKind::Ally => DialogueOutcome::RecruitFailure,
            _ => DialogueOutcome::End,
        };
        match raw.trim().parse::<DialogueOutcome>() {
            Ok(outcome) if kind.valid_outcomes().contains(&outcome) => outcome,
            _ => fallback,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Npc {
    pub name: String,
    pub description: String,
    pub kind: NpcKind,
    pub job_class: String,
    pub backstory: String,
    pub location: StoryLocation,
    pub story_level: u32,
    /// Growth profile used when an ally joins the party.
    pub base_class: Option<BaseClass>,
    pub recruited: bool,
    pub defeated: bool,
}

impl Npc {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: NpcKind,
        location: StoryLocation,
        story_level: u32,
    ) -> Self {
        let story_level = match kind {
            NpcKind::Boss => story_level + BOSS_LEVEL_BONUS,
            _ => story_level,
        };
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            job_class: String::new(),
            backstory: String::new(),
            location,
            story_level: story_level.max(1),
            base_class: None,
            recruited: false,
            defeated: false,
        }
    }

    #[must_use]
    pub fn with_job_class(mut self, job_class: impl Into<String>) -> Self {
        self.job_class = job_class.into();
        self
    }

    #[must_use]
    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    #[must_use]
    pub fn with_base_class(mut self, base_class: BaseClass) -> Self {
        self.base_class = Some(base_class);
        self
    }

    /// Full name or first name, case-insensitively.
    pub fn answers_to(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        let full = self.name.to_lowercase();
        let first = full.split_whitespace().next().unwrap_or_default();
        full == wanted || first == wanted
    }

    /// "Name (kind - description)", the form scene casts use.
    pub fn scene_label(&self) -> String {
        format!("{} ({} - {})", self.name, self.kind, self.description)
    }
}

/// Every NPC the story has introduced so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastRegistry {
    npcs: Vec<Npc>,
}

impl CastRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, npc: Npc) {
        self.npcs.push(npc);
    }

    pub fn get(&self, name: &str) -> Option<&Npc> {
        self.npcs.iter().find(|npc| npc.answers_to(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|npc| npc.answers_to(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Npc> {
        let index = self.npcs.iter().position(|npc| npc.answers_to(name))?;
        Some(self.npcs.remove(index))
    }

    pub fn by_kind(&self, kind: NpcKind) -> impl Iterator<Item = &Npc> {
        self.npcs.iter().filter(move |npc| npc.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.iter()
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    pub fn clear(&mut self) {
        self.npcs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town() -> StoryLocation {
        StoryLocation::new("Ashford", "A mill town")
    }

    #[test]
    fn lookup_accepts_first_name() {
        let mut cast = CastRegistry::new();
        cast.add(Npc::new("Maren Holt", "A retired scout", NpcKind::Story, town(), 3));
        assert!(cast.contains("maren"));
        assert!(cast.contains("MAREN HOLT"));
        assert!(!cast.contains("Holt"));
        assert_eq!(cast.remove("Maren").map(|npc| npc.name), Some("Maren Holt".to_string()));
        assert!(cast.is_empty());
    }

    #[test]
    fn bosses_sit_above_story_level() {
        let boss = Npc::new("Warden", "", NpcKind::Boss, town(), 4);
        assert_eq!(boss.story_level, 9);
        let ally = Npc::new("Pell", "", NpcKind::Ally, town(), 4);
        assert_eq!(ally.story_level, 4);
    }

    #[test]
    fn outcomes_are_checked_against_kind() {
        assert_eq!(DialogueOutcome::validate("recruit_success", NpcKind::Ally), DialogueOutcome::RecruitSuccess);
        assert_eq!(DialogueOutcome::validate("battle", NpcKind::Ally), DialogueOutcome::RecruitFailure);
        assert_eq!(DialogueOutcome::validate("shop_discount", NpcKind::Shop), DialogueOutcome::ShopDiscount);
        assert_eq!(DialogueOutcome::validate("???", NpcKind::Story), DialogueOutcome::End);
        assert_eq!(
            NpcKind::Story.valid_outcomes(),
            vec![DialogueOutcome::End, DialogueOutcome::InfoObtained]
        );
    }
}
