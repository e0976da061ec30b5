//! Deterministic JRPG rules shared by the runtime and offline tools.
//!
//! `game-core` owns the battle engine (turn scheduling, action resolution,
//! elemental damage, status effects) and the story state machine (event
//! queue, trigger matching, chapter progression). It performs no I/O and
//! never awaits: anything that needs generated content is supplied by the
//! caller, and randomness arrives through [`rng::BattleRng`].
//!
//! A battle is driven through [`battle::Battle`], which pauses at every
//! decision point so async controllers can answer in their own time.
pub mod ability;
pub mod battle;
pub mod catalog;
pub mod character;
pub mod combat;
pub mod config;
pub mod element;
pub mod equipment;
pub mod error;
pub mod item;
pub mod npc;
pub mod party;
pub mod rng;
pub mod stats;
pub mod status;
pub mod story;

pub use ability::{BaseClass, Skill, SkillKind, Spell, SpellCategory, SpellEffect, Targeting};
pub use battle::{
    Battle, BattleAction, BattleError, BattleLog, BattleOutcome, BattleRewards, DecisionContext,
    LogEntry, TargetSpec, TurnStart,
};
pub use catalog::{ItemCatalog, SpellCatalog};
pub use character::{BattleFlags, Combatant, EnemyData, EnemyKind, PlayerData, Role};
pub use config::GameConfig;
pub use element::{Element, ElementalDamage, Interaction, calculate_elemental_damage};
pub use equipment::{Equipment, EquipmentSlot, Loadout};
pub use error::{CatalogError, ErrorSeverity, GameError, PartyError};
pub use item::{Item, ItemKind, KeyItem};
pub use npc::{CastRegistry, DialogueOutcome, Npc, NpcKind};
pub use party::{Party, Placement};
pub use rng::{BattleRng, PcgRng, SequenceRng};
pub use stats::{StatBiases, StatBlock, StatDelta, StatKind};
pub use status::{EffectTemplate, StatusEffect, StatusEffects, StatusKind};
pub use story::{
    ChapterAdvance, ChapterOverview, EventDraft, EventTiming, LocationPart, Progression,
    StoryEvent, StoryLocation, StoryManager, StorySignal, Trigger, TriggerType,
};
