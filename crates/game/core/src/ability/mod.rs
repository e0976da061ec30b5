//! Skills and spells a combatant can use in battle.
//!
//! - [`skill`]: SP-costed skills and the base classes that unlock them
//! - [`spell`]: MP-costed spells with tier-derived cost and power
//! - [`targeting`]: target shapes shared with items

pub mod skill;
pub mod spell;
pub mod targeting;

pub use skill::{BaseClass, Skill, SkillKind};
pub use spell::{Spell, SpellCategory, SpellEffect};
pub use targeting::Targeting;
