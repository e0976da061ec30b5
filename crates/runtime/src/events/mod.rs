//! Topic-based event bus for battle, story and dialogue updates.
//!
//! Frontends subscribe per topic; the battle runner and story session
//! publish as they go.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{BattleEvent, DialogueEvent, StoryUpdate};
