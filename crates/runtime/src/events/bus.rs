//! Topic-based event bus.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{BattleEvent, DialogueEvent, StoryUpdate};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Battle lifecycle and narration
    Battle,
    /// Story queue and progression
    Story,
    /// Cutscenes and NPC conversations
    Dialogue,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Battle, Topic::Story, Topic::Dialogue];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Battle(BattleEvent),
    Story(StoryUpdate),
    Dialogue(DialogueEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Battle(_) => Topic::Battle,
            Event::Story(_) => Topic::Story,
            Event::Dialogue(_) => Topic::Dialogue,
        }
    }
}

impl From<BattleEvent> for Event {
    fn from(event: BattleEvent) -> Self {
        Event::Battle(event)
    }
}

impl From<StoryUpdate> for Event {
    fn from(event: StoryUpdate) -> Self {
        Event::Story(event)
    }
}

impl From<DialogueEvent> for Event {
    fn from(event: DialogueEvent) -> Self {
        Event::Dialogue(event)
    }
}

struct Channels {
    battle: broadcast::Sender<Event>,
    story: broadcast::Sender<Event>,
    dialogue: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Battle => &self.battle,
            Topic::Story => &self.story,
            Topic::Dialogue => &self.dialogue,
        }
    }
}

/// Topic-based event bus
///
/// Consumers subscribe to the topics they care about. Publishing never
/// blocks; events sent while nobody listens are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                battle: broadcast::channel(capacity).0,
                story: broadcast::channel(capacity).0,
                dialogue: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("battle_subscribers", &self.channels.battle.receiver_count())
            .field("story_subscribers", &self.channels.story.receiver_count())
            .field("dialogue_subscribers", &self.channels.dialogue.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::StorySignal;

    #[tokio::test]
    async fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut story = bus.subscribe(Topic::Story);
        let mut dialogue = bus.subscribe(Topic::Dialogue);

        bus.publish(StoryUpdate::Signal(StorySignal::ChapterComplete));

        let received = story.recv().await.unwrap();
        assert_eq!(received, Event::Story(StoryUpdate::Signal(StorySignal::ChapterComplete)));
        assert!(dialogue.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(DialogueEvent::NpcDiscovered {
            name: "Old Tam".to_string(),
        });
    }

    #[test]
    fn clones_share_channels() {
        let bus = EventBus::new();
        let clone = bus.clone();
        let mut rx = bus.subscribe(Topic::Battle);
        clone.publish(BattleEvent::TurnStarted {
            actor: "Hero".to_string(),
            turn_order: vec!["Hero".to_string(), "Slime".to_string()],
        });
        assert!(rx.try_recv().is_ok());
    }
}
