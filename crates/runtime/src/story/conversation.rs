//! Walking a generated two-level dialogue tree.
use std::collections::VecDeque;

use async_trait::async_trait;
use tracing::debug;

use game_core::DialogueOutcome;

use crate::error::Result;
use crate::events::{DialogueEvent, EventBus};
use crate::oracle::validate::DialogueTree;

/// Picks one of the player's reply options.
#[async_trait]
pub trait ResponseChooser: Send + Sync {
    /// Returns an index into `options`. Out-of-range answers pick the last
    /// option.
    async fn choose(&mut self, prompt: &str, options: &[String]) -> Result<usize>;
}

#[async_trait]
impl<C: ResponseChooser + ?Sized> ResponseChooser for Box<C> {
    async fn choose(&mut self, prompt: &str, options: &[String]) -> Result<usize> {
        (**self).choose(prompt, options).await
    }
}

/// Always takes the first option.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstOption;

#[async_trait]
impl ResponseChooser for FirstOption {
    async fn choose(&mut self, _prompt: &str, _options: &[String]) -> Result<usize> {
        Ok(0)
    }
}

/// Replays fixed indices, then falls back to the first option.
#[derive(Clone, Debug, Default)]
pub struct ScriptedChooser {
    picks: VecDeque<usize>,
}

impl ScriptedChooser {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self { picks: picks.into_iter().collect() }
    }
}

#[async_trait]
impl ResponseChooser for ScriptedChooser {
    async fn choose(&mut self, _prompt: &str, _options: &[String]) -> Result<usize> {
        Ok(self.picks.pop_front().unwrap_or(0))
    }
}

/// One conversation between the party leader and an NPC.
pub struct Conversation<'a> {
    npc: &'a str,
    player: &'a str,
    bus: &'a EventBus,
}

impl<'a> Conversation<'a> {
    pub fn new(npc: &'a str, player: &'a str, bus: &'a EventBus) -> Self {
        Self { npc, player, bus }
    }

    /// Plays `tree` to its end and returns the outcome of the chosen branch.
    pub async fn run(&self, tree: &DialogueTree, chooser: &mut dyn ResponseChooser) -> Result<DialogueOutcome> {
        self.say(self.npc, &tree.initial_message);
        if tree.responses.is_empty() {
            debug!(npc = self.npc, outcome = %tree.fallback, "dialogue has no options");
            return Ok(tree.fallback);
        }

        let labels: Vec<String> = tree.responses.iter().map(|r| r.short_text.clone()).collect();
        let picked = clamp(chooser.choose(&tree.initial_message, &labels).await?, labels.len());
        let response = &tree.responses[picked];
        self.say(self.player, &response.full_text);
        self.say(self.npc, &response.npc_reply);

        let labels: Vec<String> = response.follow_ups.iter().map(|r| r.short_text.clone()).collect();
        let picked = clamp(chooser.choose(&response.npc_reply, &labels).await?, labels.len());
        let Some(last) = response.follow_ups.get(picked) else {
            return Ok(tree.fallback);
        };
        self.say(self.player, &last.full_text);
        self.say(self.npc, &last.final_message);

        debug!(npc = self.npc, outcome = %last.outcome, "dialogue finished");
        Ok(last.outcome)
    }

    fn say(&self, speaker: &str, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.bus.publish(DialogueEvent::Line {
            speaker: Some(speaker.to_string()),
            text: text.to_string(),
        });
    }
}

fn clamp(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, Topic};
    use crate::oracle::validate::{FinalResponse, ResponseOption};

    fn final_response(text: &str, outcome: DialogueOutcome) -> FinalResponse {
        FinalResponse {
            short_text: text.to_string(),
            full_text: format!("{text}!"),
            final_message: format!("reply to {text}"),
            outcome,
        }
    }

    fn tree() -> DialogueTree {
        DialogueTree {
            initial_message: "Who goes there?".to_string(),
            responses: vec![ResponseOption {
                short_text: "Friend".to_string(),
                full_text: "A friend.".to_string(),
                npc_reply: "Prove it.".to_string(),
                follow_ups: vec![
                    final_response("Join us", DialogueOutcome::RecruitSuccess),
                    final_response("Leave", DialogueOutcome::RecruitFailure),
                ],
            }],
            fallback: DialogueOutcome::RecruitFailure,
        }
    }

    #[tokio::test]
    async fn chosen_branch_decides_outcome() {
        let bus = EventBus::new();
        let conversation = Conversation::new("Wren", "Aria", &bus);
        let mut chooser = ScriptedChooser::new([0, 1]);
        let outcome = conversation.run(&tree(), &mut chooser).await.unwrap();
        assert_eq!(outcome, DialogueOutcome::RecruitFailure);
    }

    #[tokio::test]
    async fn out_of_range_pick_takes_last_option() {
        let bus = EventBus::new();
        let mut lines = bus.subscribe(Topic::Dialogue);
        let conversation = Conversation::new("Wren", "Aria", &bus);
        let outcome = conversation
            .run(&tree(), &mut ScriptedChooser::new([7, 0]))
            .await
            .unwrap();
        assert_eq!(outcome, DialogueOutcome::RecruitSuccess);

        let mut spoken = Vec::new();
        while let Ok(Event::Dialogue(DialogueEvent::Line { text, .. })) = lines.try_recv() {
            spoken.push(text);
        }
        assert_eq!(spoken, ["Who goes there?", "A friend.", "Prove it.", "Join us!", "reply to Join us"]);
    }

    #[tokio::test]
    async fn empty_tree_uses_fallback() {
        let bus = EventBus::new();
        let mut tree = tree();
        tree.responses.clear();
        let outcome = Conversation::new("Wren", "Aria", &bus)
            .run(&tree, &mut FirstOption)
            .await
            .unwrap();
        assert_eq!(outcome, DialogueOutcome::RecruitFailure);
    }
}
