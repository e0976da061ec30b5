//! Plain-text rendering of bus events and battle menus.
use std::fmt::Write;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::warn;

use game_core::battle::{CombatantView, EntryKind};
use game_core::{DecisionContext, StorySignal};
use runtime::{BattleEvent, DialogueEvent, Event, EventBus, StoryUpdate, Topic};

/// Prints every event on every topic until the bus is dropped.
pub fn spawn_printer(bus: &EventBus) -> Vec<JoinHandle<()>> {
    bus.subscribe_multiple(&Topic::ALL)
        .into_iter()
        .map(|(topic, mut rx)| {
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(event) => {
                            if let Some(text) = render_event(&event) {
                                println!("{text}");
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => warn!(?topic, skipped, "printer lagged"),
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        })
        .collect()
}

/// One event as display text. `None` for events with nothing to show.
pub fn render_event(event: &Event) -> Option<String> {
    match event {
        Event::Battle(event) => render_battle(event),
        Event::Story(update) => render_story(update),
        Event::Dialogue(event) => Some(render_dialogue(event)),
    }
}

fn render_battle(event: &BattleEvent) -> Option<String> {
    match event {
        BattleEvent::Started { battle_type, enemies } => {
            Some(format!("=== {} vs {} ===", battle_type.replace('_', " "), enemies.join(", ")))
        }
        BattleEvent::TurnStarted { .. } => None,
        BattleEvent::Narration(entry) => Some(match entry.kind {
            EntryKind::Action => format!("{}: {}", entry.title, entry.text),
            EntryKind::LevelUp | EntryKind::Result => format!("** {}", entry.text),
            _ => entry.text.clone(),
        }),
        BattleEvent::Ended { outcome, rewards } => {
            let mut text = format!("=== {} ===", outcome.as_str().replace('_', " "));
            if let Some(rewards) = rewards {
                let _ = write!(text, " (+{} currency, +{} xp)", rewards.currency, rewards.experience);
            }
            Some(text)
        }
    }
}

fn render_story(update: &StoryUpdate) -> Option<String> {
    match update {
        StoryUpdate::EventTriggered { text, .. } => Some(format!("\n>> {text}")),
        StoryUpdate::EventCompleted { .. } => None,
        StoryUpdate::SubChapterStarted {
            chapter,
            sub_chapter,
            events,
        } => Some(format!(
            "-- chapter {} part {}: {events} events ahead --",
            chapter + 1,
            sub_chapter + 1
        )),
        StoryUpdate::ChapterStarted { chapter } => Some(format!("\n##### Chapter {} #####", chapter + 1)),
        StoryUpdate::Signal(StorySignal::None) => None,
        StoryUpdate::Signal(signal) => Some(format!("[{}]", signal.as_str().replace('_', " "))),
    }
}

fn render_dialogue(event: &DialogueEvent) -> String {
    match event {
        DialogueEvent::Line { speaker: Some(speaker), text } => format!("{speaker}: \"{text}\""),
        DialogueEvent::Line { speaker: None, text } => text.clone(),
        DialogueEvent::NpcDiscovered { name } => format!("(you met {name})"),
        DialogueEvent::Recruited { name } => format!("{name} joined the party!"),
    }
}

/// Status lines for both sides followed by the actor's options.
pub fn decision_menu(context: &DecisionContext) -> String {
    let mut menu = String::new();
    let _ = writeln!(menu, "\n-- {}'s turn --", context.actor.name);
    for view in &context.allies {
        let _ = writeln!(menu, "  {}", status_line(view));
    }
    let _ = writeln!(menu, "  vs");
    for view in context.enemies.iter().filter(|view| view.alive) {
        let _ = writeln!(menu, "  {}", status_line(view));
    }

    let available = &context.available;
    if !available.skills.is_empty() {
        let skills: Vec<String> = available
            .skills
            .iter()
            .map(|s| format!("{} ({} SP)", s.name, s.cost))
            .collect();
        let _ = writeln!(menu, "  skills: {}", skills.join(", "));
    }
    if !available.spells.is_empty() {
        let spells: Vec<String> = available
            .spells
            .iter()
            .map(|s| format!("{} ({} MP)", s.name, s.cost))
            .collect();
        let _ = writeln!(menu, "  spells: {}", spells.join(", "));
    }
    if !available.items.is_empty() {
        let items: Vec<String> = available.items.iter().map(|i| format!("{} x{}", i.name, i.count)).collect();
        let _ = writeln!(menu, "  items: {}", items.join(", "));
    }
    let _ = write!(menu, "  (type ? for commands)");
    menu
}

fn status_line(view: &CombatantView) -> String {
    let mut line = format!(
        "{:<16} Lv{:<3} HP {}/{}  MP {}/{}  SP {}/{}",
        view.name, view.level, view.hp, view.max_hp, view.mp, view.max_mp, view.sp, view.max_sp
    );
    if !view.alive {
        line.push_str("  [down]");
    } else if !view.status_effects.is_empty() {
        let _ = write!(line, "  [{}]", view.status_effects.join(", "));
    }
    line
}
