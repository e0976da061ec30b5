//! Terminal client for the JRPG runtime.
//!
//! This binary is the composition root: it loads configuration, builds a
//! [`Runtime`] with the offline oracles, and plays either a single skirmish or
//! the opening chapter of a story from stdin.
//!
//! ```bash
//! cargo run -p jrpg-client -- story
//! cargo run -p jrpg-client -- skirmish
//! ```
mod console;
mod input;
mod logging;
mod presentation;

use anyhow::{Result, bail};
use tracing::{info, warn};

use game_core::story::{Feature, SubChapter};
use game_core::{
    BaseClass, ChapterAdvance, ChapterOverview, Combatant, LocationPart, Npc, NpcKind, Party, StoryEvent,
    StoryLocation, StorySignal, Trigger, TriggerType,
};
use runtime::{BattleSetup, EnemySpec, ExternalController, Oracles, Runtime, RuntimeConfig, StorySession};

use console::Console;
use input::{ConsoleChooser, drive_player};

const CURRENCY: &str = "Gold";
const SKIRMISH_ENEMIES: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Skirmish,
    Story,
}

impl Mode {
    fn from_args() -> Result<Self> {
        match std::env::args().nth(1).as_deref() {
            None | Some("story") => Ok(Mode::Story),
            Some("skirmish") => Ok(Mode::Skirmish),
            Some(other) => bail!("unknown mode '{other}' (expected 'story' or 'skirmish')"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let mode = Mode::from_args()?;
    let config = RuntimeConfig::from_env();
    let _guard = logging::setup_logging(config.session_id.as_deref())?;

    let seed = config.resolve_seed();
    let mut runtime = Runtime::builder()
        .config(config.with_seed(seed))
        .oracles(Oracles::offline(seed))
        .build()?;
    info!(?mode, seed, "client starting");

    let printers = presentation::spawn_printer(runtime.bus());
    let console = Console::stdin();
    let party = starting_party(&mut runtime);

    let (players, handle) = ExternalController::channel(1);
    let menu = tokio::spawn(drive_player(handle, console.clone()));

    match mode {
        Mode::Skirmish => skirmish(&mut runtime, party, players).await?,
        Mode::Story => story(&mut runtime, party, players, console).await?,
    }

    drop(runtime);
    if let Err(e) = menu.await? {
        warn!(error = %e, "player input stopped with an error");
    }
    for printer in printers {
        printer.abort();
    }
    info!("client shutdown complete");
    Ok(())
}

fn starting_party(runtime: &mut Runtime) -> Party {
    let config = runtime.config().game.clone();
    let mut rng = runtime.fork_rng();
    let content = runtime.content();

    let members = [
        ("Aria", "Knight", BaseClass::Brave, "A disgraced knight looking for a cause"),
        ("Corwin", "Scholar", BaseClass::Clever, "A hedge scholar who reads storms"),
    ]
    .into_iter()
    .map(|(name, job, base, description)| {
        let mut member = Combatant::player(name, job, base, 1, &config).with_description(description);
        for spell in content.spells.starter_spells(base, &mut rng) {
            member.learn_spell(spell);
        }
        member
    })
    .collect();

    let mut party = Party::with_config(members, &config);
    party.stock_starter_items(&content.items, &mut rng);
    party
}

// ============================================================================
// Skirmish
// ============================================================================

async fn skirmish(runtime: &mut Runtime, mut party: Party, players: ExternalController) -> Result<()> {
    let location = StoryLocation::new("Old Road", "A rutted road between two dead villages");
    let level = party.avg_level().round().max(1.0) as u32;

    let factory = runtime.enemy_factory();
    let mut rng = runtime.fork_rng();
    let mut enemies = Vec::with_capacity(SKIRMISH_ENEMIES);
    for _ in 0..SKIRMISH_ENEMIES {
        enemies.push(factory.create(&EnemySpec::regular(level, location.clone()), &mut rng).await?);
    }

    let setup = BattleSetup::new("random_encounter", "Something moves in the ditch").with_currency_name(CURRENCY);
    let mut runner = runtime.battle_runner(players);
    let report = runner
        .fight(&mut party, Party::enemies(enemies), &setup, runtime.fork_rng())
        .await?;
    info!(outcome = %report.outcome, currency = party.currency, "skirmish finished");
    Ok(())
}

// ============================================================================
// Story
// ============================================================================

async fn story(runtime: &mut Runtime, party: Party, players: ExternalController, console: Console) -> Result<()> {
    let story = runtime.new_story("drowned gothic", CURRENCY);
    let mut session = runtime.story_session(story, party, players, ConsoleChooser::new(console.clone()));

    let overview = opening_chapter();
    for sub_chapter in &overview.sub_chapters {
        if let Some(npc) = &sub_chapter.npc {
            let level = story_level(&session);
            session.cast_mut().add(Npc::new(
                &npc.name,
                &npc.description,
                NpcKind::Story,
                sub_chapter.location.clone(),
                level,
            ));
        }
    }
    session.begin_chapter(overview).await?;

    loop {
        if let Some(hint) = session.story().next_event().and_then(|e| e.trigger_hint.clone()) {
            println!("\n({hint})");
        }
        match console.ask("[enter] continue, [s] story so far, [q] quit > ").await? {
            None => return Ok(()),
            Some(line) if line.eq_ignore_ascii_case("q") => return Ok(()),
            Some(line) if line.eq_ignore_ascii_case("s") => {
                println!("{}", session.story_so_far().await?);
                continue;
            }
            Some(_) => {}
        }

        if follow_head(&mut session).await? == StorySignal::GameOver {
            return Ok(());
        }
        if session.progress().await? != StorySignal::ChapterComplete {
            continue;
        }

        if finale(&mut session, &console).await? == StorySignal::GameOver {
            return Ok(());
        }
        match session.complete_chapter() {
            ChapterAdvance::Next(chapter) => println!("\nChapter {} awaits. To be continued...", chapter + 1),
            ChapterAdvance::GameComplete => println!("\nThe End."),
        }
        return Ok(());
    }
}

/// Performs whatever the head event waits for: travel, inspection or talk.
async fn follow_head(session: &mut StorySession) -> Result<StorySignal> {
    let Some(trigger) = session.story().next_event().map(|e| e.trigger.clone()) else {
        return Ok(StorySignal::None);
    };
    let value = trigger.value.as_str();
    let fired = match trigger.kind {
        TriggerType::LocationEntered => session.enter_location(value, LocationPart::A).await?,
        TriggerType::LandmarkInspected => session.inspect_landmark(value, LocationPart::B).await?,
        TriggerType::StoryExposition | TriggerType::BossConfronted | TriggerType::AllyRecruited => {
            session.talk_to(value, LocationPart::B).await?
        }
        TriggerType::BossDefeated => None,
    };
    match fired {
        Some(signal) => Ok(signal),
        None => {
            warn!(trigger = %trigger.kind, %value, "head event did not fire, forcing it");
            Ok(session.trigger_event().await?)
        }
    }
}

/// The chapter closes on a boss waiting in the keep. A fled fight leaves
/// the boss queued, so the player may try again or walk away.
async fn finale(session: &mut StorySession, console: &Console) -> Result<StorySignal> {
    let keep = StoryLocation::new("Old Keep", "A ruin on the hill");
    let boss = Npc::new(
        "The Drowned King",
        "A crowned corpse that never stopped ruling",
        NpcKind::Boss,
        keep.clone(),
        story_level(session),
    );
    let name = boss.name.clone();
    let trigger = Trigger::new(TriggerType::BossConfronted, name.clone());
    session.story_mut().add_future_event(
        StoryEvent::new(keep, "The Drowned King rises from his flooded throne.", trigger)
            .with_hint("Face the Drowned King"),
    );
    session.cast_mut().add(boss);

    while session.story().next_event().is_some() {
        match console.ask("\n[enter] face the Drowned King, [q] leave > ").await? {
            None => return Ok(StorySignal::None),
            Some(line) if line.eq_ignore_ascii_case("q") => return Ok(StorySignal::None),
            Some(_) => {}
        }
        let signal = session.talk_to(&name, LocationPart::B).await?.unwrap_or_default();
        if signal == StorySignal::GameOver {
            return Ok(signal);
        }
    }
    Ok(StorySignal::None)
}

fn story_level(session: &StorySession) -> u32 {
    u32::try_from(session.story().story_level()).unwrap_or(u32::MAX)
}

fn opening_chapter() -> ChapterOverview {
    ChapterOverview {
        title: "The Drowned Crown".to_string(),
        overview: "Something stirs beneath the fen, and the old keep has lights again.".to_string(),
        sub_chapters: vec![
            SubChapter {
                overview: "The party reaches the fen village.".to_string(),
                location: StoryLocation::new("Mirefen", "A village half under water"),
                npc: Some(Feature::new("Wren", "A ferry keeper who knows every channel")),
                landmark: None,
            },
            SubChapter {
                overview: "The road climbs toward the keep.".to_string(),
                location: StoryLocation::new("Old Keep", "A ruin on the hill"),
                npc: None,
                landmark: Some(Feature::new("Broken Gate", "Split by something huge")),
            },
        ],
    }
}
