//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use game_core::stats::{StatBlock, StatKind};
use game_core::{BaseClass, Combatant, EnemyKind, GameConfig, Party};
use runtime::{Oracles, RetryPolicy, Runtime, RuntimeConfig};

pub const SEED: u64 = 7;

/// A hero no generated enemy can stand up to.
pub fn champion(name: &str) -> Combatant {
    let mut hero = Combatant::player(name, "Knight", BaseClass::Brave, 1, &GameConfig::default());
    hero.stats = StatBlock::new(100_000, 500)
        .with(StatKind::Attack, 5_000)
        .with(StatKind::Defense, 500)
        .with(StatKind::Speed, 1_000);
    hero
}

/// Dies to the first hit and never gets a turn.
pub fn weakling(name: &str) -> Combatant {
    let mut hero = Combatant::player(name, "Squire", BaseClass::Kind, 1, &GameConfig::default());
    hero.stats = StatBlock::new(1, 0).with(StatKind::Speed, 0);
    hero
}

pub fn hero() -> Combatant {
    let mut hero = Combatant::player("Hero", "Knight", BaseClass::Brave, 1, &GameConfig::default());
    hero.stats = StatBlock::new(100, 60)
        .with(StatKind::Attack, 100)
        .with(StatKind::Speed, 15);
    hero
}

/// Speed 0 never accumulates time units, so it never acts.
pub fn slime(hp: i32) -> Combatant {
    let stats = StatBlock::new(hp, 0).with(StatKind::Speed, 0);
    let mut slime = Combatant::enemy("Slime", "Ooze", 1, stats, EnemyKind::Regular);
    if let Some(data) = slime.enemy_data_mut() {
        data.currency = 30;
        data.experience = 50;
    }
    slime
}

pub fn party_of(members: Vec<Combatant>) -> Party {
    Party::new(members, 3)
}

pub fn config() -> RuntimeConfig {
    RuntimeConfig::default()
        .with_seed(SEED)
        .with_retry(RetryPolicy::once())
}

pub fn runtime_with(oracles: Oracles) -> Runtime {
    Runtime::builder()
        .config(config())
        .oracles(oracles)
        .build()
        .expect("runtime builds from embedded content")
}

pub fn offline_runtime() -> Runtime {
    runtime_with(Oracles::offline(SEED))
}
