//! Builds enemies from generated descriptions.
use std::sync::Arc;

use tracing::{debug, warn};

use game_content::GameContent;
use game_core::stats::{StatBiases, generate_stats};
use game_core::{BattleRng, Combatant, Element, EnemyKind, Skill, StoryLocation};

use crate::error::Result;
use crate::oracle::{EnemyOracle, EnemyRequest, RawEnemy, RetryPolicy};

/// Loot items rolled per enemy.
const MAX_LOOT: usize = 2;
const BOSS_XP_MULTIPLIER: u64 = 3;
const FALLBACK_ATTACK: &str = "Strike";

/// What kind of enemy to ask for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemySpec {
    pub level: u32,
    pub kind: EnemyKind,
    pub location: StoryLocation,
    pub base_name: String,
    pub base_description: String,
}

impl EnemySpec {
    pub fn regular(level: u32, location: StoryLocation) -> Self {
        Self {
            level,
            kind: EnemyKind::Regular,
            location,
            base_name: String::new(),
            base_description: String::new(),
        }
    }

    pub fn boss(
        name: impl Into<String>,
        description: impl Into<String>,
        level: u32,
        location: StoryLocation,
    ) -> Self {
        Self {
            level,
            kind: EnemyKind::Boss,
            location,
            base_name: name.into(),
            base_description: description.into(),
        }
    }
}

#[derive(Clone)]
pub struct EnemyFactory {
    oracle: Arc<dyn EnemyOracle>,
    content: Arc<GameContent>,
    retry: RetryPolicy,
}

impl EnemyFactory {
    pub fn new(oracle: Arc<dyn EnemyOracle>, content: Arc<GameContent>, retry: RetryPolicy) -> Self {
        Self { oracle, content, retry }
    }

    /// Asks the oracle for an enemy and builds it.
    pub async fn create<R>(&self, spec: &EnemySpec, rng: &mut R) -> Result<Combatant>
    where
        R: BattleRng + Send,
    {
        let request = EnemyRequest {
            level: spec.level,
            kind: spec.kind,
            location: spec.location.clone(),
            spells: self.content.spells.names(),
            elements: Element::ALL.iter().map(ToString::to_string).collect(),
            base_name: spec.base_name.clone(),
            base_description: spec.base_description.clone(),
        };
        let oracle = &self.oracle;
        let request = &request;
        let raw = self
            .retry
            .run("generate_enemy", move || oracle.generate_enemy(request))
            .await?;
        Ok(self.build(raw, spec, rng))
    }

    /// Validates a generated description into a combatant.
    ///
    /// Unknown elements become `None` and unknown spells are dropped. Regular
    /// enemies fight at half HP; bosses pay triple experience.
    pub fn build(&self, raw: RawEnemy, spec: &EnemySpec, rng: &mut impl BattleRng) -> Combatant {
        let level = spec.level.max(1);
        let name = first_non_empty([raw.name.as_str(), spec.base_name.as_str()]).unwrap_or("Enemy");
        let description = first_non_empty([raw.description.as_str(), spec.base_description.as_str()]).unwrap_or("");
        let job_class = first_non_empty([raw.job_class.as_str()]).unwrap_or("Monster");
        let attack = first_non_empty([raw.attack_name.as_str()]).unwrap_or(FALLBACK_ATTACK);

        let element = Element::parse_lenient(&raw.element);
        let spells = self.content.spells.filter_known(raw.spells.iter().map(String::as_str));
        if spells.len() < raw.spells.len() {
            warn!(enemy = name, generated = ?raw.spells, "dropping unknown enemy spells");
        }

        let mut stats = generate_stats(&StatBiases::neutral(), level).with_max_sp(self.content.config.max_sp);
        if spec.kind == EnemyKind::Regular {
            stats.max_hp = (stats.max_hp / 2).max(1);
            stats.hp = stats.max_hp;
        }

        let mut enemy = Combatant::enemy(name, job_class, level, stats, spec.kind)
            .with_description(description)
            .with_element(element)
            .with_spells(spells)
            .with_skill(Skill::enemy_special(attack));

        let currency = roll_around(10 * u64::from(level), rng);
        let mut experience = roll_around(100 * u64::from(level), rng);
        if spec.kind == EnemyKind::Boss {
            experience *= BOSS_XP_MULTIPLIER;
        }
        let loot = self.content.items.sample(MAX_LOOT, rng);

        if let Some(data) = enemy.enemy_data_mut() {
            data.currency = currency;
            data.experience = experience;
            data.loot = loot;
        }
        debug!(enemy = %enemy.name, level, ?element, currency, experience, "enemy built");
        enemy
    }
}

/// Uniform integer in `[base / 2, base * 2]`.
fn roll_around(base: u64, rng: &mut impl BattleRng) -> u64 {
    let low = (base / 2) as i64;
    let high = (base * 2) as i64;
    rng.range_inclusive(low, high).max(0) as u64
}

fn first_non_empty<'a, const N: usize>(candidates: [&'a str; N]) -> Option<&'a str> {
    candidates.into_iter().map(str::trim).find(|s| !s.is_empty())
}
