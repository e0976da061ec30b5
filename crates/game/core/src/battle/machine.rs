//! Battle state machine.
//!
//! A [`Battle`] moves through `Init → Round → Finished`. Each round step is
//! split at the controller decision point so an async caller can suspend
//! there:
//!
//! 1. [`Battle::begin_turn`] forecasts the order, picks the next actor and
//!    either skips an incapacitated actor or ticks its status effects and
//!    returns a [`DecisionContext`].
//! 2. [`Battle::resolve_turn`] applies the chosen [`BattleAction`] and runs
//!    the outcome check.
//!
//! Gameplay failures are narrated, never returned. [`BattleError`] only
//! reports calls made out of order.

use tracing::{debug, info};

use super::action::BattleAction;
use super::context::DecisionContext;
use super::log::{BattleLog, EntryKind, LogEntry};
use super::roster::{CombatantId, Roster, Side};
use super::scheduler::{Contender, TurnScheduler};
use crate::character::Combatant;
use crate::config::GameConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::party::Party;
use crate::rng::BattleRng;

/// Terminal result reported to the story layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BattleOutcome {
    PartyVictory,
    PartyDefeated,
    PartyRan,
}

impl BattleOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            BattleOutcome::PartyVictory => "party_victory",
            BattleOutcome::PartyDefeated => "party_defeated",
            BattleOutcome::PartyRan => "party_ran",
        }
    }

    /// Verb phrase used in the result narration.
    const fn verb(self) -> &'static str {
        match self {
            BattleOutcome::PartyVictory => "defeated",
            BattleOutcome::PartyDefeated => "were defeated by",
            BattleOutcome::PartyRan => "ran away from",
        }
    }
}

impl core::fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    Init,
    Round,
    Finished(BattleOutcome),
}

/// Currency and experience handed out on victory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleRewards {
    pub currency: u64,
    /// Awarded in full to every main party member.
    pub experience: u64,
}

/// What [`Battle::begin_turn`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnStart {
    /// The actor needs a decision; pass it to [`Battle::resolve_turn`].
    AwaitingDecision(Box<DecisionContext>),
    /// The actor could not act, or its status effects killed it.
    Skipped { actor: String },
    Finished(BattleOutcome),
}

/// Errors that can occur when battle steps are called out of order.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("battle has not been started")]
    NotStarted,

    #[error("battle already started")]
    AlreadyStarted,

    #[error("a decision for {0} is still pending")]
    DecisionPending(String),

    #[error("no actor is waiting for a decision")]
    NoPendingDecision,

    #[error("battle is over ({0})")]
    Finished(BattleOutcome),
}

impl GameError for BattleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotStarted => "BATTLE_NOT_STARTED",
            Self::AlreadyStarted => "BATTLE_ALREADY_STARTED",
            Self::DecisionPending(_) => "BATTLE_DECISION_PENDING",
            Self::NoPendingDecision => "BATTLE_NO_PENDING_DECISION",
            Self::Finished(_) => "BATTLE_FINISHED",
        }
    }
}

/// Appends " (A)", " (B)", … to names that occur more than once. Unique
/// names are left alone.
pub fn unique_enemy_names(names: &[String]) -> Vec<String> {
    let mut seen: Vec<(&str, usize)> = Vec::new();
    names
        .iter()
        .map(|name| {
            let total = names.iter().filter(|n| *n == name).count();
            if total == 1 {
                return name.clone();
            }
            let ordinal = match seen.iter_mut().find(|(n, _)| *n == name.as_str()) {
                Some((_, count)) => {
                    *count += 1;
                    *count
                }
                None => {
                    seen.push((name.as_str(), 0));
                    0
                }
            };
            format!("{name} ({})", suffix(ordinal))
        })
        .collect()
}

fn suffix(ordinal: usize) -> String {
    match u8::try_from(ordinal) {
        Ok(n) if n < 26 => char::from(b'A' + n).to_string(),
        _ => (ordinal + 1).to_string(),
    }
}

/// One battle between the player party (borrowed) and an enemy party (owned).
pub struct Battle<'p> {
    pub(super) roster: Roster<'p>,
    pub(super) scheduler: TurnScheduler,
    pub(super) config: GameConfig,
    pub(super) rng: Box<dyn BattleRng + Send + 'p>,
    pub(super) log: BattleLog,
    pub(super) fled: bool,
    phase: BattlePhase,
    pending: Option<CombatantId>,
    currency_name: String,
    rewards: Option<BattleRewards>,
    turn_order: Vec<String>,
}

impl<'p> Battle<'p> {
    pub fn new(
        party: &'p mut Party,
        mut enemies: Party,
        config: GameConfig,
        rng: impl BattleRng + Send + 'p,
    ) -> Self {
        let names: Vec<String> = enemies.members.iter().map(|e| e.name.clone()).collect();
        for (enemy, name) in enemies.members.iter_mut().zip(unique_enemy_names(&names)) {
            enemy.name = name;
        }

        let roster = Roster::new(party, enemies);
        let scheduler = TurnScheduler::new(roster.len());
        Self {
            roster,
            scheduler,
            config,
            rng: Box::new(rng),
            log: BattleLog::default(),
            fled: false,
            phase: BattlePhase::Init,
            pending: None,
            currency_name: "Gold".to_string(),
            rewards: None,
            turn_order: Vec::new(),
        }
    }

    /// Name of the currency used in the victory narration.
    #[must_use]
    pub fn with_currency_name(mut self, name: impl Into<String>) -> Self {
        self.currency_name = name.into();
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            BattlePhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn rewards(&self) -> Option<BattleRewards> {
        self.rewards
    }

    pub fn roster(&self) -> &Roster<'p> {
        &self.roster
    }

    pub fn combatant(&self, id: CombatantId) -> &Combatant {
        self.roster.get(id)
    }

    pub fn find(&self, name: &str) -> Option<&Combatant> {
        self.roster.find(name).map(|id| self.roster.get(id))
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    /// Narration produced since the previous drain.
    pub fn drain_log(&mut self) -> Vec<LogEntry> {
        self.log.take_new()
    }

    /// Actor names from the latest forecast.
    pub fn turn_order(&self) -> &[String] {
        &self.turn_order
    }

    /// Hands back the enemy party, for example to inspect loot after a fight.
    pub fn into_enemies(self) -> Party {
        self.roster.into_enemies()
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Resets SP, zeroes every time unit and narrates the start.
    pub fn start(&mut self, battle_type: &str, context: &str) -> Result<(), BattleError> {
        if self.phase != BattlePhase::Init {
            return Err(BattleError::AlreadyStarted);
        }
        for id in self.roster.ids() {
            self.roster.get_mut(id).reset_sp();
        }
        self.scheduler = TurnScheduler::new(self.roster.len());

        let describe = |side: Side| -> String {
            let names: Vec<String> = self
                .roster
                .side(side)
                .members
                .iter()
                .map(roster_label)
                .collect();
            names.join(", ")
        };
        let mut text = format!("battle_type: {battle_type}\n");
        if !context.is_empty() {
            text.push_str(&format!("context: {context}\n"));
        }
        text.push_str(&format!(
            "party: [{}]\nenemies: [{}]",
            describe(Side::Allies),
            describe(Side::Enemies)
        ));
        self.log
            .push(LogEntry::new(EntryKind::BattleStart, "Battle Start!", text));

        info!(
            target: "game_core::battle",
            battle_type,
            allies = self.roster.party().members.len(),
            enemies = self.roster.enemies().members.len(),
            "battle started"
        );
        self.phase = BattlePhase::Round;
        Ok(())
    }

    /// Advances to the next actor.
    pub fn begin_turn(&mut self) -> Result<TurnStart, BattleError> {
        match self.phase {
            BattlePhase::Init => return Err(BattleError::NotStarted),
            BattlePhase::Finished(outcome) => return Ok(TurnStart::Finished(outcome)),
            BattlePhase::Round => {}
        }
        if let Some(id) = self.pending {
            return Err(BattleError::DecisionPending(self.roster.get(id).name.clone()));
        }
        if let Some(outcome) = self.check_outcome() {
            return Ok(TurnStart::Finished(outcome));
        }

        let contenders = self.contenders();
        self.turn_order = self
            .scheduler
            .predict(&contenders, self.config.predicted_turns)
            .into_iter()
            .filter_map(|position| self.roster.id_at(position))
            .map(|id| self.roster.get(id).name.clone())
            .collect();

        let Some(id) = self
            .scheduler
            .next_actor(&contenders)
            .and_then(|position| self.roster.id_at(position))
        else {
            let outcome = self
                .check_outcome()
                .unwrap_or_else(|| self.finish(BattleOutcome::PartyDefeated));
            return Ok(TurnStart::Finished(outcome));
        };

        let actor = self.roster.get(id);
        let name = actor.name.clone();
        if !actor.flags.can_act {
            let text = if actor.status.has("Sleep") {
                format!("{} is asleep and cannot act", actor.label())
            } else {
                format!("{} cannot act", actor.label())
            };
            self.log.push(LogEntry::new(
                EntryKind::CannotAct,
                format!("{name} cannot act"),
                text,
            ));
            // Effects still tick so sleep can wear off.
            self.tick_effects(id);
            return Ok(self.after_turn(name));
        }

        self.tick_effects(id);
        if !self.roster.get(id).is_alive() {
            return Ok(self.after_turn(name));
        }

        debug!(target: "game_core::battle", actor = %name, "awaiting decision");
        self.pending = Some(id);
        let context = DecisionContext::build(&self.roster, id, self.turn_order.clone());
        Ok(TurnStart::AwaitingDecision(Box::new(context)))
    }

    /// Applies the pending actor's action and runs the outcome check.
    pub fn resolve_turn(&mut self, action: BattleAction) -> Result<Option<BattleOutcome>, BattleError> {
        if let BattlePhase::Finished(outcome) = self.phase {
            return Err(BattleError::Finished(outcome));
        }
        let id = self.pending.take().ok_or(BattleError::NoPendingDecision)?;
        debug!(
            target: "game_core::battle",
            actor = %self.roster.get(id).name,
            action = %action.summary(),
            "resolving action"
        );
        self.execute(id, action);
        Ok(self.check_outcome())
    }

    /// Drives the battle to a terminal outcome with a synchronous decider.
    pub fn run_with(&mut self, mut decide: impl FnMut(&DecisionContext) -> BattleAction) -> Result<BattleOutcome, BattleError> {
        if self.phase == BattlePhase::Init {
            self.start("ambush", "")?;
        }
        loop {
            match self.begin_turn()? {
                TurnStart::AwaitingDecision(context) => {
                    if let Some(outcome) = self.resolve_turn(decide(context.as_ref()))? {
                        return Ok(outcome);
                    }
                }
                TurnStart::Skipped { .. } => {}
                TurnStart::Finished(outcome) => return Ok(outcome),
            }
        }
    }

    fn contenders(&self) -> Vec<Contender> {
        self.roster
            .iter()
            .map(|(_, c)| Contender {
                speed: c.stats.speed,
                alive: c.is_alive(),
            })
            .collect()
    }

    fn tick_effects(&mut self, id: CombatantId) {
        let actor = self.roster.get_mut(id);
        let reports = actor.tick_status_effects();
        let name = actor.name.clone();
        let alive = actor.is_alive();

        for report in reports {
            let mut text = match report.hp_delta {
                d if d < 0 => format!("{name} takes {} damage from {}.", -d, report.name),
                d if d > 0 => format!("{name} recovers {d} HP from {}.", report.name),
                _ => String::new(),
            };
            if report.expired && alive {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&format!("{} wore off.", report.name));
            }
            if !text.is_empty() {
                self.log
                    .push(LogEntry::new(EntryKind::StatusTick, report.name, text));
            }
        }
        if !alive {
            self.log.push(LogEntry::new(
                EntryKind::StatusTick,
                format!("{name} has fallen"),
                format!("{name} has been defeated!"),
            ));
        }
    }

    fn after_turn(&mut self, actor: String) -> TurnStart {
        match self.check_outcome() {
            Some(outcome) => TurnStart::Finished(outcome),
            None => TurnStart::Skipped { actor },
        }
    }

    // ========================================================================
    // Outcome
    // ========================================================================

    /// Fled beats victory beats defeat. Returns `None` while the fight goes on.
    fn check_outcome(&mut self) -> Option<BattleOutcome> {
        if let BattlePhase::Finished(outcome) = self.phase {
            return Some(outcome);
        }
        let outcome = if self.fled {
            BattleOutcome::PartyRan
        } else if !self.roster.side_alive(Side::Enemies) {
            BattleOutcome::PartyVictory
        } else if !self.roster.side_alive(Side::Allies) {
            BattleOutcome::PartyDefeated
        } else {
            return None;
        };
        Some(self.finish(outcome))
    }

    fn finish(&mut self, outcome: BattleOutcome) -> BattleOutcome {
        for id in self.roster.ids() {
            self.roster.get_mut(id).reset_sp();
        }

        let mut text = format!(
            "Your party [{}] {} the {} enemie(s) [{}]!",
            labels(self.roster.party()),
            outcome.verb(),
            self.roster.enemies().members.len(),
            labels(self.roster.enemies()),
        );

        let mut level_ups = Vec::new();
        if outcome == BattleOutcome::PartyVictory {
            let rewards = self.award_victory(&mut level_ups);
            text.push_str(&format!(
                "\n\nParty earned {} {}!\n\n",
                rewards.currency, self.currency_name
            ));
            for member in &self.roster.party().members {
                text.push_str(&format!(
                    "{} earned {} experience!\n",
                    member.name, rewards.experience
                ));
            }
        }

        self.log.push(LogEntry::new(
            EntryKind::Result,
            format!("You {} the enemies!", outcome.verb()),
            text,
        ));
        for (name, narration) in level_ups {
            self.log.push(LogEntry::new(
                EntryKind::LevelUp,
                format!("{name} leveled up!"),
                narration,
            ));
        }

        info!(target: "game_core::battle", outcome = %outcome, "battle finished");
        self.pending = None;
        self.phase = BattlePhase::Finished(outcome);
        outcome
    }

    fn award_victory(&mut self, level_ups: &mut Vec<(String, String)>) -> BattleRewards {
        let rewards = self
            .roster
            .enemies()
            .members
            .iter()
            .filter_map(Combatant::enemy_data)
            .fold(BattleRewards::default(), |acc, data| BattleRewards {
                currency: acc.currency + data.currency,
                experience: acc.experience + data.experience,
            });

        let party = self.roster.party_mut();
        party.currency += rewards.currency;
        party.collect_stolen_items();
        for member in &mut party.members {
            for narration in member.gain_xp(rewards.experience) {
                level_ups.push((member.name.clone(), narration));
            }
        }
        self.rewards = Some(rewards);
        rewards
    }
}

/// "Name (description)" as shown in start and result narration.
fn roster_label(c: &Combatant) -> String {
    if c.description.is_empty() {
        c.label()
    } else {
        format!("{} ({})", c.name, c.description)
    }
}

fn labels(party: &Party) -> String {
    party
        .members
        .iter()
        .map(roster_label)
        .collect::<Vec<_>>()
        .join(", ")
}
