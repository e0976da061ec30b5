mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use common::{hero, party_of, slime};
use game_core::battle::{DecisionContext, TurnStart};
use game_core::{Battle, BattleAction, BattleOutcome, GameConfig, Party, SequenceRng, TargetSpec};
use runtime::oracle::{BattleCommandOracle, BattleCommandRequest, RawBattleCommand};
use runtime::{
    BattleRunner, BattleSetup, ChoiceRequest, Controller, EventBus, ExternalController, OracleController,
    OracleError, OracleResult, RetryPolicy, ScriptedController, SelectionError,
};

fn hero_decision() -> DecisionContext {
    let mut party = party_of(vec![hero()]);
    let mut battle = Battle::new(
        &mut party,
        Party::enemies(vec![slime(100)]),
        GameConfig::default(),
        SequenceRng::constant(0.5),
    );
    battle.start("ambush", "").unwrap();
    match battle.begin_turn().unwrap() {
        TurnStart::AwaitingDecision(context) => *context,
        other => panic!("expected a decision, got {other:?}"),
    }
}

/// Always proposes the same command and counts calls.
struct FixedCommand {
    command: RawBattleCommand,
    calls: AtomicU32,
}

impl FixedCommand {
    fn new(command: RawBattleCommand) -> Self {
        Self {
            command,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl BattleCommandOracle for FixedCommand {
    async fn generate_battle_command(&self, _request: &BattleCommandRequest) -> OracleResult<RawBattleCommand> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.command.clone())
    }
}

struct Offline;

#[async_trait]
impl BattleCommandOracle for Offline {
    async fn generate_battle_command(&self, _request: &BattleCommandRequest) -> OracleResult<RawBattleCommand> {
        Err(OracleError::Unavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn oracle_controller_accepts_valid_commands_and_remembers_them() {
    let context = hero_decision();
    let oracle = Arc::new(FixedCommand::new(RawBattleCommand {
        action_type: "attack".to_string(),
        target: Some("Slime".to_string()),
        ..RawBattleCommand::default()
    }));
    let mut controller = OracleController::new(oracle.clone(), RetryPolicy::once());

    let action = controller.decide_action(&context).await.unwrap();
    assert_eq!(
        action,
        BattleAction::Attack {
            target: TargetSpec::Name("Slime".to_string()),
        }
    );
    assert_eq!(controller.previous_action(), Some("attack Slime"));
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn oracle_controller_replaces_unknown_action_types() {
    let context = hero_decision();
    let oracle = Arc::new(FixedCommand::new(RawBattleCommand {
        action_type: "dance".to_string(),
        target: Some("Slime".to_string()),
        ..RawBattleCommand::default()
    }));
    let mut controller = OracleController::new(oracle, RetryPolicy::once());

    let action = controller.decide_action(&context).await.unwrap();
    assert_eq!(action, BattleAction::attack_random());
}

#[tokio::test]
async fn oracle_controller_survives_an_unreachable_oracle() {
    let context = hero_decision();
    let mut controller = OracleController::new(Arc::new(Offline), RetryPolicy::new(2, std::time::Duration::ZERO));

    let action = controller.decide_action(&context).await.unwrap();
    assert_eq!(action, BattleAction::attack_random());
}

#[tokio::test]
async fn rejected_selection_is_reported_and_the_same_turn_continues() {
    let (controller, mut handle) = ExternalController::channel(4);
    let bus = EventBus::new();
    let mut runner = BattleRunner::new(controller, ScriptedController::default(), GameConfig::default(), bus);

    let battle = tokio::spawn(async move {
        let mut party = party_of(vec![hero()]);
        let report = runner
            .fight(
                &mut party,
                Party::enemies(vec![slime(10)]),
                &BattleSetup::new("ambush", ""),
                SequenceRng::constant(0.5),
            )
            .await;
        (report, party)
    });

    let Some(ChoiceRequest::Decide(context)) = handle.requests.recv().await else {
        panic!("expected a decision request");
    };
    assert_eq!(context.actor.name, "Hero");

    handle
        .selections
        .send(BattleAction::Spell {
            spell_name: "Inferno".to_string(),
            target: TargetSpec::RandomEnemy,
        })
        .await
        .unwrap();
    match handle.requests.recv().await {
        Some(ChoiceRequest::Rejected { actor, reason }) => {
            assert_eq!(actor, "Hero");
            assert!(matches!(reason, SelectionError::SpellUnavailable(_)));
        }
        other => panic!("expected a rejection, got {other:?}"),
    }

    handle
        .selections
        .send(BattleAction::Item {
            item_name: "Potion".to_string(),
            target: TargetSpec::Name("Hero".to_string()),
        })
        .await
        .unwrap();
    assert!(matches!(
        handle.requests.recv().await,
        Some(ChoiceRequest::Rejected {
            reason: SelectionError::NoItem(_),
            ..
        })
    ));

    handle
        .selections
        .send(BattleAction::Attack {
            target: TargetSpec::Name(context.enemies[0].name.clone()),
        })
        .await
        .unwrap();

    let (report, party) = battle.await.unwrap();
    assert_eq!(report.unwrap().outcome, BattleOutcome::PartyVictory);
    assert_eq!(party.currency, 30);
}

#[tokio::test]
async fn dropped_player_handle_closes_the_battle() {
    let (controller, handle) = ExternalController::channel(1);
    drop(handle);
    let mut runner = BattleRunner::new(controller, ScriptedController::default(), GameConfig::default(), EventBus::new());
    let mut party = party_of(vec![hero()]);

    let result = runner
        .fight(
            &mut party,
            Party::enemies(vec![slime(10)]),
            &BattleSetup::new("ambush", ""),
            SequenceRng::constant(0.5),
        )
        .await;
    assert!(matches!(result, Err(runtime::RuntimeError::ChannelClosed(_))));
}
