use super::*;
use crate::ability::{BaseClass, Skill, SkillKind, Spell, SpellEffect};
use crate::character::{Combatant, EnemyKind};
use crate::config::GameConfig;
use crate::element::Element;
use crate::item::{Item, ItemKind};
use crate::party::Party;
use crate::rng::SequenceRng;
use crate::stats::{StatBlock, StatKind};
use crate::status::StatusEffect;

fn hero() -> Combatant {
    let mut hero = Combatant::player("Hero", "Knight", BaseClass::Brave, 1, &GameConfig::default());
    hero.stats = StatBlock::new(100, 60)
        .with(StatKind::Attack, 20)
        .with(StatKind::Speed, 15);
    hero
}

/// Speed 0 never accumulates time units, so it never acts.
fn slime(hp: i32) -> Combatant {
    let stats = StatBlock::new(hp, 0).with(StatKind::Speed, 0);
    let mut slime = Combatant::enemy("Slime", "Ooze", 1, stats, EnemyKind::Regular);
    if let Some(data) = slime.enemy_data_mut() {
        data.currency = 30;
        data.experience = 50;
    }
    slime
}

fn expect_decision(battle: &mut Battle<'_>) -> DecisionContext {
    match battle.begin_turn().unwrap() {
        TurnStart::AwaitingDecision(context) => *context,
        other => panic!("expected a decision, got {other:?}"),
    }
}

fn started<'p>(party: &'p mut Party, enemies: Vec<Combatant>, roll: f64) -> Battle<'p> {
    let mut battle = Battle::new(
        party,
        Party::enemies(enemies),
        GameConfig::default(),
        SequenceRng::constant(roll),
    );
    battle.start("ambush", "a quiet meadow").unwrap();
    battle
}

#[test]
fn neutral_roll_attack_deals_forty() {
    let mut party = Party::new(vec![hero()], 3);
    let mut battle = started(&mut party, vec![slime(100)], 0.5);

    let context = expect_decision(&mut battle);
    assert_eq!(context.actor.name, "Hero");
    let outcome = battle
        .resolve_turn(BattleAction::Attack {
            target: TargetSpec::Name("Slime".into()),
        })
        .unwrap();

    assert_eq!(outcome, None);
    assert_eq!(battle.find("Slime").map(|c| c.stats.hp), Some(60));
    assert_eq!(battle.find("Hero").map(|c| c.stats.sp), Some(1));
    assert!(battle.log().contains("Hero attacks Slime for 40 damage\nNo elemental interaction."));
}

#[test]
fn victory_pays_out_and_resets_sp() {
    let mut aria = hero();
    aria.stats.attack = 100;
    let mut party = Party::new(vec![aria], 3);
    {
        let mut battle = started(&mut party, vec![slime(10), slime(10)], 0.5);
        let outcome = battle.run_with(|_| BattleAction::attack_random()).unwrap();
        assert_eq!(outcome, BattleOutcome::PartyVictory);
        assert_eq!(
            battle.rewards(),
            Some(BattleRewards {
                currency: 60,
                experience: 100
            })
        );
        assert!(battle.log().contains("Party earned 60 Gold!"));
        assert!(battle.log().contains("Hero earned 100 experience!"));
        assert!(battle.log().contains("Slime (A)"));
    }

    let hero = &party.members[0];
    assert_eq!(party.currency, 60);
    assert_eq!(hero.player_data().map(|d| d.experience), Some(100));
    assert_eq!(hero.stats.sp, 0);
}

#[test]
fn already_decided_battle_finishes_immediately() {
    let mut dead = slime(10);
    dead.hp_change(-10);
    let mut party = Party::new(vec![hero()], 3);
    let mut battle = started(&mut party, vec![dead], 0.5);
    assert_eq!(
        battle.begin_turn().unwrap(),
        TurnStart::Finished(BattleOutcome::PartyVictory)
    );
}

#[test]
fn sleeping_actor_loses_turn_without_cost() {
    let mut sleeper = hero();
    sleeper.add_status_effect(StatusEffect::sleep(3));
    let mut party = Party::new(vec![sleeper], 3);
    let mut battle = started(&mut party, vec![slime(100)], 0.5);

    assert_eq!(
        battle.begin_turn().unwrap(),
        TurnStart::Skipped {
            actor: "Hero".into()
        }
    );
    let entry = battle
        .log()
        .entries()
        .iter()
        .find(|e| e.kind == EntryKind::CannotAct)
        .cloned()
        .unwrap();
    assert_eq!(entry.title, "Hero cannot act");
    assert_eq!(entry.text, "Hero (Knight) is asleep and cannot act");

    let hero = battle.find("Hero").unwrap();
    assert_eq!((hero.stats.hp, hero.stats.mp, hero.stats.sp), (100, 60, 0));
    assert_eq!(hero.status.get("Sleep").map(|e| e.duration), Some(2));
}

#[test]
fn lethal_poison_ends_turn_before_decision() {
    let mut victim = hero();
    victim.stats.hp = 5;
    victim.add_status_effect(StatusEffect::poison(3, 10));
    let mut party = Party::new(vec![victim], 3);
    let mut battle = started(&mut party, vec![slime(100)], 0.5);

    assert_eq!(
        battle.begin_turn().unwrap(),
        TurnStart::Finished(BattleOutcome::PartyDefeated)
    );
    assert!(battle.log().contains("Hero has been defeated!"));
    assert!(battle.log().contains("You were defeated by the enemies!"));
}

#[test]
fn running_ends_battle_and_keeps_effects() {
    let mut runner = hero();
    runner.add_status_effect(StatusEffect::silence(5));
    let mut party = Party::new(vec![runner], 3);
    {
        let mut battle = started(&mut party, vec![slime(100)], 0.5);
        expect_decision(&mut battle);
        let outcome = battle.resolve_turn(BattleAction::Run).unwrap();
        assert_eq!(outcome, Some(BattleOutcome::PartyRan));
        assert!(battle.log().contains("You attempt to run away..."));
        assert_eq!(
            battle.begin_turn().unwrap(),
            TurnStart::Finished(BattleOutcome::PartyRan)
        );
    }
    let survivor = &party.members[0];
    assert_eq!(survivor.status.get("Silence").map(|e| e.duration), Some(4));
    assert!(!survivor.flags.can_cast_spells);
    assert_eq!(survivor.stats.sp, 0);
    assert_eq!(party.currency, 0);
}

#[test]
fn enemy_running_ends_battle_as_fled() {
    let mut sprinter = slime(100);
    sprinter.stats.speed = 200;
    let mut party = Party::new(vec![hero()], 3);
    let mut battle = started(&mut party, vec![sprinter], 0.5);

    let context = expect_decision(&mut battle);
    assert_eq!(context.actor.name, "Slime");
    assert!(!context.is_player);
    let outcome = battle.resolve_turn(BattleAction::Run).unwrap();
    assert_eq!(outcome, Some(BattleOutcome::PartyRan));
    assert_eq!(
        battle.begin_turn().unwrap(),
        TurnStart::Finished(BattleOutcome::PartyRan)
    );
}

#[test]
fn sleep_wears_off_when_everyone_is_asleep() {
    let mut sleeper = hero();
    sleeper.add_status_effect(StatusEffect::sleep(2));
    let mut dozing = slime(100);
    dozing.stats.speed = 10;
    dozing.add_status_effect(StatusEffect::sleep(2));
    let mut party = Party::new(vec![sleeper], 3);
    let mut battle = started(&mut party, vec![dozing], 0.5);

    let mut skipped = 0;
    let woke = loop {
        match battle.begin_turn().unwrap() {
            TurnStart::Skipped { .. } => skipped += 1,
            TurnStart::AwaitingDecision(context) => break context.actor.name,
            TurnStart::Finished(outcome) => panic!("battle ended early: {outcome:?}"),
        }
        assert!(skipped < 10, "nobody ever woke up");
    };

    assert_eq!(skipped, 4);
    assert!(battle.log().contains("Sleep wore off."));
    assert!(battle.find(&woke).unwrap().flags.can_act);
}

#[test]
fn critical_on_huge_damage_saturates() {
    let mut brute = hero();
    brute.stats.attack = 1_000_000;
    let mut party = Party::new(vec![brute], 3);
    let mut battle = started(&mut party, vec![slime(100)], 0.99);

    expect_decision(&mut battle);
    let outcome = battle
        .resolve_turn(BattleAction::Attack {
            target: TargetSpec::Name("Slime".into()),
        })
        .unwrap();

    assert_eq!(outcome, Some(BattleOutcome::PartyVictory));
    assert!(battle.log().contains("Hero attacks Slime for 100 damage"));
    assert!(battle.log().contains("Critical hit!"));
}

#[test]
fn decision_context_knows_names_in_any_case() {
    let mut party = Party::new(vec![hero()], 3);
    let mut battle = started(&mut party, vec![slime(100)], 0.5);

    let context = expect_decision(&mut battle);
    assert!(context.knows_combatant("Slime"));
    assert!(context.knows_combatant("slime"));
    assert!(context.knows_combatant("HERO"));
    assert!(!context.knows_combatant("Goblin"));
}

#[test]
fn double_cast_spends_mp_for_both_casts() {
    let mut mage = hero()
        .with_skill(Skill::new(SkillKind::DoubleCast))
        .with_spells(vec![Spell::new("Ember", "A small flame", 1, SpellEffect::Elemental {
            element: Element::Fire,
        })]);
    mage.stats.intelligence = 20;
    let mut party = Party::new(vec![mage], 3);
    let mut battle = started(&mut party, vec![slime(1_000)], 0.5);

    // Earn the SP first.
    expect_decision(&mut battle);
    battle.resolve_turn(BattleAction::Defend).unwrap();

    let context = expect_decision(&mut battle);
    assert!(context.available.skills.iter().any(|s| s.name == "Double Cast" && s.requires_spell));
    battle
        .resolve_turn(BattleAction::Skill {
            skill_name: "Double Cast".into(),
            target: TargetSpec::Name("Slime".into()),
            spell_name: Some("Ember".into()),
        })
        .unwrap();

    let mage = battle.find("Hero").unwrap();
    assert_eq!(mage.stats.mp, 0);
    assert_eq!(mage.stats.sp, 0);
    let casts = battle
        .log()
        .entries()
        .iter()
        .filter(|e| e.title == "Ember cast!")
        .count();
    assert_eq!(casts, 2);
    // 50 × (20 / 10) per cast at a neutral roll.
    assert_eq!(battle.find("Slime").map(|c| c.stats.hp), Some(800));
}

#[test]
fn silenced_caster_keeps_mp() {
    let mut mage = hero().with_spells(vec![Spell::new("Ember", "", 1, SpellEffect::Elemental {
        element: Element::Fire,
    })]);
    mage.add_status_effect(StatusEffect::silence(3));
    let mut party = Party::new(vec![mage], 3);
    let mut battle = started(&mut party, vec![slime(100)], 0.5);

    let context = expect_decision(&mut battle);
    assert!(context.available.spells.is_empty());
    battle
        .resolve_turn(BattleAction::Spell {
            spell_name: "Ember".into(),
            target: TargetSpec::RandomEnemy,
        })
        .unwrap();

    assert!(battle.log().contains("Hero is silenced and cannot cast spells"));
    assert_eq!(battle.find("Hero").map(|c| c.stats.mp), Some(60));
    assert_eq!(battle.find("Slime").map(|c| c.stats.hp), Some(100));
}

#[test]
fn healing_item_is_consumed_from_inventory() {
    let mut wounded = hero();
    wounded.stats.hp = 20;
    let mut party = Party::new(vec![wounded], 3);
    party.add_item(Item::new("Potion", "Heals 50 HP", 1, ItemKind::Healing));
    party.add_item(Item::new("Potion", "Heals 50 HP", 1, ItemKind::Healing));
    {
        let mut battle = started(&mut party, vec![slime(100)], 0.5);
        let context = expect_decision(&mut battle);
        assert_eq!(context.available.items[0].count, 2);
        battle
            .resolve_turn(BattleAction::Item {
                item_name: "Potion".into(),
                target: TargetSpec::Name("Hero".into()),
            })
            .unwrap();
        assert!(battle.log().contains("Potion used! Hero (Knight) healed for 50 HP"));
        assert_eq!(battle.find("Hero").map(|c| (c.stats.hp, c.stats.sp)), Some((70, 1)));
    }
    assert_eq!(party.item_counts(), vec![("Potion".to_string(), 1)]);
}

#[test]
fn unresolvable_target_is_narrated() {
    let mut party = Party::new(vec![hero()], 3);
    let mut battle = started(&mut party, vec![slime(100)], 0.5);
    expect_decision(&mut battle);
    battle
        .resolve_turn(BattleAction::Attack {
            target: TargetSpec::Name("Ghost".into()),
        })
        .unwrap();

    assert!(battle.log().contains("Hero has no valid target: Ghost"));
    assert_eq!(battle.find("Hero").map(|c| c.stats.sp), Some(0));
}

#[test]
fn steal_moves_loot_to_temporary_inventory() {
    let thief = hero().with_skill(Skill::new(SkillKind::Steal));
    let mut mark = slime(100);
    if let Some(data) = mark.enemy_data_mut() {
        data.loot.push(Item::new("Ether", "", 1, ItemKind::MpRestore));
    }
    let mut party = Party::new(vec![thief], 3);
    // A roll of 0.0 always passes the steal check.
    let mut battle = started(&mut party, vec![mark], 0.0);

    expect_decision(&mut battle);
    battle.resolve_turn(BattleAction::Defend).unwrap();
    expect_decision(&mut battle);
    battle
        .resolve_turn(BattleAction::Skill {
            skill_name: "steal".into(),
            target: TargetSpec::Name("Slime".into()),
            spell_name: None,
        })
        .unwrap();

    assert!(battle.log().contains("Hero successfully steals Ether from Slime!"));
    let stolen = battle
        .find("Hero")
        .and_then(|c| c.player_data())
        .map(|d| d.temp_inventory.len());
    assert_eq!(stolen, Some(1));
    assert_eq!(battle.find("Slime").and_then(|c| c.enemy_data()).map(|d| d.loot.len()), Some(0));
}

#[test]
fn forecast_matches_actual_order() {
    let mut fast = hero();
    fast.stats.speed = 31;
    let mut slow = Combatant::player("Mira", "Bard", BaseClass::Kind, 1, &GameConfig::default());
    slow.stats.speed = 7;
    let mut bat = slime(100);
    bat.name = "Bat".into();
    bat.stats.speed = 15;

    let mut party = Party::new(vec![fast, slow], 3);
    let mut battle = started(&mut party, vec![bat, slime(100)], 0.5);

    let first = expect_decision(&mut battle);
    let forecast = first.turn_order.clone();
    let mut actual = vec![first.actor.name];
    battle.resolve_turn(BattleAction::Pass).unwrap();
    while actual.len() < forecast.len() {
        let context = expect_decision(&mut battle);
        actual.push(context.actor.name);
        battle.resolve_turn(BattleAction::Pass).unwrap();
    }

    assert_eq!(forecast.len(), GameConfig::DEFAULT_PREDICTED_TURNS);
    assert_eq!(forecast, actual);
}

#[test]
fn steps_out_of_order_are_rejected() {
    let mut party = Party::new(vec![hero()], 3);
    let mut battle = Battle::new(
        &mut party,
        Party::enemies(vec![slime(100)]),
        GameConfig::default(),
        SequenceRng::constant(0.5),
    );
    assert_eq!(battle.begin_turn(), Err(BattleError::NotStarted));
    battle.start("ambush", "").unwrap();
    assert_eq!(battle.start("ambush", ""), Err(BattleError::AlreadyStarted));
    assert_eq!(battle.resolve_turn(BattleAction::Pass), Err(BattleError::NoPendingDecision));

    expect_decision(&mut battle);
    assert!(matches!(battle.begin_turn(), Err(BattleError::DecisionPending(_))));
}

#[test]
fn duplicate_enemy_names_get_letters() {
    let names: Vec<String> = ["Slime", "Bat", "Slime", "Slime"].iter().map(|s| s.to_string()).collect();
    assert_eq!(
        unique_enemy_names(&names),
        vec!["Slime (A)", "Bat", "Slime (B)", "Slime (C)"]
    );
}

#[test]
fn group_heal_reaches_every_living_ally() {
    let mut healer = Combatant::player("Mira", "Cleric", BaseClass::Kind, 40, &GameConfig::default());
    healer.stats.speed = 50;
    healer.stats.wisdom = 100;
    let mut hurt = hero();
    hurt.stats.hp = 10;
    hurt.stats.speed = 0;
    let mut party = Party::new(vec![healer, hurt], 3);
    let mut battle = started(&mut party, vec![slime(100)], 0.5);

    for _ in 0..2 {
        let context = expect_decision(&mut battle);
        assert_eq!(context.actor.name, "Mira");
        battle.resolve_turn(BattleAction::Defend).unwrap();
    }

    expect_decision(&mut battle);
    battle
        .resolve_turn(BattleAction::Skill {
            skill_name: "Group Heal".into(),
            target: TargetSpec::Name("Mira".into()),
            spell_name: None,
        })
        .unwrap();

    // int(100 × 0.8) at a neutral variance roll.
    assert_eq!(battle.find("Hero").map(|c| c.stats.hp), Some(90));
    assert!(battle.log().contains("Mira channels healing energy to the group!"));
}
