use std::sync::Arc;

use arena_battle_arena::TileGrid;
use arena_battle_catalog::BuiltinCatalog;
use arena_battle_core::{BattleSummary, Command, Event, PlayerId, Position, TowerSlot};
use arena_battle_world::{self as world, query, BattleConfig, BattleState};
use tracing_subscriber::EnvFilter;

const DT: f32 = 1.0 / 30.0;

fn deck(cards: [&str; 8]) -> Vec<String> {
    cards.iter().map(|card| (*card).to_owned()).collect()
}

fn battle(seed: u64, decks: [Vec<String>; 2]) -> BattleState {
    let catalog = BuiltinCatalog::standard().expect("standard catalog is valid");
    let config = BattleConfig {
        seed,
        ..BattleConfig::default()
    };
    BattleState::new(config, TileGrid::standard(), Arc::new(catalog), decks)
        .expect("decks resolve against the standard catalog")
}

fn steps(seconds: f32) -> impl Iterator<Item = Command> {
    let ticks = (seconds / DT).round() as usize;
    std::iter::repeat(Command::Step { dt: DT }).take(ticks)
}

fn deploy(player: PlayerId, card: &str, x: f32, y: f32) -> Command {
    Command::DeployCard {
        player,
        card: card.to_owned(),
        position: Position::new(x, y),
    }
}

fn scripted_match(seed: u64) -> (Vec<Event>, BattleSummary) {
    let cards = [
        "Knight", "Archers", "Giant", "Valkyrie", "Fireball", "Zap", "Golem", "Witch",
    ];
    let mut battle = battle(seed, [deck(cards), deck(cards)]);

    let mut commands = vec![
        deploy(PlayerId::BOTTOM, "Knight", 3.5, 10.5),
        deploy(PlayerId::TOP, "Knight", 14.5, 21.5),
    ];
    commands.extend(steps(10.0));
    commands.push(deploy(PlayerId::BOTTOM, "Archers", 4.5, 10.5));
    commands.push(deploy(PlayerId::TOP, "Valkyrie", 9.5, 22.5));
    commands.extend(steps(60.0));

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut battle, command, &mut events);
    }
    (events, query::summary(&battle))
}

fn tower(battle: &BattleState, owner: PlayerId, slot: TowerSlot) -> (f32, f32) {
    query::entities(battle)
        .find(|entity| entity.owner() == owner && entity.tower_slot() == Some(slot))
        .map(|entity| (entity.hitpoints, entity.card().stats().hitpoints))
        .expect("tower stands")
}

#[test]
fn standard_catalog_plays_deterministic_matches() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let (first_events, first) = scripted_match(11);
    let (second_events, second) = scripted_match(11);
    assert_eq!(first_events, second_events);
    assert_eq!(first, second);

    let deployed = first_events
        .iter()
        .filter(|event| matches!(event, Event::CardDeployed { .. }))
        .count();
    assert_eq!(deployed, 4, "every scripted deployment must be accepted");
}

#[test]
fn decks_accept_community_spellings() {
    let cards = [
        "Zap", "The Log", "Miner", "Knight", "Archers", "Bandit", "Hog Rider", "Fireball",
    ];
    let battle = battle(3, [deck(cards), deck(cards)]);
    assert_eq!(
        query::hand(&battle, PlayerId::BOTTOM),
        ["Zap", "Log", "Miner", "Knight"]
    );
}

#[test]
fn deploy_rules_follow_card_placement() {
    let cards = [
        "Zap", "The Log", "Miner", "Knight", "Archers", "Bandit", "Hog Rider", "Fireball",
    ];
    let battle = battle(3, [deck(cards), deck(cards)]);
    let bottom = PlayerId::BOTTOM;
    let own_side = Position::new(9.5, 10.5);
    let enemy_side = Position::new(9.5, 20.5);

    assert!(query::can_place(&battle, bottom, "The Log", own_side));
    assert!(!query::can_place(&battle, bottom, "The Log", enemy_side));
    assert!(query::can_place(&battle, bottom, "Miner", enemy_side));
    assert!(!query::can_place(&battle, bottom, "Knight", enemy_side));
    assert!(query::can_place(&battle, bottom, "Fireball", enemy_side));
}

#[test]
fn zap_deals_reduced_damage_to_crown_towers() {
    let cards = [
        "Zap", "The Log", "Miner", "Knight", "Archers", "Bandit", "Hog Rider", "Fireball",
    ];
    let mut battle = battle(5, [deck(cards), deck(cards)]);
    let site = battle.grid().tower_site(PlayerId::TOP, TowerSlot::Left);
    let (before, _) = tower(&battle, PlayerId::TOP, TowerSlot::Left);

    assert!(battle.deploy_card(PlayerId::BOTTOM, "Zap", site));
    let (after, _) = tower(&battle, PlayerId::TOP, TowerSlot::Left);
    assert!((before - after - 192.0 * 0.3).abs() < 1e-3);
    let (king, full) = tower(&battle, PlayerId::TOP, TowerSlot::King);
    assert_eq!(king, full);
}

#[test]
fn golem_releases_golemites_when_destroyed() {
    let cards = [
        "Golem", "Knight", "Archers", "Giant", "Valkyrie", "Fireball", "Zap", "Witch",
    ];
    let mut battle = battle(9, [deck(cards), deck(cards)]);
    let golem = battle
        .spawn_card(PlayerId::BOTTOM, "Golem", Position::new(9.5, 10.5))
        .expect("golem spawns");

    let _ = battle.damage_entity(golem, 1.0e6);
    battle.step(DT);

    assert!(battle.entity(golem).is_none());
    let golemites = query::units(&battle, PlayerId::BOTTOM)
        .into_iter()
        .filter(|entity| entity.card().name() == "Golemite")
        .count();
    assert_eq!(golemites, 2);
}

#[test]
fn ice_spirits_freeze_their_target_and_are_spent() {
    let cards = [
        "Ice Spirit", "Mega Knight", "Royal Ghost", "Knight", "Archers", "Zap", "Miner", "Witch",
    ];
    let mut battle = battle(13, [deck(cards), deck(cards)]);
    assert_eq!(
        query::hand(&battle, PlayerId::BOTTOM),
        ["IceSpirits", "MegaKnight", "Ghost", "Knight"]
    );

    let _spirit = battle
        .spawn_card(PlayerId::BOTTOM, "IceSpirits", Position::new(9.5, 10.5))
        .expect("spirit spawns");
    let knight = battle
        .spawn_card(PlayerId::TOP, "Knight", Position::new(9.5, 12.5))
        .expect("knight spawns");
    let full = battle.entity(knight).map(|entity| entity.hitpoints);
    for command in steps(1.5) {
        let mut events = Vec::new();
        world::apply(&mut battle, command, &mut events);
    }

    let spirits = query::units(&battle, PlayerId::BOTTOM)
        .into_iter()
        .filter(|entity| entity.card().name() == "IceSpirits")
        .count();
    assert_eq!(spirits, 0);
    let knight = battle.entity(knight).expect("knight survives");
    assert!(full.is_some_and(|full| knight.hitpoints < full));
    assert!(knight.status.is_stunned());
}
