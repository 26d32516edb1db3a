use std::collections::BTreeMap;
use std::sync::Arc;

use arena_battle_arena::{ring_formation, TileGrid};
use arena_battle_core::{
    CardStats, DeployRejection, DeployRule, ElixirRate, EntityId, Event, MatchOutcome, PlayerId,
    Position, TowerSlot, WinReason,
};
use arena_battle_world::{
    self as world, query, BattleConfig, BattleState, CardCatalog, CardDefinition, Effect,
    EffectContext, Mechanic, MechanicContext, PhaseConfig,
};

#[derive(Debug)]
struct Burst {
    radius: f32,
    damage: f32,
}

impl Effect for Burst {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let victims = context
            .battle
            .enemies_within(context.caster, context.target, self.radius);
        for victim in victims {
            let _ = context.battle.damage_entity(victim, self.damage);
        }
    }
}

#[derive(Clone, Debug)]
struct Split {
    unit: &'static str,
    count: u32,
}

impl Mechanic for Split {
    fn on_death(&mut self, context: &mut MechanicContext<'_>) {
        let Some((owner, center)) = context
            .entity()
            .map(|entity| (entity.owner(), entity.position))
        else {
            return;
        };
        for spot in ring_formation(center, self.count, 1.0) {
            let _ = context.battle.spawn_card(owner, self.unit, spot);
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Default)]
struct TestCatalog {
    cards: BTreeMap<String, Arc<CardDefinition>>,
    aliases: BTreeMap<String, String>,
}

impl TestCatalog {
    fn standard() -> Self {
        let mut catalog = Self::default();
        catalog.add(CardDefinition::new(CardStats {
            hitpoints: 5000.0,
            damage: 150.0,
            range: 1.2,
            ..CardStats::troop("Knight", 3)
        }));
        catalog.add(CardDefinition::new(CardStats {
            hitpoints: 250.0,
            damage: 80.0,
            range: 5.0,
            count: 2,
            target_type: arena_battle_core::TargetType::AirAndGround,
            ..CardStats::troop("Archers", 3)
        }));
        catalog.add(CardDefinition::new(CardStats {
            hitpoints: 800.0,
            damage: 100.0,
            ..CardStats::building("Cannon", 3)
        }));
        catalog.add(
            CardDefinition::new(CardStats::spell("Fireball", 4)).map(|card| {
                card.with_effect(Burst {
                    radius: 2.5,
                    damage: 100.0,
                })
            }),
        );
        catalog.add(CardDefinition::new(CardStats::troop("Golemite", 4)));
        catalog.add(
            CardDefinition::new(CardStats {
                hitpoints: 4000.0,
                speed: 45.0,
                target_type: arena_battle_core::TargetType::Buildings,
                ..CardStats::troop("Golem", 8)
            })
            .map(|card| {
                card.with_mechanic(Split {
                    unit: "Golemite",
                    count: 2,
                })
            }),
        );
        catalog.add(CardDefinition::new(CardStats {
            deploy_rule: DeployRule::Anywhere,
            ..CardStats::troop("Miner", 3)
        }));
        catalog.add(CardDefinition::new(CardStats::troop("Giant", 5)));
        catalog.add(CardDefinition::new(CardStats::troop("Skeletons", 1)));
        let _ = catalog
            .aliases
            .insert("Sir Knight".to_owned(), "Knight".to_owned());
        catalog
    }

    fn add(&mut self, definition: Result<CardDefinition, arena_battle_core::DefinitionError>) {
        let definition = definition.expect("test card is valid");
        let _ = self
            .cards
            .insert(definition.name().to_owned(), Arc::new(definition));
    }
}

impl CardCatalog for TestCatalog {
    fn lookup(&self, name: &str) -> Option<Arc<CardDefinition>> {
        let canonical = self.aliases.get(name).map_or(name, String::as_str);
        self.cards.get(canonical).cloned()
    }
}

fn deck(cards: [&str; 8]) -> Vec<String> {
    cards.iter().map(|card| (*card).to_owned()).collect()
}

fn standard_deck() -> Vec<String> {
    deck([
        "Knight", "Archers", "Cannon", "Fireball", "Golem", "Miner", "Giant", "Skeletons",
    ])
}

fn battle_with(config: BattleConfig, bottom: Vec<String>) -> BattleState {
    BattleState::new(
        config,
        TileGrid::standard(),
        Arc::new(TestCatalog::standard()),
        [bottom, standard_deck()],
    )
    .expect("battle configuration is valid")
}

fn battle() -> BattleState {
    battle_with(BattleConfig::default(), standard_deck())
}

fn short_match() -> BattleConfig {
    BattleConfig {
        phases: PhaseConfig {
            double_elixir: 1.0,
            triple_elixir: 2.0,
            sudden_death: 3.0,
            tiebreak: 4.0,
        },
        ..BattleConfig::default()
    }
}

fn run_for(battle: &mut BattleState, seconds: f32) {
    let ticks = (seconds / battle.config().tick_seconds).round() as u32;
    for _ in 0..ticks {
        battle.tick();
    }
}

fn tower(battle: &BattleState, owner: PlayerId, slot: TowerSlot) -> EntityId {
    query::entities(battle)
        .find(|entity| entity.owner() == owner && entity.tower_slot() == Some(slot))
        .map(|entity| entity.id())
        .expect("tower is standing")
}

fn rejection(events: &[Event]) -> Option<DeployRejection> {
    events.iter().find_map(|event| match event {
        Event::DeployRejected { reason, .. } => Some(*reason),
        _ => None,
    })
}

fn deploy(battle: &mut BattleState, player: PlayerId, card: &str, x: f32, y: f32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        battle,
        arena_battle_core::Command::DeployCard {
            player,
            card: card.to_owned(),
            position: Position::new(x, y),
        },
        &mut events,
    );
    events
}

#[test]
fn battle_starts_with_six_towers_and_dormant_kings() {
    let mut battle = battle();
    assert_eq!(query::entity_count(&battle), 6);
    let spawned = battle
        .take_events()
        .into_iter()
        .filter(|event| matches!(event, Event::EntitySpawned { .. }))
        .count();
    assert_eq!(spawned, 6);
    assert!(battle.take_events().is_empty());
    assert!(!query::king_active(&battle, PlayerId::BOTTOM));
    assert!(!query::king_active(&battle, PlayerId::TOP));
    assert_eq!(query::hand(&battle, PlayerId::BOTTOM).len(), 4);
    assert_eq!(query::player(&battle, PlayerId::TOP).elixir(), 5.0);
}

#[test]
fn decks_must_hold_eight_cards() {
    let short = BattleState::new(
        BattleConfig::default(),
        TileGrid::standard(),
        Arc::new(TestCatalog::standard()),
        [standard_deck()[..7].to_vec(), standard_deck()],
    );
    assert!(matches!(
        short,
        Err(world::ConfigError::InvalidDeck { len: 7, .. })
    ));
}

#[test]
fn unknown_deck_cards_are_kept_but_never_deployable() {
    let mut unknown = standard_deck();
    unknown[0] = "Dragon".to_owned();
    let mut battle = BattleState::new(
        BattleConfig::default(),
        TileGrid::standard(),
        Arc::new(TestCatalog::standard()),
        [standard_deck(), unknown],
    )
    .expect("unresolved deck cards do not abort the match");
    assert_eq!(query::hand(&battle, PlayerId::TOP)[0], "Dragon");
    assert!(!query::can_deploy(
        &battle,
        PlayerId::TOP,
        "Dragon",
        Position::new(9.5, 21.5)
    ));

    let events = deploy(&mut battle, PlayerId::TOP, "Dragon", 9.5, 21.5);
    assert_eq!(rejection(&events), Some(DeployRejection::UnknownCard));
    assert_eq!(query::hand(&battle, PlayerId::TOP)[0], "Dragon");
    assert_eq!(query::player(&battle, PlayerId::TOP).elixir(), 5.0);
}

#[test]
fn deploy_rejections_are_reported_with_reasons() {
    let mut battle = battle();
    let events = deploy(&mut battle, PlayerId::BOTTOM, "Nope", 9.5, 10.5);
    assert_eq!(rejection(&events), Some(DeployRejection::UnknownCard));

    let events = deploy(&mut battle, PlayerId::BOTTOM, "Golem", 9.5, 10.5);
    assert_eq!(rejection(&events), Some(DeployRejection::CardNotInHand));

    let events = deploy(&mut battle, PlayerId::BOTTOM, "Knight", 9.5, 20.5);
    assert_eq!(rejection(&events), Some(DeployRejection::InvalidPosition));

    let events = deploy(&mut battle, PlayerId::BOTTOM, "Knight", 8.5, 15.5);
    assert_eq!(rejection(&events), Some(DeployRejection::InvalidPosition));

    assert!(battle.deploy_card(PlayerId::BOTTOM, "Knight", Position::new(9.5, 10.5)));
    let events = deploy(&mut battle, PlayerId::BOTTOM, "Archers", 9.5, 8.5);
    assert_eq!(rejection(&events), Some(DeployRejection::InsufficientElixir));
}

#[test]
fn deploying_debits_elixir_and_rotates_the_hand() {
    let mut battle = battle();
    let events = deploy(&mut battle, PlayerId::BOTTOM, "Knight", 9.5, 10.5);
    assert!(rejection(&events).is_none());
    assert!(events.iter().any(|event| matches!(
        event,
        Event::CardDeployed { card, .. } if card == "Knight"
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        Event::EntitySpawned { card, .. } if card == "Knight"
    )));
    let player = query::player(&battle, PlayerId::BOTTOM);
    assert!((player.elixir() - 2.0).abs() < 1e-6);
    assert_eq!(player.hand()[0], "Golem");
    assert_eq!(player.cycle().back().map(String::as_str), Some("Knight"));
}

#[test]
fn aliases_resolve_to_cards_in_hand() {
    let mut battle = battle();
    assert!(battle.deploy_card(PlayerId::BOTTOM, "Sir Knight", Position::new(9.5, 10.5)));
    assert_eq!(query::units(&battle, PlayerId::BOTTOM).len(), 1);
}

#[test]
fn multi_unit_cards_spawn_every_unit() {
    let mut battle = battle();
    assert!(battle.deploy_card(PlayerId::BOTTOM, "Archers", Position::new(9.5, 10.5)));
    let archers = query::units(&battle, PlayerId::BOTTOM);
    assert_eq!(archers.len(), 2);
    assert_ne!(archers[0].position, archers[1].position);
}

#[test]
fn buildings_may_not_overlap_other_footprints() {
    let config = BattleConfig {
        starting_elixir: 10.0,
        ..BattleConfig::default()
    };
    let mut battle = battle_with(config, standard_deck());
    let events = deploy(&mut battle, PlayerId::BOTTOM, "Cannon", 3.5, 7.5);
    assert_eq!(rejection(&events), Some(DeployRejection::FootprintCollision));

    assert!(battle.deploy_card(PlayerId::BOTTOM, "Cannon", Position::new(9.5, 10.5)));
    let events = deploy(&mut battle, PlayerId::BOTTOM, "Knight", 9.5, 10.5);
    assert_eq!(rejection(&events), Some(DeployRejection::FootprintCollision));
    assert!(battle.deploy_card(PlayerId::BOTTOM, "Knight", Position::new(9.5, 13.5)));
}

#[test]
fn anywhere_cards_may_drop_on_the_enemy_side() {
    let bottom = deck([
        "Miner", "Knight", "Archers", "Cannon", "Fireball", "Golem", "Giant", "Skeletons",
    ]);
    let mut battle = battle_with(BattleConfig::default(), bottom);
    assert!(!query::can_place(
        &battle,
        PlayerId::BOTTOM,
        "Knight",
        Position::new(9.5, 20.5)
    ));
    assert!(battle.deploy_card(PlayerId::BOTTOM, "Miner", Position::new(9.5, 20.5)));
}

#[test]
fn spells_apply_their_effects_immediately() {
    let mut battle = battle();
    let princess = tower(&battle, PlayerId::TOP, TowerSlot::Left);
    let before = query::entity(&battle, princess).map(|entity| entity.hitpoints);
    assert!(battle.deploy_card(PlayerId::BOTTOM, "Fireball", Position::new(3.5, 25.5)));
    let after = query::entity(&battle, princess).map(|entity| entity.hitpoints);
    assert_eq!(before.zip(after).map(|(b, a)| b - a), Some(100.0));

    battle.tick();
    let summary = query::summary(&battle);
    assert_eq!(summary.players[1].left_hitpoints, 3631.0 - 100.0);
}

#[test]
fn deploy_delay_holds_units_in_place() {
    let mut battle = battle();
    let drop = Position::new(9.5, 10.5);
    assert!(battle.deploy_card(PlayerId::BOTTOM, "Knight", drop));
    let knight = query::units(&battle, PlayerId::BOTTOM)[0].id();

    run_for(&mut battle, 0.5);
    assert_eq!(query::entity(&battle, knight).map(|e| e.position), Some(drop));

    run_for(&mut battle, 1.0);
    let moved = query::entity(&battle, knight).map(|e| e.position);
    assert!(moved.is_some_and(|position| position != drop));
}

#[test]
fn ground_troops_only_cross_the_river_on_bridges() {
    let mut battle = battle();
    let knight = battle
        .spawn_card(PlayerId::BOTTOM, "Knight", Position::new(8.5, 12.5))
        .expect("knight spawns");
    let grid = TileGrid::standard();
    for _ in 0..300 {
        battle.tick();
        let Some(entity) = query::entity(&battle, knight) else {
            break;
        };
        assert!(
            grid.is_walkable(entity.position),
            "knight stepped onto {:?}",
            entity.position
        );
    }
}

#[test]
fn king_wakes_up_when_damaged() {
    let mut battle = battle();
    let king = tower(&battle, PlayerId::BOTTOM, TowerSlot::King);
    let report = battle.damage_entity(king, 10.0);
    assert_eq!(report.dealt, 10.0);
    assert!(query::king_active(&battle, PlayerId::BOTTOM));
    assert!(!query::king_active(&battle, PlayerId::TOP));
    assert!(battle
        .take_events()
        .contains(&Event::KingActivated {
            owner: PlayerId::BOTTOM
        }));
}

#[test]
fn losing_both_princesses_wakes_the_king_and_opens_pockets() {
    let mut battle = battle();
    for slot in [TowerSlot::Left, TowerSlot::Right] {
        let princess = tower(&battle, PlayerId::BOTTOM, slot);
        let _ = battle.damage_entity(princess, 1.0e6);
    }
    let mut events = Vec::new();
    world::apply(
        &mut battle,
        arena_battle_core::Command::Step { dt: 1.0 / 30.0 },
        &mut events,
    );

    let destroyed = events
        .iter()
        .filter(|event| {
            matches!(event, Event::TowerDestroyed { owner, .. } if *owner == PlayerId::BOTTOM)
        })
        .count();
    assert_eq!(destroyed, 2);
    assert!(query::king_active(&battle, PlayerId::BOTTOM));
    assert_eq!(query::player(&battle, PlayerId::TOP).crowns(), 2);
    assert_eq!(query::deploy_zones(&battle, PlayerId::TOP).len(), 4);
    assert!(query::tower_status(&battle).princess_lost(PlayerId::BOTTOM));
    assert!(!query::is_game_over(&battle));
}

#[test]
fn destroying_a_king_ends_the_match() {
    let mut battle = battle();
    let king = tower(&battle, PlayerId::TOP, TowerSlot::King);
    let _ = battle.damage_entity(king, 1.0e6);
    battle.tick();

    assert_eq!(
        query::outcome(&battle),
        Some(MatchOutcome::Victory {
            winner: PlayerId::BOTTOM,
            reason: WinReason::KingDestroyed,
        })
    );
    assert_eq!(query::player(&battle, PlayerId::BOTTOM).crowns(), 3);

    let events = deploy(&mut battle, PlayerId::BOTTOM, "Knight", 9.5, 10.5);
    assert_eq!(rejection(&events), Some(DeployRejection::MatchOver));

    let tick = query::tick(&battle);
    battle.tick();
    assert_eq!(query::tick(&battle), tick);
}

#[test]
fn elixir_regenerates_faster_after_double_threshold() {
    let config = BattleConfig {
        starting_elixir: 0.0,
        phases: PhaseConfig {
            double_elixir: 10.0,
            triple_elixir: 20.0,
            sudden_death: 30.0,
            tiebreak: 40.0,
        },
        ..BattleConfig::default()
    };
    let mut battle = battle_with(config, standard_deck());
    run_for(&mut battle, 2.0);
    let regular = query::player(&battle, PlayerId::BOTTOM).elixir();
    assert!((regular - 2.0 / 2.8).abs() < 0.05, "{regular}");

    run_for(&mut battle, 9.0);
    assert_eq!(query::elixir_rate(&battle), ElixirRate::Double);
    let before = query::player(&battle, PlayerId::BOTTOM).elixir();
    run_for(&mut battle, 2.0);
    let doubled = query::player(&battle, PlayerId::BOTTOM).elixir() - before;
    assert!(doubled > regular * 1.8, "{doubled} vs {regular}");
}

#[test]
fn elixir_never_exceeds_the_cap() {
    let mut battle = battle();
    run_for(&mut battle, 30.0);
    assert_eq!(query::player(&battle, PlayerId::BOTTOM).elixir(), 10.0);
}

#[test]
fn regulation_crown_lead_wins_at_the_threshold() {
    let mut battle = battle_with(short_match(), standard_deck());
    let princess = tower(&battle, PlayerId::TOP, TowerSlot::Right);
    let _ = battle.damage_entity(princess, 1.0e6);
    run_for(&mut battle, 2.5);
    assert!(!query::is_game_over(&battle));
    run_for(&mut battle, 0.7);
    assert_eq!(
        query::outcome(&battle),
        Some(MatchOutcome::Victory {
            winner: PlayerId::BOTTOM,
            reason: WinReason::Crowns,
        })
    );
}

#[test]
fn sudden_death_waits_for_a_crown_swing() {
    let mut battle = battle_with(short_match(), standard_deck());
    run_for(&mut battle, 3.2);
    assert!(query::is_sudden_death(&battle));
    assert!(!query::is_game_over(&battle));
    assert_eq!(query::elixir_rate(&battle), ElixirRate::Triple);

    let princess = tower(&battle, PlayerId::BOTTOM, TowerSlot::Left);
    let _ = battle.damage_entity(princess, 1.0e6);
    battle.tick();
    assert_eq!(
        query::outcome(&battle),
        Some(MatchOutcome::Victory {
            winner: PlayerId::TOP,
            reason: WinReason::SuddenDeath,
        })
    );
}

#[test]
fn tiebreak_prefers_higher_tower_hitpoints() {
    let mut battle = battle_with(short_match(), standard_deck());
    let king = tower(&battle, PlayerId::TOP, TowerSlot::King);
    let _ = battle.damage_entity(king, 10.0);
    run_for(&mut battle, 4.2);
    assert_eq!(
        query::outcome(&battle),
        Some(MatchOutcome::Victory {
            winner: PlayerId::BOTTOM,
            reason: WinReason::TowerHitpoints,
        })
    );
}

#[test]
fn tiebreak_with_identical_towers_is_a_draw() {
    let mut battle = battle_with(short_match(), standard_deck());
    run_for(&mut battle, 4.2);
    assert_eq!(query::outcome(&battle), Some(MatchOutcome::Draw));
    assert!(query::summary(&battle).game_over);
}

#[test]
fn death_chain_spawns_two_units_in_the_same_tick() {
    let mut battle = battle();
    let golem = battle
        .spawn_card(PlayerId::BOTTOM, "Golem", Position::new(9.5, 10.5))
        .expect("golem spawns");
    if let Some(entity) = battle.entity_mut(golem) {
        entity.hitpoints = 0.0;
    }
    battle.tick();

    assert!(query::entity(&battle, golem).is_none());
    let golemites: Vec<_> = query::units(&battle, PlayerId::BOTTOM)
        .into_iter()
        .filter(|entity| entity.card().name() == "Golemite")
        .collect();
    assert_eq!(golemites.len(), 2);
    assert!(golemites.iter().all(|entity| !entity.is_dead()));
    assert_ne!(golemites[0].position, golemites[1].position);
}

#[test]
fn battle_state_can_move_between_threads() {
    fn assert_send<T: Send>() {}
    assert_send::<BattleState>();
}

#[test]
fn knockback_stops_at_building_footprints() {
    let mut battle = battle();
    let cannon = battle
        .spawn_card(PlayerId::BOTTOM, "Cannon", Position::new(9.5, 10.5))
        .expect("cannon spawns");
    let knight = battle
        .spawn_card(PlayerId::TOP, "Knight", Position::new(9.5, 7.0))
        .expect("knight spawns");

    battle.displace(knight, 0.0, 3.5);

    let landed = battle.entity(knight).map(|entity| entity.position);
    let footprint = battle.entity(cannon).map(|entity| entity.position);
    let (Some(landed), Some(footprint)) = (landed, footprint) else {
        panic!("both entities are registered");
    };
    assert!(landed.y() > 7.0, "knight was pushed toward the cannon");
    assert!(
        (landed.y() - footprint.y()).abs() >= 1.5,
        "knight landed inside the cannon at {landed:?}"
    );

    battle.displace(knight, 0.0, -20.0);
    let landed = battle.entity(knight).map(|entity| entity.position);
    assert!(landed.is_some_and(|position| battle.grid().is_walkable(position)));
}
