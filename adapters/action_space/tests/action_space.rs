use std::sync::Arc;

use arena_battle_action_space::{
    ActionSelection, DiscreteTileActionSpace, NO_OP_ACTION, NUM_ACTIONS, NUM_TILES,
};
use arena_battle_arena::TileGrid;
use arena_battle_catalog::BuiltinCatalog;
use arena_battle_core::{Event, PlayerId};
use arena_battle_world::{query, BattleConfig, BattleState};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn battle() -> BattleState {
    let deck: Vec<String> = [
        "Knight", "Archers", "Giant", "Golem", "Fireball", "Zap", "Miner", "Witch",
    ]
    .iter()
    .map(|card| (*card).to_owned())
    .collect();
    let catalog = BuiltinCatalog::standard().expect("standard catalog is valid");
    BattleState::new(
        BattleConfig::default(),
        TileGrid::standard(),
        Arc::new(catalog),
        [deck.clone(), deck],
    )
    .expect("battle is valid")
}

fn player(index: u8) -> PlayerId {
    PlayerId::new(index)
}

proptest! {
    #[test]
    fn encode_then_decode_recovers_slot_and_tile(
        slot in 0usize..4,
        x in 0u32..18,
        y in 0u32..32,
        index in 0u8..2,
    ) {
        let space = DiscreteTileActionSpace::default();
        let owner = player(index);
        let action = space.encode_action(slot, x, y, owner).expect("valid input");
        prop_assert!(action < NO_OP_ACTION);
        match space.decode_action(action, owner) {
            ActionSelection::Deploy { slot: decoded, tile_x, tile_y, position } => {
                prop_assert_eq!((decoded, tile_x, tile_y), (slot, x, y));
                prop_assert_eq!(position.tile(), (x as i32, y as i32));
            }
            ActionSelection::NoOp => prop_assert!(false, "deployment decoded as no-op"),
        }
    }

    #[test]
    fn every_index_decodes_to_a_tile_inside_the_arena(
        action in 0usize..NO_OP_ACTION,
        index in 0u8..2,
    ) {
        let space = DiscreteTileActionSpace::default();
        let selection = space.decode_action(action, player(index));
        let ActionSelection::Deploy { position, .. } = selection else {
            return Err(TestCaseError::fail("deployment decoded as no-op"));
        };
        prop_assert!((0.0..18.0).contains(&position.x()));
        prop_assert!((0.0..32.0).contains(&position.y()));
    }
}

#[test]
fn mask_follows_hand_elixir_and_zones() {
    let battle = battle();
    let space = DiscreteTileActionSpace::default();
    let mask = space.legal_action_mask(&battle, PlayerId::BOTTOM);
    assert_eq!(mask.len(), NUM_ACTIONS);
    assert!(mask[NO_OP_ACTION]);

    let knight_own_side = space
        .encode_action(0, 9, 10, PlayerId::BOTTOM)
        .expect("valid input");
    let knight_enemy_side = space
        .encode_action(0, 9, 20, PlayerId::BOTTOM)
        .expect("valid input");
    assert!(mask[knight_own_side]);
    assert!(!mask[knight_enemy_side]);

    let golem_slot = 3 * NUM_TILES..4 * NUM_TILES;
    assert!(mask[golem_slot].iter().all(|legal| !legal), "golem costs 8");
}

#[test]
fn top_player_addresses_its_own_side_from_row_zero() {
    let battle = battle();
    let space = DiscreteTileActionSpace::default();
    let mask = space.legal_action_mask(&battle, PlayerId::TOP);
    let canonical_own_side = 10 * 18 + 9;
    assert!(mask[canonical_own_side]);
    let canonical_enemy_side = 20 * 18 + 9;
    assert!(!mask[canonical_enemy_side]);
}

#[test]
fn applying_actions_deploys_through_the_battle() {
    let mut battle = battle();
    let space = DiscreteTileActionSpace::default();
    let towers = battle.take_events();
    assert_eq!(towers.len(), 6);
    assert!(space.apply_action(&mut battle, PlayerId::BOTTOM, NO_OP_ACTION));
    assert!(battle.take_events().is_empty());

    let illegal = space
        .encode_action(0, 9, 20, PlayerId::BOTTOM)
        .expect("valid input");
    assert!(!space.apply_action(&mut battle, PlayerId::BOTTOM, illegal));

    let legal = space
        .encode_action(0, 9, 10, PlayerId::BOTTOM)
        .expect("valid input");
    assert!(space.apply_action(&mut battle, PlayerId::BOTTOM, legal));
    let deployed = battle
        .take_events()
        .into_iter()
        .any(|event| matches!(event, Event::CardDeployed { ref card, .. } if card == "Knight"));
    assert!(deployed);
    assert!(!query::hand(&battle, PlayerId::BOTTOM).contains(&"Knight".to_owned()));
}

#[test]
fn random_legal_actions_are_legal_and_reproducible() {
    let battle = battle();
    let space = DiscreteTileActionSpace::default();
    let mask = space.legal_action_mask(&battle, PlayerId::BOTTOM);

    let mut first = ChaCha8Rng::seed_from_u64(21);
    let mut second = ChaCha8Rng::seed_from_u64(21);
    for _ in 0..16 {
        let action = space.random_legal_action(&battle, PlayerId::BOTTOM, &mut first);
        assert!(mask[action]);
        assert_eq!(
            action,
            space.random_legal_action(&battle, PlayerId::BOTTOM, &mut second)
        );
    }
}
