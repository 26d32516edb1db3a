use arena_battle_arena::{DeployQuery, TileGrid, TowerStatus};
use arena_battle_core::{DeployRule, PlayerId, Position, TowerSlot};
use proptest::prelude::*;

fn troop_query() -> DeployQuery<'static> {
    DeployQuery {
        rule: DeployRule::OwnZone,
        is_spell: false,
        body_radius: 0.5,
        building: None,
        obstacles: &[],
    }
}

fn tower_status(mask: u8) -> TowerStatus {
    let mut towers = TowerStatus::new();
    for (bit, (owner, slot)) in PlayerId::ALL
        .into_iter()
        .flat_map(|owner| TowerSlot::ALL.into_iter().map(move |slot| (owner, slot)))
        .enumerate()
    {
        if mask & (1 << bit) != 0 {
            let _ = towers.mark_destroyed(owner, slot);
        }
    }
    towers
}

#[test]
fn river_covers_rows_fifteen_and_sixteen() {
    let grid = TileGrid::standard();
    for y in [15.0, 15.5, 16.0, 16.5, 16.99] {
        assert!(grid.in_river(Position::new(8.5, y)), "y = {y}");
        assert!(!grid.is_walkable(Position::new(8.5, y)), "y = {y}");
        assert!(grid.is_walkable(Position::new(3.5, y)), "y = {y}");
    }
    assert!(grid.is_walkable(Position::new(8.5, 14.99)));
    assert!(grid.is_walkable(Position::new(8.5, 17.0)));
}

proptest! {
    #[test]
    fn river_walkability_matches_bridge_spans(x in 0.0f32..18.0, y in 15.0f32..17.0) {
        let grid = TileGrid::standard();
        let position = Position::new(x, y);
        let expected = (2.0..5.0).contains(&x) || (13.0..16.0).contains(&x);
        let (tx, ty) = position.tile();
        prop_assume!(!grid.is_blocked_tile(tx, ty));
        prop_assert_eq!(grid.is_walkable(position), expected);
    }

    #[test]
    fn troops_are_never_deployed_on_unwalkable_or_foreign_ground(
        x in -1.0f32..19.0,
        y in -1.0f32..33.0,
        bottom in any::<bool>(),
        mask in 0u8..64,
    ) {
        let grid = TileGrid::standard();
        let player = if bottom { PlayerId::BOTTOM } else { PlayerId::TOP };
        let towers = tower_status(mask);
        let position = Position::new(x, y);
        if grid.can_deploy_at(position, player, &towers, &troop_query()) {
            prop_assert!(grid.is_walkable(position));
            prop_assert!(grid
                .deploy_zones(player, &towers)
                .iter()
                .any(|zone| zone.contains(position)));
        }
    }

    #[test]
    fn deploy_zones_are_stable_between_calls(bottom in any::<bool>(), mask in 0u8..64) {
        let grid = TileGrid::standard();
        let player = if bottom { PlayerId::BOTTOM } else { PlayerId::TOP };
        let towers = tower_status(mask);
        prop_assert_eq!(grid.deploy_zones(player, &towers), grid.deploy_zones(player, &towers));
    }

    #[test]
    fn side_of_splits_on_the_midline(x in 0.0f32..18.0, y in 0.0f32..32.0) {
        let grid = TileGrid::standard();
        let side = grid.side_of(Position::new(x, y));
        prop_assert_eq!(side == PlayerId::BOTTOM, y < 16.0);
    }
}

#[test]
fn every_blocked_tile_is_unwalkable() {
    let grid = TileGrid::standard();
    for (x, y) in grid.blocked_tiles() {
        for (fx, fy) in [(0.01, 0.01), (0.5, 0.5), (0.99, 0.99)] {
            let position = Position::new(x as f32 + fx, y as f32 + fy);
            assert!(!grid.is_walkable(position));
        }
    }
}
