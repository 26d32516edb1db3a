//! Rule-based bridge routing for ground units.

use arena_battle_arena::{Bridge, TileGrid, TowerStatus};
use arena_battle_core::{PlayerId, Position};

use crate::Agent;

/// Distance from the bridge center beyond which advanced routing heads for the
/// approach waypoint on the near bank first.
const APPROACH_RADIUS: f32 = 2.0;

/// Depth of the approach waypoint before the river midline.
const APPROACH_DEPTH: f32 = 2.0;

/// Depth of the forward waypoint past the river midline.
const FORWARD_DEPTH: f32 = 4.0;

/// Computes the immediate waypoint an attacker should move toward.
///
/// Air units and attackers sharing a river side with their target head
/// straight for it. Ground units that must cross are funnelled through a
/// bridge: in basic routing the bridge horizontally closest is chosen and the
/// attacker heads for its center until it enters the detection window. Once
/// the attacker's owner has lost a princess tower, advanced routing picks the
/// bridge closest by distance and approaches it through a waypoint on the near
/// bank so that units never path diagonally into the river.
#[must_use]
pub fn pathfind_target(
    attacker: &Agent,
    target: Position,
    grid: &TileGrid,
    towers: &TowerStatus,
) -> Position {
    if attacker.is_air || grid.side_of(attacker.position) == grid.side_of(target) {
        return target;
    }

    if towers.princess_lost(attacker.owner) {
        advanced_waypoint(attacker, target, grid)
    } else {
        basic_waypoint(attacker, target, grid)
    }
}

fn basic_waypoint(attacker: &Agent, target: Position, grid: &TileGrid) -> Position {
    let bridge = grid.nearest_bridge_by_x(attacker.position);
    if !bridge.detects(attacker.position, grid.detection_window()) {
        return bridge.center();
    }
    crossing_waypoint(attacker, target, bridge, grid)
}

fn advanced_waypoint(attacker: &Agent, target: Position, grid: &TileGrid) -> Position {
    let bridge = grid.nearest_bridge(attacker.position);
    if bridge.detects(attacker.position, grid.detection_window()) {
        return crossing_waypoint(attacker, target, bridge, grid);
    }

    let center = bridge.center();
    if attacker.position.distance_to(center) > APPROACH_RADIUS {
        let heading = heading(grid, attacker.position);
        let approach = Position::new(center.x(), grid.midline() - heading * APPROACH_DEPTH);
        return walkable_or(grid, approach, center);
    }
    center
}

fn crossing_waypoint(
    attacker: &Agent,
    target: Position,
    bridge: &Bridge,
    grid: &TileGrid,
) -> Position {
    if attacker.sees(target) {
        return target;
    }
    let center = bridge.center();
    let heading = heading(grid, attacker.position);
    let forward = Position::new(center.x(), grid.midline() + heading * FORWARD_DEPTH);
    walkable_or(grid, forward, center)
}

/// Direction along y that crosses the river from the attacker's current bank.
fn heading(grid: &TileGrid, position: Position) -> f32 {
    match grid.side_of(position) {
        PlayerId::BOTTOM => 1.0,
        _ => -1.0,
    }
}

fn walkable_or(grid: &TileGrid, waypoint: Position, fallback: Position) -> Position {
    if grid.is_walkable(waypoint) {
        waypoint
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_battle_core::{EntityId, TargetType, TowerSlot};

    fn knight(owner: PlayerId, position: (f32, f32)) -> Agent {
        Agent {
            id: EntityId::new(1),
            owner,
            position: Position::new(position.0, position.1),
            sight_range: 5.5,
            target_type: TargetType::Ground,
            is_air: false,
        }
    }

    #[test]
    fn same_side_targets_are_direct() {
        let grid = TileGrid::standard();
        let attacker = knight(PlayerId::BOTTOM, (9.0, 8.0));
        let target = Position::new(4.0, 12.0);
        assert_eq!(
            pathfind_target(&attacker, target, &grid, &TowerStatus::new()),
            target
        );
    }

    #[test]
    fn air_units_fly_straight_over_the_river() {
        let grid = TileGrid::standard();
        let attacker = Agent {
            is_air: true,
            ..knight(PlayerId::BOTTOM, (9.0, 8.0))
        };
        let target = Position::new(9.0, 29.5);
        assert_eq!(
            pathfind_target(&attacker, target, &grid, &TowerStatus::new()),
            target
        );
    }

    #[test]
    fn basic_routing_prefers_the_right_bridge_on_exact_ties() {
        let grid = TileGrid::standard();
        let attacker = knight(PlayerId::BOTTOM, (9.0, 14.0));
        let target = Position::new(9.0, 29.5);
        assert_eq!(
            pathfind_target(&attacker, target, &grid, &TowerStatus::new()),
            Position::new(14.5, 16.0)
        );
    }

    #[test]
    fn inside_window_without_sight_moves_to_forward_waypoint() {
        let grid = TileGrid::standard();
        let attacker = knight(PlayerId::BOTTOM, (3.5, 15.5));
        let target = Position::new(3.5, 25.5);
        assert_eq!(
            pathfind_target(&attacker, target, &grid, &TowerStatus::new()),
            Position::new(3.5, 20.0)
        );

        let attacker = knight(PlayerId::TOP, (14.5, 16.8));
        let target = Position::new(14.5, 6.5);
        assert_eq!(
            pathfind_target(&attacker, target, &grid, &TowerStatus::new()),
            Position::new(14.5, 12.0)
        );
    }

    #[test]
    fn inside_window_with_sight_goes_direct() {
        let grid = TileGrid::standard();
        let attacker = knight(PlayerId::BOTTOM, (3.5, 15.5));
        let target = Position::new(4.0, 19.0);
        assert_eq!(
            pathfind_target(&attacker, target, &grid, &TowerStatus::new()),
            target
        );
    }

    #[test]
    fn advanced_routing_uses_near_bank_approach() {
        let grid = TileGrid::standard();
        let mut towers = TowerStatus::new();
        let _ = towers.mark_destroyed(PlayerId::BOTTOM, TowerSlot::Left);
        let attacker = knight(PlayerId::BOTTOM, (6.0, 8.0));
        let target = Position::new(3.5, 25.5);
        assert_eq!(
            pathfind_target(&attacker, target, &grid, &towers),
            Position::new(3.5, 14.0)
        );

        let close = knight(PlayerId::BOTTOM, (3.5, 14.2));
        assert_eq!(
            pathfind_target(&close, target, &grid, &towers),
            Position::new(3.5, 16.0)
        );
    }

    #[test]
    fn advanced_routing_for_top_player_mirrors_waypoints() {
        let grid = TileGrid::standard();
        let mut towers = TowerStatus::new();
        let _ = towers.mark_destroyed(PlayerId::TOP, TowerSlot::Right);
        let attacker = knight(PlayerId::TOP, (12.0, 24.0));
        let target = Position::new(14.5, 6.5);
        assert_eq!(
            pathfind_target(&attacker, target, &grid, &towers),
            Position::new(14.5, 18.0)
        );

        let on_bridge = knight(PlayerId::TOP, (14.5, 16.5));
        assert_eq!(
            pathfind_target(&on_bridge, target, &grid, &towers),
            Position::new(14.5, 12.0)
        );
    }

    #[test]
    fn losing_an_enemy_tower_keeps_basic_routing() {
        let grid = TileGrid::standard();
        let mut towers = TowerStatus::new();
        let _ = towers.mark_destroyed(PlayerId::TOP, TowerSlot::Left);
        let attacker = knight(PlayerId::BOTTOM, (6.0, 8.0));
        let target = Position::new(9.0, 29.5);
        assert_eq!(
            pathfind_target(&attacker, target, &grid, &towers),
            Position::new(3.5, 16.0)
        );
    }
}
