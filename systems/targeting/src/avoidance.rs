//! Local obstacle avoidance for a single movement step.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use arena_battle_arena::{Footprint, TileGrid};
use arena_battle_core::Position;

const DEFLECTIONS: [f32; 6] = [
    FRAC_PI_4,
    FRAC_PI_2,
    -FRAC_PI_4,
    -FRAC_PI_2,
    3.0 * FRAC_PI_4,
    -3.0 * FRAC_PI_4,
];

/// Resolves where a ground unit ends up when it wants to move to `desired`.
///
/// The direct step is taken when it lands on walkable ground outside every
/// obstacle footprint. Otherwise the step is rotated by each deflection in
/// order, then half-length sidesteps along both perpendiculars are tried. The
/// first valid landing wins; when none exists the unit stays where it is.
#[must_use]
pub fn avoidance_step(
    position: Position,
    desired: Position,
    grid: &TileGrid,
    obstacles: &[Footprint],
) -> Position {
    let free = |candidate: Position| {
        grid.is_walkable(candidate)
            && !obstacles
                .iter()
                .any(|footprint| footprint.contains(candidate))
    };

    if free(desired) {
        return desired;
    }

    let dx = desired.x() - position.x();
    let dy = desired.y() - position.y();
    if dx == 0.0 && dy == 0.0 {
        return position;
    }

    for angle in DEFLECTIONS {
        let (sin, cos) = angle.sin_cos();
        let candidate = position.offset(dx * cos - dy * sin, dx * sin + dy * cos);
        if free(candidate) {
            return candidate;
        }
    }

    for (px, py) in [(dy, -dx), (-dy, dx)] {
        let candidate = position.offset(px * 0.5, py * 0.5);
        if free(candidate) {
            return candidate;
        }
    }

    position
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_step_is_taken_directly() {
        let grid = TileGrid::standard();
        let from = Position::new(9.0, 10.0);
        let to = Position::new(9.0, 10.1);
        assert_eq!(avoidance_step(from, to, &grid, &[]), to);
    }

    #[test]
    fn river_edge_deflects_toward_the_bridge() {
        let grid = TileGrid::standard();
        let from = Position::new(5.2, 14.9);
        let to = Position::new(5.2, 15.2);
        let resolved = avoidance_step(from, to, &grid, &[]);
        assert_ne!(resolved, from);
        assert!(grid.is_walkable(resolved));
    }

    #[test]
    fn footprints_deflect_the_step() {
        let grid = TileGrid::standard();
        let tower = Footprint::new(Position::new(9.0, 12.0), 3.0);
        let from = Position::new(9.0, 10.4);
        let to = Position::new(9.0, 10.6);
        let resolved = avoidance_step(from, to, &grid, &[tower]);
        assert!(!tower.contains(resolved));
        assert!(resolved.distance_to(from) > 0.0);
    }

    #[test]
    fn boxed_in_unit_stays_put() {
        let grid = TileGrid::standard();
        let from = Position::new(9.0, 10.0);
        let cage = Footprint::new(Position::new(9.0, 10.0), 0.5);
        let wall = Footprint::new(Position::new(9.0, 10.0), 6.0);
        let to = Position::new(9.0, 10.5);
        assert_eq!(avoidance_step(from, to, &grid, &[cage, wall]), from);
    }
}
