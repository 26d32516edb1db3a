//! Deterministic spawn formations for multi-unit deployments.

use std::collections::BTreeSet;
use std::f32::consts::TAU;

use arena_battle_core::Position;

/// Places `count` units evenly on a circle around `center`.
///
/// A single unit lands on the center itself. The first unit sits on the
/// positive x axis and the rest follow counter-clockwise.
#[must_use]
pub fn ring_formation(center: Position, count: u32, radius: f32) -> Vec<Position> {
    if count <= 1 {
        return vec![center];
    }
    (0..count)
        .map(|index| {
            let angle = TAU * index as f32 / count as f32;
            center.offset(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

/// Spreads `count` units along the x axis through `center`.
///
/// Offsets falling inside a `blocked` range are pushed to the closer edge of
/// that range, the result is clamped to `[0, width)` and units that would share
/// a tile are moved to the nearest free tile on the same row.
#[must_use]
pub fn line_formation(
    center: Position,
    count: u32,
    spacing: f32,
    blocked: &[(f32, f32)],
    width: f32,
) -> Vec<Position> {
    let mut occupied = BTreeSet::new();
    let mut positions = Vec::with_capacity(count as usize);
    let middle = (count.saturating_sub(1)) as f32 / 2.0;

    for index in 0..count {
        let raw = center.x() + (index as f32 - middle) * spacing;
        let x = unblock(clamp_x(raw, width), blocked, width);
        let x = free_column(x, &occupied, blocked, width);
        let _ = occupied.insert(x.floor() as i32);
        positions.push(Position::new(x, center.y()));
    }

    positions
}

fn clamp_x(x: f32, width: f32) -> f32 {
    x.clamp(0.5, width - 0.5)
}

fn is_blocked(x: f32, blocked: &[(f32, f32)]) -> bool {
    blocked.iter().any(|&(low, high)| x > low && x < high)
}

fn unblock(x: f32, blocked: &[(f32, f32)], width: f32) -> f32 {
    for &(low, high) in blocked {
        if x > low && x < high {
            let shifted = if x - low < high - x {
                low - 0.5
            } else {
                high + 0.5
            };
            return clamp_x(shifted, width);
        }
    }
    x
}

fn free_column(x: f32, occupied: &BTreeSet<i32>, blocked: &[(f32, f32)], width: f32) -> f32 {
    let taken = |candidate: f32| {
        occupied.contains(&(candidate.floor() as i32)) || is_blocked(candidate, blocked)
    };
    if !occupied.contains(&(x.floor() as i32)) {
        return x;
    }
    let columns = width.ceil() as i32;
    for distance in 1..=columns {
        for direction in [1.0_f32, -1.0] {
            let candidate = x + direction * distance as f32;
            if candidate < 0.0 || candidate >= width {
                continue;
            }
            if !taken(candidate) {
                return candidate;
            }
        }
    }
    x
}
