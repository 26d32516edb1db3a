#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static arena geometry: blocked tiles, the river band, bridges, tower sites
//! and deployment zones.
//!
//! The [`TileGrid`] is an immutable configuration value handed to every
//! battle, so independent matches never share geometry through globals.

mod footprint;
mod formation;
mod zones;

use std::collections::BTreeSet;

use arena_battle_core::{PlayerId, Position, TowerSlot, ARENA_HEIGHT, ARENA_WIDTH};

pub use footprint::Footprint;
pub use formation::{line_formation, ring_formation};
pub use zones::{DeployQuery, TowerStatus};

const RIVER_Y1: f32 = 15.0;
const RIVER_Y2: f32 = 17.0;
const BRIDGE_CENTER_Y: f32 = 16.0;
const DETECTION_WINDOW: f32 = 1.0;

const KING_FOOTPRINT: f32 = 4.0;
const PRINCESS_FOOTPRINT: f32 = 3.0;

/// Which of the two river crossings a bridge is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BridgeSide {
    /// Crossing on the left lane.
    Left,
    /// Crossing on the right lane.
    Right,
}

/// Walkable crossing over the river band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bridge {
    side: BridgeSide,
    x1: f32,
    x2: f32,
    center: Position,
}

impl Bridge {
    /// Creates a bridge spanning `[x1, x2)` whose middle tile is centered at `center`.
    #[must_use]
    pub const fn new(side: BridgeSide, x1: f32, x2: f32, center: Position) -> Self {
        Self {
            side,
            x1,
            x2,
            center,
        }
    }

    /// Lane the bridge belongs to.
    #[must_use]
    pub const fn side(&self) -> BridgeSide {
        self.side
    }

    /// Center of the bridge's middle tile.
    #[must_use]
    pub const fn center(&self) -> Position {
        self.center
    }

    /// Reports whether the x coordinate lies on the physical bridge span.
    #[must_use]
    pub fn spans(&self, x: f32) -> bool {
        x >= self.x1 && x < self.x2
    }

    /// Reports whether the position is inside the detection window around the center.
    #[must_use]
    pub fn detects(&self, position: Position, window: f32) -> bool {
        (position.x() - self.center.x()).abs() <= window
            && (position.y() - self.center.y()).abs() <= window
    }
}

/// Describes the discrete tile layout of the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    river: (f32, f32),
    bridges: [Bridge; 2],
    blocked: BTreeSet<(i32, i32)>,
    detection_window: f32,
    tower_sites: [[Position; 3]; 2],
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::standard()
    }
}

impl TileGrid {
    /// Creates the standard 18×32 arena layout.
    #[must_use]
    pub fn standard() -> Self {
        let mut blocked = BTreeSet::new();
        for tile in [(0, 14), (0, 17), (17, 14), (17, 17)] {
            let _ = blocked.insert(tile);
        }
        for row in [0, ARENA_HEIGHT as i32 - 1] {
            for column in (0..=5).chain(12..=17) {
                let _ = blocked.insert((column, row));
            }
        }

        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            river: (RIVER_Y1, RIVER_Y2),
            bridges: [
                Bridge::new(
                    BridgeSide::Left,
                    2.0,
                    5.0,
                    Position::new(3.5, BRIDGE_CENTER_Y),
                ),
                Bridge::new(
                    BridgeSide::Right,
                    13.0,
                    16.0,
                    Position::new(14.5, BRIDGE_CENTER_Y),
                ),
            ],
            blocked,
            detection_window: DETECTION_WINDOW,
            tower_sites: [
                [
                    Position::new(9.0, 2.5),
                    Position::new(3.5, 6.5),
                    Position::new(14.5, 6.5),
                ],
                [
                    Position::new(9.0, 29.5),
                    Position::new(3.5, 25.5),
                    Position::new(14.5, 25.5),
                ],
            ],
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Half-open y band `[y1, y2)` occupied by the river.
    #[must_use]
    pub const fn river_band(&self) -> (f32, f32) {
        self.river
    }

    /// Both bridges, left first.
    #[must_use]
    pub const fn bridges(&self) -> &[Bridge; 2] {
        &self.bridges
    }

    /// Half extent of the on-bridge detection window.
    #[must_use]
    pub const fn detection_window(&self) -> f32 {
        self.detection_window
    }

    /// Y coordinate separating the two halves of the arena.
    #[must_use]
    pub fn midline(&self) -> f32 {
        (self.river.0 + self.river.1) / 2.0
    }

    /// Half of the arena the y coordinate belongs to.
    #[must_use]
    pub fn side_of(&self, position: Position) -> PlayerId {
        if position.y() < self.midline() {
            PlayerId::BOTTOM
        } else {
            PlayerId::TOP
        }
    }

    /// Center of the crown tower occupying the slot.
    #[must_use]
    pub fn tower_site(&self, owner: PlayerId, slot: TowerSlot) -> Position {
        self.tower_sites[owner.index()][slot.index()]
    }

    /// Placement footprint of the crown tower occupying the slot.
    #[must_use]
    pub fn tower_footprint(&self, owner: PlayerId, slot: TowerSlot) -> Footprint {
        let side = match slot {
            TowerSlot::King => KING_FOOTPRINT,
            TowerSlot::Left | TowerSlot::Right => PRINCESS_FOOTPRINT,
        };
        Footprint::new(self.tower_site(owner, slot), side)
    }

    /// Reports whether the position lies inside the arena bounds.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.x() >= 0.0
            && position.y() >= 0.0
            && position.x() < self.width as f32
            && position.y() < self.height as f32
    }

    /// Reports whether the tile is part of the static blocked set.
    #[must_use]
    pub fn is_blocked_tile(&self, x: i32, y: i32) -> bool {
        self.blocked.contains(&(x, y))
    }

    /// Iterates the blocked tiles in ascending order.
    pub fn blocked_tiles(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.blocked.iter().copied()
    }

    /// Reports whether the position is inside the river band.
    #[must_use]
    pub fn in_river(&self, position: Position) -> bool {
        position.y() >= self.river.0 && position.y() < self.river.1
    }

    /// Reports whether a ground unit may stand at the position.
    #[must_use]
    pub fn is_walkable(&self, position: Position) -> bool {
        if !self.contains(position) {
            return false;
        }
        let (x, y) = position.tile();
        if self.is_blocked_tile(x, y) {
            return false;
        }
        if self.in_river(position) {
            return self.bridges.iter().any(|bridge| bridge.spans(position.x()));
        }
        true
    }

    /// Bridge whose center is horizontally closest to the position. Ties go
    /// right.
    #[must_use]
    pub fn nearest_bridge_by_x(&self, position: Position) -> &Bridge {
        let [left, right] = &self.bridges;
        let left_gap = (position.x() - left.center().x()).abs();
        let right_gap = (position.x() - right.center().x()).abs();
        if left_gap < right_gap {
            left
        } else {
            right
        }
    }

    /// Bridge whose center is closest to the position. Ties go right.
    #[must_use]
    pub fn nearest_bridge(&self, position: Position) -> &Bridge {
        let [left, right] = &self.bridges;
        if position.distance_to(left.center()) < position.distance_to(right.center()) {
            left
        } else {
            right
        }
    }

    /// Bridge whose detection window contains the position, if any.
    #[must_use]
    pub fn bridge_at(&self, position: Position) -> Option<&Bridge> {
        self.bridges
            .iter()
            .find(|bridge| bridge.detects(position, self.detection_window))
    }

    /// Returns `position` when walkable, otherwise the first walkable point on
    /// the segment toward `anchor`, falling back to `anchor` itself.
    #[must_use]
    pub fn nearest_walkable(&self, position: Position, anchor: Position) -> Position {
        if self.is_walkable(position) {
            return position;
        }
        const STEPS: u32 = 8;
        let distance = position.distance_to(anchor);
        for step in 1..=STEPS {
            let candidate = position.step_toward(anchor, distance * step as f32 / STEPS as f32);
            if self.is_walkable(candidate) {
                return candidate;
            }
        }
        anchor
    }

    /// Horizontal ranges covered by standing crown tower footprints on row `y`.
    ///
    /// Wide formations use these ranges to avoid dropping units inside towers.
    #[must_use]
    pub fn tower_blocked_x_ranges(&self, y: f32, towers: &TowerStatus) -> Vec<(f32, f32)> {
        let mut ranges = Vec::new();
        for owner in PlayerId::ALL {
            for slot in TowerSlot::ALL {
                if towers.is_destroyed(owner, slot) {
                    continue;
                }
                if let Some(range) = self.tower_footprint(owner, slot).x_range_at(y) {
                    ranges.push(range);
                }
            }
        }
        ranges.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranges
    }
}
