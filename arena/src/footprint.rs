//! Square placement footprints of buildings and crown towers.

use arena_battle_core::Position;

/// Axis-aligned square occupied by a building, centered on its position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    center: Position,
    half: f32,
}

impl Footprint {
    /// Creates a footprint of the provided side length centered on `center`.
    #[must_use]
    pub fn new(center: Position, side: f32) -> Self {
        Self {
            center,
            half: side / 2.0,
        }
    }

    /// Center of the footprint.
    #[must_use]
    pub const fn center(&self) -> Position {
        self.center
    }

    /// Half of the side length.
    #[must_use]
    pub const fn half_extent(&self) -> f32 {
        self.half
    }

    /// Reports whether the position lies strictly inside the square.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (position.x() - self.center.x()).abs() < self.half
            && (position.y() - self.center.y()).abs() < self.half
    }

    /// Reports whether two footprints share interior area. Touching edges do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Footprint) -> bool {
        let reach = self.half + other.half;
        (self.center.x() - other.center.x()).abs() < reach
            && (self.center.y() - other.center.y()).abs() < reach
    }

    /// Conservative circle-vs-square test used for troop placement.
    #[must_use]
    pub fn intersects_circle(&self, position: Position, radius: f32) -> bool {
        if self.contains(position) {
            return true;
        }
        let nearest_x = position
            .x()
            .clamp(self.center.x() - self.half, self.center.x() + self.half);
        let nearest_y = position
            .y()
            .clamp(self.center.y() - self.half, self.center.y() + self.half);
        position.distance_to(Position::new(nearest_x, nearest_y)) < radius
    }

    /// Horizontal extent of the footprint on row `y`, if the row crosses it.
    #[must_use]
    pub fn x_range_at(&self, y: f32) -> Option<(f32, f32)> {
        if (y - self.center.y()).abs() < self.half {
            Some((self.center.x() - self.half, self.center.x() + self.half))
        } else {
            None
        }
    }
}
