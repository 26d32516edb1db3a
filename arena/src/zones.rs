//! Deployment zones and deployment legality.

use arena_battle_core::{
    DeployRejection, DeployRule, FootprintSize, PlayerId, Position, Rect, TowerSlot,
};

use crate::{Footprint, TileGrid};

/// Read-only snapshot of which crown towers have fallen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TowerStatus {
    destroyed: [[bool; 3]; 2],
}

impl TowerStatus {
    /// Creates a snapshot in which every tower stands.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            destroyed: [[false; 3]; 2],
        }
    }

    /// Reports whether the tower in the slot has fallen.
    #[must_use]
    pub const fn is_destroyed(&self, owner: PlayerId, slot: TowerSlot) -> bool {
        self.destroyed[owner.index()][slot.index()]
    }

    /// Records the destruction of a tower, returning `true` when it was standing.
    pub fn mark_destroyed(&mut self, owner: PlayerId, slot: TowerSlot) -> bool {
        let entry = &mut self.destroyed[owner.index()][slot.index()];
        let newly = !*entry;
        *entry = true;
        newly
    }

    /// Number of princess towers the player has lost.
    #[must_use]
    pub fn princesses_lost(&self, owner: PlayerId) -> u32 {
        [TowerSlot::Left, TowerSlot::Right]
            .into_iter()
            .filter(|slot| self.is_destroyed(owner, *slot))
            .count() as u32
    }

    /// Reports whether any princess tower of the player has fallen.
    #[must_use]
    pub fn princess_lost(&self, owner: PlayerId) -> bool {
        self.princesses_lost(owner) > 0
    }
}

/// Parameters describing the card being placed.
#[derive(Clone, Copy, Debug)]
pub struct DeployQuery<'a> {
    /// Where the card may be dropped.
    pub rule: DeployRule,
    /// Spells ignore walkability and footprints.
    pub is_spell: bool,
    /// Body radius used for the conservative footprint check of troops.
    pub body_radius: f32,
    /// Footprint of the card when it places a building.
    pub building: Option<FootprintSize>,
    /// Footprints of standing buildings and crown towers.
    pub obstacles: &'a [Footprint],
}

impl TileGrid {
    /// Deployment rectangles available to the player for the current tower state.
    ///
    /// Computed fresh on every call; rectangles are half-open.
    #[must_use]
    pub fn deploy_zones(&self, player: PlayerId, towers: &TowerStatus) -> Vec<Rect> {
        let width = self.width() as f32;
        let height = self.height() as f32;
        let (river_y1, river_y2) = self.river_band();
        let center = width / 2.0;
        let enemy = player.opponent();
        let mut zones = Vec::with_capacity(5);

        match player {
            PlayerId::BOTTOM => {
                zones.push(Rect::new(0.0, 1.0, width, river_y1));
                zones.push(Rect::new(6.0, 0.0, 12.0, 6.0));
                if towers.is_destroyed(enemy, TowerSlot::Left) {
                    zones.push(Rect::new(0.0, river_y2, center, river_y2 + 4.0));
                }
                if towers.is_destroyed(enemy, TowerSlot::Right) {
                    zones.push(Rect::new(center, river_y2, width, river_y2 + 4.0));
                }
                if towers.is_destroyed(enemy, TowerSlot::King) {
                    zones.push(Rect::new(6.0, height - 6.0, 12.0, height));
                }
            }
            _ => {
                zones.push(Rect::new(0.0, river_y2, width, height - 1.0));
                zones.push(Rect::new(6.0, height - 6.0, 12.0, height));
                if towers.is_destroyed(enemy, TowerSlot::Left) {
                    zones.push(Rect::new(0.0, river_y1 - 4.0, center, river_y1));
                }
                if towers.is_destroyed(enemy, TowerSlot::Right) {
                    zones.push(Rect::new(center, river_y1 - 4.0, width, river_y1));
                }
                if towers.is_destroyed(enemy, TowerSlot::King) {
                    zones.push(Rect::new(6.0, 0.0, 12.0, 6.0));
                }
            }
        }

        zones
    }

    /// Explains why a placement is illegal, or returns `Ok(())` when it is legal.
    pub fn check_deploy(
        &self,
        position: Position,
        player: PlayerId,
        towers: &TowerStatus,
        query: &DeployQuery<'_>,
    ) -> Result<(), DeployRejection> {
        if !self.contains(position) {
            return Err(DeployRejection::InvalidPosition);
        }
        let (x, y) = position.tile();
        if self.is_blocked_tile(x, y) {
            return Err(DeployRejection::InvalidPosition);
        }

        if query.is_spell && query.rule == DeployRule::ArenaWide {
            return Ok(());
        }

        if !query.is_spell && !self.is_walkable(position) {
            return Err(DeployRejection::InvalidPosition);
        }

        match query.rule {
            DeployRule::OwnZone => {
                let zones = self.deploy_zones(player, towers);
                if !zones.iter().any(|zone| zone.contains(position)) {
                    return Err(DeployRejection::InvalidPosition);
                }
            }
            DeployRule::Anywhere | DeployRule::ArenaWide => {}
        }

        if query.is_spell {
            return Ok(());
        }

        let collides = match query.building {
            Some(size) => {
                let footprint = Footprint::new(position, size.side());
                query
                    .obstacles
                    .iter()
                    .any(|obstacle| obstacle.overlaps(&footprint))
            }
            None => query
                .obstacles
                .iter()
                .any(|obstacle| obstacle.intersects_circle(position, query.body_radius)),
        };
        if collides {
            return Err(DeployRejection::FootprintCollision);
        }

        Ok(())
    }

    /// Reports whether the player may drop the described card at the position.
    #[must_use]
    pub fn can_deploy_at(
        &self,
        position: Position,
        player: PlayerId,
        towers: &TowerStatus,
        query: &DeployQuery<'_>,
    ) -> bool {
        self.check_deploy(position, player, towers, query).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn troop_query(obstacles: &[Footprint]) -> DeployQuery<'_> {
        DeployQuery {
            rule: DeployRule::OwnZone,
            is_spell: false,
            body_radius: 0.5,
            building: None,
            obstacles,
        }
    }

    #[test]
    fn base_zones_exclude_the_river() {
        let grid = TileGrid::standard();
        let towers = TowerStatus::new();
        let bottom = grid.deploy_zones(PlayerId::BOTTOM, &towers);
        assert_eq!(bottom[0], Rect::new(0.0, 1.0, 18.0, 15.0));
        assert_eq!(bottom[1], Rect::new(6.0, 0.0, 12.0, 6.0));
        let top = grid.deploy_zones(PlayerId::TOP, &towers);
        assert_eq!(top[0], Rect::new(0.0, 17.0, 18.0, 31.0));
        assert_eq!(top[1], Rect::new(6.0, 26.0, 12.0, 32.0));
    }

    #[test]
    fn fallen_princess_opens_lane_pocket() {
        let grid = TileGrid::standard();
        let mut towers = TowerStatus::new();
        let _ = towers.mark_destroyed(PlayerId::TOP, TowerSlot::Right);
        let zones = grid.deploy_zones(PlayerId::BOTTOM, &towers);
        assert!(zones.contains(&Rect::new(9.0, 17.0, 18.0, 21.0)));
        assert_eq!(zones.len(), 3);

        let _ = towers.mark_destroyed(PlayerId::BOTTOM, TowerSlot::Left);
        let zones = grid.deploy_zones(PlayerId::TOP, &towers);
        assert!(zones.contains(&Rect::new(0.0, 11.0, 9.0, 15.0)));
    }

    #[test]
    fn fallen_king_opens_area_behind_it() {
        let grid = TileGrid::standard();
        let mut towers = TowerStatus::new();
        let _ = towers.mark_destroyed(PlayerId::BOTTOM, TowerSlot::King);
        let zones = grid.deploy_zones(PlayerId::TOP, &towers);
        assert!(zones.contains(&Rect::new(6.0, 0.0, 12.0, 6.0)));
    }

    #[test]
    fn troops_cannot_land_on_enemy_half() {
        let grid = TileGrid::standard();
        let towers = TowerStatus::new();
        let query = troop_query(&[]);
        assert!(grid.can_deploy_at(Position::new(9.0, 10.0), PlayerId::BOTTOM, &towers, &query));
        assert_eq!(
            grid.check_deploy(Position::new(9.0, 24.0), PlayerId::BOTTOM, &towers, &query),
            Err(DeployRejection::InvalidPosition)
        );
    }

    #[test]
    fn anywhere_rule_skips_zones_but_not_towers() {
        let grid = TileGrid::standard();
        let towers = TowerStatus::new();
        let obstacles = [grid.tower_footprint(PlayerId::TOP, TowerSlot::Left)];
        let query = DeployQuery {
            rule: DeployRule::Anywhere,
            ..troop_query(&obstacles)
        };
        assert!(grid.can_deploy_at(Position::new(9.0, 24.0), PlayerId::BOTTOM, &towers, &query));
        assert_eq!(
            grid.check_deploy(Position::new(3.5, 25.5), PlayerId::BOTTOM, &towers, &query),
            Err(DeployRejection::FootprintCollision)
        );
        assert!(!grid.can_deploy_at(Position::new(8.5, 15.5), PlayerId::BOTTOM, &towers, &query));
    }

    #[test]
    fn arena_wide_spells_reach_enemy_towers() {
        let grid = TileGrid::standard();
        let towers = TowerStatus::new();
        let obstacles = [grid.tower_footprint(PlayerId::TOP, TowerSlot::Left)];
        let query = DeployQuery {
            rule: DeployRule::ArenaWide,
            is_spell: true,
            body_radius: 0.0,
            building: None,
            obstacles: &obstacles,
        };
        assert!(grid.can_deploy_at(Position::new(3.5, 25.5), PlayerId::BOTTOM, &towers, &query));
        assert!(grid.can_deploy_at(Position::new(8.5, 15.5), PlayerId::BOTTOM, &towers, &query));
        assert!(!grid.can_deploy_at(Position::new(0.5, 14.5), PlayerId::BOTTOM, &towers, &query));
    }

    #[test]
    fn buildings_use_square_overlap() {
        let grid = TileGrid::standard();
        let towers = TowerStatus::new();
        let obstacles = [Footprint::new(Position::new(9.5, 10.5), 3.0)];
        let query = DeployQuery {
            building: Some(FootprintSize::Standard),
            ..troop_query(&obstacles)
        };
        assert!(!grid.can_deploy_at(Position::new(9.5, 12.5), PlayerId::BOTTOM, &towers, &query));
        assert!(grid.can_deploy_at(Position::new(9.5, 13.5), PlayerId::BOTTOM, &towers, &query));
    }

    #[test]
    fn zones_are_idempotent() {
        let grid = TileGrid::standard();
        let mut towers = TowerStatus::new();
        let _ = towers.mark_destroyed(PlayerId::TOP, TowerSlot::Left);
        assert_eq!(
            grid.deploy_zones(PlayerId::BOTTOM, &towers),
            grid.deploy_zones(PlayerId::BOTTOM, &towers)
        );
    }

    #[test]
    fn marking_twice_reports_only_first_destruction() {
        let mut towers = TowerStatus::new();
        assert!(towers.mark_destroyed(PlayerId::BOTTOM, TowerSlot::Right));
        assert!(!towers.mark_destroyed(PlayerId::BOTTOM, TowerSlot::Right));
        assert_eq!(towers.princesses_lost(PlayerId::BOTTOM), 1);
        assert!(!towers.princess_lost(PlayerId::TOP));
    }
}
