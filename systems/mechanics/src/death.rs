//! Behaviours triggered when a unit dies.

use std::sync::Arc;

use arena_battle_arena::ring_formation;
use arena_battle_core::{level_multiplier, PlayerId, Position, TargetType};
use arena_battle_world::{
    AreaState, CardDefinition, EntityKind, ExplosiveState, Mechanic, MechanicContext,
};

use crate::enemies_in_reach;

/// Owner, position and card of the entity a hook runs for.
fn remains(context: &MechanicContext<'_>) -> Option<(PlayerId, Position, Arc<CardDefinition>)> {
    context
        .entity()
        .map(|entity| (entity.owner(), entity.position, Arc::clone(entity.card())))
}

/// Releases units around the spot where the carrier died.
///
/// Units stand evenly on a small ring so that none of them share a position.
#[derive(Clone, Debug, PartialEq)]
pub struct DeathSpawn {
    unit: String,
    count: u32,
    radius: f32,
}

impl DeathSpawn {
    /// Ring radius used unless overridden.
    pub const DEFAULT_RADIUS: f32 = 0.5;

    /// Releases `count` units of the named card.
    #[must_use]
    pub fn new(unit: impl Into<String>, count: u32) -> Self {
        Self {
            unit: unit.into(),
            count,
            radius: Self::DEFAULT_RADIUS,
        }
    }

    /// Overrides the ring radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

impl Mechanic for DeathSpawn {
    fn on_death(&mut self, context: &mut MechanicContext<'_>) {
        let Some((owner, position, _)) = remains(context) else {
            return;
        };
        let Some(card) = context.battle.lookup(&self.unit) else {
            tracing::debug!(unit = %self.unit, "death spawn unit is not in the catalog");
            return;
        };
        for spot in ring_formation(position, self.count, self.radius) {
            let _ = context.battle.spawn_unit(owner, Arc::clone(&card), spot);
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(self.clone())
    }
}

/// Deals area damage to every enemy around the spot where the carrier died.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeathDamage {
    /// Blast radius in tiles.
    pub radius: f32,
    /// Damage at level one.
    pub damage: f32,
}

impl Mechanic for DeathDamage {
    fn on_death(&mut self, context: &mut MechanicContext<'_>) {
        let Some((owner, position, card)) = remains(context) else {
            return;
        };
        let damage = self.damage * level_multiplier(card.stats().level);
        let victims = enemies_in_reach(
            context.battle,
            owner,
            position,
            self.radius,
            TargetType::AirAndGround,
        );
        for victim in victims {
            let _ = context.battle.damage_entity(victim, damage);
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Drops a bomb that detonates after a fuse, like a falling balloon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeathExplosive {
    /// Seconds until the bomb goes off.
    pub fuse: f32,
    /// Damage at level one.
    pub damage: f32,
    /// Blast radius in tiles.
    pub radius: f32,
}

impl Mechanic for DeathExplosive {
    fn on_death(&mut self, context: &mut MechanicContext<'_>) {
        let Some((owner, position, card)) = remains(context) else {
            return;
        };
        let state = ExplosiveState {
            fuse: self.fuse,
            damage: self.damage * level_multiplier(card.stats().level),
            radius: self.radius,
        };
        let _ = context
            .battle
            .spawn_entity(owner, card, position, EntityKind::TimedExplosive(state));
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Leaves a rage zone behind that speeds up friendly units standing in it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeathAreaBuff {
    /// Zone radius in tiles.
    pub radius: f32,
    /// Seconds the zone persists.
    pub duration: f32,
    /// Movement and attack cadence multiplier.
    pub speed: f32,
    /// Outgoing damage multiplier.
    pub damage: f32,
}

impl Mechanic for DeathAreaBuff {
    fn on_death(&mut self, context: &mut MechanicContext<'_>) {
        let Some((owner, position, card)) = remains(context) else {
            return;
        };
        let zone = AreaState {
            radius: self.radius,
            remaining: self.duration,
            interval: self.duration,
            pulse_timer: self.duration,
            damage: 0.0,
            crown_tower_scale: 1.0,
            slow: None,
            pull: 0.0,
            buff: Some((self.speed, self.damage)),
        };
        let _ = context
            .battle
            .spawn_entity(owner, card, position, EntityKind::AreaEffect(zone));
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use arena_battle_core::CardStats;

    fn golem() -> CardDefinition {
        CardDefinition::new(CardStats {
            hitpoints: 500.0,
            damage: 0.0,
            speed: 0.0,
            deploy_time: 0.0,
            ..CardStats::troop("Golem", 8)
        })
        .expect("valid")
        .with_mechanic(DeathSpawn::new("Dummy", 2))
        .with_mechanic(DeathDamage {
            radius: 2.0,
            damage: 100.0,
        })
    }

    fn balloon() -> CardDefinition {
        CardDefinition::new(CardStats {
            hitpoints: 300.0,
            damage: 0.0,
            speed: 0.0,
            deploy_time: 0.0,
            is_air: true,
            ..CardStats::troop("Balloon", 5)
        })
        .expect("valid")
        .with_mechanic(DeathExplosive {
            fuse: 1.0,
            damage: 200.0,
            radius: 3.0,
        })
    }

    fn lumberjack() -> CardDefinition {
        CardDefinition::new(CardStats {
            hitpoints: 300.0,
            damage: 0.0,
            speed: 0.0,
            deploy_time: 0.0,
            ..CardStats::troop("Lumberjack", 4)
        })
        .expect("valid")
        .with_mechanic(DeathAreaBuff {
            radius: 3.0,
            duration: 2.0,
            speed: 1.35,
            damage: 1.35,
        })
    }

    #[test]
    fn death_spawn_and_damage_fire_before_removal() {
        let mut battle = testing::battle(vec![golem()]);
        let golem = testing::spawn(&mut battle, PlayerId::BOTTOM, "Golem", 9.5, 12.5);
        let enemy = testing::dummy(&mut battle, PlayerId::TOP, 10.5, 12.5);
        let _ = battle.damage_entity(golem, 10_000.0);
        testing::run(&mut battle, 1.0 / 30.0);

        assert!(battle.entity(golem).is_none());
        let released: Vec<Position> = battle
            .entities()
            .filter(|entity| entity.owner() == PlayerId::BOTTOM && entity.card().name() == "Dummy")
            .map(|entity| entity.position)
            .collect();
        assert_eq!(released.len(), 2);
        assert_ne!(released[0], released[1]);
        assert_eq!(testing::hitpoints(&battle, enemy), 900.0);
    }

    #[test]
    fn death_explosive_detonates_after_its_fuse() {
        let mut battle = testing::battle(vec![balloon()]);
        let balloon = testing::spawn(&mut battle, PlayerId::BOTTOM, "Balloon", 9.5, 12.5);
        let enemy = testing::dummy(&mut battle, PlayerId::TOP, 9.5, 13.5);
        let _ = battle.damage_entity(balloon, 10_000.0);

        testing::run(&mut battle, 0.5);
        assert_eq!(testing::hitpoints(&battle, enemy), 1000.0);
        let bombs = battle
            .entities()
            .filter(|entity| matches!(entity.kind, EntityKind::TimedExplosive(_)))
            .count();
        assert_eq!(bombs, 1);

        testing::run(&mut battle, 1.0);
        assert_eq!(testing::hitpoints(&battle, enemy), 800.0);
        assert!(!battle
            .entities()
            .any(|entity| matches!(entity.kind, EntityKind::TimedExplosive(_))));
    }

    #[test]
    fn rage_zone_buffs_friends_only() {
        let mut battle = testing::battle(vec![lumberjack()]);
        let lumberjack = testing::spawn(&mut battle, PlayerId::BOTTOM, "Lumberjack", 9.5, 12.5);
        let friend = testing::dummy(&mut battle, PlayerId::BOTTOM, 10.5, 12.5);
        let enemy = testing::dummy(&mut battle, PlayerId::TOP, 8.5, 12.5);
        let _ = battle.damage_entity(lumberjack, 10_000.0);
        testing::run(&mut battle, 0.2);

        let buffed = |id| {
            battle
                .entity(id)
                .is_some_and(|entity| entity.status.buff().is_some())
        };
        assert!(buffed(friend));
        assert!(!buffed(enemy));
    }
}
