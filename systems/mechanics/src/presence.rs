//! Behaviours tied to a unit's presence on the field rather than its attacks.

use std::f32::consts::TAU;
use std::sync::Arc;

use arena_battle_core::{level_multiplier, TargetType};
use arena_battle_world::{Entity, Mechanic, MechanicContext};

use crate::enemies_in_reach;

/// Seconds an aura's slow lingers after a victim leaves the radius.
const AURA_LINGER: f32 = 0.2;

/// Grants a damage-absorbing shield when the unit is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shield {
    /// Shield charge at level one.
    pub amount: f32,
}

impl Mechanic for Shield {
    fn on_attach(&mut self, entity: &mut Entity) {
        let charge = self.amount * level_multiplier(entity.card().stats().level);
        entity.status.grant_shield(charge);
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Continuously slows every enemy around the unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlowAura {
    /// Aura radius in tiles.
    pub radius: f32,
    /// Speed multiplier applied to enemies inside the aura.
    pub multiplier: f32,
}

impl Mechanic for SlowAura {
    fn on_tick(&mut self, context: &mut MechanicContext<'_>, _dt: f32) {
        let Some((owner, position)) = context
            .entity()
            .map(|entity| (entity.owner(), entity.position))
        else {
            return;
        };
        let victims = enemies_in_reach(
            context.battle,
            owner,
            position,
            self.radius,
            TargetType::AirAndGround,
        );
        for victim in victims {
            if let Some(victim) = context.battle.entity_mut(victim) {
                victim.status.apply_slow(AURA_LINGER, self.multiplier);
            }
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Zaps the surroundings as the unit lands: damage plus a short stun.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnZap {
    /// Zap radius in tiles.
    pub radius: f32,
    /// Stun duration in seconds.
    pub stun: f32,
    /// Fraction of the unit's own hit damage dealt by the zap.
    pub damage_scale: f32,
}

impl Default for SpawnZap {
    fn default() -> Self {
        Self {
            radius: 4.0,
            stun: 0.5,
            damage_scale: 0.5,
        }
    }
}

impl Mechanic for SpawnZap {
    fn on_spawn(&mut self, context: &mut MechanicContext<'_>) {
        let Some((owner, position, damage)) = context
            .entity()
            .map(|entity| (entity.owner(), entity.position, entity.profile.damage))
        else {
            return;
        };
        let victims = enemies_in_reach(
            context.battle,
            owner,
            position,
            self.radius,
            TargetType::AirAndGround,
        );
        tracing::debug!(%owner, victims = victims.len(), "spawn zap");
        for victim in victims {
            let _ = context.battle.damage_entity(victim, damage * self.damage_scale);
            if let Some(victim) = context.battle.entity_mut(victim) {
                victim.status.apply_stun(self.stun);
            }
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Periodically releases units around the carrier, like a tombstone or a
/// witch summoning skeletons.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicSpawner {
    unit: String,
    interval: f32,
    count: u32,
    radius: f32,
    max_spawns: Option<u32>,
    timer: f32,
    spawned: u32,
}

impl PeriodicSpawner {
    /// Releases `count` units of the named card every `interval` seconds.
    /// The first wave comes after one full interval.
    #[must_use]
    pub fn new(unit: impl Into<String>, interval: f32, count: u32) -> Self {
        Self {
            unit: unit.into(),
            interval,
            count,
            radius: 1.0,
            max_spawns: None,
            timer: interval,
            spawned: 0,
        }
    }

    /// Stops after `waves` releases.
    #[must_use]
    pub fn with_max_spawns(mut self, waves: u32) -> Self {
        self.max_spawns = Some(waves);
        self
    }

    /// Overrides the radius released units scatter within.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Waves released so far.
    #[must_use]
    pub const fn spawned(&self) -> u32 {
        self.spawned
    }

    fn exhausted(&self) -> bool {
        self.max_spawns.is_some_and(|max| self.spawned >= max)
    }
}

impl Mechanic for PeriodicSpawner {
    fn on_tick(&mut self, context: &mut MechanicContext<'_>, dt: f32) {
        if self.exhausted() {
            return;
        }
        let Some((owner, center, stunned)) = context
            .entity()
            .map(|entity| (entity.owner(), entity.position, entity.status.is_stunned()))
        else {
            return;
        };
        if stunned {
            return;
        }
        self.timer -= dt;
        if self.timer > 0.0 {
            return;
        }
        self.timer += self.interval.max(dt);
        self.spawned = self.spawned.saturating_add(1);

        let Some(card) = context.battle.lookup(&self.unit) else {
            tracing::debug!(unit = %self.unit, "spawner unit is not in the catalog");
            return;
        };
        for _ in 0..self.count {
            let angle = context.battle.roll() * TAU;
            let distance = context.battle.roll() * self.radius;
            let spot = center.offset(distance * angle.cos(), distance * angle.sin());
            let _ = context.battle.spawn_unit(owner, Arc::clone(&card), spot);
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(self.clone())
    }
}
