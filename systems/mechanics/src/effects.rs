//! One-shot outcomes applied where a spell lands.

use std::collections::BTreeSet;
use std::sync::Arc;

use arena_battle_core::{TargetType, TowerSlot};
use arena_battle_world::{
    AreaState, Effect, EffectContext, EntityKind, GraveyardState, ProjectileState, RollingState,
    SpawnProjectileState,
};

use crate::{enemies_in_reach, strike};

/// Enemies of the caster inside `radius` around the effect's target point.
fn victims(context: &EffectContext<'_>, radius: f32) -> Vec<arena_battle_core::EntityId> {
    enemies_in_reach(
        context.battle,
        context.caster,
        context.target,
        radius,
        TargetType::AirAndGround,
    )
}

/// Instant area damage, reduced against crown towers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectDamage {
    /// Damage at level one.
    pub damage: f32,
    /// Radius in tiles.
    pub radius: f32,
    /// Multiplier applied against crown towers.
    pub crown_tower_scale: f32,
}

impl Effect for DirectDamage {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let damage = self.damage * context.scale();
        let targets = victims(context, self.radius);
        tracing::debug!(
            card = context.card.name(),
            targets = targets.len(),
            damage,
            "area damage"
        );
        for target in targets {
            let _ = strike(context.battle, target, damage, self.crown_tower_scale);
        }
    }
}

/// Stuns every enemy in the radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApplyStun {
    /// Radius in tiles.
    pub radius: f32,
    /// Stun duration in seconds.
    pub duration: f32,
}

impl Effect for ApplyStun {
    fn apply(&self, context: &mut EffectContext<'_>) {
        for target in victims(context, self.radius) {
            if let Some(entity) = context.battle.entity_mut(target) {
                entity.status.apply_stun(self.duration);
            }
        }
    }
}

/// Slows every enemy in the radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApplySlow {
    /// Radius in tiles.
    pub radius: f32,
    /// Slow duration in seconds.
    pub duration: f32,
    /// Speed multiplier while slowed.
    pub multiplier: f32,
}

impl Effect for ApplySlow {
    fn apply(&self, context: &mut EffectContext<'_>) {
        for target in victims(context, self.radius) {
            if let Some(entity) = context.battle.entity_mut(target) {
                entity.status.apply_slow(self.duration, self.multiplier);
            }
        }
    }
}

/// Freezes every enemy in the radius: a small hit, then no movement and no
/// attack countdown for the duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApplyFreeze {
    /// Radius in tiles.
    pub radius: f32,
    /// Freeze duration in seconds.
    pub duration: f32,
    /// Damage at level one.
    pub damage: f32,
}

impl Effect for ApplyFreeze {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let damage = self.damage * context.scale();
        for target in victims(context, self.radius) {
            let _ = context.battle.damage_entity(target, damage);
            if let Some(entity) = context.battle.entity_mut(target) {
                entity.status.apply_stun(self.duration);
            }
        }
    }
}

/// Buffs every friendly unit in the radius. Crown towers are left alone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApplyBuff {
    /// Radius in tiles.
    pub radius: f32,
    /// Buff duration in seconds.
    pub duration: f32,
    /// Movement and attack cadence multiplier.
    pub speed: f32,
    /// Outgoing damage multiplier.
    pub damage: f32,
}

impl Effect for ApplyBuff {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let allies = context
            .battle
            .allies_within(context.caster, context.target, self.radius);
        for ally in allies {
            if context.battle.is_crown_tower(ally) {
                continue;
            }
            if let Some(entity) = context.battle.entity_mut(ally) {
                entity.status.apply_buff(self.duration, self.speed, self.damage);
            }
        }
    }
}

/// Leaves a zone behind that pulses damage and may slow, pull or buff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicArea {
    zone: AreaState,
}

impl PeriodicArea {
    /// A zone of `radius` tiles lasting `duration` seconds that does nothing
    /// until configured further.
    #[must_use]
    pub fn new(radius: f32, duration: f32) -> Self {
        Self {
            zone: AreaState {
                radius,
                remaining: duration,
                interval: duration,
                pulse_timer: 0.0,
                damage: 0.0,
                crown_tower_scale: 1.0,
                slow: None,
                pull: 0.0,
                buff: None,
            },
        }
    }

    /// Deals `damage` (at level one) every `interval` seconds, the first
    /// pulse landing immediately.
    #[must_use]
    pub fn with_damage(mut self, damage: f32, interval: f32, crown_tower_scale: f32) -> Self {
        self.zone.damage = damage;
        self.zone.interval = interval;
        self.zone.crown_tower_scale = crown_tower_scale;
        self
    }

    /// Slows enemies inside the zone.
    #[must_use]
    pub fn with_slow(mut self, multiplier: f32) -> Self {
        self.zone.slow = Some(multiplier);
        self
    }

    /// Drags enemies toward the center at `speed` tiles per second.
    #[must_use]
    pub fn with_pull(mut self, speed: f32) -> Self {
        self.zone.pull = speed;
        self
    }

    /// Buffs friendly units inside the zone.
    #[must_use]
    pub fn with_buff(mut self, speed: f32, damage: f32) -> Self {
        self.zone.buff = Some((speed, damage));
        self
    }
}

impl Effect for PeriodicArea {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let zone = AreaState {
            damage: self.zone.damage * context.scale(),
            ..self.zone
        };
        let _ = context.battle.spawn_entity(
            context.caster,
            Arc::clone(&context.card),
            context.target,
            EntityKind::AreaEffect(zone),
        );
    }
}

/// Fires a projectile from the caster's king tower that applies its payload
/// where it lands.
#[derive(Clone, Debug)]
pub struct ProjectileLaunch {
    speed: f32,
    payload: Vec<Arc<dyn Effect>>,
}

impl ProjectileLaunch {
    /// A projectile travelling at `speed` tiles per second with no payload.
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            payload: Vec::new(),
        }
    }

    /// Adds an effect applied at the landing point.
    #[must_use]
    pub fn with_payload(mut self, effect: impl Effect + 'static) -> Self {
        self.payload.push(Arc::new(effect));
        self
    }
}

impl Effect for ProjectileLaunch {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let origin = context
            .battle
            .grid()
            .tower_site(context.caster, TowerSlot::King);
        let state = ProjectileState {
            destination: context.target,
            speed: self.speed,
            payload: self.payload.clone(),
        };
        let _ = context.battle.spawn_entity(
            context.caster,
            Arc::clone(&context.card),
            origin,
            EntityKind::Projectile(state),
        );
    }
}

/// Rolls a damaging projectile forward from the drop point, pushing back
/// the ground units it runs over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RollingLaunch {
    /// Tiles per second.
    pub speed: f32,
    /// Tiles travelled before the projectile stops.
    pub range: f32,
    /// Half width of the damaging band.
    pub radius: f32,
    /// Damage at level one.
    pub damage: f32,
    /// Push distance in tiles.
    pub knockback: f32,
    /// Multiplier applied against crown towers.
    pub crown_tower_scale: f32,
}

impl Effect for RollingLaunch {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let state = RollingState {
            direction: (0.0, context.caster.forward()),
            speed: self.speed,
            remaining: self.range,
            radius: self.radius,
            damage: self.damage * context.scale(),
            knockback: self.knockback,
            crown_tower_scale: self.crown_tower_scale,
            hit: BTreeSet::new(),
        };
        let _ = context.battle.spawn_entity(
            context.caster,
            Arc::clone(&context.card),
            context.target,
            EntityKind::RollingProjectile(state),
        );
    }
}

/// Spawns units of another card around the target point using that card's
/// formation.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnUnits {
    /// Card name of the spawned units.
    pub unit: String,
    /// Number of units.
    pub count: u32,
}

impl Effect for SpawnUnits {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let Some(card) = context.battle.lookup(&self.unit) else {
            tracing::debug!(unit = %self.unit, "spawned unit is not in the catalog");
            return;
        };
        let spots = context
            .battle
            .formation_positions(&card, context.target, self.count);
        for spot in spots {
            let _ = context
                .battle
                .spawn_unit(context.caster, Arc::clone(&card), spot);
        }
    }
}

/// Lobs a barrel from the caster's king tower that releases units where it
/// lands.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnProjectileLaunch {
    /// Tiles per second.
    pub speed: f32,
    /// Card name of the released units.
    pub unit: String,
    /// Number of released units.
    pub count: u32,
}

impl Effect for SpawnProjectileLaunch {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let origin = context
            .battle
            .grid()
            .tower_site(context.caster, TowerSlot::King);
        let state = SpawnProjectileState {
            destination: context.target,
            speed: self.speed,
            unit: self.unit.clone(),
            count: self.count,
        };
        let _ = context.battle.spawn_entity(
            context.caster,
            Arc::clone(&context.card),
            origin,
            EntityKind::SpawnProjectile(state),
        );
    }
}

/// Opens a zone that raises units at random spots inside it over time.
#[derive(Clone, Debug, PartialEq)]
pub struct SummonGraveyard {
    /// Card name of the raised units.
    pub unit: String,
    /// Zone radius in tiles.
    pub radius: f32,
    /// Seconds the zone persists.
    pub duration: f32,
    /// Seconds between raised units.
    pub interval: f32,
}

impl Effect for SummonGraveyard {
    fn apply(&self, context: &mut EffectContext<'_>) {
        let state = GraveyardState {
            remaining: self.duration,
            interval: self.interval,
            spawn_timer: self.interval,
            radius: self.radius,
            unit: self.unit.clone(),
            spawned: 0,
        };
        let _ = context.battle.spawn_entity(
            context.caster,
            Arc::clone(&context.card),
            context.target,
            EntityKind::Graveyard(state),
        );
    }
}
