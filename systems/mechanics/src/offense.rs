//! Behaviours that shape or extend a unit's attacks.

use std::collections::BTreeSet;

use arena_battle_core::{EntityId, PlayerId, Position, TargetType};
use arena_battle_system_combat::DamageRamp as Ramp;
use arena_battle_world::{HitReport, Mechanic, MechanicContext, PendingHit};

use crate::enemies_in_reach;

/// Seconds a knocked back unit waits before it may attack again.
const KNOCKBACK_RECOVERY: f32 = 0.5;

/// Outgoing damage climbs in stages while the unit keeps hitting one target
/// and drops back to the first stage as soon as it switches.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageRamp {
    ramp: Ramp,
}

impl DamageRamp {
    /// Creates a ramp with one multiplier per stage.
    #[must_use]
    pub fn new(stages: Vec<f32>, hits_per_stage: u32) -> Self {
        Self {
            ramp: Ramp::new(stages, hits_per_stage),
        }
    }

    /// Zero-based index of the active stage.
    #[must_use]
    pub fn stage(&self) -> usize {
        self.ramp.stage()
    }
}

impl Mechanic for DamageRamp {
    fn on_tick(&mut self, context: &mut MechanicContext<'_>, _dt: f32) {
        let target = context.entity().and_then(|entity| entity.target);
        if self.ramp.locked().is_some() && self.ramp.locked() != target {
            self.ramp.reset();
        }
    }

    fn on_attack_start(&mut self, _context: &mut MechanicContext<'_>, hit: &mut PendingHit) {
        hit.damage *= self.ramp.hit(hit.target);
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(self.clone())
    }
}

/// Stuns the target of a hit, optionally only some of the time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StunOnHit {
    /// Stun duration in seconds.
    pub duration: f32,
    /// Probability in `[0, 1]` that a hit stuns.
    pub chance: f32,
}

impl Mechanic for StunOnHit {
    fn on_attack_hit(&mut self, context: &mut MechanicContext<'_>, hit: &HitReport) {
        if self.chance < 1.0 && context.battle.roll() >= self.chance {
            return;
        }
        if let Some(victim) = context.battle.entity_mut(hit.target) {
            victim.status.apply_stun(self.duration);
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Stuns the target and bounces to nearby enemies with decaying damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainStun {
    /// Maximum distance of one bounce.
    pub range: f32,
    /// Extra enemies reached after the primary target.
    pub bounces: u32,
    /// Damage multiplier applied at every bounce.
    pub decay: f32,
    /// Stun applied to every enemy in the chain.
    pub stun: f32,
}

impl Mechanic for ChainStun {
    fn on_attack_hit(&mut self, context: &mut MechanicContext<'_>, hit: &HitReport) {
        let Some((owner, reach)) = context
            .entity()
            .map(|entity| (entity.owner(), entity.profile.target_type))
        else {
            return;
        };
        if let Some(victim) = context.battle.entity_mut(hit.target) {
            victim.status.apply_stun(self.stun);
        }

        let mut visited = BTreeSet::from([hit.target]);
        let mut origin = hit.position;
        let mut damage = hit.damage;
        for _ in 0..self.bounces {
            damage *= self.decay;
            let next = enemies_in_reach(context.battle, owner, origin, self.range, reach)
                .into_iter()
                .filter(|id| !visited.contains(id))
                .filter_map(|id| {
                    context
                        .battle
                        .entity(id)
                        .map(|entity| (id, entity.position))
                })
                .min_by(|a, b| origin.distance_to(a.1).total_cmp(&origin.distance_to(b.1)));
            let Some((id, position)) = next else {
                break;
            };
            let _ = visited.insert(id);
            let _ = context.battle.damage_entity(id, damage);
            if let Some(victim) = context.battle.entity_mut(id) {
                victim.status.apply_stun(self.stun);
            }
            origin = position;
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Multiplies hits against crown towers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrownTowerScaling {
    /// Multiplier applied to hits on crown towers.
    pub multiplier: f32,
}

impl Mechanic for CrownTowerScaling {
    fn on_attack_start(&mut self, context: &mut MechanicContext<'_>, hit: &mut PendingHit) {
        if context.battle.is_crown_tower(hit.target) {
            hit.damage *= self.multiplier;
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Pushes troops away from the attacker. Buildings are immune.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KnockbackOnHit {
    /// Push distance in tiles.
    pub distance: f32,
    /// Probability in `[0, 1]` that a hit pushes.
    pub chance: f32,
}

impl Default for KnockbackOnHit {
    fn default() -> Self {
        Self {
            distance: 1.0,
            chance: 1.0,
        }
    }
}

impl Mechanic for KnockbackOnHit {
    fn on_attack_hit(&mut self, context: &mut MechanicContext<'_>, hit: &HitReport) {
        if hit.lethal {
            return;
        }
        let Some(attacker) = context.entity().map(|entity| entity.position) else {
            return;
        };
        if !context
            .battle
            .entity(hit.target)
            .is_some_and(|victim| victim.is_troop())
        {
            return;
        }
        if self.chance < 1.0 && context.battle.roll() >= self.chance {
            return;
        }
        let distance = attacker.distance_to(hit.position);
        if distance <= f32::EPSILON {
            return;
        }
        let dx = (hit.position.x() - attacker.x()) / distance * self.distance;
        let dy = (hit.position.y() - attacker.y()) / distance * self.distance;
        context.battle.displace(hit.target, dx, dy);
        if let Some(victim) = context.battle.entity_mut(hit.target) {
            let shortfall = KNOCKBACK_RECOVERY - victim.timer.remaining();
            victim.timer.delay(shortfall);
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Hits every other enemy around the attacker with the same damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinAttack {
    /// Spin radius in tiles.
    pub radius: f32,
}

impl Mechanic for SpinAttack {
    fn on_attack_hit(&mut self, context: &mut MechanicContext<'_>, hit: &HitReport) {
        let Some((owner, position, reach)) = context
            .entity()
            .map(|entity| (entity.owner(), entity.position, entity.profile.target_type))
        else {
            return;
        };
        splash(context, owner, position, self.radius, reach, hit);
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Hits every other enemy around the target with the same damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplashOnHit {
    /// Splash radius in tiles.
    pub radius: f32,
}

impl Mechanic for SplashOnHit {
    fn on_attack_hit(&mut self, context: &mut MechanicContext<'_>, hit: &HitReport) {
        let Some((owner, reach)) = context
            .entity()
            .map(|entity| (entity.owner(), entity.profile.target_type))
        else {
            return;
        };
        splash(context, owner, hit.position, self.radius, reach, hit);
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

fn splash(
    context: &mut MechanicContext<'_>,
    owner: PlayerId,
    center: Position,
    radius: f32,
    reach: TargetType,
    hit: &HitReport,
) {
    let victims = enemies_in_reach(context.battle, owner, center, radius, reach);
    for victim in victims.into_iter().filter(|victim| *victim != hit.target) {
        let _ = context.battle.damage_entity(victim, hit.damage);
    }
}

/// Fans an attack out over several enemies in range, splitting its damage
/// evenly between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultiProjectile {
    /// Maximum number of enemies hit by one attack, the primary included.
    pub projectiles: u32,
}

impl Mechanic for MultiProjectile {
    fn on_attack_start(&mut self, context: &mut MechanicContext<'_>, hit: &mut PendingHit) {
        let Some((owner, position, range, reach)) = context.entity().map(|entity| {
            (
                entity.owner(),
                entity.position,
                entity.profile.range,
                entity.profile.target_type,
            )
        }) else {
            return;
        };
        let mut extras: Vec<(EntityId, f32)> =
            enemies_in_reach(context.battle, owner, position, range, reach)
                .into_iter()
                .filter(|id| *id != hit.target)
                .filter_map(|id| {
                    context
                        .battle
                        .entity(id)
                        .map(|entity| (id, position.distance_to(entity.position)))
                })
                .collect();
        extras.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        extras.truncate(self.projectiles.saturating_sub(1) as usize);

        let share = hit.damage / (extras.len() + 1) as f32;
        hit.damage = share;
        for (id, _) in extras {
            let _ = context.battle.damage_entity(id, share);
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Slows the target of every hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlowOnHit {
    /// Slow duration in seconds.
    pub duration: f32,
    /// Speed multiplier while slowed.
    pub multiplier: f32,
}

impl Mechanic for SlowOnHit {
    fn on_attack_hit(&mut self, context: &mut MechanicContext<'_>, hit: &HitReport) {
        if let Some(victim) = context.battle.entity_mut(hit.target) {
            victim.status.apply_slow(self.duration, self.multiplier);
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Gap closer: leaps onto a target at medium range and ignores damage for a
/// moment after landing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dash {
    min_range: f32,
    max_range: f32,
    invulnerability: f32,
    cooldown: f32,
    ready_in: f32,
}

impl Dash {
    /// Dashes at targets between `min_range` and `max_range` tiles away.
    #[must_use]
    pub fn new(min_range: f32, max_range: f32) -> Self {
        Self {
            min_range,
            max_range,
            invulnerability: 0.5,
            cooldown: 3.0,
            ready_in: 0.0,
        }
    }

    /// Overrides the invulnerability window and cooldown.
    #[must_use]
    pub fn with_timing(mut self, invulnerability: f32, cooldown: f32) -> Self {
        self.invulnerability = invulnerability;
        self.cooldown = cooldown;
        self
    }
}

impl Default for Dash {
    fn default() -> Self {
        Self::new(3.5, 6.0)
    }
}

impl Mechanic for Dash {
    fn on_tick(&mut self, context: &mut MechanicContext<'_>, dt: f32) {
        self.ready_in = (self.ready_in - dt).max(0.0);
        if self.ready_in > 0.0 {
            return;
        }
        let Some((position, target, range, stunned, airborne)) = context.entity().map(|entity| {
            (
                entity.position,
                entity.target,
                entity.profile.range,
                entity.status.is_stunned(),
                entity.is_air,
            )
        }) else {
            return;
        };
        if stunned {
            return;
        }
        let Some((goal, radius)) = target
            .and_then(|id| context.battle.entity(id))
            .map(|victim| (victim.position, victim.profile.collision_radius))
        else {
            return;
        };
        let distance = position.distance_to(goal);
        if distance < self.min_range || distance > self.max_range {
            return;
        }
        let grid = context.battle.grid();
        if !airborne && grid.side_of(position) != grid.side_of(goal) {
            return;
        }
        let landing = position.step_toward(goal, (distance - radius - range).max(0.0));
        if !airborne && !grid.is_walkable(landing) {
            return;
        }

        if let Some(entity) = context.entity_mut() {
            entity.position = landing;
            entity.status.grant_invulnerability(self.invulnerability);
        }
        self.ready_in = self.cooldown;
        tracing::trace!(entity = %context.entity, distance, "dash");
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Builds up a charge while the unit keeps moving; the first hit after the
/// windup deals multiplied damage. A stun discards the charge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeAttack {
    windup: f32,
    multiplier: f32,
    progress: f32,
    last_position: Option<Position>,
}

impl ChargeAttack {
    /// Charges after `windup` seconds of movement and multiplies the next hit.
    #[must_use]
    pub const fn new(windup: f32, multiplier: f32) -> Self {
        Self {
            windup,
            multiplier,
            progress: 0.0,
            last_position: None,
        }
    }

    /// Reports whether the next hit is charged.
    #[must_use]
    pub fn is_charged(&self) -> bool {
        self.progress >= self.windup
    }
}

impl Default for ChargeAttack {
    fn default() -> Self {
        Self::new(2.0, 2.0)
    }
}

impl Mechanic for ChargeAttack {
    fn on_tick(&mut self, context: &mut MechanicContext<'_>, dt: f32) {
        let Some((position, stunned)) = context
            .entity()
            .map(|entity| (entity.position, entity.status.is_stunned()))
        else {
            return;
        };
        if stunned {
            self.progress = 0.0;
        } else if self.last_position.is_some_and(|last| last != position) {
            self.progress += dt;
        } else if !self.is_charged() {
            self.progress = 0.0;
        }
        self.last_position = Some(position);
    }

    fn on_attack_start(&mut self, _context: &mut MechanicContext<'_>, hit: &mut PendingHit) {
        if self.is_charged() {
            hit.damage *= self.multiplier;
        }
        self.progress = 0.0;
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}
