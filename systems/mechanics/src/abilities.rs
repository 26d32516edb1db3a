//! Signature moves that go beyond shaping a single hit: stealth, kamikaze
//! attacks, jumps, hooks, piercing and recoiling shots, charged shots and
//! elixir-paid champion abilities.

use std::sync::Arc;

use arena_battle_core::{EntityId, Position, TargetType};
use arena_battle_world::{Effect, HitReport, Mechanic, MechanicContext, PendingHit};

use crate::enemies_in_reach;

/// Keeps the unit invisible while no enemy stands within `radius`. Enemies
/// cannot target an invisible unit, though area damage still lands, and
/// every attack reveals it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    /// Distance at which a nearby enemy breaks the stealth.
    pub radius: f32,
    /// Seconds the stealth outlasts the last quiet tick.
    pub grace: f32,
}

impl Default for Fade {
    fn default() -> Self {
        Self {
            radius: 4.5,
            grace: 0.6,
        }
    }
}

impl Mechanic for Fade {
    fn on_tick(&mut self, context: &mut MechanicContext<'_>, _dt: f32) {
        let Some((owner, position)) = context
            .entity()
            .map(|entity| (entity.owner(), entity.position))
        else {
            return;
        };
        let threatened = !context
            .battle
            .enemies_within(owner, position, self.radius)
            .is_empty();
        if let Some(entity) = context.entity_mut() {
            if threatened {
                entity.status.reveal();
            } else {
                entity.status.cloak(self.grace);
            }
        }
    }

    fn on_attack_start(&mut self, context: &mut MechanicContext<'_>, _hit: &mut PendingHit) {
        if let Some(entity) = context.entity_mut() {
            entity.status.reveal();
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Spends the unit on its first hit. The blast multiplies the hit, splashes
/// the same damage over enemies around the target, optionally stuns every
/// victim, and removes the attacker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelfDestruct {
    /// Blast radius around the target; zero hits the target alone.
    pub radius: f32,
    /// Multiplier applied to the hit.
    pub damage_multiplier: f32,
    /// Stun applied to every victim, zero for none.
    pub stun: f32,
}

impl Default for SelfDestruct {
    fn default() -> Self {
        Self {
            radius: 0.0,
            damage_multiplier: 1.0,
            stun: 0.0,
        }
    }
}

impl Mechanic for SelfDestruct {
    fn on_attack_start(&mut self, _context: &mut MechanicContext<'_>, hit: &mut PendingHit) {
        hit.damage *= self.damage_multiplier;
    }

    fn on_attack_hit(&mut self, context: &mut MechanicContext<'_>, hit: &HitReport) {
        let Some((owner, reach)) = context
            .entity()
            .map(|entity| (entity.owner(), entity.profile.target_type))
        else {
            return;
        };
        let splashed: Vec<EntityId> = if self.radius > 0.0 {
            enemies_in_reach(context.battle, owner, hit.position, self.radius, reach)
                .into_iter()
                .filter(|victim| *victim != hit.target)
                .collect()
        } else {
            Vec::new()
        };
        for &victim in &splashed {
            let _ = context.battle.damage_entity(victim, hit.damage);
        }
        if self.stun > 0.0 {
            for victim in splashed.iter().copied().chain(std::iter::once(hit.target)) {
                if let Some(victim) = context.battle.entity_mut(victim) {
                    victim.status.apply_stun(self.stun);
                }
            }
        }
        tracing::trace!(entity = %context.entity, victims = splashed.len() + 1, "self destruct");
        if let Some(entity) = context.entity_mut() {
            entity.expire();
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Slams the ground when the unit arrives and again after every jump,
/// damaging and briefly stunning every enemy its attacks can reach around
/// the landing spot. With a jump band set, the unit leaps onto targets inside
/// that band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingSlam {
    radius: f32,
    damage_multiplier: f32,
    stun: f32,
    jump: Option<(f32, f32)>,
    cooldown: f32,
    ready_in: f32,
}

impl LandingSlam {
    /// Slams `radius` tiles around the unit for `damage_multiplier` times its
    /// hit damage.
    #[must_use]
    pub const fn new(radius: f32, damage_multiplier: f32, stun: f32) -> Self {
        Self {
            radius,
            damage_multiplier,
            stun,
            jump: None,
            cooldown: 0.0,
            ready_in: 0.0,
        }
    }

    /// Jumps onto targets between `min_range` and `max_range` tiles away, at
    /// most once per `cooldown` seconds.
    #[must_use]
    pub const fn with_jump(mut self, min_range: f32, max_range: f32, cooldown: f32) -> Self {
        self.jump = Some((min_range, max_range));
        self.cooldown = cooldown;
        self
    }

    fn slam(&self, context: &mut MechanicContext<'_>) {
        let Some((owner, position, damage, reach)) = context.entity().map(|entity| {
            (
                entity.owner(),
                entity.position,
                entity.profile.damage * entity.status.damage_multiplier(),
                entity.profile.target_type,
            )
        }) else {
            return;
        };
        let victims = enemies_in_reach(context.battle, owner, position, self.radius, reach);
        tracing::trace!(entity = %context.entity, victims = victims.len(), "landing slam");
        for victim in victims {
            let _ = context
                .battle
                .damage_entity(victim, damage * self.damage_multiplier);
            if let Some(victim) = context.battle.entity_mut(victim) {
                victim.status.apply_stun(self.stun);
            }
        }
    }
}

impl Mechanic for LandingSlam {
    fn on_spawn(&mut self, context: &mut MechanicContext<'_>) {
        self.slam(context);
    }

    fn on_tick(&mut self, context: &mut MechanicContext<'_>, dt: f32) {
        let Some((min_range, max_range)) = self.jump else {
            return;
        };
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
        if distance < min_range || distance > max_range {
            return;
        }
        let grid = context.battle.grid();
        let landing = position.step_toward(goal, (distance - radius - range).max(0.0));
        let blocked = grid.side_of(position) != grid.side_of(goal) || !grid.is_walkable(landing);
        if !airborne && blocked {
            return;
        }

        if let Some(entity) = context.entity_mut() {
            entity.position = landing;
        }
        self.ready_in = self.cooldown;
        self.slam(context);
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Reels in the nearest visible enemy ground troop that is inside hook range
/// but beyond the unit's own attack range, stunning it on arrival.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HookPull {
    range: f32,
    pull: f32,
    stun: f32,
    cooldown: f32,
    ready_in: f32,
}

impl HookPull {
    /// Hooks troops up to `range` tiles away and drags them up to `pull`
    /// tiles, stopping at the unit's reach.
    #[must_use]
    pub const fn new(range: f32, pull: f32) -> Self {
        Self {
            range,
            pull,
            stun: 0.5,
            cooldown: 4.0,
            ready_in: 0.0,
        }
    }

    /// Overrides the stun applied to the hooked troop and the cooldown.
    #[must_use]
    pub const fn with_timing(mut self, stun: f32, cooldown: f32) -> Self {
        self.stun = stun;
        self.cooldown = cooldown;
        self
    }
}

impl Mechanic for HookPull {
    fn on_tick(&mut self, context: &mut MechanicContext<'_>, dt: f32) {
        self.ready_in = (self.ready_in - dt).max(0.0);
        if self.ready_in > 0.0 {
            return;
        }
        let Some((owner, position, reach, stunned)) = context.entity().map(|entity| {
            (
                entity.owner(),
                entity.position,
                entity.profile.range,
                entity.status.is_stunned(),
            )
        }) else {
            return;
        };
        if stunned {
            return;
        }

        let battle = &*context.battle;
        let hooked = enemies_in_reach(battle, owner, position, self.range, TargetType::Ground)
            .into_iter()
            .filter_map(|id| battle.entity(id))
            .filter(|victim| victim.is_troop() && !victim.status.is_invisible())
            .map(|victim| {
                let distance = position.distance_to(victim.position);
                (victim.id(), victim.position, distance - reach - victim.profile.collision_radius)
            })
            .filter(|(_, _, gap)| *gap > 0.0)
            .min_by(|a, b| {
                position
                    .distance_to(a.1)
                    .total_cmp(&position.distance_to(b.1))
                    .then(a.0.cmp(&b.0))
            });
        let Some((victim, at, gap)) = hooked else {
            return;
        };

        let pulled = at.step_toward(position, gap.min(self.pull));
        context
            .battle
            .displace(victim, pulled.x() - at.x(), pulled.y() - at.y());
        if let Some(victim) = context.battle.entity_mut(victim) {
            victim.status.apply_stun(self.stun);
        }
        self.ready_in = self.cooldown;
        tracing::trace!(entity = %context.entity, %victim, "hook pull");
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Lets every shot continue through the target along the line of fire,
/// hitting enemies in a narrow band behind it with decayed damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PierceShot {
    /// Distance the shot travels beyond the target.
    pub length: f32,
    /// Half width of the band, measured to the edge of a victim's body.
    pub width: f32,
    /// Multiplier applied to the damage dealt behind the target.
    pub decay: f32,
}

impl Default for PierceShot {
    fn default() -> Self {
        Self {
            length: 5.0,
            width: 0.6,
            decay: 0.8,
        }
    }
}

impl Mechanic for PierceShot {
    fn on_attack_hit(&mut self, context: &mut MechanicContext<'_>, hit: &HitReport) {
        let Some((owner, origin, reach)) = context.entity().map(|entity| {
            (
                entity.owner(),
                entity.position,
                entity.profile.target_type,
            )
        }) else {
            return;
        };
        let Some((ux, uy)) = unit_vector(origin, hit.position) else {
            return;
        };

        let battle = &*context.battle;
        let pierced: Vec<EntityId> =
            enemies_in_reach(battle, owner, hit.position, self.length + self.width, reach)
                .into_iter()
                .filter(|id| *id != hit.target)
                .filter_map(|id| battle.entity(id))
                .filter(|victim| {
                    let rx = victim.position.x() - hit.position.x();
                    let ry = victim.position.y() - hit.position.y();
                    let along = rx * ux + ry * uy;
                    let across = (rx * uy - ry * ux).abs();
                    along > 0.0
                        && along <= self.length
                        && across <= self.width + victim.profile.collision_radius
                })
                .map(|victim| victim.id())
                .collect();
        for victim in pierced {
            let _ = context.battle.damage_entity(victim, hit.damage * self.decay);
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Knocks the shooter back, away from its target, after every shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Recoil {
    /// Distance travelled backwards in tiles.
    pub distance: f32,
}

impl Mechanic for Recoil {
    fn on_attack_hit(&mut self, context: &mut MechanicContext<'_>, hit: &HitReport) {
        let Some(origin) = context.entity().map(|entity| entity.position) else {
            return;
        };
        let Some((ux, uy)) = unit_vector(hit.position, origin) else {
            return;
        };
        let id = context.entity;
        context
            .battle
            .displace(id, ux * self.distance, uy * self.distance);
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Stores charge while the unit holds a target; a fully charged shot deals
/// multiplied damage and empties the store. Stuns discard the charge and
/// losing the target drains it at half speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeUp {
    charge_time: f32,
    multiplier: f32,
    charge: f32,
}

impl ChargeUp {
    /// Charges for `charge_time` seconds before a shot multiplied by
    /// `multiplier`.
    #[must_use]
    pub const fn new(charge_time: f32, multiplier: f32) -> Self {
        Self {
            charge_time,
            multiplier,
            charge: 0.0,
        }
    }

    /// Reports whether the next shot is charged.
    #[must_use]
    pub fn is_charged(&self) -> bool {
        self.charge >= self.charge_time
    }
}

impl Default for ChargeUp {
    fn default() -> Self {
        Self::new(5.0, 3.0)
    }
}

impl Mechanic for ChargeUp {
    fn on_tick(&mut self, context: &mut MechanicContext<'_>, dt: f32) {
        let Some((target, stunned)) = context
            .entity()
            .map(|entity| (entity.target, entity.status.is_stunned()))
        else {
            return;
        };
        self.charge = if stunned {
            0.0
        } else if target.is_some() {
            (self.charge + dt).min(self.charge_time)
        } else {
            (self.charge - dt / 2.0).max(0.0)
        };
    }

    fn on_attack_start(&mut self, _context: &mut MechanicContext<'_>, hit: &mut PendingHit) {
        if self.is_charged() {
            hit.damage *= self.multiplier;
            self.charge = 0.0;
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(*self)
    }
}

/// Champion ability paid for with the owner's elixir. It fires on its own once
/// the unit holds a target, the cooldown has elapsed and the owner can afford
/// it. Activation applies the ability's effects at the unit and may cloak or
/// empower the unit for the ability's duration.
#[derive(Clone, Debug)]
pub struct ChampionAbility {
    cost: u32,
    cooldown: f32,
    duration: f32,
    effects: Vec<Arc<dyn Effect>>,
    cloak: bool,
    boost: Option<(f32, f32)>,
    ready_in: f32,
    active_for: f32,
    activations: u32,
}

impl ChampionAbility {
    /// Ability costing `cost` elixir that lasts `duration` seconds and is
    /// available again `cooldown` seconds after activation.
    #[must_use]
    pub fn new(cost: u32, cooldown: f32, duration: f32) -> Self {
        Self {
            cost,
            cooldown,
            duration,
            effects: Vec::new(),
            cloak: false,
            boost: None,
            ready_in: 0.0,
            active_for: 0.0,
            activations: 0,
        }
    }

    /// Adds an effect applied at the unit's position on activation.
    #[must_use]
    pub fn with_effect(mut self, effect: impl Effect + 'static) -> Self {
        self.effects.push(Arc::new(effect));
        self
    }

    /// Hides the unit from enemy targeting while the ability lasts.
    #[must_use]
    pub fn with_cloak(mut self) -> Self {
        self.cloak = true;
        self
    }

    /// Multiplies the unit's speed and damage while the ability lasts.
    #[must_use]
    pub fn with_boost(mut self, speed: f32, damage: f32) -> Self {
        self.boost = Some((speed, damage));
        self
    }

    /// Reports whether the ability is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active_for > 0.0
    }

    /// Number of times the ability fired.
    #[must_use]
    pub const fn activations(&self) -> u32 {
        self.activations
    }
}

impl Mechanic for ChampionAbility {
    fn on_tick(&mut self, context: &mut MechanicContext<'_>, dt: f32) {
        self.ready_in = (self.ready_in - dt).max(0.0);
        self.active_for = (self.active_for - dt).max(0.0);
        if self.ready_in > 0.0 || self.is_active() {
            return;
        }
        let Some((owner, position, card, engaged)) = context.entity().map(|entity| {
            (
                entity.owner(),
                entity.position,
                Arc::clone(entity.card()),
                entity.target.is_some() && !entity.status.is_stunned(),
            )
        }) else {
            return;
        };
        if !engaged || !context.battle.spend_elixir(owner, self.cost) {
            return;
        }

        self.ready_in = self.cooldown;
        self.active_for = self.duration;
        self.activations = self.activations.saturating_add(1);
        tracing::debug!(%owner, entity = %context.entity, cost = self.cost, "champion ability");

        let (cloak, boost, duration) = (self.cloak, self.boost, self.duration);
        if let Some(entity) = context.entity_mut() {
            if cloak {
                entity.status.cloak(duration);
            }
            if let Some((speed, damage)) = boost {
                entity.status.apply_buff(duration, speed, damage);
            }
        }
        let source = context.entity;
        for effect in &self.effects {
            context.battle.apply_effect(
                effect.as_ref(),
                owner,
                Arc::clone(&card),
                Some(source),
                position,
            );
        }
    }

    fn boxed_clone(&self) -> Box<dyn Mechanic> {
        Box::new(self.clone())
    }
}

/// Unit vector from `from` toward `to`, if the points differ.
fn unit_vector(from: Position, to: Position) -> Option<(f32, f32)> {
    let length = from.distance_to(to);
    if length <= f32::EPSILON {
        return None;
    }
    Some(((to.x() - from.x()) / length, (to.y() - from.y()) / length))
}
