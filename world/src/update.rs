//! Per-entity updates: targeting, attacks, movement and the behaviour of
//! projectiles and zones.

use std::collections::BTreeSet;
use std::f32::consts::TAU;
use std::sync::Arc;

use arena_battle_core::{EntityId, PlayerId, Position};
use arena_battle_system_combat::in_attack_range;
use arena_battle_system_targeting::{
    acquire_target, avoidance_step, pathfind_target, Agent, Candidate, CandidateKind,
};

use crate::entity::{
    AreaState, BuildingState, EntityKind, ExplosiveState, GraveyardState, RollingState,
};
use crate::mechanic::{HitReport, PendingHit};
use crate::BattleState;

/// Seconds a zone's slow or buff lingers after the unit leaves it.
const ZONE_LINGER: f32 = 0.2;

/// Radius of the ring units released by a landing projectile stand on.
const RELEASE_RADIUS: f32 = 0.7;

impl BattleState {
    pub(crate) fn update_entity(&mut self, id: EntityId, dt: f32) {
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        if entity.is_dead() {
            return;
        }
        entity.status.tick(dt);
        if entity.deploy_delay > 0.0 {
            entity.deploy_delay = (entity.deploy_delay - dt).max(0.0);
            return;
        }

        match &entity.kind {
            EntityKind::Troop | EntityKind::Building(_) => self.update_combatant(id, dt),
            EntityKind::Projectile(_) => self.update_projectile(id, dt),
            EntityKind::RollingProjectile(_) => self.update_rolling(id, dt),
            EntityKind::SpawnProjectile(_) => self.update_spawn_projectile(id, dt),
            EntityKind::AreaEffect(_) => self.update_area(id, dt),
            EntityKind::TimedExplosive(_) => self.update_explosive(id, dt),
            EntityKind::Graveyard(_) => self.update_graveyard(id, dt),
        }
    }

    fn update_combatant(&mut self, id: EntityId, dt: f32) {
        self.run_hooks(id, |mechanic, context| mechanic.on_tick(context, dt));

        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        if entity.is_dead() {
            return;
        }
        if let EntityKind::Building(BuildingState {
            lifetime: Some(lifetime),
            ..
        }) = &mut entity.kind
        {
            *lifetime -= dt;
            if *lifetime <= 0.0 {
                entity.expire();
                return;
            }
        }
        if entity.status.is_stunned() {
            return;
        }
        let rate = entity.status.attack_rate();
        entity.timer.advance(dt, rate);

        let dormant = matches!(
            entity.kind,
            EntityKind::Building(BuildingState { active: false, .. })
        );
        if dormant || (entity.is_building() && entity.profile.damage <= 0.0) {
            entity.target = None;
            return;
        }

        let agent = Agent {
            id,
            owner: entity.owner(),
            position: entity.position,
            sight_range: entity.profile.sight_range,
            target_type: entity.profile.target_type,
            is_air: entity.is_air,
        };
        let current = entity.target;
        let candidates = self.candidates(agent.owner);
        let target = acquire_target(&agent, current, &candidates);
        if let Some(entity) = self.registry.get_mut(id) {
            entity.target = target;
        }

        let Some(target) = target else {
            return;
        };
        let Some((target_position, target_radius)) = self
            .registry
            .get(target)
            .map(|victim| (victim.position, victim.profile.collision_radius))
        else {
            return;
        };

        let Some(entity) = self.registry.get(id) else {
            return;
        };
        if in_attack_range(
            entity.position,
            entity.profile.range,
            target_position,
            target_radius,
        ) {
            if entity.timer.is_ready() && entity.profile.damage > 0.0 {
                self.attack(id, target);
            }
        } else if entity.is_troop() {
            self.move_toward(&agent, target_position, dt);
        }
    }

    /// Snapshots every living, visible, targetable enemy of `owner`.
    fn candidates(&self, owner: PlayerId) -> Vec<Candidate> {
        self.registry
            .iter()
            .filter(|entity| entity.owner() != owner && entity.is_targetable() && !entity.is_dead())
            .filter(|entity| !entity.status.is_invisible())
            .map(|entity| Candidate {
                id: entity.id(),
                owner: entity.owner(),
                position: entity.position,
                is_air: entity.is_air,
                kind: match &entity.kind {
                    EntityKind::Building(BuildingState {
                        tower: Some(_),
                        active,
                        ..
                    }) => CandidateKind::Tower { active: *active },
                    EntityKind::Building(_) => CandidateKind::Building,
                    _ => CandidateKind::Troop,
                },
            })
            .collect()
    }

    fn attack(&mut self, id: EntityId, target: EntityId) {
        let Some(entity) = self.registry.get(id) else {
            return;
        };
        let mut hit = PendingHit {
            target,
            damage: entity.profile.damage * entity.status.damage_multiplier(),
        };
        self.run_hooks(id, |mechanic, context| {
            mechanic.on_attack_start(context, &mut hit);
        });

        let Some(position) = self.registry.get(hit.target).map(|victim| victim.position) else {
            return;
        };
        let report = self.damage_entity(hit.target, hit.damage);
        let landed = HitReport {
            target: hit.target,
            position,
            damage: hit.damage,
            dealt: report.dealt,
            lethal: report.lethal,
        };
        if let Some(entity) = self.registry.get_mut(id) {
            entity.timer.reset();
        }
        self.run_hooks(id, |mechanic, context| {
            mechanic.on_attack_hit(context, &landed);
        });
    }

    fn move_toward(&mut self, agent: &Agent, target: Position, dt: f32) {
        let Some(entity) = self.registry.get(agent.id) else {
            return;
        };
        let step = entity.profile.speed * entity.status.speed_multiplier() * dt;
        if step <= 0.0 {
            return;
        }
        let position = entity.position;
        let next = if agent.is_air {
            position.step_toward(target, step)
        } else {
            let goal = pathfind_target(agent, target, &self.grid, &self.tower_status);
            let desired = position.step_toward(goal, step);
            let obstacles: Vec<_> = self
                .obstacles()
                .into_iter()
                .filter(|footprint| !footprint.contains(position))
                .collect();
            avoidance_step(position, desired, &self.grid, &obstacles)
        };
        if let Some(entity) = self.registry.get_mut(agent.id) {
            entity.position = next;
        }
    }

    /// Pushes overlapping ground troops apart without moving them onto
    /// unwalkable tiles or into buildings.
    pub(crate) fn separate_ground_troops(&mut self) {
        let troops: Vec<(EntityId, Position, f32)> = self
            .registry
            .iter()
            .filter(|entity| entity.is_troop() && !entity.is_air && !entity.is_dead())
            .map(|entity| (entity.id(), entity.position, entity.profile.collision_radius))
            .collect();
        if troops.len() < 2 {
            return;
        }

        let mut pushes = vec![(0.0_f32, 0.0_f32); troops.len()];
        for (i, &(_, a, radius_a)) in troops.iter().enumerate() {
            for (j, &(_, b, radius_b)) in troops.iter().enumerate().skip(i + 1) {
                let reach = radius_a + radius_b;
                let distance = a.distance_to(b);
                if distance >= reach {
                    continue;
                }
                let overlap = (reach - distance) / 2.0;
                let (nx, ny) = if distance > f32::EPSILON {
                    ((b.x() - a.x()) / distance, (b.y() - a.y()) / distance)
                } else {
                    (1.0, 0.0)
                };
                pushes[i].0 -= nx * overlap;
                pushes[i].1 -= ny * overlap;
                pushes[j].0 += nx * overlap;
                pushes[j].1 += ny * overlap;
            }
        }

        let obstacles = self.obstacles();
        for (&(id, position, _), (dx, dy)) in troops.iter().zip(pushes) {
            if dx == 0.0 && dy == 0.0 {
                continue;
            }
            let moved = position.offset(dx, dy);
            let blocked = obstacles
                .iter()
                .any(|footprint| footprint.contains(moved) && !footprint.contains(position));
            if blocked || !self.grid.is_walkable(moved) {
                continue;
            }
            if let Some(entity) = self.registry.get_mut(id) {
                entity.position = moved;
            }
        }
    }

    fn update_projectile(&mut self, id: EntityId, dt: f32) {
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        let EntityKind::Projectile(state) = &entity.kind else {
            return;
        };
        let destination = state.destination;
        entity.position = entity.position.step_toward(destination, state.speed * dt);
        if entity.position != destination {
            return;
        }
        let payload = state.payload.clone();
        let owner = entity.owner();
        let card = Arc::clone(entity.card());
        entity.expire();
        for effect in payload {
            self.apply_effect(
                effect.as_ref(),
                owner,
                Arc::clone(&card),
                Some(id),
                destination,
            );
        }
    }

    fn update_rolling(&mut self, id: EntityId, dt: f32) {
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        let owner = entity.owner();
        let EntityKind::RollingProjectile(state) = &mut entity.kind else {
            return;
        };
        let travel = (state.speed * dt).min(state.remaining);
        state.remaining -= travel;
        entity.position = entity
            .position
            .offset(state.direction.0 * travel, state.direction.1 * travel);
        let position = entity.position;
        let RollingState {
            direction,
            radius,
            damage,
            knockback,
            crown_tower_scale,
            ..
        } = *state;
        let finished = state.remaining <= 0.0;
        let already: BTreeSet<EntityId> = state.hit.clone();

        let victims: Vec<EntityId> = self
            .enemies_within(owner, position, radius)
            .into_iter()
            .filter(|victim| !already.contains(victim))
            .filter(|victim| self.registry.get(*victim).is_some_and(|e| !e.is_air))
            .collect();

        for &victim in &victims {
            let amount = if self.is_crown_tower(victim) {
                damage * crown_tower_scale
            } else {
                damage
            };
            let _ = self.damage_entity(victim, amount);
            if knockback > 0.0 {
                self.displace(victim, direction.0 * knockback, direction.1 * knockback);
            }
        }

        if let Some(entity) = self.registry.get_mut(id) {
            if let EntityKind::RollingProjectile(state) = &mut entity.kind {
                state.hit.extend(victims);
            }
            if finished {
                entity.expire();
            }
        }
    }

    fn update_spawn_projectile(&mut self, id: EntityId, dt: f32) {
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        let EntityKind::SpawnProjectile(state) = &entity.kind else {
            return;
        };
        let destination = state.destination;
        entity.position = entity.position.step_toward(destination, state.speed * dt);
        if entity.position != destination {
            return;
        }
        let unit = state.unit.clone();
        let count = state.count;
        let owner = entity.owner();
        entity.expire();

        let Some(card) = self.lookup(&unit) else {
            tracing::debug!(unit = %unit, "released unit is not in the catalog");
            return;
        };
        for spot in arena_battle_arena::ring_formation(destination, count, RELEASE_RADIUS) {
            let _ = self.spawn_unit(owner, Arc::clone(&card), spot);
        }
    }

    fn update_area(&mut self, id: EntityId, dt: f32) {
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        let owner = entity.owner();
        let center = entity.position;
        let EntityKind::AreaEffect(state) = &mut entity.kind else {
            return;
        };
        state.remaining -= dt;
        state.pulse_timer -= dt;
        let pulse = state.pulse_timer <= 0.0 && state.damage > 0.0;
        if state.pulse_timer <= 0.0 {
            state.pulse_timer += state.interval.max(dt);
        }
        let AreaState {
            radius,
            damage,
            crown_tower_scale,
            slow,
            pull,
            buff,
            remaining,
            ..
        } = *state;

        let enemies = self.enemies_within(owner, center, radius);
        for &enemy in &enemies {
            if pulse {
                let amount = if self.is_crown_tower(enemy) {
                    damage * crown_tower_scale
                } else {
                    damage
                };
                let _ = self.damage_entity(enemy, amount);
            }
            if let Some(multiplier) = slow {
                if let Some(victim) = self.registry.get_mut(enemy) {
                    victim.status.apply_slow(ZONE_LINGER, multiplier);
                }
            }
            if pull > 0.0 {
                if let Some(position) = self.registry.get(enemy).map(|victim| victim.position) {
                    let pulled = position.step_toward(center, pull * dt);
                    self.displace(enemy, pulled.x() - position.x(), pulled.y() - position.y());
                }
            }
        }
        if let Some((speed, damage)) = buff {
            for ally in self.allies_within(owner, center, radius) {
                if let Some(friend) = self.registry.get_mut(ally) {
                    if friend.tower_slot().is_none() {
                        friend.status.apply_buff(ZONE_LINGER, speed, damage);
                    }
                }
            }
        }

        if remaining <= 0.0 {
            if let Some(entity) = self.registry.get_mut(id) {
                entity.expire();
            }
        }
    }

    fn update_explosive(&mut self, id: EntityId, dt: f32) {
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        let owner = entity.owner();
        let center = entity.position;
        let EntityKind::TimedExplosive(state) = &mut entity.kind else {
            return;
        };
        state.fuse -= dt;
        if state.fuse > 0.0 {
            return;
        }
        let ExplosiveState { damage, radius, .. } = *state;
        entity.expire();

        tracing::debug!(%owner, x = center.x(), y = center.y(), "explosive detonated");
        for victim in self.enemies_within(owner, center, radius) {
            if self.registry.get(victim).is_some_and(|e| !e.is_air) {
                let _ = self.damage_entity(victim, damage);
            }
        }
    }

    fn update_graveyard(&mut self, id: EntityId, dt: f32) {
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        let owner = entity.owner();
        let center = entity.position;
        let EntityKind::Graveyard(state) = &mut entity.kind else {
            return;
        };
        state.remaining -= dt;
        state.spawn_timer -= dt;
        let due = state.spawn_timer <= 0.0 && state.remaining > 0.0;
        if state.spawn_timer <= 0.0 {
            state.spawn_timer += state.interval.max(dt);
        }
        let GraveyardState {
            radius, remaining, ..
        } = *state;
        let unit = state.unit.clone();
        if remaining <= 0.0 {
            entity.expire();
        }

        if !due {
            return;
        }
        let angle = self.roll() * TAU;
        let distance = radius * self.roll().sqrt();
        let spot = center.offset(distance * angle.cos(), distance * angle.sin());
        if self.spawn_card(owner, &unit, spot).is_some() {
            if let Some(EntityKind::Graveyard(state)) =
                self.registry.get_mut(id).map(|entity| &mut entity.kind)
            {
                state.spawned = state.spawned.saturating_add(1);
            }
        }
    }
}
