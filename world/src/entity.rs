//! Entity records owned by the battle registry.

use std::collections::BTreeSet;
use std::sync::Arc;

use arena_battle_core::{CardKind, EntityId, PlayerId, Position, TargetType, TowerSlot};
use arena_battle_system_combat::{AttackTimer, StatusEffects};

use crate::card::CardDefinition;
use crate::mechanic::{Effect, Mechanic};

/// Effective combat statistics of an entity after level scaling and mechanics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatProfile {
    /// Damage per hit.
    pub damage: f32,
    /// Attack range from the target's edge.
    pub range: f32,
    /// Distance at which troops are noticed.
    pub sight_range: f32,
    /// Movement speed in tiles per second.
    pub speed: f32,
    /// Body radius.
    pub collision_radius: f32,
    /// What the entity's attacks can reach.
    pub target_type: TargetType,
}

/// State of a placed building or crown tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingState {
    /// Crown tower slot, `None` for card buildings.
    pub tower: Option<TowerSlot>,
    /// Whether the building may attack. Only king towers start dormant.
    pub active: bool,
    /// Seconds until the building expires.
    pub lifetime: Option<f32>,
}

/// Projectile that applies its payload on arrival.
#[derive(Clone, Debug)]
pub struct ProjectileState {
    /// Landing point.
    pub destination: Position,
    /// Tiles per second.
    pub speed: f32,
    /// Effects applied at the landing point.
    pub payload: Vec<Arc<dyn Effect>>,
}

/// Ground-hugging projectile that damages everything it rolls over.
#[derive(Clone, Debug, PartialEq)]
pub struct RollingState {
    /// Unit direction of travel.
    pub direction: (f32, f32),
    /// Tiles per second.
    pub speed: f32,
    /// Tiles left to travel.
    pub remaining: f32,
    /// Half width of the damaging band.
    pub radius: f32,
    /// Damage dealt to each entity once.
    pub damage: f32,
    /// Distance enemies are pushed along the direction of travel.
    pub knockback: f32,
    /// Multiplier applied against crown towers.
    pub crown_tower_scale: f32,
    /// Entities already hit.
    pub hit: BTreeSet<EntityId>,
}

/// Projectile that releases units where it lands.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnProjectileState {
    /// Landing point.
    pub destination: Position,
    /// Tiles per second.
    pub speed: f32,
    /// Card name of the released units.
    pub unit: String,
    /// Number of released units.
    pub count: u32,
}

/// Persistent zone that damages, slows, pulls or buffs over time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaState {
    /// Zone radius.
    pub radius: f32,
    /// Seconds the zone persists.
    pub remaining: f32,
    /// Seconds between pulses.
    pub interval: f32,
    /// Seconds until the next pulse.
    pub pulse_timer: f32,
    /// Damage per pulse to enemies.
    pub damage: f32,
    /// Multiplier applied against crown towers.
    pub crown_tower_scale: f32,
    /// Slow multiplier applied to enemies inside the zone.
    pub slow: Option<f32>,
    /// Tiles per second enemies are dragged toward the center.
    pub pull: f32,
    /// Speed and damage multipliers granted to friendly units inside the zone.
    pub buff: Option<(f32, f32)>,
}

/// Bomb that detonates once its fuse runs out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosiveState {
    /// Seconds until detonation.
    pub fuse: f32,
    /// Damage dealt to every enemy in the radius.
    pub damage: f32,
    /// Blast radius.
    pub radius: f32,
}

/// Zone that periodically raises units around its center.
#[derive(Clone, Debug, PartialEq)]
pub struct GraveyardState {
    /// Seconds the zone persists.
    pub remaining: f32,
    /// Seconds between spawns.
    pub interval: f32,
    /// Seconds until the next spawn.
    pub spawn_timer: f32,
    /// Spawn radius.
    pub radius: f32,
    /// Card name of the raised units.
    pub unit: String,
    /// Units raised so far.
    pub spawned: u32,
}

/// Behavioural variant of an entity.
#[derive(Clone, Debug)]
pub enum EntityKind {
    /// Mobile unit.
    Troop,
    /// Stationary structure.
    Building(BuildingState),
    /// Travelling projectile carrying effects.
    Projectile(ProjectileState),
    /// Rolling projectile.
    RollingProjectile(RollingState),
    /// Projectile releasing units.
    SpawnProjectile(SpawnProjectileState),
    /// Persistent zone.
    AreaEffect(AreaState),
    /// Delayed explosion.
    TimedExplosive(ExplosiveState),
    /// Periodic spawner.
    Graveyard(GraveyardState),
}

/// Simulation record of one troop, building, projectile or zone.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    owner: PlayerId,
    card: Arc<CardDefinition>,
    expired: bool,
    pub(crate) mechanics: Vec<Box<dyn Mechanic>>,
    /// Current position.
    pub position: Position,
    /// Remaining hitpoints.
    pub hitpoints: f32,
    /// Hitpoints at full health.
    pub max_hitpoints: f32,
    /// Entity currently targeted.
    pub target: Option<EntityId>,
    /// Attack cadence.
    pub timer: AttackTimer,
    /// Seconds before the entity starts acting.
    pub deploy_delay: f32,
    /// Stun, slow, shield, buff and invulnerability state.
    pub status: StatusEffects,
    /// Whether the entity flies.
    pub is_air: bool,
    /// Effective combat statistics.
    pub profile: CombatProfile,
    /// Behavioural variant.
    pub kind: EntityKind,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        owner: PlayerId,
        card: Arc<CardDefinition>,
        position: Position,
        kind: EntityKind,
    ) -> Self {
        let stats = card.stats();
        let (hitpoints, damage) = match kind {
            EntityKind::Troop | EntityKind::Building(_) => {
                (stats.scaled_hitpoints(), stats.scaled_damage())
            }
            _ => (1.0, 0.0),
        };
        let profile = CombatProfile {
            damage,
            range: stats.range,
            sight_range: stats.sight_range,
            speed: stats.tiles_per_second(),
            collision_radius: stats.collision_radius,
            target_type: stats.target_type,
        };
        let deploy_delay = match kind {
            EntityKind::Troop | EntityKind::Building(_) => stats.deploy_time,
            _ => 0.0,
        };
        Self {
            id,
            owner,
            expired: false,
            mechanics: Vec::new(),
            position,
            hitpoints,
            max_hitpoints: hitpoints,
            target: None,
            timer: AttackTimer::new(stats.hit_speed),
            deploy_delay,
            status: StatusEffects::default(),
            is_air: stats.is_air,
            profile,
            kind,
            card,
        }
    }

    /// Identifier allocated by the registry.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Player owning the entity.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Card the entity was created from.
    #[must_use]
    pub fn card(&self) -> &Arc<CardDefinition> {
        &self.card
    }

    /// Number of mechanics attached to the entity.
    #[must_use]
    pub fn mechanic_count(&self) -> usize {
        self.mechanics.len()
    }

    /// Marks the entity for removal at the end of the tick.
    pub fn expire(&mut self) {
        self.expired = true;
    }

    /// Reports whether the entity will be removed by the next cleanup.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.expired || self.hitpoints <= 0.0
    }

    /// Reports whether the entity is a mobile unit.
    #[must_use]
    pub const fn is_troop(&self) -> bool {
        matches!(self.kind, EntityKind::Troop)
    }

    /// Reports whether the entity is a building or crown tower.
    #[must_use]
    pub const fn is_building(&self) -> bool {
        matches!(self.kind, EntityKind::Building(_))
    }

    /// Crown tower slot, if the entity is a crown tower.
    #[must_use]
    pub const fn tower_slot(&self) -> Option<TowerSlot> {
        match &self.kind {
            EntityKind::Building(state) => state.tower,
            _ => None,
        }
    }

    /// Reports whether other entities can target and damage this one.
    #[must_use]
    pub const fn is_targetable(&self) -> bool {
        matches!(self.kind, EntityKind::Troop | EntityKind::Building(_))
    }

    /// Reports whether the entity is still waiting out its deploy delay.
    #[must_use]
    pub fn is_deploying(&self) -> bool {
        self.deploy_delay > 0.0
    }

    /// Kind of the card the entity was created from.
    #[must_use]
    pub fn card_kind(&self) -> CardKind {
        self.card.stats().kind
    }
}
