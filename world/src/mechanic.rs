//! Extension points that give cards their special behaviour.
//!
//! The battle calls these hooks generically and never inspects card names.

use std::fmt;
use std::sync::Arc;

use arena_battle_core::{EntityId, PlayerId, Position};

use crate::card::CardDefinition;
use crate::entity::Entity;
use crate::BattleState;

/// Outgoing attack that mechanics may alter before it lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingHit {
    /// Entity about to be hit.
    pub target: EntityId,
    /// Damage the hit will deal.
    pub damage: f32,
}

/// Outcome of an attack that has landed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitReport {
    /// Entity that was hit.
    pub target: EntityId,
    /// Where the target stood when it was hit.
    pub position: Position,
    /// Damage requested by the attack.
    pub damage: f32,
    /// Hitpoints actually removed.
    pub dealt: f32,
    /// Whether the hit was lethal.
    pub lethal: bool,
}

/// Handle passed to mechanic hooks.
///
/// The entity the hook belongs to stays in the registry while its hooks run,
/// so it can be looked up and mutated through [`MechanicContext::entity_mut`].
pub struct MechanicContext<'a> {
    /// Battle the entity lives in.
    pub battle: &'a mut BattleState,
    /// Entity whose mechanic is running.
    pub entity: EntityId,
}

impl MechanicContext<'_> {
    /// The entity owning the running mechanic.
    #[must_use]
    pub fn entity(&self) -> Option<&Entity> {
        self.battle.entity(self.entity)
    }

    /// Mutable access to the entity owning the running mechanic.
    pub fn entity_mut(&mut self) -> Option<&mut Entity> {
        self.battle.entity_mut(self.entity)
    }
}

/// Long-lived behaviour attached to an entity.
///
/// Every hook has an empty default so mechanics only implement what they need.
pub trait Mechanic: fmt::Debug + Send + Sync {
    /// Runs once before the entity enters the registry.
    fn on_attach(&mut self, _entity: &mut Entity) {}

    /// Runs once right after the entity enters the registry.
    fn on_spawn(&mut self, _context: &mut MechanicContext<'_>) {}

    /// Runs every tick once the deploy delay has elapsed, even while stunned.
    fn on_tick(&mut self, _context: &mut MechanicContext<'_>, _dt: f32) {}

    /// Runs before an attack lands and may alter it.
    fn on_attack_start(&mut self, _context: &mut MechanicContext<'_>, _hit: &mut PendingHit) {}

    /// Runs after an attack landed.
    fn on_attack_hit(&mut self, _context: &mut MechanicContext<'_>, _hit: &HitReport) {}

    /// Runs while the dying entity is still registered, before it is removed.
    fn on_death(&mut self, _context: &mut MechanicContext<'_>) {}

    /// Clones the mechanic, including its current state.
    fn boxed_clone(&self) -> Box<dyn Mechanic>;
}

/// Handle passed to effects.
pub struct EffectContext<'a> {
    /// Battle the effect applies to.
    pub battle: &'a mut BattleState,
    /// Player casting the effect.
    pub caster: PlayerId,
    /// Card the effect belongs to.
    pub card: Arc<CardDefinition>,
    /// Entity delivering the effect, when it is not cast directly from hand.
    pub source: Option<EntityId>,
    /// Point the effect is centered on.
    pub target: Position,
}

impl EffectContext<'_> {
    /// Level multiplier applied to damage dealt by the effect.
    #[must_use]
    pub fn scale(&self) -> f32 {
        arena_battle_core::level_multiplier(self.card.stats().level)
    }
}

/// One-shot outcome applied at a point, such as spell damage or a spawn.
pub trait Effect: fmt::Debug + Send + Sync {
    /// Applies the effect.
    fn apply(&self, context: &mut EffectContext<'_>);
}
