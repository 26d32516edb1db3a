#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reusable card behaviours built on the battle's extension points.
//!
//! Every type in this crate implements either [`Mechanic`], a long-lived hook
//! set attached to each spawned unit, or [`Effect`], a one-shot outcome applied
//! at a point when a spell is cast or a projectile lands. Cards are assembled
//! by composing these pieces; nothing here looks at card names.
//!
//! [`Mechanic`]: arena_battle_world::Mechanic
//! [`Effect`]: arena_battle_world::Effect

mod abilities;
mod death;
mod effects;
mod offense;
mod presence;

use arena_battle_core::{EntityId, PlayerId, Position, TargetType};
use arena_battle_system_combat::DamageReport;
use arena_battle_world::{BattleState, Entity};

pub use abilities::{
    ChampionAbility, ChargeUp, Fade, HookPull, LandingSlam, PierceShot, Recoil, SelfDestruct,
};
pub use death::{DeathAreaBuff, DeathDamage, DeathExplosive, DeathSpawn};
pub use effects::{
    ApplyBuff, ApplyFreeze, ApplySlow, ApplyStun, DirectDamage, PeriodicArea, ProjectileLaunch,
    RollingLaunch, SpawnProjectileLaunch, SpawnUnits, SummonGraveyard,
};
pub use offense::{
    ChainStun, ChargeAttack, CrownTowerScaling, DamageRamp, Dash, KnockbackOnHit,
    MultiProjectile, SlowOnHit, SpinAttack, SplashOnHit, StunOnHit,
};
pub use presence::{PeriodicSpawner, Shield, SlowAura, SpawnZap};

/// Reports whether an attack with the given reach can hit the entity.
fn reaches(reach: TargetType, entity: &Entity) -> bool {
    if reach.buildings_only() {
        return entity.is_building();
    }
    if entity.is_air {
        reach.reaches_air()
    } else {
        reach.reaches_ground()
    }
}

/// Enemies of `owner` whose bodies touch the circle and that `reach` can hit,
/// in ascending id order.
fn enemies_in_reach(
    battle: &BattleState,
    owner: PlayerId,
    center: Position,
    radius: f32,
    reach: TargetType,
) -> Vec<EntityId> {
    battle
        .enemies_within(owner, center, radius)
        .into_iter()
        .filter(|id| battle.entity(*id).is_some_and(|entity| reaches(reach, entity)))
        .collect()
}

/// Damages an entity, scaling the amount when the victim is a crown tower.
fn strike(
    battle: &mut BattleState,
    id: EntityId,
    amount: f32,
    crown_tower_scale: f32,
) -> DamageReport {
    let amount = if battle.is_crown_tower(id) {
        amount * crown_tower_scale
    } else {
        amount
    };
    battle.damage_entity(id, amount)
}

#[cfg(test)]
mod testing {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use arena_battle_arena::TileGrid;
    use arena_battle_core::{CardStats, EntityId, PlayerId, Position, TowerSlot};
    use arena_battle_world::{BattleConfig, BattleState, CardCatalog, CardDefinition};

    #[derive(Debug, Default)]
    pub(crate) struct Catalog {
        cards: BTreeMap<String, Arc<CardDefinition>>,
    }

    impl CardCatalog for Catalog {
        fn lookup(&self, name: &str) -> Option<Arc<CardDefinition>> {
            self.cards.get(name).cloned()
        }
    }

    /// Builds a battle whose catalog holds the provided cards plus a plain
    /// "Dummy" troop, with both decks filled with the first card. Crown towers
    /// deal no damage so they never interfere with the unit under test.
    pub(crate) fn battle(cards: Vec<CardDefinition>) -> BattleState {
        let mut catalog = Catalog::default();
        let dummy = CardDefinition::new(CardStats {
            hitpoints: 1000.0,
            damage: 0.0,
            speed: 0.0,
            deploy_time: 0.0,
            ..CardStats::troop("Dummy", 1)
        })
        .expect("dummy is valid");
        for definition in std::iter::once(dummy).chain(cards) {
            let _ = catalog
                .cards
                .insert(definition.name().to_owned(), Arc::new(definition));
        }
        let first = catalog
            .cards
            .keys()
            .find(|name| name.as_str() != "Dummy")
            .cloned()
            .unwrap_or_else(|| "Dummy".to_owned());
        let deck = vec![first; 8];
        let mut config = BattleConfig::default();
        config.princess_tower.damage = 0.0;
        config.king_tower.damage = 0.0;
        BattleState::new(
            config,
            TileGrid::standard(),
            Arc::new(catalog),
            [deck.clone(), deck],
        )
        .expect("test battle is valid")
    }

    pub(crate) fn spawn(
        battle: &mut BattleState,
        owner: PlayerId,
        card: &str,
        x: f32,
        y: f32,
    ) -> EntityId {
        battle
            .spawn_card(owner, card, Position::new(x, y))
            .expect("card spawns a unit")
    }

    pub(crate) fn dummy(battle: &mut BattleState, owner: PlayerId, x: f32, y: f32) -> EntityId {
        spawn(battle, owner, "Dummy", x, y)
    }

    pub(crate) fn hitpoints(battle: &BattleState, id: EntityId) -> f32 {
        battle.entity(id).map_or(0.0, |entity| entity.hitpoints)
    }

    pub(crate) fn tower(battle: &BattleState, owner: PlayerId, slot: TowerSlot) -> EntityId {
        battle
            .entities()
            .find(|entity| entity.owner() == owner && entity.tower_slot() == Some(slot))
            .map(|entity| entity.id())
            .expect("tower stands")
    }

    pub(crate) fn run(battle: &mut BattleState, seconds: f32) {
        let ticks = (seconds * 30.0).round() as u32;
        for _ in 0..ticks {
            battle.step(1.0 / 30.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use arena_battle_core::{CardStats, TowerSlot};
    use arena_battle_world::CardDefinition;

    fn minion() -> CardDefinition {
        CardDefinition::new(CardStats {
            is_air: true,
            deploy_time: 0.0,
            ..CardStats::troop("Minion", 3)
        })
        .expect("valid")
    }

    #[test]
    fn reach_filters_air_and_ground() {
        let mut battle = testing::battle(vec![minion()]);
        let flyer = testing::spawn(&mut battle, PlayerId::TOP, "Minion", 9.0, 12.0);
        let walker = testing::dummy(&mut battle, PlayerId::TOP, 9.5, 12.0);
        let center = Position::new(9.0, 12.0);

        let ground = enemies_in_reach(&battle, PlayerId::BOTTOM, center, 2.0, TargetType::Ground);
        assert_eq!(ground, vec![walker]);
        let air = enemies_in_reach(&battle, PlayerId::BOTTOM, center, 2.0, TargetType::Air);
        assert_eq!(air, vec![flyer]);
        let reach = TargetType::AirAndGround;
        let both = enemies_in_reach(&battle, PlayerId::BOTTOM, center, 2.0, reach);
        assert_eq!(both, vec![flyer, walker]);
    }

    #[test]
    fn strike_scales_damage_against_crown_towers() {
        let mut battle = testing::battle(Vec::new());
        let princess = testing::tower(&battle, PlayerId::TOP, TowerSlot::Left);
        let before = testing::hitpoints(&battle, princess);
        let report = strike(&mut battle, princess, 100.0, 0.25);
        assert_eq!(report.dealt, 25.0);
        assert_eq!(testing::hitpoints(&battle, princess), before - 25.0);

        let troop = testing::dummy(&mut battle, PlayerId::TOP, 9.5, 20.5);
        let report = strike(&mut battle, troop, 100.0, 0.25);
        assert_eq!(report.dealt, 100.0);
    }
}
