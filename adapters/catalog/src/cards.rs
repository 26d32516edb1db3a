//! Built-in card definitions.
//!
//! Statistics follow the published tournament values and are recorded at
//! level one; raising a card's level scales hitpoints and damage from there.
//! Canonical names are the compact gamedata keys, community spellings are
//! registered separately as aliases.

use arena_battle_core::{CardStats, DefinitionError, DeployRule, FootprintSize, TargetType};
use arena_battle_system_mechanics::{
    ApplyFreeze, ApplyStun, ChainStun, ChampionAbility, ChargeAttack, ChargeUp,
    CrownTowerScaling, DamageRamp, Dash, DeathAreaBuff, DeathDamage, DeathExplosive, DeathSpawn,
    DirectDamage, Fade, HookPull, KnockbackOnHit, LandingSlam, MultiProjectile, PeriodicArea,
    PeriodicSpawner, PierceShot, ProjectileLaunch, Recoil, RollingLaunch, SelfDestruct, Shield,
    SlowAura, SlowOnHit, SpawnProjectileLaunch, SpawnUnits, SpawnZap, SpinAttack, SplashOnHit,
    StunOnHit, SummonGraveyard,
};
use arena_battle_world::{CardDefinition, Formation};

const SLOW: f32 = 45.0;
const MEDIUM: f32 = 60.0;
const FAST: f32 = 90.0;
const VERY_FAST: f32 = 120.0;

/// Every card shipped with the catalog, in no particular order.
pub(crate) fn standard_cards() -> Result<Vec<CardDefinition>, DefinitionError> {
    let mut cards = troops()?;
    cards.extend(tokens()?);
    cards.extend(buildings()?);
    cards.extend(spells()?);
    Ok(cards)
}

fn troops() -> Result<Vec<CardDefinition>, DefinitionError> {
    Ok(vec![
        CardDefinition::new(CardStats {
            hitpoints: 1766.0,
            damage: 202.0,
            range: 1.2,
            hit_speed: 1.2,
            collision_radius: 0.6,
            ..CardStats::troop("Knight", 3)
        })?,
        CardDefinition::new(CardStats {
            hitpoints: 304.0,
            damage: 107.0,
            range: 5.0,
            hit_speed: 0.9,
            count: 2,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("Archer", 3)
        })?
        .with_formation(Formation::Line { spacing: 1.0 }),
        CardDefinition::new(CardStats {
            hitpoints: 4091.0,
            damage: 254.0,
            speed: SLOW,
            range: 1.2,
            sight_range: 7.5,
            hit_speed: 1.5,
            collision_radius: 0.75,
            target_type: TargetType::Buildings,
            ..CardStats::troop("Giant", 5)
        })?,
        CardDefinition::new(CardStats {
            hitpoints: 1696.0,
            damage: 318.0,
            speed: VERY_FAST,
            range: 0.8,
            sight_range: 9.5,
            hit_speed: 1.6,
            collision_radius: 0.6,
            target_type: TargetType::Buildings,
            ..CardStats::troop("HogRider", 4)
        })?,
        CardDefinition::new(CardStats {
            hitpoints: 1361.0,
            damage: 720.0,
            speed: FAST,
            range: 0.8,
            hit_speed: 1.6,
            collision_radius: 0.45,
            ..CardStats::troop("MiniPekka", 4)
        })?,
        CardDefinition::new(CardStats {
            hitpoints: 5120.0,
            damage: 312.0,
            speed: SLOW,
            range: 0.75,
            sight_range: 7.0,
            hit_speed: 2.5,
            deploy_time: 3.0,
            collision_radius: 0.75,
            target_type: TargetType::Buildings,
            ..CardStats::troop("Golem", 8)
        })?
        .with_mechanic(DeathSpawn::new("Golemite", 2))
        .with_mechanic(DeathDamage {
            radius: 2.0,
            damage: 312.0,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 3581.0,
            damage: 53.0,
            speed: SLOW,
            range: 2.0,
            hit_speed: 1.3,
            collision_radius: 1.0,
            is_air: true,
            target_type: TargetType::Buildings,
            ..CardStats::troop("LavaHound", 7)
        })?
        .with_mechanic(DeathSpawn::new("LavaPups", 6).with_radius(1.0)),
        CardDefinition::new(CardStats {
            hitpoints: 1679.0,
            damage: 640.0,
            range: 0.1,
            hit_speed: 2.0,
            collision_radius: 0.5,
            is_air: true,
            target_type: TargetType::Buildings,
            ..CardStats::troop("Balloon", 5)
        })?
        .with_mechanic(DeathExplosive {
            fuse: 3.0,
            damage: 272.0,
            radius: 3.0,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 967.0,
            damage: 286.0,
            range: 0.5,
            sight_range: 3.5,
            hit_speed: 0.4,
            collision_radius: 0.75,
            target_type: TargetType::Buildings,
            ..CardStats::troop("BattleRam", 4)
        })?
        .with_mechanic(ChargeAttack::default())
        .with_mechanic(DeathSpawn::new("Barbarians", 2)),
        CardDefinition::new(CardStats {
            hitpoints: 670.0,
            damage: 192.0,
            range: 0.7,
            hit_speed: 1.3,
            count: 5,
            ..CardStats::troop("Barbarians", 5)
        })?
        .with_formation(Formation::Ring { radius: 1.0 }),
        CardDefinition::new(CardStats {
            hitpoints: 713.0,
            damage: 115.0,
            speed: FAST,
            range: 5.0,
            hit_speed: 1.8,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("ElectroWizard", 4)
        })?
        .with_mechanic(SpawnZap::default())
        .with_mechanic(StunOnHit {
            duration: 0.5,
            chance: 1.0,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 1908.0,
            damage: 267.0,
            range: 1.2,
            hit_speed: 1.5,
            ..CardStats::troop("Valkyrie", 4)
        })?
        .with_mechanic(SpinAttack { radius: 2.0 }),
        CardDefinition::new(CardStats {
            hitpoints: 906.0,
            damage: 193.0,
            speed: FAST,
            range: 0.75,
            hit_speed: 1.0,
            collision_radius: 0.4,
            ..CardStats::troop("Assassin", 3)
        })?
        .with_mechanic(Dash::default()),
        CardDefinition::new(CardStats {
            hitpoints: 835.0,
            damage: 134.0,
            range: 5.5,
            hit_speed: 1.1,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("Witch", 5)
        })?
        .with_mechanic(SplashOnHit { radius: 1.0 })
        .with_mechanic(PeriodicSpawner::new("Skeletons", 7.0, 4).with_radius(1.5)),
        CardDefinition::new(CardStats {
            hitpoints: 1210.0,
            damage: 193.0,
            speed: FAST,
            range: 0.8,
            hit_speed: 1.2,
            deploy_rule: DeployRule::Anywhere,
            ..CardStats::troop("Miner", 3)
        })?
        .with_mechanic(CrownTowerScaling { multiplier: 0.35 }),
        CardDefinition::new(CardStats {
            hitpoints: 550.0,
            damage: 133.0,
            range: 1.2,
            hit_speed: 1.3,
            count: 6,
            ..CardStats::troop("RoyalRecruits", 7)
        })?
        .with_formation(Formation::Line { spacing: 1.2 })
        .with_mechanic(Shield { amount: 199.0 }),
        CardDefinition::new(CardStats {
            hitpoints: 90.0,
            damage: 90.0,
            speed: FAST,
            range: 1.2,
            hit_speed: 1.1,
            count: 3,
            collision_radius: 0.4,
            ..CardStats::troop("SkeletonWarriors", 3)
        })?
        .with_mechanic(Shield { amount: 199.0 }),
        CardDefinition::new(CardStats {
            hitpoints: 1090.0,
            damage: 206.0,
            range: 1.2,
            hit_speed: 1.3,
            collision_radius: 0.6,
            ..CardStats::troop("DarkPrince", 4)
        })?
        .with_mechanic(Shield { amount: 240.0 })
        .with_mechanic(SplashOnHit { radius: 1.1 })
        .with_mechanic(ChargeAttack::default()),
        CardDefinition::new(CardStats {
            hitpoints: 1669.0,
            damage: 325.0,
            range: 1.6,
            hit_speed: 1.4,
            collision_radius: 0.6,
            ..CardStats::troop("Prince", 5)
        })?
        .with_mechanic(ChargeAttack::default()),
        CardDefinition::new(CardStats {
            hitpoints: 1197.0,
            damage: 84.0,
            speed: SLOW,
            range: 0.75,
            sight_range: 7.0,
            hit_speed: 2.5,
            collision_radius: 0.7,
            target_type: TargetType::Buildings,
            ..CardStats::troop("IceGolemite", 2)
        })?
        .with_mechanic(SlowAura {
            radius: 1.5,
            multiplier: 0.85,
        })
        .with_mechanic(DeathDamage {
            radius: 2.0,
            damage: 84.0,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 688.0,
            damage: 84.0,
            range: 5.5,
            hit_speed: 1.7,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("IceWizard", 3)
        })?
        .with_mechanic(SplashOnHit { radius: 1.5 })
        .with_mechanic(SlowOnHit {
            duration: 2.5,
            multiplier: 0.65,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 1104.0,
            damage: 192.0,
            range: 3.5,
            hit_speed: 2.1,
            collision_radius: 0.75,
            is_air: true,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("ElectroDragon", 5)
        })?
        .with_mechanic(ChainStun {
            range: 4.0,
            bounces: 2,
            decay: 1.0,
            stun: 0.5,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 1842.0,
            damage: 289.0,
            speed: SLOW,
            range: 4.0,
            hit_speed: 2.5,
            collision_radius: 0.7,
            ..CardStats::troop("Bowler", 5)
        })?
        .with_mechanic(SplashOnHit { radius: 1.8 })
        .with_mechanic(KnockbackOnHit::default()),
        CardDefinition::new(CardStats {
            hitpoints: 836.0,
            damage: 525.0,
            range: 4.0,
            hit_speed: 2.2,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("Hunter", 4)
        })?
        .with_mechanic(MultiProjectile { projectiles: 3 }),
        CardDefinition::new(CardStats {
            hitpoints: 1060.0,
            damage: 200.0,
            speed: VERY_FAST,
            range: 0.7,
            hit_speed: 0.8,
            ..CardStats::troop("AxeMan", 4)
        })?
        .with_mechanic(DeathAreaBuff {
            radius: 3.0,
            duration: 5.5,
            speed: 1.35,
            damage: 1.35,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 1000.0,
            damage: 216.0,
            speed: FAST,
            range: 1.2,
            hit_speed: 1.8,
            ..CardStats::troop("Ghost", 3)
        })?
        .with_mechanic(Fade::default())
        .with_mechanic(SplashOnHit { radius: 1.0 }),
        CardDefinition::new(CardStats {
            hitpoints: 275.0,
            damage: 130.0,
            speed: VERY_FAST,
            range: 0.5,
            sight_range: 7.0,
            hit_speed: 1.2,
            count: 2,
            collision_radius: 0.4,
            target_type: TargetType::Buildings,
            ..CardStats::troop("Wallbreakers", 2)
        })?
        .with_formation(Formation::Line { spacing: 0.8 })
        .with_mechanic(SelfDestruct {
            radius: 2.5,
            damage_multiplier: 2.5,
            stun: 0.0,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 190.0,
            damage: 91.0,
            speed: VERY_FAST,
            range: 2.5,
            collision_radius: 0.4,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("IceSpirits", 1)
        })?
        .with_mechanic(SelfDestruct {
            radius: 2.0,
            damage_multiplier: 1.0,
            stun: 1.5,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 190.0,
            damage: 99.0,
            speed: VERY_FAST,
            range: 2.5,
            collision_radius: 0.4,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("ElectroSpirit", 1)
        })?
        .with_mechanic(ChainStun {
            range: 4.0,
            bounces: 8,
            decay: 0.9,
            stun: 0.5,
        })
        .with_mechanic(SelfDestruct::default()),
        CardDefinition::new(CardStats {
            hitpoints: 3300.0,
            damage: 222.0,
            speed: MEDIUM,
            range: 1.2,
            hit_speed: 1.7,
            collision_radius: 0.75,
            ..CardStats::troop("MegaKnight", 7)
        })?
        .with_mechanic(LandingSlam::new(2.5, 2.0, 0.3).with_jump(3.5, 5.0, 3.0))
        .with_mechanic(SplashOnHit { radius: 1.5 }),
        CardDefinition::new(CardStats {
            hitpoints: 720.0,
            damage: 160.0,
            speed: MEDIUM,
            range: 1.2,
            sight_range: 7.0,
            hit_speed: 1.3,
            ..CardStats::troop("Fisherman", 3)
        })?
        .with_mechanic(HookPull::new(6.0, 3.0)),
        CardDefinition::new(CardStats {
            hitpoints: 440.0,
            damage: 111.0,
            speed: MEDIUM,
            range: 7.0,
            sight_range: 7.5,
            hit_speed: 1.1,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("EliteArcher", 4)
        })?
        .with_mechanic(PierceShot::default()),
        CardDefinition::new(CardStats {
            hitpoints: 304.0,
            damage: 64.0,
            speed: FAST,
            range: 6.0,
            sight_range: 8.5,
            hit_speed: 3.0,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("Firecracker", 3)
        })?
        .with_mechanic(SplashOnHit { radius: 1.5 })
        .with_mechanic(Recoil { distance: 1.0 }),
        CardDefinition::new(CardStats {
            hitpoints: 1200.0,
            damage: 367.0,
            speed: SLOW,
            range: 5.0,
            hit_speed: 4.0,
            collision_radius: 0.75,
            ..CardStats::troop("Sparky", 6)
        })?
        .with_mechanic(ChargeUp::default())
        .with_mechanic(SplashOnHit { radius: 1.8 }),
        CardDefinition::new(CardStats {
            hitpoints: 1000.0,
            damage: 225.0,
            speed: MEDIUM,
            range: 5.0,
            hit_speed: 1.2,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("ArcherQueen", 5)
        })?
        .with_mechanic(
            ChampionAbility::new(1, 11.0, 3.0)
                .with_cloak()
                .with_boost(1.6, 1.8),
        ),
        CardDefinition::new(CardStats {
            hitpoints: 2300.0,
            damage: 205.0,
            speed: MEDIUM,
            range: 1.3,
            hit_speed: 1.6,
            collision_radius: 0.75,
            ..CardStats::troop("SkeletonKing", 4)
        })?
        .with_mechanic(SplashOnHit { radius: 1.3 })
        .with_mechanic(ChampionAbility::new(3, 15.0, 0.0).with_effect(SpawnUnits {
            unit: "Skeletons".to_owned(),
            count: 2,
        })),
    ])
}

/// Units that are released by other cards rather than played from a deck.
fn tokens() -> Result<Vec<CardDefinition>, DefinitionError> {
    Ok(vec![
        CardDefinition::new(CardStats {
            hitpoints: 1040.0,
            damage: 66.0,
            speed: SLOW,
            range: 0.75,
            sight_range: 7.0,
            hit_speed: 2.5,
            deploy_time: 0.0,
            collision_radius: 0.6,
            target_type: TargetType::Buildings,
            ..CardStats::troop("Golemite", 0)
        })?
        .with_mechanic(DeathDamage {
            radius: 1.5,
            damage: 66.0,
        }),
        CardDefinition::new(CardStats {
            hitpoints: 209.0,
            damage: 79.0,
            range: 1.6,
            hit_speed: 1.7,
            deploy_time: 0.0,
            collision_radius: 0.45,
            is_air: true,
            target_type: TargetType::AirAndGround,
            ..CardStats::troop("LavaPups", 0)
        })?,
        CardDefinition::new(CardStats {
            hitpoints: 81.0,
            damage: 81.0,
            speed: FAST,
            range: 0.5,
            hit_speed: 1.0,
            count: 3,
            collision_radius: 0.3,
            ..CardStats::troop("Skeletons", 1)
        })?,
        CardDefinition::new(CardStats {
            hitpoints: 202.0,
            damage: 120.0,
            speed: VERY_FAST,
            range: 0.5,
            hit_speed: 1.1,
            count: 3,
            collision_radius: 0.4,
            ..CardStats::troop("Goblins", 2)
        })?,
    ])
}

fn buildings() -> Result<Vec<CardDefinition>, DefinitionError> {
    Ok(vec![
        CardDefinition::new(CardStats {
            hitpoints: 824.0,
            damage: 212.0,
            hit_speed: 0.9,
            target_type: TargetType::Ground,
            ..CardStats::building("Cannon", 3)
        })?,
        CardDefinition::new(CardStats {
            hitpoints: 1152.0,
            damage: 230.0,
            hit_speed: 1.1,
            target_type: TargetType::AirAndGround,
            footprint: FootprintSize::Compact,
            ..CardStats::building("Tesla", 4)
        })?,
        CardDefinition::new(CardStats {
            hitpoints: 1749.0,
            damage: 35.0,
            range: 6.0,
            sight_range: 6.0,
            hit_speed: 0.4,
            target_type: TargetType::AirAndGround,
            ..CardStats::building("InfernoTower", 5)
        })?
        .with_mechanic(DamageRamp::new(vec![1.0, 4.0, 14.0], 8)),
        CardDefinition::new(CardStats {
            hitpoints: 529.0,
            damage: 0.0,
            lifetime: Some(40.0),
            ..CardStats::building("Tombstone", 3)
        })?
        .with_mechanic(PeriodicSpawner::new("Skeletons", 3.5, 2))
        .with_mechanic(DeathSpawn::new("Skeletons", 4)),
    ])
}

fn spells() -> Result<Vec<CardDefinition>, DefinitionError> {
    Ok(vec![
        CardDefinition::new(CardStats::spell("Fireball", 4))?.with_effect(
            ProjectileLaunch::new(10.0).with_payload(DirectDamage {
                damage: 572.0,
                radius: 2.5,
                crown_tower_scale: 0.3,
            }),
        ),
        CardDefinition::new(CardStats::spell("Arrows", 3))?.with_effect(
            ProjectileLaunch::new(18.0).with_payload(DirectDamage {
                damage: 303.0,
                radius: 4.0,
                crown_tower_scale: 0.25,
            }),
        ),
        CardDefinition::new(CardStats::spell("Zap", 2))?
            .with_effect(DirectDamage {
                damage: 192.0,
                radius: 2.5,
                crown_tower_scale: 0.3,
            })
            .with_effect(ApplyStun {
                radius: 2.5,
                duration: 0.5,
            }),
        CardDefinition::new(CardStats::spell("Freeze", 4))?.with_effect(ApplyFreeze {
            radius: 3.0,
            duration: 4.0,
            damage: 95.0,
        }),
        CardDefinition::new(CardStats::spell("Rage", 2))?
            .with_effect(PeriodicArea::new(5.0, 6.0).with_buff(1.35, 1.35)),
        CardDefinition::new(CardStats::spell("Poison", 4))?.with_effect(
            PeriodicArea::new(3.5, 8.0)
                .with_damage(57.0, 1.0, 0.35)
                .with_slow(0.85),
        ),
        CardDefinition::new(CardStats::spell("Tornado", 3))?.with_effect(
            PeriodicArea::new(5.5, 1.05)
                .with_damage(35.0, 0.35, 0.35)
                .with_pull(3.0),
        ),
        CardDefinition::new(CardStats {
            deploy_rule: DeployRule::OwnZone,
            ..CardStats::spell("Log", 2)
        })?
        .with_effect(RollingLaunch {
            speed: 7.5,
            range: 11.1,
            radius: 1.95,
            damage: 240.0,
            knockback: 0.7,
            crown_tower_scale: 0.2,
        }),
        CardDefinition::new(CardStats::spell("GoblinBarrel", 3))?.with_effect(
            SpawnProjectileLaunch {
                speed: 10.0,
                unit: "Goblins".to_owned(),
                count: 3,
            },
        ),
        CardDefinition::new(CardStats::spell("Graveyard", 5))?.with_effect(SummonGraveyard {
            unit: "Skeletons".to_owned(),
            radius: 4.0,
            duration: 9.5,
            interval: 0.5,
        }),
    ])
}
