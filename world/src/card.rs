//! Immutable card definitions and the catalog contract.

use std::fmt;
use std::sync::Arc;

use arena_battle_core::{CardKind, CardStats, DefinitionError, TargetType, TowerSlot};

use crate::config::TowerConfig;
use crate::mechanic::{Effect, Mechanic};

/// How multi-unit deployments are laid out around the drop point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Formation {
    /// Units sit evenly on a circle of the given radius.
    Ring {
        /// Circle radius in tiles.
        radius: f32,
    },
    /// Units stand side by side along the x axis.
    Line {
        /// Distance between neighbours in tiles.
        spacing: f32,
    },
}

impl Default for Formation {
    fn default() -> Self {
        Self::Ring { radius: 0.7 }
    }
}

/// Card statistics together with the behaviours composed onto the card.
///
/// Mechanics are stored as prototypes; every spawned entity receives its own
/// clone so that per-entity state never leaks between units.
#[derive(Debug)]
pub struct CardDefinition {
    stats: CardStats,
    mechanics: Vec<Box<dyn Mechanic>>,
    effects: Vec<Arc<dyn Effect>>,
    formation: Formation,
}

impl CardDefinition {
    /// Creates a definition after validating the statistics.
    pub fn new(stats: CardStats) -> Result<Self, DefinitionError> {
        stats.validate()?;
        Ok(Self {
            stats,
            mechanics: Vec::new(),
            effects: Vec::new(),
            formation: Formation::default(),
        })
    }

    /// Appends a mechanic prototype.
    #[must_use]
    pub fn with_mechanic(mut self, mechanic: impl Mechanic + 'static) -> Self {
        self.mechanics.push(Box::new(mechanic));
        self
    }

    /// Appends an effect applied when the card is cast.
    #[must_use]
    pub fn with_effect(mut self, effect: impl Effect + 'static) -> Self {
        self.effects.push(Arc::new(effect));
        self
    }

    /// Overrides the deployment formation.
    #[must_use]
    pub fn with_formation(mut self, formation: Formation) -> Self {
        self.formation = formation;
        self
    }

    /// Copy of the definition with new statistics and the same behaviours.
    pub fn rebalanced(&self, stats: CardStats) -> Result<Self, DefinitionError> {
        let definition = Self {
            stats,
            mechanics: self.instantiate_mechanics(),
            effects: self.effects.clone(),
            formation: self.formation,
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Runs the checks that need the composed behaviours as well as the stats.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        self.stats.validate()?;
        if self.stats.kind == CardKind::Spell && self.effects.is_empty() {
            return Err(DefinitionError::InvalidStat {
                card: self.stats.name.clone(),
                field: "effects",
            });
        }
        Ok(())
    }

    /// Canonical card name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.stats.name
    }

    /// Numeric statistics.
    #[must_use]
    pub const fn stats(&self) -> &CardStats {
        &self.stats
    }

    /// Effects applied when the card is cast.
    #[must_use]
    pub fn effects(&self) -> &[Arc<dyn Effect>] {
        &self.effects
    }

    /// Deployment formation.
    #[must_use]
    pub const fn formation(&self) -> Formation {
        self.formation
    }

    /// Fresh copies of the mechanic prototypes for a newly spawned entity.
    #[must_use]
    pub fn instantiate_mechanics(&self) -> Vec<Box<dyn Mechanic>> {
        self.mechanics
            .iter()
            .map(|mechanic| mechanic.boxed_clone())
            .collect()
    }

    pub(crate) fn tower(slot: TowerSlot, config: &TowerConfig) -> Self {
        let (name, radius) = match slot {
            TowerSlot::King => ("King Tower", 2.0),
            TowerSlot::Left | TowerSlot::Right => ("Princess Tower", 1.5),
        };
        let stats = CardStats {
            hitpoints: config.hitpoints,
            damage: config.damage,
            range: config.range,
            sight_range: config.range,
            hit_speed: config.hit_speed,
            deploy_time: 0.0,
            collision_radius: radius,
            lifetime: None,
            target_type: TargetType::AirAndGround,
            ..CardStats::building(name, 0)
        };
        Self {
            stats,
            mechanics: Vec::new(),
            effects: Vec::new(),
            formation: Formation::default(),
        }
    }
}

/// Source of card definitions consulted by a battle.
pub trait CardCatalog: fmt::Debug + Send + Sync {
    /// Resolves a card by canonical name or historical alias.
    fn lookup(&self, name: &str) -> Option<Arc<CardDefinition>>;

    /// Canonical name for a card name or alias.
    fn canonical_name(&self, name: &str) -> Option<String> {
        self.lookup(name).map(|definition| definition.name().to_owned())
    }
}
