//! Tunable match parameters.

use serde::Deserialize;
use thiserror::Error;

use arena_battle_core::PlayerId;

/// Structural problems detected while constructing a battle.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("malformed battle configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A numeric parameter is out of range.
    #[error("battle configuration field `{field}` is out of range")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
    },
    /// A deck does not hold the expected number of cards.
    #[error("deck for {player} holds {len} cards")]
    InvalidDeck {
        /// Owner of the deck.
        player: PlayerId,
        /// Number of cards supplied.
        len: usize,
    },
}

/// Combat statistics of one kind of crown tower.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TowerConfig {
    /// Starting hitpoints.
    pub hitpoints: f32,
    /// Damage per shot.
    pub damage: f32,
    /// Attack range in tiles.
    pub range: f32,
    /// Seconds between shots.
    pub hit_speed: f32,
}

impl TowerConfig {
    fn princess() -> Self {
        Self {
            hitpoints: 3631.0,
            damage: 130.0,
            range: 7.5,
            hit_speed: 0.8,
        }
    }

    fn king() -> Self {
        Self {
            hitpoints: 4824.0,
            damage: 109.0,
            range: 7.0,
            hit_speed: 1.0,
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        let valid = self.hitpoints > 0.0
            && self.damage >= 0.0
            && self.range > 0.0
            && self.hit_speed > 0.0
            && [self.hitpoints, self.damage, self.range, self.hit_speed]
                .iter()
                .all(|value| value.is_finite());
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidValue { field })
        }
    }
}

/// Seconds needed to regenerate one elixir at each rate.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegenConfig {
    /// Period during regular time.
    pub single: f32,
    /// Period during double elixir.
    pub double: f32,
    /// Period during triple elixir and sudden death.
    pub triple: f32,
}

impl Default for RegenConfig {
    fn default() -> Self {
        Self {
            single: 2.8,
            double: 1.4,
            triple: 0.9,
        }
    }
}

/// Match clock thresholds in seconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseConfig {
    /// Start of double elixir.
    pub double_elixir: f32,
    /// Start of triple elixir.
    pub triple_elixir: f32,
    /// End of regulation; sudden death begins when crowns are level.
    pub sudden_death: f32,
    /// Forced tiebreak on crowns and tower hitpoints.
    pub tiebreak: f32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            double_elixir: 120.0,
            triple_elixir: 240.0,
            sudden_death: 300.0,
            tiebreak: 360.0,
        }
    }
}

/// Every tunable parameter of a match.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BattleConfig {
    /// Seconds simulated by [`crate::BattleState::tick`].
    pub tick_seconds: f32,
    /// Elixir each player starts with.
    pub starting_elixir: f32,
    /// Elixir cap.
    pub max_elixir: f32,
    /// Regeneration periods.
    pub regen: RegenConfig,
    /// Clock thresholds.
    pub phases: PhaseConfig,
    /// Statistics of both princess towers.
    pub princess_tower: TowerConfig,
    /// Statistics of the king tower.
    pub king_tower: TowerConfig,
    /// Seed of the battle's random number generator.
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 1.0 / 30.0,
            starting_elixir: 5.0,
            max_elixir: 10.0,
            regen: RegenConfig::default(),
            phases: PhaseConfig::default(),
            princess_tower: TowerConfig::princess(),
            king_tower: TowerConfig::king(),
            seed: 0x5eed_c1a5_4e7a_b1e5,
        }
    }
}

impl BattleConfig {
    /// Parses and validates a configuration from TOML. Missing fields keep
    /// their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |value: f32, field: &'static str| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue { field })
            }
        };
        positive(self.tick_seconds, "tick_seconds")?;
        positive(self.max_elixir, "max_elixir")?;
        positive(self.regen.single, "regen.single")?;
        positive(self.regen.double, "regen.double")?;
        positive(self.regen.triple, "regen.triple")?;
        if !(0.0..=self.max_elixir).contains(&self.starting_elixir) {
            return Err(ConfigError::InvalidValue {
                field: "starting_elixir",
            });
        }
        let phases = &self.phases;
        if !(phases.double_elixir <= phases.triple_elixir
            && phases.triple_elixir <= phases.tiebreak
            && phases.sudden_death <= phases.tiebreak)
        {
            return Err(ConfigError::InvalidValue { field: "phases" });
        }
        self.princess_tower.validate("princess_tower")?;
        self.king_tower.validate("king_tower")?;
        Ok(())
    }
}
