//! Balance overrides layered onto a catalog from a TOML manifest.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arena_battle_core::CardStats;
use serde::Deserialize;

use crate::BuiltinCatalog;

/// Manifest format understood by [`BuiltinCatalog::apply_overrides_str`].
pub const MANIFEST_VERSION: u32 = 1;

/// Parsed override manifest.
///
/// ```toml
/// version = 1
/// level = 11
///
/// [cards.Knight]
/// hitpoints = 1800.0
///
/// [aliases]
/// "Sir Knight" = "Knight"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideManifest {
    /// Manifest format version.
    pub version: u32,
    /// Level applied to every card before per-card overrides.
    #[serde(default)]
    pub level: Option<u32>,
    /// Per-card statistic overrides keyed by canonical name or alias.
    #[serde(default)]
    pub cards: BTreeMap<String, CardOverride>,
    /// Additional aliases mapped to existing names.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Statistics replaced on a single card. Missing fields keep their value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardOverride {
    /// Elixir cost.
    pub elixir: Option<u32>,
    /// Card level.
    pub level: Option<u32>,
    /// Hitpoints at level one.
    pub hitpoints: Option<f32>,
    /// Damage per hit at level one.
    pub damage: Option<f32>,
    /// Tiles per minute.
    pub speed: Option<f32>,
    /// Attack range in tiles.
    pub range: Option<f32>,
    /// Sight range in tiles.
    pub sight_range: Option<f32>,
    /// Seconds between attacks.
    pub hit_speed: Option<f32>,
    /// Seconds before the first action.
    pub deploy_time: Option<f32>,
    /// Units per deployment.
    pub count: Option<u32>,
    /// Building lifetime in seconds.
    pub lifetime: Option<f32>,
}

impl CardOverride {
    fn apply_to(&self, stats: &mut CardStats) {
        if let Some(elixir) = self.elixir {
            stats.elixir = elixir;
        }
        if let Some(level) = self.level {
            stats.level = level;
        }
        if let Some(hitpoints) = self.hitpoints {
            stats.hitpoints = hitpoints;
        }
        if let Some(damage) = self.damage {
            stats.damage = damage;
        }
        if let Some(speed) = self.speed {
            stats.speed = speed;
        }
        if let Some(range) = self.range {
            stats.range = range;
        }
        if let Some(sight_range) = self.sight_range {
            stats.sight_range = sight_range;
        }
        if let Some(hit_speed) = self.hit_speed {
            stats.hit_speed = hit_speed;
        }
        if let Some(deploy_time) = self.deploy_time {
            stats.deploy_time = deploy_time;
        }
        if let Some(count) = self.count {
            stats.count = count;
        }
        if let Some(lifetime) = self.lifetime {
            stats.lifetime = Some(lifetime);
        }
    }
}

impl BuiltinCatalog {
    /// Reads an override manifest from disk and applies it.
    pub fn load_overrides(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read card override manifest at {}", path.display())
        })?;
        self.apply_overrides_str(&contents)
            .with_context(|| format!("invalid card override manifest {}", path.display()))
    }

    /// Parses an override manifest and applies it.
    pub fn apply_overrides_str(&mut self, contents: &str) -> Result<()> {
        let manifest: OverrideManifest =
            toml::from_str(contents).context("failed to parse card override toml contents")?;
        self.apply_manifest(&manifest)
    }

    /// Applies a parsed manifest. Either every change lands or none does.
    pub fn apply_manifest(&mut self, manifest: &OverrideManifest) -> Result<()> {
        if manifest.version != MANIFEST_VERSION {
            bail!(
                "unsupported card override manifest version {}; expected {}",
                manifest.version,
                MANIFEST_VERSION
            );
        }

        let mut targeted: BTreeMap<String, &CardOverride> = BTreeMap::new();
        for (name, card_override) in &manifest.cards {
            let canonical = self
                .resolve(name)
                .with_context(|| format!("unknown card `{name}` in override manifest"))?
                .to_owned();
            if targeted.insert(canonical.clone(), card_override).is_some() {
                bail!("override manifest adjusts `{canonical}` more than once");
            }
        }

        let mut staged = self.clone();
        let mut rebalanced = 0_usize;
        for (name, definition) in &self.cards {
            let card_override = targeted.get(name);
            if manifest.level.is_none() && card_override.is_none() {
                continue;
            }
            let mut stats = definition.stats().clone();
            if let Some(level) = manifest.level {
                stats.level = level;
            }
            if let Some(card_override) = card_override {
                card_override.apply_to(&mut stats);
            }
            let definition = definition
                .rebalanced(stats)
                .with_context(|| format!("override for `{name}` is invalid"))?;
            staged.replace(definition)?;
            rebalanced += 1;
        }
        for (alias, target) in &manifest.aliases {
            staged
                .alias(alias.clone(), target)
                .with_context(|| format!("cannot register alias `{alias}`"))?;
        }

        *self = staged;
        tracing::info!(
            rebalanced,
            aliases = manifest.aliases.len(),
            "card overrides applied"
        );
        Ok(())
    }
}
