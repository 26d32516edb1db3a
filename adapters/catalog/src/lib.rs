#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Built-in card data for the arena battle engine.
//!
//! [`BuiltinCatalog`] stores immutable [`CardDefinition`] values keyed by
//! canonical name together with a table of historical aliases, and implements
//! the battle's [`CardCatalog`] contract. The standard catalog composes its
//! cards from the mechanics library; balance tweaks can be layered on top
//! from a TOML manifest without touching the behaviours.

mod aliases;
mod cards;
mod overrides;

use std::collections::BTreeMap;
use std::sync::Arc;

use arena_battle_core::DefinitionError;
use arena_battle_world::{CardCatalog, CardDefinition};
use thiserror::Error;

pub use overrides::{CardOverride, OverrideManifest, MANIFEST_VERSION};

/// Failures raised while assembling a catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A definition or alias is structurally invalid.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    /// An operation referenced a card the catalog does not hold.
    #[error("card `{0}` is not in the catalog")]
    UnknownCard(String),
}

/// In-memory card catalog with alias resolution.
#[derive(Clone, Debug, Default)]
pub struct BuiltinCatalog {
    cards: BTreeMap<String, Arc<CardDefinition>>,
    aliases: BTreeMap<String, String>,
}

impl BuiltinCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in card and the standard aliases.
    pub fn standard() -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for definition in cards::standard_cards()? {
            catalog.insert(definition)?;
        }
        for (alias, target) in aliases::STANDARD_ALIASES {
            catalog.alias(*alias, target)?;
        }
        tracing::debug!(
            cards = catalog.cards.len(),
            aliases = catalog.aliases.len(),
            "standard catalog assembled"
        );
        Ok(catalog)
    }

    /// Adds a definition under its canonical name.
    pub fn insert(&mut self, definition: CardDefinition) -> Result<(), CatalogError> {
        definition.validate()?;
        let name = definition.name().to_owned();
        if self.cards.contains_key(&name) || self.aliases.contains_key(&name) {
            return Err(DefinitionError::Duplicate(name).into());
        }
        let _ = self.cards.insert(name, Arc::new(definition));
        Ok(())
    }

    /// Swaps the definition stored under the card's canonical name.
    pub fn replace(&mut self, definition: CardDefinition) -> Result<(), CatalogError> {
        definition.validate()?;
        let name = definition.name().to_owned();
        match self.cards.get_mut(&name) {
            Some(slot) => {
                *slot = Arc::new(definition);
                Ok(())
            }
            None => Err(CatalogError::UnknownCard(name)),
        }
    }

    /// Registers an alternative spelling for an existing card. The target may
    /// itself be an alias; the stored mapping always points at the canonical
    /// name.
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> Result<(), CatalogError> {
        let alias = alias.into();
        let Some(canonical) = self.resolve(target).map(str::to_owned) else {
            return Err(DefinitionError::DanglingAlias {
                alias,
                target: target.to_owned(),
            }
            .into());
        };
        if self.cards.contains_key(&alias) || self.aliases.contains_key(&alias) {
            return Err(DefinitionError::Duplicate(alias).into());
        }
        let _ = self.aliases.insert(alias, canonical);
        Ok(())
    }

    /// Canonical names of every stored card, in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cards.keys().map(String::as_str)
    }

    /// Number of stored cards, aliases excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Reports whether the catalog holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        if let Some((canonical, _)) = self.cards.get_key_value(name) {
            return Some(canonical.as_str());
        }
        self.aliases.get(name).map(String::as_str)
    }
}

impl CardCatalog for BuiltinCatalog {
    fn lookup(&self, name: &str) -> Option<Arc<CardDefinition>> {
        let canonical = self.resolve(name)?;
        self.cards.get(canonical).cloned()
    }

    fn canonical_name(&self, name: &str) -> Option<String> {
        self.resolve(name).map(str::to_owned)
    }
}
