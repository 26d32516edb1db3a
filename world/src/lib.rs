#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for the arena simulation.
//!
//! [`BattleState`] owns every entity, both players' economies and the match
//! clock. Outside code mutates it only through [`apply`] (or the equivalent
//! [`BattleState::deploy_card`] and [`BattleState::step`] methods) and
//! observes it through the functions in [`query`]. Card behaviour is composed
//! from [`Mechanic`] and [`Effect`] implementations supplied by a
//! [`CardCatalog`]; the battle never inspects card names.

mod card;
mod config;
mod deploy;
mod entity;
mod mechanic;
mod player;
mod registry;
mod rules;
mod update;

use std::sync::Arc;

use arena_battle_arena::{Footprint, TileGrid, TowerStatus};
use arena_battle_core::{
    CardKind, Command, ElixirRate, EntityId, Event, MatchOutcome, PlayerId, Position, TowerSlot,
    DECK_SIZE,
};
use arena_battle_system_combat::{apply_damage, DamageReport};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use card::{CardCatalog, CardDefinition, Formation};
pub use config::{BattleConfig, ConfigError, PhaseConfig, RegenConfig, TowerConfig};
pub use entity::{
    AreaState, BuildingState, CombatProfile, Entity, EntityKind, ExplosiveState, GraveyardState,
    ProjectileState, RollingState, SpawnProjectileState,
};
pub use mechanic::{Effect, EffectContext, HitReport, Mechanic, MechanicContext, PendingHit};
pub use player::PlayerState;

use registry::EntityRegistry;

const LANDING_SAMPLES: u32 = 16;

/// Complete state of one match.
#[derive(Debug)]
pub struct BattleState {
    config: BattleConfig,
    grid: TileGrid,
    catalog: Arc<dyn CardCatalog>,
    registry: EntityRegistry,
    players: [PlayerState; 2],
    towers: [[Option<EntityId>; 3]; 2],
    tower_status: TowerStatus,
    rng: ChaCha8Rng,
    time: f32,
    tick: u64,
    elixir_rate: ElixirRate,
    sudden_death: bool,
    outcome: Option<MatchOutcome>,
    events: Vec<Event>,
}

impl BattleState {
    /// Creates a match with both players' crown towers standing.
    ///
    /// Each deck must hold exactly eight cards; the first four form the
    /// opening hand. Names the catalog resolves are stored canonically, the
    /// rest are kept as given and can never be deployed. The six tower
    /// [`Event::EntitySpawned`] events stay buffered for the first
    /// [`Self::take_events`] call.
    pub fn new(
        config: BattleConfig,
        grid: TileGrid,
        catalog: Arc<dyn CardCatalog>,
        decks: [Vec<String>; 2],
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut resolved: [Vec<String>; 2] = Default::default();
        for (player, deck) in PlayerId::ALL.into_iter().zip(decks) {
            if deck.len() != DECK_SIZE {
                return Err(ConfigError::InvalidDeck {
                    player,
                    len: deck.len(),
                });
            }
            for card in deck {
                let name = catalog.canonical_name(&card).unwrap_or_else(|| {
                    tracing::warn!(%player, card = %card, "deck card is not in the catalog");
                    card
                });
                resolved[player.index()].push(name);
            }
        }
        let [bottom_deck, top_deck] = resolved;

        let tower_hitpoints = [
            config.king_tower.hitpoints,
            config.princess_tower.hitpoints,
            config.princess_tower.hitpoints,
        ];
        let players = [
            PlayerState::new(bottom_deck, config.starting_elixir, tower_hitpoints),
            PlayerState::new(top_deck, config.starting_elixir, tower_hitpoints),
        ];

        let mut battle = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            grid,
            catalog,
            registry: EntityRegistry::new(),
            players,
            towers: [[None; 3]; 2],
            tower_status: TowerStatus::new(),
            time: 0.0,
            tick: 0,
            elixir_rate: ElixirRate::Single,
            sudden_death: false,
            outcome: None,
            events: Vec::new(),
            config,
        };
        battle.spawn_towers();
        Ok(battle)
    }

    fn spawn_towers(&mut self) {
        let king = Arc::new(CardDefinition::tower(
            TowerSlot::King,
            &self.config.king_tower,
        ));
        let princess = Arc::new(CardDefinition::tower(
            TowerSlot::Left,
            &self.config.princess_tower,
        ));
        for owner in PlayerId::ALL {
            for slot in TowerSlot::ALL {
                let card = if slot == TowerSlot::King {
                    Arc::clone(&king)
                } else {
                    Arc::clone(&princess)
                };
                let kind = EntityKind::Building(BuildingState {
                    tower: Some(slot),
                    active: slot.is_princess(),
                    lifetime: None,
                });
                let site = self.grid.tower_site(owner, slot);
                let id = self.spawn_entity(owner, card, site, kind);
                self.towers[owner.index()][slot.index()] = Some(id);
            }
        }
    }

    /// Advances the match by one configured tick.
    pub fn tick(&mut self) {
        self.step(self.config.tick_seconds);
    }

    /// Advances the match by `dt` seconds. Does nothing once the match is over.
    pub fn step(&mut self, dt: f32) {
        if self.outcome.is_some() || !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.advance(dt);
    }

    /// Moves the events produced since the last call out of the battle.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Appends an event to the outgoing buffer.
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Configuration the match runs with.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Static arena geometry.
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Destruction state of all six crown towers.
    #[must_use]
    pub const fn tower_status(&self) -> &TowerStatus {
        &self.tower_status
    }

    /// Simulated seconds since the start of the match.
    #[must_use]
    pub const fn time(&self) -> f32 {
        self.time
    }

    /// Resolves a card through the catalog.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<CardDefinition>> {
        self.catalog.lookup(name)
    }

    /// Debits `amount` elixir from the player when they can afford it.
    pub fn spend_elixir(&mut self, player: PlayerId, amount: u32) -> bool {
        let state = &mut self.players[player.index()];
        if self.outcome.is_some() || !state.can_afford(amount) {
            return false;
        }
        state.spend(amount);
        true
    }

    /// Draws a uniform sample in `[0, 1)` from the match's seeded generator.
    pub fn roll(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Entity with the identifier, if it is still registered.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    /// Mutable access to a registered entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.registry.get_mut(id)
    }

    /// Every registered entity in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.registry.iter()
    }

    /// Living targetable entities of the opponent whose bodies touch the circle.
    #[must_use]
    pub fn enemies_within(&self, owner: PlayerId, center: Position, radius: f32) -> Vec<EntityId> {
        self.bodies_within(owner.opponent(), center, radius)
    }

    /// Living targetable entities of `owner` whose bodies touch the circle.
    #[must_use]
    pub fn allies_within(&self, owner: PlayerId, center: Position, radius: f32) -> Vec<EntityId> {
        self.bodies_within(owner, center, radius)
    }

    fn bodies_within(&self, owner: PlayerId, center: Position, radius: f32) -> Vec<EntityId> {
        self.registry
            .iter()
            .filter(|entity| entity.owner() == owner && entity.is_targetable() && !entity.is_dead())
            .filter(|entity| {
                entity.position.distance_to(center) <= radius + entity.profile.collision_radius
            })
            .map(Entity::id)
            .collect()
    }

    /// Reports whether the entity is one of the six crown towers.
    #[must_use]
    pub fn is_crown_tower(&self, id: EntityId) -> bool {
        self.registry
            .get(id)
            .is_some_and(|entity| entity.tower_slot().is_some())
    }

    /// Routes a hit through shields and invulnerability.
    ///
    /// Damage dealt to a dormant king tower wakes it up.
    pub fn damage_entity(&mut self, id: EntityId, amount: f32) -> DamageReport {
        let Some(entity) = self.registry.get_mut(id) else {
            return DamageReport::default();
        };
        if !entity.is_targetable() || entity.is_dead() {
            return DamageReport::default();
        }
        let report = apply_damage(&mut entity.hitpoints, &mut entity.status, amount);
        let dormant_king = matches!(
            entity.kind,
            EntityKind::Building(BuildingState {
                tower: Some(TowerSlot::King),
                active: false,
                ..
            })
        );
        if dormant_king && report.dealt > 0.0 {
            let owner = entity.owner();
            self.activate_king(owner);
        }
        report
    }

    /// Moves an entity by the offset. Ground units stop short of unwalkable
    /// tiles and building footprints; buildings never move.
    pub fn displace(&mut self, id: EntityId, dx: f32, dy: f32) {
        let Some(entity) = self.registry.get(id) else {
            return;
        };
        if !entity.is_troop() {
            return;
        }
        let (from, is_air) = (entity.position, entity.is_air);
        let to = from.offset(dx, dy);
        let landing = if is_air { to } else { self.ground_landing(from, to) };
        if let Some(entity) = self.registry.get_mut(id) {
            entity.position = landing;
        }
    }

    /// Furthest point on the segment from `from` to `to` that a ground unit
    /// may occupy, sampled back from `to`. Footprints already containing
    /// `from` do not block.
    fn ground_landing(&self, from: Position, to: Position) -> Position {
        let obstacles: Vec<Footprint> = self
            .obstacles()
            .into_iter()
            .filter(|footprint| !footprint.contains(from))
            .collect();
        let length = from.distance_to(to);
        (0..=LANDING_SAMPLES)
            .map(|step| to.step_toward(from, length * step as f32 / LANDING_SAMPLES as f32))
            .find(|point| {
                self.grid.is_walkable(*point)
                    && !obstacles.iter().any(|footprint| footprint.contains(*point))
            })
            .unwrap_or(from)
    }

    /// Creates a troop or building for `owner` from the named card.
    pub fn spawn_card(
        &mut self,
        owner: PlayerId,
        name: &str,
        position: Position,
    ) -> Option<EntityId> {
        let card = self.catalog.lookup(name)?;
        self.spawn_unit(owner, card, position)
    }

    /// Creates a troop or building from a card definition. Spells have no body
    /// and yield `None`. Ground units are moved onto the nearest walkable spot.
    pub fn spawn_unit(
        &mut self,
        owner: PlayerId,
        card: Arc<CardDefinition>,
        position: Position,
    ) -> Option<EntityId> {
        let stats = card.stats();
        let kind = match stats.kind {
            CardKind::Troop => EntityKind::Troop,
            CardKind::Building => EntityKind::Building(BuildingState {
                tower: None,
                active: true,
                lifetime: stats.lifetime,
            }),
            CardKind::Spell => return None,
        };
        let position = if stats.is_air {
            position
        } else {
            self.settle(position, owner)
        };
        Some(self.spawn_entity(owner, card, position, kind))
    }

    /// Registers a new entity.
    ///
    /// Troops and buildings receive fresh copies of the card's mechanics;
    /// projectiles and zones carry their behaviour in their kind alone.
    pub fn spawn_entity(
        &mut self,
        owner: PlayerId,
        card: Arc<CardDefinition>,
        position: Position,
        kind: EntityKind,
    ) -> EntityId {
        let id = self.registry.allocate();
        let mut mechanics = match kind {
            EntityKind::Troop | EntityKind::Building(_) => card.instantiate_mechanics(),
            _ => Vec::new(),
        };
        let name = card.name().to_owned();
        let mut entity = Entity::new(id, owner, card, position, kind);
        for mechanic in &mut mechanics {
            mechanic.on_attach(&mut entity);
        }
        entity.mechanics = mechanics;
        self.registry.insert(entity);
        self.events.push(Event::EntitySpawned {
            entity: id,
            owner,
            card: name,
            position,
        });
        self.run_hooks(id, |mechanic, context| mechanic.on_spawn(context));
        id
    }

    /// Positions for `count` units of the card dropped around `center`,
    /// following the card's formation.
    #[must_use]
    pub fn formation_positions(
        &self,
        card: &CardDefinition,
        center: Position,
        count: u32,
    ) -> Vec<Position> {
        match card.formation() {
            Formation::Ring { radius } => arena_battle_arena::ring_formation(center, count, radius),
            Formation::Line { spacing } => {
                let blocked = self
                    .grid
                    .tower_blocked_x_ranges(center.y(), &self.tower_status);
                arena_battle_arena::line_formation(
                    center,
                    count,
                    spacing,
                    &blocked,
                    self.grid.width() as f32,
                )
            }
        }
    }

    fn settle(&self, position: Position, owner: PlayerId) -> Position {
        if self.grid.is_walkable(position) {
            return position;
        }
        let anchor = if self.grid.in_river(position) {
            self.grid.nearest_bridge(position).center()
        } else {
            self.grid.tower_site(owner, TowerSlot::King)
        };
        self.grid.nearest_walkable(position, anchor)
    }

    /// Footprints of every standing building and crown tower.
    pub(crate) fn obstacles(&self) -> Vec<Footprint> {
        self.registry
            .iter()
            .filter(|entity| !entity.is_dead())
            .filter_map(|entity| match &entity.kind {
                EntityKind::Building(BuildingState {
                    tower: Some(slot), ..
                }) => Some(self.grid.tower_footprint(entity.owner(), *slot)),
                EntityKind::Building(_) => Some(Footprint::new(
                    entity.position,
                    entity.card().stats().footprint.side(),
                )),
                _ => None,
            })
            .collect()
    }

    /// Runs a hook on every mechanic of the entity.
    ///
    /// The mechanics are detached while they run so hooks may freely mutate the
    /// battle, including the entity itself. Mechanics added during the hook are
    /// kept after the original ones.
    pub fn run_hooks(
        &mut self,
        id: EntityId,
        mut hook: impl FnMut(&mut dyn Mechanic, &mut MechanicContext<'_>),
    ) {
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        if entity.mechanics.is_empty() {
            return;
        }
        let mut mechanics = std::mem::take(&mut entity.mechanics);
        {
            let mut context = MechanicContext {
                battle: self,
                entity: id,
            };
            for mechanic in &mut mechanics {
                hook(mechanic.as_mut(), &mut context);
            }
        }
        if let Some(entity) = self.registry.get_mut(id) {
            let added = std::mem::replace(&mut entity.mechanics, mechanics);
            entity.mechanics.extend(added);
        }
    }

    /// Applies an effect on behalf of `caster`.
    pub fn apply_effect(
        &mut self,
        effect: &dyn Effect,
        caster: PlayerId,
        card: Arc<CardDefinition>,
        source: Option<EntityId>,
        target: Position,
    ) {
        let mut context = EffectContext {
            battle: self,
            caster,
            card,
            source,
            target,
        };
        effect.apply(&mut context);
    }
}

/// Applies the provided command to the battle, mutating state deterministically.
pub fn apply(battle: &mut BattleState, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::DeployCard {
            player,
            card,
            position,
        } => {
            let _ = battle.deploy_card(player, &card, position);
        }
        Command::Step { dt } => battle.step(dt),
    }
    out_events.append(&mut battle.events);
}

/// Query functions that provide read-only access to the battle state.
pub mod query {
    use arena_battle_arena::{TileGrid, TowerStatus};
    use arena_battle_core::{
        BattleSummary, ElixirRate, EntityId, MatchOutcome, PlayerId, Position, Rect,
    };

    use super::{BattleState, Entity, EntityKind, PlayerState};

    /// Retrieves an entity by identifier.
    #[must_use]
    pub fn entity(battle: &BattleState, id: EntityId) -> Option<&Entity> {
        battle.registry.get(id)
    }

    /// Iterates all entities in ascending id order.
    pub fn entities(battle: &BattleState) -> impl Iterator<Item = &Entity> {
        battle.registry.iter()
    }

    /// Number of registered entities.
    #[must_use]
    pub fn entity_count(battle: &BattleState) -> usize {
        battle.registry.len()
    }

    /// Living troops and buildings owned by the player, crown towers excluded.
    #[must_use]
    pub fn units(battle: &BattleState, owner: PlayerId) -> Vec<&Entity> {
        battle
            .registry
            .iter()
            .filter(|entity| entity.owner() == owner && !entity.is_dead())
            .filter(|entity| match &entity.kind {
                EntityKind::Troop => true,
                EntityKind::Building(state) => state.tower.is_none(),
                _ => false,
            })
            .collect()
    }

    /// State of one player.
    #[must_use]
    pub fn player(battle: &BattleState, player: PlayerId) -> &PlayerState {
        &battle.players[player.index()]
    }

    /// Visible hand of one player.
    #[must_use]
    pub fn hand(battle: &BattleState, player: PlayerId) -> &[String] {
        battle.players[player.index()].hand()
    }

    /// Simulated seconds since the start of the match.
    #[must_use]
    pub fn time(battle: &BattleState) -> f32 {
        battle.time
    }

    /// Number of ticks processed.
    #[must_use]
    pub fn tick(battle: &BattleState) -> u64 {
        battle.tick
    }

    /// Reports whether the match has finished.
    #[must_use]
    pub fn is_game_over(battle: &BattleState) -> bool {
        battle.outcome.is_some()
    }

    /// Final result once the match has finished.
    #[must_use]
    pub fn outcome(battle: &BattleState) -> Option<MatchOutcome> {
        battle.outcome
    }

    /// Current elixir regeneration stage.
    #[must_use]
    pub fn elixir_rate(battle: &BattleState) -> ElixirRate {
        battle.elixir_rate
    }

    /// Reports whether sudden death has started.
    #[must_use]
    pub fn is_sudden_death(battle: &BattleState) -> bool {
        battle.sudden_death
    }

    /// Reports whether the player's king tower is defending.
    #[must_use]
    pub fn king_active(battle: &BattleState, player: PlayerId) -> bool {
        battle.king_is_active(player)
    }

    /// Static arena geometry.
    #[must_use]
    pub fn grid(battle: &BattleState) -> &TileGrid {
        &battle.grid
    }

    /// Destruction state of the crown towers.
    #[must_use]
    pub fn tower_status(battle: &BattleState) -> &TowerStatus {
        &battle.tower_status
    }

    /// Deploy zones currently open to the player.
    #[must_use]
    pub fn deploy_zones(battle: &BattleState, player: PlayerId) -> Vec<Rect> {
        battle.grid.deploy_zones(player, &battle.tower_status)
    }

    /// Reports whether the named card could be placed at the position, ignoring
    /// hand and elixir.
    #[must_use]
    pub fn can_place(
        battle: &BattleState,
        player: PlayerId,
        card: &str,
        position: Position,
    ) -> bool {
        battle
            .catalog
            .lookup(card)
            .is_some_and(|definition| battle.placement(player, &definition, position).is_ok())
    }

    /// Reports whether the player could deploy the card right now.
    #[must_use]
    pub fn can_deploy(
        battle: &BattleState,
        player: PlayerId,
        card: &str,
        position: Position,
    ) -> bool {
        battle.check_deploy(player, card, position).is_ok()
    }

    /// Elixir cost of the card, if the catalog knows it.
    #[must_use]
    pub fn elixir_cost(battle: &BattleState, card: &str) -> Option<u32> {
        battle
            .catalog
            .lookup(card)
            .map(|definition| definition.stats().elixir)
    }

    /// Captures a serializable snapshot of the match.
    #[must_use]
    pub fn summary(battle: &BattleState) -> BattleSummary {
        BattleSummary {
            time: battle.time,
            tick: battle.tick,
            entity_count: battle.registry.len(),
            players: [battle.players[0].summary(), battle.players[1].summary()],
            game_over: battle.outcome.is_some(),
            outcome: battle.outcome,
        }
    }
}
