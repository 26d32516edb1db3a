#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the arena battle engine.
//!
//! This crate defines the vocabulary that connects the arena geometry, the
//! authoritative battle state, the pure systems and the adapters. Observers
//! submit [`Command`] values describing the only permissible outside
//! mutations (deploying a card and advancing the clock), the battle executes
//! them through its `apply` entry point and broadcasts [`Event`] values
//! describing what happened. Card statistics are immutable [`CardStats`]
//! records validated once at load time.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of tile columns in the standard arena.
pub const ARENA_WIDTH: u32 = 18;

/// Number of tile rows in the standard arena.
pub const ARENA_HEIGHT: u32 = 32;

/// Number of visible card slots in a player's hand.
pub const HAND_SIZE: usize = 4;

/// Number of cards in a complete deck.
pub const DECK_SIZE: usize = 8;

/// Highest card level supported by the level scaling curve.
pub const MAX_CARD_LEVEL: u32 = 15;

/// Commands that express all permissible outside mutations of a battle.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that a player deploy a card from their hand.
    DeployCard {
        /// Player attempting the deployment.
        player: PlayerId,
        /// Name of the card being played.
        card: String,
        /// Arena position the card is dropped at.
        position: Position,
    },
    /// Advances the simulation clock by the provided delta, in seconds.
    Step {
        /// Simulated seconds that elapse in the tick.
        dt: f32,
    },
}

/// Events broadcast by the battle after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that a card was played and paid for.
    CardDeployed {
        /// Player that played the card.
        player: PlayerId,
        /// Canonical name of the played card.
        card: String,
        /// Position the card was dropped at.
        position: Position,
    },
    /// Reports that a deployment was refused.
    DeployRejected {
        /// Player that attempted the deployment.
        player: PlayerId,
        /// Card name supplied with the request.
        card: String,
        /// Specific reason the deployment failed.
        reason: DeployRejection,
    },
    /// Confirms that an entity entered the registry.
    EntitySpawned {
        /// Identifier allocated for the entity.
        entity: EntityId,
        /// Player owning the entity.
        owner: PlayerId,
        /// Name of the card the entity was created from.
        card: String,
        /// Position the entity appeared at.
        position: Position,
    },
    /// Confirms that an entity left the registry.
    EntityRemoved {
        /// Identifier of the removed entity.
        entity: EntityId,
        /// Player that owned the entity.
        owner: PlayerId,
    },
    /// Announces that a crown tower fell.
    TowerDestroyed {
        /// Player that owned the tower.
        owner: PlayerId,
        /// Slot the tower occupied.
        slot: TowerSlot,
    },
    /// Announces that a king tower started defending.
    KingActivated {
        /// Player owning the king tower.
        owner: PlayerId,
    },
    /// Announces a change in the crown count of a player.
    CrownScored {
        /// Player that scored.
        player: PlayerId,
        /// Crowns held after scoring.
        crowns: u32,
    },
    /// Announces that the elixir regeneration rate changed.
    ElixirRateChanged {
        /// Rate that became active.
        rate: ElixirRate,
    },
    /// Announces that the match entered sudden death.
    SuddenDeathStarted,
    /// Announces the end of the match.
    MatchEnded {
        /// Final result of the match.
        outcome: MatchOutcome,
    },
}

/// Reasons a deployment request can be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeployRejection {
    /// The card provider does not know the requested card.
    UnknownCard,
    /// The card is not among the player's visible hand slots.
    CardNotInHand,
    /// The player cannot afford the card.
    InsufficientElixir,
    /// The position is outside every deploy zone or not walkable.
    InvalidPosition,
    /// The position overlaps an existing building footprint.
    FootprintCollision,
    /// The match has already ended.
    MatchOver,
}

impl fmt::Display for DeployRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownCard => "unknown card",
            Self::CardNotInHand => "card not in hand",
            Self::InsufficientElixir => "insufficient elixir",
            Self::InvalidPosition => "invalid position",
            Self::FootprintCollision => "footprint collision",
            Self::MatchOver => "match over",
        };
        f.write_str(text)
    }
}

/// Identifier of one of the two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Player defending the bottom half of the arena.
    pub const BOTTOM: Self = Self(0);

    /// Player defending the top half of the arena.
    pub const TOP: Self = Self(1);

    /// Both players in index order.
    pub const ALL: [Self; 2] = [Self::BOTTOM, Self::TOP];

    /// Creates a player identifier. Values above one wrap onto the top player.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value == 0 {
            Self::BOTTOM
        } else {
            Self::TOP
        }
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Index suitable for two-element per-player arrays.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// The opposing player.
    #[must_use]
    pub const fn opponent(&self) -> Self {
        if self.0 == 0 {
            Self::TOP
        } else {
            Self::BOTTOM
        }
    }

    /// Direction along the y axis in which this player's units advance.
    #[must_use]
    pub const fn forward(&self) -> f32 {
        if self.0 == 0 {
            1.0
        } else {
            -1.0
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Unique identifier assigned to an entity by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Continuous arena coordinates measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a position from tile-space coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance_to(&self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Integer tile containing the position.
    #[must_use]
    pub fn tile(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Center of the tile containing the position.
    #[must_use]
    pub fn tile_center(&self) -> Position {
        let (x, y) = self.tile();
        Position::new(x as f32 + 0.5, y as f32 + 0.5)
    }

    /// Position shifted by the provided delta.
    #[must_use]
    pub fn offset(&self, dx: f32, dy: f32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    /// Moves toward `goal` by at most `max_step` tiles without overshooting.
    #[must_use]
    pub fn step_toward(&self, goal: Position, max_step: f32) -> Position {
        let distance = self.distance_to(goal);
        if distance <= max_step || distance <= f32::EPSILON {
            return goal;
        }
        let scale = max_step / distance;
        Position::new(
            self.x + (goal.x - self.x) * scale,
            self.y + (goal.y - self.y) * scale,
        )
    }
}

/// Axis-aligned half-open rectangle `[x1, x2) × [y1, y2)` in tile space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl Rect {
    /// Creates a rectangle from its lower and upper corners.
    #[must_use]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Inclusive lower x bound.
    #[must_use]
    pub const fn x1(&self) -> f32 {
        self.x1
    }

    /// Inclusive lower y bound.
    #[must_use]
    pub const fn y1(&self) -> f32 {
        self.y1
    }

    /// Exclusive upper x bound.
    #[must_use]
    pub const fn x2(&self) -> f32 {
        self.x2
    }

    /// Exclusive upper y bound.
    #[must_use]
    pub const fn y2(&self) -> f32 {
        self.y2
    }

    /// Reports whether the position lies inside the half-open rectangle.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.x1..self.x2).contains(&position.x) && (self.y1..self.y2).contains(&position.y)
    }
}

/// Crown tower slots owned by every player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TowerSlot {
    /// Central king tower.
    King,
    /// Princess tower on the left lane.
    Left,
    /// Princess tower on the right lane.
    Right,
}

impl TowerSlot {
    /// All slots in index order.
    pub const ALL: [Self; 3] = [Self::King, Self::Left, Self::Right];

    /// Index suitable for three-element per-slot arrays.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::King => 0,
            Self::Left => 1,
            Self::Right => 2,
        }
    }

    /// Reports whether the slot holds a princess tower.
    #[must_use]
    pub const fn is_princess(&self) -> bool {
        !matches!(self, Self::King)
    }
}

/// What a card's attacks are able to reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    /// Ground units and buildings only.
    Ground,
    /// Air units only.
    Air,
    /// Both ground and air units.
    AirAndGround,
    /// Buildings only, including crown towers.
    Buildings,
}

impl TargetType {
    /// Reports whether attacks can hit airborne units.
    #[must_use]
    pub const fn reaches_air(&self) -> bool {
        matches!(self, Self::Air | Self::AirAndGround)
    }

    /// Reports whether attacks can hit ground units.
    #[must_use]
    pub const fn reaches_ground(&self) -> bool {
        matches!(self, Self::Ground | Self::AirAndGround | Self::Buildings)
    }

    /// Reports whether only buildings are acceptable targets.
    #[must_use]
    pub const fn buildings_only(&self) -> bool {
        matches!(self, Self::Buildings)
    }
}

/// Broad category of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// Mobile units.
    Troop,
    /// Stationary structures.
    Building,
    /// Instant or projectile effects without a standing body.
    Spell,
}

/// Where a card may be dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeployRule {
    /// Inside the player's current deploy zones.
    OwnZone,
    /// Anywhere walkable outside tower footprints, regardless of zones.
    Anywhere,
    /// Anywhere inside the arena bounds that is not a blocked tile.
    ArenaWide,
}

/// Square placement footprint of a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FootprintSize {
    /// Two by two tiles, used by the fast-build building.
    Compact,
    /// Three by three tiles.
    Standard,
}

impl FootprintSize {
    /// Side length of the footprint in tiles.
    #[must_use]
    pub const fn side(&self) -> f32 {
        match self {
            Self::Compact => 2.0,
            Self::Standard => 3.0,
        }
    }
}

/// Multiplier applied to hitpoints and damage for a card level.
#[must_use]
pub fn level_multiplier(level: u32) -> f32 {
    let level = level.clamp(1, MAX_CARD_LEVEL);
    1.1_f32.powi(level as i32 - 1)
}

/// Immutable numeric statistics of a card.
///
/// Distances are measured in tiles, durations in seconds and movement speed in
/// tiles per minute, mirroring how card data is published.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardStats {
    /// Canonical card name.
    pub name: String,
    /// Kind of card.
    pub kind: CardKind,
    /// Elixir cost to deploy the card.
    pub elixir: u32,
    /// Level used to scale hitpoints and damage.
    pub level: u32,
    /// Base hitpoints at level one.
    pub hitpoints: f32,
    /// Base damage per hit at level one.
    pub damage: f32,
    /// Movement speed in tiles per minute.
    pub speed: f32,
    /// Attack range measured from the target's edge.
    pub range: f32,
    /// Distance at which troops are noticed.
    pub sight_range: f32,
    /// Seconds between attacks.
    pub hit_speed: f32,
    /// Seconds between deployment and the first action.
    pub deploy_time: f32,
    /// Body radius used for collision and area checks.
    pub collision_radius: f32,
    /// Number of units spawned per deployment.
    pub count: u32,
    /// Seconds a building stands before expiring.
    pub lifetime: Option<f32>,
    /// What the card's attacks can reach.
    pub target_type: TargetType,
    /// Whether the unit flies.
    pub is_air: bool,
    /// Footprint used when the card is a building.
    pub footprint: FootprintSize,
    /// Where the card may be dropped.
    pub deploy_rule: DeployRule,
}

impl CardStats {
    /// Default statistics for a single melee ground troop.
    #[must_use]
    pub fn troop(name: impl Into<String>, elixir: u32) -> Self {
        Self {
            name: name.into(),
            kind: CardKind::Troop,
            elixir,
            level: 1,
            hitpoints: 100.0,
            damage: 10.0,
            speed: 60.0,
            range: 1.0,
            sight_range: 5.5,
            hit_speed: 1.0,
            deploy_time: 1.0,
            collision_radius: 0.5,
            count: 1,
            lifetime: None,
            target_type: TargetType::Ground,
            is_air: false,
            footprint: FootprintSize::Standard,
            deploy_rule: DeployRule::OwnZone,
        }
    }

    /// Default statistics for a defensive building.
    #[must_use]
    pub fn building(name: impl Into<String>, elixir: u32) -> Self {
        Self {
            kind: CardKind::Building,
            speed: 0.0,
            range: 5.5,
            sight_range: 5.5,
            collision_radius: 1.0,
            lifetime: Some(30.0),
            ..Self::troop(name, elixir)
        }
    }

    /// Default statistics for a spell.
    #[must_use]
    pub fn spell(name: impl Into<String>, elixir: u32) -> Self {
        Self {
            kind: CardKind::Spell,
            hitpoints: 0.0,
            damage: 0.0,
            speed: 0.0,
            range: 0.0,
            sight_range: 0.0,
            deploy_time: 0.0,
            collision_radius: 0.0,
            target_type: TargetType::AirAndGround,
            deploy_rule: DeployRule::ArenaWide,
            ..Self::troop(name, elixir)
        }
    }

    /// Hitpoints after level scaling.
    #[must_use]
    pub fn scaled_hitpoints(&self) -> f32 {
        self.hitpoints * level_multiplier(self.level)
    }

    /// Damage after level scaling.
    #[must_use]
    pub fn scaled_damage(&self) -> f32 {
        self.damage * level_multiplier(self.level)
    }

    /// Movement speed converted to tiles per second.
    #[must_use]
    pub fn tiles_per_second(&self) -> f32 {
        self.speed / 60.0
    }

    /// Reports whether the card is a spell.
    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.kind == CardKind::Spell
    }

    /// Checks that the statistics are usable for the declared kind.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::MissingName);
        }
        let invalid = |field: &'static str| DefinitionError::InvalidStat {
            card: self.name.clone(),
            field,
        };
        if self.elixir > 10 {
            return Err(invalid("elixir"));
        }
        if !(1..=MAX_CARD_LEVEL).contains(&self.level) {
            return Err(invalid("level"));
        }
        if self.kind == CardKind::Spell {
            return Ok(());
        }
        if !(self.hitpoints.is_finite() && self.hitpoints > 0.0) {
            return Err(invalid("hitpoints"));
        }
        if !(self.damage.is_finite() && self.damage >= 0.0) {
            return Err(invalid("damage"));
        }
        if self.damage > 0.0 && !(self.hit_speed.is_finite() && self.hit_speed > 0.0) {
            return Err(invalid("hit_speed"));
        }
        if !(self.range.is_finite() && self.range >= 0.0) {
            return Err(invalid("range"));
        }
        if !(self.collision_radius.is_finite() && self.collision_radius >= 0.0) {
            return Err(invalid("collision_radius"));
        }
        if self.deploy_time < 0.0 {
            return Err(invalid("deploy_time"));
        }
        match self.kind {
            CardKind::Troop => {
                if self.count == 0 {
                    return Err(invalid("count"));
                }
                if !(self.speed.is_finite() && self.speed >= 0.0) {
                    return Err(invalid("speed"));
                }
            }
            CardKind::Building => {
                if matches!(self.lifetime, Some(lifetime) if lifetime <= 0.0) {
                    return Err(invalid("lifetime"));
                }
            }
            CardKind::Spell => {}
        }
        Ok(())
    }
}

/// Structural problems detected while loading card definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// A definition was supplied without a name.
    #[error("card definition is missing a name")]
    MissingName,
    /// A statistic is out of range for the card's kind.
    #[error("card `{card}` has an invalid `{field}` statistic")]
    InvalidStat {
        /// Card carrying the invalid value.
        card: String,
        /// Statistic that failed validation.
        field: &'static str,
    },
    /// Two definitions share a canonical name.
    #[error("card `{0}` is defined more than once")]
    Duplicate(String),
    /// An alias points at a card that does not exist.
    #[error("alias `{alias}` points at unknown card `{target}`")]
    DanglingAlias {
        /// Historical name.
        alias: String,
        /// Canonical name the alias resolves to.
        target: String,
    },
}

/// Elixir regeneration stages of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElixirRate {
    /// Regular regeneration.
    Single,
    /// Twice the regular rate.
    Double,
    /// Roughly three times the regular rate.
    Triple,
}

/// How a match was decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinReason {
    /// The enemy king tower fell.
    KingDestroyed,
    /// A player led on crowns when regulation time ran out.
    Crowns,
    /// The first crown swing after regulation.
    SuddenDeath,
    /// Remaining tower hitpoints at the tiebreak threshold.
    TowerHitpoints,
}

/// Final result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// A player won.
    Victory {
        /// Winning player.
        winner: PlayerId,
        /// How the win was decided.
        reason: WinReason,
    },
    /// Neither player could be separated.
    Draw,
}

impl MatchOutcome {
    /// Winning player, if any.
    #[must_use]
    pub const fn winner(&self) -> Option<PlayerId> {
        match self {
            Self::Victory { winner, .. } => Some(*winner),
            Self::Draw => None,
        }
    }
}

/// Per-player section of a [`BattleSummary`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Current elixir.
    pub elixir: f32,
    /// Crowns scored.
    pub crowns: u32,
    /// King tower hitpoints.
    pub king_hitpoints: f32,
    /// Left princess tower hitpoints.
    pub left_hitpoints: f32,
    /// Right princess tower hitpoints.
    pub right_hitpoints: f32,
}

impl PlayerSummary {
    /// Sum of hitpoints across all three towers.
    #[must_use]
    pub fn total_tower_hitpoints(&self) -> f32 {
        self.king_hitpoints + self.left_hitpoints + self.right_hitpoints
    }
}

/// Read-only snapshot of a battle for observers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleSummary {
    /// Simulated seconds since the start of the match.
    pub time: f32,
    /// Number of ticks processed.
    pub tick: u64,
    /// Number of entities in the registry.
    pub entity_count: usize,
    /// Per-player state in index order.
    pub players: [PlayerSummary; 2],
    /// Whether the match has finished.
    pub game_over: bool,
    /// Final result once the match has finished.
    pub outcome: Option<MatchOutcome>,
}
