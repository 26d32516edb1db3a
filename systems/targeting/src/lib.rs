#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure targeting and pathfinding rules for arena units.
//!
//! Every function in this crate is a pure function of an attacker snapshot,
//! candidate snapshots and the static [`TileGrid`](arena_battle_arena::TileGrid),
//! which keeps the rules unit-testable without running the tick loop.

mod avoidance;
mod pathfinding;

use arena_battle_core::{EntityId, PlayerId, Position, TargetType};

pub use avoidance::avoidance_step;
pub use pathfinding::pathfind_target;

/// Snapshot of the unit choosing a target or a waypoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    /// Identifier of the unit.
    pub id: EntityId,
    /// Player controlling the unit.
    pub owner: PlayerId,
    /// Current position.
    pub position: Position,
    /// Distance at which troops are noticed.
    pub sight_range: f32,
    /// What the unit's attacks can reach.
    pub target_type: TargetType,
    /// Whether the unit flies over the river.
    pub is_air: bool,
}

impl Agent {
    /// Reports whether the position lies within sight range.
    #[must_use]
    pub fn sees(&self, position: Position) -> bool {
        self.position.distance_to(position) <= self.sight_range
    }
}

/// Category of a potential target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateKind {
    /// A mobile unit.
    Troop,
    /// A placed building.
    Building,
    /// A crown tower. Inactive kings lose distance ties against active towers.
    Tower {
        /// Whether the tower is currently defending.
        active: bool,
    },
}

impl CandidateKind {
    /// Reports whether the candidate is a building or a crown tower.
    #[must_use]
    pub const fn is_building(&self) -> bool {
        !matches!(self, Self::Troop)
    }
}

/// Snapshot of an entity that may be targeted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Player owning the entity.
    pub owner: PlayerId,
    /// Current position.
    pub position: Position,
    /// Whether the entity flies.
    pub is_air: bool,
    /// Category of the entity.
    pub kind: CandidateKind,
}

/// Reports whether the attacker is allowed to attack the candidate at all.
///
/// Distance is not considered here; see [`nearest_target`] for the sight rule
/// applied to troops.
#[must_use]
pub fn is_eligible(attacker: &Agent, candidate: &Candidate) -> bool {
    if candidate.owner == attacker.owner || candidate.id == attacker.id {
        return false;
    }
    if let CandidateKind::Tower { .. } = candidate.kind {
        return true;
    }
    if attacker.target_type.buildings_only() && !candidate.kind.is_building() {
        return false;
    }
    if candidate.is_air {
        attacker.target_type.reaches_air()
    } else {
        attacker.target_type.reaches_ground()
    }
}

/// Selects the preferred target among the candidates.
///
/// Troops only count while inside sight range and take priority over
/// buildings; buildings and towers are eligible at any distance. Within a
/// category the minimum distance wins, then active towers over inactive ones,
/// then the lower identifier.
#[must_use]
pub fn nearest_target(attacker: &Agent, candidates: &[Candidate]) -> Option<EntityId> {
    let mut best_troop: Option<Ranked> = None;
    let mut best_building: Option<Ranked> = None;

    for candidate in candidates {
        if !is_eligible(attacker, candidate) {
            continue;
        }
        let distance = attacker.position.distance_to(candidate.position);
        let ranked = Ranked {
            distance,
            dormant: matches!(candidate.kind, CandidateKind::Tower { active: false }),
            id: candidate.id,
        };
        let slot = if candidate.kind.is_building() {
            &mut best_building
        } else {
            if distance > attacker.sight_range {
                continue;
            }
            &mut best_troop
        };
        match slot {
            Some(existing) => {
                if ranked.precedes(existing) {
                    *existing = ranked;
                }
            }
            None => *slot = Some(ranked),
        }
    }

    best_troop.or(best_building).map(|ranked| ranked.id)
}

/// Decides whether an attacker locked on `current` should retarget `candidate`.
///
/// A troop in sight always pre-empts a building. Within the same category the
/// candidate must be both strictly closer and inside sight range; a nearer
/// candidate beyond sight never pre-empts the current target.
#[must_use]
pub fn should_switch_target(attacker: &Agent, current: &Candidate, candidate: &Candidate) -> bool {
    if current.id == candidate.id {
        return false;
    }
    let candidate_distance = attacker.position.distance_to(candidate.position);
    let in_sight = candidate_distance <= attacker.sight_range;

    if current.kind.is_building() && !candidate.kind.is_building() {
        return in_sight;
    }

    if current.kind.is_building() == candidate.kind.is_building() {
        let current_distance = attacker.position.distance_to(current.position);
        return in_sight && candidate_distance < current_distance;
    }

    false
}

/// Keeps, replaces or acquires the attacker's target for this tick.
///
/// A current target that vanished from the candidates or became ineligible is
/// treated as lost and a fresh target is acquired.
#[must_use]
pub fn acquire_target(
    attacker: &Agent,
    current: Option<EntityId>,
    candidates: &[Candidate],
) -> Option<EntityId> {
    let best = nearest_target(attacker, candidates);
    let current = current.and_then(|id| {
        candidates
            .iter()
            .find(|candidate| candidate.id == id && is_eligible(attacker, candidate))
    });

    match (current, best) {
        (None, best) => best,
        (Some(current), None) => Some(current.id),
        (Some(current), Some(best_id)) => {
            let replacement = candidates.iter().find(|candidate| candidate.id == best_id);
            match replacement {
                Some(candidate) if should_switch_target(attacker, current, candidate) => {
                    Some(best_id)
                }
                _ => Some(current.id),
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Ranked {
    distance: f32,
    dormant: bool,
    id: EntityId,
}

impl Ranked {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        if self.dormant != other.dormant {
            return !self.dormant;
        }

        self.id < other.id
    }
}
