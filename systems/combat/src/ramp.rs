//! Stepwise damage ramp against a locked target.

use arena_battle_core::EntityId;

/// Tracks consecutive hits on one target and the resulting damage stage.
///
/// Each stage multiplies the base damage. The stage advances after
/// `hits_per_stage` consecutive hits on the same target and falls back to the
/// first stage the moment the attacker hits anything else.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageRamp {
    stages: Vec<f32>,
    hits_per_stage: u32,
    locked: Option<EntityId>,
    hits: u32,
}

impl DamageRamp {
    /// Creates a ramp with the provided stage multipliers.
    ///
    /// An empty stage list behaves like a single stage of `1.0`.
    #[must_use]
    pub fn new(stages: Vec<f32>, hits_per_stage: u32) -> Self {
        let stages = if stages.is_empty() { vec![1.0] } else { stages };
        Self {
            stages,
            hits_per_stage: hits_per_stage.max(1),
            locked: None,
            hits: 0,
        }
    }

    /// Target the ramp is currently building against.
    #[must_use]
    pub const fn locked(&self) -> Option<EntityId> {
        self.locked
    }

    /// Zero-based index of the active stage.
    #[must_use]
    pub fn stage(&self) -> usize {
        let stage = (self.hits / self.hits_per_stage) as usize;
        stage.min(self.stages.len() - 1)
    }

    /// Drops the lock and returns to the first stage.
    pub fn reset(&mut self) {
        self.locked = None;
        self.hits = 0;
    }

    /// Multiplier applied to a hit on `target`, advancing the ramp afterwards.
    pub fn hit(&mut self, target: EntityId) -> f32 {
        if self.locked != Some(target) {
            self.locked = Some(target);
            self.hits = 0;
        }
        let multiplier = self.stages[self.stage()];
        self.hits = self.hits.saturating_add(1);
        multiplier
    }
}
