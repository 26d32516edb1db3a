//! Per-player economy, hand rotation and tower bookkeeping.

use std::collections::VecDeque;

use arena_battle_core::{PlayerSummary, TowerSlot, HAND_SIZE};

/// Mutable state of one player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    elixir: f32,
    hand: Vec<String>,
    cycle: VecDeque<String>,
    tower_hitpoints: [f32; 3],
    crowns: u32,
}

impl PlayerState {
    /// Seeds the hand with the first four deck cards and queues the rest.
    pub(crate) fn new(deck: Vec<String>, elixir: f32, tower_hitpoints: [f32; 3]) -> Self {
        let mut cards = deck.into_iter();
        let hand = cards.by_ref().take(HAND_SIZE).collect();
        Self {
            elixir,
            hand,
            cycle: cards.collect(),
            tower_hitpoints,
            crowns: 0,
        }
    }

    /// Current elixir.
    #[must_use]
    pub const fn elixir(&self) -> f32 {
        self.elixir
    }

    /// Visible card slots.
    #[must_use]
    pub fn hand(&self) -> &[String] {
        &self.hand
    }

    /// Cards waiting to enter the hand, next card first.
    #[must_use]
    pub fn cycle(&self) -> &VecDeque<String> {
        &self.cycle
    }

    /// Crowns scored against the opponent.
    #[must_use]
    pub const fn crowns(&self) -> u32 {
        self.crowns
    }

    /// Hitpoints of the tower in the slot, zero once destroyed.
    #[must_use]
    pub const fn tower_hitpoints(&self, slot: TowerSlot) -> f32 {
        self.tower_hitpoints[slot.index()]
    }

    /// Sum of hitpoints across all three towers.
    #[must_use]
    pub fn total_tower_hitpoints(&self) -> f32 {
        self.tower_hitpoints.iter().sum()
    }

    pub(crate) fn regenerate(&mut self, dt: f32, period: f32, cap: f32) {
        self.elixir = (self.elixir + dt / period).min(cap);
    }

    pub(crate) fn can_afford(&self, cost: u32) -> bool {
        self.elixir >= cost as f32
    }

    pub(crate) fn spend(&mut self, cost: u32) {
        self.elixir = (self.elixir - cost as f32).max(0.0);
    }

    /// Slot holding the card, matched against the requested and canonical names.
    pub(crate) fn slot_of(&self, requested: &str, canonical: &str) -> Option<usize> {
        self.hand
            .iter()
            .position(|card| card == requested || card == canonical)
    }

    /// Sends the played card to the back of the cycle and refills the slot
    /// from the front. With an empty cycle the card stays in place.
    pub(crate) fn rotate(&mut self, slot: usize) {
        let Some(next) = self.cycle.pop_front() else {
            return;
        };
        if let Some(played) = self.hand.get_mut(slot) {
            let played = std::mem::replace(played, next);
            self.cycle.push_back(played);
        }
    }

    pub(crate) fn set_tower_hitpoints(&mut self, slot: TowerSlot, hitpoints: f32) {
        self.tower_hitpoints[slot.index()] = hitpoints.max(0.0);
    }

    pub(crate) fn set_crowns(&mut self, crowns: u32) {
        self.crowns = crowns;
    }

    pub(crate) fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            elixir: self.elixir,
            crowns: self.crowns,
            king_hitpoints: self.tower_hitpoints(TowerSlot::King),
            left_hitpoints: self.tower_hitpoints(TowerSlot::Left),
            right_hitpoints: self.tower_hitpoints(TowerSlot::Right),
        }
    }
}
