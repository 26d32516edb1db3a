//! Match-level rules: elixir economy, tower bookkeeping, crowns and victory.

use arena_battle_core::{ElixirRate, EntityId, Event, MatchOutcome, PlayerId, TowerSlot, WinReason};

use crate::entity::{BuildingState, EntityKind};
use crate::BattleState;

impl BattleState {
    /// Runs one full tick of `dt` seconds.
    pub(crate) fn advance(&mut self, dt: f32) {
        self.tick = self.tick.saturating_add(1);
        self.time += dt;
        self.regenerate_elixir(dt);

        for id in self.registry.snapshot() {
            self.update_entity(id, dt);
        }
        self.separate_ground_troops();
        self.remove_dead();
        self.sync_tower_hitpoints();
        self.check_victory();

        tracing::trace!(
            tick = self.tick,
            time = self.time,
            entities = self.registry.len(),
            "tick processed"
        );
    }

    fn current_elixir_rate(&self) -> ElixirRate {
        let phases = &self.config.phases;
        if self.sudden_death || self.time >= phases.triple_elixir {
            ElixirRate::Triple
        } else if self.time >= phases.double_elixir {
            ElixirRate::Double
        } else {
            ElixirRate::Single
        }
    }

    fn regenerate_elixir(&mut self, dt: f32) {
        let rate = self.current_elixir_rate();
        if rate != self.elixir_rate {
            self.elixir_rate = rate;
            tracing::info!(?rate, time = self.time, "elixir rate changed");
            self.events.push(Event::ElixirRateChanged { rate });
        }
        let period = match rate {
            ElixirRate::Single => self.config.regen.single,
            ElixirRate::Double => self.config.regen.double,
            ElixirRate::Triple => self.config.regen.triple,
        };
        let cap = self.config.max_elixir;
        for player in &mut self.players {
            player.regenerate(dt, period, cap);
        }
    }

    /// Removes dead entities, running their death hooks first. Repeats until
    /// no hook leaves a newly dead entity behind.
    pub(crate) fn remove_dead(&mut self) {
        loop {
            let dead = self.registry.dead();
            if dead.is_empty() {
                break;
            }
            for &id in &dead {
                self.run_hooks(id, |mechanic, context| mechanic.on_death(context));
            }
            for id in dead {
                let Some(entity) = self.registry.remove(id) else {
                    continue;
                };
                let owner = entity.owner();
                self.events.push(Event::EntityRemoved { entity: id, owner });
                if let Some(slot) = entity.tower_slot() {
                    self.tower_destroyed(owner, slot);
                }
            }
        }
    }

    fn tower_destroyed(&mut self, owner: PlayerId, slot: TowerSlot) {
        if !self.tower_status.mark_destroyed(owner, slot) {
            return;
        }
        self.towers[owner.index()][slot.index()] = None;
        self.players[owner.index()].set_tower_hitpoints(slot, 0.0);
        tracing::info!(%owner, ?slot, time = self.time, "crown tower destroyed");
        self.events.push(Event::TowerDestroyed { owner, slot });

        let scorer = owner.opponent();
        let earned = if self.tower_status.is_destroyed(owner, TowerSlot::King) {
            3
        } else {
            self.tower_status.princesses_lost(owner)
        };
        let record = &mut self.players[scorer.index()];
        if earned > record.crowns() {
            record.set_crowns(earned);
            self.events.push(Event::CrownScored {
                player: scorer,
                crowns: earned,
            });
        }

        if slot.is_princess() && self.tower_status.princesses_lost(owner) == 2 {
            self.activate_king(owner);
        }
    }

    /// Lets the player's king tower start attacking.
    pub(crate) fn activate_king(&mut self, owner: PlayerId) {
        let Some(id) = self.towers[owner.index()][TowerSlot::King.index()] else {
            return;
        };
        let Some(entity) = self.registry.get_mut(id) else {
            return;
        };
        if let EntityKind::Building(BuildingState { active, .. }) = &mut entity.kind {
            if !*active {
                *active = true;
                tracing::info!(%owner, time = self.time, "king tower activated");
                self.events.push(Event::KingActivated { owner });
            }
        }
    }

    /// Reports whether the king tower of `owner` is defending.
    pub(crate) fn king_is_active(&self, owner: PlayerId) -> bool {
        self.tower_id(owner, TowerSlot::King)
            .and_then(|id| self.registry.get(id))
            .is_some_and(|entity| {
                matches!(
                    entity.kind,
                    EntityKind::Building(BuildingState { active: true, .. })
                )
            })
    }

    pub(crate) fn tower_id(&self, owner: PlayerId, slot: TowerSlot) -> Option<EntityId> {
        self.towers[owner.index()][slot.index()]
    }

    fn sync_tower_hitpoints(&mut self) {
        for owner in PlayerId::ALL {
            for slot in TowerSlot::ALL {
                let hitpoints = self
                    .tower_id(owner, slot)
                    .and_then(|id| self.registry.get(id))
                    .map_or(0.0, |entity| entity.hitpoints);
                self.players[owner.index()].set_tower_hitpoints(slot, hitpoints);
            }
        }
    }

    fn crown_leader(&self) -> Option<PlayerId> {
        let bottom = self.players[PlayerId::BOTTOM.index()].crowns();
        let top = self.players[PlayerId::TOP.index()].crowns();
        match bottom.cmp(&top) {
            std::cmp::Ordering::Greater => Some(PlayerId::BOTTOM),
            std::cmp::Ordering::Less => Some(PlayerId::TOP),
            std::cmp::Ordering::Equal => None,
        }
    }

    fn check_victory(&mut self) {
        if self.outcome.is_some() {
            return;
        }

        let fallen =
            PlayerId::ALL.map(|owner| self.tower_status.is_destroyed(owner, TowerSlot::King));
        match fallen {
            [true, true] => return self.finish(MatchOutcome::Draw),
            [true, false] => return self.finish(victory(PlayerId::TOP, WinReason::KingDestroyed)),
            [false, true] => {
                return self.finish(victory(PlayerId::BOTTOM, WinReason::KingDestroyed));
            }
            [false, false] => {}
        }

        let phases = &self.config.phases;
        let (sudden_death_at, tiebreak_at) = (phases.sudden_death, phases.tiebreak);

        if self.time >= sudden_death_at {
            let leader = self.crown_leader();
            if !self.sudden_death {
                if let Some(winner) = leader {
                    return self.finish(victory(winner, WinReason::Crowns));
                }
                self.sudden_death = true;
                tracing::info!(time = self.time, "sudden death started");
                self.events.push(Event::SuddenDeathStarted);
            } else if let Some(winner) = leader {
                return self.finish(victory(winner, WinReason::SuddenDeath));
            }
        }

        if self.time >= tiebreak_at {
            if let Some(winner) = self.crown_leader() {
                return self.finish(victory(winner, WinReason::Crowns));
            }
            let bottom = self.players[PlayerId::BOTTOM.index()].total_tower_hitpoints();
            let top = self.players[PlayerId::TOP.index()].total_tower_hitpoints();
            let outcome = if bottom > top {
                victory(PlayerId::BOTTOM, WinReason::TowerHitpoints)
            } else if top > bottom {
                victory(PlayerId::TOP, WinReason::TowerHitpoints)
            } else {
                MatchOutcome::Draw
            };
            self.finish(outcome);
        }
    }

    fn finish(&mut self, outcome: MatchOutcome) {
        self.outcome = Some(outcome);
        tracing::info!(?outcome, time = self.time, tick = self.tick, "match ended");
        self.events.push(Event::MatchEnded { outcome });
    }
}

const fn victory(winner: PlayerId, reason: WinReason) -> MatchOutcome {
    MatchOutcome::Victory { winner, reason }
}
