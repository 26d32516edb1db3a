//! Card deployment: legality checks, payment, hand rotation and casting.

use std::sync::Arc;

use arena_battle_arena::DeployQuery;
use arena_battle_core::{CardKind, DeployRejection, Event, PlayerId, Position};

use crate::card::CardDefinition;
use crate::BattleState;

impl BattleState {
    /// Plays a card from the player's hand at the position.
    ///
    /// Returns `false` and emits [`Event::DeployRejected`] when the card is
    /// unknown, not in hand, unaffordable or the placement is illegal. On
    /// success the elixir is debited, the hand rotates and the card's units or
    /// effects appear immediately.
    pub fn deploy_card(&mut self, player: PlayerId, card: &str, position: Position) -> bool {
        let (definition, slot) = match self.check_deploy(player, card, position) {
            Ok(accepted) => accepted,
            Err(reason) => {
                tracing::debug!(%player, card, %reason, "deployment rejected");
                self.events.push(Event::DeployRejected {
                    player,
                    card: card.to_owned(),
                    reason,
                });
                return false;
            }
        };

        let state = &mut self.players[player.index()];
        state.spend(definition.stats().elixir);
        state.rotate(slot);

        tracing::debug!(
            %player,
            card = definition.name(),
            x = position.x(),
            y = position.y(),
            "card deployed"
        );
        self.events.push(Event::CardDeployed {
            player,
            card: definition.name().to_owned(),
            position,
        });
        self.cast(player, definition, position);
        true
    }

    /// Validates a deployment without performing it, returning the resolved
    /// card and the hand slot it occupies.
    pub(crate) fn check_deploy(
        &self,
        player: PlayerId,
        card: &str,
        position: Position,
    ) -> Result<(Arc<CardDefinition>, usize), DeployRejection> {
        if self.outcome.is_some() {
            return Err(DeployRejection::MatchOver);
        }
        let definition = self
            .catalog
            .lookup(card)
            .ok_or(DeployRejection::UnknownCard)?;
        let state = &self.players[player.index()];
        let slot = state
            .slot_of(card, definition.name())
            .ok_or(DeployRejection::CardNotInHand)?;
        if !state.can_afford(definition.stats().elixir) {
            return Err(DeployRejection::InsufficientElixir);
        }
        self.placement(player, &definition, position)?;
        Ok((definition, slot))
    }

    /// Checks only the geometric legality of dropping the card at the position.
    pub(crate) fn placement(
        &self,
        player: PlayerId,
        definition: &CardDefinition,
        position: Position,
    ) -> Result<(), DeployRejection> {
        let obstacles = self.obstacles();
        let stats = definition.stats();
        let query = DeployQuery {
            rule: stats.deploy_rule,
            is_spell: stats.is_spell(),
            body_radius: stats.collision_radius,
            building: (stats.kind == CardKind::Building).then_some(stats.footprint),
            obstacles: &obstacles,
        };
        self.grid
            .check_deploy(position, player, &self.tower_status, &query)
    }

    fn cast(&mut self, player: PlayerId, definition: Arc<CardDefinition>, position: Position) {
        match definition.stats().kind {
            CardKind::Troop => {
                let count = definition.stats().count;
                for spot in self.formation_positions(&definition, position, count) {
                    let _ = self.spawn_unit(player, Arc::clone(&definition), spot);
                }
            }
            CardKind::Building => {
                let _ = self.spawn_unit(player, definition, position);
            }
            CardKind::Spell => {
                let effects = definition.effects().to_vec();
                for effect in effects {
                    self.apply_effect(
                        effect.as_ref(),
                        player,
                        Arc::clone(&definition),
                        None,
                        position,
                    );
                }
            }
        }
    }
}
