#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Discrete action indexing for agents that play the arena battle.
//!
//! Every deployment is a `(hand slot, tile)` pair flattened into a single
//! index, with one extra index reserved for doing nothing. Tiles are counted
//! row by row from the acting player's own perspective: the top player's board
//! is rotated half a turn so that both players see their king tower on row
//! zero. Actions decode to tile centres.

use arena_battle_core::{PlayerId, Position, ARENA_HEIGHT, ARENA_WIDTH, HAND_SIZE};
use arena_battle_world::{query, BattleState};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Tile columns addressed by the action space.
pub const BOARD_WIDTH: u32 = ARENA_WIDTH;

/// Tile rows addressed by the action space.
pub const BOARD_HEIGHT: u32 = ARENA_HEIGHT;

/// Tiles per hand slot.
pub const NUM_TILES: usize = (BOARD_WIDTH * BOARD_HEIGHT) as usize;

/// Index of the action that deploys nothing.
pub const NO_OP_ACTION: usize = HAND_SIZE * NUM_TILES;

/// Total number of actions, no-op included.
pub const NUM_ACTIONS: usize = NO_OP_ACTION + 1;

/// Inputs that do not describe a deployment action.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// The hand slot is beyond the visible hand.
    #[error("hand slot {0} is out of range")]
    InvalidSlot(usize),
    /// The tile lies outside the board.
    #[error("tile ({x}, {y}) is outside the board")]
    OutOfBounds {
        /// Tile column.
        x: u32,
        /// Tile row.
        y: u32,
    },
}

/// Meaning of an action index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActionSelection {
    /// Do nothing this decision step.
    NoOp,
    /// Play the card in `slot` at the centre of a tile.
    Deploy {
        /// Hand slot holding the card.
        slot: usize,
        /// Tile column in arena coordinates.
        tile_x: u32,
        /// Tile row in arena coordinates.
        tile_y: u32,
        /// Centre of the tile in arena coordinates.
        position: Position,
    },
}

/// Maps action indices to deployments for one rules configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscreteTileActionSpace {
    canonical_perspective: bool,
}

impl Default for DiscreteTileActionSpace {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DiscreteTileActionSpace {
    /// Creates the action space. With `canonical_perspective` disabled both
    /// players address tiles in raw arena coordinates.
    #[must_use]
    pub const fn new(canonical_perspective: bool) -> Self {
        Self {
            canonical_perspective,
        }
    }

    /// Number of distinct actions.
    #[must_use]
    pub const fn len(&self) -> usize {
        NUM_ACTIONS
    }

    /// Always `false`; present for symmetry with [`Self::len`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    fn orient(&self, x: u32, y: u32, player: PlayerId) -> (u32, u32) {
        if self.canonical_perspective && player == PlayerId::TOP {
            (BOARD_WIDTH - 1 - x, BOARD_HEIGHT - 1 - y)
        } else {
            (x, y)
        }
    }

    /// Flattens a deployment of the card in `slot` onto the arena tile.
    pub fn encode_action(
        &self,
        slot: usize,
        tile_x: u32,
        tile_y: u32,
        player: PlayerId,
    ) -> Result<usize, ActionError> {
        if slot >= HAND_SIZE {
            return Err(ActionError::InvalidSlot(slot));
        }
        if tile_x >= BOARD_WIDTH || tile_y >= BOARD_HEIGHT {
            return Err(ActionError::OutOfBounds {
                x: tile_x,
                y: tile_y,
            });
        }
        let (cx, cy) = self.orient(tile_x, tile_y, player);
        let tile = (cy * BOARD_WIDTH + cx) as usize;
        Ok(slot * NUM_TILES + tile)
    }

    /// Interprets an action index. Indices outside the space decode to
    /// [`ActionSelection::NoOp`].
    #[must_use]
    pub fn decode_action(&self, action: usize, player: PlayerId) -> ActionSelection {
        if action >= NO_OP_ACTION {
            return ActionSelection::NoOp;
        }
        let slot = action / NUM_TILES;
        let tile = (action % NUM_TILES) as u32;
        let (tile_x, tile_y) = self.orient(tile % BOARD_WIDTH, tile / BOARD_WIDTH, player);
        ActionSelection::Deploy {
            slot,
            tile_x,
            tile_y,
            position: Position::new(tile_x as f32 + 0.5, tile_y as f32 + 0.5),
        }
    }

    /// Marks every action the player could take right now. The no-op is
    /// always legal.
    #[must_use]
    pub fn legal_action_mask(&self, battle: &BattleState, player: PlayerId) -> Vec<bool> {
        let mut mask = vec![false; NUM_ACTIONS];
        mask[NO_OP_ACTION] = true;
        if query::is_game_over(battle) {
            return mask;
        }

        let elixir = query::player(battle, player).elixir();
        for (slot, card) in query::hand(battle, player).iter().enumerate().take(HAND_SIZE) {
            let affordable = query::elixir_cost(battle, card)
                .is_some_and(|cost| cost as f32 <= elixir);
            if !affordable {
                continue;
            }
            let base = slot * NUM_TILES;
            for (offset, legal) in mask[base..base + NUM_TILES].iter_mut().enumerate() {
                if let ActionSelection::Deploy { position, .. } =
                    self.decode_action(base + offset, player)
                {
                    *legal = query::can_deploy(battle, player, card, position);
                }
            }
        }
        mask
    }

    /// Performs the action. Returns `false` when the deployment was refused;
    /// the no-op always succeeds.
    pub fn apply_action(&self, battle: &mut BattleState, player: PlayerId, action: usize) -> bool {
        let ActionSelection::Deploy { slot, position, .. } = self.decode_action(action, player)
        else {
            return true;
        };
        let Some(card) = query::hand(battle, player).get(slot).cloned() else {
            tracing::debug!(%player, slot, "action names an empty hand slot");
            return false;
        };
        battle.deploy_card(player, &card, position)
    }

    /// Draws uniformly among the currently legal actions.
    pub fn random_legal_action<R: Rng + ?Sized>(
        &self,
        battle: &BattleState,
        player: PlayerId,
        rng: &mut R,
    ) -> usize {
        let legal: Vec<usize> = self
            .legal_action_mask(battle, player)
            .iter()
            .enumerate()
            .filter_map(|(action, legal)| legal.then_some(action))
            .collect();
        legal.choose(rng).copied().unwrap_or(NO_OP_ACTION)
    }
}
