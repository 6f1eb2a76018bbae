//! The game state machine.
//!
//! [`reduce`] maps `(state, action)` to the next state. States are shared
//! behind [`Arc`] and never mutated after construction; a transition that
//! changes nothing hands back the same allocation, so callers detect change
//! with [`Arc::ptr_eq`].

use std::collections::VecDeque;
use std::sync::Arc;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::moves::move_tiles_in_direction;
use crate::spawn::{add_new_tile, initial_tiles};
use crate::status::{get_status, GameStatus};
use crate::tile::{tiles_equal, Tile};
use crate::Direction;

/// Direction commands beyond this many pending ones are dropped.
pub const MAX_QUEUED_COMMANDS: usize = 3;

/// Number of pre-move snapshots kept for undo.
pub const MAX_HISTORY_SIZE: usize = 15;

/// Board and score before an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tiles: Vec<Tile>,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Discard everything and deal a fresh two-tile board.
    NewGame,
    /// Append a direction to the command queue unless it is full.
    QueueCommand(Direction),
    /// Mark the front command as in flight.
    StartProcessing,
    /// Pop the front command and clear the in-flight mark.
    FinishProcessing,
    Move(Direction),
    /// Spend one charge to restore the latest history entry.
    Undo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub tiles: Vec<Tile>,
    pub score: u32,
    pub status: GameStatus,
    pub command_queue: VecDeque<Direction>,
    pub is_processing_command: bool,
    pub undo_charges: u32,
    pub state_history: VecDeque<HistoryEntry>,
}

impl GameState {
    /// A fresh game: two tiles, score 0, status playing.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        GameState {
            tiles: initial_tiles(rng),
            status: GameStatus::Playing,
            ..GameState::default()
        }
    }

    /// Undo needs both a charge and something to go back to.
    pub fn can_undo(&self) -> bool {
        self.undo_charges > 0 && !self.state_history.is_empty()
    }

    /// Largest tile value on the board, 0 when empty.
    pub fn max_tile(&self) -> u32 {
        self.tiles.iter().map(|t| t.value).max().unwrap_or(0)
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Score: {}   Undo charges: {}", self.score, self.undo_charges)?;
        writeln!(f, "+------+------+------+------+")?;
        let grid = crate::coords::to_grid(&self.tiles);
        for row in grid.chunks(4) {
            write!(f, "|")?;
            for cell in row {
                match cell {
                    Some(value) => write!(f, "{:^6}|", value)?,
                    None => write!(f, "      |")?,
                }
            }
            writeln!(f)?;
            writeln!(f, "+------+------+------+------+")?;
        }
        Ok(())
    }
}

/// Apply one action.
///
/// Total over the state space: impossible actions (undo without a charge,
/// a move that changes nothing, a command while the queue is full) return
/// `Arc::clone(state)`.
pub fn reduce<R: Rng + ?Sized>(
    state: &Arc<GameState>,
    action: Action,
    rng: &mut R,
) -> Arc<GameState> {
    match action {
        Action::NewGame => Arc::new(GameState::new(rng)),

        Action::QueueCommand(direction) => {
            if state.command_queue.len() >= MAX_QUEUED_COMMANDS {
                return Arc::clone(state);
            }
            let mut next = GameState::clone(state);
            next.command_queue.push_back(direction);
            Arc::new(next)
        }

        Action::StartProcessing => {
            if state.is_processing_command {
                return Arc::clone(state);
            }
            let mut next = GameState::clone(state);
            next.is_processing_command = true;
            Arc::new(next)
        }

        Action::FinishProcessing => {
            let mut next = GameState::clone(state);
            next.command_queue.pop_front();
            next.is_processing_command = false;
            Arc::new(next)
        }

        Action::Move(direction) => apply_move(state, direction, rng),

        Action::Undo => {
            if !state.can_undo() {
                return Arc::clone(state);
            }
            let mut next = GameState::clone(state);
            let Some(previous) = next.state_history.pop_back() else {
                return Arc::clone(state);
            };
            next.status = get_status(&previous.tiles);
            next.tiles = previous.tiles;
            next.score = previous.score;
            next.undo_charges -= 1;
            debug!(
                "undo: score {} -> {}, {} charges left",
                state.score, next.score, next.undo_charges
            );
            Arc::new(next)
        }
    }
}

fn apply_move<R: Rng + ?Sized>(
    state: &Arc<GameState>,
    direction: Direction,
    rng: &mut R,
) -> Arc<GameState> {
    let moved = move_tiles_in_direction(&state.tiles, direction, rng);
    if tiles_equal(&state.tiles, &moved.tiles) {
        return Arc::clone(state);
    }

    let tiles = add_new_tile(&moved.tiles, rng).into_owned();

    let mut next = GameState::clone(state);
    next.state_history.push_back(HistoryEntry {
        tiles: state.tiles.clone(),
        score: state.score,
    });
    while next.state_history.len() > MAX_HISTORY_SIZE {
        next.state_history.pop_front();
    }
    next.status = get_status(&tiles);
    next.tiles = tiles;
    next.score = state.score.saturating_add(moved.earned_score);
    next.undo_charges = state.undo_charges.saturating_add(moved.earned_undoes);

    debug!(
        "move {direction}: +{} points, +{} charges, status {}",
        moved.earned_score, moved.earned_undoes, next.status
    );
    Arc::new(next)
}

// =============================================================================
// Tests
// =============================================================================
