//! # 2048 Game Core Engine
//!
//! The move/merge engine of 2048 on a sparse tile representation: every tile
//! carries a stable identity across moves so front ends can animate it. On
//! top of the pure move logic sits a reducer-style state machine with a
//! bounded undo history, undo charges earned on 128-merges and a paced
//! command queue.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use merge_2048_core::{Direction, Game, MemoryStore};
//!
//! let mut game = Game::new(42, MemoryStore::default());
//! game.queue_command(Direction::Left, Duration::ZERO);
//! game.tick(Duration::from_millis(150));
//! println!("Score: {}, Status: {}", game.state().score, game.state().status);
//! ```

use serde::{Deserialize, Serialize};

pub mod coords;
pub mod input;
pub mod moves;
pub mod session;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod status;
pub mod storage;
pub mod tile;

#[cfg(test)]
mod testing;

pub use coords::{coords_to_index, index_to_coords, to_grid, Grid};
pub use input::{swipe_direction, InputGate, Overlay, MIN_SWIPE_DISTANCE};
pub use moves::{move_line_left, move_tiles_in_direction, move_tiles_in_line, LineMove, MoveResult};
pub use session::{Game, MOVE_DELAY};
pub use snapshot::{SavedGame, SnapshotError};
pub use spawn::{add_new_tile, initial_tiles, random_tile_value};
pub use state::{reduce, Action, GameState, HistoryEntry, MAX_HISTORY_SIZE, MAX_QUEUED_COMMANDS};
pub use status::{get_status, has_available_moves, GameStatus, WIN_VALUE};
pub use storage::{MemoryStore, NoStore, SnapshotStore, StoreError, STORAGE_KEY};
pub use tile::{tiles_equal, Tile, TileId, MAX_TILE_VALUE};

/// Width and height of the board.
pub const BOARD_SIZE: u8 = 4;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 16;

/// The four possible move directions in 2048.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// Convert a u8 to a Direction (0=Up, 1=Down, 2=Left, 3=Right).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    /// Map a browser `KeyboardEvent.key` name to a direction.
    pub fn from_key_name(key: &str) -> Option<Direction> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Get all four directions.
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    /// Left and right move along rows; up and down along columns.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Right and down slide towards the high end of a line, so the line is
    /// reversed before merging and mirrored back afterwards.
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Tests
// =============================================================================
