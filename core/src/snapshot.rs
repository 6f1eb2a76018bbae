//! The persisted form of a game.
//!
//! Field names follow the JSON layout the web front end stores
//! (`undoCharges`, `stateHistory`). The command queue and processing flag
//! are transient and never persisted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{GameState, HistoryEntry, MAX_HISTORY_SIZE};
use crate::status::GameStatus;
use crate::tile::{is_valid_value, Tile, MAX_TILE_VALUE};
use crate::BOARD_SIZE;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not a saved game: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tile at ({x}, {y}) is outside the board")]
    TileOutOfBounds { x: u8, y: u8 },
    #[error("tile value {0} is not a power of two between 2 and {max}", max = MAX_TILE_VALUE)]
    InvalidValue(u32),
    #[error("more than one tile at ({x}, {y})")]
    Overlap { x: u8, y: u8 },
    #[error("history holds {0} entries, at most {max} are kept", max = MAX_HISTORY_SIZE)]
    HistoryTooLong(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub tiles: Vec<Tile>,
    pub score: u32,
    pub status: GameStatus,
    pub undo_charges: u32,
    pub state_history: Vec<HistoryEntry>,
}

impl SavedGame {
    pub fn encode(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a stored snapshot.
    pub fn decode(raw: &str) -> Result<SavedGame, SnapshotError> {
        let saved: SavedGame = serde_json::from_str(raw)?;
        saved.validate()?;
        Ok(saved)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        if self.state_history.len() > MAX_HISTORY_SIZE {
            return Err(SnapshotError::HistoryTooLong(self.state_history.len()));
        }
        validate_tiles(&self.tiles)?;
        for entry in &self.state_history {
            validate_tiles(&entry.tiles)?;
        }
        Ok(())
    }

    /// Rebuild a live state with an empty command queue.
    pub fn into_state(self) -> GameState {
        GameState {
            tiles: self.tiles,
            score: self.score,
            status: self.status,
            undo_charges: self.undo_charges,
            state_history: self.state_history.into(),
            ..GameState::default()
        }
    }
}

impl From<&GameState> for SavedGame {
    fn from(state: &GameState) -> Self {
        SavedGame {
            tiles: state.tiles.clone(),
            score: state.score,
            status: state.status,
            undo_charges: state.undo_charges,
            state_history: state.state_history.iter().cloned().collect(),
        }
    }
}

fn validate_tiles(tiles: &[Tile]) -> Result<(), SnapshotError> {
    let mut occupied = HashSet::with_capacity(tiles.len());
    for tile in tiles {
        if tile.x >= BOARD_SIZE || tile.y >= BOARD_SIZE {
            return Err(SnapshotError::TileOutOfBounds { x: tile.x, y: tile.y });
        }
        if !is_valid_value(tile.value) {
            return Err(SnapshotError::InvalidValue(tile.value));
        }
        if !occupied.insert((tile.x, tile.y)) {
            return Err(SnapshotError::Overlap { x: tile.x, y: tile.y });
        }
    }
    Ok(())
}
