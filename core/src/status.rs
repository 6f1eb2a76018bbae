//! Win/lose detection.

use serde::{Deserialize, Serialize};

use crate::coords::{coords_to_index, to_grid};
use crate::moves::move_tiles_in_direction;
use crate::tile::{tiles_equal, Tile};
use crate::{Direction, BOARD_SIZE, CELL_COUNT};

/// Reaching this value wins the game.
pub const WIN_VALUE: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Idle,
    Playing,
    Win,
    Lose,
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameStatus::Idle => "idle",
            GameStatus::Playing => "playing",
            GameStatus::Win => "win",
            GameStatus::Lose => "lose",
        };
        f.write_str(name)
    }
}

/// Win takes precedence: a board holding 2048 reports `Win` even when it is
/// otherwise blocked.
pub fn get_status(tiles: &[Tile]) -> GameStatus {
    if tiles.iter().any(|tile| tile.value == WIN_VALUE) {
        return GameStatus::Win;
    }
    if !has_available_moves(tiles) {
        return GameStatus::Lose;
    }
    GameStatus::Playing
}

/// True while an empty cell exists or two neighbouring tiles share a value.
///
/// Only right and below neighbours are checked; adjacency is symmetric.
pub fn has_available_moves(tiles: &[Tile]) -> bool {
    if tiles.len() < CELL_COUNT {
        return true;
    }

    let grid = to_grid(tiles);
    if grid.iter().any(Option::is_none) {
        return true;
    }

    let neighbours_match = |a: Option<usize>, b: Option<usize>| match (a, b) {
        (Some(a), Some(b)) => grid[a] == grid[b],
        _ => false,
    };

    for y in 0..BOARD_SIZE {
        for x in 0..BOARD_SIZE {
            let here = coords_to_index(x, y);
            if neighbours_match(here, coords_to_index(x + 1, y))
                || neighbours_match(here, coords_to_index(x, y + 1))
            {
                return true;
            }
        }
    }
    false
}

/// Whether moving in `direction` would change the layout.
pub fn can_move(tiles: &[Tile], direction: Direction) -> bool {
    // Ids drawn here are thrown away, so a throwaway RNG keeps the caller's
    // stream untouched.
    let mut rng = rand::rngs::mock::StepRng::new(0, 1);
    let moved = move_tiles_in_direction(tiles, direction, &mut rng);
    !tiles_equal(tiles, &moved.tiles)
}

/// Legality of each direction as `[Up, Down, Left, Right]`.
pub fn legal_directions(tiles: &[Tile]) -> [bool; 4] {
    Direction::all().map(|direction| can_move(tiles, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::board;

    #[test]
    fn test_playing_with_empty_cells() {
        let tiles = board([2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4]);
        assert_eq!(get_status(&tiles), GameStatus::Playing);
    }

    #[test]
    fn test_lose_when_blocked() {
        let tiles = board([2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]);
        assert!(!has_available_moves(&tiles));
        assert_eq!(get_status(&tiles), GameStatus::Lose);
        assert_eq!(legal_directions(&tiles), [false, false, false, false]);
    }

    #[test]
    fn test_not_over_can_merge_horizontal() {
        let tiles = board([2, 2, 4, 8, 4, 8, 16, 32, 8, 16, 32, 64, 16, 32, 64, 128]);
        assert!(has_available_moves(&tiles));
        assert_eq!(get_status(&tiles), GameStatus::Playing);
    }

    #[test]
    fn test_not_over_can_merge_vertical() {
        let tiles = board([2, 4, 8, 16, 2, 8, 16, 32, 4, 16, 32, 64, 8, 32, 64, 128]);
        assert!(has_available_moves(&tiles));
    }

    #[test]
    fn test_not_over_merge_in_last_row_and_column() {
        let last_row = board([2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 8, 8]);
        assert!(has_available_moves(&last_row));

        let last_column = board([2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 8, 4, 2, 4, 8]);
        assert!(has_available_moves(&last_column));
    }

    #[test]
    fn test_win_takes_precedence_over_lose() {
        let tiles = board([2048, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]);
        assert!(!has_available_moves(&tiles));
        assert_eq!(get_status(&tiles), GameStatus::Win);
    }

    #[test]
    fn test_legal_directions() {
        let tiles = board([2, 0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 0, 16, 0, 0, 0]);
        assert_eq!(legal_directions(&tiles), [false, false, false, true]);
        assert!(can_move(&tiles, Direction::Right));
        assert!(!can_move(&tiles, Direction::Up));
    }

    #[test]
    fn test_status_names() {
        assert_eq!(GameStatus::Win.to_string(), "win");
        assert_eq!(GameStatus::default(), GameStatus::Idle);
    }
}
