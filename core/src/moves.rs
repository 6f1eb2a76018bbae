//! Slide-and-merge logic.
//!
//! Every direction reduces to [`move_line_left`]: rows or columns moving
//! towards their high end are reversed, merged leftward, then mirrored back.
//! This keeps merge semantics identical in all four directions.

use rand::Rng;

use crate::tile::{tiles_in_column, tiles_in_row, Tile, TileId};
use crate::{Direction, BOARD_SIZE};

/// Merging into this value earns one undo charge.
pub const UNDO_CHARGE_VALUE: u32 = 128;

/// Outcome of moving a single row or column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMove {
    pub tiles: Vec<Tile>,
    pub earned_score: u32,
    pub earned_undoes: u32,
}

/// Outcome of moving the whole board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub tiles: Vec<Tile>,
    pub earned_score: u32,
    pub earned_undoes: u32,
}

/// Merge one compacted line towards its head.
///
/// `line` holds the tiles of a row (`horizontal`) or column in leftward
/// order; their own coordinates are ignored and the output is laid out from
/// slot 0 with `fixed` as the cross coordinate.
///
/// Equal neighbours merge into a new tile with a fresh id and the scan skips
/// both, so a merge result is never merged again in the same pass:
/// `[4, 4, 4]` becomes `[8, 4]`.
pub fn move_line_left<R: Rng + ?Sized>(
    line: &[Tile],
    horizontal: bool,
    fixed: u8,
    rng: &mut R,
) -> LineMove {
    let mut tiles = Vec::with_capacity(line.len());
    let mut earned_score: u32 = 0;
    let mut earned_undoes = 0;

    let mut i = 0;
    while i < line.len() {
        let slot = tiles.len() as u8;
        let (x, y) = if horizontal { (slot, fixed) } else { (fixed, slot) };
        let current = line[i];

        let merged = line
            .get(i + 1)
            .filter(|next| next.value == current.value)
            .and_then(|_| current.value.checked_mul(2));

        match merged {
            Some(value) => {
                tiles.push(Tile::new(TileId::random(rng), value, x, y));
                earned_score = earned_score.saturating_add(value);
                if value == UNDO_CHARGE_VALUE {
                    earned_undoes += 1;
                }
                i += 2;
            }
            None => {
                tiles.push(current.at(x, y));
                i += 1;
            }
        }
    }

    LineMove {
        tiles,
        earned_score,
        earned_undoes,
    }
}

/// Move one line in `direction`.
///
/// `line` must be sorted by its moving coordinate (left to right, or top to
/// bottom), as returned by [`tiles_in_row`] and [`tiles_in_column`].
pub fn move_tiles_in_line<R: Rng + ?Sized>(
    line: &[Tile],
    direction: Direction,
    fixed: u8,
    rng: &mut R,
) -> LineMove {
    let horizontal = direction.is_horizontal();
    if !direction.is_reversed() {
        return move_line_left(line, horizontal, fixed, rng);
    }

    let reversed: Vec<Tile> = line.iter().rev().copied().collect();
    let mut moved = move_line_left(&reversed, horizontal, fixed, rng);
    let last = BOARD_SIZE - 1;
    for tile in &mut moved.tiles {
        if horizontal {
            tile.x = last - tile.x;
        } else {
            tile.y = last - tile.y;
        }
    }
    moved
}

/// Move every row (left/right) or column (up/down) of the board and
/// aggregate the earned score and undo charges.
///
/// The caller decides whether the move is a no-op by comparing the result
/// with the input using [`crate::tiles_equal`].
pub fn move_tiles_in_direction<R: Rng + ?Sized>(
    tiles: &[Tile],
    direction: Direction,
    rng: &mut R,
) -> MoveResult {
    let mut result = MoveResult {
        tiles: Vec::with_capacity(tiles.len()),
        earned_score: 0,
        earned_undoes: 0,
    };

    for fixed in 0..BOARD_SIZE {
        let line = if direction.is_horizontal() {
            tiles_in_row(tiles, fixed)
        } else {
            tiles_in_column(tiles, fixed)
        };
        let moved = move_tiles_in_line(&line, direction, fixed, rng);
        result.tiles.extend(moved.tiles);
        result.earned_score = result.earned_score.saturating_add(moved.earned_score);
        result.earned_undoes += moved.earned_undoes;
    }

    result
}

// =============================================================================
// Tests
// =============================================================================
