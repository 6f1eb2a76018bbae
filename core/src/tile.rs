//! Tiles as positioned, uniquely identified values, and the queries the move
//! logic runs over a tile set.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coords::to_grid;
use crate::BOARD_SIZE;

/// Opaque tile identifier. A fresh one is drawn for every spawned tile and
/// for every merge result; moved tiles keep theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(Uuid);

impl TileId {
    /// Draw a v4 identifier from the engine RNG, so a seeded game produces
    /// the same identifiers every run.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        TileId(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
    }

    /// The all-zero identifier, useful for fixtures.
    pub fn nil() -> Self {
        TileId(Uuid::nil())
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub value: u32,
    pub x: u8,
    pub y: u8,
}

impl Tile {
    pub fn new(id: TileId, value: u32, x: u8, y: u8) -> Self {
        Tile { id, value, x, y }
    }

    /// Same tile carried to another cell.
    pub fn at(self, x: u8, y: u8) -> Self {
        Tile { x, y, ..self }
    }
}

/// Largest tile a 4x4 board can ever hold.
pub const MAX_TILE_VALUE: u32 = 1 << 17;

/// Tile values are powers of two from 2 up to [`MAX_TILE_VALUE`].
pub fn is_valid_value(value: u32) -> bool {
    (2..=MAX_TILE_VALUE).contains(&value) && value.is_power_of_two()
}

/// Tile at `(x, y)`, if any.
pub fn find_tile_at(tiles: &[Tile], x: u8, y: u8) -> Option<&Tile> {
    tiles.iter().find(|tile| tile.x == x && tile.y == y)
}

/// Tiles in column `x`, top to bottom.
pub fn tiles_in_column(tiles: &[Tile], x: u8) -> Vec<Tile> {
    let mut column: Vec<Tile> = tiles.iter().filter(|t| t.x == x).copied().collect();
    column.sort_by_key(|t| t.y);
    column
}

/// Tiles in row `y`, left to right.
pub fn tiles_in_row(tiles: &[Tile], y: u8) -> Vec<Tile> {
    let mut row: Vec<Tile> = tiles.iter().filter(|t| t.y == y).copied().collect();
    row.sort_by_key(|t| t.x);
    row
}

/// Unoccupied cells in row-major order.
pub fn empty_positions(tiles: &[Tile]) -> Vec<(u8, u8)> {
    let mut empty = Vec::with_capacity(16 - tiles.len().min(16));
    for y in 0..BOARD_SIZE {
        for x in 0..BOARD_SIZE {
            if find_tile_at(tiles, x, y).is_none() {
                empty.push((x, y));
            }
        }
    }
    empty
}

/// Two tile sets are equal when every cell holds the same value. Identifiers
/// are ignored.
pub fn tiles_equal(a: &[Tile], b: &[Tile]) -> bool {
    a.len() == b.len() && to_grid(a) == to_grid(b)
}
