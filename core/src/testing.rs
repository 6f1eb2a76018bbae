//! Board fixtures shared by the unit tests.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::coords::{index_to_coords, to_grid};
use crate::tile::{Tile, TileId};
use crate::CELL_COUNT;

/// Build a tile set from a row-major array where 0 marks an empty cell.
pub(crate) fn board(values: [u32; CELL_COUNT]) -> Vec<Tile> {
    let mut rng = SmallRng::seed_from_u64(0xB0A4D);
    values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v != 0)
        .filter_map(|(i, &v)| {
            let (x, y) = index_to_coords(i)?;
            Some(Tile::new(TileId::random(&mut rng), v, x, y))
        })
        .collect()
}

/// Row-major values of a tile set, 0 for empty cells.
pub(crate) fn values(tiles: &[Tile]) -> [u32; CELL_COUNT] {
    to_grid(tiles).map(|cell| cell.unwrap_or(0))
}

pub(crate) fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}
