//! Addressing helpers between linear cell indices and `(column, row)` pairs,
//! plus the dense grid projection of a tile set.
//!
//! The grid is stored in row-major order: indices 0-3 are row 0, 4-7 are
//! row 1, and so on. Empty cells are `None`.

use crate::tile::Tile;
use crate::{BOARD_SIZE, CELL_COUNT};

/// Dense 16-cell view of the board.
pub type Grid = [Option<u32>; CELL_COUNT];

/// Convert a linear index to `(column, row)`. `None` outside `0..16`.
pub fn index_to_coords(index: usize) -> Option<(u8, u8)> {
    if index >= CELL_COUNT {
        return None;
    }
    let size = BOARD_SIZE as usize;
    Some(((index % size) as u8, (index / size) as u8))
}

/// Convert `(column, row)` to a linear index. `None` if either is outside `0..4`.
pub fn coords_to_index(col: u8, row: u8) -> Option<usize> {
    if col >= BOARD_SIZE || row >= BOARD_SIZE {
        return None;
    }
    Some(col as usize + row as usize * BOARD_SIZE as usize)
}

/// Project a tile set onto a dense grid.
pub fn to_grid(tiles: &[Tile]) -> Grid {
    let mut grid = [None; CELL_COUNT];
    for tile in tiles {
        if let Some(index) = coords_to_index(tile.x, tile.y) {
            grid[index] = Some(tile.value);
        }
    }
    grid
}

/// Value stored at `(col, row)`, or `None` for empty or out-of-range cells.
pub fn grid_cell(grid: &Grid, col: u8, row: u8) -> Option<u32> {
    coords_to_index(col, row).and_then(|index| grid[index])
}

/// One row of the grid, left to right.
pub fn grid_row(grid: &Grid, row: u8) -> [Option<u32>; 4] {
    [0, 1, 2, 3].map(|col| grid_cell(grid, col, row))
}

/// One column of the grid, top to bottom.
pub fn grid_column(grid: &Grid, col: u8) -> [Option<u32>; 4] {
    [0, 1, 2, 3].map(|row| grid_cell(grid, col, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileId;

    #[test]
    fn test_index_to_coords() {
        assert_eq!(index_to_coords(0), Some((0, 0)));
        assert_eq!(index_to_coords(5), Some((1, 1)));
        assert_eq!(index_to_coords(15), Some((3, 3)));
        assert_eq!(index_to_coords(16), None);
    }

    #[test]
    fn test_coords_to_index() {
        assert_eq!(coords_to_index(0, 0), Some(0));
        assert_eq!(coords_to_index(3, 1), Some(7));
        assert_eq!(coords_to_index(3, 3), Some(15));
        assert_eq!(coords_to_index(4, 0), None);
        assert_eq!(coords_to_index(0, 4), None);
    }

    #[test]
    fn test_addressing_is_inverse_on_valid_domain() {
        for index in 0..CELL_COUNT {
            let (col, row) = index_to_coords(index).unwrap();
            assert_eq!(coords_to_index(col, row), Some(index));
        }
    }

    #[test]
    fn test_grid_projection() {
        let tiles = vec![
            Tile::new(TileId::nil(), 2, 0, 0),
            Tile::new(TileId::nil(), 8, 3, 1),
            Tile::new(TileId::nil(), 4, 1, 3),
        ];
        let grid = to_grid(&tiles);

        assert_eq!(grid[0], Some(2));
        assert_eq!(grid[7], Some(8));
        assert_eq!(grid[13], Some(4));
        assert_eq!(grid.iter().filter(|c| c.is_some()).count(), 3);
        assert_eq!(grid_row(&grid, 1), [None, None, None, Some(8)]);
        assert_eq!(grid_column(&grid, 1), [None, None, None, Some(4)]);
        assert_eq!(grid_cell(&grid, 9, 9), None);
    }
}
