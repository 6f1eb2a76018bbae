//! New-tile spawning.

use std::borrow::Cow;

use rand::Rng;

use crate::tile::{empty_positions, Tile, TileId};

/// Probability that a spawned tile is a 2 rather than a 4.
pub const TWO_PROBABILITY: f32 = 0.9;

/// 90% chance of 2, 10% chance of 4.
pub fn random_tile_value<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen::<f32>() < TWO_PROBABILITY {
        2
    } else {
        4
    }
}

/// Add one tile at a uniformly random empty cell.
///
/// A full board is returned as-is (`Cow::Borrowed`), so callers can tell the
/// passthrough apart from a spawn without comparing contents.
pub fn add_new_tile<'a, R: Rng + ?Sized>(tiles: &'a [Tile], rng: &mut R) -> Cow<'a, [Tile]> {
    let empty = empty_positions(tiles);
    if empty.is_empty() {
        return Cow::Borrowed(tiles);
    }

    let (x, y) = empty[rng.gen_range(0..empty.len())];
    let value = random_tile_value(rng);

    let mut next = Vec::with_capacity(tiles.len() + 1);
    next.extend_from_slice(tiles);
    next.push(Tile::new(TileId::random(rng), value, x, y));
    Cow::Owned(next)
}

/// The two-tile opening position.
pub fn initial_tiles<R: Rng + ?Sized>(rng: &mut R) -> Vec<Tile> {
    let first = add_new_tile(&[], rng).into_owned();
    add_new_tile(&first, rng).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{board, rng, values};
    use crate::tile::tiles_equal;

    #[test]
    fn test_spawn_into_last_empty_cell() {
        let tiles = board([2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 0, 4, 4, 2, 4, 2]);
        let spawned = add_new_tile(&tiles, &mut rng());

        assert_eq!(spawned.len(), 16);
        assert!(empty_positions(&spawned).is_empty());
        let new_value = values(&spawned)[10];
        assert!(new_value == 2 || new_value == 4);
    }

    #[test]
    fn test_full_board_is_passed_through() {
        let tiles = board([2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]);
        let spawned = add_new_tile(&tiles, &mut rng());

        assert!(matches!(spawned, Cow::Borrowed(_)));
        assert!(std::ptr::eq(spawned.as_ptr(), tiles.as_ptr()));
    }

    #[test]
    fn test_spawn_keeps_existing_tiles() {
        let tiles = board([2, 0, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let spawned = add_new_tile(&tiles, &mut rng());

        assert_eq!(spawned.len(), 3);
        assert_eq!(&spawned[..2], &tiles[..]);
        assert!(!tiles_equal(&spawned, &tiles));
    }

    #[test]
    fn test_value_distribution() {
        let mut rng = rng();
        let fours = (0..10_000)
            .filter(|_| random_tile_value(&mut rng) == 4)
            .count();
        assert!((700..1300).contains(&fours), "got {fours} fours");
    }

    #[test]
    fn test_spawn_positions_cover_the_board() {
        let mut rng = rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            let tile = add_new_tile(&[], &mut rng)[0];
            seen.insert((tile.x, tile.y));
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn test_initial_tiles() {
        let tiles = initial_tiles(&mut rng());
        assert_eq!(tiles.len(), 2);
        assert_ne!((tiles[0].x, tiles[0].y), (tiles[1].x, tiles[1].y));
        assert_ne!(tiles[0].id, tiles[1].id);
    }

    #[test]
    fn test_spawn_determinism() {
        let a = initial_tiles(&mut rng());
        let b = initial_tiles(&mut rng());
        assert_eq!(a, b);
    }
}
