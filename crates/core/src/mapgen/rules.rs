//! Static connection rule table: which compass edges each (shape,
//! orientation) pair exposes. Pure data, no state.

use crate::types::Direction::{East, North, South, West};
use crate::types::{Direction, Orientation, TileShape};

/// Ordered exposed-edge set for a pair. The order is load-bearing: connection
/// lists and candidate unions must come out in a stable order.
pub fn exposed_directions(shape: TileShape, orientation: Orientation) -> &'static [Direction] {
    match (shape, orientation) {
        (TileShape::Open, _) => &[North, East, South, West],
        (TileShape::Closed, Orientation::North) => &[North],
        (TileShape::Closed, Orientation::East) => &[East],
        (TileShape::Closed, Orientation::South) => &[South],
        (TileShape::Closed, Orientation::West) => &[West],
        (TileShape::T, Orientation::North) => &[North, East, West],
        (TileShape::T, Orientation::East) => &[East, North, South],
        (TileShape::T, Orientation::South) => &[South, East, West],
        (TileShape::T, Orientation::West) => &[West, North, South],
        (TileShape::L, Orientation::North) => &[North, East],
        (TileShape::L, Orientation::East) => &[East, South],
        (TileShape::L, Orientation::South) => &[South, West],
        (TileShape::L, Orientation::West) => &[West, North],
        (TileShape::I, Orientation::North | Orientation::South) => &[North, South],
        (TileShape::I, Orientation::East | Orientation::West) => &[East, West],
    }
}

pub fn exposes(shape: TileShape, orientation: Orientation, direction: Direction) -> bool {
    exposed_directions(shape, orientation).contains(&direction)
}

/// All 20 pairs, shape-major then orientation order.
pub fn all_pairs() -> Vec<(TileShape, Orientation)> {
    let mut pairs = Vec::with_capacity(TileShape::ALL.len() * Orientation::ALL.len());
    for shape in TileShape::ALL {
        for orientation in Orientation::ALL {
            pairs.push((shape, orientation));
        }
    }
    pairs
}

/// Pairs exposing `direction`, in `all_pairs` order.
pub fn pairs_exposing(direction: Direction) -> Vec<(TileShape, Orientation)> {
    all_pairs()
        .into_iter()
        .filter(|&(shape, orientation)| exposes(shape, orientation, direction))
        .collect()
}

/// Complement of [`pairs_exposing`], in `all_pairs` order.
pub fn pairs_not_exposing(direction: Direction) -> Vec<(TileShape, Orientation)> {
    all_pairs()
        .into_iter()
        .filter(|&(shape, orientation)| !exposes(shape, orientation, direction))
        .collect()
}
