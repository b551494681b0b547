//! High-level generation orchestration: footprint handling, the collapse
//! loop, and the failsafe bound.

use crate::rng::LevelRng;
use crate::types::{Connection, RawTile};

use super::wave::{self, WaveCell};

/// Requested grid footprint. Only square grids are produced: `Bounds`
/// collapses to a single side length of `width * height`, mirroring the
/// level format this generator feeds. `Square` wins when both could apply
/// because callers choose the variant explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Footprint {
    Square(usize),
    Bounds { width: usize, height: usize },
}

impl Footprint {
    /// Side length of the produced square grid, clamped to at least 1.
    pub fn side_length(self) -> usize {
        match self {
            Footprint::Square(dim) => dim.max(1),
            Footprint::Bounds { width, height } => (width * height).max(1),
        }
    }
}

pub struct LevelGenerator {
    dim: usize,
    failsafe_limit: u32,
    rng: LevelRng,
}

impl LevelGenerator {
    pub fn new(footprint: Footprint, seed: u64) -> Self {
        let dim = footprint.side_length();
        Self { dim, failsafe_limit: (2 + dim * dim) as u32, rng: LevelRng::seeded(seed) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Runs the collapse loop until every cell is resolved or the failsafe
    /// is exhausted, and always returns exactly dim*dim tiles. Cells still
    /// uncollapsed at the bound contribute the placeholder tile; re-rolling
    /// a degenerate grid is the caller's policy, not the generator's.
    ///
    /// Successive calls advance the internal rng and yield fresh grids.
    pub fn generate(&mut self) -> Vec<RawTile> {
        let mut cells = wave::seed_cells(self.dim);
        let mut failsafe = 0u32;
        loop {
            wave::collapse_cycle(&mut cells, self.dim, &mut self.rng);
            if cells.iter().all(|cell| cell.collapsed) {
                break;
            }
            if failsafe >= self.failsafe_limit {
                break;
            }
            failsafe += 1;
        }
        cells.into_iter().map(finish_cell).collect()
    }
}

fn finish_cell(cell: WaveCell) -> RawTile {
    let connections = cell.connections.unwrap_or_else(|| vec![Connection::placeholder()]);
    RawTile { id: cell.id, connections }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::super::rules;
    use super::*;
    use crate::types::{Direction, canonical_bytes};

    #[test]
    fn square_footprint_yields_dim_squared_sequential_tiles() {
        let tiles = LevelGenerator::new(Footprint::Square(4), 2026).generate();
        assert_eq!(tiles.len(), 16);
        for (index, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.id as usize, index + 1);
        }
    }

    #[test]
    fn bounds_footprint_collapses_to_a_single_square_side() {
        let generator = LevelGenerator::new(Footprint::Bounds { width: 2, height: 3 }, 1);
        assert_eq!(generator.dim(), 6);
    }

    #[test]
    fn same_seed_produces_byte_identical_levels() {
        let left = LevelGenerator::new(Footprint::Square(5), 88_001).generate();
        let right = LevelGenerator::new(Footprint::Square(5), 88_001).generate();
        assert_eq!(canonical_bytes(&left), canonical_bytes(&right));
    }

    #[test]
    fn changing_the_seed_changes_the_level() {
        let left = LevelGenerator::new(Footprint::Square(5), 7).generate();
        let right = LevelGenerator::new(Footprint::Square(5), 8).generate();
        assert_ne!(canonical_bytes(&left), canonical_bytes(&right));
    }

    #[test]
    fn successive_generations_advance_the_stream() {
        let mut generator = LevelGenerator::new(Footprint::Square(5), 41);
        let first = generator.generate();
        let second = generator.generate();
        assert_eq!(first.len(), 25);
        assert_eq!(second.len(), 25);
        assert_ne!(canonical_bytes(&first), canonical_bytes(&second));
    }

    #[test]
    fn a_one_by_one_grid_exhausts_the_failsafe_into_a_placeholder() {
        // Every pair exposes at least one edge and every edge crosses the
        // boundary, so the single cell can never collapse.
        let tiles = LevelGenerator::new(Footprint::Square(1), 9).generate();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].connections, vec![Connection::placeholder()]);
    }

    fn matches_some_rule_pair(tile: &RawTile) -> bool {
        if tile.connections.len() == 1 && tile.connections[0].is_placeholder() {
            return true;
        }
        let directions: Vec<Direction> =
            tile.connections.iter().filter_map(|connection| connection.direction).collect();
        rules::all_pairs().into_iter().any(|(shape, orientation)| {
            rules::exposed_directions(shape, orientation) == directions.as_slice()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn generated_grids_hold_their_structural_guarantees(
            seed in any::<u64>(),
            dim in 2_usize..=6
        ) {
            let tiles = super::super::generate_level(Footprint::Square(dim), seed);
            prop_assert_eq!(tiles.len(), dim * dim);

            for (index, tile) in tiles.iter().enumerate() {
                prop_assert_eq!(tile.id as usize, index + 1);
                prop_assert!(
                    matches_some_rule_pair(tile),
                    "tile {} carries a connection set outside the rule table",
                    tile.id
                );
                for connection in &tile.connections {
                    prop_assert!((connection.target as usize) <= dim * dim);
                    if connection.direction.is_none() {
                        prop_assert_eq!(connection.target, 0);
                    }
                }
            }
        }
    }
}
