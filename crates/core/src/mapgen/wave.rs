//! Generation-time cells and the collapse/propagation cycle.

use crate::rng::LevelRng;
use crate::types::{Connection, Direction, INVALID_TILE, Orientation, TileId, TileShape};

use super::rules;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct WaveCell {
    pub id: TileId,
    pub collapsed: bool,
    pub options: Vec<(TileShape, Orientation)>,
    /// Present only once the cell has collapsed.
    pub connections: Option<Vec<Connection>>,
}

/// Seeds the full grid. Every cell starts with the whole rule table minus any
/// pair exposing an edge that would cross the grid boundary at its position;
/// filtering is by exclusion, so a pair survives as long as it exposes none
/// of the forbidden edges.
pub(super) fn seed_cells(dim: usize) -> Vec<WaveCell> {
    let mut cells = Vec::with_capacity(dim * dim);
    for index in 0..dim * dim {
        let row = index / dim;
        let column = index % dim;

        let mut forbidden = Vec::new();
        if row == 0 {
            forbidden.push(Direction::North);
        }
        if row == dim - 1 {
            forbidden.push(Direction::South);
        }
        if column == 0 {
            forbidden.push(Direction::West);
        }
        if column == dim - 1 {
            forbidden.push(Direction::East);
        }

        let options = rules::all_pairs()
            .into_iter()
            .filter(|&(shape, orientation)| {
                !forbidden.iter().any(|&direction| rules::exposes(shape, orientation, direction))
            })
            .collect();

        cells.push(WaveCell {
            id: index as TileId + 1,
            collapsed: false,
            options,
            connections: None,
        });
    }
    cells
}

/// One collapse cycle: pick the lowest-entropy cell with a uniform random
/// tie-break, collapse it to a single option, then recompute every
/// still-uncollapsed cell into a fresh next-generation array.
pub(super) fn collapse_cycle(cells: &mut Vec<WaveCell>, dim: usize, rng: &mut LevelRng) {
    if let Some(cell_index) = lowest_entropy_cell(cells, rng) {
        // A cell with an empty option set cannot collapse this cycle; the
        // fresh recompute below may hand it options again.
        if let Some(&(shape, orientation)) = rng.pick(&cells[cell_index].options) {
            let cell = &mut cells[cell_index];
            cell.collapsed = true;
            cell.options = vec![(shape, orientation)];
            cell.connections = Some(resolve_connections(cell.id, shape, orientation, dim));
        }
    }
    *cells = next_generation(cells, dim);
}

/// Minimum option-count among uncollapsed cells, random pick among the tied.
fn lowest_entropy_cell(cells: &[WaveCell], rng: &mut LevelRng) -> Option<usize> {
    let minimum = cells.iter().filter(|cell| !cell.collapsed).map(|cell| cell.options.len()).min()?;
    let tied: Vec<usize> = cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| !cell.collapsed && cell.options.len() == minimum)
        .map(|(index, _)| index)
        .collect();
    rng.pick(&tied).copied()
}

/// Row-major neighbor arithmetic: N = id-D, E = id+1, S = id+D, W = id-1.
/// Targets outside [1, D^2] stay the invalid id; in-range wrap-around from
/// the +/-1 arithmetic is kept untouched for wire compatibility.
fn resolve_connections(
    id: TileId,
    shape: TileShape,
    orientation: Orientation,
    dim: usize,
) -> Vec<Connection> {
    let dim = dim as i64;
    let cell_id = id as i64;
    rules::exposed_directions(shape, orientation)
        .iter()
        .map(|&direction| {
            let target = match direction {
                Direction::North => cell_id - dim,
                Direction::East => cell_id + 1,
                Direction::South => cell_id + dim,
                Direction::West => cell_id - 1,
            };
            let target =
                if (1..=dim * dim).contains(&target) { target as TileId } else { INVALID_TILE };
            Connection { direction: Some(direction), target }
        })
        .collect()
}

/// Builds the next generation into a fresh array so propagation reads a
/// consistent pre-cycle snapshot (plus the freshly collapsed cell) while it
/// writes. Collapsed cells are copied forward unchanged.
fn next_generation(cells: &[WaveCell], dim: usize) -> Vec<WaveCell> {
    let mut next = Vec::with_capacity(cells.len());
    for (index, cell) in cells.iter().enumerate() {
        if cell.collapsed {
            next.push(cell.clone());
            continue;
        }
        next.push(WaveCell {
            id: cell.id,
            collapsed: false,
            options: recompute_options(cells, index, dim),
            connections: None,
        });
    }
    next
}

/// Recomputes a cell's options from scratch: the deduplicated union, over
/// each in-grid neighbor direction, of the candidate pairs that agree with
/// whether that neighbor currently exposes the reciprocal edge.
fn recompute_options(
    cells: &[WaveCell],
    index: usize,
    dim: usize,
) -> Vec<(TileShape, Orientation)> {
    let row = index / dim;
    let column = index % dim;

    let mut collected: Vec<(TileShape, Orientation)> = Vec::new();
    let mut gather = |neighbor: &WaveCell, facing: Direction| {
        let candidates = if options_expose(&neighbor.options, facing.opposite()) {
            rules::pairs_exposing(facing)
        } else {
            rules::pairs_not_exposing(facing)
        };
        for pair in candidates {
            if !collected.contains(&pair) {
                collected.push(pair);
            }
        }
    };

    if row > 0 {
        gather(&cells[index - dim], Direction::North);
    }
    if column < dim - 1 {
        gather(&cells[index + 1], Direction::East);
    }
    if row < dim - 1 {
        gather(&cells[index + dim], Direction::South);
    }
    if column > 0 {
        gather(&cells[index - 1], Direction::West);
    }

    collected
}

fn options_expose(options: &[(TileShape, Orientation)], direction: Direction) -> bool {
    options.iter().any(|&(shape, orientation)| rules::exposes(shape, orientation, direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_filters_boundary_crossing_pairs_by_position() {
        let cells = seed_cells(3);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0].id, 1);

        // Corner: two forbidden edges leave 3 viable pairs; edge midpoints
        // keep the 8 pairs hiding one direction; the center keeps all 20.
        assert_eq!(cells[0].options.len(), 3);
        assert_eq!(cells[1].options.len(), 8);
        assert_eq!(cells[4].options.len(), 20);

        for &(shape, orientation) in &cells[0].options {
            assert!(!rules::exposes(shape, orientation, Direction::North));
            assert!(!rules::exposes(shape, orientation, Direction::West));
        }
    }

    #[test]
    fn one_by_one_grid_has_no_viable_options() {
        let cells = seed_cells(1);
        assert_eq!(cells.len(), 1);
        assert!(cells[0].options.is_empty());
    }

    #[test]
    fn a_cycle_collapses_exactly_one_cell_when_options_exist() {
        let mut rng = LevelRng::seeded(42);
        let mut cells = seed_cells(3);
        collapse_cycle(&mut cells, 3, &mut rng);

        let collapsed: Vec<&WaveCell> = cells.iter().filter(|cell| cell.collapsed).collect();
        assert_eq!(collapsed.len(), 1);
        let cell = collapsed[0];
        assert_eq!(cell.options.len(), 1);
        let (shape, orientation) = cell.options[0];
        let connections = cell.connections.as_ref().expect("collapsed cell has connections");
        assert_eq!(connections.len(), shape.edge_count());
        for (connection, &direction) in
            connections.iter().zip(rules::exposed_directions(shape, orientation))
        {
            assert_eq!(connection.direction, Some(direction));
        }
    }

    #[test]
    fn collapse_cycle_is_deterministic_for_a_seed() {
        let mut left = seed_cells(4);
        let mut right = seed_cells(4);
        let mut left_rng = LevelRng::seeded(7);
        let mut right_rng = LevelRng::seeded(7);
        for _ in 0..6 {
            collapse_cycle(&mut left, 4, &mut left_rng);
            collapse_cycle(&mut right, 4, &mut right_rng);
        }
        assert_eq!(left, right);
    }

    #[test]
    fn connection_targets_follow_row_major_arithmetic() {
        // Center of a 3x3 grid, fully open: all four true neighbors.
        let connections =
            resolve_connections(5, TileShape::Open, Orientation::North, 3);
        let targets: Vec<TileId> = connections.iter().map(|c| c.target).collect();
        assert_eq!(targets, vec![2, 6, 8, 4]);
    }

    #[test]
    fn out_of_range_targets_become_the_invalid_id() {
        // Top-left corner exposing North and West: both point off-grid.
        let connections = resolve_connections(1, TileShape::L, Orientation::West, 3);
        assert!(connections.iter().all(|c| c.target == INVALID_TILE));
    }

    #[test]
    fn propagation_unions_candidates_from_each_existing_neighbor() {
        let mut cells = seed_cells(2);
        // Collapse the top-left cell by hand to a dead end opening East.
        cells[0].collapsed = true;
        cells[0].options = vec![(TileShape::Closed, Orientation::East)];
        cells[0].connections =
            Some(resolve_connections(1, TileShape::Closed, Orientation::East, 2));

        let next = next_generation(&cells, 2);
        assert_eq!(next[0], cells[0]);

        // Top-right cell: its West neighbor now exposes East, and its South
        // neighbor still has North-exposing pairs among its options, so the
        // recompute unions pairs_exposing(West) with pairs_exposing(South).
        for pair in rules::pairs_exposing(Direction::West) {
            assert!(next[1].options.contains(&pair));
        }
        for pair in rules::pairs_exposing(Direction::South) {
            assert!(next[1].options.contains(&pair));
        }
        // Union, not intersection: 12 + 12 pairs with a 7-pair overlap.
        assert_eq!(next[1].options.len(), 17);
    }
}
