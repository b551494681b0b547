use crate::rng::LevelRng;
use crate::types::{ContentKind, TileId};

/// Chance that a cell holds any contents at all when first rolled.
pub const CONTENT_CHANCE: f64 = 0.75;

const CONTENT_KINDS: [ContentKind; 3] =
    [ContentKind::Item, ContentKind::Enemy, ContentKind::Event];

/// Live per-node state layered over the static graph: what the player has
/// reached, seen, and may find there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellState {
    pub id: TileId,
    /// Exactly one cell is active at a time once a level is loaded.
    pub active: bool,
    /// Fog of war: set when the cell enters the discovery frontier.
    pub discovered: bool,
    /// Set by the first (and only) content roll, hit or miss.
    pub rolled: bool,
    pub contents: Vec<ContentKind>,
    /// Spawn-to-cell node ids; populated only for reachable content cells.
    pub access_path: Vec<TileId>,
}

impl CellState {
    pub fn blank(id: TileId) -> Self {
        Self {
            id,
            active: false,
            discovered: false,
            rolled: false,
            contents: Vec::new(),
            access_path: Vec::new(),
        }
    }

    pub fn has_contents(&self) -> bool {
        !self.contents.is_empty()
    }

    /// Rolls contents exactly once; repeat calls are no-ops.
    pub fn roll(&mut self, rng: &mut LevelRng) {
        if self.rolled {
            return;
        }
        if rng.chance(CONTENT_CHANCE)
            && let Some(kind) = rng.pick(&CONTENT_KINDS)
        {
            self.contents.push(*kind);
        }
        self.rolled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_marks_the_cell_and_stores_at_most_one_item() {
        for seed in 0..32 {
            let mut rng = LevelRng::seeded(seed);
            let mut cell = CellState::blank(4);
            cell.roll(&mut rng);
            assert!(cell.rolled);
            assert!(cell.contents.len() <= 1);
            assert_eq!(cell.has_contents(), !cell.contents.is_empty());
        }
    }

    #[test]
    fn rolling_twice_never_changes_the_first_outcome() {
        let mut rng = LevelRng::seeded(11);
        let mut cell = CellState::blank(9);
        cell.roll(&mut rng);
        let snapshot = cell.clone();
        cell.roll(&mut rng);
        assert_eq!(cell, snapshot);
    }

    #[test]
    fn same_seed_rolls_identically() {
        let mut left_rng = LevelRng::seeded(123);
        let mut right_rng = LevelRng::seeded(123);
        let mut left = CellState::blank(2);
        let mut right = CellState::blank(2);
        left.roll(&mut left_rng);
        right.roll(&mut right_rng);
        assert_eq!(left, right);
    }
}
