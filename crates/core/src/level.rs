//! Live level state: the static graph of generated tiles plus everything the
//! player learns and changes while traversing it — reachability, fog of war,
//! rolled contents, and the movement state machine.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::rng::LevelRng;
use crate::state::CellState;
use crate::types::{Connection, Direction, LevelEvent, RawTile, SPAWN_TILE, TileId};

/// Reachable-tile floor (spawn excluded) a generated grid must clear before
/// it is accepted.
const MIN_REACHABLE_DISTANCE: usize = 15;
/// Whole-grid regenerations attempted before giving up.
const MAX_GENERATION_RETRIES: u32 = 8;

/// Read-only graph node; never mutated after load and freely shared by
/// queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileNode {
    pub id: TileId,
    pub connections: Vec<Connection>,
}

impl TileNode {
    fn from_raw(raw: RawTile) -> Self {
        Self { id: raw.id, connections: raw.connections }
    }

    /// Target tile for a step in `direction`; the node's own id when the
    /// direction is not available, which makes such a step a no-op.
    pub fn step_target(&self, direction: Direction) -> TileId {
        self.connections
            .iter()
            .find(|connection| connection.direction == Some(direction))
            .map(|connection| connection.target)
            .unwrap_or(self.id)
    }

    pub fn available_directions(&self) -> Vec<Direction> {
        self.connections.iter().filter_map(|connection| connection.direction).collect()
    }

    fn neighbor_ids(&self) -> impl Iterator<Item = TileId> + '_ {
        self.connections.iter().map(|connection| connection.target)
    }
}

/// The player's current position: mirrors one static node and swaps which
/// one by identity, never by copying graph data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActiveTile {
    pub id: TileId,
}

/// Owns the loaded graph and all derived live state. Unloaded until `load`
/// (or `load_generated`) succeeds; `purge` returns to unloaded.
pub struct LevelGraph {
    nodes: Vec<TileNode>,
    cells: Vec<CellState>,
    active: ActiveTile,
    reachable: BTreeSet<TileId>,
    events: Vec<LevelEvent>,
    rng: LevelRng,
}

impl LevelGraph {
    pub fn new(seed: u64) -> Self {
        Self {
            nodes: Vec::new(),
            cells: Vec::new(),
            active: ActiveTile::default(),
            reachable: BTreeSet::new(),
            events: Vec::new(),
            rng: LevelRng::seeded(seed),
        }
    }

    /// Loads a static graph, derives blank live state, recomputes
    /// reachability from spawn, and places the player. Returns the number of
    /// nodes loaded.
    pub fn load(&mut self, tiles: Vec<RawTile>) -> usize {
        self.install(tiles);
        self.nodes.len()
    }

    /// Connectivity-gated loading: pulls grids out of `loader` until one
    /// clears the minimum-distance rule, up to the retry bound. Exhaustion
    /// logs a diagnostic, leaves the graph unloaded, and returns 0 — it
    /// never raises.
    pub fn load_generated(&mut self, mut loader: impl FnMut() -> Vec<RawTile>) -> usize {
        for attempt in 1..=MAX_GENERATION_RETRIES {
            let tiles = loader();
            let nodes: Vec<TileNode> = tiles.iter().cloned().map(TileNode::from_raw).collect();
            let reachable = reachable_from(&nodes, SPAWN_TILE);
            if reachable.len().saturating_sub(1) >= MIN_REACHABLE_DISTANCE {
                self.install(tiles);
                return self.nodes.len();
            }
            self.events.push(LevelEvent::GridRejected { attempt, reachable: reachable.len() });
        }
        self.events.push(LevelEvent::RetriesExhausted { attempts: MAX_GENERATION_RETRIES });
        self.clear_level_state();
        0
    }

    /// Movement state machine. Resolves the requested direction against the
    /// active tile's connections — the active tile's own id when the
    /// direction is absent — then swaps the active identity to the node with
    /// that id, falling back to the first node when the id is unknown. Both
    /// fallbacks are designed degradations, kept exactly.
    pub fn step(&mut self, direction: Direction) {
        let Some(node) = self.active_tile() else { return };
        let target = node.step_target(direction);
        let landing = self.node(target).or_else(|| self.nodes.first()).map(|node| node.id);
        let Some(landing) = landing else { return };
        self.active = ActiveTile { id: landing };
        self.refresh_active_cell();
    }

    pub fn can_step(&self, direction: Direction) -> bool {
        self.active_tile()
            .is_some_and(|node| node.connections.iter().any(|c| c.direction == Some(direction)))
    }

    pub fn available_directions(&self) -> Vec<Direction> {
        self.active_tile().map(TileNode::available_directions).unwrap_or_default()
    }

    /// Rolls contents for every cell that is neither active nor already
    /// rolled. Returns how many cells were processed this call; a second
    /// sweep over an unchanged level therefore processes zero.
    pub fn roll_contents(&mut self) -> usize {
        let mut processed = 0;
        for index in 0..self.cells.len() {
            if self.cells[index].active || self.cells[index].rolled {
                continue;
            }
            self.cells[index].roll(&mut self.rng);
            processed += 1;
        }
        processed
    }

    /// Reconstructs spawn-to-cell shortest paths for every reachable
    /// content-bearing cell via a breadth-first parent-pointer trace.
    /// Unreachable content is skipped and logged, nothing more.
    pub fn compute_paths(&mut self) {
        let parents = bfs_parents(&self.nodes, SPAWN_TILE);
        let mut unreachable_content = Vec::new();
        for cell in &mut self.cells {
            if !cell.has_contents() {
                continue;
            }
            if !self.reachable.contains(&cell.id) {
                unreachable_content.push(cell.id);
                continue;
            }
            cell.access_path = trace_path(&parents, SPAWN_TILE, cell.id);
        }
        for tile in unreachable_content {
            self.events.push(LevelEvent::UnreachableContent { tile });
        }
    }

    /// Drops all level state; only the rng survives.
    pub fn purge(&mut self) {
        self.clear_level_state();
        self.events.clear();
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn nodes(&self) -> &[TileNode] {
        &self.nodes
    }

    pub fn active_id(&self) -> TileId {
        self.active.id
    }

    /// Static node the active tile currently mirrors; first node when the
    /// active id is unknown, `None` only while unloaded.
    pub fn active_tile(&self) -> Option<&TileNode> {
        self.node(self.active.id).or_else(|| self.nodes.first())
    }

    /// Reachability from spawn — a property of the static graph, recomputed
    /// on (re)load rather than per move.
    pub fn reachable(&self) -> &BTreeSet<TileId> {
        &self.reachable
    }

    /// Nodes outside the reachability set; recomputed on demand.
    pub fn unreachable(&self) -> BTreeSet<TileId> {
        self.nodes
            .iter()
            .map(|node| node.id)
            .filter(|id| !self.reachable.contains(id))
            .collect()
    }

    /// Reachable nodes the player has not yet discovered; recomputed on
    /// demand.
    pub fn unknown(&self) -> BTreeSet<TileId> {
        self.cells
            .iter()
            .filter(|cell| self.reachable.contains(&cell.id) && !cell.discovered)
            .map(|cell| cell.id)
            .collect()
    }

    pub fn events(&self) -> &[LevelEvent] {
        &self.events
    }

    /// Order-stable digest of the live state; equal seeds with equal call
    /// sequences hash equal.
    pub fn snapshot_hash(&self) -> u64 {
        use std::hash::Hasher;
        use xxhash_rust::xxh3::Xxh3;

        let mut hasher = Xxh3::new();
        hasher.write_u32(self.active.id);
        hasher.write_u64(self.nodes.len() as u64);
        for cell in &self.cells {
            hasher.write_u32(cell.id);
            hasher.write_u8(u8::from(cell.active));
            hasher.write_u8(u8::from(cell.discovered));
            hasher.write_u8(u8::from(cell.rolled));
            hasher.write_u8(cell.contents.len() as u8);
            for kind in &cell.contents {
                hasher.write_u8(*kind as u8 + 1);
            }
            hasher.write_u8(cell.access_path.len() as u8);
            for id in &cell.access_path {
                hasher.write_u32(*id);
            }
        }
        hasher.finish()
    }

    fn install(&mut self, tiles: Vec<RawTile>) {
        self.nodes = tiles.into_iter().map(TileNode::from_raw).collect();
        self.cells = self.nodes.iter().map(|node| CellState::blank(node.id)).collect();
        self.reachable = reachable_from(&self.nodes, SPAWN_TILE);
        self.active = ActiveTile { id: self.nodes.first().map_or(0, |node| node.id) };
        self.refresh_active_cell();
    }

    fn clear_level_state(&mut self) {
        self.nodes.clear();
        self.cells.clear();
        self.reachable.clear();
        self.active = ActiveTile::default();
    }

    fn node(&self, id: TileId) -> Option<&TileNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    fn cell_index(&self, id: TileId) -> Option<usize> {
        match self.cells.iter().position(|cell| cell.id == id) {
            Some(index) => Some(index),
            None if self.cells.is_empty() => None,
            // Unknown id on a loaded level: first cell, same defensive
            // default as the node lookup.
            None => Some(0),
        }
    }

    fn refresh_active_cell(&mut self) {
        for cell in &mut self.cells {
            cell.active = false;
        }
        let Some(index) = self.cell_index(self.active.id) else { return };
        self.cells[index].active = true;
        self.cells[index].discovered = true;
        self.discover_neighbors();
    }

    /// The discovery frontier always extends exactly one hop ahead of the
    /// player; re-discovering a cell is a no-op.
    fn discover_neighbors(&mut self) {
        let Some(node) = self.node(self.active.id) else { return };
        let neighbor_ids: Vec<TileId> = node.neighbor_ids().collect();
        for id in neighbor_ids {
            if let Some(cell) = self.cells.iter_mut().find(|cell| cell.id == id) {
                cell.discovered = true;
            }
        }
    }
}

/// Breadth-first reachability over resolved connections. The visited set
/// guarantees termination on its own; the pop failsafe mirrors the node count
/// as an extra cycle guard.
fn reachable_from(nodes: &[TileNode], spawn: TileId) -> BTreeSet<TileId> {
    let Some(spawn_node) = nodes.iter().find(|node| node.id == spawn) else {
        return BTreeSet::new();
    };

    let mut visited = BTreeSet::from([spawn]);
    let mut queue: VecDeque<TileId> = spawn_node.neighbor_ids().collect();
    let mut failsafe = nodes.len();

    while let Some(id) = queue.pop_front() {
        if failsafe == 0 {
            break;
        }
        if visited.contains(&id) {
            continue;
        }
        let Some(node) = nodes.iter().find(|node| node.id == id) else { continue };
        visited.insert(id);
        queue.extend(node.neighbor_ids());
        failsafe -= 1;
    }

    visited
}

/// Parent-pointer BFS from spawn: each discovered node records the node it
/// was discovered from.
fn bfs_parents(nodes: &[TileNode], spawn: TileId) -> BTreeMap<TileId, TileId> {
    let mut parents = BTreeMap::new();
    let Some(spawn_node) = nodes.iter().find(|node| node.id == spawn) else {
        return parents;
    };

    let mut queue = VecDeque::new();
    for target in spawn_node.neighbor_ids() {
        if target != spawn && !parents.contains_key(&target) {
            parents.insert(target, spawn);
            queue.push_back(target);
        }
    }

    while let Some(id) = queue.pop_front() {
        let Some(node) = nodes.iter().find(|node| node.id == id) else { continue };
        for target in node.neighbor_ids() {
            if target == spawn || parents.contains_key(&target) {
                continue;
            }
            parents.insert(target, id);
            queue.push_back(target);
        }
    }

    parents
}

/// Walks parent pointers from the target back to spawn, then reverses into
/// spawn-to-target order. Both endpoints are included.
fn trace_path(parents: &BTreeMap<TileId, TileId>, spawn: TileId, target: TileId) -> Vec<TileId> {
    let mut path = vec![target];
    let mut current = target;
    let mut failsafe = parents.len();
    while current != spawn && failsafe > 0 {
        let Some(&parent) = parents.get(&current) else { break };
        path.push(parent);
        current = parent;
        failsafe -= 1;
    }
    path.reverse();
    path
}
