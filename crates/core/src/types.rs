use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// 1-based, row-major tile id. The wire format reserves 0 for "no target".
pub type TileId = u32;

pub const INVALID_TILE: TileId = 0;
pub const SPAWN_TILE: TileId = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Single-letter wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        }
    }

    pub fn from_char(letter: char) -> Result<Self, UnknownDirection> {
        match letter.to_ascii_uppercase() {
            'N' => Ok(Direction::North),
            'E' => Ok(Direction::East),
            'S' => Ok(Direction::South),
            'W' => Ok(Direction::West),
            other => Err(UnknownDirection(other.to_string())),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut letters = text.chars();
        match (letters.next(), letters.next()) {
            (Some(letter), None) => Direction::from_char(letter),
            _ => Err(UnknownDirection(text.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownDirection(pub String);

/// Room topology by exposed-edge count: 4, 1, 3, 2, 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileShape {
    Open,
    Closed,
    T,
    L,
    I,
}

impl TileShape {
    pub const ALL: [TileShape; 5] =
        [TileShape::Open, TileShape::Closed, TileShape::T, TileShape::L, TileShape::I];

    pub fn edge_count(self) -> usize {
        match self {
            TileShape::Open => 4,
            TileShape::Closed => 1,
            TileShape::T => 3,
            TileShape::L => 2,
            TileShape::I => 2,
        }
    }
}

/// Rotation of a shape among the four compass headings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    pub const ALL: [Orientation; 4] =
        [Orientation::North, Orientation::East, Orientation::South, Orientation::West];
}

/// Wire pair: `["N", 7]`, or `["", 0]` for the placeholder. Unknown direction
/// strings deserialize as the placeholder direction rather than failing.
type WireConnection = (String, TileId);

/// One exposed edge of a tile and the id it resolves to. A target of
/// [`INVALID_TILE`] means the edge points off-grid or was never resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireConnection", into = "WireConnection")]
pub struct Connection {
    pub direction: Option<Direction>,
    pub target: TileId,
}

impl Connection {
    pub fn new(direction: Direction, target: TileId) -> Self {
        Self { direction: Some(direction), target }
    }

    pub fn placeholder() -> Self {
        Self { direction: None, target: INVALID_TILE }
    }

    pub fn is_placeholder(&self) -> bool {
        self.direction.is_none()
    }
}

impl From<WireConnection> for Connection {
    fn from((direction, target): WireConnection) -> Self {
        Self { direction: direction.parse().ok(), target }
    }
}

impl From<Connection> for WireConnection {
    fn from(connection: Connection) -> Self {
        let direction = connection.direction.map_or_else(String::new, |d| d.as_str().to_string());
        (direction, connection.target)
    }
}

/// The contract between the grid generator and the level graph: a resolved
/// tile with its outgoing connections. Placeholder tiles carry the single
/// connection `["", 0]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTile {
    pub id: TileId,
    pub connections: Vec<Connection>,
}

/// Opaque content tag; flavor data lives outside the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentKind {
    Item,
    Enemy,
    Event,
}

/// Diagnostic log entries. None of these conditions block level use; they
/// exist so callers can see why a grid was rejected or a cell left unpathed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelEvent {
    GridRejected { attempt: u32, reachable: usize },
    RetriesExhausted { attempts: u32 },
    UnreachableContent { tile: TileId },
}

pub fn canonical_bytes(tiles: &[RawTile]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend((tiles.len() as u32).to_le_bytes());
    for tile in tiles {
        bytes.extend(tile.id.to_le_bytes());
        bytes.extend((tile.connections.len() as u32).to_le_bytes());
        for connection in &tile.connections {
            bytes.push(match connection.direction {
                None => 0,
                Some(Direction::North) => 1,
                Some(Direction::East) => 2,
                Some(Direction::South) => 3,
                Some(Direction::West) => 4,
            });
            bytes.extend(connection.target.to_le_bytes());
        }
    }
    bytes
}

/// Order-stable digest of a generated level; equal levels hash equal.
pub fn level_fingerprint(tiles: &[RawTile]) -> u64 {
    xxh3_64(&canonical_bytes(tiles))
}
