pub mod level;
pub mod mapgen;
pub mod rng;
pub mod state;
pub mod types;

pub use level::{ActiveTile, LevelGraph, TileNode};
pub use mapgen::{Footprint, LevelGenerator, generate_level};
pub use rng::LevelRng;
pub use state::{CONTENT_CHANCE, CellState};
pub use types::*;
