//! Shared vocabulary for the tile generator crates.

mod types;

pub use types::{Coord, Direction, TileId};
