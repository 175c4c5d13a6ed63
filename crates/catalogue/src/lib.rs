//! Tile Catalogue: every tile variant with its directional compatibility sets.
//!
//! # Invariants
//! - Adjacency is symmetric: if B may sit right of A, A may sit left of B.
//! - Variant ids are dense and follow catalogue order.
//! - A variant with no compatible neighbor in some direction is legal.

mod builder;
mod catalogue;
mod variant;

pub use builder::CatalogueBuilder;
pub use catalogue::{Catalogue, CatalogueError};
pub use variant::{EdgeMask, TileKind, TileVariant};

pub fn crate_info() -> &'static str {
    "tilegen-catalogue v0.1.0"
}
