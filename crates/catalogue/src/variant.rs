use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tilegen_common::{Direction, TileId};

/// How a variant was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Unrotated tile with no exposed edges (grass, water).
    Filler,
    /// Rotation of a family tile with one exposed edge.
    Side,
    /// Rotation of a family tile with two adjacent exposed edges.
    Corner,
    /// Tile whose adjacency is given by explicit rules or a learned sample.
    Explicit,
}

/// Edge-openness flags of a variant, indexed by [`Direction::index`].
///
/// An exposed edge carries the family's feature (a shoreline, a road) and can
/// only meet a matching edge of the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeMask(pub [bool; 4]);

impl EdgeMask {
    pub const NONE: EdgeMask = EdgeMask([false; 4]);

    /// Mask with exactly the given edges exposed.
    pub fn with(edges: &[Direction]) -> Self {
        let mut mask = [false; 4];
        for dir in edges {
            mask[dir.index()] = true;
        }
        Self(mask)
    }

    pub fn exposed(&self, dir: Direction) -> bool {
        self.0[dir.index()]
    }

    pub fn is_closed(&self) -> bool {
        self.0.iter().all(|e| !e)
    }

    /// Four characters in `L R T B` order: the direction letter when the edge
    /// is exposed, `-` otherwise.
    pub fn signature(&self) -> String {
        Direction::ALL
            .iter()
            .map(|d| if self.exposed(*d) { d.letter() } else { '-' })
            .collect()
    }
}

/// An immutable catalogue entry: one oriented version of a base tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileVariant {
    pub id: TileId,
    /// Unique name: the family name for fillers and explicit tiles,
    /// `<family>_<signature>` for rotated variants.
    pub name: String,
    pub family: String,
    pub kind: TileKind,
    pub edges: EdgeMask,
    /// Unnormalized placement probability.
    pub weight: f64,
    pub(crate) compatible: [BTreeSet<TileId>; 4],
}

impl TileVariant {
    /// Variants that may occupy the neighboring cell in `dir`.
    pub fn compatible(&self, dir: Direction) -> &BTreeSet<TileId> {
        &self.compatible[dir.index()]
    }

    /// Whether `other` may sit next to this variant in `dir`.
    pub fn allows(&self, dir: Direction, other: TileId) -> bool {
        self.compatible[dir.index()].contains(&other)
    }

    /// Sum over the four directions of the number of compatible variants.
    pub fn compatibility_count(&self) -> usize {
        self.compatible.iter().map(|s| s.len()).sum()
    }
}
