use std::collections::{BTreeMap, BTreeSet, HashMap};
use tilegen_common::{Direction, TileId};

use crate::catalogue::{Catalogue, CatalogueError};
use crate::variant::{EdgeMask, TileKind, TileVariant};

/// Exposed edges of the four side rotations, clockwise from Left.
const SIDE_ROTATIONS: [&[Direction]; 4] = [
    &[Direction::Left],
    &[Direction::Top],
    &[Direction::Right],
    &[Direction::Bottom],
];

/// Exposed edges of the four corner rotations, clockwise from Left-Top.
const CORNER_ROTATIONS: [&[Direction]; 4] = [
    &[Direction::Left, Direction::Top],
    &[Direction::Top, Direction::Right],
    &[Direction::Right, Direction::Bottom],
    &[Direction::Bottom, Direction::Left],
];

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    family: String,
    kind: TileKind,
    edges: EdgeMask,
}

/// Builds a [`Catalogue`] from tile families, explicit adjacency rules and
/// learned samples.
///
/// Rule-based families (fillers, sides, corners) get their compatibility
/// from edge matching. Explicit variants only get what `allow` and
/// `learn_sample` give them. Every relation is mirrored at build time.
#[derive(Debug, Clone, Default)]
pub struct CatalogueBuilder {
    entries: Vec<Entry>,
    allows: Vec<(String, Direction, String)>,
    weights: Vec<(String, f64)>,
    default_tile: Option<String>,
}

impl CatalogueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unrotated tile with no exposed edges.
    pub fn filler(mut self, name: &str) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            family: name.to_string(),
            kind: TileKind::Filler,
            edges: EdgeMask::NONE,
        });
        self
    }

    /// Add the four rotations of a tile exposing one edge.
    pub fn side(mut self, family: &str) -> Self {
        for edges in SIDE_ROTATIONS {
            self.push_rotation(family, TileKind::Side, EdgeMask::with(edges));
        }
        self
    }

    /// Add the four rotations of a tile exposing two adjacent edges.
    pub fn corner(mut self, family: &str) -> Self {
        for edges in CORNER_ROTATIONS {
            self.push_rotation(family, TileKind::Corner, EdgeMask::with(edges));
        }
        self
    }

    /// Add a tile whose adjacency comes only from explicit rules.
    pub fn variant(mut self, name: &str) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            family: name.to_string(),
            kind: TileKind::Explicit,
            edges: EdgeMask::NONE,
        });
        self
    }

    /// Allow `neighbor` next to `tile` in `dir`. The reverse relation is added at build.
    pub fn allow(mut self, tile: &str, dir: Direction, neighbor: &str) -> Self {
        self.allows
            .push((tile.to_string(), dir, neighbor.to_string()));
        self
    }

    /// Allow every ordered pair of the given tiles in every direction.
    pub fn allow_all(mut self, tiles: &[&str]) -> Self {
        for a in tiles {
            for b in tiles {
                for dir in Direction::ALL {
                    self.allows.push((a.to_string(), dir, b.to_string()));
                }
            }
        }
        self
    }

    /// Override the derived weight of a tile.
    pub fn weight(mut self, name: &str, weight: f64) -> Self {
        self.weights.push((name.to_string(), weight));
        self
    }

    /// Tile used to seed the grid when the caller does not pick one.
    pub fn default_tile(mut self, name: &str) -> Self {
        self.default_tile = Some(name.to_string());
        self
    }

    /// Learn tiles and adjacency from an example grid of tile names.
    ///
    /// Each distinct name becomes an explicit variant (unless already present)
    /// and every horizontally or vertically adjacent pair in the sample is allowed.
    pub fn learn_sample(mut self, rows: &[&[&str]]) -> Self {
        for row in rows {
            for name in row.iter() {
                if !self.entries.iter().any(|e| e.name == *name) {
                    self = self.variant(name);
                }
            }
        }
        for (j, row) in rows.iter().enumerate() {
            for (i, name) in row.iter().enumerate() {
                if let Some(right) = row.get(i + 1) {
                    self.allows
                        .push((name.to_string(), Direction::Right, right.to_string()));
                }
                if let Some(below) = rows.get(j + 1).and_then(|r| r.get(i)) {
                    self.allows
                        .push((name.to_string(), Direction::Bottom, below.to_string()));
                }
            }
        }
        self
    }

    fn push_rotation(&mut self, family: &str, kind: TileKind, edges: EdgeMask) {
        self.entries.push(Entry {
            name: format!("{family}_{}", edges.signature()),
            family: family.to_string(),
            kind,
            edges,
        });
    }

    /// Finalize the catalogue: assign ids, derive and mirror compatibility, derive weights.
    pub fn build(self) -> Result<Catalogue, CatalogueError> {
        if self.entries.is_empty() {
            return Err(CatalogueError::Empty);
        }

        let mut ids: HashMap<&str, TileId> = HashMap::new();
        for (n, entry) in self.entries.iter().enumerate() {
            if ids.insert(&entry.name, TileId(n as u32)).is_some() {
                return Err(CatalogueError::DuplicateName(entry.name.clone()));
            }
        }

        let has_rotations = self
            .entries
            .iter()
            .any(|e| matches!(e.kind, TileKind::Side | TileKind::Corner));
        let has_filler = self.entries.iter().any(|e| e.kind == TileKind::Filler);
        if has_rotations && !has_filler {
            return Err(CatalogueError::NoFiller);
        }

        let lookup = |name: &str| {
            ids.get(name)
                .copied()
                .ok_or_else(|| CatalogueError::UnknownTile(name.to_string()))
        };

        let mut compatible: Vec<[BTreeSet<TileId>; 4]> =
            vec![Default::default(); self.entries.len()];

        for (a, ea) in self.entries.iter().enumerate() {
            for (b, eb) in self.entries.iter().enumerate() {
                for dir in Direction::ALL {
                    if rule_compatible(ea, eb, dir) {
                        compatible[a][dir.index()].insert(TileId(b as u32));
                    }
                }
            }
        }

        for (tile, dir, neighbor) in &self.allows {
            let a = lookup(tile)?;
            let b = lookup(neighbor)?;
            compatible[a.index()][dir.index()].insert(b);
        }

        // Adjacency is logically symmetric: A -D-> B implies B -opposite(D)-> A.
        let mut mirrored = Vec::new();
        for (a, sets) in compatible.iter().enumerate() {
            for dir in Direction::ALL {
                for b in &sets[dir.index()] {
                    mirrored.push((*b, dir.opposite(), TileId(a as u32)));
                }
            }
        }
        for (b, dir, a) in mirrored {
            compatible[b.index()][dir.index()].insert(a);
        }

        let overrides: BTreeMap<&str, f64> = self
            .weights
            .iter()
            .map(|(name, w)| (name.as_str(), *w))
            .collect();
        for name in overrides.keys() {
            lookup(name)?;
        }

        let mut variants = Vec::with_capacity(self.entries.len());
        for (n, (entry, compatible)) in self.entries.into_iter().zip(compatible).enumerate() {
            let derived = compatible.iter().map(|s| s.len()).sum::<usize>() as f64;
            let weight = overrides.get(entry.name.as_str()).copied().unwrap_or(derived);
            if !weight.is_finite() || weight < 0.0 {
                return Err(CatalogueError::InvalidWeight {
                    name: entry.name,
                    weight,
                });
            }
            variants.push(TileVariant {
                id: TileId(n as u32),
                name: entry.name,
                family: entry.family,
                kind: entry.kind,
                edges: entry.edges,
                weight,
                compatible,
            });
        }

        let default_tile = match &self.default_tile {
            Some(name) => Some(
                variants
                    .iter()
                    .find(|v| v.name == *name)
                    .map(|v| v.id)
                    .ok_or_else(|| CatalogueError::UnknownTile(name.clone()))?,
            ),
            None => variants
                .iter()
                .find(|v| v.kind == TileKind::Filler)
                .map(|v| v.id),
        };

        let catalogue = Catalogue::from_parts(variants, default_tile);
        tracing::debug!(
            variants = catalogue.len(),
            default = ?catalogue.default_tile(),
            "catalogue built"
        );
        Ok(catalogue)
    }
}

/// Edge-matching rule for filler, side and corner tiles.
///
/// Same family: the facing edges agree and the edges perpendicular to `dir`
/// agree, so a feature line continues across the boundary. Any tile may sit
/// next to a filler on an edge it does not expose.
fn rule_compatible(a: &Entry, b: &Entry, dir: Direction) -> bool {
    if a.kind == TileKind::Explicit || b.kind == TileKind::Explicit {
        return false;
    }
    if b.kind == TileKind::Filler {
        return !a.edges.exposed(dir);
    }
    if a.kind == TileKind::Filler || a.family != b.family {
        return false;
    }
    a.edges.exposed(dir) == b.edges.exposed(dir.opposite())
        && dir
            .perpendicular()
            .iter()
            .all(|p| a.edges.exposed(*p) == b.edges.exposed(*p))
}
