use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tilegen_common::{Direction, TileId};

use crate::builder::CatalogueBuilder;
use crate::variant::TileVariant;

fn standard_builder() -> CatalogueBuilder {
    CatalogueBuilder::new()
        .filler("grass")
        .filler("water")
        .side("shore")
        .corner("shore")
        .default_tile("grass")
}

/// Errors from building, validating or loading a catalogue.
#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error("catalogue has no tile variants")]
    Empty,
    #[error("rotated tile families need at least one filler tile")]
    NoFiller,
    #[error("duplicate tile name: {0}")]
    DuplicateName(String),
    #[error("unknown tile: {0}")]
    UnknownTile(String),
    #[error("invalid weight {weight} for tile {name}")]
    InvalidWeight { name: String, weight: f64 },
    #[error("inconsistent catalogue: {0}")]
    Inconsistent(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Finalized set of tile variants with their directional compatibility and weights.
///
/// Built once before any grid work begins and shared read-only with every
/// solver run. Variant ids are dense indices; iteration follows id order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogue {
    variants: Vec<TileVariant>,
    default_tile: Option<TileId>,
}

impl Catalogue {
    pub(crate) fn from_parts(variants: Vec<TileVariant>, default_tile: Option<TileId>) -> Self {
        Self {
            variants,
            default_tile,
        }
    }

    /// Grass and water fillers plus a shore family of side and corner
    /// rotations, seeded with grass.
    pub fn standard() -> Self {
        // Fixed input; `standard_builder_succeeds` keeps it buildable.
        standard_builder()
            .build()
            .expect("standard catalogue is well formed")
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn get(&self, id: TileId) -> Option<&TileVariant> {
        self.variants.get(id.index())
    }

    /// Variant by id. Panics on an id from another catalogue.
    pub fn variant(&self, id: TileId) -> &TileVariant {
        &self.variants[id.index()]
    }

    pub fn by_name(&self, name: &str) -> Option<TileId> {
        self.variants.iter().find(|v| v.name == name).map(|v| v.id)
    }

    pub fn name(&self, id: TileId) -> &str {
        &self.variant(id).name
    }

    pub fn weight(&self, id: TileId) -> f64 {
        self.variant(id).weight
    }

    pub fn compatible(&self, id: TileId, dir: Direction) -> &BTreeSet<TileId> {
        self.variant(id).compatible(dir)
    }

    /// Tile the driver seeds with when the caller does not choose one.
    pub fn default_tile(&self) -> Option<TileId> {
        self.default_tile
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileVariant> {
        self.variants.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = TileId> + '_ {
        self.variants.iter().map(|v| v.id)
    }

    /// Check the invariants a builder guarantees. Used on catalogues that
    /// came from disk.
    pub fn validate(&self) -> Result<(), CatalogueError> {
        if self.variants.is_empty() {
            return Err(CatalogueError::Empty);
        }
        let mut names = HashSet::new();
        for (n, v) in self.variants.iter().enumerate() {
            if v.id.index() != n {
                return Err(CatalogueError::Inconsistent(format!(
                    "tile {} has id {} at position {n}",
                    v.name, v.id.0
                )));
            }
            if !names.insert(v.name.as_str()) {
                return Err(CatalogueError::DuplicateName(v.name.clone()));
            }
            if !v.weight.is_finite() || v.weight < 0.0 {
                return Err(CatalogueError::InvalidWeight {
                    name: v.name.clone(),
                    weight: v.weight,
                });
            }
            for dir in Direction::ALL {
                for other in v.compatible(dir) {
                    let Some(o) = self.get(*other) else {
                        return Err(CatalogueError::Inconsistent(format!(
                            "tile {} references unknown id {}",
                            v.name, other.0
                        )));
                    };
                    if !o.allows(dir.opposite(), v.id) {
                        return Err(CatalogueError::Inconsistent(format!(
                            "{} -{dir:?}-> {} has no mirror",
                            v.name, o.name
                        )));
                    }
                }
            }
        }
        if let Some(id) = self.default_tile {
            if self.get(id).is_none() {
                return Err(CatalogueError::Inconsistent(format!(
                    "default tile id {} out of range",
                    id.0
                )));
            }
        }
        Ok(())
    }

    /// Load and validate a catalogue written by [`Catalogue::save_json`].
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let catalogue: Catalogue = serde_json::from_str(&data)?;
        catalogue.validate()?;
        tracing::info!(
            path = %path.as_ref().display(),
            variants = catalogue.len(),
            "catalogue loaded"
        );
        Ok(catalogue)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), CatalogueError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::TileKind;

    #[test]
    fn standard_catalogue_shape() {
        let cat = Catalogue::standard();
        assert_eq!(cat.len(), 10);
        assert_eq!(cat.default_tile(), cat.by_name("grass"));
        assert!(cat.validate().is_ok());
        assert_eq!(
            cat.iter().filter(|v| v.kind == TileKind::Filler).count(),
            2
        );
    }

    #[test]
    fn standard_builder_succeeds() {
        let built = standard_builder().build();
        assert!(built.is_ok(), "standard catalogue failed to build: {built:?}");
    }

    #[test]
    fn ids_follow_catalogue_order() {
        let cat = Catalogue::standard();
        let ids: Vec<TileId> = cat.ids().collect();
        let expected: Vec<TileId> = (0..cat.len() as u32).map(TileId).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn weights_are_compatibility_counts() {
        let cat = Catalogue::standard();
        for v in cat.iter() {
            assert_eq!(v.weight, v.compatibility_count() as f64);
        }
    }

    #[test]
    fn json_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.json");

        let cat = Catalogue::standard();
        cat.save_json(&path).unwrap();
        let loaded = Catalogue::load_json(&path).unwrap();

        assert_eq!(loaded.len(), cat.len());
        assert_eq!(loaded.default_tile(), cat.default_tile());
        for (a, b) in cat.iter().zip(loaded.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.weight, b.weight);
            for dir in Direction::ALL {
                assert_eq!(a.compatible(dir), b.compatible(dir));
            }
        }
    }

    #[test]
    fn validate_detects_missing_mirror() {
        let mut cat = CatalogueBuilder::new()
            .variant("a")
            .variant("b")
            .allow("a", Direction::Right, "b")
            .build()
            .unwrap();
        cat.variants[1].compatible[Direction::Left.index()].clear();
        assert!(matches!(
            cat.validate(),
            Err(CatalogueError::Inconsistent(_))
        ));
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Catalogue::load_json(&path),
            Err(CatalogueError::Json(_))
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Catalogue::load_json(dir.path().join("nope.json")),
            Err(CatalogueError::Io(_))
        ));
    }
}
