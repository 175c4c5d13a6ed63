//! Constraint propagation: one hop from a resolved cell to its four neighbors.

use std::collections::BTreeSet;
use tilegen_catalogue::Catalogue;
use tilegen_common::{Coord, Direction};

use crate::entropy::cell_entropy;
use crate::grid::{Domain, Grid};

/// Tighten the domains of the unresolved neighbors of the resolved cell `at`.
///
/// An unconstrained neighbor receives a copy of the compatibility set of the
/// committed tile in that direction; a constrained one keeps the intersection.
/// Does not cascade further. Returns the neighbors that became contradictions
/// during this call. A no-op on an unresolved cell.
pub fn propagate(grid: &mut Grid, catalogue: &Catalogue, at: Coord) -> Vec<Coord> {
    let Some(tile) = grid.cell(at).current else {
        tracing::debug!(%at, "propagate skipped: cell is unresolved");
        return Vec::new();
    };

    let (width, height) = (grid.width(), grid.height());
    let mut contradictions = Vec::new();

    for dir in Direction::ALL {
        let Some(neighbor) = at.step(dir, width, height) else {
            continue;
        };
        let allowed = catalogue.compatible(tile, dir);
        let cell = grid.cell_mut(neighbor);
        if cell.current.is_some() {
            continue;
        }

        let was_contradiction = cell.is_contradiction();
        let next: BTreeSet<_> = match &cell.domain {
            Domain::Unconstrained => allowed.clone(),
            Domain::Candidates(set) => set.intersection(allowed).copied().collect(),
        };
        cell.domain = Domain::Candidates(next);
        cell.entropy = cell_entropy(cell, catalogue);

        tracing::trace!(
            from = %at,
            to = %neighbor,
            ?dir,
            remaining = cell.domain.len(),
            "domain narrowed"
        );

        if cell.is_contradiction() && !was_contradiction {
            tracing::warn!(at = %neighbor, "contradiction: no tile fits");
            contradictions.push(neighbor);
        }
    }

    contradictions
}

/// Propagate from every resolved cell in scan order.
pub fn propagate_all(grid: &mut Grid, catalogue: &Catalogue) -> Vec<Coord> {
    let _span = tracing::info_span!("propagate_all").entered();
    let resolved: Vec<Coord> = grid
        .cells()
        .filter(|(_, c)| c.is_resolved())
        .map(|(at, _)| at)
        .collect();

    let mut contradictions = Vec::new();
    for at in resolved {
        contradictions.extend(propagate(grid, catalogue, at));
    }
    contradictions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Entropy;
    use tilegen_catalogue::CatalogueBuilder;
    use tilegen_common::TileId;

    fn grass_water() -> Catalogue {
        CatalogueBuilder::new()
            .filler("grass")
            .filler("water")
            .build()
            .unwrap()
    }

    /// Two tiles: `a` accepts only `b` on its right, `b` accepts only `a` on its left.
    fn chain() -> Catalogue {
        CatalogueBuilder::new()
            .variant("a")
            .variant("b")
            .allow("a", Direction::Right, "b")
            .build()
            .unwrap()
    }

    #[test]
    fn unconstrained_neighbor_gets_a_copy() {
        let cat = grass_water();
        let grass = cat.by_name("grass").unwrap();
        let mut grid = Grid::new(3, 3);
        grid.commit(Coord::new(1, 1), grass);

        propagate(&mut grid, &cat, Coord::new(1, 1));

        for at in [
            Coord::new(0, 1),
            Coord::new(2, 1),
            Coord::new(1, 0),
            Coord::new(1, 2),
        ] {
            assert_eq!(grid.cell(at).domain().len(), 2);
        }
        // Corners are two hops away and stay untouched.
        assert!(grid.cell(Coord::new(0, 0)).domain().is_unconstrained());
    }

    #[test]
    fn constrained_neighbor_is_intersected() {
        let cat = chain();
        let a = cat.by_name("a").unwrap();
        let b = cat.by_name("b").unwrap();
        let mut grid = Grid::new(3, 1);
        grid.cell_mut(Coord::new(1, 0)).domain = Domain::Candidates([a, b].into_iter().collect());
        grid.commit(Coord::new(0, 0), a);

        propagate(&mut grid, &cat, Coord::new(0, 0));

        let domain = grid.cell(Coord::new(1, 0)).domain();
        assert_eq!(domain.candidates().unwrap().len(), 1);
        assert!(domain.contains(b));
    }

    #[test]
    fn resolved_neighbors_are_left_alone() {
        let cat = grass_water();
        let grass = cat.by_name("grass").unwrap();
        let mut grid = Grid::new(2, 1);
        grid.commit(Coord::new(0, 0), grass);
        grid.commit(Coord::new(1, 0), grass);
        let before = grid.state_hash();

        propagate(&mut grid, &cat, Coord::new(0, 0));
        assert_eq!(grid.state_hash(), before);
        assert_eq!(grid.cell(Coord::new(1, 0)).entropy(), Entropy::Resolved);
    }

    #[test]
    fn unresolved_source_is_a_noop() {
        let cat = grass_water();
        let mut grid = Grid::new(2, 2);
        let before = grid.state_hash();
        assert!(propagate(&mut grid, &cat, Coord::new(0, 0)).is_empty());
        assert_eq!(grid.state_hash(), before);
    }

    #[test]
    fn propagate_is_idempotent() {
        let cat = Catalogue::standard();
        let mut grid = Grid::new(4, 4);
        grid.commit(Coord::new(1, 1), cat.by_name("shore_L---").unwrap());
        grid.commit(Coord::new(2, 2), cat.by_name("grass").unwrap());
        propagate_all(&mut grid, &cat);
        let once = grid.state_hash();

        propagate(&mut grid, &cat, Coord::new(1, 1));
        propagate(&mut grid, &cat, Coord::new(2, 2));
        assert_eq!(grid.state_hash(), once);
    }

    #[test]
    fn domains_never_grow() {
        let cat = Catalogue::standard();
        let mut grid = Grid::new(5, 5);
        let commits = [
            (Coord::new(2, 2), "grass"),
            (Coord::new(2, 1), "shore_--T-"),
            (Coord::new(3, 2), "water"),
            (Coord::new(1, 3), "shore_L-T-"),
        ];
        for (at, name) in commits {
            let before: Vec<Domain> = grid.cells().map(|(_, c)| c.domain().clone()).collect();
            grid.commit(at, cat.by_name(name).unwrap());
            propagate(&mut grid, &cat, at);
            for ((coord, cell), old) in grid.cells().zip(before) {
                if coord == at {
                    continue;
                }
                assert!(
                    cell.domain().is_subset_of(&old),
                    "domain at {coord} grew after committing {name} at {at}"
                );
            }
        }
    }

    #[test]
    fn empty_intersection_is_reported_once() {
        let cat = chain();
        let a = cat.by_name("a").unwrap();
        let mut grid = Grid::new(3, 1);
        // The left `a` wants `b` in the middle; the right `a` accepts nothing on its left.
        grid.commit(Coord::new(0, 0), a);
        grid.commit(Coord::new(2, 0), a);

        let first = propagate_all(&mut grid, &cat);
        assert_eq!(first, vec![Coord::new(1, 0)]);
        assert!(grid.cell(Coord::new(1, 0)).is_contradiction());
        assert_eq!(grid.cell(Coord::new(1, 0)).entropy(), Entropy::Contradiction);

        // Already a contradiction: not reported again.
        assert!(propagate_all(&mut grid, &cat).is_empty());
        assert!(!grid.cell(Coord::new(1, 0)).domain().contains(TileId(1)));
    }
}
