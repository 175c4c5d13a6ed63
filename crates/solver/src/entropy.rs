//! Shannon entropy over a cell's candidates and lowest-entropy cell selection.

use std::collections::BTreeSet;
use tilegen_catalogue::Catalogue;
use tilegen_common::{Coord, TileId};

use crate::grid::{Cell, Domain, Entropy, Grid};

/// Normalized placement probabilities of `domain`, in catalogue order.
///
/// Falls back to a uniform distribution when every weight is zero.
pub fn normalized_weights(domain: &BTreeSet<TileId>, catalogue: &Catalogue) -> Vec<(TileId, f64)> {
    let total: f64 = domain.iter().map(|t| catalogue.weight(*t)).sum();
    if total > 0.0 {
        domain
            .iter()
            .map(|t| (*t, catalogue.weight(*t) / total))
            .collect()
    } else {
        let uniform = 1.0 / domain.len() as f64;
        domain.iter().map(|t| (*t, uniform)).collect()
    }
}

/// `-sum(p * log2(p))` over the normalized weights of `domain`.
pub fn shannon_entropy(domain: &BTreeSet<TileId>, catalogue: &Catalogue) -> f64 {
    if domain.is_empty() {
        return 0.0;
    }
    let h: f64 = normalized_weights(domain, catalogue)
        .into_iter()
        .filter(|(_, p)| *p > 0.0)
        .map(|(_, p)| -p * p.log2())
        .sum();
    h.max(0.0)
}

/// Entropy classification of a cell from its current state.
pub fn cell_entropy(cell: &Cell, catalogue: &Catalogue) -> Entropy {
    if cell.is_resolved() {
        return Entropy::Resolved;
    }
    match cell.domain() {
        Domain::Unconstrained => Entropy::Unconstrained,
        Domain::Candidates(set) if set.is_empty() => Entropy::Contradiction,
        Domain::Candidates(set) => Entropy::Computed(shannon_entropy(set, catalogue)),
    }
}

/// Refresh cached entropies and return the unresolved, constrained cell with
/// the lowest entropy. Ties go to the first cell in scan order.
///
/// Resolved, unconstrained and contradicted cells are never returned. `None`
/// means every cell is solved or no remaining cell can be collapsed.
pub fn find_min_entropy_cell(grid: &mut Grid, catalogue: &Catalogue) -> Option<Coord> {
    let coords: Vec<Coord> = grid.coords().collect();
    let mut best: Option<(Coord, f64)> = None;

    for at in coords {
        let cell = grid.cell_mut(at);
        if cell.is_resolved() {
            continue;
        }
        cell.entropy = cell_entropy(cell, catalogue);
        let Entropy::Computed(h) = cell.entropy else {
            continue;
        };
        if best.is_none_or(|(_, min)| h < min) {
            best = Some((at, h));
        }
    }

    if let Some((at, h)) = best {
        tracing::trace!(%at, entropy = h, "lowest entropy cell");
    }
    best.map(|(at, _)| at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegen_catalogue::CatalogueBuilder;

    fn weighted(a: f64, b: f64) -> Catalogue {
        CatalogueBuilder::new()
            .filler("a")
            .filler("b")
            .weight("a", a)
            .weight("b", b)
            .build()
            .unwrap()
    }

    fn both(cat: &Catalogue) -> BTreeSet<TileId> {
        cat.ids().collect()
    }

    #[test]
    fn uniform_pair_has_one_bit() {
        let cat = weighted(1.0, 1.0);
        assert_eq!(shannon_entropy(&both(&cat), &cat), 1.0);
    }

    #[test]
    fn lopsided_pair_has_less_than_one_bit() {
        let cat = weighted(3.0, 1.0);
        let h = shannon_entropy(&both(&cat), &cat);
        // -(0.75 log2 0.75 + 0.25 log2 0.25)
        assert!((h - 0.811_278).abs() < 1e-6);
    }

    #[test]
    fn singleton_has_zero_entropy() {
        let cat = weighted(3.0, 1.0);
        let one: BTreeSet<TileId> = [TileId(0)].into_iter().collect();
        assert_eq!(shannon_entropy(&one, &cat), 0.0);
    }

    #[test]
    fn zero_weights_fall_back_to_uniform() {
        let cat = weighted(0.0, 0.0);
        let probs = normalized_weights(&both(&cat), &cat);
        assert_eq!(probs, vec![(TileId(0), 0.5), (TileId(1), 0.5)]);
        assert_eq!(shannon_entropy(&both(&cat), &cat), 1.0);
    }

    #[test]
    fn selector_picks_lowest_and_breaks_ties_by_scan_order() {
        let cat = weighted(3.0, 1.0);
        let mut grid = Grid::new(3, 2);
        let pair = both(&cat);
        let one: BTreeSet<TileId> = [TileId(1)].into_iter().collect();

        grid.cell_mut(Coord::new(0, 0)).domain = Domain::Candidates(pair.clone());
        grid.cell_mut(Coord::new(2, 0)).domain = Domain::Candidates(one.clone());
        grid.cell_mut(Coord::new(1, 1)).domain = Domain::Candidates(one);
        grid.cell_mut(Coord::new(2, 1)).domain = Domain::Candidates(pair);

        assert_eq!(find_min_entropy_cell(&mut grid, &cat), Some(Coord::new(2, 0)));
        assert_eq!(
            grid.cell(Coord::new(0, 0)).entropy(),
            Entropy::Computed(shannon_entropy(&both(&cat), &cat))
        );
    }

    #[test]
    fn selector_skips_contradictions_and_unconstrained_cells() {
        let cat = weighted(1.0, 1.0);
        let mut grid = Grid::new(3, 1);
        grid.cell_mut(Coord::new(0, 0)).domain = Domain::Candidates(BTreeSet::new());
        grid.cell_mut(Coord::new(2, 0)).domain = Domain::Candidates(both(&cat));

        assert_eq!(find_min_entropy_cell(&mut grid, &cat), Some(Coord::new(2, 0)));
        assert_eq!(grid.cell(Coord::new(0, 0)).entropy(), Entropy::Contradiction);
        assert_eq!(grid.cell(Coord::new(1, 0)).entropy(), Entropy::Unconstrained);
    }

    #[test]
    fn selector_returns_none_without_candidates() {
        let cat = weighted(1.0, 1.0);
        let mut grid = Grid::new(2, 2);
        assert_eq!(find_min_entropy_cell(&mut grid, &cat), None);

        for at in grid.coords().collect::<Vec<_>>() {
            grid.commit(at, TileId(0));
        }
        assert_eq!(find_min_entropy_cell(&mut grid, &cat), None);
    }

    #[test]
    fn selected_entropy_is_minimal() {
        let cat = Catalogue::standard();
        let mut grid = Grid::new(6, 6);
        grid.commit(Coord::new(2, 2), cat.by_name("shore_L-T-").unwrap());
        grid.commit(Coord::new(4, 1), cat.by_name("water").unwrap());
        crate::propagate::propagate_all(&mut grid, &cat);

        let chosen = find_min_entropy_cell(&mut grid, &cat).unwrap();
        let min = grid.cell(chosen).entropy().as_f64();
        for (_, cell) in grid.cells() {
            if let Entropy::Computed(h) = cell.entropy() {
                assert!(min <= h);
            }
        }
    }
}
