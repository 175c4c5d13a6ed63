//! Weighted random collapse of a single cell.

use std::collections::BTreeSet;
use tilegen_catalogue::Catalogue;
use tilegen_common::{Coord, TileId};

use crate::entropy::normalized_weights;
use crate::grid::{Domain, Grid};
use crate::propagate::propagate;
use crate::rng::TileRng;

/// What one collapse did to the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapseOutcome {
    pub tile: TileId,
    /// The uniform sample that selected `tile`.
    pub sample: f64,
    /// Neighbors that became contradictions while propagating from the cell.
    pub contradictions: Vec<Coord>,
}

/// Roulette-wheel selection: the first variant in catalogue order whose
/// cumulative probability reaches `r`. Zero-probability variants are never chosen.
///
/// `domain` must not be empty.
pub fn pick_weighted(domain: &BTreeSet<TileId>, catalogue: &Catalogue, r: f64) -> TileId {
    let probs = normalized_weights(domain, catalogue);
    let mut cumulative = 0.0;
    let mut last = None;
    for (tile, p) in probs {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        last = Some(tile);
        if cumulative >= r {
            return tile;
        }
    }
    // Rounding can leave the final cumulative value just below r.
    last.expect("pick_weighted needs a non-empty domain")
}

/// Collapse the unresolved cell `at` to one of its candidates and propagate
/// from it.
///
/// # Panics
/// When the cell is already resolved or has no candidates. Both are caller
/// bugs: the selector never offers such cells.
pub fn collapse(
    grid: &mut Grid,
    catalogue: &Catalogue,
    at: Coord,
    rng: &mut dyn TileRng,
) -> CollapseOutcome {
    let cell = grid.cell(at);
    assert!(
        cell.current().is_none(),
        "collapse on resolved cell {at}"
    );
    let domain = match cell.domain() {
        Domain::Candidates(set) if !set.is_empty() => set.clone(),
        Domain::Candidates(_) => panic!("no valid states at {at}: domain is empty"),
        Domain::Unconstrained => panic!("no valid states at {at}: cell was never constrained"),
    };

    let sample = rng.next_f64();
    let tile = pick_weighted(&domain, catalogue, sample);
    grid.commit(at, tile);
    tracing::debug!(
        %at,
        tile = catalogue.name(tile),
        candidates = domain.len(),
        sample,
        remaining = grid.remaining(),
        "collapsed"
    );

    let contradictions = propagate(grid, catalogue, at);
    CollapseOutcome {
        tile,
        sample,
        contradictions,
    }
}
