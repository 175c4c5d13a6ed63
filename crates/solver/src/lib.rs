//! Tile solver: fills a grid with catalogue tiles so that every pair of
//! resolved neighbors is compatible.
//!
//! # Invariants
//! - A resolved cell has an empty domain and zero entropy.
//! - Domains only shrink; propagation is a one-hop intersection.
//! - A contradicted cell stays unresolved and is never selected.
//! - Same catalogue, seeds and RNG seed give the same grid.

mod collapse;
mod entropy;
mod grid;
mod propagate;
mod rng;
mod solver;

pub use collapse::{CollapseOutcome, collapse, pick_weighted};
pub use entropy::{cell_entropy, find_min_entropy_cell, normalized_weights, shannon_entropy};
pub use grid::{Cell, CellView, Domain, Entropy, Grid, UNCONSTRAINED_ENTROPY};
pub use propagate::{propagate, propagate_all};
pub use rng::{ScriptedRandom, StdRandom, TileRng};
pub use solver::{
    FinalResult, Solver, SolverConfig, SolverError, SolverEvent, SolverStatus, StepResult,
};

pub fn crate_info() -> &'static str {
    "tilegen-solver v0.1.0"
}
