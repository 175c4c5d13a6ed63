//! Developer Tooling: read-only inspection of a solver's grid.
//!
//! # Invariants
//! - Inspection never mutates the grid or advances the solver.

mod inspector;

pub use inspector::{CellInfo, GridInspector, GridSummary};

pub fn crate_info() -> &'static str {
    "tilegen-tools v0.1.0"
}
