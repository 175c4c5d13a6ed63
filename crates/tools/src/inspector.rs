use serde::Serialize;
use std::fmt::Write as _;
use tilegen_common::Coord;
use tilegen_solver::{Domain, Solver, SolverStatus, TileRng};

/// Grid inspector for developer tooling.
///
/// Provides read-only queries against a solver for debugging and the CLI.
pub struct GridInspector;

impl GridInspector {
    /// Produce a summary of the grid state.
    pub fn summary<R: TileRng>(solver: &Solver<'_, R>) -> GridSummary {
        let grid = solver.grid();
        let unresolved = grid.remaining();
        GridSummary {
            width: grid.width(),
            height: grid.height(),
            resolved: grid.width() * grid.height() - unresolved,
            unresolved,
            contradictions: grid.contradictions().len(),
            steps: solver.steps(),
            status: solver.status(),
            state_hash: solver.state_hash(),
        }
    }

    /// Describe one cell, or `None` when `at` lies outside the grid.
    pub fn inspect_cell<R: TileRng>(solver: &Solver<'_, R>, at: Coord) -> Option<CellInfo> {
        let grid = solver.grid();
        if !grid.contains(at) {
            return None;
        }
        let catalogue = solver.catalogue();
        let cell = grid.cell(at);
        let candidates = cell
            .domain()
            .candidates()
            .map(|set| set.iter().map(|t| catalogue.name(*t).to_string()).collect());
        Some(CellInfo {
            at,
            tile: cell.current().map(|t| catalogue.name(t).to_string()),
            candidates,
            entropy: cell.entropy().as_f64(),
            contradiction: cell.is_contradiction(),
        })
    }

    /// One character per cell, one line per row.
    ///
    /// Resolved cells show the first letter of their tile name, unresolved
    /// cells their candidate count (`+` above nine). `?` marks a cell no
    /// propagation has reached and `!` a contradiction.
    pub fn dump<R: TileRng>(solver: &Solver<'_, R>) -> String {
        let grid = solver.grid();
        let catalogue = solver.catalogue();
        let mut out = String::with_capacity((grid.width() + 1) * grid.height());
        for (at, cell) in grid.cells() {
            let ch = match (cell.current(), cell.domain()) {
                (Some(tile), _) => catalogue.name(tile).chars().next().unwrap_or('#'),
                (None, Domain::Unconstrained) => '?',
                (None, Domain::Candidates(set)) => match set.len() {
                    0 => '!',
                    n @ 1..=9 => char::from_digit(n as u32, 10).unwrap_or('+'),
                    _ => '+',
                },
            };
            out.push(ch);
            if at.i + 1 == grid.width() {
                out.push('\n');
            }
        }
        out
    }

    /// Tile names of resolved cells, row by row. Unresolved cells are `None`.
    pub fn tile_names<R: TileRng>(solver: &Solver<'_, R>) -> Vec<Vec<Option<String>>> {
        let grid = solver.grid();
        let catalogue = solver.catalogue();
        (0..grid.height())
            .map(|j| {
                (0..grid.width())
                    .map(|i| {
                        grid.cell(Coord::new(i, j))
                            .current()
                            .map(|t| catalogue.name(t).to_string())
                    })
                    .collect()
            })
            .collect()
    }
}

/// Summary of grid state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct GridSummary {
    pub width: usize,
    pub height: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub contradictions: usize,
    pub steps: usize,
    pub status: SolverStatus,
    pub state_hash: u64,
}

impl std::fmt::Display for GridSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Grid: {}x{} resolved={} unresolved={} contradictions={} steps={} status={:?} hash={:016x}",
            self.width,
            self.height,
            self.resolved,
            self.unresolved,
            self.contradictions,
            self.steps,
            self.status,
            self.state_hash
        )
    }
}

/// Detailed info about a single cell.
#[derive(Debug, Clone, Serialize)]
pub struct CellInfo {
    pub at: Coord,
    pub tile: Option<String>,
    /// `None` while the cell is unconstrained.
    pub candidates: Option<Vec<String>>,
    pub entropy: f64,
    pub contradiction: bool,
}

impl std::fmt::Display for CellInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cell {}", self.at)?;
        match (&self.tile, &self.candidates) {
            (Some(tile), _) => write!(f, " tile={tile}"),
            (None, None) => write!(f, " unconstrained"),
            (None, Some(c)) if c.is_empty() => write!(f, " contradiction"),
            (None, Some(c)) => {
                let mut names = String::new();
                for (n, name) in c.iter().enumerate() {
                    if n > 0 {
                        names.push(',');
                    }
                    let _ = write!(names, "{name}");
                }
                write!(f, " entropy={:.3} candidates=[{names}]", self.entropy)
            }
        }
    }
}
