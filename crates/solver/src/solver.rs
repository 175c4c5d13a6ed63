use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tilegen_catalogue::Catalogue;
use tilegen_common::{Coord, TileId};

use crate::collapse::collapse;
use crate::entropy::find_min_entropy_cell;
use crate::grid::{CellView, Grid};
use crate::propagate::{propagate, propagate_all};
use crate::rng::{StdRandom, TileRng};

/// Solver configuration: grid dimensions and RNG seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub width: usize,
    pub height: usize,
    /// Seed for the default [`StdRandom`] source.
    pub rng_seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            width: 12,
            height: 12,
            rng_seed: 0,
        }
    }
}

impl SolverConfig {
    /// The designated center cell used for the default seed.
    pub fn center(&self) -> Coord {
        Coord::new(self.width / 2, self.height / 2)
    }
}

/// Errors from solver initialization or from replaying a malformed event log.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    ZeroSizedGrid { width: usize, height: usize },
    #[error("no seed cells given")]
    NoSeeds,
    #[error("catalogue has no default tile to seed with")]
    NoDefaultTile,
    #[error("cell {at} outside {width}x{height} grid")]
    SeedOutOfBounds {
        at: Coord,
        width: usize,
        height: usize,
    },
    #[error("cell {at} uses unknown tile {tile}")]
    UnknownTile { at: Coord, tile: TileId },
    #[error("cell {0} seeded twice")]
    DuplicateSeed(Coord),
    /// A replayed collapse targets a cell that is already resolved.
    #[error("replayed collapse at {0} hits a resolved cell")]
    InvalidEvent(Coord),
}

/// Result of one externally triggered step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Collapsed { at: Coord, tile: TileId },
    Solved,
    Stuck,
}

/// Result of running until no step is possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalResult {
    Solved,
    /// No cell can be collapsed; carries every unresolved cell.
    Stuck(Vec<Coord>),
    /// The step limit ran out first.
    Interrupted { steps: usize },
}

/// Where the driver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    /// A target cell is waiting to be collapsed.
    Solving,
    Solved,
    /// Unresolved cells remain but none has candidates.
    Stuck,
}

/// A record of every grid mutation made by the driver.
///
/// Replaying the log rebuilds the same grid without drawing randomness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolverEvent {
    /// Cell fixed directly during seeding.
    Seeded { at: Coord, tile: TileId },
    /// Cell fixed by a weighted draw.
    Collapsed { at: Coord, tile: TileId, sample: f64 },
    /// An unresolved cell lost its last candidate.
    Contradiction { at: Coord },
}

/// Owns the grid of one generation run and drives it from seeding to
/// solved or stuck.
///
/// `Seeding -> Propagating(initial) -> Selecting -> [Collapsing <-> Selecting] -> Solved | Stuck`.
/// Seeding, the initial sweep and the first selection happen in
/// [`Solver::initialize`]; each [`Solver::advance_one_step`] collapses the
/// remembered target and selects the next one.
pub struct Solver<'c, R: TileRng = StdRandom> {
    catalogue: &'c Catalogue,
    grid: Grid,
    rng: R,
    status: SolverStatus,
    target: Option<Coord>,
    steps: usize,
    event_log: Vec<SolverEvent>,
}

impl<'c> Solver<'c, StdRandom> {
    /// Seed the given cells, run the initial propagation sweep and select
    /// the first target. Uses a [`StdRandom`] seeded from the config.
    pub fn initialize(
        catalogue: &'c Catalogue,
        config: &SolverConfig,
        seeds: &[(Coord, TileId)],
    ) -> Result<Self, SolverError> {
        Self::with_rng(catalogue, config, seeds, StdRandom::from_seed(config.rng_seed))
    }

    /// Seed the center cell with the catalogue's default tile.
    pub fn with_default_seed(
        catalogue: &'c Catalogue,
        config: &SolverConfig,
    ) -> Result<Self, SolverError> {
        let tile = catalogue.default_tile().ok_or(SolverError::NoDefaultTile)?;
        Self::initialize(catalogue, config, &[(config.center(), tile)])
    }

    /// Rebuild a solver from an event log.
    ///
    /// Seeds are applied and swept as in [`Solver::initialize`], then every
    /// collapse is committed in order. The grid matches the recorded run;
    /// the RNG restarts from the config seed.
    pub fn replay(
        catalogue: &'c Catalogue,
        config: &SolverConfig,
        events: &[SolverEvent],
    ) -> Result<Self, SolverError> {
        let seeds: Vec<(Coord, TileId)> = events
            .iter()
            .filter_map(|e| match e {
                SolverEvent::Seeded { at, tile } => Some((*at, *tile)),
                _ => None,
            })
            .collect();
        let mut solver = Self::initialize(catalogue, config, &seeds)?;

        for event in events {
            if let SolverEvent::Collapsed { at, tile, sample } = event {
                solver.check_replayed(*at, *tile)?;
                solver.grid.commit(*at, *tile);
                solver.steps += 1;
                solver.event_log.push(SolverEvent::Collapsed {
                    at: *at,
                    tile: *tile,
                    sample: *sample,
                });
                for c in propagate(&mut solver.grid, catalogue, *at) {
                    solver.event_log.push(SolverEvent::Contradiction { at: c });
                }
            }
        }
        solver.select_next();
        Ok(solver)
    }
}

impl<'c, R: TileRng> Solver<'c, R> {
    /// [`Solver::initialize`] with a caller-supplied random source.
    pub fn with_rng(
        catalogue: &'c Catalogue,
        config: &SolverConfig,
        seeds: &[(Coord, TileId)],
        rng: R,
    ) -> Result<Self, SolverError> {
        let (width, height) = (config.width, config.height);
        if width == 0 || height == 0 {
            return Err(SolverError::ZeroSizedGrid { width, height });
        }
        if seeds.is_empty() {
            return Err(SolverError::NoSeeds);
        }
        let mut seen = BTreeSet::new();
        for (at, tile) in seeds {
            if at.i >= width || at.j >= height {
                return Err(SolverError::SeedOutOfBounds {
                    at: *at,
                    width,
                    height,
                });
            }
            if catalogue.get(*tile).is_none() {
                return Err(SolverError::UnknownTile {
                    at: *at,
                    tile: *tile,
                });
            }
            if !seen.insert(*at) {
                return Err(SolverError::DuplicateSeed(*at));
            }
        }

        let mut solver = Self {
            catalogue,
            grid: Grid::new(width, height),
            rng,
            status: SolverStatus::Solving,
            target: None,
            steps: 0,
            event_log: Vec::new(),
        };

        for (at, tile) in seeds {
            tracing::debug!(%at, tile = catalogue.name(*tile), "seeded");
            solver.grid.commit(*at, *tile);
            solver.event_log.push(SolverEvent::Seeded {
                at: *at,
                tile: *tile,
            });
        }

        for at in propagate_all(&mut solver.grid, catalogue) {
            solver.event_log.push(SolverEvent::Contradiction { at });
        }

        solver.select_next();
        tracing::info!(
            width,
            height,
            seeds = seeds.len(),
            status = ?solver.status,
            "solver initialized"
        );
        Ok(solver)
    }

    /// Collapse the current target and select the next one.
    pub fn advance_one_step(&mut self) -> StepResult {
        let _span = tracing::info_span!("solver_step", step = self.steps).entered();

        let Some(at) = self.target.take() else {
            return match self.status {
                SolverStatus::Solved => StepResult::Solved,
                _ => StepResult::Stuck,
            };
        };

        let outcome = collapse(&mut self.grid, self.catalogue, at, &mut self.rng);
        self.steps += 1;
        self.event_log.push(SolverEvent::Collapsed {
            at,
            tile: outcome.tile,
            sample: outcome.sample,
        });
        for c in outcome.contradictions {
            self.event_log.push(SolverEvent::Contradiction { at: c });
        }

        self.select_next();
        StepResult::Collapsed {
            at,
            tile: outcome.tile,
        }
    }

    /// Step until the grid is solved or stuck.
    pub fn run_to_completion(&mut self) -> FinalResult {
        loop {
            if let Some(done) = self.finished() {
                return done;
            }
            self.advance_one_step();
        }
    }

    /// Step at most `max_steps` times.
    pub fn run_with_limit(&mut self, max_steps: usize) -> FinalResult {
        for _ in 0..max_steps {
            if let Some(done) = self.finished() {
                return done;
            }
            self.advance_one_step();
        }
        self.finished()
            .unwrap_or(FinalResult::Interrupted { steps: self.steps })
    }

    /// Read-only view of cell `(i, j)`.
    pub fn cell_at(&self, i: usize, j: usize) -> CellView {
        self.grid.view(Coord::new(i, j))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn catalogue(&self) -> &'c Catalogue {
        self.catalogue
    }

    pub fn status(&self) -> SolverStatus {
        self.status
    }

    /// Cell the next step will collapse.
    pub fn next_target(&self) -> Option<Coord> {
        self.target
    }

    /// Number of collapses performed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Cells without a committed tile.
    pub fn remaining(&self) -> usize {
        self.grid.remaining()
    }

    pub fn events(&self) -> &[SolverEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SolverEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn state_hash(&self) -> u64 {
        self.grid.state_hash()
    }

    fn check_replayed(&self, at: Coord, tile: TileId) -> Result<(), SolverError> {
        if !self.grid.contains(at) {
            return Err(SolverError::SeedOutOfBounds {
                at,
                width: self.grid.width(),
                height: self.grid.height(),
            });
        }
        if self.catalogue.get(tile).is_none() {
            return Err(SolverError::UnknownTile { at, tile });
        }
        if self.grid.cell(at).is_resolved() {
            return Err(SolverError::InvalidEvent(at));
        }
        Ok(())
    }

    fn finished(&self) -> Option<FinalResult> {
        match self.status {
            SolverStatus::Solving => None,
            SolverStatus::Solved => Some(FinalResult::Solved),
            SolverStatus::Stuck => Some(FinalResult::Stuck(self.grid.unresolved())),
        }
    }

    fn select_next(&mut self) {
        self.target = find_min_entropy_cell(&mut self.grid, self.catalogue);
        self.status = match self.target {
            Some(_) => SolverStatus::Solving,
            None if self.grid.is_solved() => SolverStatus::Solved,
            None => SolverStatus::Stuck,
        };
        match self.status {
            SolverStatus::Solved => tracing::info!(steps = self.steps, "grid solved"),
            SolverStatus::Stuck => tracing::warn!(
                steps = self.steps,
                unresolved = self.grid.remaining(),
                contradictions = self.grid.contradictions().len(),
                "no collapsible cell left"
            ),
            SolverStatus::Solving => {}
        }
    }
}
