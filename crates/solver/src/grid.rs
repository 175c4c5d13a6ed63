use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tilegen_common::{Coord, TileId};

/// Value reported by [`Entropy::as_f64`] for a cell no propagation has reached.
/// Larger than any real entropy; not an entropy itself.
pub const UNCONSTRAINED_ENTROPY: f64 = 99.0;

/// Candidate set of an unresolved cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Domain {
    /// Never touched by propagation: every variant is still possible.
    Unconstrained,
    /// Explicit candidates. Empty means contradiction for an unresolved cell.
    Candidates(BTreeSet<TileId>),
}

impl Domain {
    /// Number of explicit candidates; `0` while unconstrained.
    pub fn len(&self) -> usize {
        match self {
            Domain::Unconstrained => 0,
            Domain::Candidates(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Domain::Unconstrained)
    }

    pub fn candidates(&self) -> Option<&BTreeSet<TileId>> {
        match self {
            Domain::Unconstrained => None,
            Domain::Candidates(set) => Some(set),
        }
    }

    pub fn contains(&self, tile: TileId) -> bool {
        match self {
            Domain::Unconstrained => true,
            Domain::Candidates(set) => set.contains(&tile),
        }
    }

    /// Subset test where `Unconstrained` stands for the full catalogue.
    pub fn is_subset_of(&self, other: &Domain) -> bool {
        match (self, other) {
            (_, Domain::Unconstrained) => true,
            (Domain::Unconstrained, Domain::Candidates(_)) => false,
            (Domain::Candidates(a), Domain::Candidates(b)) => a.is_subset(b),
        }
    }
}

/// Cached entropy of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Entropy {
    Unconstrained,
    Computed(f64),
    Resolved,
    Contradiction,
}

impl Entropy {
    /// Scalar form for renderers: the sentinel for unconstrained cells,
    /// `0` for resolved ones, infinity for contradictions.
    pub fn as_f64(self) -> f64 {
        match self {
            Entropy::Unconstrained => UNCONSTRAINED_ENTROPY,
            Entropy::Computed(e) => e,
            Entropy::Resolved => 0.0,
            Entropy::Contradiction => f64::INFINITY,
        }
    }
}

/// State of one grid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) current: Option<TileId>,
    pub(crate) domain: Domain,
    pub(crate) entropy: Entropy,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            current: None,
            domain: Domain::Unconstrained,
            entropy: Entropy::Unconstrained,
        }
    }
}

impl Cell {
    pub fn current(&self) -> Option<TileId> {
        self.current
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn entropy(&self) -> Entropy {
        self.entropy
    }

    pub fn is_resolved(&self) -> bool {
        self.current.is_some()
    }

    /// Unresolved with every candidate eliminated.
    pub fn is_contradiction(&self) -> bool {
        self.current.is_none() && matches!(&self.domain, Domain::Candidates(s) if s.is_empty())
    }
}

/// Read-only view of a cell for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub current: Option<TileId>,
    pub domain_size: usize,
    pub entropy: Entropy,
}

/// Fixed-size 2-D array of cells stored row-major.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    remaining: usize,
}

impl Grid {
    /// A grid with every cell unresolved and unconstrained.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            remaining: width * height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells without a committed tile.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_solved(&self) -> bool {
        self.remaining == 0
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.i < self.width && at.j < self.height
    }

    /// Cell at `at`. Panics when out of bounds.
    pub fn cell(&self, at: Coord) -> &Cell {
        &self.cells[self.index(at)]
    }

    pub(crate) fn cell_mut(&mut self, at: Coord) -> &mut Cell {
        let idx = self.index(at);
        &mut self.cells[idx]
    }

    pub fn view(&self, at: Coord) -> CellView {
        let cell = self.cell(at);
        CellView {
            current: cell.current,
            domain_size: cell.domain.len(),
            entropy: cell.entropy,
        }
    }

    /// All coordinates in row-major scan order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height).flat_map(move |j| (0..self.width).map(move |i| Coord::new(i, j)))
    }

    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.coords().zip(self.cells.iter())
    }

    pub fn unresolved(&self) -> Vec<Coord> {
        self.cells()
            .filter(|(_, c)| !c.is_resolved())
            .map(|(at, _)| at)
            .collect()
    }

    pub fn contradictions(&self) -> Vec<Coord> {
        self.cells()
            .filter(|(_, c)| c.is_contradiction())
            .map(|(at, _)| at)
            .collect()
    }

    /// Fix `tile` at `at`: the domain is cleared and the entropy becomes resolved.
    pub(crate) fn commit(&mut self, at: Coord, tile: TileId) {
        let cell = self.cell_mut(at);
        let was_unresolved = cell.current.is_none();
        cell.current = Some(tile);
        cell.domain = Domain::Candidates(BTreeSet::new());
        cell.entropy = Entropy::Resolved;
        if was_unresolved {
            self.remaining -= 1;
        }
    }

    /// FNV-1a over the cell states in scan order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &(self.width as u64).to_le_bytes());
        mix(&mut h, &(self.height as u64).to_le_bytes());
        for cell in &self.cells {
            match cell.current {
                Some(tile) => {
                    mix(&mut h, &[1]);
                    mix(&mut h, &tile.0.to_le_bytes());
                }
                None => mix(&mut h, &[0]),
            }
            match &cell.domain {
                Domain::Unconstrained => mix(&mut h, &[0xff]),
                Domain::Candidates(set) => {
                    mix(&mut h, &(set.len() as u32).to_le_bytes());
                    for tile in set {
                        mix(&mut h, &tile.0.to_le_bytes());
                    }
                }
            }
        }
        h
    }

    fn index(&self, at: Coord) -> usize {
        assert!(
            self.contains(at),
            "{at} outside {}x{} grid",
            self.width,
            self.height
        );
        at.j * self.width + at.i
    }
}
