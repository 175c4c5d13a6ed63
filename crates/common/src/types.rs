use serde::{Deserialize, Serialize};

/// Index of a tile variant inside its catalogue.
///
/// Ids are dense and assigned in catalogue order, so ordering by id is the
/// catalogue iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl TileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the four grid directions.
///
/// `i` grows to the right and `j` grows towards the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    /// All directions in the canonical `L R T B` order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    /// Position of this direction in [`Direction::ALL`], used to index per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Top => 2,
            Direction::Bottom => 3,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
        }
    }

    /// The two directions at right angles to this one.
    pub fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::Left | Direction::Right => [Direction::Top, Direction::Bottom],
            Direction::Top | Direction::Bottom => [Direction::Left, Direction::Right],
        }
    }

    /// Grid offset `(di, dj)` of the neighbor in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Top => (0, -1),
            Direction::Bottom => (0, 1),
        }
    }

    /// Single-letter tag used in variant signatures.
    pub fn letter(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Top => 'T',
            Direction::Bottom => 'B',
        }
    }
}

/// A cell position `(i, j)` with `0 <= i < width` and `0 <= j < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub i: usize,
    pub j: usize,
}

impl Coord {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    /// The neighboring coordinate in `dir`, or `None` when it falls outside
    /// a `width` x `height` grid.
    pub fn step(self, dir: Direction, width: usize, height: usize) -> Option<Coord> {
        let (di, dj) = dir.offset();
        let i = self.i.checked_add_signed(di as isize)?;
        let j = self.j.checked_add_signed(dj as isize)?;
        (i < width && j < height).then_some(Coord { i, j })
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn index_matches_all_order() {
        for (n, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), n);
        }
    }

    #[test]
    fn perpendicular_excludes_axis() {
        let perp = Direction::Left.perpendicular();
        assert!(!perp.contains(&Direction::Left));
        assert!(!perp.contains(&Direction::Right));
    }

    #[test]
    fn step_stays_in_bounds() {
        let origin = Coord::new(0, 0);
        assert_eq!(origin.step(Direction::Left, 3, 3), None);
        assert_eq!(origin.step(Direction::Top, 3, 3), None);
        assert_eq!(origin.step(Direction::Right, 3, 3), Some(Coord::new(1, 0)));
        assert_eq!(origin.step(Direction::Bottom, 3, 3), Some(Coord::new(0, 1)));

        let corner = Coord::new(2, 2);
        assert_eq!(corner.step(Direction::Right, 3, 3), None);
        assert_eq!(corner.step(Direction::Bottom, 3, 3), None);
    }
}
