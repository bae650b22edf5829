//! Solution representation for a knot diagram drawn on a square grid.
//!
//! A [`Solution`] fixes, for every crossing of a PD code, an integer grid
//! position and one of four orientations. The PD code itself is shared
//! and immutable; only positions and directions are search variables.

use std::sync::Arc;

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// One PD-code entry: the four arc labels meeting at a crossing.
pub type PdTuple = [i32; 4];

/// A full PD code, shared between every solution of one search.
pub type PdCode = Arc<[PdTuple]>;

/// Smallest coordinate a crossing may occupy.
///
/// Crossings keep one free cell to the grid border so that all four
/// sockets stay inside `[1, grid_size]`.
pub const MIN_COORD: i32 = 2;

/// Integer grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (L1) distance.
    #[inline]
    pub fn manhattan(self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Draws a point uniformly from `[MIN_COORD, grid_size - 1]^2`.
    pub fn random<R: Rng>(grid_size: i32, rng: &mut R) -> Point {
        Point::new(
            rng.random_range(MIN_COORD..grid_size),
            rng.random_range(MIN_COORD..grid_size),
        )
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

/// Orientation of a crossing.
///
/// The value names the side on which the first PD slot (the incoming
/// under-strand) leaves the crossing; the remaining slots follow
/// counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    East = 0,
    North = 1,
    West = 2,
    South = 3,
}

impl Direction {
    /// All orientations in counter-clockwise order.
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::North,
        Direction::West,
        Direction::South,
    ];

    pub fn from_index(index: i32) -> Option<Direction> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    #[inline]
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Unit step `(dx, dy)` towards this side.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::North => (0, 1),
            Direction::West => (-1, 0),
            Direction::South => (0, -1),
        }
    }

    /// Rotates counter-clockwise by `steps` quarter turns.
    #[inline]
    pub fn rotate(self, steps: usize) -> Direction {
        Self::ALL[(self as usize + steps) % 4]
    }

    pub fn random<R: Rng>(rng: &mut R) -> Direction {
        Self::ALL[rng.random_range(0..4)]
    }

    /// Socket cell of PD slot `slot` for a crossing at `center` with this
    /// orientation.
    #[inline]
    pub fn socket(self, center: Point, slot: usize) -> Point {
        let (dx, dy) = self.rotate(slot).delta();
        center.offset(dx, dy)
    }
}

/// Grid side length as a function of the crossing count.
///
/// `grid_size = per_crossing * n + margin`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridSizeRule {
    pub per_crossing: i32,
    pub margin: i32,
}

impl Default for GridSizeRule {
    fn default() -> Self {
        Self {
            per_crossing: 10,
            margin: 1,
        }
    }
}

impl GridSizeRule {
    pub fn grid_size(&self, crossing_number: usize) -> i32 {
        self.per_crossing * crossing_number as i32 + self.margin
    }

    /// Number of crossings that fit on a lattice of spacing 3 inside the
    /// usable coordinate range. When this is at least the crossing count,
    /// a feasible layout is guaranteed to exist.
    pub fn lattice_capacity(grid_size: i32) -> usize {
        if grid_size <= MIN_COORD {
            return 0;
        }
        let per_axis = ((grid_size - 1 - MIN_COORD) / 3 + 1) as usize;
        per_axis * per_axis
    }
}

/// A candidate layout.
///
/// Cloning produces an independent copy of the search variables; the PD
/// code is shared since it never changes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    grid_size: i32,
    positions: Vec<Point>,
    directions: Vec<Direction>,
    pd_code: PdCode,
}

impl Solution {
    /// Builds a solution, checking lengths and coordinate bounds.
    pub fn new(
        grid_size: i32,
        positions: Vec<Point>,
        directions: Vec<Direction>,
        pd_code: impl Into<PdCode>,
    ) -> LayoutResult<Self> {
        let pd_code = pd_code.into();
        if pd_code.is_empty() {
            return Err(LayoutError::InvalidSolution(
                "pd code has no crossings".into(),
            ));
        }
        if grid_size <= MIN_COORD {
            return Err(LayoutError::InvalidSolution(format!(
                "grid_size must exceed {MIN_COORD}, got {grid_size}"
            )));
        }
        if positions.len() != pd_code.len() || directions.len() != pd_code.len() {
            return Err(LayoutError::InvalidSolution(format!(
                "expected {} positions and directions, got {} and {}",
                pd_code.len(),
                positions.len(),
                directions.len()
            )));
        }
        let max = grid_size - 1;
        if let Some(p) = positions
            .iter()
            .find(|p| p.x < MIN_COORD || p.x > max || p.y < MIN_COORD || p.y > max)
        {
            return Err(LayoutError::InvalidSolution(format!(
                "position ({}, {}) outside [{MIN_COORD}, {max}]",
                p.x, p.y
            )));
        }
        Ok(Self {
            grid_size,
            positions,
            directions,
            pd_code,
        })
    }

    /// Samples every position and direction uniformly. The result may
    /// violate the separation rule.
    pub fn random<R: Rng>(grid_size: i32, pd_code: PdCode, rng: &mut R) -> LayoutResult<Self> {
        let n = pd_code.len();
        let positions = (0..n).map(|_| Point::random(grid_size, rng)).collect();
        let directions = (0..n).map(|_| Direction::random(rng)).collect();
        Self::new(grid_size, positions, directions, pd_code)
    }

    #[inline]
    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    #[inline]
    pub fn crossing_number(&self) -> usize {
        self.pd_code.len()
    }

    #[inline]
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    #[inline]
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    #[inline]
    pub fn pd_code(&self) -> &PdCode {
        &self.pd_code
    }

    /// Moves crossing `index` to a new position and orientation.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub(crate) fn place(&mut self, index: usize, position: Point, direction: Direction) {
        self.positions[index] = position;
        self.directions[index] = direction;
    }

    /// Whether any crossing differs in position or direction.
    pub fn differs_from(&self, other: &Solution) -> bool {
        self.positions != other.positions || self.directions != other.directions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn trefoil() -> PdCode {
        vec![[1, 5, 2, 4], [3, 1, 4, 6], [5, 3, 6, 2]].into()
    }

    #[test]
    fn test_direction_rotation_wraps() {
        assert_eq!(Direction::East.rotate(1), Direction::North);
        assert_eq!(Direction::South.rotate(1), Direction::East);
        assert_eq!(Direction::West.rotate(6), Direction::East);
    }

    #[test]
    fn test_direction_from_index() {
        assert_eq!(Direction::from_index(2), Some(Direction::West));
        assert_eq!(Direction::from_index(4), None);
        assert_eq!(Direction::from_index(-1), None);
    }

    #[test]
    fn test_grid_size_rule_default() {
        assert_eq!(GridSizeRule::default().grid_size(11), 111);
        assert_eq!(GridSizeRule::default().grid_size(3), 31);
    }

    #[test]
    fn test_lattice_capacity() {
        // usable coords 2..=7 -> lattice 2, 5 per axis
        assert_eq!(GridSizeRule::lattice_capacity(8), 4);
        assert_eq!(GridSizeRule::lattice_capacity(2), 0);
        assert!(GridSizeRule::lattice_capacity(111) >= 11);
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = Solution::new(
            10,
            vec![Point::new(2, 2)],
            vec![Direction::East],
            trefoil(),
        );
        assert!(matches!(err, Err(LayoutError::InvalidSolution(_))));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        let err = Solution::new(
            10,
            vec![Point::new(2, 2), Point::new(5, 5), Point::new(10, 2)],
            vec![Direction::East; 3],
            trefoil(),
        );
        assert!(matches!(err, Err(LayoutError::InvalidSolution(_))));
    }

    #[test]
    fn test_random_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let s = Solution::random(31, trefoil(), &mut rng).unwrap();
        assert_eq!(s.crossing_number(), 3);
        for p in s.positions() {
            assert!((2..=30).contains(&p.x));
            assert!((2..=30).contains(&p.y));
        }
    }

    #[test]
    fn test_clone_is_independent() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let original = Solution::random(31, trefoil(), &mut rng).unwrap();
        let mut copy = original.clone();
        let moved = if original.positions()[0] == Point::new(2, 2) {
            Point::new(3, 3)
        } else {
            Point::new(2, 2)
        };
        copy.place(0, moved, Direction::South);
        assert_ne!(copy.positions()[0], original.positions()[0]);
        assert!(copy.differs_from(&original));
        assert!(Arc::ptr_eq(copy.pd_code(), original.pd_code()));
    }
}
