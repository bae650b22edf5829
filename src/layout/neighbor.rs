//! Local moves over crossing layouts.

use rand::Rng;

use super::feasibility::is_feasible;
use super::types::{Direction, Point, Solution};
use crate::error::{LayoutError, LayoutResult};
use crate::sa::Neighborhood;

/// Default cap on rejected draws per proposal.
pub const DEFAULT_MAX_RETRIES: usize = 1_000_000;

/// Re-places crossings of a parent layout until the result is feasible.
///
/// Each proposal redraws two crossings: the one picked by an internal
/// rotating counter, so every crossing is revisited at a steady rate,
/// and one picked uniformly at random. The counter belongs to this
/// instance; independent searches must use independent generators.
#[derive(Debug, Clone)]
pub struct LayoutNeighborhood {
    calls: usize,
    max_retries: Option<usize>,
}

impl Default for LayoutNeighborhood {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutNeighborhood {
    pub fn new() -> Self {
        Self {
            calls: 0,
            max_retries: Some(DEFAULT_MAX_RETRIES),
        }
    }

    /// Caps rejected draws per proposal. `None` retries forever.
    pub fn with_max_retries(mut self, max_retries: Option<usize>) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Number of proposals made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Returns a feasible copy of `parent` with at least one crossing
    /// moved or turned. `parent` itself is left untouched.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::InvalidInput`] for layouts with fewer than two crossings.
    /// - [`LayoutError::MissingFeasibleNeighbor`] when the retry cap is hit.
    pub fn propose<R: Rng>(&mut self, parent: &Solution, rng: &mut R) -> LayoutResult<Solution> {
        self.calls += 1;
        let n = parent.crossing_number();
        let grid_size = parent.grid_size();
        let rotating = self.calls % n;

        let mut rejected = 0usize;
        loop {
            let mut candidate = parent.clone();
            for index in [rotating, rng.random_range(0..n)] {
                candidate.place(index, Point::random(grid_size, rng), Direction::random(rng));
            }

            if is_feasible(candidate.positions())? && candidate.differs_from(parent) {
                if rejected > 0 {
                    tracing::trace!(rejected, "neighbor accepted after retries");
                }
                return Ok(candidate);
            }

            rejected += 1;
            if self.max_retries.is_some_and(|cap| rejected >= cap) {
                return Err(LayoutError::MissingFeasibleNeighbor { attempts: rejected });
            }
        }
    }
}

impl Neighborhood<Solution> for LayoutNeighborhood {
    fn propose<R: Rng>(&mut self, solution: &Solution, rng: &mut R) -> LayoutResult<Solution> {
        LayoutNeighborhood::propose(self, solution, rng)
    }
}
