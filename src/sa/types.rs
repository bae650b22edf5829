//! Strategy seams of the annealing engine.

use rand::Rng;

use crate::error::LayoutResult;

/// Scores a solution. Lower is better.
///
/// Implementations must always return a totally ordered value; use
/// `f64::INFINITY` for solutions that cannot be evaluated.
pub trait Objective<S> {
    fn cost(&self, solution: &S) -> f64;
}

impl<S, F> Objective<S> for F
where
    F: Fn(&S) -> f64,
{
    fn cost(&self, solution: &S) -> f64 {
        self(solution)
    }
}

/// Produces local perturbations of a solution.
///
/// Takes `&mut self` so that a generator can keep per-instance state
/// (for example a rotating index) without any global counter.
///
/// # Examples
///
/// ```
/// use knot_layout::sa::Neighborhood;
/// use knot_layout::LayoutResult;
/// use rand::Rng;
///
/// struct Jitter;
///
/// impl Neighborhood<f64> for Jitter {
///     fn propose<R: Rng>(&mut self, x: &f64, rng: &mut R) -> LayoutResult<f64> {
///         Ok(x + rng.random_range(-1.0..1.0))
///     }
/// }
/// ```
pub trait Neighborhood<S> {
    /// Returns a new solution close to `solution`. Must not mutate it.
    fn propose<R: Rng>(&mut self, solution: &S, rng: &mut R) -> LayoutResult<S>;

    /// Creates a starting point when the caller supplies none.
    ///
    /// The default declines, which makes the engine require an explicit
    /// initial solution.
    fn seed<R: Rng>(&mut self, _rng: &mut R) -> Option<LayoutResult<S>> {
        None
    }
}
