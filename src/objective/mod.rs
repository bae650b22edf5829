//! Layout scoring.
//!
//! An [`Evaluator`] turns a layout into a non-negative cost; the
//! [`ObjectiveBridge`] wraps one so that the search always sees a totally
//! ordered value, with any failure reported as `+inf`.
//!
//! Two evaluator contracts are supported:
//!
//! - **Array**: [`ArrayEvaluator`] hands the flat `i32` encoding to a function.
//! - **Path**: [`PathEvaluator`] writes the text encoding to a uniquely
//!   named temporary file and hands its path to a function.
//!
//! [`RoutingEvaluator`] is a native evaluator that routes every arc of the
//! diagram on the grid and reports the total wire length.

mod bridge;
mod path;
mod router;

pub use bridge::ObjectiveBridge;
pub use path::PathEvaluator;
pub use router::{RoutedArc, Routing, RoutingEvaluator, MAX_ROUTING_CELLS};

use crate::error::EvaluatorError;
use crate::layout::Solution;

/// A geometric evaluator: encodes a layout and returns its cost.
pub trait Evaluator {
    fn evaluate(&self, solution: &Solution) -> Result<f64, EvaluatorError>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, solution: &Solution) -> Result<f64, EvaluatorError> {
        (**self).evaluate(solution)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, solution: &Solution) -> Result<f64, EvaluatorError> {
        (**self).evaluate(solution)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for std::sync::Arc<E> {
    fn evaluate(&self, solution: &Solution) -> Result<f64, EvaluatorError> {
        (**self).evaluate(solution)
    }
}

/// Array-call adapter: passes [`Solution::to_flat`] to `F`.
///
/// # Examples
///
/// ```
/// use knot_layout::objective::{ArrayEvaluator, Evaluator};
/// use knot_layout::layout::{Direction, Point, Solution};
///
/// let eval = ArrayEvaluator::new(|flat: &[i32]| Ok(flat.len() as f64));
/// let s = Solution::new(
///     10,
///     vec![Point::new(2, 2), Point::new(6, 6)],
///     vec![Direction::East, Direction::West],
///     vec![[1, 3, 2, 4], [3, 1, 4, 2]],
/// )
/// .unwrap();
/// assert_eq!(eval.evaluate(&s).unwrap(), 16.0);
/// ```
pub struct ArrayEvaluator<F> {
    call: F,
}

impl<F> ArrayEvaluator<F>
where
    F: Fn(&[i32]) -> Result<f64, EvaluatorError>,
{
    pub fn new(call: F) -> Self {
        Self { call }
    }
}

impl<F> Evaluator for ArrayEvaluator<F>
where
    F: Fn(&[i32]) -> Result<f64, EvaluatorError>,
{
    fn evaluate(&self, solution: &Solution) -> Result<f64, EvaluatorError> {
        (self.call)(&solution.to_flat())
    }
}
