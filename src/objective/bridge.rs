//! Failure-absorbing adapter between evaluators and the search.

use std::panic::{catch_unwind, AssertUnwindSafe};

use super::Evaluator;
use crate::error::EvaluatorError;
use crate::layout::Solution;
use crate::sa::Objective;

/// Wraps an [`Evaluator`] so that every call yields a usable cost.
///
/// Errors, panics, negative and NaN results from the evaluator all map to
/// `f64::INFINITY` and are logged at `warn`.
#[derive(Debug, Clone)]
pub struct ObjectiveBridge<E> {
    evaluator: E,
}

impl<E: Evaluator> ObjectiveBridge<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Scores `solution`; `+inf` on any evaluator failure.
    pub fn evaluate(&self, solution: &Solution) -> f64 {
        match self.try_evaluate(solution) {
            Ok(cost) => cost,
            Err(err) => {
                tracing::warn!(error = %err, "evaluator failed, treating layout as infeasible");
                f64::INFINITY
            }
        }
    }

    /// Scores `solution`, keeping the failure reason.
    pub fn try_evaluate(&self, solution: &Solution) -> Result<f64, EvaluatorError> {
        let cost = catch_unwind(AssertUnwindSafe(|| self.evaluator.evaluate(solution)))
            .map_err(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "evaluator panicked".to_string());
                EvaluatorError::Failure(reason)
            })??;

        if cost.is_nan() {
            return Err(EvaluatorError::Failure("evaluator returned NaN".into()));
        }
        if cost < 0.0 {
            return Err(EvaluatorError::NegativeCost(cost));
        }
        Ok(cost)
    }
}

impl<E: Evaluator> Objective<Solution> for ObjectiveBridge<E> {
    fn cost(&self, solution: &Solution) -> f64 {
        self.evaluate(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Direction, Point};
    use crate::objective::ArrayEvaluator;

    fn sample() -> Solution {
        Solution::new(
            12,
            vec![Point::new(2, 2), Point::new(8, 8)],
            vec![Direction::East, Direction::South],
            vec![[1, 3, 2, 4], [3, 1, 4, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_passes_through_cost() {
        let bridge = ObjectiveBridge::new(ArrayEvaluator::new(|flat: &[i32]| Ok(flat[0] as f64)));
        assert_eq!(bridge.evaluate(&sample()), 12.0);
    }

    #[test]
    fn test_error_becomes_infinity() {
        let bridge = ObjectiveBridge::new(ArrayEvaluator::new(|_: &[i32]| {
            Err(EvaluatorError::Unavailable("library not loaded".into()))
        }));
        assert_eq!(bridge.evaluate(&sample()), f64::INFINITY);
        assert!(matches!(
            bridge.try_evaluate(&sample()),
            Err(EvaluatorError::Unavailable(_))
        ));
    }

    #[test]
    fn test_negative_becomes_infinity() {
        let bridge = ObjectiveBridge::new(ArrayEvaluator::new(|_: &[i32]| Ok(-1.0)));
        assert_eq!(bridge.evaluate(&sample()), f64::INFINITY);
        assert!(matches!(
            bridge.try_evaluate(&sample()),
            Err(EvaluatorError::NegativeCost(_))
        ));
    }

    #[test]
    fn test_nan_becomes_infinity() {
        let bridge = ObjectiveBridge::new(ArrayEvaluator::new(|_: &[i32]| Ok(f64::NAN)));
        assert_eq!(bridge.evaluate(&sample()), f64::INFINITY);
    }

    #[test]
    fn test_panic_becomes_infinity() {
        let crash = |_: &[i32]| -> Result<f64, EvaluatorError> { panic!("native crash") };
        let bridge = ObjectiveBridge::new(ArrayEvaluator::new(crash));
        assert_eq!(bridge.evaluate(&sample()), f64::INFINITY);
        match bridge.try_evaluate(&sample()) {
            Err(EvaluatorError::Failure(reason)) => assert_eq!(reason, "native crash"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_usable_as_objective() {
        let bridge = ObjectiveBridge::new(ArrayEvaluator::new(|flat: &[i32]| Ok(flat[1] as f64)));
        assert_eq!(Objective::cost(&bridge, &sample()), 2.0);
    }
}
