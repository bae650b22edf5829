//! Error types for knot layout search.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors surfaced to callers of the layout search.
///
/// Evaluator failures are not represented here: the objective bridge
/// converts them into an infinite cost (see [`EvaluatorError`]).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// The feasibility check needs at least two points.
    #[error("at least 2 points are required to measure separation, got {points}")]
    InvalidInput {
        /// Number of points that were supplied.
        points: usize,
    },

    /// A solution violates its structural invariants.
    #[error("invalid solution: {0}")]
    InvalidSolution(String),

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The neighbor generator exhausted its retry budget.
    #[error("no feasible neighbor found after {attempts} draws")]
    MissingFeasibleNeighbor {
        /// Number of rejected draws.
        attempts: usize,
    },

    /// Random sampling never produced a layout meeting the separation rule.
    #[error("no feasible layout sampled after {draws} draws")]
    NoFeasibleLayout {
        /// Number of rejected draws.
        draws: usize,
    },

    /// The engine was started without an initial solution and the
    /// neighborhood cannot produce one on its own.
    #[error("an initial solution is required: the neighborhood cannot seed one")]
    MissingInitialSolution,
}

/// Failures of the external geometric evaluator.
///
/// These never propagate out of [`crate::objective::ObjectiveBridge`];
/// they are mapped to `f64::INFINITY`.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// The evaluator could not be reached (library missing, not loaded).
    #[error("evaluator unavailable: {0}")]
    Unavailable(String),

    /// The evaluator ran but reported an error.
    #[error("evaluator failure: {0}")]
    Failure(String),

    /// The evaluator returned a negative cost, which signals failure.
    #[error("evaluator returned negative cost {0}")]
    NegativeCost(f64),

    /// The evaluator refused the encoded layout as malformed.
    #[error("layout rejected: {0}")]
    Rejected(String),

    /// Marshalling the layout to the evaluator failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = LayoutError::InvalidInput { points: 1 };
        assert_eq!(
            err.to_string(),
            "at least 2 points are required to measure separation, got 1"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EvaluatorError = io.into();
        assert!(matches!(err, EvaluatorError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
