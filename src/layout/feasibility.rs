//! Separation filter applied before paying for an evaluator call.

use super::types::Point;
use crate::error::{LayoutError, LayoutResult};

/// Minimum Manhattan distance between any two crossings of a feasible
/// layout. At distance 3 the socket cells of two crossings can no longer
/// coincide.
pub const MIN_SEPARATION: i32 = 3;

/// Smallest pairwise Manhattan distance among `points`.
///
/// Exhaustive `O(n^2)` scan; returns `0` as soon as two points coincide.
///
/// # Errors
///
/// [`LayoutError::InvalidInput`] when fewer than two points are given.
pub fn min_pairwise_distance(points: &[Point]) -> LayoutResult<i32> {
    if points.len() < 2 {
        return Err(LayoutError::InvalidInput {
            points: points.len(),
        });
    }

    let mut min = i32::MAX;
    for (i, &a) in points.iter().enumerate() {
        for &b in &points[i + 1..] {
            let d = a.manhattan(b);
            if d < min {
                min = d;
                if min == 0 {
                    return Ok(0);
                }
            }
        }
    }
    Ok(min)
}

/// Whether `points` are pairwise separated by at least [`MIN_SEPARATION`].
pub fn is_feasible(points: &[Point]) -> LayoutResult<bool> {
    Ok(min_pairwise_distance(points)? >= MIN_SEPARATION)
}
