//! Evaluator input encodings.
//!
//! Flat layout, shared by both encodings:
//!
//! ```text
//! grid_size, crossing_number, (x, y, direction, pd[0], pd[1], pd[2], pd[3]) * crossing_number
//! ```
//!
//! The text form writes the two header values on their own lines and one
//! whitespace-separated row per crossing.

use std::fmt::Write as _;
use std::sync::Arc;

use super::types::{Direction, PdTuple, Point, Solution};
use crate::error::{LayoutError, LayoutResult};

/// Values per crossing in the flat encoding.
pub const FIELDS_PER_CROSSING: usize = 7;

impl Solution {
    /// Packs the solution into the evaluator's flat integer layout.
    pub fn to_flat(&self) -> Vec<i32> {
        let n = self.crossing_number();
        let mut out = Vec::with_capacity(2 + n * FIELDS_PER_CROSSING);
        out.push(self.grid_size());
        out.push(n as i32);
        for ((p, d), pd) in self
            .positions()
            .iter()
            .zip(self.directions())
            .zip(self.pd_code().iter())
        {
            out.extend_from_slice(&[p.x, p.y, d.index()]);
            out.extend_from_slice(pd);
        }
        out
    }

    /// Inverse of [`Solution::to_flat`].
    pub fn from_flat(values: &[i32]) -> LayoutResult<Solution> {
        let (&grid_size, rest) = values
            .split_first()
            .ok_or_else(|| LayoutError::InvalidSolution("empty encoding".into()))?;
        let (&n, body) = rest
            .split_first()
            .ok_or_else(|| LayoutError::InvalidSolution("missing crossing count".into()))?;
        let n = usize::try_from(n).map_err(|_| {
            LayoutError::InvalidSolution(format!("negative crossing count {n}"))
        })?;
        if body.len() != n * FIELDS_PER_CROSSING {
            return Err(LayoutError::InvalidSolution(format!(
                "expected {} values for {n} crossings, got {}",
                n * FIELDS_PER_CROSSING,
                body.len()
            )));
        }

        let mut positions = Vec::with_capacity(n);
        let mut directions = Vec::with_capacity(n);
        let mut pd_code: Vec<PdTuple> = Vec::with_capacity(n);
        for row in body.chunks_exact(FIELDS_PER_CROSSING) {
            positions.push(Point::new(row[0], row[1]));
            directions.push(Direction::from_index(row[2]).ok_or_else(|| {
                LayoutError::InvalidSolution(format!("direction {} outside 0..=3", row[2]))
            })?);
            pd_code.push([row[3], row[4], row[5], row[6]]);
        }
        Solution::new(grid_size, positions, directions, Arc::<[PdTuple]>::from(pd_code))
    }

    /// Newline-delimited text form handed to path-based evaluators.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.grid_size());
        let _ = writeln!(out, "{}", self.crossing_number());
        for ((p, d), pd) in self
            .positions()
            .iter()
            .zip(self.directions())
            .zip(self.pd_code().iter())
        {
            let _ = writeln!(
                out,
                "{} {} {} {} {} {} {}",
                p.x,
                p.y,
                d.index(),
                pd[0],
                pd[1],
                pd[2],
                pd[3]
            );
        }
        out
    }

    /// Parses the text form. Any whitespace separates values.
    pub fn from_text(text: &str) -> LayoutResult<Solution> {
        let values = text
            .split_whitespace()
            .map(|tok| {
                tok.parse::<i32>().map_err(|e| {
                    LayoutError::InvalidSolution(format!("bad integer {tok:?}: {e}"))
                })
            })
            .collect::<LayoutResult<Vec<i32>>>()?;
        Solution::from_flat(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Solution {
        Solution::new(
            6,
            vec![Point::new(4, 4), Point::new(5, 2), Point::new(2, 2)],
            vec![Direction::West, Direction::North, Direction::East],
            vec![[6, 4, 1, 3], [4, 2, 5, 1], [2, 6, 3, 5]],
        )
        .unwrap()
    }

    #[test]
    fn test_flat_layout() {
        assert_eq!(
            sample().to_flat(),
            vec![6, 3, 4, 4, 2, 6, 4, 1, 3, 5, 2, 1, 4, 2, 5, 1, 2, 2, 0, 2, 6, 3, 5]
        );
    }

    #[test]
    fn test_flat_and_text_invert() {
        let s = sample();
        assert_eq!(Solution::from_flat(&s.to_flat()).unwrap(), s);
        assert_eq!(Solution::from_text(&s.to_text()).unwrap(), s);
    }

    #[test]
    fn test_text_rows() {
        let text = sample().to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "6");
        assert_eq!(lines[1], "3");
        assert_eq!(lines[2], "4 4 2 6 4 1 3");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_from_flat_rejects_truncated() {
        let mut flat = sample().to_flat();
        flat.pop();
        assert!(matches!(
            Solution::from_flat(&flat),
            Err(LayoutError::InvalidSolution(_))
        ));
        assert!(Solution::from_flat(&[]).is_err());
    }

    #[test]
    fn test_from_flat_rejects_bad_direction() {
        let mut flat = sample().to_flat();
        flat[4] = 7;
        assert!(Solution::from_flat(&flat).is_err());
    }

    #[test]
    fn test_from_text_rejects_garbage() {
        assert!(Solution::from_text("6\n1\n2 2 x 1 2 1 2\n").is_err());
    }
}
