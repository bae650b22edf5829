//! Native wire-routing evaluator.
//!
//! Every crossing blocks its own cell and exposes four sockets on the
//! orthogonal neighbours, rotated by its direction. The two sockets
//! sharing a PD label are joined by a shortest path on the 8-connected
//! grid `[1, grid_size]^2`; arcs are routed one at a time, longest
//! estimated distance first, and each routed arc becomes an obstacle for
//! the following ones.
//!
//! The cost is the total routed length plus a penalty of
//! `penalty_factor * (grid_size - 1)^2` for every arc that could not be
//! routed, so any layout with an unroutable arc scores worse than any
//! fully routed one.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::f64::consts::SQRT_2;

use super::Evaluator;
use crate::error::EvaluatorError;
use crate::layout::{Point, Solution};

const EMPTY: i32 = 0;

/// Largest board the router will allocate, in cells.
pub const MAX_ROUTING_CELLS: usize = 1 << 24;

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// Routing-based layout evaluator.
///
/// # Examples
///
/// ```
/// use knot_layout::layout::{Direction, Point, Solution};
/// use knot_layout::objective::{Evaluator, RoutingEvaluator};
///
/// let layout = Solution::new(
///     15,
///     vec![Point::new(5, 5), Point::new(9, 5)],
///     vec![Direction::East, Direction::West],
///     vec![[1, 2, 3, 4], [1, 4, 3, 2]],
/// )
/// .unwrap();
/// let cost = RoutingEvaluator::new().evaluate(&layout).unwrap();
/// assert!(cost.is_finite());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingEvaluator {
    penalty_factor: f64,
}

impl Default for RoutingEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// One routed arc.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedArc {
    pub label: i32,
    /// Cells from the first socket to the second, inclusive.
    pub cells: Vec<Point>,
    pub length: f64,
}

/// Full routing outcome of a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Routing {
    pub arcs: Vec<RoutedArc>,
    /// Labels whose sockets could not be connected.
    pub unrouted: Vec<i32>,
    /// Sum of routed arc lengths.
    pub total_length: f64,
    /// `total_length` plus the penalty for unrouted arcs.
    pub cost: f64,
}

impl RoutingEvaluator {
    pub fn new() -> Self {
        Self {
            penalty_factor: 2.0,
        }
    }

    /// Sets the per-arc penalty in units of `(grid_size - 1)^2`.
    pub fn with_penalty_factor(mut self, factor: f64) -> Self {
        self.penalty_factor = factor;
        self
    }

    /// Array contract: scores a flat encoding directly.
    pub fn evaluate_flat(&self, flat: &[i32]) -> Result<f64, EvaluatorError> {
        let solution =
            Solution::from_flat(flat).map_err(|e| EvaluatorError::Rejected(e.to_string()))?;
        Ok(self.route(&solution)?.cost)
    }

    /// Routes every arc of `solution`.
    ///
    /// # Errors
    ///
    /// [`EvaluatorError::Rejected`] when the layout is malformed: arc
    /// labels not covering `1..=2n` exactly twice each, overlapping
    /// crossing/socket cells, or a grid larger than [`MAX_ROUTING_CELLS`].
    pub fn route(&self, solution: &Solution) -> Result<Routing, EvaluatorError> {
        let mut board = Board::new(solution)?;
        let order = board.routing_order();

        let mut arcs = Vec::with_capacity(order.len());
        let mut unrouted = Vec::new();
        let mut total_length = 0.0;
        for label in order {
            match board.route_arc(label) {
                Some(arc) => {
                    total_length += arc.length;
                    arcs.push(arc);
                }
                None => unrouted.push(label),
            }
        }

        let span = f64::from(solution.grid_size() - 1);
        let cost = total_length + unrouted.len() as f64 * self.penalty_factor * span * span;
        Ok(Routing {
            arcs,
            unrouted,
            total_length,
            cost,
        })
    }
}

impl Evaluator for RoutingEvaluator {
    fn evaluate(&self, solution: &Solution) -> Result<f64, EvaluatorError> {
        Ok(self.route(solution)?.cost)
    }
}

/// Octile distance: admissible for unit orthogonal and `sqrt 2` diagonal steps.
fn octile(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    SQRT_2 * f64::from(lo) + f64::from(hi - lo)
}

/// Cell occupancy: `0` empty, negative for crossing centres, the arc
/// label for sockets and routed cells.
struct Board {
    size: i32,
    cells: Vec<i32>,
    next: Vec<Option<usize>>,
    prev: Vec<Option<usize>>,
    sockets: HashMap<i32, Vec<Point>>,
    labels_in_order: Vec<i32>,
}

impl Board {
    fn new(solution: &Solution) -> Result<Self, EvaluatorError> {
        let size = solution.grid_size();
        let area = usize::try_from(size)
            .ok()
            .and_then(|side| side.checked_mul(side))
            .filter(|&cells| cells <= MAX_ROUTING_CELLS)
            .ok_or_else(|| {
                EvaluatorError::Rejected(format!(
                    "grid {size}x{size} exceeds the routing limit of {MAX_ROUTING_CELLS} cells"
                ))
            })?;
        let mut board = Self {
            size,
            cells: vec![EMPTY; area],
            next: vec![None; area],
            prev: vec![None; area],
            sockets: HashMap::new(),
            labels_in_order: Vec::new(),
        };

        for ((&center, &dir), pd) in solution
            .positions()
            .iter()
            .zip(solution.directions())
            .zip(solution.pd_code().iter())
        {
            board.occupy(center, -1 - dir.index())?;
            for (slot, &label) in pd.iter().enumerate() {
                let socket = dir.socket(center, slot);
                board.occupy(socket, label)?;
                let entry = board.sockets.entry(label).or_default();
                entry.push(socket);
                if entry.len() == 2 {
                    board.labels_in_order.push(label);
                }
            }
        }

        let n = solution.crossing_number() as i32;
        for label in 1..=2 * n {
            let count = board.sockets.get(&label).map_or(0, Vec::len);
            if count != 2 {
                return Err(EvaluatorError::Rejected(format!(
                    "arc label {label} appears {count} times, expected 2"
                )));
            }
        }
        Ok(board)
    }

    fn occupy(&mut self, p: Point, value: i32) -> Result<(), EvaluatorError> {
        let idx = self.index(p).ok_or_else(|| {
            EvaluatorError::Rejected(format!("cell ({}, {}) outside the grid", p.x, p.y))
        })?;
        if self.cells[idx] != EMPTY {
            return Err(EvaluatorError::Rejected(format!(
                "cell ({}, {}) is occupied twice",
                p.x, p.y
            )));
        }
        self.cells[idx] = value;
        Ok(())
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if p.x < 1 || p.x > self.size || p.y < 1 || p.y > self.size {
            None
        } else {
            Some(((p.y - 1) * self.size + (p.x - 1)) as usize)
        }
    }

    #[inline]
    fn point(&self, idx: usize) -> Point {
        let idx = idx as i32;
        Point::new(idx % self.size + 1, idx / self.size + 1)
    }

    /// Labels sorted by descending socket distance, ties by descending label.
    fn routing_order(&self) -> Vec<i32> {
        let mut ranked: Vec<(f64, i32)> = self
            .labels_in_order
            .iter()
            .map(|&label| {
                let s = &self.sockets[&label];
                (octile(s[0], s[1]), label)
            })
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(b.1.cmp(&a.1)));
        ranked.into_iter().map(|(_, label)| label).collect()
    }

    /// Whether `a` and `b` are consecutive cells of one routed path.
    fn linked(&self, a: usize, b: usize) -> bool {
        if self.next[a].is_none() || self.next[b].is_none() {
            return false;
        }
        self.next[a] == Some(b)
            || self.next[b] == Some(a)
            || self.prev[a] == Some(b)
            || self.prev[b] == Some(a)
    }

    #[inline]
    fn passable(&self, idx: usize, label: i32) -> bool {
        self.cells[idx] == EMPTY || self.cells[idx] == label
    }

    /// A* between the two sockets of `label`; stamps the path on success.
    fn route_arc(&mut self, label: i32) -> Option<RoutedArc> {
        let (start, goal) = {
            let s = &self.sockets[&label];
            (s[0], s[1])
        };
        let start_idx = self.index(start)?;
        let goal_idx = self.index(goal)?;

        let mut best_g = vec![f64::INFINITY; self.cells.len()];
        let mut nodes: Vec<SearchNode> = vec![SearchNode {
            cell: start_idx,
            g: 0.0,
            parent: None,
        }];
        let mut open = BinaryHeap::new();
        open.push(OpenEntry {
            f: octile(start, goal),
            node: 0,
        });

        let mut found = None;
        while let Some(OpenEntry { node, .. }) = open.pop() {
            let SearchNode { cell, g, .. } = nodes[node];
            if best_g[cell] <= g {
                continue;
            }
            best_g[cell] = g;
            if cell == goal_idx {
                found = Some(node);
                break;
            }

            let here = self.point(cell);
            for (dx, dy) in ORTHOGONAL {
                let Some(next) = self.index(here.offset(dx, dy)) else {
                    continue;
                };
                if best_g[next].is_finite() || !self.passable(next, label) {
                    continue;
                }
                nodes.push(SearchNode {
                    cell: next,
                    g: g + 1.0,
                    parent: Some(node),
                });
                open.push(OpenEntry {
                    f: g + 1.0 + octile(self.point(next), goal),
                    node: nodes.len() - 1,
                });
            }
            for (dx, dy) in DIAGONAL {
                let Some(next) = self.index(here.offset(dx, dy)) else {
                    continue;
                };
                if best_g[next].is_finite() || !self.passable(next, label) {
                    continue;
                }
                // No diagonal step across a routed segment.
                let (Some(c1), Some(c2)) = (
                    self.index(here.offset(dx, 0)),
                    self.index(here.offset(0, dy)),
                ) else {
                    continue;
                };
                if self.cells[c1] != EMPTY
                    && self.cells[c1] == self.cells[c2]
                    && self.linked(c1, c2)
                {
                    continue;
                }
                nodes.push(SearchNode {
                    cell: next,
                    g: g + SQRT_2,
                    parent: Some(node),
                });
                open.push(OpenEntry {
                    f: g + SQRT_2 + octile(self.point(next), goal),
                    node: nodes.len() - 1,
                });
            }
        }

        let end = found?;
        let length = nodes[end].g;

        let mut path = vec![nodes[end].cell];
        let mut cursor = end;
        while let Some(parent) = nodes[cursor].parent {
            let (from, to) = (nodes[parent].cell, nodes[cursor].cell);
            self.next[from] = Some(to);
            self.prev[to] = Some(from);
            self.cells[to] = label;
            path.push(from);
            cursor = parent;
        }
        self.prev[start_idx] = Some(start_idx);
        self.next[goal_idx] = Some(goal_idx);

        path.reverse();
        Some(RoutedArc {
            label,
            cells: path.into_iter().map(|idx| self.point(idx)).collect(),
            length,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    cell: usize,
    g: f64,
    parent: Option<usize>,
}

/// Min-heap entry on `f`.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; FIFO among equal f.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.node.cmp(&self.node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Direction, PdCode};

    fn two_crossings() -> Solution {
        // A at (5,5) facing east, B at (9,5) facing west.
        Solution::new(
            15,
            vec![Point::new(5, 5), Point::new(9, 5)],
            vec![Direction::East, Direction::West],
            vec![[1, 2, 3, 4], [1, 4, 3, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_socket_placement() {
        let c = Point::new(5, 5);
        assert_eq!(Direction::East.socket(c, 0), Point::new(6, 5));
        assert_eq!(Direction::East.socket(c, 1), Point::new(5, 6));
        assert_eq!(Direction::West.socket(c, 0), Point::new(4, 5));
        assert_eq!(Direction::West.socket(c, 1), Point::new(5, 4));
        assert_eq!(Direction::South.socket(c, 3), Point::new(4, 5));
        // North + 3 quarter turns wraps back to East.
        assert_eq!(Direction::North.socket(c, 3), Point::new(6, 5));
    }

    #[test]
    fn test_octile() {
        assert_eq!(octile(Point::new(0, 0), Point::new(4, 0)), 4.0);
        assert!((octile(Point::new(0, 0), Point::new(3, 3)) - 3.0 * SQRT_2).abs() < 1e-12);
        assert!((octile(Point::new(0, 0), Point::new(1, 3)) - (SQRT_2 + 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_routes_simple_pair() {
        let routing = RoutingEvaluator::new().route(&two_crossings()).unwrap();

        assert!(routing.unrouted.is_empty());
        assert_eq!(routing.arcs.len(), 4);
        // Label 3 (west of A to east of B) is the longest and goes first.
        assert_eq!(routing.arcs[0].label, 3);

        let by_label = |l: i32| routing.arcs.iter().find(|a| a.label == l).unwrap();
        assert_eq!(by_label(1).length, 2.0);
        assert_eq!(
            by_label(1).cells,
            vec![Point::new(6, 5), Point::new(7, 5), Point::new(8, 5)]
        );
        assert_eq!(by_label(2).length, 4.0);
        assert_eq!(by_label(4).length, 4.0);
        // The straight row is blocked, so label 3 must detour.
        assert!(by_label(3).length > 6.0);

        assert!(routing.total_length > 16.0);
        assert_eq!(routing.cost, routing.total_length);
    }

    #[test]
    fn test_routed_paths_are_connected() {
        let routing = RoutingEvaluator::new().route(&two_crossings()).unwrap();
        for arc in &routing.arcs {
            for w in arc.cells.windows(2) {
                let (dx, dy) = ((w[0].x - w[1].x).abs(), (w[0].y - w[1].y).abs());
                assert!(dx <= 1 && dy <= 1 && dx + dy > 0);
            }
            let steps: f64 = arc
                .cells
                .windows(2)
                .map(|w| if w[0].x != w[1].x && w[0].y != w[1].y { SQRT_2 } else { 1.0 })
                .sum();
            assert!((steps - arc.length).abs() < 1e-9);
        }
    }

    #[test]
    fn test_enclosed_socket_is_penalized() {
        // A's west socket sits in a pocket walled off by the border, A and B.
        let layout = Solution::new(
            8,
            vec![Point::new(2, 2), Point::new(2, 5)],
            vec![Direction::East, Direction::East],
            vec![[2, 3, 1, 4], [1, 4, 2, 3]],
        )
        .unwrap();
        let routing = RoutingEvaluator::new().route(&layout).unwrap();

        assert!(routing.unrouted.contains(&1));
        assert!(routing.cost >= 2.0 * 49.0);
        assert!(routing.cost.is_finite());
    }

    #[test]
    fn test_penalty_factor() {
        let layout = Solution::new(
            8,
            vec![Point::new(2, 2), Point::new(2, 5)],
            vec![Direction::East, Direction::East],
            vec![[2, 3, 1, 4], [1, 4, 2, 3]],
        )
        .unwrap();
        let base = RoutingEvaluator::new().route(&layout).unwrap();
        let heavy = RoutingEvaluator::new()
            .with_penalty_factor(4.0)
            .route(&layout)
            .unwrap();
        let expected = base.total_length + base.unrouted.len() as f64 * 4.0 * 49.0;
        assert!((heavy.cost - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_labels() {
        let pd: PdCode = vec![[1, 1, 1, 2], [3, 4, 3, 2]].into();
        let layout = Solution::new(
            15,
            vec![Point::new(5, 5), Point::new(9, 5)],
            vec![Direction::East, Direction::West],
            pd,
        )
        .unwrap();
        assert!(matches!(
            RoutingEvaluator::new().evaluate(&layout),
            Err(EvaluatorError::Rejected(_))
        ));
    }

    #[test]
    fn test_rejects_overlapping_cells() {
        // Distance 2: both crossings claim (6, 5) as a socket.
        let layout = Solution::new(
            15,
            vec![Point::new(5, 5), Point::new(7, 5)],
            vec![Direction::East, Direction::West],
            vec![[1, 2, 3, 4], [1, 4, 3, 2]],
        )
        .unwrap();
        assert!(matches!(
            RoutingEvaluator::new().evaluate(&layout),
            Err(EvaluatorError::Rejected(_))
        ));
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let flat = [50_000, 2, 5, 5, 0, 1, 2, 3, 4, 9, 5, 2, 1, 4, 3, 2];
        assert!(matches!(
            RoutingEvaluator::new().evaluate_flat(&flat),
            Err(EvaluatorError::Rejected(_))
        ));

        // Just past the cell limit, without overflowing.
        let layout = Solution::new(
            4097,
            vec![Point::new(5, 5), Point::new(9, 5)],
            vec![Direction::East, Direction::West],
            vec![[1, 2, 3, 4], [1, 4, 3, 2]],
        )
        .unwrap();
        assert!(matches!(
            RoutingEvaluator::new().route(&layout),
            Err(EvaluatorError::Rejected(_))
        ));
    }

    #[test]
    fn test_evaluate_flat_matches_evaluate() {
        let s = two_crossings();
        let eval = RoutingEvaluator::new();
        assert_eq!(eval.evaluate_flat(&s.to_flat()).unwrap(), eval.evaluate(&s).unwrap());
        assert!(matches!(
            eval.evaluate_flat(&[15, 2, 1]),
            Err(EvaluatorError::Rejected(_))
        ));
    }
}
