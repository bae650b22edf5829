//! Layouts of knot diagrams on a square grid.
//!
//! A layout places every crossing of a PD code at an integer grid point
//! with one of four orientations. Feasible layouts keep every pair of
//! crossings at Manhattan distance of at least [`MIN_SEPARATION`].
//!
//! - [`Solution`]: the search variable, with flat and text encodings.
//! - [`neighbor`]: local moves that preserve feasibility.
//! - [`initial`]: scored random sampling of a starting layout.

mod encode;
pub mod feasibility;
pub mod initial;
pub mod neighbor;
mod types;

pub use encode::FIELDS_PER_CROSSING;
pub use feasibility::{is_feasible, min_pairwise_distance, MIN_SEPARATION};
pub use initial::{InitialBuilder, InitialConfig, InitialResult};
pub use neighbor::LayoutNeighborhood;
pub use types::{Direction, GridSizeRule, PdCode, PdTuple, Point, Solution, MIN_COORD};
