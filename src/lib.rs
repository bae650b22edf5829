//! Grid layouts for knot diagrams by simulated annealing.
//!
//! Given a knot as a PD code (one 4-tuple of arc labels per crossing),
//! this crate searches for integer grid positions and orientations of the
//! crossings that make the diagram cheap to draw, as judged by an external
//! or built-in geometric evaluator.
//!
//! - **Layouts** ([`layout`]): the solution representation, the minimum
//!   separation rule, flat and text encodings, the neighbor generator and
//!   the initial solution builder.
//! - **Objectives** ([`objective`]): the evaluator contracts, the
//!   failure-absorbing [`ObjectiveBridge`](objective::ObjectiveBridge) and
//!   a native arc-routing evaluator.
//! - **Simulated Annealing** ([`sa`]): a generic annealing engine with
//!   geometric cooling and per-step history, driven by injected objective
//!   and neighborhood strategies.
//! - **Search** ([`search`]): end-to-end orchestration for one PD code,
//!   plus multi-start under the `parallel` feature.
//!
//! # Example
//!
//! ```
//! use knot_layout::objective::RoutingEvaluator;
//! use knot_layout::sa::AnnealConfig;
//! use knot_layout::search::{solve_layout, SearchConfig};
//!
//! let trefoil = vec![[1, 5, 2, 4], [3, 1, 4, 6], [5, 3, 6, 2]];
//! let config = SearchConfig::default().with_anneal(
//!     AnnealConfig::default()
//!         .with_final_temperature(5.0)
//!         .with_equilibrium_iterations(2),
//! );
//! let outcome = solve_layout(trefoil, &config, RoutingEvaluator::new()).unwrap();
//! assert!(outcome.best_cost() <= outcome.initial.cost);
//! ```

pub mod error;
pub mod layout;
pub mod objective;
pub mod sa;
pub mod search;

pub use error::{EvaluatorError, LayoutError, LayoutResult};
pub use layout::{Direction, PdCode, Point, Solution};
pub use search::{solve_layout, SearchConfig, SearchOutcome};
