//! Simulated annealing.
//!
//! A single-solution trajectory search that accepts worsening moves with
//! probability `exp(-delta / T)`, where the temperature `T` decays
//! geometrically from `initial_temperature` to `final_temperature`.
//! Each temperature level runs `equilibrium_iterations` proposals.
//!
//! The engine is generic over the solution type; the problem is supplied
//! through the [`Objective`] and [`Neighborhood`] strategy traits.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast Computing Machines"

mod config;
mod runner;
mod types;

pub use config::AnnealConfig;
pub use runner::{AnnealResult, Annealer, HistoryEntry};
pub use types::{Neighborhood, Objective};
