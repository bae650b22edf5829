//! Annealing execution loop.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::config::AnnealConfig;
use super::types::{Neighborhood, Objective};
use crate::error::{LayoutError, LayoutResult};

/// Snapshot taken once per temperature level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    /// Completed cooling steps at the time of the snapshot.
    pub iteration: usize,
    /// Temperature the level was run at.
    pub temperature: f64,
    pub current_cost: f64,
    pub best_cost: f64,
}

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult<S> {
    /// The best solution found.
    pub best: S,

    /// Cost of the best solution.
    pub best_cost: f64,

    /// Number of cooling steps performed.
    pub iterations: usize,

    /// Number of neighbor evaluations.
    pub evaluations: usize,

    /// Temperature when the loop stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of strictly improving moves.
    pub improving_moves: usize,
}

#[derive(Debug, Clone)]
struct AnnealState<S> {
    current: S,
    current_cost: f64,
    best: S,
    best_cost: f64,
    temperature: f64,
    iterations: usize,
    evaluations: usize,
    accepted_moves: usize,
    improving_moves: usize,
    history: Vec<HistoryEntry>,
}

/// Simulated annealing over injected objective and neighborhood
/// strategies.
///
/// The engine is uninitialized after construction, holds a running state
/// after [`initialize`](Annealer::initialize), and keeps its terminal
/// state (best solution, history) after [`run`](Annealer::run) until the
/// next call.
///
/// # Examples
///
/// ```
/// use knot_layout::sa::{AnnealConfig, Annealer, Neighborhood};
/// use knot_layout::LayoutResult;
/// use rand::Rng;
///
/// struct Step;
/// impl Neighborhood<f64> for Step {
///     fn propose<R: Rng>(&mut self, x: &f64, rng: &mut R) -> LayoutResult<f64> {
///         Ok(x + rng.random_range(-1.0..1.0))
///     }
/// }
///
/// let config = AnnealConfig::default()
///     .with_initial_temperature(10.0)
///     .with_final_temperature(0.01)
///     .with_equilibrium_iterations(20)
///     .with_seed(3);
/// let mut engine = Annealer::new(|x: &f64| x * x, Step, config).unwrap();
/// let result = engine.run(Some(5.0)).unwrap();
/// assert!(result.best_cost <= 25.0);
/// ```
pub struct Annealer<S, O, N> {
    objective: O,
    neighborhood: N,
    config: AnnealConfig,
    rng: ChaCha8Rng,
    state: Option<AnnealState<S>>,
}

impl<S, O, N> Annealer<S, O, N>
where
    S: Clone,
    O: Objective<S>,
    N: Neighborhood<S>,
{
    /// Creates an engine, rejecting invalid hyperparameters.
    pub fn new(objective: O, neighborhood: N, config: AnnealConfig) -> LayoutResult<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or_else(rand::random::<u64>));
        Ok(Self {
            objective,
            neighborhood,
            config,
            rng,
            state: None,
        })
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    pub fn neighborhood(&self) -> &N {
        &self.neighborhood
    }

    /// Resets the run state around `initial`.
    ///
    /// Without an initial solution the neighborhood is asked to seed one.
    /// A seeded engine also restarts its random stream here, so repeated
    /// runs from the same start see the same draws.
    pub fn initialize(&mut self, initial: Option<S>) -> LayoutResult<()> {
        if let Some(seed) = self.config.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }

        let current = match initial {
            Some(s) => s,
            None => self
                .neighborhood
                .seed(&mut self.rng)
                .ok_or(LayoutError::MissingInitialSolution)??,
        };
        let current_cost = self.objective.cost(&current);
        let temperature = self.config.initial_temperature;

        self.state = Some(AnnealState {
            best: current.clone(),
            best_cost: current_cost,
            current,
            current_cost,
            temperature,
            iterations: 0,
            evaluations: 0,
            accepted_moves: 0,
            improving_moves: 0,
            history: vec![HistoryEntry {
                iteration: 0,
                temperature,
                current_cost,
                best_cost: current_cost,
            }],
        });
        Ok(())
    }

    /// Runs the full cooling schedule and returns the incumbent.
    ///
    /// Evaluation failures never abort the run; the objective is expected
    /// to report them as infinite cost. Errors only come from the
    /// neighborhood (or from a missing initial solution).
    pub fn run(&mut self, initial: Option<S>) -> LayoutResult<AnnealResult<S>> {
        self.initialize(initial)?;
        let Some(state) = self.state.as_mut() else {
            return Err(LayoutError::MissingInitialSolution);
        };

        while state.temperature > self.config.final_temperature {
            for _ in 0..self.config.equilibrium_iterations {
                let neighbor = self.neighborhood.propose(&state.current, &mut self.rng)?;
                let neighbor_cost = self.objective.cost(&neighbor);
                state.evaluations += 1;

                let delta = neighbor_cost - state.current_cost;

                // Metropolis criterion. inf - inf is NaN and is rejected.
                let accept = if delta < 0.0 {
                    state.improving_moves += 1;
                    true
                } else {
                    let probability = (-delta / state.temperature).exp();
                    self.rng.random::<f64>() < probability
                };

                if accept {
                    state.current = neighbor;
                    state.current_cost = neighbor_cost;
                    state.accepted_moves += 1;

                    if state.current_cost < state.best_cost {
                        state.best = state.current.clone();
                        state.best_cost = state.current_cost;
                    }
                }
            }

            state.iterations += 1;
            state.history.push(HistoryEntry {
                iteration: state.iterations,
                temperature: state.temperature,
                current_cost: state.current_cost,
                best_cost: state.best_cost,
            });
            tracing::debug!(
                iteration = state.iterations,
                temperature = state.temperature,
                current_cost = state.current_cost,
                best_cost = state.best_cost,
                "annealing step"
            );

            state.temperature *= self.config.cooling_rate;
        }

        tracing::info!(
            iterations = state.iterations,
            evaluations = state.evaluations,
            accepted = state.accepted_moves,
            best_cost = state.best_cost,
            "annealing finished"
        );

        Ok(AnnealResult {
            best: state.best.clone(),
            best_cost: state.best_cost,
            iterations: state.iterations,
            evaluations: state.evaluations,
            final_temperature: state.temperature,
            accepted_moves: state.accepted_moves,
            improving_moves: state.improving_moves,
        })
    }

    /// Per-level snapshots of the latest run. Empty before the first
    /// initialization.
    pub fn history(&self) -> &[HistoryEntry] {
        self.state.as_ref().map_or(&[], |s| s.history.as_slice())
    }

    pub fn temperature(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.temperature)
    }

    pub fn iterations(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.iterations)
    }

    pub fn best(&self) -> Option<(&S, f64)> {
        self.state.as_ref().map(|s| (&s.best, s.best_cost))
    }

    pub fn current(&self) -> Option<(&S, f64)> {
        self.state.as_ref().map(|s| (&s.current, s.current_cost))
    }
}
