//! End-to-end layout search.
//!
//! [`solve_layout`] wires the pieces together for one PD code: an
//! [`InitialBuilder`] run produces a feasible starting layout, then an
//! [`Annealer`] driven by a fresh [`LayoutNeighborhood`] improves it under
//! the supplied [`Evaluator`].

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::layout::{
    InitialBuilder, InitialConfig, InitialResult, LayoutNeighborhood, PdCode, Solution,
};
use crate::objective::{Evaluator, ObjectiveBridge};
use crate::sa::{AnnealConfig, AnnealResult, Annealer, HistoryEntry};

/// Mixed into [`SearchConfig::seed`] to give the annealer a stream
/// distinct from the initial sampling.
const ANNEAL_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Configuration for a full search.
///
/// # Examples
///
/// ```
/// use knot_layout::search::SearchConfig;
///
/// let config = SearchConfig::default().with_seed(7);
/// assert_eq!(config.anneal_config(11).initial_temperature, 484.0);
/// assert_eq!(config.anneal_config(11).seed, Some(config.anneal_seed()));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchConfig {
    /// Seed of the initial sampling stream. The annealing stream is
    /// derived from it and overrides `anneal.seed`.
    pub seed: u64,

    pub initial: InitialConfig,

    pub anneal: AnnealConfig,

    /// Replace `anneal.initial_temperature` with `4 * n^2` for `n` crossings.
    pub derive_temperature: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            initial: InitialConfig::default(),
            anneal: AnnealConfig::default(),
            derive_temperature: true,
        }
    }
}

impl SearchConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_initial(mut self, initial: InitialConfig) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_anneal(mut self, anneal: AnnealConfig) -> Self {
        self.anneal = anneal;
        self
    }

    pub fn with_derive_temperature(mut self, derive: bool) -> Self {
        self.derive_temperature = derive;
        self
    }

    /// Seed of the annealing stream.
    pub fn anneal_seed(&self) -> u64 {
        self.seed ^ ANNEAL_STREAM
    }

    /// The annealing configuration actually used for `crossings` crossings.
    pub fn anneal_config(&self, crossings: usize) -> AnnealConfig {
        let mut anneal = self.anneal.clone().with_seed(self.anneal_seed());
        if self.derive_temperature {
            let n = crossings as f64;
            anneal.initial_temperature = 4.0 * n * n;
        }
        anneal
    }

    /// Validates the configuration for `crossings` crossings.
    pub fn validate(&self, crossings: usize) -> LayoutResult<()> {
        self.initial.validate()?;
        self.anneal_config(crossings).validate()
    }
}

/// Everything a search produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The starting layout handed to the annealer.
    pub initial: InitialResult,

    pub result: AnnealResult<Solution>,

    /// Per-level snapshots of the annealing run.
    pub history: Vec<HistoryEntry>,
}

impl SearchOutcome {
    pub fn best(&self) -> &Solution {
        &self.result.best
    }

    pub fn best_cost(&self) -> f64 {
        self.result.best_cost
    }
}

/// Finds a low-cost layout for `pd_code` under `evaluator`.
///
/// The search is deterministic for a given `config.seed` and a
/// deterministic evaluator.
///
/// # Errors
///
/// - [`LayoutError::InvalidConfig`] for an invalid configuration.
/// - [`LayoutError::InvalidInput`] for PD codes with fewer than two crossings.
/// - [`LayoutError::NoFeasibleLayout`] and
///   [`LayoutError::MissingFeasibleNeighbor`] when the grid is too tight.
///
/// Evaluator failures never surface here; they score as `+inf`.
pub fn solve_layout<E: Evaluator>(
    pd_code: impl Into<PdCode>,
    config: &SearchConfig,
    evaluator: E,
) -> LayoutResult<SearchOutcome> {
    let pd_code = pd_code.into();
    let n = pd_code.len();
    if n < 2 {
        return Err(LayoutError::InvalidInput { points: n });
    }
    config.validate(n)?;

    let bridge = ObjectiveBridge::new(evaluator);
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let initial = InitialBuilder::build(pd_code, &bridge, &config.initial, &mut rng)?;

    let anneal = config.anneal_config(n);
    tracing::info!(
        crossings = n,
        initial_cost = initial.cost,
        initial_temperature = anneal.initial_temperature,
        cooling_steps = anneal.cooling_steps(),
        "starting annealing"
    );

    let mut engine = Annealer::new(bridge, LayoutNeighborhood::new(), anneal)?;
    let result = engine.run(Some(initial.solution.clone()))?;
    let history = engine.history().to_vec();

    Ok(SearchOutcome {
        initial,
        result,
        history,
    })
}

/// Runs `starts` independent searches with seeds `config.seed + k` and
/// returns the one with the lowest best cost.
///
/// Each start owns its generator, random stream and temporary files; only
/// `evaluator` is shared, so it must be safe to call concurrently.
#[cfg(feature = "parallel")]
pub fn solve_layout_multistart<E: Evaluator + Sync>(
    pd_code: impl Into<PdCode>,
    config: &SearchConfig,
    evaluator: &E,
    starts: usize,
) -> LayoutResult<SearchOutcome> {
    use rayon::prelude::*;

    if starts == 0 {
        return Err(LayoutError::InvalidConfig("starts must be positive".into()));
    }
    let pd_code = pd_code.into();

    let outcomes = (0..starts)
        .into_par_iter()
        .map(|k| {
            let config = config.clone().with_seed(config.seed.wrapping_add(k as u64));
            solve_layout(pd_code.clone(), &config, evaluator)
        })
        .collect::<LayoutResult<Vec<_>>>()?;

    outcomes
        .into_iter()
        .min_by(|a, b| a.best_cost().total_cmp(&b.best_cost()))
        .ok_or_else(|| LayoutError::InvalidConfig("starts must be positive".into()))
}
