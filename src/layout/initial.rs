//! Random-restart construction of a starting layout.
//!
//! Feasible random layouts are drawn and scored until one falls below
//! the "probably valid" threshold `acceptance_factor * (grid_size - 1)^2`
//! or the attempt budget runs out, in which case the best layout seen is
//! returned.

use std::time::{Duration, Instant};

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::feasibility::is_feasible;
use super::types::{GridSizeRule, PdCode, Solution};
use crate::error::{LayoutError, LayoutResult};
use crate::sa::Objective;

/// Configuration for the initial layout search.
///
/// # Examples
///
/// ```
/// use knot_layout::layout::InitialConfig;
/// use std::time::Duration;
///
/// let config = InitialConfig::default()
///     .with_max_attempts(50)
///     .with_log_period(Duration::from_secs(1));
/// assert_eq!(config.max_attempts, 50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InitialConfig {
    /// Grid size as a function of the crossing count.
    pub size_rule: GridSizeRule,

    /// Maximum number of scored (feasible) samples.
    pub max_attempts: usize,

    /// Cap on infeasible samples, which do not count as attempts.
    /// `None` samples forever.
    pub max_rejections: Option<usize>,

    /// Interval between progress reports.
    pub log_period: Duration,

    /// Accept immediately below `acceptance_factor * (grid_size - 1)^2`.
    pub acceptance_factor: f64,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            size_rule: GridSizeRule::default(),
            max_attempts: 500,
            max_rejections: Some(1_000_000),
            log_period: Duration::from_secs(10),
            acceptance_factor: 2.0,
        }
    }
}

impl InitialConfig {
    pub fn with_size_rule(mut self, rule: GridSizeRule) -> Self {
        self.size_rule = rule;
        self
    }

    pub fn with_max_attempts(mut self, n: usize) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn with_max_rejections(mut self, n: Option<usize>) -> Self {
        self.max_rejections = n;
        self
    }

    pub fn with_log_period(mut self, period: Duration) -> Self {
        self.log_period = period;
        self
    }

    pub fn with_acceptance_factor(mut self, factor: f64) -> Self {
        self.acceptance_factor = factor;
        self
    }

    /// Cost below which a sampled layout is accepted on the spot.
    pub fn acceptance_threshold(&self, grid_size: i32) -> f64 {
        let span = f64::from(grid_size - 1);
        self.acceptance_factor * span * span
    }

    /// Validates the configuration.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.max_attempts == 0 {
            return Err(LayoutError::InvalidConfig("max_attempts must be positive".into()));
        }
        if self.size_rule.per_crossing < 0 || self.size_rule.grid_size(1) <= 2 {
            return Err(LayoutError::InvalidConfig(format!(
                "size rule {:?} leaves no room for crossings",
                self.size_rule
            )));
        }
        if !(self.acceptance_factor >= 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "acceptance_factor must be non-negative, got {}",
                self.acceptance_factor
            )));
        }
        Ok(())
    }
}

/// Outcome of the initial layout search.
#[derive(Debug, Clone)]
pub struct InitialResult {
    /// Returned layout: the first one under the threshold, else the best seen.
    pub solution: Solution,

    /// Cost of `solution`.
    pub cost: f64,

    /// Scored samples.
    pub attempts: usize,

    /// Infeasible samples skipped without scoring.
    pub rejected: usize,

    /// Whether `solution` beat the acceptance threshold.
    pub accepted: bool,

    pub elapsed: Duration,
}

/// Builds a starting layout by scored random sampling.
pub struct InitialBuilder;

impl InitialBuilder {
    /// Samples layouts for `pd_code` and returns the first good one, or the
    /// best within budget.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::InvalidConfig`] for an invalid `config`.
    /// - [`LayoutError::InvalidInput`] for PD codes with fewer than two crossings.
    /// - [`LayoutError::NoFeasibleLayout`] when `max_rejections` infeasible
    ///   draws occur before a feasible one.
    pub fn build<O, R>(
        pd_code: impl Into<PdCode>,
        objective: &O,
        config: &InitialConfig,
        rng: &mut R,
    ) -> LayoutResult<InitialResult>
    where
        O: Objective<Solution> + ?Sized,
        R: Rng,
    {
        config.validate()?;
        let pd_code = pd_code.into();
        let n = pd_code.len();
        let grid_size = config.size_rule.grid_size(n);
        let threshold = config.acceptance_threshold(grid_size);

        if GridSizeRule::lattice_capacity(grid_size) < n {
            tracing::warn!(
                grid_size,
                crossings = n,
                "grid may be too small to separate every crossing"
            );
        }
        tracing::info!(grid_size, crossings = n, threshold, "building initial layout");

        let start = Instant::now();
        let mut last_report = start;
        let mut attempts = 0usize;
        let mut rejected = 0usize;
        let mut best: Option<(Solution, f64)> = None;

        while attempts < config.max_attempts {
            let candidate = Solution::random(grid_size, pd_code.clone(), rng)?;
            if !is_feasible(candidate.positions())? {
                rejected += 1;
                if config.max_rejections.is_some_and(|cap| rejected >= cap) && attempts == 0 {
                    return Err(LayoutError::NoFeasibleLayout { draws: rejected });
                }
                continue;
            }
            attempts += 1;

            let cost = objective.cost(&candidate);
            if best.as_ref().map_or(true, |(_, c)| cost < *c) {
                best = Some((candidate.clone(), cost));
            }

            if cost < threshold {
                tracing::info!(
                    attempts,
                    elapsed = ?start.elapsed(),
                    cost,
                    "initial layout accepted"
                );
                return Ok(InitialResult {
                    solution: candidate,
                    cost,
                    attempts,
                    rejected,
                    accepted: true,
                    elapsed: start.elapsed(),
                });
            }

            if last_report.elapsed() >= config.log_period {
                tracing::info!(
                    attempts,
                    elapsed = ?start.elapsed(),
                    best_cost = best.as_ref().map_or(f64::INFINITY, |(_, c)| *c),
                    "still searching for an initial layout"
                );
                last_report = Instant::now();
            }
        }

        let (solution, cost) = best.ok_or(LayoutError::NoFeasibleLayout { draws: rejected })?;
        tracing::info!(
            attempts,
            elapsed = ?start.elapsed(),
            best_cost = cost,
            "attempt budget exhausted, returning best initial layout"
        );
        Ok(InitialResult {
            solution,
            cost,
            attempts,
            rejected,
            accepted: false,
            elapsed: start.elapsed(),
        })
    }
}
