//! Annealing configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// Configuration for the annealing engine.
///
/// Temperature follows geometric cooling, `T_{k+1} = cooling_rate * T_k`,
/// with `equilibrium_iterations` candidate moves at each level.
///
/// # Examples
///
/// ```
/// use knot_layout::sa::AnnealConfig;
///
/// let config = AnnealConfig::default()
///     .with_initial_temperature(484.0)
///     .with_final_temperature(0.01)
///     .with_cooling_rate(0.95)
///     .with_equilibrium_iterations(50)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnnealConfig {
    /// Starting temperature. Higher values allow more uphill moves.
    pub initial_temperature: f64,

    /// The run stops once the temperature is at or below this value.
    pub final_temperature: f64,

    /// Geometric cooling factor in (0, 1). Higher = slower cooling.
    pub cooling_rate: f64,

    /// Candidate moves attempted per temperature level.
    pub equilibrium_iterations: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            final_temperature: 0.001,
            cooling_rate: 0.95,
            equilibrium_iterations: 200,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_final_temperature(mut self, t: f64) -> Self {
        self.final_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_equilibrium_iterations(mut self, n: usize) -> Self {
        self.equilibrium_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of cooling steps a full run performs; `0` for a
    /// configuration that fails [`validate`](Self::validate).
    pub fn cooling_steps(&self) -> usize {
        if self.validate().is_err() {
            return 0;
        }
        let mut t = self.initial_temperature;
        let mut steps = 0;
        while t > self.final_temperature {
            t *= self.cooling_rate;
            steps += 1;
        }
        steps
    }

    /// Validates the configuration.
    pub fn validate(&self) -> LayoutResult<()> {
        if !(self.initial_temperature > 0.0) || !self.initial_temperature.is_finite() {
            return Err(LayoutError::InvalidConfig(format!(
                "initial_temperature must be positive and finite, got {}",
                self.initial_temperature
            )));
        }
        if !(self.final_temperature > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "final_temperature must be positive, got {}",
                self.final_temperature
            )));
        }
        if self.final_temperature >= self.initial_temperature {
            return Err(LayoutError::InvalidConfig(
                "final_temperature must be less than initial_temperature".into(),
            ));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if self.equilibrium_iterations == 0 {
            return Err(LayoutError::InvalidConfig(
                "equilibrium_iterations must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnnealConfig::default();
        assert!((config.initial_temperature - 1000.0).abs() < 1e-10);
        assert!((config.final_temperature - 0.001).abs() < 1e-15);
        assert!((config.cooling_rate - 0.95).abs() < 1e-15);
        assert_eq!(config.equilibrium_iterations, 200);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_validate_ok() {
        assert!(AnnealConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_temperature() {
        let config = AnnealConfig::default().with_initial_temperature(-1.0);
        assert!(config.validate().is_err());
        let config = AnnealConfig::default().with_final_temperature(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_final_ge_initial() {
        let config = AnnealConfig::default()
            .with_initial_temperature(10.0)
            .with_final_temperature(20.0);
        assert!(matches!(config.validate(), Err(LayoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_bad_cooling_rate() {
        for rate in [0.0, 1.0, 1.5, -0.2, f64::NAN] {
            let config = AnnealConfig::default().with_cooling_rate(rate);
            assert!(config.validate().is_err(), "rate {rate} accepted");
        }
    }

    #[test]
    fn test_validate_zero_equilibrium() {
        let config = AnnealConfig::default().with_equilibrium_iterations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cooling_steps() {
        let config = AnnealConfig::default()
            .with_initial_temperature(1.0)
            .with_final_temperature(0.2)
            .with_cooling_rate(0.5);
        // 1.0 -> 0.5 -> 0.25 -> 0.125
        assert_eq!(config.cooling_steps(), 3);
    }

    #[test]
    fn test_cooling_steps_invalid_config() {
        let stalled = AnnealConfig::default().with_cooling_rate(1.0);
        assert_eq!(stalled.cooling_steps(), 0);
        let rising = AnnealConfig::default().with_cooling_rate(1.5);
        assert_eq!(rising.cooling_steps(), 0);
        let unreachable = AnnealConfig::default().with_final_temperature(0.0);
        assert_eq!(unreachable.cooling_steps(), 0);
    }
}
