//! Exponentially Weighted Moving Average (EWMA) Volatility
//!
//! EWMA gives more weight to recent observations. The conditional variance
//! follows
//!
//! σ²_i = λ * σ²_{i-1} + (1-λ) * (r_i - μ)²
//!
//! where λ is the decay factor (0.94 for the RiskMetrics daily model). The
//! recursion is seeded with the population variance of the whole series and
//! centred on its mean, both recomputed fresh on every pass, so there is no
//! incremental path: appending a sample shifts μ and the seed.

use super::utils::{half_life, moments};
use super::{
    Diagnostics, Estimate, EstimatorError, EstimatorKind, ModelDiagnostics, VolatilityEstimator,
    VolatilityPoint,
};
use crate::series::ReturnSeries;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum samples for a meaningful mean and variance
const MIN_OBSERVATIONS: usize = 2;

/// EWMA estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EwmaConfig {
    /// Decay factor λ (default: 0.94)
    /// Higher values = more weight on past, slower adaptation
    /// Lower values = more weight on recent, faster adaptation
    pub decay: f64,
}

impl Default for EwmaConfig {
    fn default() -> Self {
        EwmaPreset::RiskMetrics.config()
    }
}

/// Commonly used decay factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EwmaPreset {
    /// λ = 0.94
    RiskMetrics,
    /// λ = 0.90
    HigherReactivity,
    /// λ = 0.97
    LowerReactivity,
    /// λ = 0.80
    VeryHighReactivity,
}

impl EwmaPreset {
    /// All presets, in display order
    pub const ALL: [Self; 4] = [
        Self::RiskMetrics,
        Self::HigherReactivity,
        Self::LowerReactivity,
        Self::VeryHighReactivity,
    ];

    /// Decay factor of the preset
    pub const fn decay(self) -> f64 {
        match self {
            Self::RiskMetrics => 0.94,
            Self::HigherReactivity => 0.90,
            Self::LowerReactivity => 0.97,
            Self::VeryHighReactivity => 0.80,
        }
    }

    /// Configuration for the preset
    pub const fn config(self) -> EwmaConfig {
        EwmaConfig {
            decay: self.decay(),
        }
    }
}

/// Exponentially weighted volatility estimator
#[derive(Debug, Clone)]
pub struct EwmaEstimator {
    config: EwmaConfig,
}

impl EwmaEstimator {
    /// Create a new EWMA estimator with the given configuration
    pub fn new(config: EwmaConfig) -> Result<Self, EstimatorError> {
        // Also rejects NaN
        if !(config.decay > 0.0 && config.decay < 1.0) {
            return Err(EstimatorError::InvalidDecay(config.decay));
        }
        Ok(Self { config })
    }

    /// Create with default configuration.
    ///
    /// # Errors
    /// Returns an error if the default configuration is invalid (should not happen).
    pub fn try_default() -> Result<Self, EstimatorError> {
        Self::new(EwmaConfig::default())
    }

    /// Estimator configuration
    pub const fn config(&self) -> &EwmaConfig {
        &self.config
    }

    /// Get the half-life of the EWMA (in periods)
    ///
    /// Half-life = ln(0.5) / ln(λ)
    pub fn half_life(&self) -> f64 {
        half_life(self.config.decay)
    }

    fn model_diagnostics(&self) -> ModelDiagnostics {
        ModelDiagnostics::Ewma {
            decay: self.config.decay,
            half_life: self.half_life(),
        }
    }
}

impl VolatilityEstimator for EwmaEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Ewma
    }

    fn min_observations(&self) -> usize {
        MIN_OBSERVATIONS
    }

    fn recompute(&self, series: &ReturnSeries) -> Result<Estimate, EstimatorError> {
        let n = series.len();
        if n < MIN_OBSERVATIONS {
            return Ok(Estimate::insufficient(
                EstimatorKind::Ewma,
                MIN_OBSERVATIONS,
                n,
                self.model_diagnostics(),
            ));
        }

        let (mean, initial_variance) = moments(series.values().view());
        let lambda = self.config.decay;
        let one_minus_lambda = 1.0 - lambda;

        let mut prev_variance = initial_variance;
        let mut points = Vec::with_capacity(n);
        for (index, sample) in series.iter().enumerate() {
            let deviation = sample.value - mean;
            let variance = lambda * prev_variance + one_minus_lambda * deviation * deviation;

            // Zero is legitimate here (constant series); only the sqrt must be defined
            if !(variance.is_finite() && variance >= 0.0) {
                return Err(EstimatorError::NonPositiveVariance {
                    index,
                    time: sample.time,
                    variance,
                });
            }

            points.push(VolatilityPoint::new(sample.time, variance.sqrt()));
            prev_variance = variance;
        }

        debug!(
            model = %EstimatorKind::Ewma,
            decay = lambda,
            samples = n,
            points = points.len(),
            "computed exponentially weighted volatility"
        );

        Ok(Estimate {
            kind: EstimatorKind::Ewma,
            diagnostics: Diagnostics::from_points(&points, self.model_diagnostics()),
            points,
            shortfall: None,
            checkpoint: None,
        })
    }
}
