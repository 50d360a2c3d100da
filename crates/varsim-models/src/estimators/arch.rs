//! ARCH Volatility
//!
//! Conditional variance driven by a single lagged squared shock:
//!
//! σ²_i = α₀ + α₁ * r²_{i-p}
//!
//! The first p points have no lagged shock and are filled with the square
//! root of the unconditional (population) variance of the whole series. They
//! are placeholders that keep the output aligned with the input; they do not
//! contribute to the log-likelihood.

use super::likelihood::LogLikelihood;
use super::utils::moments;
use super::{
    Diagnostics, Estimate, EstimatorError, EstimatorKind, ModelDiagnostics, VolatilityEstimator,
    VolatilityPoint, finite_parameter, positive_variance,
};
use crate::series::{ReturnSeries, Sample};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// ARCH estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchConfig {
    /// Constant term α₀ (default: 0.01)
    pub alpha0: f64,
    /// Shock coefficient α₁ (default: 0.7); the model is stationary for α₁ < 1
    pub alpha1: f64,
    /// Lag p of the shock term in samples (default: 1)
    pub lag: usize,
}

impl Default for ArchConfig {
    fn default() -> Self {
        Self {
            alpha0: 0.01,
            alpha1: 0.7,
            lag: 1,
        }
    }
}

/// ARCH volatility estimator
///
/// Coefficients outside `α₀ > 0, 0 ≤ α₁ < 1` are accepted and flagged
/// through the stability diagnostic. A pass fails only when a conditional
/// variance actually turns non-positive.
#[derive(Debug, Clone)]
pub struct ArchEstimator {
    config: ArchConfig,
}

impl ArchEstimator {
    /// Create a new ARCH estimator with the given configuration
    pub fn new(config: ArchConfig) -> Result<Self, EstimatorError> {
        if config.lag == 0 {
            return Err(EstimatorError::InvalidLag(config.lag));
        }
        finite_parameter("alpha0", config.alpha0)?;
        finite_parameter("alpha1", config.alpha1)?;

        let estimator = Self { config };
        if !estimator.is_stable() {
            warn!(
                alpha1 = estimator.config.alpha1,
                "ARCH shock coefficient is not below 1; variance is not stationary"
            );
        }
        Ok(estimator)
    }

    /// Estimator configuration
    pub const fn config(&self) -> &ArchConfig {
        &self.config
    }

    /// Whether α₁ < 1
    pub fn is_stable(&self) -> bool {
        self.config.alpha1 < 1.0
    }

    fn model_diagnostics(&self, log_likelihood: f64) -> ModelDiagnostics {
        ModelDiagnostics::Arch {
            lag: self.config.lag,
            stable: self.is_stable(),
            log_likelihood,
        }
    }

    /// σ² given the shock `lagged` observed p samples earlier
    fn conditional_variance(&self, lagged: &Sample) -> f64 {
        self.config.alpha0 + self.config.alpha1 * (lagged.value * lagged.value)
    }
}

impl Default for ArchEstimator {
    fn default() -> Self {
        Self {
            config: ArchConfig::default(),
        }
    }
}

impl VolatilityEstimator for ArchEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Arch
    }

    fn min_observations(&self) -> usize {
        self.config.lag + 1
    }

    fn recompute(&self, series: &ReturnSeries) -> Result<Estimate, EstimatorError> {
        let n = series.len();
        let lag = self.config.lag;

        if n < lag + 1 {
            return Ok(Estimate::insufficient(
                EstimatorKind::Arch,
                lag + 1,
                n,
                self.model_diagnostics(0.0),
            ));
        }

        let samples: Vec<Sample> = series.iter().copied().collect();
        let (_, unconditional_variance) = moments(series.values().view());
        let placeholder = unconditional_variance.sqrt();

        let mut points: Vec<VolatilityPoint> = samples[..lag]
            .iter()
            .map(|s| VolatilityPoint::new(s.time, placeholder))
            .collect();
        points.reserve(n - lag);

        let mut log_likelihood = LogLikelihood::default();
        for (index, sample) in samples.iter().enumerate().skip(lag) {
            let variance = positive_variance(
                index,
                sample.time,
                self.conditional_variance(&samples[index - lag]),
            )
            .inspect_err(|err| warn!(model = %EstimatorKind::Arch, %err, "ARCH pass failed"))?;

            log_likelihood.add(index, sample.time, sample.value, variance)?;
            points.push(VolatilityPoint::new(sample.time, variance.sqrt()));
        }

        debug!(
            model = %EstimatorKind::Arch,
            lag,
            samples = n,
            points = points.len(),
            log_likelihood = log_likelihood.total(),
            "computed ARCH volatility"
        );

        Ok(Estimate {
            kind: EstimatorKind::Arch,
            diagnostics: Diagnostics::from_points(
                &points,
                self.model_diagnostics(log_likelihood.total()),
            ),
            points,
            shortfall: None,
            checkpoint: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::gaussian_log_likelihood;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn estimator(alpha0: f64, alpha1: f64, lag: usize) -> ArchEstimator {
        ArchEstimator::new(ArchConfig {
            alpha0,
            alpha1,
            lag,
        })
        .unwrap()
    }

    #[test]
    fn test_arch_config_default() {
        let config = ArchConfig::default();
        assert_eq!(config.alpha0, 0.01);
        assert_eq!(config.alpha1, 0.7);
        assert_eq!(config.lag, 1);
    }

    #[test]
    fn test_zero_lag_rejected() {
        let config = ArchConfig {
            lag: 0,
            ..Default::default()
        };
        assert_eq!(
            ArchEstimator::new(config).unwrap_err(),
            EstimatorError::InvalidLag(0)
        );
    }

    #[test]
    fn test_non_finite_coefficient_rejected() {
        let config = ArchConfig {
            alpha1: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            ArchEstimator::new(config),
            Err(EstimatorError::InvalidParameter { name: "alpha1", .. })
        ));
    }

    #[rstest]
    #[case(0.5, true)]
    #[case(0.0, true)]
    #[case(1.0, false)]
    #[case(1.2, false)]
    fn test_stability_flag(#[case] alpha1: f64, #[case] stable: bool) {
        let arch = estimator(0.0001, alpha1, 1);
        assert_eq!(arch.is_stable(), stable);

        for returns in [vec![0.0; 3], vec![0.05, -0.02, 0.01, 0.03]] {
            let series = ReturnSeries::from_values(&returns).unwrap();
            let estimate = arch.recompute(&series).unwrap();
            assert_eq!(estimate.diagnostics.is_stable(), stable);
        }
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    fn test_placeholder_prefix(#[case] lag: usize) {
        let returns = [0.02, -0.01, 0.03, -0.02, 0.01, 0.015, -0.005];
        let series = ReturnSeries::from_values(&returns).unwrap();
        let estimate = estimator(0.0001, 0.3, lag).recompute(&series).unwrap();

        let (_, variance) = moments(series.values().view());
        assert_eq!(estimate.len(), returns.len());
        for point in &estimate.points[..lag] {
            assert_eq!(point.value, variance.sqrt());
        }
    }

    #[test]
    fn test_recursion_and_likelihood() {
        let returns = [0.02, -0.01, 0.03];
        let series = ReturnSeries::from_values(&returns).unwrap();
        let estimate = estimator(0.0001, 0.5, 1).recompute(&series).unwrap();

        let var1: f64 = 0.0001 + 0.5 * 0.02 * 0.02;
        let var2: f64 = 0.0001 + 0.5 * 0.01 * 0.01;
        assert_relative_eq!(estimate.points[1].value, var1.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(estimate.points[2].value, var2.sqrt(), epsilon = 1e-12);

        // Placeholder point contributes nothing
        let expected = gaussian_log_likelihood(-0.01, var1) + gaussian_log_likelihood(0.03, var2);
        assert_relative_eq!(
            estimate.diagnostics.log_likelihood().unwrap(),
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_lag_uses_distant_shock() {
        let returns = [0.1, 0.0, 0.0];
        let series = ReturnSeries::from_values(&returns).unwrap();
        let estimate = estimator(0.0001, 0.5, 2).recompute(&series).unwrap();

        // σ²_2 = α₀ + α₁ r₀²
        assert_relative_eq!(
            estimate.points[2].value,
            (0.0001_f64 + 0.5 * 0.01).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_insufficient_data() {
        let series = ReturnSeries::from_values(&[0.01, 0.02]).unwrap();
        let estimate = estimator(0.01, 0.7, 2).recompute(&series).unwrap();

        assert!(estimate.is_empty());
        assert_eq!(estimate.shortfall.map(|s| s.required), Some(3));
        assert_eq!(estimate.diagnostics.log_likelihood(), Some(0.0));
    }

    #[test]
    fn test_non_positive_variance_fails() {
        let series = ReturnSeries::from_values(&[0.0; 4]).unwrap();
        let err = estimator(-0.001, 0.5, 1).recompute(&series).unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::NonPositiveVariance { index: 1, time: 1, .. }
        ));

        // α₀ = 0 with a zero shock is also undefined
        let err = estimator(0.0, 0.5, 1).recompute(&series).unwrap_err();
        assert!(matches!(err, EstimatorError::NonPositiveVariance { .. }));
    }
}
