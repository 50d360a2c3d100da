//! Simple Moving Average Volatility (SMAV)
//!
//! Volatility over a rolling window is the root mean of squared returns:
//! σ_i = sqrt( (1/w) Σ_{j=i-w+1..=i} r_j² )
//!
//! No mean is subtracted. Each point is aligned to the end of its window, so a
//! series of n samples yields n - w + 1 points and nothing at all when n < w.

use super::{
    Checkpoint, Diagnostics, Estimate, EstimatorError, EstimatorKind, ModelDiagnostics,
    RecursionState, VolatilityEstimator, VolatilityPoint,
};
use crate::series::{ReturnSeries, Sample};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// SMAV estimator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmavConfig {
    /// Rolling window size in samples (default: 20)
    pub window: usize,
}

impl SmavConfig {
    /// Window sizes offered by the simulator
    pub const COMMON_WINDOWS: [usize; 4] = [10, 20, 30, 50];
}

impl Default for SmavConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

/// Rolling-window volatility estimator
#[derive(Debug, Clone)]
pub struct SmavEstimator {
    config: SmavConfig,
}

impl SmavEstimator {
    /// Create a new SMAV estimator with the given configuration
    pub const fn new(config: SmavConfig) -> Result<Self, EstimatorError> {
        if config.window == 0 {
            return Err(EstimatorError::InvalidWindow(config.window));
        }
        Ok(Self { config })
    }

    /// Estimator configuration
    pub const fn config(&self) -> &SmavConfig {
        &self.config
    }

    fn model_diagnostics(&self) -> ModelDiagnostics {
        ModelDiagnostics::Smav {
            window: self.config.window,
        }
    }

    /// Volatility of the window ending at `end` (inclusive)
    fn window_volatility(&self, samples: &[Sample], end: usize) -> VolatilityPoint {
        let window = self.config.window;
        let sum_squared: f64 = samples[end + 1 - window..=end]
            .iter()
            .map(|s| s.value * s.value)
            .sum();
        VolatilityPoint::new(samples[end].time, (sum_squared / window as f64).sqrt())
    }

    /// Build an estimate from points for all windows ending before `samples.len()`
    fn finish(
        &self,
        mut points: Vec<VolatilityPoint>,
        samples: &[Sample],
        start: usize,
        evicted: u64,
    ) -> Estimate {
        points.extend((start..samples.len()).map(|end| self.window_volatility(samples, end)));

        debug!(
            model = %EstimatorKind::Smav,
            window = self.config.window,
            samples = samples.len(),
            points = points.len(),
            "computed rolling volatility"
        );

        Estimate {
            kind: EstimatorKind::Smav,
            diagnostics: Diagnostics::from_points(&points, self.model_diagnostics()),
            points,
            shortfall: None,
            checkpoint: Some(Checkpoint {
                samples: samples.len(),
                evicted,
                state: RecursionState::Window,
            }),
        }
    }
}

impl Default for SmavEstimator {
    fn default() -> Self {
        Self {
            config: SmavConfig::default(),
        }
    }
}

impl VolatilityEstimator for SmavEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Smav
    }

    fn min_observations(&self) -> usize {
        self.config.window
    }

    fn recompute(&self, series: &ReturnSeries) -> Result<Estimate, EstimatorError> {
        let n = series.len();
        let window = self.config.window;

        if n < window {
            return Ok(Estimate::insufficient(
                EstimatorKind::Smav,
                window,
                n,
                self.model_diagnostics(),
            ));
        }

        let samples: Vec<Sample> = series.iter().copied().collect();
        Ok(self.finish(
            Vec::with_capacity(n - window + 1),
            &samples,
            window - 1,
            series.evicted(),
        ))
    }

    fn extend(
        &self,
        previous: &Estimate,
        series: &ReturnSeries,
    ) -> Result<Estimate, EstimatorError> {
        let Some(checkpoint) = previous.checkpoint.filter(|c| c.is_prefix_of(series)) else {
            return self.recompute(series);
        };
        if previous.kind != EstimatorKind::Smav || series.len() < self.config.window {
            return self.recompute(series);
        }

        // Windows ending before the checkpoint are unchanged
        let start = checkpoint.samples.max(self.config.window - 1);
        let samples: Vec<Sample> = series.iter().copied().collect();
        Ok(self.finish(
            previous.points.clone(),
            &samples,
            start,
            series.evicted(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::DataShortfall;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn estimator(window: usize) -> SmavEstimator {
        SmavEstimator::new(SmavConfig { window }).unwrap()
    }

    #[test]
    fn test_smav_config_default() {
        let config = SmavConfig::default();
        assert_eq!(config.window, 20);
        assert!(SmavConfig::COMMON_WINDOWS.contains(&config.window));
    }

    #[test]
    fn test_zero_window_rejected() {
        assert_eq!(
            SmavEstimator::new(SmavConfig { window: 0 }).unwrap_err(),
            EstimatorError::InvalidWindow(0)
        );
    }

    #[rstest]
    #[case(0.5, 1)]
    #[case(-0.25, 3)]
    #[case(0.5, 10)]
    fn test_constant_returns_exact(#[case] value: f64, #[case] window: usize) {
        let series = ReturnSeries::from_values(&[value; 10]).unwrap();
        let estimate = estimator(window).recompute(&series).unwrap();

        assert_eq!(estimate.len(), 10 - window + 1);
        assert!(estimate.points.iter().all(|p| p.value == value.abs()));
        assert_eq!(estimate.shortfall, None);
    }

    #[test]
    fn test_constant_returns_decimal() {
        let series = ReturnSeries::from_values(&[-0.01; 30]).unwrap();
        let estimate = estimator(20).recompute(&series).unwrap();

        assert_eq!(estimate.len(), 11);
        for point in &estimate.points {
            assert_relative_eq!(point.value, 0.01, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_window_alignment() {
        let series = ReturnSeries::from_values(&[0.03, 0.04, 0.0, 0.0]).unwrap();
        let estimate = estimator(2).recompute(&series).unwrap();

        let times: Vec<i64> = estimate.points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![1, 2, 3]);
        // sqrt((0.0009 + 0.0016) / 2)
        assert_relative_eq!(estimate.points[0].value, 0.00125_f64.sqrt(), epsilon = 1e-15);
        assert_relative_eq!(estimate.points[1].value, 0.0008_f64.sqrt(), epsilon = 1e-15);
        assert_eq!(estimate.points[2].value, 0.0);
    }

    #[rstest]
    #[case(5, 6)]
    #[case(5, 20)]
    #[case(0, 1)]
    fn test_insufficient_data(#[case] n: usize, #[case] window: usize) {
        let series = ReturnSeries::from_values(&vec![0.01; n]).unwrap();
        let estimate = estimator(window).recompute(&series).unwrap();

        assert!(estimate.is_empty());
        assert_eq!(
            estimate.shortfall,
            Some(DataShortfall {
                required: window,
                actual: n,
            })
        );
        assert_eq!(estimate.diagnostics.current_volatility, None);
    }

    #[test]
    fn test_annualized() {
        let series = ReturnSeries::from_values(&[0.5; 4]).unwrap();
        let estimate = estimator(2).recompute(&series).unwrap();
        assert_relative_eq!(
            estimate.diagnostics.annualized_volatility.unwrap(),
            0.5 * 252.0_f64.sqrt()
        );
    }

    #[test]
    fn test_extend_matches_recompute() {
        let values = [0.01, -0.03, 0.02, 0.007, -0.011, 0.04, -0.02, 0.0, 0.013];
        let smav = estimator(3);

        let mut series = ReturnSeries::new();
        let mut previous = smav.recompute(&series).unwrap();
        for (t, &v) in values.iter().enumerate() {
            series.push(t as i64, v).unwrap();
            let extended = smav.extend(&previous, &series).unwrap();
            assert_eq!(extended, smav.recompute(&series).unwrap());
            previous = extended;
        }
        assert_eq!(previous.len(), values.len() - 2);
    }

    #[test]
    fn test_extend_after_eviction_recomputes() {
        let smav = estimator(2);
        let mut series = ReturnSeries::with_capacity_limit(3).unwrap();
        for t in 0..3 {
            series.push(t, 0.01 * (t + 1) as f64).unwrap();
        }
        let previous = smav.recompute(&series).unwrap();

        series.push(3, 0.05).unwrap();
        let extended = smav.extend(&previous, &series).unwrap();

        assert_eq!(extended, smav.recompute(&series).unwrap());
        assert_eq!(extended.len(), 2);
    }
}
