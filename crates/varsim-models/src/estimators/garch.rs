//! GARCH(1,1) Volatility
//!
//! Conditional variance driven by the previous squared return and the
//! previous variance:
//!
//! σ²_i = ω + α * r²_{i-1} + β * σ²_{i-1}
//!
//! The recursion is seeded with the long-run variance ω / (1 - α - β), so the
//! first point is the long-run volatility and every sample yields a point.
//! Persistence α + β governs how fast shocks decay; for α + β ≥ 1 the model is
//! flagged unstable and the seed is whatever the formula yields. A negative or
//! non-finite seed fails the pass; a zero seed is allowed since it never
//! enters the likelihood.
//!
//! Because σ²_i depends only on (σ²_{i-1}, r_{i-1}), a result can be extended
//! sample by sample from its checkpoint with the same floating-point
//! operations as a from-scratch pass.

use super::likelihood::LogLikelihood;
use super::utils::half_life;
use super::{
    Checkpoint, Diagnostics, Estimate, EstimatorError, EstimatorKind, ModelDiagnostics,
    RecursionState, VolatilityEstimator, VolatilityPoint, finite_parameter, positive_variance,
};
use crate::series::{ReturnSeries, Sample};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Minimum samples: one seed point plus one recursion step
const MIN_OBSERVATIONS: usize = 2;

/// GARCH(1,1) estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarchConfig {
    /// Constant term ω (default: 0.000001)
    pub omega: f64,
    /// Weight α on the previous squared return (default: 0.09)
    pub alpha: f64,
    /// Weight β on the previous variance (default: 0.9)
    pub beta: f64,
}

impl Default for GarchConfig {
    fn default() -> Self {
        Self {
            omega: 0.000001,
            alpha: 0.09,
            beta: 0.9,
        }
    }
}

/// Common GARCH(1,1) parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GarchPreset {
    /// ω = 1e-6, α = 0.06, β = 0.94
    RiskMetrics,
    /// ω = 2e-6, α = 0.09, β = 0.90
    Standard,
    /// ω = 1e-6, α = 0.04, β = 0.95
    HighPersistence,
    /// ω = 5e-6, α = 0.15, β = 0.80
    MoreReactive,
}

impl GarchPreset {
    /// All presets, in display order
    pub const ALL: [Self; 4] = [
        Self::RiskMetrics,
        Self::Standard,
        Self::HighPersistence,
        Self::MoreReactive,
    ];

    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::RiskMetrics => "RiskMetrics",
            Self::Standard => "Standard",
            Self::HighPersistence => "High Persistence",
            Self::MoreReactive => "More Reactive",
        }
    }

    /// Configuration for the preset
    pub const fn config(self) -> GarchConfig {
        let (omega, alpha, beta) = match self {
            Self::RiskMetrics => (0.000001, 0.06, 0.94),
            Self::Standard => (0.000002, 0.09, 0.90),
            Self::HighPersistence => (0.000001, 0.04, 0.95),
            Self::MoreReactive => (0.000005, 0.15, 0.80),
        };
        GarchConfig { omega, alpha, beta }
    }
}

/// Recursion state handed from one step to the next
#[derive(Debug, Clone, Copy)]
struct Carry {
    previous_variance: f64,
    previous_squared_return: f64,
    log_likelihood: LogLikelihood,
}

/// GARCH(1,1) volatility estimator
#[derive(Debug, Clone)]
pub struct GarchEstimator {
    config: GarchConfig,
}

impl GarchEstimator {
    /// Create a new GARCH estimator with the given configuration
    ///
    /// Only non-finite coefficients are rejected. Parameters without a finite
    /// long-run variance are accepted and reported as unstable.
    pub fn new(config: GarchConfig) -> Result<Self, EstimatorError> {
        finite_parameter("omega", config.omega)?;
        finite_parameter("alpha", config.alpha)?;
        finite_parameter("beta", config.beta)?;

        let estimator = Self { config };
        if !estimator.is_stable() {
            warn!(
                persistence = estimator.persistence(),
                "GARCH persistence is not below 1; long-run variance is undefined"
            );
        }
        Ok(estimator)
    }

    /// Estimator configuration
    pub const fn config(&self) -> &GarchConfig {
        &self.config
    }

    /// Persistence α + β
    pub fn persistence(&self) -> f64 {
        self.config.alpha + self.config.beta
    }

    /// Whether α + β < 1
    pub fn is_stable(&self) -> bool {
        self.persistence() < 1.0
    }

    /// ω / (1 - α - β), whatever the formula yields
    pub fn long_run_variance(&self) -> f64 {
        self.config.omega / (1.0 - self.config.alpha - self.config.beta)
    }

    /// √(long-run variance), if that variance is finite and non-negative
    fn long_run_volatility(&self) -> Option<f64> {
        let variance = self.long_run_variance();
        (variance.is_finite() && variance >= 0.0).then(|| variance.sqrt())
    }

    /// Half-life of a variance shock in periods, if 0 < α + β < 1
    pub fn half_life(&self) -> Option<f64> {
        let persistence = self.persistence();
        (persistence > 0.0 && persistence < 1.0).then(|| half_life(persistence))
    }

    fn model_diagnostics(&self, log_likelihood: f64) -> ModelDiagnostics {
        ModelDiagnostics::Garch {
            persistence: self.persistence(),
            stable: self.is_stable(),
            long_run_variance: self.long_run_variance(),
            long_run_volatility: self.long_run_volatility(),
            half_life: self.half_life(),
            log_likelihood,
        }
    }

    /// Run the recursion over `samples[start..]`, continuing from `carry`
    fn run(
        &self,
        samples: &[Sample],
        start: usize,
        mut points: Vec<VolatilityPoint>,
        carry: Carry,
        evicted: u64,
    ) -> Result<Estimate, EstimatorError> {
        let GarchConfig { omega, alpha, beta } = self.config;
        let Carry {
            mut previous_variance,
            mut previous_squared_return,
            mut log_likelihood,
        } = carry;

        for (index, sample) in samples.iter().enumerate().skip(start) {
            let variance = positive_variance(
                index,
                sample.time,
                omega + alpha * previous_squared_return + beta * previous_variance,
            )
            .inspect_err(|err| warn!(model = %EstimatorKind::Garch, %err, "GARCH pass failed"))?;

            log_likelihood.add(index, sample.time, sample.value, variance)?;
            points.push(VolatilityPoint::new(sample.time, variance.sqrt()));

            previous_variance = variance;
            previous_squared_return = sample.value * sample.value;
        }

        debug!(
            model = %EstimatorKind::Garch,
            persistence = self.persistence(),
            samples = samples.len(),
            points = points.len(),
            resumed_at = start,
            log_likelihood = log_likelihood.total(),
            "computed GARCH volatility"
        );

        Ok(Estimate {
            kind: EstimatorKind::Garch,
            diagnostics: Diagnostics::from_points(
                &points,
                self.model_diagnostics(log_likelihood.total()),
            ),
            points,
            shortfall: None,
            checkpoint: Some(Checkpoint {
                samples: samples.len(),
                evicted,
                state: RecursionState::Garch {
                    previous_variance,
                    previous_squared_return,
                    log_likelihood: log_likelihood.total(),
                },
            }),
        })
    }
}

impl Default for GarchEstimator {
    fn default() -> Self {
        Self {
            config: GarchConfig::default(),
        }
    }
}

impl VolatilityEstimator for GarchEstimator {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Garch
    }

    fn min_observations(&self) -> usize {
        MIN_OBSERVATIONS
    }

    fn recompute(&self, series: &ReturnSeries) -> Result<Estimate, EstimatorError> {
        let n = series.len();
        if n < MIN_OBSERVATIONS {
            return Ok(Estimate::insufficient(
                EstimatorKind::Garch,
                MIN_OBSERVATIONS,
                n,
                self.model_diagnostics(0.0),
            ));
        }

        let samples: Vec<Sample> = series.iter().copied().collect();
        let first = samples[0];

        let seed = self.long_run_variance();
        // The seed is never a likelihood input, so zero is allowed
        if !(seed.is_finite() && seed >= 0.0) {
            let err = EstimatorError::NonPositiveVariance {
                index: 0,
                time: first.time,
                variance: seed,
            };
            warn!(model = %EstimatorKind::Garch, %err, "GARCH long-run seed undefined");
            return Err(err);
        }

        let mut points = Vec::with_capacity(n);
        points.push(VolatilityPoint::new(first.time, seed.sqrt()));

        self.run(
            &samples,
            1,
            points,
            Carry {
                previous_variance: seed,
                previous_squared_return: first.value * first.value,
                log_likelihood: LogLikelihood::default(),
            },
            series.evicted(),
        )
    }

    fn extend(
        &self,
        previous: &Estimate,
        series: &ReturnSeries,
    ) -> Result<Estimate, EstimatorError> {
        if previous.kind != EstimatorKind::Garch {
            return self.recompute(series);
        }
        let Some(Checkpoint {
            samples: consumed,
            state:
                RecursionState::Garch {
                    previous_variance,
                    previous_squared_return,
                    log_likelihood,
                },
            ..
        }) = previous.checkpoint.filter(|c| c.is_prefix_of(series))
        else {
            return self.recompute(series);
        };

        let samples: Vec<Sample> = series.iter().copied().collect();
        self.run(
            &samples,
            consumed,
            previous.points.clone(),
            Carry {
                previous_variance,
                previous_squared_return,
                log_likelihood: LogLikelihood::resume(log_likelihood),
            },
            series.evicted(),
        )
    }
}
