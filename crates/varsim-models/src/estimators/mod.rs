//! Conditional volatility estimation
//!
//! Four estimators share one interface: each is a pure function of a
//! [`ReturnSeries`] and its validated parameter set, producing an ordered
//! series of conditional volatilities plus diagnostics. No estimator keeps
//! state between calls; the only carried state is the explicit recursion
//! [`Checkpoint`] stored in a returned [`Estimate`], which the incremental
//! [`VolatilityEstimator::extend`] path consumes.
//!
//! Warm-up policy per estimator:
//!
//! | model | minimum samples | points | prefix |
//! |-------|-----------------|--------|--------|
//! | SMAV(w) | w | n - w + 1 | omitted |
//! | EWMA | 2 | n | none |
//! | ARCH(p) | p + 1 | n | p placeholders at sqrt(unconditional variance) |
//! | GARCH(1,1) | 2 | n | none |

pub mod arch;
pub mod diagnostics;
pub mod ewma;
pub mod garch;
pub mod likelihood;
pub mod smav;
pub mod utils;

pub use arch::{ArchConfig, ArchEstimator};
pub use diagnostics::{Diagnostics, ModelDiagnostics};
pub use ewma::{EwmaConfig, EwmaEstimator, EwmaPreset};
pub use garch::{GarchConfig, GarchEstimator, GarchPreset};
pub use likelihood::gaussian_log_likelihood;
pub use smav::{SmavConfig, SmavEstimator};
pub use utils::{TRADING_DAYS_PER_YEAR, annualize, half_life, moments};

use crate::series::ReturnSeries;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during volatility estimation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    /// Rolling window of zero samples
    #[error("Invalid window size: {0} (must be at least 1)")]
    InvalidWindow(usize),

    /// EWMA decay outside (0, 1)
    #[error("Invalid decay parameter: {0} (must be between 0 and 1)")]
    InvalidDecay(f64),

    /// ARCH lag of zero
    #[error("Invalid lag: {0} (must be at least 1)")]
    InvalidLag(usize),

    /// Coefficient that is NaN or infinite
    #[error("Invalid parameter {name}: {value} (must be finite)")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Conditional variance that is zero, negative or not finite
    #[error("Non-positive conditional variance {variance} at index {index} (time {time})")]
    NonPositiveVariance {
        /// Position in the series
        index: usize,
        /// Sample time
        time: i64,
        /// Offending variance
        variance: f64,
    },

    /// Log-likelihood term that is not finite
    #[error("Non-finite log-likelihood term at index {index} (time {time})")]
    NonFiniteLikelihood {
        /// Position in the series
        index: usize,
        /// Sample time
        time: i64,
    },
}

/// Estimator family
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorKind {
    /// Simple moving average of squared returns
    #[display("SMAV")]
    Smav,
    /// Exponentially weighted moving average
    #[display("EWMA")]
    Ewma,
    /// ARCH with a single lagged shock
    #[display("ARCH")]
    Arch,
    /// GARCH(1,1)
    #[display("GARCH")]
    Garch,
}

impl EstimatorKind {
    /// All estimator kinds, in display order
    pub const ALL: [Self; 4] = [Self::Smav, Self::Ewma, Self::Arch, Self::Garch];
}

/// Conditional standard deviation at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPoint {
    /// Time of the sample this estimate belongs to
    pub time: i64,
    /// Conditional volatility (standard deviation, raw decimal units)
    pub value: f64,
}

impl VolatilityPoint {
    /// Create a new point
    pub const fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Samples missing before an estimator can produce its first estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataShortfall {
    /// Minimum number of samples the estimator needs
    pub required: usize,
    /// Number of samples supplied
    pub actual: usize,
}

/// Recursion state captured at the end of a pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Checkpoint {
    /// Samples consumed by the pass
    pub(crate) samples: usize,
    /// Eviction count of the series at the time of the pass
    pub(crate) evicted: u64,
    /// Model-specific carried state
    pub(crate) state: RecursionState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RecursionState {
    /// Windowed estimator: nothing carried beyond the emitted points
    Window,
    /// GARCH: last variance, last squared return and running log-likelihood
    Garch {
        previous_variance: f64,
        previous_squared_return: f64,
        log_likelihood: f64,
    },
}

impl Checkpoint {
    /// Whether `series` extends the series this checkpoint was taken from
    pub(crate) fn is_prefix_of(&self, series: &ReturnSeries) -> bool {
        self.evicted == series.evicted() && self.samples <= series.len()
    }
}

/// Result of one estimation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    /// Estimator that produced the series
    pub kind: EstimatorKind,
    /// Conditional volatility series, oldest first
    pub points: Vec<VolatilityPoint>,
    /// Derived diagnostics
    pub diagnostics: Diagnostics,
    /// Set when the series was too short to produce any estimate
    pub shortfall: Option<DataShortfall>,
    #[serde(skip)]
    pub(crate) checkpoint: Option<Checkpoint>,
}

impl Estimate {
    /// Empty estimate for a series shorter than the estimator's minimum
    pub(crate) fn insufficient(
        kind: EstimatorKind,
        required: usize,
        actual: usize,
        model: ModelDiagnostics,
    ) -> Self {
        Self {
            kind,
            points: Vec::new(),
            diagnostics: Diagnostics::from_points(&[], model),
            shortfall: Some(DataShortfall { required, actual }),
            checkpoint: None,
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no estimate could be produced
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent volatility point
    pub fn latest(&self) -> Option<&VolatilityPoint> {
        self.points.last()
    }

    /// Volatility values, oldest first
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Trait for conditional volatility estimators
pub trait VolatilityEstimator {
    /// Estimator family
    fn kind(&self) -> EstimatorKind;

    /// Minimum number of samples needed for a non-empty result
    fn min_observations(&self) -> usize;

    /// Estimate the full volatility series from scratch
    ///
    /// A series shorter than [`Self::min_observations`] yields an empty
    /// estimate with a [`DataShortfall`], not an error.
    ///
    /// # Errors
    /// Fails when a conditional variance leaves the positive reals or a
    /// log-likelihood term is not finite.
    fn recompute(&self, series: &ReturnSeries) -> Result<Estimate, EstimatorError>;

    /// Extend a previous estimate after samples were appended to the series
    ///
    /// `previous` must come from this estimator on an earlier state of the
    /// same series. The result is identical to [`Self::recompute`].
    ///
    /// Default implementation just re-estimates from scratch.
    fn extend(
        &self,
        previous: &Estimate,
        series: &ReturnSeries,
    ) -> Result<Estimate, EstimatorError> {
        let _ = previous;
        self.recompute(series)
    }
}

/// Parameter set for one estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum EstimatorParams {
    /// Rolling window parameters
    Smav(SmavConfig),
    /// Exponential decay parameters
    Ewma(EwmaConfig),
    /// ARCH coefficients
    Arch(ArchConfig),
    /// GARCH(1,1) coefficients
    Garch(GarchConfig),
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self::Smav(SmavConfig::default())
    }
}

impl EstimatorParams {
    /// Default parameters for an estimator family
    pub fn default_for(kind: EstimatorKind) -> Self {
        match kind {
            EstimatorKind::Smav => Self::Smav(SmavConfig::default()),
            EstimatorKind::Ewma => Self::Ewma(EwmaConfig::default()),
            EstimatorKind::Arch => Self::Arch(ArchConfig::default()),
            EstimatorKind::Garch => Self::Garch(GarchConfig::default()),
        }
    }

    /// Estimator family these parameters configure
    pub const fn kind(&self) -> EstimatorKind {
        match self {
            Self::Smav(_) => EstimatorKind::Smav,
            Self::Ewma(_) => EstimatorKind::Ewma,
            Self::Arch(_) => EstimatorKind::Arch,
            Self::Garch(_) => EstimatorKind::Garch,
        }
    }
}

/// Any of the four estimators, built from a validated parameter set
#[derive(Debug, Clone)]
pub enum Estimator {
    /// Simple moving average volatility
    Smav(SmavEstimator),
    /// Exponentially weighted volatility
    Ewma(EwmaEstimator),
    /// ARCH volatility
    Arch(ArchEstimator),
    /// GARCH(1,1) volatility
    Garch(GarchEstimator),
}

impl Estimator {
    /// Validate `params` and build the matching estimator
    pub fn new(params: EstimatorParams) -> Result<Self, EstimatorError> {
        Ok(match params {
            EstimatorParams::Smav(config) => Self::Smav(SmavEstimator::new(config)?),
            EstimatorParams::Ewma(config) => Self::Ewma(EwmaEstimator::new(config)?),
            EstimatorParams::Arch(config) => Self::Arch(ArchEstimator::new(config)?),
            EstimatorParams::Garch(config) => Self::Garch(GarchEstimator::new(config)?),
        })
    }

    /// Parameter set this estimator was built from
    pub fn params(&self) -> EstimatorParams {
        match self {
            Self::Smav(e) => EstimatorParams::Smav(e.config().clone()),
            Self::Ewma(e) => EstimatorParams::Ewma(e.config().clone()),
            Self::Arch(e) => EstimatorParams::Arch(e.config().clone()),
            Self::Garch(e) => EstimatorParams::Garch(e.config().clone()),
        }
    }

    fn inner(&self) -> &dyn VolatilityEstimator {
        match self {
            Self::Smav(e) => e,
            Self::Ewma(e) => e,
            Self::Arch(e) => e,
            Self::Garch(e) => e,
        }
    }
}

impl VolatilityEstimator for Estimator {
    fn kind(&self) -> EstimatorKind {
        self.inner().kind()
    }

    fn min_observations(&self) -> usize {
        self.inner().min_observations()
    }

    fn recompute(&self, series: &ReturnSeries) -> Result<Estimate, EstimatorError> {
        self.inner().recompute(series)
    }

    fn extend(
        &self,
        previous: &Estimate,
        series: &ReturnSeries,
    ) -> Result<Estimate, EstimatorError> {
        self.inner().extend(previous, series)
    }
}

/// Check that a conditional variance is finite and strictly positive
pub(crate) fn positive_variance(
    index: usize,
    time: i64,
    variance: f64,
) -> Result<f64, EstimatorError> {
    if variance.is_finite() && variance > 0.0 {
        Ok(variance)
    } else {
        Err(EstimatorError::NonPositiveVariance {
            index,
            time,
            variance,
        })
    }
}

/// Reject NaN or infinite coefficients
pub(crate) fn finite_parameter(name: &'static str, value: f64) -> Result<f64, EstimatorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EstimatorError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        let names: Vec<String> = EstimatorKind::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["SMAV", "EWMA", "ARCH", "GARCH"]);
    }

    #[test]
    fn test_params_kind_round_trip() {
        for kind in EstimatorKind::ALL {
            let params = EstimatorParams::default_for(kind);
            assert_eq!(params.kind(), kind);
            let estimator = Estimator::new(params.clone()).unwrap();
            assert_eq!(estimator.kind(), kind);
            assert_eq!(estimator.params(), params);
        }
    }

    #[test]
    fn test_params_from_json() {
        let params: EstimatorParams =
            serde_json::from_str(r#"{"model":"garch","omega":0.0001,"alpha":0.1,"beta":0.8}"#)
                .unwrap();
        assert_eq!(
            params,
            EstimatorParams::Garch(GarchConfig {
                omega: 0.0001,
                alpha: 0.1,
                beta: 0.8,
            })
        );
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = EstimatorParams::Ewma(EwmaConfig { decay: 1.0 });
        assert_eq!(
            Estimator::new(params).unwrap_err(),
            EstimatorError::InvalidDecay(1.0)
        );
    }

    #[test]
    fn test_positive_variance_guard() {
        assert!(positive_variance(0, 0, 1e-12).is_ok());
        assert!(positive_variance(0, 0, 0.0).is_err());
        assert!(positive_variance(0, 0, -1.0).is_err());
        assert!(positive_variance(0, 0, f64::NAN).is_err());
        assert!(positive_variance(0, 0, f64::INFINITY).is_err());
    }
}
