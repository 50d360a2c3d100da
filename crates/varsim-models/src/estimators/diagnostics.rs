//! Estimator diagnostics
//!
//! Diagnostics are derived from the volatility series and the parameter set
//! on every pass; they are never stored independently of an [`Estimate`].
//!
//! [`Estimate`]: super::Estimate

use super::VolatilityPoint;
use super::utils::annualize;
use serde::{Deserialize, Serialize};

/// Model-specific diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum ModelDiagnostics {
    /// Rolling window estimator
    Smav {
        /// Window length in samples
        window: usize,
    },
    /// Exponentially weighted estimator
    Ewma {
        /// Decay factor λ
        decay: f64,
        /// Periods for a shock's influence to halve
        half_life: f64,
    },
    /// ARCH model
    Arch {
        /// Lag of the shock term
        lag: usize,
        /// Whether α₁ < 1
        stable: bool,
        /// Sum of Gaussian log-likelihood terms for the non-placeholder points
        log_likelihood: f64,
    },
    /// GARCH(1,1) model
    Garch {
        /// α + β
        persistence: f64,
        /// Whether α + β < 1
        stable: bool,
        /// ω / (1 - α - β), as the formula yields it
        long_run_variance: f64,
        /// √(long-run variance) when that variance is finite and positive
        long_run_volatility: Option<f64>,
        /// ln(0.5) / ln(α + β) when 0 < α + β < 1
        half_life: Option<f64>,
        /// Sum of Gaussian log-likelihood terms for points after the first
        log_likelihood: f64,
    },
}

/// Diagnostics reported alongside a volatility series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Most recent conditional volatility
    pub current_volatility: Option<f64>,
    /// Most recent volatility × √252
    pub annualized_volatility: Option<f64>,
    /// Model-specific figures
    pub model: ModelDiagnostics,
}

impl Diagnostics {
    /// Derive the common figures from a finished series
    pub fn from_points(points: &[VolatilityPoint], model: ModelDiagnostics) -> Self {
        let current_volatility = points.last().map(|p| p.value);
        Self {
            current_volatility,
            annualized_volatility: current_volatility.map(annualize),
            model,
        }
    }

    /// Whether the model's stationarity condition holds
    ///
    /// SMAV and EWMA have no such condition and always report stable.
    pub const fn is_stable(&self) -> bool {
        match self.model {
            ModelDiagnostics::Arch { stable, .. } | ModelDiagnostics::Garch { stable, .. } => {
                stable
            }
            ModelDiagnostics::Smav { .. } | ModelDiagnostics::Ewma { .. } => true,
        }
    }

    /// Accumulated log-likelihood, for the models that report one
    pub const fn log_likelihood(&self) -> Option<f64> {
        match self.model {
            ModelDiagnostics::Arch { log_likelihood, .. }
            | ModelDiagnostics::Garch { log_likelihood, .. } => Some(log_likelihood),
            ModelDiagnostics::Smav { .. } | ModelDiagnostics::Ewma { .. } => None,
        }
    }

    /// Half-life in periods, for the models that report one
    pub const fn half_life(&self) -> Option<f64> {
        match self.model {
            ModelDiagnostics::Ewma { half_life, .. } => Some(half_life),
            ModelDiagnostics::Garch { half_life, .. } => half_life,
            ModelDiagnostics::Smav { .. } | ModelDiagnostics::Arch { .. } => None,
        }
    }

    /// Long-run volatility, for GARCH
    pub const fn long_run_volatility(&self) -> Option<f64> {
        match self.model {
            ModelDiagnostics::Garch {
                long_run_volatility,
                ..
            } => long_run_volatility,
            _ => None,
        }
    }
}
