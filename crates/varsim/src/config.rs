//! Session configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use varsim_models::EstimatorParams;

/// When the session re-estimates after a new sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecomputePolicy {
    /// Re-estimate on every append
    #[default]
    Eager,
    /// Only mark the result stale; the caller decides when to refresh
    Deferred,
}

/// Volatility session configuration
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration:
///
/// ```
/// use varsim::SessionConfig;
///
/// let config = SessionConfig::from_json(r#"{"capacity": 250}"#).unwrap();
/// assert_eq!(config.capacity, Some(250));
/// assert_eq!(config.warm_start, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum samples kept, oldest evicted first; `None` for unbounded (default: 100)
    pub capacity: Option<usize>,
    /// Zero returns pre-filled before the first real sample (default: 100)
    pub warm_start: usize,
    /// Active estimator and its parameters (default: SMAV, window 20)
    pub params: EstimatorParams,
    /// Recompute policy (default: eager)
    pub policy: RecomputePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: Some(100),
            warm_start: 100,
            params: EstimatorParams::default(),
            policy: RecomputePolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from JSON, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
