//! Session Controller
//!
//! Owns the return series and the active estimator, and keeps the latest
//! volatility estimate in step with both. A parameter change always discards
//! the previous result and starts again from the full series; new samples
//! reuse the previous result through [`VolatilityEstimator::extend`], which
//! falls back to a full pass whenever the series no longer extends the one
//! the result was computed on.

use crate::config::{RecomputePolicy, SessionConfig};
use crate::error::Result;
use tracing::{debug, info, warn};
use varsim_models::{
    Diagnostics, Estimate, Estimator, EstimatorError, EstimatorKind, EstimatorParams,
    ReturnSeries, Sample, VolatilityEstimator,
};

/// Interactive volatility session
#[derive(Debug, Clone)]
pub struct SessionController {
    series: ReturnSeries,
    estimator: Estimator,
    policy: RecomputePolicy,
    latest: Option<Estimate>,
    stale: bool,
}

impl SessionController {
    /// Create a session and compute the first estimate
    ///
    /// The series is pre-filled with `config.warm_start` zero returns at times
    /// `0..warm_start`, truncated to the capacity.
    ///
    /// # Errors
    /// Fails on a zero capacity, invalid parameters, or when the first
    /// estimation pass fails.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let estimator = Estimator::new(config.params)?;
        let mut series = match config.capacity {
            Some(capacity) => ReturnSeries::with_capacity_limit(capacity)?,
            None => ReturnSeries::new(),
        };

        let warm_start = config
            .capacity
            .map_or(config.warm_start, |c| c.min(config.warm_start));
        for sample in ReturnSeries::flat(warm_start).iter() {
            series.push(sample.time, sample.value)?;
        }

        debug!(
            model = %estimator.kind(),
            capacity = ?config.capacity,
            warm_start,
            "starting volatility session"
        );

        let mut session = Self {
            series,
            estimator,
            policy: config.policy,
            latest: None,
            stale: true,
        };
        session.refresh()?;
        Ok(session)
    }

    /// Create a session from a JSON configuration
    pub fn load_config_json(json: &str) -> Result<Self> {
        Self::new(SessionConfig::from_json(json)?)
    }

    /// Append one return
    ///
    /// Under [`RecomputePolicy::Eager`] the estimate is refreshed immediately;
    /// under [`RecomputePolicy::Deferred`] it is only marked stale.
    pub fn append(&mut self, time: i64, value: f64) -> Result<()> {
        if let Some(evicted) = self.series.push(time, value)? {
            debug!(time = evicted.time, "evicted oldest sample");
        }
        self.stale = true;

        if self.policy == RecomputePolicy::Eager {
            self.refresh()?;
        }
        Ok(())
    }

    /// Append a sample produced by a [`crate::ReturnFeed`]
    pub fn append_sample(&mut self, sample: Sample) -> Result<()> {
        self.append(sample.time, sample.value)
    }

    /// Bring the estimate up to date with the series
    ///
    /// A current estimate is returned as is. On failure the previous estimate
    /// is dropped and the session stays stale.
    pub fn refresh(&mut self) -> Result<&Estimate> {
        let estimate = match self.latest.take() {
            Some(current) if !self.stale => current,
            previous => match self.estimate(previous.as_ref()) {
                Ok(estimate) => estimate,
                Err(err) => {
                    warn!(
                        model = %self.estimator.kind(),
                        %err,
                        "estimation failed, result cleared"
                    );
                    self.stale = true;
                    return Err(err.into());
                }
            },
        };

        self.stale = false;
        Ok(&*self.latest.insert(estimate))
    }

    fn estimate(
        &self,
        previous: Option<&Estimate>,
    ) -> std::result::Result<Estimate, EstimatorError> {
        let estimate = match previous {
            Some(previous) => self.estimator.extend(previous, &self.series)?,
            None => self.estimator.recompute(&self.series)?,
        };

        debug!(
            model = %estimate.kind,
            samples = self.series.len(),
            points = estimate.len(),
            incremental = previous.is_some(),
            "refreshed volatility estimate"
        );
        Ok(estimate)
    }

    /// Replace the active estimator and recompute from scratch
    ///
    /// Invalid parameters leave the previous configuration and estimate
    /// untouched. A failed pass with valid parameters installs them and
    /// clears the estimate.
    pub fn set_params(&mut self, params: EstimatorParams) -> Result<&Estimate> {
        let estimator = Estimator::new(params)?;
        info!(
            from = %self.estimator.kind(),
            to = %estimator.kind(),
            "switching estimator parameters"
        );

        self.estimator = estimator;
        self.latest = None;
        self.stale = true;
        self.refresh()
    }

    /// Switch to the default parameters of another estimator family
    pub fn select(&mut self, kind: EstimatorKind) -> Result<&Estimate> {
        self.set_params(EstimatorParams::default_for(kind))
    }

    /// Latest estimate, if one is available
    pub const fn latest(&self) -> Option<&Estimate> {
        self.latest.as_ref()
    }

    /// Diagnostics of the latest estimate
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.latest.as_ref().map(|e| &e.diagnostics)
    }

    /// Active estimator parameters
    pub fn params(&self) -> EstimatorParams {
        self.estimator.params()
    }

    /// Active estimator family
    pub fn kind(&self) -> EstimatorKind {
        self.estimator.kind()
    }

    /// Active estimator
    pub const fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Return series
    pub const fn series(&self) -> &ReturnSeries {
        &self.series
    }

    /// Recompute policy
    pub const fn policy(&self) -> RecomputePolicy {
        self.policy
    }

    /// Change the recompute policy; switching to eager refreshes a stale estimate
    pub fn set_policy(&mut self, policy: RecomputePolicy) -> Result<()> {
        self.policy = policy;
        if policy == RecomputePolicy::Eager && self.stale {
            self.refresh()?;
        }
        Ok(())
    }

    /// Whether samples were appended since the last estimate
    pub const fn is_stale(&self) -> bool {
        self.stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use approx::assert_relative_eq;
    use varsim_models::{ArchConfig, EwmaConfig, SeriesError, SmavConfig};

    fn session(
        capacity: Option<usize>,
        warm_start: usize,
        params: EstimatorParams,
    ) -> SessionController {
        SessionController::new(SessionConfig {
            capacity,
            warm_start,
            params,
            policy: RecomputePolicy::Eager,
        })
        .unwrap()
    }

    #[test]
    fn test_default_session() {
        let session = SessionController::new(SessionConfig::default()).unwrap();

        assert_eq!(session.series().len(), 100);
        assert_eq!(session.kind(), EstimatorKind::Smav);
        assert!(!session.is_stale());

        let estimate = session.latest().unwrap();
        assert_eq!(estimate.len(), 81);
        assert!(estimate.points.iter().all(|p| p.value == 0.0));
        assert_eq!(estimate.points[0].time, 19);
    }

    #[test]
    fn test_warm_start_truncated_to_capacity() {
        let session = session(Some(10), 100, EstimatorParams::default());
        assert_eq!(session.series().len(), 10);
        assert_eq!(session.series().evicted(), 0);
        assert_eq!(session.series().times(), ReturnSeries::flat(10).times());
        assert!(session.series().iter().all(|s| s.value == 0.0));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = SessionConfig {
            capacity: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            SessionController::new(config),
            Err(SessionError::Series(SeriesError::ZeroCapacity))
        ));
    }

    #[test]
    fn test_short_series_is_soft() {
        let session = session(None, 5, EstimatorParams::default());
        let estimate = session.latest().unwrap();
        assert!(estimate.is_empty());
        assert_eq!(estimate.shortfall.map(|s| (s.required, s.actual)), Some((20, 5)));
    }

    #[test]
    fn test_append_eager() {
        let mut session = session(Some(5), 0, EstimatorParams::Smav(SmavConfig { window: 2 }));
        session.append(0, 0.03).unwrap();
        assert!(session.latest().unwrap().is_empty());

        session.append(1, 0.04).unwrap();
        let latest = session.latest().unwrap().latest().copied().unwrap();
        assert_eq!(latest.time, 1);
        assert_relative_eq!(
            latest.value,
            ((0.03 * 0.03 + 0.04 * 0.04) / 2.0_f64).sqrt(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_append_deferred() {
        let mut session = SessionController::new(SessionConfig {
            warm_start: 30,
            policy: RecomputePolicy::Deferred,
            ..Default::default()
        })
        .unwrap();
        let before = session.latest().unwrap().len();

        session.append(30, 0.02).unwrap();
        assert!(session.is_stale());
        assert_eq!(session.latest().unwrap().len(), before);

        assert_eq!(session.refresh().unwrap().len(), before + 1);
        assert!(!session.is_stale());
    }

    #[test]
    fn test_switch_to_eager_refreshes() {
        let mut session = SessionController::new(SessionConfig {
            policy: RecomputePolicy::Deferred,
            ..Default::default()
        })
        .unwrap();
        session.append(100, 0.01).unwrap();
        session.set_policy(RecomputePolicy::Eager).unwrap();
        assert!(!session.is_stale());
    }

    #[test]
    fn test_series_error_surfaces() {
        let mut session = session(None, 10, EstimatorParams::default());
        let err = session.append(3, 0.01).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Series(SeriesError::OutOfOrder {
                previous: 9,
                time: 3
            })
        ));
        assert_eq!(session.series().len(), 10);
    }

    #[test]
    fn test_invalid_params_keep_previous_state() {
        let mut session = session(None, 30, EstimatorParams::default());
        let before = session.latest().cloned();

        let err = session
            .set_params(EstimatorParams::Ewma(EwmaConfig { decay: 1.5 }))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Estimator(EstimatorError::InvalidDecay(_))
        ));
        assert_eq!(session.kind(), EstimatorKind::Smav);
        assert_eq!(session.latest().cloned(), before);
    }

    #[test]
    fn test_select_uses_defaults() {
        let mut session = session(None, 30, EstimatorParams::default());
        for kind in EstimatorKind::ALL {
            let estimate = session.select(kind).unwrap();
            assert_eq!(estimate.kind, kind);
            assert_eq!(session.params(), EstimatorParams::default_for(kind));
        }
    }

    #[test]
    fn test_failed_pass_clears_result() {
        let mut session = session(None, 10, EstimatorParams::default());
        let params = EstimatorParams::Arch(ArchConfig {
            alpha0: 0.0,
            alpha1: 0.5,
            lag: 1,
        });

        assert!(session.set_params(params.clone()).is_err());
        assert_eq!(session.params(), params);
        assert!(session.latest().is_none());
        assert!(session.diagnostics().is_none());
        assert!(session.is_stale());
    }
}
