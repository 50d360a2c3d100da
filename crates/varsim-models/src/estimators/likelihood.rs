//! Gaussian log-likelihood shared by the ARCH-family models
//!
//! For a return r with conditional variance σ²:
//! ℓ = -0.5 * (ln(2π) + ln(σ²) + (r / σ)²)

use super::EstimatorError;
use std::f64::consts::PI;

/// Log-density of `value` under N(0, `variance`)
pub fn gaussian_log_likelihood(value: f64, variance: f64) -> f64 {
    let standardized = value / variance.sqrt();
    -0.5 * ((2.0 * PI).ln() + variance.ln() + standardized * standardized)
}

/// Running sum of per-point log-likelihood terms
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LogLikelihood {
    total: f64,
}

impl LogLikelihood {
    /// Resume accumulation from a previous total
    pub(crate) const fn resume(total: f64) -> Self {
        Self { total }
    }

    /// Add the term for the sample at `index`
    ///
    /// `variance` must already be known to be positive.
    pub(crate) fn add(
        &mut self,
        index: usize,
        time: i64,
        value: f64,
        variance: f64,
    ) -> Result<(), EstimatorError> {
        let term = gaussian_log_likelihood(value, variance);
        if !term.is_finite() {
            return Err(EstimatorError::NonFiniteLikelihood { index, time });
        }
        self.total += term;
        Ok(())
    }

    pub(crate) const fn total(&self) -> f64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_normal_at_zero() {
        // ln φ(0) = -0.5 ln(2π)
        assert_relative_eq!(
            gaussian_log_likelihood(0.0, 1.0),
            -0.5 * (2.0 * PI).ln(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_scaled_variance() {
        let ll = gaussian_log_likelihood(0.02, 0.0004);
        // r/σ = 1
        let expected = -0.5 * ((2.0 * PI).ln() + 0.0004_f64.ln() + 1.0);
        assert_relative_eq!(ll, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_accumulator_rejects_non_finite() {
        let mut ll = LogLikelihood::default();
        ll.add(0, 0, 0.01, 0.0001).unwrap();
        let before = ll.total();
        assert!(ll.add(1, 1, 1e300, 1e-300).is_err());
        assert_eq!(ll.total(), before);
    }
}
