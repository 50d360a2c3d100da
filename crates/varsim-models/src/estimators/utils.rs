//! Shared numeric helpers for the estimators

use ndarray::ArrayView1;

/// Trading days per year used for annualization
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Scale a per-period volatility to an annual figure (× √252)
pub fn annualize(volatility: f64) -> f64 {
    volatility * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Periods for a shock's influence to halve under geometric decay
///
/// Half-life = ln(0.5) / ln(decay)
pub fn half_life(decay: f64) -> f64 {
    0.5_f64.ln() / decay.ln()
}

/// Population mean and variance (divides by n)
///
/// Returns `(0.0, 0.0)` for an empty slice.
pub fn moments(values: ArrayView1<'_, f64>) -> (f64, f64) {
    let Some(mean) = values.mean() else {
        return (0.0, 0.0);
    };
    let n = values.len() as f64;
    let variance = values.iter().map(|&r| (r - mean) * (r - mean)).sum::<f64>() / n;
    (mean, variance)
}
