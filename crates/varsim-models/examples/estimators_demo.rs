//! Compare the four estimators and their presets on one return series

use varsim_models::estimators::{EwmaPreset, GarchPreset};
use varsim_models::{
    ArchConfig, ArchEstimator, EwmaEstimator, GarchEstimator, ReturnSeries, SmavConfig,
    SmavEstimator, VolatilityEstimator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let returns: Vec<f64> = (0..250)
        .map(|i| {
            let shock = f64::from((i * 37) % 41) / 41.0 - 0.5;
            if (120..160).contains(&i) { 0.06 * shock } else { 0.015 * shock }
        })
        .collect();
    let series = ReturnSeries::from_values(&returns)?;

    for window in SmavConfig::COMMON_WINDOWS {
        let estimate = SmavEstimator::new(SmavConfig { window })?.recompute(&series)?;
        println!(
            "SMAV({window:>2})  points={:>3} current={:.5}",
            estimate.len(),
            estimate.diagnostics.current_volatility.unwrap_or(f64::NAN),
        );
    }

    for preset in EwmaPreset::ALL {
        let estimator = EwmaEstimator::new(preset.config())?;
        let estimate = estimator.recompute(&series)?;
        println!(
            "EWMA({:.2}) half-life={:>5.1} current={:.5}",
            preset.decay(),
            estimator.half_life(),
            estimate.diagnostics.current_volatility.unwrap_or(f64::NAN),
        );
    }

    let arch = ArchEstimator::new(ArchConfig::default())?.recompute(&series)?;
    println!(
        "ARCH(1)    log-likelihood={:.2} current={:.5}",
        arch.diagnostics.log_likelihood().unwrap_or(f64::NAN),
        arch.diagnostics.current_volatility.unwrap_or(f64::NAN),
    );

    for preset in GarchPreset::ALL {
        let estimator = GarchEstimator::new(preset.config())?;
        match estimator.recompute(&series) {
            Ok(estimate) => println!(
                "GARCH {:<16} persistence={:.2} long-run={:.5} log-likelihood={:.2}",
                preset.name(),
                estimator.persistence(),
                estimate.diagnostics.long_run_volatility().unwrap_or(f64::NAN),
                estimate.diagnostics.log_likelihood().unwrap_or(f64::NAN),
            ),
            // α + β = 1 has no long-run variance to seed from
            Err(err) => println!(
                "GARCH {:<16} persistence={:.2} stable={} failed: {err}",
                preset.name(),
                estimator.persistence(),
                estimator.is_stable(),
            ),
        }
    }

    Ok(())
}
