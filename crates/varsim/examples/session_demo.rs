//! Drive a volatility session from a synthetic price path
//!
//! Run with `RUST_LOG=varsim=debug` to see every refresh.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use varsim::models::estimators::GarchPreset;
use varsim::models::{EstimatorKind, EstimatorParams, GarchConfig};
use varsim::{FeedConfig, ReturnFeed, ReturnRange, SessionConfig, SessionController};

/// Calm oscillation with a volatile stretch between ticks 60 and 90
fn price_at(tick: u32) -> f64 {
    let t = f64::from(tick);
    let amplitude = if (60..90).contains(&tick) { 25.0 } else { 4.0 };
    600.0 + amplitude * (t * 0.7).sin() + 2.0 * (t * 0.13).cos()
}

fn main() -> varsim::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "varsim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut feed = ReturnFeed::new(FeedConfig::default())?;
    let mut session = SessionController::new(SessionConfig {
        params: EstimatorParams::Garch(GarchConfig::default()),
        ..Default::default()
    })?;

    for tick in 0..120 {
        if tick == 100 {
            // Tighter bounds for the tail of the run
            feed.set_return_range(ReturnRange::new(-2.0, 2.0)?)?;
        }
        if let Some(sample) = feed.tick(price_at(tick))? {
            session.append_sample(sample)?;
        }
    }

    for kind in EstimatorKind::ALL {
        let estimate = session.select(kind)?;
        let diagnostics = &estimate.diagnostics;
        println!(
            "{kind:>5}: points={:>3} current={:>8.4} annualized={:>8.4} stable={} log_likelihood={:?}",
            estimate.len(),
            diagnostics.current_volatility.unwrap_or(f64::NAN),
            diagnostics.annualized_volatility.unwrap_or(f64::NAN),
            diagnostics.is_stable(),
            diagnostics.log_likelihood(),
        );
    }

    for preset in GarchPreset::ALL {
        match session.set_params(EstimatorParams::Garch(preset.config())) {
            Ok(estimate) => println!(
                "GARCH {:<16} current={:>8.4} long-run={:?}",
                preset.name(),
                estimate.diagnostics.current_volatility.unwrap_or(f64::NAN),
                estimate.diagnostics.long_run_volatility(),
            ),
            Err(err) => println!("GARCH {:<16} failed: {err}", preset.name()),
        }
    }

    Ok(())
}
