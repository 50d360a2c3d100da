//! Price-to-return feed
//!
//! Turns a stream of prices sampled at a fixed cadence into percentage log
//! returns, the input the volatility session consumes. Each tick advances the
//! feed clock by one and yields
//!
//! r = clamp(100 * ln(p_t / p_{t-1}), min, max)
//!
//! A non-positive price on either side yields a zero return. The feed never
//! owns timing: the caller decides when to tick.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use varsim_models::Sample;

/// Errors that can occur in the return feed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// Return range with min ≥ max or non-finite bounds
    #[error("Invalid return range: [{min}, {max}]")]
    InvalidReturnRange {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// Price that is NaN or infinite
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),
}

/// Bounds applied to every emitted return, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnRange {
    /// Lower bound (default: -10)
    pub min: f64,
    /// Upper bound (default: 10)
    pub max: f64,
}

impl Default for ReturnRange {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 10.0,
        }
    }
}

impl ReturnRange {
    /// Create a validated range
    pub fn new(min: f64, max: f64) -> Result<Self, FeedError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    fn validate(&self) -> Result<(), FeedError> {
        if self.min.is_finite() && self.max.is_finite() && self.min < self.max {
            Ok(())
        } else {
            Err(FeedError::InvalidReturnRange {
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Clamp a return into the range
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Configuration for the return feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Clock value before the first tick; the first sample is stamped one later (default: 100)
    pub start_time: i64,
    /// Bounds on emitted returns (default: [-10, 10])
    pub return_range: ReturnRange,
    /// Reference price for the first return (default: 600, the middle of the 500-700 range)
    pub initial_price: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            start_time: 100,
            return_range: ReturnRange::default(),
            initial_price: 600.0,
        }
    }
}

/// Stateful converter from prices to clamped percentage log returns
#[derive(Debug, Clone)]
pub struct ReturnFeed {
    time: i64,
    last_price: f64,
    range: ReturnRange,
    running: bool,
}

impl ReturnFeed {
    /// Create a running feed
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        config.return_range.validate()?;
        if !config.initial_price.is_finite() {
            return Err(FeedError::InvalidPrice(config.initial_price));
        }
        Ok(Self {
            time: config.start_time,
            last_price: config.initial_price,
            range: config.return_range,
            running: true,
        })
    }

    /// Feed one price observation
    ///
    /// # Returns
    /// * The next return sample, or `None` while paused
    pub fn tick(&mut self, price: f64) -> Result<Option<Sample>, FeedError> {
        if !price.is_finite() {
            return Err(FeedError::InvalidPrice(price));
        }
        if !self.running {
            return Ok(None);
        }

        self.time += 1;
        let value = if self.last_price > 0.0 && price > 0.0 {
            self.range.clamp((price / self.last_price).ln() * 100.0)
        } else {
            0.0
        };
        self.last_price = price;

        Ok(Some(Sample::new(self.time, value)))
    }

    /// Stop emitting samples; ticks are ignored until [`Self::resume`]
    pub fn pause(&mut self) {
        debug!(time = self.time, "feed paused");
        self.running = false;
    }

    /// Resume emitting samples
    pub fn resume(&mut self) {
        debug!(time = self.time, "feed resumed");
        self.running = true;
    }

    /// Whether ticks currently produce samples
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Replace the return bounds
    pub fn set_return_range(&mut self, range: ReturnRange) -> Result<(), FeedError> {
        range.validate()?;
        self.range = range;
        Ok(())
    }

    /// Current return bounds
    pub const fn return_range(&self) -> ReturnRange {
        self.range
    }

    /// Re-centre the reference price, e.g. after the price range changed
    pub fn reset_price(&mut self, price: f64) -> Result<(), FeedError> {
        if !price.is_finite() {
            return Err(FeedError::InvalidPrice(price));
        }
        self.last_price = price;
        Ok(())
    }

    /// Time stamp of the most recent sample
    pub const fn time(&self) -> i64 {
        self.time
    }
}
