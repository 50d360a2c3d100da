//! Return series
//!
//! An ordered, append-only sequence of `(time, return)` samples. Insertion
//! order is time order. A series may carry a capacity limit, in which case
//! appending to a full series evicts the oldest sample first (FIFO).

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors that can occur while building a return series
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// Return value is NaN or infinite
    #[error("Non-finite return at time {time}")]
    NonFiniteReturn {
        /// Time of the rejected sample
        time: i64,
    },

    /// Sample time is earlier than the last stored sample
    #[error("Out-of-order sample: time {time} precedes last stored time {previous}")]
    OutOfOrder {
        /// Time of the last stored sample
        previous: i64,
        /// Time of the rejected sample
        time: i64,
    },

    /// Capacity limit of zero
    #[error("Series capacity must be at least 1")]
    ZeroCapacity,
}

/// One observed return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Ordinal time stamp (monotonically non-decreasing within a series)
    pub time: i64,
    /// Return value in the producer's units
    pub value: f64,
}

impl Sample {
    /// Create a new sample
    pub const fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Ordered sequence of return samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    samples: VecDeque<Sample>,
    capacity: Option<usize>,
    evicted: u64,
}

impl ReturnSeries {
    /// Create an empty, unbounded series
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty series that keeps at most `capacity` samples
    pub fn with_capacity_limit(capacity: usize) -> Result<Self, SeriesError> {
        if capacity == 0 {
            return Err(SeriesError::ZeroCapacity);
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
            evicted: 0,
        })
    }

    /// Build an unbounded series from raw returns, stamped with times `0..n`
    pub fn from_values(values: &[f64]) -> Result<Self, SeriesError> {
        let mut series = Self::new();
        for (time, &value) in (0_i64..).zip(values) {
            series.push(time, value)?;
        }
        Ok(series)
    }

    /// Unbounded series of `len` zero returns at times `0..len`
    pub fn flat(len: usize) -> Self {
        Self {
            samples: (0_i64..).take(len).map(|t| Sample::new(t, 0.0)).collect(),
            capacity: None,
            evicted: 0,
        }
    }

    /// Append a sample, evicting the oldest one if the series is full
    ///
    /// # Returns
    /// * The evicted sample, if any
    ///
    /// # Errors
    /// Rejects non-finite values and times earlier than the last stored sample.
    pub fn push(&mut self, time: i64, value: f64) -> Result<Option<Sample>, SeriesError> {
        if !value.is_finite() {
            return Err(SeriesError::NonFiniteReturn { time });
        }
        if let Some(last) = self.samples.back()
            && time < last.time
        {
            return Err(SeriesError::OutOfOrder {
                previous: last.time,
                time,
            });
        }

        let evicted = match self.capacity {
            Some(capacity) if self.samples.len() >= capacity => {
                self.evicted += 1;
                self.samples.pop_front()
            }
            _ => None,
        };
        self.samples.push_back(Sample::new(time, value));
        Ok(evicted)
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Capacity limit, if bounded
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Total number of samples evicted since the series was created
    ///
    /// Two snapshots with the same eviction count share a common prefix, so a
    /// result computed on the earlier one can be extended instead of rebuilt.
    pub const fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Sample at position `index` (0 = oldest)
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Oldest stored sample
    pub fn first(&self) -> Option<&Sample> {
        self.samples.front()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Iterate samples oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    /// Return values as a vector, oldest first
    pub fn values(&self) -> Array1<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Time stamps, oldest first
    pub fn times(&self) -> Vec<i64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Remove all samples, counting them as evicted; the capacity limit is kept
    pub fn clear(&mut self) {
        self.evicted += self.samples.len() as u64;
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_order() {
        let mut series = ReturnSeries::new();
        series.push(1, 0.01).unwrap();
        series.push(1, -0.02).unwrap();
        series.push(3, 0.03).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.times(), vec![1, 1, 3]);
        assert_eq!(series.values().to_vec(), vec![0.01, -0.02, 0.03]);
    }

    #[test]
    fn test_rejects_out_of_order() {
        let mut series = ReturnSeries::new();
        series.push(5, 0.01).unwrap();
        let err = series.push(4, 0.01).unwrap_err();
        assert_eq!(
            err,
            SeriesError::OutOfOrder {
                previous: 5,
                time: 4
            }
        );
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut series = ReturnSeries::new();
        assert!(series.push(0, f64::NAN).is_err());
        assert!(series.push(0, f64::INFINITY).is_err());
        assert!(series.is_empty());
    }

    #[test]
    fn test_fifo_eviction() {
        let mut series = ReturnSeries::with_capacity_limit(3).unwrap();
        for t in 0..3 {
            assert_eq!(series.push(t, t as f64).unwrap(), None);
        }
        let evicted = series.push(3, 3.0).unwrap();

        assert_eq!(evicted, Some(Sample::new(0, 0.0)));
        assert_eq!(series.len(), 3);
        assert_eq!(series.evicted(), 1);
        assert_eq!(series.first().map(|s| s.time), Some(1));
        assert_eq!(series.last().map(|s| s.time), Some(3));
    }

    #[test]
    fn test_zero_capacity() {
        assert_eq!(
            ReturnSeries::with_capacity_limit(0).unwrap_err(),
            SeriesError::ZeroCapacity
        );
    }

    #[test]
    fn test_clear_counts_evictions() {
        let mut series = ReturnSeries::from_values(&[0.01, 0.02]).unwrap();
        series.clear();
        assert!(series.is_empty());
        assert_eq!(series.evicted(), 2);
    }

    #[test]
    fn test_flat_series() {
        let series = ReturnSeries::flat(4);
        assert_eq!(series.times(), vec![0, 1, 2, 3]);
        assert!(series.iter().all(|s| s.value == 0.0));
    }
}
