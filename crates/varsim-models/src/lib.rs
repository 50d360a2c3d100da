#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/varsim/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod estimators;
pub mod series;

// Re-export main types
pub use estimators::{
    ArchConfig, ArchEstimator, DataShortfall, Diagnostics, Estimate, Estimator, EstimatorError,
    EstimatorKind, EstimatorParams, EwmaConfig, EwmaEstimator, GarchConfig, GarchEstimator,
    ModelDiagnostics, SmavConfig, SmavEstimator, VolatilityEstimator, VolatilityPoint,
};
pub use series::{ReturnSeries, Sample, SeriesError};
