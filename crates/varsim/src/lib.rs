#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/varsim/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod feed;
pub mod session;

// Re-export the estimator crate
pub use varsim_models as models;

// Re-export session types
pub use config::{RecomputePolicy, SessionConfig};
pub use error::{Result, SessionError};
pub use feed::{FeedConfig, FeedError, ReturnFeed, ReturnRange};
pub use session::SessionController;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
