//! Modular common utilities shared across edgebulk crates.
//!
//! Nothing in this crate knows about zones, purges or pagination; it holds
//! the generic pieces the engine is assembled from.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: errors and serde helpers
//! - `runtime`: async infrastructure (concurrency gate, retry executor)
//! - `observability`: tracing (pulled in by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{CommonError, CommonResult, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use resilience::{
    policies, BackoffStrategy, ConcurrencyGate, GateConfig, GateMetrics, RetryConfig,
    RetryDecision, RetryError, RetryExecutor, RetryOutcome, RetryPolicy, RetryResult,
};
#[cfg(feature = "foundation")]
pub use utils::serde::{duration_millis, option_duration_millis};
