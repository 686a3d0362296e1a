//! Resilience patterns for bulk remote operations
//!
//! This module provides **generic, reusable** building blocks:
//! - **Concurrency gate**: semaphore admission control that bounds how many
//!   remote calls are in flight at once
//! - **Retry executor**: configurable retry with fixed or exponential
//!   backoff and pluggable retry policies
//!
//! Both are generic over the wrapped operation and its error type; the engine
//! in `edgebulk-core` composes them with domain semantics.

pub mod bulkhead;
pub mod retry;

// Re-export gate types
pub use bulkhead::{ConcurrencyGate, GateConfig, GateError, GateMetrics};
// Re-export retry types
pub use retry::{
    policies, BackoffStrategy, RetryConfig, RetryDecision, RetryError, RetryExecutor,
    RetryOutcome, RetryPolicy, RetryResult,
};
