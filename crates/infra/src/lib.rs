//! # edgebulk infrastructure
//!
//! Implementations of the engine's ports and the services built on them.
//!
//! This crate contains:
//! - The authenticated HTTP transport (`reqwest`)
//! - API envelope decoding, zone directory, cache purge and KV services
//! - Configuration loading from environment and files
//! - Tracing initialisation and log-based progress reporting
//!
//! ## Architecture
//! - Implements traits defined in `edgebulk-core`
//! - Contains all "impure" code (network, filesystem, global subscriber)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiZoneDirectory, HostPurgeOutcome, KvKey, KvService, PurgeKind, PurgeService};
pub use errors::InfraError;
pub use http::HttpTransport;
pub use observability::{init_tracing, log_fan_out_progress, log_progress};
