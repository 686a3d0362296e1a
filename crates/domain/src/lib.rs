//! # edgebulk Domain
//!
//! Data model shared by the bulk engine and its adapters.
//!
//! This crate contains:
//! - Zone, chunk, progress and pagination types
//! - The top-level error type and `Result` alias
//! - Configuration structures with defaults and clamps
//! - Upstream API constants
//!
//! ## Architecture
//! - Depends only on the `foundation` tier of `edgebulk-common`
//! - No async, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use constants::*;
pub use errors::*;
pub use types::*;
