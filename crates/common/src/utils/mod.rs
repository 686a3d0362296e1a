//! Common utility functions
//!
//! - **[`serde`]**: Serialization helpers for durations in configuration files

pub mod serde;

pub use self::serde::{duration_millis, option_duration_millis};
