//! Zone identification and host routing
//!
//! - [`resolver`]: identifier (canonical id or domain name) to zone id, with
//!   parent-domain fallback
//! - [`matcher`]: longest-suffix assignment of hostnames to zones
//! - [`index`]: in-memory [`ZoneDirectory`](crate::ports::ZoneDirectory)

pub mod index;
pub mod matcher;
pub mod resolver;

use edgebulk_domain::EdgeBulkError;
use thiserror::Error;

pub use index::ZoneIndex;
pub use matcher::{HostMatchReport, HostZoneMatcher};
pub use resolver::ZoneResolver;

/// Zone resolution and matching failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    /// Neither the identifier nor any parent domain names a zone
    #[error("no zone found for '{identifier}'")]
    NotFound { identifier: String },

    /// The directory failed while looking up a candidate name
    #[error("zone lookup for '{identifier}' failed: {source}")]
    Lookup { identifier: String, source: EdgeBulkError },

    /// Hosts left over when every host has to belong to a zone
    #[error("{} host(s) matched no zone: {}", .hosts.len(), .hosts.join(", "))]
    UnmatchedHosts { hosts: Vec<String> },
}

impl From<ZoneError> for EdgeBulkError {
    fn from(err: ZoneError) -> Self {
        match err {
            ZoneError::NotFound { .. } => Self::NotFound(err.to_string()),
            ZoneError::UnmatchedHosts { .. } => Self::InvalidInput(err.to_string()),
            ZoneError::Lookup { source, .. } => source,
        }
    }
}

/// Lower-case, trim and strip one trailing dot.
pub fn normalize_domain(name: &str) -> String {
    let trimmed = name.trim();
    trimmed.strip_suffix('.').unwrap_or(trimmed).to_ascii_lowercase()
}

/// `name` followed by each parent domain, most specific first:
/// `a.b.com` yields `a.b.com`, `b.com`, `com`.
pub fn domain_suffixes(name: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(name), |current| current.split_once('.').map(|(_, rest)| rest))
        .filter(|suffix| !suffix.is_empty())
}
