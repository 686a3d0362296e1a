//! Zones and host-to-zone assignments

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::ZONE_ID_LEN;

/// Returns true when `identifier` is already a canonical zone id: exactly
/// 32 ASCII hex digits, either case.
pub fn is_canonical_zone_id(identifier: &str) -> bool {
    identifier.len() == ZONE_ID_LEN && identifier.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Opaque canonical zone identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Wrap an id as returned by the API
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap the owned id
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ZoneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for ZoneId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ZoneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A zone as listed by the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Canonical id
    pub id: ZoneId,
    /// Domain name, when the listing includes it
    #[serde(default)]
    pub name: Option<String>,
    /// Activation status such as `active` or `pending`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Zone {
    /// A named zone
    pub fn new(id: impl Into<ZoneId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: Some(name.into()), status: None }
    }

    /// A zone known only by id
    pub fn anonymous(id: impl Into<ZoneId>) -> Self {
        Self { id: id.into(), name: None, status: None }
    }

    /// Attach the activation status
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// A hostname assigned to the zone whose domain is its longest suffix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMatchEntry {
    /// Normalized hostname
    pub hostname: String,
    /// Zone domain that matched
    pub matched_domain: String,
    /// Zone the host belongs to
    pub zone_id: ZoneId,
}
