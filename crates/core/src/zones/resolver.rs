//! Identifier to zone id resolution

use edgebulk_domain::{is_canonical_zone_id, ZoneId};
use tracing::{debug, instrument};

use super::{domain_suffixes, normalize_domain, ZoneError};
use crate::ports::ZoneDirectory;

/// Resolves canonical ids and domain names to zone ids.
#[derive(Debug, Clone)]
pub struct ZoneResolver<D> {
    directory: D,
}

impl<D: ZoneDirectory> ZoneResolver<D> {
    /// Resolver looking names up in `directory`.
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Directory used for name lookups.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Resolve a single identifier.
    ///
    /// A 32-character hex string is already canonical and comes back
    /// unchanged without a lookup. Anything else is treated as a domain
    /// name: the exact name is tried first, then each parent domain in turn
    /// (`sub.example.com`, `example.com`, `com`). A name with no match, blank
    /// ones included, is [`ZoneError::NotFound`] for the original identifier.
    #[instrument(skip(self))]
    pub async fn resolve(&self, identifier: &str) -> Result<ZoneId, ZoneError> {
        if is_canonical_zone_id(identifier) {
            return Ok(ZoneId::new(identifier));
        }

        let name = normalize_domain(identifier);
        for candidate in domain_suffixes(&name) {
            let found = self.directory.find_by_name(candidate).await.map_err(|source| {
                ZoneError::Lookup { identifier: identifier.to_string(), source }
            })?;
            if let Some(zone_id) = found {
                debug!(%zone_id, matched = candidate, "resolved zone");
                return Ok(zone_id);
            }
        }

        Err(ZoneError::NotFound { identifier: identifier.to_string() })
    }

    /// Resolve every identifier, in order, stopping at the first failure.
    pub async fn resolve_many<I, S>(&self, identifiers: I) -> Result<Vec<ZoneId>, ZoneError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = Vec::new();
        for identifier in identifiers {
            resolved.push(self.resolve(identifier.as_ref()).await?);
        }
        Ok(resolved)
    }
}
