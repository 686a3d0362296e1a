//! In-memory zone directory

use std::collections::HashMap;

use async_trait::async_trait;
use edgebulk_domain::{Result, Zone, ZoneId};

use super::matcher::HostZoneMatcher;
use super::normalize_domain;
use crate::ports::ZoneDirectory;

/// A zone listing held in memory, indexed by normalised name.
///
/// Useful once the full listing has been fetched: resolution and host
/// matching then need no further round trips.
#[derive(Debug, Clone, Default)]
pub struct ZoneIndex {
    zones: Vec<Zone>,
    by_name: HashMap<String, ZoneId>,
}

impl ZoneIndex {
    /// Index a zone listing in order.
    pub fn new<I>(zones: I) -> Self
    where
        I: IntoIterator<Item = Zone>,
    {
        let mut index = Self::default();
        for zone in zones {
            index.insert(zone);
        }
        index
    }

    /// Add a zone; a later zone with an already indexed name does not
    /// replace the earlier one.
    pub fn insert(&mut self, zone: Zone) {
        if let Some(name) = zone.name.as_deref().map(normalize_domain) {
            if !name.is_empty() {
                self.by_name.entry(name).or_insert_with(|| zone.id.clone());
            }
        }
        self.zones.push(zone);
    }

    /// Zone registered under exactly `name`, after normalization.
    pub fn get(&self, name: &str) -> Option<&ZoneId> {
        self.by_name.get(&normalize_domain(name))
    }

    /// Every indexed zone, in insertion order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Number of indexed zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// True when no zone has been indexed.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Host matcher over the indexed zones
    pub fn matcher(&self) -> HostZoneMatcher {
        HostZoneMatcher::new(self.zones.iter().cloned())
    }
}

#[async_trait]
impl ZoneDirectory for ZoneIndex {
    async fn find_by_name(&self, name: &str) -> Result<Option<ZoneId>> {
        Ok(self.get(name).cloned())
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        Ok(self.zones.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_wins() {
        let index = ZoneIndex::new(vec![
            Zone::new("z1", "Example.com"),
            Zone::new("z2", "example.com."),
            Zone::anonymous("z3"),
        ]);

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("EXAMPLE.COM").map(ZoneId::as_str), Some("z1"));
        assert_eq!(index.matcher().len(), 1);
    }

    #[tokio::test]
    async fn directory_lookups() {
        let index = ZoneIndex::new(vec![Zone::new("z1", "example.com")]);
        assert_eq!(index.find_by_name("example.com").await.unwrap(), Some(ZoneId::new("z1")));
        assert_eq!(index.find_by_name("example.org").await.unwrap(), None);
        assert_eq!(index.list_zones().await.unwrap().len(), 1);
    }
}
