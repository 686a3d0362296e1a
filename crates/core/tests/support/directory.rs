use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use edgebulk_core::ports::ZoneDirectory;
use edgebulk_core::zones::ZoneIndex;
use edgebulk_domain::{EdgeBulkError, Result as DomainResult, Zone, ZoneId};
use parking_lot::Mutex;

/// Zone directory that records every lookup and can be told to fail.
#[derive(Default)]
pub struct CountingDirectory {
    index: ZoneIndex,
    lookups: Mutex<Vec<String>>,
    listings: AtomicUsize,
    failure: Option<EdgeBulkError>,
}

impl CountingDirectory {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { index: ZoneIndex::new(zones), ..Self::default() }
    }

    /// Every call fails with `error`.
    pub fn failing(error: EdgeBulkError) -> Self {
        Self { failure: Some(error), ..Self::default() }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneDirectory for CountingDirectory {
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<ZoneId>> {
        self.lookups.lock().push(name.to_string());
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.index.find_by_name(name).await
    }

    async fn list_zones(&self) -> DomainResult<Vec<Zone>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.index.list_zones().await
    }
}
