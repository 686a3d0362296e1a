//! Cache purge by tags, hosts, prefixes or files
//!
//! Purge requests accept a bounded number of entries, so every operation
//! goes through the batch engine: single-zone purges through a
//! [`BatchExecutor`], multi-zone purges through a [`ZoneFanOut`].

use std::fmt;
use std::sync::Arc;

use edgebulk_core::{
    dedup_preserving_order, BatchExecutor, HostMatchReport, HostZoneMatcher, HttpMethod,
    Transport, ZoneFanOut,
};
use edgebulk_domain::{
    BatchConfig, Config, EdgeBulkError, FanOutConfig, FanOutProgress, FanOutResult,
    OperationResult, ProgressEvent, Result, ZoneId,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::envelope::decode;

/// Which purge field a batch of entries is sent as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeKind {
    /// Cache tags
    Tags,
    /// Hostnames
    Hosts,
    /// URL prefixes
    Prefixes,
    /// Full URLs
    Files,
}

impl PurgeKind {
    /// JSON field of the purge request body
    pub fn field(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Hosts => "hosts",
            Self::Prefixes => "prefixes",
            Self::Files => "files",
        }
    }
}

impl fmt::Display for PurgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// Host purge outcome: which hosts went where, and what each zone did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostPurgeOutcome {
    /// How the hosts mapped onto zones
    pub matches: HostMatchReport,
    /// Per-zone purge results for the matched hosts
    pub result: FanOutResult<String, EdgeBulkError>,
}

/// Cache purges over a [`Transport`], batched per zone.
pub struct PurgeService<T> {
    transport: Arc<T>,
    batch: BatchConfig,
    fan_out: FanOutConfig,
}

impl<T> PurgeService<T>
where
    T: Transport + 'static,
{
    /// Service with explicit batch and fan-out settings.
    pub fn new(transport: Arc<T>, batch: BatchConfig, fan_out: FanOutConfig) -> Self {
        Self { transport, batch, fan_out }
    }

    /// Service using the `[batch]` and `[fan_out]` sections.
    pub fn from_config(transport: Arc<T>, config: &Config) -> Self {
        Self::new(transport, config.batch.clone(), config.fan_out.clone())
    }

    /// Purge `entries` from one zone.
    ///
    /// Duplicates are dropped (first occurrence kept) before batching.
    /// Results are the entries of every accepted request.
    #[instrument(skip(self, entries, on_progress), fields(entries = entries.len()))]
    pub async fn purge<P>(
        &self,
        zone_id: &ZoneId,
        kind: PurgeKind,
        entries: Vec<String>,
        on_progress: P,
    ) -> OperationResult<String, EdgeBulkError>
    where
        P: FnMut(ProgressEvent),
    {
        let entries = dedup_preserving_order(entries);
        let transport = Arc::clone(&self.transport);
        let zone_id = zone_id.clone();

        let result = BatchExecutor::new(self.batch.clone())
            .execute(
                entries,
                move |chunk| purge_chunk(Arc::clone(&transport), zone_id.clone(), kind, chunk),
                on_progress,
            )
            .await;

        info!(
            %kind,
            purged = result.succeeded_items,
            failed = result.failed_items,
            "purge finished"
        );
        result
    }

    /// Purge cache tags from one zone.
    pub async fn purge_tags<P>(
        &self,
        zone_id: &ZoneId,
        tags: Vec<String>,
        on_progress: P,
    ) -> OperationResult<String, EdgeBulkError>
    where
        P: FnMut(ProgressEvent),
    {
        self.purge(zone_id, PurgeKind::Tags, tags, on_progress).await
    }

    /// Purge URL prefixes from one zone.
    pub async fn purge_prefixes<P>(
        &self,
        zone_id: &ZoneId,
        prefixes: Vec<String>,
        on_progress: P,
    ) -> OperationResult<String, EdgeBulkError>
    where
        P: FnMut(ProgressEvent),
    {
        self.purge(zone_id, PurgeKind::Prefixes, prefixes, on_progress).await
    }

    /// Purge individual URLs from one zone.
    pub async fn purge_files<P>(
        &self,
        zone_id: &ZoneId,
        files: Vec<String>,
        on_progress: P,
    ) -> OperationResult<String, EdgeBulkError>
    where
        P: FnMut(ProgressEvent),
    {
        self.purge(zone_id, PurgeKind::Files, files, on_progress).await
    }

    /// Purge a different entry list in each zone, zones in parallel.
    #[instrument(skip_all, fields(%kind))]
    pub async fn purge_by_zone<P>(
        &self,
        kind: PurgeKind,
        entries_by_zone: Vec<(ZoneId, Vec<String>)>,
        on_progress: P,
    ) -> FanOutResult<String, EdgeBulkError>
    where
        P: FnMut(FanOutProgress),
    {
        let transport = Arc::clone(&self.transport);
        let entries_by_zone = entries_by_zone
            .into_iter()
            .map(|(zone_id, entries)| (zone_id, dedup_preserving_order(entries)));

        ZoneFanOut::new(self.fan_out.clone())
            .execute(
                entries_by_zone,
                move |zone_id, chunk| purge_chunk(Arc::clone(&transport), zone_id, kind, chunk),
                on_progress,
            )
            .await
    }

    /// Purge the same entries from every zone in `zone_ids`.
    pub async fn purge_everywhere<P>(
        &self,
        zone_ids: &[ZoneId],
        kind: PurgeKind,
        entries: Vec<String>,
        on_progress: P,
    ) -> FanOutResult<String, EdgeBulkError>
    where
        P: FnMut(FanOutProgress),
    {
        let entries = dedup_preserving_order(entries);
        let by_zone = zone_ids.iter().map(|zone_id| (zone_id.clone(), entries.clone())).collect();
        self.purge_by_zone(kind, by_zone, on_progress).await
    }

    /// Route each host to its zone and purge per zone.
    ///
    /// Hosts that match no zone are reported in `matches.unmatched` and
    /// skipped. With `strict` set, any unmatched host fails the whole call
    /// before a single request is sent.
    pub async fn purge_hosts<P>(
        &self,
        hosts: Vec<String>,
        matcher: &HostZoneMatcher,
        strict: bool,
        on_progress: P,
    ) -> Result<HostPurgeOutcome>
    where
        P: FnMut(FanOutProgress),
    {
        let mut matches = matcher.match_hosts(hosts);
        if strict {
            matches = matches.into_strict()?;
        } else if !matches.unmatched.is_empty() {
            warn!(
                unmatched = matches.unmatched.len(),
                hosts = %matches.unmatched.join(", "),
                "hosts matched no zone and will not be purged"
            );
        }

        let result = self.purge_by_zone(PurgeKind::Hosts, matches.hosts_by_zone(), on_progress).await;
        Ok(HostPurgeOutcome { matches, result })
    }
}

async fn purge_chunk<T: Transport>(
    transport: Arc<T>,
    zone_id: ZoneId,
    kind: PurgeKind,
    chunk: Vec<String>,
) -> Result<Vec<String>> {
    let mut body = serde_json::Map::new();
    body.insert(kind.field().to_string(), serde_json::to_value(&chunk)?);
    let body = serde_json::to_vec(&body)?;

    let path = format!("/zones/{zone_id}/purge_cache");
    let response = transport.request(HttpMethod::Post, &path, &[], Some(body)).await?;
    decode::<serde_json::Value>(&response)?.ensure_success()?;
    Ok(chunk)
}
