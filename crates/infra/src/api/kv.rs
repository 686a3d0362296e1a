//! Workers KV key listing and bulk deletion

use std::sync::Arc;

use edgebulk_core::{
    collect_all, dedup_preserving_order, BatchExecutor, HttpMethod, Paginator, Transport,
};
use edgebulk_domain::{
    BatchConfig, Config, EdgeBulkError, OperationResult, Page, PaginationConfig,
    PaginationSummary, ProgressEvent, Result, DEFAULT_KV_PAGE_SIZE,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::envelope::{decode, ApiEnvelope};

/// One key as returned by the key listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvKey {
    /// Key name
    pub name: String,
    /// Unix timestamp at which the key expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u64>,
    /// Arbitrary JSON stored alongside the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Outcome of a list-then-delete run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixDeletion {
    /// How the key listing ended
    pub listing: PaginationSummary,
    /// Bulk deletion of the listed keys
    pub deletion: OperationResult<String, EdgeBulkError>,
}

/// Workers KV key listing and bulk deletion for one account.
pub struct KvService<T> {
    transport: Arc<T>,
    account_id: String,
    paginator: Paginator,
    batch: BatchConfig,
    page_size: usize,
}

impl<T> KvService<T>
where
    T: Transport + 'static,
{
    /// Service for `account_id` with explicit pagination and batch settings.
    pub fn new(
        transport: Arc<T>,
        account_id: impl Into<String>,
        pagination: PaginationConfig,
        batch: BatchConfig,
    ) -> Self {
        Self {
            transport,
            account_id: account_id.into(),
            paginator: Paginator::new(pagination),
            batch,
            page_size: DEFAULT_KV_PAGE_SIZE,
        }
    }

    /// Requires `api.account_id`; KV namespaces are account scoped.
    pub fn from_config(transport: Arc<T>, config: &Config) -> Result<Self> {
        let account_id = config
            .api
            .account_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| EdgeBulkError::Config("api.account_id is required for KV".into()))?;
        Ok(Self::new(transport, account_id, config.pagination.clone(), config.batch.clone()))
    }

    /// Keys requested per listing page (at least one).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn namespace_path(&self, namespace: &str, suffix: &str) -> Result<String> {
        let namespace = namespace.trim();
        if namespace.is_empty() {
            return Err(EdgeBulkError::InvalidInput("namespace id is empty".into()));
        }
        Ok(format!(
            "/accounts/{}/storage/kv/namespaces/{}/{}",
            self.account_id, namespace, suffix
        ))
    }

    async fn fetch_keys(
        &self,
        path: &str,
        prefix: Option<&str>,
        cursor: String,
    ) -> Result<Page<KvKey>> {
        let limit = self.page_size.to_string();
        let mut query = vec![("limit", limit.as_str())];
        if !cursor.is_empty() {
            query.push(("cursor", cursor.as_str()));
        }
        if let Some(prefix) = prefix {
            query.push(("prefix", prefix));
        }

        let body = self.transport.request(HttpMethod::Get, path, &query, None).await?;
        let envelope: ApiEnvelope<Vec<KvKey>> = decode(&body)?;
        envelope.into_page()
    }

    /// Stream key pages to `process` without holding the whole listing.
    #[instrument(skip(self, process))]
    pub async fn for_each_key_page<P>(
        &self,
        namespace: &str,
        prefix: Option<&str>,
        process: P,
    ) -> Result<PaginationSummary>
    where
        P: FnMut(Vec<KvKey>) -> Result<()>,
    {
        let path = self.namespace_path(namespace, "keys")?;
        let summary = self
            .paginator
            .run(|cursor| self.fetch_keys(&path, prefix, cursor), process)
            .await?;
        Ok(summary)
    }

    /// Every key in `namespace`, optionally restricted to `prefix`.
    pub async fn list_keys(
        &self,
        namespace: &str,
        prefix: Option<&str>,
    ) -> Result<(Vec<KvKey>, PaginationSummary)> {
        let path = self.namespace_path(namespace, "keys")?;
        let listed = collect_all(&self.paginator, |cursor| self.fetch_keys(&path, prefix, cursor))
            .await?;
        Ok(listed)
    }

    /// Delete `keys` through the bulk endpoint, one request per chunk.
    #[instrument(skip(self, keys, on_progress), fields(keys = keys.len()))]
    pub async fn delete_keys<P>(
        &self,
        namespace: &str,
        keys: Vec<String>,
        on_progress: P,
    ) -> Result<OperationResult<String, EdgeBulkError>>
    where
        P: FnMut(ProgressEvent),
    {
        let path = self.namespace_path(namespace, "bulk/delete")?;
        let keys = dedup_preserving_order(keys);
        let transport = Arc::clone(&self.transport);

        let result = BatchExecutor::new(self.batch.clone())
            .execute(
                keys,
                move |chunk| delete_chunk(Arc::clone(&transport), path.clone(), chunk),
                on_progress,
            )
            .await;

        info!(deleted = result.succeeded_items, failed = result.failed_items, "bulk delete finished");
        Ok(result)
    }

    /// List every key under `prefix`, then delete them.
    ///
    /// A listing that stopped early (timeout, page limit, cursor loop) still
    /// deletes what was listed; the summary says why it is partial.
    pub async fn delete_by_prefix<P>(
        &self,
        namespace: &str,
        prefix: &str,
        on_progress: P,
    ) -> Result<PrefixDeletion>
    where
        P: FnMut(ProgressEvent),
    {
        let (keys, listing) = self.list_keys(namespace, Some(prefix)).await?;
        if let Some(warning) = listing.warning() {
            warn!(prefix, "{warning}");
        }

        let names = keys.into_iter().map(|key| key.name).collect();
        let deletion = self.delete_keys(namespace, names, on_progress).await?;
        Ok(PrefixDeletion { listing, deletion })
    }
}

async fn delete_chunk<T: Transport>(
    transport: Arc<T>,
    path: String,
    chunk: Vec<String>,
) -> Result<Vec<String>> {
    let body = serde_json::to_vec(&chunk)?;
    let response = transport.request(HttpMethod::Post, &path, &[], Some(body)).await?;
    decode::<serde_json::Value>(&response)?.ensure_success()?;
    Ok(chunk)
}
