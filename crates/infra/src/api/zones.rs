//! Zone listing and lookup over the API

use async_trait::async_trait;
use edgebulk_core::{collect_all, HttpMethod, Paginator, Transport, ZoneDirectory};
use edgebulk_domain::{
    PaginationConfig, PaginationSummary, Page, Result, Zone, ZoneId, DEFAULT_ZONE_PAGE_SIZE,
};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::envelope::{decode, ApiEnvelope};

#[derive(Debug, Deserialize)]
struct ApiZone {
    id: String,
    name: Option<String>,
    status: Option<String>,
}

impl From<ApiZone> for Zone {
    fn from(zone: ApiZone) -> Self {
        Zone { id: ZoneId::new(zone.id), name: zone.name, status: zone.status }
    }
}

/// [`ZoneDirectory`] backed by `GET /zones`.
#[derive(Debug, Clone)]
pub struct ApiZoneDirectory<T> {
    transport: T,
    paginator: Paginator,
    page_size: usize,
}

impl<T: Transport> ApiZoneDirectory<T> {
    /// Directory listing zones through `transport`.
    pub fn new(transport: T, pagination: PaginationConfig) -> Self {
        Self { transport, paginator: Paginator::new(pagination), page_size: DEFAULT_ZONE_PAGE_SIZE }
    }

    /// Zones requested per page (at least one).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Every zone on the account plus how the listing ended.
    #[instrument(skip(self))]
    pub async fn list_zones_with_summary(&self) -> Result<(Vec<Zone>, PaginationSummary)> {
        let (zones, summary) =
            collect_all(&self.paginator, |cursor| self.fetch_page(cursor)).await?;
        if let Some(warning) = summary.warning() {
            warn!(zones = zones.len(), "zone listing is partial: {warning}");
        }
        Ok((zones, summary))
    }

    async fn fetch_page(&self, cursor: String) -> Result<Page<Zone>> {
        let per_page = self.page_size.to_string();
        let mut query = vec![("per_page", per_page.as_str())];
        if !cursor.is_empty() {
            query.push(("cursor", cursor.as_str()));
        }

        let body = self.transport.request(HttpMethod::Get, "/zones", &query, None).await?;
        let envelope: ApiEnvelope<Vec<ApiZone>> = decode(&body)?;
        let page = envelope.into_page()?;
        debug!(zones = page.items.len(), next_cursor = %page.next_cursor, "fetched zone page");

        Ok(Page {
            items: page.items.into_iter().map(Zone::from).collect(),
            next_cursor: page.next_cursor,
            is_complete: page.is_complete,
        })
    }
}

#[async_trait]
impl<T: Transport> ZoneDirectory for ApiZoneDirectory<T> {
    async fn find_by_name(&self, name: &str) -> Result<Option<ZoneId>> {
        let body = self.transport.request(HttpMethod::Get, "/zones", &[("name", name)], None).await?;
        let zones: Vec<ApiZone> = decode::<Vec<ApiZone>>(&body)?.into_result()?;

        // Some deployments treat `name` as a prefix filter.
        Ok(zones
            .into_iter()
            .find(|zone| zone.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .map(|zone| ZoneId::new(zone.id)))
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.list_zones_with_summary().await.map(|(zones, _)| zones)
    }
}
