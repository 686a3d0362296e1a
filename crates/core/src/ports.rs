//! Port interfaces for the engine's external collaborators
//!
//! The engine never speaks HTTP itself. Adapters in `edgebulk-infra`
//! implement these traits; tests substitute in-memory fakes.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use edgebulk_domain::{Result, Zone, ZoneId};

/// HTTP verbs used by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case verb as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated request/response transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the raw response body.
    ///
    /// `path` is relative to the API base URL. Any error returned is the
    /// failure of the chunk or page that issued the request.
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        (**self).request(method, path, query, body).await
    }
}

/// Source of the account's zones
#[async_trait]
pub trait ZoneDirectory: Send + Sync {
    /// Look up a zone by its exact, normalised domain name.
    async fn find_by_name(&self, name: &str) -> Result<Option<ZoneId>>;

    /// Every zone visible to the account.
    async fn list_zones(&self) -> Result<Vec<Zone>>;
}

#[async_trait]
impl<D: ZoneDirectory + ?Sized> ZoneDirectory for Arc<D> {
    async fn find_by_name(&self, name: &str) -> Result<Option<ZoneId>> {
        (**self).find_by_name(name).await
    }

    async fn list_zones(&self) -> Result<Vec<Zone>> {
        (**self).list_zones().await
    }
}
