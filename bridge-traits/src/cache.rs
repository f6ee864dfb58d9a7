//! Cache Storage Abstraction
//!
//! Named buckets of request→response pairs owned by the host. In a browser this
//! is `CacheStorage`; natively it can be any map that survives between events.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    error::Result,
    http::{FetchRequest, HttpMethod, HttpResponse},
    platform::PlatformSendSync,
};

/// Identity of a cached request
///
/// Only the method and URL take part in matching; headers and bodies are
/// ignored, the way an exact cache match treats a `GET`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub method: HttpMethod,
    pub url: String,
}

impl CacheKey {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Only `GET` requests can be stored.
    pub fn is_cacheable(&self) -> bool {
        self.method == HttpMethod::Get
    }
}

impl From<&FetchRequest> for CacheKey {
    fn from(request: &FetchRequest) -> Self {
        Self::new(request.method, request.url.clone())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Host cache storage trait
///
/// Buckets are addressed by name. Implementations must be safe to call from
/// overlapping event handlers; ordering between unrelated calls is not
/// guaranteed.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::cache::CacheStorage;
///
/// async fn purge(storage: &dyn CacheStorage, keep: &str) -> Result<()> {
///     for name in storage.keys().await? {
///         if name != keep {
///             storage.delete(&name).await?;
///         }
///     }
///     Ok(())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CacheStorage: PlatformSendSync {
    /// Create the bucket if it does not already exist
    async fn open(&self, name: &str) -> Result<()>;

    /// Whether a bucket with this name exists
    async fn has(&self, name: &str) -> Result<bool>;

    /// Names of all buckets, in creation order
    async fn keys(&self) -> Result<Vec<String>>;

    /// Delete a bucket and everything in it
    ///
    /// Returns `false` if no such bucket existed.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Look the request up in every bucket, oldest bucket first
    async fn match_request(&self, request: &FetchRequest) -> Result<Option<HttpResponse>>;

    /// Look the request up in a single bucket
    async fn match_in(&self, name: &str, request: &FetchRequest)
        -> Result<Option<HttpResponse>>;

    /// Store a response under the request's key, replacing any previous entry
    ///
    /// Creates the bucket when missing. Fails for non-`GET` requests.
    async fn put(&self, name: &str, request: &FetchRequest, response: HttpResponse)
        -> Result<()>;

    /// Keys stored in a bucket, in insertion order
    async fn entries(&self, name: &str) -> Result<Vec<CacheKey>>;
}
