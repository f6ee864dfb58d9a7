//! # Offline Cache
//!
//! Versioned bucket management on top of the host [`CacheStorage`].
//!
//! The agent owns exactly one bucket, named after its cache version. Install
//! fills it with the static assets, activation deletes every other bucket, and
//! successful same-origin responses are added as they stream past.

use crate::emit_event;
use crate::error::{AgentError, Result};
use bridge_traits::{CacheStorage, FetchRequest, HttpClient, HttpResponse};
use core_runtime::events::{AgentEvent, CacheEvent, EventBus};
use core_runtime::logging::redact_url;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Cache bucket owned by one version of the agent.
pub struct OfflineCache {
    version: String,
    storage: Arc<dyn CacheStorage>,
    http_client: Arc<dyn HttpClient>,
    event_bus: Option<Arc<EventBus>>,
}

impl OfflineCache {
    pub fn new(
        version: impl Into<String>,
        storage: Arc<dyn CacheStorage>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            version: version.into(),
            storage,
            http_client,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Pre-cache `assets` with all-or-nothing semantics.
    ///
    /// Every asset is fetched before anything is written. A network failure or
    /// a non-2xx status on any of them fails the whole batch and leaves the
    /// bucket untouched. Returns the number of entries written.
    #[instrument(skip(self, assets), fields(version = %self.version, assets = assets.len()))]
    pub async fn populate(&self, assets: &[Url]) -> Result<usize> {
        self.storage.open(&self.version).await?;

        let requests: Vec<FetchRequest> = assets
            .iter()
            .map(|url| FetchRequest::get(url.as_str()))
            .collect();

        let responses =
            try_join_all(requests.iter().map(|request| self.fetch_asset(request))).await?;

        for (request, response) in requests.iter().zip(responses) {
            self.storage.put(&self.version, request, response).await?;
        }

        info!(count = requests.len(), "Static assets cached");
        Ok(requests.len())
    }

    async fn fetch_asset(&self, request: &FetchRequest) -> Result<HttpResponse> {
        let response = self.http_client.execute(request.clone()).await?;
        if !response.is_success() {
            return Err(AgentError::AssetStatus {
                url: request.url.clone(),
                status: response.status,
            });
        }
        debug!(url = %redact_url(&request.url), status = response.status, "Fetched asset");
        Ok(response)
    }

    /// Delete every bucket whose name differs from this version.
    ///
    /// Returns the names that were removed.
    #[instrument(skip(self), fields(version = %self.version))]
    pub async fn purge_stale(&self) -> Result<Vec<String>> {
        let mut purged = Vec::new();
        for name in self.storage.keys().await? {
            if name == self.version {
                continue;
            }
            info!(bucket = %name, "Deleting old cache");
            if self.storage.delete(&name).await? {
                purged.push(name);
            }
        }
        Ok(purged)
    }

    /// Exact-match lookup across every bucket.
    pub async fn lookup(&self, request: &FetchRequest) -> Result<Option<HttpResponse>> {
        Ok(self.storage.match_request(request).await?)
    }

    /// Store a network response under this version.
    ///
    /// Failures are logged and reported on the bus, never returned, so a full
    /// or broken cache cannot turn a good network response into an error.
    pub async fn store(&self, request: &FetchRequest, response: HttpResponse) {
        let url = redact_url(&request.url).to_string();
        match self.storage.put(&self.version, request, response).await {
            Ok(()) => {
                debug!(url = %url, "Cached network response");
                emit_event(
                    self.event_bus.as_ref(),
                    AgentEvent::Cache(CacheEvent::Stored { url }),
                );
            }
            Err(err) => {
                warn!(url = %url, error = %err, "Failed to cache response");
                emit_event(
                    self.event_bus.as_ref(),
                    AgentEvent::Cache(CacheEvent::StoreFailed {
                        url,
                        message: err.to_string(),
                    }),
                );
            }
        }
    }

    /// The cached app shell document, if install stored one.
    pub async fn shell(&self, document: &Url) -> Result<Option<HttpResponse>> {
        self.lookup(&FetchRequest::get(document.as_str())).await
    }
}
