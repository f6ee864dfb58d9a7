//! # Cache-first Fetch Strategy
//!
//! Decides how an intercepted request is answered:
//!
//! 1. Ineligible requests (non-GET, foreign host) pass through untouched.
//! 2. A cache hit is returned without touching the network.
//! 3. A miss goes to the network; `200` + `basic` responses are cached.
//! 4. A network failure falls back to the app shell for navigations and to a
//!    synthetic `503` for everything else.

use crate::cache::OfflineCache;
use crate::emit_event;
use crate::error::Result;
use crate::policy::InterceptPolicy;
use bridge_traits::{FetchRequest, HttpClient, HttpResponse};
use core_runtime::events::{AgentEvent, CacheEvent, EventBus};
use core_runtime::logging::redact_url;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    /// Cached app shell served for a failed navigation
    ShellFallback,
    /// Synthetic 503
    OfflinePlaceholder,
}

/// Result of handling a fetch event.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The agent does not respond; the host performs the request itself
    Passthrough,
    Respond {
        response: HttpResponse,
        source: ResponseSource,
    },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { source, .. } => Some(*source),
        }
    }

    fn respond(response: HttpResponse, source: ResponseSource) -> Self {
        FetchOutcome::Respond { response, source }
    }
}

/// The synthetic response returned when neither cache nor network can answer.
pub fn offline_response(body: &str) -> HttpResponse {
    HttpResponse::new(503, body.to_string())
        .with_status_text("Service Unavailable")
        .with_header("Content-Type", "text/plain")
}

/// Cache-first request handler.
pub struct CacheFirst {
    policy: InterceptPolicy,
    cache: Arc<OfflineCache>,
    http_client: Arc<dyn HttpClient>,
    offline_document: Url,
    offline_body: String,
    event_bus: Option<Arc<EventBus>>,
}

impl CacheFirst {
    pub fn new(
        policy: InterceptPolicy,
        cache: Arc<OfflineCache>,
        http_client: Arc<dyn HttpClient>,
        offline_document: Url,
        offline_body: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            cache,
            http_client,
            offline_document,
            offline_body: offline_body.into(),
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn policy(&self) -> &InterceptPolicy {
        &self.policy
    }

    #[instrument(skip(self, request), fields(method = %request.method, url = %redact_url(&request.url)))]
    pub async fn handle(&self, request: &FetchRequest) -> Result<FetchOutcome> {
        let eligibility = self.policy.classify(request);
        if !eligibility.is_eligible() {
            debug!(?eligibility, "Passing request through");
            return Ok(FetchOutcome::Passthrough);
        }

        let url = redact_url(&request.url).to_string();

        if let Some(cached) = self.cache.lookup(request).await? {
            debug!("Serving from cache");
            self.emit(AgentEvent::Cache(CacheEvent::Hit { url }));
            return Ok(FetchOutcome::respond(cached, ResponseSource::Cache));
        }

        match self.http_client.execute(request.clone()).await {
            Ok(response) => {
                self.emit(AgentEvent::Cache(CacheEvent::Miss { url }));
                if response.status == 200 && response.is_basic() {
                    self.cache.store(request, response.clone()).await;
                }
                Ok(FetchOutcome::respond(response, ResponseSource::Network))
            }
            Err(err) => {
                warn!(error = %err, "Network request failed, serving offline fallback");
                self.fallback(request, url).await
            }
        }
    }

    async fn fallback(&self, request: &FetchRequest, url: String) -> Result<FetchOutcome> {
        if request.is_navigation() {
            if let Some(shell) = self.cache.shell(&self.offline_document).await? {
                self.emit(AgentEvent::Cache(CacheEvent::OfflineFallback { url, shell: true }));
                return Ok(FetchOutcome::respond(shell, ResponseSource::ShellFallback));
            }
            warn!("App shell is not cached");
        }

        self.emit(AgentEvent::Cache(CacheEvent::OfflineFallback { url, shell: false }));
        Ok(FetchOutcome::respond(
            offline_response(&self.offline_body),
            ResponseSource::OfflinePlaceholder,
        ))
    }

    fn emit(&self, event: AgentEvent) {
        emit_event(self.event_bus.as_ref(), event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_response_shape() {
        let response = offline_response("Offline content not available");

        assert_eq!(response.status, 503);
        assert_eq!(response.status_text, "Service Unavailable");
        assert_eq!(response.content_type(), Some("text/plain"));
        assert_eq!(response.text().unwrap(), "Offline content not available");
    }

    #[test]
    fn test_outcome_accessors() {
        assert!(FetchOutcome::Passthrough.response().is_none());
        assert!(FetchOutcome::Passthrough.source().is_none());

        let outcome = FetchOutcome::respond(HttpResponse::new(200, "ok"), ResponseSource::Cache);
        assert_eq!(outcome.source(), Some(ResponseSource::Cache));
        assert_eq!(outcome.response().map(|r| r.status), Some(200));
    }
}
