//! Shared fixtures for agent integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_desktop::{
    DesktopRegistration, InMemoryClientRegistry, MemoryCacheStorage, TokioBackgroundExecutor,
    TracingNotificationPresenter,
};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{FetchRequest, HttpClient, HttpResponse, ResponseType};
use core_agent::OfflineCacheAgent;
use core_runtime::config::{AgentConfig, AgentSettings};
use core_runtime::events::EventBus;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ORIGIN: &str = "https://dreamvault.app";

/// HTTP double answering from a route table. Unknown URLs fail like a
/// dropped connection.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<HashMap<String, HttpResponse>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn route(&self, url: &str, response: HttpResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response.with_url(url));
    }

    /// Same-origin style `200` response.
    pub fn ok(&self, url: &str, body: &str) {
        self.route(
            url,
            HttpResponse::new(200, body.to_string()).with_type(ResponseType::Basic),
        );
    }

    pub fn go_offline(&self) {
        self.routes.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, request: FetchRequest) -> BridgeResult<HttpResponse> {
        self.calls.lock().unwrap().push(request.url.clone());
        self.routes
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .ok_or_else(|| BridgeError::Network(format!("Failed to fetch {}", request.url)))
    }
}

/// In-process host with every bridge observable from the test.
pub struct Harness {
    pub settings: AgentSettings,
    pub http: Arc<ScriptedHttpClient>,
    pub storage: Arc<MemoryCacheStorage>,
    pub presenter: Arc<TracingNotificationPresenter>,
    pub clients: Arc<InMemoryClientRegistry>,
    pub registration: Arc<DesktopRegistration>,
    pub executor: Arc<TokioBackgroundExecutor>,
    pub bus: Arc<EventBus>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(AgentSettings::for_origin(ORIGIN).unwrap())
    }

    pub fn with_settings(settings: AgentSettings) -> Self {
        Self {
            settings,
            http: Arc::new(ScriptedHttpClient::default()),
            storage: Arc::new(MemoryCacheStorage::new()),
            presenter: Arc::new(TracingNotificationPresenter::new()),
            clients: Arc::new(InMemoryClientRegistry::new()),
            registration: Arc::new(DesktopRegistration::new()),
            executor: Arc::new(TokioBackgroundExecutor::new()),
            bus: Arc::new(EventBus::new(256)),
        }
    }

    pub fn asset_urls(&self) -> Vec<String> {
        self.settings
            .static_asset_urls()
            .unwrap()
            .into_iter()
            .map(|url| url.to_string())
            .collect()
    }

    /// Make every static asset reachable.
    pub fn serve_static_assets(&self) {
        for url in self.asset_urls() {
            self.http.ok(&url, &format!("asset {}", url));
        }
    }

    pub fn config(&self) -> AgentConfig {
        AgentConfig::builder()
            .settings(self.settings.clone())
            .http_client(self.http.clone())
            .cache_storage(self.storage.clone())
            .notifications(self.presenter.clone())
            .clients(self.clients.clone())
            .registration(self.registration.clone())
            .background_executor(self.executor.clone())
            .build()
            .unwrap()
    }

    pub fn agent(&self) -> OfflineCacheAgent {
        OfflineCacheAgent::with_event_bus(self.config(), self.bus.clone()).unwrap()
    }

    /// Installed and activated agent with a fresh call log.
    pub async fn active_agent(&self) -> OfflineCacheAgent {
        self.serve_static_assets();
        let agent = self.agent();
        agent.install().await.unwrap();
        agent.activate().await.unwrap();
        self.http.reset_calls();
        agent
    }
}

pub fn app_url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}
