//! # Agent Configuration Module
//!
//! Provides configuration management for the offline agent.
//!
//! ## Overview
//!
//! Configuration is split in two:
//!
//! - [`AgentSettings`] is plain data (cache version, app origin, asset list,
//!   allow-listed hosts, reminder texts, sync tags). It is serde-serializable so
//!   hosts can ship it as JSON next to the worker.
//! - [`AgentConfig`] couples validated settings with the host bridges the agent
//!   calls. It is built through [`AgentConfigBuilder`], which fails fast when a
//!   required bridge is missing.
//!
//! ## Required Bridges
//!
//! - `HttpClient` - network fetches
//! - `CacheStorage` - cache buckets
//! - `NotificationPresenter` - reminders
//! - `ClientRegistry` - focusing/opening windows and claiming pages
//! - `WorkerRegistration` - skip-waiting
//!
//! ## Optional Bridges
//!
//! - `BackgroundExecutor` - snoozed reminders (snoozing fails with `BridgeError::NotAvailable` without it)
//! - `Clock` - defaults to the system clock
//!
//! When the `desktop-shims` feature is enabled, `bridge-desktop` defaults are
//! injected for every bridge that was not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{AgentConfig, AgentSettings};
//! use std::sync::Arc;
//!
//! let settings = AgentSettings::from_json(include_str!("agent.json"))?;
//! let config = AgentConfig::builder()
//!     .settings(settings)
//!     .http_client(Arc::new(MyHttpClient))
//!     .cache_storage(Arc::new(MyCacheStorage))
//!     .notifications(Arc::new(MyPresenter))
//!     .clients(Arc::new(MyClients))
//!     .registration(Arc::new(MyRegistration))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    BackgroundExecutor, CacheStorage, ClientRegistry, Clock, HttpClient, NotificationPresenter,
    SystemClock, WorkerRegistration,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Cache bucket name shipped with the current asset list.
///
/// Bump whenever [`AgentSettings::static_assets`] changes so the previous
/// bucket is purged on the next activation.
pub const DEFAULT_CACHE_VERSION: &str = "dreamvault-v2.0";

/// Origin used when none is configured.
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost/";

/// Document served for failed navigations.
pub const DEFAULT_OFFLINE_DOCUMENT: &str = "/index.html";

/// Body of the synthetic 503 response.
pub const DEFAULT_OFFLINE_BODY: &str = "Offline content not available";

fn default_static_assets() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/manifest.json",
        "https://unpkg.com/react@18/umd/react.development.js",
        "https://unpkg.com/react-dom@18/umd/react-dom.development.js",
        "https://cdn.tailwindcss.com",
    ]
    .iter()
    .map(|asset| asset.to_string())
    .collect()
}

fn default_allowed_hosts() -> Vec<String> {
    ["unpkg.com", "cdn.tailwindcss.com", "images.unsplash.com"]
        .iter()
        .map(|host| host.to_string())
        .collect()
}

/// Texts, icon and timing of reminder notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    /// Title used when a push payload carries none
    pub default_title: String,
    /// Body used when a push payload carries none
    pub default_body: String,
    /// Click target used when a push payload carries none
    pub default_url: String,
    pub icon: String,
    pub tag: String,

    pub snooze_title: String,
    pub snooze_body: String,
    pub snooze_tag: String,
    /// Delay before a snoozed reminder comes back
    pub snooze_delay_secs: u64,

    pub daily_title: String,
    pub daily_body: String,
    pub daily_tag: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            default_title: "DreamVault Reminder 🌙".to_string(),
            default_body: "Time to record your dreams! What did you dream about last night?"
                .to_string(),
            default_url: "/".to_string(),
            icon: "/favicon.ico".to_string(),
            tag: "dream-reminder".to_string(),
            snooze_title: "Dream Reminder 🌙".to_string(),
            snooze_body: "Gentle reminder to record your dreams when you're ready!".to_string(),
            snooze_tag: "snooze-reminder".to_string(),
            snooze_delay_secs: 60 * 60,
            daily_title: "Dream Reminder 🌙".to_string(),
            daily_body: "Don't forget to record your dreams! Keep your streak going!".to_string(),
            daily_tag: "daily-reminder".to_string(),
        }
    }
}

impl ReminderSettings {
    pub fn snooze_delay(&self) -> Duration {
        Duration::from_secs(self.snooze_delay_secs)
    }
}

/// Tags the agent reacts to in sync and periodic-sync events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTags {
    /// One-off sync of dreams saved while offline
    pub background_sync: String,
    /// One-off refresh of cached content
    pub content_refresh: String,
    /// Periodic daily reminder
    pub daily_reminder: String,
}

impl Default for SyncTags {
    fn default() -> Self {
        Self {
            background_sync: "background-sync-dreams".to_string(),
            content_refresh: "periodic-sync".to_string(),
            daily_reminder: "dream-reminder".to_string(),
        }
    }
}

/// Serializable agent settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Name of the cache bucket owned by this version of the agent
    pub cache_version: String,
    /// Origin of the application the agent serves
    pub app_origin: String,
    /// Assets pre-cached at install time; relative entries resolve against `app_origin`
    pub static_assets: Vec<String>,
    /// Foreign hostnames whose requests are intercepted (substring match)
    pub allowed_hosts: Vec<String>,
    /// App shell document served for failed navigations
    pub offline_document: String,
    /// Body of the synthetic offline response
    pub offline_body: String,
    pub reminder: ReminderSettings,
    pub sync_tags: SyncTags,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
            static_assets: default_static_assets(),
            allowed_hosts: default_allowed_hosts(),
            offline_document: DEFAULT_OFFLINE_DOCUMENT.to_string(),
            offline_body: DEFAULT_OFFLINE_BODY.to_string(),
            reminder: ReminderSettings::default(),
            sync_tags: SyncTags::default(),
        }
    }
}

impl AgentSettings {
    /// Default settings for an app served from `origin`.
    pub fn for_origin(origin: &str) -> Result<Self> {
        let settings = Self {
            app_origin: origin.to_string(),
            ..Self::default()
        };
        settings.origin_url()?;
        Ok(settings)
    }

    /// Parsed app origin.
    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.app_origin).map_err(|source| Error::InvalidUrl {
            url: self.app_origin.clone(),
            source,
        })
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid agent settings: {}", e)))
    }

    /// Resolve a possibly relative URL against the app origin.
    pub fn resolve(&self, url: &str) -> Result<Url> {
        self.origin_url()?.join(url).map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
        })
    }

    /// Absolute URLs of the static assets, in declaration order.
    pub fn static_asset_urls(&self) -> Result<Vec<Url>> {
        self.static_assets
            .iter()
            .map(|asset| self.resolve(asset))
            .collect()
    }

    /// Absolute URL of the offline fallback document.
    pub fn offline_document_url(&self) -> Result<Url> {
        self.resolve(&self.offline_document)
    }

    /// Validates the settings.
    ///
    /// This checks:
    /// - Cache version is not empty
    /// - App origin is an http(s) URL with a host
    /// - Every static asset resolves, and the offline document is among them
    /// - Allow-listed hosts are not empty strings
    /// - Snooze delay is non-zero and sync tags are set
    pub fn validate(&self) -> Result<()> {
        if self.cache_version.trim().is_empty() {
            return Err(Error::Config("Cache version cannot be empty".to_string()));
        }

        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") || origin.host_str().is_none() {
            return Err(Error::Config(format!(
                "App origin must be an http(s) URL with a host, got '{}'",
                self.app_origin
            )));
        }

        if self.static_assets.is_empty() {
            return Err(Error::Config(
                "Static asset list cannot be empty".to_string(),
            ));
        }

        let assets = self.static_asset_urls()?;
        let offline_document = self.offline_document_url()?;
        if !assets.contains(&offline_document) {
            return Err(Error::Config(format!(
                "Offline document '{}' must be part of the static asset list",
                self.offline_document
            )));
        }

        if self.allowed_hosts.iter().any(|host| host.trim().is_empty()) {
            return Err(Error::Config(
                "Allow-listed hosts cannot contain empty entries".to_string(),
            ));
        }

        if self.reminder.snooze_delay_secs == 0 {
            return Err(Error::Config(
                "Snooze delay must be greater than 0 seconds".to_string(),
            ));
        }

        let tags = &self.sync_tags;
        if [&tags.background_sync, &tags.content_refresh, &tags.daily_reminder]
            .iter()
            .any(|tag| tag.is_empty())
        {
            return Err(Error::Config("Sync tags cannot be empty".to_string()));
        }

        Ok(())
    }
}

/// Agent configuration: validated settings plus host bridges.
///
/// Use [`AgentConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct AgentConfig {
    pub settings: AgentSettings,
    pub http_client: Arc<dyn HttpClient>,
    pub cache_storage: Arc<dyn CacheStorage>,
    pub notifications: Arc<dyn NotificationPresenter>,
    pub clients: Arc<dyn ClientRegistry>,
    pub registration: Arc<dyn WorkerRegistration>,
    pub background_executor: Option<Arc<dyn BackgroundExecutor>>,
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("settings", &self.settings)
            .field("http_client", &"HttpClient { ... }")
            .field("cache_storage", &"CacheStorage { ... }")
            .field("notifications", &"NotificationPresenter { ... }")
            .field("clients", &"ClientRegistry { ... }")
            .field("registration", &"WorkerRegistration { ... }")
            .field(
                "background_executor",
                &self
                    .background_executor
                    .as_ref()
                    .map(|_| "BackgroundExecutor { ... }"),
            )
            .finish()
    }
}

impl AgentConfig {
    /// Creates a new builder for constructing an `AgentConfig`.
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Name of the cache bucket this agent owns.
    pub fn cache_version(&self) -> &str {
        &self.settings.cache_version
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, purpose: &str, desktop_default: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required for {}. \
             Desktop: enable the 'desktop-shims' feature to use {}. \
             Web: inject an adapter over the worker global scope.",
            capability, purpose, desktop_default
        ),
    }
}

#[cfg(feature = "desktop-shims")]
mod defaults {
    use super::*;
    use bridge_desktop::{
        DesktopRegistration, InMemoryClientRegistry, MemoryCacheStorage, ReqwestHttpClient,
        TokioBackgroundExecutor, TracingNotificationPresenter,
    };

    pub fn http_client(settings: &AgentSettings) -> Result<Arc<dyn HttpClient>> {
        Ok(Arc::new(
            ReqwestHttpClient::new().with_app_origin(settings.origin_url()?),
        ))
    }

    pub fn cache_storage() -> Result<Arc<dyn CacheStorage>> {
        Ok(Arc::new(MemoryCacheStorage::new()))
    }

    pub fn notifications() -> Result<Arc<dyn NotificationPresenter>> {
        Ok(Arc::new(TracingNotificationPresenter::new()))
    }

    pub fn clients() -> Result<Arc<dyn ClientRegistry>> {
        Ok(Arc::new(InMemoryClientRegistry::new()))
    }

    pub fn registration() -> Result<Arc<dyn WorkerRegistration>> {
        Ok(Arc::new(DesktopRegistration::new()))
    }

    pub fn background_executor() -> Option<Arc<dyn BackgroundExecutor>> {
        Some(Arc::new(TokioBackgroundExecutor::new()))
    }
}

#[cfg(not(feature = "desktop-shims"))]
mod defaults {
    use super::*;

    pub fn http_client(_settings: &AgentSettings) -> Result<Arc<dyn HttpClient>> {
        Err(capability_missing("HttpClient", "network fetches", "ReqwestHttpClient"))
    }

    pub fn cache_storage() -> Result<Arc<dyn CacheStorage>> {
        Err(capability_missing("CacheStorage", "offline caching", "MemoryCacheStorage"))
    }

    pub fn notifications() -> Result<Arc<dyn NotificationPresenter>> {
        Err(capability_missing(
            "NotificationPresenter",
            "reminder notifications",
            "TracingNotificationPresenter",
        ))
    }

    pub fn clients() -> Result<Arc<dyn ClientRegistry>> {
        Err(capability_missing(
            "ClientRegistry",
            "focusing windows and claiming pages",
            "InMemoryClientRegistry",
        ))
    }

    pub fn registration() -> Result<Arc<dyn WorkerRegistration>> {
        Err(capability_missing(
            "WorkerRegistration",
            "skip-waiting",
            "DesktopRegistration",
        ))
    }

    pub fn background_executor() -> Option<Arc<dyn BackgroundExecutor>> {
        None
    }
}

/// Builder for constructing [`AgentConfig`] instances.
///
/// Call [`build()`](AgentConfigBuilder::build) once all bridges are set; the
/// builder validates the settings and reports the first missing bridge.
#[derive(Default)]
pub struct AgentConfigBuilder {
    settings: Option<AgentSettings>,
    http_client: Option<Arc<dyn HttpClient>>,
    cache_storage: Option<Arc<dyn CacheStorage>>,
    notifications: Option<Arc<dyn NotificationPresenter>>,
    clients: Option<Arc<dyn ClientRegistry>>,
    registration: Option<Arc<dyn WorkerRegistration>>,
    background_executor: Option<Arc<dyn BackgroundExecutor>>,
    clock: Option<Arc<dyn Clock>>,
}

impl AgentConfigBuilder {
    /// Sets the full settings block.
    pub fn settings(mut self, settings: AgentSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Overrides the cache version on top of the current settings.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use core_runtime::config::AgentConfig;
    ///
    /// let builder = AgentConfig::builder().cache_version("dreamvault-test");
    /// ```
    pub fn cache_version(mut self, version: impl Into<String>) -> Self {
        let mut settings = self.settings.take().unwrap_or_default();
        settings.cache_version = version.into();
        self.settings = Some(settings);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn cache_storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.cache_storage = Some(storage);
        self
    }

    pub fn notifications(mut self, presenter: Arc<dyn NotificationPresenter>) -> Self {
        self.notifications = Some(presenter);
        self
    }

    pub fn clients(mut self, clients: Arc<dyn ClientRegistry>) -> Self {
        self.clients = Some(clients);
        self
    }

    pub fn registration(mut self, registration: Arc<dyn WorkerRegistration>) -> Self {
        self.registration = Some(registration);
        self
    }

    /// Sets the background executor used for snoozed reminders (optional).
    pub fn background_executor(mut self, executor: Arc<dyn BackgroundExecutor>) -> Self {
        self.background_executor = Some(executor);
        self
    }

    /// Sets the time source (optional, defaults to the system clock).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the final [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] / [`Error::InvalidUrl`] when the settings are invalid
    /// - [`Error::CapabilityMissing`] when a required bridge is missing and no
    ///   desktop default is available
    pub fn build(self) -> Result<AgentConfig> {
        let settings = self.settings.unwrap_or_default();
        settings.validate()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => defaults::http_client(&settings)?,
        };
        let cache_storage = match self.cache_storage {
            Some(storage) => storage,
            None => defaults::cache_storage()?,
        };
        let notifications = match self.notifications {
            Some(presenter) => presenter,
            None => defaults::notifications()?,
        };
        let clients = match self.clients {
            Some(clients) => clients,
            None => defaults::clients()?,
        };
        let registration = match self.registration {
            Some(registration) => registration,
            None => defaults::registration()?,
        };
        let background_executor = self
            .background_executor
            .or_else(defaults::background_executor);
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

        Ok(AgentConfig {
            settings,
            http_client,
            cache_storage,
            notifications,
            clients,
            registration,
            background_executor,
            clock,
        })
    }
}
