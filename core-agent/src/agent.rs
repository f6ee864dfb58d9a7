//! # Offline Cache Agent
//!
//! The agent ties the cache, the fetch strategy, reminders and sync jobs to
//! the worker lifecycle. Hosts either call the typed handlers directly or feed
//! [`WorkerEvent`]s through [`OfflineCacheAgent::dispatch`], which never fails:
//! handler errors are logged and reported as [`EventResponse::Failed`].

use crate::cache::OfflineCache;
use crate::emit_event;
use crate::error::{AgentError, Result};
use crate::event::{EventResponse, WorkerEvent};
use crate::fetch::{CacheFirst, FetchOutcome};
use crate::messages::{dream_title, reminder_time, ClientMessage};
use crate::notifications::{ClickOutcome, Reminders};
use crate::policy::InterceptPolicy;
use crate::state::AgentState;
use crate::sync::{refresh_content, sync_dreams, OfflineDreamStore, SyncJob, SyncReport};
use bridge_traits::{FetchRequest, Notification};
use core_runtime::config::AgentConfig;
use core_runtime::events::{AgentEvent, EventBus, LifecycleEvent, MessageEvent, SyncEvent};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Offline-support agent for the DreamVault app.
pub struct OfflineCacheAgent {
    config: AgentConfig,
    state: RwLock<AgentState>,
    cache: Arc<OfflineCache>,
    fetch: CacheFirst,
    reminders: Reminders,
    dreams: OfflineDreamStore,
    event_bus: Option<Arc<EventBus>>,
}

impl OfflineCacheAgent {
    /// Create an agent in the `Parsed` state.
    ///
    /// # Errors
    ///
    /// Fails when the configured origin or offline document is not a valid URL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use core_agent::{OfflineCacheAgent, WorkerEvent};
    /// use core_runtime::config::AgentConfig;
    ///
    /// let agent = OfflineCacheAgent::new(AgentConfig::builder().build()?)?;
    /// agent.dispatch(WorkerEvent::Install).await;
    /// agent.dispatch(WorkerEvent::Activate).await;
    /// ```
    pub fn new(config: AgentConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Create an agent that reports what it does on `event_bus`.
    pub fn with_event_bus(config: AgentConfig, event_bus: Arc<EventBus>) -> Result<Self> {
        Self::build(config, Some(event_bus))
    }

    fn build(config: AgentConfig, event_bus: Option<Arc<EventBus>>) -> Result<Self> {
        let settings = &config.settings;
        let origin = settings.origin_url()?;
        let policy = InterceptPolicy::new(&origin, settings.allowed_hosts.clone());

        let mut cache = OfflineCache::new(
            settings.cache_version.clone(),
            Arc::clone(&config.cache_storage),
            Arc::clone(&config.http_client),
        );
        if let Some(bus) = &event_bus {
            cache = cache.with_event_bus(Arc::clone(bus));
        }
        let cache = Arc::new(cache);

        let mut fetch = CacheFirst::new(
            policy.clone(),
            Arc::clone(&cache),
            Arc::clone(&config.http_client),
            settings.offline_document_url()?,
            settings.offline_body.clone(),
        );

        let mut reminders = Reminders::new(
            settings.reminder.clone(),
            origin,
            policy,
            Arc::clone(&config.notifications),
            Arc::clone(&config.clients),
        )
        .with_executor(config.background_executor.clone());

        if let Some(bus) = &event_bus {
            fetch = fetch.with_event_bus(Arc::clone(bus));
            reminders = reminders.with_event_bus(Arc::clone(bus));
        }

        Ok(Self {
            config,
            state: RwLock::new(AgentState::Parsed),
            cache,
            fetch,
            reminders,
            dreams: OfflineDreamStore,
            event_bus,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn cache(&self) -> &OfflineCache {
        &self.cache
    }

    pub fn reminders(&self) -> &Reminders {
        &self.reminders
    }

    pub async fn state(&self) -> AgentState {
        *self.state.read().await
    }

    async fn set_state(&self, next: AgentState, operation: &'static str) -> Result<()> {
        let mut state = self.state.write().await;
        let previous = *state;
        *state = previous.transition(next, operation)?;
        drop(state);

        debug!(from = %previous, to = %next, "Lifecycle transition");
        self.emit(AgentEvent::Lifecycle(LifecycleEvent::StateChanged {
            from: previous.to_string(),
            to: next.to_string(),
        }));
        Ok(())
    }

    fn emit(&self, event: AgentEvent) {
        emit_event(self.event_bus.as_ref(), event);
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Pre-cache the static assets and request immediate activation.
    ///
    /// Any asset failure leaves the bucket empty and the agent `Redundant`.
    #[instrument(skip(self), fields(version = %self.config.cache_version()))]
    pub async fn install(&self) -> Result<usize> {
        self.set_state(AgentState::Installing, "install").await?;
        info!("Installing");

        let populated = match self.config.settings.static_asset_urls() {
            Ok(assets) => self.cache.populate(&assets).await,
            Err(err) => Err(err.into()),
        };

        let count = match populated {
            Ok(count) => count,
            Err(err) => {
                error!(error = %err, "Failed to cache static assets");
                self.set_state(AgentState::Redundant, "install").await?;
                self.emit(AgentEvent::Lifecycle(LifecycleEvent::InstallFailed {
                    version: self.config.cache_version().to_string(),
                    message: err.to_string(),
                }));
                return Err(AgentError::InstallFailed(err.to_string()));
            }
        };

        if let Err(err) = self.config.registration.skip_waiting().await {
            warn!(error = %err, "Skip-waiting request failed");
        }

        self.set_state(AgentState::Installed, "install").await?;
        self.emit(AgentEvent::Lifecycle(LifecycleEvent::Installed {
            version: self.config.cache_version().to_string(),
            assets: count,
        }));
        Ok(count)
    }

    /// Delete stale buckets, then take control of open pages.
    #[instrument(skip(self), fields(version = %self.config.cache_version()))]
    pub async fn activate(&self) -> Result<Vec<String>> {
        self.set_state(AgentState::Activating, "activate").await?;
        info!("Activating");

        let result = async {
            let purged = self.cache.purge_stale().await?;
            self.config.clients.claim().await?;
            Ok::<_, AgentError>(purged)
        }
        .await;

        match result {
            Ok(purged) => {
                self.set_state(AgentState::Active, "activate").await?;
                self.emit(AgentEvent::Lifecycle(LifecycleEvent::Activated {
                    version: self.config.cache_version().to_string(),
                    purged: purged.clone(),
                }));
                Ok(purged)
            }
            Err(err) => {
                error!(error = %err, "Activation failed");
                self.set_state(AgentState::Redundant, "activate").await?;
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Fetch
    // ------------------------------------------------------------------------

    /// Answer a request cache-first. Requests pass through until the agent is active.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<FetchOutcome> {
        if !self.state().await.can_intercept_fetch() {
            return Ok(FetchOutcome::Passthrough);
        }
        self.fetch.handle(request).await
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    pub async fn handle_push(&self, data: Option<&[u8]>) -> Result<()> {
        info!("Push notification received");
        self.reminders.on_push(data).await
    }

    pub async fn handle_notification_click(
        &self,
        action: &str,
        notification: &Notification,
    ) -> Result<ClickOutcome> {
        self.reminders.on_click(action, notification).await
    }

    pub fn handle_notification_close(&self, notification: &Notification) {
        self.reminders.on_close(notification);
    }

    // ------------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------------

    /// Handle a message posted by a page. Unrecognised messages are ignored.
    #[instrument(skip(self, data))]
    pub async fn handle_message(&self, data: &Value) -> Result<()> {
        let message = match ClientMessage::parse(data) {
            Ok(Some(message)) => message,
            Ok(None) => {
                debug!("Ignoring message without a known type");
                return Ok(());
            }
            Err(err) => {
                self.emit(AgentEvent::Message(MessageEvent::Rejected {
                    message: err.to_string(),
                }));
                return Err(err);
            }
        };

        info!(kind = message.kind(), "Message received");
        self.emit(AgentEvent::Message(MessageEvent::Received {
            kind: message.kind().to_string(),
        }));

        match message {
            ClientMessage::SkipWaiting => {
                self.config.registration.skip_waiting().await?;
            }
            ClientMessage::CacheDream { dream } => {
                info!(
                    title = dream_title(&dream).unwrap_or_default(),
                    "Caching dream offline"
                );
            }
            ClientMessage::ScheduleReminder { time } => match reminder_time(&time) {
                Some(at) => {
                    let delay = at - self.config.clock.now();
                    info!(at = %at, delay_secs = delay.num_seconds(), "Scheduling reminder");
                }
                None => info!(time = %time, "Scheduling reminder"),
            },
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------------

    /// Run the job for a one-off sync tag. Unknown tags return `None`.
    #[instrument(skip(self))]
    pub async fn handle_sync(&self, tag: &str) -> Result<Option<SyncReport>> {
        info!("Background sync triggered");
        let job = SyncJob::for_sync_tag(tag, &self.config.settings.sync_tags);
        self.run_sync(tag, job, false).await
    }

    /// Run the job for a periodic sync tag. Unknown tags return `None`.
    #[instrument(skip(self))]
    pub async fn handle_periodic_sync(&self, tag: &str) -> Result<Option<SyncReport>> {
        info!("Periodic sync triggered");
        let job = SyncJob::for_periodic_tag(tag, &self.config.settings.sync_tags);
        self.run_sync(tag, job, true).await
    }

    async fn run_sync(
        &self,
        tag: &str,
        job: Option<SyncJob>,
        periodic: bool,
    ) -> Result<Option<SyncReport>> {
        let Some(job) = job else {
            debug!(tag, "No job for sync tag");
            self.emit(AgentEvent::Sync(SyncEvent::Ignored { tag: tag.to_string() }));
            return Ok(None);
        };

        self.emit(AgentEvent::Sync(SyncEvent::Started {
            tag: tag.to_string(),
            periodic,
        }));

        let result = match job {
            SyncJob::Dreams => Ok(sync_dreams(&self.dreams).await),
            SyncJob::ContentRefresh => Ok(refresh_content().await),
            SyncJob::DailyReminder => self.send_daily_reminder().await,
        };

        match result {
            Ok(report) => {
                self.emit(AgentEvent::Sync(SyncEvent::Completed {
                    tag: tag.to_string(),
                    items_synced: report.items_synced,
                }));
                Ok(Some(report))
            }
            Err(err) => {
                self.emit(AgentEvent::Sync(SyncEvent::Failed {
                    tag: tag.to_string(),
                    message: err.to_string(),
                }));
                Err(AgentError::SyncFailed {
                    tag: tag.to_string(),
                    message: err.to_string(),
                })
            }
        }
    }

    async fn send_daily_reminder(&self) -> Result<SyncReport> {
        info!("Sending dream reminder");
        if self.dreams.has_recorded_today().await {
            return Ok(SyncReport::default());
        }
        self.reminders
            .show(self.reminders.daily_notification())
            .await?;
        Ok(SyncReport {
            items_synced: 0,
            reminded: true,
        })
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Route an event to its handler.
    ///
    /// Never fails: handler errors are logged, reported on the event bus and
    /// returned as [`EventResponse::Failed`]. A fetch whose handler fails passes
    /// through to the network.
    pub async fn dispatch(&self, event: WorkerEvent) -> EventResponse {
        let kind = event.kind();
        let result = match event {
            WorkerEvent::Install => self.install().await.map(|_| EventResponse::Done),
            WorkerEvent::Activate => self.activate().await.map(|_| EventResponse::Done),
            WorkerEvent::Fetch(request) => match self.handle_fetch(&request).await {
                Ok(FetchOutcome::Passthrough) => Ok(EventResponse::Passthrough),
                Ok(FetchOutcome::Respond { response, source }) => {
                    Ok(EventResponse::Respond { response, source })
                }
                Err(err) => {
                    self.report_failure(kind, &err);
                    return EventResponse::Passthrough;
                }
            },
            WorkerEvent::Sync { tag } => self.handle_sync(&tag).await.map(|_| EventResponse::Done),
            WorkerEvent::PeriodicSync { tag } => self
                .handle_periodic_sync(&tag)
                .await
                .map(|_| EventResponse::Done),
            WorkerEvent::Push { data } => self
                .handle_push(data.as_deref())
                .await
                .map(|_| EventResponse::Done),
            WorkerEvent::NotificationClick {
                action,
                notification,
            } => self
                .handle_notification_click(&action, &notification)
                .await
                .map(|_| EventResponse::Done),
            WorkerEvent::NotificationClose { notification } => {
                self.handle_notification_close(&notification);
                Ok(EventResponse::Done)
            }
            WorkerEvent::Message { data } => {
                self.handle_message(&data).await.map(|_| EventResponse::Done)
            }
            WorkerEvent::Error { message } => {
                error!(message = %message, "Agent error");
                Ok(EventResponse::Done)
            }
            WorkerEvent::UnhandledRejection { reason } => {
                error!(reason = %reason, "Unhandled promise rejection");
                Ok(EventResponse::Done)
            }
        };

        result.unwrap_or_else(|err| {
            self.report_failure(kind, &err);
            EventResponse::Failed(err.to_string())
        })
    }

    fn report_failure(&self, kind: &str, err: &AgentError) {
        error!(event = kind, error = %err, "Event handler failed");
        self.emit(AgentEvent::Message(MessageEvent::Failed {
            context: kind.to_string(),
            message: err.to_string(),
        }));
    }
}
