//! # Event Bus System
//!
//! Broadcasts what the offline agent does, using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The agent reports every lifecycle transition, cache decision, notification
//! interaction and sync run as a typed [`AgentEvent`]. Hosts subscribe to drive
//! UI ("you are offline", "update ready") or diagnostics without the agent
//! knowing about them.
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐  subscribe   ┌────────────┐
//! │ OfflineCacheAgent├──────────>│ EventBus  ├─────────────>│ Subscriber │
//! └──────────────────┘           │ (broadcast│              └────────────┘
//!                                │  channel) │  subscribe   ┌────────────┐
//!                                │           ├─────────────>│ Subscriber │
//!                                └───────────┘              └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AgentEvent, CacheEvent, EventBus, EventStream};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut stream = EventStream::new(bus.subscribe())
//!     .filter(|event| matches!(event, AgentEvent::Cache(_)));
//!
//! bus.emit(AgentEvent::Cache(CacheEvent::Hit {
//!     url: "https://dreamvault.app/".to_string(),
//! }))
//! .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Served from cache");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events and can keep reading.
//! - **`RecvError::Closed`**: every sender is gone; treat it as shutdown.
//!
//! Emitting with no subscribers returns an error the agent ignores.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Agent Event Types
// ============================================================================

/// Top-level event published by the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum AgentEvent {
    Lifecycle(LifecycleEvent),
    Cache(CacheEvent),
    Notification(NotificationEvent),
    Sync(SyncEvent),
    Message(MessageEvent),
}

impl AgentEvent {
    pub fn description(&self) -> &str {
        match self {
            AgentEvent::Lifecycle(e) => e.description(),
            AgentEvent::Cache(e) => e.description(),
            AgentEvent::Notification(e) => e.description(),
            AgentEvent::Sync(e) => e.description(),
            AgentEvent::Message(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            AgentEvent::Lifecycle(LifecycleEvent::InstallFailed { .. })
            | AgentEvent::Sync(SyncEvent::Failed { .. })
            | AgentEvent::Message(MessageEvent::Failed { .. }) => EventSeverity::Error,
            AgentEvent::Cache(CacheEvent::StoreFailed { .. })
            | AgentEvent::Cache(CacheEvent::OfflineFallback { .. })
            | AgentEvent::Message(MessageEvent::Rejected { .. }) => EventSeverity::Warning,
            AgentEvent::Lifecycle(_) | AgentEvent::Sync(SyncEvent::Completed { .. }) => {
                EventSeverity::Info
            }
            _ => EventSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Lifecycle Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LifecycleEvent {
    /// The agent moved between lifecycle states
    StateChanged { from: String, to: String },
    /// Every static asset was fetched and stored
    Installed { version: String, assets: usize },
    /// Pre-caching failed; the agent is discarded
    InstallFailed { version: String, message: String },
    /// Stale buckets were purged and open pages claimed
    Activated { version: String, purged: Vec<String> },
}

impl LifecycleEvent {
    fn description(&self) -> &str {
        match self {
            LifecycleEvent::StateChanged { .. } => "Lifecycle state changed",
            LifecycleEvent::Installed { .. } => "Static assets cached",
            LifecycleEvent::InstallFailed { .. } => "Installation failed",
            LifecycleEvent::Activated { .. } => "Agent activated",
        }
    }
}

// ============================================================================
// Cache Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CacheEvent {
    Hit { url: String },
    Miss { url: String },
    Stored { url: String },
    StoreFailed { url: String, message: String },
    /// Network failed; served the app shell or the offline placeholder
    OfflineFallback { url: String, shell: bool },
}

impl CacheEvent {
    fn description(&self) -> &str {
        match self {
            CacheEvent::Hit { .. } => "Served from cache",
            CacheEvent::Miss { .. } => "Cache miss, fetched from network",
            CacheEvent::Stored { .. } => "Response cached",
            CacheEvent::StoreFailed { .. } => "Failed to cache response",
            CacheEvent::OfflineFallback { .. } => "Served offline fallback",
        }
    }
}

// ============================================================================
// Notification Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NotificationEvent {
    Shown { tag: String, title: String },
    Clicked { tag: String, action: String },
    Closed { tag: String },
    Snoozed { task_id: String, delay_secs: u64 },
}

impl NotificationEvent {
    fn description(&self) -> &str {
        match self {
            NotificationEvent::Shown { .. } => "Notification shown",
            NotificationEvent::Clicked { .. } => "Notification clicked",
            NotificationEvent::Closed { .. } => "Notification closed",
            NotificationEvent::Snoozed { .. } => "Reminder snoozed",
        }
    }
}

// ============================================================================
// Sync Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    Started { tag: String, periodic: bool },
    Completed { tag: String, items_synced: u64 },
    Failed { tag: String, message: String },
    /// No handler is registered for the tag
    Ignored { tag: String },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::Started { .. } => "Sync started",
            SyncEvent::Completed { .. } => "Sync completed",
            SyncEvent::Failed { .. } => "Sync failed",
            SyncEvent::Ignored { .. } => "Sync tag ignored",
        }
    }
}

// ============================================================================
// Message Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum MessageEvent {
    Received { kind: String },
    /// Payload could not be parsed or carried an unknown type
    Rejected { message: String },
    /// A handler returned an error
    Failed { context: String, message: String },
}

impl MessageEvent {
    fn description(&self) -> &str {
        match self {
            MessageEvent::Received { .. } => "Client message received",
            MessageEvent::Rejected { .. } => "Client message rejected",
            MessageEvent::Failed { .. } => "Event handler failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast channel for [`AgentEvent`]s. Cloning shares the channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AgentEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of subscribers that received the event.
    pub fn emit(&self, event: AgentEvent) -> Result<usize, SendError<AgentEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<AgentEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&AgentEvent) -> bool + Send + Sync>;

/// Receiver with an optional predicate; non-matching events are skipped.
pub struct EventStream {
    receiver: Receiver<AgentEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<AgentEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AgentEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &AgentEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    pub async fn recv(&mut self) -> Result<AgentEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive. `None` means nothing matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<AgentEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
