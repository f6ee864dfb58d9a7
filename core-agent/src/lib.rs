//! # DreamVault Offline Agent
//!
//! Keeps the DreamVault web app usable offline and nudges users to record
//! their dreams.
//!
//! ## Overview
//!
//! The agent runs in the app's worker context and reacts to lifecycle,
//! network and notification events:
//!
//! - **Install** pre-caches the app shell and CDN assets into a versioned bucket
//! - **Activate** deletes buckets left by older versions and claims open pages
//! - **Fetch** answers same-origin and allow-listed requests cache-first, with
//!   an offline fallback
//! - **Push / notification clicks** show reminders, focus the app or snooze
//! - **Messages / sync** handle page requests and background jobs
//!
//! All host access goes through the `bridge-traits` seams injected via
//! [`AgentConfig`](core_runtime::config::AgentConfig).
//!
//! ## Example
//!
//! ```rust,ignore
//! use bridge_traits::FetchRequest;
//! use core_agent::{EventResponse, OfflineCacheAgent, WorkerEvent};
//! use core_runtime::config::AgentConfig;
//!
//! let agent = OfflineCacheAgent::new(AgentConfig::builder().build()?)?;
//! agent.dispatch(WorkerEvent::Install).await;
//! agent.dispatch(WorkerEvent::Activate).await;
//!
//! let request = FetchRequest::navigate("http://localhost/journal");
//! if let EventResponse::Respond { response, .. } = agent.dispatch(WorkerEvent::Fetch(request)).await {
//!     println!("{} {}", response.status, response.status_text);
//! }
//! ```

pub mod agent;
pub mod cache;
pub mod error;
pub mod event;
pub mod fetch;
pub mod messages;
pub mod notifications;
pub mod policy;
pub mod state;
pub mod sync;

pub use agent::OfflineCacheAgent;
pub use cache::OfflineCache;
pub use error::{AgentError, Result};
pub use event::{EventResponse, WorkerEvent};
pub use fetch::{offline_response, CacheFirst, FetchOutcome, ResponseSource};
pub use messages::ClientMessage;
pub use notifications::{ClickAction, ClickOutcome, PushPayload, Reminders};
pub use policy::{Eligibility, InterceptPolicy};
pub use state::AgentState;
pub use sync::{SyncJob, SyncReport};

use core_runtime::events::{AgentEvent, EventBus};
use std::sync::Arc;

/// Publish on the bus when one is attached. Having no subscribers is fine.
pub(crate) fn emit_event(bus: Option<&Arc<EventBus>>, event: AgentEvent) {
    if let Some(bus) = bus {
        let _ = bus.emit(event);
    }
}
