//! # Host Bridge Traits
//!
//! Platform abstraction traits the offline agent needs from whatever hosts it.
//!
//! ## Overview
//!
//! The agent never touches browser or OS APIs directly. Each capability it
//! relies on is a trait here, implemented once per host: a browser worker scope
//! on the web, `bridge-desktop` natively.
//!
//! ## Traits
//!
//! ### Network & Caching
//! - [`HttpClient`](http::HttpClient) - Fetch from the network, bypassing the worker
//! - [`CacheStorage`](cache::CacheStorage) - Named request→response buckets
//!
//! ### User-facing Surfaces
//! - [`NotificationPresenter`](notification::NotificationPresenter) - Show and close notifications
//! - [`ClientRegistry`](clients::ClientRegistry) - Enumerate, focus, open and claim windows
//!
//! ### Lifecycle & Scheduling
//! - [`WorkerRegistration`](background::WorkerRegistration) - Skip the waiting phase
//! - [`BackgroundExecutor`](background::BackgroundExecutor) - Deferred one-off tasks
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ In Progress |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). A network-level
//! failure must surface as [`BridgeError::Network`] so the agent can tell
//! "offline" apart from other host failures.
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` on native targets so they can be shared
//! across Tokio tasks. On `wasm32` the bound is dropped (see [`platform`]).

pub mod background;
pub mod cache;
pub mod clients;
pub mod error;
pub mod http;
pub mod notification;
pub mod platform;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use background::{BackgroundExecutor, BackgroundTask, TaskId, TaskStatus, WorkerRegistration};
pub use cache::{CacheKey, CacheStorage};
pub use clients::{ClientRegistry, ClientType, WindowClient};
pub use http::{
    FetchRequest, HttpClient, HttpMethod, HttpResponse, RequestDestination, RequestMode,
    ResponseType,
};
pub use notification::{Notification, NotificationAction, NotificationOptions, NotificationPresenter};
pub use time::{Clock, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
