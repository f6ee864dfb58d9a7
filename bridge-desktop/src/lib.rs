//! # Desktop Bridge Implementations
//!
//! Native implementations of the bridge traits so the offline agent can run
//! outside a browser (tests, tooling, embedding in a native shell).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `CacheStorage` as an in-memory, insertion-ordered store
//! - `BackgroundExecutor` using Tokio tasks
//! - `NotificationPresenter` logging through `tracing`
//! - `ClientRegistry` as an in-process window list
//! - `WorkerRegistration` recording skip-waiting requests
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{MemoryCacheStorage, ReqwestHttpClient};
//! use bridge_traits::{CacheStorage, HttpClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::new();
//!     let caches = MemoryCacheStorage::new();
//!
//!     // Use in agent configuration
//! }
//! ```

mod background;
mod cache;
mod clients;
mod http;
mod notification;

pub use background::{DesktopRegistration, TokioBackgroundExecutor};
pub use cache::MemoryCacheStorage;
pub use clients::InMemoryClientRegistry;
pub use http::ReqwestHttpClient;
pub use notification::TracingNotificationPresenter;
