//! # Agent Error Types

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors raised by agent event handlers.
///
/// None of these escape [`OfflineCacheAgent::dispatch`](crate::OfflineCacheAgent::dispatch);
/// they are logged and reported on the event bus.
#[derive(Error, Debug)]
pub enum AgentError {
    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// Pre-caching the static assets failed; nothing was written.
    #[error("Install failed: {0}")]
    InstallFailed(String),

    /// A static asset answered with a non-success status.
    #[error("Asset {url} returned status {status}")]
    AssetStatus { url: String, status: u16 },

    /// The event is not valid in the current lifecycle state.
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    // ========================================================================
    // Payload Errors
    // ========================================================================
    /// A push or message payload could not be decoded.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    // ========================================================================
    // Host Errors
    // ========================================================================
    /// A host bridge call failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Sync '{tag}' failed: {message}")]
    SyncFailed { tag: String, message: String },
}

impl AgentError {
    /// Whether the error came from a network-level failure.
    pub fn is_network(&self) -> bool {
        matches!(self, AgentError::Bridge(BridgeError::Network(_)))
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
