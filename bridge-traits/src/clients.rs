//! Controlled Client Abstraction
//!
//! Windows (tabs) of the application the worker can see, focus, open or take
//! control of.

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// Kind of client to enumerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    #[default]
    Window,
    Worker,
    SharedWorker,
    All,
}

/// A window client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
    pub focused: bool,
    /// Whether this window can be focused from the worker
    pub focusable: bool,
}

impl WindowClient {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            focused: false,
            focusable: true,
        }
    }
}

/// Host client registry trait
///
/// - **Web**: `Clients` on the worker global scope
/// - **Desktop**: an in-process window list
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ClientRegistry: PlatformSendSync {
    /// List clients of the given type
    async fn match_all(&self, client_type: ClientType) -> Result<Vec<WindowClient>>;

    /// Bring a window to the foreground
    async fn focus(&self, client_id: &str) -> Result<WindowClient>;

    /// Open a new window at `url`
    ///
    /// Returns `None` when the host opened the window but cannot expose it
    /// (e.g. cross-origin target).
    async fn open_window(&self, url: &str) -> Result<Option<WindowClient>>;

    /// Take control of every open page in scope without a reload
    async fn claim(&self) -> Result<()>;
}
