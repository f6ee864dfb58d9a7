//! In-process Client Registry Implementation

use async_trait::async_trait;
use bridge_traits::{
    clients::{ClientRegistry, ClientType, WindowClient},
    error::{BridgeError, Result},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Window list kept in memory.
///
/// Hosts that embed the agent register their windows with
/// [`add_window`](Self::add_window); `open_window` appends a new focused one.
#[derive(Clone, Default)]
pub struct InMemoryClientRegistry {
    windows: Arc<RwLock<Vec<WindowClient>>>,
    claimed: Arc<AtomicBool>,
}

impl InMemoryClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_window(&self, url: impl Into<String>) -> WindowClient {
        let client = WindowClient::new(Uuid::new_v4().to_string(), url);
        self.windows.write().await.push(client.clone());
        client
    }

    pub async fn windows(&self) -> Vec<WindowClient> {
        self.windows.read().await.clone()
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientRegistry for InMemoryClientRegistry {
    async fn match_all(&self, client_type: ClientType) -> Result<Vec<WindowClient>> {
        match client_type {
            ClientType::Window | ClientType::All => Ok(self.windows.read().await.clone()),
            ClientType::Worker | ClientType::SharedWorker => Ok(Vec::new()),
        }
    }

    async fn focus(&self, client_id: &str) -> Result<WindowClient> {
        let mut windows = self.windows.write().await;
        let index = windows
            .iter()
            .position(|window| window.id == client_id)
            .ok_or_else(|| BridgeError::OperationFailed(format!("Unknown client: {}", client_id)))?;

        for window in windows.iter_mut() {
            window.focused = false;
        }
        windows[index].focused = true;
        Ok(windows[index].clone())
    }

    async fn open_window(&self, url: &str) -> Result<Option<WindowClient>> {
        debug!(url, "Opening window");
        let mut windows = self.windows.write().await;
        for window in windows.iter_mut() {
            window.focused = false;
        }

        let mut client = WindowClient::new(Uuid::new_v4().to_string(), url);
        client.focused = true;
        windows.push(client.clone());
        Ok(Some(client))
    }

    async fn claim(&self) -> Result<()> {
        self.claimed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
