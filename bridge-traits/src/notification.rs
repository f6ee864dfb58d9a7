//! Notification Abstraction
//!
//! Descriptor types for system notifications and the trait the host implements
//! to display them.

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// A button shown on a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Identifier reported back when the button is clicked
    pub action: String,
    /// Button label
    pub title: String,
    pub icon: Option<String>,
}

impl NotificationAction {
    pub fn new(action: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            title: title.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Display options accompanying a notification title
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
    /// Notifications sharing a tag replace each other
    pub tag: Option<String>,
    /// Opaque payload carried back on click; the agent stores a target URL here
    pub data: Option<String>,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
    /// Vibration pattern in milliseconds
    pub vibrate: Vec<u32>,
    pub silent: bool,
}

/// A notification as the host presents it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

impl Notification {
    pub fn new(title: impl Into<String>, options: NotificationOptions) -> Self {
        Self {
            title: title.into(),
            options,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.options.tag.as_deref()
    }

    pub fn data(&self) -> Option<&str> {
        self.options.data.as_deref()
    }
}

/// Host notification trait
///
/// - **Web**: `ServiceWorkerRegistration.showNotification`
/// - **Desktop**: system tray / notification daemon, or a log sink
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait NotificationPresenter: PlatformSendSync {
    /// Display a notification
    async fn show_notification(&self, notification: Notification) -> Result<()>;

    /// Dismiss every displayed notification carrying `tag`
    async fn close(&self, tag: &str) -> Result<()>;

    /// Dismiss `notification` itself, whether or not it has a tag
    ///
    /// - **Web**: `Notification.close()` on the clicked notification
    async fn close_notification(&self, notification: &Notification) -> Result<()>;
}
