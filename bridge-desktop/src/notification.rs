//! Notification Presenter Implementation

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    notification::{Notification, NotificationPresenter},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Presenter that writes notifications to the log and keeps them in memory.
///
/// Desktop builds have no system notification surface wired in yet; this keeps
/// reminders observable and lets tests assert on what was shown.
#[derive(Clone, Default)]
pub struct TracingNotificationPresenter {
    displayed: Arc<Mutex<Vec<Notification>>>,
    history: Arc<Mutex<Vec<Notification>>>,
}

impl TracingNotificationPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications currently on screen
    pub async fn displayed(&self) -> Vec<Notification> {
        self.displayed.lock().await.clone()
    }

    /// Every notification ever shown, oldest first
    pub async fn history(&self) -> Vec<Notification> {
        self.history.lock().await.clone()
    }
}

#[async_trait]
impl NotificationPresenter for TracingNotificationPresenter {
    async fn show_notification(&self, notification: Notification) -> Result<()> {
        info!(
            title = %notification.title,
            body = %notification.options.body,
            tag = notification.tag().unwrap_or(""),
            "Showing notification"
        );

        let mut displayed = self.displayed.lock().await;
        if let Some(tag) = notification.tag() {
            displayed.retain(|shown| shown.tag() != Some(tag));
        }
        displayed.push(notification.clone());
        drop(displayed);

        self.history.lock().await.push(notification);
        Ok(())
    }

    async fn close(&self, tag: &str) -> Result<()> {
        let mut displayed = self.displayed.lock().await;
        displayed.retain(|shown| shown.tag() != Some(tag));
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> Result<()> {
        match notification.tag() {
            Some(tag) => self.close(tag).await,
            None => {
                self.displayed.lock().await.retain(|shown| shown != notification);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::notification::NotificationOptions;

    fn tagged(title: &str, tag: &str) -> Notification {
        Notification::new(
            title,
            NotificationOptions {
                tag: Some(tag.to_string()),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_same_tag_replaces() {
        let presenter = TracingNotificationPresenter::new();
        presenter.show_notification(tagged("first", "dream-reminder")).await.unwrap();
        presenter.show_notification(tagged("second", "dream-reminder")).await.unwrap();

        let displayed = presenter.displayed().await;
        assert_eq!(displayed.len(), 1);
        assert_eq!(displayed[0].title, "second");
        assert_eq!(presenter.history().await.len(), 2);
    }

    #[tokio::test]
    async fn test_close_by_tag() {
        let presenter = TracingNotificationPresenter::new();
        presenter.show_notification(tagged("a", "dream-reminder")).await.unwrap();
        presenter.show_notification(tagged("b", "snooze-reminder")).await.unwrap();

        presenter.close("dream-reminder").await.unwrap();

        let displayed = presenter.displayed().await;
        assert_eq!(displayed.len(), 1);
        assert_eq!(displayed[0].tag(), Some("snooze-reminder"));
    }

    #[tokio::test]
    async fn test_close_untagged_notification() {
        let presenter = TracingNotificationPresenter::new();
        let untagged = Notification::new("plain", NotificationOptions::default());
        presenter.show_notification(untagged.clone()).await.unwrap();
        presenter.show_notification(tagged("b", "snooze-reminder")).await.unwrap();

        presenter.close_notification(&untagged).await.unwrap();

        let displayed = presenter.displayed().await;
        assert_eq!(displayed.len(), 1);
        assert_eq!(displayed[0].title, "b");
    }
}
