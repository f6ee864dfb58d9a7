//! # Dream Reminders
//!
//! Builds reminder notifications from push payloads and reacts to clicks on
//! them: focusing or opening the app, snoozing, or dismissing.

use crate::emit_event;
use crate::error::{AgentError, Result};
use crate::policy::InterceptPolicy;
use bridge_traits::platform::boxed;
use bridge_traits::{
    BackgroundExecutor, BridgeError, ClientRegistry, ClientType, Notification, NotificationAction,
    NotificationOptions, NotificationPresenter, TaskId, WindowClient,
};
use core_runtime::config::ReminderSettings;
use core_runtime::events::{AgentEvent, EventBus, NotificationEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const ACTION_OPEN: &str = "open";
pub const ACTION_SNOOZE: &str = "snooze";
pub const ACTION_DISMISS: &str = "dismiss";

const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

/// Optional JSON body of a push message.
///
/// Each field is taken only when it is a non-empty string; anything else
/// falls back to the reminder defaults on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    /// Page opened when the reminder is clicked
    pub url: Option<String>,
}

impl PushPayload {
    /// Decode push data. Missing or empty data yields the default payload.
    pub fn parse(data: Option<&[u8]>) -> Result<Self> {
        match data {
            None => Ok(Self::default()),
            Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Self::default()),
            Some(bytes) => {
                let value: Value = serde_json::from_slice(bytes)
                    .map_err(|e| AgentError::InvalidPayload(format!("push data: {}", e)))?;
                Ok(Self {
                    title: non_empty_str(&value, "title"),
                    body: non_empty_str(&value, "body"),
                    url: non_empty_str(&value, "url"),
                })
            }
        }
    }
}

fn non_empty_str(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Button pressed on a reminder. An empty action is a click on the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    Open,
    Snooze,
    Dismiss,
    Other(String),
}

impl From<&str> for ClickAction {
    fn from(action: &str) -> Self {
        match action {
            "" | ACTION_OPEN => ClickAction::Open,
            ACTION_SNOOZE => ClickAction::Snooze,
            ACTION_DISMISS => ClickAction::Dismiss,
            other => ClickAction::Other(other.to_string()),
        }
    }
}

/// What a click ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An app window was already open and got focus
    Focused(WindowClient),
    /// A new window was requested; the host may refuse
    Opened(Option<WindowClient>),
    Snoozed(TaskId),
    Dismissed,
}

/// Builds, shows and reacts to reminder notifications.
pub struct Reminders {
    settings: ReminderSettings,
    app_origin: Url,
    policy: InterceptPolicy,
    presenter: Arc<dyn NotificationPresenter>,
    clients: Arc<dyn ClientRegistry>,
    executor: Option<Arc<dyn BackgroundExecutor>>,
    event_bus: Option<Arc<EventBus>>,
}

impl Reminders {
    pub fn new(
        settings: ReminderSettings,
        app_origin: Url,
        policy: InterceptPolicy,
        presenter: Arc<dyn NotificationPresenter>,
        clients: Arc<dyn ClientRegistry>,
    ) -> Self {
        Self {
            settings,
            app_origin,
            policy,
            presenter,
            clients,
            executor: None,
            event_bus: None,
        }
    }

    pub fn with_executor(mut self, executor: Option<Arc<dyn BackgroundExecutor>>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Reminder shown for a push message.
    pub fn push_notification(&self, payload: &PushPayload) -> Notification {
        let s = &self.settings;
        let options = NotificationOptions {
            body: payload.body.clone().unwrap_or_else(|| s.default_body.clone()),
            icon: Some(s.icon.clone()),
            badge: Some(s.icon.clone()),
            tag: Some(s.tag.clone()),
            data: Some(payload.url.clone().unwrap_or_else(|| s.default_url.clone())),
            require_interaction: true,
            actions: vec![
                NotificationAction::new(ACTION_OPEN, "Open App").with_icon(s.icon.clone()),
                NotificationAction::new(ACTION_SNOOZE, "Remind Later").with_icon(s.icon.clone()),
                NotificationAction::new(ACTION_DISMISS, "Dismiss"),
            ],
            vibrate: VIBRATE_PATTERN.to_vec(),
            silent: false,
        };
        let title = payload.title.clone().unwrap_or_else(|| s.default_title.clone());
        Notification::new(title, options)
    }

    /// Reminder that comes back after a snooze.
    pub fn snooze_notification(&self) -> Notification {
        let s = &self.settings;
        Notification::new(
            s.snooze_title.clone(),
            NotificationOptions {
                body: s.snooze_body.clone(),
                icon: Some(s.icon.clone()),
                tag: Some(s.snooze_tag.clone()),
                ..NotificationOptions::default()
            },
        )
    }

    /// Daily streak reminder shown by periodic sync.
    pub fn daily_notification(&self) -> Notification {
        let s = &self.settings;
        Notification::new(
            s.daily_title.clone(),
            NotificationOptions {
                body: s.daily_body.clone(),
                icon: Some(s.icon.clone()),
                tag: Some(s.daily_tag.clone()),
                require_interaction: false,
                actions: vec![
                    NotificationAction::new(ACTION_OPEN, "Open App"),
                    NotificationAction::new(ACTION_DISMISS, "Later"),
                ],
                ..NotificationOptions::default()
            },
        )
    }

    pub async fn show(&self, notification: Notification) -> Result<()> {
        let tag = notification.tag().unwrap_or_default().to_string();
        let title = notification.title.clone();
        self.presenter.show_notification(notification).await?;
        debug!(tag = %tag, "Notification shown");
        emit_event(
            self.event_bus.as_ref(),
            AgentEvent::Notification(NotificationEvent::Shown { tag, title }),
        );
        Ok(())
    }

    /// Show the reminder for a push message.
    ///
    /// Malformed push data is logged and the default texts are used.
    #[instrument(skip(self, data))]
    pub async fn on_push(&self, data: Option<&[u8]>) -> Result<()> {
        let payload = PushPayload::parse(data).unwrap_or_else(|err| {
            warn!(error = %err, "Ignoring malformed push payload");
            PushPayload::default()
        });
        self.show(self.push_notification(&payload)).await
    }

    /// React to a click on `notification`. The notification is closed first.
    #[instrument(skip(self, notification), fields(tag = notification.tag().unwrap_or_default()))]
    pub async fn on_click(&self, action: &str, notification: &Notification) -> Result<ClickOutcome> {
        info!(action, "Notification clicked");
        self.presenter.close_notification(notification).await?;
        emit_event(
            self.event_bus.as_ref(),
            AgentEvent::Notification(NotificationEvent::Clicked {
                tag: notification.tag().unwrap_or_default().to_string(),
                action: action.to_string(),
            }),
        );

        match ClickAction::from(action) {
            ClickAction::Open => self.open_app(notification.data()).await,
            ClickAction::Snooze => self.snooze().await.map(ClickOutcome::Snoozed),
            ClickAction::Dismiss => Ok(ClickOutcome::Dismissed),
            ClickAction::Other(other) => {
                debug!(action = %other, "Unknown notification action");
                Ok(ClickOutcome::Dismissed)
            }
        }
    }

    /// Record a notification dismissed without a click.
    pub fn on_close(&self, notification: &Notification) {
        let tag = notification.tag().unwrap_or_default().to_string();
        info!(tag = %tag, "Notification closed");
        emit_event(
            self.event_bus.as_ref(),
            AgentEvent::Notification(NotificationEvent::Closed { tag }),
        );
    }

    async fn open_app(&self, target: Option<&str>) -> Result<ClickOutcome> {
        let windows = self.clients.match_all(ClientType::Window).await?;
        if let Some(window) = windows
            .iter()
            .find(|window| window.focusable && self.policy.is_app_url(&window.url))
        {
            let focused = self.clients.focus(&window.id).await?;
            return Ok(ClickOutcome::Focused(focused));
        }

        let target = target.unwrap_or(&self.settings.default_url);
        let url = self
            .app_origin
            .join(target)
            .map_err(|source| AgentError::InvalidUrl {
                url: target.to_string(),
                source,
            })?;
        let opened = self.clients.open_window(url.as_str()).await?;
        Ok(ClickOutcome::Opened(opened))
    }

    /// Schedule the snooze reminder on the background executor.
    pub async fn snooze(&self) -> Result<TaskId> {
        let executor = self.executor.as_ref().ok_or_else(|| {
            AgentError::Bridge(BridgeError::NotAvailable(
                "No background executor to schedule the snoozed reminder".to_string(),
            ))
        })?;

        let delay = self.settings.snooze_delay();
        let presenter = Arc::clone(&self.presenter);
        let notification = self.snooze_notification();
        let task_id = executor
            .schedule_once(
                &self.settings.snooze_tag,
                delay,
                boxed(async move { presenter.show_notification(notification).await }),
            )
            .await?;

        info!(task = %task_id.as_str(), delay_secs = delay.as_secs(), "Reminder snoozed");
        emit_event(
            self.event_bus.as_ref(),
            AgentEvent::Notification(NotificationEvent::Snoozed {
                task_id: task_id.as_str().to_string(),
                delay_secs: delay.as_secs(),
            }),
        );
        Ok(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::{InMemoryClientRegistry, TracingNotificationPresenter};

    fn reminders(
        presenter: Arc<TracingNotificationPresenter>,
        clients: Arc<InMemoryClientRegistry>,
    ) -> Reminders {
        let origin = Url::parse("https://dreamvault.app/").unwrap();
        Reminders::new(
            ReminderSettings::default(),
            origin.clone(),
            InterceptPolicy::new(&origin, Vec::new()),
            presenter,
            clients,
        )
    }

    #[test]
    fn test_push_payload_parse() {
        assert_eq!(PushPayload::parse(None).unwrap(), PushPayload::default());
        assert_eq!(PushPayload::parse(Some(b"  ")).unwrap(), PushPayload::default());

        let payload = PushPayload::parse(Some(br#"{"title":"X","body":"Y"}"#)).unwrap();
        assert_eq!(payload.title.as_deref(), Some("X"));
        assert_eq!(payload.body.as_deref(), Some("Y"));
        assert!(payload.url.is_none());

        let empty = PushPayload::parse(Some(br#"{"title":"","body":"","url":""}"#)).unwrap();
        assert_eq!(empty, PushPayload::default());

        let mistyped = PushPayload::parse(Some(br#"{"title":"X","body":7,"url":null}"#)).unwrap();
        assert_eq!(mistyped.title.as_deref(), Some("X"));
        assert!(mistyped.body.is_none());
        assert!(mistyped.url.is_none());

        assert_eq!(PushPayload::parse(Some(b"[1,2]")).unwrap(), PushPayload::default());

        assert!(matches!(
            PushPayload::parse(Some(b"not json")),
            Err(AgentError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_click_action_from_str() {
        assert_eq!(ClickAction::from(""), ClickAction::Open);
        assert_eq!(ClickAction::from("open"), ClickAction::Open);
        assert_eq!(ClickAction::from("snooze"), ClickAction::Snooze);
        assert_eq!(ClickAction::from("dismiss"), ClickAction::Dismiss);
        assert_eq!(ClickAction::from("share"), ClickAction::Other("share".to_string()));
    }

    #[test]
    fn test_default_push_notification() {
        let r = reminders(Default::default(), Default::default());
        let n = r.push_notification(&PushPayload::default());

        assert_eq!(n.title, "DreamVault Reminder 🌙");
        assert_eq!(
            n.options.body,
            "Time to record your dreams! What did you dream about last night?"
        );
        assert_eq!(n.tag(), Some("dream-reminder"));
        assert_eq!(n.data(), Some("/"));
        assert!(n.options.require_interaction);
        assert_eq!(n.options.vibrate, vec![200, 100, 200]);
        assert!(!n.options.silent);

        let actions: Vec<_> = n.options.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, vec!["open", "snooze", "dismiss"]);
        assert!(n.options.actions[2].icon.is_none());
    }

    #[test]
    fn test_daily_and_snooze_notifications() {
        let r = reminders(Default::default(), Default::default());

        let daily = r.daily_notification();
        assert_eq!(daily.tag(), Some("daily-reminder"));
        assert!(!daily.options.require_interaction);
        assert_eq!(daily.options.actions[1].title, "Later");

        let snooze = r.snooze_notification();
        assert_eq!(snooze.title, "Dream Reminder 🌙");
        assert_eq!(snooze.tag(), Some("snooze-reminder"));
        assert!(snooze.options.actions.is_empty());
    }

    #[tokio::test]
    async fn test_on_push_with_malformed_data_uses_defaults() {
        let presenter = Arc::new(TracingNotificationPresenter::new());
        let r = reminders(presenter.clone(), Default::default());

        r.on_push(Some(b"{broken")).await.unwrap();

        let shown = presenter.displayed().await;
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "DreamVault Reminder 🌙");
    }

    #[tokio::test]
    async fn test_open_focuses_existing_app_window() {
        let presenter = Arc::new(TracingNotificationPresenter::new());
        let clients = Arc::new(InMemoryClientRegistry::new());
        clients.add_window("https://elsewhere.example/").await;
        let app = clients.add_window("https://dreamvault.app/journal").await;
        let r = reminders(presenter.clone(), clients.clone());

        let notification = r.push_notification(&PushPayload::default());
        presenter.show_notification(notification.clone()).await.unwrap();

        let outcome = r.on_click("", &notification).await.unwrap();
        match outcome {
            ClickOutcome::Focused(window) => assert_eq!(window.id, app.id),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(presenter.displayed().await.is_empty());
        assert_eq!(clients.windows().await.len(), 2);
    }

    #[tokio::test]
    async fn test_open_without_window_opens_target() {
        let clients = Arc::new(InMemoryClientRegistry::new());
        let r = reminders(Default::default(), clients.clone());
        let payload = PushPayload {
            url: Some("/dreams/new".to_string()),
            ..PushPayload::default()
        };

        let outcome = r.on_click("open", &r.push_notification(&payload)).await.unwrap();
        match outcome {
            ClickOutcome::Opened(Some(window)) => {
                assert_eq!(window.url, "https://dreamvault.app/dreams/new")
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dismiss_only_closes() {
        let presenter = Arc::new(TracingNotificationPresenter::new());
        let clients = Arc::new(InMemoryClientRegistry::new());
        let r = reminders(presenter.clone(), clients.clone());
        let notification = r.push_notification(&PushPayload::default());
        presenter.show_notification(notification.clone()).await.unwrap();

        assert_eq!(
            r.on_click("dismiss", &notification).await.unwrap(),
            ClickOutcome::Dismissed
        );
        assert!(presenter.displayed().await.is_empty());
        assert!(clients.windows().await.is_empty());
    }

    #[tokio::test]
    async fn test_click_closes_untagged_notification() {
        let presenter = Arc::new(TracingNotificationPresenter::new());
        let r = reminders(presenter.clone(), Default::default());
        let mut notification = r.push_notification(&PushPayload::default());
        notification.options.tag = None;
        presenter.show_notification(notification.clone()).await.unwrap();

        r.on_click("dismiss", &notification).await.unwrap();

        assert!(presenter.displayed().await.is_empty());
    }

    #[tokio::test]
    async fn test_snooze_without_executor_fails() {
        let r = reminders(Default::default(), Default::default());
        let err = r.snooze().await.unwrap_err();
        assert!(matches!(err, AgentError::Bridge(BridgeError::NotAvailable(_))));
    }
}
