//! Events delivered to the agent by its host.

use crate::fetch::ResponseSource;
use bridge_traits::{FetchRequest, HttpResponse, Notification};
use bytes::Bytes;
use serde_json::Value;

/// Every event the agent reacts to.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(FetchRequest),
    /// One-off background sync
    Sync { tag: String },
    PeriodicSync { tag: String },
    /// Push message with optional JSON data
    Push { data: Option<Bytes> },
    /// `action` is empty when the notification body was clicked
    NotificationClick {
        action: String,
        notification: Notification,
    },
    NotificationClose { notification: Notification },
    /// Message posted by a page
    Message { data: Value },
    /// Uncaught error in the host scope
    Error { message: String },
    UnhandledRejection { reason: String },
}

impl WorkerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerEvent::Install => "install",
            WorkerEvent::Activate => "activate",
            WorkerEvent::Fetch(_) => "fetch",
            WorkerEvent::Sync { .. } => "sync",
            WorkerEvent::PeriodicSync { .. } => "periodicsync",
            WorkerEvent::Push { .. } => "push",
            WorkerEvent::NotificationClick { .. } => "notificationclick",
            WorkerEvent::NotificationClose { .. } => "notificationclose",
            WorkerEvent::Message { .. } => "message",
            WorkerEvent::Error { .. } => "error",
            WorkerEvent::UnhandledRejection { .. } => "unhandledrejection",
        }
    }
}

/// What the host should do once an event has been handled.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResponse {
    /// Nothing further to do
    Done,
    /// Answer the fetch with this response
    Respond {
        response: HttpResponse,
        source: ResponseSource,
    },
    /// Let the fetch go to the network untouched
    Passthrough,
    /// The handler failed; the error was logged
    Failed(String),
}

impl EventResponse {
    pub fn is_failed(&self) -> bool {
        matches!(self, EventResponse::Failed(_))
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            EventResponse::Respond { response, .. } => Some(response),
            _ => None,
        }
    }
}
