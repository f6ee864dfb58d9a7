//! Messages posted to the agent by application pages.

use crate::error::{AgentError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recognised page → agent message, keyed by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Activate the waiting agent immediately
    SkipWaiting,
    /// Keep a dream for later sync
    CacheDream { dream: Value },
    /// Schedule a reminder at `time`. A missing time decodes as `null`.
    ScheduleReminder {
        #[serde(default)]
        time: Value,
    },
}

impl ClientMessage {
    const KINDS: [&'static str; 3] = ["SKIP_WAITING", "CACHE_DREAM", "SCHEDULE_REMINDER"];

    /// Decode a message.
    ///
    /// Returns `Ok(None)` for data without a recognised `type`; those messages
    /// are ignored. A recognised type with a malformed body is an error.
    pub fn parse(data: &Value) -> Result<Option<Self>> {
        let Some(kind) = data.get("type").and_then(Value::as_str) else {
            return Ok(None);
        };
        if !Self::KINDS.contains(&kind) {
            return Ok(None);
        }
        serde_json::from_value(data.clone())
            .map(Some)
            .map_err(|e| AgentError::InvalidPayload(format!("{} message: {}", kind, e)))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::SkipWaiting => Self::KINDS[0],
            ClientMessage::CacheDream { .. } => Self::KINDS[1],
            ClientMessage::ScheduleReminder { .. } => Self::KINDS[2],
        }
    }
}

/// Title of a dream payload, if it has one.
pub fn dream_title(dream: &Value) -> Option<&str> {
    dream.get("title").and_then(Value::as_str)
}

/// Reminder time as an instant, accepting RFC 3339 strings or epoch milliseconds.
pub fn reminder_time(time: &Value) -> Option<DateTime<Utc>> {
    match time {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        Value::Number(millis) => millis.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_known_messages() {
        assert_eq!(
            ClientMessage::parse(&json!({"type": "SKIP_WAITING"})).unwrap(),
            Some(ClientMessage::SkipWaiting)
        );

        let message = ClientMessage::parse(&json!({
            "type": "CACHE_DREAM",
            "dream": {"title": "Flying over the sea", "mood": "calm"}
        }))
        .unwrap()
        .unwrap();
        assert_eq!(message.kind(), "CACHE_DREAM");
        match message {
            ClientMessage::CacheDream { dream } => {
                assert_eq!(dream_title(&dream), Some("Flying over the sea"))
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_or_untyped_messages_are_ignored() {
        assert_eq!(ClientMessage::parse(&json!({"type": "PING"})).unwrap(), None);
        assert_eq!(ClientMessage::parse(&json!({"hello": 1})).unwrap(), None);
        assert_eq!(ClientMessage::parse(&Value::Null).unwrap(), None);
        assert_eq!(ClientMessage::parse(&json!("SKIP_WAITING")).unwrap(), None);
    }

    #[test]
    fn test_known_type_with_missing_body_is_error() {
        let err = ClientMessage::parse(&json!({"type": "CACHE_DREAM"})).unwrap_err();
        assert!(err.to_string().contains("CACHE_DREAM"));
    }

    #[test]
    fn test_schedule_reminder_without_time() {
        let message = ClientMessage::parse(&json!({"type": "SCHEDULE_REMINDER"}))
            .unwrap()
            .unwrap();
        assert_eq!(message, ClientMessage::ScheduleReminder { time: Value::Null });
        assert!(reminder_time(&Value::Null).is_none());
    }

    #[test]
    fn test_reminder_time() {
        let rfc = reminder_time(&json!("2026-10-18T07:30:00Z")).unwrap();
        assert_eq!(rfc.timestamp(), 1_792_308_600);

        let millis = reminder_time(&json!(1_792_308_600_000_i64)).unwrap();
        assert_eq!(millis, rfc);

        assert!(reminder_time(&json!("07:30")).is_none());
        assert!(reminder_time(&json!(true)).is_none());
    }
}
