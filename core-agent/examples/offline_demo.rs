//! Offline agent walkthrough
//!
//! Installs the agent against a live origin, then replays the events a
//! browser would deliver: page fetches online and offline, a push message and
//! clicks on the resulting reminder.
//!
//! Run with:
//! ```bash
//! cargo run -p core-agent --features desktop-shims --example offline_demo -- https://dreamvault.app
//!
//! # JSON logs
//! cargo run -p core-agent --features desktop-shims --example offline_demo -- https://dreamvault.app json
//! ```

use bridge_traits::time::{ConsoleLogger, LogLevel};
use bridge_traits::FetchRequest;
use bytes::Bytes;
use core_agent::{EventResponse, OfflineCacheAgent, WorkerEvent};
use core_runtime::config::{AgentConfig, AgentSettings};
use core_runtime::events::{EventBus, EventSeverity, EventStream};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::env;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let origin = args.get(1).cloned().unwrap_or_else(|| "http://localhost:8080".to_string());
    let format = match args.get(2).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug)
            .with_logger_sink(Arc::new(ConsoleLogger {
                min_level: LogLevel::Warn,
            })),
    )?;

    let bus = Arc::new(EventBus::new(128));
    let mut events =
        EventStream::new(bus.subscribe()).filter(|event| event.severity() >= EventSeverity::Info);
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(severity = ?event.severity(), "{}", event.description());
        }
    });

    let config = AgentConfig::builder()
        .settings(AgentSettings::for_origin(&origin)?)
        .build()?;
    let agent = OfflineCacheAgent::with_event_bus(config, bus)?;

    info!(origin = %origin, "=== Install & activate ===");
    if agent.dispatch(WorkerEvent::Install).await.is_failed() {
        warn!("Install failed; is the origin reachable?");
        return Ok(());
    }
    agent.dispatch(WorkerEvent::Activate).await;

    info!("=== Fetch ===");
    let home = format!("{}/", origin.trim_end_matches('/'));
    report(&agent, FetchRequest::navigate(home.as_str())).await;
    report(&agent, FetchRequest::get(format!("{}manifest.json", home))).await;
    report(&agent, FetchRequest::get("https://example.com/not-allowed.js")).await;

    info!("=== Push & click ===");
    agent
        .dispatch(WorkerEvent::Push {
            data: Some(Bytes::from_static(
                br#"{"title":"Morning check-in","body":"What did you dream about?","url":"/journal"}"#,
            )),
        })
        .await;
    let reminder = agent.reminders().push_notification(&Default::default());
    agent
        .dispatch(WorkerEvent::NotificationClick {
            action: "open".to_string(),
            notification: reminder,
        })
        .await;

    info!("=== Periodic reminder ===");
    agent
        .dispatch(WorkerEvent::PeriodicSync {
            tag: "dream-reminder".to_string(),
        })
        .await;

    info!(state = %agent.state().await, "=== Demo complete ===");
    Ok(())
}

async fn report(agent: &OfflineCacheAgent, request: FetchRequest) {
    let url = request.url.clone();
    match agent.dispatch(WorkerEvent::Fetch(request)).await {
        EventResponse::Respond { response, source } => {
            info!(url = %url, status = response.status, source = ?source, "Answered by agent");
        }
        EventResponse::Passthrough => info!(url = %url, "Left to the network"),
        other => warn!(url = %url, response = ?other, "Unexpected fetch outcome"),
    }
}
