//! Install and activate behaviour.

mod common;

use bridge_traits::{CacheStorage, FetchRequest, HttpResponse};
use common::{app_url, Harness};
use core_agent::{AgentError, AgentState, EventResponse, WorkerEvent};
use core_runtime::events::{AgentEvent, LifecycleEvent};

#[tokio::test]
async fn install_caches_exactly_the_static_assets() {
    let harness = Harness::new();
    harness.serve_static_assets();
    let agent = harness.agent();

    let count = agent.install().await.unwrap();

    assert_eq!(count, 6);
    let cached: Vec<String> = harness
        .storage
        .entries("dreamvault-v2.0")
        .await
        .unwrap()
        .into_iter()
        .map(|key| key.url)
        .collect();
    assert_eq!(cached, harness.asset_urls());
    assert_eq!(harness.registration.skip_waiting_requests(), 1);
    assert_eq!(agent.state().await, AgentState::Installed);
}

#[tokio::test]
async fn install_failure_leaves_nothing_and_is_terminal() {
    let harness = Harness::new();
    harness.serve_static_assets();
    harness.http.route(
        "https://cdn.tailwindcss.com/",
        HttpResponse::new(500, "boom"),
    );
    let mut events = harness.bus.subscribe();
    let agent = harness.agent();

    let err = agent.install().await.unwrap_err();

    assert!(matches!(err, AgentError::InstallFailed(_)));
    assert!(harness.storage.entries("dreamvault-v2.0").await.unwrap().is_empty());
    assert_eq!(harness.registration.skip_waiting_requests(), 0);
    assert_eq!(agent.state().await, AgentState::Redundant);

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, AgentEvent::Lifecycle(LifecycleEvent::InstallFailed { .. })) {
            saw_failure = true;
        }
    }
    assert!(saw_failure);
}

#[tokio::test]
async fn install_fails_when_offline() {
    let harness = Harness::new();
    let agent = harness.agent();

    let response = agent.dispatch(WorkerEvent::Install).await;

    assert!(response.is_failed());
    assert_eq!(agent.state().await, AgentState::Redundant);
}

#[tokio::test]
async fn activate_purges_other_buckets_then_claims() {
    let harness = Harness::new();
    let stale = FetchRequest::get(app_url("/old.js"));
    harness
        .storage
        .put("dreamvault-v1.0", &stale, HttpResponse::new(200, "old"))
        .await
        .unwrap();
    harness.storage.open("unrelated").await.unwrap();
    harness.serve_static_assets();
    let agent = harness.agent();

    agent.install().await.unwrap();
    let purged = agent.activate().await.unwrap();

    assert_eq!(purged, vec!["dreamvault-v1.0", "unrelated"]);
    assert_eq!(harness.storage.keys().await.unwrap(), vec!["dreamvault-v2.0"]);
    assert!(harness.clients.is_claimed());
    assert_eq!(agent.state().await, AgentState::Active);
}

#[tokio::test]
async fn activate_before_install_is_rejected() {
    let harness = Harness::new();
    let agent = harness.agent();

    let response = agent.dispatch(WorkerEvent::Activate).await;

    assert!(matches!(response, EventResponse::Failed(message) if message.contains("activate")));
    assert!(!harness.clients.is_claimed());
    assert_eq!(agent.state().await, AgentState::Parsed);
}

#[tokio::test]
async fn fetch_passes_through_until_active() {
    let harness = Harness::new();
    harness.serve_static_assets();
    let agent = harness.agent();
    agent.install().await.unwrap();
    harness.http.reset_calls();

    let response = agent
        .dispatch(WorkerEvent::Fetch(FetchRequest::get(app_url("/index.html"))))
        .await;

    assert_eq!(response, EventResponse::Passthrough);
    assert!(harness.http.calls().is_empty());
}

#[tokio::test]
async fn lifecycle_events_are_published_in_order() {
    let harness = Harness::new();
    let mut events = harness.bus.subscribe();
    let _agent = harness.active_agent().await;

    let mut transitions = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let AgentEvent::Lifecycle(LifecycleEvent::StateChanged { to, .. }) = event {
            transitions.push(to);
        }
    }
    assert_eq!(
        transitions,
        vec!["installing", "installed", "activating", "active"]
    );
}
