//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::logging::{redact_if_sensitive, redact_url, LogFormat, LoggingConfig};

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.redact_pii);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());

    #[cfg(debug_assertions)]
    assert_eq!(config.format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(config.format, LogFormat::Json);
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_pii_redaction(false)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_pii);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[test]
fn test_push_subscription_fields_redacted() {
    assert_eq!(
        redact_if_sensitive("endpoint", "https://fcm.googleapis.com/fcm/send/abc"),
        "[REDACTED]"
    );
    assert_eq!(redact_if_sensitive("auth", "k3y"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("p256dh", "BPub"), "[REDACTED]");
}

#[test]
fn test_request_urls_lose_query() {
    assert_eq!(
        redact_if_sensitive("url", "https://dreamvault.app/dreams?title=falling"),
        "https://dreamvault.app/dreams"
    );
    assert_eq!(
        redact_url("https://images.unsplash.com/photo-1?ixlib=rb&w=800#x"),
        "https://images.unsplash.com/photo-1"
    );
}

#[test]
fn test_plain_values_pass_through() {
    assert_eq!(redact_if_sensitive("tag", "background-sync-dreams"), "background-sync-dreams");
    assert_eq!(redact_if_sensitive("cache", "dreamvault-v2.0"), "dreamvault-v2.0");
    assert_eq!(redact_if_sensitive("status", "503"), "503");
}

#[test]
fn test_init_logging_twice_fails() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_filter("core_runtime=debug");

    // Only the first global subscriber wins.
    let first = core_runtime::logging::init_logging(config.clone());
    let second = core_runtime::logging::init_logging(config);
    assert!(first.is_ok());
    assert!(second.is_err());
}
