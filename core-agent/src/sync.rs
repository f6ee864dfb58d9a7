//! # Background Sync Jobs
//!
//! Work triggered by one-off and periodic sync events. There is no backend to
//! talk to yet, so the dream store and the content refresh are no-ops that
//! report empty results.

use core_runtime::config::SyncTags;
use serde_json::Value;
use tracing::{debug, info};

/// Job selected by a sync tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncJob {
    /// Upload dreams recorded while offline
    Dreams,
    /// Refresh cached content and look for updates
    ContentRefresh,
    /// Nudge the user if nothing was recorded today
    DailyReminder,
}

impl SyncJob {
    /// Job for a one-off `sync` event tag.
    pub fn for_sync_tag(tag: &str, tags: &SyncTags) -> Option<Self> {
        if tag == tags.background_sync {
            Some(SyncJob::Dreams)
        } else if tag == tags.content_refresh {
            Some(SyncJob::ContentRefresh)
        } else {
            None
        }
    }

    /// Job for a `periodicsync` event tag.
    pub fn for_periodic_tag(tag: &str, tags: &SyncTags) -> Option<Self> {
        (tag == tags.daily_reminder).then_some(SyncJob::DailyReminder)
    }
}

/// Outcome of a sync job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub items_synced: u64,
    /// Whether a reminder was shown
    pub reminded: bool,
}

/// Dreams saved offline and not yet uploaded.
///
/// Offline storage is not implemented, so there is never anything pending.
#[derive(Debug, Default)]
pub struct OfflineDreamStore;

impl OfflineDreamStore {
    pub async fn pending(&self) -> Vec<Value> {
        Vec::new()
    }

    pub async fn clear(&self) {
        debug!("Clearing offline dreams");
    }

    pub async fn has_recorded_today(&self) -> bool {
        false
    }
}

/// Upload pending dreams, then clear them.
pub async fn sync_dreams(store: &OfflineDreamStore) -> SyncReport {
    info!("Syncing dreams in background");
    let pending = store.pending().await;

    if !pending.is_empty() {
        info!(count = pending.len(), "Found offline dreams to sync");
        for dream in &pending {
            debug!(
                title = crate::messages::dream_title(dream).unwrap_or_default(),
                "Would sync dream"
            );
        }
        store.clear().await;
    }

    info!("Dream sync completed");
    SyncReport {
        items_synced: pending.len() as u64,
        reminded: false,
    }
}

/// Refresh cached content and check for new versions.
pub async fn refresh_content() -> SyncReport {
    info!("Performing periodic sync");
    debug!("Updating cached content");
    debug!("Checking for updates");
    info!("Periodic sync completed");
    SyncReport::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_resolution() {
        let tags = SyncTags::default();

        assert_eq!(
            SyncJob::for_sync_tag("background-sync-dreams", &tags),
            Some(SyncJob::Dreams)
        );
        assert_eq!(
            SyncJob::for_sync_tag("periodic-sync", &tags),
            Some(SyncJob::ContentRefresh)
        );
        assert_eq!(SyncJob::for_sync_tag("dream-reminder", &tags), None);
        assert_eq!(
            SyncJob::for_periodic_tag("dream-reminder", &tags),
            Some(SyncJob::DailyReminder)
        );
        assert_eq!(SyncJob::for_periodic_tag("background-sync-dreams", &tags), None);
    }

    #[tokio::test]
    async fn test_stubs_report_nothing() {
        let store = OfflineDreamStore;
        assert_eq!(sync_dreams(&store).await, SyncReport::default());
        assert_eq!(refresh_content().await, SyncReport::default());
        assert!(!store.has_recorded_today().await);
    }
}
