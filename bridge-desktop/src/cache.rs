//! In-memory Cache Storage Implementation

use async_trait::async_trait;
use bridge_traits::{
    cache::{CacheKey, CacheStorage},
    error::{BridgeError, Result},
    http::{FetchRequest, HttpResponse},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Bucket {
    name: String,
    entries: Vec<(CacheKey, HttpResponse)>,
}

impl Bucket {
    fn lookup(&self, key: &CacheKey) -> Option<&HttpResponse> {
        self.entries
            .iter()
            .find(|(stored, _)| stored == key)
            .map(|(_, response)| response)
    }

    fn insert(&mut self, key: CacheKey, response: HttpResponse) {
        match self.entries.iter_mut().find(|(stored, _)| *stored == key) {
            Some(slot) => slot.1 = response,
            None => self.entries.push((key, response)),
        }
    }
}

/// Process-local [`CacheStorage`]
///
/// Buckets and entries keep insertion order. Cloning shares the same storage.
#[derive(Clone, Default)]
pub struct MemoryCacheStorage {
    buckets: Arc<RwLock<Vec<Bucket>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<()> {
        let mut buckets = self.buckets.write().await;
        if !buckets.iter().any(|bucket| bucket.name == name) {
            debug!(bucket = name, "Creating cache bucket");
            buckets.push(Bucket {
                name: name.to_string(),
                entries: Vec::new(),
            });
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> Result<bool> {
        let buckets = self.buckets.read().await;
        Ok(buckets.iter().any(|bucket| bucket.name == name))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let buckets = self.buckets.read().await;
        Ok(buckets.iter().map(|bucket| bucket.name.clone()).collect())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|bucket| bucket.name != name);
        Ok(buckets.len() != before)
    }

    async fn match_request(&self, request: &FetchRequest) -> Result<Option<HttpResponse>> {
        let key = CacheKey::from(request);
        let buckets = self.buckets.read().await;
        Ok(buckets
            .iter()
            .find_map(|bucket| bucket.lookup(&key))
            .cloned())
    }

    async fn match_in(
        &self,
        name: &str,
        request: &FetchRequest,
    ) -> Result<Option<HttpResponse>> {
        let key = CacheKey::from(request);
        let buckets = self.buckets.read().await;
        Ok(buckets
            .iter()
            .find(|bucket| bucket.name == name)
            .and_then(|bucket| bucket.lookup(&key))
            .cloned())
    }

    async fn put(
        &self,
        name: &str,
        request: &FetchRequest,
        response: HttpResponse,
    ) -> Result<()> {
        let key = CacheKey::from(request);
        if !key.is_cacheable() {
            return Err(BridgeError::Cache(format!(
                "Request method {} is unsupported",
                key.method
            )));
        }

        let mut buckets = self.buckets.write().await;
        let index = match buckets.iter().position(|bucket| bucket.name == name) {
            Some(index) => index,
            None => {
                buckets.push(Bucket {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                buckets.len() - 1
            }
        };
        buckets[index].insert(key, response);
        Ok(())
    }

    async fn entries(&self, name: &str) -> Result<Vec<CacheKey>> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .iter()
            .find(|bucket| bucket.name == name)
            .map(|bucket| bucket.entries.iter().map(|(key, _)| key.clone()).collect())
            .unwrap_or_default())
    }
}
