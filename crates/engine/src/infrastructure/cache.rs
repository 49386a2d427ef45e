//! TTL-based cache for reference data.
//!
//! Reference data never changes while the application runs, so lookups are
//! kept for the configured TTL instead of hitting the network again.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    ApiReference, ClassDetails, EquipmentDetails, ReferenceDataPort,
};

/// A thread-safe cache with time-to-live expiration.
///
/// Entries expire after the configured TTL and are evicted on the next insert.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, TtlEntry<V>>>,
    ttl: Duration,
}

struct TtlEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert a value, replacing any existing entry and resetting the TTL.
    pub async fn insert(&self, key: K, value: V) {
        let entry = TtlEntry {
            value,
            inserted_at: Instant::now(),
        };
        let mut guard = self.entries.write().await;
        guard.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        guard.insert(key, entry);
    }

    /// Insert a value with an explicit timestamp (tests only).
    #[cfg(test)]
    pub async fn insert_at(&self, key: K, value: V, inserted_at: Instant) {
        let entry = TtlEntry { value, inserted_at };
        self.entries.write().await.insert(key, entry);
    }

    /// Get a value if it exists and hasn't expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.entries.read().await;
        guard.get(key).and_then(|entry| {
            if entry.inserted_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Caching decorator over any [`ReferenceDataPort`].
///
/// Empty results are not cached: they usually mean the API was unreachable,
/// and the next lookup should try again.
pub struct CachedReferenceData {
    inner: Arc<dyn ReferenceDataPort>,
    lists: TtlCache<String, Vec<ApiReference>>,
    features: TtlCache<(String, u8), Vec<String>>,
    classes: TtlCache<String, ClassDetails>,
    equipment: TtlCache<String, EquipmentDetails>,
}

impl CachedReferenceData {
    pub fn new(inner: Arc<dyn ReferenceDataPort>, ttl: Duration) -> Self {
        Self {
            inner,
            lists: TtlCache::new(ttl),
            features: TtlCache::new(ttl),
            classes: TtlCache::new(ttl),
            equipment: TtlCache::new(ttl),
        }
    }

    async fn cached_list<F, Fut>(&self, key: String, fetch: F) -> Vec<ApiReference>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Vec<ApiReference>>,
    {
        if let Some(hit) = self.lists.get(&key).await {
            tracing::debug!(key = %key, "Reference list cache hit");
            return hit;
        }
        let fetched = fetch().await;
        if !fetched.is_empty() {
            self.lists.insert(key, fetched.clone()).await;
        }
        fetched
    }
}

#[async_trait]
impl ReferenceDataPort for CachedReferenceData {
    async fn list_races(&self) -> Vec<ApiReference> {
        self.cached_list("races".to_string(), || self.inner.list_races())
            .await
    }

    async fn list_classes(&self) -> Vec<ApiReference> {
        self.cached_list("classes".to_string(), || self.inner.list_classes())
            .await
    }

    async fn list_subclasses(&self, class_index: &str) -> Vec<ApiReference> {
        self.cached_list(format!("subclasses/{}", class_index), || {
            self.inner.list_subclasses(class_index)
        })
        .await
    }

    async fn list_equipment(&self) -> Vec<ApiReference> {
        self.cached_list("equipment".to_string(), || self.inner.list_equipment())
            .await
    }

    async fn class_details(&self, class_index: &str) -> Option<ClassDetails> {
        let key = class_index.to_string();
        if let Some(hit) = self.classes.get(&key).await {
            return Some(hit);
        }
        let details = self.inner.class_details(class_index).await?;
        self.classes.insert(key, details.clone()).await;
        Some(details)
    }

    async fn class_level_features(&self, class_index: &str, level: u8) -> Vec<String> {
        let key = (class_index.to_string(), level);
        if let Some(hit) = self.features.get(&key).await {
            return hit;
        }
        let features = self.inner.class_level_features(class_index, level).await;
        if !features.is_empty() {
            self.features.insert(key, features.clone()).await;
        }
        features
    }

    async fn equipment_details(&self, index: &str) -> Option<EquipmentDetails> {
        let key = index.to_string();
        if let Some(hit) = self.equipment.get(&key).await {
            return Some(hit);
        }
        let details = self.inner.equipment_details(index).await?;
        self.equipment.insert(key, details.clone()).await;
        Some(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockReferenceDataPort;

    #[tokio::test]
    async fn insert_and_get() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("key".to_string(), 42).await;
        assert_eq!(cache.get(&"key".to_string()).await, Some(42));
        assert_eq!(cache.get(&"missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn expired_entries_not_returned() {
        let ttl = Duration::from_millis(10);
        let cache: TtlCache<String, i32> = TtlCache::new(ttl);
        let expired_at = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at("key".to_string(), 42, expired_at).await;

        assert_eq!(cache.get(&"key".to_string()).await, None);
    }

    #[tokio::test]
    async fn insert_evicts_expired() {
        let ttl = Duration::from_secs(60);
        let cache: TtlCache<String, i32> = TtlCache::new(ttl);
        let expired_at = Instant::now() - (ttl + Duration::from_secs(1));
        cache.insert_at("key1".to_string(), 1, expired_at).await;
        assert_eq!(cache.len().await, 1);
        cache.insert("key2".to_string(), 2).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"key2".to_string()).await, Some(2));
    }

    #[tokio::test]
    async fn repeated_lookups_hit_inner_once() {
        let mut inner = MockReferenceDataPort::new();
        inner
            .expect_list_classes()
            .times(1)
            .returning(|| vec![ApiReference::new("wizard", "Wizard")]);
        inner
            .expect_class_level_features()
            .withf(|class, level| class == "wizard" && *level == 4)
            .times(1)
            .returning(|_, _| vec!["Ability Score Improvement".to_string()]);

        let cached = CachedReferenceData::new(Arc::new(inner), Duration::from_secs(60));
        for _ in 0..3 {
            assert_eq!(cached.list_classes().await.len(), 1);
            assert_eq!(cached.class_level_features("wizard", 4).await.len(), 1);
        }
    }

    #[tokio::test]
    async fn empty_results_are_retried() {
        let mut inner = MockReferenceDataPort::new();
        inner.expect_list_races().times(2).returning(Vec::new);

        let cached = CachedReferenceData::new(Arc::new(inner), Duration::from_secs(60));
        assert!(cached.list_races().await.is_empty());
        assert!(cached.list_races().await.is_empty());
    }
}
