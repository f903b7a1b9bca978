use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;
use tracing::debug;

/// Entrées conservées au plus, expirées ou non.
pub const DEFAULT_CAPACITY: u64 = 256;

/// Cache clé → valeur avec expiration. Les clés sont des empreintes d'historique.
pub trait ResultCache<V> {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: String, value: V, ttl: Duration);
    fn invalidate(&self, key: &str);
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct Timed<V> {
    value: V,
    ttl: Duration,
}

/// Durée de vie propre à chaque entrée, renouvelée à l'écrasement.
struct PerEntryTtl;

impl<V> Expiry<String, Timed<V>> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Timed<V>, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Timed<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Cache mémoire borné ; les entrées expirées sont purgées par moka.
pub struct InMemoryTtlCache<V> {
    inner: Cache<String, Timed<V>>,
}

impl<V> InMemoryTtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    /// Nombre d'entrées vivantes après la maintenance en attente.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for InMemoryTtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResultCache<V> for InMemoryTtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> Option<V> {
        let hit = self.inner.get(key).map(|entry| entry.value);
        if hit.is_some() {
            debug!(key, "cache hit");
        }
        hit
    }

    fn set(&self, key: String, value: V, ttl: Duration) {
        self.inner.insert(key, Timed { value, ttl });
    }

    fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }

    fn clear(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn test_hit_before_expiry() {
        let cache = InMemoryTtlCache::new();
        cache.set("a".to_string(), 42u32, Duration::from_secs(600));
        assert_eq!(cache.get("a"), Some(42));
    }

    #[test]
    fn test_miss_after_expiry() {
        let cache = InMemoryTtlCache::new();
        cache.set("a".to_string(), 42u32, SHORT);
        sleep(SHORT * 4);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let cache = InMemoryTtlCache::with_capacity(10_000);
        for i in 0..200u32 {
            cache.set(format!("k{i}"), i, SHORT);
        }
        sleep(SHORT * 4);
        cache.set("fresh".to_string(), 0, Duration::from_secs(600));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(0));
    }

    #[test]
    fn test_ttl_is_per_entry() {
        let cache = InMemoryTtlCache::new();
        cache.set("court".to_string(), 1u8, SHORT);
        cache.set("long".to_string(), 2u8, Duration::from_secs(600));
        sleep(SHORT * 4);
        assert_eq!(cache.get("court"), None);
        assert_eq!(cache.get("long"), Some(2));
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = InMemoryTtlCache::with_capacity(8);
        for i in 0..100u32 {
            cache.set(format!("k{i}"), i, Duration::from_secs(600));
        }
        assert!(cache.len() <= 8);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache: InMemoryTtlCache<&'static str> = InMemoryTtlCache::new();
        cache.set("a".to_string(), "x", Duration::from_secs(60));
        cache.set("b".to_string(), "y", Duration::from_secs(60));
        cache.invalidate("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some("y"));
        cache.clear();
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_overwrite_refreshes_value() {
        let cache = InMemoryTtlCache::new();
        cache.set("k".to_string(), 1u8, Duration::from_secs(60));
        cache.set("k".to_string(), 2u8, Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(2));
    }
}
