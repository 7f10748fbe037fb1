use rust_decimal::Decimal;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: Decimal,
    stored_at: Instant,
}

/// Shared USD price cache with a fixed time-to-live.
///
/// Lookups and writes never hold the lock across a fetch, so two callers
/// missing the same mint may both fetch it; the later write wins.
#[derive(Debug, Clone)]
pub struct PriceCache {
    entries: Arc<RwLock<HashMap<String, CachedPrice>>>,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CachedPrice, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.ttl
    }

    /// Drop expired entries. Runs on every write so the map stays bounded
    /// by the mints seen within one TTL.
    fn evict_expired(&self, entries: &mut HashMap<String, CachedPrice>, now: Instant) {
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("Price cache: evicted {} expired entries", evicted);
        }
    }

    pub async fn get(&self, mint: &str) -> Option<Decimal> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(mint)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.price)
    }

    /// Split `mints` into fresh cached prices and the mints still to fetch.
    pub async fn partition(&self, mints: &[String]) -> (HashMap<String, Decimal>, Vec<String>) {
        let now = Instant::now();
        let entries = self.entries.read().await;

        let mut hits = HashMap::new();
        let mut misses = Vec::new();
        for mint in mints {
            match entries.get(mint).filter(|entry| self.is_fresh(entry, now)) {
                Some(entry) => {
                    hits.insert(mint.clone(), entry.price);
                }
                None => misses.push(mint.clone()),
            }
        }

        debug!("Price cache: {} hits, {} misses", hits.len(), misses.len());
        (hits, misses)
    }

    pub async fn insert(&self, mint: impl Into<String>, price: Decimal) {
        let stored_at = Instant::now();
        let mut entries = self.entries.write().await;
        self.evict_expired(&mut entries, stored_at);
        entries.insert(mint.into(), CachedPrice { price, stored_at });
    }

    pub async fn insert_many(&self, prices: &HashMap<String, Decimal>) {
        let stored_at = Instant::now();
        let mut entries = self.entries.write().await;
        self.evict_expired(&mut entries, stored_at);
        for (mint, price) in prices {
            entries.insert(
                mint.clone(),
                CachedPrice {
                    price: *price,
                    stored_at,
                },
            );
        }
    }

    /// Cached price for `mint`, or the result of `fetch` stored and returned.
    pub async fn get_or_fetch<F, Fut>(&self, mint: &str, fetch: F) -> Decimal
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Decimal>,
    {
        if let Some(price) = self.get(mint).await {
            return price;
        }

        let price = fetch().await;
        self.insert(mint, price).await;
        price
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
