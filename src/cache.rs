use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::config::TenantKey;
use crate::trend::TrendSeries;

#[derive(Debug, Clone)]
struct CacheEntry {
    series: Arc<TrendSeries>,
    cached_on: NaiveDate,
}

/// Per-tenant trend cache, invalidated purely at calendar-day
/// boundaries: the trend aggregation is expensive (dozens of paginated
/// counts) and only needs to reflect "as of today". No TTL countdown,
/// no background refresh; a stale entry is replaced synchronously by
/// the caller. The store is passed into the aggregation service
/// explicitly; there is no ambient global state.
#[derive(Debug, Default)]
pub struct TrendCache {
    entries: Mutex<HashMap<TenantKey, CacheEntry>>,
}

impl TrendCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached series, only if it was stored on `today`. Same-day
    /// callers share one `Arc`.
    pub async fn get_if_fresh(&self, key: TenantKey, today: NaiveDate) -> Option<Arc<TrendSeries>> {
        let entries = self.entries.lock().await;
        entries
            .get(&key)
            .filter(|entry| entry.cached_on == today)
            .map(|entry| Arc::clone(&entry.series))
    }

    /// The cached series regardless of age: the fallback policy prefers
    /// yesterday's real data over synthetic data.
    pub async fn last_known(&self, key: TenantKey) -> Option<Arc<TrendSeries>> {
        let entries = self.entries.lock().await;
        entries.get(&key).map(|entry| Arc::clone(&entry.series))
    }

    /// Store a freshly built series, replacing any previous entry.
    pub async fn store(
        &self,
        key: TenantKey,
        series: TrendSeries,
        today: NaiveDate,
    ) -> Arc<TrendSeries> {
        let series = Arc::new(series);
        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            CacheEntry {
                series: Arc::clone(&series),
                cached_on: today,
            },
        );
        series
    }
}
