//! Per-tenant aggregation pipeline and the single place where the
//! fallback policy is applied. Everything below this boundary returns
//! typed `Result`s; everything above it always gets a structurally
//! valid response.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

use crate::cache::TrendCache;
use crate::calendar::format_business_duration;
use crate::client::{count_issues, fetch_issues, Issue, SearchApi};
use crate::config::TenantConfig;
use crate::error::Result;
use crate::fallback;
use crate::metrics::{self, ProductMetrics};
use crate::query::bounds::day_bounds;
use crate::query::filter::{Filter, StatusCategory};
use crate::trend::{build_trend, TrendSeries};

/// Most-recent open issues fetched for display.
const DISPLAY_BATCH: usize = 100;

/// Cap on the resolved-issue batch feeding the SLA/lifetime analyzers.
const RESOLVED_BATCH: usize = 500;

/// Resolution window for the analyzers.
const RESOLVED_WINDOW_DAYS: i64 = 30;

const DISPLAY_FIELDS: &[&str] = &["summary", "status", "priority", "created"];

/// Run the full metrics pipeline for one tenant. The five fetches run
/// concurrently; each failure degrades only its own slice of the
/// response.
pub async fn tenant_metrics<A: SearchApi>(
    api: &A,
    config: &TenantConfig,
    cache: &TrendCache,
    now: DateTime<Utc>,
) -> ProductMetrics {
    let today = now.with_timezone(&Local).date_naive();
    let support = config.support_project.as_str();
    let fulfillment = config.fulfillment_project.as_str();
    let (day_start, day_end) = day_bounds(today);

    let open_filter = Filter::new()
        .project(support)
        .project(fulfillment)
        .status_category(StatusCategory::NotDone);
    let batch_filter = Filter::new()
        .project(support)
        .status_category(StatusCategory::NotDone)
        .newest_first();
    let new_filter = Filter::new()
        .project(support)
        .project(fulfillment)
        .created_between(day_start, day_end);
    let closed_filter = Filter::new()
        .project(support)
        .project(fulfillment)
        .status_category(StatusCategory::Done)
        .resolved_between(day_start, day_end);
    let resolved_filter = Filter::new()
        .project(support)
        .status_category(StatusCategory::Done)
        .resolved_between(now - Duration::days(RESOLVED_WINDOW_DAYS), now);
    let analysis_fields = [
        "summary",
        "status",
        "created",
        "resolutiondate",
        config.response_time_field.as_str(),
    ];

    let (open, batch, new_today, closed_today, resolved, trend) = tokio::join!(
        count_issues(api, &open_filter),
        fetch_issues(api, &batch_filter, DISPLAY_FIELDS, DISPLAY_BATCH),
        count_issues(api, &new_filter),
        count_issues(api, &closed_filter),
        fetch_issues(api, &resolved_filter, &analysis_fields, RESOLVED_BATCH),
        tenant_trend(api, config, cache, today),
    );

    let open = count_or_zero(open, config, "open count");
    let new_today = count_or_zero(new_today, config, "new-today count");
    let closed_today = count_or_zero(closed_today, config, "closed-today count");
    let batch = batch_or_empty(batch, config, "display batch");
    let resolved = batch_or_empty(resolved, config, "resolved batch");

    let snapshot = metrics::build_snapshot(&batch, open, new_today, closed_today, now);
    let response = metrics::response_time_stats(&resolved, &config.response_time_field, now);
    let (sla, lifetime) = if config.sla_tracked {
        (
            metrics::sla_compliance(&resolved, &config.response_time_field, now),
            metrics::RollingStat::default(),
        )
    } else {
        (
            metrics::RollingStat::default(),
            metrics::average_lifetime(&resolved, now),
        )
    };

    ProductMetrics {
        product: config.key.as_str().to_string(),
        open_issues: snapshot.open_count,
        new_today: snapshot.new_today,
        closed_today: snapshot.closed_today,
        critical_p1: snapshot.critical_count,
        top_issues: snapshot.top_issues,
        trend_data: (*trend).clone(),
        time_to_first_response: response.value.map(|ms| format_business_duration(ms as i64)),
        time_to_first_response_ms: response.value.map(|ms| ms as i64),
        time_to_first_response_change: response.change,
        sla_compliance: sla.value,
        sla_compliance_change: sla.change,
        average_lifetime: lifetime.value.map(|ms| format_business_duration(ms as i64)),
        average_lifetime_ms: lifetime.value.map(|ms| ms as i64),
        average_lifetime_change: lifetime.change,
        mock: false,
    }
}

/// Cached-or-fresh trend for one tenant. At most one upstream build per
/// tenant per calendar day; a failed build falls back to the last-known
/// cached series, then to the synthetic one.
pub async fn tenant_trend<A: SearchApi>(
    api: &A,
    config: &TenantConfig,
    cache: &TrendCache,
    today: NaiveDate,
) -> Arc<TrendSeries> {
    if let Some(series) = cache.get_if_fresh(config.key, today).await {
        log::debug!("serving cached trend for {}", config.key);
        return series;
    }

    match build_trend(api, config, today).await {
        Ok(series) => cache.store(config.key, series, today).await,
        Err(e) => {
            log::warn!("trend build for {} failed: {e}", config.key);
            match cache.last_known(config.key).await {
                Some(stale) => stale,
                None => Arc::new(fallback::mock_trend(today)),
            }
        }
    }
}

fn count_or_zero(result: Result<u64>, config: &TenantConfig, what: &str) -> u64 {
    result.unwrap_or_else(|e| {
        log::warn!("{what} for {} failed, reporting 0: {e}", config.key);
        0
    })
}

fn batch_or_empty(result: Result<Vec<Issue>>, config: &TenantConfig, what: &str) -> Vec<Issue> {
    result.unwrap_or_else(|e| {
        log::warn!("{what} for {} failed, proceeding without it: {e}", config.key);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::FailingMock;
    use crate::client::types::SearchPage;
    use crate::config::TenantKey;
    use chrono::TimeZone;

    /// Answers every query with the same three fully populated issues.
    struct UniformMock;

    impl SearchApi for UniformMock {
        async fn search_page(
            &self,
            _query: &str,
            _fields: &[&str],
            _max_results: u32,
            _page_token: Option<&str>,
        ) -> Result<SearchPage> {
            let issues = (0..3)
                .map(|i| {
                    serde_json::from_value(serde_json::json!({
                        "key": format!("SUP-{}", 1600 + i),
                        "fields": {
                            "summary": format!("Issue {i}"),
                            "status": {"name": "Open", "statusCategory": {"key": "new"}},
                            "priority": {"name": "Highest"},
                            "created": "2025-03-17T10:00:00.000+0000",
                            "resolutiondate": "2025-03-18T10:00:00.000+0000",
                            "customfield_10042": {
                                "completedCycles": [
                                    {"elapsedTime": {"millis": 3600000}, "breached": false}
                                ]
                            }
                        }
                    }))
                    .unwrap()
                })
                .collect();
            Ok(SearchPage { issues, next_page_token: None })
        }
    }

    fn config(key: TenantKey) -> TenantConfig {
        TenantConfig {
            key,
            base_url: url::Url::parse("https://tracker.example.com").unwrap(),
            user: "svc".into(),
            token: "secret".into(),
            support_project: "SUP".into(),
            fulfillment_project: "FUL".into(),
            response_time_field: "customfield_10042".into(),
            sla_tracked: key == TenantKey::ProductA,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_product_a() {
        let cache = TrendCache::new();
        let cfg = config(TenantKey::ProductA);
        let metrics = tenant_metrics(&UniformMock, &cfg, &cache, now()).await;

        assert_eq!(metrics.product, "product-a");
        assert!(!metrics.mock);
        assert_eq!(metrics.open_issues, 3);
        assert_eq!(metrics.new_today, 3);
        assert_eq!(metrics.closed_today, 3);
        assert_eq!(metrics.critical_p1, 3);
        assert_eq!(metrics.top_issues.len(), 3);
        // TTFR: all cycles are 1h
        assert_eq!(metrics.time_to_first_response_ms, Some(3_600_000));
        assert_eq!(metrics.time_to_first_response.as_deref(), Some("1h"));
        // Product A reports compliance, not lifetime
        assert_eq!(metrics.sla_compliance, Some(100.0));
        assert!(metrics.average_lifetime.is_none());
        assert!(!metrics.trend_data.mock);
    }

    #[tokio::test]
    async fn test_pipeline_product_b_reports_lifetime() {
        let cache = TrendCache::new();
        let cfg = config(TenantKey::ProductB);
        let metrics = tenant_metrics(&UniformMock, &cfg, &cache, now()).await;

        assert!(metrics.sla_compliance.is_none());
        // Mon 10:00 UTC → Tue 10:00 UTC = one full business day
        assert_eq!(
            metrics.average_lifetime_ms,
            Some(crate::calendar::BUSINESS_DAY_MS)
        );
    }

    #[tokio::test]
    async fn test_total_upstream_failure_still_structurally_valid() {
        let cache = TrendCache::new();
        let cfg = config(TenantKey::ProductA);
        let metrics = tenant_metrics(&FailingMock, &cfg, &cache, now()).await;

        assert_eq!(metrics.open_issues, 0);
        assert!(metrics.top_issues.is_empty());
        assert_eq!(metrics.time_to_first_response, None);
        assert_eq!(metrics.sla_compliance, None);
        // With no cache, the trend falls back to the synthetic series
        assert!(metrics.trend_data.mock);
        assert_eq!(metrics.trend_data.weeks.len(), crate::trend::WEEKLY_BUCKETS);
    }

    #[tokio::test]
    async fn test_trend_failure_prefers_stale_cache_over_mock() {
        let cache = TrendCache::new();
        let cfg = config(TenantKey::ProductA);
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        let yesterday = today - Duration::days(1);

        // Seed yesterday's real series
        let real = tenant_trend(&UniformMock, &cfg, &cache, yesterday).await;
        assert!(!real.mock);

        // Today's build fails; the stale entry wins over the mock
        let served = tenant_trend(&FailingMock, &cfg, &cache, today).await;
        assert!(Arc::ptr_eq(&real, &served));
    }

    #[tokio::test]
    async fn test_trend_cached_within_same_day() {
        let cache = TrendCache::new();
        let cfg = config(TenantKey::ProductA);
        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();

        let first = tenant_trend(&UniformMock, &cfg, &cache, today).await;
        // Second call must not rebuild: a failing API goes unnoticed
        let second = tenant_trend(&FailingMock, &cfg, &cache, today).await;
        assert!(Arc::ptr_eq(&first, &second));
    }
}
