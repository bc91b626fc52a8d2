//! Synthetic fallback data, served when a tenant is unconfigured or
//! upstream is unavailable and no cached value exists. Clearly marked
//! via the `mock` flag; structurally identical to real responses so
//! consumers and layouts never break.

use chrono::{Datelike, NaiveDate};

use crate::config::TenantKey;
use crate::metrics::{ProductMetrics, TopIssue};
use crate::query::bounds::{current_week_days, prior_week_mondays};
use crate::trend::{TrendPoint, TrendSeries, WEEKLY_BUCKETS};

const MOCK_OPEN_ANCHOR: i64 = 25;

/// Deterministic synthetic trend series with the same shape as a real
/// one. Satisfies the running-balance invariant so consistency checks
/// downstream hold for mock data too.
pub fn mock_trend(today: NaiveDate) -> TrendSeries {
    let mut points = Vec::new();
    for monday in prior_week_mondays(today, WEEKLY_BUCKETS) {
        points.push(TrendPoint {
            label: format!("W{}", monday.iso_week().week()),
            created: 12,
            resolved: 11,
            open: 0,
        });
    }
    let week_count = points.len();
    for day in current_week_days(today) {
        points.push(TrendPoint {
            label: day.format("%a").to_string(),
            created: 3,
            resolved: 2,
            open: 0,
        });
    }

    let mut open = MOCK_OPEN_ANCHOR;
    for point in points.iter_mut().rev() {
        point.open = open;
        open = open - point.created + point.resolved;
    }

    let current_week = points.split_off(week_count);
    TrendSeries {
        weeks: points,
        current_week,
        mock: true,
    }
}

/// Full synthetic metrics object for an unconfigured or unreachable
/// tenant.
pub fn mock_metrics(key: TenantKey, today: NaiveDate) -> ProductMetrics {
    let sla = key == TenantKey::ProductA;
    ProductMetrics {
        product: key.as_str().to_string(),
        open_issues: MOCK_OPEN_ANCHOR as u64,
        new_today: 3,
        closed_today: 2,
        critical_p1: 1,
        top_issues: vec![TopIssue {
            key: "DEMO-1".to_string(),
            title: "Sample issue (mock data)".to_string(),
            status: "Open".to_string(),
            age: "2d".to_string(),
        }],
        trend_data: mock_trend(today),
        time_to_first_response: Some("2h 30m".to_string()),
        time_to_first_response_ms: Some(9_000_000),
        time_to_first_response_change: None,
        sla_compliance: sla.then_some(95.0),
        sla_compliance_change: None,
        average_lifetime: (!sla).then(|| "1d 2h".to_string()),
        average_lifetime_ms: (!sla).then_some(28_800_000),
        average_lifetime_change: None,
        mock: true,
    }
}
