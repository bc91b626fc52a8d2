use serde::Serialize;

use crate::trend::TrendSeries;

/// Display sample entry: one of the ≤4 newest open issues.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopIssue {
    pub key: String,
    pub title: String,
    pub status: String,
    pub age: String,
}

/// Counts derived from one fetched batch plus the exact counts from the
/// counting client. Recomputed per request, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub open_count: u64,
    pub new_today: u64,
    pub closed_today: u64,
    pub critical_count: u64,
    pub top_issues: Vec<TopIssue>,
}

/// A rolling statistic: current value plus the percent change of the
/// recent 15-day partition against the previous one. `change` is only
/// present when both partitions are non-empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollingStat {
    pub value: Option<f64>,
    pub change: Option<f64>,
}

/// The per-tenant metrics object exposed to the surrounding
/// application. Structurally valid even under total upstream
/// unavailability.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetrics {
    pub product: String,
    pub open_issues: u64,
    pub new_today: u64,
    pub closed_today: u64,
    pub critical_p1: u64,
    pub top_issues: Vec<TopIssue>,
    pub trend_data: TrendSeries,
    /// Median time-to-first-response, formatted as business time.
    pub time_to_first_response: Option<String>,
    pub time_to_first_response_ms: Option<i64>,
    pub time_to_first_response_change: Option<f64>,
    /// Product A only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_compliance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_compliance_change: Option<f64>,
    /// Product B only, formatted as business time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_lifetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_lifetime_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_lifetime_change: Option<f64>,
    /// True when the whole object is synthetic fallback data.
    pub mock: bool,
}
