pub mod types;

pub use types::*;

use chrono::{DateTime, Duration, Local, Utc};

use crate::calendar::{age_label, business_time_between};
use crate::client::Issue;

/// Cap on the top-issues display sample.
pub const TOP_ISSUE_LIMIT: usize = 4;

/// Top severity level in the tracker's priority scheme.
pub const CRITICAL_PRIORITY: &str = "Highest";

/// Issues numbered below this predate SLA tracking and are excluded
/// from compliance figures.
pub const SLA_CUTOVER_ISSUE: u64 = 1500;

/// Split point for trend deltas: resolved within the last 15 days is
/// "recent", older (within the 30-day window) is "previous".
const RECENT_WINDOW_DAYS: i64 = 15;

/// Derive the request-scoped snapshot from the most-recent-open batch
/// plus the exact counts from the counting client.
///
/// The top-issues list is a display sample, not exhaustive: the first
/// `TOP_ISSUE_LIMIT` non-closed issues in batch order (newest first).
pub fn build_snapshot(
    batch: &[Issue],
    open_count: u64,
    new_today: u64,
    closed_today: u64,
    now: DateTime<Utc>,
) -> MetricsSnapshot {
    let critical_count = batch
        .iter()
        .filter(|issue| {
            issue
                .fields
                .priority
                .as_ref()
                .map(|p| p.name == CRITICAL_PRIORITY)
                .unwrap_or(false)
        })
        .count() as u64;

    let now_local = now.with_timezone(&Local).naive_local();
    let top_issues = batch
        .iter()
        .filter(|issue| !issue.is_done())
        .take(TOP_ISSUE_LIMIT)
        .map(|issue| TopIssue {
            key: issue.key.clone(),
            title: issue
                .fields
                .summary
                .clone()
                .unwrap_or_else(|| "(no summary)".to_string()),
            status: issue
                .fields
                .status
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            age: issue
                .fields
                .created
                .map(|c| age_label(c.with_timezone(&Local).naive_local(), now_local))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    MetricsSnapshot {
        open_count,
        new_today,
        closed_today,
        critical_count,
        top_issues,
    }
}

/// Median of a sample; `None` (not 0, not NaN) when empty.
pub fn median(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    #[allow(clippy::manual_is_multiple_of)]
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    };
    Some(median)
}

fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().sum();
    Some(sum as f64 / values.len() as f64)
}

/// Percent change of `recent` over `previous`; `None` unless both are
/// present and `previous` is non-zero.
pub fn percent_change(recent: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (recent, previous) {
        (Some(r), Some(p)) if p != 0.0 => Some((r - p) / p * 100.0),
        _ => None,
    }
}

fn is_recent(resolved: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    resolved >= now - Duration::days(RECENT_WINDOW_DAYS)
}

/// Median time-to-first-response over issues resolved in the last 30
/// days, read from the tenant's tracked SLA field. Issues missing the
/// field or a resolution date are skipped, not errors.
pub fn response_time_stats(issues: &[Issue], field_id: &str, now: DateTime<Utc>) -> RollingStat {
    let mut all = Vec::new();
    let mut recent = Vec::new();
    let mut previous = Vec::new();

    for issue in issues {
        let Some(cycle) = issue.completed_sla_cycle(field_id) else {
            continue;
        };
        let Some(resolved) = issue.fields.resolved else {
            continue;
        };
        all.push(cycle.millis);
        if is_recent(resolved, now) {
            recent.push(cycle.millis);
        } else {
            previous.push(cycle.millis);
        }
    }

    RollingStat {
        value: median(&all),
        change: percent_change(median(&recent), median(&previous)),
    }
}

/// SLA compliance percentage (Product A): of qualifying issues with a
/// completed cycle, the share whose goal was not breached. Issues
/// numbered before the SLA cutover are excluded. `None` when no issue
/// qualifies.
pub fn sla_compliance(issues: &[Issue], field_id: &str, now: DateTime<Utc>) -> RollingStat {
    let mut all = Vec::new();
    let mut recent = Vec::new();
    let mut previous = Vec::new();

    for issue in issues {
        if issue.key_number().map(|n| n < SLA_CUTOVER_ISSUE).unwrap_or(true) {
            continue;
        }
        let Some(cycle) = issue.completed_sla_cycle(field_id) else {
            continue;
        };
        let Some(resolved) = issue.fields.resolved else {
            continue;
        };
        all.push(cycle.breached);
        if is_recent(resolved, now) {
            recent.push(cycle.breached);
        } else {
            previous.push(cycle.breached);
        }
    }

    RollingStat {
        value: compliance_pct(&all),
        change: percent_change(compliance_pct(&recent), compliance_pct(&previous)),
    }
}

fn compliance_pct(breaches: &[bool]) -> Option<f64> {
    if breaches.is_empty() {
        return None;
    }
    let ok = breaches.iter().filter(|&&b| !b).count();
    Some(ok as f64 / breaches.len() as f64 * 100.0)
}

/// Average business-time lifetime (Product B): mean elapsed business
/// time from creation to resolution. Issues missing either timestamp
/// are skipped. `None` on empty input.
pub fn average_lifetime(issues: &[Issue], now: DateTime<Utc>) -> RollingStat {
    let mut all = Vec::new();
    let mut recent = Vec::new();
    let mut previous = Vec::new();

    for issue in issues {
        let (Some(created), Some(resolved)) = (issue.fields.created, issue.fields.resolved) else {
            continue;
        };
        let elapsed = business_time_between(
            created.with_timezone(&Local).naive_local(),
            resolved.with_timezone(&Local).naive_local(),
        );
        all.push(elapsed);
        if is_recent(resolved, now) {
            recent.push(elapsed);
        } else {
            previous.push(elapsed);
        }
    }

    RollingStat {
        value: mean(&all),
        change: percent_change(mean(&recent), mean(&previous)),
    }
}
