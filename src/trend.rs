use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::client::{count_issues, SearchApi};
use crate::config::TenantConfig;
use crate::error::Result;
use crate::query::bounds::{current_week_days, prior_week_mondays, day_bounds, week_bounds};
use crate::query::filter::{Filter, StatusCategory};

/// Number of full prior weeks in the trend series.
pub const WEEKLY_BUCKETS: usize = 8;

/// One bucket of the trend series. `open` is reconstructed by the
/// running-balance backfill, not queried per bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub created: i64,
    pub resolved: i64,
    pub open: i64,
}

/// Trend series: 8 prior weeks (week granularity) followed by the
/// current week up to today (day granularity), oldest first in each.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub weeks: Vec<TrendPoint>,
    pub current_week: Vec<TrendPoint>,
    /// True when the series is synthetic fallback data.
    pub mock: bool,
}

impl TrendSeries {
    /// All points in chronological order.
    pub fn points(&self) -> impl Iterator<Item = &TrendPoint> {
        self.weeks.iter().chain(self.current_week.iter())
    }
}

/// Build the trend series for a tenant's support queue.
///
/// Counts created/resolved issues per bucket via the paginated counting
/// client, fetches the live open count once, and reconstructs per-bucket
/// open counts backward from that single anchor:
/// `open[i-1] = open[i] - created[i] + resolved[i]`. Any drift between
/// the live count and historical boundary states propagates backward
/// without reconciliation; the series is dashboard-grade, not an audit
/// trail. Any fetch failure aborts the whole series so the caller can
/// fall back.
pub async fn build_trend<A: SearchApi>(
    api: &A,
    config: &TenantConfig,
    today: NaiveDate,
) -> Result<TrendSeries> {
    let project = config.support_project.as_str();

    let mut buckets = Vec::new();
    for monday in prior_week_mondays(today, WEEKLY_BUCKETS) {
        let label = format!("W{}", monday.iso_week().week());
        buckets.push((label, week_bounds(monday)));
    }
    let week_count = buckets.len();
    for day in current_week_days(today) {
        buckets.push((day.format("%a").to_string(), day_bounds(day)));
    }

    let mut points = Vec::with_capacity(buckets.len());
    for (label, (start, end)) in buckets {
        let created = count_issues(
            api,
            &Filter::new().project(project).created_between(start, end),
        )
        .await?;
        let resolved = count_issues(
            api,
            &Filter::new()
                .project(project)
                .status_category(StatusCategory::Done)
                .resolved_between(start, end),
        )
        .await?;
        points.push(TrendPoint {
            label,
            created: created as i64,
            resolved: resolved as i64,
            open: 0,
        });
    }

    let live_open = count_issues(
        api,
        &Filter::new()
            .project(project)
            .status_category(StatusCategory::NotDone),
    )
    .await? as i64;

    // Backward running balance anchored to the live open count
    let mut open = live_open;
    for point in points.iter_mut().rev() {
        point.open = open;
        open = open - point.created + point.resolved;
    }

    let current_week = points.split_off(week_count);
    Ok(TrendSeries {
        weeks: points,
        current_week,
        mock: false,
    })
}
