use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of search results. The tracker returns no total count; an
/// absent continuation token marks the last page.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// Read-only snapshot of an issue as fetched per request. Never mutated
/// locally; everything is re-derived from upstream state.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "tracker_datetime::deserialize")]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        rename = "resolutiondate",
        default,
        deserialize_with = "tracker_datetime::deserialize"
    )]
    pub resolved: Option<DateTime<Utc>>,
    /// Custom fields keyed by field id (`customfield_10042`).
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub name: String,
    #[serde(rename = "statusCategory")]
    pub category: Option<StatusCategoryRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusCategoryRef {
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Priority {
    pub name: String,
}

/// A completed SLA cycle read from a tracked service-level field:
/// elapsed business time and whether the goal was breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaCycle {
    pub millis: i64,
    pub breached: bool,
}

impl Issue {
    /// Numeric suffix of the issue key (`SUP-1234` → `1234`).
    pub fn key_number(&self) -> Option<u64> {
        self.key.rsplit('-').next()?.parse().ok()
    }

    pub fn is_done(&self) -> bool {
        self.fields
            .status
            .as_ref()
            .and_then(|s| s.category.as_ref())
            .map(|c| c.key == "done")
            .unwrap_or(false)
    }

    /// First completed cycle of the given SLA field, if the field is
    /// present and carries one. Absent or malformed fields yield `None`;
    /// analyzers skip such issues rather than erroring.
    pub fn completed_sla_cycle(&self, field_id: &str) -> Option<SlaCycle> {
        let field = self.fields.custom.get(field_id)?;
        let cycle = field.get("completedCycles")?.get(0)?;
        let millis = cycle.get("elapsedTime")?.get("millis")?.as_i64()?;
        let breached = cycle
            .get("breached")
            .and_then(|b| b.as_bool())
            .unwrap_or(false);
        Some(SlaCycle { millis, breached })
    }
}

/// The tracker serializes timestamps as `2025-03-05T10:22:33.000+0100`
/// (no colon in the offset), which strict RFC 3339 parsing rejects.
mod tracker_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(s) => DateTime::parse_from_str(&s, FORMAT)
                .or_else(|_| DateTime::parse_from_rfc3339(&s))
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}
