use chrono::{DateTime, Utc};

/// Status category of an issue: done vs everything else. The tracker's
/// own workflow states collapse into these two for all our queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Done,
    NotDone,
}

/// Builder for the tracker's filter expressions.
///
/// The vocabulary is fixed and narrow: project scope, status category,
/// creation/resolution instant ranges, priority equality, and custom
/// field presence. Instants render in the tracker's UTC query format
/// (minute precision).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    projects: Vec<String>,
    status_category: Option<StatusCategory>,
    created: Option<(DateTime<Utc>, DateTime<Utc>)>,
    resolved: Option<(DateTime<Utc>, DateTime<Utc>)>,
    priority: Option<String>,
    has_field: Option<String>,
    newest_first: bool,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(mut self, key: &str) -> Self {
        self.projects.push(key.to_string());
        self
    }

    pub fn status_category(mut self, cat: StatusCategory) -> Self {
        self.status_category = Some(cat);
        self
    }

    /// Issues created in `[start, end)`.
    pub fn created_between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.created = Some((start, end));
        self
    }

    /// Issues resolved in `[start, end)`.
    pub fn resolved_between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.resolved = Some((start, end));
        self
    }

    pub fn priority(mut self, name: &str) -> Self {
        self.priority = Some(name.to_string());
        self
    }

    /// Require the given custom field (numeric id) to be present.
    pub fn has_field(mut self, field_id: &str) -> Self {
        self.has_field = Some(field_id.to_string());
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    /// Render the filter expression string sent to the search endpoint.
    pub fn render(&self) -> String {
        let mut clauses = Vec::new();

        match self.projects.len() {
            0 => {}
            1 => clauses.push(format!("project = \"{}\"", self.projects[0])),
            _ => {
                let list = self
                    .projects
                    .iter()
                    .map(|p| format!("\"{p}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                clauses.push(format!("project IN ({list})"));
            }
        }

        match self.status_category {
            Some(StatusCategory::Done) => clauses.push("statusCategory = Done".to_string()),
            Some(StatusCategory::NotDone) => clauses.push("statusCategory != Done".to_string()),
            None => {}
        }

        if let Some((start, end)) = self.created {
            clauses.push(format!(
                "created >= \"{}\" AND created < \"{}\"",
                fmt_instant(start),
                fmt_instant(end)
            ));
        }

        if let Some((start, end)) = self.resolved {
            clauses.push(format!(
                "resolved >= \"{}\" AND resolved < \"{}\"",
                fmt_instant(start),
                fmt_instant(end)
            ));
        }

        if let Some(ref priority) = self.priority {
            clauses.push(format!("priority = \"{priority}\""));
        }

        if let Some(ref field) = self.has_field {
            clauses.push(format!("cf[{field}] IS NOT EMPTY"));
        }

        let mut expr = clauses.join(" AND ");
        if self.newest_first {
            expr.push_str(" ORDER BY created DESC");
        }
        expr
    }
}

fn fmt_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M").to_string()
}
