pub mod types;

pub use types::{Issue, SearchPage, SlaCycle};

use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use crate::config::TenantConfig;
use crate::error::{Error, Result};
use crate::query::filter::Filter;

/// Page size cap for search requests.
pub const PAGE_SIZE: u32 = 100;

/// Minimal field list when only counting.
const COUNT_FIELDS: &[&str] = &["id"];

/// Every outbound call carries this timeout; expiry is a per-call
/// failure, never a process fault.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// The one upstream primitive everything is built on: a paged search
/// returning a bounded batch of issues plus an opaque continuation
/// token. No total count is available.
#[allow(async_fn_in_trait)]
pub trait SearchApi {
    async fn search_page(
        &self,
        query: &str,
        fields: &[&str],
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage>;
}

/// HTTP client for one tenant's tracker instance.
pub struct TrackerClient {
    http: reqwest::Client,
    search_url: Url,
    user: String,
    token: String,
}

impl TrackerClient {
    pub fn new(config: &TenantConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let search_url = config
            .base_url
            .join("rest/api/3/search/jql")
            .map_err(|e| Error::Config(format!("search endpoint: {e}")))?;

        Ok(Self {
            http,
            search_url,
            user: config.user.clone(),
            token: config.token.clone(),
        })
    }
}

impl SearchApi for TrackerClient {
    async fn search_page(
        &self,
        query: &str,
        fields: &[&str],
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let mut body = serde_json::json!({
            "jql": query,
            "fields": fields,
            "maxResults": max_results,
        });
        if let Some(token) = page_token {
            body["nextPageToken"] = serde_json::json!(token);
        }

        let response = self
            .http
            .post(self.search_url.clone())
            .basic_auth(&self.user, Some(&self.token))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                query: query.to_string(),
            });
        }

        Ok(response.json::<SearchPage>().await?)
    }
}

/// Exact count of issues matching a filter, with no total-count
/// primitive upstream: drain every page into a key set and return its
/// size. The set absorbs any overlap the tracker introduces across
/// pages, so the result is idempotent under re-pagination.
pub async fn count_issues<A: SearchApi>(api: &A, filter: &Filter) -> Result<u64> {
    let query = filter.render();
    let mut keys: HashSet<String> = HashSet::new();
    let mut token: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let page = api
            .search_page(&query, COUNT_FIELDS, PAGE_SIZE, token.as_deref())
            .await?;
        pages += 1;
        for issue in page.issues {
            keys.insert(issue.key);
        }
        match page.next_page_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => break,
        }
    }

    log::debug!("counted {} unique keys over {pages} page(s) for `{query}`", keys.len());
    Ok(keys.len() as u64)
}

/// Fetch up to `max` issues matching a filter, following continuation
/// tokens as needed.
pub async fn fetch_issues<A: SearchApi>(
    api: &A,
    filter: &Filter,
    fields: &[&str],
    max: usize,
) -> Result<Vec<Issue>> {
    let query = filter.render();
    let mut issues: Vec<Issue> = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = api
            .search_page(&query, fields, PAGE_SIZE, token.as_deref())
            .await?;
        issues.extend(page.issues);
        if issues.len() >= max {
            issues.truncate(max);
            break;
        }
        match page.next_page_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => break,
        }
    }

    log::debug!("fetched {} issue(s) for `{query}`", issues.len());
    Ok(issues)
}


#[cfg(test)]
mod tests {
    use super::test_support::{FailingMock, PagedMock};
    use super::*;

    fn keys(prefix: &str, range: std::ops::Range<u32>) -> Vec<String> {
        range.map(|i| format!("{prefix}-{i}")).collect()
    }

    #[tokio::test]
    async fn test_count_three_pages_no_overlap() {
        let mock = PagedMock {
            pages: vec![keys("A", 0..100), keys("B", 0..100), keys("C", 0..42)],
        };
        let count = count_issues(&mock, &Filter::new()).await.unwrap();
        assert_eq!(count, 242);
    }

    #[tokio::test]
    async fn test_count_deduplicates_page_overlap() {
        // Page 2 repeats 10 keys from page 1
        let mut second = keys("A", 0..10);
        second.extend(keys("B", 0..90));
        let mock = PagedMock {
            pages: vec![keys("A", 0..100), second],
        };
        let count = count_issues(&mock, &Filter::new()).await.unwrap();
        assert_eq!(count, 190);
    }

    #[tokio::test]
    async fn test_count_single_page() {
        let mock = PagedMock::from_keys(vec![vec!["SUP-1", "SUP-2"]]);
        assert_eq!(count_issues(&mock, &Filter::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_empty() {
        let mock = PagedMock::from_keys(vec![vec![]]);
        assert_eq!(count_issues(&mock, &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_propagates_page_failure() {
        let err = count_issues(&FailingMock, &Filter::new()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_respects_max() {
        let mock = PagedMock {
            pages: vec![keys("A", 0..100), keys("B", 0..100)],
        };
        let issues = fetch_issues(&mock, &Filter::new(), &["summary"], 150)
            .await
            .unwrap();
        assert_eq!(issues.len(), 150);
        assert_eq!(issues[0].key, "A-0");
        assert_eq!(issues[149].key, "B-49");
    }

    #[tokio::test]
    async fn test_fetch_stops_at_last_page() {
        let mock = PagedMock::from_keys(vec![vec!["SUP-1"]]);
        let issues = fetch_issues(&mock, &Filter::new(), &["summary"], 100)
            .await
            .unwrap();
        assert_eq!(issues.len(), 1);
    }
}
