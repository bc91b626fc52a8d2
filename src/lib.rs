pub mod cache;
pub mod calendar;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod metrics;
pub mod query;
pub mod service;
pub mod trend;

pub use cache::TrendCache;
pub use client::{count_issues, fetch_issues, Issue, SearchApi, TrackerClient};
pub use config::{TenantConfig, TenantKey};
pub use error::{Error, Result};
pub use metrics::{MetricsSnapshot, ProductMetrics, TopIssue};
pub use query::filter::{Filter, StatusCategory};
pub use trend::{TrendPoint, TrendSeries};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, Utc};

struct Tenant {
    config: TenantConfig,
    client: TrackerClient,
}

/// Main entry point: the two-tenant operations view over the issue
/// tracker. Owns one client per configured tenant and the trend cache;
/// unconfigured tenants are served synthetic data without any network
/// call.
pub struct TicketOps {
    tenants: HashMap<TenantKey, Tenant>,
    cache: TrendCache,
}

impl TicketOps {
    /// Build from `TICKETOPS_*` environment variables. A tenant whose
    /// variables are absent is logged and skipped, by design — requests
    /// for it get mock data.
    pub fn from_env() -> Self {
        let mut tenants = HashMap::new();
        for key in TenantKey::ALL {
            match TenantConfig::from_env(key) {
                Ok(config) => match TrackerClient::new(&config) {
                    Ok(client) => {
                        tenants.insert(key, Tenant { config, client });
                    }
                    Err(e) => log::error!("tenant {key}: client setup failed: {e}"),
                },
                Err(Error::ConfigMissing(var)) => {
                    log::info!("tenant {key} not configured ({var} unset), serving mock data");
                }
                Err(e) => log::error!("tenant {key}: invalid configuration: {e}"),
            }
        }
        Self {
            tenants,
            cache: TrendCache::new(),
        }
    }

    /// Build from explicit tenant configurations.
    pub fn new(configs: Vec<TenantConfig>) -> Result<Self> {
        let mut tenants = HashMap::new();
        for config in configs {
            let client = TrackerClient::new(&config)?;
            tenants.insert(config.key, Tenant { config, client });
        }
        Ok(Self {
            tenants,
            cache: TrendCache::new(),
        })
    }

    /// The full metrics object for one tenant. Never fails: transient
    /// upstream errors degrade to cached or synthetic data.
    pub async fn product_metrics(&self, key: TenantKey) -> ProductMetrics {
        match self.tenants.get(&key) {
            Some(tenant) => {
                service::tenant_metrics(&tenant.client, &tenant.config, &self.cache, Utc::now())
                    .await
            }
            None => fallback::mock_metrics(key, Local::now().date_naive()),
        }
    }

    /// Metrics for both tenants, fetched concurrently. The pipelines
    /// are fully independent; one tenant's failure never affects the
    /// other.
    pub async fn all_metrics(&self) -> Vec<ProductMetrics> {
        let (a, b) = tokio::join!(
            self.product_metrics(TenantKey::ProductA),
            self.product_metrics(TenantKey::ProductB),
        );
        vec![a, b]
    }

    /// Trend-only accessor, through the same calendar-day cache.
    pub async fn trend(&self, key: TenantKey) -> Arc<TrendSeries> {
        let today = Local::now().date_naive();
        match self.tenants.get(&key) {
            Some(tenant) => {
                service::tenant_trend(&tenant.client, &tenant.config, &self.cache, today).await
            }
            None => Arc::new(fallback::mock_trend(today)),
        }
    }
}
