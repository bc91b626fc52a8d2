use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

/// One of the two products sharing the aggregation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TenantKey {
    ProductA,
    ProductB,
}

impl TenantKey {
    pub const ALL: [TenantKey; 2] = [TenantKey::ProductA, TenantKey::ProductB];

    pub fn as_str(&self) -> &'static str {
        match self {
            TenantKey::ProductA => "product-a",
            TenantKey::ProductB => "product-b",
        }
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            TenantKey::ProductA => "TICKETOPS_A",
            TenantKey::ProductB => "TICKETOPS_B",
        }
    }
}

impl fmt::Display for TenantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TenantKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "a" | "product-a" => Ok(TenantKey::ProductA),
            "b" | "product-b" => Ok(TenantKey::ProductB),
            other => Err(Error::Config(format!("unknown tenant: {other}"))),
        }
    }
}

/// Immutable per-product record: endpoint, credentials, the two project
/// scopes, and the tracked time-to-first-response field. Built once at
/// startup; the two instances are fully independent.
#[derive(Debug, Clone)]
pub struct TenantConfig {
    pub key: TenantKey,
    pub base_url: Url,
    pub user: String,
    pub token: String,
    /// Project key of the support queue.
    pub support_project: String,
    /// Project key of the fulfillment queue.
    pub fulfillment_project: String,
    /// Custom field id holding the time-to-first-response SLA cycle,
    /// e.g. `customfield_10042`. Mapped explicitly per tenant instead of
    /// probing field names at runtime.
    pub response_time_field: String,
    /// Product A tracks SLA compliance; Product B reports average
    /// issue lifetime instead.
    pub sla_tracked: bool,
}

impl TenantConfig {
    /// Read a tenant's configuration from `TICKETOPS_<A|B>_*` variables.
    ///
    /// Returns `Error::ConfigMissing` naming the first absent variable.
    /// Callers treat that as "tenant not configured", not as a fault.
    pub fn from_env(key: TenantKey) -> Result<Self> {
        let prefix = key.env_prefix();
        let base_url = env_var(&format!("{prefix}_BASE_URL"))?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("{prefix}_BASE_URL: {e}")))?;

        Ok(Self {
            key,
            base_url,
            user: env_var(&format!("{prefix}_USER"))?,
            token: env_var(&format!("{prefix}_TOKEN"))?,
            support_project: env_var(&format!("{prefix}_SUPPORT_PROJECT"))?,
            fulfillment_project: env_var(&format!("{prefix}_FULFILLMENT_PROJECT"))?,
            response_time_field: env_var(&format!("{prefix}_RESPONSE_TIME_FIELD"))?,
            sla_tracked: matches!(key, TenantKey::ProductA),
        })
    }
}

fn env_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::ConfigMissing(name.to_string())),
    }
}
