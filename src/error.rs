use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure: connect error, timeout, body read error.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The tracker answered with a non-success status.
    #[error("tracker API error: HTTP {status} for query `{query}`")]
    Api { status: u16, query: String },

    /// A required environment variable is absent. Not a fault: the
    /// service serves synthetic data for unconfigured tenants.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid response payload: {0}")]
    Payload(String),
}

impl Error {
    /// Errors recovered by the fallback-to-cache-or-mock policy at the
    /// aggregation boundary, as opposed to setup errors.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Api { .. } | Error::Payload(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
