//! HTTP client for pulling one raw metrics snapshot per tick.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::SyncError;

/// Path served by the metrics server, appended to the configured base URL.
pub const METRICS_PATH: &str = "/api/metrics";

/// Undecoded payload plus the local time it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub body: Value,
}

/// Something that can produce one raw snapshot per call.
///
/// Implementations must not retry; a failure is returned to the caller,
/// which decides whether to skip the tick.
pub trait MetricsSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<RawSnapshot, SyncError>> + Send;

    /// Human-readable origin, shown in the header.
    fn describe(&self) -> String;
}

/// Builds `<base>/api/metrics`, keeping any path prefix on the base URL.
pub fn metrics_endpoint(base: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base.trim())?;
    let prefix = url.path().trim_end_matches('/').to_string();
    if !prefix.ends_with(METRICS_PATH) {
        url.set_path(&format!("{prefix}{METRICS_PATH}"));
    }
    Ok(url)
}

pub struct HttpSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSource {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dgos/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl MetricsSource for HttpSource {
    async fn fetch(&self) -> Result<RawSnapshot, SyncError> {
        let resp = self.client.get(self.endpoint.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SyncError::Transport(format!(
                "{} answered {status}",
                self.endpoint
            )));
        }
        let bytes = resp.bytes().await?;
        let fetched_at = Utc::now();
        debug!(bytes = bytes.len(), "metrics payload received");

        // A body that is not JSON at all is a schema problem, not a zero reading.
        let body = serde_json::from_slice::<Value>(&bytes)
            .map_err(|e| SyncError::invalid_shape("$", format!("body is not valid JSON: {e}")))?;
        Ok(RawSnapshot { fetched_at, body })
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}
