/// HTTP client for the Sanity Content Lake query API.
///
/// GROQ queries are sent as GET requests against
/// `/v{api_version}/data/query/{dataset}`. Query parameters are passed as
/// `$name=<json literal>` pairs, matching the API's parameter encoding. The
/// successful response is an envelope `{"ms": ..., "result": ...}`; errors
/// arrive as `{"error": {"description": ...}}` with a non-2xx status.
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

#[derive(Clone, Debug)]
pub struct SanityClientConfig {
    /// Sanity project identifier, e.g. "rpufi5bg".
    pub project_id: String,
    /// Dataset name, e.g. "production".
    pub dataset: String,
    /// Dated API version string, e.g. "2023-06-06".
    pub api_version: String,
    /// Query through the CDN edge (`apicdn.sanity.io`) instead of the live API.
    pub use_cdn: bool,
    /// Overrides the `https://{project_id}.api.sanity.io` origin when set.
    pub base_url: Option<String>,
    pub default_timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_error_body_bytes: usize,
}

impl SanityClientConfig {
    /// Build a config for one project/dataset, reading transport knobs from
    /// the environment.
    ///
    /// Optional:
    /// - `SANITY_BASE_URL`: origin override (used by tests and proxies)
    /// - `SANITY_USE_CDN`: "false" to query the live API instead of the CDN
    /// - `SANITY_TIMEOUT_SECS`, `SANITY_MAX_RETRIES`,
    ///   `SANITY_RETRY_INITIAL_MS`, `SANITY_RETRY_MAX_MS`,
    ///   `SANITY_MAX_ERROR_BODY_BYTES`
    pub fn new(
        project_id: impl Into<String>,
        dataset: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        let base_url = std::env::var("SANITY_BASE_URL")
            .ok()
            .map(|u| u.trim_end_matches('/').to_string());

        let use_cdn = std::env::var("SANITY_USE_CDN")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let default_timeout = std::env::var("SANITY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let max_retries = std::env::var("SANITY_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(3);

        let initial_backoff = std::env::var("SANITY_RETRY_INITIAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(200));

        let max_backoff = std::env::var("SANITY_RETRY_MAX_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(5_000));

        let max_error_body_bytes = std::env::var("SANITY_MAX_ERROR_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(8 * 1024);

        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            api_version: api_version.into(),
            use_cdn,
            base_url,
            default_timeout,
            max_retries,
            initial_backoff,
            max_backoff,
            max_error_body_bytes,
        }
    }

    fn query_url(&self) -> String {
        let origin = match &self.base_url {
            Some(url) => url.clone(),
            None => {
                let domain = if self.use_cdn {
                    "apicdn.sanity.io"
                } else {
                    "api.sanity.io"
                };
                format!("https://{}.{domain}", self.project_id)
            }
        };
        format!(
            "{origin}/v{}/data/query/{}",
            self.api_version, self.dataset
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SanityClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("content store returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("content store returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },
}

#[derive(Clone)]
pub struct SanityClient {
    config: SanityClientConfig,
    http: reqwest::Client,
}

impl SanityClient {
    pub fn new(config: SanityClientConfig) -> Result<Self, SanityClientError> {
        let http = reqwest::Client::builder()
            .user_agent("content-servers/faq-content")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &SanityClientConfig {
        &self.config
    }

    /// Run a GROQ query and deserialize the `result` field of the envelope.
    ///
    /// `params` are GROQ parameters referenced as `$name` inside the query;
    /// values are JSON-encoded on the wire. A query with no matching document
    /// yields `result: null`, so fetch into an `Option<T>` for point lookups.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, serde_json::Value)],
    ) -> Result<T, SanityClientError> {
        let url = self.config.query_url();
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(params.len() + 1);
        pairs.push(("query".to_string(), groq.to_string()));
        for (name, value) in params {
            pairs.push((format!("${name}"), value.to_string()));
        }

        self.request_with_retry(|| async {
            let resp = self
                .http
                .get(&url)
                .query(&pairs)
                .timeout(self.config.default_timeout)
                .send()
                .await?;
            let envelope: QueryEnvelope<T> =
                Self::parse_json_response(resp, self.config.max_error_body_bytes).await?;
            Ok(envelope.result)
        })
        .await
    }

    async fn parse_json_response<T: DeserializeOwned>(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> Result<T, SanityClientError> {
        if resp.status().is_success() {
            let json = resp.json::<T>().await?;
            return Ok(json);
        }
        Err(Self::to_upstream_error(resp, max_error_body_bytes).await)
    }

    async fn to_upstream_error(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> SanityClientError {
        let status = resp.status();
        let body = read_limited_text(resp, max_error_body_bytes).await;
        if let Ok(parsed) = serde_json::from_str::<SanityErrorEnvelope>(&body) {
            let message = parsed
                .error
                .description
                .unwrap_or_else(|| "unknown content store error".to_string());
            return SanityClientError::Upstream { status, message };
        }
        SanityClientError::UpstreamBody { status, body }
    }

    async fn request_with_retry<T, Fut, F>(&self, mut f: F) -> Result<T, SanityClientError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, SanityClientError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let result = f().await;
            match result {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if attempt > self.config.max_retries || !should_retry(&e) {
                        return Err(e);
                    }
                    let delay = backoff_delay(
                        self.config.initial_backoff,
                        self.config.max_backoff,
                        attempt - 1,
                    );
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "content store request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn should_retry(err: &SanityClientError) -> bool {
    match err {
        SanityClientError::Request(e) => {
            e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode()
        }
        SanityClientError::Upstream { status, .. }
        | SanityClientError::UpstreamBody { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        SanityClientError::InvalidJson(_) => false,
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    let jitter_ms = pseudo_jitter_ms(jitter_cap);
    Duration::from_millis(capped_ms.saturating_add(jitter_ms))
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let nanos = now.subsec_nanos() as u64;
    nanos % (max_inclusive + 1)
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read content store error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct SanityErrorEnvelope {
    error: SanityErrorObject,
}

#[derive(Debug, Deserialize)]
struct SanityErrorObject {
    description: Option<String>,
    #[allow(dead_code)]
    r#type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_uses_cdn_domain_by_default() {
        let mut config = SanityClientConfig::new("abc123", "production", "2023-06-06");
        config.base_url = None;
        config.use_cdn = true;
        assert_eq!(
            config.query_url(),
            "https://abc123.apicdn.sanity.io/v2023-06-06/data/query/production"
        );
        config.use_cdn = false;
        assert_eq!(
            config.query_url(),
            "https://abc123.api.sanity.io/v2023-06-06/data/query/production"
        );
    }

    #[test]
    fn query_url_honors_base_url_override() {
        let mut config = SanityClientConfig::new("abc123", "staging", "2024-06-01");
        config.base_url = Some("http://127.0.0.1:9999".to_string());
        assert_eq!(
            config.query_url(),
            "http://127.0.0.1:9999/v2024-06-01/data/query/staging"
        );
    }

    #[test]
    fn backoff_is_capped() {
        let initial = Duration::from_millis(200);
        let max = Duration::from_millis(1_000);
        let delay = backoff_delay(initial, max, 10);
        // cap + max 25% jitter
        assert!(delay <= Duration::from_millis(1_250));
    }

    #[test]
    fn upstream_errors_are_retryable_only_when_transient() {
        let transient = SanityClientError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "down".to_string(),
        };
        assert!(should_retry(&transient));

        let permanent = SanityClientError::Upstream {
            status: StatusCode::BAD_REQUEST,
            message: "query parse error".to_string(),
        };
        assert!(!should_retry(&permanent));
    }
}
