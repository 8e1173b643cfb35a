use regex::Regex;

use content_common::sanity::SanityClientConfig;

use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
///
/// The project and site identity have no sane defaults and must be provided.
/// Redis URL is optional; if absent, the server runs without caching.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379"). `None` disables caching.
    pub redis_url: Option<String>,
    /// Content store connection (project, dataset, API version, transport knobs).
    pub sanity: SanityClientConfig,
    /// Canonical site origin used for links and citations, without trailing slash.
    pub site_url: String,
    /// Human-readable site name used in citations.
    pub site_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `SANITY_PROJECT_ID`: content store project identifier
    /// - `SITE_URL`: canonical site origin (e.g. "https://example.org")
    /// - `SITE_NAME`: site name used in citations
    ///
    /// Optional:
    /// - `SANITY_DATASET` (default "production")
    /// - `SANITY_API_VERSION` (default "2023-06-06", must be a dated version)
    /// - `REDIS_URL`: Redis connection string (omit to disable caching)
    pub fn from_env() -> Result<Self, AppError> {
        let project_id = std::env::var("SANITY_PROJECT_ID").map_err(|_| {
            AppError::Config("SANITY_PROJECT_ID environment variable is required".to_string())
        })?;

        let project_re = Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("valid regex");
        if !project_re.is_match(&project_id) {
            return Err(AppError::Config(format!(
                "SANITY_PROJECT_ID '{project_id}' is not a valid project identifier"
            )));
        }

        let dataset =
            std::env::var("SANITY_DATASET").unwrap_or_else(|_| "production".to_string());

        let api_version =
            std::env::var("SANITY_API_VERSION").unwrap_or_else(|_| "2023-06-06".to_string());
        let version_re = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex");
        if !version_re.is_match(&api_version) {
            return Err(AppError::Config(format!(
                "SANITY_API_VERSION '{api_version}' must be a dated version like 2023-06-06"
            )));
        }

        let site_url = std::env::var("SITE_URL")
            .map_err(|_| AppError::Config("SITE_URL environment variable is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let site_name = std::env::var("SITE_NAME").map_err(|_| {
            AppError::Config("SITE_NAME environment variable is required".to_string())
        })?;

        Ok(Self {
            redis_url: std::env::var("REDIS_URL").ok(),
            sanity: SanityClientConfig::new(project_id, dataset, api_version),
            site_url,
            site_name,
        })
    }

    /// Canonical page URL for a FAQ slug.
    pub fn faq_url(&self, slug: &str) -> String {
        format!("{}/faqs/{slug}", self.site_url)
    }

    /// Canonical page URL for an article slug.
    pub fn article_url(&self, slug: &str) -> String {
        format!("{}/articles/{slug}", self.site_url)
    }
}
