/// Sibling-site lookups.
///
/// A deployment can surface the latest questions from other sites in the same
/// family. Sites are declared in the `NETWORK_SITES` environment variable as a
/// JSON array:
///
/// ```json
/// [{"key": "upf", "siteName": "UPF FAQs", "projectId": "shxuue68",
///   "dataset": "production", "apiVersion": "2023-05-03",
///   "siteUrl": "https://upffaqs.com"}]
/// ```
///
/// When the variable is unset the network is empty and the corresponding tool
/// reports that no sites are configured.
use serde::Deserialize;

use content_common::error::CommonError;
use content_common::sanity::{SanityClient, SanityClientConfig};

use crate::error::AppError;
use crate::model::{is_displayable, Faq};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSite {
    /// Short key used to address the site in tool calls.
    pub key: String,
    pub site_name: String,
    pub project_id: String,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    pub site_url: String,
}

fn default_dataset() -> String {
    "production".to_string()
}

fn default_api_version() -> String {
    "2023-06-06".to_string()
}

pub struct ContentNetwork {
    sites: Vec<(NetworkSite, SanityClient)>,
}

impl ContentNetwork {
    /// Build the network from `NETWORK_SITES`; unset means an empty network.
    pub fn from_env() -> Result<Self, AppError> {
        match std::env::var("NETWORK_SITES") {
            Ok(raw) => {
                let sites: Vec<NetworkSite> = serde_json::from_str(&raw)
                    .map_err(|e| AppError::Config(format!("invalid NETWORK_SITES: {e}")))?;
                Self::from_sites(sites)
            }
            Err(_) => Ok(Self { sites: Vec::new() }),
        }
    }

    pub fn from_sites(sites: Vec<NetworkSite>) -> Result<Self, AppError> {
        let mut connected = Vec::with_capacity(sites.len());
        for site in sites {
            let config = SanityClientConfig::new(
                site.project_id.clone(),
                site.dataset.clone(),
                site.api_version.clone(),
            );
            let client = SanityClient::new(config).map_err(CommonError::from)?;
            connected.push((site, client));
        }
        Ok(Self { sites: connected })
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn site_keys(&self) -> Vec<&str> {
        self.sites.iter().map(|(s, _)| s.key.as_str()).collect()
    }

    /// Newest displayable FAQs from one configured site.
    pub async fn latest_faqs(
        &self,
        site_key: &str,
        limit: usize,
    ) -> Result<(NetworkSite, Vec<Faq>), AppError> {
        let (site, client) = self
            .sites
            .iter()
            .find(|(s, _)| s.key.eq_ignore_ascii_case(site_key))
            .ok_or_else(|| {
                AppError::UnknownSite(format!(
                    "'{site_key}'. Available sites: {}",
                    self.site_keys().join(", ")
                ))
            })?;

        let groq = format!(
            "*[_type == \"faq\" && defined(slug.current) && defined(question)] \
             | order(_createdAt desc)[0...{limit}] \
             {{_id, question, slug, summaryForAI, publishedAt, image{{asset->{{url}}, alt}}}}"
        );
        let mut faqs: Vec<Faq> = client.fetch(&groq, &[]).await.map_err(CommonError::from)?;
        faqs.retain(|f| is_displayable(f));
        Ok((site.clone(), faqs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_declaration_fills_defaults() {
        let sites: Vec<NetworkSite> = serde_json::from_str(
            r#"[{"key": "upf", "siteName": "UPF FAQs", "projectId": "shxuue68",
                 "siteUrl": "https://upffaqs.com"}]"#,
        )
        .expect("sites should decode");
        assert_eq!(sites[0].dataset, "production");
        assert_eq!(sites[0].api_version, "2023-06-06");
    }

    #[tokio::test]
    async fn unknown_site_is_a_distinct_error() {
        let network = ContentNetwork::from_sites(vec![NetworkSite {
            key: "upf".to_string(),
            site_name: "UPF FAQs".to_string(),
            project_id: "shxuue68".to_string(),
            dataset: "production".to_string(),
            api_version: "2023-06-06".to_string(),
            site_url: "https://upffaqs.com".to_string(),
        }])
        .expect("network should build");

        let err = network.latest_faqs("nope", 3).await.unwrap_err();
        match err {
            AppError::UnknownSite(msg) => assert!(msg.contains("upf")),
            other => panic!("expected UnknownSite, got {other:?}"),
        }
    }
}
