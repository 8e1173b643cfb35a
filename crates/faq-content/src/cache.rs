/// Redis caching layer for the FAQ content server.
///
/// All operations are best-effort and return `Option<T>` for graceful
/// degradation.
///
/// Key schema:
/// - `faqc:v1:faq:{slug}` — JSON Faq
/// - `faqc:v1:article:{slug}` — JSON Article
/// - `faqc:v1:search:{sha256(query|limit)}` — JSON Vec<FaqSummary> (TTL 3600s)
/// - `faqc:v1:categories` — JSON Vec<Category>
/// - `faqc:v1:fingerprint` — content fingerprint hex string
use sha2::{Digest, Sha256};
use tracing::warn;

use content_common::content_api::FaqSummary;
use content_common::redis::RedisCache;

use crate::model::{Article, Category, Faq};

const KEY_PREFIX: &str = "faqc:v1:";
const SEARCH_TTL_SECS: u64 = 3600;

pub struct ContentCache {
    redis: RedisCache,
}

impl ContentCache {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    pub async fn get_faq(&self, slug: &str) -> Option<Faq> {
        let key = format!("{KEY_PREFIX}faq:{slug}");
        let json = self.redis.get(&key).await?;
        serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key, "cache deserialization failed"))
            .ok()
    }

    pub async fn set_faq(&self, faq: &Faq) {
        let Some(slug) = faq.slug.as_ref().map(|s| s.current.as_str()) else {
            return;
        };
        let key = format!("{KEY_PREFIX}faq:{slug}");
        if let Ok(json) = serde_json::to_string(faq) {
            self.redis.set(&key, &json).await;
        }
    }

    pub async fn get_article(&self, slug: &str) -> Option<Article> {
        let key = format!("{KEY_PREFIX}article:{slug}");
        let json = self.redis.get(&key).await?;
        serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key, "cache deserialization failed"))
            .ok()
    }

    pub async fn set_article(&self, article: &Article) {
        let Some(slug) = article.slug.as_ref().map(|s| s.current.as_str()) else {
            return;
        };
        let key = format!("{KEY_PREFIX}article:{slug}");
        if let Ok(json) = serde_json::to_string(article) {
            self.redis.set(&key, &json).await;
        }
    }

    pub async fn get_search_results(&self, query: &str, limit: usize) -> Option<Vec<FaqSummary>> {
        let key = search_key(query, limit);
        let json = self.redis.get(&key).await?;
        serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key, "cache deserialization failed"))
            .ok()
    }

    pub async fn set_search_results(&self, query: &str, limit: usize, results: &[FaqSummary]) {
        let key = search_key(query, limit);
        if let Ok(json) = serde_json::to_string(results) {
            self.redis.set_with_ttl(&key, &json, SEARCH_TTL_SECS).await;
        }
    }

    pub async fn get_categories(&self) -> Option<Vec<Category>> {
        let key = format!("{KEY_PREFIX}categories");
        let json = self.redis.get(&key).await?;
        serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key, "cache deserialization failed"))
            .ok()
    }

    pub async fn set_categories(&self, categories: &[Category]) {
        let key = format!("{KEY_PREFIX}categories");
        if let Ok(json) = serde_json::to_string(categories) {
            self.redis.set(&key, &json).await;
        }
    }

    pub async fn get_fingerprint(&self) -> Option<String> {
        let key = format!("{KEY_PREFIX}fingerprint");
        self.redis.get(&key).await
    }

    pub async fn set_fingerprint(&self, fingerprint: &str) {
        let key = format!("{KEY_PREFIX}fingerprint");
        self.redis.set(&key, fingerprint).await;
    }

    pub async fn invalidate_all(&self) {
        self.redis.delete_by_prefix(KEY_PREFIX).await;
    }
}

fn search_key(query: &str, limit: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update(b"|");
    hasher.update(limit.to_string().as_bytes());
    let hash = hasher.finalize();
    format!("{KEY_PREFIX}search:{:x}", hash)
}
