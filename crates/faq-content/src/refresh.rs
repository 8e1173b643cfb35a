/// Refresh service for CMS content.
///
/// The dataset has no single version marker, so a fingerprint over document
/// identities and their update timestamps stands in for one: refreshing
/// re-fetches everything, compares fingerprints, and only rewrites caches when
/// the content actually changed. Triggered at startup and on-demand via the
/// `refresh_content` tool.
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::cache::ContentCache;
use crate::error::AppError;
use crate::model::{Article, Category, Faq};
use crate::store::ContentStore;

/// Everything the server holds in memory, as fetched in one pass.
pub struct ContentSnapshot {
    pub faqs: Vec<Faq>,
    pub articles: Vec<Article>,
    pub categories: Vec<Category>,
}

/// Result of a refresh operation.
pub struct RefreshResult {
    /// Whether caches were rewritten (false if content was unchanged).
    pub updated: bool,
    /// Fingerprint of the fetched content.
    pub fingerprint: String,
    pub faq_count: usize,
    pub article_count: usize,
}

pub struct RefreshService {
    store: Arc<ContentStore>,
    cache: Arc<ContentCache>,
}

impl RefreshService {
    pub fn new(store: Arc<ContentStore>, cache: Arc<ContentCache>) -> Self {
        Self { store, cache }
    }

    /// Fetch FAQs, articles and categories concurrently.
    pub async fn fetch_snapshot(&self) -> Result<ContentSnapshot, AppError> {
        let (faqs, articles, categories) = futures::try_join!(
            self.store.list_faqs(),
            self.store.list_articles(),
            self.store.list_categories(),
        )?;
        Ok(ContentSnapshot {
            faqs,
            articles,
            categories,
        })
    }

    /// Run a full refresh cycle: fetch, compare fingerprints, repopulate
    /// caches if the content changed. Always returns the fresh snapshot so
    /// the caller can (re)build its in-memory state.
    pub async fn refresh(&self) -> Result<(RefreshResult, ContentSnapshot), AppError> {
        let snapshot = self.fetch_snapshot().await?;
        let fingerprint = content_fingerprint(&snapshot);

        let cached = self.cache.get_fingerprint().await;
        if cached.as_deref() == Some(fingerprint.as_str()) {
            info!(fingerprint = %fingerprint, "content unchanged, skipping cache rewrite");
            return Ok((
                RefreshResult {
                    updated: false,
                    fingerprint,
                    faq_count: snapshot.faqs.len(),
                    article_count: snapshot.articles.len(),
                },
                snapshot,
            ));
        }

        self.cache.invalidate_all().await;
        for faq in &snapshot.faqs {
            self.cache.set_faq(faq).await;
        }
        for article in &snapshot.articles {
            self.cache.set_article(article).await;
        }
        self.cache.set_categories(&snapshot.categories).await;
        self.cache.set_fingerprint(&fingerprint).await;

        info!(
            fingerprint = %fingerprint,
            faqs = snapshot.faqs.len(),
            articles = snapshot.articles.len(),
            categories = snapshot.categories.len(),
            "content refresh complete"
        );

        Ok((
            RefreshResult {
                updated: true,
                fingerprint,
                faq_count: snapshot.faqs.len(),
                article_count: snapshot.articles.len(),
            },
            snapshot,
        ))
    }
}

/// Order-independent digest of document identities and update markers.
pub fn content_fingerprint(snapshot: &ContentSnapshot) -> String {
    let mut entries: Vec<String> = Vec::with_capacity(
        snapshot.faqs.len() + snapshot.articles.len() + snapshot.categories.len(),
    );
    for faq in &snapshot.faqs {
        entries.push(format!(
            "faq:{}:{}",
            faq.id,
            faq.updated_at
                .as_deref()
                .or(faq.published_at.as_deref())
                .unwrap_or("")
        ));
    }
    for article in &snapshot.articles {
        entries.push(format!(
            "article:{}:{}",
            article.id,
            article
                .updated_at
                .as_deref()
                .or(article.published_at.as_deref())
                .unwrap_or("")
        ));
    }
    for category in &snapshot.categories {
        entries.push(format!("category:{}:{}", category.id, category.title));
    }
    entries.sort();

    let mut hasher = Sha256::new();
    for entry in &entries {
        hasher.update(entry.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
