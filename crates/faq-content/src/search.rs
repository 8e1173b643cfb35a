use std::sync::Arc;

use tracing::info;

use content_common::content_api::FaqSummary;

use crate::cache::ContentCache;
use crate::model::{is_displayable, ContentItem, Faq};

pub const DEFAULT_SEARCH_LIMIT: usize = 5;
const MIN_QUERY_CHARS: usize = 2;

/// Substring search over an already-fetched list.
///
/// Queries shorter than two characters return nothing. Matching is
/// case-insensitive against display text and summary; input order is kept and
/// the result is truncated to `limit`.
pub fn search_items<'a, T: ContentItem>(items: &'a [T], query: &str, limit: usize) -> Vec<&'a T> {
    let term = query.trim().to_lowercase();
    if term.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    items
        .iter()
        .filter(|item| is_displayable(*item))
        .filter(|item| {
            let in_text = item
                .display_text()
                .map(|t| t.to_lowercase().contains(&term))
                .unwrap_or(false);
            let in_summary = item
                .summary()
                .map(|s| s.to_lowercase().contains(&term))
                .unwrap_or(false);
            in_text || in_summary
        })
        .take(limit)
        .collect()
}

pub fn to_faq_summary(faq: &Faq) -> FaqSummary {
    FaqSummary {
        slug: faq.slug().unwrap_or_default().to_string(),
        question: faq.display_text().unwrap_or_default().to_string(),
        summary: faq.summary.clone(),
        category: faq.category.as_ref().map(|c| c.title.clone()),
    }
}

/// FAQ search with a Redis-cached result layer in front of the in-memory scan.
pub struct SearchEngine {
    cache: Arc<ContentCache>,
}

impl SearchEngine {
    pub fn new(cache: Arc<ContentCache>) -> Self {
        Self { cache }
    }

    pub async fn search(&self, faqs: &[Faq], query: &str, limit: usize) -> Vec<FaqSummary> {
        if let Some(cached) = self.cache.get_search_results(query, limit).await {
            info!(query, "search cache hit");
            return cached;
        }

        let results: Vec<FaqSummary> = search_items(faqs, query, limit)
            .into_iter()
            .map(to_faq_summary)
            .collect();
        self.cache.set_search_results(query, limit, &results).await;
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn faq(id: &str, question: &str, slug: &str, summary: Option<&str>) -> Faq {
        let mut doc = json!({
            "_id": id,
            "question": question,
            "slug": {"current": slug},
        });
        if let Some(s) = summary {
            doc["summaryForAI"] = json!(s);
        }
        serde_json::from_value(doc).expect("faq should decode")
    }

    #[test]
    fn short_queries_return_nothing() {
        let faqs = vec![faq("a", "What is a slug", "slug", None)];
        assert!(search_items(&faqs, "s", 5).is_empty());
        assert!(search_items(&faqs, "  ", 5).is_empty());
        assert!(search_items(&faqs, "", 5).is_empty());
    }

    #[test]
    fn matches_question_and_summary_case_insensitively() {
        let faqs = vec![
            faq("a", "What is ultra processed food", "upf", None),
            faq("b", "Unrelated", "other", Some("covers PROCESSED snacks")),
            faq("c", "Nothing here", "none", None),
        ];
        let hits = search_items(&faqs, "Processed", 5);
        let slugs: Vec<_> = hits.iter().map(|f| f.slug().unwrap_or_default()).collect();
        assert_eq!(slugs, vec!["upf", "other"]);
    }

    #[test]
    fn results_are_truncated_in_input_order() {
        let faqs: Vec<Faq> = (0..8)
            .map(|i| faq(&format!("id-{i}"), "Shared topic", &format!("s-{i}"), None))
            .collect();
        let hits = search_items(&faqs, "shared", 3);
        let slugs: Vec<_> = hits.iter().map(|f| f.slug().unwrap_or_default()).collect();
        assert_eq!(slugs, vec!["s-0", "s-1", "s-2"]);
    }

    #[test]
    fn undisplayable_items_are_skipped() {
        let invalid: Faq =
            serde_json::from_value(json!({"_id": "x", "question": "searchable text"})).unwrap();
        let faqs = vec![invalid, faq("a", "searchable text", "ok", None)];
        let hits = search_items(&faqs, "searchable", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug(), Some("ok"));
    }

    #[test]
    fn summary_projection_carries_category_title() {
        let faq: Faq = serde_json::from_value(json!({
            "_id": "a",
            "question": "Q",
            "slug": {"current": "q"},
            "summaryForAI": "short",
            "category": {"title": "Nutrition", "slug": {"current": "nutrition"}}
        }))
        .unwrap();
        let summary = to_faq_summary(&faq);
        assert_eq!(summary.slug, "q");
        assert_eq!(summary.category.as_deref(), Some("Nutrition"));
    }
}
