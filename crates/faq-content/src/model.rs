use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Slug wrapper matching the store's `{"current": "..."}` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// A category as projected into a document (`category->{title, slug}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    pub title: String,
    pub slug: Option<Slug>,
}

/// A category document (`*[_type == "category"]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Option<Slug>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub asset: Option<ImageAsset>,
    pub alt: Option<String>,
}

/// A FAQ document.
///
/// Fields the store does not guarantee are optional; validity for serving is
/// decided by [`is_displayable`], applied once at the store boundary.
/// Timestamps stay as the raw RFC 3339 strings the store returns and are
/// parsed only where a date is actually needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub slug: Option<Slug>,
    /// Portable-text answer blocks, kept opaque.
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
    #[serde(default, rename = "summaryForAI")]
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    /// Editor-curated related FAQs; when non-empty this overrides automatic
    /// suggestions. Dangling references arrive as nulls and are dropped.
    #[serde(
        default,
        rename = "manualRelated",
        deserialize_with = "compact_refs"
    )]
    pub manual_related: Vec<Faq>,
}

/// An article document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// Uniform access to the fields relevance scoring and search operate on, so
/// both are written once for FAQs and articles.
pub trait ContentItem {
    fn id(&self) -> &str;
    fn display_text(&self) -> Option<&str>;
    fn slug(&self) -> Option<&str>;
    fn keywords(&self) -> &[String];
    fn category_slug(&self) -> Option<&str>;
    fn summary(&self) -> Option<&str> {
        None
    }
}

impl ContentItem for Faq {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_text(&self) -> Option<&str> {
        self.question.as_deref()
    }

    fn slug(&self) -> Option<&str> {
        self.slug.as_ref().map(|s| s.current.as_str())
    }

    fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn category_slug(&self) -> Option<&str> {
        self.category
            .as_ref()
            .and_then(|c| c.slug.as_ref())
            .map(|s| s.current.as_str())
    }

    fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

impl ContentItem for Article {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_text(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn slug(&self) -> Option<&str> {
        self.slug.as_ref().map(|s| s.current.as_str())
    }

    fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn category_slug(&self) -> Option<&str> {
        self.category
            .as_ref()
            .and_then(|c| c.slug.as_ref())
            .map(|s| s.current.as_str())
    }
}

/// The single validity predicate: an item may be served or scored only when it
/// has a non-empty slug and non-empty display text.
pub fn is_displayable<T: ContentItem + ?Sized>(item: &T) -> bool {
    let has_slug = item.slug().map(|s| !s.trim().is_empty()).unwrap_or(false);
    let has_text = item
        .display_text()
        .map(|t| !t.trim().is_empty())
        .unwrap_or(false);
    has_slug && has_text
}

impl Faq {
    pub fn image_url(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(|i| i.asset.as_ref())
            .and_then(|a| a.url.as_deref())
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.name.as_deref())
    }

    pub fn published_ts(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.published_at.as_deref())
    }
}

impl Article {
    pub fn image_url(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(|i| i.asset.as_ref())
            .and_then(|a| a.url.as_deref())
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.name.as_deref())
    }

    pub fn published_ts(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(self.published_at.as_deref())
    }
}

/// Lenient RFC 3339 parse; malformed store timestamps read as absent.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

/// Reference arrays from the store contain nulls where a reference dangles;
/// decode `null`/missing arrays as empty and drop null elements.
fn compact_refs<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn faq_from(value: serde_json::Value) -> Faq {
        serde_json::from_value(value).expect("faq should decode")
    }

    #[test]
    fn decodes_store_shaped_document() {
        let faq = faq_from(json!({
            "_id": "faq-1",
            "question": "What is ultra processed food",
            "slug": {"current": "what-is-ultra-processed-food"},
            "summaryForAI": "A short answer.",
            "keywords": ["diet", "upf"],
            "category": {"title": "Nutrition", "slug": {"current": "nutrition"}},
            "publishedAt": "2024-06-12T09:30:00Z",
            "author": {"name": "A. Writer"},
            "image": {"asset": {"url": "https://cdn.example/img.jpg"}, "alt": "plate"},
            "answer": [{"_type": "block", "children": []}]
        }));

        assert_eq!(faq.id, "faq-1");
        assert_eq!(faq.slug(), Some("what-is-ultra-processed-food"));
        assert_eq!(faq.category_slug(), Some("nutrition"));
        assert_eq!(faq.image_url(), Some("https://cdn.example/img.jpg"));
        assert_eq!(faq.author_name(), Some("A. Writer"));
        assert!(faq.published_ts().is_some());
        assert!(is_displayable(&faq));
    }

    #[test]
    fn missing_optional_fields_decode_to_defaults() {
        let faq = faq_from(json!({"_id": "faq-2"}));
        assert!(faq.question.is_none());
        assert!(faq.keywords.is_empty());
        assert!(faq.manual_related.is_empty());
        assert!(!is_displayable(&faq));
    }

    #[test]
    fn dangling_manual_references_are_dropped() {
        let faq = faq_from(json!({
            "_id": "faq-3",
            "question": "Q",
            "slug": {"current": "q"},
            "manualRelated": [
                null,
                {"_id": "faq-4", "question": "Other", "slug": {"current": "other"}},
                null
            ]
        }));
        assert_eq!(faq.manual_related.len(), 1);
        assert_eq!(faq.manual_related[0].id, "faq-4");
    }

    #[test]
    fn displayable_requires_both_slug_and_text() {
        let no_slug = faq_from(json!({"_id": "a", "question": "Q"}));
        let empty_slug = faq_from(json!({"_id": "b", "question": "Q", "slug": {"current": "  "}}));
        let no_text = faq_from(json!({"_id": "c", "slug": {"current": "c"}}));
        let blank_text = faq_from(json!({"_id": "d", "question": "", "slug": {"current": "d"}}));
        let ok = faq_from(json!({"_id": "e", "question": "Q", "slug": {"current": "e"}}));

        assert!(!is_displayable(&no_slug));
        assert!(!is_displayable(&empty_slug));
        assert!(!is_displayable(&no_text));
        assert!(!is_displayable(&blank_text));
        assert!(is_displayable(&ok));
    }

    #[test]
    fn malformed_timestamp_reads_as_absent() {
        let faq = faq_from(json!({
            "_id": "f",
            "question": "Q",
            "slug": {"current": "f"},
            "publishedAt": "not-a-date"
        }));
        assert!(faq.published_ts().is_none());
    }
}
