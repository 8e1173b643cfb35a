use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchFaqsParams {
    /// Free-text search over question text and summaries.
    pub query: String,
    /// Maximum number of results to return (default: 5, max: 25).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetFaqParams {
    /// URL slug of the FAQ, e.g. "what-is-ultra-processed-food".
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListFaqsParams {
    /// Optional category slug to filter by.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RelatedFaqsParams {
    /// URL slug of the FAQ to find related content for.
    pub slug: String,
    /// Maximum number of suggestions (default: 3, max: 10).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CiteFaqParams {
    /// URL slug of the FAQ to build a citation line for.
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetArticleParams {
    /// URL slug of the article.
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NetworkFaqsParams {
    /// Key of a configured sibling site.
    pub site: String,
    /// Maximum number of FAQs to return (default: 3, max: 10).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FaqSummary {
    pub slug: String,
    pub question: String,
    pub summary: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchFaqsResponse {
    pub results: Vec<FaqSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FaqListResponse {
    pub faqs: Vec<FaqSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryRef {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryInfo {
    pub slug: String,
    pub title: String,
    pub faq_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FaqDetailResponse {
    pub slug: String,
    pub question: String,
    pub summary: Option<String>,
    /// Portable-text answer blocks, passed through as the store returned them.
    pub answer: Option<serde_json::Value>,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub category: Option<CategoryRef>,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RelatedFaqsResponse {
    pub related: Vec<FaqSummary>,
    /// True when the list came from the editorial override rather than scoring.
    pub manual: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CitationResponse {
    pub citation: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArticleDetailResponse {
    pub slug: String,
    pub title: String,
    pub body: Option<serde_json::Value>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    pub updated_at: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NetworkFaqItem {
    pub question: String,
    pub url: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NetworkFaqsResponse {
    pub site: String,
    pub site_name: String,
    pub faqs: Vec<NetworkFaqItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefreshContentResponse {
    pub updated: bool,
    pub fingerprint: String,
    pub faq_count: usize,
    pub article_count: usize,
}
