/// MCP server for the FAQ content service.
///
/// Exposes the read-side of the site as tools:
/// - `search_faqs`: substring search over questions and summaries
/// - `get_faq` / `list_faqs` / `list_categories`: lookup and browsing
/// - `related_faqs`: scored related-content suggestions
/// - `cite_faq`: copyable citation line for a question page
/// - `get_article` / `list_articles`: article lookup and browsing
/// - `list_network_faqs`: latest questions from configured sibling sites
/// - `refresh_content`: re-fetch from the content store
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::info;

use content_common::content_api::{
    ArticleDetailResponse, ArticleListResponse, ArticleSummary, CategoryInfo,
    CategoryListResponse, CategoryRef as ApiCategoryRef, CitationResponse, CiteFaqParams,
    FaqDetailResponse, FaqListResponse, GetArticleParams, GetFaqParams, ListFaqsParams,
    NetworkFaqItem,
    NetworkFaqsParams, NetworkFaqsResponse, RefreshContentResponse, RelatedFaqsParams,
    RelatedFaqsResponse, SearchFaqsParams, SearchFaqsResponse,
};

use crate::cache::ContentCache;
use crate::citation::citation_line;
use crate::config::Config;
use crate::error::AppError;
use crate::model::{Article, Category, ContentItem, Faq};
use crate::network::ContentNetwork;
use crate::refresh::{ContentSnapshot, RefreshService};
use crate::related::{suggest_related, DEFAULT_MAX_SUGGESTIONS};
use crate::search::{to_faq_summary, SearchEngine, DEFAULT_SEARCH_LIMIT};
use crate::store::ContentStore;

const MAX_SEARCH_LIMIT: u32 = 25;
const MAX_RELATED_LIMIT: u32 = 10;
const MAX_NETWORK_LIMIT: u32 = 10;

/// Shared application state, protected by RwLock for safe concurrent reads
/// and exclusive writes during refresh. Lists keep store order (newest first)
/// so scoring and listings are deterministic.
pub struct AppState {
    pub faqs: Vec<Faq>,
    pub articles: Vec<Article>,
    pub categories: Vec<Category>,
}

impl AppState {
    pub fn from_snapshot(snapshot: ContentSnapshot) -> Self {
        Self {
            faqs: snapshot.faqs,
            articles: snapshot.articles,
            categories: snapshot.categories,
        }
    }

    fn faq_by_slug(&self, slug: &str) -> Option<&Faq> {
        self.faqs.iter().find(|f| f.slug() == Some(slug))
    }

    fn article_by_slug(&self, slug: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.slug() == Some(slug))
    }
}

#[derive(Clone)]
pub struct FaqContentServer {
    state: Arc<RwLock<AppState>>,
    store: Arc<ContentStore>,
    search_engine: Arc<SearchEngine>,
    refresh_service: Arc<RefreshService>,
    cache: Arc<ContentCache>,
    network: Arc<ContentNetwork>,
    config: Config,
    tool_router: ToolRouter<FaqContentServer>,
}

impl FaqContentServer {
    pub fn new(
        snapshot: ContentSnapshot,
        store: Arc<ContentStore>,
        cache: Arc<ContentCache>,
        refresh_service: Arc<RefreshService>,
        network: Arc<ContentNetwork>,
        config: Config,
    ) -> Self {
        let search_engine = Arc::new(SearchEngine::new(Arc::clone(&cache)));
        let state = Arc::new(RwLock::new(AppState::from_snapshot(snapshot)));

        Self {
            state,
            store,
            search_engine,
            refresh_service,
            cache,
            network,
            config,
            tool_router: Self::tool_router(),
        }
    }

    /// Cache, then the in-memory list, then a live store lookup so content
    /// published after the last refresh still resolves.
    async fn lookup_faq(&self, slug: &str) -> Result<Faq, String> {
        if let Some(cached) = self.cache.get_faq(slug).await {
            return Ok(cached);
        }

        {
            let state = self.state.read().await;
            if let Some(faq) = state.faq_by_slug(slug) {
                return Ok(faq.clone());
            }
        }

        match self.store.get_faq_by_slug(slug).await {
            Ok(faq) => {
                self.cache.set_faq(&faq).await;
                Ok(faq)
            }
            Err(AppError::NotFound(_)) => Err(format!("FAQ not found: {slug}")),
            Err(e) => Err(format!("content store lookup failed: {e}")),
        }
    }

    async fn lookup_article(&self, slug: &str) -> Result<Article, String> {
        if let Some(cached) = self.cache.get_article(slug).await {
            return Ok(cached);
        }

        {
            let state = self.state.read().await;
            if let Some(article) = state.article_by_slug(slug) {
                return Ok(article.clone());
            }
        }

        match self.store.get_article_by_slug(slug).await {
            Ok(article) => {
                self.cache.set_article(&article).await;
                Ok(article)
            }
            Err(AppError::NotFound(_)) => Err(format!("article not found: {slug}")),
            Err(e) => Err(format!("content store lookup failed: {e}")),
        }
    }
}

#[tool_router]
impl FaqContentServer {
    #[tool(description = "Search FAQs by question text and summary. Returns matches in site order (newest first).")]
    async fn search_faqs(
        &self,
        Parameters(params): Parameters<SearchFaqsParams>,
    ) -> Result<Json<SearchFaqsResponse>, String> {
        let query = params.query.trim().to_string();
        if query.is_empty() {
            return Err("query must not be empty".to_string());
        }

        let limit = params
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT as u32)
            .min(MAX_SEARCH_LIMIT) as usize;

        let state = self.state.read().await;
        let results = self.search_engine.search(&state.faqs, &query, limit).await;

        Ok(Json(SearchFaqsResponse { results }))
    }

    #[tool(description = "Get the full content of a FAQ by its URL slug, including the answer blocks.")]
    async fn get_faq(
        &self,
        Parameters(params): Parameters<GetFaqParams>,
    ) -> Result<Json<FaqDetailResponse>, String> {
        let slug = params.slug.trim().to_string();
        if slug.is_empty() {
            return Err("slug must not be empty".to_string());
        }

        let faq = self.lookup_faq(&slug).await?;
        Ok(Json(to_faq_detail(&faq)))
    }

    #[tool(description = "List FAQs, optionally filtered by category slug. Newest first.")]
    async fn list_faqs(
        &self,
        Parameters(params): Parameters<ListFaqsParams>,
    ) -> Result<Json<FaqListResponse>, String> {
        let state = self.state.read().await;

        let faqs = match params.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => {
                let known = state.categories.iter().any(|c| {
                    c.slug
                        .as_ref()
                        .map(|s| s.current.eq_ignore_ascii_case(category))
                        .unwrap_or(false)
                });
                if !known {
                    let available: Vec<&str> = state
                        .categories
                        .iter()
                        .filter_map(|c| c.slug.as_ref())
                        .map(|s| s.current.as_str())
                        .collect();
                    return Err(format!(
                        "unknown category: '{category}'. Available categories: {}",
                        available.join(", ")
                    ));
                }
                state
                    .faqs
                    .iter()
                    .filter(|f| {
                        f.category_slug()
                            .map(|s| s.eq_ignore_ascii_case(category))
                            .unwrap_or(false)
                    })
                    .map(to_faq_summary)
                    .collect()
            }
            _ => state.faqs.iter().map(to_faq_summary).collect(),
        };

        Ok(Json(FaqListResponse { faqs }))
    }

    #[tool(description = "List all categories with their FAQ counts.")]
    async fn list_categories(&self) -> Result<Json<CategoryListResponse>, String> {
        let state = self.state.read().await;

        let mut categories: Vec<CategoryInfo> = state
            .categories
            .iter()
            .map(|c| {
                let slug = c
                    .slug
                    .as_ref()
                    .map(|s| s.current.clone())
                    .unwrap_or_default();
                let faq_count = state
                    .faqs
                    .iter()
                    .filter(|f| f.category_slug() == Some(slug.as_str()))
                    .count();
                CategoryInfo {
                    slug,
                    title: c.title.clone(),
                    faq_count,
                }
            })
            .collect();
        categories.sort_by(|a, b| a.slug.cmp(&b.slug));

        Ok(Json(CategoryListResponse { categories }))
    }

    #[tool(description = "Suggest FAQs related to the given one. Editorially curated lists take precedence; otherwise candidates are scored by category, keyword and question-word overlap.")]
    async fn related_faqs(
        &self,
        Parameters(params): Parameters<RelatedFaqsParams>,
    ) -> Result<Json<RelatedFaqsResponse>, String> {
        let slug = params.slug.trim().to_string();
        if slug.is_empty() {
            return Err("slug must not be empty".to_string());
        }

        let limit = params
            .limit
            .unwrap_or(DEFAULT_MAX_SUGGESTIONS as u32)
            .min(MAX_RELATED_LIMIT) as usize;

        let current = self.lookup_faq(&slug).await?;
        let state = self.state.read().await;

        let manual = !current.manual_related.is_empty();
        let related = suggest_related(&current, &current.manual_related, &state.faqs, limit)
            .into_iter()
            .map(to_faq_summary)
            .collect();

        Ok(Json(RelatedFaqsResponse { related, manual }))
    }

    #[tool(description = "Build a copyable citation line for a FAQ (author, question, site name, date, canonical URL).")]
    async fn cite_faq(
        &self,
        Parameters(params): Parameters<CiteFaqParams>,
    ) -> Result<Json<CitationResponse>, String> {
        let slug = params.slug.trim().to_string();
        if slug.is_empty() {
            return Err("slug must not be empty".to_string());
        }

        let faq = self.lookup_faq(&slug).await?;
        let url = self.config.faq_url(faq.slug().unwrap_or(slug.as_str()));
        let citation = citation_line(
            faq.display_text().unwrap_or_default(),
            &url,
            &self.config.site_name,
            faq.published_at.as_deref(),
            faq.author_name(),
        );

        Ok(Json(CitationResponse { citation, url }))
    }

    #[tool(description = "Get the full content of an article by its URL slug.")]
    async fn get_article(
        &self,
        Parameters(params): Parameters<GetArticleParams>,
    ) -> Result<Json<ArticleDetailResponse>, String> {
        let slug = params.slug.trim().to_string();
        if slug.is_empty() {
            return Err("slug must not be empty".to_string());
        }

        let article = self.lookup_article(&slug).await?;
        Ok(Json(to_article_detail(&article)))
    }

    #[tool(description = "List all articles, newest first.")]
    async fn list_articles(&self) -> Result<Json<ArticleListResponse>, String> {
        let state = self.state.read().await;
        let articles = state
            .articles
            .iter()
            .map(|a| ArticleSummary {
                slug: a.slug().unwrap_or_default().to_string(),
                title: a.display_text().unwrap_or_default().to_string(),
                published_at: a.published_at.clone(),
            })
            .collect();
        Ok(Json(ArticleListResponse { articles }))
    }

    #[tool(description = "List the latest FAQs from a configured sibling site.")]
    async fn list_network_faqs(
        &self,
        Parameters(params): Parameters<NetworkFaqsParams>,
    ) -> Result<Json<NetworkFaqsResponse>, String> {
        if self.network.is_empty() {
            return Err("no network sites configured".to_string());
        }

        let site_key = params.site.trim().to_string();
        if site_key.is_empty() {
            return Err("site must not be empty".to_string());
        }
        let limit = params.limit.unwrap_or(3).min(MAX_NETWORK_LIMIT) as usize;

        let (site, faqs) = self
            .network
            .latest_faqs(&site_key, limit)
            .await
            .map_err(|e| format!("network lookup failed: {e}"))?;

        let site_origin = site.site_url.trim_end_matches('/').to_string();
        let faqs = faqs
            .iter()
            .map(|f| NetworkFaqItem {
                question: f.display_text().unwrap_or_default().to_string(),
                url: format!("{site_origin}/faqs/{}", f.slug().unwrap_or_default()),
                summary: f.summary.clone(),
            })
            .collect();

        Ok(Json(NetworkFaqsResponse {
            site: site.key,
            site_name: site.site_name,
            faqs,
        }))
    }

    #[tool(description = "Re-fetch content from the store. Rewrites caches and in-memory state when the content fingerprint changed.")]
    async fn refresh_content(&self) -> Result<Json<RefreshContentResponse>, String> {
        info!("refresh_content tool invoked");

        let (result, snapshot) = self
            .refresh_service
            .refresh()
            .await
            .map_err(|e| format!("refresh failed: {e}"))?;

        if result.updated {
            let mut state = self.state.write().await;
            *state = AppState::from_snapshot(snapshot);
            info!(
                faq_count = result.faq_count,
                article_count = result.article_count,
                "in-memory state updated"
            );
        }

        Ok(Json(RefreshContentResponse {
            updated: result.updated,
            fingerprint: result.fingerprint,
            faq_count: result.faq_count,
            article_count: result.article_count,
        }))
    }
}

fn to_faq_detail(faq: &Faq) -> FaqDetailResponse {
    FaqDetailResponse {
        slug: faq.slug().unwrap_or_default().to_string(),
        question: faq.display_text().unwrap_or_default().to_string(),
        summary: faq.summary.clone(),
        answer: faq.answer.clone(),
        keywords: faq.keywords.clone(),
        tags: faq.tags.clone(),
        category: faq.category.as_ref().map(|c| ApiCategoryRef {
            title: c.title.clone(),
            slug: c
                .slug
                .as_ref()
                .map(|s| s.current.clone())
                .unwrap_or_default(),
        }),
        published_at: faq.published_at.clone(),
        updated_at: faq.updated_at.clone(),
        author: faq.author_name().map(str::to_string),
        image_url: faq.image_url().map(str::to_string),
    }
}

fn to_article_detail(article: &Article) -> ArticleDetailResponse {
    ArticleDetailResponse {
        slug: article.slug().unwrap_or_default().to_string(),
        title: article.display_text().unwrap_or_default().to_string(),
        body: article.body.clone(),
        category: article.category.as_ref().map(|c| c.title.clone()),
        author: article.author_name().map(str::to_string),
        published_at: article.published_at.clone(),
        updated_at: article.updated_at.clone(),
        image_url: article.image_url().map(str::to_string),
    }
}

#[tool_handler]
impl ServerHandler for FaqContentServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "faq-content".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "FAQ content server backed by a headless CMS. Use search_faqs for \
                 free-text lookup, get_faq/list_faqs/list_categories for browsing, \
                 related_faqs for suggestions around a question, cite_faq for a \
                 citation line, get_article/list_articles for articles, \
                 list_network_faqs for sibling sites, and refresh_content to pick \
                 up newly published documents."
                    .to_string(),
            ),
        }
    }
}
