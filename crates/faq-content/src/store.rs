/// Read-only boundary to the content store.
///
/// GROQ projections mirror what the pages consume; every result is passed
/// through `is_displayable` here, once, so downstream consumers (scoring,
/// search, the tool surface) can assume well-formed items. Point lookups
/// distinguish "not found" from transport failure.
use serde_json::json;

use content_common::error::CommonError;
use content_common::sanity::SanityClient;

use crate::error::AppError;
use crate::model::{is_displayable, Article, Category, Faq};

const FAQ_PROJECTION: &str = r#"{
  _id,
  question,
  answer,
  slug,
  summaryForAI,
  keywords,
  tags,
  category->{title, slug},
  publishedAt,
  updatedAt,
  author->{name},
  image{asset->{url}, alt},
  "manualRelated": relatedFAQs[]->{
    _id,
    question,
    slug,
    summaryForAI,
    keywords,
    category->{title, slug},
    image{asset->{url}}
  }
}"#;

const ARTICLE_PROJECTION: &str = r#"{
  _id,
  title,
  slug,
  body,
  keywords,
  category->{title, slug},
  publishedAt,
  updatedAt,
  author->{name},
  image{asset->{url}, alt}
}"#;

pub struct ContentStore {
    client: SanityClient,
}

impl ContentStore {
    pub fn new(client: SanityClient) -> Self {
        Self { client }
    }

    pub async fn get_faq_by_slug(&self, slug: &str) -> Result<Faq, AppError> {
        let groq = format!("*[_type == \"faq\" && slug.current == $slug][0] {FAQ_PROJECTION}");
        let found: Option<Faq> = self
            .client
            .fetch(&groq, &[("slug", json!(slug))])
            .await
            .map_err(CommonError::from)?;
        found
            .filter(|f| is_displayable(f))
            .ok_or_else(|| AppError::NotFound(format!("faq: {slug}")))
    }

    pub async fn get_article_by_slug(&self, slug: &str) -> Result<Article, AppError> {
        let groq =
            format!("*[_type == \"article\" && slug.current == $slug][0] {ARTICLE_PROJECTION}");
        let found: Option<Article> = self
            .client
            .fetch(&groq, &[("slug", json!(slug))])
            .await
            .map_err(CommonError::from)?;
        found
            .filter(|a| is_displayable(a))
            .ok_or_else(|| AppError::NotFound(format!("article: {slug}")))
    }

    /// All displayable FAQs, newest first.
    pub async fn list_faqs(&self) -> Result<Vec<Faq>, AppError> {
        let groq = format!(
            "*[_type == \"faq\" && defined(slug.current)] | order(publishedAt desc) {FAQ_PROJECTION}"
        );
        let mut faqs: Vec<Faq> = self.client.fetch(&groq, &[]).await.map_err(CommonError::from)?;
        faqs.retain(|f| is_displayable(f));
        // Stable re-sort: newest first, undated items last in store order.
        faqs.sort_by(|a, b| b.published_ts().cmp(&a.published_ts()));
        Ok(faqs)
    }

    /// All displayable articles, newest first.
    pub async fn list_articles(&self) -> Result<Vec<Article>, AppError> {
        let groq = format!(
            "*[_type == \"article\" && defined(slug.current)] | order(publishedAt desc) {ARTICLE_PROJECTION}"
        );
        let mut articles: Vec<Article> =
            self.client.fetch(&groq, &[]).await.map_err(CommonError::from)?;
        articles.retain(|a| is_displayable(a));
        articles.sort_by(|a, b| b.published_ts().cmp(&a.published_ts()));
        Ok(articles)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let groq = "*[_type == \"category\"] | order(title asc) {_id, title, slug}";
        let categories: Vec<Category> =
            self.client.fetch(groq, &[]).await.map_err(CommonError::from)?;
        Ok(categories)
    }
}
