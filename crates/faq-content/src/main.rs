mod cache;
mod citation;
mod config;
mod error;
mod model;
mod network;
mod refresh;
mod related;
mod search;
mod server;
mod store;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use content_common::sanity::SanityClient;

use cache::ContentCache;
use config::Config;
use network::ContentNetwork;
use refresh::RefreshService;
use server::FaqContentServer;
use store::ContentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting faq-content MCP server");

    let config = Config::from_env()?;
    info!(
        project = %config.sanity.project_id,
        dataset = %config.sanity.dataset,
        site = %config.site_url,
        redis = config.redis_url.is_some(),
        "configuration loaded"
    );

    let redis_cache = content_common::redis::RedisCache::new(config.redis_url.as_deref());
    if redis_cache.is_available().await {
        info!("redis connected");
    } else {
        info!("redis unavailable, running without cache");
    }
    let cache = Arc::new(ContentCache::new(redis_cache));

    let client = SanityClient::new(config.sanity.clone())?;
    let store = Arc::new(ContentStore::new(client));

    let network = Arc::new(ContentNetwork::from_env()?);
    if !network.is_empty() {
        info!(sites = ?network.site_keys(), "network sites configured");
    }

    let refresh_service = Arc::new(RefreshService::new(
        Arc::clone(&store),
        Arc::clone(&cache),
    ));

    let (result, snapshot) = refresh_service.refresh().await?;
    info!(
        updated = result.updated,
        faqs = result.faq_count,
        articles = result.article_count,
        "content loaded"
    );

    let server = FaqContentServer::new(
        snapshot,
        store,
        cache,
        refresh_service,
        network,
        config,
    );

    if let Ok(addr) = std::env::var("MCP_TCP_LISTEN_ADDR") {
        let listener = TcpListener::bind(&addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                tracing::info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                tracing::info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
