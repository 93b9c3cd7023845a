use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use libreria_chatbot::{
    config::Config,
    network,
    routes,
    services::{
        catalog::fetch_catalog,
        chat_session::ChatSession,
        gemini::GeminiClient,
        instruction::compose_instruction,
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .context("building HTTP client")?;

    let catalog = fetch_catalog(&http, &config.catalog_url).await;
    let instruction = compose_instruction(&config.knowledge_file, &catalog).await?;

    let model = GeminiClient::new(
        http,
        config.gemini_base_url.as_str(),
        config.model.as_str(),
        config.api_key.as_str(),
    );
    let state = Arc::new(AppState::new(ChatSession::new(Arc::new(model)), instruction));

    let app = routes::create_router()
        .with_state(state)
        .layer(CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;

    let ip = network::local_ip().await;
    tracing::info!(bind = %config.bind_addr(), model = %config.model, "server starting");
    println!("🚀 Servidor corriendo en http://{}:{}", ip, config.port);

    axum::serve(listener, app).await?;
    Ok(())
}
