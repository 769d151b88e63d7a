use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use todo_api::auth::AuthKeys;
use todo_api::config::Config;
use todo_api::genai::{GeminiClient, TextGenerator, UnconfiguredGenerator};
use todo_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();

    let pool = db::create_pool(&config.database_url)
        .await
        .context("failed to open database")?;
    db::init_schema(&pool)
        .await
        .context("failed to create schema")?;

    let generator: Arc<dyn TextGenerator> = match &config.google_api_key {
        Some(key) => Arc::new(GeminiClient::new(key.clone(), config.gemini_model.clone())),
        None => {
            warn!("GOOGLE_API_KEY not set; AI endpoints will return 502");
            Arc::new(UnconfiguredGenerator)
        }
    };

    let state = AppState {
        pool,
        auth: AuthKeys::new(&config.jwt_secret),
        generator,
    };

    let app = routes::router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
