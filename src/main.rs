use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use binger_api::{
    config::Config,
    db,
    routes::{create_router, AppState},
    services::{
        mood::{MoodTable, SimilarityLexicon},
        providers::TmdbProvider,
        radar::RadarCache,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = db::Cache::new(redis_client).await;

    let provider = TmdbProvider::new(cache, &config)?;

    let state = AppState {
        provider: Arc::new(provider),
        store: db::WatchStore::new(pool),
        radar: Arc::new(RadarCache::new()),
        moods: Arc::new(MoodTable::default()),
        lexicon: Arc::new(SimilarityLexicon::default()),
        locale: config.locale.clone(),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Binger API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush pending cache writes before exiting.
    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
