use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use event_graph_api::{
    api::{create_router, AppState},
    config::{Config, RankingConfig},
    services::{DataSources, RecommendationService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let ranking = RankingConfig::from_env()?;
    ranking.validate()?;

    tracing::info!(
        alpha = ranking.alpha,
        top_k = ranking.top_k,
        debug = ranking.debug,
        "Ranking parameters loaded"
    );

    let sources = DataSources::connect(&config).await?;
    let recommendations = RecommendationService::new(sources.users, sources.catalog, ranking)
        .with_concurrency(config.max_concurrent_rankings)
        .with_timeout(config.ranking_timeout_ms.map(Duration::from_millis));

    let app = create_router(AppState::new(recommendations));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
