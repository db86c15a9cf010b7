/// API сервер оценки стоимости жилья

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use house_price_ml::{api, config::Config, InferencePipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!("Startup failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Артефакты грузятся до открытия сокета: без них сервис не стартует
    let pipeline = InferencePipeline::from_artifacts(&config.artifacts)
        .context("cannot start without scaler and model artifacts")?;

    let app = api::router(Arc::new(pipeline));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
