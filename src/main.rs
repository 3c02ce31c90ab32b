mod api;
mod config;
mod error;
mod guardrails;
mod ml;
mod telemetry;

use anyhow::Context;
use dotenv::dotenv;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;
    telemetry::init(config.log_format);

    let app = api::router();

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!("🚀 Sentiment Analyzer listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
