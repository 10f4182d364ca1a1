use earnings_query_orchestrator::{api::start_server, config::AppConfig, QueryPipeline};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    info!("Earnings Query Orchestrator - API Server");
    info!("Port: {}", config.port);
    info!("Model: {}", config.model);

    let pipeline = Arc::new(QueryPipeline::from_config(&config)?);

    info!("Pipeline initialized");

    start_server(pipeline, config.port).await?;

    Ok(())
}
