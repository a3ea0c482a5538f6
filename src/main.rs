//! API server binary entry point

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use video_extract_api::{start_server, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "video_extract_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("Starting video extraction API (engine mode: {})", config.extractor.mode);
    start_server(config).await?;

    Ok(())
}
