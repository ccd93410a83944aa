use parse_video::api::server::{AppState, shutdown_signal};
use parse_video::{ApiServer, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parse_video=info,share_parser=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState::new(&config)?;
    let server = ApiServer::new(config, state);

    let cancel_token = server.cancel_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel_token.cancel();
    });

    server.run().await?;
    tracing::info!("parse-video stopped");
    Ok(())
}
