use std::sync::Arc;

use chrono::Utc;
use listing_feed::{
    AppState,
    api::routes::create_router,
    config::Config,
    refresh::RefreshLoop,
    state::FeedState,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };
    info!(
        url = %config.search_query.source_url,
        interval_mins = config.refresh_interval.as_secs() / 60,
        "Scraping search"
    );

    // Served until the first scrape lands
    let seed = config
        .assembler()
        .assemble(&config.search_query, &[], Utc::now());
    let feed_state = Arc::new(FeedState::new(seed));

    let refresh = RefreshLoop::new(&config, Arc::clone(&feed_state))?;
    tokio::spawn(refresh.run());

    let app = create_router(AppState::new(feed_state));
    let listener = TcpListener::bind(config.server_addr).await?;

    info!("Serving on {}", config.server_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
