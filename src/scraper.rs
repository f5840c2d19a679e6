use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::error::{AppError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Builds the client used for every source fetch.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .build()
        .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// GETs `url` and returns the body. Any non-2xx status is a failure.
pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    debug!(%status, url, "Source responded");

    if !status.is_success() {
        return Err(AppError::StatusError(status));
    }

    response
        .text()
        .await
        .map_err(|e| AppError::ParseError(format!("Failed to read response body: {}", e)))
}
