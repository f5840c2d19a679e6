//! The background task that keeps the published feed fresh.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extract::extract;
use crate::feed::{FeedAssembler, FeedDocument, SearchQuery};
use crate::scraper::{build_client, fetch_html};
use crate::state::{ErrorState, FeedState};

pub struct RefreshLoop {
    client: Client,
    query: SearchQuery,
    assembler: FeedAssembler,
    interval: Duration,
    fetch_timeout: Duration,
    state: Arc<FeedState>,
}

impl RefreshLoop {
    pub fn new(config: &Config, state: Arc<FeedState>) -> Result<Self> {
        Ok(Self {
            client: build_client(config.fetch_timeout)?,
            query: config.search_query.clone(),
            assembler: config.assembler(),
            interval: config.refresh_interval,
            fetch_timeout: config.fetch_timeout,
            state,
        })
    }

    /// Scrapes, sleeps for the interval, and repeats. A failed scrape is
    /// recorded and the loop carries on.
    pub async fn run(self) {
        info!(
            url = %self.query.source_url,
            interval_mins = self.interval.as_secs() / 60,
            "Starting refresh loop"
        );
        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One scrape attempt, with its outcome written to the shared state.
    pub async fn tick(&self) {
        info!("Starting scrape");
        let start = Instant::now();

        match self.scrape().await {
            Ok(feed) => {
                info!(
                    entries = feed.entries.len(),
                    elapsed = ?start.elapsed(),
                    "Scrape successful"
                );
                self.state.publish(feed);
            }
            Err(err) => {
                warn!(error = %err, elapsed = ?start.elapsed(), "Scrape failed");
                self.state.report_error(ErrorState::from_error(&err, Utc::now()));
            }
        }
    }

    /// Fetches and parses the source page into a new feed. Holds no lock.
    pub async fn scrape(&self) -> Result<FeedDocument> {
        let html = tokio::time::timeout(
            self.fetch_timeout,
            fetch_html(&self.client, &self.query.source_url),
        )
        .await
        .map_err(|_| AppError::TimeoutError(self.fetch_timeout))??;

        let now = Utc::now();
        let records = tokio::task::spawn_blocking(move || extract(&html, now))
            .await
            .map_err(|e| AppError::ParseError(format!("Extraction task failed: {}", e)))??;

        Ok(self.assembler.assemble(&self.query, &records, now))
    }
}
