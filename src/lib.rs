pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod feed;
pub mod refresh;
pub mod scraper;
pub mod state;

use std::sync::Arc;
use state::FeedState;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedState>,
}

impl AppState {
    pub fn new(feed: Arc<FeedState>) -> Self {
        Self { feed }
    }
}
