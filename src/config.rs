use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::error::{AppError, Result};
use crate::feed::{Author, FeedAssembler, SearchQuery};

/// Republishes a classifieds search as an RSS feed.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    /// URL of the search results page, e.g. https://city.craigslist.org/search/bia?query=bicycle&sort=date
    #[arg(long, env = "SEARCH_URL")]
    pub url: String,

    /// Minutes to wait between scrapes
    #[arg(long, env = "SCRAPE_INTERVAL_MINUTES", default_value_t = 120)]
    pub interval: u64,

    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Seconds before a source fetch is abandoned
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout: u64,

    #[arg(long, env = "FEED_TITLE", default_value = "Craigslist Search")]
    pub feed_title: String,

    #[arg(long, env = "FEED_AUTHOR_NAME", default_value = "")]
    pub author_name: String,

    #[arg(long, env = "FEED_AUTHOR_EMAIL", default_value = "")]
    pub author_email: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub search_query: SearchQuery,
    pub refresh_interval: Duration,
    pub fetch_timeout: Duration,
    pub feed_title: String,
    pub author: Author,
}

impl Config {
    /// Reads `.env`, the environment and the command line.
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let url = Url::parse(&args.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::ConfigError(format!(
                "Unsupported URL scheme '{}'",
                url.scheme()
            )));
        }
        let search_query = SearchQuery::from_source_url(&args.url)?;

        if args.interval == 0 {
            return Err(AppError::ConfigError(
                "Scrape interval must be at least one minute".to_string(),
            ));
        }
        if args.fetch_timeout == 0 {
            return Err(AppError::ConfigError(
                "Fetch timeout must be at least one second".to_string(),
            ));
        }

        let ip = IpAddr::from_str(&args.host)
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, args.port),
            search_query,
            refresh_interval: Duration::from_secs(args.interval * 60),
            fetch_timeout: Duration::from_secs(args.fetch_timeout),
            feed_title: args.feed_title,
            author: Author {
                name: args.author_name,
                email: args.author_email,
            },
        })
    }

    pub fn assembler(&self) -> FeedAssembler {
        FeedAssembler::new(self.feed_title.clone(), self.author.clone())
    }
}
