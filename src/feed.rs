//! Feed assembly and RSS rendering.

use chrono::{DateTime, Utc};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};
use url::Url;

use crate::error::{AppError, Result};
use crate::extract::ListingRecord;

const QUERY_MARKER: &str = "?query=";

/// The search term embedded in the source URL, plus the URL itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub source_url: String,
}

impl SearchQuery {
    /// Takes the text between `?query=` and the next `&`.
    pub fn from_source_url(source_url: &str) -> Result<Self> {
        let malformed = || AppError::MalformedSourceUrl(source_url.to_string());

        let start = source_url.find(QUERY_MARKER).ok_or_else(malformed)? + QUERY_MARKER.len();
        let len = source_url[start..].find('&').ok_or_else(malformed)?;
        let term = &source_url[start..start + len];
        if term.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            term: term.to_string(),
            source_url: source_url.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub description: String,
    pub link: String,
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: Author,
    pub created: DateTime<Utc>,
    pub entries: Vec<FeedEntry>,
}

/// Builds feed documents with fixed channel metadata.
#[derive(Debug, Clone)]
pub struct FeedAssembler {
    title: String,
    author: Author,
}

impl FeedAssembler {
    pub fn new(title: impl Into<String>, author: Author) -> Self {
        Self {
            title: title.into(),
            author,
        }
    }

    pub fn assemble(
        &self,
        query: &SearchQuery,
        records: &[ListingRecord],
        now: DateTime<Utc>,
    ) -> FeedDocument {
        let base = Url::parse(&query.source_url).ok();
        let entries = records
            .iter()
            .map(|record| FeedEntry {
                title: format!("{} | {}", record.title, record.price),
                description: format!(
                    "{} | {} | {}",
                    record.title, record.price, record.location
                ),
                link: resolve_link(base.as_ref(), &record.link),
                created: record.posted_at,
            })
            .collect();

        FeedDocument {
            title: self.title.clone(),
            link: query.source_url.clone(),
            description: format!("Craigslist search for '{}'", query.term),
            author: self.author.clone(),
            created: now,
            entries,
        }
    }
}

impl Default for FeedAssembler {
    fn default() -> Self {
        Self::new("Craigslist Search", Author::default())
    }
}

fn resolve_link(base: Option<&Url>, link: &str) -> String {
    if link.is_empty() {
        return String::new();
    }
    match base.and_then(|b| b.join(link).ok()) {
        Some(url) => url.to_string(),
        None => link.to_string(),
    }
}

impl FeedDocument {
    /// Renders the document as an RSS 2.0 channel.
    pub fn to_rss(&self) -> String {
        let items: Vec<rss::Item> = self
            .entries
            .iter()
            .map(|entry| {
                let mut item = ItemBuilder::default();
                item.title(Some(entry.title.clone()))
                    .description(Some(entry.description.clone()))
                    .pub_date(entry.created.map(|t| t.to_rfc2822()));
                if !entry.link.is_empty() {
                    item.link(Some(entry.link.clone())).guid(Some(
                        GuidBuilder::default()
                            .value(entry.link.clone())
                            .permalink(true)
                            .build(),
                    ));
                }
                item.build()
            })
            .collect();

        ChannelBuilder::default()
            .title(self.title.clone())
            .link(self.link.clone())
            .description(self.description.clone())
            .managing_editor(self.managing_editor())
            .pub_date(Some(self.created.to_rfc2822()))
            .items(items)
            .build()
            .to_string()
    }

    fn managing_editor(&self) -> Option<String> {
        let Author { name, email } = &self.author;
        match (name.is_empty(), email.is_empty()) {
            (true, true) => None,
            (true, false) => Some(email.clone()),
            (false, true) => Some(name.clone()),
            (false, false) => Some(format!("{} ({})", email, name)),
        }
    }
}
