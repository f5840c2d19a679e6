//! The current feed and the last refresh failure, shared between the refresh
//! loop and the request handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::feed::FeedDocument;

/// Why the last refresh failed, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    #[serde(rename = "error_message")]
    pub message: String,
    #[serde(rename = "error_time")]
    pub time: DateTime<Utc>,
}

impl ErrorState {
    pub fn from_error(err: &AppError, time: DateTime<Utc>) -> Self {
        Self {
            message: err.to_string(),
            time,
        }
    }
}

/// A consistent view of the state at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub feed: Arc<FeedDocument>,
    pub error: Option<ErrorState>,
}

impl Snapshot {
    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

struct Inner {
    feed: Arc<FeedDocument>,
    error: Option<ErrorState>,
}

/// Holds exactly one feed and at most one error behind a single lock.
///
/// Feeds are swapped as whole `Arc`s, so the lock is only ever held for a
/// pointer copy and readers never see a half-replaced document.
pub struct FeedState {
    inner: Mutex<Inner>,
}

impl FeedState {
    /// Seeds the state with the feed served until the first refresh succeeds.
    pub fn new(initial: FeedDocument) -> Self {
        Self {
            inner: Mutex::new(Inner {
                feed: Arc::new(initial),
                error: None,
            }),
        }
    }

    /// Replaces the feed and clears any recorded error.
    pub fn publish(&self, feed: FeedDocument) {
        let feed = Arc::new(feed);
        let mut inner = self.lock();
        inner.feed = feed;
        inner.error = None;
    }

    /// Records a failure; the current feed keeps being served.
    pub fn report_error(&self, error: ErrorState) {
        self.lock().error = Some(error);
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        Snapshot {
            feed: Arc::clone(&inner.feed),
            error: inner.error.clone(),
        }
    }

    // A panic elsewhere can't leave `Inner` half-written: every update is a
    // plain field assignment.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
