//! The content search port: executes a filtered, windowed mention query and
//! returns sentiment-bucketed counts.

pub mod elastic;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::SentimentCounts;

/// The time window of one incremental query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Exclusive lower bound: the previous cursor, or `now - lookback` on an
    /// alert's first run.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound, becomes the new cursor on success.
    pub end: DateTime<Utc>,
}

/// One windowed mention query derived from an alert's filter fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionQuery {
    /// The keyword expression.
    pub keywords: String,
    /// Source labels to restrict to. Empty means all sources.
    pub sources: Vec<String>,
    /// Sentiment labels to restrict to. Empty means all sentiments.
    pub sentiments: Vec<String>,
    /// Opaque topic reference, passed through unchanged.
    pub topic_id: Option<i64>,
    /// The query window.
    pub window: TimeWindow,
}

/// Errors that can occur while querying the search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The HTTP request to the search backend failed.
    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The search backend answered with a non-success status.
    #[error("Search backend returned status {0}")]
    BadStatus(u16),

    /// The response body did not have the expected shape.
    #[error("Unexpected search response: {0}")]
    InvalidResponse(String),
}

/// Executes mention queries against the content search backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentSearchPort: Send + Sync {
    /// Counts the mentions matching the query, bucketed into the three
    /// canonical sentiments. Bucket labels outside positive/neutral/negative
    /// are ignored.
    async fn count_mentions(&self, query: &MentionQuery) -> Result<SentimentCounts, SearchError>;
}
