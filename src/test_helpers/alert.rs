//! A builder for creating `Alert` instances in tests.

use chrono::{DateTime, Utc};

use crate::models::Alert;

/// A builder for creating `Alert` instances in tests.
pub struct AlertBuilder {
    id: Option<i64>,
    keywords: Option<String>,
    sources: Option<Vec<String>>,
    sentiments: Option<Vec<String>>,
    topic_id: Option<i64>,
    recipients: Option<Vec<String>>,
    frequency: Option<String>,
    last_updated_at: Option<DateTime<Utc>>,
    last_updated_from: Option<DateTime<Utc>>,
    is_deleted: bool,
    created_at: Option<DateTime<Utc>>,
}

impl Default for AlertBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertBuilder {
    /// Creates a new `AlertBuilder` instance.
    pub fn new() -> Self {
        AlertBuilder {
            id: None,
            keywords: None,
            sources: None,
            sentiments: None,
            topic_id: None,
            recipients: None,
            frequency: None,
            last_updated_at: None,
            last_updated_from: None,
            is_deleted: false,
            created_at: None,
        }
    }

    /// Sets the ID for the alert.
    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the keyword expression for the alert.
    pub fn keywords(mut self, keywords: &str) -> Self {
        self.keywords = Some(keywords.to_string());
        self
    }

    /// Sets the source filter for the alert.
    pub fn sources(mut self, sources: Vec<String>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Sets the sentiment filter for the alert.
    pub fn sentiments(mut self, sentiments: Vec<String>) -> Self {
        self.sentiments = Some(sentiments);
        self
    }

    /// Sets the topic reference for the alert.
    pub fn topic_id(mut self, topic_id: i64) -> Self {
        self.topic_id = Some(topic_id);
        self
    }

    /// Sets the recipient list for the alert.
    pub fn recipients(mut self, recipients: Vec<String>) -> Self {
        self.recipients = Some(recipients);
        self
    }

    /// Sets the frequency label for the alert.
    pub fn frequency(mut self, frequency: &str) -> Self {
        self.frequency = Some(frequency.to_string());
        self
    }

    /// Sets the query cursor for the alert.
    pub fn last_updated_at(mut self, cursor: DateTime<Utc>) -> Self {
        self.last_updated_at = Some(cursor);
        self
    }

    /// Sets the previous cursor value for the alert.
    pub fn last_updated_from(mut self, cursor: DateTime<Utc>) -> Self {
        self.last_updated_from = Some(cursor);
        self
    }

    /// Marks the alert as soft-deleted.
    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Sets the creation timestamp for the alert.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the `Alert` instance.
    pub fn build(self) -> Alert {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Alert {
            id: self.id.unwrap_or_default(),
            keywords: self.keywords.unwrap_or("test keywords".to_string()),
            sources: self.sources.unwrap_or_default(),
            sentiments: self.sentiments.unwrap_or_default(),
            topic_id: self.topic_id,
            recipients: self
                .recipients
                .unwrap_or(vec!["recipient@example.com".to_string()]),
            frequency: self.frequency.unwrap_or("1 Hour".to_string()),
            last_updated_at: self.last_updated_at,
            last_updated_from: self.last_updated_from,
            is_deleted: self.is_deleted,
            created_at,
            updated_at: created_at,
        }
    }
}
