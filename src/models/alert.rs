//! This module defines the `Alert` structure, a saved social-listening rule
//! that tracks a keyword expression across content sources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A saved monitoring rule: a keyword expression plus optional source and
/// sentiment filters, a recipient list and a delivery frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier for the alert (assigned by the store).
    #[serde(default)]
    pub id: i64,

    /// The keyword expression matched against new content.
    pub keywords: String,

    /// Source labels to restrict the query to. Empty means all sources.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Sentiment labels to restrict the query to. Empty means all sentiments.
    #[serde(default)]
    pub sentiments: Vec<String>,

    /// Opaque topic reference, passed through to the search backend.
    #[serde(default)]
    pub topic_id: Option<i64>,

    /// Email addresses that receive the digest.
    pub recipients: Vec<String>,

    /// Human frequency label, resolved through `AlertFrequency`.
    pub frequency: String,

    /// End of the last successfully processed query window. `None` until the
    /// first successful run.
    #[serde(default)]
    pub last_updated_at: Option<DateTime<Utc>>,

    /// The previous cursor value, kept for audit.
    #[serde(default)]
    pub last_updated_from: Option<DateTime<Utc>>,

    /// Soft-delete flag. A deleted alert is never re-armed.
    #[serde(default)]
    pub is_deleted: bool,

    /// Timestamp when the alert was created.
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,

    /// Timestamp when the alert was last updated.
    #[serde(default = "default_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Provides a default timestamp for serde deserialization.
fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

impl Alert {
    /// Returns true when the keyword expression is empty after trimming.
    /// Such an alert skips its tick but stays armed, since a later edit may
    /// fix it.
    pub fn has_empty_keywords(&self) -> bool {
        self.keywords.trim().is_empty()
    }
}

/// Errors produced when validating an alert payload at the API boundary.
#[derive(Debug, Error)]
pub enum AlertValidationError {
    /// The keyword expression is empty after trimming.
    #[error("Alert keywords must not be empty")]
    EmptyKeywords,

    /// The recipient list is empty.
    #[error("Alert must have at least one recipient")]
    NoRecipients,

    /// A recipient entry does not look like an email address.
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),
}

/// The mutable part of an alert, used as the create/update payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDraft {
    /// The keyword expression matched against new content.
    pub keywords: String,

    /// Source labels to restrict the query to.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Sentiment labels to restrict the query to.
    #[serde(default)]
    pub sentiments: Vec<String>,

    /// Opaque topic reference.
    #[serde(default)]
    pub topic_id: Option<i64>,

    /// Email addresses that receive the digest.
    pub recipients: Vec<String>,

    /// Human frequency label.
    pub frequency: String,
}

impl AlertDraft {
    /// Validates the payload and normalizes it: trims the keyword expression
    /// and every recipient, and drops empty recipient entries.
    pub fn validated(mut self) -> Result<Self, AlertValidationError> {
        self.keywords = self.keywords.trim().to_string();
        if self.keywords.is_empty() {
            return Err(AlertValidationError::EmptyKeywords);
        }

        self.recipients = self
            .recipients
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if self.recipients.is_empty() {
            return Err(AlertValidationError::NoRecipients);
        }
        for recipient in &self.recipients {
            if !recipient.contains('@') {
                return Err(AlertValidationError::InvalidRecipient(recipient.clone()));
            }
        }

        Ok(self)
    }
}

/// A cursor advance written back to the store after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorAdvance {
    /// The new cursor: the end of the window this tick processed.
    pub last_updated_at: DateTime<Utc>,

    /// The previous cursor value.
    pub last_updated_from: Option<DateTime<Utc>>,
}
