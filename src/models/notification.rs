//! Data models for alert notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed tag identifying alert-origin notifications, distinguishing them
/// from other notification kinds in the dashboard.
pub const NOTIFICATION_KIND: &str = "alerts";

/// An audit record of one alert firing. Immutable once created; removed only
/// when its owning alert is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Unique identifier for the notification (assigned by the store).
    pub id: i64,

    /// The alert this notification belongs to.
    pub alert_id: i64,

    /// Start of the query window that produced the matches.
    pub start_date: DateTime<Utc>,

    /// End of the query window that produced the matches.
    pub end_date: DateTime<Utc>,

    /// Notification kind tag, always [`NOTIFICATION_KIND`] for alerts.
    pub kind: String,

    /// Number of new mentions found in the window.
    pub total_mentions: i64,

    /// Timestamp when the notification was recorded.
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a new notification row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// The alert this notification belongs to.
    pub alert_id: i64,

    /// Start of the query window.
    pub start_date: DateTime<Utc>,

    /// End of the query window.
    pub end_date: DateTime<Utc>,

    /// Number of new mentions found.
    pub total_mentions: i64,
}
