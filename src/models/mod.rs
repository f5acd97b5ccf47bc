//! Data models shared across the application.

pub mod alert;
pub mod frequency;
pub mod notification;
pub mod sentiment;

pub use alert::{Alert, AlertDraft, AlertValidationError, CursorAdvance};
pub use frequency::{AlertFrequency, FrequencySchedule};
pub use notification::{NewNotification, Notification, NOTIFICATION_KIND};
pub use sentiment::{SentimentCounts, SentimentTrend};
