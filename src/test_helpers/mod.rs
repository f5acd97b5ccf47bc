//! Builders and in-memory fakes shared by unit and integration tests.

mod alert;
mod fakes;

use chrono::Utc;

pub use alert::AlertBuilder;
pub use fakes::{InMemoryAlertStore, RecordingMailer, SentEmail, StubContentSearch};

use crate::models::{NewNotification, Notification, NOTIFICATION_KIND};

/// Materializes a `Notification` from an insert payload, the way a store
/// would.
pub fn notification_from(new: &NewNotification) -> Notification {
    Notification {
        id: 1,
        alert_id: new.alert_id,
        start_date: new.start_date,
        end_date: new.end_date,
        kind: NOTIFICATION_KIND.to_string(),
        total_mentions: new.total_mentions,
        created_at: Utc::now(),
    }
}
