//! Storage interface consumed by the scheduler, the alert runner and the
//! HTTP layer.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    models::{Alert, AlertDraft, CursorAdvance, NewNotification, Notification},
    persistence::error::PersistenceError,
};

/// Repository for alert definitions and their notification history.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AlertRepository: Send + Sync {
    /// Retrieves a single alert by id, including soft-deleted rows so a
    /// running tick can observe the deletion.
    async fn find_alert(&self, alert_id: i64) -> Result<Option<Alert>, PersistenceError>;

    /// Retrieves all non-deleted alerts ordered by creation time ascending.
    async fn list_active_alerts(&self) -> Result<Vec<Alert>, PersistenceError>;

    /// Inserts a new alert and returns it with its assigned id.
    async fn create_alert(&self, draft: &AlertDraft) -> Result<Alert, PersistenceError>;

    /// Replaces the mutable fields of an existing alert.
    async fn update_alert(
        &self,
        alert_id: i64,
        draft: &AlertDraft,
    ) -> Result<Alert, PersistenceError>;

    /// Soft-deletes an alert. Its notification history is kept until the row
    /// is physically removed.
    async fn soft_delete_alert(&self, alert_id: i64) -> Result<(), PersistenceError>;

    /// Advances the incremental query cursor after a processed window.
    async fn advance_cursor(
        &self,
        alert_id: i64,
        cursor: &CursorAdvance,
    ) -> Result<(), PersistenceError>;

    /// Records one alert firing.
    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, PersistenceError>;

    /// Retrieves the notification history for an alert, newest first.
    async fn list_notifications(
        &self,
        alert_id: i64,
    ) -> Result<Vec<Notification>, PersistenceError>;
}
