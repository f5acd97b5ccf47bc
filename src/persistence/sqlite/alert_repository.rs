//! Implementation of the AlertRepository trait for SqliteAlertRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    models::{
        Alert, AlertDraft, CursorAdvance, NewNotification, Notification, NOTIFICATION_KIND,
    },
    persistence::{
        error::PersistenceError, sqlite::SqliteAlertRepository, traits::AlertRepository,
    },
};

// Helper struct for mapping from the database row
#[derive(sqlx::FromRow)]
struct AlertRow {
    alert_id: i64,
    keywords: String,
    sources: String,
    sentiments: String,
    topic_id: Option<i64>,
    recipients: String,
    frequency: String,
    last_updated_at: Option<DateTime<Utc>>,
    last_updated_from: Option<DateTime<Utc>>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// Helper struct for mapping from the database row
#[derive(sqlx::FromRow)]
struct NotificationRow {
    notification_id: i64,
    alert_id: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    kind: String,
    total_mentions: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = PersistenceError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let sources: Vec<String> = serde_json::from_str(&row.sources)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        let sentiments: Vec<String> = serde_json::from_str(&row.sentiments)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        let recipients: Vec<String> = serde_json::from_str(&row.recipients)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

        Ok(Alert {
            id: row.alert_id,
            keywords: row.keywords,
            sources,
            sentiments,
            topic_id: row.topic_id,
            recipients,
            frequency: row.frequency,
            last_updated_at: row.last_updated_at,
            last_updated_from: row.last_updated_from,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.notification_id,
            alert_id: row.alert_id,
            start_date: row.start_date,
            end_date: row.end_date,
            kind: row.kind,
            total_mentions: row.total_mentions,
            created_at: row.created_at,
        }
    }
}

/// Serializes a list column to its JSON text representation.
fn to_json_column(values: &[String]) -> Result<String, PersistenceError> {
    serde_json::to_string(values).map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

const ALERT_COLUMNS: &str = "alert_id, keywords, sources, sentiments, topic_id, recipients, \
                             frequency, last_updated_at, last_updated_from, is_deleted, \
                             created_at, updated_at";

#[async_trait]
impl AlertRepository for SqliteAlertRepository {
    /// Retrieves a single alert by id, including soft-deleted rows.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn find_alert(&self, alert_id: i64) -> Result<Option<Alert>, PersistenceError> {
        let query = format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE alert_id = ?");
        let row = self
            .execute_query_with_error_handling(
                "find alert",
                sqlx::query_as::<_, AlertRow>(&query).bind(alert_id).fetch_optional(self.pool()),
            )
            .await?;

        row.map(Alert::try_from).transpose()
    }

    /// Retrieves all non-deleted alerts ordered by creation time ascending.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn list_active_alerts(&self) -> Result<Vec<Alert>, PersistenceError> {
        let query = format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE is_deleted = 0 ORDER BY created_at ASC, \
             alert_id ASC"
        );
        let rows = self
            .execute_query_with_error_handling(
                "list active alerts",
                sqlx::query_as::<_, AlertRow>(&query).fetch_all(self.pool()),
            )
            .await?;

        rows.into_iter().map(Alert::try_from).collect()
    }

    /// Inserts a new alert and returns it with its assigned id.
    #[tracing::instrument(skip(self, draft), level = "debug")]
    async fn create_alert(&self, draft: &AlertDraft) -> Result<Alert, PersistenceError> {
        let sources = to_json_column(&draft.sources)?;
        let sentiments = to_json_column(&draft.sentiments)?;
        let recipients = to_json_column(&draft.recipients)?;
        let now = Utc::now();

        let result = self
            .execute_query_with_error_handling(
                "create alert",
                sqlx::query(
                    "INSERT INTO alerts (keywords, sources, sentiments, topic_id, recipients, \
                     frequency, is_deleted, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 0, \
                     ?, ?)",
                )
                .bind(&draft.keywords)
                .bind(&sources)
                .bind(&sentiments)
                .bind(draft.topic_id)
                .bind(&recipients)
                .bind(&draft.frequency)
                .bind(now)
                .bind(now)
                .execute(self.pool()),
            )
            .await?;

        let alert_id = result.last_insert_rowid();
        tracing::info!(alert_id, "Alert created.");

        self.find_alert(alert_id).await?.ok_or_else(|| {
            PersistenceError::OperationFailed(format!(
                "Alert {alert_id} missing immediately after insert"
            ))
        })
    }

    /// Replaces the mutable fields of an existing alert.
    #[tracing::instrument(skip(self, draft), level = "debug")]
    async fn update_alert(
        &self,
        alert_id: i64,
        draft: &AlertDraft,
    ) -> Result<Alert, PersistenceError> {
        let sources = to_json_column(&draft.sources)?;
        let sentiments = to_json_column(&draft.sentiments)?;
        let recipients = to_json_column(&draft.recipients)?;
        let now = Utc::now();

        let result = self
            .execute_query_with_error_handling(
                "update alert",
                sqlx::query(
                    "UPDATE alerts SET keywords = ?, sources = ?, sentiments = ?, topic_id = ?, \
                     recipients = ?, frequency = ?, updated_at = ? WHERE alert_id = ? AND \
                     is_deleted = 0",
                )
                .bind(&draft.keywords)
                .bind(&sources)
                .bind(&sentiments)
                .bind(draft.topic_id)
                .bind(&recipients)
                .bind(&draft.frequency)
                .bind(now)
                .bind(alert_id)
                .execute(self.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(format!("Alert {alert_id}")));
        }

        tracing::info!(alert_id, "Alert updated.");
        self.find_alert(alert_id).await?.ok_or_else(|| {
            PersistenceError::OperationFailed(format!(
                "Alert {alert_id} missing immediately after update"
            ))
        })
    }

    /// Soft-deletes an alert.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn soft_delete_alert(&self, alert_id: i64) -> Result<(), PersistenceError> {
        let now = Utc::now();
        let result = self
            .execute_query_with_error_handling(
                "soft delete alert",
                sqlx::query(
                    "UPDATE alerts SET is_deleted = 1, updated_at = ? WHERE alert_id = ? AND \
                     is_deleted = 0",
                )
                .bind(now)
                .bind(alert_id)
                .execute(self.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(format!("Alert {alert_id}")));
        }

        tracing::info!(alert_id, "Alert soft-deleted.");
        Ok(())
    }

    /// Advances the incremental query cursor after a processed window.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn advance_cursor(
        &self,
        alert_id: i64,
        cursor: &CursorAdvance,
    ) -> Result<(), PersistenceError> {
        let now = Utc::now();
        let result = self
            .execute_query_with_error_handling(
                "advance alert cursor",
                sqlx::query(
                    "UPDATE alerts SET last_updated_at = ?, last_updated_from = ?, updated_at = ? \
                     WHERE alert_id = ?",
                )
                .bind(cursor.last_updated_at)
                .bind(cursor.last_updated_from)
                .bind(now)
                .bind(alert_id)
                .execute(self.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(format!("Alert {alert_id}")));
        }

        tracing::debug!(
            alert_id,
            last_updated_at = %cursor.last_updated_at,
            "Alert cursor advanced."
        );
        Ok(())
    }

    /// Records one alert firing.
    #[tracing::instrument(skip(self, notification), level = "debug")]
    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, PersistenceError> {
        let now = Utc::now();
        let result = self
            .execute_query_with_error_handling(
                "create notification",
                sqlx::query(
                    "INSERT INTO notifications (alert_id, start_date, end_date, kind, \
                     total_mentions, created_at) VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(notification.alert_id)
                .bind(notification.start_date)
                .bind(notification.end_date)
                .bind(NOTIFICATION_KIND)
                .bind(notification.total_mentions)
                .bind(now)
                .execute(self.pool()),
            )
            .await?;

        let notification_id = result.last_insert_rowid();
        tracing::info!(
            alert_id = notification.alert_id,
            notification_id,
            total_mentions = notification.total_mentions,
            "Notification recorded."
        );

        Ok(Notification {
            id: notification_id,
            alert_id: notification.alert_id,
            start_date: notification.start_date,
            end_date: notification.end_date,
            kind: NOTIFICATION_KIND.to_string(),
            total_mentions: notification.total_mentions,
            created_at: now,
        })
    }

    /// Retrieves the notification history for an alert, newest first.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn list_notifications(
        &self,
        alert_id: i64,
    ) -> Result<Vec<Notification>, PersistenceError> {
        let rows = self
            .execute_query_with_error_handling(
                "list notifications",
                sqlx::query_as::<_, NotificationRow>(
                    "SELECT notification_id, alert_id, start_date, end_date, kind, \
                     total_mentions, created_at FROM notifications WHERE alert_id = ? ORDER BY \
                     created_at DESC, notification_id DESC",
                )
                .bind(alert_id)
                .fetch_all(self.pool()),
            )
            .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }
}
