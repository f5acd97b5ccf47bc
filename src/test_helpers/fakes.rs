//! In-memory fakes for the storage, search and mail ports.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicI64, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    mailer::{Mailer, MailerError},
    models::{
        Alert, AlertDraft, CursorAdvance, NewNotification, Notification, SentimentCounts,
        NOTIFICATION_KIND,
    },
    persistence::{error::PersistenceError, traits::AlertRepository},
    search::{ContentSearchPort, MentionQuery, SearchError},
};

/// A deterministic in-memory alert store.
pub struct InMemoryAlertStore {
    alerts: Mutex<HashMap<i64, Alert>>,
    notifications: Mutex<Vec<Notification>>,
    next_alert_id: AtomicI64,
    next_notification_id: AtomicI64,
}

impl InMemoryAlertStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            alerts: Mutex::new(HashMap::new()),
            notifications: Mutex::new(Vec::new()),
            next_alert_id: AtomicI64::new(1),
            next_notification_id: AtomicI64::new(1),
        }
    }

    /// Seeds an alert, assigning an id when the builder left it at zero.
    pub fn seed_alert(&self, mut alert: Alert) -> Alert {
        if alert.id == 0 {
            alert.id = self.next_alert_id.fetch_add(1, Ordering::Relaxed);
        }
        self.alerts.lock().unwrap().insert(alert.id, alert.clone());
        alert
    }

    /// Returns all recorded notifications.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertRepository for InMemoryAlertStore {
    async fn find_alert(&self, alert_id: i64) -> Result<Option<Alert>, PersistenceError> {
        Ok(self.alerts.lock().unwrap().get(&alert_id).cloned())
    }

    async fn list_active_alerts(&self) -> Result<Vec<Alert>, PersistenceError> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .lock()
            .unwrap()
            .values()
            .filter(|alert| !alert.is_deleted)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(alerts)
    }

    async fn create_alert(&self, draft: &AlertDraft) -> Result<Alert, PersistenceError> {
        let now = Utc::now();
        let alert = Alert {
            id: self.next_alert_id.fetch_add(1, Ordering::Relaxed),
            keywords: draft.keywords.clone(),
            sources: draft.sources.clone(),
            sentiments: draft.sentiments.clone(),
            topic_id: draft.topic_id,
            recipients: draft.recipients.clone(),
            frequency: draft.frequency.clone(),
            last_updated_at: None,
            last_updated_from: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        self.alerts.lock().unwrap().insert(alert.id, alert.clone());
        Ok(alert)
    }

    async fn update_alert(
        &self,
        alert_id: i64,
        draft: &AlertDraft,
    ) -> Result<Alert, PersistenceError> {
        let mut alerts = self.alerts.lock().unwrap();
        let alert = alerts
            .get_mut(&alert_id)
            .filter(|alert| !alert.is_deleted)
            .ok_or_else(|| PersistenceError::NotFound(format!("Alert {alert_id}")))?;
        alert.keywords = draft.keywords.clone();
        alert.sources = draft.sources.clone();
        alert.sentiments = draft.sentiments.clone();
        alert.topic_id = draft.topic_id;
        alert.recipients = draft.recipients.clone();
        alert.frequency = draft.frequency.clone();
        alert.updated_at = Utc::now();
        Ok(alert.clone())
    }

    async fn soft_delete_alert(&self, alert_id: i64) -> Result<(), PersistenceError> {
        let mut alerts = self.alerts.lock().unwrap();
        let alert = alerts
            .get_mut(&alert_id)
            .filter(|alert| !alert.is_deleted)
            .ok_or_else(|| PersistenceError::NotFound(format!("Alert {alert_id}")))?;
        alert.is_deleted = true;
        alert.updated_at = Utc::now();
        Ok(())
    }

    async fn advance_cursor(
        &self,
        alert_id: i64,
        cursor: &CursorAdvance,
    ) -> Result<(), PersistenceError> {
        let mut alerts = self.alerts.lock().unwrap();
        let alert = alerts
            .get_mut(&alert_id)
            .ok_or_else(|| PersistenceError::NotFound(format!("Alert {alert_id}")))?;
        alert.last_updated_at = Some(cursor.last_updated_at);
        alert.last_updated_from = cursor.last_updated_from;
        alert.updated_at = Utc::now();
        Ok(())
    }

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, PersistenceError> {
        let row = Notification {
            id: self.next_notification_id.fetch_add(1, Ordering::Relaxed),
            alert_id: notification.alert_id,
            start_date: notification.start_date,
            end_date: notification.end_date,
            kind: NOTIFICATION_KIND.to_string(),
            total_mentions: notification.total_mentions,
            created_at: Utc::now(),
        };
        self.notifications.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_notifications(
        &self,
        alert_id: i64,
    ) -> Result<Vec<Notification>, PersistenceError> {
        let mut notifications: Vec<Notification> = self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|notification| notification.alert_id == alert_id)
            .cloned()
            .collect();
        notifications.reverse();
        Ok(notifications)
    }
}

/// A search port stub returning preset counts and recording every query.
#[derive(Default)]
pub struct StubContentSearch {
    counts: Mutex<SentimentCounts>,
    fail: AtomicBool,
    queries: Mutex<Vec<MentionQuery>>,
}

impl StubContentSearch {
    /// Creates a stub answering every query with the given counts.
    pub fn new(counts: SentimentCounts) -> Self {
        Self { counts: Mutex::new(counts), fail: AtomicBool::new(false), queries: Mutex::new(Vec::new()) }
    }

    /// Replaces the counts returned by subsequent queries.
    pub fn set_counts(&self, counts: SentimentCounts) {
        *self.counts.lock().unwrap() = counts;
    }

    /// Makes subsequent queries fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::Relaxed);
    }

    /// Returns every query seen so far.
    pub fn queries(&self) -> Vec<MentionQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSearchPort for StubContentSearch {
    async fn count_mentions(&self, query: &MentionQuery) -> Result<SentimentCounts, SearchError> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail.load(Ordering::Relaxed) {
            return Err(SearchError::InvalidResponse("stub failure".to_string()));
        }
        Ok(*self.counts.lock().unwrap())
    }
}

/// One email captured by the [`RecordingMailer`].
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// The recipient list of the captured email.
    pub recipients: Vec<String>,
    /// The subject line of the captured email.
    pub subject: String,
    /// The HTML body of the captured email.
    pub body: String,
}

/// A mail port fake that records every send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    /// Creates a mailer that records instead of delivering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::Relaxed);
    }

    /// Returns every email captured so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailerError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(MailerError::Configuration("recording mailer set to fail".to_string()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}
