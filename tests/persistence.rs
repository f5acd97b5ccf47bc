//! Integration tests for the SQLite alert repository.

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use echowatch::{
    models::{AlertDraft, CursorAdvance, NewNotification, NOTIFICATION_KIND},
    persistence::{sqlite::SqliteAlertRepository, traits::AlertRepository},
};

async fn setup_db() -> SqliteAlertRepository {
    let repo = SqliteAlertRepository::new("sqlite::memory:")
        .await
        .expect("Failed to set up in-memory database");
    repo.run_migrations().await.expect("Failed to run migrations");
    repo
}

fn draft(keywords: &str) -> AlertDraft {
    AlertDraft {
        keywords: keywords.to_string(),
        sources: vec!["Twitter".to_string()],
        sentiments: vec!["negative".to_string()],
        topic_id: Some(3),
        recipients: vec!["ops@example.com".to_string()],
        frequency: "1 Hour".to_string(),
    }
}

#[tokio::test]
async fn test_create_and_find_alert_round_trip() {
    let repo = setup_db().await;

    let created = repo.create_alert(&draft("bank fees")).await.unwrap();
    assert!(created.id > 0);
    assert!(created.last_updated_at.is_none());
    assert!(!created.is_deleted);

    let found = repo.find_alert(created.id).await.unwrap().unwrap();
    assert_eq!(found.keywords, "bank fees");
    assert_eq!(found.sources, vec!["Twitter"]);
    assert_eq!(found.sentiments, vec!["negative"]);
    assert_eq!(found.topic_id, Some(3));
    assert_eq!(found.recipients, vec!["ops@example.com"]);
    assert_eq!(found.frequency, "1 Hour");
}

#[tokio::test]
async fn test_find_alert_returns_none_for_unknown_id() {
    let repo = setup_db().await;
    assert!(repo.find_alert(12345).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_active_alerts_orders_by_creation_and_skips_deleted() {
    let repo = setup_db().await;

    let first = repo.create_alert(&draft("first")).await.unwrap();
    let second = repo.create_alert(&draft("second")).await.unwrap();
    let third = repo.create_alert(&draft("third")).await.unwrap();
    repo.soft_delete_alert(second.id).await.unwrap();

    let alerts = repo.list_active_alerts().await.unwrap();
    let ids: Vec<i64> = alerts.iter().map(|alert| alert.id).collect();
    assert_eq!(ids, vec![first.id, third.id]);
}

#[tokio::test]
async fn test_update_alert_replaces_mutable_fields() {
    let repo = setup_db().await;
    let created = repo.create_alert(&draft("before")).await.unwrap();

    let mut updated_draft = draft("after");
    updated_draft.frequency = "24 Hours".to_string();
    updated_draft.sources = vec![];
    let updated = repo.update_alert(created.id, &updated_draft).await.unwrap();

    assert_eq!(updated.keywords, "after");
    assert_eq!(updated.frequency, "24 Hours");
    assert!(updated.sources.is_empty());
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_update_missing_or_deleted_alert_is_not_found() {
    let repo = setup_db().await;
    let created = repo.create_alert(&draft("gone")).await.unwrap();
    repo.soft_delete_alert(created.id).await.unwrap();

    assert!(repo.update_alert(created.id, &draft("nope")).await.is_err());
    assert!(repo.update_alert(9999, &draft("nope")).await.is_err());
}

#[tokio::test]
async fn test_soft_delete_keeps_the_row_readable() {
    let repo = setup_db().await;
    let created = repo.create_alert(&draft("doomed")).await.unwrap();

    repo.soft_delete_alert(created.id).await.unwrap();

    // A running tick must still observe the deletion flag.
    let found = repo.find_alert(created.id).await.unwrap().unwrap();
    assert!(found.is_deleted);

    // Deleting twice reports not found.
    assert!(repo.soft_delete_alert(created.id).await.is_err());
}

#[tokio::test]
async fn test_advance_cursor_round_trip() {
    let repo = setup_db().await;
    let created = repo.create_alert(&draft("cursor")).await.unwrap();

    let first_end = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
    repo.advance_cursor(
        created.id,
        &CursorAdvance { last_updated_at: first_end, last_updated_from: None },
    )
    .await
    .unwrap();

    let second_end = first_end + ChronoDuration::hours(1);
    repo.advance_cursor(
        created.id,
        &CursorAdvance { last_updated_at: second_end, last_updated_from: Some(first_end) },
    )
    .await
    .unwrap();

    let found = repo.find_alert(created.id).await.unwrap().unwrap();
    assert_eq!(found.last_updated_at, Some(second_end));
    assert_eq!(found.last_updated_from, Some(first_end));
}

#[tokio::test]
async fn test_notifications_round_trip_newest_first() {
    let repo = setup_db().await;
    let created = repo.create_alert(&draft("noisy")).await.unwrap();

    let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let end = start + ChronoDuration::hours(1);
    let first = repo
        .create_notification(&NewNotification {
            alert_id: created.id,
            start_date: start,
            end_date: end,
            total_mentions: 10,
        })
        .await
        .unwrap();
    let second = repo
        .create_notification(&NewNotification {
            alert_id: created.id,
            start_date: end,
            end_date: end + ChronoDuration::hours(1),
            total_mentions: 4,
        })
        .await
        .unwrap();

    assert_eq!(first.kind, NOTIFICATION_KIND);

    let notifications = repo.list_notifications(created.id).await.unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].id, second.id);
    assert_eq!(notifications[0].total_mentions, 4);
    assert_eq!(notifications[1].id, first.id);
    assert_eq!(notifications[1].total_mentions, 10);
    assert_eq!(notifications[1].start_date, start);
    assert_eq!(notifications[1].end_date, end);
}
