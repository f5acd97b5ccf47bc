//! Integration tests for the HTTP alert endpoints, exercising the store and
//! the scheduler together.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use echowatch::{
    http_server::{router, ApiState},
    models::SentimentCounts,
    persistence::traits::AlertRepository,
    scheduler::{runner::AlertRunner, Scheduler},
    test_helpers::{AlertBuilder, InMemoryAlertStore, RecordingMailer, StubContentSearch},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct Harness {
    store: Arc<InMemoryAlertStore>,
    scheduler: Scheduler,
    app: Router,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryAlertStore::new());
    let search = Arc::new(StubContentSearch::new(SentimentCounts::default()));
    let mailer = Arc::new(RecordingMailer::new());
    let runner = Arc::new(AlertRunner::new(
        Arc::clone(&store) as Arc<dyn AlertRepository>,
        search,
        mailer,
        Duration::from_secs(5),
    ));
    let scheduler = Scheduler::new(Arc::clone(&store) as Arc<dyn AlertRepository>, runner);
    let app = router(ApiState {
        repo: Arc::clone(&store) as Arc<dyn AlertRepository>,
        scheduler: scheduler.clone(),
    });
    Harness { store, scheduler, app }
}

fn alert_payload() -> Value {
    json!({
        "keywords": "bank fees",
        "sources": ["Twitter"],
        "sentiments": [],
        "recipients": ["ops@example.com"],
        "frequency": "1 Hour"
    })
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let h = harness();
    let response = h
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_create_alert_persists_and_arms_a_job() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/alerts")
        .header("content-type", "application/json")
        .body(Body::from(alert_payload().to_string()))
        .unwrap();

    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let alert_id = body["alert"]["id"].as_i64().unwrap();
    assert!(alert_id > 0);
    assert_eq!(h.scheduler.active_jobs(), 1);
    assert!(h.store.find_alert(alert_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_alert_rejects_blank_keywords() {
    let h = harness();
    let mut payload = alert_payload();
    payload["keywords"] = json!("   ");
    let request = Request::builder()
        .method("POST")
        .uri("/alerts")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(h.scheduler.active_jobs(), 0, "an invalid payload must not arm a job");
}

#[tokio::test]
async fn test_get_alert_not_found() {
    let h = harness();
    let response = h
        .app
        .oneshot(Request::builder().uri("/alerts/9999").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_alert_hides_soft_deleted_rows() {
    let h = harness();
    let alert = h.store.seed_alert(AlertBuilder::new().deleted().build());

    let response = h
        .app
        .oneshot(
            Request::builder()
                .uri(format!("/alerts/{}", alert.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_alert_rearms_with_new_frequency() {
    let h = harness();
    let alert = h.store.seed_alert(AlertBuilder::new().frequency("24 Hours").build());
    h.scheduler.arm(alert.id, &alert.frequency);

    let mut payload = alert_payload();
    payload["frequency"] = json!("Instant notification");
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/alerts/{}", alert.id))
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.scheduler.active_jobs(), 1, "update leaves exactly one job armed");
    let stored = h.store.find_alert(alert.id).await.unwrap().unwrap();
    assert_eq!(stored.frequency, "Instant notification");
}

#[tokio::test]
async fn test_delete_alert_soft_deletes_and_disarms() {
    let h = harness();
    let alert = h.store.seed_alert(AlertBuilder::new().build());
    h.scheduler.arm(alert.id, &alert.frequency);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/alerts/{}", alert.id))
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(h.scheduler.active_jobs(), 0);
    let stored = h.store.find_alert(alert.id).await.unwrap().unwrap();
    assert!(stored.is_deleted);
}

#[tokio::test]
async fn test_list_alerts_returns_only_active_rows() {
    let h = harness();
    h.store.seed_alert(AlertBuilder::new().keywords("kept").build());
    h.store.seed_alert(AlertBuilder::new().keywords("gone").deleted().build());

    let response = h
        .app
        .oneshot(Request::builder().uri("/alerts").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["keywords"], "kept");
}

#[tokio::test]
async fn test_status_reports_active_jobs() {
    let h = harness();
    let alert = h.store.seed_alert(AlertBuilder::new().build());
    h.scheduler.arm(alert.id, &alert.frequency);

    let response = h
        .app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["active_jobs"], 1);
}

#[tokio::test]
async fn test_list_notifications_for_unknown_alert_is_not_found() {
    let h = harness();
    let response = h
        .app
        .oneshot(
            Request::builder().uri("/alerts/77/notifications").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
