//! Handlers for alert-related endpoints in the HTTP server.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::{ApiError, ApiState};
use crate::models::AlertDraft;

/// Retrieves all non-deleted alerts.
pub async fn list_alerts(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let alerts = state.repo.list_active_alerts().await?;
    Ok((StatusCode::OK, Json(json!({ "alerts": alerts }))))
}

/// Retrieves details of a specific alert by its ID.
pub async fn get_alert(
    State(state): State<ApiState>,
    Path(alert_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let alert = state
        .repo
        .find_alert(alert_id)
        .await?
        .filter(|alert| !alert.is_deleted)
        .ok_or_else(|| ApiError::NotFound("Alert not found".to_string()))?;

    Ok((StatusCode::OK, Json(json!({ "alert": alert }))))
}

/// Creates a new alert and arms its job.
pub async fn create_alert(
    State(state): State<ApiState>,
    Json(payload): Json<AlertDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = payload.validated()?;
    let alert = state.repo.create_alert(&draft).await?;

    state.scheduler.arm(alert.id, &alert.frequency);

    Ok((StatusCode::CREATED, Json(json!({ "alert": alert }))))
}

/// Updates an alert. The existing job is disarmed first, then re-armed with
/// the (possibly new) frequency.
pub async fn update_alert(
    State(state): State<ApiState>,
    Path(alert_id): Path<i64>,
    Json(payload): Json<AlertDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = payload.validated()?;

    state.scheduler.disarm(alert_id);
    let alert = state.repo.update_alert(alert_id, &draft).await?;
    state.scheduler.arm(alert.id, &alert.frequency);

    Ok((StatusCode::OK, Json(json!({ "alert": alert }))))
}

/// Soft-deletes an alert and disarms its job.
pub async fn delete_alert(
    State(state): State<ApiState>,
    Path(alert_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.repo.soft_delete_alert(alert_id).await?;
    state.scheduler.disarm(alert_id);

    Ok((StatusCode::NO_CONTENT, Json(json!({ "status": "Alert deleted" }))))
}

/// Retrieves the notification history of an alert, newest first.
pub async fn list_notifications(
    State(state): State<ApiState>,
    Path(alert_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .repo
        .find_alert(alert_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Alert not found".to_string()))?;

    let notifications = state.repo.list_notifications(alert_id).await?;
    Ok((StatusCode::OK, Json(json!({ "notifications": notifications }))))
}
