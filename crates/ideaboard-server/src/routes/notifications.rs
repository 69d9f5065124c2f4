use axum::extract::{Path, Query, State};
use axum::Json;
use ideaboard_core::notification;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread: Option<bool>,
}

/// GET /api/notifications?unread=bool
pub async fn list_notifications(
    State(app): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let unread_only = query.unread.unwrap_or(false);
    let notifications = tokio::task::spawn_blocking(move || {
        if unread_only {
            notification::list_unread(&root)
        } else {
            notification::list_all(&root)
        }
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(
        serde_json::json!({ "success": true, "data": notifications }),
    ))
}

#[derive(serde::Deserialize)]
pub struct MarkReadBody {
    #[serde(default)]
    pub ids: Option<serde_json::Value>,
}

/// PATCH /api/notifications/mark-read — `ids` must be a non-empty array of
/// ids or the literal string `"all"`.
pub async fn mark_read(
    State(app): State<AppState>,
    Json(body): Json<MarkReadBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();

    let count = match body.ids {
        Some(serde_json::Value::String(s)) if s == "all" => {
            tokio::task::spawn_blocking(move || notification::mark_all_read(&root))
                .await
                .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??
        }
        Some(serde_json::Value::Array(values)) if !values.is_empty() => {
            let ids: Vec<String> = values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if ids.len() != values.len() {
                return Err(ApiError::bad_request(
                    "ids must be a non-empty array of strings or \"all\"",
                ));
            }
            tokio::task::spawn_blocking(move || notification::mark_as_read(&root, &ids))
                .await
                .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??
        }
        _ => {
            return Err(ApiError::bad_request(
                "ids must be a non-empty array of strings or \"all\"",
            ))
        }
    };

    Ok(Json(serde_json::json!({ "success": true, "count": count })))
}

/// POST /api/notifications/:id/read — idempotent on an already-read entry.
pub async fn mark_one_read(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    tokio::task::spawn_blocking(move || notification::mark_one_read(&root, &id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(serde::Deserialize)]
pub struct CleanupQuery {
    #[serde(default)]
    pub days: Option<i64>,
}

/// DELETE /api/notifications/cleanup?days=N — prune entries older than N
/// days (default 7).
pub async fn cleanup(
    State(app): State<AppState>,
    Query(query): Query<CleanupQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = query.days.unwrap_or(7);
    if days < 0 {
        return Err(ApiError::bad_request("days must be non-negative"));
    }

    let root = app.root.clone();
    let removed = tokio::task::spawn_blocking(move || notification::clean_older_than(&root, days))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "success": true, "count": removed })))
}
