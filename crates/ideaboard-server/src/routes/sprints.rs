use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ideaboard_core::sprint::{self, SprintDraft};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/sprints — the whole collection.
pub async fn list_sprints(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let sprints = tokio::task::spawn_blocking(move || sprint::list(&root))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "success": true, "data": sprints })))
}

/// GET /api/sprints/:id
pub async fn get_sprint(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let found = tokio::task::spawn_blocking(move || sprint::get(&root, &id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "success": true, "data": found })))
}

/// POST /api/sprints — create; 400 lists every violated validation rule.
pub async fn create_sprint(
    State(app): State<AppState>,
    Json(draft): Json<SprintDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let root = app.root.clone();
    let created = tokio::task::spawn_blocking(move || sprint::create(&root, draft))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": created })),
    ))
}

/// PUT /api/sprints/:id — validates only the fields that are present.
pub async fn update_sprint(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<SprintDraft>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let updated = tokio::task::spawn_blocking(move || sprint::update(&root, &id, draft))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "success": true, "data": updated })))
}

/// DELETE /api/sprints/:id
pub async fn delete_sprint(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    tokio::task::spawn_blocking(move || sprint::delete(&root, &id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(
        serde_json::json!({ "success": true, "message": "Sprint deleted" }),
    ))
}

#[derive(serde::Deserialize)]
pub struct AddIdeaBody {
    #[serde(default, rename = "ideaId")]
    pub idea_id: Option<String>,
}

/// POST /api/sprints/:id/ideas — add an idea to the sprint's membership.
pub async fn add_idea(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddIdeaBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(idea_id) = body.idea_id.filter(|i| !i.is_empty()) else {
        return Err(ApiError::bad_request("ideaId is required"));
    };

    let root = app.root.clone();
    let updated = tokio::task::spawn_blocking(move || sprint::add_idea(&root, &id, &idea_id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "success": true, "data": updated })))
}

/// DELETE /api/sprints/:id/ideas/:idea_id — remove an idea; no-op if absent.
pub async fn remove_idea(
    State(app): State<AppState>,
    Path((id, idea_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let updated = tokio::task::spawn_blocking(move || sprint::remove_idea(&root, &id, &idea_id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "success": true, "data": updated })))
}
