use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ideaboard_core::idea::{self, IdeaDraft, IdeaPatch};
use ideaboard_core::webhook::NotifyEvent;

use crate::error::ApiError;
use crate::notify;
use crate::state::AppState;

/// GET /api/ideas — list all ideas. Unparseable files are skipped, never 500.
pub async fn list_ideas(State(app): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let ideas = tokio::task::spawn_blocking(move || idea::list_all(&root))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "success": true, "data": ideas })))
}

/// GET /api/ideas/:id — single idea by declared id or file stem.
pub async fn get_idea(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let found = tokio::task::spawn_blocking(move || idea::get(&root, &id))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({ "success": true, "data": found })))
}

/// POST /api/ideas — create a new idea, assigning the next IDEA-### id when
/// the body carries none.
pub async fn create_idea(
    State(app): State<AppState>,
    Json(draft): Json<IdeaDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let root = app.root.clone();
    let created = tokio::task::spawn_blocking(move || idea::create(&root, draft))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    notify::dispatch(&app, NotifyEvent::Create, created.clone()).await;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": created })),
    ))
}

/// PUT /api/ideas/:id — shallow-merge the body over the stored record.
pub async fn update_idea(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<IdeaPatch>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let updated = tokio::task::spawn_blocking(move || idea::update(&root, &id, patch))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    notify::dispatch(&app, NotifyEvent::Update, updated.clone()).await;

    Ok(Json(serde_json::json!({ "success": true, "data": updated })))
}

#[derive(serde::Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    pub status: Option<String>,
}

/// PATCH /api/ideas/:id/status — quick status update; records the from→to
/// transition using the previous raw status.
pub async fn patch_status(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(status) = body.status.filter(|s| !s.is_empty()) else {
        return Err(ApiError::bad_request("Status is required"));
    };

    let root = app.root.clone();
    let (previous, updated) = tokio::task::spawn_blocking(move || {
        let before = idea::get(&root, &id)?;
        let after = idea::update_status(&root, &id, status)?;
        Ok::<_, ideaboard_core::BoardError>((before.status, after))
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    notify::dispatch(
        &app,
        NotifyEvent::Status {
            from: previous,
            to: updated.status.clone(),
        },
        updated.clone(),
    )
    .await;

    Ok(Json(serde_json::json!({ "success": true, "data": updated })))
}

/// DELETE /api/ideas/:id — remove the backing file.
pub async fn delete_idea(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let deleted = tokio::task::spawn_blocking(move || {
        let existing = idea::get(&root, &id)?;
        idea::delete(&root, &id)?;
        Ok::<_, ideaboard_core::BoardError>(existing)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    notify::dispatch(&app, NotifyEvent::Delete, deleted).await;

    Ok(Json(
        serde_json::json!({ "success": true, "message": "Idea deleted" }),
    ))
}
