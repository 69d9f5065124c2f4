use axum::extract::State;
use axum::Json;
use ideaboard_core::webhook::{self, WebhookConfig};
use ideaboard_core::notification;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/settings — webhook configuration status.
pub async fn get_settings(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let url = tokio::task::spawn_blocking(move || webhook::webhook_url(&root))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "webhookConfigured": !url.is_empty(),
            "webhookUrl": url,
        }
    })))
}

#[derive(serde::Deserialize)]
pub struct WebhookBody {
    #[serde(default, rename = "webhookUrl")]
    pub webhook_url: Option<String>,
}

/// PUT /api/settings/webhook — persist the webhook URL; an empty value
/// clears it. The `DISCORD_WEBHOOK_URL` env var still wins at send time.
pub async fn put_webhook(
    State(app): State<AppState>,
    Json(body): Json<WebhookBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let url = body.webhook_url.unwrap_or_default().trim().to_string();

    let root = app.root.clone();
    let cleared = url.is_empty();
    tokio::task::spawn_blocking(move || WebhookConfig { webhook_url: url }.save(&root))
        .await
        .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    let message = if cleared {
        "Webhook URL cleared"
    } else {
        "Webhook URL updated"
    };
    Ok(Json(serde_json::json!({ "success": true, "message": message })))
}

/// POST /api/notify-pm — manually wake the PM through the gateway and log a
/// manual_notify entry.
pub async fn notify_pm(State(app): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let root = app.root.clone();
    let sent = tokio::task::spawn_blocking(move || {
        let unread = notification::list_unread(&root)?.len();
        let message = format!("【看板通知】PM 請查看看板（未讀通知 {unread} 筆）");
        let sent = webhook::send_wake(&message)?;
        if sent {
            notification::record_manual(&root, &message)?;
        }
        Ok::<_, ideaboard_core::BoardError>(sent)
    })
    .await
    .map_err(|e| ApiError(anyhow::anyhow!("task join error: {e}")))??;

    if !sent {
        return Err(ApiError::bad_request(
            "OpenClaw gateway not configured or unreachable",
        ));
    }
    Ok(Json(
        serde_json::json!({ "success": true, "message": "已通知 PM" }),
    ))
}
