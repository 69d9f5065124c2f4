pub mod error;
pub mod notify;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Ideas
        .route("/api/ideas", get(routes::ideas::list_ideas))
        .route("/api/ideas", post(routes::ideas::create_idea))
        .route("/api/ideas/{id}", get(routes::ideas::get_idea))
        .route("/api/ideas/{id}", put(routes::ideas::update_idea))
        .route("/api/ideas/{id}", delete(routes::ideas::delete_idea))
        .route("/api/ideas/{id}/status", patch(routes::ideas::patch_status))
        // Sprints
        .route("/api/sprints", get(routes::sprints::list_sprints))
        .route("/api/sprints", post(routes::sprints::create_sprint))
        .route("/api/sprints/{id}", get(routes::sprints::get_sprint))
        .route("/api/sprints/{id}", put(routes::sprints::update_sprint))
        .route("/api/sprints/{id}", delete(routes::sprints::delete_sprint))
        .route("/api/sprints/{id}/ideas", post(routes::sprints::add_idea))
        .route(
            "/api/sprints/{id}/ideas/{idea_id}",
            delete(routes::sprints::remove_idea),
        )
        // Notifications
        .route(
            "/api/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/notifications/mark-read",
            patch(routes::notifications::mark_read),
        )
        .route(
            "/api/notifications/{id}/read",
            post(routes::notifications::mark_one_read),
        )
        .route(
            "/api/notifications/cleanup",
            delete(routes::notifications::cleanup),
        )
        // Settings
        .route("/api/settings", get(routes::settings::get_settings))
        .route("/api/settings/webhook", put(routes::settings::put_webhook))
        .route("/api/notify-pm", post(routes::settings::notify_pm))
        // Static frontend
        .fallback_service(ServeDir::new("public"))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the board server.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let app = build_router(root.clone());

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!(
        "ideaboard listening on http://localhost:{actual_port} (data: {})",
        root.display()
    );

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
