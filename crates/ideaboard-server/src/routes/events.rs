use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// GET /api/events — SSE stream emitting a `refresh` event with the
/// `{event, filepath}` payload whenever an idea file changes on disk.
/// Disconnected clients drop their receiver and fall out of the broadcast.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.event_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        let file_event = msg.ok()?;
        let event = Event::default().event("refresh").json_data(&file_event).ok()?;
        Some(Ok::<Event, Infallible>(event))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
