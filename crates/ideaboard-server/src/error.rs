use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ideaboard_core::BoardError;

// ---------------------------------------------------------------------------
// Sentinels for explicit status codes
// ---------------------------------------------------------------------------

/// Private sentinel carrying an explicit HTTP 400 through the `anyhow::Error`
/// chain without touching the `BoardError` enum.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

/// Private sentinel carrying an explicit HTTP 404.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// ApiError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Bodies are always
/// `{"success": false, "error": "..."}` so every client code path can read
/// the same envelope.
#[derive(Debug)]
pub struct ApiError(pub anyhow::Error);

impl ApiError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "success": false, "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }
        if let Some(n) = self.0.downcast_ref::<NotFoundError>() {
            let body = serde_json::json!({ "success": false, "error": n.0.clone() });
            return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<BoardError>() {
            match e {
                BoardError::IdeaNotFound(_)
                | BoardError::SprintNotFound(_)
                | BoardError::NotificationNotFound(_) => StatusCode::NOT_FOUND,
                BoardError::Validation(_) | BoardError::UnknownStatusId(_) => {
                    StatusCode::BAD_REQUEST
                }
                BoardError::Io(_)
                | BoardError::Yaml(_)
                | BoardError::Json(_)
                | BoardError::HomeNotFound
                | BoardError::Webhook(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "success": false, "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idea_not_found_maps_to_404() {
        let err = ApiError(BoardError::IdeaNotFound("IDEA-404".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn sprint_not_found_maps_to_404() {
        let err = ApiError(BoardError::SprintNotFound("sprint-x".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn notification_not_found_maps_to_404() {
        let err = ApiError(BoardError::NotificationNotFound("notif-x".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = ApiError(BoardError::Validation("Name is required".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_error_maps_to_500() {
        let io_err = std::io::Error::other("disk full");
        let err = ApiError(BoardError::Io(io_err).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_board_error_maps_to_500() {
        let err = ApiError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        let err = ApiError::bad_request("Status is required");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_constructor_maps_to_404() {
        let err = ApiError::not_found("Idea not found");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn response_body_is_json_envelope() {
        let err = ApiError(BoardError::IdeaNotFound("IDEA-001".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
