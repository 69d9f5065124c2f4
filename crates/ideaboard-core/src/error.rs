use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("idea not found: {0}")]
    IdeaNotFound(String),

    #[error("sprint not found: {0}")]
    SprintNotFound(String),

    #[error("notification not found: {0}")]
    NotificationNotFound(String),

    #[error("unknown status id: {0}")]
    UnknownStatusId(String),

    #[error("{0}")]
    Validation(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("webhook delivery failed: {0}")]
    Webhook(String),
}

impl BoardError {
    /// Combine every violated rule into one validation error.
    pub fn validation(reasons: Vec<String>) -> Self {
        BoardError::Validation(reasons.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
