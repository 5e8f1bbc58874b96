/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// The API throttled the request; retryable after a cooldown
    #[error("Rate limited by API (status {status}): {body}")]
    RateLimited { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the rate-limit wrapper may retry this failure
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::RateLimited { .. })
    }
}

pub type AppResult<T> = Result<T, AppError>;
