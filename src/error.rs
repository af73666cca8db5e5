use thiserror::Error;

use crate::rate_limit::RateLimited;
use crate::validator::InvalidCode;

// Display text is what follows `Error: ` on screen
#[derive(Error, Debug)]
pub enum GateError {
    #[error(transparent)]
    InvalidCode(#[from] InvalidCode),

    #[error(transparent)]
    RateLimited(#[from] RateLimited),

    #[error("Execution timeout")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Server error: {0}")]
    Server(String),

    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    #[error("You have reached the daily usage limit!")]
    QuotaExceeded,

    // 2xx with a failure body
    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GateError {
    pub fn is_client_side(&self) -> bool {
        matches!(self, GateError::InvalidCode(_) | GateError::RateLimited(_))
    }
}
