use thiserror::Error;

/// Banner text when the registry answers with a non-success status.
pub const REJECTED_MESSAGE: &str = "Failed to register member. Please try again.";

/// Banner text when the registry could not be reached at all.
pub const NETWORK_FAILURE_MESSAGE: &str = "An error occurred. Please try again later.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Registration rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            code => ApiError::Rejected {
                status: code,
                body: truncated,
            },
        }
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::NetworkError(_) => NETWORK_FAILURE_MESSAGE,
            ApiError::Rejected { .. } | ApiError::RateLimited | ApiError::ServerError(_) => {
                REJECTED_MESSAGE
            }
        }
    }
}
