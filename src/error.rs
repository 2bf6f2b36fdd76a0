use thiserror::Error;

/// Errors raised by the backend client and the feature services.
///
/// Utilities in [`crate::utils`] never return this type; they log and fall back
/// to a neutral value instead.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed backend configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced a response (DNS, TLS, timeout...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Sign-in, sign-up or session problems.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller passed something the backend would reject anyway.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Image could not be read or normalized.
    #[error("Image error: {0}")]
    Image(String),
}

/// Result type alias for backend and service operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}

impl AppError {
    /// True when the backend rejected the request because of the caller's session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Api { status: 401, .. } | AppError::Auth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = AppError::Api {
            status: 404,
            message: "no rows".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 404: no rows");
    }

    #[test]
    fn test_into_string() {
        let msg: String = AppError::InvalidInput("empty title".to_string()).into();
        assert_eq!(msg, "Invalid input: empty title");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(AppError::Api { status: 401, message: String::new() }.is_unauthorized());
        assert!(AppError::Auth("expired".to_string()).is_unauthorized());
        assert!(!AppError::NotFound("group".to_string()).is_unauthorized());
    }
}
