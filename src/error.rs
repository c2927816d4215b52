//! Error types for the discovery client

use thiserror::Error;

/// Coarse error classification used for notices and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Network = 1,
    Payload = 2,
    BadParameter = 3,
    Storage = 4,
    Configuration = 5,
    Internal = 6,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Transport(_) => ErrorCode::Network,
            AppError::Payload(_) => ErrorCode::Payload,
            AppError::InvalidParameter(_) => ErrorCode::BadParameter,
            AppError::Storage(_) => ErrorCode::Storage,
            AppError::Config(_) => ErrorCode::Configuration,
            AppError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the UI can keep going (showing empty or last-known-good content)
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.code(), ErrorCode::Configuration | ErrorCode::Internal)
    }

    /// Short message suitable for a toast
    pub fn user_message(&self) -> String {
        match self.code() {
            ErrorCode::Network => "The catalog could not be reached. Please try again.".to_string(),
            ErrorCode::Payload => "The catalog returned an unexpected response.".to_string(),
            ErrorCode::BadParameter => "Some search parameters were ignored.".to_string(),
            ErrorCode::Storage => "Recent searches could not be saved.".to_string(),
            ErrorCode::Configuration | ErrorCode::Internal => "Something went wrong.".to_string(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
