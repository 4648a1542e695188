use serde::{Deserialize, Serialize};
use std::fmt;

use crate::notifications::NotificationKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WalletError {
    // Backend errors
    Api(String),
    Unauthorized(String),

    // Network errors
    NetworkError(String),
    ConnectionTimeout,
    InvalidResponse(String),

    // Storage errors
    StorageError(String),
    FileNotFound(String),
    PermissionDenied(String),

    // Validation errors
    ValidationError(String),
    InvalidAddress(String),
    InvalidAmount(String),

    // Generic errors
    Unknown(String),
}

impl WalletError {
    /// Text shown to the user. Backend and validation messages are passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            WalletError::Api(msg)
            | WalletError::Unauthorized(msg)
            | WalletError::ValidationError(msg)
            | WalletError::InvalidAddress(msg)
            | WalletError::InvalidAmount(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Severity used when the error is reported as a notification.
    pub fn notification_kind(&self) -> NotificationKind {
        match self {
            WalletError::ValidationError(_) | WalletError::InvalidAmount(_) => {
                NotificationKind::Warning
            }
            _ => NotificationKind::Error,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WalletError::ValidationError(_)
                | WalletError::InvalidAddress(_)
                | WalletError::InvalidAmount(_)
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, WalletError::Unauthorized(_))
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WalletError::Api(msg) => write!(f, "{}", msg),
            WalletError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),

            WalletError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            WalletError::ConnectionTimeout => write!(f, "Connection timeout"),
            WalletError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),

            WalletError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            WalletError::FileNotFound(msg) => write!(f, "File not found: {}", msg),
            WalletError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),

            WalletError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            WalletError::InvalidAddress(msg) => write!(f, "Invalid address: {}", msg),
            WalletError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),

            WalletError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for WalletError {}

pub type WalletResult<T> = Result<T, WalletError>;

// Conversion helpers
impl From<std::io::Error> for WalletError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => WalletError::FileNotFound(error.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                WalletError::PermissionDenied(error.to_string())
            }
            _ => WalletError::StorageError(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(error: serde_json::Error) -> Self {
        WalletError::InvalidResponse(format!("JSON error: {}", error))
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            WalletError::ConnectionTimeout
        } else if error.is_decode() {
            WalletError::InvalidResponse(error.to_string())
        } else {
            WalletError::NetworkError(error.to_string())
        }
    }
}
