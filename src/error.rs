//! Error types for sticker pipeline operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for sticker pipeline operations
pub type Result<T> = std::result::Result<T, StickerError>;

/// Error types for the sticker pipeline
#[derive(Error, Debug)]
pub enum StickerError {
    /// The background removal service answered with a non-success status
    #[error("remove.bg API error: {status} {body}")]
    ExternalService { status: u16, body: String },

    /// Network-level failure talking to the background removal service
    #[error("remove.bg API error: {0}")]
    Transport(String),

    /// Bytes that should hold an image could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Rejected upload (empty, too large, unsupported format)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Output encoding errors
    #[error("Encode error: {0}")]
    Encode(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StickerError {
    /// Create a new external service error from a status code and response text
    pub fn external_service<S: Into<String>>(status: u16, body: S) -> Self {
        Self::ExternalService {
            status,
            body: body.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new encode error
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Wrap a reqwest failure with the operation that was running
    pub fn network_error(operation: &str, error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            "timed out"
        } else if error.is_connect() {
            "connection failed"
        } else {
            "request failed"
        };
        Self::Transport(format!("{} {}: {}", operation, kind, error))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create decode error with stage context
    pub fn processing_stage_error(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Decode(format!(
            "Processing failed at stage '{}'{}: {}",
            stage, input_context, details
        ))
    }

    /// Whether the failure originated at the background removal service
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self, Self::ExternalService { .. } | Self::Transport(_))
    }

    /// HTTP status reported by the removal service, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ExternalService { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Structured failure payload handed back to the transport layer
///
/// Serializes as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl From<&StickerError> for ErrorPayload {
    fn from(err: &StickerError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl From<StickerError> for ErrorPayload {
    fn from(err: StickerError) -> Self {
        Self::from(&err)
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = StickerError::invalid_config("test config error");
        assert!(matches!(err, StickerError::InvalidConfig(_)));

        let err = StickerError::decode("not an image");
        assert!(matches!(err, StickerError::Decode(_)));
        assert!(!err.is_external());
    }

    #[test]
    fn test_external_service_display() {
        let err = StickerError::external_service(403, "Forbidden: invalid API key");
        let message = err.to_string();
        assert!(message.contains("403"));
        assert!(message.contains("Forbidden: invalid API key"));
        assert!(err.is_external());
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_transport_shares_error_surface() {
        let err = StickerError::transport("connection refused");
        assert!(err.to_string().starts_with("remove.bg API error:"));
        assert!(err.is_external());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_config_value_error() {
        let err = StickerError::config_value_error("blur_radius", 900, "0-255", Some(8));
        let error_string = err.to_string();
        assert!(error_string.contains("blur_radius"));
        assert!(error_string.contains("900"));
        assert!(error_string.contains("0-255"));
        assert!(error_string.contains("Recommended: 8"));
    }

    #[test]
    fn test_processing_stage_error() {
        let err = StickerError::processing_stage_error(
            "background removal",
            "response body is not an image",
            Some("512 bytes"),
        );
        let error_string = err.to_string();
        assert!(error_string.contains("background removal"));
        assert!(error_string.contains("512 bytes"));
    }

    #[test]
    fn test_error_payload_json() {
        let err = StickerError::external_service(403, "nope");
        let payload = ErrorPayload::from(&err);
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"error":"remove.bg API error: 403 nope"}"#);

        let back: ErrorPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
