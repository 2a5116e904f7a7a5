// Content for src/ffi/error.rs
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::errors::{DomainError, ServiceError, ValidationError};

/// Error codes for FFI boundary
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Success (no error)
    Success = 0,

    // General errors (1-99)
    Unknown = 1,
    InvalidArgument = 2,
    InvalidUtf8 = 4,
    InternalError = 6,

    // Domain errors (200-299)
    ValidationFailed = 204,
    FileError = 207,
    UnsupportedMediaType = 210,
    SizeProbeFailed = 211,
    EncodingFailed = 212,
    SaveFailed = 213,

    // Service errors (300-399)
    UiError = 302,
    ConfigurationError = 310,
    ExternalServiceError = 311,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, *self as i32)
    }
}

/// Error type for FFI boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FFIError {
    /// Error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (JSON string)
    pub details: Option<String>,
}

impl fmt::Display for FFIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for FFIError {}

impl FFIError {
    pub fn new(code: ErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: &str, details: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: Some(details.to_string()),
        }
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    // Helper for internal errors
    pub fn internal(message: String) -> Self {
         Self::new(ErrorCode::InternalError, &message)
    }
}

impl From<ValidationError> for FFIError {
    fn from(err: ValidationError) -> Self {
        Self::new(ErrorCode::ValidationFailed, &err.to_string())
    }
}

// --- From<DomainError> for FFIError ---
// `message` carries the stable, user-presentable text; `details` the cause.
impl From<DomainError> for FFIError {
    fn from(err: DomainError) -> Self {
        let message = err.user_message();
        match err {
            DomainError::UnsupportedMediaType(kind) => {
                Self::with_details(ErrorCode::UnsupportedMediaType, &message, &kind)
            },
            DomainError::SizeProbeFailed(cause) => {
                Self::with_details(ErrorCode::SizeProbeFailed, &message, &cause)
            },
            DomainError::EncodingFailed { cause, .. } => {
                Self::with_details(ErrorCode::EncodingFailed, &message, &cause)
            },
            DomainError::SaveFailed(cause) => {
                Self::with_details(ErrorCode::SaveFailed, &message, &cause)
            },
            DomainError::Validation(val_err) => {
                val_err.into() // Delegate to From<ValidationError>
            },
            DomainError::File(msg) => {
                Self::with_details(ErrorCode::FileError, &message, &msg)
            },
            DomainError::Internal(msg) => {
                Self::with_details(ErrorCode::InternalError, &message, &msg)
            },
            DomainError::External(msg) => {
                Self::with_details(ErrorCode::ExternalServiceError, &message, &msg)
            },
        }
    }
}

impl From<ServiceError> for FFIError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(domain_err) => domain_err.into(),
            ServiceError::Ui(msg) => Self::new(ErrorCode::UiError, &msg),
            ServiceError::Configuration(msg) => Self::new(ErrorCode::ConfigurationError, &msg),
        }
    }
}

/// Result type for FFI operations
pub type FFIResult<T> = Result<T, FFIError>;

/// Convert any supported error into an FFIError
pub fn to_ffi_error<E: std::error::Error + Clone + 'static>(error: &E) -> FFIError {
    // Explicitly cast to &dyn Error before downcasting.
    let error_trait_object = error as &dyn std::error::Error;

    if let Some(ffi_err) = error_trait_object.downcast_ref::<FFIError>() {
        return ffi_err.clone();
    }
    if let Some(service_err) = error_trait_object.downcast_ref::<ServiceError>() {
        return service_err.clone().into();
    }
    if let Some(domain_err) = error_trait_object.downcast_ref::<DomainError>() {
        return domain_err.clone().into();
    }
    if let Some(val_err) = error_trait_object.downcast_ref::<ValidationError>() {
        return val_err.clone().into();
    }

    FFIError::new(ErrorCode::Unknown, &error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::media::types::MediaKind;

    #[test]
    fn test_encoding_failure_keeps_cause_in_details() {
        let err: FFIError = ServiceError::Domain(DomainError::EncodingFailed {
            kind: MediaKind::Image,
            cause: "JPEG encoding error".to_string(),
        }).into();
        assert_eq!(err.code, ErrorCode::EncodingFailed);
        assert_eq!(err.message, "Failed to compress image");
        assert_eq!(err.details.as_deref(), Some("JPEG encoding error"));
    }

    #[test]
    fn test_to_ffi_error_downcasts() {
        let err = to_ffi_error(&ServiceError::Ui("Please select an image or video first.".to_string()));
        assert_eq!(err.code, ErrorCode::UiError);

        let err = to_ffi_error(&DomainError::UnsupportedMediaType("unknown".to_string()));
        assert_eq!(err.code, ErrorCode::UnsupportedMediaType);
    }

    #[test]
    fn test_serializes_for_host() {
        let json = serde_json::to_value(FFIError::invalid_argument("Input JSON is null")).unwrap();
        assert_eq!(json["code"], "InvalidArgument");
        assert_eq!(json["message"], "Input JSON is null");
    }
}
