use serde::Serialize;
use thiserror::Error;
use crate::domains::core::file_storage_service::FileStorageError;
use crate::domains::media::types::MediaKind;

/// Domain-level errors
#[derive(Debug, Error, Clone, Serialize)]
pub enum DomainError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Could not determine file size: {0}")]
    SizeProbeFailed(String),

    #[error("Failed to compress {kind}: {cause}")]
    EncodingFailed {
        kind: MediaKind,
        cause: String,
    },

    #[error("Failed to save media to device: {0}")]
    SaveFailed(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("File error: {0}")]
    File(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External error: {0}")]
    External(String),
}

impl DomainError {
    /// Stable message suitable for showing to the user. The underlying cause
    /// stays available through `Display` for logging.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::UnsupportedMediaType(_) => "Unsupported media type".to_string(),
            DomainError::SizeProbeFailed(_) => "Could not determine file size".to_string(),
            DomainError::EncodingFailed { kind, .. } => format!("Failed to compress {}", kind),
            DomainError::SaveFailed(_) => "Failed to save media to device".to_string(),
            DomainError::Validation(e) => e.to_string(),
            DomainError::File(_) => "File access failed".to_string(),
            DomainError::Internal(_) | DomainError::External(_) => {
                "An error occurred while compressing the media.".to_string()
            }
        }
    }
}

impl From<FileStorageError> for DomainError {
    fn from(error: FileStorageError) -> Self {
        DomainError::File(format!("File storage error: {}", error))
    }
}

/// Service-level errors (application specific)
#[derive(Debug, Error, Clone, Serialize)]
pub enum ServiceError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("User interface error: {0}")]
    Ui(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ServiceError {
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Domain(e) => e.user_message(),
            ServiceError::Ui(msg) => msg.clone(),
            ServiceError::Configuration(_) => "Compression is not configured".to_string(),
        }
    }
}

/// Validation errors
#[derive(Debug, Error, Clone, Serialize)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required {
        field: String,
    },

    #[error("Field '{field}' contains an invalid value: {reason}")]
    InvalidValue {
        field: String,
        reason: String,
    },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        Self::Required {
            field: field.to_string(),
        }
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
