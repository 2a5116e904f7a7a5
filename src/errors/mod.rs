mod error;

pub use error::{DomainError, ServiceError, ValidationError};
pub use crate::domains::core::file_storage_service::{FileStorageError, FileStorageResult};

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
