pub mod file_storage_service;

pub use file_storage_service::{
    location_to_path, FileStorageError, FileStorageResult, LocalFileStorageService, SizeProbe,
};
