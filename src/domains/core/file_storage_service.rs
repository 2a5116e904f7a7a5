use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs; // Use tokio::fs for async file operations
use uuid::Uuid;
use std::io;

#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Invalid path component: {0}")]
    InvalidPathComponent(String),
    #[error("Unknown storage error: {0}")]
    Other(String),
}

pub type FileStorageResult<T> = Result<T, FileStorageError>;

/// Resolves the byte size of the asset behind a locator
#[async_trait]
pub trait SizeProbe: Send + Sync {
    async fn size_of(&self, location: &str) -> FileStorageResult<u64>;
}

/// Convert a `file://` URI or plain path into a filesystem path.
pub fn location_to_path(location: &str) -> PathBuf {
    let stripped = location.strip_prefix("file://").unwrap_or(location);
    PathBuf::from(stripped)
}

// --- Local File Storage Implementation ---

/// Filesystem-backed storage. Encoders write their output under
/// `<base>/compressed/`; size probing works on any readable path.
pub struct LocalFileStorageService {
    base_path: PathBuf,
    compressed_subdir: String,
}

impl LocalFileStorageService {
    /// Creates a new LocalFileStorageService.
    /// Ensures the base directory and subdirectories exist.
    pub fn new(base_path_str: &str) -> io::Result<Self> {
        let base_path = PathBuf::from(base_path_str);
        let compressed_subdir = "compressed".to_string();

        // Create directories synchronously during setup
        std::fs::create_dir_all(base_path.join(&compressed_subdir))?;

        Ok(Self {
            base_path,
            compressed_subdir,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Directory encoders write their output into
    pub fn compressed_dir(&self) -> PathBuf {
        self.base_path.join(&self.compressed_subdir)
    }

    /// Sanitizes a path component to prevent directory traversal issues.
    fn sanitize_component(component: &str) -> Result<String, FileStorageError> {
        if component.is_empty() || component.contains('/') || component.contains('\\') || component == "." || component == ".." {
            Err(FileStorageError::InvalidPathComponent(component.to_string()))
        } else {
            Ok(component.to_string())
        }
    }

    /// Unique output path in the compressed directory with the given extension.
    pub fn new_output_path(&self, extension: &str) -> FileStorageResult<PathBuf> {
        let extension = Self::sanitize_component(extension)?;
        Ok(self.compressed_dir().join(format!("{}.{}", Uuid::new_v4(), extension)))
    }
}

#[async_trait]
impl SizeProbe for LocalFileStorageService {
    async fn size_of(&self, location: &str) -> FileStorageResult<u64> {
        let path = location_to_path(location);

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            Ok(_) => Err(FileStorageError::Other(format!("Not a regular file: {}", location))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FileStorageError::NotFound(location.to_string())),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(FileStorageError::PermissionDenied(location.to_string())),
            Err(e) => Err(FileStorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_to_path() {
        assert_eq!(location_to_path("file:///tmp/a.jpg"), PathBuf::from("/tmp/a.jpg"));
        assert_eq!(location_to_path("/tmp/a.jpg"), PathBuf::from("/tmp/a.jpg"));
    }

    #[tokio::test]
    async fn test_size_of_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorageService::new(dir.path().to_str().unwrap()).unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, vec![0u8; 4096]).unwrap();

        let size = storage.size_of(file.to_str().unwrap()).await.unwrap();
        assert_eq!(size, 4096);

        let uri = format!("file://{}", file.display());
        assert_eq!(storage.size_of(&uri).await.unwrap(), 4096);
    }

    #[tokio::test]
    async fn test_size_of_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorageService::new(dir.path().to_str().unwrap()).unwrap();
        let missing = dir.path().join("gone.jpg");

        let err = storage.size_of(missing.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, FileStorageError::NotFound(_)));
    }

    #[test]
    fn test_new_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorageService::new(dir.path().to_str().unwrap()).unwrap();
        let path = storage.new_output_path("jpg").unwrap();
        assert!(path.starts_with(storage.compressed_dir()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
        assert!(storage.new_output_path("../x").is_err());
    }
}
