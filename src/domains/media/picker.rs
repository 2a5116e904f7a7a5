//! Media acquisition.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::errors::{DomainError, DomainResult};
use crate::validation::Validate;
use super::types::{Asset, PickedMedia};

/// Outcome of an interactive pick. Cancelling is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Selected(Asset),
    Cancelled,
}

#[async_trait]
pub trait MediaPicker: Send + Sync {
    async fn pick_media(&self) -> DomainResult<PickOutcome>;
}

/// Picks a file that is already on disk. Without a path it behaves like a
/// dismissed dialog.
pub struct FileSystemPicker {
    path: Option<PathBuf>,
}

impl FileSystemPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl MediaPicker for FileSystemPicker {
    async fn pick_media(&self) -> DomainResult<PickOutcome> {
        let Some(path) = &self.path else {
            return Ok(PickOutcome::Cancelled);
        };

        let metadata = tokio::fs::metadata(path).await
            .map_err(|e| DomainError::File(format!("Failed to pick media {}: {}", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(DomainError::File(format!("Not a file: {}", path.display())));
        }

        // Sniff the content; the extension is the fallback inside `MediaKind::detect`
        let sniff_path = path.clone();
        let mime_type = tokio::task::spawn_blocking(move || infer::get_from_path(&sniff_path))
            .await
            .map_err(|e| DomainError::Internal(format!("Task join error: {}", e)))?
            .map_err(|e| DomainError::File(format!("Failed to read {}: {}", path.display(), e)))?
            .map(|kind| kind.mime_type().to_string());

        let picked = PickedMedia {
            uri: path.to_string_lossy().into_owned(),
            mime_type,
            file_name: path.file_name().map(|name| name.to_string_lossy().into_owned()),
            file_size: Some(metadata.len()),
        };
        picked.validate()?;
        log::debug!("Picked {:?}", picked);
        Ok(PickOutcome::Selected(Asset::from_picked(picked)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::media::types::MediaKind;

    #[tokio::test]
    async fn test_no_path_is_cancelled() {
        let picker = FileSystemPicker::new(None);
        assert_eq!(picker.pick_media().await.unwrap(), PickOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_sniffs_content_over_extension() {
        let dir = tempfile::tempdir().unwrap();
        // PNG signature behind a misleading name
        let path = dir.path().join("upload.bin");
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0u8; 32]);
        std::fs::write(&path, &bytes).unwrap();

        let picker = FileSystemPicker::new(Some(path));
        let PickOutcome::Selected(asset) = picker.pick_media().await.unwrap() else {
            panic!("expected a selection");
        };
        assert_eq!(asset.kind, MediaKind::Image);
        assert_eq!(asset.byte_size, Some(40));
        assert_eq!(asset.display_name.as_deref(), Some("upload.bin"));
    }

    #[tokio::test]
    async fn test_unrecognized_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"plain text").unwrap();

        let picker = FileSystemPicker::new(Some(path));
        let PickOutcome::Selected(asset) = picker.pick_media().await.unwrap() else {
            panic!("expected a selection");
        };
        assert_eq!(asset.kind, MediaKind::Unknown);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let picker = FileSystemPicker::new(Some(PathBuf::from("/nonexistent/clip.mp4")));
        assert!(picker.pick_media().await.is_err());
    }
}
