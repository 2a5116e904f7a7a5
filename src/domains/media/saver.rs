//! Saving produced media somewhere the user can reach it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

use crate::domains::core::file_storage_service::location_to_path;
use crate::errors::{DomainError, DomainResult};
use crate::validation::file_extension;
use super::types::MediaKind;

/// Where a saved asset ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "snake_case")]
pub enum SaveDestination {
    PhotoLibrary,
    Path(String),
}

impl SaveDestination {
    pub fn describe(&self) -> String {
        match self {
            SaveDestination::PhotoLibrary => "Photo Library".to_string(),
            SaveDestination::Path(path) => path.clone(),
        }
    }
}

#[async_trait]
pub trait MediaSaver: Send + Sync {
    async fn save(&self, location: &str, kind: MediaKind) -> DomainResult<SaveDestination>;
}

/// Copies assets into a directory as `compressed_<unix-millis>.<ext>`
pub struct LocalMediaSaver {
    destination_dir: PathBuf,
}

impl LocalMediaSaver {
    pub fn new(destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
        }
    }

    fn file_name(location: &str, kind: MediaKind, suffix: Option<u32>) -> String {
        let extension = file_extension(location).unwrap_or_else(|| match kind {
            MediaKind::Video => "mp4".to_string(),
            _ => "jpg".to_string(),
        });
        let timestamp = chrono::Utc::now().timestamp_millis();
        match suffix {
            Some(n) => format!("compressed_{}_{}.{}", timestamp, n, extension),
            None => format!("compressed_{}.{}", timestamp, extension),
        }
    }
}

#[async_trait]
impl MediaSaver for LocalMediaSaver {
    async fn save(&self, location: &str, kind: MediaKind) -> DomainResult<SaveDestination> {
        let source = location_to_path(location);
        fs::create_dir_all(&self.destination_dir).await
            .map_err(|e| DomainError::SaveFailed(format!("Cannot create {}: {}", self.destination_dir.display(), e)))?;

        let mut destination = self.destination_dir.join(Self::file_name(location, kind, None));
        let mut attempt = 1;
        while fs::try_exists(&destination).await.unwrap_or(false) {
            destination = self.destination_dir.join(Self::file_name(location, kind, Some(attempt)));
            attempt += 1;
        }

        fs::copy(&source, &destination).await
            .map_err(|e| DomainError::SaveFailed(format!("Cannot copy {}: {}", location, e)))?;

        log::info!("Saved {} to {}", location, destination.display());
        Ok(SaveDestination::Path(destination.to_string_lossy().into_owned()))
    }
}

/// Saver assembled from optional capabilities resolved at startup.
///
/// The primary (e.g. a host photo library) is used when present, otherwise
/// the filesystem fallback. With neither, saving reports `SaveFailed`.
pub struct FallbackSaver {
    primary: Option<Arc<dyn MediaSaver>>,
    fallback: Option<Arc<dyn MediaSaver>>,
}

impl FallbackSaver {
    pub fn new(primary: Option<Arc<dyn MediaSaver>>, fallback: Option<Arc<dyn MediaSaver>>) -> Self {
        Self { primary, fallback }
    }

    pub fn is_available(&self) -> bool {
        self.primary.is_some() || self.fallback.is_some()
    }
}

#[async_trait]
impl MediaSaver for FallbackSaver {
    async fn save(&self, location: &str, kind: MediaKind) -> DomainResult<SaveDestination> {
        let saver = self.primary.as_ref()
            .or(self.fallback.as_ref())
            .ok_or_else(|| DomainError::SaveFailed("File system access not available".to_string()))?;

        saver.save(location, kind).await.map_err(|e| match e {
            DomainError::SaveFailed(_) => e,
            other => DomainError::SaveFailed(other.to_string()),
        })
    }
}
