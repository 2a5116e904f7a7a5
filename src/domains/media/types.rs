//! Type definitions for selected and produced media.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::validation::{file_extension, Validate, ValidationBuilder};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v"];

/// Kind of media an asset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    /// Unrecognized content. Never processed further.
    Unknown,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Unknown => "unknown",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, MediaKind::Unknown)
    }

    /// Determine the kind from an optional MIME type, falling back to the
    /// locator's file extension.
    pub fn detect(location: &str, mime_type: Option<&str>) -> Self {
        if let Some(kind) = mime_type.and_then(Self::from_mime) {
            return kind;
        }
        match file_extension(location) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Image,
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Video,
            _ => MediaKind::Unknown,
        }
    }

    fn from_mime(mime_type: &str) -> Option<Self> {
        let parsed: mime::Mime = mime_type.trim().parse().ok()?;
        match parsed.type_() {
            mime::IMAGE => Some(MediaKind::Image),
            mime::VIDEO => Some(MediaKind::Video),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = DomainError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" | "photo" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "unknown" => Ok(MediaKind::Unknown),
            _ => Err(DomainError::Validation(ValidationError::invalid_value(
                "kind",
                &format!("expected image or video, got: {}", s),
            ))),
        }
    }
}

/// Record handed back by a picker when the user completes a selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PickedMedia {
    pub uri: String,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
}

impl Validate for PickedMedia {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("uri", Some(self.uri.clone()))
            .required()
            .not_blank()
            .validate()
    }
}

/// A user-selected or produced media item.
///
/// Values are never mutated in place; resolving the size yields a new
/// `Asset` with the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: Uuid,
    pub location: String,
    pub kind: MediaKind,
    pub display_name: Option<String>,
    pub byte_size: Option<u64>,
}

impl Asset {
    pub fn new(location: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            location: location.into(),
            kind,
            display_name: None,
            byte_size: None,
        }
    }

    pub fn from_picked(picked: PickedMedia) -> Self {
        let kind = MediaKind::detect(&picked.uri, picked.mime_type.as_deref());
        Self {
            id: Uuid::new_v4(),
            location: picked.uri,
            kind,
            display_name: picked.file_name,
            // Pickers report 0 when they could not stat the file
            byte_size: picked.file_size.filter(|size| *size > 0),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_byte_size(&self, byte_size: u64) -> Self {
        Self {
            byte_size: Some(byte_size),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picked_media_requires_uri() {
        let blank = PickedMedia { uri: "  ".to_string(), ..Default::default() };
        assert!(matches!(
            blank.validate(),
            Err(DomainError::Validation(ValidationError::Required { field })) if field == "uri"
        ));

        let picked = PickedMedia { uri: "file:///tmp/a.jpg".to_string(), ..Default::default() };
        assert!(picked.validate().is_ok());
    }

    #[test]
    fn test_detect_by_mime_type() {
        assert_eq!(MediaKind::detect("content://media/42", Some("image/jpeg")), MediaKind::Image);
        assert_eq!(MediaKind::detect("content://media/42", Some("video/quicktime")), MediaKind::Video);
        // MIME wins over a misleading extension
        assert_eq!(MediaKind::detect("clip.jpg", Some("video/mp4")), MediaKind::Video);
    }

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(MediaKind::detect("file:///tmp/IMG_0001.HEIC", None), MediaKind::Image);
        assert_eq!(MediaKind::detect("/sdcard/DCIM/clip.mkv", Some("application/octet-stream")), MediaKind::Video);
        assert_eq!(MediaKind::detect("notes.txt", None), MediaKind::Unknown);
        assert_eq!(MediaKind::detect("no_extension", Some("not a mime")), MediaKind::Unknown);
    }

    #[test]
    fn test_from_picked() {
        let asset = Asset::from_picked(PickedMedia {
            uri: "file:///photos/a.png".to_string(),
            mime_type: Some("image/png".to_string()),
            file_name: Some("a.png".to_string()),
            file_size: Some(0),
        });
        assert_eq!(asset.kind, MediaKind::Image);
        assert_eq!(asset.display_name.as_deref(), Some("a.png"));
        assert_eq!(asset.byte_size, None);
    }

    #[test]
    fn test_with_byte_size_keeps_identity() {
        let asset = Asset::new("a.mp4", MediaKind::Video);
        let sized = asset.with_byte_size(2048);
        assert_eq!(sized.id, asset.id);
        assert_eq!(sized.byte_size, Some(2048));
        assert_eq!(asset.byte_size, None);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Photo".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert_eq!("video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert!("audio".parse::<MediaKind>().is_err());
    }
}
