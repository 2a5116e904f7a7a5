//! Type definitions for the compression domain.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domains::media::types::{Asset, MediaKind};
use super::mapper::{compression_ratio, CompressionLevel};

/// Parameters handed to an encoder, derived from the level for one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EncodingParameters {
    Image {
        /// Fraction in [0.10, 1.00]
        quality: f64,
        max_width: u32,
        max_height: u32,
    },
    Video {
        bitrate_bps: u64,
    },
}

impl EncodingParameters {
    pub fn kind(&self) -> MediaKind {
        match self {
            EncodingParameters::Image { .. } => MediaKind::Image,
            EncodingParameters::Video { .. } => MediaKind::Video,
        }
    }
}

/// Result of one completed transcode.
///
/// An `original_byte_size` of 0 means "unknown". `produced_size_resolved`
/// tells an unresolved output apart from a resolved empty one; `ratio_percent`
/// is 0 unless the output was resolved and the original is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    pub asset_id: Uuid,
    pub location: String,
    pub kind: MediaKind,
    pub level: CompressionLevel,
    pub original_byte_size: u64,
    pub produced_byte_size: u64,
    pub ratio_percent: i64,
    #[serde(default)]
    pub produced_size_resolved: bool,
    pub duration_ms: u64,
}

impl CompressionResult {
    /// Assemble a result in one step so no field can be left stale.
    pub fn new(
        source: &Asset,
        location: String,
        level: CompressionLevel,
        original_byte_size: u64,
        produced_byte_size: Option<u64>,
        duration_ms: u64,
    ) -> Self {
        let (produced_byte_size, ratio_percent, produced_size_resolved) = match produced_byte_size {
            Some(produced) => (produced, compression_ratio(original_byte_size, produced), true),
            None => (0, 0, false),
        };
        Self {
            asset_id: source.id,
            location,
            kind: source.kind,
            level,
            original_byte_size,
            produced_byte_size,
            ratio_percent,
            produced_size_resolved,
            duration_ms,
        }
    }

    pub fn ratio_computed(&self) -> bool {
        self.produced_size_resolved && self.original_byte_size > 0
    }

    pub fn space_saved_bytes(&self) -> i64 {
        if !self.ratio_computed() {
            return 0;
        }
        self.original_byte_size as i64 - self.produced_byte_size as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_unknown_produced_size() {
        let asset = Asset::new("a.jpg", MediaKind::Image);
        let result = CompressionResult::new(&asset, "b.jpg".into(), CompressionLevel::new(3), 1000, None, 12);
        assert_eq!(result.produced_byte_size, 0);
        assert_eq!(result.ratio_percent, 0);
        assert!(!result.ratio_computed());
        assert_eq!(result.space_saved_bytes(), 0);
    }

    #[test]
    fn test_result_with_both_sizes() {
        let asset = Asset::new("a.mp4", MediaKind::Video);
        let result = CompressionResult::new(&asset, "b.mp4".into(), CompressionLevel::new(8), 1000, Some(1200), 40);
        assert_eq!(result.asset_id, asset.id);
        assert_eq!(result.kind, MediaKind::Video);
        assert_eq!(result.ratio_percent, -20);
        assert_eq!(result.space_saved_bytes(), -200);
    }

    #[test]
    fn test_empty_output_still_counts_as_computed() {
        let asset = Asset::new("a.jpg", MediaKind::Image);
        let result = CompressionResult::new(&asset, "b.jpg".into(), CompressionLevel::new(10), 1000, Some(0), 3);
        assert_eq!(result.ratio_percent, 100);
        assert!(result.produced_size_resolved);
        assert!(result.ratio_computed());
        assert_eq!(result.space_saved_bytes(), 1000);
    }

    #[test]
    fn test_unknown_original_is_not_computed() {
        let asset = Asset::new("a.jpg", MediaKind::Image);
        let result = CompressionResult::new(&asset, "b.jpg".into(), CompressionLevel::new(10), 0, Some(500), 3);
        assert_eq!(result.ratio_percent, 0);
        assert!(!result.ratio_computed());
    }

    #[test]
    fn test_parameters_serialize_tagged() {
        let json = serde_json::to_value(EncodingParameters::Video { bitrate_bps: 100_000 }).unwrap();
        assert_eq!(json["kind"], "video");
        assert_eq!(json["bitrate_bps"], 100_000);
    }
}
