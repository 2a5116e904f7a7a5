//! Maps the user-facing compression level onto encoder parameters and
//! accounts for the outcome of a run.
//!
//! Level 1 is the lightest compression (full quality) and level 10 the most
//! aggressive. The quality floor is 10% so that the strongest setting still
//! produces a usable asset.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domains::media::types::MediaKind;
use crate::errors::{DomainError, DomainResult};
use super::settings::CompressionSettings;
use super::types::EncodingParameters;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;
pub const DEFAULT_LEVEL: u8 = 5;

/// Compression level clamped to `MIN_LEVEL..=MAX_LEVEL`.
///
/// Out-of-range input is a caller bug, not a failure, so every constructor
/// clamps instead of rejecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub fn new(level: i64) -> Self {
        Self(level.clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as u8)
    }

    /// Truncates toward zero before clamping. NaN maps to the minimum.
    pub fn from_f64(level: f64) -> Self {
        // `as` saturates and maps NaN to 0
        Self::new(level.trunc() as i64)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn quality_percent(&self) -> u8 {
        110 - 10 * self.0
    }

    pub fn quality_fraction(&self) -> f64 {
        self.quality_percent() as f64 / 100.0
    }

    /// Never below 1 bps, even for a tiny reference bitrate.
    pub fn bitrate_bps(&self, reference_bitrate_bps: u64) -> u64 {
        let bitrate = round_half_up(reference_bitrate_bps as f64 * self.quality_percent() as f64 / 100.0) as u64;
        bitrate.max(1)
    }

    pub fn bucket(&self) -> CompressionBucket {
        match self.0 {
            0..=3 => CompressionBucket::Low,
            4..=6 => CompressionBucket::Medium,
            _ => CompressionBucket::High,
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(DEFAULT_LEVEL)
    }
}

impl From<i64> for CompressionLevel {
    fn from(level: i64) -> Self {
        Self::new(level)
    }
}

impl From<i32> for CompressionLevel {
    fn from(level: i32) -> Self {
        Self::new(level as i64)
    }
}

impl From<CompressionLevel> for i64 {
    fn from(level: CompressionLevel) -> Self {
        level.0 as i64
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display-only tertile of the level range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionBucket {
    Low,
    Medium,
    High,
}

impl CompressionBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionBucket::Low => "Low",
            CompressionBucket::Medium => "Medium",
            CompressionBucket::High => "High",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompressionBucket::Low => "Low Compression",
            CompressionBucket::Medium => "Medium Compression",
            CompressionBucket::High => "High Compression",
        }
    }
}

/// Everything the host slider needs to describe a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionLevelInfo {
    pub level: CompressionLevel,
    pub quality_percent: u8,
    pub quality_fraction: f64,
    pub bitrate_bps: u64,
    pub bucket: CompressionBucket,
    pub label: String,
}

impl CompressionLevelInfo {
    pub fn new(level: CompressionLevel, reference_bitrate_bps: u64) -> Self {
        let bucket = level.bucket();
        Self {
            level,
            quality_percent: level.quality_percent(),
            quality_fraction: level.quality_fraction(),
            bitrate_bps: level.bitrate_bps(reference_bitrate_bps),
            bucket,
            label: bucket.label().to_string(),
        }
    }
}

/// Quality percentage for any integer level: `110 - 10 * clamp(level, 1, 10)`.
pub fn level_to_quality(level: i64) -> u8 {
    CompressionLevel::new(level).quality_percent()
}

/// Encoder parameters for `kind` at `level`. Fails only for unsupported kinds.
pub fn encoding_parameters(
    kind: MediaKind,
    level: CompressionLevel,
    settings: &CompressionSettings,
) -> DomainResult<EncodingParameters> {
    match kind {
        MediaKind::Image => Ok(EncodingParameters::Image {
            quality: level.quality_fraction(),
            max_width: settings.max_image_width,
            max_height: settings.max_image_height,
        }),
        MediaKind::Video => Ok(EncodingParameters::Video {
            bitrate_bps: level.bitrate_bps(settings.reference_bitrate_bps),
        }),
        MediaKind::Unknown => Err(DomainError::UnsupportedMediaType(kind.to_string())),
    }
}

/// Percentage of bytes saved going from `original` to `produced`.
///
/// Returns 0 ("not computed") when the original size is unknown. Negative
/// values mean the produced asset is larger.
pub fn compression_ratio(original: u64, produced: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    let saved = original as f64 - produced as f64;
    round_half_up(saved / original as f64 * 100.0) as i64
}

/// Human-readable byte count, e.g. `1.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent])
}

// Halves round toward positive infinity, so -20.5 becomes -20.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
