//! Compression settings, with defaults overridable from the environment.

use serde::{Deserialize, Serialize};
use std::env;

/// Bitrate used for level 1 video output
pub const DEFAULT_REFERENCE_BITRATE_BPS: u64 = 1_000_000;
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 1920;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionSettings {
    pub reference_bitrate_bps: u64,
    pub max_image_width: u32,
    pub max_image_height: u32,
    /// Path to the ffmpeg binary used for video. `None` means look it up on `PATH`.
    pub ffmpeg_path: Option<String>,
    /// Directory the filesystem saver copies into. `None` disables it.
    pub save_dir: Option<String>,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            reference_bitrate_bps: DEFAULT_REFERENCE_BITRATE_BPS,
            max_image_width: DEFAULT_MAX_IMAGE_DIMENSION,
            max_image_height: DEFAULT_MAX_IMAGE_DIMENSION,
            ffmpeg_path: None,
            save_dir: None,
        }
    }
}

impl CompressionSettings {
    /// Read overrides from `MEDIA_REFERENCE_BITRATE_BPS`, `MEDIA_MAX_IMAGE_DIMENSION`,
    /// `FFMPEG_PATH` and `MEDIA_SAVE_DIR`. Unparseable values keep the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading each key through `get`.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let reference_bitrate_bps = get("MEDIA_REFERENCE_BITRATE_BPS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .filter(|val| *val > 0)
            .unwrap_or(defaults.reference_bitrate_bps);

        let max_dimension = get("MEDIA_MAX_IMAGE_DIMENSION")
            .and_then(|val| val.trim().parse::<u32>().ok())
            .filter(|val| *val > 0);

        Self {
            reference_bitrate_bps,
            max_image_width: max_dimension.unwrap_or(defaults.max_image_width),
            max_image_height: max_dimension.unwrap_or(defaults.max_image_height),
            ffmpeg_path: get("FFMPEG_PATH").filter(|val| !val.trim().is_empty()),
            save_dir: get("MEDIA_SAVE_DIR").filter(|val| !val.trim().is_empty()),
        }
    }
}
