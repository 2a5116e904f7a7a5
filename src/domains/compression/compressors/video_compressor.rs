//! Video compression implementation

use async_trait::async_trait;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tokio::task;

use crate::domains::core::file_storage_service::{location_to_path, LocalFileStorageService};
use crate::domains::compression::types::EncodingParameters;
use crate::domains::media::types::MediaKind;
use crate::errors::{DomainError, DomainResult};
use super::Compressor;

/// Video compressor using an external ffmpeg binary.
/// Transcodes to H.264/AAC in an MP4 container at the target bitrate.
pub struct VideoCompressor {
    ffmpeg_path: String,
    storage: Arc<LocalFileStorageService>,
}

impl VideoCompressor {
    pub fn new(storage: Arc<LocalFileStorageService>, ffmpeg_path: Option<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.unwrap_or_else(|| "ffmpeg".to_string()),
            storage,
        }
    }

    fn build_args(input: &str, output: &str, bitrate_bps: u64) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-b:v".to_string(),
            bitrate_bps.to_string(),
            "-maxrate".to_string(),
            bitrate_bps.to_string(),
            "-bufsize".to_string(),
            (bitrate_bps * 2).to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.to_string(),
        ]
    }
}

#[async_trait]
impl Compressor for VideoCompressor {
    fn can_handle(&self, kind: MediaKind) -> bool {
        kind == MediaKind::Video
    }

    async fn compress(&self, location: &str, params: &EncodingParameters) -> DomainResult<String> {
        let bitrate_bps = match params {
            EncodingParameters::Video { bitrate_bps } => *bitrate_bps,
            other => {
                return Err(DomainError::Internal(format!("VideoCompressor got {} parameters", other.kind())));
            }
        };

        let input_path = location_to_path(location);
        if !input_path.is_file() {
            return Err(DomainError::File(format!("Video not found: {}", location)));
        }

        let output_path = self.storage.new_output_path("mp4")?;
        let args = Self::build_args(
            &input_path.to_string_lossy(),
            &output_path.to_string_lossy(),
            bitrate_bps,
        );
        let ffmpeg_path = self.ffmpeg_path.clone();

        log::info!("Transcoding {} at {} bps", location, bitrate_bps);

        // Run ffmpeg in a blocking task
        task::spawn_blocking(move || -> DomainResult<()> {
            let output = Command::new(&ffmpeg_path)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .map_err(|e| DomainError::External(format!("Failed to execute {}: {}", ffmpeg_path, e)))?;

            if !output.status.success() {
                let error = String::from_utf8_lossy(&output.stderr);
                return Err(DomainError::External(format!("ffmpeg error ({}): {}", output.status, error.trim())));
            }
            Ok(())
        }).await.map_err(|e| DomainError::Internal(format!("Task join error: {}", e)))??;

        Ok(output_path.to_string_lossy().into_owned())
    }

    fn compressor_name(&self) -> &'static str {
        "VideoCompressor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_carries_bitrate() {
        let args = VideoCompressor::build_args("in.mov", "out.mp4", 300_000);
        let pos = args.iter().position(|a| a == "-b:v").unwrap();
        assert_eq!(args[pos + 1], "300000");
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
        assert!(args.windows(2).any(|w| w[0] == "-i" && w[1] == "in.mov"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalFileStorageService::new(dir.path().to_str().unwrap()).unwrap());
        let source = dir.path().join("clip.mp4");
        std::fs::write(&source, b"not really a video").unwrap();

        let compressor = VideoCompressor::new(storage, Some("/nonexistent/ffmpeg-binary".to_string()));
        let params = EncodingParameters::Video { bitrate_bps: 100_000 };
        let err = compressor.compress(source.to_str().unwrap(), &params).await.unwrap_err();
        assert!(matches!(err, DomainError::External(_)));
    }

    #[tokio::test]
    async fn test_rejects_image_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalFileStorageService::new(dir.path().to_str().unwrap()).unwrap());
        let compressor = VideoCompressor::new(storage, None);
        let params = EncodingParameters::Image { quality: 0.5, max_width: 10, max_height: 10 };
        assert!(compressor.compress("clip.mp4", &params).await.is_err());
    }
}
