 //! Encoders for the supported media kinds

pub mod image_compressor;
pub mod video_compressor;

use async_trait::async_trait;
use crate::domains::media::types::MediaKind;
use crate::errors::{DomainError, DomainResult};
use super::types::EncodingParameters;

/// The encoding collaborator the orchestrator depends on.
///
/// Returns the locator of the newly produced asset.
#[async_trait]
pub trait MediaEncoder: Send + Sync {
    async fn encode(
        &self,
        location: &str,
        kind: MediaKind,
        params: &EncodingParameters,
    ) -> DomainResult<String>;
}

/// Common trait for all local compressors
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Check if this compressor can handle the given kind
    fn can_handle(&self, kind: MediaKind) -> bool;

    /// Compress the file at `location`, returning the output locator
    async fn compress(&self, location: &str, params: &EncodingParameters) -> DomainResult<String>;

    /// Get the compressor type name for logging
    fn compressor_name(&self) -> &'static str;
}

/// Encoder backed by in-process compressors, picked by media kind
pub struct LocalMediaEncoder {
    compressors: Vec<Box<dyn Compressor>>,
}

impl LocalMediaEncoder {
    pub fn new(compressors: Vec<Box<dyn Compressor>>) -> Self {
        Self { compressors }
    }

    /// Find the appropriate compressor for a kind
    fn find_compressor(&self, kind: MediaKind) -> Option<&dyn Compressor> {
        self.compressors
            .iter()
            .find(|compressor| compressor.can_handle(kind))
            .map(|compressor| compressor.as_ref())
    }
}

#[async_trait]
impl MediaEncoder for LocalMediaEncoder {
    async fn encode(
        &self,
        location: &str,
        kind: MediaKind,
        params: &EncodingParameters,
    ) -> DomainResult<String> {
        if params.kind() != kind {
            return Err(DomainError::Internal(format!(
                "{} parameters passed for {} asset", params.kind(), kind
            )));
        }

        let compressor = self.find_compressor(kind)
            .ok_or_else(|| DomainError::UnsupportedMediaType(kind.to_string()))?;

        log::debug!("Encoding {} with {}", location, compressor.compressor_name());
        compressor.compress(location, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoCompressor;

    #[async_trait]
    impl Compressor for EchoCompressor {
        fn can_handle(&self, kind: MediaKind) -> bool {
            kind == MediaKind::Image
        }

        async fn compress(&self, location: &str, _params: &EncodingParameters) -> DomainResult<String> {
            Ok(format!("{}.out", location))
        }

        fn compressor_name(&self) -> &'static str {
            "EchoCompressor"
        }
    }

    fn image_params() -> EncodingParameters {
        EncodingParameters::Image { quality: 0.5, max_width: 100, max_height: 100 }
    }

    #[tokio::test]
    async fn test_dispatches_by_kind() {
        let encoder = LocalMediaEncoder::new(vec![Box::new(EchoCompressor)]);
        let out = encoder.encode("a.jpg", MediaKind::Image, &image_params()).await.unwrap();
        assert_eq!(out, "a.jpg.out");
    }

    #[tokio::test]
    async fn test_no_compressor_for_kind() {
        let encoder = LocalMediaEncoder::new(vec![Box::new(EchoCompressor)]);
        let params = EncodingParameters::Video { bitrate_bps: 100_000 };
        let err = encoder.encode("a.mp4", MediaKind::Video, &params).await.unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedMediaType(_)));
    }

    #[tokio::test]
    async fn test_mismatched_parameters() {
        let encoder = LocalMediaEncoder::new(vec![Box::new(EchoCompressor)]);
        let err = encoder.encode("a.mp4", MediaKind::Video, &image_params()).await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
