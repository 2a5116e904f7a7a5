use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::domains::core::file_storage_service::SizeProbe;
use crate::domains::media::saver::{MediaSaver, SaveDestination};
use crate::domains::media::types::{Asset, MediaKind};
use crate::errors::{DomainError, ServiceError, ServiceResult};
use super::compressors::MediaEncoder;
use super::mapper::{encoding_parameters, CompressionLevel, CompressionLevelInfo};
use super::settings::CompressionSettings;
use super::types::CompressionResult;

#[async_trait]
pub trait CompressionService: Send + Sync {
    /// Compress one asset at the given level.
    ///
    /// Size probing failures degrade to "unknown" (0); encoder failures are
    /// returned as `EncodingFailed` and no result is produced.
    async fn compress(
        &self,
        asset: &Asset,
        level: CompressionLevel,
    ) -> ServiceResult<CompressionResult>;

    /// Save a produced asset to the device
    async fn save(&self, location: &str, kind: MediaKind) -> ServiceResult<SaveDestination>;

    /// Describe a level for display
    fn level_info(&self, level: CompressionLevel) -> CompressionLevelInfo;
}

pub struct CompressionServiceImpl {
    encoder: Arc<dyn MediaEncoder>,
    size_probe: Option<Arc<dyn SizeProbe>>,
    saver: Option<Arc<dyn MediaSaver>>,
    settings: CompressionSettings,
}

impl CompressionServiceImpl {
    /// Optional collaborators may be absent on some hosts; the service then
    /// skips size resolution or reports saving as unavailable.
    pub fn new(
        encoder: Arc<dyn MediaEncoder>,
        size_probe: Option<Arc<dyn SizeProbe>>,
        saver: Option<Arc<dyn MediaSaver>>,
        settings: CompressionSettings,
    ) -> Self {
        Self {
            encoder,
            size_probe,
            saver,
            settings,
        }
    }

    pub fn settings(&self) -> &CompressionSettings {
        &self.settings
    }

    /// Byte size of `location`, or `None` when it cannot be determined
    async fn probe_size(&self, location: &str) -> Option<u64> {
        let Some(probe) = &self.size_probe else {
            log::debug!("No size probe available, size of {} unknown", location);
            return None;
        };

        match probe.size_of(location).await {
            Ok(size) => Some(size),
            Err(e) => {
                let err = DomainError::SizeProbeFailed(e.to_string());
                log::warn!("{} ({})", err, location);
                None
            }
        }
    }
}

#[async_trait]
impl CompressionService for CompressionServiceImpl {
    async fn compress(
        &self,
        asset: &Asset,
        level: CompressionLevel,
    ) -> ServiceResult<CompressionResult> {
        let start_time = Instant::now();

        // 1. Only images and videos are processed
        if !asset.kind.is_supported() {
            log::warn!("Refusing to compress {} with kind {}", asset.location, asset.kind);
            return Err(DomainError::UnsupportedMediaType(asset.kind.to_string()).into());
        }

        log::info!("Starting {} compression of {} at level {}", asset.kind, asset.location, level);

        // 2. Resolve the original size if the picker did not supply it
        let asset = match asset.byte_size {
            Some(_) => asset.clone(),
            None => asset.with_byte_size(self.probe_size(&asset.location).await.unwrap_or(0)),
        };
        let original_byte_size = asset.byte_size.unwrap_or(0);

        // 3. Map the level onto encoder parameters
        let params = encoding_parameters(asset.kind, level, &self.settings)?;
        log::debug!("Encoding parameters for {}: {:?}", asset.location, params);

        // 4. Encode. The only fatal step after validation.
        let produced_location = self.encoder
            .encode(&asset.location, asset.kind, &params)
            .await
            .map_err(|e| {
                log::error!("Encoding {} failed: {}", asset.location, e);
                DomainError::EncodingFailed {
                    kind: asset.kind,
                    cause: e.to_string(),
                }
            })?;

        if produced_location.trim().is_empty() {
            log::error!("Encoder returned an empty locator for {}", asset.location);
            return Err(DomainError::EncodingFailed {
                kind: asset.kind,
                cause: "encoder returned an empty location".to_string(),
            }.into());
        }

        // 5. Resolve the produced size
        let produced_byte_size = self.probe_size(&produced_location).await;

        // 6-7. Ratio and result are assembled together
        let result = CompressionResult::new(
            &asset,
            produced_location,
            level,
            original_byte_size,
            produced_byte_size,
            start_time.elapsed().as_millis() as u64,
        );

        log::info!(
            "Compressed {} -> {} ({} -> {} bytes, {}% saved, {} ms)",
            asset.location,
            result.location,
            result.original_byte_size,
            result.produced_byte_size,
            result.ratio_percent,
            result.duration_ms
        );

        Ok(result)
    }

    async fn save(&self, location: &str, kind: MediaKind) -> ServiceResult<SaveDestination> {
        if !kind.is_supported() {
            return Err(DomainError::UnsupportedMediaType(kind.to_string()).into());
        }

        let saver = self.saver.as_ref()
            .ok_or_else(|| DomainError::SaveFailed("File system access not available".to_string()))?;

        saver.save(location, kind).await.map_err(|e| -> ServiceError {
            log::error!("Saving {} failed: {}", location, e);
            match e {
                DomainError::SaveFailed(_) => e.into(),
                other => DomainError::SaveFailed(other.to_string()).into(),
            }
        })
    }

    fn level_info(&self, level: CompressionLevel) -> CompressionLevelInfo {
        CompressionLevelInfo::new(level, self.settings.reference_bitrate_bps)
    }
}
