use crate::domains::compression::compressors::image_compressor::ImageCompressor;
use crate::domains::compression::compressors::video_compressor::VideoCompressor;
use crate::domains::compression::compressors::{Compressor, LocalMediaEncoder, MediaEncoder};
use crate::domains::compression::service::{CompressionService, CompressionServiceImpl};
use crate::domains::compression::session::CompressionSession;
use crate::domains::compression::settings::CompressionSettings;
use crate::domains::core::file_storage_service::{LocalFileStorageService, SizeProbe};
use crate::domains::media::saver::{FallbackSaver, LocalMediaSaver, MediaSaver};
use crate::errors::ServiceError;
use crate::ffi::error::{FFIError, FFIResult};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use lazy_static::lazy_static;

// Global state definitions
lazy_static! {
    static ref INIT_MUTEX: tokio::sync::Mutex<()> = tokio::sync::Mutex::new(());
    static ref INITIALIZED: AtomicBool = AtomicBool::new(false);

    static ref COMPRESSION_SERVICE: Mutex<Option<Arc<dyn CompressionService>>> = Mutex::new(None);
    static ref COMPRESSION_SESSION: Mutex<Option<Arc<CompressionSession>>> = Mutex::new(None);
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

pub fn get_compression_service() -> FFIResult<Arc<dyn CompressionService>> {
    COMPRESSION_SERVICE.lock().map_err(|_| FFIError::internal("COMPRESSION_SERVICE lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("CompressionService not initialized".to_string()))
}
pub fn get_compression_session() -> FFIResult<Arc<CompressionSession>> {
    COMPRESSION_SESSION.lock().map_err(|_| FFIError::internal("COMPRESSION_SESSION lock poisoned".to_string()))?.clone().ok_or_else(|| FFIError::internal("CompressionSession not initialized".to_string()))
}

/// Wire the compression service for a storage root.
///
/// Image and video compressors write into `<storage>/compressed`. Saved copies
/// go to `MEDIA_SAVE_DIR` when set, otherwise `<storage>/saved`.
pub fn build_compression_service(
    storage: Arc<LocalFileStorageService>,
    settings: CompressionSettings,
) -> Arc<dyn CompressionService> {
    let compressors: Vec<Box<dyn Compressor>> = vec![
        Box::new(ImageCompressor::new(storage.clone())),
        Box::new(VideoCompressor::new(storage.clone(), settings.ffmpeg_path.clone())),
    ];
    let encoder: Arc<dyn MediaEncoder> = Arc::new(LocalMediaEncoder::new(compressors));
    let size_probe: Arc<dyn SizeProbe> = storage.clone();

    let save_dir = settings.save_dir.clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| storage.base_path().join("saved"));
    // No photo-library saver exists off-device; the filesystem saver is the fallback
    let local_saver: Arc<dyn MediaSaver> = Arc::new(LocalMediaSaver::new(save_dir));
    let fallback_saver = FallbackSaver::new(None, Some(local_saver));
    let saver: Option<Arc<dyn MediaSaver>> = if fallback_saver.is_available() {
        Some(Arc::new(fallback_saver))
    } else {
        log::warn!("No media saver available, saving is disabled");
        None
    };

    Arc::new(CompressionServiceImpl::new(encoder, Some(size_probe), saver, settings))
}

pub async fn initialize(storage_path: &str) -> FFIResult<()> {
    // Acquire the async mutex to ensure single initialization
    let _guard = INIT_MUTEX.lock().await;

    if INITIALIZED.load(Ordering::Acquire) {
        return Ok(());
    }

    let result = initialize_internal(storage_path).await;

    // Mark as initialized only if successful
    if result.is_ok() {
        INITIALIZED.store(true, Ordering::Release);
    }

    result
}

async fn initialize_internal(storage_path: &str) -> FFIResult<()> {
    // Initialize logging first
    if std::env::var("RUST_LOG").is_err() {
        #[cfg(debug_assertions)]
        std::env::set_var("RUST_LOG", "debug");
        #[cfg(not(debug_assertions))]
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = env_logger::try_init();

    // A missing .env is normal on device
    if let Err(e) = dotenv::dotenv() {
        log::debug!("No .env loaded: {}", e);
    }

    log::info!("Starting internal initialization");

    let settings = CompressionSettings::from_env();
    log::info!(
        "Compression settings: reference bitrate {} bps, max image {}x{}, ffmpeg {}",
        settings.reference_bitrate_bps,
        settings.max_image_width,
        settings.max_image_height,
        settings.ffmpeg_path.as_deref().unwrap_or("ffmpeg (PATH)"),
    );

    log::info!("Initializing file storage with path: '{}'", storage_path);
    let file_storage_service = Arc::new(
        LocalFileStorageService::new(storage_path)
            .map_err(|e| FFIError::from(ServiceError::Configuration(format!("File storage init failed: {}", e))))?
    );

    let compression_service = build_compression_service(file_storage_service, settings);

    *COMPRESSION_SERVICE.lock().map_err(|_| FFIError::internal("COMPRESSION_SERVICE lock poisoned".to_string()))? = Some(compression_service);
    *COMPRESSION_SESSION.lock().map_err(|_| FFIError::internal("COMPRESSION_SESSION lock poisoned".to_string()))? = Some(Arc::new(CompressionSession::new()));

    log::info!("Initialization complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::media::types::{Asset, MediaKind};

    #[tokio::test]
    async fn test_built_service_reports_unsupported_kind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalFileStorageService::new(dir.path().to_str().unwrap()).unwrap());
        let service = build_compression_service(storage, CompressionSettings::default());

        let asset = Asset::new(dir.path().join("notes.txt").to_string_lossy(), MediaKind::Unknown);
        assert!(service.compress(&asset, Default::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_unusable_storage_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let err = initialize_internal(blocker.join("storage").to_str().unwrap()).await.unwrap_err();
        assert_eq!(err.code, crate::ffi::error::ErrorCode::ConfigurationError);
        assert!(err.message.starts_with("File storage init failed"));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        initialize(path).await.unwrap();
        initialize(path).await.unwrap();

        assert!(is_initialized());
        assert!(get_compression_service().is_ok());
        assert!(get_compression_session().is_ok());
    }
}
