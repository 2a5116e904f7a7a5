 //! Image compression implementation

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, ImageEncoder};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task;

use crate::domains::core::file_storage_service::{location_to_path, LocalFileStorageService};
use crate::domains::compression::types::EncodingParameters;
use crate::domains::media::types::MediaKind;
use crate::errors::{DomainError, DomainResult};
use super::Compressor;

/// Image compressor using the `image` crate.
///
/// Downscales to fit the configured bounds, then re-encodes as JPEG at the
/// requested quality. Sources with an alpha channel become PNG instead.
pub struct ImageCompressor {
    storage: Arc<LocalFileStorageService>,
}

impl ImageCompressor {
    pub fn new(storage: Arc<LocalFileStorageService>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Compressor for ImageCompressor {
    fn can_handle(&self, kind: MediaKind) -> bool {
        kind == MediaKind::Image
    }

    async fn compress(&self, location: &str, params: &EncodingParameters) -> DomainResult<String> {
        let (quality, max_width, max_height) = match params {
            EncodingParameters::Image { quality, max_width, max_height } => (*quality, *max_width, *max_height),
            other => {
                return Err(DomainError::Internal(format!("ImageCompressor got {} parameters", other.kind())));
            }
        };
        // JPEG quality is 1-100
        let jpeg_quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;

        let input_path = location_to_path(location);
        let data = tokio::fs::read(&input_path).await
            .map_err(|e| DomainError::File(format!("Failed to read {}: {}", location, e)))?;

        // Run image operations in a blocking task to avoid blocking the runtime
        let (encoded, extension) = task::spawn_blocking(move || -> DomainResult<(Vec<u8>, &'static str)> {
            let img = image::load_from_memory(&data)
                .map_err(|e| DomainError::Internal(format!("Failed to load image: {}", e)))?;

            let img = fit_within(img, max_width, max_height);

            if img.color().has_alpha() {
                Ok((encode_png(&img)?, "png"))
            } else {
                Ok((encode_jpeg(&img, jpeg_quality)?, "jpg"))
            }
        }).await.map_err(|e| DomainError::Internal(format!("Task join error: {}", e)))??;

        let output_path: PathBuf = self.storage.new_output_path(extension)?;
        tokio::fs::write(&output_path, &encoded).await
            .map_err(|e| DomainError::File(format!("Failed to write compressed image: {}", e)))?;

        log::debug!("Image written to {} ({} bytes, quality {})", output_path.display(), encoded.len(), jpeg_quality);
        Ok(output_path.to_string_lossy().into_owned())
    }

    fn compressor_name(&self) -> &'static str {
        "ImageCompressor"
    }
}

/// Downscale preserving aspect ratio. Images already within bounds are untouched.
fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_width && height <= max_height {
        return img;
    }
    img.resize(max_width, max_height, image::imageops::FilterType::Lanczos3)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> DomainResult<Vec<u8>> {
    let mut output = Vec::new();
    // The JPEG encoder rejects alpha and 16-bit buffers
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality);
    encoder.encode_image(&rgb)
        .map_err(|e| DomainError::Internal(format!("JPEG encoding error: {}", e)))?;
    Ok(output)
}

fn encode_png(img: &DynamicImage) -> DomainResult<Vec<u8>> {
    let mut output = Vec::new();
    let png = img.to_rgba8();
    let encoder = image::codecs::png::PngEncoder::new_with_quality(
        &mut output,
        image::codecs::png::CompressionType::Best,
        image::codecs::png::FilterType::Adaptive
    );
    encoder.write_image(
        &png,
        png.width(),
        png.height(),
        image::ColorType::Rgba8
    ).map_err(|e| DomainError::Internal(format!("PNG encoding error: {}", e)))?;
    Ok(output)
}
