//! Image normalization for uploads.
//!
//! Decodes an image, applies its EXIF rotation, shrinks it to fit the upload
//! bounds and re-encodes it as JPEG. Every failure is logged and reported as
//! `None`; callers fall back to the original file or skip the upload.
use crate::constants::{JPEG_QUALITY, MAX_IMAGE_HEIGHT, MAX_IMAGE_WIDTH};
use crate::error::AppError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Bounds and quality used when normalizing an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_width: MAX_IMAGE_WIDTH,
            max_height: MAX_IMAGE_HEIGHT,
            quality: JPEG_QUALITY,
        }
    }
}

/// Uniform downscale factor that fits `width`×`height` into the bounds. Never above 1.
pub fn scale_factor(width: u32, height: u32, max_width: u32, max_height: u32) -> f64 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    let factor = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    factor.min(1.0)
}

pub fn target_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let factor = scale_factor(width, height, max_width, max_height);
    if factor >= 1.0 {
        return (width, height);
    }
    (
        ((width as f64 * factor).round() as u32).max(1),
        ((height as f64 * factor).round() as u32).max(1),
    )
}

/// Clockwise rotation in degrees for an orientation tag. Mirrored variants are ignored.
pub fn rotation_degrees(orientation: Orientation) -> u16 {
    match orientation {
        Orientation::Rotate90 => 90,
        Orientation::Rotate180 => 180,
        Orientation::Rotate270 => 270,
        _ => 0,
    }
}

fn rotate(img: DynamicImage, degrees: u16) -> DynamicImage {
    match degrees {
        90 => img.rotate90(),
        180 => img.rotate180(),
        270 => img.rotate270(),
        _ => img,
    }
}

fn try_compress(bytes: &[u8], options: &CompressOptions) -> Result<Vec<u8>, AppError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::Image(format!("Failed to read image: {}", e)))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| AppError::Image(format!("Unsupported image: {}", e)))?;

    let orientation = match decoder.orientation() {
        Ok(orientation) => orientation,
        Err(e) => {
            log::debug!("No usable orientation metadata: {}", e);
            Orientation::NoTransforms
        }
    };

    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| AppError::Image(format!("Failed to decode image: {}", e)))?;

    let degrees = rotation_degrees(orientation);
    if degrees != 0 {
        log::debug!("Rotating image by {} degrees", degrees);
        img = rotate(img, degrees);
    }

    let (width, height) = (img.width(), img.height());
    let (new_width, new_height) =
        target_dimensions(width, height, options.max_width, options.max_height);
    if (new_width, new_height) != (width, height) {
        log::debug!(
            "Resizing image {}x{} -> {}x{}",
            width,
            height,
            new_width,
            new_height
        );
        img = img.resize_exact(new_width, new_height, FilterType::Triangle);
    }

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    drop(img);

    let mut payload = Vec::new();
    JpegEncoder::new_with_quality(&mut payload, options.quality)
        .encode_image(&rgb)
        .map_err(|e| AppError::Image(format!("Failed to encode image: {}", e)))?;

    Ok(payload)
}

/// Normalize in-memory image bytes with custom bounds.
pub fn compress_with_options(bytes: &[u8], options: &CompressOptions) -> Option<Vec<u8>> {
    match try_compress(bytes, options) {
        Ok(payload) => {
            log::info!(
                "Compressed image from {} to {} bytes",
                bytes.len(),
                payload.len()
            );
            Some(payload)
        }
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}

pub fn compress_image_bytes(bytes: &[u8]) -> Option<Vec<u8>> {
    compress_with_options(bytes, &CompressOptions::default())
}

/// Read and normalize the image at `path`.
pub fn compress_image(path: impl AsRef<Path>) -> Option<Vec<u8>> {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(bytes) => compress_image_bytes(&bytes),
        Err(e) => {
            log::warn!("Failed to read image {:?}: {}", path, e);
            None
        }
    }
}

fn write_temp_file(payload: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("compressed_")
        .suffix(".jpg")
        .tempfile()?;
    file.write_all(payload)?;
    file.flush()?;
    Ok(file)
}

/// Normalize the image at `path` and write it to a fresh temp file.
///
/// The file is removed when the returned handle is dropped; call
/// [`NamedTempFile::keep`] to hold on to it.
pub fn compress_to_temp_file(path: impl AsRef<Path>) -> Option<NamedTempFile> {
    let payload = compress_image(path)?;
    match write_temp_file(&payload) {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("Failed to write compressed image: {}", e);
            None
        }
    }
}

/// [`compress_image`] on the blocking thread pool.
pub async fn compress_image_async(path: PathBuf) -> Option<Vec<u8>> {
    match tokio::task::spawn_blocking(move || compress_image(path)).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Image compression task failed: {}", e);
            None
        }
    }
}

/// Like [`compress_image_async`] but for raw bytes already in memory.
pub async fn compress_image_bytes_async(bytes: Vec<u8>) -> Option<Vec<u8>> {
    match tokio::task::spawn_blocking(move || compress_image_bytes(&bytes)).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Image compression task failed: {}", e);
            None
        }
    }
}

pub async fn compress_to_temp_file_async(path: PathBuf) -> Option<NamedTempFile> {
    match tokio::task::spawn_blocking(move || compress_to_temp_file(path)).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Image compression task failed: {}", e);
            None
        }
    }
}
