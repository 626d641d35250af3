//! Upload validation
//!
//! Checks run before any bytes leave the process: the removal service is
//! billed per call, so bad uploads are rejected locally. Size and format
//! problems are `InvalidInput`; bytes that do not decode are `Decode`.

use crate::error::{Result, StickerError};
use image::ImageFormat;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Formats accepted for upload
pub const ACCEPTED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// Validator for raw upload bytes
pub struct UploadValidator;

impl UploadValidator {
    /// Check size limits, sniff the format and decode the upload
    ///
    /// # Errors
    /// - `InvalidInput`: empty upload
    /// - `InvalidInput`: upload larger than [`MAX_UPLOAD_BYTES`]
    /// - `InvalidInput`: recognised format not in [`ACCEPTED_FORMATS`]
    /// - `Decode`: bytes are not a recognisable image, or fail to decode as
    ///   the sniffed format
    pub fn validate(bytes: &[u8]) -> Result<ImageFormat> {
        if bytes.is_empty() {
            return Err(StickerError::invalid_input("Upload is empty"));
        }

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(StickerError::invalid_input(format!(
                "Upload is {} bytes; the limit is {} bytes (10MB)",
                bytes.len(),
                MAX_UPLOAD_BYTES
            )));
        }

        let format = image::guess_format(bytes).map_err(|_| {
            StickerError::decode(
                "Upload is not a recognised image. Supported formats: JPG, JPEG, PNG, WebP",
            )
        })?;

        if !ACCEPTED_FORMATS.contains(&format) {
            return Err(StickerError::invalid_input(format!(
                "Unsupported image format {:?}. Supported formats: JPG, JPEG, PNG, WebP",
                format
            )));
        }

        image::load_from_memory_with_format(bytes, format).map_err(|e| {
            StickerError::decode(format!("Failed to decode {:?} upload: {}", format, e))
        })?;

        Ok(format)
    }
}
