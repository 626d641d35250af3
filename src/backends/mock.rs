//! Offline extractors for testing and local runs

use crate::error::{Result, StickerError};
use crate::extractor::SubjectExtractor;
use crate::utils::alpha::ensure_alpha;
use async_trait::async_trait;
use image::{GrayImage, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Extractor that decodes the upload locally and applies a fixed mask
///
/// Without a mask the upload's own alpha channel is kept, which makes it
/// usable for already cut-out PNGs.
#[derive(Debug, Default)]
pub struct FixedMaskExtractor {
    mask: Option<GrayImage>,
    calls: AtomicUsize,
}

impl FixedMaskExtractor {
    /// Keep whatever alpha the upload already carries
    #[must_use]
    pub fn passthrough() -> Self {
        Self::default()
    }

    /// Replace the upload's alpha with `mask` (dimensions must match)
    #[must_use]
    pub fn with_mask(mask: GrayImage) -> Self {
        Self {
            mask: Some(mask),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `extract` calls so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubjectExtractor for FixedMaskExtractor {
    async fn extract(&self, image_bytes: &[u8]) -> Result<RgbaImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let decoded = image::load_from_memory(image_bytes)
            .map_err(|e| StickerError::decode(format!("Failed to decode upload: {}", e)))?;
        let mut subject = ensure_alpha(decoded);

        if let Some(mask) = &self.mask {
            if mask.dimensions() != subject.dimensions() {
                return Err(StickerError::invalid_input(format!(
                    "Mask is {}x{} but upload is {}x{}",
                    mask.width(),
                    mask.height(),
                    subject.width(),
                    subject.height()
                )));
            }
            for (pixel, m) in subject.pixels_mut().zip(mask.pixels()) {
                pixel[3] = m[0];
            }
        }

        Ok(subject)
    }

    fn name(&self) -> &str {
        "fixed-mask"
    }
}

/// Extractor that always answers like a rejecting remote service
#[derive(Debug)]
pub struct FailingExtractor {
    status: u16,
    body: String,
    calls: AtomicUsize,
}

impl FailingExtractor {
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            body: body.into(),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubjectExtractor for FailingExtractor {
    async fn extract(&self, _image_bytes: &[u8]) -> Result<RgbaImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StickerError::external_service(self.status, self.body.clone()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
