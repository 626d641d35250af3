//! Subject extraction abstraction

use crate::error::Result;
use async_trait::async_trait;
use image::RgbaImage;

/// Something that cuts the subject out of a photo
///
/// Implementations return an RGBA image whose alpha channel marks the
/// foreground. The pipeline calls `extract` exactly once per request and
/// never retries.
#[async_trait]
pub trait SubjectExtractor: Send + Sync {
    /// Extract the subject from raw upload bytes
    ///
    /// # Errors
    /// - `ExternalService` for a non-success answer from a remote service
    /// - `Transport` for network failures
    /// - `Decode` when the result is not a decodable image
    async fn extract(&self, image_bytes: &[u8]) -> Result<RgbaImage>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: SubjectExtractor + ?Sized> SubjectExtractor for Box<T> {
    async fn extract(&self, image_bytes: &[u8]) -> Result<RgbaImage> {
        (**self).extract(image_bytes).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: SubjectExtractor + ?Sized> SubjectExtractor for std::sync::Arc<T> {
    async fn extract(&self, image_bytes: &[u8]) -> Result<RgbaImage> {
        (**self).extract(image_bytes).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
