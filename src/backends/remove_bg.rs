//! remove.bg HTTP client
//!
//! Sends the upload as a multipart form (`image_file` plus a `size` hint) with
//! the API key in `X-Api-Key`, and decodes the returned cut-out.

use crate::config::ExtractorConfig;
use crate::error::{Result, StickerError};
use crate::extractor::SubjectExtractor;
use crate::utils::alpha::ensure_alpha;
use async_trait::async_trait;
use image::RgbaImage;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::instrument;

/// File name attached to the uploaded part
const UPLOAD_FILE_NAME: &str = "image.png";

/// Subject extractor backed by the remove.bg API
#[derive(Debug, Clone)]
pub struct RemoveBgClient {
    client: Client,
    config: ExtractorConfig,
}

impl RemoveBgClient {
    /// Create a client with the timeout from `config`
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Failed to create HTTP client
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StickerError::network_error("Failed to create HTTP client", &e))?;

        Ok(Self { client, config })
    }

    /// Build from `REMOVE_BG_API_KEY` / `REMOVE_BG_ENDPOINT`
    ///
    /// # Errors
    /// See [`ExtractorConfig::from_env`] and [`RemoveBgClient::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(ExtractorConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn form(&self, image_bytes: &[u8]) -> Form {
        let part = Part::bytes(image_bytes.to_vec()).file_name(UPLOAD_FILE_NAME);
        Form::new()
            .part("image_file", part)
            .text("size", self.config.size.clone())
    }
}

#[async_trait]
impl SubjectExtractor for RemoveBgClient {
    #[instrument(level = "debug", skip(self, image_bytes), fields(upload_bytes = image_bytes.len(), endpoint = %self.config.endpoint))]
    async fn extract(&self, image_bytes: &[u8]) -> Result<RgbaImage> {
        debug!("Uploading {} bytes to {}", image_bytes.len(), self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("X-Api-Key", &self.config.api_key)
            .multipart(self.form(image_bytes))
            .send()
            .await
            .map_err(|e| StickerError::network_error("remove.bg request", &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable response body: {}>", e));
            warn!("remove.bg rejected upload with status {}", status.as_u16());
            return Err(StickerError::external_service(status.as_u16(), body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StickerError::network_error("remove.bg response body", &e))?;

        let decoded = image::load_from_memory(&body).map_err(|e| {
            StickerError::processing_stage_error(
                "background removal",
                &format!("response body is not a decodable image: {}", e),
                Some(&format!("{} bytes", body.len())),
            )
        })?;

        let subject = ensure_alpha(decoded);
        info!(
            "remove.bg returned a {}x{} cut-out",
            subject.width(),
            subject.height()
        );
        Ok(subject)
    }

    fn name(&self) -> &str {
        "remove.bg"
    }
}
