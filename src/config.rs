//! Configuration types for sticker pipeline operations

use crate::error::{Result, StickerError};
use crate::types::Color;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest blur radius; keeps both Gaussian passes within a sane kernel size
pub const MAX_BLUR_RADIUS: u32 = 255;

/// Default remove.bg endpoint
pub const DEFAULT_REMOVE_BG_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Environment variable holding the remove.bg API key
pub const API_KEY_ENV: &str = "REMOVE_BG_API_KEY";

/// Environment variable overriding the remove.bg endpoint
pub const ENDPOINT_ENV: &str = "REMOVE_BG_ENDPOINT";

/// Per-request options for one pipeline run
///
/// The defaults match the upload form: a 15px white border,
/// no gloss, and a light grey background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// Structuring element size for the border dilation (floored at 3)
    pub border_thickness: u32,

    /// Border color; only RGB is painted, coverage comes from the soft mask
    pub border_color: Color,

    /// Radius of the two smoothing passes over the border mask (0 = sharp edge)
    pub blur_radius: u32,

    /// Highlight strength (0 disables the gloss stage, not clamped)
    pub gloss_intensity: f32,

    /// Opaque color the sticker is flattened onto
    pub background_color: Color,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            border_thickness: 15,
            border_color: Color::rgba(255, 255, 255, 255),
            blur_radius: 8,
            gloss_intensity: 0.0,
            background_color: Color::rgb(200, 200, 200),
        }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder::default()
    }

    /// Whether the gloss stage runs for these options
    #[must_use]
    pub fn gloss_enabled(&self) -> bool {
        self.gloss_intensity != 0.0
    }

    /// Validate all option values
    ///
    /// # Errors
    /// - Blur radius above [`MAX_BLUR_RADIUS`]
    /// - Non-finite gloss intensity
    pub fn validate(&self) -> Result<()> {
        if self.blur_radius > MAX_BLUR_RADIUS {
            return Err(StickerError::config_value_error(
                "blur_radius",
                self.blur_radius,
                "0-255",
                Some(8),
            ));
        }

        if !self.gloss_intensity.is_finite() {
            return Err(StickerError::invalid_config(format!(
                "gloss_intensity must be a finite number, got {}",
                self.gloss_intensity
            )));
        }

        Ok(())
    }
}

/// Builder for `RequestOptions`
#[derive(Debug, Default)]
pub struct RequestOptionsBuilder {
    options: RequestOptions,
}

impl RequestOptionsBuilder {
    #[must_use]
    pub fn border_thickness(mut self, thickness: u32) -> Self {
        self.options.border_thickness = thickness;
        self
    }

    #[must_use]
    pub fn border_color(mut self, color: Color) -> Self {
        self.options.border_color = color;
        self
    }

    #[must_use]
    pub fn blur_radius(mut self, radius: u32) -> Self {
        self.options.blur_radius = radius;
        self
    }

    #[must_use]
    pub fn gloss_intensity(mut self, intensity: f32) -> Self {
        self.options.gloss_intensity = intensity;
        self
    }

    #[must_use]
    pub fn background_color(mut self, color: Color) -> Self {
        self.options.background_color = color;
        self
    }

    /// Build and validate the options
    ///
    /// # Errors
    /// See [`RequestOptions::validate`].
    pub fn build(self) -> Result<RequestOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

/// Configuration for the remove.bg client
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// API key sent in the `X-Api-Key` header
    pub api_key: String,

    /// Endpoint receiving the multipart upload
    pub endpoint: String,

    /// Value of the `size` form field
    pub size: String,

    /// Upper bound on the whole request, connect to last body byte
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl std::fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("size", &self.size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ExtractorConfig {
    /// Create a builder seeded with the given API key
    pub fn builder<S: Into<String>>(api_key: S) -> ExtractorConfigBuilder {
        ExtractorConfigBuilder {
            config: Self {
                api_key: api_key.into(),
                endpoint: DEFAULT_REMOVE_BG_ENDPOINT.to_string(),
                size: "auto".to_string(),
                timeout: Duration::from_secs(60),
            },
        }
    }

    /// Read the key (and optionally the endpoint) from the environment
    ///
    /// # Errors
    /// - `REMOVE_BG_API_KEY` unset or empty
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            StickerError::invalid_config(format!("{} is not set", API_KEY_ENV))
        })?;

        let mut builder = Self::builder(api_key);
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            builder = builder.endpoint(endpoint);
        }
        builder.build()
    }

    /// # Errors
    /// - Empty API key, endpoint or size hint
    /// - Zero timeout
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(StickerError::invalid_config("remove.bg API key is empty"));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(StickerError::invalid_config(format!(
                "Endpoint '{}' must be an http(s) URL",
                self.endpoint
            )));
        }
        if self.size.trim().is_empty() {
            return Err(StickerError::invalid_config("Size hint is empty"));
        }
        if self.timeout.is_zero() {
            return Err(StickerError::invalid_config("Timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Builder for `ExtractorConfig`
#[derive(Debug)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn size<S: Into<String>>(mut self, size: S) -> Self {
        self.config.size = size.into();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// # Errors
    /// See [`ExtractorConfig::validate`].
    pub fn build(self) -> Result<ExtractorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(crate) fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
