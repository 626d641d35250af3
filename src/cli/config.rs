//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::{
    backends::{FixedMaskExtractor, RemoveBgClient},
    config::{ExtractorConfig, RequestOptions},
    extractor::SubjectExtractor,
    types::Color,
    StickerError,
};
use std::sync::Arc;
use std::time::Duration;

/// Convert CLI arguments to pipeline configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build per-request options from CLI arguments
    pub(crate) fn request_options(cli: &Cli) -> crate::Result<RequestOptions> {
        let border_color: Color = cli.border_color.parse()?;
        let background_color: Color = cli.background.parse()?;

        RequestOptions::builder()
            .border_thickness(cli.border_thickness)
            .border_color(border_color)
            .blur_radius(cli.blur_radius)
            .gloss_intensity(cli.gloss)
            .background_color(background_color)
            .build()
    }

    /// Build the remove.bg client configuration from CLI arguments
    pub(crate) fn extractor_config(cli: &Cli) -> crate::Result<ExtractorConfig> {
        let api_key = cli.api_key.clone().ok_or_else(|| {
            StickerError::invalid_config(
                "No remove.bg API key. Pass --api-key, set REMOVE_BG_API_KEY, or use --offline",
            )
        })?;

        let mut builder =
            ExtractorConfig::builder(api_key).timeout(Duration::from_secs(cli.timeout_secs));
        if let Some(endpoint) = &cli.endpoint {
            builder = builder.endpoint(endpoint.clone());
        }
        builder.build()
    }

    /// Pick the extractor: local passthrough for `--offline`, remove.bg otherwise
    pub(crate) fn extractor(cli: &Cli) -> crate::Result<Arc<dyn SubjectExtractor>> {
        if cli.offline {
            log::debug!("Offline mode: using the input's alpha channel as the subject");
            return Ok(Arc::new(FixedMaskExtractor::passthrough()));
        }

        let client = RemoveBgClient::new(Self::extractor_config(cli)?)?;
        Ok(Arc::new(client))
    }
}
