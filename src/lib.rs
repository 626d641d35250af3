#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Stickerize
//!
//! Turns a photo into a sticker: the subject is cut out by the remove.bg API,
//! outlined with a smooth colored border, optionally given a glossy highlight,
//! and flattened onto a solid background as an opaque PNG.
//!
//! ## Features
//!
//! - **Subject extraction**: remove.bg client behind the [`SubjectExtractor`] trait,
//!   with in-process extractors for offline use and tests
//! - **Smooth borders**: elliptical dilation of the alpha channel followed by two
//!   Gaussian passes
//! - **Gloss**: additive highlight over the top band of the subject
//! - **Flattening**: straight-alpha compositing onto any solid color, PNG output
//! - **CLI Integration**: Optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stickerize::{ExtractorConfig, RemoveBgClient, RequestOptions, StickerProcessor, Color};
//!
//! # async fn example(upload: Vec<u8>) -> anyhow::Result<()> {
//! let client = RemoveBgClient::new(ExtractorConfig::builder("my-api-key").build()?)?;
//! let processor = StickerProcessor::new(client);
//!
//! let options = RequestOptions::builder()
//!     .border_thickness(20)
//!     .border_color(Color::rgb(0, 120, 255))
//!     .gloss_intensity(0.3)
//!     .build()?;
//!
//! let sticker = processor.process_with_options(&upload, &options).await?;
//! sticker.save_png("sticker.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): Command-line interface and tracing subscriber setup
//! - `tracing-json`: JSON log output for the CLI

pub mod backends;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod effects;
pub mod error;
pub mod extractor;
pub mod processor;
pub mod services;
pub mod tracing_config;
pub mod types;
pub mod utils;

// Public API exports
pub use backends::{FailingExtractor, FixedMaskExtractor, RemoveBgClient};
pub use config::{ExtractorConfig, RequestOptions, RequestOptionsBuilder};
pub use effects::{add_border, apply_gloss, flatten};
pub use error::{ErrorPayload, Result, StickerError};
pub use extractor::SubjectExtractor;
pub use processor::{compose_sticker, StickerProcessor};
pub use services::{
    ConsoleProgressReporter, ImageIOService, NoOpProgressReporter, ProgressReporter,
    ProgressUpdate,
};
pub use types::{Color, PipelineStage, ProcessingTimings, StickerResult};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Make a sticker from uploaded bytes with the remove.bg API
///
/// Reads the API key (and optional endpoint override) from the environment.
///
/// ```rust,no_run
/// use stickerize::{sticker_from_bytes, RequestOptions};
///
/// # async fn example(upload: Vec<u8>) -> anyhow::Result<()> {
/// let png = sticker_from_bytes(&upload, &RequestOptions::default()).await?;
/// std::fs::write("sticker.png", png)?;
/// # Ok(())
/// # }
/// ```
pub async fn sticker_from_bytes(image_bytes: &[u8], options: &RequestOptions) -> Result<Vec<u8>> {
    let processor = StickerProcessor::new(RemoveBgClient::from_env()?);
    let result = processor.process_with_options(image_bytes, options).await?;
    Ok(result.into_bytes())
}

/// Read an image from an async stream and make a sticker with `extractor`
pub async fn sticker_from_reader<R, E>(
    mut reader: R,
    extractor: E,
    options: &RequestOptions,
) -> Result<StickerResult>
where
    R: tokio::io::AsyncRead + Unpin,
    E: SubjectExtractor + 'static,
{
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer).await?;

    StickerProcessor::new(extractor)
        .process_with_options(&buffer, options)
        .await
}
