//! Sticker CLI Tool
//!
//! Command-line front end for the sticker pipeline: reads one image, writes one
//! PNG sticker.

use super::config::CliConfigBuilder;
use crate::{
    error::ErrorPayload,
    processor::StickerProcessor,
    services::{ConsoleProgressReporter, ImageIOService},
    tracing_config::{events, TracingFormat},
    StickerError,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::sync::Arc;

/// Turn a photo into a bordered sticker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "stickerize")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image file (PNG, JPEG or WebP). Use "-" for stdin.
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Output PNG file. Use "-" for stdout.
    #[arg(short, long, value_name = "OUTPUT", default_value = "-")]
    pub output: String,

    /// Border structuring element size in pixels (minimum effective size 3)
    #[arg(long, default_value_t = 15)]
    pub border_thickness: u32,

    /// Border color as r,g,b or r,g,b,a
    #[arg(long, value_name = "COLOR", default_value = "255,255,255,255")]
    pub border_color: String,

    /// Smoothing radius for the border edge (0 = sharp)
    #[arg(long, default_value_t = 8)]
    pub blur_radius: u32,

    /// Gloss intensity (0 disables the highlight)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub gloss: f32,

    /// Background color as r,g,b
    #[arg(long, value_name = "COLOR", default_value = "200,200,200")]
    pub background: String,

    /// remove.bg API key
    #[arg(long, env = "REMOVE_BG_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the remove.bg endpoint
    #[arg(long, env = "REMOVE_BG_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Timeout for the remove.bg call in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Skip remove.bg and use the input's own alpha channel as the subject
    #[arg(long)]
    pub offline: bool,

    /// Print failures as a JSON error payload on stdout
    #[arg(long)]
    pub json_errors: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format on stderr
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    /// Log filter directives (e.g. "stickerize=trace,reqwest=warn"); overrides -v and RUST_LOG
    #[arg(long, value_name = "DIRECTIVES")]
    pub log_filter: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    /// Colored, human-readable lines
    Console,
    /// Plain lines without ANSI colors, for CI logs
    Compact,
    /// One JSON object per event
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => TracingFormat::Json,
        }
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli).context("Failed to initialize tracing")?;

    match run(&cli).await {
        Ok(()) => Ok(()),
        Err(e) if cli.json_errors => {
            let payload = match e.downcast_ref::<StickerError>() {
                Some(sticker_error) => ErrorPayload::from(sticker_error),
                None => ErrorPayload {
                    error: format!("{:#}", e),
                },
            };
            let json = serde_json::to_string(&payload).context("Failed to serialize error")?;
            println!("{}", json);
            std::process::exit(1);
        },
        Err(e) => Err(e),
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let options = CliConfigBuilder::request_options(cli).context("Invalid sticker options")?;
    let extractor = CliConfigBuilder::extractor(cli).context("Failed to set up extractor")?;

    info!("Starting sticker CLI with {} extractor", extractor.name());

    let processor = StickerProcessor::from_shared(extractor)
        .with_progress_reporter(Arc::new(ConsoleProgressReporter::new(cli.verbose > 0)));

    let input = ImageIOService::read_input(&cli.input)?;
    let result = processor
        .process_with_options(&input, &options)
        .await
        .map_err(|e| {
            events::error_with_context(&e, &cli.input);
            e
        })?;

    ImageIOService::write_output(&cli.output, result.as_bytes())?;

    let (width, height) = result.dimensions();
    info!(
        "Wrote {}x{} sticker to {} in {}ms",
        width,
        height,
        if cli.output == "-" { "stdout" } else { cli.output.as_str() },
        result.timings.total_ms
    );

    Ok(())
}

/// Initialize tracing for the CLI
fn init_tracing(cli: &Cli) -> Result<()> {
    crate::tracing_config::init_cli_tracing(
        cli.verbose,
        cli.log_format.into(),
        cli.log_filter.as_deref(),
    )
    .context("Failed to initialize tracing subscriber")?;
    tracing::debug!(
        verbosity = cli.verbose,
        format = ?cli.log_format,
        "Tracing initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["stickerize", "photo.jpg"]).unwrap();
        assert_eq!(cli.input, "photo.jpg");
        assert_eq!(cli.output, "-");
        assert_eq!(cli.border_thickness, 15);
        assert_eq!(cli.border_color, "255,255,255,255");
        assert_eq!(cli.blur_radius, 8);
        assert!((cli.gloss - 0.0).abs() < f32::EPSILON);
        assert_eq!(cli.background, "200,200,200");
        assert_eq!(cli.timeout_secs, 60);
        assert!(!cli.offline);
        assert!(!cli.json_errors);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.log_format, CliLogFormat::Console);
        assert!(cli.log_filter.is_none());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "stickerize",
            "-",
            "-o",
            "out.png",
            "--border-thickness",
            "10",
            "--border-color",
            "0,0,255",
            "--blur-radius",
            "0",
            "--gloss",
            "0.4",
            "--background",
            "255,255,255",
            "--api-key",
            "k",
            "--endpoint",
            "http://127.0.0.1:8080/removebg",
            "--timeout-secs",
            "5",
            "--offline",
            "--json-errors",
            "-vv",
            "--log-format",
            "compact",
            "--log-filter",
            "stickerize=trace",
        ])
        .unwrap();

        assert_eq!(cli.input, "-");
        assert_eq!(cli.output, "out.png");
        assert_eq!(cli.border_thickness, 10);
        assert_eq!(cli.blur_radius, 0);
        assert!((cli.gloss - 0.4).abs() < f32::EPSILON);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(cli.timeout_secs, 5);
        assert!(cli.offline);
        assert!(cli.json_errors);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, CliLogFormat::Compact);
        assert_eq!(cli.log_filter.as_deref(), Some("stickerize=trace"));
    }

    #[test]
    fn test_log_format_maps_to_tracing_format() {
        assert_eq!(TracingFormat::from(CliLogFormat::Console), TracingFormat::Console);
        assert_eq!(TracingFormat::from(CliLogFormat::Compact), TracingFormat::Compact);
        assert!(Cli::try_parse_from(["stickerize", "in.png", "--log-format", "fancy"]).is_err());
    }

    #[cfg(feature = "tracing-json")]
    #[test]
    fn test_json_log_format() {
        let cli =
            Cli::try_parse_from(["stickerize", "in.png", "--log-format", "json"]).unwrap();
        assert_eq!(TracingFormat::from(cli.log_format), TracingFormat::Json);
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["stickerize"]).is_err());
    }
}
