//! Core types for the sticker pipeline

use crate::error::{Result, StickerError};
use image::{Rgb, Rgba};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// An 8-bit color with optional transparency
///
/// Alpha defaults to fully opaque when a color is built from three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }

    #[must_use]
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = StickerError;

    /// Parse `"r,g,b"` or `"r,g,b,a"` with each channel in 0-255
    fn from_str(s: &str) -> Result<Self> {
        let channels = s
            .split(',')
            .map(|part| {
                part.trim().parse::<u8>().map_err(|_| {
                    StickerError::config_value_error("color channel", part.trim(), "0-255", None)
                })
            })
            .collect::<Result<Vec<u8>>>()?;

        match channels.as_slice() {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
            _ => Err(StickerError::invalid_config(format!(
                "Color '{}' must have 3 or 4 comma-separated channels",
                s
            ))),
        }
    }
}

/// Pipeline states a single request moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Upload accepted
    Received,
    /// Subject extracted by the removal service
    BackgroundRemoved,
    /// Border composited behind the subject
    BorderAdded,
    /// Highlight blended into the subject
    GlossApplied,
    /// Gloss intensity was zero
    GlossSkipped,
    /// Composited onto the background color and encoded
    Flattened,
    /// Encoded bytes handed back to the caller
    Responded,
    /// Aborted; no output produced
    Failed,
}

impl PipelineStage {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            PipelineStage::Received => "Upload received",
            PipelineStage::BackgroundRemoved => "Background removed",
            PipelineStage::BorderAdded => "Border added",
            PipelineStage::GlossApplied => "Gloss applied",
            PipelineStage::GlossSkipped => "Gloss skipped",
            PipelineStage::Flattened => "Flattened onto background",
            PipelineStage::Responded => "Response ready",
            PipelineStage::Failed => "Processing failed",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Responded | PipelineStage::Failed)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Wall-clock time spent in each stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Round trip to the removal service including decode
    pub removal_ms: u64,
    pub border_ms: u64,
    pub gloss_ms: u64,
    /// Flattening and PNG encoding
    pub flatten_ms: u64,
    pub total_ms: u64,
}

impl ProcessingTimings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of the total spent waiting on the removal service
    #[must_use]
    pub fn removal_ratio(&self) -> f64 {
        if self.total_ms == 0 {
            0.0
        } else {
            self.removal_ms as f64 / self.total_ms as f64
        }
    }
}

/// Result of a successful pipeline run
#[derive(Debug, Clone)]
pub struct StickerResult {
    /// PNG-encoded opaque image
    pub png: Vec<u8>,
    /// Pixel dimensions of the subject returned by the removal service
    pub dimensions: (u32, u32),
    /// Stages visited, in order
    pub stages: Vec<PipelineStage>,
    pub timings: ProcessingTimings,
}

impl StickerResult {
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.png
    }

    /// Write the PNG bytes to disk
    ///
    /// # Errors
    /// - `Io` if the file cannot be created or written
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), &self.png)?;
        log::debug!(
            "Saved {}x{} sticker to {}",
            self.dimensions.0,
            self.dimensions.1,
            path.as_ref().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_rgb() {
        let color: Color = "10, 20,30".parse().unwrap();
        assert_eq!(color, Color::rgb(10, 20, 30));
        assert_eq!(color.a, 255);
    }

    #[test]
    fn test_color_parse_rgba() {
        let color: Color = "0,0,255,128".parse().unwrap();
        assert_eq!(color, Color::rgba(0, 0, 255, 128));
        assert_eq!(color.to_string(), "0,0,255,128");
    }

    #[test]
    fn test_color_parse_rejects_bad_input() {
        assert!("256,0,0".parse::<Color>().is_err());
        assert!("1,2".parse::<Color>().is_err());
        assert!("1,2,3,4,5".parse::<Color>().is_err());
        assert!("red".parse::<Color>().is_err());
    }

    #[test]
    fn test_terminal_stages() {
        assert!(PipelineStage::Responded.is_terminal());
        assert!(PipelineStage::Failed.is_terminal());
        assert!(!PipelineStage::BorderAdded.is_terminal());
    }

    #[test]
    fn test_removal_ratio() {
        let timings = ProcessingTimings {
            removal_ms: 300,
            total_ms: 400,
            ..ProcessingTimings::default()
        };
        assert!((timings.removal_ratio() - 0.75).abs() < f64::EPSILON);
        assert!(ProcessingTimings::new().removal_ratio().abs() < f64::EPSILON);
    }
}
