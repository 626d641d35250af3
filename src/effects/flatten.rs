//! Flatten the sticker onto an opaque background and encode as PNG

use crate::error::{Result, StickerError};
use crate::types::Color;
use crate::utils::alpha::blend_channel;
use image::{ImageFormat, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;

/// Paste `image` onto a canvas of `background`, using its alpha as the mask
///
/// Only the RGB part of `background` is used; the result is fully opaque.
#[must_use]
pub fn flatten_to_rgb(image: &RgbaImage, background: Color) -> RgbImage {
    let (width, height) = image.dimensions();
    let bg = background.to_rgb();

    RgbImage::from_fn(width, height, |x, y| {
        let fg = image.get_pixel(x, y);
        let a = fg[3];
        Rgb([
            blend_channel(bg[0], fg[0], a),
            blend_channel(bg[1], fg[1], a),
            blend_channel(bg[2], fg[2], a),
        ])
    })
}

/// Flatten and encode as PNG bytes
///
/// # Errors
/// - PNG encoder failure
pub fn flatten(image: &RgbaImage, background: Color) -> Result<Vec<u8>> {
    let canvas = flatten_to_rgb(image, background);
    encode_png(&canvas)
}

/// Encode an opaque RGB image as PNG
///
/// # Errors
/// - PNG encoder failure
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| StickerError::encode(format!("Failed to encode PNG: {}", e)))?;
    Ok(buffer.into_inner())
}
