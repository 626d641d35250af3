//! Gloss highlight
//!
//! Brightens the upper band of the subject: everything above the row 20% of
//! the way down its vertical extent is marked, the mark is blurred into a
//! soft band, and the band is added to RGB. This is a brightness lift, not a
//! specular model.

use crate::utils::alpha::{alpha_channel, opaque_bounds, to_level};
use crate::utils::filters::gaussian_blur;
use image::{GrayImage, Luma, RgbaImage};
use tracing::{debug, instrument};

/// Kernel size of the highlight blur
pub const GLOSS_KERNEL_SIZE: u32 = 51;

/// Fraction of the subject height covered by the highlight band
pub const GLOSS_BAND_FRACTION: f32 = 0.2;

/// Soft highlight mask for `alpha`, or `None` if nothing is opaque
///
/// Rows strictly above `min_y + trunc(0.2 * (max_y - min_y))` with non-zero
/// alpha are set, then blurred with a 51x51 Gaussian (sigma from the size).
#[must_use]
pub fn highlight_mask(alpha: &GrayImage) -> Option<GrayImage> {
    let (min_y, max_y) = opaque_bounds(alpha)?;
    let boundary = min_y + (GLOSS_BAND_FRACTION * (max_y - min_y) as f32) as u32;

    let band = GrayImage::from_fn(alpha.width(), alpha.height(), |x, y| {
        if y < boundary && alpha.get_pixel(x, y)[0] > 0 {
            Luma([255])
        } else {
            Luma([0])
        }
    });

    Some(gaussian_blur(&band, GLOSS_KERNEL_SIZE, 0.0))
}

/// Add a soft highlight to the top of the subject
///
/// `new_rgb = rgb + highlight * intensity`, rounded and saturated; alpha is
/// left alone. Zero intensity or a fully transparent image returns a copy.
#[instrument(level = "debug", skip(image), fields(width = image.width(), height = image.height()))]
#[must_use]
pub fn apply_gloss(image: &RgbaImage, intensity: f32) -> RgbaImage {
    if intensity == 0.0 {
        return image.clone();
    }

    let alpha = alpha_channel(image);
    let Some(highlight) = highlight_mask(&alpha) else {
        debug!("No opaque pixels, gloss skipped");
        return image.clone();
    };

    let mut out = image.clone();
    for (pixel, h) in out.pixels_mut().zip(highlight.pixels()) {
        let lift = f32::from(h[0]) * intensity;
        for c in 0..3 {
            pixel[c] = to_level(f32::from(pixel[c]) + lift);
        }
    }
    out
}
