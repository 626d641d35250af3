//! Alpha channel helpers shared by the compositing stages

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

/// Normalise any decoded image to RGBA8
///
/// Images without an alpha channel come back fully opaque.
#[must_use]
pub fn ensure_alpha(image: DynamicImage) -> RgbaImage {
    match image {
        DynamicImage::ImageRgba8(rgba) => rgba,
        other => other.to_rgba8(),
    }
}

/// Copy the alpha channel out as a single-channel mask
#[must_use]
pub fn alpha_channel(image: &RgbaImage) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| Luma([image.get_pixel(x, y)[3]]))
}

/// First and last row holding any pixel with non-zero alpha
#[must_use]
pub fn opaque_bounds(alpha: &GrayImage) -> Option<(u32, u32)> {
    let mut bounds: Option<(u32, u32)> = None;
    for (y, row) in alpha.enumerate_rows() {
        if row.into_iter().any(|(_, _, p)| p[0] > 0) {
            bounds = Some(match bounds {
                Some((min_y, _)) => (min_y, y),
                None => (y, y),
            });
        }
    }
    bounds
}

/// Straight-alpha "over": `src` drawn on top of `dst`
#[must_use]
pub fn over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (f32::from(src[c]) * sa + f32::from(dst[c]) * da * (1.0 - sa)) / out_a;
        out[c] = to_level(value);
    }
    out[3] = to_level(out_a * 255.0);
    Rgba(out)
}

/// Composite `src` over `dst` in place; both must share dimensions
pub fn composite_over(dst: &mut RgbaImage, src: &RgbaImage) {
    debug_assert_eq!(dst.dimensions(), src.dimensions());
    for (d, s) in dst.pixels_mut().zip(src.pixels()) {
        *d = over(*d, *s);
    }
}

/// Linear blend of a channel towards `fg` by `alpha` (0-255)
#[must_use]
pub fn blend_channel(bg: u8, fg: u8, alpha: u8) -> u8 {
    let a = f32::from(alpha) / 255.0;
    to_level(f32::from(bg) * (1.0 - a) + f32::from(fg) * a)
}

pub(crate) fn to_level(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
