//! Sticker border synthesis
//!
//! The border is a solid-color layer whose coverage is the subject's alpha
//! grown outward by an elliptical dilation and then softened by two Gaussian
//! passes. The subject is composited over it, so the border only shows in the
//! transparent surround and the soft fringe at the silhouette.

use crate::types::Color;
use crate::utils::alpha::{alpha_channel, composite_over};
use crate::utils::filters::{dilate, gaussian_blur};
use image::{GrayImage, Rgba, RgbaImage};
use tracing::{debug, instrument};

/// Border coverage mask derived from an alpha channel
///
/// Steps: dilate with an ellipse of `max(3, thickness)`, then (if
/// `blur_radius > 0`) blur with a `2r+1` kernel at sigma `r/2` followed by an
/// `r+1` kernel at sigma `r/4`.
#[must_use]
pub fn border_mask(alpha: &GrayImage, thickness: u32, blur_radius: u32) -> GrayImage {
    let mut mask = dilate(alpha, thickness);

    if blur_radius > 0 {
        let r = blur_radius as f32;
        mask = gaussian_blur(&mask, 2 * blur_radius + 1, r / 2.0);
        mask = gaussian_blur(&mask, blur_radius + 1, r / 4.0);
    }

    mask
}

/// Composite a smooth, solid-color border behind the subject
///
/// Only the RGB part of `color` is painted; the border's opacity comes from
/// the smoothed mask.
#[instrument(level = "debug", skip(image), fields(width = image.width(), height = image.height()))]
#[must_use]
pub fn add_border(image: &RgbaImage, thickness: u32, color: Color, blur_radius: u32) -> RgbaImage {
    let alpha = alpha_channel(image);
    let mask = border_mask(&alpha, thickness, blur_radius);

    let mut layer = RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        Rgba([color.r, color.g, color.b, mask.get_pixel(x, y)[0]])
    });
    composite_over(&mut layer, image);

    debug!("Border composited behind subject");
    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    /// 40x40 transparent canvas with an opaque red square at [15, 25)
    fn square_subject() -> RgbaImage {
        RgbaImage::from_fn(40, 40, |x, y| {
            if (15..25).contains(&x) && (15..25).contains(&y) {
                RED
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    #[test]
    fn test_sharp_border_expands_by_half_thickness() {
        let subject = square_subject();
        let bordered = add_border(&subject, 10, Color::rgb(0, 0, 255), 0);

        // Subject untouched
        assert_eq!(*bordered.get_pixel(20, 20), RED);
        assert_eq!(*bordered.get_pixel(15, 15), RED);

        // Ring of roughly 5px on each side (an even element is off-centre by one)
        for (x, y) in [(11, 20), (28, 20), (20, 11), (20, 28)] {
            assert_eq!(*bordered.get_pixel(x, y), Rgba([0, 0, 255, 255]), "({x},{y})");
        }
        for (x, y) in [(8, 20), (31, 20), (20, 8), (20, 31)] {
            assert_eq!(bordered.get_pixel(x, y)[3], 0, "({x},{y})");
        }

        // No partial coverage anywhere
        assert!(bordered.pixels().all(|p| p[3] == 0 || p[3] == 255));
    }

    #[test]
    fn test_zero_thickness_still_grows_one_pixel() {
        let subject = square_subject();
        let bordered = add_border(&subject, 0, Color::WHITE, 0);
        assert_eq!(*bordered.get_pixel(14, 20), Rgba([255, 255, 255, 255]));
        assert_eq!(bordered.get_pixel(13, 20)[3], 0);
        // 3x3 cross: diagonal corner not reached
        assert_eq!(bordered.get_pixel(14, 14)[3], 0);
    }

    #[test]
    fn test_blurred_border_has_soft_edge() {
        let subject = square_subject();
        let bordered = add_border(&subject, 10, Color::rgb(0, 0, 255), 4);

        assert_eq!(*bordered.get_pixel(20, 20), RED);
        let fringe: Vec<u8> = (4..15).map(|x| bordered.get_pixel(x, 20)[3]).collect();
        assert!(fringe.iter().any(|&a| a > 0 && a < 255));
        // Coverage never decreases moving towards the subject
        assert!(fringe.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_border_color_rgb_only() {
        let subject = square_subject();
        let bordered = add_border(&subject, 6, Color::rgba(0, 255, 0, 10), 0);
        // Alpha from the mask, not from the color
        assert_eq!(*bordered.get_pixel(13, 20), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_fully_transparent_image_stays_transparent() {
        let empty = RgbaImage::new(16, 16);
        let bordered = add_border(&empty, 15, Color::WHITE, 8);
        assert!(bordered.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_opaque_image_unchanged() {
        let opaque = RgbaImage::from_pixel(8, 8, Rgba([12, 34, 56, 255]));
        let bordered = add_border(&opaque, 15, Color::WHITE, 8);
        assert_eq!(bordered, opaque);
    }

    #[test]
    fn test_thick_border_beyond_mask_limit() {
        // Small square in a wide strip keeps the row-span path quick
        let subject = RgbaImage::from_fn(720, 12, |x, y| {
            if (355..365).contains(&x) && (3..9).contains(&y) {
                RED
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let bordered = add_border(&subject, 600, Color::rgb(0, 0, 255), 0);

        assert_eq!(*bordered.get_pixel(360, 6), RED);
        // About 300px of border on either side of the square
        for x in [60, 200, 354, 365, 500, 664] {
            assert_eq!(*bordered.get_pixel(x, 6), Rgba([0, 0, 255, 255]), "x={x}");
        }
        assert_eq!(bordered.get_pixel(50, 6)[3], 0);
        assert_eq!(bordered.get_pixel(670, 6)[3], 0);
    }

    #[test]
    fn test_border_mask_bounded_by_alpha_domain() {
        let alpha = alpha_channel(&square_subject());
        let mask = border_mask(&alpha, 20, 8);
        assert_eq!(mask.dimensions(), alpha.dimensions());
        // Never less than the source alpha in the fully covered core
        assert_eq!(mask.get_pixel(20, 20)[0], 255);
    }
}
