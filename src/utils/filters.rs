//! Mask filters: elliptical dilation and fixed-size Gaussian smoothing
//!
//! Kernel sizes are explicit rather than derived from sigma, so a radius
//! chosen by the caller maps to the same footprint on every image.

use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, Mask};
use std::collections::VecDeque;

/// Smallest structuring element used for border dilation
pub const MIN_ELEMENT_SIZE: u32 = 3;

/// Largest element side an imageproc [`Mask`] can hold
pub const MAX_MASK_SIZE: u32 = 511;

/// Build an elliptical structuring element of `size x size` pixels
///
/// Row `i` covers `c ± round(c * sqrt(1 - dy²/r²))` where `dy = i - r`,
/// `r = c = size / 2`. Members are 255, everything else 0.
#[must_use]
pub fn ellipse_element(size: u32) -> GrayImage {
    let size = size.max(1);
    let r = i64::from(size / 2);

    let mut element = GrayImage::new(size, size);
    for i in 0..i64::from(size) {
        if let Some((lo, hi)) = ellipse_row_span(size, i - r) {
            for j in (r + lo)..=(r + hi) {
                element.put_pixel(j as u32, i as u32, Luma([255]));
            }
        }
    }
    element
}

/// Column offsets `(lo, hi)` covered by row `dy` of the element, relative
/// to the anchor at `size / 2`
///
/// `None` when `dy` falls outside the element.
fn ellipse_row_span(size: u32, dy: i64) -> Option<(i64, i64)> {
    let size = i64::from(size.max(1));
    let r = size / 2;
    let c = r;
    if dy < -r || dy > size - 1 - r {
        return None;
    }
    let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };
    let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i64;
    let j1 = (c - dx).max(0);
    let j2 = (c + dx + 1).min(size);
    Some((j1 - c, j2 - 1 - c))
}

/// Grayscale dilation of `mask` with an elliptical element of `size`
///
/// `size` is floored at [`MIN_ELEMENT_SIZE`]. Elements that fit an
/// imageproc [`Mask`] (at most [`MAX_MASK_SIZE`] per side) go through
/// [`grayscale_dilate`]; larger ones use a per-row running maximum with the
/// same footprint.
#[must_use]
pub fn dilate(mask: &GrayImage, size: u32) -> GrayImage {
    let size = size.max(MIN_ELEMENT_SIZE);
    if size > MAX_MASK_SIZE {
        return dilate_row_spans(mask, size);
    }
    let element = ellipse_element(size);
    let anchor = (size / 2) as u8;
    let structuring = Mask::from_image(&element, anchor, anchor);
    grayscale_dilate(mask, &structuring)
}

/// Dilation as the maximum over element rows of a horizontal running max
///
/// Only element rows whose offset stays inside the image are visited, so the
/// cost is bounded by the image, not by `size`.
fn dilate_row_spans(mask: &GrayImage, size: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let (w, h) = (width as usize, height as usize);
    let src = mask.as_raw();
    let dst: &mut [u8] = &mut out;
    let mut window = VecDeque::with_capacity(w);
    let reach = i64::from(height) - 1;

    for dy in -reach..=reach {
        let Some((lo, hi)) = ellipse_row_span(size, dy) else {
            continue;
        };
        for oy in 0..h {
            let iy = oy as i64 + dy;
            if iy < 0 || iy >= h as i64 {
                continue;
            }
            let iy = iy as usize;
            span_max_into(
                &src[iy * w..(iy + 1) * w],
                lo,
                hi,
                &mut dst[oy * w..(oy + 1) * w],
                &mut window,
            );
        }
    }
    out
}

/// `out[x] = max(out[x], row[x + lo ..= x + hi])`, window clipped to the row
fn span_max_into(row: &[u8], lo: i64, hi: i64, out: &mut [u8], window: &mut VecDeque<usize>) {
    let n = row.len() as i64;
    window.clear();
    let mut next = 0i64;

    for (x, value) in out.iter_mut().enumerate() {
        let x = x as i64;
        let end = (x + hi).min(n - 1);
        while next <= end {
            let v = row[next as usize];
            while window.back().is_some_and(|&b| row[b] <= v) {
                window.pop_back();
            }
            window.push_back(next as usize);
            next += 1;
        }

        let start = (x + lo).max(0);
        while window.front().is_some_and(|&f| (f as i64) < start) {
            window.pop_front();
        }
        if let Some(&f) = window.front() {
            *value = (*value).max(row[f]);
        }
    }
}

/// Sigma implied by a kernel size when none is given
#[must_use]
pub fn default_sigma(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Odd kernel size at or above `size`
#[must_use]
pub fn odd_kernel_size(size: u32) -> u32 {
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Normalised 1-D Gaussian weights
///
/// A non-positive `sigma` falls back to [`default_sigma`].
#[must_use]
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let size = odd_kernel_size(size.max(1));
    let sigma = if sigma > 0.0 { sigma } else { default_sigma(size) };
    let half = (size / 2) as f32;
    let denom = 2.0 * sigma * sigma;

    let mut weights: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - half;
            (-(x * x) / denom).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Separable Gaussian blur with an explicit kernel size
///
/// Edges are mirrored without repeating the border pixel. Output is
/// rounded to the nearest level.
#[must_use]
pub fn gaussian_blur(mask: &GrayImage, size: u32, sigma: f32) -> GrayImage {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask.clone();
    }

    let kernel = gaussian_kernel(size, sigma);
    let half = (kernel.len() / 2) as i64;
    let (w, h) = (width as usize, height as usize);
    let src: Vec<f32> = mask.as_raw().iter().map(|&v| f32::from(v)).collect();

    let mut horizontal = vec![0.0f32; w * h];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i64 + k as i64 - half, w);
                acc += row[sx] * weight;
            }
            horizontal[y * w + x] = acc;
        }
    }

    let mut out = GrayImage::new(width, height);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let (x, y) = (x as usize, y as usize);
        let mut acc = 0.0;
        for (k, weight) in kernel.iter().enumerate() {
            let sy = reflect_101(y as i64 + k as i64 - half, h);
            acc += horizontal[sy * w + x] * weight;
        }
        *pixel = Luma([acc.round().clamp(0.0, 255.0) as u8]);
    }
    out
}

/// Mirror an out-of-range index back into `0..len` (`gfedcb|abcdefgh|gfedcba`)
fn reflect_101(mut i: i64, len: usize) -> usize {
    let n = len as i64;
    if n == 1 {
        return 0;
    }
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(element: &GrayImage) -> usize {
        element.pixels().filter(|p| p[0] == 255).count()
    }

    #[test]
    fn test_ellipse_element_3x3_is_cross() {
        let element = ellipse_element(3);
        let expected = [[0, 255, 0], [255, 255, 255], [0, 255, 0]];
        for (y, row) in expected.iter().enumerate() {
            for (x, value) in row.iter().enumerate() {
                assert_eq!(element.get_pixel(x as u32, y as u32)[0], *value, "({x},{y})");
            }
        }
    }

    #[test]
    fn test_ellipse_element_is_symmetric() {
        let element = ellipse_element(11);
        for y in 0..11 {
            for x in 0..11 {
                assert_eq!(
                    element.get_pixel(x, y)[0],
                    element.get_pixel(10 - x, 10 - y)[0]
                );
            }
        }
        // Full middle row, single pixel at the poles
        assert!((0..11).all(|x| element.get_pixel(x, 5)[0] == 255));
        assert_eq!((0..11).filter(|&x| element.get_pixel(x, 0)[0] == 255).count(), 1);
        assert!(members(&element) < 121);
    }

    #[test]
    fn test_dilate_grows_single_pixel_by_radius() {
        let mut mask = GrayImage::new(21, 21);
        mask.put_pixel(10, 10, Luma([255]));

        let grown = dilate(&mask, 7);
        assert_eq!(grown.get_pixel(13, 10)[0], 255);
        assert_eq!(grown.get_pixel(10, 7)[0], 255);
        assert_eq!(grown.get_pixel(14, 10)[0], 0);
        assert_eq!(grown.get_pixel(10, 6)[0], 0);
    }

    #[test]
    fn test_dilate_floors_element_size() {
        let mut mask = GrayImage::new(5, 5);
        mask.put_pixel(2, 2, Luma([200]));

        let grown = dilate(&mask, 0);
        assert_eq!(grown.get_pixel(1, 2)[0], 200);
        assert_eq!(grown.get_pixel(2, 3)[0], 200);
        assert_eq!(grown.get_pixel(1, 1)[0], 0);
    }

    fn speckled_mask(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x * 7 + y * 13) % 23 == 0 {
                Luma([((x * 31 + y * 17) % 256) as u8])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_row_span_dilation_matches_mask_dilation() {
        let mask = speckled_mask(37, 29);
        for size in [3, 4, 9, 12, 25] {
            let element = ellipse_element(size);
            let anchor = (size / 2) as u8;
            let expected = grayscale_dilate(&mask, &Mask::from_image(&element, anchor, anchor));
            assert_eq!(dilate_row_spans(&mask, size), expected, "size {size}");
        }
    }

    #[test]
    fn test_dilate_accepts_elements_beyond_mask_limit() {
        let mut mask = GrayImage::new(701, 41);
        mask.put_pixel(350, 20, Luma([255]));

        let grown = dilate(&mask, 600);
        // Even element: the footprint reaches 299 left and 300 right
        assert_eq!(grown.get_pixel(51, 20)[0], 255);
        assert_eq!(grown.get_pixel(50, 20)[0], 0);
        assert_eq!(grown.get_pixel(650, 20)[0], 255);
        assert_eq!(grown.get_pixel(651, 20)[0], 0);
        // Every row is within reach of the ellipse
        assert_eq!(grown.get_pixel(350, 0)[0], 255);
        assert_eq!(grown.get_pixel(350, 40)[0], 255);

        let huge = dilate(&mask, u32::MAX);
        assert!(huge.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_ellipse_row_span_outside_element() {
        assert_eq!(ellipse_row_span(3, 0), Some((-1, 1)));
        assert_eq!(ellipse_row_span(3, -1), Some((0, 0)));
        assert_eq!(ellipse_row_span(3, 2), None);
        // Even sizes stop one row short below the anchor
        assert_eq!(ellipse_row_span(4, 2), None);
        assert!(ellipse_row_span(4, -2).is_some());
    }

    #[test]
    fn test_gaussian_kernel_normalised_and_symmetric() {
        let kernel = gaussian_kernel(17, 4.0);
        assert_eq!(kernel.len(), 17);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!((kernel[0] - kernel[16]).abs() < 1e-7);
        assert!(kernel[8] > kernel[7]);
    }

    #[test]
    fn test_gaussian_kernel_even_size_rounded_up() {
        assert_eq!(gaussian_kernel(8, 2.0).len(), 9);
        assert_eq!(odd_kernel_size(8), 9);
        assert_eq!(odd_kernel_size(9), 9);
    }

    #[test]
    fn test_default_sigma_for_51() {
        assert!((default_sigma(51) - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_gaussian_blur_preserves_uniform_image() {
        let mask = GrayImage::from_pixel(12, 9, Luma([255]));
        let blurred = gaussian_blur(&mask, 17, 4.0);
        assert!(blurred.pixels().all(|p| p[0] == 255));

        let empty = GrayImage::new(12, 9);
        assert!(gaussian_blur(&empty, 5, 1.0).pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_gaussian_blur_softens_step_edge() {
        let mut mask = GrayImage::new(20, 1);
        for x in 10..20 {
            mask.put_pixel(x, 0, Luma([255]));
        }
        let blurred = gaussian_blur(&mask, 7, 2.0);
        let left = blurred.get_pixel(9, 0)[0];
        let right = blurred.get_pixel(10, 0)[0];
        assert!(left > 0 && left < 255);
        assert!(right > 0 && right < 255);
        assert!(right > left);
        assert_eq!(blurred.get_pixel(0, 0)[0], 0);
        assert_eq!(blurred.get_pixel(19, 0)[0], 255);
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 1), 0);
        assert_eq!(reflect_101(-7, 3), 1);
    }
}
