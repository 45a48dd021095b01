//! Binarization chain that turns a screenshot into a contour-friendly
//! foreground image: blur, inverted locally-adaptive threshold, speckle
//! cleanup with one morphological close and one open.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, open};

use super::DetectConfig;

/// Run the full preprocessing chain on a luminance image.
///
/// Output is a binary image where icon edges are foreground (255).
pub fn binarize(gray: &GrayImage, config: &DetectConfig) -> GrayImage {
    let blurred = gaussian_blur_f32(gray, config.blur_sigma);
    let thresh = adaptive_threshold_inv(&blurred, config.block_size, config.threshold_offset);
    // 3x3 square structuring element: close fills small gaps, open drops
    // isolated speckle.
    let closed = close(&thresh, Norm::LInf, 1);
    open(&closed, Norm::LInf, 1)
}

/// Inverted mean-adaptive threshold.
///
/// A pixel becomes foreground (255) when it is at most `offset` below the
/// mean of its `block_size` x `block_size` neighborhood, clamped at the
/// image borders. `imageproc`'s own `adaptive_threshold` supports neither
/// the constant offset nor the inversion, so the comparison runs over a
/// hand-built integral image.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }

    // Summed-area table with a zero row/column of padding.
    let stride = (w + 1) as usize;
    let mut integral = vec![0u64; stride * (h + 1) as usize];
    for y in 0..h as usize {
        let mut row_sum = 0u64;
        for x in 0..w as usize {
            row_sum += gray.as_raw()[y * w as usize + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    let radius = (block_size / 2) as i64;
    let mut out = GrayImage::new(w, h);
    for y in 0..h as i64 {
        let y0 = (y - radius).max(0) as usize;
        let y1 = ((y + radius + 1).min(h as i64)) as usize;
        for x in 0..w as i64 {
            let x0 = (x - radius).max(0) as usize;
            let x1 = ((x + radius + 1).min(w as i64)) as usize;

            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y1 * stride + x0]
                - integral[y0 * stride + x1];
            let count = ((y1 - y0) * (x1 - x0)) as u64;
            let mean = (sum / count) as i64;

            let p = gray.get_pixel(x as u32, y as u32)[0] as i64;
            let v: u8 = if p <= mean - offset as i64 { 255 } else { 0 };
            out.put_pixel(x as u32, y as u32, image::Luma([v]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_image_has_no_foreground() {
        let gray = GrayImage::from_pixel(40, 40, image::Luma([128]));
        let out = adaptive_threshold_inv(&gray, 11, 2);
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_dark_region_on_light_field_becomes_foreground() {
        let mut gray = GrayImage::from_pixel(40, 40, image::Luma([220]));
        for y in 15..25 {
            for x in 15..25 {
                gray.put_pixel(x, y, image::Luma([10]));
            }
        }
        let out = adaptive_threshold_inv(&gray, 11, 2);
        // Dark pixels near the boundary sit well below the mixed local mean.
        assert_eq!(out.get_pixel(15, 20)[0], 255);
        // Far away from the square nothing fires.
        assert_eq!(out.get_pixel(2, 2)[0], 0);
    }
}
