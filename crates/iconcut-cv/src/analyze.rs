//! Screenshot statistics and detection parameter suggestions.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Basic luminance statistics plus a resolution-based suggested area band
/// for [`DetectConfig`](crate::detect::DetectConfig).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub width: u32,
    pub height: u32,
    /// Mean luminance.
    pub brightness: f64,
    /// Luminance standard deviation.
    pub contrast: f64,
    pub suggested_min_area: f64,
    pub suggested_max_area: f64,
}

/// Analyze a screenshot to suggest detection parameters.
pub fn analyze(screenshot: &DynamicImage) -> ImageAnalysis {
    let gray = screenshot.to_luma8();
    let (width, height) = gray.dimensions();
    let n = (width as u64 * height as u64).max(1) as f64;

    let sum: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    let brightness = sum as f64 / n;
    let variance = gray
        .pixels()
        .map(|p| {
            let d = p[0] as f64 - brightness;
            d * d
        })
        .sum::<f64>()
        / n;

    let pixels = width as u64 * height as u64;
    let (suggested_min_area, suggested_max_area) = if pixels > 2_000_000 {
        (1500.0, 60000.0)
    } else if pixels > 1_000_000 {
        (1000.0, 40000.0)
    } else {
        (500.0, 20000.0)
    };

    ImageAnalysis {
        width,
        height,
        brightness,
        contrast: variance.sqrt(),
        suggested_min_area,
        suggested_max_area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_uniform_image_statistics() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 100, Luma([80])));
        let a = analyze(&img);
        assert_eq!(a.brightness, 80.0);
        assert_eq!(a.contrast, 0.0);
        assert_eq!(a.suggested_min_area, 500.0);
    }

    #[test]
    fn test_area_suggestions_follow_resolution() {
        let medium = DynamicImage::new_luma8(1200, 1000);
        assert_eq!(analyze(&medium).suggested_min_area, 1000.0);
        let high = DynamicImage::new_luma8(2000, 1200);
        assert_eq!(analyze(&high).suggested_min_area, 1500.0);
    }
}
