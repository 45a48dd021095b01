//! Region detector: finds candidate icon bounding boxes in a screenshot.

use image::DynamicImage;
use imageproc::contours::{find_contours, Contour};
use tracing::{debug, info};

use super::{preprocess, DetectConfig};
use crate::bbox::BBox;

/// Finds square-ish glyph regions via contour analysis.
///
/// Boxes are emitted in contour discovery order, which is not spatially
/// meaningful; downstream overlap resolution depends on this order, so
/// callers must not re-sort the result.
pub struct RegionDetector {
    config: DetectConfig,
}

impl RegionDetector {
    pub fn new(config: DetectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    /// Detect candidate icon regions. An empty result is valid, not an error.
    pub fn detect(&self, screenshot: &DynamicImage) -> Vec<BBox> {
        let gray = screenshot.to_luma8();
        let (img_w, img_h) = gray.dimensions();

        let binary = preprocess::binarize(&gray, &self.config);
        let contours = find_contours::<i32>(&binary);
        debug!(total = contours.len(), "traced contours");

        let mut boxes = Vec::new();
        for contour in &contours {
            // External contours only; nested borders belong to glyph
            // interiors, not icon outlines.
            if contour.parent.is_some() {
                continue;
            }

            let area = contour_area(contour);
            if !(self.config.min_area < area && area < self.config.max_area) {
                continue;
            }

            let bbox = bounding_rect(contour, img_w, img_h);
            let (lo, hi) = self.config.aspect_ratio_band;
            let aspect = bbox.aspect_ratio();
            if aspect > lo
                && aspect < hi
                && bbox.width > self.config.min_side
                && bbox.height > self.config.min_side
            {
                boxes.push(bbox);
            }
        }

        info!(
            candidates = boxes.len(),
            width = img_w,
            height = img_h,
            "region detection complete"
        );
        boxes
    }
}

/// Polygon area of a traced contour via the shoelace formula.
fn contour_area(contour: &Contour<i32>) -> f64 {
    let pts = &contour.points;
    if pts.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        twice_area += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    (twice_area.abs() as f64) / 2.0
}

/// Axis-aligned bounding rectangle of a contour, clamped into the image.
fn bounding_rect(contour: &Contour<i32>, img_w: u32, img_h: u32) -> BBox {
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let x = min_x.max(0) as u32;
    let y = min_y.max(0) as u32;
    BBox::clamped(
        x,
        y,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
        img_w,
        img_h,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn screenshot_with_squares(squares: &[(u32, u32, u32)]) -> DynamicImage {
        let mut gray = GrayImage::from_pixel(400, 400, Luma([230]));
        for &(x0, y0, side) in squares {
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    gray.put_pixel(x, y, Luma([20]));
                }
            }
        }
        DynamicImage::ImageLuma8(gray)
    }

    #[test]
    fn test_detects_icon_sized_squares() {
        let img = screenshot_with_squares(&[(40, 40, 60), (200, 40, 60), (40, 200, 60)]);
        let detector = RegionDetector::new(DetectConfig::default());
        let boxes = detector.detect(&img);
        assert!(!boxes.is_empty());
        for b in &boxes {
            let area = b.area() as f64;
            assert!(1000.0 < area && area < 50000.0, "area {area} out of band");
            let aspect = b.aspect_ratio();
            assert!(0.7 < aspect && aspect < 1.3, "aspect {aspect} out of band");
            assert!(b.width > 30 && b.height > 30);
        }
    }

    #[test]
    fn test_blank_screenshot_yields_empty_result() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 300, Luma([200])));
        let detector = RegionDetector::new(DetectConfig::default());
        assert!(detector.detect(&img).is_empty());
    }

    #[test]
    fn test_small_speckle_is_rejected() {
        // 10x10 squares pass binarization but fail the area and side filters.
        let img = screenshot_with_squares(&[(40, 40, 10), (100, 100, 10)]);
        let detector = RegionDetector::new(DetectConfig::default());
        assert!(detector.detect(&img).is_empty());
    }
}
