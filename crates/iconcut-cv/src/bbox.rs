//! Bounding box operations
//!
//! Core abstraction for representing and filtering detection results.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in screenshot pixel coordinates.
///
/// Always satisfies `x + width <= image_width` and `y + height <= image_height`
/// of the image it was clamped against at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BBox {
    /// Create a new bounding box without bounds checking.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a bounding box clamped to lie fully inside a `img_w` x `img_h`
    /// image. Width and height shrink as needed; a box entirely outside the
    /// image collapses to zero size.
    pub fn clamped(x: u32, y: u32, width: u32, height: u32, img_w: u32, img_h: u32) -> Self {
        let x = x.min(img_w);
        let y = y.min(img_h);
        Self {
            x,
            y,
            width: width.min(img_w - x),
            height: height.min(img_h - y),
        }
    }

    /// Pixel area of the box.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Integer center point, matching `x + w / 2` truncation.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Aspect ratio width / height. Infinite for zero height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Area of the rectangle intersection with `other`; 0 if disjoint.
    pub fn intersection_area(&self, other: &BBox) -> u64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x2 <= x1 || y2 <= y1 {
            return 0;
        }

        (x2 - x1) as u64 * (y2 - y1) as u64
    }

    /// Whether the intersection with `other` exceeds `fraction` of the
    /// smaller box's area.
    pub fn overlaps_smaller_by(&self, other: &BBox, fraction: f64) -> bool {
        let overlap = self.intersection_area(other);
        if overlap == 0 {
            return false;
        }
        let smaller = self.area().min(other.area());
        overlap as f64 > fraction * smaller as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_inside_image() {
        let b = BBox::clamped(90, 90, 50, 50, 100, 100);
        assert_eq!(b, BBox::new(90, 90, 10, 10));
    }

    #[test]
    fn test_intersection_area() {
        let a = BBox::new(0, 0, 100, 100);
        let b = BBox::new(50, 50, 100, 100);
        assert_eq!(a.intersection_area(&b), 2500);
        assert_eq!(b.intersection_area(&a), 2500);

        let far = BBox::new(200, 200, 10, 10);
        assert_eq!(a.intersection_area(&far), 0);
    }

    #[test]
    fn test_overlap_threshold_is_strict() {
        // 25% overlap of two 100x100 boxes is not "more than 50%".
        let a = BBox::new(0, 0, 100, 100);
        let b = BBox::new(50, 50, 100, 100);
        assert!(!a.overlaps_smaller_by(&b, 0.5));

        // Fully contained small box: overlap == 100% of the smaller area.
        let c = BBox::new(10, 10, 20, 20);
        assert!(a.overlaps_smaller_by(&c, 0.5));
    }

    #[test]
    fn test_center_truncates() {
        let b = BBox::new(3, 3, 5, 5);
        assert_eq!(b.center(), (5, 5));
    }
}
