//! Overlap resolution and geometric standardization of detected boxes.

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bbox::BBox;

/// One of the two canonical icon dimensions, assigned by relative area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Large,
}

impl SizeClass {
    /// Canonical side length for this class.
    pub fn side(self, config: &StandardizeConfig) -> u32 {
        match self {
            SizeClass::Small => config.small_side,
            SizeClass::Large => config.large_side,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Large => "large",
        }
    }
}

/// Tunables for [`BoxStandardizer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardizeConfig {
    /// A later box is dropped when its intersection with an already-kept
    /// box exceeds this fraction of the smaller box's area.
    pub overlap_fraction: f64,
    /// Canonical side of [`SizeClass::Small`] squares.
    pub small_side: u32,
    /// Canonical side of [`SizeClass::Large`] squares.
    pub large_side: u32,
}

impl Default for StandardizeConfig {
    fn default() -> Self {
        Self {
            overlap_fraction: 0.5,
            small_side: 86,
            large_side: 157,
        }
    }
}

/// Deduplicates overlapping detections and snaps each survivor to a fixed
/// square centered on the original detection.
pub struct BoxStandardizer {
    config: StandardizeConfig,
}

impl BoxStandardizer {
    pub fn new(config: StandardizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StandardizeConfig {
        &self.config
    }

    /// First-seen-wins overlap resolution.
    ///
    /// Earlier boxes always survive over later overlapping ones regardless
    /// of size, so the result depends on the input order. Contour discovery
    /// order is not spatially meaningful; callers must preserve the
    /// detector's emission order for reproducible output.
    pub fn resolve_overlaps(&self, boxes: &[BBox]) -> Vec<BBox> {
        let mut kept: Vec<BBox> = Vec::new();
        for bbox in boxes {
            let overlapping = kept
                .iter()
                .any(|k| bbox.overlaps_smaller_by(k, self.config.overlap_fraction));
            if !overlapping {
                kept.push(*bbox);
            }
        }
        debug!(input = boxes.len(), kept = kept.len(), "overlap resolution");
        kept
    }

    /// Resolve overlaps, classify by size, and place canonical squares.
    ///
    /// Each output square is centered on its original detection and clamped
    /// independently per axis to stay inside the `img_w` x `img_h` image,
    /// which can shift it off-center near edges. Boxes whose canonical
    /// square cannot fit in the image at all are skipped with a warning.
    pub fn standardize(&self, boxes: &[BBox], img_w: u32, img_h: u32) -> Vec<(BBox, SizeClass)> {
        let kept = self.resolve_overlaps(boxes);
        if kept.is_empty() {
            return Vec::new();
        }

        let median = median_area(&kept);
        let mut out = Vec::with_capacity(kept.len());
        for bbox in &kept {
            let class = if bbox.area() as f64 <= median {
                SizeClass::Small
            } else {
                SizeClass::Large
            };
            let side = class.side(&self.config);
            if img_w < side || img_h < side {
                warn!(
                    ?class,
                    side, img_w, img_h, "image too small for canonical square, skipping box"
                );
                continue;
            }

            let (cx, cy) = bbox.center();
            let x = (cx.saturating_sub(side / 2)).min(img_w - side);
            let y = (cy.saturating_sub(side / 2)).min(img_h - side);
            out.push((BBox::new(x, y, side, side), class));
        }
        out
    }
}

/// Median of the box areas; for an even count, the mean of the middle two.
fn median_area(boxes: &[BBox]) -> f64 {
    let mut areas: Vec<u64> = boxes.iter().map(|b| b.area()).collect();
    areas.sort_unstable();
    let n = areas.len();
    if n % 2 == 1 {
        areas[n / 2] as f64
    } else {
        (areas[n / 2 - 1] + areas[n / 2]) as f64 / 2.0
    }
}

/// Crop each standardized region from the screenshot at full resolution.
///
/// Output order and the sequential index follow the survivor order from
/// overlap resolution.
pub fn crop_regions(
    screenshot: &DynamicImage,
    boxes: &[(BBox, SizeClass)],
) -> Vec<(RgbaImage, SizeClass, usize)> {
    boxes
        .iter()
        .enumerate()
        .map(|(i, (bbox, class))| {
            let crop = screenshot
                .crop_imm(bbox.x, bbox.y, bbox.width, bbox.height)
                .to_rgba8();
            (crop, *class, i)
        })
        .collect()
}
