//! Background color detection and removal.
//!
//! Colors are grouped by per-channel tolerance, the dominant group is
//! taken as the background family, and every pixel near that family's
//! representative is made fully transparent.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Tunables for background removal.
///
/// There is deliberately no `Default`: the tolerance differs between
/// analysis and production removal, and every call site must say which
/// one it means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalConfig {
    /// Per-channel absolute RGB difference treated as "the same color".
    pub tolerance: u8,
    /// Pixels with alpha strictly below this are fully zeroed afterwards.
    pub low_alpha_threshold: u8,
}

impl RemovalConfig {
    /// Tolerance used when inspecting color families without removing.
    pub fn analysis() -> Self {
        Self {
            tolerance: 25,
            low_alpha_threshold: 50,
        }
    }

    /// Tolerance used for production background removal.
    pub fn removal() -> Self {
        Self {
            tolerance: 60,
            low_alpha_threshold: 50,
        }
    }

    pub fn with_tolerance(tolerance: u8) -> Self {
        Self {
            tolerance,
            low_alpha_threshold: 50,
        }
    }
}

/// A family of similar colors: its representative, how many pixels the
/// whole family covers, and how many distinct colors it absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorGroup {
    pub representative: [u8; 4],
    pub total_count: u64,
    pub variant_count: usize,
}

/// What a removal pass did, for observability and batch reports.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RemovalReport {
    /// Pixels matched by the tolerance mask against the background color.
    pub pixels_removed: u64,
    /// Pixels still carrying alpha after the low-alpha cleanup.
    pub pixels_remaining: u64,
}

/// Exact vs tolerance matching statistics for tuning the tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalComparison {
    pub background: [u8; 3],
    pub exact_matches: u64,
    pub tolerance_matches: u64,
}

/// Greedily cluster the icon's distinct colors by tolerance.
///
/// Repeatedly takes the most frequent unclustered color as a new group
/// representative and absorbs every remaining color within `tolerance`
/// on all three RGB channels. The absorption scan is a plain nested loop
/// with removal, O(U^2) over U unique colors; icon rasters are small
/// enough that this does not matter, but it will degrade quadratically
/// if mask resolution ever grows.
///
/// Every pixel ends up in exactly one group; the result is sorted
/// descending by total pixel count. Equal counts are ordered by ascending
/// RGBA bytes so the representative choice is deterministic.
pub fn cluster_colors(icon: &RgbaImage, tolerance: u8) -> Vec<ColorGroup> {
    let mut counts: HashMap<[u8; 4], u64> = HashMap::new();
    for pixel in icon.pixels() {
        *counts.entry(pixel.0).or_insert(0) += 1;
    }

    let mut remaining: Vec<([u8; 4], u64)> = counts.into_iter().collect();
    remaining.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    debug!(unique_colors = remaining.len(), "clustering colors");

    let mut groups = Vec::new();
    while !remaining.is_empty() {
        let (representative, rep_count) = remaining.remove(0);
        let mut total_count = rep_count;
        let mut variant_count = 1;

        let mut i = 0;
        while i < remaining.len() {
            let (color, count) = remaining[i];
            if within_tolerance(&color, &representative, tolerance) {
                total_count += count;
                variant_count += 1;
                remaining.remove(i);
            } else {
                i += 1;
            }
        }

        groups.push(ColorGroup {
            representative,
            total_count,
            variant_count,
        });
    }

    // Absorption can reorder totals relative to the representatives'
    // individual counts.
    groups.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then(a.representative.cmp(&b.representative))
    });
    groups
}

fn within_tolerance(color: &[u8; 4], reference: &[u8; 4], tolerance: u8) -> bool {
    (0..3).all(|c| (color[c] as i16 - reference[c] as i16).unsigned_abs() <= tolerance as u16)
}

/// Detect the dominant background color family and make it transparent.
///
/// The tolerance mask is recomputed over the entire image against the top
/// group's representative RGB, not just over the clustered colors, so
/// every near-background pixel goes regardless of which group absorbed
/// it. Matching pixels and any pixel left with alpha below
/// `low_alpha_threshold` are zeroed entirely.
pub fn remove_background(icon: &mut RgbaImage, config: &RemovalConfig) -> RemovalReport {
    let groups = cluster_colors(icon, config.tolerance);
    let Some(top) = groups.first() else {
        return RemovalReport::default();
    };
    let background = top.representative;

    let mut pixels_removed = 0u64;
    for pixel in icon.pixels_mut() {
        if within_tolerance(&pixel.0, &background, config.tolerance) {
            pixel.0 = [0, 0, 0, 0];
            pixels_removed += 1;
        }
    }

    for pixel in icon.pixels_mut() {
        if pixel[3] < config.low_alpha_threshold {
            pixel.0 = [0, 0, 0, 0];
        }
    }

    let pixels_remaining = icon.pixels().filter(|p| p[3] > 0).count() as u64;
    debug!(
        background = ?&background[..3],
        tolerance = config.tolerance,
        pixels_removed,
        pixels_remaining,
        "background removal"
    );

    RemovalReport {
        pixels_removed,
        pixels_remaining,
    }
}

/// Report how many pixels exact matching vs tolerance matching against
/// the most common color would remove, without modifying the raster.
///
/// Call with [`RemovalConfig::analysis`] when tuning; only the tolerance
/// field is consulted.
pub fn exact_vs_tolerance(icon: &RgbaImage, config: &RemovalConfig) -> RemovalComparison {
    let groups = cluster_colors(icon, 0);
    let background = groups.first().map(|g| g.representative).unwrap_or_default();

    let mut exact_matches = 0u64;
    let mut tolerance_matches = 0u64;
    for pixel in icon.pixels() {
        if pixel.0[..3] == background[..3] {
            exact_matches += 1;
        }
        if within_tolerance(&pixel.0, &background, config.tolerance) {
            tolerance_matches += 1;
        }
    }

    RemovalComparison {
        background: [background[0], background[1], background[2]],
        exact_matches,
        tolerance_matches,
    }
}
