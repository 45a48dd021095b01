//! Detection configuration

use serde::{Deserialize, Serialize};

/// Tunables for [`RegionDetector`](super::RegionDetector).
///
/// Everything that shapes a detection decision is a field here so call
/// sites cannot silently diverge on hidden constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Contour area must be strictly greater than this to survive.
    pub min_area: f64,
    /// Contour area must be strictly less than this to survive.
    pub max_area: f64,
    /// Accepted width/height band, exclusive on both ends.
    pub aspect_ratio_band: (f64, f64),
    /// Both sides of the bounding rectangle must strictly exceed this.
    pub min_side: u32,
    /// Side length of the adaptive-threshold neighborhood. Must be odd.
    pub block_size: u32,
    /// Constant subtracted from the local mean before comparison.
    pub threshold_offset: i32,
    /// Sigma of the Gaussian smoothing pass (a 5x5 kernel's worth).
    pub blur_sigma: f32,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            min_area: 1000.0,
            max_area: 50000.0,
            aspect_ratio_band: (0.7, 1.3),
            min_side: 30,
            block_size: 11,
            threshold_offset: 2,
            blur_sigma: 1.1,
        }
    }
}
