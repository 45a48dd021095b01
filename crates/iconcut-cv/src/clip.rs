//! Mask-based shape clipping.
//!
//! Two strategies share one clipping step but trade fidelity for control
//! over the output resolution: `CenteredScale` keeps the icon untouched
//! and shrinks the mask onto it, `CropToMask` cuts the icon down to the
//! mask and normalizes the result to the canonical dimensions.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StageError;
use crate::mask::ReferenceMask;
use crate::standardize::StandardizeConfig;

/// Which clipping variant to run. Selected explicitly by caller
/// configuration, never implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipStrategy {
    /// Scale the mask proportionally (with a margin) and paste it centered
    /// on a transparent icon-sized canvas; the icon is never cropped.
    CenteredScale,
    /// Center-crop the icon to the mask's dimensions, clip, then scale the
    /// result to the canonical output size.
    CropToMask,
}

/// Tunables shared by both strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Mask values strictly above this count as inside the silhouette.
    pub binarize_threshold: u8,
    /// Uniform shrink applied on top of the fit scale in `CenteredScale`.
    pub scale_margin: f64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            binarize_threshold: 127,
            scale_margin: 0.9,
        }
    }
}

/// Clips icon rasters to a reference silhouette.
pub struct ShapeClipper {
    strategy: ClipStrategy,
    config: ClipConfig,
}

impl ShapeClipper {
    pub fn new(strategy: ClipStrategy, config: ClipConfig) -> Self {
        Self { strategy, config }
    }

    pub fn strategy(&self) -> ClipStrategy {
        self.strategy
    }

    /// Clip `icon` to the silhouette of `mask`.
    ///
    /// RGB channels pass through unchanged; only alpha is clipped.
    pub fn clip(
        &self,
        icon: RgbaImage,
        mask: &ReferenceMask,
        sizes: &StandardizeConfig,
    ) -> Result<RgbaImage, StageError> {
        match self.strategy {
            ClipStrategy::CenteredScale => self.clip_centered_scale(icon, mask),
            ClipStrategy::CropToMask => self.clip_crop_to_mask(icon, mask, sizes),
        }
    }

    fn clip_centered_scale(
        &self,
        mut icon: RgbaImage,
        mask: &ReferenceMask,
    ) -> Result<RgbaImage, StageError> {
        let (icon_w, icon_h) = icon.dimensions();
        let (mask_w, mask_h) = mask.dimensions();
        if icon_w == 0 || icon_h == 0 {
            return Err(StageError::Dimension("zero-area icon".into()));
        }

        let scale = (icon_w as f64 / mask_w as f64).min(icon_h as f64 / mask_h as f64)
            * self.config.scale_margin;
        let scaled_w = (mask_w as f64 * scale) as u32;
        let scaled_h = (mask_h as f64 * scale) as u32;
        if scaled_w == 0 || scaled_h == 0 {
            return Err(StageError::Dimension(format!(
                "mask {mask_w}x{mask_h} scales to nothing inside {icon_w}x{icon_h} icon"
            )));
        }

        let scaled = imageops::resize(mask.plane(), scaled_w, scaled_h, FilterType::Nearest);

        // Paste the scaled silhouette centered on a zero canvas the size of
        // the icon; everything outside it clips to transparent.
        let mut canvas = GrayImage::new(icon_w, icon_h);
        let off_x = (icon_w - scaled_w) / 2;
        let off_y = (icon_h - scaled_h) / 2;
        for y in 0..scaled_h {
            for x in 0..scaled_w {
                canvas.put_pixel(off_x + x, off_y + y, *scaled.get_pixel(x, y));
            }
        }
        debug!(scaled_w, scaled_h, icon_w, icon_h, "centered scaled mask");

        apply_mask_alpha(&mut icon, &canvas, self.config.binarize_threshold)?;
        Ok(icon)
    }

    fn clip_crop_to_mask(
        &self,
        icon: RgbaImage,
        mask: &ReferenceMask,
        sizes: &StandardizeConfig,
    ) -> Result<RgbaImage, StageError> {
        let (icon_w, icon_h) = icon.dimensions();
        let (mask_w, mask_h) = mask.dimensions();

        let crop_w = mask_w.min(icon_w);
        let crop_h = mask_h.min(icon_h);
        if crop_w == 0 || crop_h == 0 {
            return Err(StageError::Dimension(format!(
                "zero-area crop of {icon_w}x{icon_h} icon against {mask_w}x{mask_h} mask"
            )));
        }
        let crop_x = (icon_w - crop_w) / 2;
        let crop_y = (icon_h - crop_h) / 2;

        let mut cropped = imageops::crop_imm(&icon, crop_x, crop_y, crop_w, crop_h).to_image();
        if (crop_w, crop_h) != (mask_w, mask_h) {
            cropped = imageops::resize(&cropped, mask_w, mask_h, FilterType::CatmullRom);
        }

        apply_mask_alpha(&mut cropped, mask.plane(), self.config.binarize_threshold)?;

        let target = mask.class().side(sizes);
        let out = if cropped.dimensions() == (target, target) {
            cropped
        } else {
            imageops::resize(&cropped, target, target, FilterType::CatmullRom)
        };
        Ok(out)
    }
}

/// Common clipping step: `alpha = min(icon.alpha, mask > threshold ? 255 : 0)`.
///
/// `icon` and `mask` must share dimensions; a mismatch is a
/// [`StageError::Dimension`].
pub fn apply_mask_alpha(
    icon: &mut RgbaImage,
    mask: &GrayImage,
    threshold: u8,
) -> Result<(), StageError> {
    if icon.dimensions() != mask.dimensions() {
        let (iw, ih) = icon.dimensions();
        let (mw, mh) = mask.dimensions();
        return Err(StageError::Dimension(format!(
            "cannot clip {iw}x{ih} icon with {mw}x{mh} mask"
        )));
    }
    for (x, y, pixel) in icon.enumerate_pixels_mut() {
        let inside = mask.get_pixel(x, y)[0] > threshold;
        let mask_alpha = if inside { 255 } else { 0 };
        pixel[3] = pixel[3].min(mask_alpha);
    }
    Ok(())
}
