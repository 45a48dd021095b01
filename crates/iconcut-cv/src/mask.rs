//! Reference mask loading and normalization.
//!
//! A reference mask is the canonical squircle silhouette for one size
//! class: a single-channel plane, opaque (255) where the icon shape
//! exists. Masks are loaded once per run and never mutated.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::edges::canny;
use std::path::Path;
use tracing::debug;

use crate::error::StageError;
use crate::standardize::{SizeClass, StandardizeConfig};

/// A normalized silhouette plane at one class's canonical dimensions.
#[derive(Debug, Clone)]
pub struct ReferenceMask {
    class: SizeClass,
    plane: GrayImage,
}

impl ReferenceMask {
    /// Load a mask file and normalize it for `class`.
    pub fn load(
        path: &Path,
        class: SizeClass,
        config: &StandardizeConfig,
    ) -> Result<Self, StageError> {
        let img = image::open(path).map_err(|source| StageError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?class, "loaded reference mask");
        Ok(Self::from_image(&img, class, config))
    }

    /// Normalize an already-decoded raster into a mask plane.
    ///
    /// Rasters with an alpha channel clip by that plane; anything else is
    /// reduced to luminance. The plane is resized to the class's canonical
    /// dimensions with nearest-neighbor sampling to keep the silhouette
    /// edge hard.
    pub fn from_image(img: &DynamicImage, class: SizeClass, config: &StandardizeConfig) -> Self {
        let plane = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                Luma([rgba.get_pixel(x, y)[3]])
            })
        } else {
            img.to_luma8()
        };

        let side = class.side(config);
        let plane = if plane.dimensions() == (side, side) {
            plane
        } else {
            imageops::resize(&plane, side, side, FilterType::Nearest)
        };

        Self { class, plane }
    }

    pub fn class(&self) -> SizeClass {
        self.class
    }

    pub fn plane(&self) -> &GrayImage {
        &self.plane
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.plane.dimensions()
    }
}

/// The small and large masks for one run, loaded once, read-only.
#[derive(Debug, Clone)]
pub struct MaskSet {
    small: ReferenceMask,
    large: ReferenceMask,
}

impl MaskSet {
    pub fn new(small: ReferenceMask, large: ReferenceMask) -> Self {
        Self { small, large }
    }

    pub fn load(
        small_path: &Path,
        large_path: &Path,
        config: &StandardizeConfig,
    ) -> Result<Self, StageError> {
        Ok(Self {
            small: ReferenceMask::load(small_path, SizeClass::Small, config)?,
            large: ReferenceMask::load(large_path, SizeClass::Large, config)?,
        })
    }

    pub fn get(&self, class: SizeClass) -> &ReferenceMask {
        match class {
            SizeClass::Small => &self.small,
            SizeClass::Large => &self.large,
        }
    }
}

/// Derive a mask pair from reference artwork of the squircle shape.
///
/// Binarizes the artwork at mid-gray, traces the outline with Canny and
/// lifts the edges to an RGBA image with black made transparent, scaled to
/// both canonical sizes.
pub fn masks_from_artwork(
    artwork: &DynamicImage,
    config: &StandardizeConfig,
) -> (RgbaImage, RgbaImage) {
    let gray = artwork.to_luma8();
    let binary = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([if gray.get_pixel(x, y)[0] > 127 { 255 } else { 0 }])
    });
    let edges = canny(&binary, 100.0, 200.0);

    let outline = RgbaImage::from_fn(edges.width(), edges.height(), |x, y| {
        let v = edges.get_pixel(x, y)[0];
        if v == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([v, v, v, 255])
        }
    });

    let large = imageops::resize(
        &outline,
        config.large_side,
        config.large_side,
        FilterType::Nearest,
    );
    let small = imageops::resize(
        &outline,
        config.small_side,
        config.small_side,
        FilterType::Nearest,
    );
    (large, small)
}
