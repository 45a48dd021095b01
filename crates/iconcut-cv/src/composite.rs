//! Alpha compositing of a cleaned icon over a background template.

use image::RgbaImage;

use crate::error::StageError;

/// Blend `icon` over `template` using the icon's per-pixel alpha.
///
/// `out_rgb = a * icon_rgb + (1 - a) * template_rgb` with `a = alpha/255`,
/// `out_alpha = max(icon_alpha, template_alpha)`. Blending happens in the
/// raw 8-bit channel domain, no gamma correction. Dimensions must match.
pub fn composite_over(icon: &RgbaImage, template: &RgbaImage) -> Result<RgbaImage, StageError> {
    if icon.dimensions() != template.dimensions() {
        return Err(StageError::Dimension(format!(
            "icon {:?} does not match template {:?}",
            icon.dimensions(),
            template.dimensions()
        )));
    }

    let mut out = template.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let fg = icon.get_pixel(x, y);
        let a = fg[3] as f32 / 255.0;
        for c in 0..3 {
            let blended = a * fg[c] as f32 + (1.0 - a) * pixel[c] as f32;
            pixel[c] = blended.round() as u8;
        }
        pixel[3] = fg[3].max(pixel[3]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_opaque_icon_replaces_template() {
        let icon = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255]));
        let template = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let out = composite_over(&icon, &template).unwrap();
        assert_eq!(out.get_pixel(1, 1).0, [200, 100, 50, 255]);
    }

    #[test]
    fn test_transparent_icon_passes_template_through() {
        let icon = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 0]));
        let template = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let out = composite_over(&icon, &template).unwrap();
        assert_eq!(out.get_pixel(1, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_half_alpha_blends_and_takes_max_alpha() {
        let icon = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 102]));
        let template = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 60]));
        let out = composite_over(&icon, &template).unwrap();
        // a = 0.4: 0.4 * 255 = 102.
        assert_eq!(out.get_pixel(0, 0).0, [102, 0, 0, 102]);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let icon = RgbaImage::new(4, 4);
        let template = RgbaImage::new(8, 8);
        let err = composite_over(&icon, &template).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Dimension);
    }
}
