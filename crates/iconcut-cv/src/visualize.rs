//! Detection overlay rendering for operator inspection.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::bbox::BBox;
use crate::standardize::SizeClass;

const TICK_WIDTH: u32 = 2;
const TICK_HEIGHT: u32 = 6;
const TICK_STRIDE: u32 = 4;

/// Render kept detections as hollow rectangles on an RGBA copy of the
/// screenshot: green for small-class boxes, yellow for large. Each box is
/// numbered with tally ticks in its top-left corner (box N carries N+1
/// ticks), matching the sequential index used in the output filenames.
pub fn draw_detections(screenshot: &DynamicImage, boxes: &[(BBox, SizeClass)]) -> RgbaImage {
    let mut canvas = screenshot.to_rgba8();
    for (index, (bbox, class)) in boxes.iter().enumerate() {
        let color = match class {
            SizeClass::Small => Rgba([0, 255, 0, 255]),
            SizeClass::Large => Rgba([255, 220, 0, 255]),
        };
        // Two nested rects for a 2px outline.
        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height),
            color,
        );
        if bbox.width > 2 && bbox.height > 2 {
            draw_hollow_rect_mut(
                &mut canvas,
                Rect::at(bbox.x as i32 + 1, bbox.y as i32 + 1)
                    .of_size(bbox.width - 2, bbox.height - 2),
                color,
            );
        }
        draw_index_ticks(&mut canvas, bbox, index, color);
    }
    canvas
}

/// Tally marks just inside the box's top-left corner. Ticks that would
/// leave the box are not drawn, so very narrow boxes stay legible.
fn draw_index_ticks(canvas: &mut RgbaImage, bbox: &BBox, index: usize, color: Rgba<u8>) {
    if bbox.height < TICK_HEIGHT + 8 {
        return;
    }
    let y = bbox.y as i32 + 4;
    for k in 0..=index as u32 {
        let x = bbox.x + 4 + k * TICK_STRIDE;
        if x + TICK_WIDTH + 2 > bbox.x + bbox.width {
            break;
        }
        draw_filled_rect_mut(
            canvas,
            Rect::at(x as i32, y).of_size(TICK_WIDTH, TICK_HEIGHT),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_marks_box_outline() {
        let img = DynamicImage::new_rgba8(200, 200);
        let boxes = vec![(BBox::new(10, 10, 86, 86), SizeClass::Small)];
        let out = draw_detections(&img, &boxes);
        assert_eq!(out.get_pixel(10, 10).0, [0, 255, 0, 255]);
        // Interior stays untouched.
        assert_eq!(out.get_pixel(50, 50)[3], 0);
    }

    #[test]
    fn test_overlay_numbers_boxes_with_ticks() {
        let img = DynamicImage::new_rgba8(400, 400);
        let boxes = vec![
            (BBox::new(10, 10, 86, 86), SizeClass::Small),
            (BBox::new(150, 150, 157, 157), SizeClass::Large),
        ];
        let out = draw_detections(&img, &boxes);

        let green = [0, 255, 0, 255];
        let yellow = [255, 220, 0, 255];
        // First box: exactly one tick at (14, 14), nothing at the second
        // tick slot.
        assert_eq!(out.get_pixel(14, 14).0, green);
        assert_eq!(out.get_pixel(18, 14)[3], 0);
        // Second box: two ticks with a one-column gap between them.
        assert_eq!(out.get_pixel(154, 154).0, yellow);
        assert_eq!(out.get_pixel(158, 154).0, yellow);
        assert_eq!(out.get_pixel(156, 154)[3], 0);
        assert_eq!(out.get_pixel(162, 154)[3], 0);
    }
}
