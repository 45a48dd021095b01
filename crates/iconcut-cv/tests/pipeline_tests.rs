//! End-to-end pipeline tests on synthetic screenshots.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba};

use iconcut_cv::{
    pipeline, standardize, BoxStandardizer, ClipConfig, ClipStrategy, DetectConfig, IconUnit,
    MaskSet, PipelineConfig, RegionDetector, RemovalConfig, SizeClass, StandardizeConfig,
    TemplateSet,
};

/// Light wallpaper with colored square glyphs at the given positions.
fn synthetic_screenshot(squares: &[(u32, u32, u32)]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(500, 500, Rgb([235, 235, 235]));
    for &(x0, y0, side) in squares {
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                img.put_pixel(x, y, Rgb([25, 70, 160]));
            }
        }
    }
    DynamicImage::ImageRgb8(img)
}

fn circle_mask_file(dir: &std::path::Path, name: &str, side: u32) -> std::path::PathBuf {
    let r = side as f32 / 2.0;
    let mask = GrayImage::from_fn(side, side, |x, y| {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        Luma([if dx * dx + dy * dy <= r * r { 255 } else { 0 }])
    });
    let path = dir.join(name);
    mask.save(&path).unwrap();
    path
}

#[test]
fn detect_and_standardize_end_to_end() {
    let screenshot = synthetic_screenshot(&[(60, 60, 60), (250, 60, 60), (60, 250, 60)]);
    let detector = RegionDetector::new(DetectConfig::default());
    let candidates = detector.detect(&screenshot);
    assert!(!candidates.is_empty(), "no candidates detected");

    let standardizer = BoxStandardizer::new(StandardizeConfig::default());
    let boxes = standardizer.standardize(&candidates, 500, 500);
    assert!(!boxes.is_empty());
    for (bbox, class) in &boxes {
        assert!(bbox.width == 86 || bbox.width == 157);
        assert_eq!(bbox.width, bbox.height);
        assert!(bbox.x + bbox.width <= 500);
        assert!(bbox.y + bbox.height <= 500);
        assert!(matches!(class, SizeClass::Small | SizeClass::Large));
    }

    let crops = standardize::crop_regions(&screenshot, &boxes);
    assert_eq!(crops.len(), boxes.len());
    for ((crop, class, _), (bbox, _)) in crops.iter().zip(&boxes) {
        assert_eq!(crop.dimensions(), (bbox.width, bbox.height));
        assert!(matches!(class, SizeClass::Small | SizeClass::Large));
    }
}

#[test]
fn batch_runs_crops_through_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let sizes = StandardizeConfig::default();

    let small_mask = circle_mask_file(dir.path(), "iconmask_small.png", 86);
    let large_mask = circle_mask_file(dir.path(), "iconmask_big.png", 157);
    let masks = MaskSet::load(&small_mask, &large_mask, &sizes).unwrap();

    let screenshot = synthetic_screenshot(&[(60, 60, 60), (250, 60, 60)]);
    let detector = RegionDetector::new(DetectConfig::default());
    let standardizer = BoxStandardizer::new(sizes.clone());
    let boxes = standardizer.standardize(&detector.detect(&screenshot), 500, 500);
    assert!(!boxes.is_empty());

    let crops = standardize::crop_regions(&screenshot, &boxes);
    let mut units = Vec::new();
    for (crop, class, index) in &crops {
        let input = dir.path().join(format!("icon_{index:03}.png"));
        crop.save(&input).unwrap();
        units.push(IconUnit {
            input,
            output: dir.path().join(format!("merged_{index:03}.png")),
            class: *class,
        });
    }

    let config = PipelineConfig {
        strategy: ClipStrategy::CenteredScale,
        clip: ClipConfig::default(),
        removal: RemovalConfig::removal(),
        sizes,
    };
    let summary = pipeline::process_batch(&units, &masks, &TemplateSet::default(), &config);

    assert_eq!(summary.total, units.len());
    assert_eq!(summary.failed, 0);
    for (unit, report) in units.iter().zip(&summary.reports) {
        assert!(report.success);
        assert!(unit.output.exists());
        let out = image::open(&unit.output).unwrap().to_rgba8();
        let side = match unit.class {
            SizeClass::Small => 86,
            SizeClass::Large => 157,
        };
        assert_eq!(out.dimensions(), (side, side));
        // Removed and remaining can never exceed the raster together.
        assert!(report.pixels_removed + report.pixels_remaining <= (side * side) as u64);
    }

    let report_path = dir.path().join("report.json");
    summary.export_json(&report_path).unwrap();
    assert!(report_path.exists());
}

#[test]
fn crop_to_mask_strategy_yields_canonical_output() {
    let dir = tempfile::tempdir().unwrap();
    let sizes = StandardizeConfig::default();
    let small_mask = circle_mask_file(dir.path(), "small.png", 86);
    let large_mask = circle_mask_file(dir.path(), "big.png", 157);
    let masks = MaskSet::load(&small_mask, &large_mask, &sizes).unwrap();

    let icon = image::RgbaImage::from_fn(157, 157, |x, y| {
        if (40..120).contains(&x) && (40..120).contains(&y) {
            Rgba([200, 40, 40, 255])
        } else {
            Rgba([240, 240, 240, 255])
        }
    });
    let config = PipelineConfig {
        strategy: ClipStrategy::CropToMask,
        clip: ClipConfig::default(),
        removal: RemovalConfig::removal(),
        sizes,
    };
    let (out, report) = pipeline::process_icon(
        icon,
        SizeClass::Large,
        &masks,
        &TemplateSet::default(),
        &config,
    )
    .unwrap();
    assert_eq!(out.dimensions(), (157, 157));
    assert!(report.pixels_remaining > 0);
}
