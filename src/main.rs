use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use iconcut_cv::{
    analyze, mask, pipeline, standardize, visualize, ClipConfig, ClipStrategy, DetectConfig,
    IconUnit, MaskSet, PipelineConfig, RegionDetector, RemovalConfig, StandardizeConfig,
    TemplateSet,
};

/// Extract app icons from a homescreen screenshot and turn them into
/// transparent, compositable assets.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Homescreen screenshot to process
    screenshot: PathBuf,

    /// Small (86x86) reference mask
    #[arg(long, default_value = "masks/iconmask_small.png")]
    small_mask: PathBuf,

    /// Large (157x157) reference mask
    #[arg(long, default_value = "masks/iconmask_big.png")]
    large_mask: PathBuf,

    /// Optional small background template, pre-clipped to the mask shape
    #[arg(long)]
    small_template: Option<PathBuf>,

    /// Optional large background template, pre-clipped to the mask shape
    #[arg(long)]
    large_template: Option<PathBuf>,

    /// Output directory
    #[arg(long, short, default_value = "output")]
    out_dir: PathBuf,

    /// Minimum contour area for detection
    #[arg(long)]
    min_area: Option<f64>,

    /// Maximum contour area for detection
    #[arg(long)]
    max_area: Option<f64>,

    /// Per-channel color tolerance for background removal
    #[arg(long, default_value_t = 60)]
    tolerance: u8,

    /// Shape clipping strategy
    #[arg(long, value_enum, default_value = "centered-scale")]
    strategy: Strategy,

    /// Only analyze the screenshot and suggest detection parameters
    #[arg(long)]
    analyze: bool,

    /// Treat the input as squircle artwork and derive the reference mask
    /// pair from it instead of processing a screenshot
    #[arg(long)]
    make_masks: bool,

    /// Skip writing the detection visualization overlay
    #[arg(long)]
    no_visualization: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    CenteredScale,
    CropToMask,
}

impl From<Strategy> for ClipStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::CenteredScale => ClipStrategy::CenteredScale,
            Strategy::CropToMask => ClipStrategy::CropToMask,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let screenshot = image::open(&args.screenshot)
        .with_context(|| format!("failed to load screenshot {}", args.screenshot.display()))?;

    if args.analyze {
        let analysis = analyze::analyze(&screenshot);
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    if args.make_masks {
        let sizes = StandardizeConfig::default();
        let (large, small) = mask::masks_from_artwork(&screenshot, &sizes);
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
        let large_path = args.out_dir.join("iconmask_big.png");
        let small_path = args.out_dir.join("iconmask_small.png");
        large
            .save(&large_path)
            .with_context(|| format!("failed to save {}", large_path.display()))?;
        small
            .save(&small_path)
            .with_context(|| format!("failed to save {}", small_path.display()))?;
        info!(large = %large_path.display(), small = %small_path.display(), "mask pair written");
        return Ok(());
    }

    let mut detect_config = DetectConfig::default();
    if let Some(min_area) = args.min_area {
        detect_config.min_area = min_area;
    }
    if let Some(max_area) = args.max_area {
        detect_config.max_area = max_area;
    }

    let sizes = StandardizeConfig::default();
    let masks = MaskSet::load(&args.small_mask, &args.large_mask, &sizes)
        .context("failed to load reference masks")?;
    let templates = TemplateSet {
        small: load_template(args.small_template.as_ref())?,
        large: load_template(args.large_template.as_ref())?,
    };

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    // Stage 1: detection and standardization.
    let detector = RegionDetector::new(detect_config);
    let candidates = detector.detect(&screenshot);
    let standardizer = standardize::BoxStandardizer::new(sizes.clone());
    let boxes = standardizer.standardize(&candidates, screenshot.width(), screenshot.height());
    info!(detected = candidates.len(), kept = boxes.len(), "detection finished");

    if !args.no_visualization {
        let overlay = visualize::draw_detections(&screenshot, &boxes);
        let path = args.out_dir.join("detected_icons_visualization.png");
        overlay
            .save(&path)
            .with_context(|| format!("failed to save {}", path.display()))?;
    }

    // Stage 2: crop each region at full resolution and persist it.
    let crops = standardize::crop_regions(&screenshot, &boxes);
    let mut units = Vec::with_capacity(crops.len());
    for (crop, class, index) in &crops {
        let side = class.side(&sizes);
        let name = format!("icon_{:03}_{}_{}x{}.png", index + 1, class.label(), side, side);
        let input = args.out_dir.join(&name);
        crop.save(&input)
            .with_context(|| format!("failed to save {}", input.display()))?;
        units.push(IconUnit {
            input,
            output: args.out_dir.join(format!("merged_{name}")),
            class: *class,
        });
    }

    // Stage 3: clip, remove background and composite, per unit.
    let pipeline_config = PipelineConfig {
        strategy: args.strategy.into(),
        clip: ClipConfig::default(),
        removal: RemovalConfig::with_tolerance(args.tolerance),
        sizes,
    };
    let summary = pipeline::process_batch(&units, &masks, &templates, &pipeline_config);
    summary.export_json(&args.out_dir.join("report.json"))?;

    println!(
        "{} icons processed ({} failed); results in {}",
        summary.succeeded,
        summary.failed,
        args.out_dir.display()
    );
    Ok(())
}

fn load_template(path: Option<&PathBuf>) -> Result<Option<image::RgbaImage>> {
    match path {
        Some(p) => {
            let img = image::open(p)
                .with_context(|| format!("failed to load template {}", p.display()))?;
            Ok(Some(img.to_rgba8()))
        }
        None => Ok(None),
    }
}
