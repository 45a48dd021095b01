//! Per-icon pipeline (clip, remove background, composite) and the batch
//! loop that runs it over many independent units.

use anyhow::Context;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::background::{remove_background, RemovalConfig};
use crate::clip::{ClipConfig, ClipStrategy, ShapeClipper};
use crate::composite::composite_over;
use crate::error::{ErrorKind, StageError};
use crate::mask::MaskSet;
use crate::standardize::{SizeClass, StandardizeConfig};

/// Everything the per-icon pipeline needs beyond its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub strategy: ClipStrategy,
    pub clip: ClipConfig,
    pub removal: RemovalConfig,
    pub sizes: StandardizeConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strategy: ClipStrategy::CenteredScale,
            clip: ClipConfig::default(),
            removal: RemovalConfig::removal(),
            sizes: StandardizeConfig::default(),
        }
    }
}

/// Optional per-class background templates, pre-clipped to the same
/// silhouette as the reference masks.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    pub small: Option<RgbaImage>,
    pub large: Option<RgbaImage>,
}

impl TemplateSet {
    pub fn get(&self, class: SizeClass) -> Option<&RgbaImage> {
        match class {
            SizeClass::Small => self.small.as_ref(),
            SizeClass::Large => self.large.as_ref(),
        }
    }
}

/// Structured outcome of one icon through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconReport {
    pub index: usize,
    pub success: bool,
    pub pixels_removed: u64,
    pub pixels_remaining: u64,
    pub error_kind: Option<ErrorKind>,
}

/// One independent batch unit: where its icon comes from and goes to.
#[derive(Debug, Clone)]
pub struct IconUnit {
    pub input: PathBuf,
    pub output: PathBuf,
    pub class: SizeClass,
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub reports: Vec<IconReport>,
}

impl BatchSummary {
    fn from_reports(reports: Vec<IconReport>) -> Self {
        let succeeded = reports.iter().filter(|r| r.success).count();
        Self {
            total: reports.len(),
            succeeded,
            failed: reports.len() - succeeded,
            reports,
        }
    }

    /// Export the summary as pretty-printed JSON.
    pub fn export_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize batch summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }
}

/// Run one decoded icon through clip, background removal and compositing.
///
/// Returns the composited raster and the removal statistics. When no
/// template exists for the icon's class the cleaned icon is the result.
pub fn process_icon(
    icon: RgbaImage,
    class: SizeClass,
    masks: &MaskSet,
    templates: &TemplateSet,
    config: &PipelineConfig,
) -> Result<(RgbaImage, crate::background::RemovalReport), StageError> {
    let clipper = ShapeClipper::new(config.strategy, config.clip.clone());
    let mut clipped = clipper.clip(icon, masks.get(class), &config.sizes)?;

    let removal = remove_background(&mut clipped, &config.removal);

    let result = match templates.get(class) {
        Some(template) => composite_over(&clipped, template)?,
        None => clipped,
    };
    Ok((result, removal))
}

/// Run one unit end to end: load, process, write.
fn process_unit(
    unit: &IconUnit,
    masks: &MaskSet,
    templates: &TemplateSet,
    config: &PipelineConfig,
) -> Result<crate::background::RemovalReport, StageError> {
    let icon = image::open(&unit.input)
        .map_err(|source| StageError::Load {
            path: unit.input.clone(),
            source,
        })?
        .to_rgba8();

    let (result, removal) = process_icon(icon, unit.class, masks, templates, config)?;

    result.save(&unit.output).map_err(|source| StageError::Write {
        path: unit.output.clone(),
        source,
    })?;
    Ok(removal)
}

/// Process every unit, isolating failures.
///
/// No error in one unit aborts its siblings; failures are recorded in the
/// unit's report and counted in the summary. With the `parallel` feature
/// the units run on a worker pool; per-unit semantics are unchanged since
/// units share nothing mutable.
pub fn process_batch(
    units: &[IconUnit],
    masks: &MaskSet,
    templates: &TemplateSet,
    config: &PipelineConfig,
) -> BatchSummary {
    let run = |(index, unit): (usize, &IconUnit)| -> IconReport {
        match process_unit(unit, masks, templates, config) {
            Ok(removal) => IconReport {
                index,
                success: true,
                pixels_removed: removal.pixels_removed,
                pixels_remaining: removal.pixels_remaining,
                error_kind: None,
            },
            Err(err) => {
                warn!(
                    input = %unit.input.display(),
                    error = %err,
                    "icon pipeline failed, skipping unit"
                );
                IconReport {
                    index,
                    success: false,
                    pixels_removed: 0,
                    pixels_remaining: 0,
                    error_kind: Some(err.kind()),
                }
            }
        }
    };

    #[cfg(feature = "parallel")]
    let reports: Vec<IconReport> = units.par_iter().enumerate().map(|(i, u)| run((i, u))).collect();
    #[cfg(not(feature = "parallel"))]
    let reports: Vec<IconReport> = units.iter().enumerate().map(run).collect();

    let summary = BatchSummary::from_reports(reports);
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "batch complete"
    );
    summary
}
