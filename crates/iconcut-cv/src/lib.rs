//! Iconcut Computer Vision Library
//!
//! Locates icon glyphs in a homescreen screenshot, standardizes the
//! detected regions to two canonical sizes, clips them to a squircle
//! silhouette and removes their background to produce transparent,
//! compositable icon assets.
//!
//! The pipeline is `RegionDetector` -> `BoxStandardizer` -> crop ->
//! `ShapeClipper` -> background removal -> compositing. Each stage fully
//! consumes its input buffer; batch processing is a loop over independent
//! per-icon units.

pub mod analyze;
pub mod background;
pub mod bbox;
pub mod clip;
pub mod composite;
pub mod detect;
pub mod error;
pub mod mask;
pub mod pipeline;
pub mod standardize;
pub mod visualize;

// Re-export commonly used types
pub use background::{ColorGroup, RemovalConfig, RemovalReport};
pub use bbox::BBox;
pub use clip::{ClipConfig, ClipStrategy, ShapeClipper};
pub use detect::{DetectConfig, RegionDetector};
pub use error::{ErrorKind, StageError};
pub use mask::{MaskSet, ReferenceMask};
pub use pipeline::{BatchSummary, IconReport, IconUnit, PipelineConfig, TemplateSet};
pub use standardize::{BoxStandardizer, SizeClass, StandardizeConfig};
