//! Contour-based icon region detection

pub mod config;
pub mod detector;
pub mod preprocess;

pub use config::DetectConfig;
pub use detector::RegionDetector;
