//! High-level facade crate for the `ablation-targets-*` workspace.
//!
//! This crate provides:
//! - re-exports of the segmentation, targeting and alignment crates
//! - [`Workbench`], a lazily recomputing pipeline from a micrograph to
//!   stage-coordinate target spots
//! - JSON pipeline configuration and the [`SpotReport`] hand-off record
//! - (feature `image`) loading micrographs with the `image` crate
//!
//! ## Quickstart
//!
//! ```
//! use ablation_targets::{AlignmentMetadata, GrayImage, TargeterKind, Workbench};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut img = GrayImage::new(240, 240);
//! for y in 0..240 {
//!     for x in 0..240 {
//!         let d2 = (x as f64 - 120.0).powi(2) + (y as f64 - 120.0).powi(2);
//!         if d2 <= 60.0 * 60.0 {
//!             img.set(x, y, 200);
//!         }
//!     }
//! }
//! let meta = AlignmentMetadata::from_fields("0", "5000, 5000", "480, 480")?;
//!
//! let mut bench = Workbench::new();
//! bench.set_source(img.into(), Some(meta))?;
//! bench.set_targeter(TargeterKind::Moments);
//! let spots = bench.physical_spots()?;
//! assert_eq!(spots.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `ablation_targets::core`: image buffers, raster filters, geometry, settings.
//! - `ablation_targets::finder`: binarization variants and boundary extraction.
//! - `ablation_targets::targeter`: per-grain spot strategies.
//! - `ablation_targets::align`: alignment metadata, calibration, source pairing.
//! - `ablation_targets::detect` (feature `image`): image file interop.

pub use ablation_targets_align as align;
pub use ablation_targets_core as core;
pub use ablation_targets_finder as finder;
pub use ablation_targets_targeter as targeter;

pub use ablation_targets_align::{
    AlignmentCalibrator, AlignmentMetadata, CalibrationError, MetadataError, SourceError,
    SourcePair,
};
pub use ablation_targets_core::{
    GrayImage, Image, RgbImage, SettingSpec, SettingValue, SettingsError,
};
pub use ablation_targets_finder::{
    Boundary, BoundaryDescriptor, BoundaryFinder, FilterConfig, FinderKind, FinderParams,
};
pub use ablation_targets_targeter::{Spot, TargetOutput, Targeter, TargeterKind, TargeterParams};

mod io;
mod workbench;

pub use io::{IoError, PipelineConfig, SpotReport};
pub use workbench::{PipelineError, Workbench};

#[cfg(feature = "image")]
pub mod detect;
