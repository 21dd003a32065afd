//! Grain segmentation: binarize a micrograph and extract region boundaries.
//!
//! Three interchangeable variants produce the mask:
//!
//! - [`FinderKind::Threshold`]: optional median smoothing, intensity band,
//!   optional opening.
//! - [`FinderKind::Adaptive`]: 5 px median, local mean or Gaussian threshold,
//!   11 px opening.
//! - [`FinderKind::Otsu`]: Gaussian blur and a global Otsu level.
//!
//! All variants share [`extract_boundaries`], which keeps root-level borders
//! enclosing at least [`MIN_REGION_AREA`] pixels and reports a
//! [`BoundaryDescriptor`] for each.
//!
//! ```
//! use ablation_targets_core::{GrayImage, Image};
//! use ablation_targets_finder::{BoundaryFinder, FinderKind};
//!
//! let image: Image = GrayImage::new(64, 64).into();
//! let mut finder = BoundaryFinder::new(FinderKind::Otsu.into());
//! assert!(finder.run(&image).boundaries.is_empty());
//! ```

mod boundaries;
mod filters;
mod finder;
mod mask;
mod params;
mod render;

pub use boundaries::{
    extract_boundaries, reference_ellipse, Boundary, BoundaryDescriptor, MIN_REGION_AREA,
    REFERENCE_SEMI_AXES,
};
pub use filters::{FilterConfig, FilterRange};
pub use finder::{BoundaryFinder, FinderKind, FinderOutput, FinderParams};
pub use mask::{adaptive_mask, otsu_mask, threshold_mask};
pub use params::{AdaptiveParams, OtsuParams, ThresholdParams};
pub use render::{render_boundaries, BOUNDARY_THICKNESS};
