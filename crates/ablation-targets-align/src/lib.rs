//! Mapping of pixel coordinates onto the microscope stage.
//!
//! A micrograph comes with an `.align` record giving the stage rotation,
//! the physical center and the physical extent of the imaged area. From the
//! image size and that record an [`AffineTransform`] is derived; it is then
//! applied to every target spot.
//!
//! ```
//! use ablation_targets_align::{AlignmentCalibrator, AlignmentMetadata};
//! use nalgebra::Point2;
//!
//! let meta = AlignmentMetadata::from_fields("0", "1000, 2000", "500, 400").unwrap();
//! let cal = AlignmentCalibrator::with_source(100, 80, meta).unwrap();
//! assert_eq!(cal.scale().unwrap(), 5.0);
//! let p = cal.map_to_physical(Point2::new(50.0, 40.0)).unwrap();
//! assert!((p.x - 1000.0).abs() < 1e-9 && (p.y - 2000.0).abs() < 1e-9);
//! ```

mod affine;
mod calibration;
mod metadata;
mod source;

pub use affine::AffineTransform;
pub use calibration::{map_spots, AlignmentCalibrator, Calibration, CalibrationError};
pub use metadata::{AlignmentMetadata, MetadataError};
pub use source::{SourceError, SourcePair, ALIGN_EXTENSION, IMAGE_EXTENSIONS};
