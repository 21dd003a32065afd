//! Pixel-to-stage calibration and spot mapping.
//!
//! The imaged rectangle `center +- size / 2` is rotated about its center by
//! the negated stored rotation with the instrument's convention
//!
//! ```text
//! x' = xc + dx cos r - dy sin r
//! y' = yc + dx sin r - dy cos r
//! ```
//!
//! (note the sign of the last term, which also mirrors `y`), and the image
//! corners `(0,0)`, `(0,h)`, `(w,h)` are mapped onto the rotated corners
//! `(xmin,ymin)`, `(xmin,ymax)`, `(xmax,ymax)`.

use ablation_targets_targeter::Spot;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::affine::AffineTransform;
use crate::metadata::{AlignmentMetadata, MetadataError};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("no calibration source: {missing} missing")]
    NoSource { missing: &'static str },
    #[error("degenerate calibration input: {0}")]
    Degenerate(&'static str),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Affine pixel-to-physical map plus the mean physical size of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub transform: AffineTransform,
    /// Physical units per pixel, `mean(size.x / w, size.y / h)`.
    pub scale: f64,
    pub image_size: (usize, usize),
}

/// Rotate `p` about `center` by `deg` degrees with the instrument convention.
fn rotate_sheared(p: Point2<f64>, center: Point2<f64>, deg: f64) -> Point2<f64> {
    let (s, c) = deg.to_radians().sin_cos();
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point2::new(center.x + dx * c - dy * s, center.y + dx * s - dy * c)
}

impl Calibration {
    /// Rotated rectangle corners `(xmin,ymin)`, `(xmin,ymax)`, `(xmax,ymax)`.
    pub fn reference_corners(meta: &AlignmentMetadata) -> [Point2<f64>; 3] {
        let c = meta.center;
        let half = meta.size * 0.5;
        let (xmin, ymin) = (c.x - half.x, c.y - half.y);
        let (xmax, ymax) = (c.x + half.x, c.y + half.y);
        let r = -meta.rotation;
        [
            rotate_sheared(Point2::new(xmin, ymin), c, r),
            rotate_sheared(Point2::new(xmin, ymax), c, r),
            rotate_sheared(Point2::new(xmax, ymax), c, r),
        ]
    }

    /// Image pixels matched with [`Calibration::reference_corners`].
    pub fn image_corners(width: usize, height: usize) -> [Point2<f64>; 3] {
        let (w, h) = (width as f64, height as f64);
        [Point2::new(0.0, 0.0), Point2::new(0.0, h), Point2::new(w, h)]
    }

    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(meta)))]
    pub fn derive(
        width: usize,
        height: usize,
        meta: &AlignmentMetadata,
    ) -> Result<Self, CalibrationError> {
        if width == 0 || height == 0 {
            return Err(CalibrationError::Degenerate("empty image"));
        }
        let transform = AffineTransform::from_3pt(
            &Self::image_corners(width, height),
            &Self::reference_corners(meta),
        )
        .ok_or(CalibrationError::Degenerate("singular corner system"))?;
        let scale = 0.5 * (meta.size.x / width as f64 + meta.size.y / height as f64);
        log::info!("physical units per pixel = {scale:.6}");
        Ok(Self {
            transform,
            scale,
            image_size: (width, height),
        })
    }

    pub fn map_to_physical(&self, pixel: Point2<f64>) -> Point2<f64> {
        self.transform.apply(pixel)
    }
}

/// Holds the current image size and metadata and derives the calibration
/// once both are present.
#[derive(Clone, Debug, Default)]
pub struct AlignmentCalibrator {
    image_size: Option<(usize, usize)>,
    metadata: Option<AlignmentMetadata>,
    calibration: Option<Calibration>,
}

impl AlignmentCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calibrator for a complete source pair.
    pub fn with_source(
        width: usize,
        height: usize,
        meta: AlignmentMetadata,
    ) -> Result<Self, CalibrationError> {
        let mut cal = Self::new();
        cal.set_source(width, height, meta)?;
        Ok(cal)
    }

    /// Replace the source. On error the calibrator is left without a source.
    pub fn set_source(
        &mut self,
        width: usize,
        height: usize,
        meta: AlignmentMetadata,
    ) -> Result<(), CalibrationError> {
        self.clear();
        let calibration = Calibration::derive(width, height, &meta)?;
        self.image_size = Some((width, height));
        self.metadata = Some(meta);
        self.calibration = Some(calibration);
        Ok(())
    }

    /// Record a new image size and forget the metadata of the previous one.
    pub fn set_image_size(&mut self, width: usize, height: usize) {
        self.clear();
        self.image_size = Some((width, height));
    }

    pub fn clear(&mut self) {
        self.image_size = None;
        self.metadata = None;
        self.calibration = None;
    }

    pub fn metadata(&self) -> Option<&AlignmentMetadata> {
        self.metadata.as_ref()
    }

    pub fn calibration(&self) -> Result<&Calibration, CalibrationError> {
        match (&self.calibration, self.image_size) {
            (Some(c), _) => Ok(c),
            (None, None) => Err(CalibrationError::NoSource { missing: "image" }),
            (None, Some(_)) => Err(CalibrationError::NoSource {
                missing: "alignment metadata",
            }),
        }
    }

    pub fn scale(&self) -> Result<f64, CalibrationError> {
        Ok(self.calibration()?.scale)
    }

    pub fn map_to_physical(&self, pixel: Point2<f64>) -> Result<Point2<f64>, CalibrationError> {
        Ok(self.calibration()?.map_to_physical(pixel))
    }

    /// [`map_spots`] with the current calibration.
    pub fn map_spots(&self, spots: &[Spot]) -> Result<Vec<Spot>, CalibrationError> {
        Ok(map_spots(self.calibration()?, spots))
    }
}

/// Copy of `spots` with physical coordinates filled in.
pub fn map_spots(calibration: &Calibration, spots: &[Spot]) -> Vec<Spot> {
    spots
        .iter()
        .map(|s| Spot {
            physical: Some(calibration.map_to_physical(s.pixel)),
            ..*s
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn meta(rotation: f64) -> AlignmentMetadata {
        AlignmentMetadata::new(rotation, Point2::new(1000.0, 2000.0), Vector2::new(500.0, 400.0))
    }

    #[test]
    fn scale_is_mean_units_per_pixel() {
        let cal = Calibration::derive(100, 80, &meta(0.0)).expect("calibration");
        assert_relative_eq!(cal.scale, 5.0);
        let cal = Calibration::derive(100, 100, &meta(0.0)).expect("calibration");
        assert_relative_eq!(cal.scale, 4.5);
    }

    #[test]
    fn image_corners_map_onto_rotated_rectangle() {
        for rotation in [0.0, 12.5, -90.0, 181.0] {
            let m = meta(rotation);
            let cal = Calibration::derive(640, 480, &m).expect("calibration");
            let src = Calibration::image_corners(640, 480);
            let dst = Calibration::reference_corners(&m);
            for (s, d) in src.iter().zip(&dst) {
                let p = cal.map_to_physical(*s);
                assert_relative_eq!(p.x, d.x, epsilon = 1e-6);
                assert_relative_eq!(p.y, d.y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn zero_rotation_mirrors_vertical_axis() {
        let cal = Calibration::derive(100, 80, &meta(0.0)).expect("calibration");
        // top-left pixel lands on (xmin, ymax), image center on the stage center
        let tl = cal.map_to_physical(Point2::new(0.0, 0.0));
        assert_relative_eq!(tl.x, 750.0, epsilon = 1e-9);
        assert_relative_eq!(tl.y, 2200.0, epsilon = 1e-9);
        let mid = cal.map_to_physical(Point2::new(50.0, 40.0));
        assert_relative_eq!(mid.x, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(mid.y, 2000.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_source_is_reported() {
        let mut cal = AlignmentCalibrator::new();
        assert_eq!(
            cal.calibration(),
            Err(CalibrationError::NoSource { missing: "image" })
        );
        assert!(cal.map_to_physical(Point2::new(1.0, 1.0)).is_err());
        assert!(cal.map_spots(&[]).is_err());
        assert_eq!(
            cal.set_source(0, 10, meta(0.0)),
            Err(CalibrationError::Degenerate("empty image"))
        );
        assert!(cal.calibration().is_err());
        cal.set_image_size(100, 80);
        assert_eq!(
            cal.scale(),
            Err(CalibrationError::NoSource {
                missing: "alignment metadata"
            })
        );
        cal.set_source(100, 80, meta(0.0)).expect("source");
        assert_relative_eq!(cal.scale().expect("scale"), 5.0);
        assert!(cal.metadata().is_some());
    }

    #[test]
    fn spots_gain_physical_coordinates() {
        let cal = Calibration::derive(100, 80, &meta(0.0)).expect("calibration");
        let spots = [Spot::new(Some(3), Point2::new(100.0, 80.0))];
        let mapped = map_spots(&cal, &spots);
        assert_eq!(mapped[0].region, Some(3));
        let p = mapped[0].physical.expect("physical");
        assert_relative_eq!(p.x, 1250.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 1800.0, epsilon = 1e-9);
        assert!(spots[0].physical.is_none());
    }
}
