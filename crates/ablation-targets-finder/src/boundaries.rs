//! Boundary extraction shared by every finder variant.

use ablation_targets_core::{find_contours, match_shapes, polygon, Contour, GrayImageView};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Regions with a smaller enclosed area are dropped.
pub const MIN_REGION_AREA: f64 = 1000.0;

/// Semi-axes of the reference ellipse used for the shape-match score.
pub const REFERENCE_SEMI_AXES: (f64, f64) = (60.0, 30.0);

/// Shape statistics of one root-level boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryDescriptor {
    pub area: f64,
    pub perimeter: f64,
    /// `4 pi area / perimeter^2`, 1 for a perfect disk.
    pub circularity: f64,
    /// `area / hull_area`, 1 for convex shapes.
    pub convexity: f64,
    /// Hu-moment distance to the reference ellipse; 0 is a perfect match.
    pub match_score: f64,
}

impl BoundaryDescriptor {
    /// Measure `points`. Degenerate polygons (zero perimeter or zero hull
    /// area) report zero area, circularity, convexity and match score.
    pub fn measure(points: &[Point2<i32>], reference: &[Point2<i32>]) -> Self {
        let area = polygon::area(points);
        let perimeter = polygon::arc_length(points, true);
        let hull_area = polygon::area(&polygon::convex_hull(points));
        if perimeter <= 0.0 || hull_area <= 0.0 {
            return Self {
                perimeter,
                ..Self::default()
            };
        }
        Self {
            area,
            perimeter,
            circularity: 4.0 * std::f64::consts::PI * area / (perimeter * perimeter),
            convexity: area / hull_area,
            match_score: match_shapes(reference, points),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.area == 0.0 && self.circularity == 0.0 && self.convexity == 0.0
    }
}

/// An accepted region boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Index of the contour in the traced hierarchy.
    pub contour_index: usize,
    /// Closed pixel polygon.
    pub points: Vec<Point2<i32>>,
    pub descriptor: BoundaryDescriptor,
}

impl Boundary {
    pub fn area(&self) -> f64 {
        self.descriptor.area
    }
}

/// Closed polygon of the reference ellipse, centered on `(50, 50)`.
pub fn reference_ellipse() -> Vec<Point2<i32>> {
    let (a, b) = REFERENCE_SEMI_AXES;
    let mut points: Vec<Point2<i32>> = (0..360)
        .map(|deg| {
            let t = (deg as f64).to_radians();
            Point2::new(
                (50.0 + a * t.cos()).round() as i32,
                (50.0 + b * t.sin()).round() as i32,
            )
        })
        .collect();
    points.dedup();
    points
}

/// Trace `mask`, keep root-level borders and drop those under
/// [`MIN_REGION_AREA`]. Output order follows the tracing order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask), fields(width = mask.width, height = mask.height))
)]
pub fn extract_boundaries(mask: &GrayImageView<'_>) -> Vec<Boundary> {
    let contours = find_contours(mask);
    let reference = reference_ellipse();

    let mut out = Vec::new();
    let mut roots = 0usize;
    for (idx, Contour { points, parent, .. }) in contours.into_iter().enumerate() {
        if parent.is_some() {
            continue;
        }
        roots += 1;
        let descriptor = BoundaryDescriptor::measure(&points, &reference);
        log::trace!(
            "contour {idx}: match={:.4} circularity={:.4} convexity={:.4} area={:.1}",
            descriptor.match_score,
            descriptor.circularity,
            descriptor.convexity,
            descriptor.area
        );
        if descriptor.is_degenerate() {
            log::warn!("contour {idx} is degenerate ({} points)", points.len());
        }
        if descriptor.area < MIN_REGION_AREA {
            continue;
        }
        out.push(Boundary {
            contour_index: idx,
            points,
            descriptor,
        });
    }

    log::debug!("{} of {} root boundaries accepted", out.len(), roots);
    out
}
