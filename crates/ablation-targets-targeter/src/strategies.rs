//! Boundary-driven target selection.
//!
//! Each function returns at most one spot per boundary, in boundary order.
//! Boundaries without a qualifying candidate get no spot.

use ablation_targets_core::polygon::{self, PointLocation};
use ablation_targets_core::{dilate_f32, distance_transform, FloatImage, GrayImageView, Moments};
use ablation_targets_finder::Boundary;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::spot::Spot;

/// Side of the square window used to find distance-map maxima.
pub const LOCAL_MAX_WINDOW: u32 = 75;

/// Axis-aligned bounds of a boundary, for cheap rejection.
struct Bounds {
    min: Point2<f64>,
    max: Point2<f64>,
}

impl Bounds {
    fn of(points: &[Point2<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self {
            min: Point2::new(x0 as f64, y0 as f64),
            max: Point2::new(x1 as f64, y1 as f64),
        })
    }

    fn contains(&self, p: &Point2<f64>) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }
}

/// Assign to every boundary the first candidate accepted by `accept`.
fn first_match(
    boundaries: &[Boundary],
    candidates: &[Point2<f64>],
    accept: impl Fn(&Boundary, &Point2<f64>) -> bool,
) -> Vec<Spot> {
    let mut spots = Vec::new();
    for (idx, b) in boundaries.iter().enumerate() {
        let Some(bounds) = Bounds::of(&b.points) else {
            continue;
        };
        let hit = candidates
            .iter()
            .filter(|c| bounds.contains(c))
            .find(|c| accept(b, c));
        if let Some(&pixel) = hit {
            spots.push(Spot::new(Some(idx), pixel));
        }
    }
    spots
}

fn pixels_where(map: &FloatImage, pred: impl Fn(usize, f32) -> bool) -> Vec<Point2<f64>> {
    let mut out = Vec::new();
    for y in 0..map.height {
        for x in 0..map.width {
            let i = y * map.width + x;
            if pred(i, map.data[i]) {
                out.push(Point2::new(x as f64, y as f64));
            }
        }
    }
    out
}

/// Distance-map ridge targeting: the deepest interior points.
///
/// Candidates are the positive local maxima of the distance map within a
/// [`LOCAL_MAX_WINDOW`] square, in row-major order. A boundary takes the first
/// candidate lying more than `spot_size / 2` inside it.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(boundaries, mask), fields(boundaries = boundaries.len()))
)]
pub fn core_spots(boundaries: &[Boundary], mask: &GrayImageView<'_>, spot_size: u32) -> Vec<Spot> {
    let dist = distance_transform(mask);
    let dilated = dilate_f32(&dist, LOCAL_MAX_WINDOW);
    let candidates = pixels_where(&dist, |i, d| d > 0.0 && d == dilated.data[i]);

    let mut depths: Vec<f32> = candidates
        .iter()
        .map(|c| dist.get(c.x as usize, c.y as usize))
        .collect();
    depths.sort_by(f32::total_cmp);
    log::debug!(
        "{} core candidates, depth range {:?}..{:?}",
        candidates.len(),
        depths.first(),
        depths.last()
    );

    let min_depth = spot_size as f64 / 2.0;
    first_match(boundaries, &candidates, |b, c| {
        polygon::signed_distance(&b.points, *c) > min_depth
    })
}

/// Rim targeting: points a fixed inset plus half a spot inside the region.
///
/// Candidates are pixels whose distance value lies in
/// `[floor(s/2) + inset, ceil(s/2 + 0.5) + inset]`, ordered by `x` (stable).
/// A boundary takes the first candidate strictly inside it.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(boundaries, mask), fields(boundaries = boundaries.len()))
)]
pub fn rim_spots(
    boundaries: &[Boundary],
    mask: &GrayImageView<'_>,
    spot_size: u32,
    inset: u32,
) -> Vec<Spot> {
    let dist = distance_transform(mask);
    let half = spot_size as f64 / 2.0;
    let lo = (half.floor() + inset as f64) as f32;
    let hi = ((half + 0.5).ceil() + inset as f64) as f32;
    let mut candidates = pixels_where(&dist, |_, d| d >= lo && d <= hi);
    candidates.sort_by(|a, b| a.x.total_cmp(&b.x));
    log::debug!("{} rim candidates in [{lo}, {hi}]", candidates.len());

    first_match(boundaries, &candidates, |b, c| {
        polygon::locate_point(&b.points, *c).0 == PointLocation::Inside
    })
}

/// Area centroid of every boundary enclosing at least one spot disc
/// (`area >= pi (s/2)^2`). Coordinates are truncated to whole pixels.
pub fn moment_spots(boundaries: &[Boundary], spot_size: u32) -> Vec<Spot> {
    let min_area = std::f64::consts::PI * (spot_size as f64 / 2.0).powi(2);
    let mut spots = Vec::new();
    for (idx, b) in boundaries.iter().enumerate() {
        if polygon::area(&b.points) < min_area {
            continue;
        }
        let Some(c) = Moments::from_polygon(&b.points).centroid() else {
            log::warn!("boundary {idx} has no centroid");
            continue;
        };
        spots.push(Spot::new(Some(idx), Point2::new(c.x.trunc(), c.y.trunc())));
    }
    spots
}
