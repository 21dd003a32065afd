//! Multi-level circular blob detection.
//!
//! The mask is binarized at every level of `[min_threshold, max_threshold)`;
//! borders (outer and hole) of each level within the area window become blob
//! candidates with a center (area centroid) and radius (median distance from
//! the center to the border). Candidates close to an existing group join it;
//! groups seen on at least `min_repeatability` levels are reported.

use ablation_targets_core::{find_contours, threshold_binary, GrayImageView, Moments};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::BlobParams;

/// A detected blob.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub center: Point2<f64>,
    pub radius: f64,
}

fn median_radius(center: Point2<f64>, points: &[Point2<i32>]) -> f64 {
    let mut dists: Vec<f64> = points
        .iter()
        .map(|p| ((p.x as f64 - center.x).powi(2) + (p.y as f64 - center.y).powi(2)).sqrt())
        .collect();
    if dists.is_empty() {
        return 0.0;
    }
    dists.sort_by(f64::total_cmp);
    let n = dists.len();
    0.5 * (dists[(n - 1) / 2] + dists[n / 2])
}

fn blobs_at_level(mask: &GrayImageView<'_>, level: u8, params: &BlobParams) -> Vec<Blob> {
    let binary = threshold_binary(mask, level);
    find_contours(&binary.view())
        .into_iter()
        .filter_map(|c| {
            let m = Moments::from_polygon(&c.points);
            if m.m00 < params.min_area || m.m00 >= params.max_area {
                return None;
            }
            let center = m.centroid()?;
            Some(Blob {
                center,
                radius: median_radius(center, &c.points),
            })
        })
        .collect()
}

/// Detect blobs in `mask`. Output follows the order groups were first seen.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(mask, params), fields(width = mask.width, height = mask.height))
)]
pub fn detect_blobs(mask: &GrayImageView<'_>, params: &BlobParams) -> Vec<Blob> {
    // each group is kept sorted by radius
    let mut groups: Vec<Vec<Blob>> = Vec::new();
    let step = params.threshold_step.max(1);

    let mut level = params.min_threshold;
    while level < params.max_threshold {
        let found = blobs_at_level(mask, level, params);
        let mut fresh = Vec::new();
        for blob in found {
            let target = groups.iter_mut().find(|g| {
                let mid = g[g.len() / 2];
                let dist = (mid.center - blob.center).norm();
                dist < params.min_dist_between_blobs || dist < mid.radius || dist < blob.radius
            });
            match target {
                Some(group) => {
                    let at = group.partition_point(|b| b.radius <= blob.radius);
                    group.insert(at, blob);
                }
                None => fresh.push(vec![blob]),
            }
        }
        groups.extend(fresh);

        level = match level.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }

    let blobs: Vec<Blob> = groups
        .into_iter()
        .filter(|g| g.len() >= params.min_repeatability)
        .map(|g| {
            let n = g.len() as f64;
            let sum = g
                .iter()
                .fold(nalgebra::Vector2::zeros(), |acc, b| acc + b.center.coords);
            Blob {
                center: Point2::from(sum / n),
                radius: g[g.len() / 2].radius,
            }
        })
        .collect();
    log::debug!("{} blobs detected", blobs.len());
    blobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ablation_targets_core::GrayImage;
    use approx::assert_relative_eq;

    fn disk_mask(disks: &[(f64, f64, f64)]) -> GrayImage {
        let mut img = GrayImage::new(300, 160);
        for y in 0..160 {
            for x in 0..300 {
                if disks.iter().any(|&(cx, cy, r)| {
                    (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2) <= r * r
                }) {
                    img.set(x, y, 255);
                }
            }
        }
        img
    }

    #[test]
    fn finds_disk_centers_and_radii() {
        let mask = disk_mask(&[(70.0, 80.0, 40.0), (210.0, 80.0, 30.0)]);
        let blobs = detect_blobs(&mask.view(), &BlobParams::default());
        assert_eq!(blobs.len(), 2);
        assert_relative_eq!(blobs[0].center.x, 70.0, epsilon = 0.5);
        assert_relative_eq!(blobs[0].center.y, 80.0, epsilon = 0.5);
        assert_relative_eq!(blobs[0].radius, 40.0, epsilon = 1.0);
        assert_relative_eq!(blobs[1].center.x, 210.0, epsilon = 0.5);
        assert_relative_eq!(blobs[1].radius, 30.0, epsilon = 1.0);
    }

    #[test]
    fn small_blobs_are_ignored() {
        let mask = disk_mask(&[(70.0, 80.0, 15.0)]);
        assert!(detect_blobs(&mask.view(), &BlobParams::default()).is_empty());
    }

    #[test]
    fn single_level_fails_repeatability() {
        let mask = disk_mask(&[(70.0, 80.0, 40.0)]);
        let params = BlobParams {
            min_threshold: 100,
            max_threshold: 101,
            ..BlobParams::default()
        };
        assert!(detect_blobs(&mask.view(), &params).is_empty());
    }
}
