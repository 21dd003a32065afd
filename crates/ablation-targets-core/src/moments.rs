//! Polygon moments up to third order, Hu invariants and shape distance.
//!
//! Moments are integrated over the polygon interior with Green's theorem and
//! reported for counter-clockwise orientation, so `m00` equals the unsigned
//! area whichever way the contour was traced.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,
}

/// Central moments normalized for scale (`nu_pq`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedMoments {
    pub nu20: f64,
    pub nu11: f64,
    pub nu02: f64,
    pub nu30: f64,
    pub nu21: f64,
    pub nu12: f64,
    pub nu03: f64,
}

impl Moments {
    pub fn from_polygon(points: &[Point2<i32>]) -> Self {
        let n = points.len();
        if n < 3 {
            return Self::default();
        }
        let mut a = [0.0f64; 10];
        let mut prev = points[n - 1];
        for &cur in points {
            let (x0, y0) = (prev.x as f64, prev.y as f64);
            let (x1, y1) = (cur.x as f64, cur.y as f64);
            let dxy = x0 * y1 - x1 * y0;
            let xs = x0 + x1;
            let ys = y0 + y1;

            a[0] += dxy;
            a[1] += dxy * xs;
            a[2] += dxy * ys;
            a[3] += dxy * (x0 * x0 + x0 * x1 + x1 * x1);
            a[4] += dxy * (2.0 * x0 * y0 + x0 * y1 + x1 * y0 + 2.0 * x1 * y1);
            a[5] += dxy * (y0 * y0 + y0 * y1 + y1 * y1);
            a[6] += dxy * xs * (x0 * x0 + x1 * x1);
            a[7] += dxy * (x0 * x0 * (3.0 * y0 + y1) + 2.0 * x0 * x1 * ys + x1 * x1 * (y0 + 3.0 * y1));
            a[8] += dxy * (y0 * y0 * (3.0 * x0 + x1) + 2.0 * y0 * y1 * xs + y1 * y1 * (x0 + 3.0 * x1));
            a[9] += dxy * ys * (y0 * y0 + y1 * y1);
            prev = cur;
        }

        let sign = if a[0] < 0.0 { -1.0 } else { 1.0 };
        Self {
            m00: sign * a[0] / 2.0,
            m10: sign * a[1] / 6.0,
            m01: sign * a[2] / 6.0,
            m20: sign * a[3] / 12.0,
            m11: sign * a[4] / 24.0,
            m02: sign * a[5] / 12.0,
            m30: sign * a[6] / 20.0,
            m21: sign * a[7] / 60.0,
            m12: sign * a[8] / 60.0,
            m03: sign * a[9] / 20.0,
        }
    }

    /// Area centroid, `None` for zero-area polygons.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.m00.abs() <= f64::EPSILON {
            return None;
        }
        Some(Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }

    /// Central second-order moments `(mu20, mu11, mu02)`.
    pub fn central2(&self) -> Option<(f64, f64, f64)> {
        let c = self.centroid()?;
        Some((
            self.m20 - c.x * self.m10,
            self.m11 - c.x * self.m01,
            self.m02 - c.y * self.m01,
        ))
    }

    pub fn normalized(&self) -> Option<NormalizedMoments> {
        let c = self.centroid()?;
        let (cx, cy) = (c.x, c.y);
        let (mu20, mu11, mu02) = self.central2()?;
        let mu30 = self.m30 - cx * (3.0 * mu20 + cx * self.m10);
        let mu21 = self.m21 - cx * (2.0 * mu11 + cx * self.m01) - cy * mu20;
        let mu12 = self.m12 - cy * (2.0 * mu11 + cy * self.m10) - cx * mu02;
        let mu03 = self.m03 - cy * (3.0 * mu02 + cy * self.m01);

        let inv2 = 1.0 / (self.m00 * self.m00);
        let inv3 = inv2 / self.m00.sqrt();
        Some(NormalizedMoments {
            nu20: mu20 * inv2,
            nu11: mu11 * inv2,
            nu02: mu02 * inv2,
            nu30: mu30 * inv3,
            nu21: mu21 * inv3,
            nu12: mu12 * inv3,
            nu03: mu03 * inv3,
        })
    }

    /// The seven Hu invariants; all zero for degenerate polygons.
    pub fn hu(&self) -> [f64; 7] {
        let Some(nu) = self.normalized() else {
            return [0.0; 7];
        };
        let t0 = nu.nu30 + nu.nu12;
        let t1 = nu.nu21 + nu.nu03;
        let q0 = nu.nu30 - 3.0 * nu.nu12;
        let q1 = 3.0 * nu.nu21 - nu.nu03;
        let d = nu.nu20 - nu.nu02;
        let (t0s, t1s) = (t0 * t0, t1 * t1);

        [
            nu.nu20 + nu.nu02,
            d * d + 4.0 * nu.nu11 * nu.nu11,
            q0 * q0 + q1 * q1,
            t0s + t1s,
            q0 * t0 * (t0s - 3.0 * t1s) + q1 * t1 * (3.0 * t0s - t1s),
            d * (t0s - t1s) + 4.0 * nu.nu11 * t0 * t1,
            q1 * t0 * (t0s - 3.0 * t1s) - q0 * t1 * (3.0 * t0s - t1s),
        ]
    }
}

/// Hu-moment shape distance `sum_i |m_a,i - m_b,i|` with
/// `m_i = sign(h_i) * log10|h_i|`. Invariants below `1e-5` in either shape
/// are ignored.
pub fn match_shapes(a: &[Point2<i32>], b: &[Point2<i32>]) -> f64 {
    const EPS: f64 = 1e-5;
    let ha = Moments::from_polygon(a).hu();
    let hb = Moments::from_polygon(b).hu();
    let mut result = 0.0;
    for (&va, &vb) in ha.iter().zip(&hb) {
        let (aa, ab) = (va.abs(), vb.abs());
        if aa > EPS && ab > EPS {
            let ma = va.signum() * aa.log10();
            let mb = vb.signum() * ab.log10();
            result += (ma - mb).abs();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: i32, y0: i32, w: i32, h: i32) -> Vec<Point2<i32>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0, y0 + h),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0 + w, y0),
        ]
    }

    fn ellipse(cx: f64, cy: f64, a: f64, b: f64, n: usize) -> Vec<Point2<i32>> {
        (0..n)
            .map(|k| {
                let t = k as f64 / n as f64 * std::f64::consts::TAU;
                Point2::new(
                    (cx + a * t.cos()).round() as i32,
                    (cy + b * t.sin()).round() as i32,
                )
            })
            .collect()
    }

    #[test]
    fn rectangle_moments_match_closed_form() {
        let r = rect(10, 20, 6, 4);
        let m = Moments::from_polygon(&r);
        assert_relative_eq!(m.m00, 24.0, epsilon = 1e-9);
        let c = m.centroid().unwrap();
        assert_relative_eq!(c.x, 13.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 22.0, epsilon = 1e-9);
        let (mu20, mu11, mu02) = m.central2().unwrap();
        assert_relative_eq!(mu20, 24.0 * 36.0 / 12.0, epsilon = 1e-6);
        assert_relative_eq!(mu02, 24.0 * 16.0 / 12.0, epsilon = 1e-6);
        assert_relative_eq!(mu11, 0.0, epsilon = 1e-6);

        let reversed: Vec<_> = r.iter().rev().copied().collect();
        assert_relative_eq!(Moments::from_polygon(&reversed).m00, 24.0, epsilon = 1e-9);
    }

    #[test]
    fn shape_distance_is_translation_and_scale_invariant() {
        let a = ellipse(400.0, 400.0, 300.0, 150.0, 720);
        let b = ellipse(1500.0, 900.0, 600.0, 300.0, 720);
        let c = rect(0, 0, 100, 10);
        assert!(match_shapes(&a, &a) < 1e-12);
        assert!(match_shapes(&a, &b) < 0.05);
        assert!(match_shapes(&a, &c) > match_shapes(&a, &b));
    }

    #[test]
    fn degenerate_polygon_has_no_centroid() {
        let line = vec![Point2::new(0, 0), Point2::new(4, 0), Point2::new(8, 0)];
        let m = Moments::from_polygon(&line);
        assert!(m.centroid().is_none());
        assert_eq!(m.hu(), [0.0; 7]);
    }
}
