//! Least-squares ellipse fitting on contour points.

use nalgebra::{Matrix2, Matrix6, Point2, SymmetricEigen, Vector2, Vector6};
use serde::{Deserialize, Serialize};

/// Fitted ellipse. Axis lengths are full lengths (diameters), not semi-axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point2<f64>,
    pub major_axis: f64,
    pub minor_axis: f64,
    /// Orientation of the major axis in degrees, in `[0, 180)`.
    pub angle_deg: f64,
}

impl Ellipse {
    pub fn semi_minor(&self) -> f64 {
        0.5 * self.minor_axis
    }

    pub fn semi_major(&self) -> f64 {
        0.5 * self.major_axis
    }
}

/// Translate to the centroid and scale so the mean distance is `sqrt(2)`.
fn normalize(points: &[Point2<i32>]) -> (Vec<Point2<f64>>, Point2<f64>, f64) {
    let n = points.len() as f64;
    let (mut cx, mut cy) = (0.0, 0.0);
    for p in points {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= n;
    cy /= n;

    let mut mean_dist = 0.0;
    for p in points {
        let dx = p.x as f64 - cx;
        let dy = p.y as f64 - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= n;
    let s = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    let out = points
        .iter()
        .map(|p| Point2::new((p.x as f64 - cx) * s, (p.y as f64 - cy) * s))
        .collect();
    (out, Point2::new(cx, cy), s)
}

/// Fit `A x^2 + B xy + C y^2 + D x + E y + F = 0` minimizing the algebraic
/// error under `|coeffs| = 1`, and accept it only if it is a real ellipse.
///
/// Needs at least five points; returns `None` for collinear or otherwise
/// non-elliptic point sets.
pub fn fit_ellipse(points: &[Point2<i32>]) -> Option<Ellipse> {
    if points.len() < 5 {
        return None;
    }
    let (norm, mean, s) = normalize(points);

    let mut scatter = Matrix6::<f64>::zeros();
    for p in &norm {
        let row = Vector6::new(p.x * p.x, p.x * p.y, p.y * p.y, p.x, p.y, 1.0);
        scatter += row * row.transpose();
    }

    let eig = SymmetricEigen::new(scatter);
    let (min_idx, _) = eig
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))?;
    let v = eig.eigenvectors.column(min_idx);
    let (a, b, c, d, e, f) = (v[0], v[1], v[2], v[3], v[4], v[5]);

    // coefficients are unit-norm, so this is a scale-free discriminant test
    if 4.0 * a * c - b * b <= 1e-10 {
        return None;
    }

    let quad = Matrix2::new(2.0 * a, b, b, 2.0 * c);
    let center = quad.lu().solve(&Vector2::new(-d, -e))?;
    let (x0, y0) = (center[0], center[1]);
    let f0 = a * x0 * x0 + b * x0 * y0 + c * y0 * y0 + d * x0 + e * y0 + f;

    let form = SymmetricEigen::new(Matrix2::new(a, 0.5 * b, 0.5 * b, c));
    let l0 = form.eigenvalues[0];
    let l1 = form.eigenvalues[1];
    let r0 = -f0 / l0;
    let r1 = -f0 / l1;
    if !(r0 > 0.0 && r1 > 0.0) || !r0.is_finite() || !r1.is_finite() {
        return None;
    }
    let (semi0, semi1) = (r0.sqrt(), r1.sqrt());

    let (major, minor, major_dir) = if semi0 >= semi1 {
        (semi0, semi1, form.eigenvectors.column(0))
    } else {
        (semi1, semi0, form.eigenvectors.column(1))
    };
    let mut angle = major_dir[1].atan2(major_dir[0]).to_degrees();
    if angle < 0.0 {
        angle += 180.0;
    }
    if angle >= 180.0 {
        angle -= 180.0;
    }

    Some(Ellipse {
        center: Point2::new(x0 / s + mean.x, y0 / s + mean.y),
        major_axis: 2.0 * major / s,
        minor_axis: 2.0 * minor / s,
        angle_deg: angle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sampled(cx: f64, cy: f64, a: f64, b: f64, n: usize) -> Vec<Point2<i32>> {
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
    fn recovers_axis_aligned_ellipse() {
        let pts = sampled(200.0, 150.0, 80.0, 40.0, 360);
        let el = fit_ellipse(&pts).expect("fit");
        assert_relative_eq!(el.center.x, 200.0, epsilon = 0.5);
        assert_relative_eq!(el.center.y, 150.0, epsilon = 0.5);
        assert_relative_eq!(el.major_axis, 160.0, epsilon = 1.5);
        assert_relative_eq!(el.minor_axis, 80.0, epsilon = 1.5);
        assert!(el.angle_deg < 2.0 || el.angle_deg > 178.0);
    }

    #[test]
    fn circle_has_equal_axes() {
        let pts = sampled(60.0, 60.0, 25.0, 25.0, 200);
        let el = fit_ellipse(&pts).expect("fit");
        assert_relative_eq!(el.semi_minor(), 25.0, epsilon = 0.6);
        assert_relative_eq!(el.semi_major(), 25.0, epsilon = 0.6);
    }

    #[test]
    fn rejects_too_few_or_collinear_points() {
        let few = vec![Point2::new(0, 0), Point2::new(1, 2), Point2::new(3, 1)];
        assert!(fit_ellipse(&few).is_none());
        let line: Vec<_> = (0..10).map(|i| Point2::new(i, 2 * i)).collect();
        assert!(fit_ellipse(&line).is_none());
    }
}
