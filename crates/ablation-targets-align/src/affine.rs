use nalgebra::{Matrix2x3, Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

/// 2x3 affine map `[u v]^T = M [x y 1]^T`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub m: Matrix2x3<f64>,
}

impl AffineTransform {
    pub fn new(m: Matrix2x3<f64>) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::new(Matrix2x3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0))
    }

    pub fn from_array(rows: [[f64; 3]; 2]) -> Self {
        Self::new(Matrix2x3::new(
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2],
        ))
    }

    pub fn to_array(&self) -> [[f64; 3]; 2] {
        [
            [self.m[(0, 0)], self.m[(0, 1)], self.m[(0, 2)]],
            [self.m[(1, 0)], self.m[(1, 1)], self.m[(1, 2)]],
        ]
    }

    /// Exact affine map taking `src[k]` to `dst[k]`.
    ///
    /// Returns `None` if the source points are collinear.
    pub fn from_3pt(src: &[Point2<f64>; 3], dst: &[Point2<f64>; 3]) -> Option<Self> {
        // rows [x y 1]; solve A a = u and A b = v for the two output rows
        let a = Matrix3::new(
            src[0].x, src[0].y, 1.0, src[1].x, src[1].y, 1.0, src[2].x, src[2].y, 1.0,
        );
        let lu = a.lu();
        let u = lu.solve(&Vector3::new(dst[0].x, dst[1].x, dst[2].x))?;
        let v = lu.solve(&Vector3::new(dst[0].y, dst[1].y, dst[2].y))?;
        let m = Matrix2x3::new(u[0], u[1], u[2], v[0], v[1], v[2]);
        m.iter().all(|c| c.is_finite()).then(|| Self::new(m))
    }

    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let out = self.m * Vector3::new(p.x, p.y, 1.0);
        Point2::new(out[0], out[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn three_point_fit_is_exact() {
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(20.0, 10.0),
        ];
        let t = AffineTransform::from_array([[2.0, 0.5, 3.0], [-1.0, 1.5, 7.0]]);
        let dst = src.map(|p| t.apply(p));
        let fit = AffineTransform::from_3pt(&src, &dst).expect("fit");
        for (a, b) in fit.to_array().iter().flatten().zip(t.to_array().iter().flatten()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
        let p = fit.apply(Point2::new(5.0, 5.0));
        assert_relative_eq!(p.x, 15.5, epsilon = 1e-9);
        assert_relative_eq!(p.y, 9.5, epsilon = 1e-9);
    }

    #[test]
    fn collinear_sources_are_rejected() {
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        ];
        assert!(AffineTransform::from_3pt(&src, &src).is_none());
        assert_eq!(
            AffineTransform::identity().apply(Point2::new(3.0, 4.0)),
            Point2::new(3.0, 4.0)
        );
    }
}
