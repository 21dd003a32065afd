//! Closed-polygon measurements on integer pixel coordinates.

use nalgebra::Point2;

/// Shoelace area, positive for counter-clockwise vertices in a `y`-up frame.
pub fn signed_area(points: &[Point2<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    let mut prev = points[points.len() - 1];
    for &p in points {
        acc += prev.x as i64 * p.y as i64 - p.x as i64 * prev.y as i64;
        prev = p;
    }
    acc as f64 * 0.5
}

pub fn area(points: &[Point2<i32>]) -> f64 {
    signed_area(points).abs()
}

/// Polyline length; `closed` adds the segment from the last point to the first.
pub fn arc_length(points: &[Point2<i32>], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let seg = |a: Point2<i32>, b: Point2<i32>| {
        let dx = (b.x - a.x) as f64;
        let dy = (b.y - a.y) as f64;
        (dx * dx + dy * dy).sqrt()
    };
    let mut len: f64 = points.windows(2).map(|w| seg(w[0], w[1])).sum();
    if closed {
        len += seg(points[points.len() - 1], points[0]);
    }
    len
}

#[inline]
fn cross(o: Point2<i32>, a: Point2<i32>, b: Point2<i32>) -> i64 {
    (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
}

/// Convex hull (monotone chain) without collinear vertices.
pub fn convex_hull(points: &[Point2<i32>]) -> Vec<Point2<i32>> {
    let mut pts: Vec<Point2<i32>> = points.to_vec();
    pts.sort_by(|a, b| a.x.cmp(&b.x).then(a.y.cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point2<i32>> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point2<i32>> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Where a point lies relative to a closed polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointLocation {
    Inside,
    OnEdge,
    Outside,
}

fn segment_distance(p: Point2<f64>, a: Point2<i32>, b: Point2<i32>) -> f64 {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let (vx, vy) = (bx - ax, by - ay);
    let (wx, wy) = (p.x - ax, p.y - ay);
    let len2 = vx * vx + vy * vy;
    let t = if len2 > 0.0 {
        ((wx * vx + wy * vy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (dx, dy) = (wx - t * vx, wy - t * vy);
    (dx * dx + dy * dy).sqrt()
}

/// Classify `p` against the polygon and measure its distance to the nearest
/// edge.
pub fn locate_point(points: &[Point2<i32>], p: Point2<f64>) -> (PointLocation, f64) {
    if points.is_empty() {
        return (PointLocation::Outside, f64::INFINITY);
    }
    let mut min_dist = f64::INFINITY;
    let mut inside = false;
    let n = points.len();
    for i in 0..n {
        let a = points[(i + n - 1) % n];
        let b = points[i];
        min_dist = min_dist.min(segment_distance(p, a, b));

        let (ay, by) = (a.y as f64, b.y as f64);
        if (ay > p.y) != (by > p.y) {
            let x_cross = a.x as f64 + (p.y - ay) * (b.x - a.x) as f64 / (by - ay);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }

    if min_dist <= 1e-9 {
        (PointLocation::OnEdge, 0.0)
    } else if inside {
        (PointLocation::Inside, min_dist)
    } else {
        (PointLocation::Outside, min_dist)
    }
}

/// Signed distance from `p` to the polygon: positive inside, negative
/// outside, zero on an edge.
pub fn signed_distance(points: &[Point2<i32>], p: Point2<f64>) -> f64 {
    match locate_point(points, p) {
        (PointLocation::Inside, d) => d,
        (PointLocation::OnEdge, _) => 0.0,
        (PointLocation::Outside, d) => -d,
    }
}
