//! Border following with full parent/child hierarchy (Suzuki & Abe, 1985).
//!
//! Every non-zero mask pixel is foreground. The traced point sequences run
//! through the centers of border pixels, are closed implicitly (the last
//! point connects back to the first) and contain every border pixel
//! (no chain compression).

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::polygon;
use crate::GrayImageView;

/// 8-neighborhood, counter-clockwise on screen starting east (`y` grows down).
const DIRS: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One traced border.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Ordered, closed sequence of pixel coordinates.
    pub points: Vec<Point2<i32>>,
    /// Index of the directly enclosing contour, `None` for root-level borders.
    pub parent: Option<usize>,
    /// `true` for the border of a hole inside a region.
    pub is_hole: bool,
}

impl Contour {
    pub fn from_points(points: Vec<Point2<i32>>) -> Self {
        Self {
            points,
            parent: None,
            is_hole: false,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Enclosed polygon area (unsigned).
    pub fn area(&self) -> f64 {
        polygon::area(&self.points)
    }

    /// Closed polygon length.
    pub fn perimeter(&self) -> f64 {
        polygon::arc_length(&self.points, true)
    }
}

struct BorderInfo {
    is_hole: bool,
    contour: Option<usize>,
    parent: Option<usize>,
}

struct Tracer {
    labels: Vec<i32>,
    stride: usize,
}

impl Tracer {
    #[inline]
    fn at(&self, x: i32, y: i32) -> i32 {
        self.labels[y as usize * self.stride + x as usize]
    }

    #[inline]
    fn put(&mut self, x: i32, y: i32, v: i32) {
        self.labels[y as usize * self.stride + x as usize] = v;
    }

    fn dir_between(from: (i32, i32), to: (i32, i32)) -> usize {
        let d = (to.0 - from.0, to.1 - from.1);
        DIRS.iter().position(|&v| v == d).unwrap_or(0)
    }

    #[inline]
    fn step(p: (i32, i32), dir: usize) -> (i32, i32) {
        (p.0 + DIRS[dir].0, p.1 + DIRS[dir].1)
    }

    /// Follow the border starting at `start`, entered from the zero pixel `from`.
    /// Returns points in padded coordinates.
    fn follow(&mut self, start: (i32, i32), from: (i32, i32), nbd: i32) -> Vec<(i32, i32)> {
        let from_dir = Self::dir_between(start, from);
        let first = (0..8)
            .map(|k| (from_dir + 8 - k) % 8)
            .map(|d| Self::step(start, d))
            .find(|&q| self.at(q.0, q.1) != 0);

        let Some(first) = first else {
            self.put(start.0, start.1, -nbd);
            return vec![start];
        };

        let mut points = Vec::new();
        let mut prev = first;
        let mut cur = start;
        loop {
            let back = Self::dir_between(cur, prev);
            let mut east_zero = false;
            let mut next = prev;
            for k in 1..=8 {
                let d = (back + k) % 8;
                let q = Self::step(cur, d);
                if self.at(q.0, q.1) != 0 {
                    next = q;
                    break;
                }
                if d == 0 {
                    east_zero = true;
                }
            }

            if east_zero {
                self.put(cur.0, cur.1, -nbd);
            } else if self.at(cur.0, cur.1) == 1 {
                self.put(cur.0, cur.1, nbd);
            }
            points.push(cur);

            if next == start && cur == first {
                break;
            }
            prev = cur;
            cur = next;
        }
        points
    }
}

/// Trace all borders of `mask` (outer borders and hole borders) together with
/// their enclosure hierarchy. Contours are returned in raster discovery order.
pub fn find_contours(mask: &GrayImageView<'_>) -> Vec<Contour> {
    let (w, h) = (mask.width, mask.height);
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let stride = w + 2;
    let mut labels = vec![0i32; stride * (h + 2)];
    for y in 0..h {
        for x in 0..w {
            if mask.get(x, y) != 0 {
                labels[(y + 1) * stride + x + 1] = 1;
            }
        }
    }
    let mut tracer = Tracer { labels, stride };

    // nbd 1 is the image frame, which behaves as a hole border.
    let mut borders = vec![
        BorderInfo {
            is_hole: true,
            contour: None,
            parent: None,
        },
        BorderInfo {
            is_hole: true,
            contour: None,
            parent: None,
        },
    ];
    let mut contours = Vec::new();
    let mut nbd = 1i32;

    for y in 1..=h as i32 {
        let mut lnbd = 1i32;
        for x in 1..=w as i32 {
            let v = tracer.at(x, y);
            if v == 0 {
                continue;
            }

            let start = if v == 1 && tracer.at(x - 1, y) == 0 {
                Some((false, (x - 1, y)))
            } else if v >= 1 && tracer.at(x + 1, y) == 0 {
                if v > 1 {
                    lnbd = v;
                }
                Some((true, (x + 1, y)))
            } else {
                None
            };

            if let Some((is_hole, from)) = start {
                nbd += 1;
                let outer = &borders[lnbd as usize];
                let parent = if is_hole == outer.is_hole {
                    outer.parent
                } else {
                    outer.contour
                };

                let traced = tracer.follow((x, y), from, nbd);
                let points = traced
                    .into_iter()
                    .map(|(px, py)| Point2::new(px - 1, py - 1))
                    .collect();

                borders.push(BorderInfo {
                    is_hole,
                    contour: Some(contours.len()),
                    parent,
                });
                contours.push(Contour {
                    points,
                    parent,
                    is_hole,
                });
            }

            let v = tracer.at(x, y);
            if v != 1 {
                lnbd = v.abs();
            }
        }
    }

    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrayImage;

    fn rect_mask(w: usize, h: usize, rects: &[(usize, usize, usize, usize, u8)]) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for &(x0, y0, x1, y1, v) in rects {
            for y in y0..y1 {
                for x in x0..x1 {
                    img.set(x, y, v);
                }
            }
        }
        img
    }

    #[test]
    fn filled_square_has_one_root_border() {
        let img = rect_mask(12, 12, &[(2, 3, 8, 9, 255)]);
        let contours = find_contours(&img.view());
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert!(c.is_root());
        assert!(!c.is_hole);
        // border pixels of a 6x6 block
        assert_eq!(c.points.len(), 20);
        assert_eq!(c.points[0], Point2::new(2, 3));
        assert!((c.area() - 25.0).abs() < 1e-9);
        assert!((c.perimeter() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn ring_yields_outer_hole_and_island_tree() {
        let img = rect_mask(
            30,
            30,
            &[(2, 2, 28, 28, 255), (8, 8, 22, 22, 0), (12, 12, 18, 18, 255)],
        );
        let contours = find_contours(&img.view());
        assert_eq!(contours.len(), 3);

        let outer = contours.iter().position(|c| c.parent.is_none()).unwrap();
        let hole = contours.iter().position(|c| c.is_hole).unwrap();
        let island = contours
            .iter()
            .position(|c| !c.is_hole && c.parent.is_some())
            .unwrap();
        assert_eq!(contours[hole].parent, Some(outer));
        assert_eq!(contours[island].parent, Some(hole));
    }

    #[test]
    fn separate_blobs_and_single_pixels_are_roots() {
        let mut img = rect_mask(20, 10, &[(1, 1, 5, 5, 255), (10, 2, 16, 8, 255)]);
        img.set(18, 8, 255);
        let contours = find_contours(&img.view());
        assert_eq!(contours.len(), 3);
        assert!(contours.iter().all(|c| c.is_root() && !c.is_hole));
        let single = contours.iter().find(|c| c.points.len() == 1).unwrap();
        assert_eq!(single.points[0], Point2::new(18, 8));
        assert_eq!(single.area(), 0.0);
    }

    #[test]
    fn region_touching_image_border_is_traced() {
        let img = rect_mask(6, 6, &[(0, 0, 6, 6, 255)]);
        let contours = find_contours(&img.view());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 20);
    }
}
