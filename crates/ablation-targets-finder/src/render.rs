use ablation_targets_core::{draw_polygon, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::boundaries::Boundary;

/// Outline thickness of rendered boundaries.
pub const BOUNDARY_THICKNESS: f64 = 8.0;

/// White `width x height` canvas with each boundary outlined in a color drawn
/// from a generator seeded with `seed`. Equal seeds give equal images.
pub fn render_boundaries(width: usize, height: usize, boundaries: &[Boundary], seed: u64) -> RgbImage {
    let mut canvas = RgbImage::filled(width, height, [255, 255, 255]);
    let mut rng = StdRng::seed_from_u64(seed);
    for b in boundaries {
        let color: Rgb = [
            rng.random_range(0..255),
            rng.random_range(0..255),
            rng.random_range(0..255),
        ];
        draw_polygon(&mut canvas, &b.points, BOUNDARY_THICKNESS, color);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundaries::BoundaryDescriptor;
    use nalgebra::Point2;

    fn square(x0: i32, side: i32) -> Boundary {
        Boundary {
            contour_index: 0,
            points: vec![
                Point2::new(x0, 10),
                Point2::new(x0, 10 + side),
                Point2::new(x0 + side, 10 + side),
                Point2::new(x0 + side, 10),
            ],
            descriptor: BoundaryDescriptor::default(),
        }
    }

    #[test]
    fn same_seed_same_overlay() {
        let bounds = [square(10, 40), square(70, 40)];
        let a = render_boundaries(128, 64, &bounds, 7);
        let b = render_boundaries(128, 64, &bounds, 7);
        assert_eq!(a, b);
        assert_eq!(a.get(0, 0), [255, 255, 255]);
        assert_eq!(a.get(30, 30), [255, 255, 255]);
        assert_ne!(a.get(10, 30), [255, 255, 255]);
    }
}
