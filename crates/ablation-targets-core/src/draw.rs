//! Overlay drawing on RGB buffers. Shapes are clipped to the image.

use nalgebra::Point2;

use crate::{Rgb, RgbImage};

/// Fill every pixel within `radius` of `center`.
pub fn draw_dot(image: &mut RgbImage, center: Point2<f64>, radius: f64, color: Rgb) {
    if image.width == 0 || image.height == 0 || radius < 0.0 {
        return;
    }
    let r_sq = radius * radius;
    let x_min = (center.x - radius).floor().max(0.0) as usize;
    let y_min = (center.y - radius).floor().max(0.0) as usize;
    let x_max = (center.x + radius).ceil().min(image.width as f64 - 1.0);
    let y_max = (center.y + radius).ceil().min(image.height as f64 - 1.0);
    if x_max < 0.0 || y_max < 0.0 {
        return;
    }

    for y in y_min..=y_max as usize {
        for x in x_min..=x_max as usize {
            let dx = x as f64 - center.x;
            let dy = y as f64 - center.y;
            if dx * dx + dy * dy <= r_sq {
                image.set(x, y, color);
            }
        }
    }
}

/// Draw a segment with round caps, `thickness` pixels wide.
pub fn draw_line(
    image: &mut RgbImage,
    start: Point2<f64>,
    end: Point2<f64>,
    thickness: f64,
    color: Rgb,
) {
    let half = (thickness * 0.5).max(0.5);
    let d = end - start;
    let steps = (d.norm().ceil() as usize).max(1);
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        draw_dot(image, start + d * t, half, color);
    }
}

/// Draw a closed polygon outline.
pub fn draw_polygon(image: &mut RgbImage, points: &[Point2<i32>], thickness: f64, color: Rgb) {
    let as_f64 = |p: &Point2<i32>| Point2::new(p.x as f64, p.y as f64);
    match points {
        [] => {}
        [p] => draw_dot(image, as_f64(p), (thickness * 0.5).max(0.5), color),
        _ => {
            let mut prev = as_f64(&points[points.len() - 1]);
            for p in points {
                let cur = as_f64(p);
                draw_line(image, prev, cur, thickness, color);
                prev = cur;
            }
        }
    }
}
