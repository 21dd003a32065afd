//! Two-pass 3x3 chamfer approximation of the Euclidean distance transform.

use crate::{FloatImage, GrayImageView};

/// Axial step cost.
const A: f32 = 0.955;
/// Diagonal step cost.
const B: f32 = 1.3693;

/// Distance from every non-zero pixel to the nearest zero pixel.
///
/// Zero pixels map to `0`. Pixels outside the image are not background, so a
/// mask without any zero pixel maps entirely to `f32::MAX`.
pub fn distance_transform(mask: &GrayImageView<'_>) -> FloatImage {
    let (w, h) = (mask.width, mask.height);
    let mut out = FloatImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }
    let d: &mut [f32] = &mut out.data;
    for (dst, &v) in d.iter_mut().zip(mask.data) {
        *dst = if v == 0 { 0.0 } else { f32::MAX };
    }

    let relax = |d: &mut [f32], i: usize, j: usize, cost: f32| {
        let cand = d[j] + cost;
        if cand < d[i] {
            d[i] = cand;
        }
    };

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if d[i] == 0.0 {
                continue;
            }
            if x > 0 {
                relax(d, i, i - 1, A);
            }
            if y > 0 {
                relax(d, i, i - w, A);
                if x > 0 {
                    relax(d, i, i - w - 1, B);
                }
                if x + 1 < w {
                    relax(d, i, i - w + 1, B);
                }
            }
        }
    }

    for y in (0..h).rev() {
        for x in (0..w).rev() {
            let i = y * w + x;
            if d[i] == 0.0 {
                continue;
            }
            if x + 1 < w {
                relax(d, i, i + 1, A);
            }
            if y + 1 < h {
                relax(d, i, i + w, A);
                if x + 1 < w {
                    relax(d, i, i + w + 1, B);
                }
                if x > 0 {
                    relax(d, i, i + w - 1, B);
                }
            }
        }
    }

    out
}
