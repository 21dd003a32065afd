//! Rectangular-kernel morphology.
//!
//! The kernel anchor is its center (`ksize / 2`). Pixels outside the image do
//! not participate, so borders never erode or dilate by themselves.

use crate::{FloatImage, GrayImage, GrayImageView};

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

/// 1-D running extremum along rows then columns (square kernels are separable).
fn separable_extremum<T: Copy + PartialOrd>(
    data: &[T],
    width: usize,
    height: usize,
    ksize: usize,
    op: Extremum,
) -> Vec<T> {
    let lo = (ksize / 2) as isize;
    let hi = ksize as isize - 1 - lo;
    let pick = |a: T, b: T| -> T {
        match op {
            Extremum::Min => {
                if b < a {
                    b
                } else {
                    a
                }
            }
            Extremum::Max => {
                if b > a {
                    b
                } else {
                    a
                }
            }
        }
    };

    let mut tmp = data.to_vec();
    for y in 0..height {
        let row = &data[y * width..(y + 1) * width];
        for x in 0..width {
            let x0 = (x as isize - lo).max(0) as usize;
            let x1 = ((x as isize + hi) as usize).min(width - 1);
            let mut acc = row[x0];
            for &v in &row[x0 + 1..=x1] {
                acc = pick(acc, v);
            }
            tmp[y * width + x] = acc;
        }
    }

    let mut out = tmp.clone();
    for y in 0..height {
        let y0 = (y as isize - lo).max(0) as usize;
        let y1 = ((y as isize + hi) as usize).min(height - 1);
        for x in 0..width {
            let mut acc = tmp[y0 * width + x];
            for yy in y0 + 1..=y1 {
                acc = pick(acc, tmp[yy * width + x]);
            }
            out[y * width + x] = acc;
        }
    }
    out
}

pub fn erode(src: &GrayImageView<'_>, ksize: u32) -> GrayImage {
    morph_u8(src, ksize, Extremum::Min)
}

pub fn dilate(src: &GrayImageView<'_>, ksize: u32) -> GrayImage {
    morph_u8(src, ksize, Extremum::Max)
}

fn morph_u8(src: &GrayImageView<'_>, ksize: u32, op: Extremum) -> GrayImage {
    if src.width == 0 || src.height == 0 || ksize <= 1 {
        return GrayImage {
            width: src.width,
            height: src.height,
            data: src.data.to_vec(),
        };
    }
    GrayImage {
        width: src.width,
        height: src.height,
        data: separable_extremum(src.data, src.width, src.height, ksize as usize, op),
    }
}

/// Morphological opening (erode, then dilate) with a `ksize x ksize` square.
pub fn open(src: &GrayImageView<'_>, ksize: u32) -> GrayImage {
    let eroded = erode(src, ksize);
    dilate(&eroded.view(), ksize)
}

/// Grayscale dilation of a float map with a `ksize x ksize` square.
pub fn dilate_f32(src: &FloatImage, ksize: u32) -> FloatImage {
    if src.width == 0 || src.height == 0 || ksize <= 1 {
        return src.clone();
    }
    FloatImage {
        width: src.width,
        height: src.height,
        data: separable_extremum(
            &src.data,
            src.width,
            src.height,
            ksize as usize,
            Extremum::Max,
        ),
    }
}
