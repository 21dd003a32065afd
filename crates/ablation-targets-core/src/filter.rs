//! Smoothing filters on 8-bit gray images.

use crate::{GrayImage, GrayImageView};

/// Out-of-image sampling rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Border {
    /// `aaa|abcd|ddd`
    Replicate,
    /// `cb|abcd|cb`
    Reflect101,
}

#[inline]
pub(crate) fn border_index(i: isize, n: usize, border: Border) -> usize {
    let last = n as isize - 1;
    if (0..=last).contains(&i) {
        return i as usize;
    }
    match border {
        Border::Replicate => i.clamp(0, last) as usize,
        Border::Reflect101 => {
            if last == 0 {
                return 0;
            }
            let period = 2 * last;
            let mut j = i.rem_euclid(period);
            if j > last {
                j = period - j;
            }
            j as usize
        }
    }
}

/// Force a kernel size to the next odd value (`4 -> 5`, `5 -> 5`).
#[inline]
pub fn odd_kernel(size: u32) -> u32 {
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Median filter over a `ksize x ksize` window with replicated borders.
///
/// `ksize` is forced odd. Runs a sliding 256-bin histogram along each row.
pub fn median_blur(src: &GrayImageView<'_>, ksize: u32) -> GrayImage {
    let k = odd_kernel(ksize.max(1)) as isize;
    let r = k / 2;
    let (w, h) = (src.width, src.height);
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }
    let half = ((k * k) / 2 + 1) as u32;

    for y in 0..h {
        let rows: Vec<usize> = (-r..=r)
            .map(|dy| border_index(y as isize + dy, h, Border::Replicate))
            .collect();
        let mut hist = [0u32; 256];
        for dx in -r..=r {
            let xx = border_index(dx, w, Border::Replicate);
            for &yy in &rows {
                hist[src.get(xx, yy) as usize] += 1;
            }
        }
        out.set(0, y, hist_rank(&hist, half));

        for x in 1..w {
            let x_out = border_index(x as isize - r - 1, w, Border::Replicate);
            let x_in = border_index(x as isize + r, w, Border::Replicate);
            for &yy in &rows {
                hist[src.get(x_out, yy) as usize] -= 1;
                hist[src.get(x_in, yy) as usize] += 1;
            }
            out.set(x, y, hist_rank(&hist, half));
        }
    }
    out
}

#[inline]
fn hist_rank(hist: &[u32; 256], rank: u32) -> u8 {
    let mut acc = 0u32;
    for (v, &c) in hist.iter().enumerate() {
        acc += c;
        if acc >= rank {
            return v as u8;
        }
    }
    255
}

/// Gaussian sigma derived from the kernel size when none is given.
#[inline]
pub fn gaussian_sigma_for(ksize: u32) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

fn gaussian_kernel(ksize: u32) -> Vec<f64> {
    let k = ksize as usize;
    let sigma = gaussian_sigma_for(ksize);
    let c = (k / 2) as f64;
    let mut kernel: Vec<f64> = (0..k)
        .map(|i| {
            let d = i as f64 - c;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Separable convolution of `src` with the same 1-D `kernel` along x and y.
fn convolve_separable(src: &GrayImageView<'_>, kernel: &[f64], border: Border) -> Vec<f64> {
    let (w, h) = (src.width, src.height);
    let r = (kernel.len() / 2) as isize;
    let mut tmp = vec![0.0f64; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (t, &kv) in kernel.iter().enumerate() {
                let xx = border_index(x as isize + t as isize - r, w, border);
                acc += kv * src.get(xx, y) as f64;
            }
            tmp[y * w + x] = acc;
        }
    }
    let mut out = vec![0.0f64; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0;
            for (t, &kv) in kernel.iter().enumerate() {
                let yy = border_index(y as isize + t as isize - r, h, border);
                acc += kv * tmp[yy * w + x];
            }
            out[y * w + x] = acc;
        }
    }
    out
}

fn round_to_u8(values: Vec<f64>, width: usize, height: usize) -> GrayImage {
    GrayImage {
        width,
        height,
        data: values
            .into_iter()
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
            .collect(),
    }
}

/// Gaussian blur with a `ksize x ksize` kernel; `ksize` is forced odd and the
/// sigma follows [`gaussian_sigma_for`].
pub fn gaussian_blur(src: &GrayImageView<'_>, ksize: u32, border: Border) -> GrayImage {
    let k = odd_kernel(ksize.max(1));
    let kernel = gaussian_kernel(k);
    round_to_u8(
        convolve_separable(src, &kernel, border),
        src.width,
        src.height,
    )
}

/// Normalized box filter over a `ksize x ksize` window.
pub fn box_mean(src: &GrayImageView<'_>, ksize: u32, border: Border) -> GrayImage {
    let k = ksize.max(1) as usize;
    let kernel = vec![1.0 / k as f64; k];
    round_to_u8(
        convolve_separable(src, &kernel, border),
        src.width,
        src.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(w: usize, h: usize, data: Vec<u8>) -> GrayImage {
        GrayImage::from_vec(w, h, data).expect("valid image")
    }

    #[test]
    fn border_index_modes() {
        assert_eq!(border_index(-1, 5, Border::Replicate), 0);
        assert_eq!(border_index(6, 5, Border::Replicate), 4);
        assert_eq!(border_index(-1, 5, Border::Reflect101), 1);
        assert_eq!(border_index(-2, 5, Border::Reflect101), 2);
        assert_eq!(border_index(5, 5, Border::Reflect101), 3);
        assert_eq!(border_index(3, 1, Border::Reflect101), 0);
    }

    #[test]
    fn median_removes_salt_noise() {
        let mut data = vec![10u8; 49];
        data[24] = 255;
        data[3] = 0;
        let out = median_blur(&image(7, 7, data).view(), 3);
        assert!(out.data.iter().all(|&v| v == 10));
    }

    #[test]
    fn even_median_kernel_is_forced_odd() {
        let mut data = vec![0u8; 25];
        data[12] = 200;
        let a = median_blur(&image(5, 5, data.clone()).view(), 2);
        let b = median_blur(&image(5, 5, data).view(), 3);
        assert_eq!(a, b);
    }

    #[test]
    fn gaussian_preserves_constant_image() {
        let img = image(9, 6, vec![77u8; 54]);
        let out = gaussian_blur(&img.view(), 5, Border::Reflect101);
        assert!(out.data.iter().all(|&v| v == 77));
    }

    #[test]
    fn box_mean_averages_step() {
        let data = vec![0, 0, 90, 90, 90, 0, 0, 90, 90, 90];
        let out = box_mean(&image(5, 2, data).view(), 3, Border::Replicate);
        assert_eq!(out.get(1, 0), 30);
        assert_eq!(out.get(2, 0), 60);
        assert_eq!(out.get(4, 1), 90);
    }
}
