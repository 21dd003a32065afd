//! Global, band and local thresholding into `{0, 255}` masks.

use serde::{Deserialize, Serialize};

use crate::filter::{box_mean, gaussian_blur, Border};
use crate::{GrayImage, GrayImageView};

/// Foreground value written into binary masks.
pub const FOREGROUND: u8 = 255;

fn map_pixels(src: &GrayImageView<'_>, f: impl Fn(u8) -> bool) -> GrayImage {
    GrayImage {
        width: src.width,
        height: src.height,
        data: src
            .data
            .iter()
            .map(|&v| if f(v) { FOREGROUND } else { 0 })
            .collect(),
    }
}

/// Band-pass: foreground where `lower <= v <= upper`.
pub fn in_range(src: &GrayImageView<'_>, lower: u8, upper: u8) -> GrayImage {
    map_pixels(src, |v| v >= lower && v <= upper)
}

/// Foreground where `v > thresh`.
pub fn threshold_binary(src: &GrayImageView<'_>, thresh: u8) -> GrayImage {
    map_pixels(src, |v| v > thresh)
}

/// Otsu threshold of the full image histogram.
///
/// Returns the level maximizing between-class variance; flat images return
/// their single value.
pub fn otsu_threshold(src: &GrayImageView<'_>) -> u8 {
    let mut hist = [0u32; 256];
    for &v in src.data {
        hist[v as usize] += 1;
    }
    otsu_threshold_from_histogram(&hist)
}

pub fn otsu_threshold_from_histogram(hist: &[u32; 256]) -> u8 {
    let total: f64 = hist.iter().map(|&h| h as f64).sum();
    if total < 1.0 {
        return 0;
    }

    let mut sum_total = 0f64;
    for (i, &h) in hist.iter().enumerate() {
        sum_total += (i as f64) * (h as f64);
    }

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = hist.iter().position(|&h| h > 0).unwrap_or(0) as u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += (t as f64) * (h as f64);
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

/// Neighborhood statistic used by [`adaptive_threshold`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveMethod {
    #[default]
    Mean,
    Gaussian,
}

/// Local thresholding: foreground where `v > local_stat - c`.
///
/// `block_size` is the (odd) neighborhood side; the local statistic is
/// rounded to 8 bits before comparison.
pub fn adaptive_threshold(
    src: &GrayImageView<'_>,
    method: AdaptiveMethod,
    block_size: u32,
    c: i32,
) -> GrayImage {
    let local = match method {
        AdaptiveMethod::Mean => box_mean(src, block_size, Border::Replicate),
        AdaptiveMethod::Gaussian => gaussian_blur(src, block_size, Border::Replicate),
    };
    GrayImage {
        width: src.width,
        height: src.height,
        data: src
            .data
            .iter()
            .zip(&local.data)
            .map(|(&v, &m)| {
                if v as i32 > m as i32 - c {
                    FOREGROUND
                } else {
                    0
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_is_inclusive() {
        let img = GrayImage::from_vec(5, 1, vec![169, 170, 200, 230, 231]).unwrap();
        let m = in_range(&img.view(), 170, 230);
        assert_eq!(m.data, vec![0, 255, 255, 255, 0]);
    }

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let mut data = vec![30u8; 60];
        data.extend(vec![200u8; 40]);
        data[0] = 35;
        data[99] = 190;
        let img = GrayImage::from_vec(10, 10, data).unwrap();
        let t = otsu_threshold(&img.view());
        assert!((35..190).contains(&t), "threshold {t}");
        let mask = threshold_binary(&img.view(), t);
        assert_eq!(mask.count_nonzero(), 40);
    }

    #[test]
    fn otsu_on_flat_image_selects_nothing() {
        let img = GrayImage::from_vec(4, 4, vec![90u8; 16]).unwrap();
        let t = otsu_threshold(&img.view());
        assert_eq!(t, 90);
        assert_eq!(threshold_binary(&img.view(), t).count_nonzero(), 0);
    }

    #[test]
    fn adaptive_threshold_marks_local_bright_spot() {
        let mut img = GrayImage::from_vec(9, 9, vec![50u8; 81]).unwrap();
        img.set(4, 4, 120);
        let m = adaptive_threshold(&img.view(), AdaptiveMethod::Mean, 3, 2);
        assert_eq!(m.get(4, 4), 255);
        // flat surroundings sit exactly at the mean, which is above mean - c
        assert_eq!(m.get(0, 0), 255);
        let strict = adaptive_threshold(&img.view(), AdaptiveMethod::Gaussian, 3, -5);
        assert_eq!(strict.get(4, 4), 255);
        assert_eq!(strict.get(0, 0), 0);
    }
}
