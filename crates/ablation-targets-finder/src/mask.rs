//! Mask computation of each finder variant.

use ablation_targets_core::{
    adaptive_threshold, gaussian_blur, in_range, median_blur, odd_kernel, open, otsu_threshold,
    threshold_binary, Border, GrayImage, GrayImageView,
};

use crate::params::{AdaptiveParams, OtsuParams, ThresholdParams};

pub fn threshold_mask(gray: &GrayImageView<'_>, params: &ThresholdParams) -> GrayImage {
    let smoothed;
    let src = if params.smooth {
        smoothed = median_blur(gray, odd_kernel(params.smooth_size));
        smoothed.view()
    } else {
        *gray
    };
    let mask = in_range(&src, params.lower, params.upper);
    if params.open {
        open(&mask.view(), odd_kernel(params.kernel_size))
    } else {
        mask
    }
}

pub fn adaptive_mask(gray: &GrayImageView<'_>, params: &AdaptiveParams) -> GrayImage {
    let smoothed = median_blur(gray, AdaptiveParams::MEDIAN_SIZE);
    let mask = adaptive_threshold(
        &smoothed.view(),
        params.method,
        odd_kernel(params.block_size.max(3)),
        params.c,
    );
    open(&mask.view(), AdaptiveParams::OPEN_SIZE)
}

pub fn otsu_mask(gray: &GrayImageView<'_>, params: &OtsuParams) -> GrayImage {
    let blurred = gaussian_blur(gray, odd_kernel(params.blur_size), Border::Reflect101);
    let level = otsu_threshold(&blurred.view());
    log::debug!("otsu level {level}");
    threshold_binary(&blurred.view(), level)
}
