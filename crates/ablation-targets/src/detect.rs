//! `image` crate interop: loading micrographs and converting buffers.

use std::path::Path;

use ablation_targets_align::{AlignmentMetadata, SourcePair};
use ablation_targets_core::{GrayImage, Image, RgbImage};
use image::{DynamicImage, ImageReader};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{PipelineError, Workbench};

/// Convert an `image::GrayImage` into the core buffer.
pub fn gray_from_image(img: &::image::GrayImage) -> GrayImage {
    GrayImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Convert an `image::RgbImage` into the core buffer.
pub fn rgb_from_image(img: &::image::RgbImage) -> RgbImage {
    RgbImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Convert a core RGB buffer (e.g. a rendered overlay) for saving.
pub fn rgb_to_image(img: &RgbImage) -> Option<::image::RgbImage> {
    ::image::RgbImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
}

pub fn gray_to_image(img: &GrayImage) -> Option<::image::GrayImage> {
    ::image::GrayImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
}

/// Single-channel inputs stay gray; everything else is reduced to RGB8.
pub fn from_dynamic(img: &DynamicImage) -> Image {
    match img {
        DynamicImage::ImageLuma8(g) => gray_from_image(g).into(),
        DynamicImage::ImageLuma16(_) => gray_from_image(&img.to_luma8()).into(),
        _ => rgb_from_image(&img.to_rgb8()).into(),
    }
}

#[cfg_attr(feature = "tracing", instrument(level = "info", skip(path)))]
pub fn load_image(path: impl AsRef<Path>) -> Result<Image, ::image::ImageError> {
    let img = ImageReader::open(path)?.decode()?;
    log::debug!("loaded {}x{} {:?}", img.width(), img.height(), img.color());
    Ok(from_dynamic(&img))
}

impl Workbench {
    /// Load the micrograph paired with `path` and make it the current source.
    ///
    /// `path` may name the image or its `.align` file; `metadata` holds the
    /// already parsed alignment fields.
    pub fn open(
        &mut self,
        path: impl AsRef<Path>,
        metadata: AlignmentMetadata,
    ) -> Result<SourcePair, PipelineError> {
        let loaded = SourcePair::resolve(path)
            .map_err(PipelineError::from)
            .and_then(|pair| Ok((load_image(&pair.image)?, pair)));
        let (image, pair) = match loaded {
            Ok(found) => found,
            Err(e) => {
                self.clear_source();
                return Err(e);
            }
        };
        self.set_source(image, Some(metadata))?;
        Ok(pair)
    }
}
