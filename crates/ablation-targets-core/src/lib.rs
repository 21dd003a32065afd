//! Raster and geometry primitives shared by the grain targeting crates.
//!
//! Everything here works on plain 8-bit buffers and integer pixel polygons;
//! no decoder or external vision library is involved. The finder, targeter
//! and alignment crates build on these pieces.

mod contour;
mod distance;
mod draw;
mod ellipse;
mod filter;
mod image;
mod logger;
mod moments;
mod morph;
pub mod polygon;
mod settings;
mod threshold;

pub use contour::{find_contours, Contour};
pub use distance::distance_transform;
pub use draw::{draw_dot, draw_line, draw_polygon};
pub use ellipse::{fit_ellipse, Ellipse};
pub use filter::{box_mean, gaussian_blur, gaussian_sigma_for, median_blur, odd_kernel, Border};
pub use image::{FloatImage, GrayImage, GrayImageView, Image, ImageError, RgbImage};
pub use moments::{match_shapes, Moments, NormalizedMoments};
pub use morph::{dilate, dilate_f32, erode, open};
pub use polygon::PointLocation;
pub use settings::{Configurable, SettingKind, SettingSpec, SettingValue, SettingsError};
pub use threshold::{
    adaptive_threshold, in_range, otsu_threshold, otsu_threshold_from_histogram,
    threshold_binary, AdaptiveMethod, FOREGROUND,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

/// Pixel color used by overlay renderers.
pub type Rgb = [u8; 3];
