use ablation_targets_core::{draw_dot, fit_ellipse, Image, Rgb, RgbImage};
use ablation_targets_finder::Boundary;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Fill color of rendered spots.
pub const SPOT_COLOR: Rgb = [255, 0, 0];

/// One target point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    /// Index of the owning boundary; `None` for boundary-free strategies.
    pub region: Option<usize>,
    pub pixel: Point2<f64>,
    /// Stage coordinate, filled in once a calibration is applied.
    pub physical: Option<Point2<f64>>,
}

impl Spot {
    pub fn new(region: Option<usize>, pixel: Point2<f64>) -> Self {
        Self {
            region,
            pixel,
            physical: None,
        }
    }
}

/// Smallest fitted-ellipse minor semi-axis over `boundaries`, rounded.
///
/// Boundaries that cannot be fitted are skipped; `None` when none can.
pub fn auto_spot_size(boundaries: &[Boundary]) -> Option<u32> {
    let min_axis = boundaries
        .iter()
        .filter_map(|b| fit_ellipse(&b.points))
        .map(|e| e.semi_minor())
        .min_by(f64::total_cmp)?;
    let size = min_axis.round();
    log::debug!("auto spot size {size} (minor semi-axis {min_axis:.2})");
    Some(size.max(0.0) as u32)
}

/// Resolve the effective spot size from the auto flag and manual value.
pub fn resolve_spot_size(auto_spot: bool, manual: u32, boundaries: &[Boundary]) -> Option<u32> {
    let size = if auto_spot {
        auto_spot_size(boundaries)
    } else {
        Some(manual)
    };
    match size {
        Some(s) => log::info!("using spot size = {s}"),
        None => log::warn!("no boundary could be fitted; spot size undefined"),
    }
    size
}

/// Copy of `base` with a filled disc of radius `spot_size` at every spot.
pub fn render_spots(base: &Image, spots: &[Spot], spot_size: u32) -> RgbImage {
    let mut canvas = base.to_rgb();
    for s in spots {
        let center = Point2::new(s.pixel.x.trunc(), s.pixel.y.trunc());
        draw_dot(&mut canvas, center, spot_size as f64, SPOT_COLOR);
    }
    canvas
}
