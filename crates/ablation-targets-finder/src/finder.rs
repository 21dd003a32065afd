use ablation_targets_core::{
    Configurable, GrayImage, Image, SettingSpec, SettingValue, SettingsError,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::boundaries::{extract_boundaries, Boundary};
use crate::filters::FilterConfig;
use crate::mask::{adaptive_mask, otsu_mask, threshold_mask};
use crate::params::{AdaptiveParams, OtsuParams, ThresholdParams};

/// Finder variant selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderKind {
    #[default]
    Threshold,
    Adaptive,
    Otsu,
}

impl FinderKind {
    pub const ALL: [FinderKind; 3] = [FinderKind::Threshold, FinderKind::Adaptive, FinderKind::Otsu];

    /// Human readable name for variant pickers.
    pub fn label(self) -> &'static str {
        match self {
            FinderKind::Threshold => "Smoothed Thresholding",
            FinderKind::Adaptive => "Adaptive Thresholding",
            FinderKind::Otsu => "Otsu Thresholding",
        }
    }
}

/// Settings of the active variant. Each value owns its own copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinderParams {
    Threshold(ThresholdParams),
    Adaptive(AdaptiveParams),
    Otsu(OtsuParams),
}

impl Default for FinderParams {
    fn default() -> Self {
        FinderParams::Threshold(ThresholdParams::default())
    }
}

impl From<FinderKind> for FinderParams {
    fn from(kind: FinderKind) -> Self {
        match kind {
            FinderKind::Threshold => FinderParams::Threshold(ThresholdParams::default()),
            FinderKind::Adaptive => FinderParams::Adaptive(AdaptiveParams::default()),
            FinderKind::Otsu => FinderParams::Otsu(OtsuParams::default()),
        }
    }
}

impl FinderParams {
    pub fn kind(&self) -> FinderKind {
        match self {
            FinderParams::Threshold(_) => FinderKind::Threshold,
            FinderParams::Adaptive(_) => FinderKind::Adaptive,
            FinderParams::Otsu(_) => FinderKind::Otsu,
        }
    }

    fn settings(&self) -> &dyn Configurable {
        match self {
            FinderParams::Threshold(p) => p,
            FinderParams::Adaptive(p) => p,
            FinderParams::Otsu(p) => p,
        }
    }

    fn settings_mut(&mut self) -> &mut dyn Configurable {
        match self {
            FinderParams::Threshold(p) => p,
            FinderParams::Adaptive(p) => p,
            FinderParams::Otsu(p) => p,
        }
    }

    /// Binarize `image` with the current settings. Foreground is 255.
    pub fn compute_mask(&self, image: &Image) -> GrayImage {
        let gray = image.to_gray();
        let view = gray.view();
        match self {
            FinderParams::Threshold(p) => threshold_mask(&view, p),
            FinderParams::Adaptive(p) => adaptive_mask(&view, p),
            FinderParams::Otsu(p) => otsu_mask(&view, p),
        }
    }
}

/// Mask and accepted boundaries of one finder run.
#[derive(Clone, Debug, PartialEq)]
pub struct FinderOutput {
    pub mask: GrayImage,
    pub boundaries: Vec<Boundary>,
}

/// A finder variant with its own settings and cached output.
///
/// Setting changes and [`BoundaryFinder::invalidate`] mark the cache dirty;
/// [`BoundaryFinder::run`] recomputes only when dirty.
#[derive(Clone, Debug, Default)]
pub struct BoundaryFinder {
    params: FinderParams,
    filters: FilterConfig,
    cache: Option<FinderOutput>,
}

impl BoundaryFinder {
    pub fn new(params: FinderParams) -> Self {
        Self {
            params,
            filters: FilterConfig::default(),
            cache: None,
        }
    }

    pub fn with_filters(mut self, filters: FilterConfig) -> Self {
        self.filters = filters;
        self
    }

    pub fn kind(&self) -> FinderKind {
        self.params.kind()
    }

    pub fn params(&self) -> &FinderParams {
        &self.params
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    /// Replace the reported filter windows. Extraction output is unaffected.
    pub fn set_filters(&mut self, filters: FilterConfig) {
        self.filters = filters;
    }

    pub fn schema(&self) -> Vec<SettingSpec> {
        self.params.settings().schema()
    }

    pub fn value(&self, key: &str) -> Option<SettingValue> {
        self.params.settings().value(key)
    }

    /// Validate and store one option, then mark the cache dirty.
    pub fn set_setting(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.params.settings_mut().set_setting(key, value)?;
        log::debug!("{:?} setting `{key}` changed", self.kind());
        self.invalidate();
        Ok(())
    }

    /// Text variant of [`BoundaryFinder::set_setting`].
    pub fn set_setting_str(&mut self, key: &str, raw: &str) -> Result<(), SettingsError> {
        self.params.settings_mut().set_setting_str(key, raw)?;
        self.invalidate();
        Ok(())
    }

    /// Tie image-dependent ranges (adaptive block size) to `image`.
    pub fn bind_image(&mut self, image: &Image) {
        if let FinderParams::Adaptive(p) = &mut self.params {
            p.bind_image_height(image.height());
        }
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.cache.is_none()
    }

    /// Last computed output, if still valid.
    pub fn output(&self) -> Option<&FinderOutput> {
        self.cache.as_ref()
    }

    /// Binarize `image` without touching the cache.
    pub fn compute_mask(&self, image: &Image) -> GrayImage {
        self.params.compute_mask(image)
    }

    /// Mask and boundaries for `image`, recomputed if the cache is dirty.
    ///
    /// The cache is not keyed on the image; call [`BoundaryFinder::invalidate`]
    /// when the source changes.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image), fields(kind = ?self.kind()))
    )]
    pub fn run(&mut self, image: &Image) -> &FinderOutput {
        let Self {
            params,
            filters,
            cache,
        } = self;
        cache.get_or_insert_with(|| {
            if let FinderParams::Adaptive(p) = params {
                p.bind_image_height(image.height());
            }
            let mask = params.compute_mask(image);
            let boundaries = extract_boundaries(&mask.view());
            let admitted = boundaries
                .iter()
                .filter(|b| filters.admits(&b.descriptor))
                .count();
            log::debug!(
                "{:?}: {} foreground px, {} boundaries ({} inside filter windows)",
                params.kind(),
                mask.count_nonzero(),
                boundaries.len(),
                admitted
            );
            FinderOutput { mask, boundaries }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ablation_targets_core::RgbImage;

    fn disk_image(w: usize, h: usize, cx: f64, cy: f64, r: f64) -> Image {
        let mut img = RgbImage::filled(w, h, [30, 30, 30]);
        for y in 0..h {
            for x in 0..w {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= r * r {
                    img.set(x, y, [200, 200, 200]);
                }
            }
        }
        img.into()
    }

    #[test]
    fn single_disk_yields_one_round_region() {
        let image = disk_image(200, 200, 100.0, 100.0, 50.0);
        let mut finder = BoundaryFinder::new(FinderKind::Threshold.into());
        let out = finder.run(&image);
        assert_eq!(out.boundaries.len(), 1);
        let d = out.boundaries[0].descriptor;
        assert!((d.circularity - 1.0).abs() < 0.15, "circularity {}", d.circularity);
        assert!(d.area > 7000.0 && d.area < 8000.0, "area {}", d.area);
    }

    #[test]
    fn mask_is_deterministic_for_every_variant() {
        let image = disk_image(160, 120, 70.0, 60.0, 40.0);
        for kind in FinderKind::ALL {
            let finder = BoundaryFinder::new(kind.into());
            let a = finder.compute_mask(&image);
            let b = finder.compute_mask(&image);
            assert_eq!(a, b, "{kind:?}");
            assert_eq!((a.width, a.height), (160, 120));
        }
    }

    #[test]
    fn settings_changes_mark_cache_dirty() {
        let image = disk_image(120, 120, 60.0, 60.0, 30.0);
        let mut finder = BoundaryFinder::new(FinderKind::Otsu.into());
        assert!(finder.is_dirty());
        finder.run(&image);
        assert!(!finder.is_dirty());

        assert!(finder.set_setting("blur_size", 500.into()).is_err());
        assert!(!finder.is_dirty());

        finder.set_setting("blur_size", 9.into()).expect("blur");
        assert!(finder.is_dirty());
        assert_eq!(finder.value("blur_size"), Some(SettingValue::Int(9)));
        assert_eq!(finder.run(&image).boundaries.len(), 1);
    }

    #[test]
    fn adaptive_schema_is_bound_to_image_height() {
        let image = disk_image(100, 60, 50.0, 30.0, 20.0);
        let mut finder = BoundaryFinder::new(FinderKind::Adaptive.into());
        finder.run(&image);
        let block = finder
            .schema()
            .into_iter()
            .find(|s| s.key == "block_size")
            .expect("block_size");
        assert_eq!(
            block.kind,
            ablation_targets_core::SettingKind::Int {
                min: 3,
                max: 30,
                odd: true
            }
        );
    }

    #[test]
    fn params_round_trip_through_json() {
        let params = FinderParams::Adaptive(AdaptiveParams {
            c: -4,
            ..AdaptiveParams::default()
        });
        let json = serde_json::to_string(&params).expect("serialize");
        assert!(json.contains("\"kind\":\"adaptive\""));
        let back: FinderParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, params);
    }
}
