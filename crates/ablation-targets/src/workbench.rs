use ablation_targets_align::{AlignmentCalibrator, AlignmentMetadata, CalibrationError, SourceError};
use ablation_targets_core::{GrayImage, Image, RgbImage, SettingSpec, SettingValue, SettingsError};
use ablation_targets_finder::{render_boundaries, Boundary, BoundaryFinder, FinderKind, FinderParams};
use ablation_targets_targeter::{render_spots, Spot, TargetOutput, Targeter, TargeterKind, TargeterParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::io::{IoError, PipelineConfig, SpotReport};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("no source image loaded")]
    NoSource,
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
}

/// Current micrograph plus the active finder and targeter.
///
/// Mutations only mark stages dirty; the mask, boundaries and spots are
/// recomputed on the next read, from the first invalidated stage onward.
#[derive(Clone, Debug, Default)]
pub struct Workbench {
    image: Option<Image>,
    calibrator: AlignmentCalibrator,
    finder: BoundaryFinder,
    targeter: Targeter,
    last_spot_size: Option<u32>,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            finder: BoundaryFinder::new(config.finder.clone()).with_filters(config.filters.clone()),
            targeter: Targeter::new(config.targeter.clone()),
            ..Self::default()
        }
    }

    /// Snapshot of the active variants and their settings.
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            finder: self.finder.params().clone(),
            filters: self.finder.filters().clone(),
            targeter: self.targeter.params().clone(),
            output_path: None,
        }
    }

    /// Replace the source image and its alignment metadata.
    ///
    /// Without metadata the image can still be segmented and targeted, but
    /// physical coordinates report [`CalibrationError::NoSource`]. If the
    /// calibration cannot be derived the workbench is left without a source.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image, metadata), fields(width = image.width(), height = image.height()))
    )]
    pub fn set_source(
        &mut self,
        image: Image,
        metadata: Option<AlignmentMetadata>,
    ) -> Result<(), PipelineError> {
        self.clear_source();
        match metadata {
            Some(meta) => self
                .calibrator
                .set_source(image.width(), image.height(), meta)?,
            None => self.calibrator.set_image_size(image.width(), image.height()),
        }
        self.finder.bind_image(&image);
        log::info!("source set: {}x{}", image.width(), image.height());
        self.image = Some(image);
        Ok(())
    }

    pub fn clear_source(&mut self) {
        self.image = None;
        self.calibrator.clear();
        self.invalidate();
    }

    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    pub fn calibrator(&self) -> &AlignmentCalibrator {
        &self.calibrator
    }

    pub fn finder(&self) -> &BoundaryFinder {
        &self.finder
    }

    pub fn targeter(&self) -> &Targeter {
        &self.targeter
    }

    /// Switch the finder variant; a different kind starts from its defaults.
    pub fn set_finder(&mut self, kind: FinderKind) {
        if self.finder.kind() != kind {
            self.set_finder_params(kind.into());
        }
    }

    pub fn set_finder_params(&mut self, params: FinderParams) {
        let filters = self.finder.filters().clone();
        self.finder = BoundaryFinder::new(params).with_filters(filters);
        if let Some(image) = &self.image {
            self.finder.bind_image(image);
        }
        self.targeter.invalidate();
    }

    /// Switch the targeter variant; a different kind starts from its defaults.
    pub fn set_targeter(&mut self, kind: TargeterKind) {
        if self.targeter.kind() != kind {
            self.set_targeter_params(kind.into());
        }
    }

    pub fn set_targeter_params(&mut self, params: TargeterParams) {
        self.targeter = Targeter::new(params);
    }

    pub fn finder_schema(&self) -> Vec<SettingSpec> {
        self.finder.schema()
    }

    pub fn targeter_schema(&self) -> Vec<SettingSpec> {
        self.targeter.schema()
    }

    pub fn set_finder_setting(&mut self, key: &str, value: SettingValue) -> Result<(), PipelineError> {
        self.finder.set_setting(key, value)?;
        self.targeter.invalidate();
        Ok(())
    }

    pub fn set_targeter_setting(&mut self, key: &str, value: SettingValue) -> Result<(), PipelineError> {
        Ok(self.targeter.set_setting(key, value)?)
    }

    /// Drop every cached stage.
    pub fn invalidate(&mut self) {
        self.finder.invalidate();
        self.targeter.invalidate();
        self.last_spot_size = None;
    }

    fn source(&self) -> Result<&Image, PipelineError> {
        self.image.as_ref().ok_or(PipelineError::NoSource)
    }

    /// Binary mask of the active finder.
    pub fn mask(&mut self) -> Result<&GrayImage, PipelineError> {
        let image = self.image.as_ref().ok_or(PipelineError::NoSource)?;
        if self.finder.is_dirty() {
            self.targeter.invalidate();
        }
        Ok(&self.finder.run(image).mask)
    }

    /// Accepted boundaries of the active finder.
    pub fn boundaries(&mut self) -> Result<&[Boundary], PipelineError> {
        let image = self.image.as_ref().ok_or(PipelineError::NoSource)?;
        if self.finder.is_dirty() {
            self.targeter.invalidate();
        }
        Ok(&self.finder.run(image).boundaries)
    }

    /// Pixel-space spots and the effective spot size.
    pub fn spots(&mut self) -> Result<&TargetOutput, PipelineError> {
        let image = self.image.as_ref().ok_or(PipelineError::NoSource)?;
        if self.finder.is_dirty() {
            self.targeter.invalidate();
        }
        let found = self.finder.run(image);
        let out = self
            .targeter
            .compute_spots(&found.boundaries, &found.mask.view());
        self.last_spot_size = out.spot_size;
        Ok(out)
    }

    /// Spots with stage coordinates filled in.
    pub fn physical_spots(&mut self) -> Result<Vec<Spot>, PipelineError> {
        self.calibrator.calibration()?;
        let spots = self.spots()?.spots.clone();
        Ok(self.calibrator.map_spots(&spots)?)
    }

    /// Spot size resolved by the most recent targeter run.
    pub fn last_spot_size(&self) -> Option<u32> {
        self.last_spot_size
    }

    pub fn scale(&self) -> Result<f64, PipelineError> {
        Ok(self.calibrator.scale()?)
    }

    /// Boundary overlay on a white canvas, see [`render_boundaries`].
    pub fn render_boundaries(&mut self, seed: u64) -> Result<RgbImage, PipelineError> {
        let (w, h) = {
            let image = self.source()?;
            (image.width(), image.height())
        };
        Ok(render_boundaries(w, h, self.boundaries()?, seed))
    }

    /// Source image with the current spots drawn on it.
    pub fn render_spots(&mut self) -> Result<RgbImage, PipelineError> {
        let out = self.spots()?.clone();
        let image = self.source()?;
        Ok(render_spots(image, &out.spots, out.spot_size.unwrap_or(0)))
    }

    /// Hand-off record; physical coordinates are included when calibrated.
    pub fn report(&mut self) -> Result<SpotReport, PipelineError> {
        let out = self.spots()?.clone();
        let boundaries = self.boundaries()?.iter().map(|b| b.descriptor).collect();
        let image = self.source()?;
        let (spots, scale) = match self.calibrator.calibration() {
            Ok(cal) => (ablation_targets_align::map_spots(cal, &out.spots), Some(cal.scale)),
            Err(_) => (out.spots, None),
        };
        Ok(SpotReport {
            image_width: image.width(),
            image_height: image.height(),
            finder: self.finder.kind(),
            targeter: self.targeter.kind(),
            filters: self.finder.filters().clone(),
            scale,
            spot_size: out.spot_size,
            boundaries,
            spots,
        })
    }

    /// Compute the report and write it to the configured output path.
    pub fn write_report(&mut self, config: &PipelineConfig) -> Result<SpotReport, PipelineError> {
        let report = self.report()?;
        report.write_json(config.output_path())?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_without_source_fail() {
        let mut bench = Workbench::new();
        assert!(matches!(bench.boundaries(), Err(PipelineError::NoSource)));
        assert!(matches!(bench.spots(), Err(PipelineError::NoSource)));
        assert!(matches!(
            bench.physical_spots(),
            Err(PipelineError::Calibration(CalibrationError::NoSource { .. }))
        ));
    }

    #[test]
    fn rejected_setting_keeps_caches() {
        let mut bench = Workbench::new();
        bench
            .set_source(GrayImage::new(32, 32).into(), None)
            .expect("source");
        bench.spots().expect("spots");
        assert!(!bench.finder().is_dirty());
        assert!(bench.set_finder_setting("lower", 999.into()).is_err());
        assert!(!bench.finder().is_dirty());
        assert!(!bench.targeter().is_dirty());
        bench.set_finder_setting("lower", 100.into()).expect("lower");
        assert!(bench.finder().is_dirty());
        assert!(bench.targeter().is_dirty());
    }

    #[test]
    fn switching_variants_resets_settings() {
        let mut bench = Workbench::new();
        bench.set_targeter(TargeterKind::Rim);
        bench.set_targeter_setting("spot_size", 40.into()).expect("size");
        bench.set_targeter(TargeterKind::Rim);
        assert_eq!(bench.targeter().value("spot_size"), Some(40.into()));
        bench.set_targeter(TargeterKind::Core);
        bench.set_targeter(TargeterKind::Rim);
        assert_eq!(bench.targeter().value("spot_size"), Some(30.into()));
        bench.set_finder(FinderKind::Adaptive);
        assert_eq!(bench.config().finder.kind(), FinderKind::Adaptive);
    }
}
