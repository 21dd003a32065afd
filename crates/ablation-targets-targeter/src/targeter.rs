use ablation_targets_core::{Configurable, GrayImageView, SettingSpec, SettingValue, SettingsError};
use ablation_targets_finder::Boundary;
use serde::{Deserialize, Serialize};

use crate::blob::detect_blobs;
use crate::params::{BlobParams, RimParams, SpotSizeParams};
use crate::spot::{resolve_spot_size, Spot};
use crate::strategies::{core_spots, moment_spots, rim_spots};

/// Targeter variant selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargeterKind {
    #[default]
    Core,
    Rim,
    Moments,
    Blob,
}

impl TargeterKind {
    pub const ALL: [TargeterKind; 4] = [
        TargeterKind::Core,
        TargeterKind::Rim,
        TargeterKind::Moments,
        TargeterKind::Blob,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TargeterKind::Core => "Cores",
            TargeterKind::Rim => "Rims",
            TargeterKind::Moments => "Moments",
            TargeterKind::Blob => "Simple Blobs",
        }
    }
}

/// Settings of the active targeter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargeterParams {
    Core(SpotSizeParams),
    Rim(RimParams),
    Moments(SpotSizeParams),
    Blob(BlobParams),
}

impl Default for TargeterParams {
    fn default() -> Self {
        TargeterParams::Core(SpotSizeParams::default())
    }
}

impl From<TargeterKind> for TargeterParams {
    fn from(kind: TargeterKind) -> Self {
        match kind {
            TargeterKind::Core => TargeterParams::Core(SpotSizeParams::default()),
            TargeterKind::Rim => TargeterParams::Rim(RimParams::default()),
            TargeterKind::Moments => TargeterParams::Moments(SpotSizeParams::default()),
            TargeterKind::Blob => TargeterParams::Blob(BlobParams::default()),
        }
    }
}

impl TargeterParams {
    pub fn kind(&self) -> TargeterKind {
        match self {
            TargeterParams::Core(_) => TargeterKind::Core,
            TargeterParams::Rim(_) => TargeterKind::Rim,
            TargeterParams::Moments(_) => TargeterKind::Moments,
            TargeterParams::Blob(_) => TargeterKind::Blob,
        }
    }

    fn settings(&self) -> &dyn Configurable {
        match self {
            TargeterParams::Core(p) | TargeterParams::Moments(p) => p,
            TargeterParams::Rim(p) => p,
            TargeterParams::Blob(p) => p,
        }
    }

    fn settings_mut(&mut self) -> &mut dyn Configurable {
        match self {
            TargeterParams::Core(p) | TargeterParams::Moments(p) => p,
            TargeterParams::Rim(p) => p,
            TargeterParams::Blob(p) => p,
        }
    }

    /// Compute spots and the effective spot size.
    pub fn compute(&self, boundaries: &[Boundary], mask: &GrayImageView<'_>) -> TargetOutput {
        let (spot_size, spots) = match self {
            TargeterParams::Core(p) => {
                let size = resolve_spot_size(p.auto_spot, p.spot_size, boundaries);
                let spots = size.map(|s| core_spots(boundaries, mask, s));
                (size, spots)
            }
            TargeterParams::Rim(p) => {
                let size = resolve_spot_size(p.auto_spot, p.spot_size, boundaries);
                let spots = size.map(|s| rim_spots(boundaries, mask, s, RimParams::INSET));
                (size, spots)
            }
            TargeterParams::Moments(p) => {
                let size = resolve_spot_size(p.auto_spot, p.spot_size, boundaries);
                let spots = size.map(|s| moment_spots(boundaries, s));
                (size, spots)
            }
            TargeterParams::Blob(p) => {
                let blobs = detect_blobs(mask, p);
                let size = blobs
                    .iter()
                    .map(|b| b.radius)
                    .min_by(f64::total_cmp)
                    .map(|r| r.round().max(0.0) as u32);
                let spots = blobs.iter().map(|b| Spot::new(None, b.center)).collect();
                (size, Some(spots))
            }
        };
        let spots = spots.unwrap_or_default();
        log::debug!("{:?}: {} spots", self.kind(), spots.len());
        TargetOutput { spot_size, spots }
    }
}

/// Spots of one targeter run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetOutput {
    /// Effective spot size; `None` when it could not be derived.
    pub spot_size: Option<u32>,
    pub spots: Vec<Spot>,
}

/// A targeter variant with its own settings and cached spots.
#[derive(Clone, Debug, Default)]
pub struct Targeter {
    params: TargeterParams,
    cache: Option<TargetOutput>,
}

impl Targeter {
    pub fn new(params: TargeterParams) -> Self {
        Self {
            params,
            cache: None,
        }
    }

    pub fn kind(&self) -> TargeterKind {
        self.params.kind()
    }

    pub fn params(&self) -> &TargeterParams {
        &self.params
    }

    pub fn schema(&self) -> Vec<SettingSpec> {
        self.params.settings().schema()
    }

    pub fn value(&self, key: &str) -> Option<SettingValue> {
        self.params.settings().value(key)
    }

    /// Validate and store one option, then drop cached spots.
    pub fn set_setting(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.params.settings_mut().set_setting(key, value)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_setting_str(&mut self, key: &str, raw: &str) -> Result<(), SettingsError> {
        self.params.settings_mut().set_setting_str(key, raw)?;
        self.invalidate();
        Ok(())
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.cache.is_none()
    }

    pub fn output(&self) -> Option<&TargetOutput> {
        self.cache.as_ref()
    }

    /// Spots for `boundaries` and `mask`, recomputed if the cache is dirty.
    ///
    /// Like the finder cache this is not keyed on its inputs; invalidate
    /// when the boundaries change.
    pub fn compute_spots(&mut self, boundaries: &[Boundary], mask: &GrayImageView<'_>) -> &TargetOutput {
        let Self { params, cache } = self;
        cache.get_or_insert_with(|| params.compute(boundaries, mask))
    }
}
