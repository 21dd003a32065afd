use ablation_targets_core::{Configurable, SettingSpec, SettingValue};
use serde::{Deserialize, Serialize};

/// Spot-size options of the core and centroid strategies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotSizeParams {
    /// Derive the spot size from the smallest fitted ellipse.
    pub auto_spot: bool,
    /// Manual spot size in pixels, used when `auto_spot` is off.
    pub spot_size: u32,
}

impl Default for SpotSizeParams {
    fn default() -> Self {
        Self {
            auto_spot: true,
            spot_size: 30,
        }
    }
}

impl Configurable for SpotSizeParams {
    fn schema(&self) -> Vec<SettingSpec> {
        let d = Self::default();
        vec![
            SettingSpec::bool("auto_spot", "Automatic spot size", d.auto_spot),
            SettingSpec::int("spot_size", "Spot size", d.spot_size.into(), 1, 10_000),
        ]
    }

    fn value(&self, key: &str) -> Option<SettingValue> {
        spot_value(self.auto_spot, self.spot_size, key)
    }

    fn assign(&mut self, key: &str, value: &SettingValue) {
        spot_assign(&mut self.auto_spot, &mut self.spot_size, key, value);
    }
}

/// Spot-size options of the rim strategy (manual by default).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RimParams {
    pub auto_spot: bool,
    pub spot_size: u32,
}

impl Default for RimParams {
    fn default() -> Self {
        Self {
            auto_spot: false,
            spot_size: 30,
        }
    }
}

impl RimParams {
    /// Inward offset of the rim band from the boundary, in pixels.
    pub const INSET: u32 = 10;
}

impl Configurable for RimParams {
    fn schema(&self) -> Vec<SettingSpec> {
        let d = Self::default();
        vec![
            SettingSpec::bool("auto_spot", "Automatic spot size", d.auto_spot),
            SettingSpec::int("spot_size", "Spot size", d.spot_size.into(), 5, 500),
        ]
    }

    fn value(&self, key: &str) -> Option<SettingValue> {
        spot_value(self.auto_spot, self.spot_size, key)
    }

    fn assign(&mut self, key: &str, value: &SettingValue) {
        spot_assign(&mut self.auto_spot, &mut self.spot_size, key, value);
    }
}

fn spot_value(auto_spot: bool, spot_size: u32, key: &str) -> Option<SettingValue> {
    match key {
        "auto_spot" => Some(auto_spot.into()),
        "spot_size" => Some(i64::from(spot_size).into()),
        _ => None,
    }
}

fn spot_assign(auto_spot: &mut bool, spot_size: &mut u32, key: &str, value: &SettingValue) {
    match (key, value) {
        ("auto_spot", SettingValue::Bool(v)) => *auto_spot = *v,
        ("spot_size", SettingValue::Int(v)) => *spot_size = *v as u32,
        _ => {}
    }
}

/// Fixed circular-blob detector configuration. Not user configurable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobParams {
    pub min_threshold: u8,
    pub max_threshold: u8,
    pub threshold_step: u8,
    /// Accepted blob area range `[min_area, max_area)`.
    pub min_area: f64,
    pub max_area: f64,
    /// Centers closer than this are merged across threshold levels.
    pub min_dist_between_blobs: f64,
    /// Threshold levels a blob must appear in.
    pub min_repeatability: usize,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            min_threshold: 50,
            max_threshold: 220,
            threshold_step: 10,
            min_area: 1200.0,
            max_area: 1e6,
            min_dist_between_blobs: 10.0,
            min_repeatability: 2,
        }
    }
}

impl Configurable for BlobParams {
    fn schema(&self) -> Vec<SettingSpec> {
        Vec::new()
    }

    fn value(&self, _key: &str) -> Option<SettingValue> {
        None
    }

    fn assign(&mut self, _key: &str, _value: &SettingValue) {}
}
