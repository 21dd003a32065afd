use ablation_targets_core::{AdaptiveMethod, Configurable, SettingSpec, SettingValue};
use serde::{Deserialize, Serialize};

/// Block-size ceiling used until an image height is known.
const DEFAULT_MAX_BLOCK_SIZE: u32 = 200;

/// Median-smoothed band-pass threshold with optional opening.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    /// Inclusive lower intensity bound.
    pub lower: u8,
    /// Inclusive upper intensity bound.
    pub upper: u8,
    pub smooth: bool,
    /// Median kernel side; even values are bumped to the next odd one.
    pub smooth_size: u32,
    pub open: bool,
    /// Side of the square opening kernel.
    pub kernel_size: u32,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            lower: 170,
            upper: 230,
            smooth: true,
            smooth_size: 11,
            open: true,
            kernel_size: 7,
        }
    }
}

impl Configurable for ThresholdParams {
    fn schema(&self) -> Vec<SettingSpec> {
        let d = Self::default();
        vec![
            SettingSpec::int("lower", "Lower", d.lower.into(), 0, 255),
            SettingSpec::int("upper", "Upper", d.upper.into(), 0, 255),
            SettingSpec::bool("smooth", "Smooth", d.smooth),
            SettingSpec::odd_int("smooth_size", "Smoothing size", d.smooth_size.into(), 3, 101),
            SettingSpec::bool("open", "Open", d.open),
            SettingSpec::odd_int(
                "kernel_size",
                "Opening kernel size",
                d.kernel_size.into(),
                3,
                101,
            ),
        ]
    }

    fn value(&self, key: &str) -> Option<SettingValue> {
        Some(match key {
            "lower" => i64::from(self.lower).into(),
            "upper" => i64::from(self.upper).into(),
            "smooth" => self.smooth.into(),
            "smooth_size" => i64::from(self.smooth_size).into(),
            "open" => self.open.into(),
            "kernel_size" => i64::from(self.kernel_size).into(),
            _ => return None,
        })
    }

    fn assign(&mut self, key: &str, value: &SettingValue) {
        match (key, value) {
            ("lower", SettingValue::Int(v)) => self.lower = *v as u8,
            ("upper", SettingValue::Int(v)) => self.upper = *v as u8,
            ("smooth", SettingValue::Bool(v)) => self.smooth = *v,
            ("smooth_size", SettingValue::Int(v)) => self.smooth_size = *v as u32,
            ("open", SettingValue::Bool(v)) => self.open = *v,
            ("kernel_size", SettingValue::Int(v)) => self.kernel_size = *v as u32,
            _ => {}
        }
    }
}

/// Local (mean or Gaussian weighted) threshold after a 5 px median.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveParams {
    pub method: AdaptiveMethod,
    /// Neighborhood side; even values are bumped to the next odd one.
    pub block_size: u32,
    /// Bias subtracted from the local statistic.
    pub c: i32,
    /// Ceiling for `block_size`, half the image height once an image is bound.
    #[serde(skip)]
    pub max_block_size: Option<u32>,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            method: AdaptiveMethod::Mean,
            block_size: 21,
            c: 2,
            max_block_size: None,
        }
    }
}

impl AdaptiveParams {
    /// Median kernel applied before thresholding.
    pub const MEDIAN_SIZE: u32 = 5;
    /// Opening kernel applied after thresholding.
    pub const OPEN_SIZE: u32 = 11;

    /// Tie the block-size ceiling to the image height.
    pub fn bind_image_height(&mut self, height: usize) {
        self.max_block_size = Some(((height / 2) as u32).max(3));
    }
}

fn method_name(method: AdaptiveMethod) -> &'static str {
    match method {
        AdaptiveMethod::Mean => "mean",
        AdaptiveMethod::Gaussian => "gaussian",
    }
}

impl Configurable for AdaptiveParams {
    fn schema(&self) -> Vec<SettingSpec> {
        let d = Self::default();
        let max_block = self.max_block_size.unwrap_or(DEFAULT_MAX_BLOCK_SIZE);
        vec![
            SettingSpec::choice(
                "method",
                "Method",
                method_name(d.method),
                vec!["mean", "gaussian"],
            ),
            SettingSpec::odd_int(
                "block_size",
                "Block size",
                d.block_size.into(),
                3,
                max_block.into(),
            ),
            SettingSpec::int("c", "C", d.c.into(), -255, 255),
        ]
    }

    fn value(&self, key: &str) -> Option<SettingValue> {
        Some(match key {
            "method" => method_name(self.method).into(),
            "block_size" => i64::from(self.block_size).into(),
            "c" => i64::from(self.c).into(),
            _ => return None,
        })
    }

    fn assign(&mut self, key: &str, value: &SettingValue) {
        match (key, value) {
            ("method", SettingValue::Choice(v)) => {
                self.method = if v == "gaussian" {
                    AdaptiveMethod::Gaussian
                } else {
                    AdaptiveMethod::Mean
                }
            }
            ("block_size", SettingValue::Int(v)) => self.block_size = *v as u32,
            ("c", SettingValue::Int(v)) => self.c = *v as i32,
            _ => {}
        }
    }
}

/// Gaussian blur followed by a global Otsu threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtsuParams {
    /// Gaussian kernel side; even values are bumped to the next odd one.
    pub blur_size: u32,
}

impl Default for OtsuParams {
    fn default() -> Self {
        Self { blur_size: 5 }
    }
}

impl Configurable for OtsuParams {
    fn schema(&self) -> Vec<SettingSpec> {
        vec![SettingSpec::odd_int(
            "blur_size",
            "Blur size",
            Self::default().blur_size.into(),
            3,
            200,
        )]
    }

    fn value(&self, key: &str) -> Option<SettingValue> {
        (key == "blur_size").then(|| i64::from(self.blur_size).into())
    }

    fn assign(&mut self, key: &str, value: &SettingValue) {
        if let ("blur_size", SettingValue::Int(v)) = (key, value) {
            self.blur_size = *v as u32;
        }
    }
}
