//! JSON pipeline configuration and spot report helpers.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ablation_targets_finder::{BoundaryDescriptor, FilterConfig, FinderKind, FinderParams};
use ablation_targets_targeter::{Spot, TargeterKind, TargeterParams};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Active finder and targeter with their settings.
///
/// ```json
/// {
///   "finder": { "kind": "threshold", "lower": 150, "upper": 255 },
///   "targeter": { "kind": "rim", "spot_size": 20 },
///   "output_path": "spots.json"
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub finder: FinderParams,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub targeter: TargeterParams,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl PipelineConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("ablation_targets_report.json"))
    }
}

/// Hand-off record for the ablation pattern generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpotReport {
    pub image_width: usize,
    pub image_height: usize,
    pub finder: FinderKind,
    pub targeter: TargeterKind,
    pub filters: FilterConfig,
    /// Physical units per pixel; absent without alignment metadata.
    pub scale: Option<f64>,
    pub spot_size: Option<u32>,
    pub boundaries: Vec<BoundaryDescriptor>,
    pub spots: Vec<Spot>,
}

impl SpotReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
