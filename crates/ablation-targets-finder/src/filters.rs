use serde::{Deserialize, Serialize};

use crate::boundaries::BoundaryDescriptor;

/// One `{enabled, min, max}` descriptor window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterRange {
    pub enabled: bool,
    pub min: f64,
    pub max: f64,
}

impl FilterRange {
    pub const fn new(enabled: bool, min: f64, max: f64) -> Self {
        Self { enabled, min, max }
    }

    pub fn admits(&self, value: f64) -> bool {
        !self.enabled || (value >= self.min && value <= self.max)
    }
}

/// Descriptor windows shared by all finders.
///
/// Extraction only applies the fixed minimum-area rule; this configuration is
/// carried, serialized and evaluated for reporting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub area: FilterRange,
    pub circularity: FilterRange,
    pub convexity: FilterRange,
    #[serde(rename = "match")]
    pub match_score: FilterRange,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            area: FilterRange::new(true, 100.0, 1e6),
            circularity: FilterRange::new(true, 0.0, 2.0),
            convexity: FilterRange::new(false, 0.0, 2.0),
            match_score: FilterRange::new(true, 0.0, 2.0),
        }
    }
}

impl FilterConfig {
    /// Whether every enabled window contains the matching descriptor field.
    pub fn admits(&self, d: &BoundaryDescriptor) -> bool {
        self.area.admits(d.area)
            && self.circularity.admits(d.circularity)
            && self.convexity.admits(d.convexity)
            && self.match_score.admits(d.match_score)
    }
}
