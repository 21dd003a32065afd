//! Typed option surface published by every algorithm variant.
//!
//! A variant's parameter struct is the only storage for its options; the
//! schema describes each option (type, label, default, allowed range) for a
//! settings UI, and [`Configurable::set_setting`] validates a value against
//! it before storing.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Choice(String),
}

impl SettingValue {
    fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Int(_) => "int",
            SettingValue::Choice(_) => "choice",
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Int(value.into())
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        SettingValue::Int(value.into())
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Choice(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingKind {
    Bool,
    /// Inclusive range. `odd` marks kernel sizes, which are bumped to the
    /// next odd value when used rather than rejected.
    Int { min: i64, max: i64, odd: bool },
    Choice { options: Vec<&'static str> },
}

/// Description of one option.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SettingSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: SettingKind,
    pub default: SettingValue,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("unknown setting `{key}`")]
    UnknownKey { key: String },
    #[error("setting `{key}` expects a {expected} value, got {got}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("setting `{key}` must be within [{min}, {max}], got {value}")]
    OutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("setting `{key}` has no choice `{value}`")]
    UnknownChoice { key: String, value: String },
    #[error("cannot parse `{raw}` for setting `{key}`")]
    Unparsable { key: String, raw: String },
}

impl SettingSpec {
    pub fn bool(key: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            key,
            label,
            kind: SettingKind::Bool,
            default: SettingValue::Bool(default),
        }
    }

    pub fn int(key: &'static str, label: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            key,
            label,
            kind: SettingKind::Int {
                min,
                max,
                odd: false,
            },
            default: SettingValue::Int(default),
        }
    }

    pub fn odd_int(
        key: &'static str,
        label: &'static str,
        default: i64,
        min: i64,
        max: i64,
    ) -> Self {
        Self {
            kind: SettingKind::Int {
                min,
                max,
                odd: true,
            },
            ..Self::int(key, label, default, min, max)
        }
    }

    pub fn choice(
        key: &'static str,
        label: &'static str,
        default: &'static str,
        options: Vec<&'static str>,
    ) -> Self {
        Self {
            key,
            label,
            kind: SettingKind::Choice { options },
            default: SettingValue::Choice(default.to_string()),
        }
    }

    fn expected(&self) -> &'static str {
        match self.kind {
            SettingKind::Bool => "bool",
            SettingKind::Int { .. } => "int",
            SettingKind::Choice { .. } => "choice",
        }
    }

    /// Check type and range of `value`.
    pub fn validate(&self, value: &SettingValue) -> Result<(), SettingsError> {
        match (&self.kind, value) {
            (SettingKind::Bool, SettingValue::Bool(_)) => Ok(()),
            (SettingKind::Int { min, max, .. }, SettingValue::Int(v)) => {
                if v < min || v > max {
                    Err(SettingsError::OutOfRange {
                        key: self.key.to_string(),
                        value: *v,
                        min: *min,
                        max: *max,
                    })
                } else {
                    Ok(())
                }
            }
            (SettingKind::Choice { options }, SettingValue::Choice(v)) => {
                if options.iter().any(|o| o == v) {
                    Ok(())
                } else {
                    Err(SettingsError::UnknownChoice {
                        key: self.key.to_string(),
                        value: v.clone(),
                    })
                }
            }
            _ => Err(SettingsError::TypeMismatch {
                key: self.key.to_string(),
                expected: self.expected(),
                got: value.type_name(),
            }),
        }
    }

    /// Parse text typed into a settings control.
    pub fn parse(&self, raw: &str) -> Result<SettingValue, SettingsError> {
        let text = raw.trim();
        let unparsable = || SettingsError::Unparsable {
            key: self.key.to_string(),
            raw: raw.to_string(),
        };
        let value = match self.kind {
            SettingKind::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => SettingValue::Bool(true),
                "false" | "0" | "off" | "no" => SettingValue::Bool(false),
                _ => return Err(unparsable()),
            },
            SettingKind::Int { .. } => {
                SettingValue::Int(text.parse::<i64>().map_err(|_| unparsable())?)
            }
            SettingKind::Choice { .. } => SettingValue::Choice(text.to_ascii_lowercase()),
        };
        self.validate(&value)?;
        Ok(value)
    }
}

/// Parameter structs that expose their fields through the settings surface.
pub trait Configurable {
    /// Ordered option descriptions.
    fn schema(&self) -> Vec<SettingSpec>;

    /// Current value of `key`.
    fn value(&self, key: &str) -> Option<SettingValue>;

    /// Store a value that already passed [`SettingSpec::validate`].
    fn assign(&mut self, key: &str, value: &SettingValue);

    /// Validate and store one option. A rejected value leaves `self` untouched.
    fn set_setting(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        let schema = self.schema();
        let spec = schema
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| SettingsError::UnknownKey {
                key: key.to_string(),
            })?;
        spec.validate(&value)?;
        self.assign(key, &value);
        Ok(())
    }

    /// Parse and store one option from text.
    fn set_setting_str(&mut self, key: &str, raw: &str) -> Result<(), SettingsError> {
        let schema = self.schema();
        let spec = schema
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| SettingsError::UnknownKey {
                key: key.to_string(),
            })?;
        let value = spec.parse(raw)?;
        self.assign(key, &value);
        Ok(())
    }
}
