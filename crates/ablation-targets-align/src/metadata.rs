use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MetadataError {
    #[error("alignment field `{0}` is missing")]
    MissingField(&'static str),
    #[error("alignment field `{field}` has an invalid number `{value}`")]
    InvalidNumber { field: &'static str, value: String },
    #[error("alignment field `{field}` needs {expected} values, got {got}")]
    WrongArity {
        field: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Stage placement of a micrograph as recorded by the microscope.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignmentMetadata {
    /// Rotation in degrees, as stored (negated before use).
    pub rotation: f64,
    /// Image center in physical units.
    pub center: Point2<f64>,
    /// Imaged area `(width, height)` in physical units.
    pub size: Vector2<f64>,
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, MetadataError> {
    let text = raw.trim();
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MetadataError::InvalidNumber {
            field,
            value: text.to_string(),
        })
}

fn parse_pair(field: &'static str, raw: &str) -> Result<(f64, f64), MetadataError> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 2 {
        return Err(MetadataError::WrongArity {
            field,
            expected: 2,
            got: parts.len(),
        });
    }
    Ok((parse_number(field, parts[0])?, parse_number(field, parts[1])?))
}

impl AlignmentMetadata {
    pub fn new(rotation: f64, center: Point2<f64>, size: Vector2<f64>) -> Self {
        Self {
            rotation,
            center,
            size,
        }
    }

    /// Parse the `Rotation`, `Center` and `Size` text fields of an
    /// alignment record, e.g. `"12.5"`, `"100.0, 200.0"`, `"500,400"`.
    pub fn from_fields(rotation: &str, center: &str, size: &str) -> Result<Self, MetadataError> {
        let rotation = parse_number("Rotation", rotation)?;
        let (cx, cy) = parse_pair("Center", center)?;
        let (sw, sh) = parse_pair("Size", size)?;
        Ok(Self::new(rotation, Point2::new(cx, cy), Vector2::new(sw, sh)))
    }

    /// Like [`AlignmentMetadata::from_fields`] for fields that may be absent.
    pub fn from_optional_fields(
        rotation: Option<&str>,
        center: Option<&str>,
        size: Option<&str>,
    ) -> Result<Self, MetadataError> {
        Self::from_fields(
            rotation.ok_or(MetadataError::MissingField("Rotation"))?,
            center.ok_or(MetadataError::MissingField("Center"))?,
            size.ok_or(MetadataError::MissingField("Size"))?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_fields() {
        let m = AlignmentMetadata::from_fields(" -12.5", "100.0, 200.0", "500,400").expect("parse");
        assert_eq!(m.rotation, -12.5);
        assert_eq!(m.center, Point2::new(100.0, 200.0));
        assert_eq!(m.size, Vector2::new(500.0, 400.0));
    }

    #[test]
    fn reports_malformed_fields() {
        assert_eq!(
            AlignmentMetadata::from_fields("x", "1,2", "3,4"),
            Err(MetadataError::InvalidNumber {
                field: "Rotation",
                value: "x".into()
            })
        );
        assert!(matches!(
            AlignmentMetadata::from_fields("0", "1,2,3", "3,4"),
            Err(MetadataError::WrongArity { field: "Center", got: 3, .. })
        ));
        assert!(matches!(
            AlignmentMetadata::from_fields("0", "1,2", "3,nan"),
            Err(MetadataError::InvalidNumber { field: "Size", .. })
        ));
        assert_eq!(
            AlignmentMetadata::from_optional_fields(Some("0"), None, Some("1,1")),
            Err(MetadataError::MissingField("Center"))
        );
    }
}
