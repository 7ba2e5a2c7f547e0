use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CadError;

/// Header fields sniffed from a STEP file. Every field is advisory and
/// stays `None` when its pattern did not match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StepMetadata {
    pub part_name: Option<String>,
    pub part_number: Option<String>,
    pub author: Option<String>,
    pub organization: Option<String>,
    pub description: Option<String>,
    pub timestamp: Option<String>,
    pub material: Option<String>,
    #[serde(default)]
    pub custom_properties: BTreeMap<String, String>,
}

impl StepMetadata {
    pub fn is_empty(&self) -> bool {
        self.part_name.is_none()
            && self.part_number.is_none()
            && self.author.is_none()
            && self.organization.is_none()
            && self.description.is_none()
            && self.timestamp.is_none()
            && self.material.is_none()
            && self.custom_properties.is_empty()
    }
}

/// Axis-aligned extents of a converted mesh, in the source unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// `None` when the mesh is open and has no enclosed volume.
    pub volume: Option<f64>,
    pub units: String,
}

/// Native unit of STEP and STL geometry handled by this service.
pub const NATIVE_UNITS: &str = "mm";

/// Source formats the conversion pipeline knows how to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Step,
    Stp,
    Stl,
}

impl FileFormat {
    /// Parse a declared file type (case-insensitive, optional leading dot).
    pub fn parse(declared: &str) -> Result<Self, CadError> {
        match declared.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "step" => Ok(FileFormat::Step),
            "stp" => Ok(FileFormat::Stp),
            "stl" => Ok(FileFormat::Stl),
            _ => Err(CadError::UnsupportedFormat(declared.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Step => "step",
            FileFormat::Stp => "stp",
            FileFormat::Stl => "stl",
        }
    }

    /// STEP sources need a solid import; STL is already a mesh.
    pub fn is_step(&self) -> bool {
        matches!(self, FileFormat::Step | FileFormat::Stp)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(FileFormat::parse("STEP").unwrap(), FileFormat::Step);
        assert_eq!(FileFormat::parse(".stp").unwrap(), FileFormat::Stp);
        assert_eq!(FileFormat::parse("Stl").unwrap(), FileFormat::Stl);
    }

    #[test]
    fn parse_rejects_unknown_types() {
        let err = FileFormat::parse("iges").unwrap_err();
        assert!(matches!(err, CadError::UnsupportedFormat(t) if t == "iges"));
    }

    #[test]
    fn empty_metadata_serializes_nulls() {
        let meta = StepMetadata::default();
        assert!(meta.is_empty());
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json["part_name"].is_null());
        assert!(json["material"].is_null());
        assert_eq!(json["custom_properties"], serde_json::json!({}));
    }
}
