use crate::core::category::SmellCategory;
use serde::{Deserialize, Serialize};

/// Resolved location of a finding within the analyzed file. Locations are
/// established by cross-referencing against the parsed structure, never
/// trusted blindly from a detector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
}

impl Location {
    pub fn line(line: usize) -> Self {
        Self {
            line,
            end_line: None,
        }
    }

    pub fn range(start: usize, end: usize) -> Self {
        Self {
            line: start,
            end_line: Some(end),
        }
    }

    /// The `Line no` cell of an exported record: a single line, or
    /// `"start - end"` for method-level smells.
    pub fn display(&self) -> String {
        match self.end_line {
            Some(end) => format!("{} - {}", self.line, end),
            None => self.line.to_string(),
        }
    }
}

/// A validated finding with its location resolved and file context attached.
/// Every enriched finding has a real location; candidates that could not be
/// resolved are dropped before this type is ever constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedFinding {
    pub category: SmellCategory,
    pub location: Location,
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    pub module_name: String,
    pub package_name: String,
    pub file_path: String,
    pub project: String,
}

impl EnrichedFinding {
    /// Key used to collapse exact duplicates within a category.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.category.id(),
            self.location.display(),
            self.description
        )
    }

    pub fn to_record(&self) -> SmellRecord {
        SmellRecord {
            project: self.project.clone(),
            package: self.package_name.clone(),
            module: self.module_name.clone(),
            class: self.class_name.clone().unwrap_or_default(),
            smell: self.category.label().to_string(),
            method: self.method_name.clone().unwrap_or_default(),
            line_no: self.location.display(),
            file: self.file_path.clone(),
            description: self.description.clone(),
        }
    }
}

/// The flattened export row consumed by downstream reporting tooling. Field
/// names are a stable external contract and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmellRecord {
    #[serde(rename = "Project")]
    pub project: String,

    #[serde(rename = "Package")]
    pub package: String,

    #[serde(rename = "Module")]
    pub module: String,

    #[serde(rename = "Class")]
    pub class: String,

    #[serde(rename = "Smell")]
    pub smell: String,

    #[serde(rename = "Method")]
    pub method: String,

    #[serde(rename = "Line no")]
    pub line_no: String,

    #[serde(rename = "File")]
    pub file: String,

    #[serde(rename = "Description")]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::line(42).display(), "42");
        assert_eq!(Location::range(10, 80).display(), "10 - 80");
    }

    #[test]
    fn test_record_field_names_are_stable() {
        let finding = EnrichedFinding {
            category: SmellCategory::LongMethod,
            location: Location::range(3, 75),
            description: "Method 'load' has 73 lines, exceeding the max of 67.".to_string(),
            method_name: Some("load".to_string()),
            class_name: None,
            module_name: "loader".to_string(),
            package_name: "ingest".to_string(),
            file_path: "ingest/loader.py".to_string(),
            project: "Code".to_string(),
        };

        let json = serde_json::to_value(finding.to_record()).unwrap();
        for field in [
            "Project",
            "Package",
            "Module",
            "Class",
            "Smell",
            "Method",
            "Line no",
            "File",
            "Description",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(json["Smell"], "Long method");
        assert_eq!(json["Line no"], "3 - 75");
    }

    #[test]
    fn test_dedup_key_distinguishes_location() {
        let mut a = EnrichedFinding {
            category: SmellCategory::MagicNumber,
            location: Location::line(5),
            description: "Magic number 9.81 detected in compute.".to_string(),
            method_name: Some("compute".to_string()),
            class_name: None,
            module_name: "physics".to_string(),
            package_name: "sim".to_string(),
            file_path: "sim/physics.py".to_string(),
            project: "Code".to_string(),
        };
        let key_a = a.dedup_key();
        a.location = Location::line(6);
        assert_ne!(key_a, a.dedup_key());
    }
}
