use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Canonical column order of the submission form export.
const SUBMISSION_HEADERS: [&str; 30] = [
    "Timestamp",
    "FullName",
    "Organization",
    "Email",
    "Title",
    "Description",
    "Genre",
    "Theme",
    "Domain",
    "PatentStatus",
    "TRLLevel",
    "ConceptObserved",
    "ProofOfConcept",
    "PrototypeDeveloped",
    "PrototypeTestedLab",
    "TestedRealWorld",
    "WorksAsIntended",
    "IntegratedWithSystems",
    "UsedByEndUsers",
    "SafetyAssessments",
    "ScalingPlans",
    "Innovators",
    "Overview",
    "DetailedDescription",
    "Advantages",
    "Applications",
    "UseCases",
    "RelatedLinks",
    "TechnicalSpecifications",
    "Images\nInstructions:\n    You may either upload image files or provide direct URLs that visually represent the technology.",
];

const OUTPUT_HEADERS: [&str; 13] = [
    "Title",
    "Theme",
    "Domain",
    "PatentStatus",
    "TRLLevel",
    "Innovators",
    "DetailedDescription",
    "Advantages",
    "Applications",
    "UseCases",
    "RelatedLinks",
    "TechnicalSpecifications",
    "Images",
];

const LIST_FIELDS: [&str; 9] = [
    "Theme",
    "Domain",
    "Innovators",
    "Advantages",
    "Applications",
    "UseCases",
    "RelatedLinks",
    "TechnicalSpecifications",
    "Images",
];

/// How an output header is looked up in the sheet's header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMatch {
    /// Only the exact (trimmed) label matches.
    Exact,
    /// Labels may carry instructional text after a line break, or after the name.
    #[default]
    Tolerant,
}

/// Everything the normalizer needs to know about one input layout.
///
/// Each calling context (batch export, viewer import, a JSON schema file)
/// builds its own instance; nothing in the transform is hard-coded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub header_list: Vec<String>,
    pub output_headers: Vec<String>,
    pub multi_item_fields: Vec<String>,
    pub force_quote_fields: Vec<String>,
    #[serde(default = "default_image_prefix")]
    pub image_field_prefix: String,
    #[serde(default = "default_related_links")]
    pub related_links_field: String,
    #[serde(default)]
    pub header_match: HeaderMatch,
}

fn default_image_prefix() -> String {
    "Images".to_string()
}

fn default_related_links() -> String {
    "RelatedLinks".to_string()
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl SchemaConfig {
    /// Layout used when exporting the submission workbook to CSV in batch.
    pub fn export_script() -> Self {
        SchemaConfig {
            header_list: owned(&SUBMISSION_HEADERS),
            output_headers: owned(&OUTPUT_HEADERS),
            multi_item_fields: owned(&LIST_FIELDS),
            force_quote_fields: owned(&LIST_FIELDS),
            image_field_prefix: default_image_prefix(),
            related_links_field: default_related_links(),
            header_match: HeaderMatch::Tolerant,
        }
    }

    /// Layout used when a workbook is opened in the record viewer.
    ///
    /// Adds a trailing `QRCodes` column and leaves `Images` untouched so the
    /// viewer can split it itself.
    pub fn viewer_import() -> Self {
        let mut header_list = owned(&SUBMISSION_HEADERS);
        header_list.pop();
        header_list.push("Images".to_string());
        header_list.push("QRCodes".to_string());

        let mut output_headers = owned(&OUTPUT_HEADERS);
        output_headers.push("QRCodes".to_string());

        let mut multi_item_fields = owned(&LIST_FIELDS);
        multi_item_fields.retain(|f| f != "Images");
        multi_item_fields.push("QRCodes".to_string());

        let mut force_quote_fields = owned(&LIST_FIELDS);
        force_quote_fields.push("QRCodes".to_string());

        SchemaConfig {
            header_list,
            output_headers,
            multi_item_fields,
            force_quote_fields,
            image_field_prefix: default_image_prefix(),
            related_links_field: default_related_links(),
            header_match: HeaderMatch::Exact,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Output header names as they appear in the CSV header row.
    pub fn output_header_row(&self) -> Vec<String> {
        self.output_headers
            .iter()
            .map(|h| first_line(h).to_string())
            .collect()
    }

    pub fn is_multi_item(&self, field: &str) -> bool {
        contains_field(&self.multi_item_fields, field)
    }
}

/// Text before the first line break, trimmed.
pub fn first_line(label: &str) -> &str {
    label.split('\n').next().unwrap_or("").trim()
}

pub(crate) fn contains_field(fields: &[String], field: &str) -> bool {
    let name = first_line(field);
    fields.iter().any(|f| first_line(f) == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_their_own_outputs() {
        for config in [SchemaConfig::export_script(), SchemaConfig::viewer_import()] {
            for out in &config.output_headers {
                assert!(
                    config.header_list.iter().any(|h| first_line(h) == out),
                    "{} missing from header list",
                    out
                );
            }
        }
    }

    #[test]
    fn viewer_preset_has_trailing_qr_column() {
        let config = SchemaConfig::viewer_import();
        assert_eq!(config.output_headers.last().map(String::as_str), Some("QRCodes"));
        assert!(!config.is_multi_item("Images"));
        assert!(config.force_quote_fields.iter().any(|f| f == "Images"));
        assert_eq!(config.header_match, HeaderMatch::Exact);
    }

    #[test]
    fn json_schema_fills_defaults() {
        let config = SchemaConfig::from_json_str(
            r#"{
                "header_list": ["Name", "Tags"],
                "output_headers": ["Tags"],
                "multi_item_fields": ["Tags"],
                "force_quote_fields": []
            }"#,
        )
        .unwrap();
        assert_eq!(config.image_field_prefix, "Images");
        assert_eq!(config.related_links_field, "RelatedLinks");
        assert_eq!(config.header_match, HeaderMatch::Tolerant);
    }

    #[test]
    fn field_membership_ignores_instruction_text() {
        let config = SchemaConfig::export_script();
        assert!(config.is_multi_item("Images\nupload here"));
        assert!(!config.is_multi_item("Title"));
    }
}
