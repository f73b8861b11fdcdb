//! Per-diagram and batch reports
//!
//! Field and flag-code names are the JSON contract read by downstream
//! tooling. Renaming one bumps `ReportVersion::major`; a new optional field
//! bumps `minor`.

use crate::diagram::DiagramFamily;
use crate::flag::{FlagCode, Severity, ValidationResult};
use crate::record::{ClassificationResult, ElementInventory, LineMetrics, RelationshipCount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{ "major": 1, "minor": 0 }` in serialized reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    pub major: u32,
    pub minor: u32,
}

impl ReportVersion {
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

/// Everything learned about one diagram unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramReport {
    /// Opaque identifier supplied by the caller
    pub id: String,

    /// Lowercase hex SHA-256 of the unit text
    pub fingerprint: String,

    pub classification: ClassificationResult,

    pub elements: ElementInventory,

    pub total_elements: usize,

    pub relationships: RelationshipCount,

    pub total_relationships: usize,

    pub validation: ValidationResult,

    pub lines: LineMetrics,
}

/// Summary statistics for a batch of diagrams
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of diagrams analyzed
    pub total: usize,

    /// Diagrams per family
    pub by_family: BTreeMap<DiagramFamily, usize>,

    /// Diagrams per primary type (including `unclassified`)
    pub by_primary_type: BTreeMap<String, usize>,

    /// Diagrams with more than one type above the multi-label threshold
    pub multi_label: usize,

    /// Mean classification confidence over UML diagrams
    pub average_confidence: f64,

    pub consistent: usize,

    pub inconsistent: usize,

    pub consistency_rate: f64,

    /// Flag occurrences per code
    pub by_flag: BTreeMap<FlagCode, usize>,

    /// Flag occurrences per severity
    pub by_severity: BTreeMap<Severity, usize>,

    pub average_consistency_score: f64,

    pub total_elements: usize,

    pub total_relationships: usize,

    /// Classified primary type -> suggested type -> count
    pub confusion_matrix: BTreeMap<String, BTreeMap<String, usize>>,
}

impl ReportSummary {
    /// Compute statistics over a batch
    pub fn from_diagrams(diagrams: &[DiagramReport]) -> Self {
        let mut summary = Self {
            total: diagrams.len(),
            by_severity: Severity::ALL.iter().map(|s| (*s, 0)).collect(),
            ..Self::default()
        };

        let mut confidence_sum = 0.0;
        let mut confidence_count = 0usize;
        let mut score_sum = 0.0;

        for diagram in diagrams {
            let classification = &diagram.classification;
            *summary.by_family.entry(classification.family).or_insert(0) += 1;

            if let Some(primary) = classification.primary_type {
                *summary
                    .by_primary_type
                    .entry(primary.as_str().to_string())
                    .or_insert(0) += 1;

                *summary
                    .confusion_matrix
                    .entry(primary.as_str().to_string())
                    .or_default()
                    .entry(diagram.validation.suggested_type.as_str().to_string())
                    .or_insert(0) += 1;
            }

            if classification.is_multi_label() {
                summary.multi_label += 1;
            }

            if let Some(confidence) = classification.confidence {
                confidence_sum += confidence;
                confidence_count += 1;
            }

            if diagram.validation.is_consistent {
                summary.consistent += 1;
            }
            score_sum += diagram.validation.consistency_score;

            for flag in &diagram.validation.flags {
                *summary.by_flag.entry(flag.code).or_insert(0) += 1;
                *summary.by_severity.entry(flag.severity).or_insert(0) += 1;
            }

            summary.total_elements += diagram.total_elements;
            summary.total_relationships += diagram.total_relationships;
        }

        summary.inconsistent = summary.total - summary.consistent;
        if summary.total > 0 {
            summary.consistency_rate = round4(summary.consistent as f64 / summary.total as f64);
            summary.average_consistency_score = round4(score_sum / summary.total as f64);
        }
        if confidence_count > 0 {
            summary.average_confidence = round4(confidence_sum / confidence_count as f64);
        }

        summary
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Batch analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics over the full batch
    pub summary: ReportSummary,

    /// Per-diagram results
    pub diagrams: Vec<DiagramReport>,

    /// Metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Report {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::from_diagrams(Vec::new())
    }

    /// Create a report from per-diagram results
    pub fn from_diagrams(diagrams: Vec<DiagramReport>) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::from_diagrams(&diagrams),
            diagrams,
            metadata: None,
        }
    }

    /// Add a diagram and recompute the summary
    pub fn add_diagram(&mut self, diagram: DiagramReport) {
        self.diagrams.push(diagram);
        self.summary = ReportSummary::from_diagrams(&self.diagrams);
    }

    /// Keep only diagrams matching the filters
    ///
    /// `min_severity` keeps diagrams with at least one flag at or above that
    /// severity; `only_inconsistent` keeps diagrams that failed validation.
    /// The summary is left as computed over the full batch and the applied
    /// filters are recorded in `metadata`.
    pub fn retain(&mut self, min_severity: Option<Severity>, only_inconsistent: bool) {
        if only_inconsistent {
            self.diagrams.retain(|d| !d.validation.is_consistent);
        }
        if let Some(min) = min_severity {
            self.diagrams
                .retain(|d| d.validation.flags.iter().any(|f| f.severity >= min));
        }

        let mut metadata = match self.metadata.take() {
            Some(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        if only_inconsistent {
            metadata.insert("filtered".to_string(), "only_inconsistent".into());
        }
        if let Some(min) = min_severity {
            metadata.insert("severity_filter".to_string(), min.as_str().into());
        }
        if !metadata.is_empty() {
            self.metadata = Some(serde_json::Value::Object(metadata));
        }
    }

    /// Check if any diagram failed validation
    pub fn has_inconsistencies(&self) -> bool {
        self.summary.inconsistent > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{DiagramType, PrimaryType};
    use crate::flag::{Flag, Suggestion};

    fn diagram(
        id: &str,
        primary: DiagramType,
        suggested: Suggestion,
        flags: Vec<Flag>,
        consistent: bool,
    ) -> DiagramReport {
        let mut classification = ClassificationResult::unclassified();
        classification.primary_type = Some(PrimaryType::Type(primary));
        classification.confidence = Some(0.8);
        classification.types.insert(primary, 0.8);

        DiagramReport {
            id: id.to_string(),
            fingerprint: String::new(),
            classification,
            elements: ElementInventory::new(),
            total_elements: 2,
            relationships: RelationshipCount::default(),
            total_relationships: 1,
            validation: ValidationResult {
                consistency_score: if consistent { 1.0 } else { 0.25 },
                suggested_type: suggested,
                suggestion_confidence: 0.0,
                flags,
                is_consistent: consistent,
            },
            lines: LineMetrics::default(),
        }
    }

    fn sample() -> Vec<DiagramReport> {
        vec![
            diagram(
                "a",
                DiagramType::Sequence,
                Suggestion::Type(DiagramType::Sequence),
                vec![],
                true,
            ),
            diagram(
                "b",
                DiagramType::Class,
                Suggestion::Type(DiagramType::Component),
                vec![
                    Flag::new(FlagCode::TypeMismatch, "x"),
                    Flag::new(FlagCode::LowConfidence, "y"),
                ],
                false,
            ),
            diagram(
                "c",
                DiagramType::Class,
                Suggestion::Unknown,
                vec![Flag::new(FlagCode::MultiTypeAmbiguous, "z")],
                true,
            ),
        ]
    }

    #[test]
    fn empty_report() {
        let report = Report::new();
        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.consistency_rate, 0.0);
        assert!(!report.has_inconsistencies());
    }

    #[test]
    fn summary_counts() {
        let report = Report::from_diagrams(sample());
        let summary = &report.summary;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.consistent, 2);
        assert_eq!(summary.inconsistent, 1);
        assert_eq!(summary.consistency_rate, 0.6667);
        assert_eq!(summary.by_primary_type["class"], 2);
        assert_eq!(summary.by_family[&DiagramFamily::Uml], 3);
        assert_eq!(summary.by_flag[&FlagCode::TypeMismatch], 1);
        assert_eq!(summary.by_severity[&Severity::Error], 1);
        assert_eq!(summary.by_severity[&Severity::Warning], 0);
        assert_eq!(summary.by_severity[&Severity::Info], 2);
        assert_eq!(summary.confusion_matrix["class"]["component"], 1);
        assert_eq!(summary.confusion_matrix["class"]["unknown"], 1);
        assert_eq!(summary.total_elements, 6);
        assert_eq!(summary.average_confidence, 0.8);
        assert!(report.has_inconsistencies());
    }

    #[test]
    fn retain_by_severity_keeps_summary() {
        let mut report = Report::from_diagrams(sample());
        report.retain(Some(Severity::Error), false);

        let ids: Vec<&str> = report.diagrams.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(report.summary.total, 3);
        assert_eq!(
            report.metadata.as_ref().unwrap()["severity_filter"],
            serde_json::json!("error")
        );
    }

    #[test]
    fn retain_only_inconsistent() {
        let mut report = Report::from_diagrams(sample());
        report.retain(None, true);
        assert_eq!(report.diagrams.len(), 1);

        let mut report = Report::from_diagrams(sample());
        report.retain(Some(Severity::Info), false);
        assert_eq!(report.diagrams.len(), 2);
    }

    #[test]
    fn report_serialization() {
        let report = Report::from_diagrams(sample());
        let json = report.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"diagrams\""));
        assert!(json.contains("\"TYPE_MISMATCH\""));

        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary, report.summary);
    }
}
