//! Per-diagram analysis pipeline
//!
//! Joins preprocessing, classification, element extraction, relationship
//! counting, validation, and line metrics into one `DiagramReport`.

use crate::consistency::ConsistencyValidator;
use pumlsift_classify::{detect_family, Classifier};
use pumlsift_core::{ClassificationResult, Config, ConfigError, DiagramFamily, DiagramReport};
use pumlsift_extract::{count_relationships, ElementExtractor, ExtractError};
use pumlsift_text::{count_lines, preprocess, split_diagrams};
use sha2::{Digest, Sha256};

/// Analysis error types
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The source holds no diagram text at all
    #[error("no diagram found in {id}")]
    NoDiagram { id: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    InvalidRules(#[from] ExtractError),
}

/// Analyzer bound to one configuration
pub struct Analyzer<'a> {
    config: &'a Config,
    classifier: Classifier<'a>,
    extractor: ElementExtractor<'a>,
    validator: ConsistencyValidator<'a>,
}

impl<'a> Analyzer<'a> {
    /// Validate the configuration and compile its rule tables
    pub fn new(config: &'a Config) -> Result<Self, AnalysisError> {
        config.validate()?;

        let classifier = Classifier::new(
            &config.scoring,
            config.classification.multi_label_threshold,
        )
        .with_features(config.classification.include_features);
        let extractor = ElementExtractor::new(&config.extraction)?;
        let validator = ConsistencyValidator::new(
            &config.expectations,
            config.validation.consistency_threshold,
        );

        Ok(Self {
            config,
            classifier,
            extractor,
            validator,
        })
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Analyze one diagram unit
    pub fn analyze(&self, id: &str, text: &str) -> DiagramReport {
        let clean = preprocess(text);
        let classification = match detect_family(text) {
            DiagramFamily::Uml => self.classifier.classify_preprocessed(&clean),
            family => ClassificationResult::non_uml(family),
        };
        let primary = classification.diagram_type();

        let elements = self.extractor.extract(&clean, primary);
        let relationships = count_relationships(&clean, primary, &self.config.extraction);
        let validation = self.validator.validate(&classification, &elements);

        let report = DiagramReport {
            id: id.to_string(),
            fingerprint: fingerprint(text),
            total_elements: elements.total(),
            total_relationships: relationships.total(),
            lines: count_lines(text),
            classification,
            elements,
            relationships,
            validation,
        };

        tracing::debug!(
            id,
            family = report.classification.family.as_str(),
            primary_type = report
                .classification
                .primary_type
                .map(|p| p.as_str())
                .unwrap_or("none"),
            confidence = report.classification.confidence,
            total_elements = report.total_elements,
            is_consistent = report.validation.is_consistent,
            "analyzed diagram"
        );

        report
    }

    /// Analyze a source that may hold several diagrams
    ///
    /// Each `@start…`/`@end…` block is analyzed on its own when there are
    /// several; otherwise the whole text is one unit.
    pub fn analyze_source(
        &self,
        id: &str,
        text: &str,
    ) -> Result<Vec<DiagramReport>, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::NoDiagram { id: id.to_string() });
        }

        let units = split_diagrams(id, text);
        if units.len() > 1 {
            return Ok(units
                .iter()
                .map(|unit| self.analyze(&unit.id, &unit.text))
                .collect());
        }

        Ok(vec![self.analyze(id, text)])
    }
}

/// Lowercase hex SHA-256 of the unit text
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumlsift_core::{DiagramType, ElementKind, RelationshipCategory};

    #[test]
    fn fingerprint_is_hex_sha256() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn analyzes_simple_sequence() {
        let config = Config::default();
        let analyzer = Analyzer::new(&config).unwrap();
        let report = analyzer.analyze("hello.puml", "@startuml\nAlice -> Bob: hello\n@enduml");

        assert_eq!(report.id, "hello.puml");
        assert_eq!(report.classification.diagram_type(), Some(DiagramType::Sequence));
        assert_eq!(report.elements.get(ElementKind::Participant), 2);
        assert_eq!(report.relationships.get(RelationshipCategory::Message), 1);
        assert_eq!(report.total_elements, 2);
        assert_eq!(report.total_relationships, 1);
        assert_eq!(report.lines.loc, 1);
        assert!(report.validation.is_consistent);
    }

    #[test]
    fn blank_source_has_no_diagram() {
        let config = Config::default();
        let analyzer = Analyzer::new(&config).unwrap();
        let err = analyzer.analyze_source("empty.puml", "  \n\n").unwrap_err();
        assert!(matches!(err, AnalysisError::NoDiagram { ref id } if id == "empty.puml"));
    }

    #[test]
    fn multi_diagram_source_is_split() {
        let config = Config::default();
        let analyzer = Analyzer::new(&config).unwrap();
        let text = "@startuml\nclass A\n@enduml\n@startuml\nstate S\n@enduml\n";
        let reports = analyzer.analyze_source("two.puml", text).unwrap();

        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["two.puml_01", "two.puml_02"]);
    }

    #[test]
    fn single_diagram_source_keeps_its_id() {
        let config = Config::default();
        let analyzer = Analyzer::new(&config).unwrap();
        let reports = analyzer
            .analyze_source("one.puml", "@startuml\nclass A\n@enduml\n")
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, "one.puml");
        assert_eq!(reports[0].fingerprint, fingerprint("@startuml\nclass A\n@enduml\n"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = Config::default();
        config.validation.consistency_threshold = 1.5;
        assert!(matches!(
            Analyzer::new(&config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn negative_scoring_weights_are_rejected() {
        let mut config = Config::default();
        for entry in &mut config.scoring.tiers.get_mut(DiagramType::Sequence).decisive {
            entry.weight = -1.0;
        }
        assert!(matches!(
            Analyzer::new(&config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }
}
