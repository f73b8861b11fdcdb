//! Consistency validation
//!
//! Cross-checks a classification against the elements extracted for it. The
//! expectation table lists, per type, the element kinds that should appear,
//! the kinds that may appear, and the kinds that point at a misclassification.

use pumlsift_core::{
    ClassificationResult, DiagramType, ElementInventory, ExpectationTable, Flag, FlagCode,
    PrimaryType, Severity, Suggestion, ValidationResult,
};

/// Score given to an empty inventory, per type
fn empty_inventory_score(diagram_type: DiagramType) -> f64 {
    match diagram_type {
        // Flow syntax rarely declares elements
        DiagramType::Activity => 0.9,
        DiagramType::State => 0.5,
        _ => 0.3,
    }
}

/// Consistency validator bound to an expectation table
pub struct ConsistencyValidator<'a> {
    expectations: &'a ExpectationTable,
    threshold: f64,
}

impl<'a> ConsistencyValidator<'a> {
    /// `threshold` is the minimum consistency score of a consistent diagram
    pub fn new(expectations: &'a ExpectationTable, threshold: f64) -> Self {
        Self {
            expectations,
            threshold,
        }
    }

    /// Alignment of the inventory with the primary type, in `[0, 1]`
    ///
    /// `None` (a non-UML family) scores 0.
    pub fn consistency_score(
        &self,
        primary: Option<PrimaryType>,
        elements: &ElementInventory,
    ) -> f64 {
        let total = elements.total();
        let diagram_type = match primary {
            None => return 0.0,
            Some(PrimaryType::Unclassified) => return if total == 0 { 1.0 } else { 0.3 },
            Some(PrimaryType::Type(t)) => t,
        };

        if total == 0 {
            return empty_inventory_score(diagram_type);
        }

        let expected = self.expectations.get(diagram_type);
        let primary_count = elements.count_of(&expected.primary);
        let allowed_count = elements.count_of(&expected.allowed);
        let forbidden_count = elements.count_of(&expected.forbidden);
        let total = total as f64;

        let alignment = (primary_count + allowed_count) as f64 / total;
        let forbidden_penalty = 1.0 - (forbidden_count as f64 / total).min(1.0);
        let primary_presence = if primary_count > 0 { 1.0 } else { 0.5 };

        round4(alignment * 0.4 + forbidden_penalty * 0.4 + primary_presence * 0.2)
    }

    /// Type suggested by the element composition alone, with its confidence
    ///
    /// Each type scores its primary share minus half its forbidden share,
    /// floored at zero. Ties go to the earlier type in canonical order.
    pub fn infer_type(&self, elements: &ElementInventory) -> (Suggestion, f64) {
        let total = elements.total();
        if total == 0 {
            return (Suggestion::Unknown, 0.0);
        }
        let total = total as f64;

        let scores: Vec<(DiagramType, f64)> = self
            .expectations
            .iter()
            .map(|(diagram_type, expected)| {
                let primary = elements.count_of(&expected.primary) as f64 / total;
                let forbidden = elements.count_of(&expected.forbidden) as f64 / total;
                (diagram_type, (primary - forbidden * 0.5).max(0.0))
            })
            .collect();

        let mut best = scores[0];
        for score in &scores[1..] {
            if score.1 > best.1 {
                best = *score;
            }
        }
        if best.1 == 0.0 {
            return (Suggestion::Unknown, 0.0);
        }

        let sum: f64 = scores.iter().map(|(_, s)| s).sum();
        (Suggestion::Type(best.0), round4(best.1 / sum))
    }

    /// Flags in detection order
    ///
    /// An empty inventory stops detection after the `NO_ELEMENTS` check.
    pub fn detect_flags(
        &self,
        classification: &ClassificationResult,
        elements: &ElementInventory,
        consistency_score: f64,
        suggested: Suggestion,
        suggestion_confidence: f64,
    ) -> Vec<Flag> {
        let mut flags = Vec::new();
        let primary = classification.primary_type;
        let label = primary
            .map(|p| p.as_str())
            .unwrap_or_else(|| classification.family.as_str());
        let confidence = classification.confidence.unwrap_or(0.0);

        if elements.is_empty() {
            let exempt = matches!(
                primary,
                Some(PrimaryType::Type(DiagramType::Activity) | PrimaryType::Unclassified)
            );
            if !exempt {
                flags.push(Flag::new(
                    FlagCode::NoElements,
                    format!("No elements detected for {label} diagram"),
                ));
            }
            return flags;
        }

        let expected = classification
            .diagram_type()
            .map(|t| self.expectations.get(t));

        if let Some(expected) = expected {
            let forbidden: Vec<String> = elements
                .iter()
                .filter(|(kind, _)| expected.is_forbidden(*kind))
                .map(|(kind, count)| format!("{kind}={count}"))
                .collect();
            if !forbidden.is_empty() {
                flags.push(Flag::new(
                    FlagCode::ForbiddenElements,
                    format!("Found forbidden elements: {}", forbidden.join(", ")),
                ));
            }

            if !expected.primary.is_empty() && elements.count_of(&expected.primary) == 0 {
                let preview: Vec<&str> =
                    expected.primary.iter().take(3).map(|k| k.as_str()).collect();
                flags.push(Flag::new(
                    FlagCode::MissingPrimaryElements,
                    format!("No primary elements ({}...) found", preview.join(", ")),
                ));
            }
        }

        if let Some(suggested_type) = suggested.diagram_type() {
            if Some(suggested_type) != classification.diagram_type() && suggestion_confidence > 0.5
            {
                flags.push(Flag::new(
                    FlagCode::TypeMismatch,
                    format!(
                        "Elements suggest {suggested_type} (conf: {suggestion_confidence:.2}) not {label}"
                    ),
                ));
            }
        }

        if confidence >= 0.7 && consistency_score < 0.5 {
            flags.push(Flag::new(
                FlagCode::HighConfidenceMismatch,
                format!(
                    "High classification confidence ({confidence:.2}) but low consistency ({consistency_score:.2})"
                ),
            ));
        }

        if confidence < 0.5 {
            flags.push(Flag::new(
                FlagCode::LowConfidence,
                format!("Classification confidence {confidence:.2} below 0.5 threshold"),
            ));
        }

        let has_error = flags.iter().any(|f| f.severity == Severity::Error);
        if consistency_score < 0.7 && !has_error {
            flags.push(Flag::new(
                FlagCode::MultiTypeAmbiguous,
                "Elements not strongly aligned with any single type",
            ));
        }

        flags
    }

    /// Full verdict for one diagram
    pub fn validate(
        &self,
        classification: &ClassificationResult,
        elements: &ElementInventory,
    ) -> ValidationResult {
        let consistency_score = self.consistency_score(classification.primary_type, elements);
        let (suggested_type, suggestion_confidence) = self.infer_type(elements);
        let flags = self.detect_flags(
            classification,
            elements,
            consistency_score,
            suggested_type,
            suggestion_confidence,
        );

        let is_consistent =
            consistency_score >= self.threshold && !flags.iter().any(Flag::is_error);

        ValidationResult {
            consistency_score,
            suggested_type,
            suggestion_confidence,
            flags,
            is_consistent,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumlsift_core::{default_expectations, DiagramFamily, ElementKind};
    use std::collections::BTreeMap;

    fn inventory(items: &[(ElementKind, usize)]) -> ElementInventory {
        items.iter().copied().collect()
    }

    fn classified(diagram_type: DiagramType, confidence: f64) -> ClassificationResult {
        ClassificationResult {
            family: DiagramFamily::Uml,
            primary_type: Some(PrimaryType::Type(diagram_type)),
            types: BTreeMap::from([(diagram_type, confidence)]),
            confidence: Some(confidence),
            features: None,
        }
    }

    fn codes(result: &ValidationResult) -> Vec<FlagCode> {
        result.flags.iter().map(|f| f.code).collect()
    }

    #[test]
    fn empty_inventory_scores() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);
        let empty = ElementInventory::new();

        let score = |p: PrimaryType| validator.consistency_score(Some(p), &empty);
        assert_eq!(score(DiagramType::Activity.into()), 0.9);
        assert_eq!(score(PrimaryType::Unclassified), 1.0);
        assert_eq!(score(DiagramType::State.into()), 0.5);
        assert_eq!(score(DiagramType::Class.into()), 0.3);
        assert_eq!(validator.consistency_score(None, &empty), 0.0);
    }

    #[test]
    fn unclassified_with_elements_scores_low() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);
        let elements = inventory(&[(ElementKind::Class, 1)]);
        assert_eq!(
            validator.consistency_score(Some(PrimaryType::Unclassified), &elements),
            0.3
        );
    }

    #[test]
    fn weighted_alignment_score() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);

        let aligned = inventory(&[(ElementKind::Class, 3), (ElementKind::Package, 1)]);
        assert_eq!(
            validator.consistency_score(Some(DiagramType::Class.into()), &aligned),
            1.0
        );

        // alignment 0.5, penalty 0.5, presence 1.0
        let mixed = inventory(&[(ElementKind::Class, 1), (ElementKind::Actor, 1)]);
        assert_eq!(
            validator.consistency_score(Some(DiagramType::Class.into()), &mixed),
            0.6
        );

        // alignment 0, penalty 1, presence 0.5
        let neutral = inventory(&[(ElementKind::Card, 2)]);
        assert_eq!(
            validator.consistency_score(Some(DiagramType::Class.into()), &neutral),
            0.5
        );
    }

    #[test]
    fn infers_type_from_composition() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);

        assert_eq!(
            validator.infer_type(&ElementInventory::new()),
            (Suggestion::Unknown, 0.0)
        );
        assert_eq!(
            validator.infer_type(&inventory(&[(ElementKind::Card, 1)])),
            (Suggestion::Unknown, 0.0)
        );

        // state scores 1.0 against nothing else
        assert_eq!(
            validator.infer_type(&inventory(&[(ElementKind::State, 2)])),
            (Suggestion::Type(DiagramType::State), 1.0)
        );

        // participant is primary for sequence and timing alike
        let (suggested, confidence) =
            validator.infer_type(&inventory(&[(ElementKind::Participant, 2)]));
        assert_eq!(suggested, Suggestion::Type(DiagramType::Sequence));
        assert_eq!(confidence, 0.5);
    }

    #[test]
    fn consistent_sequence() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);
        let result = validator.validate(
            &classified(DiagramType::Sequence, 1.0),
            &inventory(&[(ElementKind::Participant, 2)]),
        );

        assert_eq!(result.consistency_score, 1.0);
        assert!(result.flags.is_empty());
        assert!(result.is_consistent);
    }

    #[test]
    fn no_elements_stops_detection() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);

        let result =
            validator.validate(&classified(DiagramType::Class, 0.2), &ElementInventory::new());
        assert_eq!(codes(&result), vec![FlagCode::NoElements]);
        assert_eq!(result.flags[0].details, "No elements detected for class diagram");
        assert!(!result.is_consistent);

        let activity =
            validator.validate(&classified(DiagramType::Activity, 0.2), &ElementInventory::new());
        assert!(activity.flags.is_empty());
        assert!(activity.is_consistent);

        let unclassified =
            validator.validate(&ClassificationResult::unclassified(), &ElementInventory::new());
        assert!(unclassified.flags.is_empty());
        assert!(unclassified.is_consistent);
    }

    #[test]
    fn non_uml_family_is_reported_by_name() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);
        let result = validator.validate(
            &ClassificationResult::non_uml(DiagramFamily::Gantt),
            &ElementInventory::new(),
        );
        assert_eq!(result.consistency_score, 0.0);
        assert_eq!(result.flags[0].details, "No elements detected for gantt diagram");
        assert!(!result.is_consistent);
    }

    #[test]
    fn misclassified_class_diagram() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);
        let elements = inventory(&[(ElementKind::Participant, 3)]);
        let result = validator.validate(&classified(DiagramType::Class, 0.9), &elements);

        // alignment 0, penalty 0, presence 0.5
        assert_eq!(result.consistency_score, 0.1);
        assert_eq!(result.suggested_type, Suggestion::Type(DiagramType::Sequence));
        assert_eq!(
            codes(&result),
            vec![
                FlagCode::ForbiddenElements,
                FlagCode::MissingPrimaryElements,
                FlagCode::HighConfidenceMismatch,
            ]
        );
        assert_eq!(
            result.flags[0].details,
            "Found forbidden elements: participant=3"
        );
        assert_eq!(
            result.flags[1].details,
            "No primary elements (class, abstract class, interface...) found"
        );
        assert!(!result.is_consistent);
    }

    #[test]
    fn type_mismatch_needs_a_confident_suggestion() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);
        let elements = inventory(&[(ElementKind::State, 1), (ElementKind::Rectangle, 3)]);
        let result = validator.validate(&classified(DiagramType::Component, 0.6), &elements);

        assert_eq!(result.suggested_type, Suggestion::Type(DiagramType::State));
        assert_eq!(
            codes(&result),
            vec![
                FlagCode::ForbiddenElements,
                FlagCode::MissingPrimaryElements,
                FlagCode::TypeMismatch,
            ]
        );
        assert_eq!(
            result.flags[2].details,
            "Elements suggest state (conf: 1.00) not component"
        );
    }

    #[test]
    fn ambiguity_only_without_errors() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.5);
        let elements = inventory(&[(ElementKind::Component, 1), (ElementKind::Card, 1)]);
        let result = validator.validate(&classified(DiagramType::Component, 0.4), &elements);

        // alignment 0.5, penalty 1, presence 1
        assert_eq!(result.consistency_score, 0.8);
        assert_eq!(codes(&result), vec![FlagCode::LowConfidence]);
        assert!(result.is_consistent);

        let weak = inventory(&[(ElementKind::Component, 1), (ElementKind::Card, 3)]);
        let result = validator.validate(&classified(DiagramType::Component, 0.9), &weak);
        // alignment 0.25, penalty 1, presence 1
        assert_eq!(result.consistency_score, 0.7);
        assert!(result.flags.is_empty());

        let weaker = inventory(&[(ElementKind::Component, 1), (ElementKind::Card, 4)]);
        let result = validator.validate(&classified(DiagramType::Component, 0.9), &weaker);
        assert_eq!(result.consistency_score, 0.68);
        assert_eq!(codes(&result), vec![FlagCode::MultiTypeAmbiguous]);
        assert!(result.is_consistent);
    }

    #[test]
    fn threshold_gates_consistency() {
        let table = default_expectations();
        let validator = ConsistencyValidator::new(&table, 0.9);
        let elements = inventory(&[(ElementKind::Component, 1), (ElementKind::Card, 1)]);
        let result = validator.validate(&classified(DiagramType::Component, 0.95), &elements);
        assert_eq!(result.consistency_score, 0.8);
        assert!(!result.has_errors());
        assert!(!result.is_consistent);
    }
}
