//! Tiered scoring and classification
//!
//! Each UML type accumulates `weight * tier multiplier` over its present
//! features, context rules may replace a feature's weight, and penalties scale
//! the total down when a conflicting feature is present. Raw scores are then
//! normalized into confidences.

use crate::features::extract_features;
use pumlsift_core::{
    ClassificationResult, DiagramFamily, DiagramType, FeatureSet, PrimaryType, ScoringModel,
    Tier, TypeScore,
};
use pumlsift_text::preprocess;
use std::collections::BTreeMap;

/// Non-UML families recognized by their start tag
const FAMILY_MARKERS: [(&str, DiagramFamily); 4] = [
    ("@startdot", DiagramFamily::Graphviz),
    ("@startditaa", DiagramFamily::Ditaa),
    ("@startsalt", DiagramFamily::Salt),
    ("@startgantt", DiagramFamily::Gantt),
];

/// Detect the diagram family from raw text
///
/// Markers are checked case-insensitively anywhere in the text, in a fixed
/// order; everything else is UML.
pub fn detect_family(raw: &str) -> DiagramFamily {
    let lower = raw.to_lowercase();
    FAMILY_MARKERS
        .iter()
        .find(|(marker, _)| lower.contains(marker))
        .map(|(_, family)| *family)
        .unwrap_or(DiagramFamily::Uml)
}

/// Tiered multi-label classifier
pub struct Classifier<'a> {
    model: &'a ScoringModel,
    threshold: f64,
    include_features: bool,
}

impl<'a> Classifier<'a> {
    /// Create a classifier; `threshold` is the minimum confidence for a type
    /// to be listed in `types`
    pub fn new(model: &'a ScoringModel, threshold: f64) -> Self {
        Self {
            model,
            threshold,
            include_features: false,
        }
    }

    /// Attach the feature set to UML results
    pub fn with_features(mut self, include: bool) -> Self {
        self.include_features = include;
        self
    }

    /// Raw score of one type after context rules and penalties
    pub fn raw_score(&self, features: &FeatureSet, diagram_type: DiagramType) -> f64 {
        let table = self.model.tiers.get(diagram_type);
        let mut score = 0.0;

        for tier in Tier::ALL {
            let multiplier = self.model.multipliers.get(tier);
            for entry in table.get(tier) {
                if !features.get(entry.feature) {
                    continue;
                }
                let weight = self
                    .model
                    .context_rule(entry.feature, diagram_type)
                    .map(|rule| rule.weight(features))
                    .unwrap_or(entry.weight);
                score += weight * multiplier;
            }
        }

        for penalty in self.model.penalties.get(diagram_type) {
            if features.get(penalty.feature) {
                score *= penalty.factor;
            }
        }

        score
    }

    /// Raw and normalized scores for every type, in canonical order
    pub fn score(&self, features: &FeatureSet) -> Vec<TypeScore> {
        let raw: Vec<(DiagramType, f64)> = DiagramType::ALL
            .iter()
            .map(|t| (*t, self.raw_score(features, *t)))
            .collect();
        let total: f64 = raw.iter().map(|(_, s)| s).sum();

        raw.into_iter()
            .map(|(diagram_type, raw)| {
                let confidence = if total > 0.0 { raw / total } else { 0.0 };
                tracing::trace!(
                    diagram_type = diagram_type.as_str(),
                    raw,
                    confidence,
                    "scored type"
                );
                TypeScore {
                    diagram_type,
                    raw,
                    confidence,
                }
            })
            .collect()
    }

    /// Classify raw diagram text
    pub fn classify(&self, raw: &str) -> ClassificationResult {
        match detect_family(raw) {
            DiagramFamily::Uml => self.classify_preprocessed(&preprocess(raw)),
            family => ClassificationResult::non_uml(family),
        }
    }

    /// Classify text already known to be UML and already preprocessed
    pub fn classify_preprocessed(&self, clean: &str) -> ClassificationResult {
        let features = extract_features(clean);
        let scores = self.score(&features);

        let total: f64 = scores.iter().map(|s| s.raw).sum();
        let result = if total <= 0.0 {
            ClassificationResult::unclassified()
        } else {
            self.rank(&scores)
        };

        if self.include_features {
            result.with_features(features)
        } else {
            result
        }
    }

    fn rank(&self, scores: &[TypeScore]) -> ClassificationResult {
        // First maximum wins, so ties resolve in canonical order
        let mut best = scores[0];
        for score in &scores[1..] {
            if score.confidence > best.confidence {
                best = *score;
            }
        }

        let types: BTreeMap<DiagramType, f64> = scores
            .iter()
            .filter(|s| s.confidence >= self.threshold)
            .map(|s| (s.diagram_type, s.confidence))
            .collect();

        ClassificationResult {
            family: DiagramFamily::Uml,
            primary_type: Some(PrimaryType::Type(best.diagram_type)),
            types,
            confidence: Some(round4(best.confidence)),
            features: None,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumlsift_core::{Feature, Penalty, TierTable, TypeTable, WeightedFeature};

    /// Every type scores `feature` alike at weight 1 in the moderate tier
    fn uniform_model(feature: Feature) -> ScoringModel {
        ScoringModel {
            tiers: TypeTable::from_fn(|_| TierTable {
                moderate: vec![WeightedFeature {
                    feature,
                    weight: 1.0,
                }],
                ..Default::default()
            }),
            context_rules: Vec::new(),
            penalties: TypeTable::default(),
            ..ScoringModel::default()
        }
    }

    #[test]
    fn family_markers() {
        assert_eq!(detect_family("@startuml\nA -> B\n@enduml"), DiagramFamily::Uml);
        assert_eq!(detect_family("@StartDot\ndigraph {}"), DiagramFamily::Graphviz);
        assert_eq!(detect_family("@startditaa\n+--+"), DiagramFamily::Ditaa);
        assert_eq!(detect_family("@startsalt\n{}"), DiagramFamily::Salt);
        assert_eq!(detect_family("@startgantt\n[T] lasts 1 day"), DiagramFamily::Gantt);
    }

    #[test]
    fn non_uml_has_no_primary() {
        let model = ScoringModel::default();
        let result = Classifier::new(&model, 0.3).classify("@startsalt\n{\n}\n@endsalt");
        assert_eq!(result.family, DiagramFamily::Salt);
        assert_eq!(result.primary_type, None);
        assert_eq!(result.confidence, None);
        assert!(result.types.is_empty());
    }

    #[test]
    fn featureless_diagram_is_unclassified() {
        let model = ScoringModel::default();
        let result = Classifier::new(&model, 0.3).classify("@startuml\n@enduml");
        assert_eq!(result.primary_type, Some(PrimaryType::Unclassified));
        assert_eq!(result.confidence, Some(0.0));
        assert!(result.types.is_empty());
    }

    #[test]
    fn simple_sequence() {
        let model = ScoringModel::default();
        let classifier = Classifier::new(&model, 0.3);
        let result = classifier.classify("@startuml\nAlice -> Bob: hello\n@enduml");
        assert_eq!(result.diagram_type(), Some(DiagramType::Sequence));
        assert!(result.types.contains_key(&DiagramType::Sequence));
    }

    #[test]
    fn confidences_sum_to_one() {
        let model = ScoringModel::default();
        let classifier = Classifier::new(&model, 0.3);
        let features = extract_features("class A\nA --|> B\nstate S\nS --> T\n");
        let scores = classifier.score(&features);
        let sum: f64 = scores.iter().map(|s| s.confidence).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(scores.iter().all(|s| s.raw >= 0.0));
    }

    #[test]
    fn types_respect_threshold_and_contain_primary() {
        let model = ScoringModel::default();
        let classifier = Classifier::new(&model, 0.3);
        let result = classifier.classify("@startuml\nstate A\nstate B\nA --> B\n[*] --> A\n@enduml");
        let primary = result.diagram_type().unwrap();
        assert_eq!(primary, DiagramType::State);
        assert!(result.types.values().all(|c| *c >= 0.3));
        assert!(result.types.contains_key(&primary));
    }

    #[test]
    fn ties_resolve_in_canonical_order() {
        let model = uniform_model(Feature::HasEnd);

        let result = Classifier::new(&model, 0.1).classify_preprocessed("end\n");
        assert_eq!(result.diagram_type(), Some(DiagramType::Sequence));
        assert_eq!(result.types.len(), 9);
    }

    #[test]
    fn non_positive_total_is_unclassified() {
        let mut model = uniform_model(Feature::HasEnd);
        for diagram_type in DiagramType::ALL {
            model.tiers.get_mut(diagram_type).moderate[0].weight = -1.0;
        }

        let result = Classifier::new(&model, 0.3).classify_preprocessed("end\n");
        assert_eq!(result.primary_type, Some(PrimaryType::Unclassified));
        assert!(result.types.is_empty());
    }

    #[test]
    fn penalties_multiply() {
        let mut model = uniform_model(Feature::HasEnd);
        model.penalties.get_mut(DiagramType::Sequence).push(Penalty {
            feature: Feature::HasEnd,
            factor: 0.5,
        });

        let classifier = Classifier::new(&model, 0.3);
        let features = extract_features("end\n");
        assert_eq!(classifier.raw_score(&features, DiagramType::Class), 1.0);
        assert_eq!(classifier.raw_score(&features, DiagramType::Sequence), 0.5);
    }

    #[test]
    fn include_features_attaches_set() {
        let model = ScoringModel::default();
        let result = Classifier::new(&model, 0.3)
            .with_features(true)
            .classify("@startuml\nclass A\n@enduml");
        let features = result.features.unwrap();
        assert!(features.get(Feature::HasClass));
    }
}
