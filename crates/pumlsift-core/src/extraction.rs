//! Element-extraction rule tables

use crate::diagram::{DiagramType, ElementKind, RelationshipCategory, TypeTable};
use serde::{Deserialize, Serialize};

/// Declaration keyword and the element kind it introduces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordBinding {
    pub keyword: String,
    pub kind: ElementKind,
}

/// Tables driving the element extractor and relationship counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Declaration keywords; matched longest-first regardless of order here
    pub keywords: Vec<KeywordBinding>,

    /// Kind given to an unlabeled endpoint of a connector, per primary type
    pub implicit_defaults: TypeTable<ElementKind>,

    /// Words never registered as implicit elements
    pub ignore_keywords: Vec<String>,

    /// Relationship category per primary type
    pub categories: TypeTable<RelationshipCategory>,
}

impl ExtractionRules {
    /// Kind bound to `keyword` (case-folded), if any
    pub fn kind_for_keyword(&self, keyword: &str) -> Option<ElementKind> {
        let keyword = keyword.to_lowercase();
        self.keywords
            .iter()
            .find(|b| b.keyword == keyword)
            .map(|b| b.kind)
    }

    /// Keywords ordered longest-first; ties keep table order
    pub fn keywords_longest_first(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.keywords.iter().map(|b| b.keyword.as_str()).collect();
        keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        keywords
    }

    pub fn is_ignored(&self, word: &str) -> bool {
        self.ignore_keywords.iter().any(|k| k == word)
    }

    pub fn implicit_default(&self, diagram_type: DiagramType) -> ElementKind {
        *self.implicit_defaults.get(diagram_type)
    }

    /// Category for a primary type; anything unscored counts as structural
    pub fn category(&self, diagram_type: Option<DiagramType>) -> RelationshipCategory {
        diagram_type
            .map(|t| *self.categories.get(t))
            .unwrap_or(RelationshipCategory::Structural)
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        let mut keywords = Vec::with_capacity(ElementKind::ALL.len() + 1);
        for kind in ElementKind::ALL {
            keywords.push(KeywordBinding {
                keyword: kind.as_str().to_string(),
                kind,
            });
            if kind == ElementKind::AbstractClass {
                keywords.push(KeywordBinding {
                    keyword: "abstract".to_string(),
                    kind,
                });
            }
        }

        let ignore_keywords = [
            "hide", "show", "remove", "skinparam", "title", "footer", "header", "legend", "note",
            "url", "left", "right", "top", "bottom", "of", "start", "stop", "end", "if", "else",
            "endif", "together", "abstract", "static", "as", "extends", "implements", "loop",
            "alt", "opt", "par", "break", "critical", "ref", "activate", "deactivate", "create",
            "destroy", "return", "newpage", "autonumber",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            keywords,
            implicit_defaults: TypeTable {
                sequence: ElementKind::Participant,
                class: ElementKind::Class,
                activity: ElementKind::Partition,
                state: ElementKind::State,
                usecase: ElementKind::Actor,
                component: ElementKind::Component,
                deployment: ElementKind::Node,
                object: ElementKind::Object,
                timing: ElementKind::Participant,
            },
            ignore_keywords,
            categories: TypeTable {
                sequence: RelationshipCategory::Message,
                class: RelationshipCategory::Structural,
                activity: RelationshipCategory::Flow,
                state: RelationshipCategory::Flow,
                usecase: RelationshipCategory::Association,
                component: RelationshipCategory::Structural,
                deployment: RelationshipCategory::Structural,
                object: RelationshipCategory::Structural,
                timing: RelationshipCategory::Message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abstract_keywords_map_to_abstract_class() {
        let rules = ExtractionRules::default();
        assert_eq!(rules.kind_for_keyword("abstract"), Some(ElementKind::AbstractClass));
        assert_eq!(
            rules.kind_for_keyword("Abstract Class"),
            Some(ElementKind::AbstractClass)
        );
        assert_eq!(rules.kind_for_keyword("usecase"), Some(ElementKind::Usecase));
        assert_eq!(rules.kind_for_keyword("actors"), None);
    }

    #[test]
    fn keywords_sorted_longest_first() {
        let rules = ExtractionRules::default();
        let keywords = rules.keywords_longest_first();
        assert_eq!(keywords[0], "abstract class");
        let class_pos = keywords.iter().position(|k| *k == "class").unwrap();
        let abstract_pos = keywords.iter().position(|k| *k == "abstract").unwrap();
        assert!(abstract_pos < class_pos);
    }

    #[test]
    fn unscored_types_default_to_structural() {
        let rules = ExtractionRules::default();
        assert_eq!(rules.category(None), RelationshipCategory::Structural);
        assert_eq!(
            rules.category(Some(DiagramType::Timing)),
            RelationshipCategory::Message
        );
        assert_eq!(
            rules.category(Some(DiagramType::Usecase)),
            RelationshipCategory::Association
        );
    }
}
