//! Per-diagram result records
//!
//! All records are created fresh for each diagram and never mutated after the
//! component that produced them returns.

use crate::diagram::{DiagramFamily, DiagramType, ElementKind, PrimaryType, RelationshipCategory};
use crate::feature::FeatureSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw and normalized score of one candidate type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeScore {
    pub diagram_type: DiagramType,

    /// Weighted sum after penalties (non-negative)
    pub raw: f64,

    /// `raw / sum(raw)`, or 0 when every raw score is 0
    pub confidence: f64,
}

/// Classification of one diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub family: DiagramFamily,

    /// `None` for non-UML families
    pub primary_type: Option<PrimaryType>,

    /// Types whose normalized confidence reaches the multi-label threshold
    pub types: BTreeMap<DiagramType, f64>,

    /// Primary confidence rounded to 4 decimals; `None` for non-UML families
    pub confidence: Option<f64>,

    /// Extracted indicators, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureSet>,
}

impl ClassificationResult {
    /// Result for a diagram outside the UML family
    pub fn non_uml(family: DiagramFamily) -> Self {
        Self {
            family,
            primary_type: None,
            types: BTreeMap::new(),
            confidence: None,
            features: None,
        }
    }

    /// Result for a UML diagram with no detected features
    pub fn unclassified() -> Self {
        Self {
            family: DiagramFamily::Uml,
            primary_type: Some(PrimaryType::Unclassified),
            types: BTreeMap::new(),
            confidence: Some(0.0),
            features: None,
        }
    }

    /// The scored UML type, if there is one
    pub fn diagram_type(&self) -> Option<DiagramType> {
        self.primary_type.and_then(|p| p.diagram_type())
    }

    pub fn is_multi_label(&self) -> bool {
        self.types.len() > 1
    }

    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = Some(features);
        self
    }
}

/// Distinct element count per kind; kinds with no elements are absent
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementInventory(BTreeMap<ElementKind, usize>);

impl ElementInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` elements of `kind`; zero counts are not stored
    pub fn insert(&mut self, kind: ElementKind, count: usize) {
        if count > 0 {
            self.0.insert(kind, count);
        } else {
            self.0.remove(&kind);
        }
    }

    pub fn get(&self, kind: ElementKind) -> usize {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Summed count over `kinds`
    pub fn count_of(&self, kinds: &[ElementKind]) -> usize {
        kinds.iter().map(|k| self.get(*k)).sum()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(kind, count)` pairs in kind declaration order
    pub fn iter(&self) -> impl Iterator<Item = (ElementKind, usize)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(ElementKind, usize)> for ElementInventory {
    fn from_iter<I: IntoIterator<Item = (ElementKind, usize)>>(iter: I) -> Self {
        let mut inventory = Self::new();
        for (kind, count) in iter {
            inventory.insert(kind, count);
        }
        inventory
    }
}

/// Connector count bucketed into a single category
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipCount(BTreeMap<RelationshipCategory, usize>);

impl RelationshipCount {
    /// Empty when `count` is zero
    pub fn single(category: RelationshipCategory, count: usize) -> Self {
        let mut map = BTreeMap::new();
        if count > 0 {
            map.insert(category, count);
        }
        Self(map)
    }

    pub fn get(&self, category: RelationshipCategory) -> usize {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RelationshipCategory, usize)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// Line-of-code metrics for one diagram unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineMetrics {
    /// Lines carrying diagram code
    pub loc: usize,
    pub total_lines: usize,
    pub blank_lines: usize,
    pub comment_lines: usize,
}
