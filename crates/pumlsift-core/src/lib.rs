//! pumlsift core
//!
//! Stable record types, the closed feature enumeration, rule tables, and
//! configuration shared by every pumlsift crate.
//! Never rename serialized names - downstream consumers depend on them.

pub mod config;
pub mod diagram;
pub mod expectation;
pub mod extraction;
pub mod feature;
pub mod flag;
pub mod record;
pub mod report;
pub mod scoring;

pub use config::{ClassificationConfig, Config, ConfigError, ValidationConfig};
pub use diagram::{
    DiagramFamily, DiagramType, ElementKind, PrimaryType, RelationshipCategory, TypeTable,
    UnknownName,
};
pub use expectation::{default_expectations, Expectation, ExpectationTable};
pub use extraction::{ExtractionRules, KeywordBinding};
pub use feature::{Feature, FeatureSet};
pub use flag::{Flag, FlagCode, Severity, Suggestion, ValidationResult};
pub use record::{
    ClassificationResult, ElementInventory, LineMetrics, RelationshipCount, TypeScore,
};
pub use report::{DiagramReport, Report, ReportSummary, ReportVersion};
pub use scoring::{
    Condition, ContextRule, Penalty, ScoringModel, Tier, TierMultipliers, TierTable,
    WeightedFeature,
};
