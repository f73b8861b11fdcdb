//! Validation flags and the consistency verdict
//!
//! IMPORTANT: Flag codes are stable.
//! NEVER rename or remove codes - downstream reports filter on them.
//! Add new codes with new names only.

use crate::diagram::{DiagramType, UnknownName};
use serde::{Deserialize, Serialize};

/// Validation flag registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagCode {
    /// No elements were extracted for a type that normally declares some
    NoElements,

    /// The inventory contains element kinds the primary type forbids
    ForbiddenElements,

    /// None of the primary type's expected element kinds were found
    MissingPrimaryElements,

    /// The element composition points at a different type
    TypeMismatch,

    /// Confident classification, yet the elements disagree
    HighConfidenceMismatch,

    /// Classification confidence below 0.5
    LowConfidence,

    /// Elements do not align strongly with any single type
    MultiTypeAmbiguous,
}

impl FlagCode {
    /// Get the flag code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoElements => "NO_ELEMENTS",
            Self::ForbiddenElements => "FORBIDDEN_ELEMENTS",
            Self::MissingPrimaryElements => "MISSING_PRIMARY_ELEMENTS",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::HighConfidenceMismatch => "HIGH_CONFIDENCE_MISMATCH",
            Self::LowConfidence => "LOW_CONFIDENCE",
            Self::MultiTypeAmbiguous => "MULTI_TYPE_AMBIGUOUS",
        }
    }

    /// Severity every flag with this code carries
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoElements | Self::MissingPrimaryElements => Severity::Warning,
            Self::ForbiddenElements | Self::TypeMismatch | Self::HighConfidenceMismatch => {
                Severity::Error
            }
            Self::LowConfidence | Self::MultiTypeAmbiguous => Severity::Info,
        }
    }
}

impl std::fmt::Display for FlagCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flag severity level, ordered `Info < Warning < Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth a look, never blocks consistency
    Info,

    /// Suspicious but not conclusive
    Warning,

    /// Marks the diagram as inconsistent
    Error,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Self::Error, Self::Warning, Self::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub code: FlagCode,
    pub severity: Severity,

    /// Human-readable explanation
    pub details: String,
}

impl Flag {
    /// Create a flag; severity follows the code
    pub fn new(code: FlagCode, details: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            details: details.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.details)
    }
}

/// Type inferred from the element composition alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Suggestion {
    Type(DiagramType),

    /// No type scored above zero
    Unknown,
}

impl Suggestion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type(t) => t.as_str(),
            Self::Unknown => "unknown",
        }
    }

    pub fn diagram_type(&self) -> Option<DiagramType> {
        match self {
            Self::Type(t) => Some(*t),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Suggestion> for String {
    fn from(s: Suggestion) -> Self {
        s.as_str().to_string()
    }
}

impl TryFrom<String> for Suggestion {
    type Error = UnknownName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == "unknown" {
            return Ok(Self::Unknown);
        }
        s.parse::<DiagramType>().map(Self::Type)
    }
}

/// Outcome of cross-checking a classification against its element inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Alignment between primary type and elements, in `[0, 1]`
    pub consistency_score: f64,

    pub suggested_type: Suggestion,

    pub suggestion_confidence: f64,

    /// Flags in detection order
    pub flags: Vec<Flag>,

    pub is_consistent: bool,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.flags.iter().any(Flag::is_error)
    }

    /// Highest severity among the flags, if any were raised
    pub fn max_severity(&self) -> Option<Severity> {
        self.flags.iter().map(|f| f.severity).max()
    }

    pub fn has_flag(&self, code: FlagCode) -> bool {
        self.flags.iter().any(|f| f.code == code)
    }
}
