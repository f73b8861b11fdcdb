//! Configuration schema (pumlsift.toml)
//!
//! Every section is optional. A section that is present replaces the
//! built-in defaults for that section only.

use crate::expectation::{default_expectations, ExpectationTable};
use crate::extraction::ExtractionRules;
use crate::scoring::{ScoringModel, Tier};
use serde::{Deserialize, Serialize};

/// Classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Minimum normalized confidence for a type to appear in `types`
    pub multi_label_threshold: f64,

    /// Attach the extracted feature set to each classification
    pub include_features: bool,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            multi_label_threshold: 0.3,
            include_features: false,
        }
    }
}

/// Consistency validator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum consistency score for a diagram to count as consistent
    pub consistency_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            consistency_threshold: 0.5,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classification: ClassificationConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    /// Tier weights, context rules, and penalties
    #[serde(default)]
    pub scoring: ScoringModel,

    /// Keyword bindings, implicit defaults, ignored words, categories
    #[serde(default)]
    pub extraction: ExtractionRules,

    /// Expected element composition per type
    #[serde(default = "default_expectations")]
    pub expectations: ExpectationTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classification: ClassificationConfig::default(),
            validation: ValidationConfig::default(),
            scoring: ScoringModel::default(),
            extraction: ExtractionRules::default(),
            expectations: default_expectations(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Reject thresholds and penalty factors outside `[0, 1]`, non-positive
    /// tier multipliers, and negative or non-finite weights
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval(
            "classification.multi_label_threshold",
            self.classification.multi_label_threshold,
        )?;
        check_unit_interval(
            "validation.consistency_threshold",
            self.validation.consistency_threshold,
        )?;

        for tier in Tier::ALL {
            let multiplier = self.scoring.multipliers.get(tier);
            if !(multiplier > 0.0 && multiplier.is_finite()) {
                return Err(ConfigError::InvalidValue(format!(
                    "scoring.multipliers.{} must be positive, got {multiplier}",
                    tier.as_str()
                )));
            }
        }

        for (diagram_type, table) in self.scoring.tiers.iter() {
            for tier in Tier::ALL {
                for entry in table.get(tier) {
                    check_weight(
                        &format!("scoring.tiers.{diagram_type}.{}.{}", tier.as_str(), entry.feature),
                        entry.weight,
                    )?;
                }
            }
        }

        for rule in &self.scoring.context_rules {
            let name = format!("scoring.context_rules.{}.{}", rule.diagram_type, rule.feature);
            check_weight(&format!("{name}.weight_if_true"), rule.weight_if_true)?;
            check_weight(&format!("{name}.weight_otherwise"), rule.weight_otherwise)?;
        }

        for (diagram_type, penalties) in self.scoring.penalties.iter() {
            for penalty in penalties {
                check_unit_interval(
                    &format!("scoring.penalties.{diagram_type}.{}", penalty.feature),
                    penalty.factor,
                )?;
            }
        }

        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

fn check_weight(name: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
