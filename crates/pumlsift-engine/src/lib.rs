//! pumlsift engine
//!
//! This crate joins the pipeline:
//! - Consistency validation of a classification against its elements
//! - Per-diagram analysis into a `DiagramReport`
//! - Multi-diagram source handling

pub mod analyzer;
pub mod consistency;

pub use analyzer::{fingerprint, AnalysisError, Analyzer};
pub use consistency::ConsistencyValidator;
