//! Diagram classification
//!
//! This crate handles:
//! - Detecting the diagram family from start tags
//! - Extracting lexical indicators from preprocessed text
//! - Tiered weighted scoring into multi-label type confidences

pub mod classifier;
pub mod features;

pub use classifier::{detect_family, Classifier};
pub use features::extract_features;
