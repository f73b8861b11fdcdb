//! Element extraction and relationship counting
//!
//! Both operate on preprocessed text and take the classified primary type,
//! which picks the implicit element kind and the relationship category.

pub mod elements;
pub mod relationships;

pub use elements::{ElementExtractor, ExtractError};
pub use relationships::count_relationships;
