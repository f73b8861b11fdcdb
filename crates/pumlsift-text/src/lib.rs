//! Text handling for PlantUML sources
//!
//! This crate handles:
//! - Stripping comments, styling, sprites, directives, notes, and titles
//! - Collapsing class-like member bodies
//! - Splitting multi-diagram sources into units
//! - Line-of-code metrics

pub mod bodies;
pub mod lines;
pub mod preprocessor;
pub mod split;

pub use bodies::strip_member_bodies;
pub use lines::count_lines;
pub use preprocessor::{
    preprocess, remove_inline_comment, strip_comments, strip_footer_header, Stage,
};
pub use split::{split_diagrams, DiagramUnit};
