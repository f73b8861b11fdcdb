//! Line-of-code metrics

use crate::preprocessor::remove_inline_comment;
use once_cell::sync::Lazy;
use pumlsift_core::LineMetrics;
use regex::Regex;

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/'.*?'/").expect("valid block comment regex"));
static UML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*@(start|end)uml\s*$").expect("valid uml tag regex"));

/// Number of leading comment lines treated as a metadata header
const METADATA_HEADER_LINES: usize = 3;

/// Count code, blank, and comment lines of a diagram source
///
/// `total_lines` is the raw line count. A metadata header of three comment
/// lines is skipped, block comments are removed, and `@startuml`/`@enduml`
/// lines are not counted at all. A line with code and a trailing comment
/// counts as code.
pub fn count_lines(text: &str) -> LineMetrics {
    let lines: Vec<&str> = text.split('\n').collect();
    let total_lines = lines.len();

    let has_metadata_header = lines.len() >= METADATA_HEADER_LINES
        && lines[..METADATA_HEADER_LINES]
            .iter()
            .all(|line| line.trim().starts_with('\''));
    let body = if has_metadata_header {
        lines[METADATA_HEADER_LINES..].join("\n")
    } else {
        text.to_string()
    };
    let body = BLOCK_COMMENT.replace_all(&body, "");

    let mut metrics = LineMetrics {
        total_lines,
        ..LineMetrics::default()
    };

    for line in body.split('\n') {
        if UML_TAG.is_match(line) {
            continue;
        }
        if line.trim().is_empty() {
            metrics.blank_lines += 1;
        } else if line.trim_start().starts_with('\'') {
            metrics.comment_lines += 1;
        } else if !remove_inline_comment(line).trim().is_empty() {
            metrics.loc += 1;
        }
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_code_blank_and_comment_lines() {
        let text = "@startuml\n' a comment\n\nAlice -> Bob : hi ' trailing\n/' block\ncomment '/\nBob -> Alice\n@enduml";
        let metrics = count_lines(text);
        assert_eq!(
            metrics,
            LineMetrics {
                loc: 2,
                total_lines: 8,
                blank_lines: 2,
                comment_lines: 1,
            }
        );
    }

    #[test]
    fn metadata_header_is_skipped() {
        let text = "' repo: x\n' file: y\n' license: z\n@startuml\nclass A\n@enduml";
        let metrics = count_lines(text);
        assert_eq!(metrics.total_lines, 6);
        assert_eq!(metrics.comment_lines, 0);
        assert_eq!(metrics.loc, 1);
    }

    #[test]
    fn two_comment_lines_are_not_a_header() {
        let metrics = count_lines("' a\n' b\nclass A");
        assert_eq!(metrics.comment_lines, 2);
        assert_eq!(metrics.loc, 1);
    }

    #[test]
    fn empty_text() {
        let metrics = count_lines("");
        assert_eq!(metrics.total_lines, 1);
        assert_eq!(metrics.blank_lines, 1);
        assert_eq!(metrics.loc, 0);
    }
}
