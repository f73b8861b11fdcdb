//! Multi-diagram source splitting

use once_cell::sync::Lazy;
use regex::Regex;

static START_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*@start\w*").expect("valid start tag regex"));
static END_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*@end\w*").expect("valid end tag regex"));

/// One `@start…`/`@end…` block, ready for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramUnit {
    pub id: String,
    pub text: String,
}

/// Split a source into its diagram blocks
///
/// Any `@start<word>` opens a block and any `@end<word>` closes it, so
/// `@startditaa` and typos like `@endum1` are handled alike. A start tag inside
/// an open block restarts it; an end tag outside a block and an unterminated
/// trailing block are dropped. The leading comment header of the source is
/// prepended to every unit. Ids get a `_NN` suffix only when there is more than
/// one unit.
pub fn split_diagrams(id: &str, text: &str) -> Vec<DiagramUnit> {
    let blocks = find_blocks(text);
    let header = leading_header(text);
    let multiple = blocks.len() > 1;

    blocks
        .into_iter()
        .enumerate()
        .map(|(index, block)| {
            let mut unit = String::with_capacity(header.len() + block.len() + 1);
            unit.push_str(&header);
            if !header.is_empty() && !header.ends_with('\n') {
                unit.push('\n');
            }
            unit.push_str(&block);

            let id = if multiple {
                format!("{id}_{:02}", index + 1)
            } else {
                id.to_string()
            };
            DiagramUnit { id, text: unit }
        })
        .collect()
}

fn find_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut inside = false;

    for line in text.split_inclusive('\n') {
        if START_TAG.is_match(line) {
            inside = true;
            current.clear();
            current.push_str(line);
        } else if END_TAG.is_match(line) {
            if inside {
                current.push_str(line);
                blocks.push(std::mem::take(&mut current));
                inside = false;
            }
        } else if inside {
            current.push_str(line);
        }
    }

    blocks
}

/// Blank and `'` comment lines before the first other line
fn leading_header(text: &str) -> String {
    text.split_inclusive('\n')
        .take_while(|line| {
            let trimmed = line.trim();
            trimmed.is_empty() || trimmed.starts_with('\'')
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_diagram_keeps_id() {
        let units = split_diagrams("a.puml", "@startuml\nA -> B\n@enduml\n");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, "a.puml");
        assert_eq!(units[0].text, "@startuml\nA -> B\n@enduml\n");
    }

    #[test]
    fn multiple_diagrams_get_suffixes_and_header() {
        let text = "' source: repo\n\n@startuml\nA -> B\n@enduml\ntext between\n@startuml\nclass C\n@endum1";
        let units = split_diagrams("doc", text);

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].id, "doc_01");
        assert_eq!(units[1].id, "doc_02");
        assert_eq!(units[0].text, "' source: repo\n\n@startuml\nA -> B\n@enduml\n");
        assert_eq!(units[1].text, "' source: repo\n\n@startuml\nclass C\n@endum1");
    }

    #[test]
    fn stray_end_and_unterminated_block_are_dropped() {
        let text = "@enduml\n@startuml\nA -> B\n@enduml\n@startditaa\n+--+\n";
        let units = split_diagrams("x", text);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "@startuml\nA -> B\n@enduml\n");
    }

    #[test]
    fn restarted_block_discards_partial_content() {
        let text = "@startuml\nlost\n  @StartUML\nkept\n@enduml";
        let units = split_diagrams("x", text);
        assert_eq!(units[0].text, "  @StartUML\nkept\n@enduml");
    }

    #[test]
    fn header_without_trailing_newline_gets_one() {
        assert_eq!(leading_header("'only comment"), "'only comment");
        assert!(split_diagrams("x", "'only comment").is_empty());
    }

    #[test]
    fn no_blocks_yields_nothing() {
        assert!(split_diagrams("x", "").is_empty());
        assert!(split_diagrams("x", "A -> B\n").is_empty());
    }
}
