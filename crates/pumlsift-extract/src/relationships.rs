//! Relationship counting
//!
//! Every connector shape on a line counts once. At the leftmost position
//! where any shape matches, shapes are preferred in a fixed order, most
//! specific first, and a match consumes its characters so overlapping shapes
//! are never counted twice. The total lands in the single category bound to
//! the primary type.

use once_cell::sync::Lazy;
use pumlsift_core::{DiagramType, ExtractionRules, RelationshipCount};
use regex::Regex;

/// Connector shapes in match priority
///
/// Group 1 of each alternative is the connector. A trailing class after it is
/// a one-character guard that is matched but not consumed, so a failed guard
/// backtracks to a shorter stroke (`*-->` is `*-` then `->`).
const SHAPES: [&str; 15] = [
    r"(-+>>)",                        // async
    r"(<<-+)",                        // async, reversed
    r"(->x)",                         // lost
    r"(x<-)",                         // found
    r"(<\|[-.]{1,2})",                // extension
    r"([-.]{1,2}\|>)",                // extension
    r"(\*[-.]{1,2})(?:[^>]|$)",       // composition
    r"([-.]{1,2}\*)",                 // composition
    r"(o[-.]{1,2})(?:[^>]|$)",        // aggregation
    r"([-.]{1,2}o)(?:[^A-Za-z]|$)",   // aggregation
    r"(\.{2,}>)",                     // dependency
    r"(<\.{2,})",                     // dependency
    r"(<[-.]{1,2}>)",                 // bidirectional
    r"(<-+)(?:[^<]|$)",               // arrow
    r"(-+>)(?:[^>]|$)",               // arrow
];

static CONNECTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&SHAPES.join("|")).expect("valid connector regex"));

/// Count connectors in preprocessed text and bucket them by primary type
///
/// Blank lines and directive lines (`@...`, `!...`) are skipped. Without a
/// primary type the count is `structural`. No connectors gives an empty count.
pub fn count_relationships(
    clean: &str,
    primary: Option<DiagramType>,
    rules: &ExtractionRules,
) -> RelationshipCount {
    let total: usize = clean
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('@') && !line.starts_with('!'))
        .map(count_line)
        .sum();

    RelationshipCount::single(rules.category(primary), total)
}

/// Connectors on one line
pub fn count_line(line: &str) -> usize {
    let mut pos = 0;
    let mut count = 0;

    while let Some(caps) = CONNECTOR.captures_at(line, pos) {
        // Exactly one alternative participates; resume right after its connector
        let Some(connector) = caps.iter().skip(1).flatten().next() else {
            break;
        };
        count += 1;
        pos = connector.end();
    }

    count
}
