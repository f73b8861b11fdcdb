//! Class-like body collapsing
//!
//! Member lists (`class A { +run() : void }`) are full of colons, parens,
//! and keywords that look like actors, use cases, or objects. Collapsing
//! every class/interface/enum/struct body to `{ }` keeps those detectors
//! honest.

use once_cell::sync::Lazy;
use regex::Regex;

static CLASS_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:abstract\s+)?(?:class|interface|enum|struct)\s+\S+")
        .expect("valid class-like regex")
});

/// Replace each class-like body with `{ }`
///
/// Everything between the declaration and its opening brace (stereotypes,
/// `extends` clauses) is kept. Nested braces such as `{static}` are tracked
/// by depth; an unclosed body runs to the end of the text.
pub fn strip_member_bodies(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while let Some(m) = CLASS_LIKE.find_at(text, i) {
        result.push_str(&text[i..m.end()]);
        i = m.end();

        match text[i..].find('{') {
            Some(offset) => {
                result.push_str(&text[i..i + offset]);
                i += offset + 1;
                i = skip_body(text, i);
                result.push_str("{ }");
            }
            None => {
                result.push_str(&text[i..]);
                return result;
            }
        }
    }

    result.push_str(&text[i..]);
    result
}

/// Index just past the brace closing a body opened before `start`
fn skip_body(text: &str, start: usize) -> usize {
    let mut depth = 1usize;
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return start + offset + 1;
                }
            }
            _ => {}
        }
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collapses_member_body() {
        let text = "class User {\n  +login(name : String) : bool\n}\nUser --> Role";
        assert_eq!(strip_member_bodies(text), "class User { }\nUser --> Role");
    }

    #[test]
    fn keeps_stereotype_and_handles_nested_braces() {
        let text = "abstract class Shape <<entity>> {\n  {static} +count : int\n  {abstract} area()\n}\n:Actor:";
        assert_eq!(
            strip_member_bodies(text),
            "abstract class Shape <<entity>> { }\n:Actor:"
        );
    }

    #[test]
    fn declaration_without_body_is_untouched() {
        let text = "interface Runnable\nenum Color\n";
        assert_eq!(strip_member_bodies(text), text);
    }

    #[test]
    fn unclosed_body_runs_to_end() {
        assert_eq!(strip_member_bodies("struct P {\n x : int\n"), "struct P { }");
    }

    #[test]
    fn word_boundary_is_required() {
        let text = "subclass X { a }";
        assert_eq!(strip_member_bodies(text), text);
    }
}
