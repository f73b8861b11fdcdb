//! Element extraction
//!
//! Counts the distinct elements of a diagram. Names are deduplicated
//! case-insensitively across every kind, and aliases (`as X`) share the same
//! namespace as the names they stand for.
//!
//! Passes run in a fixed order and each one only adds names the earlier ones
//! have not claimed:
//! 1. explicit keyword declarations (`class Foo`, `actor "Bar" as B`)
//! 2. bracket components (`[Web]`)
//! 3. lollipop interfaces (`() Api`)
//! 4. parenthesized use cases (use case diagrams only)
//! 5. creole actors `:Name:` (use case and sequence diagrams only)
//! 6. implicit endpoints of connectors, then bracket endpoints, then
//!    sequence message participants (sequence diagrams only)

use once_cell::sync::Lazy;
use pumlsift_core::{DiagramType, ElementInventory, ElementKind, ExtractionRules};
use pumlsift_text::strip_member_bodies;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap, HashSet};

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid extraction regex")
}

static BRACKET_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    re(r#"(?m)^\s*\[([^\]]+)\](?:\s*<<[^>]*>>)?(?:\s*#[a-zA-Z0-9]+)?(?:\s+as\s+(?:"([^"]+)"|([\w.$]+)))?"#)
});

static LOLLIPOP_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    re(r#"(?m)^\s*\(\s*\)\s*(?:"([^"]+)"|([\w.$]+))(?:\s*<<[^>]*>>)?(?:\s+as\s+(?:"([^"]+)"|([\w.$]+)))?"#)
});

static USECASE_PARENS: Lazy<Regex> = Lazy::new(|| {
    re(r"(?m)(?:^|\s)\(([^()*\n][^)\n]*?)\)(?:\s+as\s+\(([^)]+)\))?(?:\s+as\s+([\w.$]+))?")
});

static USECASE_QUOTED_ALIAS: Lazy<Regex> = Lazy::new(|| re(r#""([^"]+)"\s+as\s+\(([^)]+)\)"#));

static CREOLE_ALIAS: Lazy<Regex> = Lazy::new(|| re(r"^\s+as\s+([\w.$]+)"));

static RELATION: Lazy<Regex> = Lazy::new(|| {
    let endpoint = |name: &str| {
        format!(r#"(?:"(?P<{name}_q>[^"]+)"|(?P<{name}_w>[\w.$]+)|\((?P<{name}_p>[^()*\n][^)\n]*)\)|\(\*\))"#)
    };
    let arrow = concat!(
        r"(?:->>|<<-|->x|x<-|<->",
        r"|(?:<\|)?[-.](?:up|down|left|right|u|d|l|r)?[-.][-.]?(?:\|>|>)?",
        r"|(?:<)?[-.][-.]+(?:\|>|>)?",
        r"|[*o#x+^0][-.][-.]+|[-.][-.]+[*o#x+^0]",
        r"|\.\.+>|<\.\.+",
        r"|<-+|-+>)",
    );
    re(&format!(
        r#"(?:^|\s){left}(?:[ \t]*"[^"\n]*")?[ \t]*{arrow}[ \t]*(?:"[^"\n]*"[ \t]*)?(?:\[[^\]\n]*\][ \t]*)?{right}"#,
        left = endpoint("left"),
        right = endpoint("right"),
    ))
});

static BRACKET_LEFT_OF_ARROW: Lazy<Regex> =
    Lazy::new(|| re(r"\[([^\]]+)\]\s*(?:--?>|<--?|\.\.>|<\.\.|\*--|--\*|o--|--o)"));

static BRACKET_RIGHT_OF_ARROW: Lazy<Regex> =
    Lazy::new(|| re(r"(?:--?>|<--?|\.\.>|<\.\.|\*--|--\*|o--|--o)\s*\[([^\]]+)\]"));

static SEQUENCE_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    re(r#"(?m)^\s*(?:"([^"]+)"|([\w.$]+))\s*(<?-+>>?|<?\.+>?)\s*(?:"([^"]+)"|([\w.$]+))\s*:\s*"#)
});

static CARDINALITY: Lazy<Regex> = Lazy::new(|| re(r"^[\d*]+(?:\.\.[\d*]+)?$"));

static GENERICS: Lazy<Regex> = Lazy::new(|| re(r"<[^>]+>"));

/// Bracket contents that are state markers, not components
const STATE_MARKERS: [&str; 3] = ["*", "H", "H*"];

/// Element extraction error
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid declaration keywords: {0}")]
    InvalidKeywords(#[from] regex::Error),
}

/// Element extractor bound to one set of extraction rules
pub struct ElementExtractor<'a> {
    rules: &'a ExtractionRules,
    explicit: Regex,
}

impl<'a> ElementExtractor<'a> {
    /// Compile the declaration pattern for the configured keywords
    pub fn new(rules: &'a ExtractionRules) -> Result<Self, ExtractError> {
        let keywords = rules
            .keywords_longest_first()
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let explicit = Regex::new(&format!(
            r#"(?mi)^\s*[+\-#~]?({keywords})\s+(?:"([^"]+)"|([\w.$]+(?:<[^>]+>)?))(?:\s*<<[^>]*>>)?(?:\s*#[a-zA-Z0-9]+)?(?:\s+as\s+(?:"([^"]+)"|([\w.$]+)))?"#
        ))?;

        Ok(Self { rules, explicit })
    }

    /// Count distinct elements of preprocessed text
    ///
    /// `primary` is the classified type; without one (unclassified or
    /// non-UML) the inventory is empty.
    pub fn extract(&self, clean: &str, primary: Option<DiagramType>) -> ElementInventory {
        let Some(primary) = primary else {
            return ElementInventory::new();
        };

        let mut registry = Registry::new(self.rules);

        self.explicit_pass(clean, primary, &mut registry);
        trace_pass("explicit", &registry);

        bracket_pass(clean, &mut registry);
        trace_pass("bracket", &registry);

        lollipop_pass(clean, &mut registry);
        trace_pass("lollipop", &registry);

        if primary == DiagramType::Usecase {
            usecase_pass(clean, &mut registry);
            trace_pass("usecase", &registry);
        }

        if matches!(primary, DiagramType::Usecase | DiagramType::Sequence) {
            creole_actor_pass(&strip_member_bodies(clean), &mut registry);
            trace_pass("creole_actor", &registry);
        }

        implicit_pass(clean, primary, &mut registry);
        trace_pass("implicit", &registry);

        registry.inventory()
    }

    fn explicit_pass(&self, text: &str, primary: DiagramType, registry: &mut Registry) {
        for caps in self.explicit.captures_iter(text) {
            let keyword = caps[1].to_lowercase();
            let keyword = if keyword.contains("abstract") && keyword.contains("class") {
                "abstract class".to_string()
            } else {
                keyword
            };
            if keyword == "group" && primary == DiagramType::Sequence {
                continue;
            }
            let Some(kind) = self.rules.kind_for_keyword(&keyword) else {
                continue;
            };
            let Some(name) = first_group(&caps, &[2, 3]) else {
                continue;
            };

            let name = name.trim();
            let lower = name.to_lowercase();
            if registry.is_declared(&lower) {
                continue;
            }
            registry.add(kind, name);

            let without_generics = GENERICS.replace_all(name, "").to_lowercase();
            if without_generics != lower {
                registry.declared.insert(without_generics);
            }

            if let Some(alias) = first_group(&caps, &[4, 5]) {
                registry.alias(alias.trim(), name);
            }
        }
    }
}

fn trace_pass(pass: &str, registry: &Registry) {
    tracing::trace!(pass, declared = registry.declared.len(), "extraction pass");
}

/// First non-empty capture among `groups`
fn first_group<'t>(caps: &Captures<'t>, groups: &[usize]) -> Option<&'t str> {
    groups
        .iter()
        .filter_map(|g| caps.get(*g))
        .map(|m| m.as_str())
        .find(|s| !s.is_empty())
}

/// Names found so far, with the shared case-folded namespace
struct Registry<'a> {
    rules: &'a ExtractionRules,
    declared: HashSet<String>,
    aliases: HashMap<String, String>,
    names: BTreeMap<ElementKind, Vec<String>>,
}

impl<'a> Registry<'a> {
    fn new(rules: &'a ExtractionRules) -> Self {
        Self {
            rules,
            declared: HashSet::new(),
            aliases: HashMap::new(),
            names: BTreeMap::new(),
        }
    }

    fn is_declared(&self, lower: &str) -> bool {
        self.declared.contains(lower)
    }

    fn add(&mut self, kind: ElementKind, name: &str) {
        self.names.entry(kind).or_default().push(name.to_string());
        self.declared.insert(name.to_lowercase());
    }

    fn alias(&mut self, alias: &str, canonical: &str) {
        let lower = alias.to_lowercase();
        self.aliases.insert(lower.clone(), canonical.to_string());
        self.declared.insert(lower);
    }

    /// Connector endpoint of the diagram's default kind
    fn add_implicit(&mut self, kind: ElementKind, name: &str) {
        let name = name.trim();
        if name.is_empty() || CARDINALITY.is_match(name) {
            return;
        }
        let lower = name.to_lowercase();
        if self.rules.is_ignored(&lower)
            || self.is_declared(&lower)
            || self.aliases.contains_key(&lower)
            || self.rules.kind_for_keyword(&lower).is_some()
        {
            return;
        }
        self.add(kind, name);
    }

    /// `[Name]` seen next to a connector
    fn add_bracket_endpoint(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() || STATE_MARKERS.contains(&name) {
            return;
        }
        let lower = name.to_lowercase();
        if self.is_declared(&lower) || self.aliases.contains_key(&lower) {
            return;
        }
        self.add(ElementKind::Component, name);
    }

    fn inventory(&self) -> ElementInventory {
        self.names
            .iter()
            .map(|(kind, names)| (*kind, names.len()))
            .collect()
    }
}

fn bracket_pass(text: &str, registry: &mut Registry) {
    for caps in BRACKET_DECLARATION.captures_iter(text) {
        let name = caps[1].trim();
        if name.is_empty() || STATE_MARKERS.contains(&name) {
            continue;
        }

        if let Some(alias) = first_group(&caps, &[2, 3]) {
            let alias = alias.trim();
            if !registry.is_declared(&alias.to_lowercase()) {
                registry.alias(alias, name);
            }
        }

        if !registry.is_declared(&name.to_lowercase()) {
            registry.add(ElementKind::Component, name);
        }
    }
}

fn lollipop_pass(text: &str, registry: &mut Registry) {
    for caps in LOLLIPOP_DECLARATION.captures_iter(text) {
        let Some(name) = first_group(&caps, &[1, 2]) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || name == "*" || registry.is_declared(&name.to_lowercase()) {
            continue;
        }
        registry.add(ElementKind::Interface, name);

        if let Some(alias) = first_group(&caps, &[3, 4]) {
            registry.alias(alias.trim(), name);
        }
    }
}

fn usecase_pass(text: &str, registry: &mut Registry) {
    for caps in USECASE_PARENS.captures_iter(text) {
        let name = caps[1].trim();
        if name.is_empty() || registry.is_declared(&name.to_lowercase()) {
            continue;
        }
        registry.add(ElementKind::Usecase, name);

        if let Some(alias) = first_group(&caps, &[2, 3]) {
            registry.alias(alias.trim(), name);
        }
    }

    for caps in USECASE_QUOTED_ALIAS.captures_iter(text) {
        let name = caps[1].trim();
        let alias = caps[2].trim();
        if name.is_empty() || alias.is_empty() {
            continue;
        }
        if !registry.is_declared(&name.to_lowercase()) {
            registry.add(ElementKind::Usecase, name);
        }
        if !registry.is_declared(&alias.to_lowercase()) {
            registry.alias(alias, name);
        }
    }
}

/// Actors written as `:Name:`, optionally followed by `as alias`
///
/// The opening colon may not directly follow an arrow character (`-`, `>`,
/// `.`), which rules out message labels. A name followed by `;` is an
/// activity action and is skipped.
fn creole_actor_pass(text: &str, registry: &mut Registry) {
    let bytes = text.as_bytes();
    let mut q = 0;

    while let Some(offset) = text[q..].find(':') {
        let open = q + offset;
        q = open + 1;

        if open > 0 && matches!(bytes[open - 1], b'-' | b'>' | b'.') {
            continue;
        }

        let name_start = open + 1;
        let name_len = text[name_start..]
            .find(|c| matches!(c, ':' | '\n' | ';'))
            .unwrap_or(text.len() - name_start);
        let close = name_start + name_len;
        if name_len == 0 || bytes.get(close) != Some(&b':') {
            continue;
        }

        let rest = &text[close + 1..];
        if rest.trim_start().starts_with(';') {
            continue;
        }

        let (alias, end) = match CREOLE_ALIAS.captures(rest) {
            Some(caps) => (caps.get(1).map(|m| m.as_str()), close + 1 + caps[0].len()),
            None => (None, close + 1),
        };

        q = end;

        let name = text[name_start..close].trim();
        if name.is_empty() || registry.is_declared(&name.to_lowercase()) {
            continue;
        }
        registry.add(ElementKind::Actor, name);
        if let Some(alias) = alias {
            registry.alias(alias.trim(), name);
        }
    }
}

fn implicit_pass(text: &str, primary: DiagramType, registry: &mut Registry) {
    let kind = registry.rules.implicit_default(primary);

    for caps in RELATION.captures_iter(text) {
        let left = ["left_q", "left_w", "left_p"]
            .iter()
            .find_map(|g| caps.name(g).map(|m| m.as_str()).filter(|s| !s.is_empty()));
        let right = ["right_q", "right_w", "right_p"]
            .iter()
            .find_map(|g| caps.name(g).map(|m| m.as_str()).filter(|s| !s.is_empty()));

        if let Some(name) = left {
            registry.add_implicit(kind, name);
        }
        if let Some(name) = right {
            registry.add_implicit(kind, name);
        }
    }

    for caps in BRACKET_LEFT_OF_ARROW.captures_iter(text) {
        registry.add_bracket_endpoint(&caps[1]);
    }
    for caps in BRACKET_RIGHT_OF_ARROW.captures_iter(text) {
        registry.add_bracket_endpoint(&caps[1]);
    }

    if primary == DiagramType::Sequence {
        for caps in SEQUENCE_MESSAGE.captures_iter(text) {
            if let Some(name) = first_group(&caps, &[1, 2]) {
                registry.add_implicit(kind, name);
            }
            if let Some(name) = first_group(&caps, &[4, 5]) {
                registry.add_implicit(kind, name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pumlsift_text::preprocess;

    fn extract(raw: &str, primary: DiagramType) -> Vec<(ElementKind, usize)> {
        let rules = ExtractionRules::default();
        let extractor = ElementExtractor::new(&rules).unwrap();
        extractor
            .extract(&preprocess(raw), Some(primary))
            .iter()
            .collect()
    }

    #[test]
    fn unclassified_is_empty() {
        let rules = ExtractionRules::default();
        let extractor = ElementExtractor::new(&rules).unwrap();
        assert!(extractor.extract("class A\nclass B", None).is_empty());
    }

    #[test]
    fn sequence_participants_from_messages() {
        assert_eq!(
            extract("@startuml\nAlice -> Bob: hello\n@enduml", DiagramType::Sequence),
            vec![(ElementKind::Participant, 2)]
        );
    }

    #[test]
    fn declarations_dedupe_case_insensitively() {
        let raw = "class User\nclass user\nclass Order<T>\nOrder --> User\nOrder<T> --> Item";
        assert_eq!(
            extract(raw, DiagramType::Class),
            vec![(ElementKind::Class, 2)]
        );
    }

    #[test]
    fn aliases_share_the_namespace() {
        let raw = "actor \"Web Shop User\" as U\nparticipant Backend as B\nU -> B : order\n";
        assert_eq!(
            extract(raw, DiagramType::Sequence),
            vec![(ElementKind::Participant, 1), (ElementKind::Actor, 1)]
        );
    }

    #[test]
    fn cardinality_labels_are_not_elements() {
        assert_eq!(
            extract("A \"1\" --> \"*\" B\n", DiagramType::Class),
            vec![(ElementKind::Class, 2)]
        );
    }

    #[test]
    fn abstract_keyword_variants() {
        let raw = "abstract class Shape\nabstract Base\nclass Circle\nShape <|-- Circle\n";
        assert_eq!(
            extract(raw, DiagramType::Class),
            vec![(ElementKind::Class, 1), (ElementKind::AbstractClass, 2)]
        );
    }

    #[test]
    fn bracket_components_and_lollipops() {
        let raw = "[Web] as W\n[Api]\n() REST as R\nW --> [Api]\n[Api] --> [Store]\nR -- W\n";
        let mut found = extract(raw, DiagramType::Component);
        found.sort();
        assert_eq!(
            found,
            vec![(ElementKind::Interface, 1), (ElementKind::Component, 3)]
        );
    }

    #[test]
    fn state_markers_are_not_components() {
        let raw = "state A\nstate B\nA --> B\n[*] --> A\n[H] --> B\n";
        assert_eq!(
            extract(raw, DiagramType::State),
            vec![(ElementKind::State, 2)]
        );
    }

    #[test]
    fn usecase_parentheses_and_creole_actors() {
        let raw = ":Customer: as C\nC --> (Place Order)\n(Track) as (T)\n\"Cancel Order\" as (X)\n";
        let found = extract(raw, DiagramType::Usecase);
        assert_eq!(
            found,
            vec![(ElementKind::Actor, 1), (ElementKind::Usecase, 4)]
        );
    }

    #[test]
    fn activity_actions_are_not_creole_actors() {
        let raw = "participant A\n:do thing:;\nA -> B : label\n";
        let found = extract(raw, DiagramType::Sequence);
        assert_eq!(found, vec![(ElementKind::Participant, 2)]);
    }

    #[test]
    fn group_is_control_flow_in_sequences() {
        let raw = "participant A\ngroup Retry\nA -> B : again\nend\n";
        assert_eq!(
            extract(raw, DiagramType::Sequence),
            vec![(ElementKind::Participant, 2)]
        );
        assert_eq!(
            extract("group Services\n", DiagramType::Activity),
            vec![(ElementKind::Group, 1)]
        );
    }

    #[test]
    fn ignored_keywords_never_become_elements() {
        let raw = "start --> stop\n";
        assert!(extract(raw, DiagramType::Activity).is_empty());
    }

    #[test]
    fn custom_keywords_are_honored() {
        let mut rules = ExtractionRules::default();
        rules.keywords.push(pumlsift_core::KeywordBinding {
            keyword: "service".to_string(),
            kind: ElementKind::Component,
        });
        let extractor = ElementExtractor::new(&rules).unwrap();
        let inventory = extractor.extract("service Billing\n", Some(DiagramType::Component));
        assert_eq!(inventory.get(ElementKind::Component), 1);
    }
}
