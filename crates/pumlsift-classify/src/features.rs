//! Feature extraction
//!
//! Turns preprocessed diagram text into a [`FeatureSet`]. Most indicators are
//! a single pattern over one of a few views of the text; the rest are
//! composites derived from other indicators once every pattern has run.

use once_cell::sync::Lazy;
use pumlsift_core::{Feature, FeatureSet};
use pumlsift_text::{strip_footer_header, strip_member_bodies};
use regex::Regex;

/// Which rendering of the text a detector looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    /// Preprocessed text, case preserved
    Clean,
    /// Lowercased text
    Lower,
    /// Lowercased text with member bodies collapsed
    LowerBodies,
    /// Text with member bodies collapsed
    Bodies,
    /// Text without header/footer content and with member bodies collapsed
    Usecase,
}

/// All renderings of one diagram, computed once
struct Views {
    clean: String,
    lower: String,
    lower_bodies: String,
    bodies: String,
    usecase: String,
}

impl Views {
    fn new(clean: &str) -> Self {
        let lower = clean.to_lowercase();
        Self {
            clean: clean.to_string(),
            lower_bodies: strip_member_bodies(&lower),
            lower,
            bodies: strip_member_bodies(clean),
            usecase: strip_member_bodies(&strip_footer_header(clean)),
        }
    }

    fn get(&self, view: View) -> &str {
        match view {
            View::Clean => &self.clean,
            View::Lower => &self.lower,
            View::LowerBodies => &self.lower_bodies,
            View::Bodies => &self.bodies,
            View::Usecase => &self.usecase,
        }
    }
}

static DETECTORS: Lazy<Vec<(Feature, View, Regex)>> = Lazy::new(|| {
    use Feature::*;
    use View::*;

    let table: &[(Feature, View, &str)] = &[
        // Sequence
        (HasParticipant, Lower, r"\bparticipant\b"),
        (HasActor, Lower, r"\bactor\b"),
        (HasActivate, Lower, r"\bactivate\b"),
        (HasAltLoop, LowerBodies, r"\b(alt|loop|opt|par)\b"),
        (HasLostMessage, Clean, r"--?>x"),
        (HasReturnArrow, Clean, r"<--?"),
        (HasActivationShortcut, Clean, r"(?m)(?:^|\s)(?:\+\+|--)(?:\s*$)"),
        (HasLifecycleCreate, Bodies, r"(?m)(?:^|[\s>-])\*\*(?:\s|$)"),
        (HasLifecycleDestroy, Clean, r"!!"),
        (HasElse, Lower, r"\belse\b"),
        (HasGroup, Lower, r"\bgroup\b"),
        (HasEnd, Lower, r"\bend\b"),
        (HasRefOver, Lower, r"\bref\s+over\b"),
        (HasDelay, Clean, r"\.{3}"),
        (HasAutonumber, Lower, r"\bautonumber\b"),
        (HasDivider, Clean, r"={3,}"),
        (
            HasSequenceMessage,
            Clean,
            r#"(?:\w+|"[^"]+"|:[^:]+:)\s*-{1,2}>\s*(?:\w+|"[^"]+"|:[^:]+:)\s*:"#,
        ),
        // Class
        (HasClass, Lower, r#"\bclass\s+["']?\w"#),
        (HasInterface, Lower, r"\binterface\b"),
        (HasEnum, Lower, r"\benum\b"),
        (HasAbstract, Lower, r#"\babstract\s+(?:class|interface|["']?\w)"#),
        (HasInheritance, Clean, r"<\|--|--\|>"),
        (HasComposition, Clean, r"\*--"),
        (HasAggregation, Clean, r"o--"),
        (HasRealization, Clean, r"<\|\.\.|\.\.\|>"),
        (HasMemberVisibility, Clean, r"(?m)^\s*[+\-#~]\s*\w"),
        (HasLollipopInterface, Clean, r"\(\s*\)\s*--\s*\(\s*\)"),
        (HasAssociationClass, Clean, r"\([^)]+,\s*[^)]+\)\s*\.\."),
        (HasHideEmptyMembers, Lower, r"\bhide\s+empty\s+members\b"),
        // Activity
        (HasOldActivitySyntax, Clean, r"\(\s*\*\s*\)"),
        (HasSyncBar, Clean, r"===\s*\w+\s*==="),
        (HasNewActionSyntax, Clean, r":\s*[^:\n]+\s*;"),
        (HasSwitchCase, Lower, r"\b(switch|case|endswitch)\b"),
        (HasBackward, Lower, r"\bbackward\b"),
        (HasKill, Lower, r"\bkill\b"),
        (HasDetach, Lower, r"\bdetach\b"),
        (HasElseif, Lower, r"\belseif\b"),
        (HasRepeatWhile, Lower, r"\b(repeat|repeat\s+while)\b"),
        (HasSwimlane, Clean, r"\|[^|\n]+\|"),
        (HasForkAgain, Lower, r"\bfork\s+again\b"),
        (HasEndFork, Lower, r"\bend\s+(fork|merge)\b"),
        (HasSplit, Lower, r"\b(split|split\s+again|end\s+split)\b"),
        (HasStartStop, Lower, r"\b(start|stop)\b"),
        (HasForkJoin, Lower, r"\b(fork|join)\b"),
        (HasPartition, Lower, r"\bpartition\b"),
        (HasIfThenElse, Lower, r"\b(if|then|else|endif)\b"),
        (HasWhile, Lower, r"\b(while|endwhile)\b"),
        // State
        (HasStateKeyword, Lower, r"\bstate\s+\w"),
        (HasStateMarkers, Clean, r"\[\*\]"),
        (HasHistoryShallow, Clean, r"\[H\]"),
        (HasHistoryDeep, Clean, r"\[H\*\]"),
        (HasCompositeState, Lower, r"\bstate\s+\w+\s*\{"),
        (HasStateDescription, Lower, r"\bstate\s+\w+\s*:\s*[^\n]+"),
        (HasForkStereotype, Lower, r"<<\s*fork\s*>>"),
        (HasJoinStereotype, Lower, r"<<\s*join\s*>>"),
        (HasChoicePseudo, Lower, r"<<\s*choice\s*>>"),
        (HasEntrypointPseudo, Lower, r"<<\s*entrypoint\s*>>"),
        (HasExitpointPseudo, Lower, r"<<\s*exitpoint\s*>>"),
        (HasTransitionLabel, Clean, r"-+>\s*:\s*\w+"),
        (HasConcurrencySeparator, Clean, r"(?:^|\n)\s*--\s*(?:$|\n)"),
        (HasNestedStates, Lower, r"state\s+\w+\s*\{[^}]*state\s+\w+\s*\{"),
        // Use case
        (HasUsecase, Lower, r"\busecase\b"),
        (HasUsecaseParentheses, Usecase, r"\([^):/*,]+\)\s*(?:as\s+\w+)?(?:\s|$)"),
        (HasRectangle, Lower, r"\brectangle\b"),
        (HasExtendInclude, Lower, r"<<\s*(extend|include)\s*>>"),
        (HasDottedArrow, Clean, r"\.\.[|>]"),
        (HasUsecaseArrows, Clean, r"<--(?:[^|]|$)|--->"),
        // Component
        (HasPackage, Lower, r"\bpackage\b"),
        (HasNode, Lower, r"\bnode\b"),
        (HasBracketNotation, Clean, r"\[[^\]]+\]"),
        (HasPort, Lower, r"\bport\b"),
        (HasPortin, Lower, r"\bportin\b"),
        (HasPortout, Lower, r"\bportout\b"),
        (HasComponentStyle, Lower, r"\bskinparam\s+componentstyle\b"),
        (HasInterfaceSymbol, Clean, r"\(\s*\)"),
        (HasInterfaceConnection, Clean, r"\(\s*\w*\s*\)\s*[-.]+"),
        (HasNamedInterface, Clean, r"\w+\s*\(\s*\)"),
        (HasDatabase, Lower, r"\bdatabase\b"),
        (HasFolder, Lower, r"\bfolder\b"),
        (HasCloud, Lower, r"\bcloud\b"),
        (HasFrame, Lower, r"\bframe\b"),
        (HasDottedDependency, Clean, r"\.{2,}>"),
        // Deployment
        (HasArtifact, Lower, r"\bartifact\b"),
        (HasDeployment, Lower, r"\bdeployment\b"),
        (HasStereotypes, Clean, r"<<[^>]+>>"),
        (
            HasDeploymentStereotype,
            Lower,
            r"<<\s*(device|execution\s*environment|processor|node)\s*>>",
        ),
        (HasDevice, Lower, r"\bdevice\b"),
        (HasStorage, Lower, r"\bstorage\b"),
        (HasServer, Lower, r"\bserver\b"),
        (HasContainer, Lower, r"\bcontainer\b"),
        (HasFile, Lower, r"\bfile\b"),
        (HasProcess, Lower, r"\bprocess\b"),
        (HasCard, Lower, r"\bcard\b"),
        (HasNodeNesting, Lower, r#"\bnode\s+["\w][^{]*\{"#),
        (HasCloudNesting, Lower, r#"\bcloud\s+["\w][^{]*\{"#),
        (HasDatabaseNesting, Lower, r#"\bdatabase\s+["\w][^{]*\{"#),
        (HasStorageNesting, Lower, r#"\bstorage\s+["\w][^{]*\{"#),
        (HasDeviceNesting, Lower, r#"\bdevice\s+["\w][^{]*\{"#),
        (HasDeploymentArrows, Clean, r"--[*o+#^0]"),
        // Object
        (HasObject, Bodies, r#"(?mi)^\s*object\s+["']?\w"#),
        (HasInstanceNotation, Clean, r"(?:^|\n)\s*\w+\s*:\s*\w+\s*(?:$|\n)"),
        (HasMapKeyword, Bodies, r#"(?mi)^\s*map\s+["']?\w"#),
        (HasMapSeparator, Clean, r"=>"),
        (HasObjectBlock, Bodies, r"(?mi)^\s*object\s+[^{]+\{"),
        (HasDiamondShape, Lower, r"\bdiamond\b"),
        (HasFieldAssignment, Clean, r#"\w+\s*=\s*["']?\w+"#),
        // Timing
        (HasRobustParticipant, Lower, r"\brobust\b"),
        (HasConciseParticipant, Lower, r"\bconcise\b"),
        (HasBinaryParticipant, Lower, r"\bbinary\b"),
        (HasClockParticipant, Lower, r"\bclock\b"),
        (HasAnalogParticipant, Lower, r"\banalog\b"),
        (HasAtTimeNotation, Clean, r"@\d+|@\+\d+|@:"),
        (HasHasKeyword, Lower, r"\bhas\b"),
        (HasTimeConstraintArrow, Clean, r"<->"),
        (HasHideTimeAxis, Lower, r"\bhide\s+time-axis\b"),
        (HasIsStateAssignment, Lower, r"\bis\s+\w+"),
        (HasClockParameters, Lower, r"\bwith\s+period\b|\bpulse\b|\boffset\b"),
        (HasHighlightCommand, Lower, r"\bhighlight\b"),
        (HasTimeAnchor, Lower, r"@\d+\s+as\s+:"),
        (HasScaleCommand, Lower, r"\bscale\b"),
    ];

    table
        .iter()
        .map(|&(feature, view, pattern)| {
            (feature, view, Regex::new(pattern).expect("valid feature regex"))
        })
        .collect()
});

static ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+>").expect("valid arrow regex"));

static COMPONENT_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bcomponent\s+["']?\w"#).expect("valid component regex"));

/// Extract every indicator from preprocessed text
pub fn extract_features(clean: &str) -> FeatureSet {
    let views = Views::new(clean);
    let mut features = FeatureSet::new();

    for (feature, view, pattern) in DETECTORS.iter() {
        if pattern.is_match(views.get(*view)) {
            features.set(*feature, true);
        }
    }

    features.set(Feature::HasActorColons, has_actor_colons(&views.usecase));
    features.set(Feature::HasComponent, has_component_keyword(&views.lower));

    features.arrow_count = ARROW.find_iter(clean).count();
    features.line_count = clean.lines().filter(|l| !l.trim().is_empty()).count();

    derive_composites(&mut features);
    features.recount_keywords();

    tracing::trace!(
        present = features.total_keywords,
        arrows = features.arrow_count,
        lines = features.line_count,
        "extracted features"
    );

    features
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Creole actor `:Name:` standing on its own
///
/// The opening colon may not follow `(` or a word character, the name starts
/// with a word character and has at least two characters, and the closing
/// colon may not be followed by `)` or a word character.
fn has_actor_colons(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c != ':' {
            continue;
        }
        if i > 0 && (chars[i - 1] == '(' || is_word(chars[i - 1])) {
            continue;
        }
        if !chars.get(i + 1).is_some_and(|c| is_word(*c)) {
            continue;
        }

        let name_len = chars[i + 1..]
            .iter()
            .take_while(|c| !matches!(c, ':' | '(' | ')' | '\n' | '*'))
            .count();
        let close = i + 1 + name_len;
        if name_len < 2 || chars.get(close) != Some(&':') {
            continue;
        }

        match chars.get(close + 1) {
            Some(&next) if next == ')' || is_word(next) => continue,
            _ => return true,
        }
    }

    false
}

/// `component` used as a declaration keyword, not inside a stereotype such
/// as `<<work-product-component>>`
fn has_component_keyword(lower: &str) -> bool {
    COMPONENT_KEYWORD.find_iter(lower).any(|m| {
        !lower[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|prev| prev == '-' || prev == '<' || is_word(prev))
    })
}

fn derive_composites(f: &mut FeatureSet) {
    use Feature::*;

    let arrows = f.arrow_count > 0;

    let composites = [
        (ArrowWithParticipant, f.get(HasParticipant) && arrows),
        (HasStateTransition, f.get(HasStateKeyword) && arrows),
        (
            ActorWithUsecase,
            f.any(&[HasActor, HasActorColons]) && f.any(&[HasUsecase, HasUsecaseParentheses]),
        ),
        (HasActivityLoop, f.any(&[HasRepeatWhile, HasWhile])),
        (
            HasNewSyntaxMarkers,
            f.any(&[
                HasNewActionSyntax,
                HasForkAgain,
                HasEndFork,
                HasSplit,
                HasElseif,
                HasBackward,
            ]),
        ),
        (
            HasUniqueActivityKeywords,
            f.any(&[HasSwitchCase, HasBackward, HasKill, HasDetach]),
        ),
        (
            HasInfrastructureNodes,
            f.any(&[HasDevice, HasStorage, HasServer, HasCloud, HasDatabase]),
        ),
        (
            HasPhysicalDeployment,
            f.get(HasArtifact) && f.any(&[HasNode, HasCloud]),
        ),
        (
            HasDeploymentNesting,
            f.any(&[
                HasNodeNesting,
                HasCloudNesting,
                HasDatabaseNesting,
                HasStorageNesting,
                HasDeviceNesting,
            ]),
        ),
        (
            HasContainerization,
            f.get(HasContainer) && f.any(&[HasArtifact, HasNode]),
        ),
        (
            HasNodeWithoutArtifact,
            f.get(HasNode) && !f.get(HasArtifact),
        ),
        (
            HasComponentWithBracket,
            f.get(HasComponent) && f.get(HasBracketNotation),
        ),
        (
            HasComponentGrouping,
            f.get(HasComponent) && f.any(&[HasPackage, HasDatabase, HasFolder]),
        ),
        (
            HasInterfaceWithoutMembers,
            f.get(HasInterface) && !f.get(HasMemberVisibility),
        ),
        (
            HasObjectWithRelationships,
            f.any(&[HasObject, HasMapKeyword]) && arrows,
        ),
        (
            HasMapWithSeparator,
            f.get(HasMapKeyword) && f.get(HasMapSeparator),
        ),
        (
            HasTimingParticipantTypes,
            f.any(&[
                HasRobustParticipant,
                HasConciseParticipant,
                HasBinaryParticipant,
                HasClockParticipant,
                HasAnalogParticipant,
            ]),
        ),
        (
            HasAtWithIsPattern,
            f.get(HasAtTimeNotation) && f.get(HasIsStateAssignment),
        ),
        (
            HasTimingTimeSystem,
            f.get(HasAtTimeNotation) && f.any(&[HasTimeAnchor, HasTimeConstraintArrow]),
        ),
    ];

    for (feature, value) in composites {
        f.set(feature, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumlsift_text::preprocess;
    use Feature::*;

    fn features_of(raw: &str) -> FeatureSet {
        extract_features(&preprocess(raw))
    }

    #[test]
    fn every_feature_has_one_source() {
        let mut covered: Vec<Feature> = DETECTORS.iter().map(|(f, _, _)| *f).collect();
        covered.extend([
            HasActorColons,
            HasComponent,
            ArrowWithParticipant,
            HasStateTransition,
            ActorWithUsecase,
            HasActivityLoop,
            HasNewSyntaxMarkers,
            HasUniqueActivityKeywords,
            HasInfrastructureNodes,
            HasPhysicalDeployment,
            HasDeploymentNesting,
            HasContainerization,
            HasNodeWithoutArtifact,
            HasComponentWithBracket,
            HasComponentGrouping,
            HasInterfaceWithoutMembers,
            HasObjectWithRelationships,
            HasMapWithSeparator,
            HasTimingParticipantTypes,
            HasAtWithIsPattern,
            HasTimingTimeSystem,
        ]);
        covered.sort();
        let before = covered.len();
        covered.dedup();
        assert_eq!(before, covered.len(), "feature detected twice");
        assert_eq!(covered.len(), Feature::COUNT);
    }

    #[test]
    fn sequence_message() {
        let f = features_of("@startuml\nAlice -> Bob: hello\n@enduml");
        assert!(f.get(HasSequenceMessage));
        assert!(!f.get(HasParticipant));
        assert_eq!(f.arrow_count, 1);
        assert_eq!(f.line_count, 3);
    }

    #[test]
    fn composites_follow_their_inputs() {
        let f = features_of("participant A\nparticipant B\nA -> B\nstate X\nnode N\n");
        assert!(f.get(ArrowWithParticipant));
        assert!(f.get(HasStateTransition));
        assert!(f.get(HasNodeWithoutArtifact));
        assert!(!f.get(HasPhysicalDeployment));
    }

    #[test]
    fn total_keywords_counts_has_prefixed_flags_only() {
        let f = features_of("participant A\nA -> B\n");
        // arrow_with_participant is true but not counted
        assert!(f.get(ArrowWithParticipant));
        let expected = f.present().filter(|x| x.as_str().starts_with("has_")).count();
        assert_eq!(f.total_keywords, expected);
        assert!(f.total_keywords < f.present().count());
    }

    #[test]
    fn actor_colons_need_standalone_names() {
        assert!(has_actor_colons(":User: --> (Login)"));
        assert!(has_actor_colons("x :Admin:\n"));
        assert!(!has_actor_colons("foo(:Type:)"));
        assert!(!has_actor_colons("a:bc:"));
        assert!(!has_actor_colons(":x:"));
        assert!(!has_actor_colons(":User:name"));
        // A rejected candidate does not hide a later one
        assert!(has_actor_colons("(:a: :Operator:"));
    }

    #[test]
    fn actor_colons_ignore_class_members() {
        let f = features_of("class Account {\n  - owner :Person: x\n}\n");
        assert!(!f.get(HasActorColons));
    }

    #[test]
    fn component_inside_stereotype_is_not_a_keyword() {
        assert!(has_component_keyword("component api"));
        assert!(has_component_keyword("[a]\ncomponent \"web\""));
        assert!(!has_component_keyword("class x <<work-product-component foo>>"));
        assert!(!has_component_keyword("<<component x>>"));
    }

    #[test]
    fn usecase_parentheses_skip_urls_and_types() {
        let f = features_of("actor User\nUser --> (Place Order)\n");
        assert!(f.get(HasUsecaseParentheses));
        assert!(f.get(ActorWithUsecase));

        let f = features_of("A -> B : see (https://example.com)\n");
        assert!(!f.get(HasUsecaseParentheses));
    }

    #[test]
    fn usecase_arrows_exclude_inheritance() {
        assert!(!features_of("A <--| B\n").get(HasUsecaseArrows));
        assert!(features_of("A <-- B\n").get(HasUsecaseArrows));
        assert!(features_of("A ---> B\n").get(HasUsecaseArrows));
    }

    #[test]
    fn object_keyword_must_start_a_line() {
        assert!(features_of("object user\n").get(HasObject));
        let f = features_of("class Holder {\n  object payload\n}\n");
        assert!(!f.get(HasObject));
    }

    #[test]
    fn lifecycle_create_ignores_bold_markup() {
        assert!(features_of("Alice -> Bob ** : create\n").get(HasLifecycleCreate));
        assert!(!features_of("A -> B : **bold** text\n").get(HasLifecycleCreate));
    }

    #[test]
    fn nested_states() {
        let f = features_of("state Outer {\n  state Inner {\n  }\n}\n");
        assert!(f.get(HasNestedStates));
        assert!(f.get(HasCompositeState));
    }

    #[test]
    fn timing_composites() {
        let f = features_of("robust \"Web\" as WB\n@0\nWB is Idle\n@100 as :start\n");
        assert!(f.get(HasTimingParticipantTypes));
        assert!(f.get(HasAtWithIsPattern));
        assert!(f.get(HasTimingTimeSystem));
    }
}
