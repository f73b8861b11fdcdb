//! Closed feature enumeration and the per-diagram feature set
//!
//! Feature names are part of the configuration surface (rule tables refer to
//! them by name), so renaming a variant is a breaking change.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

macro_rules! features {
    ($($variant:ident => $name:literal,)+) => {
        /// Lexical indicator detected in preprocessed diagram text
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Feature {
            $($variant,)+
        }

        impl Feature {
            /// Every feature in declaration order
            pub const ALL: &'static [Feature] = &[$(Feature::$variant,)+];

            /// Number of features
            pub const COUNT: usize = Self::ALL.len();

            /// Stable snake_case identifier
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Look a feature up by its identifier
            pub fn from_name(name: &str) -> Option<Feature> {
                match name {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

features! {
    // Sequence
    HasParticipant => "has_participant",
    HasActor => "has_actor",
    HasActivate => "has_activate",
    HasAltLoop => "has_alt_loop",
    ArrowWithParticipant => "arrow_with_participant",
    HasLostMessage => "has_lost_message",
    HasReturnArrow => "has_return_arrow",
    HasActivationShortcut => "has_activation_shortcut",
    HasLifecycleCreate => "has_lifecycle_create",
    HasLifecycleDestroy => "has_lifecycle_destroy",
    HasElse => "has_else",
    HasGroup => "has_group",
    HasEnd => "has_end",
    HasRefOver => "has_ref_over",
    HasDelay => "has_delay",
    HasAutonumber => "has_autonumber",
    HasDivider => "has_divider",
    HasSequenceMessage => "has_sequence_message",

    // Class
    HasClass => "has_class",
    HasInterface => "has_interface",
    HasEnum => "has_enum",
    HasAbstract => "has_abstract",
    HasInheritance => "has_inheritance",
    HasComposition => "has_composition",
    HasAggregation => "has_aggregation",
    HasRealization => "has_realization",
    HasMemberVisibility => "has_member_visibility",
    HasLollipopInterface => "has_lollipop_interface",
    HasAssociationClass => "has_association_class",
    HasHideEmptyMembers => "has_hide_empty_members",

    // Activity
    HasOldActivitySyntax => "has_old_activity_syntax",
    HasSyncBar => "has_sync_bar",
    HasNewActionSyntax => "has_new_action_syntax",
    HasSwitchCase => "has_switch_case",
    HasBackward => "has_backward",
    HasKill => "has_kill",
    HasDetach => "has_detach",
    HasElseif => "has_elseif",
    HasRepeatWhile => "has_repeat_while",
    HasSwimlane => "has_swimlane",
    HasForkAgain => "has_fork_again",
    HasEndFork => "has_end_fork",
    HasSplit => "has_split",
    HasStartStop => "has_start_stop",
    HasForkJoin => "has_fork_join",
    HasPartition => "has_partition",
    HasIfThenElse => "has_if_then_else",
    HasWhile => "has_while",
    HasActivityLoop => "has_activity_loop",
    HasNewSyntaxMarkers => "has_new_syntax_markers",
    HasUniqueActivityKeywords => "has_unique_activity_keywords",

    // State
    HasStateKeyword => "has_state_keyword",
    HasStateMarkers => "has_state_markers",
    HasStateTransition => "has_state_transition",
    HasHistoryShallow => "has_history_shallow",
    HasHistoryDeep => "has_history_deep",
    HasCompositeState => "has_composite_state",
    HasStateDescription => "has_state_description",
    HasForkStereotype => "has_fork_stereotype",
    HasJoinStereotype => "has_join_stereotype",
    HasChoicePseudo => "has_choice_pseudo",
    HasEntrypointPseudo => "has_entrypoint_pseudo",
    HasExitpointPseudo => "has_exitpoint_pseudo",
    HasTransitionLabel => "has_transition_label",
    HasConcurrencySeparator => "has_concurrency_separator",
    HasNestedStates => "has_nested_states",

    // Use case
    HasUsecase => "has_usecase",
    HasUsecaseParentheses => "has_usecase_parentheses",
    HasActorColons => "has_actor_colons",
    HasRectangle => "has_rectangle",
    HasExtendInclude => "has_extend_include",
    HasDottedArrow => "has_dotted_arrow",
    HasUsecaseArrows => "has_usecase_arrows",
    ActorWithUsecase => "actor_with_usecase",

    // Component
    HasComponent => "has_component",
    HasPackage => "has_package",
    HasNode => "has_node",
    HasBracketNotation => "has_bracket_notation",
    HasPort => "has_port",
    HasPortin => "has_portin",
    HasPortout => "has_portout",
    HasComponentStyle => "has_component_style",
    HasInterfaceSymbol => "has_interface_symbol",
    HasInterfaceConnection => "has_interface_connection",
    HasNamedInterface => "has_named_interface",
    HasDatabase => "has_database",
    HasFolder => "has_folder",
    HasCloud => "has_cloud",
    HasFrame => "has_frame",
    HasDottedDependency => "has_dotted_dependency",
    HasNodeWithoutArtifact => "has_node_without_artifact",
    HasComponentWithBracket => "has_component_with_bracket",
    HasComponentGrouping => "has_component_grouping",
    HasInterfaceWithoutMembers => "has_interface_without_members",

    // Deployment
    HasArtifact => "has_artifact",
    HasDeployment => "has_deployment",
    HasStereotypes => "has_stereotypes",
    HasDeploymentStereotype => "has_deployment_stereotype",
    HasDevice => "has_device",
    HasStorage => "has_storage",
    HasServer => "has_server",
    HasContainer => "has_container",
    HasFile => "has_file",
    HasProcess => "has_process",
    HasCard => "has_card",
    HasNodeNesting => "has_node_nesting",
    HasCloudNesting => "has_cloud_nesting",
    HasDatabaseNesting => "has_database_nesting",
    HasStorageNesting => "has_storage_nesting",
    HasDeviceNesting => "has_device_nesting",
    HasDeploymentArrows => "has_deployment_arrows",
    HasInfrastructureNodes => "has_infrastructure_nodes",
    HasPhysicalDeployment => "has_physical_deployment",
    HasDeploymentNesting => "has_deployment_nesting",
    HasContainerization => "has_containerization",

    // Object
    HasObject => "has_object",
    HasInstanceNotation => "has_instance_notation",
    HasMapKeyword => "has_map_keyword",
    HasMapSeparator => "has_map_separator",
    HasObjectBlock => "has_object_block",
    HasDiamondShape => "has_diamond_shape",
    HasFieldAssignment => "has_field_assignment",
    HasObjectWithRelationships => "has_object_with_relationships",
    HasMapWithSeparator => "has_map_with_separator",

    // Timing
    HasRobustParticipant => "has_robust_participant",
    HasConciseParticipant => "has_concise_participant",
    HasBinaryParticipant => "has_binary_participant",
    HasClockParticipant => "has_clock_participant",
    HasAnalogParticipant => "has_analog_participant",
    HasAtTimeNotation => "has_at_time_notation",
    HasHasKeyword => "has_has_keyword",
    HasTimeConstraintArrow => "has_time_constraint_arrow",
    HasHideTimeAxis => "has_hide_time_axis",
    HasIsStateAssignment => "has_is_state_assignment",
    HasClockParameters => "has_clock_parameters",
    HasHighlightCommand => "has_highlight_command",
    HasTimeAnchor => "has_time_anchor",
    HasScaleCommand => "has_scale_command",
    HasTimingParticipantTypes => "has_timing_participant_types",
    HasAtWithIsPattern => "has_at_with_is_pattern",
    HasTimingTimeSystem => "has_timing_time_system",
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Indicators detected in one diagram
///
/// One flag per [`Feature`] plus the three numeric metrics. Serializes as a
/// flat `name -> value` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    flags: Vec<bool>,

    /// Number of `-+>` arrow runs in the clean text
    pub arrow_count: usize,

    /// Number of non-blank lines
    pub line_count: usize,

    /// Number of true `has_*` indicators (diagnostic only)
    pub total_keywords: usize,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSet {
    /// An empty set: every flag false, every count zero
    pub fn new() -> Self {
        Self {
            flags: vec![false; Feature::COUNT],
            arrow_count: 0,
            line_count: 0,
            total_keywords: 0,
        }
    }

    pub fn get(&self, feature: Feature) -> bool {
        self.flags[feature as usize]
    }

    pub fn set(&mut self, feature: Feature, value: bool) {
        self.flags[feature as usize] = value;
    }

    /// True when at least one of `features` holds
    pub fn any(&self, features: &[Feature]) -> bool {
        features.iter().any(|f| self.get(*f))
    }

    /// Iterate features that are present, in declaration order
    pub fn present(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.iter().copied().filter(|f| self.get(*f))
    }

    /// Recompute `total_keywords` from the current flags
    pub fn recount_keywords(&mut self) {
        self.total_keywords = self
            .present()
            .filter(|f| f.as_str().starts_with("has_"))
            .count();
    }
}

impl Serialize for FeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Feature::COUNT + 3))?;
        for feature in Feature::ALL {
            map.serialize_entry(feature.as_str(), &self.get(*feature))?;
        }
        map.serialize_entry("arrow_count", &self.arrow_count)?;
        map.serialize_entry("line_count", &self.line_count)?;
        map.serialize_entry("total_keywords", &self.total_keywords)?;
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureValue {
    Flag(bool),
    Count(usize),
}

struct FeatureSetVisitor;

impl<'de> Visitor<'de> for FeatureSetVisitor {
    type Value = FeatureSet;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a map of feature names to booleans or counts")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FeatureSet, A::Error> {
        let mut set = FeatureSet::new();
        while let Some((key, value)) = access.next_entry::<String, FeatureValue>()? {
            match (key.as_str(), value) {
                ("arrow_count", FeatureValue::Count(n)) => set.arrow_count = n,
                ("line_count", FeatureValue::Count(n)) => set.line_count = n,
                ("total_keywords", FeatureValue::Count(n)) => set.total_keywords = n,
                (name, FeatureValue::Flag(b)) => match Feature::from_name(name) {
                    Some(feature) => set.set(feature, b),
                    None => {
                        return Err(serde::de::Error::custom(format!("unknown feature `{name}`")))
                    }
                },
                (name, FeatureValue::Count(_)) => {
                    return Err(serde::de::Error::custom(format!(
                        "feature `{name}` expects a boolean"
                    )))
                }
            }
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for FeatureSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FeatureSetVisitor)
    }
}
