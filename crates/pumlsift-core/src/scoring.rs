//! Tiered scoring model: tier weights, context rules, and conflict penalties
//!
//! The model is plain data. [`ScoringModel::default`] carries the tuned
//! tables; a `[scoring]` config section replaces them wholesale.

use crate::diagram::{DiagramType, TypeTable};
use crate::feature::{Feature, FeatureSet};
use serde::{Deserialize, Serialize};

/// Weight tier, from most to least decisive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Decisive,
    Strong,
    Moderate,
    Weak,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Self::Decisive, Self::Strong, Self::Moderate, Self::Weak];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decisive => "decisive",
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
        }
    }
}

/// Multiplier applied to every base weight in a tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierMultipliers {
    pub decisive: f64,
    pub strong: f64,
    pub moderate: f64,
    pub weak: f64,
}

impl Default for TierMultipliers {
    fn default() -> Self {
        Self {
            decisive: 100.0,
            strong: 10.0,
            moderate: 1.0,
            weak: 0.1,
        }
    }
}

impl TierMultipliers {
    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Decisive => self.decisive,
            Tier::Strong => self.strong,
            Tier::Moderate => self.moderate,
            Tier::Weak => self.weak,
        }
    }
}

/// A feature and its base weight within one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedFeature {
    pub feature: Feature,
    pub weight: f64,
}

/// Tiered features for one diagram type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTable {
    pub decisive: Vec<WeightedFeature>,
    pub strong: Vec<WeightedFeature>,
    pub moderate: Vec<WeightedFeature>,
    pub weak: Vec<WeightedFeature>,
}

impl TierTable {
    pub fn get(&self, tier: Tier) -> &[WeightedFeature] {
        match tier {
            Tier::Decisive => &self.decisive,
            Tier::Strong => &self.strong,
            Tier::Moderate => &self.moderate,
            Tier::Weak => &self.weak,
        }
    }
}

/// Predicate over a feature set that selects a context weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Condition {
    /// At least one of the features holds
    AnyOf { features: Vec<Feature> },

    /// None of the features hold
    NoneOf { features: Vec<Feature> },

    /// Arrow count strictly greater than `threshold`
    ArrowCountAbove { threshold: usize },
}

impl Condition {
    pub fn holds(&self, features: &FeatureSet) -> bool {
        match self {
            Self::AnyOf { features: list } => features.any(list),
            Self::NoneOf { features: list } => !features.any(list),
            Self::ArrowCountAbove { threshold } => features.arrow_count > *threshold,
        }
    }
}

/// Context-dependent weight replacing a feature's static weight for one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextRule {
    pub feature: Feature,
    pub diagram_type: DiagramType,
    pub condition: Condition,
    pub weight_if_true: f64,
    pub weight_otherwise: f64,
}

impl ContextRule {
    pub fn weight(&self, features: &FeatureSet) -> f64 {
        if self.condition.holds(features) {
            self.weight_if_true
        } else {
            self.weight_otherwise
        }
    }
}

/// Multiplicative penalty applied when a conflicting feature is present
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    pub feature: Feature,
    pub factor: f64,
}

/// Complete scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringModel {
    pub multipliers: TierMultipliers,
    pub tiers: TypeTable<TierTable>,
    pub context_rules: Vec<ContextRule>,
    pub penalties: TypeTable<Vec<Penalty>>,
}

impl ScoringModel {
    /// Context rule for `(feature, diagram_type)`, if one exists
    pub fn context_rule(&self, feature: Feature, diagram_type: DiagramType) -> Option<&ContextRule> {
        self.context_rules
            .iter()
            .find(|r| r.feature == feature && r.diagram_type == diagram_type)
    }
}

fn weighted(entries: &[(Feature, f64)]) -> Vec<WeightedFeature> {
    entries
        .iter()
        .map(|&(feature, weight)| WeightedFeature { feature, weight })
        .collect()
}

fn penalty_list(entries: &[(Feature, f64)]) -> Vec<Penalty> {
    entries
        .iter()
        .map(|&(feature, factor)| Penalty { feature, factor })
        .collect()
}

fn rule(
    feature: Feature,
    diagram_type: DiagramType,
    condition: Condition,
    weight_if_true: f64,
    weight_otherwise: f64,
) -> ContextRule {
    ContextRule {
        feature,
        diagram_type,
        condition,
        weight_if_true,
        weight_otherwise,
    }
}

impl Default for ScoringModel {
    fn default() -> Self {
        use DiagramType as T;
        use Feature::*;

        let tiers = TypeTable {
            sequence: TierTable {
                decisive: weighted(&[
                    (HasSequenceMessage, 2.0),
                    (HasLostMessage, 2.0),
                    (HasAltLoop, 2.0),
                    (HasActivationShortcut, 1.8),
                    (HasRefOver, 1.8),
                    (ArrowWithParticipant, 1.8),
                    (HasActivate, 1.5),
                    (HasLifecycleCreate, 1.5),
                    (HasLifecycleDestroy, 1.5),
                ]),
                strong: weighted(&[
                    (HasParticipant, 2.0),
                    (HasAutonumber, 1.5),
                    (HasReturnArrow, 1.5),
                    (HasGroup, 1.2),
                ]),
                moderate: weighted(&[
                    (HasElse, 0.8),
                    (HasEnd, 0.5),
                    (HasDivider, 0.5),
                    (HasDelay, 0.6),
                ]),
                weak: weighted(&[(HasActor, 0.4)]),
            },
            class: TierTable {
                decisive: weighted(&[
                    (HasMemberVisibility, 2.0),
                    (HasRealization, 1.8),
                    (HasInheritance, 1.5),
                    (HasClass, 1.4),
                    (HasAbstract, 1.2),
                ]),
                strong: weighted(&[
                    (HasComposition, 1.2),
                    (HasAggregation, 1.2),
                    (HasEnum, 1.0),
                    (HasAssociationClass, 1.5),
                    (HasLollipopInterface, 1.0),
                ]),
                moderate: weighted(&[(HasInterface, 0.5), (HasHideEmptyMembers, 0.8)]),
                weak: Vec::new(),
            },
            activity: TierTable {
                decisive: weighted(&[
                    (HasBackward, 2.0),
                    (HasKill, 1.8),
                    (HasDetach, 1.8),
                    (HasSwitchCase, 2.0),
                    (HasNewActionSyntax, 1.8),
                    (HasOldActivitySyntax, 1.5),
                    (HasSwimlane, 1.3),
                    (HasSyncBar, 1.2),
                ]),
                strong: weighted(&[
                    (HasForkAgain, 2.8),
                    (HasEndFork, 2.8),
                    (HasSplit, 2.5),
                    (HasPartition, 2.2),
                    (HasStartStop, 2.0),
                    (HasForkJoin, 1.8),
                    (HasActivityLoop, 1.5),
                ]),
                moderate: weighted(&[
                    (HasElseif, 1.0),
                    (HasIfThenElse, 0.8),
                    (HasWhile, 0.8),
                    (HasEnd, 0.5),
                ]),
                weak: Vec::new(),
            },
            state: TierTable {
                decisive: weighted(&[
                    (HasHistoryShallow, 2.0),
                    (HasHistoryDeep, 2.0),
                    (HasChoicePseudo, 1.8),
                    (HasForkStereotype, 1.8),
                    (HasJoinStereotype, 1.8),
                    (HasEntrypointPseudo, 1.5),
                    (HasExitpointPseudo, 1.5),
                    (HasCompositeState, 1.5),
                ]),
                strong: weighted(&[
                    (HasStateKeyword, 2.0),
                    (HasStateMarkers, 2.0),
                    (HasStateTransition, 1.8),
                    (HasNestedStates, 1.5),
                ]),
                moderate: weighted(&[
                    (HasTransitionLabel, 1.2),
                    (HasStateDescription, 1.2),
                    (HasConcurrencySeparator, 1.0),
                ]),
                weak: Vec::new(),
            },
            usecase: TierTable {
                decisive: weighted(&[
                    (HasExtendInclude, 2.0),
                    (HasActorColons, 1.8),
                    (HasUsecaseParentheses, 1.6),
                    (HasUsecase, 1.4),
                    (ActorWithUsecase, 1.3),
                ]),
                strong: weighted(&[
                    (HasDottedArrow, 1.0),
                    (HasRectangle, 1.0),
                    (HasPackage, 0.8),
                ]),
                moderate: weighted(&[(HasActor, 1.2), (HasUsecaseArrows, 0.5)]),
                weak: Vec::new(),
            },
            component: TierTable {
                decisive: weighted(&[
                    (HasPortin, 2.0),
                    (HasPortout, 2.0),
                    (HasPort, 1.8),
                    (HasComponentStyle, 1.5),
                    (HasComponent, 1.3),
                ]),
                strong: weighted(&[
                    (HasInterfaceConnection, 2.8),
                    (HasComponentWithBracket, 2.5),
                    (HasComponentGrouping, 2.2),
                    (HasPackage, 2.0),
                    (HasBracketNotation, 1.8),
                    (HasInterfaceWithoutMembers, 1.5),
                ]),
                moderate: weighted(&[
                    (HasInterface, 0.5),
                    (HasDottedDependency, 1.2),
                    (HasInterfaceSymbol, 1.0),
                    (HasDatabase, 0.8),
                    (HasFolder, 0.8),
                    (HasCloud, 0.8),
                ]),
                weak: weighted(&[(HasNode, 0.4)]),
            },
            deployment: TierTable {
                decisive: weighted(&[
                    (HasPhysicalDeployment, 2.0),
                    (HasArtifact, 1.8),
                    (HasDeployment, 1.5),
                    (HasDevice, 1.4),
                    (HasStorage, 1.4),
                    (HasDeploymentStereotype, 1.3),
                ]),
                strong: weighted(&[
                    (HasDeploymentNesting, 2.8),
                    (HasContainerization, 2.5),
                    (HasInfrastructureNodes, 2.2),
                    (HasServer, 2.0),
                    (HasNodeNesting, 1.8),
                    (HasCloudNesting, 1.8),
                ]),
                moderate: weighted(&[
                    (HasFile, 1.2),
                    (HasProcess, 1.2),
                    (HasCard, 1.0),
                    (HasDatabase, 1.0),
                    (HasCloud, 1.2),
                ]),
                weak: weighted(&[(HasNode, 0.5), (HasStereotypes, 0.5)]),
            },
            object: TierTable {
                decisive: weighted(&[
                    (HasMapKeyword, 1.8),
                    (HasMapSeparator, 1.6),
                    (HasObject, 1.4),
                    (HasObjectBlock, 1.3),
                    (HasMapWithSeparator, 1.2),
                ]),
                strong: weighted(&[
                    (HasFieldAssignment, 1.0),
                    (HasDiamondShape, 0.8),
                    (HasObjectWithRelationships, 0.8),
                ]),
                moderate: weighted(&[(HasInstanceNotation, 1.0)]),
                weak: Vec::new(),
            },
            timing: TierTable {
                decisive: weighted(&[
                    (HasRobustParticipant, 2.0),
                    (HasConciseParticipant, 2.0),
                    (HasBinaryParticipant, 2.0),
                    (HasClockParticipant, 1.8),
                    (HasAtTimeNotation, 1.5),
                    (HasHasKeyword, 1.4),
                    (HasHideTimeAxis, 1.3),
                ]),
                strong: weighted(&[
                    (HasTimeConstraintArrow, 2.5),
                    (HasClockParameters, 2.2),
                    (HasAtWithIsPattern, 2.0),
                    (HasHighlightCommand, 1.8),
                    (HasTimingTimeSystem, 1.5),
                ]),
                moderate: weighted(&[
                    (HasTimeAnchor, 1.5),
                    (HasIsStateAssignment, 1.0),
                    (HasScaleCommand, 1.2),
                ]),
                weak: Vec::new(),
            },
        };

        let any = |features: &[Feature]| Condition::AnyOf {
            features: features.to_vec(),
        };
        let none = |features: &[Feature]| Condition::NoneOf {
            features: features.to_vec(),
        };

        let context_rules = vec![
            rule(HasInterface, T::Class, any(&[HasClass, HasMemberVisibility]), 2.8, 0.5),
            rule(HasInterface, T::Component, any(&[HasComponent, HasInterfaceSymbol]), 2.8, 0.5),
            rule(HasNode, T::Deployment, any(&[HasArtifact]), 2.0, 0.5),
            rule(HasNode, T::Component, none(&[HasArtifact]), 1.8, 0.3),
            rule(HasCloud, T::Deployment, any(&[HasArtifact]), 1.2, 0.5),
            rule(HasCloud, T::Component, none(&[HasArtifact]), 0.8, 0.3),
            rule(HasDatabase, T::Deployment, any(&[HasInfrastructureNodes]), 1.0, 0.5),
            rule(HasDatabase, T::Component, any(&[HasComponent]), 0.8, 0.5),
            rule(HasActor, T::Usecase, any(&[HasUsecase, HasUsecaseParentheses]), 1.2, 0.4),
            rule(
                HasActor,
                T::Sequence,
                Condition::ArrowCountAbove { threshold: 5 },
                1.0,
                0.4,
            ),
        ];

        let penalties = TypeTable {
            sequence: penalty_list(&[
                (HasUniqueActivityKeywords, 0.3),
                (HasNewActionSyntax, 0.4),
                (HasSwimlane, 0.7),
            ]),
            class: penalty_list(&[(HasPortin, 0.5), (HasPortout, 0.5), (HasComponent, 0.7)]),
            activity: penalty_list(&[(ArrowWithParticipant, 0.5), (HasActivate, 0.6)]),
            state: Vec::new(),
            usecase: penalty_list(&[
                (HasActivate, 0.3),
                (HasAutonumber, 0.3),
                (HasSequenceMessage, 0.2),
                (HasAltLoop, 0.4),
            ]),
            component: penalty_list(&[
                (HasMemberVisibility, 0.6),
                (HasPhysicalDeployment, 0.6),
                (HasArtifact, 0.75),
                (HasClass, 0.5),
                (HasAbstract, 0.6),
                (HasNodeNesting, 0.4),
                (HasDeploymentNesting, 0.5),
            ]),
            deployment: penalty_list(&[
                (HasPortin, 0.7),
                (HasPortout, 0.7),
                (HasComponentStyle, 0.8),
            ]),
            object: Vec::new(),
            timing: penalty_list(&[(HasParticipant, 0.8), (HasActivate, 0.85)]),
        };

        Self {
            multipliers: TierMultipliers::default(),
            tiers,
            context_rules,
            penalties,
        }
    }
}
