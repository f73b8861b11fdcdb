//! Diagram taxonomy: families, UML types, element kinds, relationship categories
//!
//! These enums are part of the stable output contract. Their serialized names
//! are consumed by downstream tooling and must never be renamed.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Top-level diagram family, decided by a start marker before any scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramFamily {
    /// Regular UML diagram (scored into one of the nine types)
    Uml,

    /// `@startdot`
    Graphviz,

    /// `@startditaa`
    Ditaa,

    /// `@startsalt`
    Salt,

    /// `@startgantt`
    Gantt,
}

impl DiagramFamily {
    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uml => "uml",
            Self::Graphviz => "graphviz",
            Self::Ditaa => "ditaa",
            Self::Salt => "salt",
            Self::Gantt => "gantt",
        }
    }
}

impl std::fmt::Display for DiagramFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The nine supported UML diagram types
///
/// Declaration order is the canonical order. Every per-type iteration and
/// every tie-break follows it, so it must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    Sequence,
    Class,
    Activity,
    State,
    Usecase,
    Component,
    Deployment,
    Object,
    Timing,
}

impl DiagramType {
    /// All types in canonical order
    pub const ALL: [DiagramType; 9] = [
        Self::Sequence,
        Self::Class,
        Self::Activity,
        Self::State,
        Self::Usecase,
        Self::Component,
        Self::Deployment,
        Self::Object,
        Self::Timing,
    ];

    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Class => "class",
            Self::Activity => "activity",
            Self::State => "state",
            Self::Usecase => "usecase",
            Self::Component => "component",
            Self::Deployment => "deployment",
            Self::Object => "object",
            Self::Timing => "timing",
        }
    }
}

impl std::fmt::Display for DiagramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DiagramType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Error returned when parsing an unknown taxonomy name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);

/// Outcome of scoring a UML diagram: one of the nine types, or nothing matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PrimaryType {
    Type(DiagramType),
    Unclassified,
}

impl PrimaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type(t) => t.as_str(),
            Self::Unclassified => "unclassified",
        }
    }

    /// The scored type, if any
    pub fn diagram_type(&self) -> Option<DiagramType> {
        match self {
            Self::Type(t) => Some(*t),
            Self::Unclassified => None,
        }
    }
}

impl std::fmt::Display for PrimaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<DiagramType> for PrimaryType {
    fn from(t: DiagramType) -> Self {
        Self::Type(t)
    }
}

impl From<PrimaryType> for String {
    fn from(p: PrimaryType) -> Self {
        p.as_str().to_string()
    }
}

impl TryFrom<String> for PrimaryType {
    type Error = UnknownName;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == "unclassified" {
            return Ok(Self::Unclassified);
        }
        s.parse::<DiagramType>().map(Self::Type)
    }
}

/// Coarse relationship category, fixed per diagram type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipCategory {
    Structural,
    Message,
    Flow,
    Association,
}

impl RelationshipCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Message => "message",
            Self::Flow => "flow",
            Self::Association => "association",
        }
    }
}

impl std::fmt::Display for RelationshipCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kinds of structural element a diagram can declare
///
/// Serialized names match the declaration keyword (`"abstract class"` keeps
/// its space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    // Class diagram elements
    #[serde(rename = "class")]
    Class,
    #[serde(rename = "abstract class")]
    AbstractClass,
    #[serde(rename = "interface")]
    Interface,
    #[serde(rename = "enum")]
    Enum,
    #[serde(rename = "annotation")]
    Annotation,
    #[serde(rename = "struct")]
    Struct,
    #[serde(rename = "protocol")]
    Protocol,
    #[serde(rename = "exception")]
    Exception,
    #[serde(rename = "metaclass")]
    Metaclass,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "map")]
    Map,

    // Sequence diagram elements
    #[serde(rename = "participant")]
    Participant,
    #[serde(rename = "actor")]
    Actor,
    #[serde(rename = "boundary")]
    Boundary,
    #[serde(rename = "control")]
    Control,
    #[serde(rename = "entity")]
    Entity,
    #[serde(rename = "database")]
    Database,
    #[serde(rename = "collections")]
    Collections,
    #[serde(rename = "queue")]
    Queue,

    #[serde(rename = "usecase")]
    Usecase,
    #[serde(rename = "state")]
    State,

    // Containers shared across diagram types
    #[serde(rename = "package")]
    Package,
    #[serde(rename = "namespace")]
    Namespace,
    #[serde(rename = "node")]
    Node,
    #[serde(rename = "folder")]
    Folder,
    #[serde(rename = "frame")]
    Frame,
    #[serde(rename = "cloud")]
    Cloud,
    #[serde(rename = "component")]
    Component,
    #[serde(rename = "rectangle")]
    Rectangle,

    #[serde(rename = "circle")]
    Circle,
    #[serde(rename = "diamond")]
    Diamond,

    // Deployment diagram elements
    #[serde(rename = "action")]
    Action,
    #[serde(rename = "agent")]
    Agent,
    #[serde(rename = "artifact")]
    Artifact,
    #[serde(rename = "file")]
    File,
    #[serde(rename = "hexagon")]
    Hexagon,
    #[serde(rename = "label")]
    Label,
    #[serde(rename = "person")]
    Person,
    #[serde(rename = "process")]
    Process,
    #[serde(rename = "stack")]
    Stack,
    #[serde(rename = "storage")]
    Storage,

    // Additional containers
    #[serde(rename = "box")]
    Box,
    #[serde(rename = "partition")]
    Partition,
    #[serde(rename = "card")]
    Card,
    #[serde(rename = "group")]
    Group,
}

impl ElementKind {
    /// Every kind, in declaration order
    pub const ALL: [ElementKind; 46] = [
        Self::Class,
        Self::AbstractClass,
        Self::Interface,
        Self::Enum,
        Self::Annotation,
        Self::Struct,
        Self::Protocol,
        Self::Exception,
        Self::Metaclass,
        Self::Object,
        Self::Json,
        Self::Map,
        Self::Participant,
        Self::Actor,
        Self::Boundary,
        Self::Control,
        Self::Entity,
        Self::Database,
        Self::Collections,
        Self::Queue,
        Self::Usecase,
        Self::State,
        Self::Package,
        Self::Namespace,
        Self::Node,
        Self::Folder,
        Self::Frame,
        Self::Cloud,
        Self::Component,
        Self::Rectangle,
        Self::Circle,
        Self::Diamond,
        Self::Action,
        Self::Agent,
        Self::Artifact,
        Self::File,
        Self::Hexagon,
        Self::Label,
        Self::Person,
        Self::Process,
        Self::Stack,
        Self::Storage,
        Self::Box,
        Self::Partition,
        Self::Card,
        Self::Group,
    ];

    /// Stable string identifier (same as the serialized name)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::AbstractClass => "abstract class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Annotation => "annotation",
            Self::Struct => "struct",
            Self::Protocol => "protocol",
            Self::Exception => "exception",
            Self::Metaclass => "metaclass",
            Self::Object => "object",
            Self::Json => "json",
            Self::Map => "map",
            Self::Participant => "participant",
            Self::Actor => "actor",
            Self::Boundary => "boundary",
            Self::Control => "control",
            Self::Entity => "entity",
            Self::Database => "database",
            Self::Collections => "collections",
            Self::Queue => "queue",
            Self::Usecase => "usecase",
            Self::State => "state",
            Self::Package => "package",
            Self::Namespace => "namespace",
            Self::Node => "node",
            Self::Folder => "folder",
            Self::Frame => "frame",
            Self::Cloud => "cloud",
            Self::Component => "component",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Diamond => "diamond",
            Self::Action => "action",
            Self::Agent => "agent",
            Self::Artifact => "artifact",
            Self::File => "file",
            Self::Hexagon => "hexagon",
            Self::Label => "label",
            Self::Person => "person",
            Self::Process => "process",
            Self::Stack => "stack",
            Self::Storage => "storage",
            Self::Box => "box",
            Self::Partition => "partition",
            Self::Card => "card",
            Self::Group => "group",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// A fixed record holding one value per diagram type
///
/// Used for every per-type rule table so that tables are complete by
/// construction and serialize with stable, human-editable keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeTable<T> {
    pub sequence: T,
    pub class: T,
    pub activity: T,
    pub state: T,
    pub usecase: T,
    pub component: T,
    pub deployment: T,
    pub object: T,
    pub timing: T,
}

impl<T> TypeTable<T> {
    /// Build a table by evaluating `f` once per type, in canonical order
    pub fn from_fn(mut f: impl FnMut(DiagramType) -> T) -> Self {
        Self {
            sequence: f(DiagramType::Sequence),
            class: f(DiagramType::Class),
            activity: f(DiagramType::Activity),
            state: f(DiagramType::State),
            usecase: f(DiagramType::Usecase),
            component: f(DiagramType::Component),
            deployment: f(DiagramType::Deployment),
            object: f(DiagramType::Object),
            timing: f(DiagramType::Timing),
        }
    }

    pub fn get(&self, diagram_type: DiagramType) -> &T {
        match diagram_type {
            DiagramType::Sequence => &self.sequence,
            DiagramType::Class => &self.class,
            DiagramType::Activity => &self.activity,
            DiagramType::State => &self.state,
            DiagramType::Usecase => &self.usecase,
            DiagramType::Component => &self.component,
            DiagramType::Deployment => &self.deployment,
            DiagramType::Object => &self.object,
            DiagramType::Timing => &self.timing,
        }
    }

    pub fn get_mut(&mut self, diagram_type: DiagramType) -> &mut T {
        match diagram_type {
            DiagramType::Sequence => &mut self.sequence,
            DiagramType::Class => &mut self.class,
            DiagramType::Activity => &mut self.activity,
            DiagramType::State => &mut self.state,
            DiagramType::Usecase => &mut self.usecase,
            DiagramType::Component => &mut self.component,
            DiagramType::Deployment => &mut self.deployment,
            DiagramType::Object => &mut self.object,
            DiagramType::Timing => &mut self.timing,
        }
    }

    /// Iterate `(type, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (DiagramType, &T)> {
        DiagramType::ALL.into_iter().map(move |t| (t, self.get(t)))
    }
}
