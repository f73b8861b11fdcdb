//! Expected element composition per diagram type

use crate::diagram::{ElementKind, TypeTable};
use serde::{Deserialize, Serialize};

/// Element kinds a diagram type should, may, and must not contain
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectation {
    pub primary: Vec<ElementKind>,
    pub allowed: Vec<ElementKind>,
    pub forbidden: Vec<ElementKind>,
}

impl Expectation {
    fn new(primary: &[ElementKind], allowed: &[ElementKind], forbidden: &[ElementKind]) -> Self {
        Self {
            primary: primary.to_vec(),
            allowed: allowed.to_vec(),
            forbidden: forbidden.to_vec(),
        }
    }

    pub fn is_forbidden(&self, kind: ElementKind) -> bool {
        self.forbidden.contains(&kind)
    }
}

/// Expectations for every diagram type
pub type ExpectationTable = TypeTable<Expectation>;

/// The tuned expectation table
pub fn default_expectations() -> ExpectationTable {
    use ElementKind::*;

    TypeTable {
        sequence: Expectation::new(
            &[Participant, Actor, Boundary, Control, Entity, Database, Collections, Queue],
            &[Box],
            &[Class, Interface, Enum, AbstractClass, State, Usecase, Component, Node, Artifact],
        ),
        class: Expectation::new(
            &[
                Class,
                AbstractClass,
                Interface,
                Enum,
                Annotation,
                Struct,
                Protocol,
                Exception,
                Metaclass,
            ],
            &[Package, Namespace, Rectangle],
            &[Participant, Actor, State, Usecase, Node, Artifact, Component],
        ),
        activity: Expectation::new(
            &[Partition],
            &[Rectangle, Group],
            &[Class, Participant, State, Usecase, Component, Node, Artifact],
        ),
        state: Expectation::new(
            &[State],
            &[Rectangle, Partition],
            &[Class, Participant, Actor, Usecase, Component, Node, Artifact],
        ),
        usecase: Expectation::new(
            &[Actor, Usecase],
            &[Rectangle, Package],
            &[Class, Interface, Participant, State, Component, Node, Artifact],
        ),
        component: Expectation::new(
            &[Component, Interface],
            &[Package, Folder, Frame, Cloud, Database, Node, Rectangle],
            &[Class, Participant, Actor, State, Usecase],
        ),
        deployment: Expectation::new(
            &[Node, Artifact, Cloud, Database, Storage, File, Folder, Frame, Component],
            &[Rectangle, Package, Card, Agent, Stack],
            &[Class, Participant, Actor, Usecase, State],
        ),
        object: Expectation::new(
            &[Object, Map, Json],
            &[Package, Rectangle, Diamond],
            &[Class, Interface, Participant, Actor, State, Usecase, Component, Node],
        ),
        timing: Expectation::new(
            &[Participant],
            &[],
            &[Class, Interface, Actor, State, Usecase, Component, Node, Artifact],
        ),
    }
}
