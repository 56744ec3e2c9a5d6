//! Declarative component trees.
//!
//! Markup documents build object graphs declaratively; the front end parses
//! them into `ComponentNode` trees. Each tree is consumed exactly once by
//! the descriptor flattener and never mutated.

use asjs_common::{QName, Span};

use crate::expr::Expr;

/// One declarative component instantiation.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentNode {
    pub class_ref: QName,
    /// Explicit id from markup. Nodes without one get a synthesized
    /// positional id during flattening.
    pub id: Option<String>,
    pub properties: Vec<ComponentProperty>,
    pub children: Vec<ComponentNode>,
    pub event: Option<EventWiring>,
    pub span: Span,
}

impl ComponentNode {
    pub fn new(class_ref: QName) -> Self {
        Self {
            class_ref,
            id: None,
            properties: Vec::new(),
            children: Vec::new(),
            event: None,
            span: Span::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: ComponentValue) -> Self {
        self.properties.push(ComponentProperty {
            name: name.into(),
            value,
        });
        self
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_event(mut self, name: impl Into<String>, handler: impl Into<String>) -> Self {
        self.event = Some(EventWiring {
            name: name.into(),
            handler: handler.into(),
        });
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentProperty {
    pub name: String,
    pub value: ComponentValue,
}

/// A property is either a literal (no construction-time evaluation) or a
/// nested component instantiation (e.g. a binding bead).
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentValue {
    Literal(Expr),
    Node(Box<ComponentNode>),
}

/// A single event-to-handler wiring; the handler is a member of the owning
/// document class.
#[derive(Clone, Debug, PartialEq)]
pub struct EventWiring {
    pub name: String,
    pub handler: String,
}
