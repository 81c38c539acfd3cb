//! pop DOM - Document Object Model for the replay sandbox
//!
//! Arena-backed node tree exposing only what a game loop touches:
//! element factories, tree edits, namespaced attributes, descendant
//! queries, markup serialization and a bubbling event dispatcher.

mod attributes;
mod document;
mod events;
mod keyboard;
mod node;
mod operations;
mod serialize;
mod style;
mod tree;

pub use attributes::{Attr, AttributeTable};
pub use document::Document;
pub use events::{DispatchOutcome, Event, EventListener, Listener, ListenerRegistry};
pub use keyboard::{Key, KeyModifiers, KeyboardData};
pub use node::{ElementData, Node, NodeData, NodeType, PropertyValue, TextData, SERIALIZABLE_PROPERTIES};
pub use serialize::{escape_attribute_value, escape_text, serialize_node, VOID_ELEMENTS};
pub use style::StyleDeclaration;
pub use tree::DomTree;

/// XHTML namespace. Elements created in it get upper-cased tag names.
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Arena slot of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist in this tree")]
    NotFound(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("cannot insert {child:?} under {parent:?}: it would create a cycle or move the document")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("node {0:?} cannot have children")]
    InvalidNodeType(NodeId),

    #[error("'{0}' is not a serializable element property")]
    UnknownProperty(String),
}
