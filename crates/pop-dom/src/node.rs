//! DOM Node - closed set of node kinds
//!
//! Every node owns its child list, a parent back-reference and its
//! listener registry. Element-only state lives in [`ElementData`].

use std::fmt;

use crate::events::ListenerRegistry;
use crate::{AttributeTable, DomError, DomResult, NodeId, StyleDeclaration, HTML_NAMESPACE};

/// Element properties that are rendered as attributes when serializing.
/// Anything else a script would hang on an element is not representable.
pub const SERIALIZABLE_PROPERTIES: &[&str] = &[
    "id", "type", "name", "value", "src", "href", "title", "width", "height", "tabindex",
    "hidden", "disabled", "checked",
];

/// DOM node type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentFragment = 11,
}

/// DOM Node - Core structure
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) listeners: ListenerRegistry,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            listeners: ListenerRegistry::new(),
            data,
        }
    }

    /// Parent node, `None` while detached
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered child sequence
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Listener registry of this node
    #[inline]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn node_type(&self) -> NodeType {
        match self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::Fragment => NodeType::DocumentFragment,
        }
    }

    pub fn node_name(&self) -> &str {
        match &self.data {
            NodeData::Document => "#document",
            NodeData::Element(e) => &e.tag_name,
            NodeData::Text(_) => "#text",
            NodeData::Comment(_) => "#comment",
            NodeData::Fragment => "#document-fragment",
        }
    }

    /// Text and comment nodes are leaves
    #[inline]
    pub fn can_have_children(&self) -> bool {
        !matches!(self.data, NodeData::Text(_) | NodeData::Comment(_))
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&TextData> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text_mut(&mut self) -> Option<&mut TextData> {
        match &mut self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_comment(&self) -> Option<&str> {
        match &self.data {
            NodeData::Comment(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("listeners", &self.listeners.len())
            .field("data", &self.data)
            .finish()
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(TextData),
    Comment(String),
    Fragment,
}

/// Scalar value of an element property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            // Integral numbers print without a fractional part, as scripts expect.
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for PropertyValue {
    fn from(n: u32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name, upper-cased for the HTML namespace
    pub tag_name: String,
    pub namespace: Option<String>,
    /// Space-separated class list
    pub class_name: String,
    /// `data-*` values in insertion order
    pub dataset: Vec<(String, String)>,
    pub style: StyleDeclaration,
    /// Escaped text emitted when the element has no children
    pub text_content: Option<String>,
    /// Raw markup emitted when the element has neither children nor text
    pub inner_html: Option<String>,
    properties: Vec<(&'static str, PropertyValue)>,
    attributes: AttributeTable,
}

impl ElementData {
    pub fn new(tag_name: &str, namespace: Option<&str>) -> Self {
        let is_html = namespace == Some(HTML_NAMESPACE);
        let tag_name = if is_html {
            tag_name.to_uppercase()
        } else {
            tag_name.to_string()
        };

        let mut element = Self {
            tag_name,
            namespace: namespace.map(str::to_string),
            class_name: String::new(),
            dataset: Vec::new(),
            style: StyleDeclaration::new(),
            text_content: None,
            inner_html: None,
            properties: Vec::new(),
            attributes: AttributeTable::new(),
        };
        if element.is_input() {
            element.properties.push(("type", PropertyValue::from("text")));
        }
        element
    }

    #[inline]
    pub fn is_html(&self) -> bool {
        self.namespace.as_deref() == Some(HTML_NAMESPACE)
    }

    fn is_input(&self) -> bool {
        self.tag_name == "INPUT"
    }

    /// Tag name as written in markup (lower-cased for HTML)
    pub fn local_tag(&self) -> String {
        if self.is_html() {
            self.tag_name.to_lowercase()
        } else {
            self.tag_name.clone()
        }
    }

    /// Whitespace-separated class tokens
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_name.split_whitespace()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Set one of [`SERIALIZABLE_PROPERTIES`]
    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) -> DomResult<()> {
        let key = SERIALIZABLE_PROPERTIES
            .iter()
            .copied()
            .find(|p| *p == name)
            .ok_or_else(|| DomError::UnknownProperty(name.to_string()))?;
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.properties.push((key, value)),
        }
        Ok(())
    }

    pub fn remove_property(&mut self, name: &str) -> Option<PropertyValue> {
        let index = self.properties.iter().position(|(k, _)| *k == name)?;
        Some(self.properties.remove(index).1)
    }

    /// Properties in assignment order
    pub fn properties(&self) -> impl Iterator<Item = (&'static str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (*k, v))
    }

    /// `id` property, falling back to an `id` attribute
    pub fn id(&self) -> Option<String> {
        self.property("id")
            .map(|v| v.to_string())
            .or_else(|| self.attributes.get(None, "id").map(str::to_string))
    }

    pub fn set_data(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.dataset.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.dataset.push((key.to_string(), value)),
        }
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    pub fn set_attribute_ns(&mut self, namespace: Option<&str>, name: &str, value: &str) {
        // `type` on <input> is the live property, not a stored attribute.
        if self.is_input() && name == "type" {
            match self.properties.iter_mut().find(|(k, _)| *k == "type") {
                Some((_, existing)) => *existing = PropertyValue::from(value),
                None => self.properties.push(("type", PropertyValue::from(value))),
            }
            return;
        }
        self.attributes.set(namespace, name, value);
    }

    pub fn get_attribute_ns(&self, namespace: Option<&str>, name: &str) -> Option<String> {
        if self.is_input() && name == "type" {
            return self.property("type").map(|v| v.to_string());
        }
        self.attributes.get(namespace, name).map(str::to_string)
    }

    pub fn remove_attribute_ns(&mut self, namespace: Option<&str>, name: &str) {
        self.attributes.remove(namespace, name);
    }

    pub fn has_attribute_ns(&self, namespace: Option<&str>, name: &str) -> bool {
        self.attributes.has(namespace, name)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.set_attribute_ns(None, name, value)
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.get_attribute_ns(None, name)
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.remove_attribute_ns(None, name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.has_attribute_ns(None, name)
    }
}

/// Text node data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextData {
    pub content: String,
}

impl TextData {
    /// Length in characters
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Replace `count` characters starting at `offset`; both are clamped
    pub fn replace_data(&mut self, offset: usize, count: usize, data: &str) {
        let start = byte_offset(&self.content, offset);
        let end = byte_offset(&self.content, offset.saturating_add(count));
        self.content.replace_range(start..end, data);
    }
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}
