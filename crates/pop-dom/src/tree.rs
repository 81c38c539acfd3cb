//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed; a detached node simply has no parent and is
//! unreachable from the document root.

use std::ops::ControlFlow;

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId, TextData, HTML_NAMESPACE};

/// Arena-based DOM tree
#[derive(Debug, Default)]
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new empty DOM tree
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    pub(crate) fn create_document_node(&mut self) -> NodeId {
        self.push(NodeData::Document)
    }

    /// Create an element in the HTML namespace
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.create_element_ns(Some(HTML_NAMESPACE), tag_name)
    }

    /// Create an element in `namespace` (`None` is the null namespace)
    pub fn create_element_ns(&mut self, namespace: Option<&str>, tag_name: &str) -> NodeId {
        self.push(NodeData::Element(ElementData::new(tag_name, namespace)))
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(NodeData::Text(TextData {
            content: content.to_string(),
        }))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.push(NodeData::Comment(data.to_string()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeData::Fragment)
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub(crate) fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id)?.as_element_mut()
    }

    /// Number of nodes ever created, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Children of `id`; empty for unknown nodes
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    /// True when `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Iterative pre-order walk over `roots` and their descendants.
    /// Stops at the first `Break` and returns its value.
    pub fn walk<T>(
        &self,
        roots: &[NodeId],
        mut visit: impl FnMut(NodeId, &Node) -> ControlFlow<T>,
    ) -> Option<T> {
        let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            if let ControlFlow::Break(found) = visit(id, node) {
                return Some(found);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// First node in pre-order (starting at `root` itself) matching `pred`
    pub fn find(&self, root: NodeId, mut pred: impl FnMut(&Node) -> bool) -> Option<NodeId> {
        self.walk(&[root], |id, node| {
            if pred(node) {
                ControlFlow::Break(id)
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Does the subtree at `root` contain `node` (inclusive)?
    pub fn contains(&self, root: NodeId, node: NodeId) -> bool {
        self.get(node).is_some() && self.is_inclusive_ancestor(root, node)
    }

    /// Descendant elements of `root` with the given tag, case-insensitive.
    /// `*` matches every element.
    pub fn get_elements_by_tag_name(&self, root: NodeId, tag_name: &str) -> Vec<NodeId> {
        let wanted = tag_name.to_lowercase();
        let mut found = Vec::new();
        self.walk::<()>(self.children(root), |id, node| {
            if let Some(elem) = node.as_element() {
                if wanted == "*" || elem.tag_name.to_lowercase() == wanted {
                    found.push(id);
                }
            }
            ControlFlow::Continue(())
        });
        found
    }

    /// Elements at or below `root` carrying every class in `class_names`
    pub fn get_elements_by_class_name(&self, root: NodeId, class_names: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = class_names.split_whitespace().collect();
        let mut found = Vec::new();
        if wanted.is_empty() {
            return found;
        }
        self.walk::<()>(&[root], |id, node| {
            if let Some(elem) = node.as_element() {
                if wanted.iter().all(|c| elem.classes().any(|have| have == *c)) {
                    found.push(id);
                }
            }
            ControlFlow::Continue(())
        });
        found
    }

    /// First element at or below `root` whose id matches
    pub fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.find(root, |node| {
            node.as_element()
                .and_then(ElementData::id)
                .is_some_and(|have| have == id)
        })
    }
}
