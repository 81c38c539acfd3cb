//! Document - High-level document API

use crate::{serialize_node, DomResult, DomTree, Event, Listener, NodeId, DispatchOutcome};

/// HTML Document
///
/// The document node is the tree root; `<html>` hangs off it with `<head>`
/// and `<body>` underneath.
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
    root: NodeId,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

impl Document {
    /// Create a document with the basic html/head/body skeleton
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let root = tree.create_document_node();
        let head = tree.create_element("head");
        let body = tree.create_element("body");
        let html = tree.create_element("html");

        tree.attach_unchecked(html, head);
        tree.attach_unchecked(html, body);
        tree.attach_unchecked(root, html);

        Self {
            tree,
            root,
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// The document node itself
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.tree.create_element(tag_name)
    }

    pub fn create_element_ns(&mut self, namespace: Option<&str>, tag_name: &str) -> NodeId {
        self.tree.create_element_ns(namespace, tag_name)
    }

    pub fn create_text_node(&mut self, value: &str) -> NodeId {
        self.tree.create_text(value)
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.tree.create_comment(data)
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.tree.create_fragment()
    }

    /// Uninitialized event; call [`Event::init_event`] before dispatching
    pub fn create_event(&self, family: &str) -> Event {
        Event::new(family)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.get_element_by_id(self.root, id)
    }

    pub fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        self.tree.get_elements_by_tag_name(self.root, tag_name)
    }

    pub fn get_elements_by_class_name(&self, class_names: &str) -> Vec<NodeId> {
        self.tree.get_elements_by_class_name(self.root, class_names)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.tree.contains(self.root, node)
    }

    pub fn add_event_listener(&mut self, event_type: &str, listener: Listener) -> bool {
        self.tree
            .get_mut(self.root)
            .is_some_and(|root| root.listeners.add(event_type, listener))
    }

    pub fn remove_event_listener(&mut self, event_type: &str, listener: &Listener) -> bool {
        self.tree
            .get_mut(self.root)
            .is_some_and(|root| root.listeners.remove(event_type, listener))
    }

    /// Dispatch at `node` (bubbling up to the document)
    pub fn dispatch_event(&self, node: NodeId, event: &mut Event) -> DomResult<DispatchOutcome> {
        self.tree.dispatch_event(node, event)
    }

    /// Markup of the whole document
    pub fn serialize(&self) -> String {
        serialize_node(&self.tree, self.root)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let doc = Document::new();
        let tree = doc.tree();

        assert_eq!(tree.parent(doc.document_element()), Some(doc.root()));
        assert_eq!(tree.children(doc.document_element()), &[doc.head(), doc.body()]);
        assert_eq!(doc.serialize(), "<html><head></head><body></body></html>");
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::new();
        let canvas = doc.create_element("canvas");
        doc.tree_mut()
            .element_mut(canvas)
            .unwrap()
            .set_property("id", "screen")
            .unwrap();
        assert_eq!(doc.get_element_by_id("screen"), None);

        let body = doc.body();
        doc.tree_mut().append_child(body, canvas).unwrap();
        assert_eq!(doc.get_element_by_id("screen"), Some(canvas));
        assert!(doc.contains(canvas));
    }
}
