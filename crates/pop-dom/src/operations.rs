//! DOM Node Operations
//!
//! Core tree edits: appendChild, insertBefore, removeChild, replaceChild.
//! Every edit validates first and mutates after, so a failed edit leaves
//! the tree untouched. A node being attached is detached from its previous
//! parent before it lands in the new one.

use tracing::trace;

use crate::{DomError, DomResult, DomTree, NodeData, NodeId};

impl DomTree {
    fn check_insertable(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if !parent_node.can_have_children() {
            return Err(DomError::InvalidNodeType(parent));
        }
        if matches!(child_node.data, NodeData::Document) || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    fn position_in(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Unlink `node` from its current parent, if any
    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.index()].parent.take() else {
            return;
        };
        let siblings = &mut self.nodes[parent.index()].children;
        if let Some(pos) = siblings.iter().position(|&c| c == node) {
            siblings.remove(pos);
        }
    }

    /// Link without validation; only for structure built by this crate
    pub(crate) fn attach_unchecked(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.check_insertable(parent, child)?;
        self.detach(child);
        self.attach_unchecked(parent, child);
        trace!(?parent, ?child, "append_child");
        Ok(child)
    }

    /// Insert `new_child` right before `reference`. Appends when the
    /// reference is `None` or not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.check_insertable(parent, new_child)?;
        self.detach(new_child);

        let index = reference.and_then(|r| self.position_in(parent, r));
        let children = &mut self.nodes[parent.index()].children;
        match index {
            Some(i) => children.insert(i, new_child),
            None => children.push(new_child),
        }
        self.nodes[new_child.index()].parent = Some(parent);
        trace!(?parent, ?new_child, ?reference, "insert_before");
        Ok(new_child)
    }

    /// Remove `child` from `parent` and clear its parent link
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.node(parent)?;
        self.node(child)?;
        let pos = self
            .position_in(parent, child)
            .ok_or(DomError::NotAChild { parent, child })?;

        self.nodes[parent.index()].children.remove(pos);
        self.nodes[child.index()].parent = None;
        trace!(?parent, ?child, "remove_child");
        Ok(child)
    }

    /// Put `new_child` where `old_child` is and detach `old_child`.
    /// Returns the node that was replaced.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId> {
        self.node(old_child)?;
        if self.position_in(parent, old_child).is_none() {
            self.node(parent)?;
            return Err(DomError::NotAChild { parent, child: old_child });
        }
        if new_child == old_child {
            return Ok(old_child);
        }
        self.check_insertable(parent, new_child)?;

        self.detach(new_child);
        // Index may have shifted if new_child was an earlier sibling.
        let pos = self
            .position_in(parent, old_child)
            .ok_or(DomError::NotAChild { parent, child: old_child })?;
        self.nodes[parent.index()].children[pos] = new_child;
        self.nodes[new_child.index()].parent = Some(parent);
        self.nodes[old_child.index()].parent = None;
        trace!(?parent, ?new_child, ?old_child, "replace_child");
        Ok(old_child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_list(n: usize) -> (DomTree, NodeId, Vec<NodeId>) {
        let mut tree = DomTree::new();
        let list = tree.create_element("ul");
        let items = (0..n)
            .map(|_| {
                let li = tree.create_element("li");
                tree.append_child(list, li).unwrap();
                li
            })
            .collect();
        (tree, list, items)
    }

    #[test]
    fn test_append_moves_between_parents() {
        let (mut tree, list, items) = tree_with_list(2);
        let other = tree.create_element("ol");

        tree.append_child(other, items[0]).unwrap();

        assert_eq!(tree.children(list), &[items[1]]);
        assert_eq!(tree.children(other), &[items[0]]);
        assert_eq!(tree.parent(items[0]), Some(other));
    }

    #[test]
    fn test_append_existing_child_moves_to_end() {
        let (mut tree, list, items) = tree_with_list(3);
        tree.append_child(list, items[0]).unwrap();
        assert_eq!(tree.children(list), &[items[1], items[2], items[0]]);
    }

    #[test]
    fn test_insert_before() {
        let (mut tree, list, items) = tree_with_list(2);
        let fresh = tree.create_element("li");

        tree.insert_before(list, fresh, Some(items[1])).unwrap();
        assert_eq!(tree.children(list), &[items[0], fresh, items[1]]);

        let tail = tree.create_element("li");
        tree.insert_before(list, tail, None).unwrap();
        assert_eq!(tree.children(list).last(), Some(&tail));

        // A reference that is not a child appends.
        let stranger = tree.create_element("p");
        let late = tree.create_element("li");
        tree.insert_before(list, late, Some(stranger)).unwrap();
        assert_eq!(tree.children(list).last(), Some(&late));
    }

    #[test]
    fn test_remove_child() {
        let (mut tree, list, items) = tree_with_list(3);
        assert_eq!(tree.remove_child(list, items[1]), Ok(items[1]));
        assert_eq!(tree.children(list), &[items[0], items[2]]);
        assert_eq!(tree.parent(items[1]), None);

        assert_eq!(
            tree.remove_child(list, items[1]),
            Err(DomError::NotAChild { parent: list, child: items[1] })
        );
    }

    #[test]
    fn test_replace_child_with_earlier_sibling() {
        let (mut tree, list, items) = tree_with_list(3);
        let replaced = tree.replace_child(list, items[0], items[2]).unwrap();

        assert_eq!(replaced, items[2]);
        assert_eq!(tree.children(list), &[items[1], items[0]]);
        assert_eq!(tree.parent(items[2]), None);
        assert_eq!(tree.parent(items[0]), Some(list));
    }

    #[test]
    fn test_replace_child_with_itself_is_noop() {
        let (mut tree, list, items) = tree_with_list(2);
        assert_eq!(tree.replace_child(list, items[0], items[0]), Ok(items[0]));
        assert_eq!(tree.children(list), &[items[0], items[1]]);
    }

    #[test]
    fn test_cycles_are_rejected() {
        let (mut tree, list, items) = tree_with_list(1);
        assert_eq!(
            tree.append_child(items[0], list),
            Err(DomError::HierarchyRequest { parent: items[0], child: list })
        );
        assert_eq!(
            tree.append_child(list, list),
            Err(DomError::HierarchyRequest { parent: list, child: list })
        );
        // Failed edit left everything in place.
        assert_eq!(tree.children(list), &[items[0]]);
    }

    #[test]
    fn test_leaf_nodes_reject_children() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        let p = tree.create_element("p");
        assert_eq!(tree.append_child(text, p), Err(DomError::InvalidNodeType(text)));
    }
}
