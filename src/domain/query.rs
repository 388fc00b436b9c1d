//! Tri-state queries over a node's subtree.
//!
//! All queries recompute from the leaves; none of them read the cached
//! container flag, so a fresh recomputation on any snapshot gives the same
//! answer. Traversals use explicit stacks and work at any depth.

use std::sync::Arc;

use crate::domain::node::Node;

/// Visual state of a checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckState {
    Checked,
    Unchecked,
    /// Some but not all descendant leaves selected
    Indeterminate,
}

impl CheckState {
    pub fn marker(self) -> &'static str {
        match self {
            CheckState::Checked => "[x]",
            CheckState::Unchecked => "[ ]",
            CheckState::Indeterminate => "[-]",
        }
    }
}

impl<P> Node<P> {
    /// True iff every child is all-selected; a childless node answers with
    /// its own leaf flag.
    pub fn is_all_selected(&self) -> bool {
        // Recursively all-selected is the same as every leaf selected
        !self.any_leaf(|selected| !selected)
    }

    /// Some, but not all, descendant leaves are selected.
    pub fn is_indeterminate(&self) -> bool {
        if self.is_all_selected() {
            return false;
        }
        self.has_selected_leaf()
    }

    /// Any selection exists at or beneath this node.
    pub fn is_any_selected(&self) -> bool {
        self.is_indeterminate() || self.is_all_selected()
    }

    pub fn check_state(&self) -> CheckState {
        if self.is_all_selected() {
            CheckState::Checked
        } else if self.is_indeterminate() {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }

    /// Direct children with any selection beneath them, in order.
    pub fn selected_children(&self) -> Vec<&Arc<Node<P>>> {
        self.children()
            .iter()
            .filter(|child| child.is_any_selected())
            .collect()
    }

    /// Selected leaves beneath (or at) this node, in pre-order.
    pub fn selected_leaves(&self) -> Vec<&Node<P>> {
        let mut leaves = Vec::new();
        let mut stack: Vec<&Node<P>> = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                if node.selected() {
                    leaves.push(node);
                }
            } else {
                for child in node.children().iter().rev() {
                    stack.push(child);
                }
            }
        }
        leaves
    }

    fn has_selected_leaf(&self) -> bool {
        self.any_leaf(|selected| selected)
    }

    /// Depth-first search for a leaf whose flag satisfies `predicate`.
    fn any_leaf(&self, predicate: impl Fn(bool) -> bool) -> bool {
        let mut stack: Vec<&Node<P>> = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                if predicate(node.selected()) {
                    return true;
                }
            } else {
                stack.extend(node.children().iter().map(|child| child.as_ref()));
            }
        }
        false
    }
}
