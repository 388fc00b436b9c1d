//! Tree nodes and their declarative configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::id::NodeId;

/// One element of a selection tree (a checkbox).
///
/// Nodes are immutable once published: every change produces a new node,
/// and untouched children are shared between the old and new node by `Arc`.
/// For a leaf `selected` is authoritative; for a container it is derived
/// from the children at construction and always equals `is_all_selected()`.
#[derive(Debug)]
pub struct Node<P> {
    id: NodeId,
    name: String,
    selected: bool,
    payload: Option<Arc<P>>,
    children: Vec<Arc<Node<P>>>,
    /// Lookup relation only, resolved through a `Snapshot`
    parent: Option<NodeId>,
}

impl<P> Clone for Node<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            selected: self.selected,
            payload: self.payload.clone(),
            children: self.children.clone(),
            parent: self.parent,
        }
    }
}

/// Unlinks uniquely owned descendants one at a time, so dropping a deep
/// chain does not recurse once per level.
impl<P> Drop for Node<P> {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if let Ok(mut node) = Arc::try_unwrap(child) {
                pending.append(&mut node.children);
            }
        }
    }
}

/// Structural equality; shared subtrees compare equal without being walked.
impl<P: PartialEq> PartialEq for Node<P> {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: Vec<(&Node<P>, &Node<P>)> = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if std::ptr::eq(left, right) {
                continue;
            }
            if left.id != right.id
                || left.name != right.name
                || left.selected != right.selected
                || left.parent != right.parent
                || left.payload != right.payload
                || left.children.len() != right.children.len()
            {
                return false;
            }
            pending.extend(
                left.children
                    .iter()
                    .zip(right.children.iter())
                    .map(|(l, r)| (l.as_ref(), r.as_ref())),
            );
        }
        true
    }
}

impl<P> Node<P> {
    /// Assemble a node from parts.
    ///
    /// `own_selected` is kept only when `children` is empty; a container's
    /// flag is recomputed from the children's flags.
    pub(crate) fn assemble(
        id: NodeId,
        name: String,
        own_selected: bool,
        payload: Option<Arc<P>>,
        parent: Option<NodeId>,
        children: Vec<Arc<Node<P>>>,
    ) -> Self {
        let selected = derive_selected(own_selected, &children);
        Self {
            id,
            name,
            selected,
            payload,
            children,
            parent,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Leaf flag, or the cached `is_all_selected()` of a container.
    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_deref()
    }

    /// Shared handle to the payload, for callers that want to keep it alive
    /// independently of the node.
    pub fn payload_handle(&self) -> Option<&Arc<P>> {
        self.payload.as_ref()
    }

    pub fn children(&self) -> &[Arc<Node<P>>] {
        &self.children
    }

    /// Identifier of the enclosing node, `None` for a root.
    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub(crate) fn with_name(&self, name: String) -> Self {
        let mut node = self.clone();
        node.name = name;
        node
    }

    pub(crate) fn with_payload(&self, payload: Option<Arc<P>>) -> Self {
        let mut node = self.clone();
        node.payload = payload;
        node
    }

    pub(crate) fn with_parent(&self, parent: Option<NodeId>) -> Self {
        let mut node = self.clone();
        node.parent = parent;
        node
    }

    /// Replace the whole child list. An empty list turns the node into a
    /// leaf that keeps its current aggregate selection as its own flag.
    pub(crate) fn with_children(&self, children: Vec<Arc<Node<P>>>) -> Self {
        Self::assemble(
            self.id,
            self.name.clone(),
            self.selected,
            self.payload.clone(),
            self.parent,
            children,
        )
    }

    /// Replace (`Some`) or drop (`None`) the child at `index`; every other
    /// child is shared with `self`.
    pub(crate) fn with_child_at(&self, index: usize, child: Option<Arc<Node<P>>>) -> Self {
        let mut children = Vec::with_capacity(self.children.len());
        for (position, existing) in self.children.iter().enumerate() {
            if position != index {
                children.push(Arc::clone(existing));
            } else if let Some(replacement) = &child {
                children.push(Arc::clone(replacement));
            }
        }
        self.with_children(children)
    }

    /// Force this node and every descendant leaf to `selected`.
    ///
    /// Rebuilds the subtree bottom-up from an explicit stack.
    pub(crate) fn with_selection(&self, selected: bool) -> Self {
        let mut stack: Vec<(&Node<P>, bool)> = vec![(self, false)];
        let mut built: Vec<Arc<Node<P>>> = Vec::new();

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                let children = built.split_off(built.len() - node.children.len());
                built.push(Arc::new(Self::assemble(
                    node.id,
                    node.name.clone(),
                    selected,
                    node.payload.clone(),
                    node.parent,
                    children,
                )));
            } else {
                stack.push((node, true));
                for child in node.children.iter().rev() {
                    stack.push((child.as_ref(), false));
                }
            }
        }

        match built.pop() {
            Some(root) => Arc::try_unwrap(root).unwrap_or_else(|shared| (*shared).clone()),
            None => unreachable!("selection stack always yields the subtree root"),
        }
    }
}

fn derive_selected<P>(own_selected: bool, children: &[Arc<Node<P>>]) -> bool {
    if children.is_empty() {
        own_selected
    } else {
        children.iter().all(|child| child.selected)
    }
}

/// Declarative description of a (sub)tree.
///
/// Every field is optional; absent fields resolve to an empty name, an
/// unselected flag, no payload and no children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig<P> {
    pub name: String,
    #[serde(alias = "is_selected", alias = "isSelected")]
    pub selected: bool,
    #[serde(alias = "properties", skip_serializing_if = "Option::is_none")]
    pub payload: Option<P>,
    #[serde(alias = "options", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeConfig<P>>,
}

impl<P> Default for NodeConfig<P> {
    fn default() -> Self {
        Self {
            name: String::new(),
            selected: false,
            payload: None,
            children: Vec::new(),
        }
    }
}

impl<P> NodeConfig<P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_child(mut self, child: NodeConfig<P>) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeConfig<P>>) -> Self {
        self.children.extend(children);
        self
    }
}
