//! Immutable whole-tree snapshots.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::id::NodeId;
use crate::domain::node::Node;

/// One complete, immutable instance of a tree.
///
/// Cloning a snapshot is a reference-count bump. Snapshots never change;
/// mutations produce a new snapshot that shares every untouched subtree.
#[derive(Debug, PartialEq)]
pub struct Snapshot<P> {
    root: Arc<Node<P>>,
}

impl<P> Clone for Snapshot<P> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
        }
    }
}

/// Result of editing the node at the end of a rewrite path.
pub(crate) enum Edit<P> {
    Replace(Node<P>),
    Remove,
}

impl<P> Snapshot<P> {
    /// Adopt `root` as a snapshot root. A root never has a parent.
    pub fn new(root: Arc<Node<P>>) -> Self {
        let root = if root.is_root() {
            root
        } else {
            Arc::new(root.with_parent(None))
        };
        Self { root }
    }

    pub fn root(&self) -> &Arc<Node<P>> {
        &self.root
    }

    /// True when both snapshots are the same tree instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Any selection anywhere in the tree.
    pub fn is_any_selected(&self) -> bool {
        self.root.is_any_selected()
    }

    /// Top-level sections with any selection beneath them.
    pub fn selected_sections(&self) -> Vec<&Arc<Node<P>>> {
        self.root.selected_children()
    }

    pub fn find(&self, id: NodeId) -> Option<&Arc<Node<P>>> {
        self.iter().map(|(_, node)| node).find(|node| node.id() == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Resolve a node's parent back-reference within this snapshot.
    pub fn parent_of(&self, node: &Node<P>) -> Option<&Arc<Node<P>>> {
        node.parent_id().and_then(|parent| self.find(parent))
    }

    /// Child indices leading from the root to `id`; empty for the root.
    #[instrument(level = "trace", skip(self))]
    pub fn path_to(&self, id: NodeId) -> Option<Vec<usize>> {
        // (depth, index within parent, node); `path` tracks the current branch
        let mut stack: Vec<(usize, usize, &Arc<Node<P>>)> = vec![(0, 0, &self.root)];
        let mut path: Vec<usize> = Vec::new();
        while let Some((depth, index, node)) = stack.pop() {
            path.truncate(depth.saturating_sub(1));
            if depth > 0 {
                path.push(index);
            }
            if node.id() == id {
                return Some(path);
            }
            for (child_index, child) in node.children().iter().enumerate().rev() {
                stack.push((depth + 1, child_index, child));
            }
        }
        None
    }

    pub fn node_at(&self, path: &[usize]) -> Option<&Arc<Node<P>>> {
        path.iter()
            .try_fold(&self.root, |node, &index| node.children().get(index))
    }

    /// Follow names from the root's children downward, taking the first
    /// child with each name. An empty slice resolves to the root.
    pub fn find_by_names<S: AsRef<str>>(&self, names: &[S]) -> Option<&Arc<Node<P>>> {
        names.iter().try_fold(&self.root, |node, name| {
            node.children()
                .iter()
                .find(|child| child.name() == name.as_ref())
        })
    }

    /// Pre-order traversal yielding `(depth, node)`, the root at depth 0.
    pub fn iter(&self) -> PreOrder<'_, P> {
        PreOrder {
            stack: vec![(0, &self.root)],
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: a snapshot holds at least its root, and removing the
    /// root is rejected by the reducer.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of levels, a lone root counting as one.
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth + 1).max().unwrap_or(0)
    }

    pub fn leaf_nodes(&self) -> Vec<&Arc<Node<P>>> {
        self.iter()
            .map(|(_, node)| node)
            .filter(|node| node.is_leaf())
            .collect()
    }

    /// Copy-on-write path rebuild.
    ///
    /// Applies `edit` to the node at `path`, then replaces each ancestor by a
    /// node whose children are identical except for the substituted child.
    /// Returns `None` when `path` does not resolve or when the edit removes
    /// the root.
    pub(crate) fn rewrite<F>(&self, path: &[usize], edit: F) -> Option<Snapshot<P>>
    where
        F: FnOnce(&Node<P>) -> Edit<P>,
    {
        let mut ancestors: Vec<(&Arc<Node<P>>, usize)> = Vec::with_capacity(path.len());
        let mut node = &self.root;
        for &index in path {
            let child = node.children().get(index)?;
            ancestors.push((node, index));
            node = child;
        }

        let mut replacement = match edit(node) {
            Edit::Replace(new_node) => Some(Arc::new(new_node)),
            Edit::Remove => None,
        };
        while let Some((parent, index)) = ancestors.pop() {
            replacement = Some(Arc::new(parent.with_child_at(index, replacement)));
        }
        replacement.map(|root| Snapshot { root })
    }
}

/// Pre-order iterator over a snapshot.
pub struct PreOrder<'a, P> {
    stack: Vec<(usize, &'a Arc<Node<P>>)>,
}

impl<'a, P> Iterator for PreOrder<'a, P> {
    type Item = (usize, &'a Arc<Node<P>>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children().iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::build;
    use crate::domain::node::NodeConfig;

    fn sample() -> Snapshot<()> {
        build(
            NodeConfig::new("root")
                .with_child(
                    NodeConfig::new("a")
                        .with_child(NodeConfig::new("a1"))
                        .with_child(NodeConfig::new("a2").with_selected(true)),
                )
                .with_child(NodeConfig::new("b")),
        )
    }

    #[test]
    fn given_tree_when_iterating_then_visits_pre_order_with_depth() {
        let snapshot = sample();
        let visited: Vec<(usize, &str)> = snapshot
            .iter()
            .map(|(depth, node)| (depth, node.name()))
            .collect();
        assert_eq!(
            visited,
            [(0, "root"), (1, "a"), (2, "a1"), (2, "a2"), (1, "b")]
        );
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.depth(), 3);
        assert_eq!(snapshot.leaf_nodes().len(), 3);
    }

    #[test]
    fn given_node_id_when_locating_then_path_and_parent_resolve() {
        let snapshot = sample();
        let a2 = snapshot.find_by_names(&["a", "a2"]).unwrap();

        let path = snapshot.path_to(a2.id()).unwrap();
        assert_eq!(path, [0, 1]);
        assert!(Arc::ptr_eq(snapshot.node_at(&path).unwrap(), a2));
        assert_eq!(snapshot.parent_of(a2).unwrap().name(), "a");
        assert!(snapshot.parent_of(snapshot.root()).is_none());
        assert_eq!(snapshot.path_to(snapshot.root().id()).unwrap(), Vec::<usize>::new());
        assert!(snapshot.path_to(NodeId::from_raw(7)).is_none());
    }

    #[test]
    fn given_invalid_path_when_rewriting_then_none() {
        let snapshot = sample();
        assert!(snapshot
            .rewrite(&[5], |node| Edit::Replace(node.clone()))
            .is_none());
        assert!(snapshot.rewrite(&[], |_| Edit::Remove).is_none());
    }
}
