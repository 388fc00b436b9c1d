//! Tree builder for turning declarative configuration into node trees.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::id::NodeId;
use crate::domain::node::{Node, NodeConfig};
use crate::domain::snapshot::Snapshot;

/// Pending work on the explicit build stack.
enum Frame<P> {
    Enter {
        config: NodeConfig<P>,
        parent: Option<NodeId>,
    },
    Assemble {
        id: NodeId,
        name: String,
        selected: bool,
        payload: Option<P>,
        parent: Option<NodeId>,
        arity: usize,
    },
}

/// Constructs node trees from [`NodeConfig`] values.
///
/// Uses an explicit stack instead of recursion, so configuration depth is
/// bounded by memory rather than by the call stack. Allocates one
/// identifier per constructed node.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes_built: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes constructed by this builder so far.
    pub fn nodes_built(&self) -> usize {
        self.nodes_built
    }

    /// Build a complete tree; the configured root becomes the snapshot root.
    #[instrument(level = "debug", skip_all, fields(root = %config.name))]
    pub fn build<P>(&mut self, config: NodeConfig<P>) -> Snapshot<P> {
        let root = self.build_subtree(config, None);
        debug!("built tree with {} nodes", self.nodes_built);
        Snapshot::new(root)
    }

    /// Build a detached subtree whose root points back at `parent`.
    pub fn build_subtree<P>(&mut self, config: NodeConfig<P>, parent: Option<NodeId>) -> Arc<Node<P>> {
        let mut stack = vec![Frame::Enter { config, parent }];
        let mut built: Vec<Arc<Node<P>>> = Vec::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter { config, parent } => {
                    let id = NodeId::allocate();
                    let NodeConfig {
                        name,
                        selected,
                        payload,
                        children,
                    } = config;

                    stack.push(Frame::Assemble {
                        id,
                        name,
                        selected,
                        payload,
                        parent,
                        arity: children.len(),
                    });
                    // Reverse push keeps children in configured order
                    for child in children.into_iter().rev() {
                        stack.push(Frame::Enter {
                            config: child,
                            parent: Some(id),
                        });
                    }
                }
                Frame::Assemble {
                    id,
                    name,
                    selected,
                    payload,
                    parent,
                    arity,
                } => {
                    let children = built.split_off(built.len() - arity);
                    built.push(Arc::new(Node::assemble(
                        id,
                        name,
                        selected,
                        payload.map(Arc::new),
                        parent,
                        children,
                    )));
                    self.nodes_built += 1;
                }
            }
        }

        // The root's Assemble frame is the last one popped
        built
            .pop()
            .unwrap_or_else(|| unreachable!("build stack always yields the root"))
    }
}

/// Build a tree with a throwaway builder.
pub fn build<P>(config: NodeConfig<P>) -> Snapshot<P> {
    TreeBuilder::new().build(config)
}
