/*
Rendering of snapshots as terminal trees.

Uses termtree; each line carries the checkbox marker of its node so a
consumer can show the derived tri-state without recomputing it. The
termtree value is built iteratively, but termtree formats it recursively,
so rendering is meant for trees of display size.
 */
use std::fmt::Display;
use std::sync::Arc;

use termtree::Tree;
use tracing::instrument;

use crate::domain::node::Node;
use crate::domain::query::CheckState;
use crate::domain::snapshot::Snapshot;

/// What to append to each node's label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_ids: bool,
    pub show_payload: bool,
}

pub trait TreeDisplay {
    fn to_tree_string(&self, options: RenderOptions) -> Tree<String>;
}

impl<P: Display> TreeDisplay for Node<P> {
    fn to_tree_string(&self, options: RenderOptions) -> Tree<String> {
        // Post-order over an explicit stack; states fold up from the children
        let mut stack: Vec<(&Node<P>, bool)> = vec![(self, false)];
        let mut built: Vec<(CheckState, Tree<String>)> = Vec::new();

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                let children = built.split_off(built.len() - node.children().len());
                let state = fold_state(node, &children);
                let leaves: Vec<Tree<String>> = children.into_iter().map(|(_, tree)| tree).collect();
                built.push((
                    state,
                    Tree::new(label(node, state, options)).with_leaves(leaves),
                ));
            } else {
                stack.push((node, true));
                for child in node.children().iter().rev() {
                    stack.push((child.as_ref(), false));
                }
            }
        }

        built
            .pop()
            .map(|(_, tree)| tree)
            .unwrap_or_else(|| unreachable!("render stack always yields the root"))
    }
}

impl<P: Display> TreeDisplay for Arc<Node<P>> {
    fn to_tree_string(&self, options: RenderOptions) -> Tree<String> {
        self.as_ref().to_tree_string(options)
    }
}

impl<P: Display> TreeDisplay for Snapshot<P> {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self, options: RenderOptions) -> Tree<String> {
        self.root().to_tree_string(options)
    }
}

/// Same answer as `Node::check_state`, derived from the children's states.
fn fold_state<P>(node: &Node<P>, children: &[(CheckState, Tree<String>)]) -> CheckState {
    if children.is_empty() {
        return if node.selected() {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        };
    }
    if children.iter().all(|(state, _)| *state == CheckState::Checked) {
        CheckState::Checked
    } else if children.iter().all(|(state, _)| *state == CheckState::Unchecked) {
        CheckState::Unchecked
    } else {
        CheckState::Indeterminate
    }
}

fn label<P: Display>(node: &Node<P>, state: CheckState, options: RenderOptions) -> String {
    let mut label = format!("{} {}", state.marker(), node.name());
    if options.show_ids {
        label.push_str(&format!(" {}", node.id()));
    }
    if options.show_payload {
        if let Some(payload) = node.payload() {
            label.push_str(&format!(" ({payload})"));
        }
    }
    label
}
