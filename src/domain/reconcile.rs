//! Identity-preserving reconciliation.
//!
//! Rebuilding a tree from new configuration must never reset selections of
//! items that still logically exist. Matching is by name at the same
//! position: within the same-named section for the two-level view, under
//! the matched parent for the full tree.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::builder::TreeBuilder;
use crate::domain::id::NodeId;
use crate::domain::node::{Node, NodeConfig};
use crate::domain::snapshot::Snapshot;

/// Section name given to descriptors without one.
pub const DEFAULT_SECTION_NAME: &str = "unnamed_section";

/// Flat description of one item and the section it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor<P> {
    #[serde(alias = "itemName")]
    pub item_name: String,
    #[serde(alias = "sectionName", skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(alias = "isSelected", skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(alias = "itemProperties", skip_serializing_if = "Option::is_none")]
    pub payload: Option<P>,
    #[serde(alias = "sectionProperties", skip_serializing_if = "Option::is_none")]
    pub section_payload: Option<P>,
}

impl<P> ItemDescriptor<P> {
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            section_name: None,
            selected: None,
            payload: None,
            section_payload: None,
        }
    }

    pub fn in_section(mut self, section_name: impl Into<String>) -> Self {
        self.section_name = Some(section_name.into());
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_section_payload(mut self, payload: P) -> Self {
        self.section_payload = Some(payload);
        self
    }
}

/// Rebuilds trees from configuration, carrying forward matched nodes.
#[derive(Debug, Clone)]
pub struct Reconciler {
    default_section: String,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_SECTION_NAME)
    }
}

impl Reconciler {
    pub fn new(default_section: impl Into<String>) -> Self {
        Self {
            default_section: default_section.into(),
        }
    }

    pub fn default_section(&self) -> &str {
        &self.default_section
    }

    /// Two-level rebuild: root → sections → items.
    ///
    /// Sections follow first-seen order of the descriptors, items follow
    /// descriptor order. A matched section keeps its id and payload; a
    /// matched item is reused verbatim and the descriptor's `selected` and
    /// `payload` are ignored. Old sections absent from `descriptors` are
    /// dropped.
    #[instrument(level = "debug", skip_all, fields(descriptors = descriptors.len()))]
    pub fn sections<P: Default>(
        &self,
        current: Option<&Snapshot<P>>,
        descriptors: Vec<ItemDescriptor<P>>,
    ) -> Snapshot<P> {
        let old_root = current.map(|snapshot| snapshot.root());
        let root_id = old_root.map_or_else(NodeId::allocate, |root| root.id());

        let mut claimed: HashSet<NodeId> = HashSet::new();
        let mut sections = Vec::new();
        for (section_name, items) in self.group(descriptors) {
            let old_section = old_root.and_then(|root| claim(root, &section_name, &mut claimed));
            sections.push(Arc::new(rebuild_section(
                section_name,
                items,
                old_section,
                root_id,
                &mut claimed,
            )));
        }

        debug!(
            "reconciled {} sections, {} old nodes carried forward",
            sections.len(),
            claimed.len()
        );
        let (name, payload) = old_root.map_or_else(
            || (String::new(), None),
            |root| (root.name().to_string(), root.payload_handle().cloned()),
        );
        Snapshot::new(Arc::new(Node::assemble(
            root_id, name, false, payload, None, sections,
        )))
    }

    /// Full-tree rebuild from nested configuration.
    ///
    /// The new root matches the old root when names agree; below that, each
    /// config matches the first unclaimed same-named child of the matched
    /// parent. Matched nodes keep id and payload (and their own selection
    /// while they stay leaves); unmatched configs are built fresh.
    #[instrument(level = "debug", skip_all, fields(root = %config.name))]
    pub fn tree<P>(&self, current: Option<&Snapshot<P>>, config: NodeConfig<P>) -> Snapshot<P> {
        let mut builder = TreeBuilder::new();
        let old_root = current
            .map(|snapshot| snapshot.root())
            .filter(|root| root.name() == config.name);
        let root = reconcile_node(old_root, config, None, &mut builder);
        debug!("built {} fresh nodes", builder.nodes_built());
        Snapshot::new(root)
    }

    /// Group descriptors by section name, preserving first-seen order.
    fn group<P>(&self, descriptors: Vec<ItemDescriptor<P>>) -> Vec<(String, Vec<ItemDescriptor<P>>)> {
        let mut groups: Vec<(String, Vec<ItemDescriptor<P>>)> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for descriptor in descriptors {
            let section = descriptor
                .section_name
                .clone()
                .unwrap_or_else(|| self.default_section.clone());
            match positions.get(&section) {
                Some(&position) => groups[position].1.push(descriptor),
                None => {
                    positions.insert(section.clone(), groups.len());
                    groups.push((section, vec![descriptor]));
                }
            }
        }
        groups
    }
}

/// First child of `parent` named `name` that no earlier match took.
fn claim<'a, P>(
    parent: &'a Node<P>,
    name: &str,
    claimed: &mut HashSet<NodeId>,
) -> Option<&'a Arc<Node<P>>> {
    let found = parent
        .children()
        .iter()
        .find(|child| child.name() == name && !claimed.contains(&child.id()))?;
    claimed.insert(found.id());
    Some(found)
}

fn rebuild_section<P: Default>(
    name: String,
    descriptors: Vec<ItemDescriptor<P>>,
    old_section: Option<&Arc<Node<P>>>,
    root_id: NodeId,
    claimed: &mut HashSet<NodeId>,
) -> Node<P> {
    let section_id = old_section.map_or_else(NodeId::allocate, |section| section.id());
    // A fresh section takes the first descriptor payload; a matched one keeps its own
    let mut fresh_payload: Option<Arc<P>> = None;

    let mut items = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if old_section.is_none() && fresh_payload.is_none() {
            fresh_payload = descriptor.section_payload.map(Arc::new);
        }
        match old_section.and_then(|section| claim(section, &descriptor.item_name, claimed)) {
            Some(old_item) => {
                trace!("reusing item {} {}", old_item.id(), old_item.name());
                items.push(Arc::clone(old_item));
            }
            None => items.push(Arc::new(Node::assemble(
                NodeId::allocate(),
                descriptor.item_name,
                descriptor.selected.unwrap_or(false),
                Some(Arc::new(descriptor.payload.unwrap_or_default())),
                Some(section_id),
                Vec::new(),
            ))),
        }
    }

    let payload = match old_section {
        Some(section) => section.payload_handle().cloned(),
        None => Some(fresh_payload.unwrap_or_else(|| Arc::new(P::default()))),
    };
    Node::assemble(section_id, name, false, payload, Some(root_id), items)
}

/// Pending work while reconciling a nested configuration.
enum Frame<'a, P> {
    Enter {
        old: Option<&'a Arc<Node<P>>>,
        config: NodeConfig<P>,
        parent: Option<NodeId>,
    },
    Assemble {
        old: &'a Arc<Node<P>>,
        name: String,
        parent: Option<NodeId>,
        arity: usize,
    },
}

fn reconcile_node<P>(
    old: Option<&Arc<Node<P>>>,
    config: NodeConfig<P>,
    parent: Option<NodeId>,
    builder: &mut TreeBuilder,
) -> Arc<Node<P>> {
    let mut stack = vec![Frame::Enter {
        old,
        config,
        parent,
    }];
    let mut built: Vec<Arc<Node<P>>> = Vec::new();

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter {
                old: None,
                config,
                parent,
            } => built.push(builder.build_subtree(config, parent)),
            Frame::Enter {
                old: Some(old),
                config,
                parent,
            } => {
                let NodeConfig { name, children, .. } = config;
                // Claims run in configured order, frames are pushed in reverse
                let mut claimed = HashSet::new();
                let matched: Vec<_> = children
                    .into_iter()
                    .map(|child| (claim(old, &child.name, &mut claimed), child))
                    .collect();

                stack.push(Frame::Assemble {
                    old,
                    name,
                    parent,
                    arity: matched.len(),
                });
                for (old_child, child) in matched.into_iter().rev() {
                    stack.push(Frame::Enter {
                        old: old_child,
                        config: child,
                        parent: Some(old.id()),
                    });
                }
            }
            Frame::Assemble {
                old,
                name,
                parent,
                arity,
            } => {
                let children = built.split_off(built.len() - arity);
                built.push(Arc::new(Node::assemble(
                    old.id(),
                    name,
                    // Cached flag, equal to is_all_selected() by construction
                    old.selected(),
                    old.payload_handle().cloned(),
                    parent,
                    children,
                )));
            }
        }
    }

    built
        .pop()
        .unwrap_or_else(|| unreachable!("reconcile stack always yields the root"))
}
