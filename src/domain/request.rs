//! Mutation requests: the complete, closed set of state changes.

use crate::domain::id::NodeId;
use crate::domain::node::NodeConfig;
use crate::domain::reconcile::ItemDescriptor;
use crate::domain::snapshot::Snapshot;

/// A state-changing request handled by the reducer.
///
/// Every variant carries all the fields it needs, so a request of unknown
/// kind or with a missing field cannot be constructed.
#[derive(Debug, Clone)]
pub enum Request<P> {
    /// Indeterminate → select all; all selected → unselect all; otherwise
    /// select all.
    Toggle(NodeId),
    /// Force the node and every descendant leaf to `selected`.
    SetSelected { target: NodeId, selected: bool },
    SetPayload { target: NodeId, payload: Option<P> },
    SetName { target: NodeId, name: String },
    /// Replace the child list with freshly built subtrees; no identity is
    /// carried over.
    SetChildren {
        target: NodeId,
        children: Vec<NodeConfig<P>>,
    },
    AddChild { target: NodeId, child: NodeConfig<P> },
    /// Detach a non-root node from its parent.
    Remove(NodeId),
    /// Adopt a whole tree verbatim.
    ReplaceTree(Snapshot<P>),
    /// Two-level (section → item) reconciliation against the current tree.
    Rebuild(Vec<ItemDescriptor<P>>),
    /// Full-tree reconciliation against the current tree.
    Reconcile(NodeConfig<P>),
}

impl<P> Request<P> {
    /// The node a single-node request addresses.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            Request::Toggle(target) | Request::Remove(target) => Some(*target),
            Request::SetSelected { target, .. }
            | Request::SetPayload { target, .. }
            | Request::SetName { target, .. }
            | Request::SetChildren { target, .. }
            | Request::AddChild { target, .. } => Some(*target),
            Request::ReplaceTree(_) | Request::Rebuild(_) | Request::Reconcile(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::Toggle(_) => "toggle",
            Request::SetSelected { .. } => "set-selected",
            Request::SetPayload { .. } => "set-payload",
            Request::SetName { .. } => "set-name",
            Request::SetChildren { .. } => "set-children",
            Request::AddChild { .. } => "add-child",
            Request::Remove(_) => "remove",
            Request::ReplaceTree(_) => "replace-tree",
            Request::Rebuild(_) => "rebuild",
            Request::Reconcile(_) => "reconcile",
        }
    }
}
