//! The single transition function every mutation flows through.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::builder::TreeBuilder;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::id::NodeId;
use crate::domain::node::Node;
use crate::domain::query::CheckState;
use crate::domain::reconcile::Reconciler;
use crate::domain::request::Request;
use crate::domain::snapshot::{Edit, Snapshot};

/// Applies [`Request`]s to snapshots.
///
/// Single-node requests are realised as copy-on-write path rebuilds: only
/// the target and its ancestors are replaced, every other subtree of the
/// result is the same allocation as in the input snapshot.
#[derive(Debug, Clone, Default)]
pub struct Reducer {
    reconciler: Reconciler,
}

impl Reducer {
    pub fn new(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Apply `request`, treating stale targets and root removal as no-ops
    /// that return `current` unchanged.
    pub fn apply<P: Default>(&self, current: &Snapshot<P>, request: Request<P>) -> Snapshot<P> {
        let kind = request.kind();
        match self.try_apply(current, request) {
            Ok(next) => next,
            Err(e) => {
                debug!("{} ignored: {}", kind, e);
                current.clone()
            }
        }
    }

    /// Apply `request`, reporting requests that cannot take effect.
    #[instrument(level = "debug", skip_all, fields(kind = request.kind()))]
    pub fn try_apply<P: Default>(
        &self,
        current: &Snapshot<P>,
        request: Request<P>,
    ) -> DomainResult<Snapshot<P>> {
        match request {
            Request::Toggle(target) => edit(current, target, |node| Edit::Replace(toggled(node))),
            Request::SetSelected { target, selected } => edit(current, target, |node| {
                Edit::Replace(node.with_selection(selected))
            }),
            Request::SetPayload { target, payload } => edit(current, target, |node| {
                Edit::Replace(node.with_payload(payload.map(Arc::new)))
            }),
            Request::SetName { target, name } => {
                edit(current, target, |node| Edit::Replace(node.with_name(name)))
            }
            Request::SetChildren { target, children } => edit(current, target, |node| {
                let mut builder = TreeBuilder::new();
                let children = children
                    .into_iter()
                    .map(|child| builder.build_subtree(child, Some(node.id())))
                    .collect();
                Edit::Replace(node.with_children(children))
            }),
            Request::AddChild { target, child } => edit(current, target, |node| {
                let child = TreeBuilder::new().build_subtree(child, Some(node.id()));
                let mut children = node.children().to_vec();
                children.push(child);
                Edit::Replace(node.with_children(children))
            }),
            Request::Remove(target) => {
                let path = current
                    .path_to(target)
                    .ok_or(DomainError::NodeNotFound(target))?;
                if path.is_empty() {
                    return Err(DomainError::RootNotRemovable(target));
                }
                current
                    .rewrite(&path, |_| Edit::Remove)
                    .ok_or(DomainError::NodeNotFound(target))
            }
            Request::ReplaceTree(next) => Ok(next),
            Request::Rebuild(descriptors) => Ok(self.reconciler.sections(Some(current), descriptors)),
            Request::Reconcile(config) => Ok(self.reconciler.tree(Some(current), config)),
        }
    }
}

/// Apply a request with a default reducer.
pub fn reduce<P: Default>(current: &Snapshot<P>, request: Request<P>) -> Snapshot<P> {
    Reducer::default().apply(current, request)
}

fn edit<P, F>(current: &Snapshot<P>, target: NodeId, f: F) -> DomainResult<Snapshot<P>>
where
    F: FnOnce(&Node<P>) -> Edit<P>,
{
    let path = current
        .path_to(target)
        .ok_or(DomainError::NodeNotFound(target))?;
    current
        .rewrite(&path, f)
        .ok_or(DomainError::NodeNotFound(target))
}

fn toggled<P>(node: &Node<P>) -> Node<P> {
    match node.check_state() {
        CheckState::Indeterminate | CheckState::Unchecked => node.with_selection(true),
        CheckState::Checked => node.with_selection(false),
    }
}
