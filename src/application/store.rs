//! The current-snapshot cell.
//!
//! Holds exactly one writer's view of the tree. Every request runs through
//! the reducer; the resulting snapshot replaces the current one by a single
//! reference swap, so readers holding an older snapshot keep a consistent
//! view.

use std::fmt;

use tracing::{debug, instrument};

use crate::domain::{
    ItemDescriptor, NodeConfig, NodeId, Reconciler, Reducer, Request, Snapshot, TreeBuilder,
};

/// Handle returned by [`TreeStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Listener<P> = Box<dyn FnMut(&Snapshot<P>)>;

/// Owns the current snapshot and publishes replacements to subscribers.
pub struct TreeStore<P> {
    current: Snapshot<P>,
    reducer: Reducer,
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener<P>)>,
    next_subscription: usize,
}

impl<P> fmt::Debug for TreeStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeStore")
            .field("root", &self.current.root().id())
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<P: Default> TreeStore<P> {
    pub fn new(initial: Snapshot<P>) -> Self {
        Self::with_reducer(initial, Reducer::default())
    }

    pub fn with_reducer(initial: Snapshot<P>, reducer: Reducer) -> Self {
        Self {
            current: initial,
            reducer,
            revision: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Initialise from a nested configuration.
    pub fn from_config(config: NodeConfig<P>) -> Self {
        Self::new(TreeBuilder::new().build(config))
    }

    /// Initialise from flat descriptors via the two-level reconciler.
    pub fn from_descriptors(descriptors: Vec<ItemDescriptor<P>>, reconciler: Reconciler) -> Self {
        let initial = reconciler.sections(None, descriptors);
        Self::with_reducer(initial, Reducer::new(reconciler))
    }

    pub fn snapshot(&self) -> &Snapshot<P> {
        &self.current
    }

    /// Number of snapshots published since construction.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a callback invoked with every newly published snapshot.
    pub fn subscribe(&mut self, listener: impl FnMut(&Snapshot<P>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Apply `request` and return the (possibly unchanged) current snapshot.
    ///
    /// Subscribers are notified only when the snapshot was replaced.
    #[instrument(level = "debug", skip_all, fields(kind = request.kind()))]
    pub fn dispatch(&mut self, request: Request<P>) -> Snapshot<P> {
        let next = self.reducer.apply(&self.current, request);
        if next.ptr_eq(&self.current) {
            debug!("snapshot unchanged at revision {}", self.revision);
            return next;
        }

        self.current = next;
        self.revision += 1;
        debug!("published revision {}", self.revision);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.current);
        }
        self.current.clone()
    }

    pub fn toggle(&mut self, target: NodeId) -> Snapshot<P> {
        self.dispatch(Request::Toggle(target))
    }

    pub fn set_selected(&mut self, target: NodeId, selected: bool) -> Snapshot<P> {
        self.dispatch(Request::SetSelected { target, selected })
    }

    pub fn set_payload(&mut self, target: NodeId, payload: Option<P>) -> Snapshot<P> {
        self.dispatch(Request::SetPayload { target, payload })
    }

    pub fn set_name(&mut self, target: NodeId, name: impl Into<String>) -> Snapshot<P> {
        self.dispatch(Request::SetName {
            target,
            name: name.into(),
        })
    }

    pub fn set_children(&mut self, target: NodeId, children: Vec<NodeConfig<P>>) -> Snapshot<P> {
        self.dispatch(Request::SetChildren { target, children })
    }

    pub fn add_child(&mut self, target: NodeId, child: NodeConfig<P>) -> Snapshot<P> {
        self.dispatch(Request::AddChild { target, child })
    }

    /// Append a section under the root.
    pub fn add_section(&mut self, section: NodeConfig<P>) -> Snapshot<P> {
        let root = self.current.root().id();
        self.add_child(root, section)
    }

    pub fn remove(&mut self, target: NodeId) -> Snapshot<P> {
        self.dispatch(Request::Remove(target))
    }

    pub fn replace_tree(&mut self, tree: Snapshot<P>) -> Snapshot<P> {
        self.dispatch(Request::ReplaceTree(tree))
    }

    pub fn rebuild(&mut self, descriptors: Vec<ItemDescriptor<P>>) -> Snapshot<P> {
        self.dispatch(Request::Rebuild(descriptors))
    }

    pub fn reconcile(&mut self, config: NodeConfig<P>) -> Snapshot<P> {
        self.dispatch(Request::Reconcile(config))
    }
}
