//! Tri-state checkbox trees.
//!
//! An ordered tree of named, independently selectable nodes. A container's
//! state is derived from its descendants (checked, unchecked or
//! indeterminate). Every mutation produces a new immutable [`Snapshot`]
//! that shares untouched subtrees with its predecessor, and reconciliation
//! against new configuration keeps the identity and selection of nodes that
//! still exist.
//!
//! ```
//! use checktree::domain::{build, reduce, NodeConfig, Request};
//!
//! let tree = build::<()>(
//!     NodeConfig::new("Shopping")
//!         .with_child(NodeConfig::new("Milk").with_selected(true))
//!         .with_child(NodeConfig::new("Eggs")),
//! );
//! assert!(tree.root().is_indeterminate());
//!
//! let next = reduce(&tree, Request::Toggle(tree.root().id()));
//! assert!(next.root().is_all_selected());
//! assert!(tree.root().is_indeterminate());
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use domain::{Node, NodeConfig, NodeId, Request, Snapshot};
