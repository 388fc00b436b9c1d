//! Domain layer: the checkbox tree engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod error;
pub mod id;
pub mod node;
pub mod query;
pub mod reconcile;
pub mod reducer;
pub mod render;
pub mod request;
pub mod snapshot;

pub use builder::{build, TreeBuilder};
pub use error::{DomainError, DomainResult};
pub use id::NodeId;
pub use node::{Node, NodeConfig};
pub use query::CheckState;
pub use reconcile::{ItemDescriptor, Reconciler, DEFAULT_SECTION_NAME};
pub use reducer::{reduce, Reducer};
pub use render::{RenderOptions, TreeDisplay};
pub use request::Request;
pub use snapshot::{PreOrder, Snapshot};
