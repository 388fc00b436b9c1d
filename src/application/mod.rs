//! Application layer: state cell and document loading
//!
//! This layer drives the domain engine on behalf of consumers and owns the
//! only I/O the library performs (reading tree documents).

pub mod error;
pub mod error_ext;
pub mod loader;
pub mod store;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use loader::{load_document, load_snapshot, parse_document, TreeDocument};
pub use store::{SubscriptionId, TreeStore};
