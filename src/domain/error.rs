//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::id::NodeId;

/// Domain errors raised by the mutation engine.
///
/// Both variants describe requests that cannot take effect on the current
/// snapshot. `Reducer::apply` recovers from them as no-ops; `try_apply`
/// surfaces them to callers that want to know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found in current snapshot: {0}")]
    NodeNotFound(NodeId),

    #[error("root node cannot be removed: {0}")]
    RootNotRemovable(NodeId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
