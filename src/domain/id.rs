//! Process-local node identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a logical node.
///
/// Assigned once when a node is created and carried forward by every
/// copy-on-write rebuild and by reconciliation. Uniqueness is statistical:
/// identifiers are drawn from random v4 UUIDs, there is no registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Draw a fresh identifier.
    pub fn allocate() -> Self {
        let (high, _) = Uuid::new_v4().as_u64_pair();
        Self(high)
    }

    /// Wrap an identifier the caller already holds.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}
