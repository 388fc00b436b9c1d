//! Loading declarative tree documents from TOML.
//!
//! A document carries either a nested `[tree]` table or a flat `[[items]]`
//! list of section/item descriptors:
//!
//! ```toml
//! [tree]
//! name = "Complete All"
//!
//! [[tree.children]]
//! name = "Shopping"
//!
//! [[tree.children.children]]
//! name = "Milk"
//! selected = true
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{ItemDescriptor, NodeConfig, Reconciler, Snapshot, TreeBuilder};

/// Parsed tree document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeDocument<P> {
    pub tree: Option<NodeConfig<P>>,
    pub items: Vec<ItemDescriptor<P>>,
}

impl<P> Default for TreeDocument<P> {
    fn default() -> Self {
        Self {
            tree: None,
            items: Vec::new(),
        }
    }
}

const EMPTY_DOCUMENT: &str = "document has neither [tree] nor [[items]]";

impl<P> TreeDocument<P> {
    /// Neither a nested tree nor any descriptors.
    pub fn is_empty(&self) -> bool {
        self.tree.is_none() && self.items.is_empty()
    }
}

impl<P: Default> TreeDocument<P> {
    /// Build the initial snapshot: the nested tree wins over descriptors.
    pub fn into_snapshot(self, reconciler: &Reconciler) -> ApplicationResult<Snapshot<P>> {
        match (self.tree, self.items.is_empty()) {
            (Some(tree), _) => Ok(TreeBuilder::new().build(tree)),
            (None, false) => Ok(reconciler.sections(None, self.items)),
            (None, true) => Err(ApplicationError::InvalidDocument {
                message: EMPTY_DOCUMENT.to_string(),
            }),
        }
    }
}

/// Read and parse a document from disk.
#[instrument(level = "debug")]
pub fn load_document<P: DeserializeOwned>(path: &Path) -> ApplicationResult<TreeDocument<P>> {
    let content = std::fs::read_to_string(path).with_path_context("read tree document", path)?;
    let document: TreeDocument<P> =
        toml::from_str(&content).map_err(|e| ApplicationError::Document {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
    debug!(
        "loaded document: tree={}, items={}",
        document.tree.is_some(),
        document.items.len()
    );
    Ok(document)
}

/// Load a document and build its initial snapshot.
pub fn load_snapshot<P>(path: &Path, reconciler: &Reconciler) -> ApplicationResult<Snapshot<P>>
where
    P: DeserializeOwned + Default,
{
    let document: TreeDocument<P> = load_document(path)?;
    if document.is_empty() {
        return Err(ApplicationError::Document {
            path: path.to_path_buf(),
            message: EMPTY_DOCUMENT.to_string(),
        });
    }
    document.into_snapshot(reconciler)
}

/// Parse a document from TOML text.
pub fn parse_document<P: DeserializeOwned>(content: &str) -> ApplicationResult<TreeDocument<P>> {
    toml::from_str(content).map_err(|e| ApplicationError::InvalidDocument {
        message: e.message().to_string(),
    })
}
