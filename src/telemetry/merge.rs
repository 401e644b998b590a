//! Folding a disposed child into its parent.
//!
//! The child's entries and artifact manifest land in the parent's entry table
//! under the child's name. Files need no rewriting: the child already wrote
//! them under `parent_base / child_name`.

use tracing::debug;

use super::tree::{ScopeId, ScopeNode, ScopeState, ScopeTree};
use super::value::Value;
use crate::error::{Result, TelemetryError};

pub const ENTRIES_KEY: &str = "entries";
pub const ARTIFACTS_KEY: &str = "artifacts";

/// `{entries: .., artifacts: [..]}` view of a node, as stored in its parent.
pub(crate) fn merged_record(node: &ScopeNode) -> Value {
    Value::mapping([
        (ENTRIES_KEY, Value::Mapping(node.entries.to_mapping())),
        (ARTIFACTS_KEY, artifact_manifest(node)),
    ])
}

pub(crate) fn artifact_manifest(node: &ScopeNode) -> Value {
    Value::Sequence(node.artifacts.iter().map(|a| a.to_value()).collect())
}

pub(crate) fn fold_into_parent(tree: &mut ScopeTree, child: ScopeId, parent: ScopeId) -> Result<()> {
    let (name, record) = {
        let node = tree.node(child);
        (node.name.clone(), merged_record(node))
    };

    let Some(parent_node) = tree.get_mut(parent) else {
        return Err(TelemetryError::Merge {
            scope: name,
            reason: "parent scope no longer exists".to_string(),
        });
    };

    if parent_node.state == ScopeState::Disposed {
        return Err(TelemetryError::Merge {
            reason: format!("parent `{}` is already disposed", parent_node.name),
            scope: name,
        });
    }

    parent_node.children.retain(|c| *c != child);
    if parent_node.entries.insert(name.clone(), record).is_some() {
        debug!("Merge of `{}` replaced an earlier entry in `{}`", name, parent_node.name);
    } else {
        debug!("Merged `{}` into `{}`", name, parent_node.name);
    }
    Ok(())
}
