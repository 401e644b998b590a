//! Arena of scope nodes for one recorder tree.
//!
//! Nodes are never removed: a disposed node stays as a tombstone so handles
//! that still point at it can report a precise `State` error.

use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

use super::entries::EntryTable;
use super::merge::{self, ARTIFACTS_KEY};
use super::serializer::{self, DocumentOptions};
use super::step::{self, StepCounter};
use super::value::Value;
use crate::config::LoggerConfig;
use crate::error::{Result, TelemetryError};

/// Name reported for the root scope; it never becomes a path segment.
pub const ROOT_NAME: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Active,
    Disposed,
}

/// One saved artifact, path relative to the root output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub logical_name: String,
    pub relative_file_path: PathBuf,
}

impl ArtifactRecord {
    pub fn to_value(&self) -> Value {
        Value::mapping([
            ("logicalName", Value::from(self.logical_name.as_str())),
            (
                "relativeFilePath",
                Value::from(self.relative_file_path.to_string_lossy().into_owned()),
            ),
        ])
    }
}

#[derive(Debug)]
pub struct ScopeNode {
    pub name: String,
    pub parent: Option<ScopeId>,
    pub entries: EntryTable,
    pub step: StepCounter,
    /// Children that are still Active. Merged children leave this list.
    pub children: Vec<ScopeId>,
    pub artifacts: Vec<ArtifactRecord>,
    pub state: ScopeState,
    pub base_path: PathBuf,
    opened_at: DateTime<Utc>,
    clock: Instant,
}

impl ScopeNode {
    fn new(name: String, parent: Option<ScopeId>, base_path: PathBuf) -> Self {
        Self {
            name,
            parent,
            entries: EntryTable::new(),
            step: StepCounter::new(),
            children: Vec::new(),
            artifacts: Vec::new(),
            state: ScopeState::Active,
            base_path,
            opened_at: Utc::now(),
            clock: Instant::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == ScopeState::Active
    }

    fn record_timing(&mut self) {
        self.entries.insert("start", self.opened_at.to_rfc3339());
        self.entries.insert("end", Utc::now().to_rfc3339());
        self.entries.insert("dt", self.clock.elapsed().as_secs_f64());
    }
}

#[derive(Debug)]
pub struct ScopeTree {
    pub config: LoggerConfig,
    nodes: Vec<ScopeNode>,
}

impl ScopeTree {
    /// Builds a tree holding only its root. The output directory is not
    /// touched unless `clear_dir` asks for it; creation waits for the first write.
    pub fn new(config: LoggerConfig) -> Result<(Self, ScopeId)> {
        if config.clear_dir {
            match fs::remove_dir_all(&config.output_dir) {
                Ok(()) => debug!("Cleared output directory {}", config.output_dir.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(TelemetryError::Config {
                        path: config.output_dir.clone(),
                        source,
                    })
                }
            }
        }

        let root = ScopeNode::new(ROOT_NAME.to_string(), None, config.output_dir.clone());
        let tree = Self {
            config,
            nodes: vec![root],
        };
        Ok((tree, ScopeId(0)))
    }

    pub fn node(&self, id: ScopeId) -> &ScopeNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut ScopeNode> {
        self.nodes.get_mut(id.0)
    }

    /// Mutable access for an operation that requires the scope to be Active.
    pub fn active_mut(&mut self, id: ScopeId, operation: &'static str) -> Result<&mut ScopeNode> {
        let node = &mut self.nodes[id.0];
        if !node.is_active() {
            return Err(TelemetryError::state(&node.name, operation));
        }
        Ok(node)
    }

    pub fn create_child(&mut self, parent: ScopeId, name: &str) -> Result<ScopeId> {
        step::validate_segment(name).map_err(|reason| TelemetryError::InvalidName {
            name: name.to_string(),
            reason,
        })?;

        let parent_node = self.active_mut(parent, "create a child")?;
        let base_path = parent_node.base_path.join(name);
        let children = parent_node.children.clone();

        if children.iter().any(|c| self.nodes[c.0].name == name) {
            return Err(TelemetryError::DuplicateName {
                parent: self.nodes[parent.0].name.clone(),
                name: name.to_string(),
            });
        }

        let id = ScopeId(self.nodes.len());
        self.nodes.push(ScopeNode::new(name.to_string(), Some(parent), base_path));
        self.nodes[parent.0].children.push(id);
        debug!("Opened scope `{}` under `{}`", name, self.nodes[parent.0].name);
        Ok(id)
    }

    /// Path of `path` relative to the root output directory.
    pub fn relative_to_root(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.config.output_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Active→Disposed, then merge into the parent or write the document.
    /// A second call is a no-op.
    pub fn dispose(&mut self, id: ScopeId) -> Result<()> {
        let record_timing = self.config.record_timing;
        let node = &mut self.nodes[id.0];
        if !node.is_active() {
            return Ok(());
        }
        node.state = ScopeState::Disposed;
        if record_timing {
            node.record_timing();
        }
        let parent = node.parent;
        let still_active = node.children.clone();
        let dangling: Vec<String> = still_active
            .iter()
            .map(|c| self.nodes[c.0].name.clone())
            .collect();

        match parent {
            Some(parent) => merge::fold_into_parent(self, id, parent)?,
            None => self.finalize_root(id)?,
        }

        if !dangling.is_empty() {
            return Err(TelemetryError::DanglingChild {
                scope: self.nodes[id.0].name.clone(),
                children: dangling,
            });
        }
        Ok(())
    }

    fn finalize_root(&self, id: ScopeId) -> Result<()> {
        let root = self.node(id);
        let mut entries = root.entries.to_mapping();
        if !root.artifacts.is_empty() {
            if entries.contains_key(ARTIFACTS_KEY) {
                warn!("Root entry `{}` replaced by the root artifact manifest", ARTIFACTS_KEY);
            }
            entries.insert(ARTIFACTS_KEY.to_string(), merge::artifact_manifest(root));
        }

        let document = serializer::to_document(&entries, &DocumentOptions::from(&self.config));
        serializer::write_document(&self.config.document_path(), &document)
    }
}
