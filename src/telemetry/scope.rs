use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, warn};

use super::step::{self, Naming};
use super::tree::{ArtifactRecord, ScopeId, ScopeTree};
use super::value::{Mapping, Value};
use crate::config::LoggerConfig;
use crate::encoders::{self, Artifact};
use crate::error::{Result, TelemetryError};

/// Handle to one logging scope.
///
/// Dropping the handle disposes the scope: a child merges into its parent,
/// the root writes the telemetry document. Use [`Scope::close`] or
/// [`Scope::dispose`] to observe disposal errors, which `Drop` can only log.
///
/// Handles of one tree share it through `Rc`, so a tree stays on the thread
/// that opened it.
pub struct Scope {
    tree: Rc<RefCell<ScopeTree>>,
    id: ScopeId,
}

impl Scope {
    /// Opens the root scope of a new tree writing under `config.output_dir`.
    pub fn root(config: LoggerConfig) -> Result<Scope> {
        let (tree, id) = ScopeTree::new(config)?;
        debug!("Opened root scope at {}", tree.node(id).base_path.display());
        Ok(Scope {
            tree: Rc::new(RefCell::new(tree)),
            id,
        })
    }

    /// Opens a child scope whose files live under `<base_path>/<name>`.
    pub fn child(&self, name: &str) -> Result<Scope> {
        let id = self.tree.borrow_mut().create_child(self.id, name)?;
        Ok(Scope {
            tree: Rc::clone(&self.tree),
            id,
        })
    }

    pub fn add_entry(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        // Conversions may read this tree, so they finish before the borrow.
        let (key, value) = (key.into(), value.into());
        let mut tree = self.tree.borrow_mut();
        tree.active_mut(self.id, "add an entry")?
            .entries
            .insert(key, value);
        Ok(())
    }

    /// Writes each pair in order, later duplicates overwriting earlier ones.
    /// `pairs` is drained before the tree is borrowed.
    pub fn add_entries<K, V, I>(&self, pairs: I) -> Result<()>
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let pairs: Vec<(String, Value)> = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        let mut tree = self.tree.borrow_mut();
        tree.active_mut(self.id, "add entries")?.entries.extend(pairs);
        Ok(())
    }

    /// Runs `f` with `args` and records `{args, result}` under `<name>_<step>`.
    ///
    /// The step advances before `f` runs, also when `f` fails. A failure from
    /// `f` is returned untouched and leaves no entry behind. The tree is not
    /// borrowed while `f` runs, so `f` may log through any handle.
    pub fn log_call<R, E, F>(&self, name: &str, args: Mapping, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&Mapping) -> std::result::Result<R, E>,
        R: Clone + Into<Value>,
        E: From<TelemetryError>,
    {
        let step = {
            let mut tree = self.tree.borrow_mut();
            tree.active_mut(self.id, "log a call")?.step.advance()
        };

        let started = Instant::now();
        let result = f(&args)?;
        let elapsed = started.elapsed();

        let mut tree = self.tree.borrow_mut();
        let record_timing = tree.config.record_timing;
        let node = tree.active_mut(self.id, "record a call")?;

        let mut record = Mapping::new();
        record.insert("args".to_string(), Value::Mapping(args));
        record.insert("result".to_string(), result.clone().into());
        if record_timing {
            record.insert("dt".to_string(), Value::from(elapsed.as_secs_f64()));
        }
        node.entries.insert(step::call_label(name, step), Value::Mapping(record));
        Ok(result)
    }

    /// Encodes `artifact` into this scope's directory and records it in the
    /// manifest. Returns the written path. Does not advance the step.
    pub fn save_artifact(&self, name: &str, artifact: &Artifact<'_>, naming: Naming) -> Result<PathBuf> {
        let (dir, file_name) = {
            let mut tree = self.tree.borrow_mut();
            let node = tree.active_mut(self.id, "save an artifact")?;
            let file_name =
                step::artifact_file_name(naming, node.step.current(), name, artifact.extension());
            (node.base_path.clone(), file_name)
        };

        std::fs::create_dir_all(&dir).map_err(|source| TelemetryError::Config {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(file_name);

        // Encoders may run user code (figures), so the tree stays unborrowed here.
        encoders::encode(artifact, &path).map_err(|source| TelemetryError::Encoding {
            name: name.to_string(),
            source,
        })?;

        let mut tree = self.tree.borrow_mut();
        let relative_file_path = tree.relative_to_root(&path);
        tree.active_mut(self.id, "record an artifact")?
            .artifacts
            .push(ArtifactRecord {
                logical_name: name.to_string(),
                relative_file_path,
            });
        debug!("Saved {:?} artifact `{}` to {}", artifact.kind(), name, path.display());
        Ok(path)
    }

    /// Disposes the scope. Idempotent: later calls return `Ok(())`.
    pub fn dispose(&self) -> Result<()> {
        self.tree.borrow_mut().dispose(self.id)
    }

    /// Disposes the scope and consumes the handle.
    pub fn close(self) -> Result<()> {
        self.dispose()
    }

    pub fn name(&self) -> String {
        self.tree.borrow().node(self.id).name.clone()
    }

    pub fn base_path(&self) -> PathBuf {
        self.tree.borrow().node(self.id).base_path.clone()
    }

    pub fn step(&self) -> u64 {
        self.tree.borrow().node(self.id).step.current()
    }

    /// Snapshot of the entry table, readable in any state.
    pub fn entries(&self) -> Mapping {
        self.tree.borrow().node(self.id).entries.to_mapping()
    }

    pub fn artifacts(&self) -> Vec<ArtifactRecord> {
        self.tree.borrow().node(self.id).artifacts.clone()
    }

    pub fn is_disposed(&self) -> bool {
        !self.tree.borrow().node(self.id).is_active()
    }

    /// Where the root writes the final document.
    pub fn document_path(&self) -> PathBuf {
        self.tree.borrow().config.document_path()
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let Ok(mut tree) = self.tree.try_borrow_mut() else {
            warn!("Scope dropped while its tree was borrowed; disposal skipped");
            return;
        };
        if let Err(e) = tree.dispose(self.id) {
            warn!("Disposing scope `{}` on drop failed: {}", tree.node(self.id).name, e);
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tree.try_borrow() {
            Ok(tree) => {
                let node = tree.node(self.id);
                f.debug_struct("Scope")
                    .field("name", &node.name)
                    .field("state", &node.state)
                    .field("base_path", &node.base_path)
                    .finish()
            }
            Err(_) => f.debug_struct("Scope").field("id", &self.id).finish(),
        }
    }
}
