//! Nested scope recorder.
//!
//! A tree of scopes collects entries and artifact manifests. Disposing a child
//! folds it into its parent under the child's name; disposing the root writes
//! the merged tree as a single JSON document.
//!
//! # OWNERSHIP INVARIANT
//! A tree lives on one thread. Every handle shares the arena through `Rc`, and
//! no borrow of the arena is held while user code (wrapped calls, entry
//! conversions, figure rasterization) runs.

pub mod entries;
pub mod merge;
pub mod scope;
pub mod serializer;
pub mod step;
mod tree;
pub mod value;

pub use entries::EntryTable;
pub use scope::Scope;
pub use serializer::{to_document, to_json, DocumentOptions};
pub use step::{Naming, StepCounter};
pub use tree::{ArtifactRecord, ScopeState, ROOT_NAME};
pub use value::{Mapping, OpaqueRef, Value};
