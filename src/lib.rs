pub mod config;
pub mod encoders;
pub mod error;
pub mod telemetry;

// Re-export the surface most callers need
pub use config::LoggerConfig;
pub use encoders::{Artifact, ArtifactKind, EncodingError, Figure, Looping, Persist, Table};
pub use error::{Result, TelemetryError};
pub use telemetry::{ArtifactRecord, Mapping, Naming, OpaqueRef, Scope, Value};
