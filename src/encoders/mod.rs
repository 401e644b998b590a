//! Artifact encoders.
//!
//! Each kind has one encoder function taking the value and a destination path.
//! The caller picks the kind; the scope only needs the path and the outcome.

pub mod animation;
pub mod bitmap;
pub mod figure;
pub mod json;
pub mod object;
pub mod table;

use ::image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::telemetry::Value;

pub use animation::Looping;
pub use figure::Figure;
pub use object::Persist;
pub use table::Table;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("could not write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("image encoding failed")]
    Image(#[from] ::image::ImageError),

    #[error("object serialization failed")]
    Object(#[from] bincode::Error),

    #[error("json encoding failed")]
    Json(#[from] serde_json::Error),

    #[error("figure could not be rasterized")]
    Rasterize(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The value lacks what this encoder needs.
    #[error("{0}")]
    Unsupported(String),
}

impl EncodingError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        EncodingError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Object,
    Image,
    Figure,
    Table,
    Json,
    Animation,
}

impl ArtifactKind {
    pub fn default_extension(self) -> &'static str {
        match self {
            ArtifactKind::Object => "bin",
            ArtifactKind::Image | ArtifactKind::Figure => "png",
            ArtifactKind::Table => "csv",
            ArtifactKind::Json => "json",
            ArtifactKind::Animation => "gif",
        }
    }
}

/// A value paired with the encoder that will write it.
pub enum Artifact<'a> {
    Object(&'a dyn Persist),
    Image {
        image: &'a DynamicImage,
        format: ImageFormat,
    },
    Figure(&'a dyn Figure),
    Table {
        table: &'a Table,
        /// Prepend a row-number column.
        index: bool,
    },
    Json(&'a Value),
    Animation {
        frames: &'a [DynamicImage],
        frame_delay_ms: u32,
        looping: Looping,
    },
}

impl<'a> Artifact<'a> {
    pub fn object<T: Serialize>(value: &'a T) -> Self {
        Artifact::Object(value)
    }

    /// PNG image.
    pub fn image(image: &'a DynamicImage) -> Self {
        Artifact::Image {
            image,
            format: ImageFormat::Png,
        }
    }

    pub fn figure(figure: &'a dyn Figure) -> Self {
        Artifact::Figure(figure)
    }

    /// CSV with a leading row-number column.
    pub fn table(table: &'a Table) -> Self {
        Artifact::Table { table, index: true }
    }

    pub fn json(value: &'a Value) -> Self {
        Artifact::Json(value)
    }

    /// GIF at 100 ms per frame, looping forever.
    pub fn animation(frames: &'a [DynamicImage]) -> Self {
        Artifact::Animation {
            frames,
            frame_delay_ms: animation::DEFAULT_FRAME_DELAY_MS,
            looping: Looping::Forever,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Object(_) => ArtifactKind::Object,
            Artifact::Image { .. } => ArtifactKind::Image,
            Artifact::Figure(_) => ArtifactKind::Figure,
            Artifact::Table { .. } => ArtifactKind::Table,
            Artifact::Json(_) => ArtifactKind::Json,
            Artifact::Animation { .. } => ArtifactKind::Animation,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Artifact::Image { format, .. } => format
                .extensions_str()
                .first()
                .copied()
                .unwrap_or_else(|| self.kind().default_extension()),
            _ => self.kind().default_extension(),
        }
    }
}

/// Writes `artifact` to `destination`, creating parent directories first.
pub fn encode(artifact: &Artifact<'_>, destination: &Path) -> Result<(), EncodingError> {
    if let Some(dir) = destination.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| EncodingError::io(dir, e))?;
    }

    match artifact {
        Artifact::Object(value) => object::encode(*value, destination),
        Artifact::Image { image: picture, format } => bitmap::encode(picture, *format, destination),
        Artifact::Figure(source) => figure::encode(*source, destination),
        Artifact::Table { table: rows, index } => table::encode(rows, *index, destination),
        Artifact::Json(value) => json::encode(value, destination),
        Artifact::Animation {
            frames,
            frame_delay_ms,
            looping,
        } => animation::encode(frames, *frame_delay_ms, *looping, destination),
    }
}
