//! Loader errors.

use std::io;
use std::path::{Path, PathBuf};
use wellmap_layout::LayoutError;

/// Error types for loading layout files
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read layout file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to parse TOML in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl LoadError {
    /// The file the error came from, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LoadError::Io { path, .. } | LoadError::Parse { path, .. } => Some(path),
            LoadError::Layout(err) => err.path(),
        }
    }

    /// The layout error behind this failure, if it was one.
    pub fn layout_error(&self) -> Option<&LayoutError> {
        match self {
            LoadError::Layout(err) => Some(err.kind()),
            _ => None,
        }
    }
}
