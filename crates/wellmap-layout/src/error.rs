//! Layout error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors raised while parsing or resolving a layout.
///
/// Every variant carries a message meant to be shown to whoever wrote the
/// layout. Loaders attach the offending file with [`LayoutError::with_path`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Malformed row, column, or well token.
    #[error("{0}")]
    Address(String),

    /// Malformed list or range expression.
    #[error("{0}")]
    Pattern(String),

    /// Malformed `WxH` block key, or a block with no area.
    #[error("{0}")]
    BlockSize(String),

    /// An axis scope with nothing on the other axis to pair with.
    #[error("{0}")]
    Span(String),

    /// Shift requested on an unshiftable tree, or an unparseable shift.
    #[error("{0}")]
    Shift(String),

    /// Resolution produced no wells at all.
    #[error("No wells defined.")]
    NoWells,

    /// A section or directive with the wrong shape.
    #[error("{0}")]
    Structure(String),

    /// Any of the above, raised while processing a specific file.
    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        source: Box<LayoutError>,
    },
}

impl LayoutError {
    /// Attach the file the error came from.
    ///
    /// Errors that already name a file keep the innermost one, since that is
    /// where the problem actually is.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            err @ LayoutError::InFile { .. } => err,
            err => LayoutError::InFile {
                path: path.into(),
                source: Box::new(err),
            },
        }
    }

    /// The underlying error, without any file attached.
    pub fn kind(&self) -> &LayoutError {
        match self {
            LayoutError::InFile { source, .. } => source.kind(),
            err => err,
        }
    }

    /// The file this error was raised in, if known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LayoutError::InFile { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Prefix the message with the pattern that caused it.
    pub(crate) fn in_pattern(self, key: &str) -> Self {
        match self {
            LayoutError::Address(msg) => LayoutError::Address(format!("'{}': {}", key, msg)),
            LayoutError::Pattern(msg) => LayoutError::Pattern(format!("'{}': {}", key, msg)),
            err => err,
        }
    }
}
