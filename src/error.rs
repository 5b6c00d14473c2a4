//! Centralized error types for mmsrip.

use std::path::PathBuf;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// All fatal errors produced by the mmsrip library.
///
/// Per-part problems (bad base64, bad timestamp, orphaned part) are not
/// errors at this level. They are absorbed as skip outcomes during the
/// walk and never abort a run.
#[derive(Error, Debug)]
pub enum MmsError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backup file does not exist.
    #[error("backup file not found: {0}")]
    FileNotFound(PathBuf),

    /// The XML stream is malformed at the given byte position.
    #[error("XML parse error in '{path}' near byte {position}: {source}")]
    Xml {
        path: PathBuf,
        position: u64,
        source: quick_xml::Error,
    },

    /// An element carries attribute syntax the parser cannot read.
    #[error("malformed attribute in '{path}' near byte {position}: {source}")]
    Attr {
        path: PathBuf,
        position: u64,
        source: AttrError,
    },
}

/// Convenience alias for `Result<T, MmsError>`.
pub type Result<T> = std::result::Result<T, MmsError>;

impl MmsError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `Xml` variant from a path, byte position, and parser error.
    pub fn xml(path: impl Into<PathBuf>, position: u64, source: quick_xml::Error) -> Self {
        Self::Xml {
            path: path.into(),
            position,
            source,
        }
    }

    /// Create an `Attr` variant from a path, byte position, and attribute error.
    pub fn attr(path: impl Into<PathBuf>, position: u64, source: AttrError) -> Self {
        Self::Attr {
            path: path.into(),
            position,
            source,
        }
    }
}
