//! Error type shared by every stage of a transformation pass.

use std::path::PathBuf;
use thiserror::Error;

use crate::resource::ResourceIdentity;

/// Error represents a failure while loading, generating, mutating or encoding resources.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed resource: {0}")]
    MalformedResource(String),

    #[error("failed to decode document: {0}")]
    Decode(String),

    #[error("failed to encode {identity}: {message}")]
    Encode {
        identity: ResourceIdentity,
        message: String,
    },

    #[error("cannot use a duplicate name {:?} for {}", .0.name, .0.gvk)]
    DuplicateIdentity(ResourceIdentity),

    #[error("invalid literal source {source_text:?}: {message}")]
    InvalidLiteral {
        source_text: String,
        message: String,
    },

    #[error("invalid file source {0:?}: expected key=path or path")]
    InvalidFileSource(String),

    #[error("{0:?} is not a valid data key: must consist of alphanumerics, '-', '_' or '.' (at most 253 characters)")]
    InvalidKey(String),

    #[error("cannot add key {0:?}: another key by that name already exists")]
    DuplicateDataKey(String),

    #[error("failed to hash contents of {name:?}: {source}")]
    Hash {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TLS pair: {0}")]
    InvalidTlsPair(String),

    #[error("unexpected shape at {path}: {message}")]
    UnexpectedShape { path: String, message: String },

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates an invalid literal error.
    pub fn invalid_literal(source_text: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidLiteral {
            source_text: source_text.into(),
            message: message.into(),
        }
    }

    /// Creates an unexpected shape error.
    pub fn unexpected_shape(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UnexpectedShape {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Converts an I/O error, mapping `NotFound` onto its own variant.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path)
        } else {
            Error::Io { path, source }
        }
    }
}

/// Result type for kforge operations.
pub type Result<T> = std::result::Result<T, Error>;
