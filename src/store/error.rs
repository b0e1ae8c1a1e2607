//! Error types for the store module.

use std::path::PathBuf;

use thiserror::Error;

use super::value::Kind;

/// Errors raised by [`Puffer`](super::Puffer) operations.
///
/// Only [`StoreError::Persistence`] relates to the backing file after
/// construction, and it never reaches the caller of a plain mutation:
/// `put`/`remove`/`remove_all` return as soon as memory is updated, even if
/// the background write that follows fails. Call
/// [`flush`](super::Puffer::flush) to observe the outcome of a write.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("The key '{0}' has no value saved")]
    KeyNotFound(String),

    #[error("Type mismatch for key '{key}': requested {requested}, stored {stored}")]
    TypeMismatch {
        key: String,
        requested: Kind,
        stored: Kind,
    },

    #[error("Unsupported value type: {0}")]
    UnsupportedType(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unable to read {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to write in {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for errors the caller can recover from by adjusting the
    /// request (missing key, wrong kind, bad input).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::KeyNotFound(_)
                | Self::TypeMismatch { .. }
                | Self::UnsupportedType(_)
                | Self::InvalidKey(_)
        )
    }

    pub fn is_load(&self) -> bool {
        matches!(self, Self::Load { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}
