//! Unified error type for the puffer-kv library.
//!
//! [`Error`] wraps every module-specific error so application code can use a
//! single type end to end.

use thiserror::Error;

use crate::config::ConfigError;
use crate::store::{CodecError, StoreError};

/// Unified error type for all puffer-kv operations.
///
/// # Example
///
/// ```ignore
/// use puffer_kv::{Puffer, PufferConfig, Result};
///
/// fn open_from(config_file: &str) -> Result<Puffer> {
///     let config = PufferConfig::from_file(config_file)?;
///     Ok(Puffer::with_config(config)?)
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Error from store operations.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Error decoding a backing file's content.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Error loading configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a store error.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns `true` if the backing file could not be loaded or decoded.
    pub fn is_load(&self) -> bool {
        match self {
            Self::Store(e) => e.is_load(),
            Self::Codec(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if a write to the backing file failed.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_persistence())
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
