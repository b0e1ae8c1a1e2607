//! Embedded in-memory key-value cache mirrored to a single file.
//!
//! Values are one of six kinds (`i32`, `i64`, `f32`, `f64`, `bool`,
//! `String`). Reads and writes are served from memory; a background writer
//! thread keeps a JSON file in sync, coalescing bursts of mutations into a
//! single rewrite.
//!
//! # Quick Start
//!
//! ```no_run
//! use puffer_kv::prelude::*;
//!
//! # fn main() -> puffer_kv::Result<()> {
//! let store = Puffer::open("settings.json")?;
//!
//! store.put("launches", 3_i64)?;
//! store.put("theme", "dark")?;
//!
//! let launches: i64 = store.get("launches")?;
//! let volume = store.get_or("volume", 0.8_f32)?;
//!
//! // Wait until everything above is on disk.
//! store.flush()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`store`] - The cache, its value model and the file codec
//! - [`config`] - TOML-loadable store configuration
//!
//! # Feature Flags
//!
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `async` - Enable [`AsyncPuffer`], an awaitable facade on tokio's blocking pool
//! - `cli` - Enable the `puffer` command-line binary
//! - `full` - Enable all features

pub mod config;
mod logging;
pub mod prelude;
pub mod store;

#[cfg(feature = "async")]
mod async_puffer;

mod error;

pub use error::{Error, Result};

pub use config::{ConfigError, PersistenceConfig, PufferConfig};

pub use store::{
    CodecError, DeferGuard, FromValue, IntoValue, Kind, PersistStats, Puffer, Snapshot,
    StoreError, Value,
};

#[cfg(feature = "async")]
pub use async_puffer::AsyncPuffer;
