//! Convenient re-exports for common usage patterns.
//!
//! ```ignore
//! use puffer_kv::prelude::*;
//!
//! let store = Puffer::open("settings.json")?;
//! store.put("count", 1_i32)?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Store types
pub use crate::store::{
    DeferGuard, FromValue, IntoValue, Kind, PersistStats, Puffer, Snapshot, StoreError, Value,
};

// Configuration
pub use crate::config::{PersistenceConfig, PufferConfig};

// Awaitable facade (requires "async" feature)
#[cfg(feature = "async")]
pub use crate::async_puffer::AsyncPuffer;
