//! The cache itself: typed in-memory store plus its background writer.
//!
//! Reads are served by a concurrent map. Mutations update the map and signal
//! the writer thread, which rewrites the backing file with a full snapshot.
//! See [`Puffer`] for the durability contract.

pub mod codec;
mod error;
mod file;
mod memory;
mod puffer;
mod snapshot;
mod value;
mod writer;

pub use codec::{CodecError, WireEntry};
pub use error::StoreError;
pub use puffer::{DeferGuard, Puffer};
pub use snapshot::Snapshot;
pub use value::{FromValue, IntoValue, Kind, Value};
pub use writer::PersistStats;
