//! The backing file: one full snapshot per write.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::codec::{self, DecodedSnapshot};
use super::error::StoreError;
use super::snapshot::Snapshot;
use crate::logging::{debug, warn};

/// Destination for persisted snapshots.
pub(crate) trait SnapshotSink: Send + Sync + 'static {
    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub(crate) struct BackingFile {
    path: PathBuf,
    sync_data: bool,
    pretty: bool,
}

impl BackingFile {
    pub(crate) fn new(path: impl Into<PathBuf>, sync_data: bool, pretty: bool) -> Self {
        Self {
            path: path.into(),
            sync_data,
            pretty,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, creating it empty when it does not exist yet.
    pub(crate) fn load(&self) -> Result<DecodedSnapshot, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&self.path)
                    .map_err(|source| self.load_error(source))?;
                debug!(path = %self.path.display(), "created empty store file");
                return Ok(DecodedSnapshot::default());
            }
            Err(source) => return Err(self.load_error(source)),
        };

        let decoded = codec::decode_snapshot(&bytes).map_err(|e| {
            self.load_error(io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        if !decoded.skipped.is_empty() {
            warn!(
                path = %self.path.display(),
                skipped = ?decoded.skipped,
                "skipping entries with unknown type"
            );
        }

        Ok(decoded)
    }

    /// Replace the whole file content with `snapshot`.
    pub(crate) fn write(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let bytes = codec::encode_snapshot(snapshot, self.pretty)
            .map_err(|e| self.persistence_error(io::Error::other(e)))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|source| self.persistence_error(source))?;

        file.write_all(&bytes)
            .map_err(|source| self.persistence_error(source))?;

        if self.sync_data {
            file.sync_data()
                .map_err(|source| self.persistence_error(source))?;
        }

        Ok(())
    }

    fn load_error(&self, source: io::Error) -> StoreError {
        StoreError::Load {
            path: self.path.clone(),
            source,
        }
    }

    fn persistence_error(&self, source: io::Error) -> StoreError {
        StoreError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotSink for BackingFile {
    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.write(snapshot)
    }
}
