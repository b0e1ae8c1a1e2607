//! Common test utilities and fixtures.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use puffer_kv::{Puffer, PufferConfig};
use tempfile::TempDir;

/// A store living in its own temporary directory.
pub struct TestStore {
    pub dir: TempDir,
    pub store: Puffer,
}

impl TestStore {
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let store = Puffer::open(dir.path().join("store.json"))?;
        Ok(Self { dir, store })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("store.json")
    }

    /// Open a second store on the same file.
    pub fn reopen(&self) -> anyhow::Result<Puffer> {
        Ok(Puffer::with_config(
            PufferConfig::new(self.path()).flush_on_drop(false),
        )?)
    }
}

/// Scratch directory plus the path of a not-yet-existing store file in it.
pub fn scratch() -> anyhow::Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join("store.json");
    Ok((dir, path))
}

/// Poll `condition` until it holds or a few seconds pass.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    true
}
