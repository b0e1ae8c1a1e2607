//! Awaitable facade over [`Puffer`].
//!
//! Every call runs on tokio's blocking pool, so async tasks never wait on the
//! store's locks or on `flush` I/O.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::{self, JoinError};

use crate::config::PufferConfig;
use crate::store::{FromValue, IntoValue, Puffer, StoreError};

#[derive(Debug, Clone)]
pub struct AsyncPuffer {
    inner: Arc<Puffer>,
}

impl AsyncPuffer {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::with_config(PufferConfig::new(path)).await
    }

    pub async fn with_config(config: PufferConfig) -> Result<Self, StoreError> {
        let store = task::spawn_blocking(move || Puffer::with_config(config))
            .await
            .map_err(joined)??;
        Ok(Self::from(store))
    }

    /// The synchronous store behind this handle.
    pub fn blocking(&self) -> &Arc<Puffer> {
        &self.inner
    }

    pub async fn get<T>(&self, key: impl Into<String>) -> Result<T, StoreError>
    where
        T: FromValue + Send + 'static,
    {
        let key = key.into();
        self.run(move |store| store.get::<T>(&key)).await?
    }

    pub async fn get_or<T>(&self, key: impl Into<String>, default: T) -> Result<T, StoreError>
    where
        T: FromValue + Send + 'static,
    {
        let key = key.into();
        self.run(move |store| store.get_or(&key, default)).await?
    }

    pub async fn put<V>(&self, key: impl Into<String>, value: V) -> Result<(), StoreError>
    where
        V: IntoValue + Send + 'static,
    {
        let key = key.into();
        self.run(move |store| store.put(&key, value)).await?
    }

    pub async fn remove(&self, key: impl Into<String>) -> Result<(), StoreError> {
        let key = key.into();
        self.run(move |store| store.remove(&key)).await?
    }

    pub async fn remove_all(&self) -> Result<(), StoreError> {
        self.run(Puffer::remove_all).await?
    }

    pub async fn contains(&self, key: impl Into<String>) -> Result<bool, StoreError> {
        let key = key.into();
        self.run(move |store| store.contains(&key)).await
    }

    pub async fn keys(&self) -> Result<BTreeSet<String>, StoreError> {
        self.run(Puffer::keys).await
    }

    pub async fn flush(&self) -> Result<(), StoreError> {
        self.run(Puffer::flush).await?
    }

    async fn run<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&Puffer) -> R + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.inner);
        task::spawn_blocking(move || f(&store))
            .await
            .map_err(joined)
    }
}

impl From<Puffer> for AsyncPuffer {
    fn from(store: Puffer) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }
}

impl From<Arc<Puffer>> for AsyncPuffer {
    fn from(inner: Arc<Puffer>) -> Self {
        Self { inner }
    }
}

fn joined(e: JoinError) -> StoreError {
    StoreError::Io(std::io::Error::other(e))
}
