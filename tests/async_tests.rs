//! The awaitable facade.

#![cfg(feature = "async")]

mod common;

use common::scratch;
use puffer_kv::{AsyncPuffer, Puffer, StoreError};

#[tokio::test]
async fn test_async_round_trip() -> anyhow::Result<()> {
    let (_dir, path) = scratch()?;
    let store = AsyncPuffer::open(&path).await?;

    store.put("count", 5_i32).await?;
    store.put("name", "async").await?;

    assert_eq!(store.get::<i32>("count").await?, 5);
    assert_eq!(store.get::<String>("name").await?, "async");
    assert_eq!(store.get_or("missing", 1.5_f64).await?, 1.5);
    assert!(store.contains("count").await?);
    assert_eq!(store.keys().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_async_errors_match_sync() -> anyhow::Result<()> {
    let (_dir, path) = scratch()?;
    let store = AsyncPuffer::open(&path).await?;
    store.put("n", 42_i32).await?;

    assert!(matches!(
        store.get::<i64>("n").await,
        Err(StoreError::TypeMismatch { .. })
    ));
    assert!(matches!(
        store.get::<i32>("gone").await,
        Err(StoreError::KeyNotFound(_))
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_flush_is_durable() -> anyhow::Result<()> {
    let (_dir, path) = scratch()?;
    let store = AsyncPuffer::open(&path).await?;

    let tasks: Vec<_> = (0..16_i64)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.put(format!("k{i}"), i).await })
        })
        .collect();
    for task in tasks {
        task.await??;
    }
    store.remove("k0").await?;
    store.flush().await?;

    let reopened = Puffer::open(&path)?;
    assert_eq!(reopened.len(), 15);
    assert_eq!(reopened.get::<i64>("k15")?, 15);

    store.remove_all().await?;
    assert!(store.blocking().is_empty());
    Ok(())
}
