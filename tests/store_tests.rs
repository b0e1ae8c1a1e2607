//! Typed store behaviour: round-trips, absence, type safety and concurrency.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use common::{TestStore, scratch};
use puffer_kv::{Kind, Puffer, StoreError, Value};
use serde_json::json;

#[test]
fn test_each_kind_round_trips() -> anyhow::Result<()> {
    let t = TestStore::new()?;
    let store = &t.store;

    store.put("i32", i32::MIN)?;
    store.put("i64", i64::MAX)?;
    store.put("f32", 1.25_f32)?;
    store.put("f64", -0.000_001_f64)?;
    store.put("bool", true)?;
    store.put("string", String::from("héllo"))?;

    assert_eq!(store.get::<i32>("i32")?, i32::MIN);
    assert_eq!(store.get::<i64>("i64")?, i64::MAX);
    assert_eq!(store.get::<f32>("f32")?, 1.25);
    assert_eq!(store.get::<f64>("f64")?, -0.000_001);
    assert!(store.get::<bool>("bool")?);
    assert_eq!(store.get::<String>("string")?, "héllo");
    Ok(())
}

#[test]
fn test_put_replaces_value_of_any_kind() -> anyhow::Result<()> {
    let t = TestStore::new()?;

    t.store.put("k", 1_i32)?;
    t.store.put("k", "now a string")?;

    assert_eq!(t.store.kind_of("k"), Some(Kind::String));
    assert_eq!(t.store.get::<String>("k")?, "now a string");
    assert_eq!(t.store.len(), 1);
    Ok(())
}

#[test]
fn test_absent_key() -> anyhow::Result<()> {
    let t = TestStore::new()?;

    assert!(matches!(
        t.store.get::<i32>("missing"),
        Err(StoreError::KeyNotFound(key)) if key == "missing"
    ));
    assert_eq!(t.store.get_or("missing", 9_i32)?, 9);
    assert_eq!(t.store.get_or("missing", String::from("fallback"))?, "fallback");
    assert!(!t.store.contains("missing"));

    t.store.put("present", 1_i32)?;
    assert_eq!(t.store.get_or("present", 9_i32)?, 1);
    Ok(())
}

#[test]
fn test_remove_absent_key_is_ok() -> anyhow::Result<()> {
    let t = TestStore::new()?;

    t.store.remove("never-set")?;
    t.store.put("k", false)?;
    t.store.remove("k")?;

    assert!(t.store.is_empty());
    Ok(())
}

#[test]
fn test_unsupported_type_leaves_keys_unchanged() -> anyhow::Result<()> {
    let t = TestStore::new()?;
    t.store.put("kept", 1_i64)?;
    let before = t.store.keys();

    for value in [json!(null), json!([1, 2, 3]), json!({"nested": true})] {
        let err = t.store.put("bad", value).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedType(_)));
        assert!(err.is_recoverable());
    }

    assert_eq!(t.store.keys(), before);
    assert!(!t.store.contains("bad"));
    Ok(())
}

#[test]
fn test_json_values_are_accepted() -> anyhow::Result<()> {
    let t = TestStore::new()?;

    t.store.put("small", json!(12))?;
    t.store.put("large", json!(1_i64 << 40))?;
    t.store.put("ratio", json!(0.75))?;
    t.store.put("name", json!("puffer"))?;

    assert_eq!(t.store.get_value("small"), Some(Value::Int32(12)));
    assert_eq!(t.store.get_value("large"), Some(Value::Int64(1 << 40)));
    assert_eq!(t.store.get_value("ratio"), Some(Value::Float64(0.75)));
    assert_eq!(t.store.get_value("name"), Some(Value::from("puffer")));
    Ok(())
}

#[test]
fn test_concurrent_distinct_keys() -> anyhow::Result<()> {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let t = TestStore::new()?;
    let store = Arc::new(Puffer::open(t.dir.path().join("shared.json"))?);

    let handles: Vec<_> = (0..THREADS)
        .map(|n| {
            let store = Arc::clone(&store);
            thread::spawn(move || -> Result<(), StoreError> {
                for i in 0..PER_THREAD {
                    let value = i64::try_from(n * PER_THREAD + i).unwrap_or_default();
                    store.put(&format!("t{n}-k{i}"), value)?;
                }
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap()?;
    }

    assert_eq!(store.len(), THREADS * PER_THREAD);
    for n in 0..THREADS {
        assert_eq!(store.get::<i64>(&format!("t{n}-k0"))?, (n * PER_THREAD) as i64);
    }

    store.flush()?;
    let reopened = Puffer::open(t.dir.path().join("shared.json"))?;
    assert_eq!(reopened.len(), THREADS * PER_THREAD);
    Ok(())
}

#[test]
fn test_nonexistent_path_creates_empty_file() -> anyhow::Result<()> {
    let (_dir, path) = scratch()?;
    assert!(!path.exists());

    let store = Puffer::open(&path)?;

    assert!(path.exists());
    assert_eq!(store.keys(), BTreeSet::new());
    Ok(())
}

#[test]
fn test_remove_all_then_reload_is_empty() -> anyhow::Result<()> {
    let t = TestStore::new()?;

    t.store.put("a", 1_i32)?;
    t.store.put("b", "x")?;
    t.store.remove_all()?;
    assert_eq!(t.store.keys(), BTreeSet::new());

    t.store.flush()?;
    assert_eq!(t.reopen()?.keys(), BTreeSet::new());
    Ok(())
}

#[test]
fn test_kind_mismatch_is_reported() -> anyhow::Result<()> {
    let t = TestStore::new()?;
    t.store.put("n", 42_i32)?;

    match t.store.get::<i64>("n") {
        Err(StoreError::TypeMismatch {
            key,
            requested,
            stored,
        }) => {
            assert_eq!(key, "n");
            assert_eq!(requested, Kind::Int64);
            assert_eq!(stored, Kind::Int32);
        }
        other => panic!("expected a type mismatch, got {other:?}"),
    }
    assert_eq!(t.store.get::<i32>("n")?, 42);
    Ok(())
}

#[test]
fn test_snapshot_is_a_copy() -> anyhow::Result<()> {
    let t = TestStore::new()?;
    t.store.put("a", 1_i32)?;

    let snapshot = t.store.snapshot();
    t.store.put("b", 2_i32)?;

    assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(t.store.len(), 2);
    Ok(())
}
