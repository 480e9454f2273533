use super::{Document, DocumentStore, SledStore};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::tempdir;

const STAMP: &str = "serverTimestamp";

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn create_test_store() -> SledStore {
    SledStore::temporary().expect("open temporary sled db")
}

#[tokio::test]
async fn test_merge_creates_record() {
    let store = create_test_store();

    let merged = store
        .merge("cooler_status", doc(json!({"waterTemp": 8.5})), STAMP)
        .await
        .unwrap();

    assert_eq!(merged["waterTemp"], json!(8.5));
    let stored = store.get("cooler_status").await.unwrap().unwrap();
    assert_eq!(stored, merged);
}

#[tokio::test]
async fn test_merge_keeps_untouched_fields() {
    let store = create_test_store();
    store
        .merge("cooler_status", doc(json!({"waterTemp": 8.5, "mode": "eco"})), STAMP)
        .await
        .unwrap();

    let merged = store
        .merge("cooler_status", doc(json!({"waterTemp": 7.0})), STAMP)
        .await
        .unwrap();

    assert_eq!(merged["waterTemp"], json!(7.0));
    assert_eq!(merged["mode"], json!("eco"));
}

#[tokio::test]
async fn test_records_are_independent_per_path() {
    let store = create_test_store();
    store
        .merge("cooler_status", doc(json!({"a": 1})), STAMP)
        .await
        .unwrap();
    store.merge("other", doc(json!({"b": 2})), STAMP).await.unwrap();

    let cooler = store.get("cooler_status").await.unwrap().unwrap();
    assert!(!cooler.contains_key("b"));
}

#[tokio::test]
async fn test_get_missing_record_is_none() {
    let store = create_test_store();
    assert!(store.get("nonexistent").await.unwrap().is_none());
}

#[tokio::test]
async fn test_stale_stamp_is_bumped() {
    let store = create_test_store();
    store
        .merge("cooler_status", doc(json!({STAMP: 1_000})), STAMP)
        .await
        .unwrap();

    let same = store
        .merge("cooler_status", doc(json!({STAMP: 1_000})), STAMP)
        .await
        .unwrap();
    assert_eq!(same[STAMP], json!(1_001));

    let older = store
        .merge("cooler_status", doc(json!({STAMP: 5})), STAMP)
        .await
        .unwrap();
    assert_eq!(older[STAMP], json!(1_002));

    let newer = store
        .merge("cooler_status", doc(json!({STAMP: 2_000})), STAMP)
        .await
        .unwrap();
    assert_eq!(newer[STAMP], json!(2_000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_disjoint_merges_keep_every_field() {
    let store = Arc::new(create_test_store());

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let mut fields = Document::new();
            fields.insert(format!("field{i}"), json!(i));
            store.merge("cooler_status", fields, STAMP).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = store.get("cooler_status").await.unwrap().unwrap();
    for i in 0..16 {
        assert_eq!(stored[&format!("field{i}")], json!(i));
    }
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().to_str().unwrap();

    {
        let store = SledStore::open(path).unwrap();
        store
            .merge("cooler_status", doc(json!({"roomTemp": 24})), STAMP)
            .await
            .unwrap();
    }

    let reopened = SledStore::open(path).unwrap();
    let stored = reopened.get("cooler_status").await.unwrap().unwrap();
    assert_eq!(stored["roomTemp"], json!(24));
}

#[tokio::test]
async fn test_merge_without_stamp_leaves_stamp_alone() {
    let store = create_test_store();
    store
        .merge("cooler_status", doc(json!({STAMP: 1_000})), STAMP)
        .await
        .unwrap();

    let merged = store
        .merge("cooler_status", doc(json!({"mode": "eco"})), STAMP)
        .await
        .unwrap();
    assert_eq!(merged[STAMP], json!(1_000));
}
