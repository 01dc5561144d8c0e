use news_core::{CacheStore, FileStore, MemoryStore, SyncError, CACHE_KEY};

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "newsfeed_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    dir
}

#[tokio::test]
async fn file_store_survives_reopening() {
    let dir = temp_dir("reopen");
    let store = FileStore::new(&dir);

    assert_eq!(store.get(CACHE_KEY).await.unwrap(), None);
    store.set(CACHE_KEY, r#"[{"title":"A"}]"#).await.unwrap();

    let reopened = FileStore::new(&dir);
    assert_eq!(
        reopened.get(CACHE_KEY).await.unwrap().as_deref(),
        Some(r#"[{"title":"A"}]"#)
    );
    assert!(!dir.join("news.json.tmp").exists());

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn file_store_set_replaces_and_remove_clears() {
    let dir = temp_dir("replace");
    let store = FileStore::new(&dir);

    store.set(CACHE_KEY, "first").await.unwrap();
    store.set(CACHE_KEY, "second").await.unwrap();
    assert_eq!(store.get(CACHE_KEY).await.unwrap().as_deref(), Some("second"));

    store.remove(CACHE_KEY).await.unwrap();
    assert_eq!(store.get(CACHE_KEY).await.unwrap(), None);
    // removing twice is fine
    store.remove(CACHE_KEY).await.unwrap();

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn file_store_rejects_path_like_keys() {
    let store = FileStore::new(temp_dir("keys"));

    let err = store.set("../escape", "x").await.unwrap_err();

    assert!(matches!(err, SyncError::Store(_)));
}

#[tokio::test]
async fn memory_store_clones_share_entries() {
    let store = MemoryStore::new();
    let other = store.clone();

    store.set(CACHE_KEY, "blob").await.unwrap();
    assert_eq!(other.get(CACHE_KEY).await.unwrap().as_deref(), Some("blob"));

    other.remove(CACHE_KEY).await.unwrap();
    assert_eq!(store.get(CACHE_KEY).await.unwrap(), None);
}
