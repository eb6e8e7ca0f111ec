//! Tests for the JSON preference stores.

use marquee_interface::{ChatTarget, UserId};
use marquee_publish::{JsonPreferenceStore, Preferences, PromoConfig};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_set_persists_before_returning() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ad_links.json");

    let store: JsonPreferenceStore<String> = JsonPreferenceStore::open(&path).unwrap();
    assert_eq!(store.get(UserId(1)), None);
    assert_eq!(
        store.get_or(UserId(1), "https://default.example".into()),
        "https://default.example"
    );

    store
        .set(UserId(1), "https://ads.example/a".to_string())
        .await
        .unwrap();
    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert!(on_disk.contains("https://ads.example/a"));
    assert!(!dir.path().join("ad_links.json.tmp").exists());

    let reopened: JsonPreferenceStore<String> = JsonPreferenceStore::open(&path).unwrap();
    assert_eq!(reopened.get(UserId(1)).as_deref(), Some("https://ads.example/a"));
}

#[tokio::test]
async fn test_failed_write_keeps_previous_value() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ad_links.json");
    let store: JsonPreferenceStore<String> = JsonPreferenceStore::open(&path).unwrap();
    store
        .set(UserId(2), "https://ads.example/old".to_string())
        .await
        .unwrap();

    // A directory in the temp file's place makes every write fail.
    std::fs::create_dir(dir.path().join("ad_links.json.tmp")).unwrap();

    let result = store.set(UserId(1), "https://ads.example/new".to_string()).await;
    assert!(result.is_err());
    assert_eq!(store.get(UserId(1)), None);

    assert!(store.remove(UserId(2)).await.is_err());
    assert_eq!(store.get(UserId(2)).as_deref(), Some("https://ads.example/old"));

    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert!(!on_disk.contains("https://ads.example/new"));
}

#[tokio::test]
async fn test_remove_rewrites_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("channels.json");

    let store: JsonPreferenceStore<ChatTarget> = JsonPreferenceStore::open(&path).unwrap();
    store.set(UserId(5), ChatTarget::Id(-100_123)).await.unwrap();
    store
        .set(UserId(6), ChatTarget::Username("@drops".into()))
        .await
        .unwrap();
    assert!(store.remove(UserId(5)).await.unwrap());
    assert!(!store.remove(UserId(5)).await.unwrap());

    let reopened: JsonPreferenceStore<ChatTarget> = JsonPreferenceStore::open(&path).unwrap();
    assert_eq!(reopened.get(UserId(5)), None);
    assert_eq!(reopened.get(UserId(6)), Some(ChatTarget::Username("@drops".into())));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_keep_every_entry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("channels.json");
    let store: Arc<JsonPreferenceStore<ChatTarget>> =
        Arc::new(JsonPreferenceStore::open(&path).unwrap());

    let mut writers = JoinSet::new();
    for id in 0..16u64 {
        let store = Arc::clone(&store);
        writers.spawn(async move { store.set(UserId(id), ChatTarget::Id(-(id as i64))).await });
    }
    while let Some(result) = writers.join_next().await {
        result.unwrap().unwrap();
    }

    let reopened: JsonPreferenceStore<ChatTarget> = JsonPreferenceStore::open(&path).unwrap();
    for id in 0..16u64 {
        assert_eq!(reopened.get(UserId(id)), Some(ChatTarget::Id(-(id as i64))));
    }
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("promos.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result: Result<JsonPreferenceStore<PromoConfig>, _> = JsonPreferenceStore::open(&path);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Corrupt store"));
}

#[tokio::test]
async fn test_preferences_open_all_categories() {
    let dir = TempDir::new().unwrap();
    let prefs = Preferences::open(dir.path()).unwrap();

    prefs
        .promos()
        .set(UserId(9), PromoConfig::new("@drops", Some("Daily releases".into())))
        .await
        .unwrap();
    prefs.channels().set(UserId(9), ChatTarget::Id(-1)).await.unwrap();

    let reopened = Preferences::open(dir.path()).unwrap();
    let promo = reopened.promos().get(UserId(9)).unwrap();
    assert_eq!(promo.footer(), "📢 Daily releases\n👉 @drops");
    assert_eq!(reopened.channels().get(UserId(9)), Some(ChatTarget::Id(-1)));
    assert_eq!(reopened.ad_links().get(UserId(9)), None);
}
