//! Tests for the in-memory session store.

use marquee_core::{ContentRecord, MediaKind};
use marquee_error::{MarqueeErrorKind, SessionErrorKind};
use marquee_interface::UserId;
use marquee_session::{InMemorySessionStore, Session, SessionStore, StateTag};

#[tokio::test]
async fn test_put_get_delete() {
    let store = InMemorySessionStore::new();
    let user = UserId(7);
    assert!(store.get(user).await.is_none());

    store.put(user, Session::manual(MediaKind::Movie)).await;
    assert_eq!(*store.get(user).await.unwrap().state(), StateTag::ManualWaitTitle);
    assert_eq!(store.len(), 1);

    assert!(store.delete(user).await);
    assert!(!store.delete(user).await);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_new_selection_supersedes_session() {
    let store = InMemorySessionStore::new();
    let user = UserId(7);
    store.put(user, Session::manual(MediaKind::Movie)).await;
    store
        .put(user, Session::from_selection(ContentRecord::new("Heat", MediaKind::Movie)))
        .await;

    let session = store.get(user).await.unwrap();
    assert_eq!(*session.state(), StateTag::AwaitingLanguage);
    assert_eq!(session.record().title, "Heat");
}

#[tokio::test]
async fn test_require_missing_session() {
    let store = InMemorySessionStore::new();
    let err = store.require(UserId(99)).await.unwrap_err();
    match err.kind() {
        MarqueeErrorKind::Session(e) => assert_eq!(e.kind(), &SessionErrorKind::NotFound(99)),
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_users_are_isolated() {
    let store = InMemorySessionStore::new();
    store.put(UserId(1), Session::manual(MediaKind::Movie)).await;
    store.put(UserId(2), Session::manual(MediaKind::Show)).await;
    store.delete(UserId(1)).await;
    assert!(store.get(UserId(1)).await.is_none());
    assert_eq!(store.get(UserId(2)).await.unwrap().record().kind, MediaKind::Show);
}
