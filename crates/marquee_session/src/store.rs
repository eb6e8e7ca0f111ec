//! Session storage.

use crate::Session;
use async_trait::async_trait;
use marquee_error::{MarqueeResult, SessionError, SessionErrorKind};
use marquee_interface::UserId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Sessions keyed by user identity.
///
/// Sessions never expire; they live until replaced, deleted or the process
/// exits.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current session for `user`.
    async fn get(&self, user: UserId) -> Option<Session>;

    /// Insert or replace the session for `user`.
    async fn put(&self, user: UserId, session: Session);

    /// Remove the session for `user`; whether one existed.
    async fn delete(&self, user: UserId) -> bool;

    /// Current session, or a not-found error.
    async fn require(&self, user: UserId) -> MarqueeResult<Session> {
        self.get(user)
            .await
            .ok_or_else(|| SessionError::new(SessionErrorKind::NotFound(user.0)).into())
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<UserId, Session>>,
}

impl InMemorySessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user: UserId) -> Option<Session> {
        self.sessions.read().get(&user).cloned()
    }

    async fn put(&self, user: UserId, session: Session) {
        self.sessions.write().insert(user, session);
    }

    async fn delete(&self, user: UserId) -> bool {
        self.sessions.write().remove(&user).is_some()
    }
}
