use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::types::SessionAuth;

pub const ACCESS_TOKEN_FIELD: &str = "spotify_access_token";

/// Per-session key-value storage.
///
/// Implementations must give read-your-writes consistency for one session, and
/// `take` must read and remove in one step.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str, field: &str) -> Option<String>;
    async fn set(&self, session_id: &str, field: &str, value: String);
    async fn clear(&self, session_id: &str, field: &str);
    /// Atomically removes and returns the field.
    async fn take(&self, session_id: &str, field: &str) -> Option<String>;
    /// True if the store holds anything for the session.
    async fn contains(&self, session_id: &str) -> bool;
    /// Drops the whole session.
    async fn remove(&self, session_id: &str);
    /// Removes `field` from every session where `stale` accepts its value and
    /// drops sessions left empty. Returns how many values were removed.
    async fn remove_where(
        &self,
        field: &str,
        stale: &(dyn for<'s> Fn(&'s str) -> bool + Send + Sync),
    ) -> usize;
}

/// In-process session store. Lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, HashMap<String, String>>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str, field: &str) -> Option<String> {
        let lock = self.sessions.lock().await;
        lock.get(session_id).and_then(|s| s.get(field)).cloned()
    }

    async fn set(&self, session_id: &str, field: &str, value: String) {
        let mut lock = self.sessions.lock().await;
        lock.entry(session_id.to_string())
            .or_default()
            .insert(field.to_string(), value);
    }

    async fn clear(&self, session_id: &str, field: &str) {
        let mut lock = self.sessions.lock().await;
        if let Some(session) = lock.get_mut(session_id) {
            session.remove(field);
            if session.is_empty() {
                lock.remove(session_id);
            }
        }
    }

    async fn take(&self, session_id: &str, field: &str) -> Option<String> {
        let mut lock = self.sessions.lock().await;
        let session = lock.get_mut(session_id)?;
        let value = session.remove(field);
        if session.is_empty() {
            lock.remove(session_id);
        }
        value
    }

    async fn contains(&self, session_id: &str) -> bool {
        self.sessions.lock().await.contains_key(session_id)
    }

    async fn remove(&self, session_id: &str) {
        self.sessions.lock().await.remove(session_id);
    }

    async fn remove_where(
        &self,
        field: &str,
        stale: &(dyn for<'s> Fn(&'s str) -> bool + Send + Sync),
    ) -> usize {
        let mut lock = self.sessions.lock().await;
        let mut removed = 0;
        lock.retain(|_, session| {
            if session.get(field).is_some_and(|value| stale(value.as_str())) {
                session.remove(field);
                removed += 1;
            }
            !session.is_empty()
        });
        removed
    }
}

impl SessionAuth {
    pub async fn load(store: &dyn SessionStore, session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            access_token: store.get(session_id, ACCESS_TOKEN_FIELD).await,
        }
    }

    /// Records a freshly exchanged token for this session.
    pub async fn store_token(&mut self, store: &dyn SessionStore, access_token: String) {
        store
            .set(&self.session_id, ACCESS_TOKEN_FIELD, access_token.clone())
            .await;
        self.access_token = Some(access_token);
    }
}
