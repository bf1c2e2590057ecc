use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::{error::SpotifyError, management::SessionStore, types::OAuthState, utils};

pub const OAUTH_STATE_FIELD: &str = "spotify_oauth_state";

/// States older than this are rejected.
pub const DEFAULT_STATE_MAX_AGE: Duration = Duration::from_secs(600);

/// Issues and checks the anti-CSRF `state` of the authorization-code flow.
///
/// A state lives for exactly one authorization round trip. It is removed from
/// the session by the first callback that presents anything, so a replayed
/// callback URL always fails. States of abandoned logins are swept out of the
/// store once they are older than the maximum age.
#[derive(Clone)]
pub struct StateGuard {
    store: Arc<dyn SessionStore>,
    max_age: Duration,
}

impl StateGuard {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_max_age(store, DEFAULT_STATE_MAX_AGE)
    }

    pub fn with_max_age(store: Arc<dyn SessionStore>, max_age: Duration) -> Self {
        Self { store, max_age }
    }

    /// Generates a fresh state for `session_id`, replacing any earlier one.
    ///
    /// Expired states of other sessions are evicted first.
    pub async fn issue(&self, session_id: &str) -> OAuthState {
        let now = Utc::now().timestamp();
        let evicted = self
            .store
            .remove_where(OAUTH_STATE_FIELD, &|stored: &str| !self.is_live(stored, now))
            .await;
        if evicted > 0 {
            tracing::debug!(evicted, "evicted expired oauth states");
        }

        let state = OAuthState {
            value: utils::generate_state_token(),
            bound_session_id: session_id.to_string(),
            issued_at: now,
        };

        self.store
            .set(
                session_id,
                OAUTH_STATE_FIELD,
                format!("{}:{}", state.issued_at, state.value),
            )
            .await;
        state
    }

    /// True iff the session holds an unexpired state byte-equal to `received`.
    ///
    /// Missing, expired and mismatched states all return false. The stored
    /// state is consumed either way.
    pub async fn verify(&self, session_id: &str, received: &str) -> bool {
        let Some(stored) = self.store.take(session_id, OAUTH_STATE_FIELD).await else {
            return false;
        };
        if !self.is_live(&stored, Utc::now().timestamp()) {
            return false;
        }
        let Some((_, expected)) = stored.split_once(':') else {
            return false;
        };

        !expected.is_empty() && utils::constant_time_eq(expected.as_bytes(), received.as_bytes())
    }

    /// Whether a stored `<issued_at>:<value>` entry is well-formed and not older
    /// than the maximum age at `now`.
    fn is_live(&self, stored: &str, now: i64) -> bool {
        let Some((issued_at, _)) = stored.split_once(':') else {
            return false;
        };
        let Ok(issued_at) = issued_at.parse::<i64>() else {
            return false;
        };

        let age = now.saturating_sub(issued_at);
        age >= 0 && age as u64 <= self.max_age.as_secs()
    }

    /// [`verify`](Self::verify) as a `Result`.
    pub async fn check(&self, session_id: &str, received: &str) -> Result<(), SpotifyError> {
        if self.verify(session_id, received).await {
            Ok(())
        } else {
            Err(SpotifyError::StateMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::management::{ACCESS_TOKEN_FIELD, MemorySessionStore};

    #[tokio::test]
    async fn test_expired_state_is_rejected() {
        let store = Arc::new(MemorySessionStore::new());
        let guard = StateGuard::new(store.clone());

        let old = Utc::now().timestamp() - 3600;
        store
            .set("sid", OAUTH_STATE_FIELD, format!("{old}:abc"))
            .await;

        assert!(!guard.verify("sid", "abc").await);
    }

    #[tokio::test]
    async fn test_garbled_state_is_rejected() {
        let store = Arc::new(MemorySessionStore::new());
        let guard = StateGuard::new(store.clone());

        store.set("sid", OAUTH_STATE_FIELD, "abc".to_string()).await;
        assert!(!guard.verify("sid", "abc").await);
    }

    #[tokio::test]
    async fn test_issue_evicts_abandoned_logins() {
        let store = Arc::new(MemorySessionStore::new());
        let guard = StateGuard::new(store.clone());

        let old = Utc::now().timestamp() - 3600;
        for i in 0..100 {
            store
                .set(&format!("abandoned-{i}"), OAUTH_STATE_FIELD, format!("{old}:abc"))
                .await;
        }
        store.set("garbled", OAUTH_STATE_FIELD, "abc".to_string()).await;
        guard.issue("pending").await;

        assert_eq!(store.session_count().await, 2);
        assert!(!store.contains("garbled").await);

        let state = guard.issue("fresh").await;
        assert_eq!(store.session_count().await, 2);
        assert!(guard.verify("fresh", &state.value).await);
        assert!(store.contains("pending").await);
    }

    #[tokio::test]
    async fn test_eviction_keeps_other_session_fields() {
        let store = Arc::new(MemorySessionStore::new());
        let guard = StateGuard::new(store.clone());

        let old = Utc::now().timestamp() - 3600;
        store
            .set("logged-in", OAUTH_STATE_FIELD, format!("{old}:abc"))
            .await;
        store
            .set("logged-in", ACCESS_TOKEN_FIELD, "token".to_string())
            .await;
        guard.issue("other").await;

        assert_eq!(store.get("logged-in", OAUTH_STATE_FIELD).await, None);
        assert_eq!(
            store.get("logged-in", ACCESS_TOKEN_FIELD).await.as_deref(),
            Some("token")
        );
    }

    #[tokio::test]
    async fn test_state_stored_with_issue_time() {
        let store = Arc::new(MemorySessionStore::new());
        let guard = StateGuard::new(store.clone());

        let state = guard.issue("sid").await;
        let stored = store.get("sid", OAUTH_STATE_FIELD).await;
        assert_eq!(stored, Some(format!("{}:{}", state.issued_at, state.value)));
        assert_eq!(state.bound_session_id, "sid");
    }
}
