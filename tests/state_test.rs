use std::{sync::Arc, time::Duration};

use songshop::{
    error::SpotifyError,
    management::{MemorySessionStore, OAUTH_STATE_FIELD, SessionStore, StateGuard},
};

fn guard() -> (Arc<MemorySessionStore>, StateGuard) {
    let store = Arc::new(MemorySessionStore::new());
    let guard = StateGuard::new(store.clone());
    (store, guard)
}

#[tokio::test]
async fn test_issued_state_verifies_exactly_once() {
    let (_, guard) = guard();
    let state = guard.issue("session-a").await;

    assert!(guard.verify("session-a", &state.value).await);
    assert!(!guard.verify("session-a", &state.value).await);
}

#[tokio::test]
async fn test_mismatched_state_is_rejected_and_consumed() {
    let (store, guard) = guard();
    let state = guard.issue("session-a").await;

    assert!(!guard.verify("session-a", "forged").await);
    assert_eq!(store.get("session-a", OAUTH_STATE_FIELD).await, None);
    assert!(!guard.verify("session-a", &state.value).await);
}

#[tokio::test]
async fn test_missing_state_is_rejected() {
    let (_, guard) = guard();
    assert!(!guard.verify("nobody", "anything").await);
    assert!(!guard.verify("nobody", "").await);
}

#[tokio::test]
async fn test_state_is_bound_to_its_session() {
    let (_, guard) = guard();
    let a = guard.issue("session-a").await;
    let b = guard.issue("session-b").await;

    assert_ne!(a.value, b.value);
    assert!(!guard.verify("session-b", &a.value).await);
    assert!(guard.verify("session-a", &a.value).await);
}

#[tokio::test]
async fn test_reissue_replaces_previous_state() {
    let (_, guard) = guard();
    let first = guard.issue("session-a").await;
    let second = guard.issue("session-a").await;

    assert!(!guard.verify("session-a", &first.value).await);
    assert!(!guard.verify("session-a", &second.value).await);

    let third = guard.issue("session-a").await;
    assert!(guard.verify("session-a", &third.value).await);
}

#[tokio::test]
async fn test_concurrent_verification_passes_once() {
    let (_, guard) = guard();
    let state = guard.issue("session-a").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let guard = guard.clone();
        let value = state.value.clone();
        handles.push(tokio::spawn(async move {
            guard.verify("session-a", &value).await
        }));
    }

    let mut passed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            passed += 1;
        }
    }
    assert_eq!(passed, 1);
}

#[tokio::test]
async fn test_check_reports_state_mismatch() {
    let (_, guard) = guard();
    guard.issue("session-a").await;

    let result = guard.check("session-a", "wrong").await;
    assert!(matches!(result, Err(SpotifyError::StateMismatch)));
}

#[tokio::test]
async fn test_abandoned_logins_are_evicted() {
    let store = Arc::new(MemorySessionStore::new());
    let guard = StateGuard::with_max_age(store.clone(), Duration::ZERO);

    for i in 0..1000 {
        guard.issue(&format!("abandoned-{i}")).await;
    }

    tokio::time::sleep(Duration::from_millis(1100)).await;
    guard.issue("latest").await;

    assert_eq!(store.session_count().await, 1);
    assert!(store.contains("latest").await);
}
