//! # Presence tracker: the current user's online flag
//!
//! [`PresenceTracker`] keeps `users/{uid}.isOnline` in step with the session
//! lifecycle and hands out the live "online users" subscription.
//!
//! | Event | Write |
//! |-------|-------|
//! | [`PresenceEvent::SignedIn`], [`PresenceEvent::Reconnected`] | `isOnline = true`, `lastSeen = <store time>` |
//! | [`PresenceEvent::SignedOut`], [`PresenceEvent::Unload`], [`PresenceEvent::WentOffline`] | `isOnline = false`, `lastSeen = <store time>` |
//!
//! Presence is advisory. A failed write is logged and swallowed so neither the UI
//! nor the logout path ever waits on it.

use tokio::sync::watch;

use crate::models::{OnlineUser, ProfileUpdate};
use crate::profiles::{ProfileStore, StoreError};

/// Lifecycle events that change a user's presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenceEvent {
    /// Session established (login, signup, restored session).
    SignedIn,
    /// Explicit logout.
    SignedOut,
    /// The tab is closing.
    Unload,
    /// The browser reported loss of connectivity.
    WentOffline,
    /// The browser reported connectivity again.
    Reconnected,
}

impl PresenceEvent {
    /// Online flag this event leads to.
    pub fn online(self) -> bool {
        matches!(self, PresenceEvent::SignedIn | PresenceEvent::Reconnected)
    }
}

/// Maintains the online flag for the signed-in user.
#[derive(Clone, Debug)]
pub struct PresenceTracker<S: ProfileStore> {
    store: S,
}

impl<S: ProfileStore> PresenceTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Flag `uid` online.
    pub async fn mark_online(&self, uid: &str) {
        self.handle(uid, PresenceEvent::SignedIn).await;
    }

    /// Flag `uid` offline.
    pub async fn mark_offline(&self, uid: &str) {
        self.handle(uid, PresenceEvent::SignedOut).await;
    }

    /// Apply a lifecycle event. Returns whether the write reached the store.
    pub async fn handle(&self, uid: &str, event: PresenceEvent) -> bool {
        match self.write(uid, event.online()).await {
            Ok(()) => {
                tracing::debug!(uid, ?event, "presence updated");
                true
            }
            Err(e) => {
                tracing::warn!(uid, ?event, "presence update failed: {}", e);
                false
            }
        }
    }

    async fn write(&self, uid: &str, online: bool) -> Result<(), StoreError> {
        self.store
            .merge_profile(uid, &ProfileUpdate::presence(online))
            .await
    }

    /// Live set of online users. Order carries no meaning.
    pub fn subscribe(&self) -> watch::Receiver<Vec<OnlineUser>> {
        self.store.subscribe_online()
    }

    /// Re-run the online-users query; failures are logged.
    pub async fn refresh(&self) {
        if let Err(e) = self.store.refresh_online().await {
            tracing::warn!("online users refresh failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::models::UserProfile;

    async fn seeded() -> (MemoryStore, PresenceTracker<MemoryStore>) {
        let store = MemoryStore::new();
        store
            .set_profile("ada", &UserProfile::new("Ada", "ada@example.com"))
            .await
            .unwrap();
        store
            .set_profile("bob", &UserProfile::new("Bob", "bob@example.com"))
            .await
            .unwrap();
        (store.clone(), PresenceTracker::new(store))
    }

    #[tokio::test]
    async fn test_sign_out_removes_user_from_next_snapshot() {
        let (_, tracker) = seeded().await;
        let mut rx = tracker.subscribe();
        assert!(rx.borrow_and_update().iter().any(|u| u.id == "ada"));

        tracker.mark_offline("ada").await;

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert!(snapshot.iter().all(|u| u.id != "ada"));
        assert!(snapshot.iter().any(|u| u.id == "bob"));
    }

    #[tokio::test]
    async fn test_lifecycle_events_map_to_flags() {
        let (store, tracker) = seeded().await;

        tracker.handle("bob", PresenceEvent::WentOffline).await;
        assert!(!store.get_profile("bob").await.unwrap().unwrap().is_online);

        tracker.handle("bob", PresenceEvent::Reconnected).await;
        assert!(store.get_profile("bob").await.unwrap().unwrap().is_online);

        tracker.handle("bob", PresenceEvent::Unload).await;
        assert!(!store.get_profile("bob").await.unwrap().unwrap().is_online);
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let (store, tracker) = seeded().await;
        store.set_fail_writes(true);

        assert!(!tracker.handle("ada", PresenceEvent::SignedOut).await);
        // Still online: the write never landed, and nothing panicked.
        assert!(store.get_profile("ada").await.unwrap().unwrap().is_online);
    }

    #[tokio::test]
    async fn test_sign_in_stamps_last_seen() {
        let store = MemoryStore::new();
        let tracker = PresenceTracker::new(store.clone());

        tracker.mark_online("new").await;

        let profile = store.get_profile("new").await.unwrap().unwrap();
        assert!(profile.is_online);
        assert!(profile.last_seen.is_some());
        assert_eq!(tracker.subscribe().borrow().len(), 1);
    }
}
