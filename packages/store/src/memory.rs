use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::watch;

use crate::models::{OnlineUser, ProfileUpdate, UserProfile};
use crate::profiles::{ProfileStore, StoreError};

/// In-memory ProfileStore for testing and the mock backend.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    profiles: Arc<Mutex<HashMap<String, UserProfile>>>,
    online: Arc<watch::Sender<Vec<OnlineUser>>>,
    fail_writes: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        let (online, _) = watch::channel(Vec::new());
        Self {
            profiles: Arc::default(),
            online: Arc::new(online),
            fail_writes: Arc::default(),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, simulating an unreachable store.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, UserProfile>>, StoreError> {
        self.profiles
            .lock()
            .map_err(|_| StoreError::Unavailable("profile map poisoned".to_string()))
    }

    fn publish(&self, profiles: &HashMap<String, UserProfile>) {
        let mut users: Vec<OnlineUser> = profiles
            .iter()
            .filter(|(_, p)| p.is_online)
            .map(|(id, p)| OnlineUser::from_profile(id, p))
            .collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        self.online.send_replace(users);
    }
}

impl ProfileStore for MemoryStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.lock()?.get(uid).cloned())
    }

    async fn set_profile(&self, uid: &str, profile: &UserProfile) -> Result<(), StoreError> {
        self.check_writable()?;
        let now = Utc::now();
        let mut stored = profile.clone();
        stored.created_at.get_or_insert(now);
        stored.last_seen = Some(now);

        let mut profiles = self.lock()?;
        profiles.insert(uid.to_string(), stored);
        self.publish(&profiles);
        Ok(())
    }

    async fn merge_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut profiles = self.lock()?;
        let entry = profiles.entry(uid.to_string()).or_default();
        entry.apply(update);
        if update.touch_last_seen {
            entry.last_seen = Some(Utc::now());
        }
        self.publish(&profiles);
        Ok(())
    }

    async fn refresh_online(&self) -> Result<(), StoreError> {
        let profiles = self.lock()?;
        self.publish(&profiles);
        Ok(())
    }

    fn subscribe_online(&self) -> watch::Receiver<Vec<OnlineUser>> {
        self.online.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get_profile() {
        let store = MemoryStore::new();
        assert!(store.get_profile("u1").await.unwrap().is_none());

        store
            .set_profile("u1", &UserProfile::new("ada", "ada@example.com"))
            .await
            .unwrap();

        let profile = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.display_name, "ada");
        assert!(profile.created_at.is_some());
        assert!(profile.is_online);
    }

    #[tokio::test]
    async fn test_set_profile_keeps_existing_created_at() {
        let store = MemoryStore::new();
        let mut profile = UserProfile::new("ada", "ada@example.com");
        let created = Utc::now() - chrono::Duration::days(3);
        profile.created_at = Some(created);

        store.set_profile("u1", &profile).await.unwrap();

        let stored = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(stored.created_at, Some(created));
    }

    #[tokio::test]
    async fn test_merge_creates_missing_document() {
        let store = MemoryStore::new();
        store
            .merge_profile("ghost", &ProfileUpdate::presence(true))
            .await
            .unwrap();

        let profile = store.get_profile("ghost").await.unwrap().unwrap();
        assert!(profile.is_online);
        assert!(profile.last_seen.is_some());
    }

    #[tokio::test]
    async fn test_online_snapshot_follows_writes() {
        let store = MemoryStore::new();
        let rx = store.subscribe_online();

        store
            .set_profile("b", &UserProfile::new("bob", "bob@example.com"))
            .await
            .unwrap();
        store
            .set_profile("a", &UserProfile::new("", "anon@example.com"))
            .await
            .unwrap();

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, "a");
        assert_eq!(snapshot[0].display_name, "Anonymous");

        store
            .merge_profile("b", &ProfileUpdate::presence(false))
            .await
            .unwrap();
        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "a");
    }

    #[tokio::test]
    async fn test_failed_writes_leave_documents_untouched() {
        let store = MemoryStore::new();
        store
            .set_profile("u1", &UserProfile::new("ada", "ada@example.com"))
            .await
            .unwrap();

        store.set_fail_writes(true);
        let err = store
            .merge_profile("u1", &ProfileUpdate::presence(false))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.get_profile("u1").await.unwrap().unwrap().is_online);
    }
}
