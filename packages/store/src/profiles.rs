//! # ProfileStore: the backing document store contract
//!
//! Every read and write of user profile documents goes through [`ProfileStore`],
//! so the presence tracker and the session service work the same against the
//! in-memory store ([`crate::MemoryStore`], used by tests and the mock backend)
//! and the remote Firestore adapter in the `api` crate.
//!
//! Writes use the store's own clock for `createdAt`/`lastSeen`; the client never
//! sends its local time. The store is the single writer per user-id key, so no
//! conflict resolution happens here: last write wins.
//!
//! The live "online users" query is exposed as a [`tokio::sync::watch`]
//! receiver. Implementations publish a new snapshot after every write that can
//! change the set and whenever [`ProfileStore::refresh_online`] re-runs the query.

use std::future::Future;

use thiserror::Error;
use tokio::sync::watch;

use crate::models::{OnlineUser, ProfileUpdate, UserProfile};

/// Errors raised by a profile store.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
    #[error("profile write rejected: {0}")]
    Rejected(String),
    #[error("malformed profile document: {0}")]
    Decode(String),
}

/// Async contract for per-user profile documents and the online-users query.
pub trait ProfileStore {
    /// Read `users/{uid}`; `Ok(None)` when the document does not exist.
    fn get_profile(
        &self,
        uid: &str,
    ) -> impl Future<Output = Result<Option<UserProfile>, StoreError>>;

    /// Overwrite `users/{uid}`. A missing `created_at` is stamped by the store.
    fn set_profile(
        &self,
        uid: &str,
        profile: &UserProfile,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// Merge `update` into `users/{uid}`, creating the document if needed.
    fn merge_profile(
        &self,
        uid: &str,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// Re-run the online-users query and publish the result.
    fn refresh_online(&self) -> impl Future<Output = Result<(), StoreError>>;

    /// Subscribe to snapshots of the online-users query.
    fn subscribe_online(&self) -> watch::Receiver<Vec<OnlineUser>>;

    /// Credentials for subsequent requests; `None` after sign-out.
    /// Stores without access rules ignore it.
    fn authorize(&self, _id_token: Option<&str>) {}
}
