//! # Backend selection
//!
//! The UI talks to one [`Backend`], built from [`IdeadyConfig`]. When Firebase is
//! configured it wires the REST catalog, Identity Toolkit, Firestore and
//! Firebase Storage; otherwise (or with `mock_backend = true`) everything runs
//! in memory on the types in [`crate::mock`].
//!
//! Each seam is an enum rather than a trait object because the traits return
//! `impl Future` and are not object safe.

use std::time::Duration;

use oauth2::CsrfToken;
use store::{
    IdeadyConfig, MemoryStore, OnlineUser, ProfileStore, ProfileUpdate, PublicProfile, StoreError,
    UserProfile,
};
use tokio::sync::watch;

use crate::auth::{
    AuthUser, GoogleSignIn, IdentityProvider, IdentityToolkit, PendingSignIn, Session, SignInOutcome,
};
use crate::catalog::{CatalogApi, IdeaSource};
use crate::client::CatalogClient;
use crate::firestore::FirestoreStore;
use crate::mock::{MockBlobs, MockCatalog, MockIdentity, GOOGLE_TOKEN_PREFIX};
use crate::models::{Category, Idea, IdeaDraft, IdeasResponse, Language};
use crate::storage::{BlobStorage, FirebaseStorage, Upload};
use crate::ApiError;

/// Google account used by the in-memory backend's "Continue with Google".
pub const MOCK_GOOGLE_EMAIL: &str = "google.user@ideady.dev";

#[derive(Clone, Debug)]
pub enum Catalog {
    Remote(CatalogClient),
    Mock(MockCatalog),
}

impl IdeaSource for Catalog {
    async fn list_ideas(&self, query: &str, token: Option<&str>) -> Result<IdeasResponse, ApiError> {
        match self {
            Catalog::Remote(c) => c.list_ideas(query, token).await,
            Catalog::Mock(c) => c.list_ideas(query, token).await,
        }
    }
}

impl CatalogApi for Catalog {
    async fn get_idea(&self, id: &str, token: Option<&str>) -> Result<Idea, ApiError> {
        match self {
            Catalog::Remote(c) => c.get_idea(id, token).await,
            Catalog::Mock(c) => c.get_idea(id, token).await,
        }
    }

    async fn create_idea(&self, draft: &IdeaDraft, token: &str) -> Result<(), ApiError> {
        match self {
            Catalog::Remote(c) => c.create_idea(draft, token).await,
            Catalog::Mock(c) => c.create_idea(draft, token).await,
        }
    }

    async fn update_idea(&self, id: &str, draft: &IdeaDraft, token: &str) -> Result<(), ApiError> {
        match self {
            Catalog::Remote(c) => c.update_idea(id, draft, token).await,
            Catalog::Mock(c) => c.update_idea(id, draft, token).await,
        }
    }

    async fn delete_idea(&self, id: &str, token: &str) -> Result<(), ApiError> {
        match self {
            Catalog::Remote(c) => c.delete_idea(id, token).await,
            Catalog::Mock(c) => c.delete_idea(id, token).await,
        }
    }

    async fn public_profile(&self, uid: &str) -> Result<PublicProfile, ApiError> {
        match self {
            Catalog::Remote(c) => c.public_profile(uid).await,
            Catalog::Mock(c) => c.public_profile(uid).await,
        }
    }

    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        match self {
            Catalog::Remote(c) => c.categories().await,
            Catalog::Mock(c) => c.categories().await,
        }
    }

    async fn languages(&self) -> Result<Vec<Language>, ApiError> {
        match self {
            Catalog::Remote(c) => c.languages().await,
            Catalog::Mock(c) => c.languages().await,
        }
    }

    async fn health(&self) -> Result<(), ApiError> {
        match self {
            Catalog::Remote(c) => c.health().await,
            Catalog::Mock(c) => c.health().await,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Identity {
    Firebase(IdentityToolkit),
    Mock(MockIdentity),
}

impl IdentityProvider for Identity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        match self {
            Identity::Firebase(i) => i.sign_up(email, password).await,
            Identity::Mock(i) => i.sign_up(email, password).await,
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        match self {
            Identity::Firebase(i) => i.sign_in(email, password).await,
            Identity::Mock(i) => i.sign_in(email, password).await,
        }
    }

    async fn sign_in_with_google(
        &self,
        google_id_token: &str,
        request_uri: &str,
    ) -> Result<SignInOutcome, ApiError> {
        match self {
            Identity::Firebase(i) => i.sign_in_with_google(google_id_token, request_uri).await,
            Identity::Mock(i) => i.sign_in_with_google(google_id_token, request_uri).await,
        }
    }

    async fn update_profile(
        &self,
        user: &AuthUser,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<AuthUser, ApiError> {
        match self {
            Identity::Firebase(i) => i.update_profile(user, display_name, photo_url).await,
            Identity::Mock(i) => i.update_profile(user, display_name, photo_url).await,
        }
    }

    async fn refresh(&self, user: &AuthUser) -> Result<AuthUser, ApiError> {
        match self {
            Identity::Firebase(i) => i.refresh(user).await,
            Identity::Mock(i) => i.refresh(user).await,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Blobs {
    Firebase(FirebaseStorage),
    Mock(MockBlobs),
}

impl BlobStorage for Blobs {
    async fn upload(&self, path: &str, upload: &Upload, id_token: &str) -> Result<String, ApiError> {
        match self {
            Blobs::Firebase(b) => b.upload(path, upload, id_token).await,
            Blobs::Mock(b) => b.upload(path, upload, id_token).await,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Profiles {
    Firestore(FirestoreStore),
    Memory(MemoryStore),
}

impl ProfileStore for Profiles {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        match self {
            Profiles::Firestore(s) => s.get_profile(uid).await,
            Profiles::Memory(s) => s.get_profile(uid).await,
        }
    }

    async fn set_profile(&self, uid: &str, profile: &UserProfile) -> Result<(), StoreError> {
        match self {
            Profiles::Firestore(s) => s.set_profile(uid, profile).await,
            Profiles::Memory(s) => s.set_profile(uid, profile).await,
        }
    }

    async fn merge_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), StoreError> {
        match self {
            Profiles::Firestore(s) => s.merge_profile(uid, update).await,
            Profiles::Memory(s) => s.merge_profile(uid, update).await,
        }
    }

    async fn refresh_online(&self) -> Result<(), StoreError> {
        match self {
            Profiles::Firestore(s) => s.refresh_online().await,
            Profiles::Memory(s) => s.refresh_online().await,
        }
    }

    fn subscribe_online(&self) -> watch::Receiver<Vec<OnlineUser>> {
        match self {
            Profiles::Firestore(s) => s.subscribe_online(),
            Profiles::Memory(s) => s.subscribe_online(),
        }
    }

    fn authorize(&self, id_token: Option<&str>) {
        match self {
            Profiles::Firestore(s) => s.authorize(id_token),
            Profiles::Memory(s) => s.authorize(id_token),
        }
    }
}

pub type AppSession = Session<Identity, Profiles, Blobs>;

/// Everything the UI needs to reach the outside world.
#[derive(Clone, Debug)]
pub struct Backend {
    pub config: IdeadyConfig,
    pub catalog: Catalog,
    pub session: AppSession,
}

impl Backend {
    pub fn from_config(config: IdeadyConfig) -> Self {
        if config.use_mock_backend() {
            tracing::info!("using in-memory backend");
            return Self::mock_with(config);
        }

        let timeout = Duration::from_secs(config.api.request_timeout_secs);
        let firebase = &config.firebase;
        let bucket = if firebase.storage_bucket.is_empty() {
            format!("{}.appspot.com", firebase.project_id)
        } else {
            firebase.storage_bucket.clone()
        };
        tracing::info!(
            api = %config.api.base_url,
            project = %firebase.project_id,
            "using remote backend"
        );

        let session = Session::new(
            Identity::Firebase(IdentityToolkit::new(&firebase.api_key, timeout)),
            Profiles::Firestore(FirestoreStore::new(
                &firebase.project_id,
                &firebase.api_key,
                timeout,
            )),
            Blobs::Firebase(FirebaseStorage::new(&bucket, timeout)),
        );
        Self {
            catalog: Catalog::Remote(CatalogClient::new(&config.api)),
            session,
            config,
        }
    }

    /// Fully in-memory backend with demo listings.
    pub fn mock() -> Self {
        Self::mock_with(IdeadyConfig::default().with_mock_backend(true))
    }

    fn mock_with(config: IdeadyConfig) -> Self {
        let profiles = MemoryStore::new();
        Self {
            catalog: Catalog::Mock(MockCatalog::seeded(profiles.clone())),
            session: Session::new(
                Identity::Mock(MockIdentity::new()),
                Profiles::Memory(profiles),
                Blobs::Mock(MockBlobs::new()),
            ),
            config,
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self.catalog, Catalog::Mock(_))
    }

    /// Where "Continue with Google" should navigate, plus the state to keep.
    ///
    /// `default_redirect` is used when no redirect URI is configured. The
    /// in-memory backend skips Google and lands on the callback directly.
    pub fn google_start(&self, default_redirect: &str) -> Result<(String, PendingSignIn), ApiError> {
        let redirect = match self.config.firebase.auth_redirect_uri.trim() {
            "" => default_redirect,
            configured => configured,
        };
        if self.is_mock() {
            let pending = PendingSignIn {
                state: CsrfToken::new_random().secret().clone(),
                nonce: CsrfToken::new_random().secret().clone(),
            };
            let url = format!(
                "{}#id_token={}{}&state={}",
                redirect, GOOGLE_TOKEN_PREFIX, MOCK_GOOGLE_EMAIL, pending.state
            );
            return Ok((url, pending));
        }
        let google = GoogleSignIn::new(&self.config.firebase.google_client_id, redirect)?;
        Ok(google.authorize_url())
    }

    /// Redirect URI to report when exchanging a Google token.
    pub fn google_request_uri<'a>(&'a self, default_redirect: &'a str) -> &'a str {
        match self.config.firebase.auth_redirect_uri.trim() {
            "" => default_redirect,
            configured => configured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::parse_callback;
    use crate::listing::{load_ideas, ListingRequest, RetryPolicy};

    #[tokio::test]
    async fn test_mock_backend_lists_demo_ideas() {
        let backend = Backend::mock();
        assert!(backend.is_mock());

        let page = load_ideas(
            &backend.catalog,
            &ListingRequest::default(),
            None,
            &RetryPolicy::default(),
            crate::timer::sleep,
        )
        .await
        .unwrap();
        assert_eq!(page.ideas.len(), 6);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[tokio::test]
    async fn test_mock_google_round_trip() {
        let backend = Backend::mock();
        let redirect = "http://localhost:8080/auth/google/callback";
        let (url, pending) = backend.google_start(redirect).unwrap();
        let fragment = url.split_once('#').unwrap().1;
        let token = parse_callback(fragment, &pending).unwrap();

        let signed_in = backend
            .session
            .login_with_google(&token, backend.google_request_uri(redirect))
            .await
            .unwrap();
        assert_eq!(signed_in.user.email, MOCK_GOOGLE_EMAIL);
        assert!(signed_in.profile.unwrap().is_online);
    }

    #[test]
    fn test_unconfigured_firebase_falls_back_to_mock() {
        let backend = Backend::from_config(IdeadyConfig::default());
        assert!(backend.is_mock());
    }

    #[test]
    fn test_configured_firebase_uses_remote() {
        let mut config = IdeadyConfig::default();
        config.firebase.api_key = "key".into();
        config.firebase.project_id = "ideady".into();
        let backend = Backend::from_config(config);
        assert!(!backend.is_mock());
        assert!(backend.google_start("http://localhost/cb").is_err());
    }
}
