//! # Session service
//!
//! [`Session`] composes the identity provider, the profile store (through the
//! presence tracker) and blob storage into the account operations the UI
//! calls. It holds no state of its own; the signed-in [`AuthUser`] is owned by
//! the caller and passed back in.
//!
//! ## Ordering and failure rules
//!
//! - **signup**: create account → set display name → upload avatar and CV
//!   (each best-effort: a failure leaves the URL empty) → write the profile
//!   document with `isOnline = true` and a store-assigned `createdAt`.
//! - **login**: sign in → mark online (failure swallowed) → read profile.
//! - **login_with_google**: exchange the ID token. New users get a full profile
//!   document, returning users only get their online flag refreshed.
//! - **logout**: mark offline first (failure logged), then drop credentials.
//! - **update_user_profile**: upload new files (failures surface) → update the
//!   identity record → merge the profile document.

use chrono::Utc;
use store::{PresenceEvent, PresenceTracker, ProfileStore, ProfileUpdate, UserProfile};

use super::identity::{AuthUser, IdentityProvider};
use crate::storage::{avatar_path, cv_path, BlobStorage, Upload};
use crate::ApiError;

/// Signup form contents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub full_name: Option<String>,
    pub avatar: Option<Upload>,
    pub cv: Option<Upload>,
}

/// Profile edit form contents. `None` leaves a field as is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfileEdit {
    pub display_name: Option<String>,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub preferred_categories: Option<Vec<String>>,
    pub language_preferences: Option<Vec<String>>,
    pub avatar: Option<Upload>,
    pub cv: Option<Upload>,
}

/// A signed-in user and their profile document, if it exists.
#[derive(Clone, Debug, PartialEq)]
pub struct SignedIn {
    pub user: AuthUser,
    pub profile: Option<UserProfile>,
}

#[derive(Clone, Debug)]
pub struct Session<I, P: ProfileStore, B> {
    identity: I,
    presence: PresenceTracker<P>,
    blobs: B,
}

impl<I, P, B> Session<I, P, B>
where
    I: IdentityProvider,
    P: ProfileStore,
    B: BlobStorage,
{
    pub fn new(identity: I, profiles: P, blobs: B) -> Self {
        Self {
            identity,
            presence: PresenceTracker::new(profiles),
            blobs,
        }
    }

    pub fn presence(&self) -> &PresenceTracker<P> {
        &self.presence
    }

    pub fn profiles(&self) -> &P {
        self.presence.store()
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<SignedIn, ApiError> {
        let user = self.identity.sign_up(&request.email, &request.password).await?;
        self.profiles().authorize(Some(&user.id_token));

        let user = self
            .identity
            .update_profile(&user, Some(&request.display_name), None)
            .await?;

        let photo_url = match &request.avatar {
            Some(file) => self
                .best_effort_upload(&avatar_path(&user.uid), file, &user)
                .await
                .unwrap_or_default(),
            None => user.photo_url.clone().unwrap_or_default(),
        };
        let cv_url = match &request.cv {
            Some(file) => self
                .best_effort_upload(&cv_path(&user.uid, &file.file_name), file, &user)
                .await,
            None => None,
        };
        let user = if photo_url.is_empty() {
            user
        } else {
            self.identity
                .update_profile(&user, None, Some(&photo_url))
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("could not attach avatar to account: {}", e);
                    AuthUser {
                        photo_url: Some(photo_url.clone()),
                        ..user.clone()
                    }
                })
        };

        let mut profile = UserProfile::new(&request.display_name, &request.email);
        profile.full_name = request.full_name.filter(|n| !n.trim().is_empty());
        profile.photo_url = Some(photo_url);
        profile.cv_url = cv_url;
        self.profiles().set_profile(&user.uid, &profile).await?;

        tracing::info!(uid = %user.uid, "account created");
        let profile = self.read_profile(&user.uid).await.or(Some(profile));
        Ok(SignedIn { user, profile })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, ApiError> {
        let user = self.identity.sign_in(email.trim(), password).await?;
        self.profiles().authorize(Some(&user.id_token));
        self.presence.handle(&user.uid, PresenceEvent::SignedIn).await;

        tracing::info!(uid = %user.uid, "signed in");
        let profile = self.read_profile(&user.uid).await;
        Ok(SignedIn { user, profile })
    }

    pub async fn login_with_google(
        &self,
        google_id_token: &str,
        request_uri: &str,
    ) -> Result<SignedIn, ApiError> {
        let outcome = self
            .identity
            .sign_in_with_google(google_id_token, request_uri)
            .await?;
        let user = outcome.user;
        self.profiles().authorize(Some(&user.id_token));

        if outcome.is_new_user {
            let mut profile = UserProfile::new(
                user.display_name.as_deref().unwrap_or_default(),
                &user.email,
            );
            profile.photo_url = Some(user.photo_url.clone().unwrap_or_default());
            self.profiles().set_profile(&user.uid, &profile).await?;
            tracing::info!(uid = %user.uid, "account created with Google");
        } else {
            self.presence.handle(&user.uid, PresenceEvent::SignedIn).await;
            tracing::info!(uid = %user.uid, "signed in with Google");
        }

        let profile = self.read_profile(&user.uid).await;
        Ok(SignedIn { user, profile })
    }

    /// Mark offline, then drop credentials. Never fails.
    pub async fn logout(&self, user: &AuthUser) {
        self.presence.handle(&user.uid, PresenceEvent::SignedOut).await;
        self.profiles().authorize(None);
        tracing::info!(uid = %user.uid, "signed out");
    }

    pub async fn update_user_profile(
        &self,
        user: &AuthUser,
        edit: ProfileEdit,
    ) -> Result<SignedIn, ApiError> {
        let user = self.fresh_token(user).await?;

        let photo_url = match &edit.avatar {
            Some(file) => Some(
                self.blobs
                    .upload(&avatar_path(&user.uid), file, &user.id_token)
                    .await?,
            ),
            None => None,
        };
        let cv_url = match &edit.cv {
            Some(file) => Some(
                self.blobs
                    .upload(&cv_path(&user.uid, &file.file_name), file, &user.id_token)
                    .await?,
            ),
            None => None,
        };

        let user = if edit.display_name.is_some() || photo_url.is_some() {
            self.identity
                .update_profile(&user, edit.display_name.as_deref(), photo_url.as_deref())
                .await?
        } else {
            user
        };

        let update = ProfileUpdate {
            display_name: edit.display_name,
            full_name: edit.full_name,
            photo_url,
            bio: edit.bio,
            location: edit.location,
            website: edit.website,
            preferred_categories: edit.preferred_categories,
            language_preferences: edit.language_preferences,
            cv_url,
            ..ProfileUpdate::default()
        };
        if !update.is_empty() {
            self.profiles().merge_profile(&user.uid, &update).await?;
        }

        tracing::info!(uid = %user.uid, "profile updated");
        let profile = self.profiles().get_profile(&user.uid).await?;
        Ok(SignedIn { user, profile })
    }

    /// Resume a persisted session: refresh the token if needed, mark online, read profile.
    pub async fn restore(&self, user: &AuthUser) -> Result<SignedIn, ApiError> {
        let user = self.fresh_token(user).await?;
        self.profiles().authorize(Some(&user.id_token));
        self.presence.handle(&user.uid, PresenceEvent::SignedIn).await;
        let profile = self.read_profile(&user.uid).await;
        Ok(SignedIn { user, profile })
    }

    /// `user` with an ID token that is valid for at least another minute.
    pub async fn fresh_token(&self, user: &AuthUser) -> Result<AuthUser, ApiError> {
        if !user.is_expired(Utc::now()) {
            return Ok(user.clone());
        }
        tracing::debug!(uid = %user.uid, "refreshing ID token");
        let refreshed = self.identity.refresh(user).await?;
        self.profiles().authorize(Some(&refreshed.id_token));
        Ok(refreshed)
    }

    async fn read_profile(&self, uid: &str) -> Option<UserProfile> {
        match self.profiles().get_profile(uid).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(uid, "error fetching user profile: {}", e);
                None
            }
        }
    }

    async fn best_effort_upload(&self, path: &str, file: &Upload, user: &AuthUser) -> Option<String> {
        match self.blobs.upload(path, file, &user.id_token).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(path, "upload failed, continuing without it: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBlobs, MockIdentity};
    use store::MemoryStore;

    fn session() -> (Session<MockIdentity, MemoryStore, MockBlobs>, MemoryStore, MockBlobs) {
        let store = MemoryStore::new();
        let blobs = MockBlobs::new();
        (
            Session::new(MockIdentity::new(), store.clone(), blobs.clone()),
            store,
            blobs,
        )
    }

    fn signup_request() -> SignupRequest {
        SignupRequest {
            email: "ada@example.com".into(),
            password: "secret1".into(),
            display_name: "Ada".into(),
            ..SignupRequest::default()
        }
    }

    fn file(name: &str) -> Upload {
        Upload {
            file_name: name.into(),
            content_type: "application/pdf".into(),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn test_signup_writes_online_profile() {
        let (session, store, _) = session();
        let signed_in = session.signup(signup_request()).await.unwrap();

        assert_eq!(signed_in.user.display_name(), "Ada");
        let profile = store.get_profile(&signed_in.user.uid).await.unwrap().unwrap();
        assert!(profile.is_online);
        assert!(profile.created_at.is_some());
        assert_eq!(profile.photo_url.as_deref(), Some(""));
        assert_eq!(store.subscribe_online().borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_signup_survives_failed_uploads() {
        let (session, store, blobs) = session();
        blobs.set_fail(true);

        let mut request = signup_request();
        request.avatar = Some(file("me.png"));
        request.cv = Some(file("cv.pdf"));
        let signed_in = session.signup(request).await.unwrap();

        let profile = store.get_profile(&signed_in.user.uid).await.unwrap().unwrap();
        assert_eq!(profile.photo_url.as_deref(), Some(""));
        assert_eq!(profile.cv_url, None);
    }

    #[tokio::test]
    async fn test_signup_uploads_to_user_paths() {
        let (session, store, blobs) = session();
        let mut request = signup_request();
        request.cv = Some(file("cv.pdf"));
        let signed_in = session.signup(request).await.unwrap();

        let uid = &signed_in.user.uid;
        assert!(blobs.contains(&format!("cvs/{}_cv.pdf", uid)));
        let profile = store.get_profile(uid).await.unwrap().unwrap();
        assert_eq!(profile.cv_url, Some(format!("mock://cvs/{}_cv.pdf", uid)));
    }

    #[tokio::test]
    async fn test_login_marks_online_even_if_store_fails() {
        let (session, store, _) = session();
        let created = session.signup(signup_request()).await.unwrap();
        session.logout(&created.user).await;
        assert!(!store.get_profile(&created.user.uid).await.unwrap().unwrap().is_online);

        store.set_fail_writes(true);
        let signed_in = session.login("ada@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in.user.uid, created.user.uid);
        assert!(signed_in.profile.is_some());

        store.set_fail_writes(false);
        session.login("ada@example.com", "secret1").await.unwrap();
        assert!(store.get_profile(&created.user.uid).await.unwrap().unwrap().is_online);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let (session, _, _) = session();
        session.signup(signup_request()).await.unwrap();
        let err = session.login("ada@example.com", "nope").await.unwrap_err();
        assert_eq!(err, ApiError::Auth("Invalid email or password".into()));
    }

    #[tokio::test]
    async fn test_logout_proceeds_when_presence_write_fails() {
        let (session, store, _) = session();
        let signed_in = session.signup(signup_request()).await.unwrap();
        store.set_fail_writes(true);

        session.logout(&signed_in.user).await;
        // Still flagged online; the next refresh or unload will correct it.
        assert!(store.get_profile(&signed_in.user.uid).await.unwrap().unwrap().is_online);
    }

    #[tokio::test]
    async fn test_google_returning_user_only_refreshes_presence() {
        let (session, store, _) = session();
        let first = session
            .login_with_google("mock-google:grace@example.com", "")
            .await
            .unwrap();
        let uid = first.user.uid.clone();
        assert!(first.profile.is_some());

        store
            .merge_profile(
                &uid,
                &ProfileUpdate {
                    bio: Some("compilers".into()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        session.logout(&first.user).await;

        let again = session
            .login_with_google("mock-google:grace@example.com", "")
            .await
            .unwrap();
        let profile = again.profile.unwrap();
        assert_eq!(again.user.uid, uid);
        assert_eq!(profile.bio.as_deref(), Some("compilers"));
        assert!(profile.is_online);
    }

    #[tokio::test]
    async fn test_update_profile_merges_fields() {
        let (session, _, blobs) = session();
        let signed_in = session.signup(signup_request()).await.unwrap();

        let updated = session
            .update_user_profile(
                &signed_in.user,
                ProfileEdit {
                    display_name: Some("Ada L.".into()),
                    bio: Some("Engines".into()),
                    avatar: Some(file("me.png")),
                    ..ProfileEdit::default()
                },
            )
            .await
            .unwrap();

        let profile = updated.profile.unwrap();
        assert_eq!(updated.user.display_name(), "Ada L.");
        assert_eq!(profile.display_name, "Ada L.");
        assert_eq!(profile.bio.as_deref(), Some("Engines"));
        assert_eq!(profile.email, "ada@example.com");
        assert!(blobs.contains(&format!("profile_images/{}", updated.user.uid)));
    }

    #[tokio::test]
    async fn test_update_profile_surfaces_upload_failure() {
        let (session, _, blobs) = session();
        let signed_in = session.signup(signup_request()).await.unwrap();
        blobs.set_fail(true);

        let result = session
            .update_user_profile(
                &signed_in.user,
                ProfileEdit {
                    cv: Some(file("cv.pdf")),
                    ..ProfileEdit::default()
                },
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_restore_refreshes_expired_token() {
        let (session, _, _) = session();
        let mut user = session.signup(signup_request()).await.unwrap().user;
        user.expires_at = Utc::now() - chrono::Duration::minutes(5);

        let restored = session.restore(&user).await.unwrap();
        assert!(!restored.user.is_expired(Utc::now()));
        assert_ne!(restored.user.id_token, user.id_token);
        assert!(restored.profile.unwrap().is_online);
    }
}
