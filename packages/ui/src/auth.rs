//! Authentication context and hooks for the UI.
//!
//! The signed-in [`AuthUser`] is persisted in `localStorage` so a reload
//! resumes the session; [`AuthProvider`] restores it on mount.

use api::auth::{parse_callback, AuthUser, PendingSignIn, SignedIn};
use api::{ApiError, Backend};
use dioxus::prelude::*;
use store::UserProfile;

use crate::icons::brands::FaGoogle;
use crate::platform;
use crate::services::use_backend;
use crate::Icon;

const SESSION_KEY: &str = "ideady.session";
const GOOGLE_PENDING_KEY: &str = "ideady.google_pending";
/// Route Google redirects back to.
pub const GOOGLE_CALLBACK_PATH: &str = "/auth/google/callback";

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub profile: Option<UserProfile>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            profile: None,
            loading: true,
        }
    }
}

impl From<SignedIn> for AuthState {
    fn from(signed_in: SignedIn) -> Self {
        Self {
            user: Some(signed_in.user),
            profile: signed_in.profile,
            loading: false,
        }
    }
}

impl AuthState {
    fn signed_out() -> Self {
        Self {
            loading: false,
            ..Self::default()
        }
    }

    pub fn uid(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.uid.as_str())
    }

    /// Profile name first, then the account name, then the email.
    pub fn display_name(&self) -> String {
        match (&self.profile, &self.user) {
            (Some(p), _) if !p.display_name.trim().is_empty() => p.display_name.clone(),
            (_, Some(u)) => u.display_name().to_string(),
            _ => store::models::ANONYMOUS.to_string(),
        }
    }

    pub fn photo_url(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.photo_url.clone())
            .or_else(|| self.profile.as_ref().and_then(|p| p.photo_url.clone()))
            .filter(|u| !u.is_empty())
    }
}

/// Get the current authentication state.
/// Returns a signal that updates when the user logs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Record a successful sign-in and persist the credentials.
pub fn complete_sign_in(mut auth: Signal<AuthState>, signed_in: SignedIn) {
    platform::save_json(SESSION_KEY, &signed_in.user);
    auth.set(signed_in.into());
}

/// Mark the user offline and forget the stored session.
pub async fn sign_out(mut auth: Signal<AuthState>, backend: &Backend) {
    let user = auth.peek().user.clone();
    if let Some(user) = user {
        backend.session.logout(&user).await;
    }
    platform::storage_remove(SESSION_KEY);
    auth.set(AuthState::signed_out());
}

/// An ID token valid for at least another minute, refreshing it if needed.
///
/// `Ok(None)` when nobody is signed in.
pub async fn id_token(mut auth: Signal<AuthState>, backend: &Backend) -> Result<Option<String>, ApiError> {
    let Some(user) = auth.peek().user.clone() else {
        return Ok(None);
    };
    let fresh = backend.session.fresh_token(&user).await?;
    if fresh.id_token != user.id_token {
        platform::save_json(SESSION_KEY, &fresh);
        auth.with_mut(|state| state.user = Some(fresh.clone()));
    }
    Ok(Some(fresh.id_token))
}

fn google_redirect_uri() -> String {
    format!("{}{}", platform::origin(), GOOGLE_CALLBACK_PATH)
}

/// Exchange the callback fragment for a session.
pub async fn finish_google_sign_in(
    backend: &Backend,
    fragment: &str,
    pending: &PendingSignIn,
) -> Result<SignedIn, ApiError> {
    let token = parse_callback(fragment, pending)?;
    let redirect = google_redirect_uri();
    backend
        .session
        .login_with_google(&token, backend.google_request_uri(&redirect))
        .await
}

/// Pending state saved before leaving for Google; consumed on read.
pub fn take_google_pending() -> Option<PendingSignIn> {
    let pending = platform::load_json(GOOGLE_PENDING_KEY);
    platform::storage_remove(GOOGLE_PENDING_KEY);
    pending
}

/// Provider component that manages authentication state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let mut auth_state = use_context_provider(|| Signal::new(AuthState::default()));
    let backend = use_backend();

    // Resume a stored session on mount
    let _ = use_resource(move || {
        let backend = backend.clone();
        async move {
            let Some(user) = platform::load_json::<AuthUser>(SESSION_KEY) else {
                auth_state.set(AuthState::signed_out());
                return;
            };
            match backend.session.restore(&user).await {
                Ok(signed_in) => complete_sign_in(auth_state, signed_in),
                Err(e) => {
                    tracing::warn!("stored session could not be restored: {}", e);
                    platform::storage_remove(SESSION_KEY);
                    auth_state.set(AuthState::signed_out());
                }
            }
        }
    });

    rsx! {
        {children}
    }
}

/// "Continue with Google". Failures land in `on_error`.
#[component]
pub fn GoogleSignInButton(
    on_error: EventHandler<String>,
    #[props(default = "Continue with Google".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let auth = use_auth();
    let backend = use_backend();
    let mut loading = use_signal(|| false);

    let onclick = move |_| {
        let backend = backend.clone();
        async move {
            loading.set(true);
            let redirect = google_redirect_uri();
            match backend.google_start(&redirect) {
                Ok((url, pending)) if backend.is_mock() => {
                    // No real provider: finish in place instead of reloading
                    let fragment = url.split_once('#').map(|(_, f)| f).unwrap_or_default();
                    match finish_google_sign_in(&backend, fragment, &pending).await {
                        Ok(signed_in) => {
                            complete_sign_in(auth, signed_in);
                            navigator().push("/ideas");
                        }
                        Err(e) => {
                            loading.set(false);
                            on_error.call(e.user_message());
                        }
                    }
                }
                Ok((url, pending)) => {
                    platform::save_json(GOOGLE_PENDING_KEY, &pending);
                    platform::redirect(&url);
                }
                Err(e) => {
                    tracing::error!("Failed to start Google sign-in: {}", e);
                    loading.set(false);
                    on_error.call(e.user_message());
                }
            }
        }
    };

    rsx! {
        button {
            class: "{class}",
            r#type: "button",
            disabled: loading(),
            onclick: onclick,
            if loading() {
                "Redirecting..."
            } else {
                Icon { icon: FaGoogle, width: 16, height: 16 }
                span { "{label}" }
            }
        }
    }
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Logout".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
    #[props(default)] on_done: EventHandler<()>,
) -> Element {
    let auth = use_auth();
    let backend = use_backend();

    let onclick = move |_| {
        let backend = backend.clone();
        async move {
            sign_out(auth, &backend).await;
            on_done.call(());
            navigator().push("/");
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn user(name: Option<&str>) -> AuthUser {
        AuthUser {
            uid: "u1".into(),
            email: "ada@example.com".into(),
            display_name: name.map(str::to_string),
            photo_url: None,
            id_token: "t".into(),
            refresh_token: "r".into(),
            expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_display_name_prefers_profile() {
        let mut state = AuthState {
            user: Some(user(Some("Account"))),
            profile: Some(UserProfile::new("Profile", "ada@example.com")),
            loading: false,
        };
        assert_eq!(state.display_name(), "Profile");

        state.profile = None;
        assert_eq!(state.display_name(), "Account");

        state.user = Some(user(None));
        assert_eq!(state.display_name(), "ada@example.com");
    }

    #[test]
    fn test_photo_falls_back_to_profile() {
        let mut profile = UserProfile::new("Ada", "ada@example.com");
        profile.photo_url = Some("https://img/ada.png".into());
        let state = AuthState {
            user: Some(user(Some("Ada"))),
            profile: Some(profile),
            loading: false,
        };
        assert_eq!(state.photo_url().as_deref(), Some("https://img/ada.png"));
        assert_eq!(AuthState::signed_out().photo_url(), None);
    }
}
