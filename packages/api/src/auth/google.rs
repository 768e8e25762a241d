//! # Google sign-in
//!
//! Browser-side Google sign-in in two steps. Nothing here needs a client secret.
//!
//! 1. **[`authorize_url`](GoogleSignIn::authorize_url)** builds the Google
//!    authorization URL with `response_type=id_token`, the `openid`, `email`
//!    and `profile` scopes, a random CSRF state and a nonce. The caller keeps
//!    the returned [`PendingSignIn`] (the web app stores it in
//!    `localStorage`) and navigates to the URL.
//!
//! 2. Google redirects back to `/auth/google/callback#id_token=...&state=...`.
//!    **[`parse_callback`]** reads the fragment, checks the state against the
//!    pending one and yields the Google ID token. The session service then
//!    exchanges it with the identity provider (`accounts:signInWithIdp`).

use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, ResponseType, Scope};
use serde::{Deserialize, Serialize};

use crate::ApiError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// State remembered between leaving for Google and coming back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSignIn {
    pub state: String,
    pub nonce: String,
}

/// Google sign-in configuration.
#[derive(Clone, Debug)]
pub struct GoogleSignIn {
    client_id: ClientId,
    auth_url: AuthUrl,
    redirect_url: RedirectUrl,
}

impl GoogleSignIn {
    pub fn new(client_id: &str, redirect_uri: &str) -> Result<Self, ApiError> {
        if client_id.trim().is_empty() {
            return Err(ApiError::Auth("Google sign-in is not configured".to_string()));
        }
        Ok(Self {
            client_id: ClientId::new(client_id.to_string()),
            auth_url: AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                .map_err(|e| ApiError::Auth(e.to_string()))?,
            redirect_url: RedirectUrl::new(redirect_uri.to_string())
                .map_err(|e| ApiError::Auth(e.to_string()))?,
        })
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_url.as_str()
    }

    /// Authorization URL plus the state to keep until the callback.
    pub fn authorize_url(&self) -> (String, PendingSignIn) {
        let client = BasicClient::new(self.client_id.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());
        let nonce = CsrfToken::new_random();

        let (url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .set_response_type(&ResponseType::new("id_token".to_string()))
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .add_extra_param("nonce", nonce.secret().clone())
            .add_extra_param("prompt", "select_account")
            .url();

        let pending = PendingSignIn {
            state: csrf_state.secret().clone(),
            nonce: nonce.secret().clone(),
        };
        (url.to_string(), pending)
    }
}

/// Extract the Google ID token from the callback URL fragment.
pub fn parse_callback(fragment: &str, pending: &PendingSignIn) -> Result<String, ApiError> {
    let fragment = fragment.trim_start_matches('#');
    let mut id_token = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "id_token" => id_token = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(ApiError::Auth(match error.as_str() {
            "access_denied" => "Google sign-in was cancelled".to_string(),
            other => format!("Google sign-in failed ({})", other),
        }));
    }
    if state.as_deref() != Some(pending.state.as_str()) {
        return Err(ApiError::Auth("Invalid or expired sign-in state".to_string()));
    }
    id_token.ok_or_else(|| ApiError::Auth("Google did not return an ID token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn google() -> GoogleSignIn {
        GoogleSignIn::new(
            "client-123.apps.googleusercontent.com",
            "http://localhost:8080/auth/google/callback",
        )
        .unwrap()
    }

    #[test]
    fn test_authorize_url_carries_state_and_nonce() {
        let (url, pending) = google().authorize_url();
        let parsed = url::Url::parse(&url).unwrap();
        let params: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(parsed.host_str(), Some("accounts.google.com"));
        assert_eq!(params["response_type"], "id_token");
        assert_eq!(params["client_id"], "client-123.apps.googleusercontent.com");
        assert_eq!(params["state"], pending.state);
        assert_eq!(params["nonce"], pending.nonce);
        assert!(params["scope"].contains("openid"));
    }

    #[test]
    fn test_parse_callback() {
        let pending = PendingSignIn {
            state: "abc".into(),
            nonce: "n".into(),
        };
        assert_eq!(
            parse_callback("#state=abc&id_token=tok.en&token_type=Bearer", &pending).unwrap(),
            "tok.en"
        );
        assert!(parse_callback("state=other&id_token=x", &pending).is_err());
        assert_eq!(
            parse_callback("error=access_denied&state=abc", &pending),
            Err(ApiError::Auth("Google sign-in was cancelled".into()))
        );
    }

    #[test]
    fn test_missing_client_id() {
        assert!(GoogleSignIn::new("", "http://localhost/cb").is_err());
    }
}
