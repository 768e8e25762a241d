//! # Identity provider: Firebase Identity Toolkit over REST
//!
//! [`IdentityProvider`] is what the session service needs from an identity
//! platform: create accounts, sign in with a password or a Google ID token,
//! update the display name/photo and refresh expired ID tokens.
//! [`IdentityToolkit`] implements it against Google's REST endpoints.
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | [`sign_up`](IdentityProvider::sign_up) | `accounts:signUp` |
//! | [`sign_in`](IdentityProvider::sign_in) | `accounts:signInWithPassword` |
//! | [`sign_in_with_google`](IdentityProvider::sign_in_with_google) | `accounts:signInWithIdp` |
//! | [`update_profile`](IdentityProvider::update_profile) | `accounts:update` |
//! | [`refresh`](IdentityProvider::refresh) | `securetoken.googleapis.com/v1/token` |
//!
//! Provider error codes (`EMAIL_EXISTS`, `INVALID_PASSWORD`, ...) become
//! [`ApiError::Auth`] with a readable message.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::timer::with_timeout;
use crate::ApiError;

const IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com/v1";
const TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";
const DEFAULT_TOKEN_LIFETIME: i64 = 3600;
/// Tokens this close to expiry are refreshed before use.
const EXPIRY_SKEW_SECS: i64 = 60;

/// An authenticated identity and its credentials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthUser {
    /// Get display name, falling back to email if name is not set.
    pub fn display_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }
}

/// Result of a federated sign-in.
#[derive(Clone, Debug, PartialEq)]
pub struct SignInOutcome {
    pub user: AuthUser,
    pub is_new_user: bool,
}

pub trait IdentityProvider {
    fn sign_up(&self, email: &str, password: &str)
        -> impl Future<Output = Result<AuthUser, ApiError>>;

    fn sign_in(&self, email: &str, password: &str)
        -> impl Future<Output = Result<AuthUser, ApiError>>;

    /// Exchange a Google ID token obtained at `request_uri`.
    fn sign_in_with_google(
        &self,
        google_id_token: &str,
        request_uri: &str,
    ) -> impl Future<Output = Result<SignInOutcome, ApiError>>;

    /// Set display name and/or photo on the identity record.
    fn update_profile(
        &self,
        user: &AuthUser,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> impl Future<Output = Result<AuthUser, ApiError>>;

    /// Exchange the refresh token for a new ID token.
    fn refresh(&self, user: &AuthUser) -> impl Future<Output = Result<AuthUser, ApiError>>;
}

/// Firebase Identity Toolkit REST client.
#[derive(Clone, Debug)]
pub struct IdentityToolkit {
    http: Client,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, alias = "profilePicture")]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    is_new_user: bool,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

fn expiry(now: DateTime<Utc>, expires_in: Option<&str>) -> DateTime<Utc> {
    let secs = expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME);
    now + chrono::Duration::seconds(secs)
}

impl AccountResponse {
    /// Build the signed-in user; missing tokens are taken from `previous`.
    fn into_user(self, previous: Option<&AuthUser>, now: DateTime<Utc>) -> Result<AuthUser, ApiError> {
        let id_token = match (self.id_token, previous) {
            (Some(token), _) => token,
            (None, Some(prev)) => prev.id_token.clone(),
            (None, None) => return Err(ApiError::Decode("response carried no ID token".into())),
        };
        let refresh_token = self
            .refresh_token
            .or_else(|| previous.map(|p| p.refresh_token.clone()))
            .unwrap_or_default();
        let expires_at = match (self.expires_in.as_deref(), previous) {
            (None, Some(prev)) => prev.expires_at,
            (expires_in, _) => expiry(now, expires_in),
        };
        Ok(AuthUser {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name.filter(|n| !n.is_empty()),
            photo_url: self.photo_url.filter(|u| !u.is_empty()),
            id_token,
            refresh_token,
            expires_at,
        })
    }
}

/// Readable text for an Identity Toolkit error message such as `"WEAK_PASSWORD : ..."`.
pub fn friendly_auth_message(raw: &str) -> String {
    let code = raw.split([' ', ':']).next().unwrap_or_default();
    match code {
        "EMAIL_EXISTS" => "An account with this email already exists".to_string(),
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Invalid email or password".to_string()
        }
        "INVALID_EMAIL" => "Please enter a valid email address".to_string(),
        "WEAK_PASSWORD" => "Password must be at least 6 characters".to_string(),
        "USER_DISABLED" => "This account has been disabled".to_string(),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Please try again later".to_string(),
        "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
            "Your session has expired. Please sign in again".to_string()
        }
        "" => "Authentication failed".to_string(),
        other => format!("Authentication failed ({})", other),
    }
}

impl IdentityToolkit {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", IDENTITY_BASE, method, self.api_key)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        with_timeout(self.timeout, async {
            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<T>().await?);
            }
            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => {
                    tracing::warn!("identity provider rejected request: {}", envelope.error.message);
                    Err(ApiError::Auth(friendly_auth_message(&envelope.error.message)))
                }
                Err(_) => Err(ApiError::from_status(status.as_u16(), &body)),
            }
        })
        .await
    }

    async fn account(&self, method: &str, body: serde_json::Value) -> Result<AccountResponse, ApiError> {
        self.post(self.http.post(self.endpoint(method)).json(&body))
            .await
    }
}

impl IdentityProvider for IdentityToolkit {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        self.account("signUp", body).await?.into_user(None, Utc::now())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ApiError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        self.account("signInWithPassword", body)
            .await?
            .into_user(None, Utc::now())
    }

    async fn sign_in_with_google(
        &self,
        google_id_token: &str,
        request_uri: &str,
    ) -> Result<SignInOutcome, ApiError> {
        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", google_id_token)
            .append_pair("providerId", "google.com")
            .finish();
        let body = json!({
            "postBody": post_body,
            "requestUri": request_uri,
            "returnIdpCredential": true,
            "returnSecureToken": true,
        });
        let response = self.account("signInWithIdp", body).await?;
        let is_new_user = response.is_new_user;
        Ok(SignInOutcome {
            user: response.into_user(None, Utc::now())?,
            is_new_user,
        })
    }

    async fn update_profile(
        &self,
        user: &AuthUser,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<AuthUser, ApiError> {
        let mut body = json!({ "idToken": user.id_token, "returnSecureToken": true });
        if let Some(name) = display_name {
            body["displayName"] = json!(name);
        }
        if let Some(url) = photo_url {
            body["photoUrl"] = json!(url);
        }
        self.account("update", body)
            .await?
            .into_user(Some(user), Utc::now())
    }

    async fn refresh(&self, user: &AuthUser) -> Result<AuthUser, ApiError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", user.refresh_token.as_str()),
        ];
        let url = format!("{}?key={}", TOKEN_URL, self.api_key);
        let token: TokenResponse = self.post(self.http.post(url).form(&form)).await?;
        Ok(AuthUser {
            id_token: token.id_token,
            refresh_token: token.refresh_token,
            expires_at: expiry(Utc::now(), token.expires_in.as_deref()),
            ..user.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_account_response_into_user() {
        let response: AccountResponse = serde_json::from_str(
            r#"{
                "localId": "uid-1",
                "email": "ada@example.com",
                "displayName": "",
                "idToken": "id-1",
                "refreshToken": "refresh-1",
                "expiresIn": "3600",
                "isNewUser": true
            }"#,
        )
        .unwrap();
        assert!(response.is_new_user);

        let user = response.into_user(None, now()).unwrap();
        assert_eq!(user.uid, "uid-1");
        assert_eq!(user.display_name, None);
        assert_eq!(user.display_name(), "ada@example.com");
        assert_eq!(user.expires_at, now() + chrono::Duration::hours(1));
    }

    #[test]
    fn test_update_response_keeps_previous_tokens() {
        let previous = AuthUser {
            uid: "uid-1".into(),
            email: "ada@example.com".into(),
            display_name: None,
            photo_url: None,
            id_token: "old-id".into(),
            refresh_token: "old-refresh".into(),
            expires_at: now(),
        };
        let response: AccountResponse = serde_json::from_str(
            r#"{"localId": "uid-1", "email": "ada@example.com", "displayName": "Ada", "photoUrl": "https://img"}"#,
        )
        .unwrap();

        let user = response.into_user(Some(&previous), now()).unwrap();
        assert_eq!(user.id_token, "old-id");
        assert_eq!(user.refresh_token, "old-refresh");
        assert_eq!(user.display_name(), "Ada");
        assert_eq!(user.photo_url.as_deref(), Some("https://img"));
    }

    #[test]
    fn test_missing_token_is_decode_error() {
        let response: AccountResponse = serde_json::from_str(r#"{"localId": "u"}"#).unwrap();
        assert!(matches!(response.into_user(None, now()), Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_friendly_messages() {
        assert_eq!(friendly_auth_message("EMAIL_EXISTS"), "An account with this email already exists");
        assert_eq!(
            friendly_auth_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            "Password must be at least 6 characters"
        );
        assert_eq!(friendly_auth_message("INVALID_LOGIN_CREDENTIALS"), "Invalid email or password");
        assert_eq!(friendly_auth_message("QUOTA"), "Authentication failed (QUOTA)");
    }

    #[test]
    fn test_expiry_skew() {
        let user = AuthUser {
            uid: "u".into(),
            email: "e@x.io".into(),
            display_name: None,
            photo_url: None,
            id_token: "t".into(),
            refresh_token: "r".into(),
            expires_at: now() + chrono::Duration::seconds(30),
        };
        assert!(user.is_expired(now()));
        assert!(!user.is_expired(now() - chrono::Duration::minutes(5)));
    }
}
