//! # Application configuration: `ideady.toml` and environment
//!
//! [`IdeadyConfig`] carries everything the app needs to reach its collaborators:
//! the REST catalog origin, the Firebase project, feature flags and a few
//! timing knobs.
//!
//! ## Structure
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:5000"
//! request_timeout_secs = 10
//! health_timeout_secs = 5
//!
//! [firebase]
//! api_key = "..."
//! project_id = "ideady"
//! storage_bucket = "ideady.appspot.com"
//! google_client_id = "....apps.googleusercontent.com"
//! auth_redirect_uri = "http://localhost:8080/auth/google/callback"
//!
//! [features]
//! mock_backend = false
//!
//! [presence]
//! refresh_interval_secs = 30
//!
//! [listing]
//! default_page_size = 20
//! debounce_millis = 1000
//! ```
//!
//! ## Sources
//!
//! | Constructor | Reads |
//! |-------------|-------|
//! | [`IdeadyConfig::from_toml`] | TOML text |
//! | [`IdeadyConfig::from_lookup`] | any key → value function (used by the two below) |
//! | [`IdeadyConfig::from_env`] | process environment, after loading `.env` (native only) |
//! | [`IdeadyConfig::compiled`] | variables captured at build time with `option_env!` (wasm) |
//!
//! A config without Firebase credentials always runs against the mock backend.

use serde::{Deserialize, Serialize};

pub const ENV_API_URL: &str = "IDEADY_API_URL";
pub const ENV_FIREBASE_API_KEY: &str = "IDEADY_FIREBASE_API_KEY";
pub const ENV_FIREBASE_PROJECT_ID: &str = "IDEADY_FIREBASE_PROJECT_ID";
pub const ENV_FIREBASE_STORAGE_BUCKET: &str = "IDEADY_FIREBASE_STORAGE_BUCKET";
pub const ENV_GOOGLE_CLIENT_ID: &str = "IDEADY_GOOGLE_CLIENT_ID";
pub const ENV_AUTH_REDIRECT_URI: &str = "IDEADY_AUTH_REDIRECT_URI";
pub const ENV_MOCK_BACKEND: &str = "IDEADY_MOCK_BACKEND";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeadyConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

/// REST catalog API settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_health_timeout() -> u64 {
    5
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            health_timeout_secs: default_health_timeout(),
        }
    }
}

/// Firebase project settings. Empty strings mean "not configured".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(default)]
    pub google_client_id: String,
    #[serde(default)]
    pub auth_redirect_uri: String,
}

impl FirebaseConfig {
    /// Whether enough is set to talk to a real project.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.project_id.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Serve catalog, identity and profiles from memory.
    #[serde(default)]
    pub mock_backend: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// How often remote stores re-run the online-users query. 0 disables polling.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u32,
}

fn default_refresh_interval() -> u32 {
    30
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_debounce_millis")]
    pub debounce_millis: u64,
}

fn default_page_size() -> u32 {
    20
}

fn default_debounce_millis() -> u64 {
    1000
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            debounce_millis: default_debounce_millis(),
        }
    }
}

impl IdeadyConfig {
    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Build from a key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.api.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(v) = get(ENV_FIREBASE_API_KEY) {
            config.firebase.api_key = v;
        }
        if let Some(v) = get(ENV_FIREBASE_PROJECT_ID) {
            config.firebase.project_id = v;
        }
        if let Some(v) = get(ENV_FIREBASE_STORAGE_BUCKET) {
            config.firebase.storage_bucket = v;
        }
        if let Some(v) = get(ENV_GOOGLE_CLIENT_ID) {
            config.firebase.google_client_id = v;
        }
        if let Some(v) = get(ENV_AUTH_REDIRECT_URI) {
            config.firebase.auth_redirect_uri = v;
        }
        if let Some(v) = get(ENV_MOCK_BACKEND) {
            config.features.mock_backend = matches!(v.as_str(), "1" | "true" | "yes" | "on");
        }
        config
    }

    /// Read from the process environment, loading `.env` first.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Variables captured when the crate was compiled.
    pub fn compiled() -> Self {
        Self::from_lookup(|key| {
            let value = match key {
                ENV_API_URL => option_env!("IDEADY_API_URL"),
                ENV_FIREBASE_API_KEY => option_env!("IDEADY_FIREBASE_API_KEY"),
                ENV_FIREBASE_PROJECT_ID => option_env!("IDEADY_FIREBASE_PROJECT_ID"),
                ENV_FIREBASE_STORAGE_BUCKET => option_env!("IDEADY_FIREBASE_STORAGE_BUCKET"),
                ENV_GOOGLE_CLIENT_ID => option_env!("IDEADY_GOOGLE_CLIENT_ID"),
                ENV_AUTH_REDIRECT_URI => option_env!("IDEADY_AUTH_REDIRECT_URI"),
                ENV_MOCK_BACKEND => option_env!("IDEADY_MOCK_BACKEND"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    /// Whether the app should use the in-memory backend.
    pub fn use_mock_backend(&self) -> bool {
        self.features.mock_backend || !self.firebase.is_configured()
    }

    /// Builder method to force the mock backend.
    pub fn with_mock_backend(mut self, on: bool) -> Self {
        self.features.mock_backend = on;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = IdeadyConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.api.health_timeout_secs, 5);
        assert_eq!(config.listing.default_page_size, 20);
        assert_eq!(config.listing.debounce_millis, 1000);
        assert!(config.use_mock_backend());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = IdeadyConfig::from_toml(
            r#"
            [api]
            base_url = "https://api.ideady.dev"

            [firebase]
            api_key = "key"
            project_id = "ideady"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.ideady.dev");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.presence.refresh_interval_secs, 30);
        assert!(!config.use_mock_backend());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = IdeadyConfig::default().with_mock_backend(true);
        let text = config.to_toml().unwrap();
        assert_eq!(IdeadyConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_API_URL, "https://api.example.com/"),
            (ENV_FIREBASE_API_KEY, "abc"),
            (ENV_FIREBASE_PROJECT_ID, "proj"),
            (ENV_MOCK_BACKEND, "true"),
            (ENV_GOOGLE_CLIENT_ID, "   "),
        ]);
        let config = IdeadyConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.firebase.api_key, "abc");
        assert!(config.firebase.google_client_id.is_empty());
        assert!(config.features.mock_backend);
        assert!(config.use_mock_backend());
    }
}
