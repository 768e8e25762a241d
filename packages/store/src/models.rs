//! # Profile documents and presence projections
//!
//! Defines the per-user documents kept in the backing store (collection
//! `users`, keyed by the identity provider's user id) and the projections the UI
//! reads from them. Field names follow the stored camelCase document layout so
//! the same types deserialize from Firestore-decoded JSON and from the catalog
//! API's public profile endpoint.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`UserProfile`] | The full profile document. Created at signup, mutated by its owner and by the presence tracker. |
//! | [`ProfileUpdate`] | A partial, merge-semantics write. `None` fields are left untouched. |
//! | [`PublicProfile`] | The subset of a profile other users may read. |
//! | [`OnlineUser`] | One row of the live "who is online" query. |
//! | [`UserStats`] | Activity counters shown on profile pages. |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when a profile has none.
pub const ANONYMOUS: &str = "Anonymous";

/// Full profile document stored under `users/{uid}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Assigned by the store when the document is first written.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_online: bool,
    /// Assigned by the store on every presence write.
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub preferred_categories: Vec<String>,
    #[serde(default)]
    pub language_preferences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<UserStats>,
}

impl UserProfile {
    /// A fresh profile as written at signup: online, no timestamps yet.
    pub fn new(display_name: &str, email: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            email: email.to_string(),
            is_online: true,
            ..Self::default()
        }
    }

    /// Display name, falling back to [`ANONYMOUS`].
    pub fn display_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            ANONYMOUS
        } else {
            &self.display_name
        }
    }

    /// Apply a merge update in place, the way the backing store does.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(v) = &update.display_name {
            self.display_name = v.clone();
        }
        if let Some(v) = &update.full_name {
            self.full_name = Some(v.clone());
        }
        if let Some(v) = &update.photo_url {
            self.photo_url = Some(v.clone());
        }
        if let Some(v) = update.is_online {
            self.is_online = v;
        }
        if let Some(v) = &update.bio {
            self.bio = Some(v.clone());
        }
        if let Some(v) = &update.location {
            self.location = Some(v.clone());
        }
        if let Some(v) = &update.website {
            self.website = Some(v.clone());
        }
        if let Some(v) = &update.preferred_categories {
            self.preferred_categories = v.clone();
        }
        if let Some(v) = &update.language_preferences {
            self.language_preferences = v.clone();
        }
        if let Some(v) = &update.cv_url {
            self.cv_url = Some(v.clone());
        }
    }

    /// The part of the profile other users are allowed to see.
    pub fn to_public(&self) -> PublicProfile {
        PublicProfile {
            display_name: self.display_name().to_string(),
            photo_url: self.photo_url.clone().filter(|u| !u.is_empty()),
            is_online: self.is_online,
            bio: self.bio.clone(),
            location: self.location.clone(),
            website: self.website.clone(),
            preferred_categories: self.preferred_categories.clone(),
            language_preferences: self.language_preferences.clone(),
        }
    }
}

/// Partial profile write with merge semantics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_preferences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_url: Option<String>,
    /// Ask the store to set `lastSeen` to its own clock.
    #[serde(skip)]
    pub touch_last_seen: bool,
}

impl ProfileUpdate {
    /// Presence write: flip the online flag and stamp `lastSeen`.
    pub fn presence(online: bool) -> Self {
        Self {
            is_online: Some(online),
            touch_last_seen: true,
            ..Self::default()
        }
    }

    /// Whether the update carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.field_paths().is_empty() && !self.touch_last_seen
    }

    /// Stored field names touched by this update, in document order.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.display_name.is_some() {
            paths.push("displayName");
        }
        if self.full_name.is_some() {
            paths.push("fullName");
        }
        if self.photo_url.is_some() {
            paths.push("photoURL");
        }
        if self.is_online.is_some() {
            paths.push("isOnline");
        }
        if self.bio.is_some() {
            paths.push("bio");
        }
        if self.location.is_some() {
            paths.push("location");
        }
        if self.website.is_some() {
            paths.push("website");
        }
        if self.preferred_categories.is_some() {
            paths.push("preferredCategories");
        }
        if self.language_preferences.is_some() {
            paths.push("languagePreferences");
        }
        if self.cv_url.is_some() {
            paths.push("cvUrl");
        }
        paths
    }
}

/// Public subset of a profile, as served by `GET /api/ideas/user/:id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub preferred_categories: Vec<String>,
    #[serde(default)]
    pub language_preferences: Vec<String>,
}

/// A user currently flagged online.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUser {
    pub id: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl OnlineUser {
    pub fn from_profile(id: &str, profile: &UserProfile) -> Self {
        Self {
            id: id.to_string(),
            display_name: profile.display_name().to_string(),
            photo_url: profile.photo_url.clone().filter(|u| !u.is_empty()),
            last_seen: profile.last_seen,
        }
    }
}

/// Activity counters shown on profile pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub ideas_submitted: u32,
    pub offers_received: u32,
    pub offers_made: u32,
    pub ideas_purchased: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut profile = UserProfile::new("ada", "ada@example.com");
        profile.bio = Some("old".to_string());

        profile.apply(&ProfileUpdate {
            location: Some("Paris".to_string()),
            ..ProfileUpdate::default()
        });

        assert_eq!(profile.display_name, "ada");
        assert_eq!(profile.bio.as_deref(), Some("old"));
        assert_eq!(profile.location.as_deref(), Some("Paris"));
    }

    #[test]
    fn test_presence_update_field_paths() {
        let update = ProfileUpdate::presence(false);
        assert_eq!(update.field_paths(), vec!["isOnline"]);
        assert!(update.touch_last_seen);
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_public_projection_hides_private_fields() {
        let mut profile = UserProfile::new("", "hidden@example.com");
        profile.full_name = Some("Hidden Name".to_string());
        profile.photo_url = Some(String::new());

        let public = profile.to_public();
        assert_eq!(public.display_name, ANONYMOUS);
        assert!(public.photo_url.is_none());
    }
}
