//! The signed-in user's own profile.
//!
//! Shares [`ProfileStats`] and [`count_ideas`] with the public profile page.

use api::query::{build_query, Filters, Scope};
use api::{ApiError, Backend, IdeaSource};
use dioxus::prelude::*;
use store::UserStats;
use ui::icons::{FaEnvelope, FaFileLines, FaGlobe, FaLocationDot, FaPencil, FaUser};
use ui::{id_token, use_auth, use_backend, Avatar, Icon, LoadingSkeleton, ProtectedRoute};

use crate::Route;

/// Number of ideas in `scope`. Mine uses the server count; a creator scope
/// counts the owned ideas in one batch.
pub(crate) async fn count_ideas(
    backend: &Backend,
    scope: &Scope,
    token: Option<&str>,
) -> Result<u32, ApiError> {
    let query = build_query(&Filters::default(), 1, 1, scope);
    let response = backend.catalog.list_ideas(&query, token).await?;
    Ok(match scope.creator() {
        Some(uid) => {
            let owned = response.ideas.iter().filter(|i| i.is_owned_by(uid)).count();
            u32::try_from(owned).unwrap_or(u32::MAX)
        }
        None => response.pagination.total_count,
    })
}

#[component]
pub(crate) fn ProfileStats(stats: Option<UserStats>) -> Element {
    let Some(stats) = stats else {
        return rsx! { LoadingSkeleton {} };
    };
    rsx! {
        div {
            class: "profile__stats",
            div { class: "profile__stat", strong { "{stats.ideas_submitted}" } span { "Ideas Submitted" } }
            div { class: "profile__stat", strong { "{stats.offers_received}" } span { "Offers Received" } }
            div { class: "profile__stat", strong { "{stats.offers_made}" } span { "Offers Made" } }
            div { class: "profile__stat", strong { "{stats.ideas_purchased}" } span { "Ideas Purchased" } }
        }
    }
}

#[component]
pub(crate) fn ProfileField(icon: Element, label: String, children: Element) -> Element {
    rsx! {
        div {
            class: "profile__field",
            span { class: "profile__label", {icon} " {label}" }
            div { class: "profile__value", {children} }
        }
    }
}

#[component]
pub(crate) fn TagList(title: String, tags: Vec<String>) -> Element {
    rsx! {
        div {
            class: "profile__field",
            span { class: "profile__label", "{title}" }
            if tags.is_empty() {
                p { class: "form-hint", "None selected" }
            } else {
                div {
                    class: "tag-list",
                    for tag in tags {
                        span { key: "{tag}", class: "badge", "{tag}" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn Profile() -> Element {
    rsx! {
        ProtectedRoute {
            OwnProfile {}
        }
    }
}

#[component]
fn OwnProfile() -> Element {
    let auth = use_auth();
    let backend = use_backend();

    let stats = use_resource(move || {
        let backend = backend.clone();
        async move {
            let stored = auth.read().profile.as_ref().and_then(|p| p.stats);
            let token = id_token(auth, &backend).await.ok().flatten();
            let submitted = match count_ideas(&backend, &Scope::Mine, token.as_deref()).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!("failed to count own ideas: {}", e);
                    0
                }
            };
            UserStats {
                ideas_submitted: submitted,
                ..stored.unwrap_or_default()
            }
        }
    });

    let state = auth();
    let Some(user) = state.user.clone() else {
        return rsx! {};
    };
    let profile = state.profile.clone().unwrap_or_default();
    let name = state.display_name();
    let photo = state.photo_url();
    let member_since = profile
        .created_at
        .map(|t| t.format("%B %-d, %Y").to_string());

    rsx! {
        div {
            class: "profile",
            div {
                class: "profile__header",
                div {
                    h1 { class: "page-title", "Your Profile" }
                    p { class: "page-subtitle", "View your personal information and activity" }
                }
                Link {
                    class: "btn btn--primary",
                    to: Route::EditProfile {},
                    Icon { icon: FaPencil, width: 14, height: 14 }
                    span { "Edit Profile" }
                }
            }

            div {
                class: "profile__card",
                h2 { "Basic Information" }
                div {
                    class: "profile__identity",
                    Avatar { url: photo, alt: name.clone(), size: 96 }
                    div {
                        h3 { "{name}" }
                        if let Some(since) = member_since {
                            p { class: "form-hint", "Member since {since}" }
                        }
                    }
                }
                if let Some(full) = profile.full_name.clone() {
                    ProfileField {
                        icon: rsx! { Icon { icon: FaUser, width: 12, height: 12 } },
                        label: "Full Name",
                        "{full}"
                    }
                }
                ProfileField {
                    icon: rsx! { Icon { icon: FaEnvelope, width: 12, height: 12 } },
                    label: "Email Address",
                    "{user.email}"
                }
                if let Some(location) = profile.location.clone() {
                    ProfileField {
                        icon: rsx! { Icon { icon: FaLocationDot, width: 12, height: 12 } },
                        label: "Location",
                        "{location}"
                    }
                }
                if let Some(website) = profile.website.clone() {
                    ProfileField {
                        icon: rsx! { Icon { icon: FaGlobe, width: 12, height: 12 } },
                        label: "Website",
                        a { href: "{website}", target: "_blank", rel: "noopener noreferrer", "{website}" }
                    }
                }
                if let Some(bio) = profile.bio.clone() {
                    div { class: "profile__bio", h4 { "Bio" } p { "{bio}" } }
                }
                if let Some(cv) = profile.cv_url.clone() {
                    ProfileField {
                        icon: rsx! { Icon { icon: FaFileLines, width: 12, height: 12 } },
                        label: "CV",
                        a { href: "{cv}", target: "_blank", rel: "noopener noreferrer", "View CV" }
                    }
                }
            }

            div {
                class: "profile__card",
                h2 { "Preferences" }
                TagList { title: "Preferred Categories", tags: profile.preferred_categories.clone() }
                TagList { title: "Languages", tags: profile.language_preferences.clone() }
            }

            div {
                class: "profile__card",
                h2 { "Activity" }
                ProfileStats { stats: stats() }
                Link {
                    class: "btn btn--secondary",
                    to: Route::Ideas { filter: api::query::MY_IDEAS_PARAM.to_string(), creator: String::new() },
                    "View My Ideas"
                }
            }
        }
    }
}
