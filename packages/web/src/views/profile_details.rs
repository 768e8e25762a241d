//! Public profile of any user, reachable from idea cards and the online list.

use api::query::Scope;
use api::CatalogApi;
use dioxus::prelude::*;
use store::UserStats;
use ui::icons::{FaArrowLeft, FaGlobe, FaLocationDot, FaPencil, FaUser};
use ui::{use_auth, use_backend, ApiErrorDisplay, Avatar, Icon, LoadingSpinner, SpinnerSize};

use super::profile::{count_ideas, ProfileField, ProfileStats, TagList};
use crate::Route;

#[component]
pub fn ProfileDetails(uid: String) -> Element {
    let backend = use_backend();
    let auth = use_auth();

    let fetch_backend = backend.clone();
    let mut profile = use_resource(use_reactive!(|uid| {
        let backend = fetch_backend.clone();
        async move { backend.catalog.public_profile(&uid).await }
    }));

    let stats = use_resource(use_reactive!(|uid| {
        let backend = backend.clone();
        async move {
            let scope = Scope::Creator(uid);
            let submitted = match count_ideas(&backend, &scope, None).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!("failed to count ideas: {}", e);
                    0
                }
            };
            UserStats {
                ideas_submitted: submitted,
                ..UserStats::default()
            }
        }
    }));

    let found = match &*profile.read() {
        None => {
            return rsx! {
                LoadingSpinner { size: SpinnerSize::Large, text: "Loading profile...".to_string() }
            };
        }
        Some(Err(e)) => {
            return rsx! {
                ApiErrorDisplay {
                    error: e.clone(),
                    item_name: "profile",
                    back_url: "/",
                    on_retry: move |_| profile.restart(),
                }
            };
        }
        Some(Ok(found)) => found.clone(),
    };

    let is_own = auth().uid() == Some(uid.as_str());
    let name = if found.display_name.trim().is_empty() {
        store::models::ANONYMOUS.to_string()
    } else {
        found.display_name.clone()
    };

    rsx! {
        div {
            class: "profile",
            div {
                class: "profile__header",
                div {
                    Link {
                        class: "back-link",
                        to: Route::Home {},
                        Icon { icon: FaArrowLeft, width: 14, height: 14 }
                        span { "Back to Home" }
                    }
                    h1 { class: "page-title", "{name}'s Profile" }
                    p { class: "page-subtitle", "View user profile and activity" }
                }
                if is_own {
                    Link {
                        class: "btn btn--primary",
                        to: Route::EditProfile {},
                        Icon { icon: FaPencil, width: 14, height: 14 }
                        span { "Edit Profile" }
                    }
                }
            }

            div {
                class: "profile__card",
                h2 { "Basic Information" }
                div {
                    class: "profile__identity",
                    Avatar { url: found.photo_url.clone(), alt: name.clone(), size: 96 }
                    div {
                        h3 { "{name}" }
                        if found.is_online {
                            span { class: "online-badge", span { class: "online-dot" } " Online" }
                        }
                    }
                }
                ProfileField {
                    icon: rsx! { Icon { icon: FaUser, width: 12, height: 12 } },
                    label: "Display Name",
                    "{name}"
                }
                if let Some(location) = found.location.clone().filter(|l| !l.is_empty()) {
                    ProfileField {
                        icon: rsx! { Icon { icon: FaLocationDot, width: 12, height: 12 } },
                        label: "Location",
                        "{location}"
                    }
                }
                if let Some(website) = found.website.clone().filter(|w| !w.is_empty()) {
                    ProfileField {
                        icon: rsx! { Icon { icon: FaGlobe, width: 12, height: 12 } },
                        label: "Website",
                        a { href: "{website}", target: "_blank", rel: "noopener noreferrer", "{website}" }
                    }
                }
                if let Some(bio) = found.bio.clone().filter(|b| !b.is_empty()) {
                    div { class: "profile__bio", h4 { "Bio" } p { "{bio}" } }
                }
            }

            div {
                class: "profile__card",
                h2 { "Preferences" }
                TagList { title: "Preferred Categories", tags: found.preferred_categories.clone() }
                TagList { title: "Languages", tags: found.language_preferences.clone() }
            }

            div {
                class: "profile__card",
                h2 { "Activity" }
                ProfileStats { stats: stats() }
                Link {
                    class: "btn btn--secondary",
                    to: Route::Ideas { filter: String::new(), creator: uid.clone() },
                    "View Ideas by {name}"
                }
            }
        }
    }
}
