use api::models::Idea;
use api::CatalogApi;
use dioxus::prelude::*;
use ui::icons::{FaArrowLeft, FaCalendar, FaFileLines, FaPencil, FaShieldHalved, FaTrash};
use ui::{
    id_token, use_auth, use_backend, ApiErrorDisplay, Avatar, Icon, LoadingSpinner, SpinnerSize,
};

use crate::Route;

/// Full details are hidden behind the NDA for everyone but the creator.
fn nda_locked(idea: &Idea, viewer: Option<&str>) -> bool {
    idea.require_nda && !viewer.is_some_and(|uid| idea.is_owned_by(uid))
}

#[component]
pub fn IdeaDetails(id: String) -> Element {
    let backend = use_backend();
    let auth = use_auth();
    let nav = use_navigator();
    let mut delete_error = use_signal(|| Option::<String>::None);
    let mut deleting = use_signal(|| false);
    let mut confirm_delete = use_signal(|| false);

    let fetch_backend = backend.clone();
    let mut idea = use_resource(use_reactive!(|id| {
        let backend = fetch_backend.clone();
        // Re-fetch when the viewer changes
        let _viewer = auth.read().uid().map(str::to_string);
        async move {
            let token = id_token(auth, &backend).await.ok().flatten();
            backend.catalog.get_idea(&id, token.as_deref()).await
        }
    }));

    let handle_delete = move |_| {
        let backend = backend.clone();
        let Some(Ok(current)) = idea.read().clone() else {
            return;
        };
        spawn(async move {
            deleting.set(true);
            delete_error.set(None);
            let result = match id_token(auth, &backend).await {
                Ok(Some(token)) => backend.catalog.delete_idea(&current.id, &token).await,
                Ok(None) => Err(api::ApiError::Unauthorized("Please sign in again".to_string())),
                Err(e) => Err(e),
            };
            deleting.set(false);
            confirm_delete.set(false);
            match result {
                Ok(()) => {
                    tracing::info!(id = %current.id, "idea deleted");
                    nav.push(Route::Ideas {
                        filter: String::new(),
                        creator: String::new(),
                    });
                }
                Err(e) => {
                    tracing::error!("failed to delete idea: {}", e);
                    delete_error.set(Some(e.user_message()));
                }
            }
        });
    };

    let current = match &*idea.read() {
        None => {
            return rsx! {
                LoadingSpinner { size: SpinnerSize::Large, text: "Loading idea details...".to_string() }
            };
        }
        Some(Err(e)) => {
            return rsx! {
                ApiErrorDisplay {
                    error: e.clone(),
                    item_name: "idea",
                    back_url: "/ideas",
                    on_retry: move |_| idea.restart(),
                }
            };
        }
        Some(Ok(found)) => found.clone(),
    };

    let viewer = auth().uid().map(str::to_string);
    let is_creator = viewer.as_deref().is_some_and(|uid| current.is_owned_by(uid));
    let locked = nda_locked(&current, viewer.as_deref());
    let creator = current.creator_name().to_string();
    let price = current.formatted_price();
    let created = current.created_date();
    let type_class = format!("badge badge--{}", current.idea_type.as_str().to_lowercase());

    rsx! {
        div {
            class: "idea-details",
            div {
                class: "idea-details__nav",
                div {
                    Link {
                        class: "back-link",
                        to: Route::Ideas { filter: String::new(), creator: String::new() },
                        Icon { icon: FaArrowLeft, width: 14, height: 14 }
                        span { "Back to Ideas" }
                    }
                    p { class: "page-subtitle", "View and explore this innovative idea" }
                }
                if is_creator {
                    div {
                        class: "idea-details__owner-actions",
                        Link {
                            class: "btn btn--secondary",
                            to: Route::EditIdea { id: current.id.clone() },
                            Icon { icon: FaPencil, width: 14, height: 14 }
                            span { "Edit" }
                        }
                        button {
                            class: "btn btn--danger",
                            onclick: move |_| confirm_delete.set(true),
                            Icon { icon: FaTrash, width: 14, height: 14 }
                            span { "Delete" }
                        }
                    }
                }
            }

            if let Some(message) = delete_error() {
                div { class: "alert alert--error", "{message}" }
            }

            div {
                class: "idea-details__card",
                div {
                    class: "idea-details__header",
                    div {
                        h1 { class: "idea-details__title", "{current.title}" }
                        p {
                            class: "idea-details__date",
                            Icon { icon: FaCalendar, width: 12, height: 12 }
                            span { " {created}" }
                        }
                    }
                    div { class: "price price--large", "{price}" }
                }
                div {
                    class: "idea-details__badges",
                    span { class: "{type_class}", "{current.idea_type}" }
                    span { class: "badge", "{current.category}" }
                    if current.require_nda {
                        span {
                            class: "badge badge--nda",
                            Icon { icon: FaShieldHalved, width: 10, height: 10 }
                            " NDA Required"
                        }
                    }
                }

                if locked {
                    div {
                        class: "idea-details__locked",
                        Icon { icon: FaFileLines, width: 48, height: 48 }
                        h3 { "NDA Required" }
                        p {
                            "This idea requires a Non-Disclosure Agreement to view full details. Please contact the creator to proceed."
                        }
                        h4 { "Contact Creator" }
                        Link {
                            class: "idea-details__creator",
                            to: Route::ProfileDetails { uid: current.creator.clone() },
                            Avatar { url: current.creator_info.photo_url.clone(), alt: creator.clone(), size: 48 }
                            div {
                                p { class: "idea-details__creator-name", "{creator}" }
                                p { class: "idea-details__creator-email", "{current.creator_info.email}" }
                                if let Some(pref) = current.contact_preference.clone() {
                                    p { "Preferred contact: {pref}" }
                                }
                            }
                        }
                    }
                } else {
                    div {
                        class: "idea-details__section",
                        h3 { "Problem Description" }
                        p { "{current.problem_description}" }
                    }
                    div {
                        class: "idea-details__section",
                        h3 { "Proposed Solution" }
                        p { "{current.solution_description}" }
                    }
                    if !current.photos.is_empty() {
                        div {
                            class: "idea-details__section",
                            h3 { "Photos" }
                            div {
                                class: "idea-details__photos",
                                for (n, photo) in (1..).zip(current.photos.iter()) {
                                    a {
                                        key: "{n}",
                                        href: "{photo}",
                                        target: "_blank",
                                        img { src: "{photo}", alt: "Idea photo {n}" }
                                    }
                                }
                            }
                        }
                    }
                    div {
                        class: "idea-details__meta",
                        if let Some(status) = current.protection_status.clone() {
                            p { strong { "Protection: " } "{status}" }
                        }
                        if let Some(pref) = current.contact_preference.clone() {
                            p { strong { "Preferred contact: " } "{pref}" }
                        }
                        if let Some(notes) = current.additional_notes.clone() {
                            p { strong { "Additional notes: " } "{notes}" }
                        }
                    }
                    div {
                        class: "idea-details__section",
                        h3 { "Creator" }
                        Link {
                            class: "idea-details__creator",
                            to: Route::ProfileDetails { uid: current.creator.clone() },
                            Avatar { url: current.creator_info.photo_url.clone(), alt: creator.clone(), size: 40 }
                            span { "{creator}" }
                        }
                    }
                }
            }

            if confirm_delete() {
                div {
                    class: "modal",
                    onclick: move |_| confirm_delete.set(false),
                    div {
                        class: "modal__dialog",
                        onclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                        h3 { "Delete Idea" }
                        p { "Are you sure you want to delete this idea? This action cannot be undone." }
                        div {
                            class: "form-actions",
                            button {
                                class: "btn btn--secondary",
                                disabled: deleting(),
                                onclick: move |_| confirm_delete.set(false),
                                "Cancel"
                            }
                            button {
                                class: "btn btn--danger",
                                disabled: deleting(),
                                onclick: handle_delete,
                                if deleting() { "Deleting..." } else { "Delete" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nda_hides_details_from_everyone_but_creator() {
        let idea = Idea {
            creator: "owner".into(),
            require_nda: true,
            ..Idea::default()
        };
        assert!(nda_locked(&idea, None));
        assert!(nda_locked(&idea, Some("someone")));
        assert!(!nda_locked(&idea, Some("owner")));

        let open = Idea {
            require_nda: false,
            ..idea
        };
        assert!(!nda_locked(&open, None));
    }
}
