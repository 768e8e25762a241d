use api::models::{Idea, IdeaDraft};
use api::{ApiError, CatalogApi};
use dioxus::prelude::*;
use ui::icons::FaArrowLeft;
use ui::{
    id_token, use_auth, use_backend, ApiErrorDisplay, FormMode, Icon, IdeaForm, LoadingSpinner,
    ProtectedRoute, SpinnerSize,
};

use crate::Route;

#[component]
pub fn EditIdea(id: String) -> Element {
    rsx! {
        ProtectedRoute {
            EditIdeaForm { id: id }
        }
    }
}

/// Only the creator may edit; anyone else gets an authorization error.
fn check_owner(idea: Idea, uid: Option<&str>) -> Result<Idea, ApiError> {
    match uid {
        Some(uid) if idea.is_owned_by(uid) => Ok(idea),
        _ => Err(ApiError::Unauthorized(
            "You are not authorized to edit this idea".to_string(),
        )),
    }
}

#[component]
fn EditIdeaForm(id: String) -> Element {
    let backend = use_backend();
    let auth = use_auth();
    let nav = use_navigator();
    let mut submitting = use_signal(|| false);
    let mut submit_error = use_signal(|| Option::<String>::None);

    let fetch_backend = backend.clone();
    let mut idea = use_resource(use_reactive!(|id| {
        let backend = fetch_backend.clone();
        async move {
            let token = id_token(auth, &backend).await?;
            let idea = backend.catalog.get_idea(&id, token.as_deref()).await?;
            let uid = auth.peek().uid().map(str::to_string);
            check_owner(idea, uid.as_deref())
        }
    }));

    let draft = match &*idea.read() {
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
                    back_url: "/ideas/{id}",
                    on_retry: move |_| idea.restart(),
                }
            };
        }
        Some(Ok(found)) => IdeaDraft::from(found),
    };

    let submit_id = id.clone();
    let on_submit = move |draft: IdeaDraft| {
        let backend = backend.clone();
        let id = submit_id.clone();
        spawn(async move {
            submitting.set(true);
            submit_error.set(None);
            let result = match id_token(auth, &backend).await {
                Ok(Some(token)) => backend.catalog.update_idea(&id, &draft, &token).await,
                Ok(None) => Err(ApiError::Unauthorized(
                    "Please sign in to update the idea".to_string(),
                )),
                Err(e) => Err(e),
            };
            submitting.set(false);
            match result {
                Ok(()) => {
                    tracing::info!(%id, "idea updated");
                    nav.push(Route::IdeaDetails { id });
                }
                Err(e) => {
                    tracing::error!("failed to update idea: {}", e);
                    submit_error.set(Some(e.user_message()));
                }
            }
        });
    };

    let cancel_id = id.clone();

    rsx! {
        div {
            class: "edit-idea",
            Link {
                class: "back-link",
                to: Route::IdeaDetails { id: id.clone() },
                Icon { icon: FaArrowLeft, width: 14, height: 14 }
                span { "Back to Idea" }
            }
            IdeaForm {
                mode: FormMode::Edit,
                initial: draft,
                on_submit: on_submit,
                submitting: submitting(),
                submit_error: submit_error(),
                on_cancel: move |_| {
                    nav.push(Route::IdeaDetails { id: cancel_id.clone() });
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_creator_may_edit() {
        let idea = Idea {
            id: "i1".into(),
            creator: "owner".into(),
            ..Idea::default()
        };
        assert!(check_owner(idea.clone(), Some("owner")).is_ok());
        assert!(matches!(
            check_owner(idea.clone(), Some("intruder")),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(check_owner(idea, None).is_err());
    }
}
