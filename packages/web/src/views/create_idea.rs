use api::models::IdeaDraft;
use api::{ApiError, CatalogApi};
use dioxus::prelude::*;
use ui::{id_token, use_auth, use_backend, FormMode, IdeaForm, ProtectedRoute};

use crate::Route;

#[component]
pub fn CreateIdea() -> Element {
    rsx! {
        ProtectedRoute {
            CreateIdeaForm {}
        }
    }
}

#[component]
fn CreateIdeaForm() -> Element {
    let backend = use_backend();
    let auth = use_auth();
    let nav = use_navigator();
    let mut submitting = use_signal(|| false);
    let mut submit_error = use_signal(|| Option::<String>::None);

    let on_submit = move |draft: IdeaDraft| {
        let backend = backend.clone();
        spawn(async move {
            submitting.set(true);
            submit_error.set(None);
            let result = match id_token(auth, &backend).await {
                Ok(Some(token)) => backend.catalog.create_idea(&draft, &token).await,
                Ok(None) => Err(ApiError::Unauthorized(
                    "Please sign in to submit an idea".to_string(),
                )),
                Err(e) => Err(e),
            };
            submitting.set(false);
            match result {
                Ok(()) => {
                    tracing::info!(title = %draft.title, "idea submitted");
                    nav.push(Route::Success {});
                }
                Err(e) => {
                    tracing::error!("failed to create idea: {}", e);
                    submit_error.set(Some(e.user_message()));
                }
            }
        });
    };

    rsx! {
        IdeaForm {
            mode: FormMode::Create,
            on_submit: on_submit,
            submitting: submitting(),
            submit_error: submit_error(),
            on_cancel: move |_| {
                nav.push(Route::Ideas { filter: String::new(), creator: String::new() });
            },
        }
    }
}
