use dioxus::prelude::*;

use crate::auth::use_auth;
use crate::{LoadingSpinner, SpinnerSize};

/// Renders `children` only for a signed-in user; anyone else is sent to `/login`.
#[component]
pub fn ProtectedRoute(children: Element) -> Element {
    let auth = use_auth();

    use_effect(move || {
        let state = auth();
        if !state.loading && state.user.is_none() {
            tracing::debug!("unauthenticated access, redirecting to login");
            navigator().replace("/login");
        }
    });

    let state = auth();
    if state.loading {
        return rsx! {
            LoadingSpinner { size: SpinnerSize::Large, text: "Checking your session...".to_string() }
        };
    }
    if state.user.is_none() {
        return rsx! {};
    }
    rsx! {
        {children}
    }
}
