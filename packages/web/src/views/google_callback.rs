use dioxus::prelude::*;
use ui::platform::location_hash;
use ui::{complete_sign_in, finish_google_sign_in, take_google_pending, use_auth, use_backend};
use ui::{ErrorDisplay, LoadingSpinner, SpinnerSize};

use crate::Route;

/// Landing page for the Google redirect. Reads the token from the URL
/// fragment and exchanges it for a session.
#[component]
pub fn GoogleCallback() -> Element {
    let auth = use_auth();
    let backend = use_backend();
    let nav = use_navigator();
    let mut error = use_signal(|| Option::<String>::None);

    use_hook(move || {
        spawn(async move {
            let Some(pending) = take_google_pending() else {
                tracing::warn!("Google callback without a pending sign-in");
                error.set(Some("This sign-in link has expired. Please try again.".to_string()));
                return;
            };
            let fragment = location_hash();
            match finish_google_sign_in(&backend, &fragment, &pending).await {
                Ok(signed_in) => {
                    complete_sign_in(auth, signed_in);
                    nav.replace(Route::Ideas {
                        filter: String::new(),
                        creator: String::new(),
                    });
                }
                Err(e) => {
                    tracing::error!("Google sign-in failed: {}", e);
                    error.set(Some(e.user_message()));
                }
            }
        });
    });

    match error() {
        Some(message) => rsx! {
            ErrorDisplay {
                title: "Google Sign-In Failed",
                message: message,
                actions: vec![ui::error_display::ErrorAction::link(
                    "Back to Login",
                    "/login",
                    ui::error_display::ActionStyle::Primary,
                )],
            }
        },
        None => rsx! {
            LoadingSpinner { size: SpinnerSize::Large, text: "Completing sign-in...".to_string() }
        },
    }
}
