//! Login page view with email/password and Google sign-in.

use api::validation::validate_login;
use dioxus::prelude::*;
use ui::{complete_sign_in, use_auth, use_backend, GoogleSignInButton};

use crate::Route;

#[component]
pub fn Login() -> Element {
    let auth = use_auth();
    let backend = use_backend();
    let nav = use_navigator();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    // Already signed in: nothing to do here
    use_effect(move || {
        let state = auth();
        if !state.loading && state.user.is_some() {
            nav.replace(Route::Home {});
        }
    });

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let backend = backend.clone();
        spawn(async move {
            error.set(None);
            let e = email().trim().to_string();
            let p = password();

            let errors = validate_login(&e, &p);
            if let Some(message) = errors.first() {
                error.set(Some(message.to_string()));
                return;
            }

            loading.set(true);
            match backend.session.login(&e, &p).await {
                Ok(signed_in) => {
                    complete_sign_in(auth, signed_in);
                    nav.push(Route::Home {});
                }
                Err(err) => {
                    tracing::error!("login failed: {}", err);
                    error.set(Some(err.user_message()));
                }
            }
            loading.set(false);
        });
    };

    rsx! {
        div {
            class: "auth-card",
            h2 { class: "auth-card__title", "Login to Ideady" }

            if let Some(message) = error() {
                div { class: "alert alert--error", "{message}" }
            }

            form {
                class: "form",
                onsubmit: handle_login,
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "email", "Email" }
                    input {
                        id: "email",
                        class: "form-input",
                        r#type: "email",
                        required: true,
                        disabled: loading(),
                        value: "{email}",
                        oninput: move |e| email.set(e.value()),
                    }
                }
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "password", "Password" }
                    input {
                        id: "password",
                        class: "form-input",
                        r#type: "password",
                        required: true,
                        disabled: loading(),
                        value: "{password}",
                        oninput: move |e| password.set(e.value()),
                    }
                }
                button {
                    class: "btn btn--primary btn--block",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Logging in..." } else { "Login" }
                }
            }

            div { class: "auth-card__divider", span { "Or continue with" } }

            GoogleSignInButton {
                class: "btn btn--secondary btn--block",
                label: "Sign in with Google",
                on_error: move |message| error.set(Some(message)),
            }

            p {
                class: "auth-card__switch",
                "Don't have an account? "
                Link { to: Route::Register {}, "Register" }
            }
        }
    }
}
