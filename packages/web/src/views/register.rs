//! Registration page view with email/password form.

use api::auth::SignupRequest;
use api::storage::Upload;
use api::validation::validate_signup;
use dioxus::prelude::*;
use ui::{complete_sign_in, use_auth, use_backend, FilePicker, GoogleSignInButton};

use crate::Route;

#[component]
pub fn Register() -> Element {
    let auth = use_auth();
    let backend = use_backend();
    let nav = use_navigator();
    let mut name = use_signal(String::new);
    let mut full_name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut avatar = use_signal(|| Option::<Upload>::None);
    let mut cv = use_signal(|| Option::<Upload>::None);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    use_effect(move || {
        let state = auth();
        if !state.loading && state.user.is_some() {
            nav.replace(Route::Home {});
        }
    });

    let handle_register = move |evt: FormEvent| {
        evt.prevent_default();
        let backend = backend.clone();
        spawn(async move {
            error.set(None);

            let n = name().trim().to_string();
            let e = email().trim().to_string();
            let p = password();
            let errors = validate_signup(&n, &e, &p, &confirm_password());
            if let Some(message) = errors.first() {
                error.set(Some(message.to_string()));
                return;
            }

            let full = full_name().trim().to_string();
            let request = SignupRequest {
                email: e,
                password: p,
                display_name: n,
                full_name: (!full.is_empty()).then_some(full),
                avatar: avatar(),
                cv: cv(),
            };

            loading.set(true);
            match backend.session.signup(request).await {
                Ok(signed_in) => {
                    complete_sign_in(auth, signed_in);
                    nav.push(Route::Home {});
                }
                Err(err) => {
                    tracing::error!("signup failed: {}", err);
                    error.set(Some(err.user_message()));
                }
            }
            loading.set(false);
        });
    };

    rsx! {
        div {
            class: "auth-card",
            h2 { class: "auth-card__title", "Join Ideady" }

            if let Some(message) = error() {
                div { class: "alert alert--error", "{message}" }
            }

            form {
                class: "form",
                onsubmit: handle_register,
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "displayName", "Display Name" }
                    input {
                        id: "displayName",
                        class: "form-input",
                        required: true,
                        disabled: loading(),
                        value: "{name}",
                        oninput: move |e| name.set(e.value()),
                    }
                }
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "fullName", "Full Name (optional)" }
                    input {
                        id: "fullName",
                        class: "form-input",
                        disabled: loading(),
                        value: "{full_name}",
                        oninput: move |e| full_name.set(e.value()),
                    }
                }
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
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "confirm-password", "Confirm Password" }
                    input {
                        id: "confirm-password",
                        class: "form-input",
                        r#type: "password",
                        required: true,
                        disabled: loading(),
                        value: "{confirm_password}",
                        oninput: move |e| confirm_password.set(e.value()),
                    }
                }
                FilePicker {
                    id: "avatar",
                    label: "Profile Photo (optional)",
                    accept: "image/*",
                    selected: avatar().map(|f| f.file_name),
                    on_pick: move |file| avatar.set(Some(file)),
                }
                FilePicker {
                    id: "cv",
                    label: "CV (optional)",
                    accept: ".pdf,.doc,.docx",
                    selected: cv().map(|f| f.file_name),
                    on_pick: move |file| cv.set(Some(file)),
                }
                button {
                    class: "btn btn--primary btn--block",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Creating Account..." } else { "Register" }
                }
            }

            div { class: "auth-card__divider", span { "Or continue with" } }

            GoogleSignInButton {
                class: "btn btn--secondary btn--block",
                label: "Sign up with Google",
                on_error: move |message| error.set(Some(message)),
            }

            p {
                class: "auth-card__switch",
                "Already have an account? "
                Link { to: Route::Login {}, "Login" }
            }
        }
    }
}
