use api::auth::ProfileEdit;
use api::storage::Upload;
use api::validation::validate_profile;
use dioxus::prelude::*;
use store::UserProfile;
use ui::icons::FaArrowLeft;
use ui::{category_names, complete_sign_in, use_auth, use_backend, use_categories, use_languages};
use ui::{Avatar, FilePicker, Icon, ProtectedRoute};

use crate::Route;

/// Add `value` if absent, remove it if present.
fn toggle(list: &mut Vec<String>, value: &str) {
    match list.iter().position(|v| v == value) {
        Some(i) => {
            list.remove(i);
        }
        None => list.push(value.to_string()),
    }
}

/// Blank input leaves the stored field as it was.
fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Clone, Debug, Default, PartialEq)]
struct ProfileFormState {
    display_name: String,
    full_name: String,
    bio: String,
    location: String,
    website: String,
    preferred_categories: Vec<String>,
    language_preferences: Vec<String>,
}

impl From<&UserProfile> for ProfileFormState {
    fn from(profile: &UserProfile) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            full_name: profile.full_name.clone().unwrap_or_default(),
            bio: profile.bio.clone().unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
            website: profile.website.clone().unwrap_or_default(),
            preferred_categories: profile.preferred_categories.clone(),
            language_preferences: profile.language_preferences.clone(),
        }
    }
}

impl ProfileFormState {
    fn to_edit(&self, avatar: Option<Upload>, cv: Option<Upload>) -> ProfileEdit {
        ProfileEdit {
            display_name: Some(self.display_name.trim().to_string()),
            full_name: optional(&self.full_name),
            bio: optional(&self.bio),
            location: optional(&self.location),
            website: optional(&self.website),
            preferred_categories: Some(self.preferred_categories.clone()),
            language_preferences: Some(self.language_preferences.clone()),
            avatar,
            cv,
        }
    }
}

fn chip_class(selected: bool) -> &'static str {
    if selected {
        "chip chip--selected"
    } else {
        "chip"
    }
}

#[component]
pub fn EditProfile() -> Element {
    rsx! {
        ProtectedRoute {
            EditProfileForm {}
        }
    }
}

#[component]
fn EditProfileForm() -> Element {
    let auth = use_auth();
    let backend = use_backend();
    let nav = use_navigator();
    let categories = use_categories();
    let languages = use_languages();

    let mut form = use_signal(|| {
        let state = auth.peek();
        let mut initial = state
            .profile
            .as_ref()
            .map(ProfileFormState::from)
            .unwrap_or_default();
        if initial.display_name.trim().is_empty() {
            initial.display_name = state.display_name();
        }
        initial
    });
    let mut avatar = use_signal(|| Option::<Upload>::None);
    let mut cv = use_signal(|| Option::<Upload>::None);
    let mut error = use_signal(|| Option::<String>::None);
    let mut success = use_signal(|| false);
    let mut saving = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let backend = backend.clone();
        spawn(async move {
            error.set(None);
            success.set(false);

            let current = form();
            let errors = validate_profile(&current.display_name, &current.website);
            if let Some(message) = errors.first() {
                error.set(Some(message.to_string()));
                return;
            }
            let Some(user) = auth.peek().user.clone() else {
                nav.replace(Route::Login {});
                return;
            };

            saving.set(true);
            let edit = current.to_edit(avatar(), cv());
            match backend.session.update_user_profile(&user, edit).await {
                Ok(signed_in) => {
                    tracing::info!(uid = %signed_in.user.uid, "profile updated");
                    complete_sign_in(auth, signed_in);
                    success.set(true);
                    nav.push(Route::Profile {});
                }
                Err(e) => {
                    tracing::error!("failed to update profile: {}", e);
                    error.set(Some(e.user_message()));
                }
            }
            saving.set(false);
        });
    };

    let state = auth();
    let email = state.user.as_ref().map(|u| u.email.clone()).unwrap_or_default();
    let current_cv = state.profile.as_ref().and_then(|p| p.cv_url.clone());
    let preview = state.photo_url();
    let values = form();

    let category_list = category_names(&categories);
    let language_list = match &*languages.read() {
        Some(Ok(list)) => list.iter().map(|l| l.name.clone()).collect::<Vec<_>>(),
        _ => Vec::new(),
    };

    rsx! {
        div {
            class: "profile",
            div {
                class: "profile__header",
                div {
                    Link {
                        class: "back-link",
                        to: Route::Profile {},
                        Icon { icon: FaArrowLeft, width: 14, height: 14 }
                        span { "Back to Profile" }
                    }
                    h1 { class: "page-title", "Edit Profile" }
                }
            }

            if let Some(message) = error() {
                div { class: "alert alert--error", "{message}" }
            }
            if success() {
                div { class: "alert alert--success", "Profile updated successfully!" }
            }

            form {
                class: "form profile__card",
                onsubmit: handle_submit,

                div {
                    class: "profile__identity",
                    Avatar { url: preview, alt: values.display_name.clone(), size: 80 }
                    FilePicker {
                        id: "avatar",
                        label: "Profile Photo",
                        accept: "image/*",
                        selected: avatar().map(|f| f.file_name),
                        on_pick: move |file| avatar.set(Some(file)),
                    }
                }

                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "displayName", "Display Name" }
                    input {
                        id: "displayName",
                        class: "form-input",
                        required: true,
                        disabled: saving(),
                        value: "{values.display_name}",
                        oninput: move |e| form.write().display_name = e.value(),
                    }
                }
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "fullName", "Full Name" }
                    input {
                        id: "fullName",
                        class: "form-input",
                        disabled: saving(),
                        value: "{values.full_name}",
                        oninput: move |e| form.write().full_name = e.value(),
                    }
                }
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "email", "Email" }
                    input {
                        id: "email",
                        class: "form-input",
                        disabled: true,
                        value: "{email}",
                    }
                    p { class: "form-hint", "Email cannot be changed" }
                }
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "bio", "Bio" }
                    textarea {
                        id: "bio",
                        class: "form-input",
                        rows: "4",
                        disabled: saving(),
                        value: "{values.bio}",
                        oninput: move |e| form.write().bio = e.value(),
                    }
                }
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "location", "Location" }
                    input {
                        id: "location",
                        class: "form-input",
                        disabled: saving(),
                        value: "{values.location}",
                        oninput: move |e| form.write().location = e.value(),
                    }
                }
                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "website", "Website" }
                    input {
                        id: "website",
                        class: "form-input",
                        r#type: "url",
                        placeholder: "https://",
                        disabled: saving(),
                        value: "{values.website}",
                        oninput: move |e| form.write().website = e.value(),
                    }
                }

                div {
                    class: "form-field",
                    span { class: "form-label", "Preferred Categories" }
                    div {
                        class: "chip-list",
                        for name in category_list {
                            button {
                                key: "{name}",
                                r#type: "button",
                                class: chip_class(values.preferred_categories.contains(&name)),
                                onclick: {
                                    let name = name.clone();
                                    move |_| toggle(&mut form.write().preferred_categories, &name)
                                },
                                "{name}"
                            }
                        }
                    }
                }
                div {
                    class: "form-field",
                    span { class: "form-label", "Languages" }
                    div {
                        class: "chip-list",
                        for name in language_list {
                            button {
                                key: "{name}",
                                r#type: "button",
                                class: chip_class(values.language_preferences.contains(&name)),
                                onclick: {
                                    let name = name.clone();
                                    move |_| toggle(&mut form.write().language_preferences, &name)
                                },
                                "{name}"
                            }
                        }
                    }
                }

                FilePicker {
                    id: "cv",
                    label: "CV",
                    accept: ".pdf,.doc,.docx",
                    selected: cv().map(|f| f.file_name),
                    on_pick: move |file| cv.set(Some(file)),
                }
                if let Some(url) = current_cv {
                    p {
                        class: "form-hint",
                        "Current CV: "
                        a { href: "{url}", target: "_blank", rel: "noopener noreferrer", "View" }
                    }
                }

                div {
                    class: "form-actions",
                    Link { class: "btn btn--secondary", to: Route::Profile {}, "Cancel" }
                    button {
                        class: "btn btn--primary",
                        r#type: "submit",
                        disabled: saving(),
                        if saving() { "Saving..." } else { "Update Profile" }
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
    fn test_toggle_adds_then_removes() {
        let mut list = vec!["Technology".to_string()];
        toggle(&mut list, "Health");
        assert_eq!(list, vec!["Technology", "Health"]);
        toggle(&mut list, "Technology");
        assert_eq!(list, vec!["Health"]);
    }

    #[test]
    fn test_blank_fields_are_not_sent() {
        let state = ProfileFormState {
            display_name: "  Ada  ".into(),
            bio: "   ".into(),
            website: "https://ada.dev".into(),
            ..ProfileFormState::default()
        };
        let edit = state.to_edit(None, None);
        assert_eq!(edit.display_name.as_deref(), Some("Ada"));
        assert_eq!(edit.bio, None);
        assert_eq!(edit.website.as_deref(), Some("https://ada.dev"));
        assert_eq!(edit.preferred_categories, Some(Vec::new()));
    }
}
