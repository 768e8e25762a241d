//! Create/edit form for ideas with inline per-field validation.

use api::models::{IdeaDraft, IdeaType};
use api::validation::{parse_price, validate_idea, FieldErrors, CONTACT_PREFERENCES, PROTECTIONS};
use dioxus::prelude::*;

use crate::icons::{FaFloppyDisk, FaPlus, FaTriangleExclamation};
use crate::services::{category_names, use_categories};
use crate::{Icon, LoadingSpinner, SpinnerSize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Raw input values. Everything is kept as typed so a half-entered price
/// survives re-renders.
#[derive(Clone, Debug, PartialEq)]
pub struct IdeaFormState {
    pub title: String,
    pub category: String,
    pub idea_type: String,
    pub problem_description: String,
    pub solution_description: String,
    pub protection_status: String,
    pub require_nda: bool,
    pub desired_price: String,
    pub contact_preference: String,
    pub additional_notes: String,
    pub photos: Vec<String>,
}

impl Default for IdeaFormState {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            idea_type: IdeaType::Product.to_string(),
            problem_description: String::new(),
            solution_description: String::new(),
            protection_status: "None".to_string(),
            require_nda: false,
            desired_price: String::new(),
            contact_preference: String::new(),
            additional_notes: String::new(),
            photos: Vec::new(),
        }
    }
}

impl From<&IdeaDraft> for IdeaFormState {
    fn from(draft: &IdeaDraft) -> Self {
        Self {
            title: draft.title.clone(),
            category: draft.category.clone(),
            idea_type: draft.idea_type.unwrap_or_default().to_string(),
            problem_description: draft.problem_description.clone(),
            solution_description: draft.solution_description.clone(),
            protection_status: if draft.protection_status.is_empty() {
                "None".to_string()
            } else {
                draft.protection_status.clone()
            },
            require_nda: draft.require_nda,
            desired_price: draft.desired_price.map(|p| p.to_string()).unwrap_or_default(),
            contact_preference: if draft.contact_preference.is_empty() {
                "Email".to_string()
            } else {
                draft.contact_preference.clone()
            },
            additional_notes: draft.additional_notes.clone().unwrap_or_default(),
            photos: draft.photos.clone(),
        }
    }
}

impl IdeaFormState {
    pub fn to_draft(&self) -> IdeaDraft {
        let notes = self.additional_notes.trim();
        IdeaDraft {
            title: self.title.trim().to_string(),
            category: self.category.clone(),
            idea_type: self.idea_type.parse().ok(),
            problem_description: self.problem_description.trim().to_string(),
            solution_description: self.solution_description.trim().to_string(),
            protection_status: self.protection_status.clone(),
            require_nda: self.require_nda,
            desired_price: parse_price(&self.desired_price),
            contact_preference: self.contact_preference.clone(),
            additional_notes: (!notes.is_empty()).then(|| notes.to_string()),
            photos: self.photos.clone(),
        }
    }
}

#[component]
fn FieldError(errors: Signal<FieldErrors>, field: &'static str) -> Element {
    let message = errors.read().get(field).map(str::to_string);
    match message {
        Some(message) => rsx! {
            p { class: "form-error", "{message}" }
        },
        None => rsx! {},
    }
}

#[component]
pub fn IdeaForm(
    mode: FormMode,
    #[props(default)] initial: Option<IdeaDraft>,
    on_submit: EventHandler<IdeaDraft>,
    #[props(default)] submitting: bool,
    #[props(default)] submit_error: Option<String>,
    #[props(default)] on_cancel: Option<EventHandler<()>>,
) -> Element {
    let categories = use_categories();
    let mut form = use_signal(|| initial.as_ref().map(IdeaFormState::from).unwrap_or_default());
    let mut errors = use_signal(FieldErrors::default);

    let categories_loading = categories.read().is_none();
    let categories_failed = matches!(&*categories.read(), Some(Err(_)));
    let names = category_names(&categories);

    let (heading, blurb) = match mode {
        FormMode::Create => (
            "Submit Your Idea",
            "Share your innovative idea with potential investors and collaborators",
        ),
        FormMode::Edit => ("Edit Your Idea", "Update your idea details and information"),
    };

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let draft = form.read().to_draft();
        let found = validate_idea(&draft);
        if found.is_empty() {
            errors.set(FieldErrors::default());
            on_submit.call(draft);
        } else {
            tracing::debug!(count = found.len(), "idea form has errors");
            errors.set(found);
        }
    };

    let state = form();

    rsx! {
        div {
            class: "idea-form",
            h1 { class: "page-title", "{heading}" }
            p { class: "page-subtitle", "{blurb}" }

            if let Some(message) = submit_error {
                div {
                    class: "alert alert--error",
                    Icon { icon: FaTriangleExclamation, width: 16, height: 16 }
                    span { "{message}" }
                }
            }
            if categories_failed {
                div {
                    class: "alert alert--warning",
                    "Warning: Failed to load categories. Please refresh the page."
                }
            }

            form {
                class: "form",
                onsubmit: onsubmit,

                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "title", "Title *" }
                    input {
                        id: "title",
                        class: "form-input",
                        placeholder: "Enter a catchy title for your idea",
                        value: "{state.title}",
                        oninput: move |e| form.write().title = e.value(),
                    }
                    FieldError { errors: errors, field: "title" }
                }

                div {
                    class: "form-row",
                    div {
                        class: "form-field",
                        label { class: "form-label", r#for: "category", "Category *" }
                        select {
                            id: "category",
                            class: "form-input",
                            disabled: categories_loading,
                            value: "{state.category}",
                            onchange: move |e| form.write().category = e.value(),
                            option {
                                value: "",
                                if categories_loading { "Loading categories..." } else { "Select a category" }
                            }
                            for name in names {
                                option {
                                    key: "{name}",
                                    value: "{name}",
                                    selected: state.category == name,
                                    "{name}"
                                }
                            }
                        }
                        FieldError { errors: errors, field: "category" }
                    }
                    div {
                        class: "form-field",
                        span { class: "form-label", "Type *" }
                        div {
                            class: "form-radios",
                            for kind in IdeaType::ALL {
                                label {
                                    key: "{kind}",
                                    class: "form-radio",
                                    input {
                                        r#type: "radio",
                                        name: "type",
                                        value: "{kind}",
                                        checked: state.idea_type == kind.as_str(),
                                        onchange: move |_| form.write().idea_type = kind.to_string(),
                                    }
                                    span { "{kind}" }
                                }
                            }
                        }
                        FieldError { errors: errors, field: "type" }
                    }
                }

                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "problem", "Problem Description *" }
                    textarea {
                        id: "problem",
                        class: "form-input",
                        rows: "4",
                        placeholder: "Describe the problem your idea solves...",
                        value: "{state.problem_description}",
                        oninput: move |e| form.write().problem_description = e.value(),
                    }
                    FieldError { errors: errors, field: "problemDescription" }
                }

                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "solution", "Solution Description *" }
                    textarea {
                        id: "solution",
                        class: "form-input",
                        rows: "4",
                        placeholder: "Explain how your idea solves the problem...",
                        value: "{state.solution_description}",
                        oninput: move |e| form.write().solution_description = e.value(),
                    }
                    FieldError { errors: errors, field: "solutionDescription" }
                }

                div {
                    class: "form-row",
                    div {
                        class: "form-field",
                        label { class: "form-label", r#for: "protection", "Current Protection Status *" }
                        select {
                            id: "protection",
                            class: "form-input",
                            onchange: move |e| form.write().protection_status = e.value(),
                            for p in PROTECTIONS {
                                option { key: "{p}", value: "{p}", selected: state.protection_status == p, "{p}" }
                            }
                        }
                        FieldError { errors: errors, field: "protectionStatus" }
                    }
                    div {
                        class: "form-field",
                        label { class: "form-label", r#for: "price", "Desired Price ($) *" }
                        input {
                            id: "price",
                            class: "form-input",
                            r#type: "number",
                            step: "0.01",
                            min: "1",
                            placeholder: "Enter your desired price",
                            value: "{state.desired_price}",
                            oninput: move |e| form.write().desired_price = e.value(),
                        }
                        FieldError { errors: errors, field: "desiredPrice" }
                    }
                }

                div {
                    class: "form-row",
                    div {
                        class: "form-field",
                        label { class: "form-label", r#for: "contact", "Contact Preference *" }
                        select {
                            id: "contact",
                            class: "form-input",
                            onchange: move |e| form.write().contact_preference = e.value(),
                            option { value: "", "Select contact preference" }
                            for c in CONTACT_PREFERENCES {
                                option { key: "{c}", value: "{c}", selected: state.contact_preference == c, "{c}" }
                            }
                        }
                        FieldError { errors: errors, field: "contactPreference" }
                    }
                    div {
                        class: "form-field form-field--inline",
                        label {
                            class: "form-switch",
                            input {
                                r#type: "checkbox",
                                checked: state.require_nda,
                                onchange: move |e| form.write().require_nda = e.checked(),
                            }
                            span { "Require NDA before sharing details" }
                        }
                    }
                }

                div {
                    class: "form-field",
                    label { class: "form-label", r#for: "notes", "Additional Notes" }
                    textarea {
                        id: "notes",
                        class: "form-input",
                        rows: "3",
                        placeholder: "Anything else buyers should know?",
                        value: "{state.additional_notes}",
                        oninput: move |e| form.write().additional_notes = e.value(),
                    }
                }

                div {
                    class: "form-actions",
                    if let Some(cancel) = on_cancel {
                        button {
                            r#type: "button",
                            class: "btn btn--secondary",
                            disabled: submitting,
                            onclick: move |_| cancel.call(()),
                            "Cancel"
                        }
                    }
                    button {
                        r#type: "submit",
                        class: "btn btn--primary",
                        disabled: submitting,
                        if submitting {
                            LoadingSpinner { size: SpinnerSize::Small }
                            span { "Saving..." }
                        } else if mode == FormMode::Create {
                            Icon { icon: FaPlus, width: 14, height: 14 }
                            span { "Submit Idea" }
                        } else {
                            Icon { icon: FaFloppyDisk, width: 14, height: 14 }
                            span { "Save Changes" }
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

    fn filled() -> IdeaFormState {
        IdeaFormState {
            title: "  Robot Vacuum  ".into(),
            category: "Technology".into(),
            problem_description: "Floors get dirty every day".into(),
            solution_description: "A robot cleans them while you sleep".into(),
            desired_price: "1500".into(),
            contact_preference: "Email".into(),
            ..IdeaFormState::default()
        }
    }

    #[test]
    fn test_complete_form_validates() {
        let draft = filled().to_draft();
        assert_eq!(draft.title, "Robot Vacuum");
        assert_eq!(draft.idea_type, Some(IdeaType::Product));
        assert_eq!(draft.desired_price, Some(1500.0));
        assert_eq!(draft.additional_notes, None);
        assert!(validate_idea(&draft).is_empty());
    }

    #[test]
    fn test_errors_are_reported_per_field() {
        let state = IdeaFormState {
            title: "ab".into(),
            desired_price: "lots".into(),
            ..filled()
        };
        let errors = validate_idea(&state.to_draft());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("title"), Some("Title must be at least 3 characters"));
        assert_eq!(errors.get("desiredPrice"), Some("Price must be a valid number"));
    }

    #[test]
    fn test_edit_state_fills_defaults() {
        let draft = IdeaDraft {
            title: "Meal Planner".into(),
            idea_type: Some(IdeaType::Service),
            desired_price: Some(49.5),
            protection_status: String::new(),
            ..IdeaDraft::default()
        };
        let state = IdeaFormState::from(&draft);
        assert_eq!(state.idea_type, "Service");
        assert_eq!(state.desired_price, "49.5");
        assert_eq!(state.protection_status, "None");
        assert_eq!(state.contact_preference, "Email");
    }
}
