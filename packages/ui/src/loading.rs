//! Loading placeholders.

use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpinnerSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl SpinnerSize {
    fn class(self) -> &'static str {
        match self {
            SpinnerSize::Small => "spinner spinner--sm",
            SpinnerSize::Medium => "spinner spinner--md",
            SpinnerSize::Large => "spinner spinner--lg",
        }
    }
}

#[component]
pub fn LoadingSpinner(
    #[props(default)] size: SpinnerSize,
    #[props(default)] text: Option<String>,
) -> Element {
    rsx! {
        div {
            class: "loading",
            role: "status",
            div { class: size.class() }
            if let Some(text) = text {
                p { class: "loading__text", "{text}" }
            }
        }
    }
}

/// Grey card outline standing in for an idea card.
#[component]
pub fn LoadingSkeleton() -> Element {
    rsx! {
        div {
            class: "skeleton",
            div { class: "skeleton__line skeleton__line--title" }
            div { class: "skeleton__line skeleton__line--short" }
            div { class: "skeleton__line" }
            div { class: "skeleton__line" }
            div { class: "skeleton__line skeleton__line--short" }
        }
    }
}
