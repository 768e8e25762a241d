//! Error panels.
//!
//! [`ErrorDisplay`] is the generic panel; the named variants cover the cases
//! pages hit most. [`ApiErrorDisplay`] picks a variant from an [`ApiError`].

use api::error::ErrorKind;
use api::ApiError;
use dioxus::prelude::*;

use crate::icons::{FaArrowsRotate, FaTriangleExclamation};
use crate::Icon;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionStyle {
    #[default]
    Primary,
    Secondary,
    Danger,
}

impl ActionStyle {
    fn class(self) -> &'static str {
        match self {
            ActionStyle::Primary => "btn btn--primary",
            ActionStyle::Secondary => "btn btn--secondary",
            ActionStyle::Danger => "btn btn--danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActionTarget {
    Link(String),
    Retry,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ErrorAction {
    pub label: String,
    pub target: ActionTarget,
    pub style: ActionStyle,
}

impl ErrorAction {
    pub fn link(label: &str, to: &str, style: ActionStyle) -> Self {
        Self {
            label: label.to_string(),
            target: ActionTarget::Link(to.to_string()),
            style,
        }
    }

    pub fn retry() -> Self {
        Self {
            label: "Try Again".to_string(),
            target: ActionTarget::Retry,
            style: ActionStyle::Danger,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Actions for a recoverable failure: retry when possible, then back.
fn retry_then_back(can_retry: bool, back_url: &str) -> Vec<ErrorAction> {
    let mut actions = Vec::new();
    if can_retry {
        actions.push(ErrorAction::retry());
    }
    actions.push(ErrorAction::link("Go Back", back_url, ActionStyle::Secondary));
    actions
}

#[component]
pub fn ErrorDisplay(
    #[props(default = "Something went wrong".to_string())] title: String,
    message: String,
    #[props(default)] actions: Vec<ErrorAction>,
    #[props(default)] on_retry: Option<EventHandler<()>>,
    #[props(default)] retry_icon: bool,
) -> Element {
    let actions = if actions.is_empty() {
        vec![ErrorAction::link("Go Home", "/", ActionStyle::Primary)]
    } else {
        actions
    };

    rsx! {
        div {
            class: "error-display",
            div {
                class: "error-display__icon",
                if retry_icon {
                    Icon { icon: FaArrowsRotate, width: 40, height: 40 }
                } else {
                    Icon { icon: FaTriangleExclamation, width: 40, height: 40 }
                }
            }
            h3 { class: "error-display__title", "{title}" }
            p { class: "error-display__message", "{message}" }
            div {
                class: "error-display__actions",
                for action in actions {
                    ActionButton { action: action, on_retry: on_retry }
                }
            }
        }
    }
}

#[component]
fn ActionButton(action: ErrorAction, on_retry: Option<EventHandler<()>>) -> Element {
    let class = action.style.class();
    match action.target {
        ActionTarget::Link(to) => rsx! {
            Link { class: "{class}", to: to, "{action.label}" }
        },
        ActionTarget::Retry => rsx! {
            button {
                class: "{class}",
                onclick: move |_| {
                    if let Some(handler) = on_retry {
                        handler.call(());
                    }
                },
                "{action.label}"
            }
        },
    }
}

#[component]
pub fn NetworkErrorDisplay(
    #[props(default)] on_retry: Option<EventHandler<()>>,
    #[props(default = "/ideas".to_string())] back_url: String,
) -> Element {
    rsx! {
        ErrorDisplay {
            title: "Network Error",
            message: "Unable to load the requested data. Please check your connection and try again.",
            actions: retry_then_back(on_retry.is_some(), &back_url),
            on_retry: on_retry,
            retry_icon: true,
        }
    }
}

#[component]
pub fn NotFoundErrorDisplay(
    #[props(default = "page".to_string())] item_name: String,
    #[props(default = "/".to_string())] back_url: String,
) -> Element {
    rsx! {
        ErrorDisplay {
            title: "{capitalize(&item_name)} Not Found",
            message: "The {item_name} you're looking for doesn't exist or may have been removed.",
            actions: vec![
                ErrorAction::link("Go Back", &back_url, ActionStyle::Primary),
                ErrorAction::link("Home", "/", ActionStyle::Secondary),
            ],
        }
    }
}

#[component]
pub fn UnauthorizedErrorDisplay(#[props(default = "/ideas".to_string())] back_url: String) -> Element {
    rsx! {
        ErrorDisplay {
            title: "Access Denied",
            message: "You don't have permission to access this resource. Please sign in or contact support if you believe this is an error.",
            actions: vec![
                ErrorAction::link("Sign In", "/login", ActionStyle::Primary),
                ErrorAction::link("Go Back", &back_url, ActionStyle::Secondary),
            ],
        }
    }
}

#[component]
pub fn LoadingErrorDisplay(
    #[props(default)] on_retry: Option<EventHandler<()>>,
    #[props(default = "/ideas".to_string())] back_url: String,
    #[props(default = "content".to_string())] item_name: String,
) -> Element {
    rsx! {
        ErrorDisplay {
            title: "Error Loading {capitalize(&item_name)}",
            message: "Failed to load {item_name}. This might be a temporary issue.",
            actions: retry_then_back(on_retry.is_some(), &back_url),
            on_retry: on_retry,
        }
    }
}

/// Which panel an error should be shown with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorPanel {
    Network,
    NotFound,
    Unauthorized,
    Loading,
}

pub fn panel_for(error: &ApiError) -> ErrorPanel {
    match (error, error.kind()) {
        (ApiError::NotFound, _) => ErrorPanel::NotFound,
        (_, ErrorKind::Connection) => ErrorPanel::Network,
        (_, ErrorKind::Authorization) => ErrorPanel::Unauthorized,
        _ => ErrorPanel::Loading,
    }
}

#[component]
pub fn ApiErrorDisplay(
    error: ApiError,
    #[props(default)] on_retry: Option<EventHandler<()>>,
    #[props(default = "content".to_string())] item_name: String,
    #[props(default = "/ideas".to_string())] back_url: String,
) -> Element {
    match panel_for(&error) {
        ErrorPanel::Network => rsx! {
            NetworkErrorDisplay { on_retry: on_retry, back_url: back_url }
        },
        ErrorPanel::NotFound => rsx! {
            NotFoundErrorDisplay { item_name: item_name, back_url: back_url }
        },
        ErrorPanel::Unauthorized => rsx! {
            UnauthorizedErrorDisplay { back_url: back_url }
        },
        ErrorPanel::Loading => rsx! {
            ErrorDisplay {
                title: "Error Loading {capitalize(&item_name)}",
                message: error.user_message(),
                actions: retry_then_back(on_retry.is_some(), &back_url),
                on_retry: on_retry,
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_selection() {
        assert_eq!(panel_for(&ApiError::Timeout), ErrorPanel::Network);
        assert_eq!(panel_for(&ApiError::NotFound), ErrorPanel::NotFound);
        assert_eq!(
            panel_for(&ApiError::Unauthorized(String::new())),
            ErrorPanel::Unauthorized
        );
        assert_eq!(
            panel_for(&ApiError::Http {
                status: 500,
                message: "boom".into()
            }),
            ErrorPanel::Loading
        );
    }

    #[test]
    fn test_retry_only_with_handler() {
        assert_eq!(retry_then_back(false, "/").len(), 1);
        let actions = retry_then_back(true, "/ideas");
        assert_eq!(actions[0].target, ActionTarget::Retry);
        assert_eq!(actions[1].target, ActionTarget::Link("/ideas".into()));
        assert_eq!(capitalize("idea"), "Idea");
    }
}
