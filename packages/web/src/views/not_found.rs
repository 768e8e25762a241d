use dioxus::prelude::*;

use ui::NotFoundErrorDisplay;

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    tracing::debug!(path = %segments.join("/"), "no route matched");
    rsx! {
        NotFoundErrorDisplay {}
    }
}
