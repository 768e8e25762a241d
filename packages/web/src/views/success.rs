use dioxus::prelude::*;

use ui::icons::FaCircleCheck;
use ui::Icon;

use crate::Route;

#[component]
pub fn Success() -> Element {
    rsx! {
        div {
            class: "notice",
            div { class: "notice__icon notice__icon--success",
                Icon { icon: FaCircleCheck, width: 48, height: 48 }
            }
            h1 { class: "page-title", "Idea Submitted Successfully!" }
            p {
                class: "page-subtitle",
                "Thank you for sharing your idea. We'll review it and get back to you soon."
            }
            Link { class: "btn btn--primary", to: Route::Home {}, "Back to Home" }
        }
    }
}
