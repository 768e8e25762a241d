use dioxus::prelude::*;

use crate::Route;

#[component]
pub fn Home() -> Element {
    rsx! {
        section {
            class: "hero",
            div {
                class: "hero__text",
                h1 { class: "hero__title", "Turn Your Ideas into Reality & Profit" }
                p { class: "hero__subtitle", "Your Ideas Deserve More Than Just a Notebook!" }
                div {
                    class: "hero__actions",
                    Link { class: "btn btn--primary", to: Route::CreateIdea {}, "Submit Your Idea" }
                    Link {
                        class: "btn btn--ghost",
                        to: Route::Ideas { filter: String::new(), creator: String::new() },
                        "Browse Ideas"
                    }
                }
            }
        }
    }
}
