use dioxus::prelude::*;

#[component]
pub fn Footer() -> Element {
    rsx! {
        footer {
            class: "footer",
            div {
                class: "footer__brand",
                h2 { "Ideady" }
                p { "The marketplace for innovative ideas" }
            }
            div {
                class: "footer__links",
                h3 { "Quick Links" }
                Link { to: "/", "Home" }
                Link { to: "/ideas", "Browse Ideas" }
                Link { to: "/create-idea", "Submit an Idea" }
            }
        }
    }
}
