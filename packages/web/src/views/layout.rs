use dioxus::prelude::*;

use ui::{Footer, Navbar, NetworkBanner};

use crate::Route;

/// Chrome shared by every page.
#[component]
pub fn Layout() -> Element {
    rsx! {
        div {
            class: "app",
            Navbar {
                Link { to: Route::Home {}, "Home" }
                Link {
                    to: Route::Ideas { filter: String::new(), creator: String::new() },
                    "Browse Ideas"
                }
                Link { to: Route::CreateIdea {}, "Submit Idea" }
            }
            NetworkBanner {}
            main {
                class: "app__main",
                div {
                    class: "container",
                    Outlet::<Route> {}
                }
            }
            Footer {}
        }
    }
}
