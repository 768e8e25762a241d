use dioxus::prelude::*;

use crate::auth::{use_auth, LogoutButton};
use crate::icons::{FaBars, FaLightbulb, FaXmark};
use crate::{Avatar, Icon, OnlineUsersDropdown};

/// Top bar. `children` are the primary navigation links, rendered both inline
/// and inside the collapsible mobile menu.
#[component]
pub fn Navbar(children: Element) -> Element {
    let auth = use_auth();
    let mut menu_open = use_signal(|| false);
    let mut profile_open = use_signal(|| false);

    let state = auth();
    let signed_in = state.user.is_some();
    let name = state.display_name();
    let photo = state.photo_url();

    rsx! {
        nav {
            class: "navbar",
            div {
                class: "navbar__inner",
                Link {
                    class: "navbar__brand",
                    to: "/",
                    Icon { icon: FaLightbulb, width: 20, height: 20 }
                    span { "Ideady" }
                }
                div {
                    class: "navbar__links",
                    {children.clone()}
                }
                div {
                    class: "navbar__actions",
                    if signed_in {
                        OnlineUsersDropdown {}
                        div {
                            class: "navbar__profile",
                            button {
                                class: "navbar__profile-toggle",
                                aria_label: "Open profile menu",
                                onclick: move |_| profile_open.toggle(),
                                Avatar { url: photo.clone(), alt: name.clone(), size: 32 }
                                span { class: "navbar__profile-name", "{name}" }
                            }
                            if profile_open() {
                                div {
                                    class: "navbar__menu",
                                    onclick: move |_| profile_open.set(false),
                                    Link { class: "navbar__menu-item", to: "/profile", "My Profile" }
                                    Link { class: "navbar__menu-item", to: "/ideas?filter=my-ideas", "My Ideas" }
                                    Link { class: "navbar__menu-item", to: "/create-idea", "Post an Idea" }
                                    LogoutButton { class: "navbar__menu-item navbar__menu-item--danger" }
                                }
                            }
                        }
                    } else if !state.loading {
                        Link { class: "btn btn--ghost", to: "/login", "Sign In" }
                        Link { class: "btn btn--primary", to: "/register", "Sign Up" }
                    }
                    button {
                        class: "navbar__burger",
                        aria_label: "Toggle menu",
                        onclick: move |_| menu_open.toggle(),
                        if menu_open() {
                            Icon { icon: FaXmark, width: 18, height: 18 }
                        } else {
                            Icon { icon: FaBars, width: 18, height: 18 }
                        }
                    }
                }
            }
            if menu_open() {
                div {
                    class: "navbar__mobile",
                    onclick: move |_| menu_open.set(false),
                    {children}
                    if signed_in {
                        Link { class: "navbar__mobile-item", to: "/profile", "My Profile" }
                        LogoutButton { class: "navbar__mobile-item" }
                    } else {
                        Link { class: "navbar__mobile-item", to: "/login", "Sign In" }
                        Link { class: "navbar__mobile-item", to: "/register", "Sign Up" }
                    }
                }
            }
        }
    }
}
