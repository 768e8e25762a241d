//! Live "who is online" list.
//!
//! [`OnlineUsersProvider`] mirrors the profile store's online-users snapshots
//! into a signal and feeds browser lifecycle events (tab closing, connectivity
//! lost or regained) to the presence tracker for the signed-in user.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use api::timer::sleep;
use dioxus::prelude::*;
use store::{OnlineUser, PresenceEvent};

use crate::auth::use_auth;
use crate::icons::FaUsers;
use crate::platform;
use crate::services::use_backend;
use crate::Icon;

pub fn use_online_users() -> Signal<Vec<OnlineUser>> {
    use_context::<Signal<Vec<OnlineUser>>>()
}

#[component]
pub fn OnlineUsersProvider(children: Element) -> Element {
    let mut users = use_context_provider(|| Signal::new(Vec::<OnlineUser>::new()));
    let backend = use_backend();
    let auth = use_auth();
    let current_uid: Rc<RefCell<Option<String>>> = use_hook(Rc::default);

    // Snapshot stream from the store
    let watch_backend = backend.clone();
    use_hook(move || {
        spawn(async move {
            let mut rx = watch_backend.session.presence().subscribe();
            let initial = rx.borrow_and_update().clone();
            users.set(initial);
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                users.set(snapshot);
            }
        });
    });

    // Re-run the query periodically while someone is signed in
    let poll_backend = backend.clone();
    use_hook(move || {
        let interval = Duration::from_secs(poll_backend.config.presence.refresh_interval_secs.max(1) as u64);
        spawn(async move {
            loop {
                sleep(interval).await;
                if auth.peek().user.is_some() {
                    poll_backend.session.presence().refresh().await;
                }
            }
        });
    });

    // Track the signed-in uid for the DOM listeners, refreshing on change
    let uid_cell = current_uid.clone();
    let effect_backend = backend.clone();
    use_effect(move || {
        let uid = auth().uid().map(str::to_string);
        let changed = *uid_cell.borrow() != uid;
        *uid_cell.borrow_mut() = uid;
        if changed {
            let backend = effect_backend.clone();
            spawn(async move {
                backend.session.presence().refresh().await;
            });
        }
    });

    let listener_backend = backend.clone();
    use_hook(move || {
        for (event, presence) in [
            ("beforeunload", PresenceEvent::Unload),
            ("offline", PresenceEvent::WentOffline),
            ("online", PresenceEvent::Reconnected),
        ] {
            let uid = current_uid.clone();
            let backend = listener_backend.clone();
            platform::on_window_event(event, move || {
                let Some(uid) = uid.borrow().clone() else {
                    return;
                };
                let backend = backend.clone();
                platform::spawn_detached(async move {
                    backend.session.presence().handle(&uid, presence).await;
                });
            });
        }
    });

    rsx! {
        {children}
    }
}

/// Navbar button showing the online count, with a dropdown of users.
#[component]
pub fn OnlineUsersDropdown() -> Element {
    let users = use_online_users();
    let mut open = use_signal(|| false);
    let count = users.read().len();

    rsx! {
        div {
            class: "online-users",
            button {
                class: "online-users__toggle",
                aria_label: "Show online users",
                onclick: move |_| open.toggle(),
                Icon { icon: FaUsers, width: 14, height: 14 }
                span { "Online" }
                span { class: "online-users__count", "({count})" }
            }
            if open() {
                div {
                    class: "online-users__menu",
                    onclick: move |_| open.set(false),
                    h3 { class: "online-users__title", "Active Users" }
                    if users.read().is_empty() {
                        p { class: "online-users__empty", "No users currently online" }
                    }
                    for user in users.read().iter().cloned() {
                        Link {
                            key: "{user.id}",
                            class: "online-users__item",
                            to: "/profile/{user.id}",
                            crate::Avatar { url: user.photo_url.clone(), alt: user.display_name.clone(), size: 32 }
                            span { "{user.display_name}" }
                        }
                    }
                }
            }
        }
    }
}
