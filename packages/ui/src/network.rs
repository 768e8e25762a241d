//! Connectivity: the browser's online flag plus a periodic API health probe.
//!
//! The browser's `offline` and `online` events apply at once; `online` also
//! probes the API straight away instead of waiting for the next tick.

use std::time::Duration;

use api::timer::sleep;
use api::{Backend, CatalogApi};
use dioxus::prelude::*;

use crate::platform;
use crate::services::use_backend;

const PROBE_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkStatus {
    pub browser_online: bool,
    pub api_reachable: bool,
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self {
            browser_online: true,
            api_reachable: true,
        }
    }
}

impl NetworkStatus {
    pub fn is_degraded(&self) -> bool {
        !self.browser_online || !self.api_reachable
    }

    /// The browser lost its connection; the API is unreachable with it.
    pub fn went_offline(self) -> Self {
        Self {
            browser_online: false,
            api_reachable: false,
        }
    }

    /// The browser is back; API reachability waits for the next probe.
    pub fn came_online(self) -> Self {
        Self {
            browser_online: true,
            ..self
        }
    }

    /// A health probe finished. Ignored while the browser is offline.
    pub fn probed(self, api_reachable: bool) -> Self {
        Self {
            api_reachable: self.browser_online && api_reachable,
            ..self
        }
    }

    /// Banner text, if there is anything to warn about.
    pub fn warning(&self) -> Option<&'static str> {
        if !self.browser_online {
            Some("No internet connection")
        } else if !self.api_reachable {
            Some("Server connection issues")
        } else {
            None
        }
    }
}

pub fn use_network_status() -> Signal<NetworkStatus> {
    use_context::<Signal<NetworkStatus>>()
}

fn publish(mut status: Signal<NetworkStatus>, next: NetworkStatus) {
    if *status.peek() == next {
        return;
    }
    if next.is_degraded() {
        tracing::warn!(?next, "connectivity degraded");
    } else {
        tracing::info!("connectivity restored");
    }
    status.set(next);
}

async fn probe(backend: &Backend, status: Signal<NetworkStatus>) {
    let reachable = backend.catalog.health().await.is_ok();
    let current = *status.peek();
    publish(status, current.probed(reachable));
}

#[component]
pub fn NetworkStatusProvider(children: Element) -> Element {
    let status = use_context_provider(|| Signal::new(NetworkStatus::default()));
    let backend = use_backend();

    let poll_backend = backend.clone();
    use_hook(move || {
        spawn(async move {
            loop {
                let current = *status.peek();
                let current = if platform::browser_online() {
                    current.came_online()
                } else {
                    current.went_offline()
                };
                publish(status, current);
                if current.browser_online {
                    probe(&poll_backend, status).await;
                }
                sleep(PROBE_INTERVAL).await;
            }
        });
    });

    use_hook(move || {
        platform::on_window_event("offline", move || {
            let current = *status.peek();
            publish(status, current.went_offline());
        });
        platform::on_window_event("online", move || {
            let current = *status.peek();
            publish(status, current.came_online());
            let backend = backend.clone();
            platform::spawn_detached(async move {
                probe(&backend, status).await;
            });
        });
    });

    rsx! {
        {children}
    }
}

/// Yellow banner shown while offline or while the API is unreachable.
#[component]
pub fn NetworkBanner() -> Element {
    let status = use_network_status();
    match status().warning() {
        Some(text) => rsx! {
            div {
                class: "network-banner",
                role: "status",
                "{text}"
            }
        },
        None => rsx! {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_prefers_browser_state() {
        let offline = NetworkStatus {
            browser_online: false,
            api_reachable: false,
        };
        assert_eq!(offline.warning(), Some("No internet connection"));

        let api_down = NetworkStatus {
            browser_online: true,
            api_reachable: false,
        };
        assert_eq!(api_down.warning(), Some("Server connection issues"));
        assert_eq!(NetworkStatus::default().warning(), None);
    }

    #[test]
    fn test_offline_event_drops_both_flags() {
        let status = NetworkStatus::default().went_offline();
        assert!(!status.browser_online);
        assert!(!status.api_reachable);
        assert_eq!(status.warning(), Some("No internet connection"));
    }

    #[test]
    fn test_online_event_then_probe() {
        let back = NetworkStatus::default().went_offline().came_online();
        assert!(back.browser_online);
        assert!(!back.api_reachable);
        assert_eq!(back.warning(), Some("Server connection issues"));

        assert_eq!(back.probed(true), NetworkStatus::default());
        assert_eq!(back.probed(false).warning(), Some("Server connection issues"));
    }

    #[test]
    fn test_probe_result_ignored_while_offline() {
        let offline = NetworkStatus::default().went_offline();
        assert_eq!(offline.probed(true), offline);
    }
}
