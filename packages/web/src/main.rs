use dioxus::prelude::*;

use api::Backend;
use store::IdeadyConfig;
use ui::{AuthProvider, NetworkStatusProvider, OnlineUsersProvider};
use views::{
    CreateIdea, EditIdea, EditProfile, GoogleCallback, Home, IdeaDetails, Ideas, Layout, Login,
    NotFound, Profile, ProfileDetails, Register, Success,
};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Layout)]
        #[route("/")]
        Home {},
        #[route("/ideas?:filter&:creator")]
        Ideas { filter: String, creator: String },
        #[route("/ideas/:id")]
        IdeaDetails { id: String },
        #[route("/create-idea")]
        CreateIdea {},
        #[route("/edit-idea/:id")]
        EditIdea { id: String },
        #[route("/success")]
        Success {},
        #[route("/profile")]
        Profile {},
        #[route("/profile/edit")]
        EditProfile {},
        #[route("/profile/:uid")]
        ProfileDetails { uid: String },
        #[route("/login")]
        Login {},
        #[route("/register")]
        Register {},
        #[route("/auth/google/callback")]
        GoogleCallback {},
        #[route("/:..segments")]
        NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::logger::initialize_default();
    dioxus::launch(App);
}

fn load_config() -> IdeadyConfig {
    #[cfg(target_arch = "wasm32")]
    {
        IdeadyConfig::compiled()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        IdeadyConfig::from_env()
    }
}

#[component]
fn App() -> Element {
    use_context_provider(|| {
        let backend = Backend::from_config(load_config());
        if backend.is_mock() {
            tracing::info!("running against the in-memory demo backend");
        }
        backend
    });

    rsx! {
        // Global app resources
        document::Link { rel: "stylesheet", href: ui::UI_CSS }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AuthProvider {
            NetworkStatusProvider {
                OnlineUsersProvider {
                    Router::<Route> {}
                }
            }
        }
    }
}
