//! This crate contains all shared UI for the workspace: session and presence
//! contexts, layout chrome, and the reusable idea components.

use dioxus::prelude::*;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
    pub mod brands {
        pub use dioxus_free_icons::icons::fa_brands_icons::*;
    }
}

pub const UI_CSS: Asset = asset!("/assets/ui.css");

pub mod platform;

mod services;
pub use services::{category_names, use_backend, use_categories, use_languages};

mod auth;
pub use auth::{
    complete_sign_in, finish_google_sign_in, id_token, sign_out, take_google_pending, use_auth,
    AuthProvider, AuthState, GoogleSignInButton, LogoutButton, GOOGLE_CALLBACK_PATH,
};

mod online_users;
pub use online_users::{use_online_users, OnlineUsersDropdown, OnlineUsersProvider};

mod network;
pub use network::{use_network_status, NetworkBanner, NetworkStatus, NetworkStatusProvider};

mod avatar;
pub use avatar::{Avatar, DEFAULT_AVATAR};

mod navbar;
pub use navbar::Navbar;

mod footer;
pub use footer::Footer;

mod loading;
pub use loading::{LoadingSkeleton, LoadingSpinner, SpinnerSize};

pub mod error_display;
pub use error_display::{
    ApiErrorDisplay, ErrorDisplay, LoadingErrorDisplay, NetworkErrorDisplay, NotFoundErrorDisplay,
    UnauthorizedErrorDisplay,
};

mod idea_card;
pub use idea_card::IdeaCard;

pub mod data_table;
pub use data_table::DataTable;

mod idea_form;
pub use idea_form::{FormMode, IdeaForm, IdeaFormState};

mod pagination;
pub use pagination::PaginationControls;

mod protected;
pub use protected::ProtectedRoute;

mod file_picker;
pub use file_picker::{first_upload, FilePicker};
