mod layout;
pub use layout::Layout;

mod home;
pub use home::Home;

mod ideas;
pub use ideas::Ideas;

mod idea_details;
pub use idea_details::IdeaDetails;

mod create_idea;
pub use create_idea::CreateIdea;

mod edit_idea;
pub use edit_idea::EditIdea;

mod success;
pub use success::Success;

mod profile;
pub use profile::Profile;

mod edit_profile;
pub use edit_profile::EditProfile;

mod profile_details;
pub use profile_details::ProfileDetails;

mod login;
pub use login::Login;

mod register;
pub use register::Register;

mod google_callback;
pub use google_callback::GoogleCallback;

mod not_found;
pub use not_found::NotFound;
