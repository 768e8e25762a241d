//! Sign-up, sign-in and session handling.

mod google;
pub(crate) mod identity;
mod session;

pub use google::{parse_callback, GoogleSignIn, PendingSignIn};
pub use identity::{friendly_auth_message, AuthUser, IdentityProvider, IdentityToolkit, SignInOutcome};
pub use session::{ProfileEdit, Session, SignedIn, SignupRequest};
