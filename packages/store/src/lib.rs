pub mod config;
pub mod models;
pub mod presence;
pub mod profiles;

mod memory;
pub use memory::MemoryStore;

pub use config::IdeadyConfig;
pub use models::{OnlineUser, ProfileUpdate, PublicProfile, UserProfile, UserStats};
pub use presence::{PresenceEvent, PresenceTracker};
pub use profiles::{ProfileStore, StoreError};
