//! Data models for the catalog API.

mod idea;
mod reference;

pub use idea::{CreatorInfo, Idea, IdeaDraft, IdeaType, IdeasResponse, Pagination};
pub use reference::{Categories, Category, Language, Languages};
