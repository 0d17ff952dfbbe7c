//! Tag domain - the shared vocabulary of topics linked to posts.

pub mod actions;
pub mod data;
pub mod models;
pub mod policy;

// Re-export commonly used types
pub use data::TagData;
pub use models::{PostTag, Tag};
pub use policy::{TagConflictPolicy, MAX_TAG_RESOLVE_ATTEMPTS};
