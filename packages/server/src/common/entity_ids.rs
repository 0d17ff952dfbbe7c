//! Typed ID definitions for the newsroom entities.
//!
//! ```rust
//! use newsroom_core::common::{PostId, TagId};
//!
//! let post_id = PostId::new();
//! // let wrong: TagId = post_id; // compile error
//! # let _ = (post_id, TagId::new());
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Profile entities (one per authenticated identity).
pub struct Profile;

/// Marker type for Post entities (articles).
pub struct Post;

/// Marker type for Tag entities (shared vocabulary).
pub struct Tag;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Profile entities. Equal to the auth provider's identity id.
pub type ProfileId = Id<Profile>;

/// Typed ID for Post entities.
pub type PostId = Id<Post>;

/// Typed ID for Tag entities.
pub type TagId = Id<Tag>;
