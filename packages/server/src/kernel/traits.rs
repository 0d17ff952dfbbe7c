// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business rules (slugs, tag resolution, capability checks) live in domain actions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseContentStore, BaseObjectStorage)

use async_trait::async_trait;

use crate::common::{AppResult, PostId, ProfileId, TagId};
use crate::domains::posts::models::{CreatePost, Post, PostChanges, PostFilter};
use crate::domains::profiles::models::{NewProfile, Profile, Role, UserRole};
use crate::domains::tag::models::Tag;

// =============================================================================
// Content Store Trait (Infrastructure - relational tables)
// =============================================================================

/// Request/response access to posts, tags, post_tags, profiles and user_roles.
///
/// Implementations enforce the table constraints: unique post slug, unique tag
/// name and slug, unique (post, tag) pair, unique (profile, role), and the
/// cascades from posts/tags/profiles to their dependent rows. A unique
/// violation surfaces as `AppError::Conflict`.
#[async_trait]
pub trait BaseContentStore: Send + Sync {
    // Posts

    /// Posts matching the filter, newest first
    async fn list_posts(&self, filter: &PostFilter) -> AppResult<Vec<Post>>;

    async fn find_post_by_id(&self, id: PostId) -> AppResult<Option<Post>>;

    async fn find_post_by_slug(&self, slug: &str) -> AppResult<Option<Post>>;

    async fn insert_post(&self, post: &CreatePost) -> AppResult<Post>;

    /// Apply changes; `NotFound` if the post does not exist
    async fn update_post(&self, id: PostId, changes: &PostChanges) -> AppResult<Post>;

    /// Returns whether a row was removed. Links cascade.
    async fn delete_post(&self, id: PostId) -> AppResult<bool>;

    /// Posts linked to a tag through post_tags, newest first
    async fn list_posts_for_tag(&self, tag_id: TagId, filter: &PostFilter)
        -> AppResult<Vec<Post>>;

    // Tags

    /// All tags ordered by name
    async fn list_tags(&self) -> AppResult<Vec<Tag>>;

    async fn find_tag_by_slug(&self, slug: &str) -> AppResult<Option<Tag>>;

    async fn insert_tag(&self, name: &str, slug: &str) -> AppResult<Tag>;

    /// Returns whether a row was removed. Links cascade.
    async fn delete_tag(&self, id: TagId) -> AppResult<bool>;

    async fn tags_for_post(&self, post_id: PostId) -> AppResult<Vec<Tag>>;

    /// Idempotent on the (post, tag) pair
    async fn link_post_tag(&self, post_id: PostId, tag_id: TagId) -> AppResult<()>;

    /// Remove every link for a post, returning how many were removed
    async fn unlink_post_tags(&self, post_id: PostId) -> AppResult<u64>;

    // Profiles and roles

    async fn find_profile(&self, id: ProfileId) -> AppResult<Option<Profile>>;

    async fn list_profiles(&self) -> AppResult<Vec<Profile>>;

    /// Insert if absent; returns the stored row and whether this call created it
    async fn insert_profile_if_absent(&self, profile: &NewProfile) -> AppResult<(Profile, bool)>;

    /// `NotFound` if the profile does not exist
    async fn update_profile(&self, id: ProfileId, display_name: &str) -> AppResult<Profile>;

    /// Returns whether a row was removed. Roles and posts cascade.
    async fn delete_profile(&self, id: ProfileId) -> AppResult<bool>;

    async fn roles_for(&self, id: ProfileId) -> AppResult<Vec<Role>>;

    async fn list_role_assignments(&self) -> AppResult<Vec<UserRole>>;

    /// Idempotent
    async fn grant_role(&self, id: ProfileId, role: Role) -> AppResult<()>;

    /// Returns whether the role was held
    async fn revoke_role(&self, id: ProfileId, role: Role) -> AppResult<bool>;

    // Health

    async fn ping(&self) -> AppResult<()>;
}

// =============================================================================
// Object Storage Trait (Infrastructure - featured images)
// =============================================================================

#[async_trait]
pub trait BaseObjectStorage: Send + Sync {
    /// Store bytes at `path`. Existing objects are never overwritten.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<()>;

    /// Public URL for a stored object. Pure string building, no network.
    fn public_url(&self, path: &str) -> String;
}
