//! Postgres implementation of `BaseContentStore`.
//!
//! Thin delegation to the model query functions; sqlx errors are mapped onto
//! the `AppError` taxonomy here (unique violations become `Conflict`).

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::{AppError, AppResult, PostId, ProfileId, TagId};
use crate::domains::posts::models::{CreatePost, Post, PostChanges, PostFilter};
use crate::domains::profiles::models::{NewProfile, Profile, Role, UserRole};
use crate::domains::tag::models::{PostTag, Tag};
use crate::kernel::BaseContentStore;

#[derive(Clone)]
pub struct PostgresContentStore {
    pool: PgPool,
}

impl PostgresContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseContentStore for PostgresContentStore {
    async fn list_posts(&self, filter: &PostFilter) -> AppResult<Vec<Post>> {
        Ok(Post::find_filtered(filter, &self.pool).await?)
    }

    async fn find_post_by_id(&self, id: PostId) -> AppResult<Option<Post>> {
        Ok(Post::find_by_id(id, &self.pool).await?)
    }

    async fn find_post_by_slug(&self, slug: &str) -> AppResult<Option<Post>> {
        Ok(Post::find_by_slug(slug, &self.pool).await?)
    }

    async fn insert_post(&self, post: &CreatePost) -> AppResult<Post> {
        Ok(Post::create(post, &self.pool).await?)
    }

    async fn update_post(&self, id: PostId, changes: &PostChanges) -> AppResult<Post> {
        Post::update(id, changes, &self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", id)))
    }

    async fn delete_post(&self, id: PostId) -> AppResult<bool> {
        Ok(Post::delete(id, &self.pool).await?)
    }

    async fn list_posts_for_tag(
        &self,
        tag_id: TagId,
        filter: &PostFilter,
    ) -> AppResult<Vec<Post>> {
        Ok(Post::find_for_tag(tag_id, filter, &self.pool).await?)
    }

    async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        Ok(Tag::find_all(&self.pool).await?)
    }

    async fn find_tag_by_slug(&self, slug: &str) -> AppResult<Option<Tag>> {
        Ok(Tag::find_by_slug(slug, &self.pool).await?)
    }

    async fn insert_tag(&self, name: &str, slug: &str) -> AppResult<Tag> {
        Ok(Tag::create(name, slug, &self.pool).await?)
    }

    async fn delete_tag(&self, id: TagId) -> AppResult<bool> {
        Ok(Tag::delete(id, &self.pool).await?)
    }

    async fn tags_for_post(&self, post_id: PostId) -> AppResult<Vec<Tag>> {
        Ok(Tag::find_for_post(post_id, &self.pool).await?)
    }

    async fn link_post_tag(&self, post_id: PostId, tag_id: TagId) -> AppResult<()> {
        Ok(PostTag::create(post_id, tag_id, &self.pool).await?)
    }

    async fn unlink_post_tags(&self, post_id: PostId) -> AppResult<u64> {
        Ok(PostTag::delete_all_for_post(post_id, &self.pool).await?)
    }

    async fn find_profile(&self, id: ProfileId) -> AppResult<Option<Profile>> {
        Ok(Profile::find_by_id(id, &self.pool).await?)
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        Ok(Profile::find_all(&self.pool).await?)
    }

    async fn insert_profile_if_absent(&self, profile: &NewProfile) -> AppResult<(Profile, bool)> {
        Ok(Profile::insert_if_absent(profile, &self.pool).await?)
    }

    async fn update_profile(&self, id: ProfileId, display_name: &str) -> AppResult<Profile> {
        Profile::update_display_name(id, display_name, &self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {}", id)))
    }

    async fn delete_profile(&self, id: ProfileId) -> AppResult<bool> {
        Ok(Profile::delete(id, &self.pool).await?)
    }

    async fn roles_for(&self, id: ProfileId) -> AppResult<Vec<Role>> {
        let rows = UserRole::find_for_profile(id, &self.pool).await?;
        Ok(rows.iter().filter_map(UserRole::role).collect())
    }

    async fn list_role_assignments(&self) -> AppResult<Vec<UserRole>> {
        Ok(UserRole::find_all(&self.pool).await?)
    }

    async fn grant_role(&self, id: ProfileId, role: Role) -> AppResult<()> {
        Ok(UserRole::grant(id, role, &self.pool).await?)
    }

    async fn revoke_role(&self, id: ProfileId, role: Role) -> AppResult<bool> {
        Ok(UserRole::revoke(id, role, &self.pool).await?)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
