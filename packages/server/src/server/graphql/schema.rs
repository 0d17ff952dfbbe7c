//! GraphQL schema definition.
//!
//! Resolvers stay thin: they build the viewer-scoped call into a domain
//! action and convert the result into its GraphQL data type.

use juniper::{EmptySubscription, FieldResult, RootNode};
use tracing::info;
use uuid::Uuid;

use super::context::GraphQLContext;
use super::error::to_field_error;
use crate::common::{PostId, ProfileId, TagId};

// Domain actions
use crate::domains::posts::actions as post_actions;
use crate::domains::profiles::actions as profile_actions;
use crate::domains::tag::actions as tag_actions;

// Domain data types (GraphQL types)
use crate::domains::posts::data::{
    AdminDashboardData, CreatePostInput, PostData, UpdatePostInput,
};
use crate::domains::posts::Post;
use crate::domains::profiles::{AdminUserData, MeData, ProfileData, RoleData};
use crate::domains::tag::TagData;

fn posts_data(posts: Vec<Post>) -> Vec<PostData> {
    posts.into_iter().map(PostData::from).collect()
}

pub struct Query;

#[juniper::graphql_object(context = GraphQLContext)]
impl Query {
    // =========================================================================
    // Post Queries
    // =========================================================================

    /// Published posts, newest first
    async fn posts(ctx: &GraphQLContext) -> FieldResult<Vec<PostData>> {
        let posts = post_actions::list_published_posts(ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(posts_data(posts))
    }

    /// A single post by slug. Drafts are only visible to their author and admins.
    async fn post(ctx: &GraphQLContext, slug: String) -> FieldResult<Option<PostData>> {
        let post = post_actions::find_post_by_slug(&ctx.viewer, &slug, ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(post.map(PostData::from))
    }

    /// Published posts carrying the tag with this slug
    async fn posts_by_tag(ctx: &GraphQLContext, slug: String) -> FieldResult<Vec<PostData>> {
        let posts = post_actions::list_posts_for_tag(&slug, ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(posts_data(posts))
    }

    /// The viewer's own posts, drafts included
    async fn my_posts(ctx: &GraphQLContext) -> FieldResult<Vec<PostData>> {
        let posts = post_actions::list_my_posts(&ctx.viewer, ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(posts_data(posts))
    }

    // =========================================================================
    // Tag Queries
    // =========================================================================

    async fn tags(ctx: &GraphQLContext) -> FieldResult<Vec<TagData>> {
        let tags = tag_actions::list_tags(ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(tags.into_iter().map(TagData::from).collect())
    }

    async fn tag(ctx: &GraphQLContext, slug: String) -> FieldResult<Option<TagData>> {
        let tag = tag_actions::find_tag_by_slug(&slug, ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(tag.map(TagData::from))
    }

    // =========================================================================
    // Profile Queries
    // =========================================================================

    /// The signed-in viewer, or null when anonymous
    async fn me(ctx: &GraphQLContext) -> FieldResult<Option<MeData>> {
        let me = profile_actions::me(&ctx.viewer, ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(me.map(MeData::from))
    }

    // =========================================================================
    // Admin Queries
    // =========================================================================

    /// Every post including drafts (admin only)
    async fn admin_posts(ctx: &GraphQLContext) -> FieldResult<Vec<PostData>> {
        let posts = post_actions::list_all_posts(&ctx.viewer, ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(posts_data(posts))
    }

    /// Every user with their roles (admin only)
    async fn admin_users(ctx: &GraphQLContext) -> FieldResult<Vec<AdminUserData>> {
        let users = profile_actions::list_users(&ctx.viewer, ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(users.into_iter().map(AdminUserData::from).collect())
    }

    async fn admin_dashboard(ctx: &GraphQLContext) -> FieldResult<AdminDashboardData> {
        let view = post_actions::dashboard(&ctx.viewer, ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(AdminDashboardData::from(view))
    }
}

pub struct Mutation;

#[juniper::graphql_object(context = GraphQLContext)]
impl Mutation {
    // =========================================================================
    // Post Mutations
    // =========================================================================

    /// Create a post with optional tags and featured image
    async fn create_post(ctx: &GraphQLContext, input: CreatePostInput) -> FieldResult<PostData> {
        let created = post_actions::create_post(&ctx.viewer, input.into(), ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(PostData::from(created.post))
    }

    /// Edit a post (author or admin). The slug never changes.
    async fn update_post(
        ctx: &GraphQLContext,
        id: Uuid,
        input: UpdatePostInput,
    ) -> FieldResult<PostData> {
        let post = post_actions::update_post(
            &ctx.viewer,
            PostId::from_uuid(id),
            input.into(),
            ctx.deps(),
        )
        .await
        .map_err(to_field_error)?;
        Ok(PostData::from(post))
    }

    async fn delete_post(ctx: &GraphQLContext, id: Uuid) -> FieldResult<bool> {
        post_actions::delete_post(&ctx.viewer, PostId::from_uuid(id), ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(true)
    }

    // =========================================================================
    // Tag Mutations
    // =========================================================================

    /// Delete a tag and its links (admin only)
    async fn delete_tag(ctx: &GraphQLContext, id: Uuid) -> FieldResult<bool> {
        tag_actions::delete_tag(&ctx.viewer, TagId::from_uuid(id), ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(true)
    }

    // =========================================================================
    // Profile Mutations
    // =========================================================================

    async fn update_profile(ctx: &GraphQLContext, display_name: String) -> FieldResult<ProfileData> {
        let profile = profile_actions::update_profile(&ctx.viewer, &display_name, ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(ProfileData::from(profile))
    }

    // =========================================================================
    // Admin Mutations
    // =========================================================================

    async fn delete_user(ctx: &GraphQLContext, id: Uuid) -> FieldResult<bool> {
        profile_actions::delete_user(&ctx.viewer, ProfileId::from_uuid(id), ctx.deps())
            .await
            .map_err(to_field_error)?;
        Ok(true)
    }

    async fn grant_role(
        ctx: &GraphQLContext,
        id: Uuid,
        role: RoleData,
    ) -> FieldResult<AdminUserData> {
        info!(profile_id = %id, role = ?role, "grantRole requested");
        let user = profile_actions::grant_role(
            &ctx.viewer,
            ProfileId::from_uuid(id),
            role.into(),
            ctx.deps(),
        )
        .await
        .map_err(to_field_error)?;
        Ok(AdminUserData::from(user))
    }

    async fn revoke_role(
        ctx: &GraphQLContext,
        id: Uuid,
        role: RoleData,
    ) -> FieldResult<AdminUserData> {
        info!(profile_id = %id, role = ?role, "revokeRole requested");
        let user = profile_actions::revoke_role(
            &ctx.viewer,
            ProfileId::from_uuid(id),
            role.into(),
            ctx.deps(),
        )
        .await
        .map_err(to_field_error)?;
        Ok(AdminUserData::from(user))
    }
}

pub type Schema = RootNode<'static, Query, Mutation, EmptySubscription<GraphQLContext>>;

pub fn create_schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}
