use juniper::{GraphQLInputObject, GraphQLObject};

use crate::domains::posts::actions::{
    AdminDashboard, CreatePostRequest, ImageUpload, UpdatePostRequest,
};
use crate::domains::posts::data::PostData;
use crate::domains::profiles::AdminUserData;
use crate::server::graphql::GraphQLContext;

/// Featured image payload
#[derive(Debug, Clone, GraphQLInputObject)]
pub struct ImageUploadInput {
    pub file_name: Option<String>,
    /// Must be an `image/*` type
    pub content_type: String,
    /// Base64 bytes, optionally as a `data:` URL
    pub data_base64: String,
}

impl From<ImageUploadInput> for ImageUpload {
    fn from(input: ImageUploadInput) -> Self {
        Self {
            file_name: input.file_name,
            content_type: input.content_type,
            data_base64: input.data_base64,
        }
    }
}

/// Input for creating a post
#[derive(Debug, Clone, GraphQLInputObject)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    /// Comma-separated tag names, e.g. "Weather, Local News"
    pub tags: Option<String>,
    /// Defaults to true
    pub published: Option<bool>,
    pub image: Option<ImageUploadInput>,
}

impl From<CreatePostInput> for CreatePostRequest {
    fn from(input: CreatePostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            excerpt: input.excerpt,
            tags: input.tags,
            published: input.published,
            image: input.image.map(ImageUpload::from),
        }
    }
}

/// Input for editing a post. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, GraphQLInputObject)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Empty string clears the excerpt
    pub excerpt: Option<String>,
    pub published: Option<bool>,
    /// Replaces all tags; empty string removes them
    pub tags: Option<String>,
}

impl From<UpdatePostInput> for UpdatePostRequest {
    fn from(input: UpdatePostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            excerpt: input.excerpt,
            published: input.published,
            tags: input.tags,
        }
    }
}

/// Moderation overview
#[derive(Debug, Clone, GraphQLObject)]
#[graphql(name = "AdminDashboard", context = GraphQLContext)]
pub struct AdminDashboardData {
    pub posts: Vec<PostData>,
    pub users: Vec<AdminUserData>,
    pub published_count: i32,
    pub draft_count: i32,
    pub admin_count: i32,
}

impl From<AdminDashboard> for AdminDashboardData {
    fn from(view: AdminDashboard) -> Self {
        let published_count = view.published_count() as i32;
        let draft_count = view.draft_count() as i32;
        let admin_count = view.admin_count() as i32;

        Self {
            posts: view.posts.into_iter().map(PostData::from).collect(),
            users: view.users.into_iter().map(AdminUserData::from).collect(),
            published_count,
            draft_count,
            admin_count,
        }
    }
}
